//! Reprojection via PROJ
//!
//! Ce module est disponible uniquement avec la feature `proj`.

use geo::Coord;
use proj::Proj;

use crate::LandscoreError;

/// Paire de transformations EPSG:4326 ⇄ EPSG:326xx/327xx
pub(super) struct ProjPair {
    forward: Proj,
    inverse: Proj,
}

impl ProjPair {
    pub(super) fn new(epsg: u32) -> Result<Self, LandscoreError> {
        let target = format!("EPSG:{}", epsg);
        // new_known_crs respecte l'ordre (lon, lat) côté géographique
        let forward = Proj::new_known_crs("EPSG:4326", &target, None)
            .map_err(|e| LandscoreError::Projection(format!("EPSG:4326 → {}: {}", target, e)))?;
        let inverse = Proj::new_known_crs(&target, "EPSG:4326", None)
            .map_err(|e| LandscoreError::Projection(format!("{} → EPSG:4326: {}", target, e)))?;
        Ok(Self { forward, inverse })
    }

    pub(super) fn forward(&self, c: Coord) -> Result<Coord, LandscoreError> {
        let (x, y) = self
            .forward
            .convert((c.x, c.y))
            .map_err(|e| LandscoreError::Projection(e.to_string()))?;
        Ok(Coord { x, y })
    }

    pub(super) fn inverse(&self, c: Coord) -> Result<Coord, LandscoreError> {
        let (x, y) = self
            .inverse
            .convert((c.x, c.y))
            .map_err(|e| LandscoreError::Projection(e.to_string()))?;
        Ok(Coord { x, y })
    }
}
