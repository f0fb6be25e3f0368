//! Géométrie de parcelle validée

use geo::{BoundingRect, Centroid, Coord, Geometry, MultiPolygon, Point, Polygon};
use serde::Serialize;

use crate::LandscoreError;

/// Emprise géographique (degrés WGS84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }
}

/// Parcelle en coordonnées géographiques (lon, lat WGS84)
///
/// Toujours stockée en MultiPolygon. Chaque anneau extérieur a au moins
/// 3 sommets distincts et toutes les coordonnées sont finies.
#[derive(Debug, Clone, PartialEq)]
pub struct Parcel {
    geometry: MultiPolygon,
}

impl Parcel {
    /// Valide une géométrie Polygon ou MultiPolygon
    pub fn new(geometry: Geometry) -> Result<Self, LandscoreError> {
        match geometry {
            Geometry::Polygon(p) => Self::from_multi_polygon(MultiPolygon::new(vec![p])),
            Geometry::MultiPolygon(mp) => Self::from_multi_polygon(mp),
            other => Err(LandscoreError::UnsupportedGeometry(
                geometry_type_name(&other).to_string(),
            )),
        }
    }

    pub fn from_polygon(polygon: Polygon) -> Result<Self, LandscoreError> {
        Self::from_multi_polygon(MultiPolygon::new(vec![polygon]))
    }

    pub fn from_multi_polygon(geometry: MultiPolygon) -> Result<Self, LandscoreError> {
        if geometry.0.is_empty() {
            return Err(LandscoreError::invalid_geometry("empty multipolygon"));
        }

        for (i, polygon) in geometry.iter().enumerate() {
            let ring = &polygon.exterior().0;
            if ring.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
                return Err(LandscoreError::invalid_geometry(format!(
                    "polygon {} has non-finite coordinates",
                    i
                )));
            }
            let distinct = distinct_vertices(ring);
            if distinct < 3 {
                return Err(LandscoreError::invalid_geometry(format!(
                    "polygon {} has {} distinct vertices, at least 3 required",
                    i, distinct
                )));
            }
        }

        Ok(Self { geometry })
    }

    /// Géométrie WGS84
    pub fn geometry(&self) -> &MultiPolygon {
        &self.geometry
    }

    /// Centroïde (lon, lat)
    pub fn centroid(&self) -> Result<Point, LandscoreError> {
        self.geometry
            .centroid()
            .ok_or_else(|| LandscoreError::invalid_geometry("cannot compute centroid"))
    }

    /// Emprise géographique
    pub fn bbox(&self) -> Result<BBox, LandscoreError> {
        let rect = self
            .geometry
            .bounding_rect()
            .ok_or_else(|| LandscoreError::invalid_geometry("empty bounding box"))?;
        Ok(BBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }
}

/// Nombre de sommets distincts d'un anneau (le point de fermeture n'est compté qu'une fois)
fn distinct_vertices(ring: &[Coord]) -> usize {
    let mut coords: Vec<Coord> = ring.to_vec();
    coords.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    coords.dedup();
    coords.len()
}

fn geometry_type_name(geometry: &Geometry) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}
