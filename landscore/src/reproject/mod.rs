//! Reprojection WGS84 ⇄ UTM
//!
//! Par défaut la reprojection est faite en Rust pur (séries de Krüger).
//! Avec la feature `proj`, [`Projector::for_request`] délègue à la bibliothèque PROJ.
//!
//! Les transformations sont appliquées sommet par sommet via [`MapCoords`] :
//! un polygone reste un polygone et l'ordre des anneaux est conservé.

mod ellipsoid;
#[cfg(feature = "proj")]
mod proj_backend;
mod utm;

pub use ellipsoid::WGS84;

use geo::{Coord, MapCoords};

use crate::crs::UtmZone;
use crate::LandscoreError;

/// Point en coordonnées géographiques (radians)
#[derive(Debug, Clone, Copy)]
pub struct Geographic {
    /// Longitude en radians
    pub lon: f64,
    /// Latitude en radians
    pub lat: f64,
}

impl Geographic {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Convertit en degrés
    pub fn to_degrees(self) -> (f64, f64) {
        (self.lon.to_degrees(), self.lat.to_degrees())
    }

    /// Crée depuis des degrés
    pub fn from_degrees(lon_deg: f64, lat_deg: f64) -> Self {
        Self {
            lon: lon_deg.to_radians(),
            lat: lat_deg.to_radians(),
        }
    }
}

enum Backend {
    /// Séries de Krüger (pure Rust)
    Lite,
    /// PROJ (si feature activée)
    #[cfg(feature = "proj")]
    Proj(proj_backend::ProjPair),
}

/// Projection d'une requête : WGS84 (lon, lat en degrés) ⇄ zone UTM (mètres)
pub struct Projector {
    zone: UtmZone,
    backend: Backend,
}

impl Projector {
    /// Crée un projecteur pur Rust pour une zone
    pub fn new(zone: UtmZone) -> Self {
        Self {
            zone,
            backend: Backend::Lite,
        }
    }

    /// Crée un projecteur depuis un code EPSG UTM (326xx / 327xx)
    ///
    /// Un code hors plage est une erreur de configuration fatale : aucune zone
    /// par défaut n'est substituée.
    pub fn from_epsg(epsg: u32) -> Result<Self, LandscoreError> {
        Ok(Self::new(UtmZone::from_epsg(epsg)?))
    }

    /// Projecteur adapté au point (lon, lat), voir [`UtmZone::for_lon_lat`]
    pub fn for_lon_lat(lon: f64, lat: f64) -> Self {
        Self::new(UtmZone::for_lon_lat(lon, lat))
    }

    /// Projecteur du calcul pour le point (lon, lat)
    ///
    /// PROJ quand la feature `proj` est active, séries de Krüger sinon.
    pub fn for_request(lon: f64, lat: f64) -> Result<Self, LandscoreError> {
        let zone = UtmZone::for_lon_lat(lon, lat);
        #[cfg(feature = "proj")]
        {
            Self::with_proj(zone)
        }
        #[cfg(not(feature = "proj"))]
        {
            Ok(Self::new(zone))
        }
    }

    /// Crée un projecteur s'appuyant sur PROJ
    #[cfg(feature = "proj")]
    pub fn with_proj(zone: UtmZone) -> Result<Self, LandscoreError> {
        Ok(Self {
            zone,
            backend: Backend::Proj(proj_backend::ProjPair::new(zone.epsg())?),
        })
    }

    /// Zone UTM utilisée
    pub fn zone(&self) -> UtmZone {
        self.zone
    }

    /// Code EPSG de la zone
    pub fn epsg(&self) -> u32 {
        self.zone.epsg()
    }

    /// Retourne une description du backend utilisé
    pub fn description(&self) -> &'static str {
        match self.backend {
            Backend::Lite => "krüger series (pure Rust)",
            #[cfg(feature = "proj")]
            Backend::Proj(_) => "proj (PROJ library)",
        }
    }

    /// (lon, lat) en degrés → (x, y) en mètres
    pub fn forward_coord(&self, c: Coord) -> Result<Coord, LandscoreError> {
        check_finite(c)?;
        match &self.backend {
            Backend::Lite => {
                let (x, y) = utm::geographic_to_utm(Geographic::from_degrees(c.x, c.y), self.zone);
                Ok(Coord { x, y })
            }
            #[cfg(feature = "proj")]
            Backend::Proj(pair) => pair.forward(c),
        }
    }

    /// (x, y) en mètres → (lon, lat) en degrés
    pub fn inverse_coord(&self, c: Coord) -> Result<Coord, LandscoreError> {
        check_finite(c)?;
        match &self.backend {
            Backend::Lite => {
                let (x, y) = utm::utm_to_geographic(c.x, c.y, self.zone).to_degrees();
                Ok(Coord { x, y })
            }
            #[cfg(feature = "proj")]
            Backend::Proj(pair) => pair.inverse(c),
        }
    }

    /// Transforme une géométrie WGS84 vers le plan UTM
    pub fn forward<G>(&self, geom: &G) -> Result<G::Output, LandscoreError>
    where
        G: MapCoords<f64, f64>,
    {
        geom.try_map_coords(|c| self.forward_coord(c))
    }

    /// Transforme une géométrie du plan UTM vers WGS84
    pub fn inverse<G>(&self, geom: &G) -> Result<G::Output, LandscoreError>
    where
        G: MapCoords<f64, f64>,
    {
        geom.try_map_coords(|c| self.inverse_coord(c))
    }
}

fn check_finite(c: Coord) -> Result<(), LandscoreError> {
    if c.x.is_finite() && c.y.is_finite() {
        Ok(())
    } else {
        Err(LandscoreError::Projection(format!(
            "non-finite coordinate ({}, {})",
            c.x, c.y
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Area, Polygon};

    fn sample_polygon() -> Polygon {
        polygon![
            (x: 37.6000, y: 55.7500),
            (x: 37.6010, y: 55.7500),
            (x: 37.6010, y: 55.7506),
            (x: 37.6000, y: 55.7506),
            (x: 37.6000, y: 55.7500),
        ]
    }

    #[test]
    fn test_polygon_stays_polygon() {
        let projector = Projector::for_lon_lat(37.6, 55.75);
        let projected = projector.forward(&sample_polygon()).unwrap();

        assert_eq!(projected.exterior().0.len(), 5);
        // ~63 m x ~67 m
        let area = projected.unsigned_area();
        assert!(area > 3500.0 && area < 5000.0, "area={}", area);
    }

    #[test]
    fn test_forward_inverse_forward_idempotent() {
        let projector = Projector::for_lon_lat(37.6, 55.75);
        let first = projector.forward(&sample_polygon()).unwrap();
        let back = projector.inverse(&first).unwrap();
        let second = projector.forward(&back).unwrap();

        for (a, b) in first.exterior().coords().zip(second.exterior().coords()) {
            assert!((a.x - b.x).abs() < 1e-3, "{:?} vs {:?}", a, b);
            assert!((a.y - b.y).abs() < 1e-3, "{:?} vs {:?}", a, b);
        }
        for (a, b) in sample_polygon().exterior().coords().zip(back.exterior().coords()) {
            assert!((a.x - b.x).abs() < 1e-9);
            assert!((a.y - b.y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_invalid_epsg_is_fatal() {
        assert!(matches!(
            Projector::from_epsg(2154),
            Err(LandscoreError::InvalidZone(2154))
        ));
        assert_eq!(Projector::from_epsg(32637).unwrap().epsg(), 32637);
    }

    #[test]
    fn test_non_finite_coordinate() {
        let projector = Projector::for_lon_lat(37.6, 55.75);
        assert!(projector
            .forward_coord(Coord { x: f64::NAN, y: 55.0 })
            .is_err());
    }

    #[test]
    fn test_request_backend_follows_feature() {
        let projector = Projector::for_request(37.6, 55.75).unwrap();
        assert_eq!(projector.epsg(), 32637);
        let expected = if cfg!(feature = "proj") {
            "proj (PROJ library)"
        } else {
            "krüger series (pure Rust)"
        };
        assert_eq!(projector.description(), expected);

        // Les deux backends s'accordent au centimètre
        let lite = Projector::for_lon_lat(37.6, 55.75);
        let c = Coord { x: 37.6176, y: 55.7520 };
        let a = projector.forward_coord(c).unwrap();
        let b = lite.forward_coord(c).unwrap();
        assert!((a.x - b.x).abs() < 0.01 && (a.y - b.y).abs() < 0.01);
    }

    #[test]
    fn test_description() {
        assert_eq!(
            Projector::for_lon_lat(0.0, 0.0).description(),
            "krüger series (pure Rust)"
        );
    }
}
