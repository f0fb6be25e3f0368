//! Choix de la zone UTM locale
//!
//! Une parcelle est projetée dans la zone UTM (WGS84) qui contient son centroïde :
//! zone = floor((lon + 180) / 6) + 1, EPSG 326xx au nord et 327xx au sud.

use serde::Serialize;

use crate::LandscoreError;

/// Base EPSG des zones UTM hémisphère nord
const EPSG_NORTH_BASE: u32 = 32600;

/// Base EPSG des zones UTM hémisphère sud
const EPSG_SOUTH_BASE: u32 = 32700;

/// Zone UTM sur l'ellipsoïde WGS84
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct UtmZone {
    /// Numéro de zone (1..=60)
    pub zone: u8,
    /// Hémisphère sud
    pub south: bool,
}

impl UtmZone {
    /// Crée une zone en vérifiant le numéro
    pub fn new(zone: u8, south: bool) -> Result<Self, LandscoreError> {
        if !(1..=60).contains(&zone) {
            let base = if south { EPSG_SOUTH_BASE } else { EPSG_NORTH_BASE };
            return Err(LandscoreError::InvalidZone(base + zone as u32));
        }
        Ok(Self { zone, south })
    }

    /// Zone contenant le point (lon, lat) en degrés
    ///
    /// Les longitudes hors de [-180, 180) sont ramenées dans l'intervalle,
    /// et lon = 180 tombe dans la zone 60.
    pub fn for_lon_lat(lon: f64, lat: f64) -> Self {
        let lon = if (-180.0..180.0).contains(&lon) {
            lon
        } else {
            (lon + 180.0).rem_euclid(360.0) - 180.0
        };
        let zone = (((lon + 180.0) / 6.0).floor() as i64 + 1).clamp(1, 60) as u8;
        Self {
            zone,
            south: lat < 0.0,
        }
    }

    /// Retrouve la zone depuis un code EPSG (32601..=32660, 32701..=32760)
    pub fn from_epsg(epsg: u32) -> Result<Self, LandscoreError> {
        let (base, south) = match epsg {
            32601..=32660 => (EPSG_NORTH_BASE, false),
            32701..=32760 => (EPSG_SOUTH_BASE, true),
            _ => return Err(LandscoreError::InvalidZone(epsg)),
        };
        Ok(Self {
            zone: (epsg - base) as u8,
            south,
        })
    }

    /// Code EPSG de la zone
    pub fn epsg(&self) -> u32 {
        let base = if self.south {
            EPSG_SOUTH_BASE
        } else {
            EPSG_NORTH_BASE
        };
        base + self.zone as u32
    }

    /// Méridien central de la zone, en degrés
    pub fn central_meridian(&self) -> f64 {
        (self.zone as f64 - 1.0) * 6.0 - 180.0 + 3.0
    }
}
