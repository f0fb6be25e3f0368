//! Analyse spatiale dans le plan UTM (unités = mètres)
//!
//! - distance minimale de la parcelle à un ensemble d'entités
//! - contact avec la route et longueur de façade
//! - rectangle minimal et test d'emprise carrée

mod facade;

pub use facade::facade_length;

use geo::{CoordsIter, EuclideanDistance, MinimumRotatedRect, MultiPoint, MultiPolygon, Point};
use serde::Serialize;

use crate::config::SpatialConfig;
use crate::features::{FeatureGeometry, FeatureSets};

/// Distance minimale entre la parcelle et un ensemble d'entités
///
/// `None` quand l'ensemble est vide : la distance est inconnue, pas nulle.
/// Vaut 0 si une entité touche ou recouvre la parcelle.
pub fn nearest_distance(parcel: &MultiPolygon, set: &[FeatureGeometry]) -> Option<f64> {
    set.iter()
        .flat_map(|feature| {
            parcel.iter().map(move |polygon| match feature {
                FeatureGeometry::Point(p) => polygon.euclidean_distance(p),
                FeatureGeometry::Line(ls) => polygon.euclidean_distance(ls),
                FeatureGeometry::Area(area) => polygon.euclidean_distance(area),
            })
        })
        .min_by(|a, b| a.total_cmp(b))
}

/// Distance à la route : routes principales d'abord, sinon toutes routes
pub fn road_distance(parcel: &MultiPolygon, features: &FeatureSets) -> Option<f64> {
    nearest_distance(parcel, &features.roads_major)
        .or_else(|| nearest_distance(parcel, &features.roads_all))
}

/// Résultat du test de façade
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoadTouch {
    pub facade_len_m: f64,
    pub touches_road: bool,
}

/// Longueur de limite à moins de `road_buffer_m` d'une route, et contact
/// si elle dépasse `touch_threshold_m`
pub fn road_touch(parcel: &MultiPolygon, roads: &[FeatureGeometry], config: &SpatialConfig) -> RoadTouch {
    let facade_len_m = facade_length(parcel, roads, config.road_buffer_m);
    RoadTouch {
        facade_len_m,
        touches_road: facade_len_m > config.touch_threshold_m,
    }
}

/// Dimensions du rectangle minimal orienté
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RectFit {
    /// Plus petit côté (m)
    pub width_m: f64,
    /// Plus grand côté (m)
    pub height_m: f64,
}

impl RectFit {
    /// Une emprise carrée `side × side` tient-elle dans le rectangle ?
    pub fn fits_square(&self, side: f64) -> bool {
        self.width_m >= side && self.height_m >= side
    }
}

/// Rectangle minimal orienté des anneaux extérieurs (trous ignorés)
pub fn minimum_rect(parcel: &MultiPolygon) -> Option<RectFit> {
    let points: MultiPoint = parcel
        .iter()
        .flat_map(|polygon| polygon.exterior().coords_iter())
        .map(Point)
        .collect();

    let rect = points.minimum_rotated_rect()?;
    let mut edges: Vec<f64> = rect
        .exterior()
        .lines()
        .map(|l| {
            let d = l.delta();
            d.x.hypot(d.y)
        })
        .collect();
    if edges.len() < 4 {
        return None;
    }
    edges.sort_by(|a, b| a.total_cmp(b));

    Some(RectFit {
        width_m: edges[0],
        height_m: edges[edges.len() - 1],
    })
}
