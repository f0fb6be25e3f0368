//! Échantillonnage d'altitude et statistiques de relief
//!
//! Une grille régulière est posée sur l'emprise de la parcelle élargie de
//! `buffer_m` (plan UTM). Chaque nœud à moins de `buffer_m` de la parcelle est
//! reconverti en WGS84 et interrogé auprès de la source d'altitude :
//! la valeur alimente l'échantillon « voisinage », et aussi l'échantillon
//! « intérieur » si le nœud est dans la parcelle.
//!
//! Une altitude manquante ne fait jamais échouer le calcul : sans nœud
//! intérieur on interroge le centroïde, et à défaut on prend 0 m.

mod stats;

pub use stats::{median, percentile};

use geo::{BoundingRect, Contains, Coord, EuclideanDistance, MultiPolygon, Point};
use tracing::{debug, warn};

use crate::config::DemConfig;
use crate::reproject::Projector;
use crate::types::{DemStats, ElevationSource};
use stats::{mean_grade, sorted, Grid};

/// Source d'altitude : (lat, lon) en degrés → altitude en mètres, ou `None` si inconnue
///
/// La source est construite une fois par l'appelant puis partagée entre les requêtes.
pub trait ElevationLookup: Send + Sync {
    fn elevation(&self, lat: f64, lon: f64) -> Option<f64>;
}

impl<F> ElevationLookup for F
where
    F: Fn(f64, f64) -> Option<f64> + Send + Sync,
{
    fn elevation(&self, lat: f64, lon: f64) -> Option<f64> {
        self(lat, lon)
    }
}

/// Source vide : aucune altitude connue
#[derive(Debug, Clone, Copy, Default)]
pub struct NoElevation;

impl ElevationLookup for NoElevation {
    fn elevation(&self, _lat: f64, _lon: f64) -> Option<f64> {
        None
    }
}

/// Échantillonne l'altitude autour de la parcelle projetée et calcule les statistiques
///
/// `centroid` est le centroïde de la parcelle en WGS84 (lon, lat), utilisé en repli.
pub fn sample_dem(
    parcel: &MultiPolygon,
    centroid: Point,
    projector: &Projector,
    lookup: &dyn ElevationLookup,
    config: &DemConfig,
) -> DemStats {
    let query = |c: Coord| -> Option<f64> {
        let geo = projector.inverse_coord(c).ok()?;
        lookup.elevation(geo.y, geo.x).filter(|h| h.is_finite())
    };

    let mut surrounding = Vec::new();
    let mut inside = Vec::new();
    let mut inside_nodes = Vec::new();

    let grid = parcel.bounding_rect().map(|rect| {
        let (min, max) = (rect.min(), rect.max());
        let (minx, miny) = (min.x - config.buffer_m, min.y - config.buffer_m);
        let (maxx, maxy) = (max.x + config.buffer_m, max.y + config.buffer_m);

        let nx = node_count(maxx - minx, config);
        let ny = node_count(maxy - miny, config);
        let dx = (maxx - minx) / (nx - 1) as f64;
        let dy = (maxy - miny) / (ny - 1) as f64;

        let mut values = vec![None; nx * ny];
        for i in 0..nx {
            for j in 0..ny {
                let point = Point::new(minx + i as f64 * dx, miny + j as f64 * dy);
                if parcel.euclidean_distance(&point) > config.buffer_m {
                    continue;
                }
                let Some(h) = query(point.0) else {
                    continue;
                };
                values[i * ny + j] = Some(h);
                surrounding.push(h);
                if parcel.contains(&point) {
                    inside.push(h);
                    inside_nodes.push((i, j));
                }
            }
        }

        Grid {
            nx,
            ny,
            dx,
            dy,
            values,
        }
    });

    let source = if !inside.is_empty() {
        ElevationSource::Grid
    } else if let Some(h) = lookup
        .elevation(centroid.y(), centroid.x())
        .filter(|h| h.is_finite())
    {
        warn!(nodes = surrounding.len(), "No elevation inside parcel, using centroid");
        inside.push(h);
        ElevationSource::Centroid
    } else {
        warn!("No elevation available, assuming 0 m");
        inside.push(0.0);
        ElevationSource::Missing
    };

    if surrounding.is_empty() {
        surrounding = inside.clone();
    }

    let slope = match (&grid, source) {
        (Some(grid), ElevationSource::Grid) => mean_grade(grid, &inside_nodes),
        _ => 0.0,
    };

    let inside_sorted = sorted(&inside);
    let surrounding_sorted = sorted(&surrounding);
    let elev_med = median(&inside_sorted);

    let stats = DemStats {
        elev_min: inside_sorted[0],
        elev_max: inside_sorted[inside_sorted.len() - 1],
        elev_med,
        elev_p95: percentile(&inside_sorted, 95.0),
        slope_indicative_pct: slope,
        rel_lowness_m: elev_med - median(&surrounding_sorted),
        samples_inside: inside.len(),
        samples_surrounding: surrounding.len(),
        source,
    };

    debug!(
        inside = stats.samples_inside,
        surrounding = stats.samples_surrounding,
        slope = stats.slope_indicative_pct,
        rel_lowness = stats.rel_lowness_m,
        "DEM sampled"
    );

    stats
}

/// Nombre de nœuds sur un axe : floor(étendue / pas), au moins `min_nodes`
fn node_count(extent: f64, config: &DemConfig) -> usize {
    let n = (extent / config.step_m).floor();
    if n.is_finite() && n > config.min_nodes as f64 {
        n as usize
    } else {
        config.min_nodes
    }
}
