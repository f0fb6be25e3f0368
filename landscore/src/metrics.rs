//! Calcul de la fiche de métriques d'une parcelle
//!
//! Enchaîne zone UTM → projection → classement des entités → analyse spatiale
//! → échantillonnage d'altitude → score. Le calcul est synchrone et sans effet
//! de bord : l'appelant décide du runtime et du timeout.

use geo::{Area, Coord, LineString, Polygon};
use tracing::{debug, warn};

use crate::analysis::{minimum_rect, nearest_distance, road_distance, road_touch};
use crate::config::ScoringConfig;
use crate::dem::{sample_dem, ElevationLookup};
use crate::features::{FeatureSets, RawCollection};
use crate::parcel::{BBox, Parcel};
use crate::reproject::Projector;
use crate::score::{compute_score, ScoreInputs};
use crate::types::MetricRecord;
use crate::LandscoreError;

/// Mètres par degré de latitude (approximation sphérique)
const METERS_PER_DEGREE: f64 = 111_000.0;

/// m² par sotka (1 are)
const M2_PER_SOTKA: f64 = 100.0;

/// Calcule les métriques d'une parcelle depuis une collection brute d'entités
pub fn compute_metrics(
    parcel: &Parcel,
    features: &RawCollection,
    elevation: &dyn ElevationLookup,
    config: &ScoringConfig,
) -> Result<MetricRecord, LandscoreError> {
    let sets = FeatureSets::from_collection(features);
    if sets.unclassified > 0 && sets.unclassified == features.elements.len() {
        warn!(
            elements = features.elements.len(),
            "No element of the collection could be classified"
        );
    }
    compute_metrics_classified(parcel, &sets, elevation, config)
}

/// Calcule les métriques depuis des entités déjà classées (coordonnées WGS84)
///
/// Utile quand la même collection sert à plusieurs parcelles.
pub fn compute_metrics_classified(
    parcel: &Parcel,
    features: &FeatureSets,
    elevation: &dyn ElevationLookup,
    config: &ScoringConfig,
) -> Result<MetricRecord, LandscoreError> {
    config.validate()?;

    let centroid = parcel.centroid()?;
    let projector = Projector::for_request(centroid.x(), centroid.y())?;
    debug!(
        lon = centroid.x(),
        lat = centroid.y(),
        epsg = projector.epsg(),
        backend = projector.description(),
        "Planar zone resolved"
    );

    let parcel_utm = projector.forward(parcel.geometry())?;
    let sets = features.project(&projector)?;

    let area_m2 = parcel_utm.unsigned_area();

    let d_road_m = road_distance(&parcel_utm, &sets);
    let d_water_m = nearest_distance(&parcel_utm, &sets.water);
    let d_power_m = nearest_distance(&parcel_utm, &sets.power_lines);
    let d_stop_m = nearest_distance(&parcel_utm, &sets.transit_stops);
    let d_place_m = nearest_distance(&parcel_utm, &sets.settlements);
    let d_substation_m = nearest_distance(&parcel_utm, &sets.substations);
    let d_social_m = nearest_distance(&parcel_utm, &sets.social);

    let touch = road_touch(&parcel_utm, &sets.roads_all, &config.spatial);
    let can_house = minimum_rect(&parcel_utm)
        .map(|fit| fit.fits_square(config.spatial.footprint_m))
        .unwrap_or(false);

    debug!(
        area_m2,
        d_road = ?d_road_m,
        d_water = ?d_water_m,
        facade = touch.facade_len_m,
        can_house,
        "Spatial analysis done"
    );

    let dem = sample_dem(&parcel_utm, centroid, &projector, elevation, &config.dem);

    let score = compute_score(
        &ScoreInputs {
            d_road_m,
            d_water_m,
            d_power_m,
            d_stop_m,
            touches_road: touch.touches_road,
            slope_pct: dem.slope_indicative_pct,
            rel_lowness_m: dem.rel_lowness_m,
        },
        config,
    );
    debug!(total = score.total, "Score computed");

    Ok(MetricRecord {
        epsg: projector.epsg(),
        area_m2,
        area_ha: area_m2 / 10_000.0,
        touches_road: touch.touches_road,
        facade_len_m: touch.facade_len_m,
        can_house_10x10: can_house,
        d_road_m,
        d_water_m,
        d_power_m,
        d_stop_m,
        d_place_m,
        d_substation_m,
        d_social_m,
        dem,
        score,
    })
}

/// Carré de `sotok` × 100 m² centré sur (lat, lon), orienté selon la grille UTM locale
pub fn square_from_point_area(lat: f64, lon: f64, sotok: f64) -> Result<Parcel, LandscoreError> {
    if !(sotok.is_finite() && sotok > 0.0) {
        return Err(LandscoreError::invalid_geometry(format!(
            "area must be a positive number of sotok, got {}",
            sotok
        )));
    }
    if !(lat.is_finite() && lon.is_finite() && (-90.0..=90.0).contains(&lat)) {
        return Err(LandscoreError::invalid_geometry(format!(
            "invalid center ({}, {})",
            lat, lon
        )));
    }

    let projector = Projector::for_request(lon, lat)?;
    let c = projector.forward_coord(Coord { x: lon, y: lat })?;
    let s = (sotok * M2_PER_SOTKA).sqrt() / 2.0;

    let ring: Vec<Coord> = [(-s, -s), (s, -s), (s, s), (-s, s)]
        .iter()
        .map(|&(dx, dy)| {
            projector.inverse_coord(Coord {
                x: c.x + dx,
                y: c.y + dy,
            })
        })
        .collect::<Result<_, _>>()?;

    Parcel::from_polygon(Polygon::new(LineString::new(ring), vec![]))
}

/// Élargit une emprise de `meters` dans chaque direction (approximation sphérique)
///
/// Le facteur cos(lat) est borné à 0.1 pour rester fini près des pôles.
pub fn expand_bbox(bbox: BBox, meters: f64) -> BBox {
    let lat_mid = (bbox.min_lat + bbox.max_lat) / 2.0;
    let dlat = meters / METERS_PER_DEGREE;
    let dlon = meters / (METERS_PER_DEGREE * lat_mid.to_radians().cos().max(0.1));
    BBox::new(
        bbox.min_lon - dlon,
        bbox.min_lat - dlat,
        bbox.max_lon + dlon,
        bbox.max_lat + dlat,
    )
}
