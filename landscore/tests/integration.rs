//! Tests d'intégration du calcul de métriques sur une parcelle synthétique près de Moscou

use geo::{polygon, Coord, Polygon, Rotate, Translate};
use landscore::{
    compute_metrics, render_summary, Markup, NoElevation, Parcel, Projector, RawCollection,
    ScoringConfig,
};
use serde_json::json;

const LON: f64 = 37.60;
const LAT: f64 = 55.75;

fn projector() -> Projector {
    Projector::from_epsg(32637).unwrap()
}

/// Centre de la scène dans le plan UTM
fn center() -> Coord {
    projector().forward_coord(Coord { x: LON, y: LAT }).unwrap()
}

/// Rectangle 40 m × 25 m centré sur la scène, en UTM
fn rectangle_utm() -> Polygon {
    let c = center();
    polygon![
        (x: c.x - 20.0, y: c.y - 12.5),
        (x: c.x + 20.0, y: c.y - 12.5),
        (x: c.x + 20.0, y: c.y + 12.5),
        (x: c.x - 20.0, y: c.y + 12.5),
    ]
}

fn to_parcel(utm: &Polygon) -> Parcel {
    Parcel::from_polygon(projector().inverse(utm).unwrap()).unwrap()
}

/// (lat, lon) d'un décalage en mètres depuis le centre
fn offset(dx: f64, dy: f64) -> serde_json::Value {
    let c = center();
    let p = projector()
        .inverse_coord(Coord {
            x: c.x + dx,
            y: c.y + dy,
        })
        .unwrap();
    json!({"lat": p.y, "lon": p.x})
}

fn scene() -> RawCollection {
    let stop = offset(0.0, 200.0);
    let water = offset(0.0, 12.5 + 25.0);
    serde_json::from_value(json!({
        "elements": [
            {
                "type": "way",
                "id": 1,
                "tags": {"highway": "residential"},
                // 5 m au sud du côté sud, sur toute la largeur
                "geometry": [offset(-100.0, -17.5), offset(100.0, -17.5)]
            },
            {
                "type": "node",
                "id": 2,
                "tags": {"highway": "bus_stop"},
                "lat": stop["lat"], "lon": stop["lon"]
            },
            {
                "type": "node",
                "id": 3,
                "tags": {"natural": "water"},
                "lat": water["lat"], "lon": water["lon"]
            },
            {
                "type": "node",
                "id": 4,
                "tags": {"shop": "bakery"},
                "lat": LAT, "lon": LON
            }
        ]
    }))
    .unwrap()
}

#[test]
fn test_area_invariant_under_translation_and_rotation() {
    let config = ScoringConfig::default();
    let empty = RawCollection::default();
    let base = rectangle_utm();

    let reference = compute_metrics(&to_parcel(&base), &empty, &NoElevation, &config).unwrap();
    assert!((reference.area_m2 - 1000.0).abs() < 0.01, "area={}", reference.area_m2);

    let moved = base.translate(350.0, -220.0).rotate_around_centroid(35.0);
    let record = compute_metrics(&to_parcel(&moved), &empty, &NoElevation, &config).unwrap();

    let relative = (record.area_m2 - reference.area_m2).abs() / reference.area_m2;
    assert!(relative < 1e-6, "{} vs {}", record.area_m2, reference.area_m2);
    assert_eq!(record.can_house_10x10, reference.can_house_10x10);
}

#[test]
fn test_full_scene() {
    let flat = |_lat: f64, _lon: f64| Some(140.0);
    let record = compute_metrics(
        &to_parcel(&rectangle_utm()),
        &scene(),
        &flat,
        &ScoringConfig::default(),
    )
    .unwrap();

    assert_eq!(record.epsg, 32637);
    assert!(record.touches_road);
    // Côté sud (40 m) + 5 m sur chacun des côtés est et ouest
    assert!((record.facade_len_m - 50.0).abs() < 0.05, "facade={}", record.facade_len_m);
    assert!((record.d_road_m.unwrap() - 5.0).abs() < 0.01);
    assert!((record.d_water_m.unwrap() - 25.0).abs() < 0.01);
    assert!((record.d_stop_m.unwrap() - 187.5).abs() < 0.01);
    assert_eq!(record.d_power_m, None);
    assert_eq!(record.d_place_m, None);
    assert!(record.can_house_10x10);

    assert_eq!(record.score.access, 100.0);
    assert_eq!(record.score.infra, 100.0);
    assert_eq!(record.score.power, 30.0);
    // Eau à 25 m : risque 0.35
    assert_eq!(record.score.flood, 65.0);
    assert_eq!(record.score.slope, 55.0);
    // 25 + 13 + 11 + 15 + 3 + 10
    assert_eq!(record.score.total, 77);

    let summary = render_summary(&record, "Москва", Markup::Html);
    assert!(summary.contains("<b>77/100</b>"));
    assert!(summary.contains("Дорога: 4 м") || summary.contains("Дорога: 5 м"));
    assert!(summary.contains("Касание дороги: Да"));
}

#[test]
fn test_record_serializes_expected_fields() {
    let record = compute_metrics(
        &to_parcel(&rectangle_utm()),
        &RawCollection::default(),
        &NoElevation,
        &ScoringConfig::default(),
    )
    .unwrap();

    let value = serde_json::to_value(&record).unwrap();
    for key in [
        "area_m2",
        "area_ha",
        "touches_road",
        "facade_len_m",
        "can_house_10x10",
        "d_road_m",
        "d_water_m",
        "d_power_m",
        "d_stop_m",
        "d_place_m",
        "dem",
        "score",
    ] {
        assert!(value.get(key).is_some(), "missing {}", key);
    }
    assert!(value["d_road_m"].is_null());
    assert_eq!(value["dem"]["source"], "missing");
    assert_eq!(value["score"]["total"], 50);
}

#[test]
fn test_non_polygon_rejected() {
    let point = geo::Geometry::Point(geo::Point::new(LON, LAT));
    assert!(matches!(
        Parcel::new(point),
        Err(landscore::LandscoreError::UnsupportedGeometry(_))
    ));
}
