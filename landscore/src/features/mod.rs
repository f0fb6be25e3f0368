//! Entités cartographiques autour de la parcelle
//!
//! L'entrée est une réponse Overpass déjà récupérée (`out body geom`) :
//! `{"elements": [{"type": "way", "tags": {...}, "geometry": [{"lat", "lon"}, ...]}, ...]}`.
//! Chaque élément est classé (voir [`classify`]) puis converti en point, ligne
//! ou polygone. Les doublons sont conservés.

mod classify;

pub use classify::{classify, is_area, FeatureKind};

use std::collections::HashMap;

use geo::{Coord, LineString, Point, Polygon};
use serde::Deserialize;
use tracing::debug;

use crate::reproject::Projector;
use crate::LandscoreError;

/// Collection brute d'éléments
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCollection {
    #[serde(default)]
    pub elements: Vec<RawElement>,
}

/// Type d'élément OSM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Node,
    Way,
    #[serde(other)]
    Other,
}

/// Sommet d'une géométrie Overpass
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

/// Élément brut : tags libres + coordonnée (nœud) ou suite de coordonnées (way)
#[derive(Debug, Clone, Deserialize)]
pub struct RawElement {
    #[serde(rename = "type")]
    pub element_type: ElementType,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Overpass renvoie `null` pour les nœuds hors emprise
    #[serde(default)]
    pub geometry: Vec<Option<LatLon>>,
}

impl RawElement {
    /// Coordonnées (lon, lat) de l'élément
    fn coords(&self) -> Vec<Coord> {
        if !self.geometry.is_empty() {
            return self
                .geometry
                .iter()
                .flatten()
                .map(|p| Coord { x: p.lon, y: p.lat })
                .collect();
        }
        match (self.lon, self.lat) {
            (Some(x), Some(y)) => vec![Coord { x, y }],
            _ => Vec::new(),
        }
    }

    /// Construit la géométrie de l'élément
    ///
    /// Polygone seulement si les tags indiquent une surface et que la suite est
    /// refermable (au moins 3 sommets distincts), sinon ligne ; une seule
    /// coordonnée donne un point.
    pub fn to_geometry(&self) -> Option<FeatureGeometry> {
        let coords = self.coords();
        match coords.len() {
            0 => None,
            1 => Some(FeatureGeometry::Point(Point(coords[0]))),
            _ => {
                if self.element_type == ElementType::Way
                    && is_area(&self.tags)
                    && is_closeable(&coords)
                {
                    // Polygon::new referme l'anneau si besoin
                    Some(FeatureGeometry::Area(Polygon::new(
                        LineString::new(coords),
                        vec![],
                    )))
                } else {
                    Some(FeatureGeometry::Line(LineString::new(coords)))
                }
            }
        }
    }
}

fn is_closeable(coords: &[Coord]) -> bool {
    let mut distinct: Vec<Coord> = Vec::with_capacity(coords.len());
    for c in coords {
        if !distinct.contains(c) {
            distinct.push(*c);
            if distinct.len() >= 3 {
                return true;
            }
        }
    }
    false
}

/// Géométrie typée d'une entité
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    Point(Point),
    Line(LineString),
    Area(Polygon),
}

impl FeatureGeometry {
    /// Projette la géométrie avec `projector`
    pub fn project(&self, projector: &Projector) -> Result<Self, LandscoreError> {
        Ok(match self {
            Self::Point(p) => Self::Point(projector.forward(p)?),
            Self::Line(ls) => Self::Line(projector.forward(ls)?),
            Self::Area(poly) => Self::Area(projector.forward(poly)?),
        })
    }
}

/// Ensembles typés d'entités
#[derive(Debug, Clone, Default)]
pub struct FeatureSets {
    pub roads_major: Vec<FeatureGeometry>,
    /// Routes principales et secondaires
    pub roads_all: Vec<FeatureGeometry>,
    pub water: Vec<FeatureGeometry>,
    pub power_lines: Vec<FeatureGeometry>,
    pub substations: Vec<FeatureGeometry>,
    pub transit_stops: Vec<FeatureGeometry>,
    pub social: Vec<FeatureGeometry>,
    pub settlements: Vec<FeatureGeometry>,
    /// Éléments non classés ou sans coordonnées
    pub unclassified: usize,
}

impl FeatureSets {
    /// Classe une collection brute
    pub fn from_collection(raw: &RawCollection) -> Self {
        let mut sets = Self::default();

        for element in &raw.elements {
            let kind = classify(element.element_type, &element.tags);
            if kind == FeatureKind::Unclassified {
                sets.unclassified += 1;
                continue;
            }
            match element.to_geometry() {
                Some(geometry) => sets.push(kind, geometry),
                None => {
                    debug!(id = ?element.id, kind = ?kind, "Element without coordinates");
                    sets.unclassified += 1;
                }
            }
        }

        debug!(
            roads_major = sets.roads_major.len(),
            roads_all = sets.roads_all.len(),
            water = sets.water.len(),
            power_lines = sets.power_lines.len(),
            transit_stops = sets.transit_stops.len(),
            unclassified = sets.unclassified,
            "Features classified"
        );

        sets
    }

    /// Ajoute une géométrie ; une route principale va aussi dans `roads_all`
    pub fn push(&mut self, kind: FeatureKind, geometry: FeatureGeometry) {
        match kind {
            FeatureKind::RoadMajor => {
                self.roads_all.push(geometry.clone());
                self.roads_major.push(geometry);
            }
            FeatureKind::RoadMinor => self.roads_all.push(geometry),
            FeatureKind::Water => self.water.push(geometry),
            FeatureKind::PowerLine => self.power_lines.push(geometry),
            FeatureKind::Substation => self.substations.push(geometry),
            FeatureKind::TransitStop => self.transit_stops.push(geometry),
            FeatureKind::Social => self.social.push(geometry),
            FeatureKind::Settlement => self.settlements.push(geometry),
            FeatureKind::Unclassified => self.unclassified += 1,
        }
    }

    /// Projette tous les ensembles
    pub fn project(&self, projector: &Projector) -> Result<Self, LandscoreError> {
        let project_all = |set: &[FeatureGeometry]| -> Result<Vec<FeatureGeometry>, LandscoreError> {
            set.iter().map(|g| g.project(projector)).collect()
        };

        Ok(Self {
            roads_major: project_all(&self.roads_major)?,
            roads_all: project_all(&self.roads_all)?,
            water: project_all(&self.water)?,
            power_lines: project_all(&self.power_lines)?,
            substations: project_all(&self.substations)?,
            transit_stops: project_all(&self.transit_stops)?,
            social: project_all(&self.social)?,
            settlements: project_all(&self.settlements)?,
            unclassified: self.unclassified,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> RawCollection {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_overpass_response() {
        let raw = parse(
            r#"{
                "version": 0.6,
                "elements": [
                    {"type": "node", "id": 1, "lat": 55.75, "lon": 37.61,
                     "tags": {"highway": "bus_stop"}},
                    {"type": "way", "id": 2, "tags": {"highway": "primary"},
                     "geometry": [{"lat": 55.75, "lon": 37.60}, {"lat": 55.76, "lon": 37.60}]},
                    {"type": "relation", "id": 3, "tags": {"natural": "water"}}
                ]
            }"#,
        );
        assert_eq!(raw.elements.len(), 3);
        assert_eq!(raw.elements[2].element_type, ElementType::Other);

        let sets = FeatureSets::from_collection(&raw);
        assert_eq!(sets.transit_stops.len(), 1);
        assert_eq!(sets.roads_major.len(), 1);
        assert_eq!(sets.roads_all.len(), 1);
        // La relation est classée eau mais n'a pas de coordonnées
        assert_eq!(sets.water.len(), 0);
        assert_eq!(sets.unclassified, 1);
    }

    #[test]
    fn test_area_becomes_polygon() {
        let raw = parse(
            r#"{"elements": [
                {"type": "way", "tags": {"natural": "water"},
                 "geometry": [{"lat": 0.0, "lon": 0.0}, {"lat": 0.0, "lon": 1.0},
                              {"lat": 1.0, "lon": 1.0}, {"lat": 0.0, "lon": 0.0}]}
            ]}"#,
        );
        let sets = FeatureSets::from_collection(&raw);
        assert!(matches!(sets.water[0], FeatureGeometry::Area(_)));
    }

    #[test]
    fn test_non_closeable_area_becomes_line() {
        let raw = parse(
            r#"{"elements": [
                {"type": "way", "tags": {"landuse": "reservoir"},
                 "geometry": [{"lat": 0.0, "lon": 0.0}, {"lat": 0.0, "lon": 1.0}, {"lat": 0.0, "lon": 0.0}]}
            ]}"#,
        );
        let sets = FeatureSets::from_collection(&raw);
        assert!(matches!(sets.water[0], FeatureGeometry::Line(_)));
    }

    #[test]
    fn test_waterway_stays_line() {
        let raw = parse(
            r#"{"elements": [
                {"type": "way", "tags": {"waterway": "river"},
                 "geometry": [{"lat": 0.0, "lon": 0.0}, {"lat": 0.0, "lon": 1.0},
                              {"lat": 1.0, "lon": 1.0}, {"lat": 0.0, "lon": 0.0}]}
            ]}"#,
        );
        let sets = FeatureSets::from_collection(&raw);
        assert!(matches!(sets.water[0], FeatureGeometry::Line(_)));
    }

    #[test]
    fn test_single_coordinate_way_is_point() {
        let raw = parse(
            r#"{"elements": [
                {"type": "way", "tags": {"power": "line"},
                 "geometry": [{"lat": 1.0, "lon": 2.0}, null]}
            ]}"#,
        );
        let sets = FeatureSets::from_collection(&raw);
        assert_eq!(
            sets.power_lines[0],
            FeatureGeometry::Point(Point::new(2.0, 1.0))
        );
    }

    #[test]
    fn test_duplicates_retained() {
        let element = r#"{"type": "node", "lat": 1.0, "lon": 2.0, "tags": {"place": "village"}}"#;
        let raw = parse(&format!(r#"{{"elements": [{0}, {0}]}}"#, element));
        let sets = FeatureSets::from_collection(&raw);
        assert_eq!(sets.settlements.len(), 2);
    }

    #[test]
    fn test_missing_elements_key() {
        let sets = FeatureSets::from_collection(&parse("{}"));
        assert!(sets.roads_all.is_empty());
        assert_eq!(sets.unclassified, 0);
    }

    #[test]
    fn test_project_keeps_counts() {
        let mut sets = FeatureSets::default();
        sets.push(FeatureKind::RoadMinor, FeatureGeometry::Point(Point::new(37.6, 55.75)));
        sets.push(FeatureKind::RoadMajor, FeatureGeometry::Point(Point::new(37.6, 55.75)));

        let projector = Projector::for_lon_lat(37.6, 55.75);
        let projected = sets.project(&projector).unwrap();
        assert_eq!(projected.roads_all.len(), 2);
        assert_eq!(projected.roads_major.len(), 1);
        match &projected.roads_major[0] {
            FeatureGeometry::Point(p) => assert!(p.x() > 100_000.0),
            other => panic!("Expected Point, got {:?}", other),
        }
    }
}
