//! Classification des éléments OSM par leurs tags

use std::collections::HashMap;

use serde::Serialize;

use super::ElementType;

/// Routes principales
const ROAD_MAJOR: &[&str] = &["motorway", "trunk", "primary", "secondary"];

/// Routes secondaires (complètent les principales pour « toutes routes »)
const ROAD_MINOR: &[&str] = &["tertiary", "unclassified", "residential", "service"];

const SOCIAL_AMENITIES: &[&str] = &["school", "kindergarten", "clinic", "hospital"];

const SETTLEMENTS: &[&str] = &["town", "village", "hamlet"];

/// Type d'entité cartographique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    RoadMajor,
    RoadMinor,
    Water,
    PowerLine,
    Substation,
    TransitStop,
    Social,
    Settlement,
    Unclassified,
}

impl FeatureKind {
    /// Tous les types classés, dans l'ordre de priorité
    pub const CLASSIFIED: [FeatureKind; 8] = [
        FeatureKind::RoadMajor,
        FeatureKind::RoadMinor,
        FeatureKind::Water,
        FeatureKind::PowerLine,
        FeatureKind::Substation,
        FeatureKind::TransitStop,
        FeatureKind::Social,
        FeatureKind::Settlement,
    ];

    /// Vrai pour les deux classes de routes
    pub fn is_road(self) -> bool {
        matches!(self, FeatureKind::RoadMajor | FeatureKind::RoadMinor)
    }
}

/// Classe un élément ; le premier type qui correspond l'emporte
pub fn classify(element_type: ElementType, tags: &HashMap<String, String>) -> FeatureKind {
    let tag = |key: &str| tags.get(key).map(String::as_str);
    let is_way = element_type == ElementType::Way;

    if is_way && tag("highway").is_some_and(|v| ROAD_MAJOR.contains(&v)) {
        return FeatureKind::RoadMajor;
    }
    if is_way && tag("highway").is_some_and(|v| ROAD_MINOR.contains(&v)) {
        return FeatureKind::RoadMinor;
    }
    if is_water(tags) {
        return FeatureKind::Water;
    }
    match tag("power") {
        Some("line") => return FeatureKind::PowerLine,
        Some("substation") => return FeatureKind::Substation,
        _ => {}
    }
    if tag("highway") == Some("bus_stop") || tag("public_transport") == Some("stop_position") {
        return FeatureKind::TransitStop;
    }
    if tag("amenity").is_some_and(|v| SOCIAL_AMENITIES.contains(&v)) {
        return FeatureKind::Social;
    }
    if tag("place").is_some_and(|v| SETTLEMENTS.contains(&v)) {
        return FeatureKind::Settlement;
    }
    FeatureKind::Unclassified
}

fn is_water(tags: &HashMap<String, String>) -> bool {
    tags.contains_key("waterway")
        || tags.get("natural").is_some_and(|v| v == "water")
        || tags.get("landuse").is_some_and(|v| v == "reservoir")
}

/// Les tags décrivent-ils une surface (area=yes, plan d'eau, réservoir) ?
pub fn is_area(tags: &HashMap<String, String>) -> bool {
    tags.get("area").is_some_and(|v| v == "yes")
        || tags.get("natural").is_some_and(|v| v == "water")
        || tags.get("landuse").is_some_and(|v| v == "reservoir")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_roads() {
        assert_eq!(
            classify(ElementType::Way, &tags(&[("highway", "primary")])),
            FeatureKind::RoadMajor
        );
        assert_eq!(
            classify(ElementType::Way, &tags(&[("highway", "residential")])),
            FeatureKind::RoadMinor
        );
        // Un nœud highway=primary n'est pas une route
        assert_eq!(
            classify(ElementType::Node, &tags(&[("highway", "primary")])),
            FeatureKind::Unclassified
        );
        // footway n'est dans aucun ensemble
        assert_eq!(
            classify(ElementType::Way, &tags(&[("highway", "footway")])),
            FeatureKind::Unclassified
        );
    }

    #[test]
    fn test_water() {
        for t in [
            tags(&[("waterway", "stream")]),
            tags(&[("natural", "water")]),
            tags(&[("landuse", "reservoir")]),
        ] {
            assert_eq!(classify(ElementType::Way, &t), FeatureKind::Water);
        }
        assert_eq!(
            classify(ElementType::Way, &tags(&[("natural", "wood")])),
            FeatureKind::Unclassified
        );
    }

    #[test]
    fn test_power_and_stops() {
        assert_eq!(
            classify(ElementType::Way, &tags(&[("power", "line")])),
            FeatureKind::PowerLine
        );
        assert_eq!(
            classify(ElementType::Node, &tags(&[("power", "substation")])),
            FeatureKind::Substation
        );
        assert_eq!(
            classify(ElementType::Node, &tags(&[("highway", "bus_stop")])),
            FeatureKind::TransitStop
        );
        assert_eq!(
            classify(
                ElementType::Node,
                &tags(&[("public_transport", "stop_position")])
            ),
            FeatureKind::TransitStop
        );
    }

    #[test]
    fn test_social_and_places() {
        assert_eq!(
            classify(ElementType::Node, &tags(&[("amenity", "school")])),
            FeatureKind::Social
        );
        assert_eq!(
            classify(ElementType::Node, &tags(&[("amenity", "bar")])),
            FeatureKind::Unclassified
        );
        assert_eq!(
            classify(ElementType::Node, &tags(&[("place", "village")])),
            FeatureKind::Settlement
        );
        assert_eq!(
            classify(ElementType::Node, &tags(&[("place", "city")])),
            FeatureKind::Unclassified
        );
    }

    #[test]
    fn test_first_match_wins() {
        // Barrage portant une route : classé route uniquement
        assert_eq!(
            classify(
                ElementType::Way,
                &tags(&[("waterway", "dam"), ("highway", "residential")])
            ),
            FeatureKind::RoadMinor
        );
        assert_eq!(
            classify(
                ElementType::Node,
                &tags(&[("highway", "bus_stop"), ("amenity", "school")])
            ),
            FeatureKind::TransitStop
        );
    }

    #[test]
    fn test_empty_tags() {
        assert_eq!(
            classify(ElementType::Node, &HashMap::new()),
            FeatureKind::Unclassified
        );
    }

    #[test]
    fn test_is_area() {
        assert!(is_area(&tags(&[("area", "yes")])));
        assert!(is_area(&tags(&[("natural", "water")])));
        assert!(!is_area(&tags(&[("waterway", "river")])));
        assert!(!is_area(&tags(&[("area", "no")])));
    }
}
