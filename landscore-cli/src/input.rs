//! Lecture des entrées : parcelles GeoJSON et réponses Overpass

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use geojson::GeoJson;
use landscore::{Parcel, RawCollection};
use tracing::{debug, warn};

/// Propriétés utilisées comme libellé de la parcelle, dans l'ordre
const LABEL_KEYS: &[&str] = &["display_name", "name", "address", "cadnum", "id"];

/// Parcelle lue depuis un fichier, avec son libellé éventuel
#[derive(Debug, Clone)]
pub struct ParcelInput {
    /// Fichier source
    pub source: PathBuf,
    /// Position dans le fichier (0 pour une géométrie seule)
    pub index: usize,
    pub label: Option<String>,
    pub parcel: Parcel,
}

impl ParcelInput {
    /// Identifiant lisible : `fichier#index`
    pub fn id(&self) -> String {
        let name = self
            .source
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown");
        format!("{}#{}", name, self.index)
    }
}

/// Lit toutes les parcelles d'un fichier GeoJSON
///
/// Accepte une géométrie, une Feature ou une FeatureCollection. Dans une
/// collection, les entités invalides sont signalées et ignorées ; une
/// collection sans aucune parcelle valide est une erreur.
pub fn load_parcels(path: &Path) -> Result<Vec<ParcelInput>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read parcel file: {}", path.display()))?;
    parse_parcels(&content, path)
}

/// Lit un fichier contenant une seule parcelle (la première si plusieurs)
pub fn load_parcel(path: &Path) -> Result<ParcelInput> {
    let mut parcels = load_parcels(path)?;
    if parcels.len() > 1 {
        warn!(
            path = %path.display(),
            count = parcels.len(),
            "Several parcels in file, using the first one"
        );
    }
    Ok(parcels.swap_remove(0))
}

pub fn parse_parcels(content: &str, source: &Path) -> Result<Vec<ParcelInput>> {
    let geojson: GeoJson = content
        .parse()
        .with_context(|| format!("Invalid GeoJSON: {}", source.display()))?;

    let parcels = match geojson {
        GeoJson::Geometry(geometry) => {
            vec![to_parcel_input(geometry, None, source, 0)?]
        }
        GeoJson::Feature(feature) => {
            let label = feature_label(&feature);
            let geometry = feature
                .geometry
                .with_context(|| format!("Feature without geometry: {}", source.display()))?;
            vec![to_parcel_input(geometry, label, source, 0)?]
        }
        GeoJson::FeatureCollection(collection) => {
            let mut parcels = Vec::new();
            for (index, feature) in collection.features.into_iter().enumerate() {
                let label = feature_label(&feature);
                let Some(geometry) = feature.geometry else {
                    warn!(index, "Feature without geometry, skipped");
                    continue;
                };
                match to_parcel_input(geometry, label, source, index) {
                    Ok(parcel) => parcels.push(parcel),
                    Err(e) => warn!(index, error = %e, "Invalid parcel, skipped"),
                }
            }
            if parcels.is_empty() {
                anyhow::bail!("No valid parcel in {}", source.display());
            }
            parcels
        }
    };

    debug!(path = %source.display(), count = parcels.len(), "Parcels loaded");
    Ok(parcels)
}

fn to_parcel_input(
    geometry: geojson::Geometry,
    label: Option<String>,
    source: &Path,
    index: usize,
) -> Result<ParcelInput> {
    let geometry: geo::Geometry<f64> = geometry
        .try_into()
        .context("Unsupported GeoJSON geometry")?;
    let parcel = Parcel::new(geometry)
        .with_context(|| format!("Invalid parcel #{} in {}", index, source.display()))?;

    Ok(ParcelInput {
        source: source.to_path_buf(),
        index,
        label,
        parcel,
    })
}

fn feature_label(feature: &geojson::Feature) -> Option<String> {
    LABEL_KEYS.iter().find_map(|key| match feature.property(key)? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Lit une réponse Overpass (`{"elements": [...]}`)
pub fn load_features(path: &Path) -> Result<RawCollection> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read features file: {}", path.display()))?;
    let collection: RawCollection = serde_json::from_str(&content)
        .with_context(|| format!("Invalid Overpass JSON: {}", path.display()))?;
    debug!(
        path = %path.display(),
        elements = collection.elements.len(),
        "Features loaded"
    );
    Ok(collection)
}

/// Développe une liste de motifs glob en fichiers, dans l'ordre, sans doublons
pub fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let mut matched = 0;
        for entry in glob::glob(pattern).with_context(|| format!("Invalid pattern: {}", pattern))? {
            let path = entry.with_context(|| format!("Cannot read match of {}", pattern))?;
            if path.is_file() && !files.contains(&path) {
                files.push(path);
                matched += 1;
            }
        }
        if matched == 0 {
            warn!(pattern = pattern.as_str(), "Pattern matched no file");
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r#"{"type": "Polygon", "coordinates": [[[37.6, 55.75], [37.601, 55.75], [37.601, 55.7506], [37.6, 55.7506], [37.6, 55.75]]]}"#;

    #[test]
    fn test_parse_bare_geometry() {
        let parcels = parse_parcels(SQUARE, Path::new("a.geojson")).unwrap();
        assert_eq!(parcels.len(), 1);
        assert_eq!(parcels[0].label, None);
        assert_eq!(parcels[0].id(), "a.geojson#0");
    }

    #[test]
    fn test_parse_feature_with_label() {
        let json = format!(
            r#"{{"type": "Feature", "properties": {{"name": "Участок 1"}}, "geometry": {}}}"#,
            SQUARE
        );
        let parcels = parse_parcels(&json, Path::new("b.geojson")).unwrap();
        assert_eq!(parcels[0].label.as_deref(), Some("Участок 1"));
    }

    #[test]
    fn test_collection_skips_invalid_features() {
        let json = format!(
            r#"{{"type": "FeatureCollection", "features": [
                {{"type": "Feature", "properties": {{"id": 7}}, "geometry": {0}}},
                {{"type": "Feature", "properties": {{}}, "geometry": {{"type": "Point", "coordinates": [37.6, 55.75]}}}},
                {{"type": "Feature", "properties": {{}}, "geometry": null}},
                {{"type": "Feature", "properties": {{}}, "geometry": {0}}}
            ]}}"#,
            SQUARE
        );
        let parcels = parse_parcels(&json, Path::new("c.geojson")).unwrap();
        assert_eq!(parcels.len(), 2);
        assert_eq!(parcels[0].label.as_deref(), Some("7"));
        assert_eq!(parcels[1].index, 3);
    }

    #[test]
    fn test_point_is_not_a_parcel() {
        let json = r#"{"type": "Point", "coordinates": [37.6, 55.75]}"#;
        let err = parse_parcels(json, Path::new("d.geojson")).unwrap_err();
        assert!(format!("{:#}", err).contains("Unsupported geometry type: Point"));
    }

    #[test]
    fn test_invalid_json() {
        assert!(parse_parcels("{not json", Path::new("e.geojson")).is_err());
    }
}
