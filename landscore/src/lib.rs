//! # landscore
//!
//! Moteur de métriques géospatiales et de scoring d'aptitude pour parcelles foncières.
//!
//! ## Features
//!
//! - Projection UTM locale en Rust pur (séries de Krüger), PROJ en option (`proj`)
//! - Classement des entités OSM (réponse Overpass) en ensembles typés
//! - Distances, façade sur route, rectangle minimal dans le plan UTM
//! - Échantillonnage d'altitude avec source injectée ([`ElevationLookup`])
//! - Score 0–100 paramétrable ([`ScoringConfig`])
//!
//! ## Usage
//!
//! ```rust,ignore
//! use landscore::{compute_metrics, render_summary, Markup, NoElevation, ScoringConfig};
//!
//! let parcel = landscore::square_from_point_area(55.75, 37.60, 10.0)?;
//! let features: landscore::RawCollection = serde_json::from_str(&overpass_json)?;
//! let record = compute_metrics(&parcel, &features, &NoElevation, &ScoringConfig::default())?;
//! println!("{}", render_summary(&record, "Москва", Markup::Plain));
//! ```

pub mod analysis;
pub mod config;
pub mod crs;
pub mod dem;
pub mod error;
pub mod features;
pub mod metrics;
pub mod parcel;
pub mod reproject;
pub mod score;
pub mod summary;
pub mod types;

pub use config::ScoringConfig;
pub use crs::UtmZone;
pub use dem::{ElevationLookup, NoElevation};
pub use error::LandscoreError;
pub use features::{FeatureKind, FeatureSets, RawCollection};
pub use metrics::{compute_metrics, compute_metrics_classified, expand_bbox, square_from_point_area};
pub use parcel::{BBox, Parcel};
pub use reproject::Projector;
pub use summary::{render_summary, Markup};
pub use types::{DemStats, ElevationSource, MetricRecord, Score};

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_public_types_are_send_sync() {
        assert_send_sync::<Parcel>();
        assert_send_sync::<FeatureSets>();
        assert_send_sync::<RawCollection>();
        assert_send_sync::<ScoringConfig>();
        assert_send_sync::<MetricRecord>();
        #[cfg(not(feature = "proj"))]
        assert_send_sync::<Projector>();
    }
}
