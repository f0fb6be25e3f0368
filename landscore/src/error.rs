//! Types d'erreurs pour le crate landscore

use thiserror::Error;

/// Erreurs pouvant survenir lors du calcul des métriques d'une parcelle
#[derive(Debug, Error)]
pub enum LandscoreError {
    /// Géométrie de parcelle invalide (moins de 3 sommets, coordonnées non finies...)
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Type de géométrie non supporté pour une parcelle
    #[error("Unsupported geometry type: {0}")]
    UnsupportedGeometry(String),

    /// Zone de projection inconnue ou hors plage
    #[error("Invalid projection zone: EPSG:{0}")]
    InvalidZone(u32),

    /// Configuration de scoring incohérente
    #[error("Invalid scoring configuration: {0}")]
    InvalidConfig(String),

    /// Échec d'une transformation de coordonnées
    #[error("Projection failed: {0}")]
    Projection(String),
}

impl LandscoreError {
    /// Crée une erreur de géométrie invalide
    pub fn invalid_geometry(reason: impl Into<String>) -> Self {
        Self::InvalidGeometry(reason.into())
    }

    /// Crée une erreur de configuration
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }
}
