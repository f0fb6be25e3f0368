//! Types de données produits par le moteur

use serde::Serialize;

/// Étape de la chaîne de repli ayant produit les échantillons intérieurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElevationSource {
    /// Nœuds de grille situés dans la parcelle
    Grid,
    /// Aucun nœud intérieur : altitude du centroïde
    Centroid,
    /// Aucune altitude disponible : 0 m
    Missing,
}

/// Statistiques d'altitude de la parcelle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemStats {
    /// Altitude minimale dans la parcelle (m)
    pub elev_min: f64,
    /// Altitude maximale dans la parcelle (m)
    pub elev_max: f64,
    /// Altitude médiane dans la parcelle (m)
    pub elev_med: f64,
    /// 95e percentile dans la parcelle (m)
    pub elev_p95: f64,
    /// Pente indicative (%), dans [0, 100]
    pub slope_indicative_pct: f64,
    /// Médiane intérieure - médiane du voisinage (m), négatif = cuvette
    pub rel_lowness_m: f64,
    /// Nombre d'échantillons dans la parcelle
    pub samples_inside: usize,
    /// Nombre d'échantillons dans l'emprise tamponnée
    pub samples_surrounding: usize,
    /// Origine des échantillons intérieurs
    pub source: ElevationSource,
}

/// Sous-scores et score total, tous dans [0, 100]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Score {
    pub access: f64,
    pub flood: f64,
    pub slope: f64,
    pub infra: f64,
    pub power: f64,
    pub total: u32,
}

/// Fiche de métriques d'une parcelle, transmise telle quelle aux rendus
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRecord {
    /// Code EPSG de la zone UTM utilisée
    pub epsg: u32,
    pub area_m2: f64,
    pub area_ha: f64,
    pub touches_road: bool,
    /// Longueur de limite à moins du tampon route (m)
    pub facade_len_m: f64,
    /// Le rectangle minimal contient l'emprise de référence (10×10 par défaut)
    pub can_house_10x10: bool,
    pub d_road_m: Option<f64>,
    pub d_water_m: Option<f64>,
    pub d_power_m: Option<f64>,
    pub d_stop_m: Option<f64>,
    pub d_place_m: Option<f64>,
    pub d_substation_m: Option<f64>,
    pub d_social_m: Option<f64>,
    pub dem: DemStats,
    pub score: Score,
}
