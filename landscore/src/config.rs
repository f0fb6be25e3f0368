//! Paramètres du modèle de scoring
//!
//! Toutes les constantes heuristiques (tampons, pas de grille, seuils, poids)
//! sont regroupées ici. Chaque champ a une valeur par défaut, un JSON partiel
//! suffit donc pour surcharger un seul paramètre.

use serde::{Deserialize, Serialize};

use crate::LandscoreError;

/// Rampe de distance : 100 jusqu'à `good`, 0 à partir de `bad`, linéaire entre les deux
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct DistanceRamp {
    /// Distance (m) en dessous de laquelle le score vaut 100
    pub good_m: f64,
    /// Distance (m) au-delà de laquelle le score vaut 0
    pub bad_m: f64,
}

impl DistanceRamp {
    pub const fn new(good_m: f64, bad_m: f64) -> Self {
        Self { good_m, bad_m }
    }
}

/// Paramètres de l'analyse spatiale
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// Tampon autour des routes pour la façade (m)
    pub road_buffer_m: f64,
    /// Façade minimale pour considérer que la parcelle touche la route (m)
    pub touch_threshold_m: f64,
    /// Côté de l'emprise carrée de référence (m)
    pub footprint_m: f64,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            road_buffer_m: 10.0,
            touch_threshold_m: 0.5,
            footprint_m: 10.0,
        }
    }
}

/// Paramètres de l'échantillonnage d'altitude
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DemConfig {
    /// Tampon autour de la parcelle pour la lowness relative (m)
    pub buffer_m: f64,
    /// Pas de la grille (m)
    pub step_m: f64,
    /// Nombre minimal de nœuds par axe
    pub min_nodes: usize,
}

impl Default for DemConfig {
    fn default() -> Self {
        Self {
            buffer_m: 200.0,
            step_m: 30.0,
            min_nodes: 5,
        }
    }
}

/// Heuristique de risque d'inondation
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FloodConfig {
    /// Lowness relative (m) en dessous de laquelle la cuvette compte
    pub lowness_threshold_m: f64,
    /// Profondeur de cuvette (m) donnant un risque de 1
    pub lowness_scale_m: f64,
    /// Rayon (m) de proximité à l'eau
    pub water_radius_m: f64,
    /// Poids maximal de la proximité à l'eau
    pub water_weight: f64,
}

impl Default for FloodConfig {
    fn default() -> Self {
        Self {
            lowness_threshold_m: -1.5,
            lowness_scale_m: 3.0,
            water_radius_m: 50.0,
            water_weight: 0.7,
        }
    }
}

/// Score de pente : 100 - min(100, |pente - optimum| × pénalité)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SlopeConfig {
    pub optimum_pct: f64,
    pub penalty_per_pct: f64,
}

impl Default for SlopeConfig {
    fn default() -> Self {
        Self {
            optimum_pct: 3.0,
            penalty_per_pct: 15.0,
        }
    }
}

/// Poids du score total, somme = 1
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Weights {
    pub access: f64,
    pub flood: f64,
    pub slope: f64,
    pub infra: f64,
    pub power: f64,
    /// Poids du bonus de contact avec la route
    pub road_touch: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            access: 0.25,
            flood: 0.20,
            slope: 0.20,
            infra: 0.15,
            power: 0.10,
            road_touch: 0.10,
        }
    }
}

impl Weights {
    pub fn sum(&self) -> f64 {
        self.access + self.flood + self.slope + self.infra + self.power + self.road_touch
    }
}

/// Configuration complète du moteur
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub spatial: SpatialConfig,
    pub dem: DemConfig,
    pub flood: FloodConfig,
    pub slope: SlopeConfig,
    /// Rampe d'accès routier
    pub access: DistanceRamp,
    /// Rampe de desserte en transports
    pub infra: DistanceRamp,
    /// Rampe de proximité du réseau électrique
    pub power: DistanceRamp,
    /// Score neutre quand aucune entité n'existe (distance inconnue)
    pub unknown_distance_score: f64,
    /// Valeur du facteur route quand la parcelle touche une route
    pub road_touch_bonus: f64,
    /// Valeur du facteur route sinon
    pub no_road_touch_bonus: f64,
    pub weights: Weights,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            spatial: SpatialConfig::default(),
            dem: DemConfig::default(),
            flood: FloodConfig::default(),
            slope: SlopeConfig::default(),
            access: DistanceRamp::new(300.0, 5000.0),
            infra: DistanceRamp::new(500.0, 4000.0),
            power: DistanceRamp::new(300.0, 5000.0),
            unknown_distance_score: 30.0,
            road_touch_bonus: 100.0,
            no_road_touch_bonus: 40.0,
            weights: Weights::default(),
        }
    }
}

impl ScoringConfig {
    /// Vérifie la cohérence de la configuration
    pub fn validate(&self) -> Result<(), LandscoreError> {
        let sum = self.weights.sum();
        if (sum - 1.0).abs() > 1e-9 {
            return Err(LandscoreError::invalid_config(format!(
                "weights must sum to 1.0, got {}",
                sum
            )));
        }

        let weights = [
            self.weights.access,
            self.weights.flood,
            self.weights.slope,
            self.weights.infra,
            self.weights.power,
            self.weights.road_touch,
        ];
        if weights.iter().any(|w| *w < 0.0) {
            return Err(LandscoreError::invalid_config("weights must be non-negative"));
        }

        for (name, ramp) in [
            ("access", &self.access),
            ("infra", &self.infra),
            ("power", &self.power),
        ] {
            if !(ramp.good_m >= 0.0 && ramp.good_m < ramp.bad_m) {
                return Err(LandscoreError::invalid_config(format!(
                    "{} ramp requires 0 <= good_m < bad_m (got {} / {})",
                    name, ramp.good_m, ramp.bad_m
                )));
            }
        }

        if !(self.dem.step_m > 0.0) {
            return Err(LandscoreError::invalid_config("dem.step_m must be > 0"));
        }
        if !(self.dem.buffer_m >= 0.0) {
            return Err(LandscoreError::invalid_config("dem.buffer_m must be >= 0"));
        }
        if self.dem.min_nodes < 2 {
            return Err(LandscoreError::invalid_config("dem.min_nodes must be >= 2"));
        }
        if !(self.spatial.road_buffer_m > 0.0) {
            return Err(LandscoreError::invalid_config(
                "spatial.road_buffer_m must be > 0",
            ));
        }
        if !(self.flood.lowness_scale_m > 0.0) {
            return Err(LandscoreError::invalid_config(
                "flood.lowness_scale_m must be > 0",
            ));
        }
        if !(self.flood.water_radius_m > 0.0) {
            return Err(LandscoreError::invalid_config(
                "flood.water_radius_m must be > 0",
            ));
        }

        for (name, value) in [
            ("unknown_distance_score", self.unknown_distance_score),
            ("road_touch_bonus", self.road_touch_bonus),
            ("no_road_touch_bonus", self.no_road_touch_bonus),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(LandscoreError::invalid_config(format!(
                    "{} must lie in [0, 100], got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ScoringConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.weights.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: ScoringConfig =
            serde_json::from_str(r#"{"dem": {"step_m": 15.0}, "unknown_distance_score": 20.0}"#)
                .unwrap();
        assert_eq!(config.dem.step_m, 15.0);
        assert_eq!(config.dem.buffer_m, 200.0);
        assert_eq!(config.unknown_distance_score, 20.0);
        assert_eq!(config.access, DistanceRamp::new(300.0, 5000.0));
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let mut config = ScoringConfig::default();
        config.weights.access = 0.30;
        assert!(matches!(
            config.validate(),
            Err(LandscoreError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_inverted_ramp_rejected() {
        let mut config = ScoringConfig::default();
        config.infra = DistanceRamp::new(4000.0, 500.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_step_rejected() {
        let mut config = ScoringConfig::default();
        config.dem.step_m = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fixed_scores_stay_in_range() {
        let setters: [fn(&mut ScoringConfig); 3] = [
            |c| c.unknown_distance_score = -1.0,
            |c| c.road_touch_bonus = 150.0,
            |c| c.no_road_touch_bonus = f64::NAN,
        ];
        for set in setters {
            let mut config = ScoringConfig::default();
            set(&mut config);
            assert!(matches!(
                config.validate(),
                Err(LandscoreError::InvalidConfig(_))
            ));
        }

        let mut config = ScoringConfig::default();
        config.road_touch_bonus = 100.0;
        config.no_road_touch_bonus = 0.0;
        assert!(config.validate().is_ok());
    }
}
