//! Sous-scores et score total
//!
//! Chaque sous-score est dans [0, 100]. Une distance inconnue (aucune entité
//! de la classe) vaut `unknown_distance_score`, pas 0 : l'absence de données
//! OSM n'est pas une preuve d'éloignement.

use crate::config::{DistanceRamp, FloodConfig, ScoringConfig, SlopeConfig};
use crate::types::Score;

/// Mesures dont dépend le score
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreInputs {
    pub d_road_m: Option<f64>,
    pub d_water_m: Option<f64>,
    pub d_power_m: Option<f64>,
    pub d_stop_m: Option<f64>,
    pub touches_road: bool,
    pub slope_pct: f64,
    pub rel_lowness_m: f64,
}

/// Rampe de distance : 100 jusqu'à `good_m`, 0 à partir de `bad_m`
pub fn ramp(distance: Option<f64>, ramp: &DistanceRamp, unknown: f64) -> f64 {
    let Some(d) = distance else {
        return unknown;
    };
    if d <= ramp.good_m {
        100.0
    } else if d >= ramp.bad_m {
        0.0
    } else {
        100.0 * (ramp.bad_m - d) / (ramp.bad_m - ramp.good_m)
    }
}

/// 100 à l'optimum, décroissance linéaire de part et d'autre
pub fn slope_score(slope_pct: f64, config: &SlopeConfig) -> f64 {
    let penalty = (slope_pct - config.optimum_pct).abs() * config.penalty_per_pct;
    (100.0 - penalty.min(100.0)).max(0.0)
}

/// Risque d'inondation indicatif dans [0, 1]
///
/// Somme d'un terme de cuvette (lowness sous le seuil) et d'un terme de
/// proximité à l'eau (linéaire sur `water_radius_m`).
pub fn flood_risk(rel_lowness_m: f64, d_water_m: Option<f64>, config: &FloodConfig) -> f64 {
    let mut risk = 0.0;
    if rel_lowness_m < config.lowness_threshold_m {
        risk += (rel_lowness_m.abs() / config.lowness_scale_m).min(1.0);
    }
    if let Some(d) = d_water_m {
        let r = config.water_radius_m;
        risk += ((r - d.min(r)) / r).max(0.0) * config.water_weight;
    }
    risk.clamp(0.0, 1.0)
}

pub fn flood_score(risk: f64) -> f64 {
    100.0 - (risk * 100.0).round()
}

/// Calcule les sous-scores et le total pondéré
pub fn compute_score(inputs: &ScoreInputs, config: &ScoringConfig) -> Score {
    let unknown = config.unknown_distance_score;

    let access = ramp(inputs.d_road_m, &config.access, unknown);
    let slope = slope_score(inputs.slope_pct, &config.slope);
    let flood = flood_score(flood_risk(
        inputs.rel_lowness_m,
        inputs.d_water_m,
        &config.flood,
    ));
    let infra = ramp(inputs.d_stop_m, &config.infra, unknown);
    let power = ramp(inputs.d_power_m, &config.power, unknown);
    let road_factor = if inputs.touches_road {
        config.road_touch_bonus
    } else {
        config.no_road_touch_bonus
    };

    let w = &config.weights;
    let weighted = w.access * access
        + w.flood * flood
        + w.slope * slope
        + w.infra * infra
        + w.power * power
        + w.road_touch * road_factor;

    Score {
        access,
        flood,
        slope,
        infra,
        power,
        total: weighted.round().clamp(0.0, 100.0) as u32,
    }
}
