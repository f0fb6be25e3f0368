//! Chargement de la configuration de scoring
//!
//! Deux sources : un preset embarqué (`default`, `strict`) ou un fichier JSON.
//! Les champs absents gardent leur valeur par défaut.

use std::path::Path;

use anyhow::{Context, Result};
use landscore::ScoringConfig;

/// Noms des presets embarqués
pub const PRESETS: &[&str] = &["default", "strict"];

/// Charge une configuration depuis un fichier
pub fn load(path: &Path) -> Result<ScoringConfig> {
    let content = std::fs::read_to_string(path)
        .context(format!("Failed to read config file: {}", path.display()))?;

    let config: ScoringConfig =
        serde_json::from_str(&content).context("Failed to parse config JSON")?;
    config
        .validate()
        .with_context(|| format!("Invalid config file: {}", path.display()))?;
    Ok(config)
}

/// Charge une configuration depuis un preset embarqué
pub fn from_preset(preset: &str) -> Result<ScoringConfig> {
    match preset {
        "default" => load_embedded(include_str!("presets/default.json")),
        "strict" => load_embedded(include_str!("presets/strict.json")),
        _ => anyhow::bail!("Unknown preset: {}. Use: {}", preset, PRESETS.join(", ")),
    }
}

/// Preset si le nom est connu, sinon chemin vers un fichier JSON
pub fn resolve(spec: &str) -> Result<ScoringConfig> {
    if PRESETS.contains(&spec) {
        from_preset(spec)
    } else {
        load(Path::new(spec))
    }
}

fn load_embedded(json: &str) -> Result<ScoringConfig> {
    let config: ScoringConfig =
        serde_json::from_str(json).context("Failed to parse embedded config")?;
    config.validate().context("Invalid embedded config")?;
    Ok(config)
}
