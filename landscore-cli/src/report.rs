//! Rapport de scoring par lot
//!
//! Les erreurs d'une parcelle ou d'un fichier n'interrompent pas le lot :
//! elles sont collectées ici puis affichées et sauvegardées en JSON.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use landscore::{ElevationSource, MetricRecord};
use serde::Serialize;

/// Statut global du lot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BatchStatus {
    /// Toutes les parcelles ont été évaluées
    Success,
    /// Certaines parcelles ou fichiers ont échoué
    PartialSuccess,
    /// Aucune parcelle évaluée
    Failed,
}

/// Niveau de sévérité des erreurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorLevel {
    /// Fichier illisible : toutes ses parcelles sont perdues
    Fatal,
    /// Parcelle non évaluée
    Error,
}

/// Erreur de lot avec contexte
#[derive(Debug, Clone, Serialize)]
pub struct BatchError {
    pub level: ErrorLevel,
    /// Fichier source (optionnel)
    pub file: Option<String>,
    /// Identifiant de la parcelle (optionnel)
    pub parcel_id: Option<String>,
    pub message: String,
}

/// Avertissement : parcelle évaluée avec une donnée dégradée
#[derive(Debug, Clone, Serialize)]
pub struct BatchWarning {
    pub parcel_id: String,
    pub message: String,
}

/// Parcelle évaluée
#[derive(Debug, Clone, Serialize)]
pub struct ParcelResult {
    pub id: String,
    pub label: Option<String>,
    pub record: MetricRecord,
}

/// Classe de score, pour le résumé
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    /// 0..=39
    Low,
    /// 40..=69
    Medium,
    /// 70..=100
    High,
}

impl ScoreBand {
    pub fn of(total: u32) -> Self {
        match total {
            0..=39 => Self::Low,
            40..=69 => Self::Medium,
            _ => Self::High,
        }
    }
}

/// Rapport complet du lot
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Configuration utilisée (preset ou chemin)
    pub config: String,
    pub duration_secs: f64,
    pub status: BatchStatus,

    pub files_processed: usize,
    pub files_failed: usize,
    pub parcels_scored: usize,
    pub parcels_failed: usize,

    /// Nombre de parcelles par classe de score
    pub by_band: BTreeMap<ScoreBand, usize>,

    pub results: Vec<ParcelResult>,
    pub errors: Vec<BatchError>,
    pub warnings: Vec<BatchWarning>,
}

impl BatchReport {
    pub fn new(config: &str) -> Self {
        Self {
            config: config.to_string(),
            duration_secs: 0.0,
            status: BatchStatus::Success,
            files_processed: 0,
            files_failed: 0,
            parcels_scored: 0,
            parcels_failed: 0,
            by_band: BTreeMap::new(),
            results: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Enregistre une parcelle évaluée ; un repli d'altitude devient un avertissement
    pub fn record_result(&mut self, result: ParcelResult) {
        match result.record.dem.source {
            ElevationSource::Grid => {}
            ElevationSource::Centroid => self.warnings.push(BatchWarning {
                parcel_id: result.id.clone(),
                message: "no elevation inside parcel, centroid used".to_string(),
            }),
            ElevationSource::Missing => self.warnings.push(BatchWarning {
                parcel_id: result.id.clone(),
                message: "no elevation available, 0 m assumed".to_string(),
            }),
        }
        self.parcels_scored += 1;
        *self
            .by_band
            .entry(ScoreBand::of(result.record.score.total))
            .or_default() += 1;
        self.results.push(result);
    }

    /// Enregistre une parcelle en échec
    pub fn record_parcel_error(&mut self, parcel_id: &str, message: &str) {
        self.parcels_failed += 1;
        self.errors.push(BatchError {
            level: ErrorLevel::Error,
            file: None,
            parcel_id: Some(parcel_id.to_string()),
            message: message.to_string(),
        });
    }

    /// Enregistre un fichier lu avec succès
    pub fn record_file_success(&mut self) {
        self.files_processed += 1;
    }

    /// Enregistre un fichier illisible
    pub fn record_file_failure(&mut self, file: &str, message: &str) {
        self.files_processed += 1;
        self.files_failed += 1;
        self.errors.push(BatchError {
            level: ErrorLevel::Fatal,
            file: Some(file.to_string()),
            parcel_id: None,
            message: message.to_string(),
        });
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Trie les résultats et détermine le statut final
    pub fn finalize(&mut self) {
        self.results.sort_by(|a, b| {
            b.record
                .score
                .total
                .cmp(&a.record.score.total)
                .then_with(|| a.id.cmp(&b.id))
        });

        self.status = if self.parcels_scored == 0 {
            BatchStatus::Failed
        } else if self.errors.is_empty() {
            BatchStatus::Success
        } else {
            BatchStatus::PartialSuccess
        };
    }

    /// Score total moyen des parcelles évaluées
    pub fn mean_score(&self) -> Option<f64> {
        if self.results.is_empty() {
            return None;
        }
        let sum: u32 = self.results.iter().map(|r| r.record.score.total).sum();
        Some(sum as f64 / self.results.len() as f64)
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("BATCH REPORT - Config {}", self.config);
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);

        println!("\n--- SUMMARY ---");
        println!(
            "Files: {} processed, {} failed",
            self.files_processed, self.files_failed
        );
        println!(
            "Parcels: {} scored, {} failed",
            self.parcels_scored, self.parcels_failed
        );
        if let Some(mean) = self.mean_score() {
            println!("Mean score: {:.1}", mean);
        }

        if !self.by_band.is_empty() {
            println!("\n--- BY SCORE ---");
            for (band, count) in &self.by_band {
                println!("  {:?}: {}", band, count);
            }
        }

        if !self.results.is_empty() {
            println!("\n--- TOP PARCELS ---");
            for r in self.results.iter().take(10) {
                println!(
                    "  {:>3}/100  {}  {:.2} ha  {}",
                    r.record.score.total,
                    r.id,
                    r.record.area_ha,
                    r.label.as_deref().unwrap_or("")
                );
            }
        }

        if !self.warnings.is_empty() {
            println!("\n--- WARNINGS ({}) ---", self.warnings.len());
            for w in self.warnings.iter().take(10) {
                println!("  [{}] {}", w.parcel_id, w.message);
            }
            if self.warnings.len() > 10 {
                println!("  ... and {} more", self.warnings.len() - 10);
            }
        }

        if !self.errors.is_empty() {
            println!("\n--- ERRORS ({}) ---", self.errors.len());
            for e in self.errors.iter().take(20) {
                let location = match (&e.file, &e.parcel_id) {
                    (Some(f), Some(id)) => format!("[{}:{}]", f, id),
                    (Some(f), None) => format!("[{}]", f),
                    (None, Some(id)) => format!("[{}]", id),
                    _ => String::new(),
                };
                println!("  {:?} {} {}", e.level, location, e.message);
            }
            if self.errors.len() > 20 {
                println!("  ... and {} more", self.errors.len() - 20);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{} parcels scored, {} failed, {} warnings",
            self.parcels_scored,
            self.parcels_failed,
            self.warnings.len()
        )
    }
}
