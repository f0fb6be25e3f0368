//! Définition et implémentation des commandes CLI
//!
//! - `score`  : une parcelle → résumé ou fiche JSON
//! - `batch`  : plusieurs fichiers de parcelles → rapport de lot
//! - `square` : point + surface en sotok → carré GeoJSON
//! - `bbox`   : emprise élargie d'une parcelle (pour la requête Overpass)

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use landscore::{
    compute_metrics, compute_metrics_classified, expand_bbox, render_summary,
    square_from_point_area, ElevationLookup, FeatureSets, Markup, NoElevation, RawCollection,
};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use landscore_cli::config;
use landscore_cli::dem_grid::AsciiGrid;
use landscore_cli::input::{self, ParcelInput};
use landscore_cli::report::{BatchReport, ParcelResult};

/// Délai par défaut d'un calcul de parcelle
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Subcommand)]
pub enum Commands {
    /// Score a single parcel
    Score {
        /// GeoJSON file with the parcel (Polygon / MultiPolygon, Feature or FeatureCollection)
        #[arg(short, long)]
        parcel: PathBuf,

        /// Overpass JSON response with the surrounding features
        #[arg(short, long)]
        features: Option<PathBuf>,

        /// ESRI ASCII elevation grid (WGS84)
        #[arg(long)]
        dem: Option<PathBuf>,

        /// Config preset name (default/strict) or path to a JSON config
        #[arg(long, default_value = "default")]
        config: String,

        /// Location label shown in the summary (default: parcel name property)
        #[arg(long)]
        location: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Score every parcel of one or more GeoJSON files
    Batch {
        /// Parcel files or glob patterns (e.g. "parcels/*.geojson")
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Overpass JSON response covering all parcels
        #[arg(short, long)]
        features: Option<PathBuf>,

        /// ESRI ASCII elevation grid (WGS84)
        #[arg(long)]
        dem: Option<PathBuf>,

        /// Config preset name (default/strict) or path to a JSON config
        #[arg(long, default_value = "default")]
        config: String,

        /// Write the JSON report to this file
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Number of parallel workers
        #[arg(long, alias = "threads")]
        jobs: Option<usize>,
    },

    /// Build a square parcel of a given area around a point
    Square {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Area in sotok (1 sotka = 100 m²), "10" or "10,5"
        #[arg(long, value_parser = parse_sotok)]
        sotok: f64,

        /// Output GeoJSON file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the parcel bounding box expanded by a distance
    Bbox {
        #[arg(short, long)]
        parcel: PathBuf,

        /// Expansion in meters
        #[arg(long, default_value_t = 2000.0)]
        meters: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Short summary, plain text
    Text,
    /// Short summary with HTML bold total
    Html,
    /// Full metric record
    Json,
}

/// Accepte la virgule décimale ("10,5")
pub fn parse_sotok(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| format!("not a number: {}", raw))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("area must be positive, got {}", raw))
    }
}

/// Délai de calcul : `LANDSCORE_TIMEOUT_SECS` ou 60 s
fn engine_timeout() -> Duration {
    let secs = std::env::var("LANDSCORE_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|&s: &u64| s > 0)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

fn load_features(path: Option<&Path>) -> Result<RawCollection> {
    match path {
        Some(path) => input::load_features(path),
        None => {
            warn!("No features file given, all distances will be unknown");
            Ok(RawCollection::default())
        }
    }
}

/// Source d'altitude chargée une fois, partagée entre les calculs
fn load_elevation(path: Option<&Path>) -> Result<Arc<dyn ElevationLookup>> {
    match path {
        Some(path) => Ok(Arc::new(AsciiGrid::load(path)?)),
        None => {
            warn!("No elevation grid given, relief statistics will fall back to 0 m");
            Ok(Arc::new(NoElevation))
        }
    }
}

/// Exécute la commande score
pub async fn cmd_score(
    parcel_path: &Path,
    features_path: Option<&Path>,
    dem_path: Option<&Path>,
    config_spec: &str,
    location: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let config = config::resolve(config_spec)?;
    let input = input::load_parcel(parcel_path)?;
    let id = input.id();
    let ParcelInput {
        source,
        label,
        parcel,
        ..
    } = input;
    let features = load_features(features_path)?;
    let elevation = load_elevation(dem_path)?;

    let timeout = engine_timeout();
    let started = Instant::now();

    let task = tokio::task::spawn_blocking(move || {
        compute_metrics(&parcel, &features, elevation.as_ref(), &config)
    });
    let record = tokio::time::timeout(timeout, task)
        .await
        .map_err(|_| anyhow::anyhow!("Scoring timed out after {}s", timeout.as_secs()))?
        .context("Scoring task failed")?
        .with_context(|| format!("Failed to score {}", source.display()))?;

    debug!(elapsed_ms = started.elapsed().as_millis() as u64, "Parcel scored");

    let label = location.or(label);
    match format {
        OutputFormat::Text | OutputFormat::Html => {
            let markup = if format == OutputFormat::Html {
                Markup::Html
            } else {
                Markup::Plain
            };
            println!(
                "{}",
                render_summary(&record, label.as_deref().unwrap_or(""), markup)
            );
        }
        OutputFormat::Json => {
            let result = ParcelResult {
                id,
                label,
                record,
            };
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

/// Exécute la commande batch
pub async fn cmd_batch(
    patterns: &[String],
    features_path: Option<&Path>,
    dem_path: Option<&Path>,
    config_spec: &str,
    report_path: Option<&Path>,
    jobs: Option<usize>,
) -> Result<()> {
    let started = Instant::now();
    let config = config::resolve(config_spec)?;

    let files = input::expand_patterns(patterns)?;
    if files.is_empty() {
        anyhow::bail!("No parcel file matched {}", patterns.join(" "));
    }

    let jobs = jobs.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    });

    println!("=== Batch scoring ===");
    println!("Files: {}", files.len());
    println!("Config: {}", config_spec);
    println!("Jobs: {}", jobs);

    let mut report = BatchReport::new(config_spec);
    let mut parcels = Vec::new();
    for file in &files {
        match input::load_parcels(file) {
            Ok(loaded) => {
                report.record_file_success();
                parcels.extend(loaded);
            }
            Err(e) => {
                warn!("Failed to read {}: {:#}", file.display(), e);
                report.record_file_failure(&file.display().to_string(), &format!("{:#}", e));
            }
        }
    }

    // Classement fait une seule fois pour tout le lot
    let sets = FeatureSets::from_collection(&load_features(features_path)?);
    let elevation = load_elevation(dem_path)?;

    info!(parcels = parcels.len(), jobs, "Scoring parcels");

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .context("Failed to build worker pool")?;

    let outcomes = tokio::task::spawn_blocking(move || {
        pool.install(|| {
            parcels
                .into_par_iter()
                .map(|input| {
                    let outcome = compute_metrics_classified(
                        &input.parcel,
                        &sets,
                        elevation.as_ref(),
                        &config,
                    );
                    (input, outcome)
                })
                .collect::<Vec<_>>()
        })
    })
    .await
    .context("Batch task failed")?;

    for (input, outcome) in outcomes {
        let id = input.id();
        match outcome {
            Ok(record) => report.record_result(ParcelResult {
                id,
                label: input.label,
                record,
            }),
            Err(e) => {
                warn!(parcel = id.as_str(), error = %e, "Parcel failed");
                report.record_parcel_error(&id, &e.to_string());
            }
        }
    }

    report.set_duration(started.elapsed());
    report.finalize();
    report.display();

    if let Some(path) = report_path {
        report
            .save_to_file(path)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        println!("Report written to {}", path.display());
    }

    info!("{}", report.summary());

    if report.parcels_scored == 0 {
        anyhow::bail!("No parcel could be scored");
    }
    Ok(())
}

/// Exécute la commande square
pub fn cmd_square(lat: f64, lon: f64, sotok: f64, output: Option<&Path>) -> Result<()> {
    let parcel = square_from_point_area(lat, lon, sotok)?;

    let mut properties = serde_json::Map::new();
    properties.insert("sotok".to_string(), sotok.into());
    properties.insert("area_m2".to_string(), (sotok * 100.0).into());
    properties.insert("center".to_string(), serde_json::json!([lon, lat]));

    let feature = geojson::Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::from(
            parcel.geometry(),
        ))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    };
    let json = geojson::GeoJson::Feature(feature).to_string();

    match output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), sotok, "Square written");
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Exécute la commande bbox
pub fn cmd_bbox(parcel_path: &Path, meters: f64) -> Result<()> {
    if !(meters.is_finite() && meters >= 0.0) {
        anyhow::bail!("Expansion must be a non-negative distance, got {}", meters);
    }
    let input = input::load_parcel(parcel_path)?;
    let bbox = expand_bbox(input.parcel.bbox()?, meters);

    println!(
        "bbox: {:.6},{:.6},{:.6},{:.6}",
        bbox.min_lon, bbox.min_lat, bbox.max_lon, bbox.max_lat
    );
    // Ordre Overpass : sud, ouest, nord, est
    println!(
        "overpass: ({:.6},{:.6},{:.6},{:.6})",
        bbox.min_lat, bbox.min_lon, bbox.max_lat, bbox.max_lon
    );
    Ok(())
}
