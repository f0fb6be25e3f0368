//! Point d'entrée CLI pour landscore

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    // Chercher .env dans le répertoire courant ou parent
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::Commands;

/// Scoring d'aptitude de parcelles foncières
#[derive(Parser)]
#[command(name = "landscore")]
#[command(author, version)]
#[command(about = "Score land parcels from GeoJSON, Overpass JSON and an elevation grid")]
#[command(long_about = "Calcule surface, distances, façade sur route, relief et un score 0-100 pour des parcelles.\n\nAucun accès réseau : les entités OSM et l'altitude sont lues depuis des fichiers.")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Score {
            parcel,
            features,
            dem,
            config,
            location,
            format,
        } => {
            info!(parcel = %parcel.display(), config = config.as_str(), "Scoring parcel");
            cli::cmd_score(
                &parcel,
                features.as_deref(),
                dem.as_deref(),
                &config,
                location,
                format,
            )
            .await?;
        }
        Commands::Batch {
            inputs,
            features,
            dem,
            config,
            report,
            jobs,
        } => {
            info!(inputs = inputs.len(), config = config.as_str(), "Batch scoring");
            cli::cmd_batch(
                &inputs,
                features.as_deref(),
                dem.as_deref(),
                &config,
                report.as_deref(),
                jobs,
            )
            .await?;
        }
        Commands::Square {
            lat,
            lon,
            sotok,
            output,
        } => {
            cli::cmd_square(lat, lon, sotok, output.as_deref())?;
        }
        Commands::Bbox { parcel, meters } => {
            cli::cmd_bbox(&parcel, meters)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // Logs sur stderr : stdout reste réservé aux résultats (JSON, GeoJSON)
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
