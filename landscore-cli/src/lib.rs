//! # landscore-cli
//!
//! Scoring de parcelles en ligne de commande, à partir de fichiers déjà produits
//! par les collaborateurs externes (parcelle GeoJSON, réponse Overpass, grille d'altitude).
//!
//! ## Usage CLI
//!
//! ```bash
//! # Une parcelle
//! landscore score --parcel lot.geojson --features overpass.json --dem srtm.asc
//!
//! # Plusieurs fichiers en parallèle, rapport JSON
//! landscore batch "lots/*.geojson" --features overpass.json --report report.json
//!
//! # Carré de 10 sotok autour d'un point
//! landscore square --lat 55.75 --lon 37.6 --sotok 10
//!
//! # Emprise élargie pour la requête Overpass
//! landscore bbox --parcel lot.geojson --meters 2000
//! ```

pub mod config;
pub mod dem_grid;
pub mod input;
pub mod report;

pub use dem_grid::AsciiGrid;
pub use input::ParcelInput;
pub use report::{BatchReport, BatchStatus};
