//! Grille d'altitude ESRI ASCII (`.asc`) en WGS84
//!
//! ```text
//! ncols        4
//! nrows        3
//! xllcorner    37.5
//! yllcorner    55.7
//! cellsize     0.000833
//! NODATA_value -9999
//! 120 121 122 123
//! ...
//! ```
//!
//! Les lignes vont du nord au sud. L'altitude d'un point est celle de la
//! cellule qui le contient (pas d'interpolation).

use std::path::Path;

use anyhow::{Context, Result};
use landscore::ElevationLookup;
use thiserror::Error;
use tracing::info;

/// Erreurs de lecture d'une grille ASCII
#[derive(Debug, Error)]
pub enum GridError {
    #[error("Missing header field: {0}")]
    MissingHeader(&'static str),

    #[error("Invalid value for {field}: {value}")]
    InvalidHeader { field: String, value: String },

    #[error("Invalid cell value at row {row}: {value}")]
    InvalidCell { row: usize, value: String },

    #[error("Expected {expected} cells, found {found}")]
    CellCount { expected: usize, found: usize },
}

/// Grille chargée en mémoire, partagée en lecture seule entre les calculs
#[derive(Debug, Clone)]
pub struct AsciiGrid {
    ncols: usize,
    nrows: usize,
    /// Longitude du bord ouest
    west: f64,
    /// Latitude du bord sud
    south: f64,
    cellsize: f64,
    nodata: Option<f64>,
    /// Valeurs ligne par ligne, du nord au sud
    values: Vec<f64>,
}

impl AsciiGrid {
    /// Charge une grille depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read elevation grid: {}", path.display()))?;
        let grid = Self::parse(&content)
            .with_context(|| format!("Invalid elevation grid: {}", path.display()))?;
        info!(
            path = %path.display(),
            ncols = grid.ncols,
            nrows = grid.nrows,
            cellsize = grid.cellsize,
            "Elevation grid loaded"
        );
        Ok(grid)
    }

    pub fn parse(content: &str) -> Result<Self, GridError> {
        let mut ncols = None;
        let mut nrows = None;
        let mut xll = None;
        let mut yll = None;
        let mut centered = false;
        let mut cellsize = None;
        let mut nodata = None;

        let mut lines = content.lines().filter(|l| !l.trim().is_empty()).peekable();

        // En-tête : lignes "clé valeur" tant que la clé n'est pas numérique
        while let Some(&line) = lines.peek() {
            let mut parts = line.split_whitespace();
            let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
                break;
            };
            if key.parse::<f64>().is_ok() {
                break;
            }
            let key = key.to_ascii_lowercase();
            let invalid = |field: &str| GridError::InvalidHeader {
                field: field.to_string(),
                value: value.to_string(),
            };
            let number = |field: &str| value.parse::<f64>().map_err(|_| invalid(field));
            // Dimensions : entier strictement positif, sans exposant ni décimale
            let count = |field: &str| match value.parse::<usize>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(invalid(field)),
            };
            match key.as_str() {
                "ncols" => ncols = Some(count("ncols")?),
                "nrows" => nrows = Some(count("nrows")?),
                "xllcorner" => xll = Some(number("xllcorner")?),
                "yllcorner" => yll = Some(number("yllcorner")?),
                "xllcenter" => {
                    xll = Some(number("xllcenter")?);
                    centered = true;
                }
                "yllcenter" => {
                    yll = Some(number("yllcenter")?);
                    centered = true;
                }
                "cellsize" => cellsize = Some(number("cellsize")?),
                "nodata_value" => nodata = Some(number("nodata_value")?),
                _ => return Err(invalid(key.as_str())),
            }
            lines.next();
        }

        let ncols = ncols.ok_or(GridError::MissingHeader("ncols"))?;
        let nrows = nrows.ok_or(GridError::MissingHeader("nrows"))?;
        let mut west = xll.ok_or(GridError::MissingHeader("xllcorner"))?;
        let mut south = yll.ok_or(GridError::MissingHeader("yllcorner"))?;
        let cellsize = cellsize.ok_or(GridError::MissingHeader("cellsize"))?;
        if !(cellsize > 0.0) {
            return Err(GridError::InvalidHeader {
                field: "cellsize".to_string(),
                value: cellsize.to_string(),
            });
        }
        if centered {
            west -= cellsize / 2.0;
            south -= cellsize / 2.0;
        }

        let expected = ncols
            .checked_mul(nrows)
            .ok_or_else(|| GridError::InvalidHeader {
                field: "ncols × nrows".to_string(),
                value: format!("{} × {}", ncols, nrows),
            })?;

        let mut values = Vec::new();
        for (row, line) in lines.enumerate() {
            for token in line.split_whitespace() {
                let v = token.parse::<f64>().map_err(|_| GridError::InvalidCell {
                    row,
                    value: token.to_string(),
                })?;
                values.push(v);
            }
        }
        if values.len() != expected {
            return Err(GridError::CellCount {
                expected,
                found: values.len(),
            });
        }

        Ok(Self {
            ncols,
            nrows,
            west,
            south,
            cellsize,
            nodata,
            values,
        })
    }

    /// Altitude de la cellule contenant (lat, lon), `None` hors grille ou NODATA
    pub fn sample(&self, lat: f64, lon: f64) -> Option<f64> {
        let col = ((lon - self.west) / self.cellsize).floor();
        let row_from_south = ((lat - self.south) / self.cellsize).floor();
        if !(col >= 0.0 && row_from_south >= 0.0) {
            return None;
        }
        let (col, row_from_south) = (col as usize, row_from_south as usize);
        if col >= self.ncols || row_from_south >= self.nrows {
            return None;
        }
        let row = self.nrows - 1 - row_from_south;
        let v = self.values[row * self.ncols + col];
        match self.nodata {
            Some(nodata) if v == nodata => None,
            _ => Some(v),
        }
    }
}

impl ElevationLookup for AsciiGrid {
    fn elevation(&self, lat: f64, lon: f64) -> Option<f64> {
        self.sample(lat, lon)
    }
}
