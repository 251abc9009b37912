//! Data models for GDAS processing
//!
//! This module contains the core data structures for representing site
//! metadata, raw GDAS profile tables, and evaluated/averaged atmospheric
//! profiles.

use crate::constants::{
    self, RAW_PROFILE_COLUMNS, RAW_PROFILE_COMMENT, RAW_PROFILE_ROWS,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

// =============================================================================
// Site Metadata Structure
// =============================================================================

/// Site metadata for one detector location
///
/// Sites come from an external registry keyed by site id; latitude and
/// longitude drive both the timezone resolution and the extraction tool.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Site {
    /// Unique site identifier - primary key for registry lookups
    pub site_id: u32,

    /// Human-readable site name, when the registry provides one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Latitude in WGS84 decimal degrees
    pub latitude: f64,

    /// Longitude in WGS84 decimal degrees
    pub longitude: f64,
}

impl Site {
    /// Create a new Site with validation
    pub fn new(site_id: u32, name: Option<String>, latitude: f64, longitude: f64) -> Result<Self> {
        let site = Self {
            site_id,
            name,
            latitude,
            longitude,
        };

        site.validate()?;
        Ok(site)
    }

    /// Validate site data for consistency and valid ranges
    pub fn validate(&self) -> Result<()> {
        if self.site_id == 0 {
            return Err(Error::data_validation(
                "Site id must be a positive integer".to_string(),
            ));
        }

        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(Error::data_validation(format!(
                "Invalid latitude {}: must be between -90 and 90 degrees",
                self.latitude
            )));
        }

        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(Error::data_validation(format!(
                "Invalid longitude {}: must be between -180 and 180 degrees",
                self.longitude
            )));
        }

        Ok(())
    }

    /// Get site location as (latitude, longitude) tuple
    pub fn location(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

// =============================================================================
// Raw Profile Table Structure
// =============================================================================

/// Raw 4x5 atmospheric parameter table produced by the extraction tool for
/// one site and timestamp
///
/// Row 0 holds layer boundary altitudes in cm; rows 1-3 hold the layer
/// coefficients a, b and c of the piecewise model. Columns 0-3 describe the
/// exponential layers, column 4 the linear top layer. The table is read
/// fresh from disk for each timestamp and discarded after evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawProfileTable {
    rows: [[f64; RAW_PROFILE_COLUMNS]; RAW_PROFILE_ROWS],
}

impl RawProfileTable {
    /// Create a table from its four rows, validating the layer ordering
    pub fn new(rows: [[f64; RAW_PROFILE_COLUMNS]; RAW_PROFILE_ROWS]) -> Result<Self> {
        // Boundaries of the exponential layers must be in increasing
        // altitude order for the first-match layer scan to be meaningful
        for layer in 1..RAW_PROFILE_COLUMNS - 1 {
            if rows[0][layer] < rows[0][layer - 1] {
                return Err(Error::data_validation(format!(
                    "Layer boundaries out of order: {} cm at layer {} below {} cm at layer {}",
                    rows[0][layer],
                    layer,
                    rows[0][layer - 1],
                    layer - 1
                )));
            }
        }

        Ok(Self { rows })
    }

    /// Load a table from the first four non-comment rows of a raw profile
    /// file. Lines starting with `#` and blank lines are skipped; any rows
    /// beyond the fourth are ignored.
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| Error::io(format!("failed to open {}", path.display()), e))?;
        Self::from_reader(BufReader::new(file), &path.display().to_string())
    }

    /// Parse a table from any buffered reader; `label` names the source in
    /// error messages.
    pub fn from_reader<R: BufRead>(reader: R, label: &str) -> Result<Self> {
        let mut rows = [[0.0; RAW_PROFILE_COLUMNS]; RAW_PROFILE_ROWS];
        let mut row = 0;

        for line in reader.lines() {
            let line = line.map_err(|e| Error::io(format!("failed to read {}", label), e))?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with(RAW_PROFILE_COMMENT) {
                continue;
            }

            let fields: Vec<&str> = trimmed.split_whitespace().collect();
            if fields.len() < RAW_PROFILE_COLUMNS {
                return Err(Error::profile_format(
                    label,
                    format!(
                        "expected {} columns in row {}, found {}",
                        RAW_PROFILE_COLUMNS,
                        row,
                        fields.len()
                    ),
                ));
            }

            for (column, field) in fields.iter().take(RAW_PROFILE_COLUMNS).enumerate() {
                rows[row][column] = field.parse().map_err(|_| {
                    Error::profile_format(
                        label,
                        format!("invalid numeric value '{}' in row {}", field, row),
                    )
                })?;
            }

            row += 1;
            if row == RAW_PROFILE_ROWS {
                break;
            }
        }

        if row < RAW_PROFILE_ROWS {
            return Err(Error::profile_format(
                label,
                format!("expected {} data rows, found {}", RAW_PROFILE_ROWS, row),
            ));
        }

        Self::new(rows)
    }

    /// Boundary altitude of a layer in cm (row 0)
    pub fn boundary(&self, layer: usize) -> f64 {
        self.rows[0][layer]
    }

    /// Depth offset coefficient a of a layer, in g/cm^2 (row 1)
    pub fn a(&self, layer: usize) -> f64 {
        self.rows[1][layer]
    }

    /// Depth scale coefficient b of a layer, in g/cm^2 (row 2)
    pub fn b(&self, layer: usize) -> f64 {
        self.rows[2][layer]
    }

    /// Scale height coefficient c of a layer, in cm (row 3)
    pub fn c(&self, layer: usize) -> f64 {
        self.rows[3][layer]
    }
}

// =============================================================================
// Evaluated and Averaged Profiles
// =============================================================================

/// One raw table evaluated at every grid altitude
///
/// Produced by the profile model and immediately folded into the running
/// monthly accumulation; the three sequences are parallel to the altitude
/// grid.
#[derive(Debug, Clone)]
pub struct EvaluatedProfile {
    /// Density at each grid altitude, g/cm^3
    pub density: Vec<f64>,

    /// Vertical atmospheric depth at each grid altitude, g/cm^2
    pub depth: Vec<f64>,

    /// Refractive index minus one at each grid altitude
    pub refractivity: Vec<f64>,
}

/// Monthly averaged atmospheric model for one site
///
/// The flush result of a site-month accumulation: per-altitude mean density,
/// depth and refractivity, already sanitized (negative means clamped, depth
/// forced to zero at the top of the grid). Serialized immediately and not
/// retained in memory.
#[derive(Debug, Clone)]
pub struct AveragedProfile {
    /// Site this model belongs to
    pub site_id: u32,

    /// Calendar year of the averaged month
    pub year: i32,

    /// Calendar month (1-12)
    pub month: u32,

    /// Grid altitudes in km
    pub altitudes_km: Vec<f64>,

    /// Mean density at each grid altitude, g/cm^3
    pub density: Vec<f64>,

    /// Mean vertical depth at each grid altitude, g/cm^2
    pub depth: Vec<f64>,

    /// Mean refractive index minus one at each grid altitude
    pub refractivity: Vec<f64>,
}

impl AveragedProfile {
    /// Model identifier used in the output header and filename
    pub fn model_id(&self) -> String {
        constants::model_id(self.site_id, self.year, self.month)
    }

    /// Output filename for this model
    pub fn file_name(&self) -> String {
        constants::averaged_profile_filename(self.site_id, self.year, self.month)
    }
}
