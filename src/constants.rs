//! Application constants for GDAS processor
//!
//! This module contains the fixed altitude grid, physical and formatting
//! constants, default values, and filename conventions used throughout the
//! GDAS processor application.

// =============================================================================
// Altitude Grid
// =============================================================================

/// Number of grid altitudes in the averaged model (matches the CORSIKA
/// external atmosphere table length)
pub const GRID_POINTS: usize = 50;

/// Conversion factor from grid kilometers to model centimeters
pub const KM_TO_CM: f64 = 1.0e5;

/// Build the fixed altitude grid in kilometers: 0..24 km every 1 km,
/// 25..47.5 km every 2.5 km, 50..120 km every 5 km (50 points total).
///
/// The grid is identical for every site and run and strictly increasing.
pub fn altitude_grid_km() -> Vec<f64> {
    let mut grid = Vec::with_capacity(GRID_POINTS);
    for step in 0..25 {
        grid.push(f64::from(step));
    }
    for step in 0..10 {
        grid.push(25.0 + 2.5 * f64::from(step));
    }
    for step in 0..15 {
        grid.push(50.0 + 5.0 * f64::from(step));
    }
    grid
}

// =============================================================================
// Raw Profile Tables
// =============================================================================

/// Rows consumed from each raw profile file (boundary altitudes plus the
/// three layer coefficient rows)
pub const RAW_PROFILE_ROWS: usize = 4;

/// Columns per raw profile row (four exponential layers plus the top layer)
pub const RAW_PROFILE_COLUMNS: usize = 5;

/// Comment marker in raw profile files
pub const RAW_PROFILE_COMMENT: char = '#';

// =============================================================================
// Sampling and Sanitization
// =============================================================================

/// Local hours sampled per day (local midnight and local noon). The second
/// entry doubles as the month-end flush trigger.
pub const LOCAL_HOURS: [u32; 2] = [0, 12];

/// Floor applied to negative averaged values at flush time
pub const NEGATIVE_FLOOR: f64 = 1.0e-5;

/// Placeholder refractivity (n - 1); a real refractive index model is not
/// needed by the downstream simulation yet
pub const REFRACTIVITY_PLACEHOLDER: f64 = 3.0e-3;

// =============================================================================
// Defaults
// =============================================================================

/// Default start year when none is given on the command line
pub const DEFAULT_START_YEAR: i32 = 2018;

/// Default directory holding raw and averaged profile files
pub const DEFAULT_ATM_DIR: &str = "atm";

/// Default site registry file
pub const DEFAULT_REGISTRY_FILE: &str = "sites.csv";

/// Default external extraction program (shipped with CORSIKA since v7.46)
pub const DEFAULT_GDAS_TOOL: &str = "gdastool";

/// Default minimum height passed to the extraction tool, in meters
pub const DEFAULT_MIN_HEIGHT_M: f64 = 0.0;

/// Default maximum height passed to the extraction tool, in meters
pub const DEFAULT_MAX_HEIGHT_M: f64 = 0.0;

// =============================================================================
// Filenames and Formatting
// =============================================================================

/// Raw profile filename for one site and UTC timestamp:
/// `atmg{SiteId:04}{utc_seconds}.atm`
pub fn raw_profile_filename(site_id: u32, utc_seconds: i64) -> String {
    format!("atmg{:04}{}.atm", site_id, utc_seconds)
}

/// Identifier of one averaged model: site id (unpadded), two-digit year,
/// zero-padded month
pub fn model_id(site_id: u32, year: i32, month: u32) -> String {
    format!("{}{:02}{:02}", site_id, year.rem_euclid(100), month)
}

/// Averaged profile filename: `atmprof{siteId}{yy}{mm}.dat`
pub fn averaged_profile_filename(site_id: u32, year: i32, month: u32) -> String {
    format!("atmprof{}.dat", model_id(site_id, year, month))
}

/// Format a value like printf `%.5E`: upper-case scientific notation with
/// five digits after the decimal point and a signed two-digit exponent
/// (e.g. `1.22500E+00`).
pub fn format_scientific(value: f64) -> String {
    let rendered = format!("{:.5e}", value);
    let Some((mantissa, exponent)) = rendered.split_once('e') else {
        // Non-finite values have no exponent part
        return rendered;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{}E{}{:02}", mantissa, sign, exponent.abs())
}
