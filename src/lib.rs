//! GDAS Processor Library
//!
//! A Rust library for extracting GDAS instantaneous atmospheric profiles per
//! site and averaging them into monthly atmospheric models suitable for
//! air-shower simulation codes.
//!
//! This library provides tools for:
//! - Loading and indexing site metadata for O(1) lookups
//! - Deriving UTC timestamps for local midnight and noon at each site
//! - Invoking the external `gdastool` extractor and reusing its output files
//! - Evaluating the piecewise atmospheric model (density, vertical depth,
//!   refractivity) on a fixed 50-point altitude grid
//! - Accumulating per-timestamp profiles into monthly averages
//! - Writing averaged profiles as flat `atmprof*.dat` files

pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod accumulator;
        pub mod extractor;
        pub mod pipeline;
        pub mod profile_model;
        pub mod profile_writer;
        pub mod site_registry;
        pub mod timezone;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{AveragedProfile, RawProfileTable, Site};

/// Result type alias for the GDAS processor
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for GDAS processing operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing error
    #[error("CSV parsing error in file '{file}': {message}")]
    CsvParsing {
        file: String,
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// Raw profile table format error
    #[error("Profile format error in file '{file}': {message}")]
    ProfileFormat { file: String, message: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Site registry error
    #[error("Site registry error: {message}")]
    SiteRegistry { message: String },

    /// Site not found
    #[error("Site not found: site_id = {site_id}")]
    SiteNotFound { site_id: u32 },

    /// Data validation error
    #[error("Data validation error: {message}")]
    DataValidation { message: String },

    /// Timezone resolution error
    #[error("Timezone resolution error: {message}")]
    Timezone { message: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a CSV parsing error with context
    pub fn csv_parsing(
        file: impl Into<String>,
        message: impl Into<String>,
        source: Option<csv::Error>,
    ) -> Self {
        Self::CsvParsing {
            file: file.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a raw profile format error
    pub fn profile_format(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProfileFormat {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a site registry error
    pub fn site_registry(message: impl Into<String>) -> Self {
        Self::SiteRegistry {
            message: message.into(),
        }
    }

    /// Create a site not found error
    pub fn site_not_found(site_id: u32) -> Self {
        Self::SiteNotFound { site_id }
    }

    /// Create a data validation error
    pub fn data_validation(message: impl Into<String>) -> Self {
        Self::DataValidation {
            message: message.into(),
        }
    }

    /// Create a timezone resolution error
    pub fn timezone(message: impl Into<String>) -> Self {
        Self::Timezone {
            message: message.into(),
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::CsvParsing {
            file: "unknown".to_string(),
            message: "CSV parsing failed".to_string(),
            source: Some(error),
        }
    }
}
