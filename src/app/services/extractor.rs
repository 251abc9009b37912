//! External GDAS extraction tool invocation
//!
//! The raw profile files are produced by `gdastool` (shipped with CORSIKA
//! since v7.46), which downloads the GDAS dataset for the requested period
//! on first use. Invocation is fire-and-forget: the exit status is logged
//! but never interpreted, and success is established only by later
//! file-existence checks. The trait seam lets the pipeline be exercised in
//! tests without a real tool on the PATH.

use crate::{Error, Result};
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

/// One extraction request for a site and UTC timestamp
#[derive(Debug, Clone)]
pub struct ExtractionRequest<'a> {
    /// UTC timestamp in integer seconds
    pub utc_seconds: i64,

    /// Output path the tool must create
    pub output_path: &'a Path,

    /// Minimum profile height in meters
    pub min_height_m: f64,

    /// Maximum profile height in meters
    pub max_height_m: f64,

    /// Site latitude in decimal degrees
    pub latitude: f64,

    /// Site longitude in decimal degrees
    pub longitude: f64,
}

/// Seam for the external extraction tool
pub trait ProfileExtractor {
    /// Request extraction of one raw profile file
    ///
    /// An `Ok` return only means the tool was launched and terminated; the
    /// caller checks for the output file's existence separately.
    fn extract(&self, request: &ExtractionRequest<'_>) -> Result<()>;
}

/// Extractor that shells out to the real `gdastool` program
#[derive(Debug, Clone)]
pub struct GdasToolExtractor {
    program: String,
}

impl GdasToolExtractor {
    /// Create an extractor invoking the given program
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GdasToolExtractor {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_GDAS_TOOL)
    }
}

impl ProfileExtractor for GdasToolExtractor {
    fn extract(&self, request: &ExtractionRequest<'_>) -> Result<()> {
        info!(
            "Extracting GDAS profile for {} (first run per month may download ~500MB)",
            request.output_path.display()
        );

        let status = Command::new(&self.program)
            .arg("-t")
            .arg(request.utc_seconds.to_string())
            .arg("-o")
            .arg(request.output_path)
            .arg("-m")
            .arg(request.min_height_m.to_string())
            .arg("-M")
            .arg(request.max_height_m.to_string())
            .arg("-c")
            .arg(request.latitude.to_string())
            .arg(request.longitude.to_string())
            .status()
            .map_err(|e| Error::io(format!("failed to launch '{}'", self.program), e))?;

        // Exit status is recorded but not interpreted; a failed run is
        // detected by the next file-existence check
        debug!("{} exited with {}", self.program, status);
        Ok(())
    }
}
