//! Command-line argument definitions

use crate::constants::{
    DEFAULT_ATM_DIR, DEFAULT_GDAS_TOOL, DEFAULT_MAX_HEIGHT_M, DEFAULT_MIN_HEIGHT_M,
    DEFAULT_REGISTRY_FILE, DEFAULT_START_YEAR,
};
use crate::{Error, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// GDAS atmospheric profile processor
///
/// Extracts raw atmospheric profiles for registered sites and accumulates
/// them into monthly averaged models.
#[derive(Parser, Debug)]
#[command(name = "gdas_processor")]
#[command(author, version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract raw profiles and write monthly averaged models
    Process(ProcessArgs),

    /// Inspect the site registry
    Sites(SitesArgs),
}

#[derive(Parser, Debug)]
pub struct ProcessArgs {
    /// Site id to process (all registered sites when omitted)
    #[arg(short, long)]
    pub site: Option<u32>,

    /// First year to process
    #[arg(short = 'y', long = "year", default_value_t = DEFAULT_START_YEAR)]
    pub start_year: i32,

    /// Last year to process (defaults to the start year)
    #[arg(short = 'd', long)]
    pub end_year: Option<i32>,

    /// Skip invoking the extraction tool for missing raw files
    #[arg(long)]
    pub no_extract: bool,

    /// Skip computing and writing monthly averages
    #[arg(long)]
    pub no_average: bool,

    /// Site registry file
    #[arg(short, long, default_value = DEFAULT_REGISTRY_FILE)]
    pub registry: PathBuf,

    /// Directory for raw and averaged profile files
    #[arg(short = 'o', long, default_value = DEFAULT_ATM_DIR)]
    pub atm_dir: PathBuf,

    /// Extraction tool executable
    #[arg(long, default_value = DEFAULT_GDAS_TOOL)]
    pub gdas_tool: String,

    /// Minimum extraction height in meters
    #[arg(long, default_value_t = DEFAULT_MIN_HEIGHT_M)]
    pub min_height: f64,

    /// Maximum extraction height in meters
    #[arg(long, default_value_t = DEFAULT_MAX_HEIGHT_M)]
    pub max_height: f64,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl ProcessArgs {
    /// Validate argument combinations before running
    pub fn validate(&self) -> Result<()> {
        if let Some(end_year) = self.end_year {
            if end_year < self.start_year {
                return Err(Error::configuration(format!(
                    "end year {} precedes start year {}",
                    end_year, self.start_year
                )));
            }
        }
        if self.max_height < self.min_height {
            return Err(Error::configuration(format!(
                "max height {} is below min height {}",
                self.max_height, self.min_height
            )));
        }
        if self.no_extract && self.no_average {
            return Err(Error::configuration(
                "both extraction and averaging disabled, nothing to do",
            ));
        }
        Ok(())
    }

    /// Effective last year of the run
    pub fn end_year(&self) -> i32 {
        self.end_year.unwrap_or(self.start_year)
    }

    /// Map verbosity flags to a log level
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Progress bars are shown unless quiet or verbose logging would
    /// interleave with them
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.verbose == 0
    }
}

#[derive(Parser, Debug)]
pub struct SitesArgs {
    /// Site registry file
    #[arg(short, long, default_value = DEFAULT_REGISTRY_FILE)]
    pub registry: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output_file: Option<PathBuf>,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned table for terminals
    Human,
    /// JSON array of site records
    Json,
    /// CSV with the registry columns
    Csv,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn process_args(argv: &[&str]) -> ProcessArgs {
        match Args::parse_from(argv).command {
            Some(Commands::Process(args)) => args,
            other => panic!("Expected process command, got {:?}", other),
        }
    }

    #[test]
    fn test_process_defaults() {
        let args = process_args(&["gdas_processor", "process"]);
        assert_eq!(args.start_year, DEFAULT_START_YEAR);
        assert_eq!(args.end_year(), DEFAULT_START_YEAR);
        assert!(args.site.is_none());
        assert!(!args.no_extract);
        assert!(!args.no_average);
        assert_eq!(args.registry, PathBuf::from(DEFAULT_REGISTRY_FILE));
        assert_eq!(args.atm_dir, PathBuf::from(DEFAULT_ATM_DIR));
        assert_eq!(args.gdas_tool, DEFAULT_GDAS_TOOL);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_process_year_range() {
        let args = process_args(&["gdas_processor", "process", "-y", "2019", "-d", "2021"]);
        assert_eq!(args.start_year, 2019);
        assert_eq!(args.end_year(), 2021);
        assert!(args.validate().is_ok());

        let args = process_args(&["gdas_processor", "process", "-y", "2021", "-d", "2019"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_process_nothing_to_do_rejected() {
        let args = process_args(&["gdas_processor", "process", "--no-extract", "--no-average"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_process_height_range_rejected() {
        let args = process_args(&[
            "gdas_processor",
            "process",
            "--min-height",
            "1000",
            "--max-height",
            "500",
        ]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_levels() {
        let args = process_args(&["gdas_processor", "process"]);
        assert_eq!(args.get_log_level(), "warn");
        assert!(args.show_progress());

        let args = process_args(&["gdas_processor", "process", "-v"]);
        assert_eq!(args.get_log_level(), "info");
        assert!(!args.show_progress());

        let args = process_args(&["gdas_processor", "process", "-vvv"]);
        assert_eq!(args.get_log_level(), "trace");

        let args = process_args(&["gdas_processor", "process", "-q"]);
        assert_eq!(args.get_log_level(), "error");
        assert!(!args.show_progress());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Args::try_parse_from(["gdas_processor", "process", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_sites_formats() {
        let args = Args::parse_from(["gdas_processor", "sites", "-f", "json"]);
        match args.command {
            Some(Commands::Sites(sites)) => assert_eq!(sites.format, OutputFormat::Json),
            other => panic!("Expected sites command, got {:?}", other),
        }
    }
}
