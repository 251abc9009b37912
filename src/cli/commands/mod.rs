//! Command implementations for the GDAS processor CLI
//!
//! Each subcommand lives in its own module; `run` dispatches based on the
//! parsed arguments.

pub mod process;
pub mod shared;
pub mod sites;

use crate::app::services::pipeline::PipelineStats;
use crate::cli::args::{Args, Commands};
use crate::{Error, Result};

/// Main command runner
///
/// Dispatches to the subcommand handlers:
/// - `process`: extraction and monthly averaging workflow
/// - `sites`: site registry analysis and reporting
pub fn run(args: Args) -> Result<PipelineStats> {
    match args.command {
        Some(Commands::Process(process_args)) => process::run_process(process_args),
        Some(Commands::Sites(sites_args)) => sites::run_sites(sites_args),
        None => Err(Error::configuration(
            "no command given, see --help for usage",
        )),
    }
}
