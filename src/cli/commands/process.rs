//! Process command implementation
//!
//! Wires the site registry, timezone resolver, extraction tool and monthly
//! pipeline together, then prints a run summary.

use super::shared::setup_logging;
use crate::app::services::extractor::GdasToolExtractor;
use crate::app::services::pipeline::{MonthlyPipeline, PipelineConfig, PipelineStats};
use crate::app::services::site_registry::loader::load_registry;
use crate::app::services::timezone::CoordinateTimezoneResolver;
use crate::cli::args::ProcessArgs;
use crate::Result;
use colored::Colorize;
use std::time::Instant;
use tracing::{debug, info};

/// Process command runner
pub fn run_process(args: ProcessArgs) -> Result<PipelineStats> {
    let start_time = Instant::now();

    setup_logging(&args)?;

    info!("Starting GDAS profile processing");
    debug!("Process arguments: {:?}", args);

    args.validate()?;

    let registry = load_registry(&args.registry)?;
    let sites = registry.select(args.site)?;
    info!(
        "Processing {} of {} registered sites",
        sites.len(),
        registry.site_count()
    );

    if !args.atm_dir.exists() {
        std::fs::create_dir_all(&args.atm_dir)?;
        info!("Created atm directory {}", args.atm_dir.display());
    }

    let config = PipelineConfig {
        atm_dir: args.atm_dir.clone(),
        start_year: args.start_year,
        end_year: args.end_year(),
        extract: !args.no_extract,
        average: !args.no_average,
        min_height_m: args.min_height,
        max_height_m: args.max_height,
        show_progress: args.show_progress(),
    };

    let pipeline = MonthlyPipeline::new(
        config,
        Box::new(GdasToolExtractor::new(&args.gdas_tool)),
        Box::new(CoordinateTimezoneResolver::new()),
    );

    let stats = pipeline.run(&sites)?;

    if !args.quiet {
        print_summary(&stats, start_time.elapsed().as_secs_f64());
    }

    Ok(stats)
}

/// Print a colored run summary to stdout
fn print_summary(stats: &PipelineStats, elapsed_secs: f64) {
    println!();
    println!("{}", "Processing complete".green().bold());
    println!("  Sites processed:       {}", stats.sites_processed);
    println!("  Monthly models written: {}", stats.months_written);
    println!("  Timestamps averaged:   {}", stats.timestamps_folded);
    if stats.extractions_requested > 0 {
        println!("  Extractions requested: {}", stats.extractions_requested);
    }
    if stats.timestamps_missing > 0 {
        println!(
            "  {} {}",
            "Missing timestamps:".yellow(),
            stats.timestamps_missing
        );
    }
    if stats.empty_months > 0 {
        println!("  {} {}", "Empty months:".yellow(), stats.empty_months);
    }
    println!("  Elapsed: {:.2}s", elapsed_secs);
}
