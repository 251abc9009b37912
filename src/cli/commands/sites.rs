//! Sites command implementation
//!
//! Loads the site registry and reports its contents in human-readable,
//! JSON or CSV form, to stdout or a file.

use super::shared::setup_sites_logging;
use crate::app::services::pipeline::PipelineStats;
use crate::app::services::site_registry::loader::load_registry;
use crate::app::services::site_registry::SiteRegistry;
use crate::cli::args::{OutputFormat, SitesArgs};
use crate::{Error, Result};
use tracing::info;

/// Sites command runner
pub fn run_sites(args: SitesArgs) -> Result<PipelineStats> {
    setup_sites_logging(&args)?;

    let registry = load_registry(&args.registry)?;
    let report = match args.format {
        OutputFormat::Human => human_report(&registry),
        OutputFormat::Json => json_report(&registry)?,
        OutputFormat::Csv => csv_report(&registry),
    };

    match &args.output_file {
        Some(path) => {
            std::fs::write(path, &report)?;
            info!("Site report written to {}", path.display());
        }
        None => println!("{}", report),
    }

    Ok(PipelineStats::default())
}

fn human_report(registry: &SiteRegistry) -> String {
    let mut output = format!(
        "Site Registry Report\n\
         ====================\n\
         Registry file: {}\n\
         Sites: {}\n\
         \n\
         Id   | Name                 | Lat      | Long\n\
         -----|----------------------|----------|----------\n",
        registry.registry_path().display(),
        registry.site_count()
    );

    for site in registry.sites_sorted() {
        output.push_str(&format!(
            "{:4} | {:20} | {:8.3} | {:8.3}\n",
            site.site_id,
            site.name.as_deref().unwrap_or("-"),
            site.latitude,
            site.longitude
        ));
    }
    output
}

fn json_report(registry: &SiteRegistry) -> Result<String> {
    use serde_json::json;

    let sites: Vec<_> = registry
        .sites_sorted()
        .iter()
        .map(|site| {
            json!({
                "site_id": site.site_id,
                "name": site.name,
                "latitude": site.latitude,
                "longitude": site.longitude,
            })
        })
        .collect();

    let report = json!({
        "registry_file": registry.registry_path(),
        "site_count": registry.site_count(),
        "sites": sites,
    });

    serde_json::to_string_pretty(&report)
        .map_err(|e| Error::configuration(format!("Failed to serialize site report: {}", e)))
}

fn csv_report(registry: &SiteRegistry) -> String {
    let mut csv = String::from("site_id,name,latitude,longitude\n");
    for site in registry.sites_sorted() {
        csv.push_str(&format!(
            "{},{},{},{}\n",
            site.site_id,
            csv_escape(site.name.as_deref().unwrap_or("")),
            site.latitude,
            site.longitude
        ));
    }
    csv
}

/// Escape CSV field values
fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
