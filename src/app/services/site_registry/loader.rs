//! Site registry loading from the registry file

use super::parser::parse_site_record;
use super::SiteRegistry;
use crate::{Error, Result};
use std::path::Path;
use tracing::{debug, info, warn};

/// Load a site registry from a CSV file
///
/// Duplicate site ids keep the first occurrence and log a warning; a
/// registry with no valid sites is a hard error since nothing could be
/// processed from it.
pub fn load_registry(path: &Path) -> Result<SiteRegistry> {
    debug!("Loading site registry from {}", path.display());

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| {
            Error::csv_parsing(
                path.display().to_string(),
                "failed to open registry file",
                Some(e),
            )
        })?;

    let headers = reader
        .headers()
        .map_err(|e| {
            Error::csv_parsing(path.display().to_string(), "missing header row", Some(e))
        })?
        .clone();

    let mut registry = SiteRegistry::new(path.to_path_buf());

    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            Error::csv_parsing(
                path.display().to_string(),
                format!("failed to read record {}", row + 1),
                Some(e),
            )
        })?;

        let site = parse_site_record(&record, &headers).map_err(|e| {
            Error::site_registry(format!(
                "invalid site record {} in {}: {}",
                row + 1,
                path.display(),
                e
            ))
        })?;

        if registry.contains_site(site.site_id) {
            warn!("Duplicate site id {} in registry, keeping first", site.site_id);
            continue;
        }
        registry.add_site(site);
    }

    if registry.sites.is_empty() {
        return Err(Error::site_registry(format!(
            "registry {} contains no sites",
            path.display()
        )));
    }

    info!(
        "Loaded {} sites from {}",
        registry.site_count(),
        path.display()
    );
    Ok(registry)
}
