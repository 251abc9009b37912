//! Site record parsing from CSV data
//!
//! The registry is a headed CSV export of the shared site definition table.
//! Required columns are `SiteId`, `LAT` and `LONG` (matched
//! case-insensitively); a `NAME` column is picked up when present.

use crate::app::models::Site;
use crate::{Error, Result};
use csv::StringRecord;
use std::collections::HashMap;

/// Parse one site record from CSV fields
pub fn parse_site_record(record: &StringRecord, headers: &StringRecord) -> Result<Site> {
    // Map column name to value for easier parsing
    let mut fields = HashMap::new();
    for (i, value) in record.iter().enumerate() {
        if let Some(header) = headers.get(i) {
            fields.insert(header.trim().to_lowercase(), value.trim());
        }
    }

    let parse_required = |key: &str| -> Result<&str> {
        fields
            .get(key)
            .filter(|value| !value.is_empty())
            .copied()
            .ok_or_else(|| Error::data_validation(format!("Missing required field: {}", key)))
    };

    let site_id: u32 = parse_required("siteid")?
        .parse()
        .map_err(|_| Error::data_validation("Invalid SiteId".to_string()))?;

    let latitude: f64 = parse_required("lat")?
        .parse()
        .map_err(|_| Error::data_validation("Invalid LAT".to_string()))?;

    let longitude: f64 = parse_required("long")?
        .parse()
        .map_err(|_| Error::data_validation("Invalid LONG".to_string()))?;

    let name = fields
        .get("name")
        .filter(|value| !value.is_empty())
        .map(|value| value.to_string());

    // Range validation happens in the model constructor
    Site::new(site_id, name, latitude, longitude)
}
