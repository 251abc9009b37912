//! Averaged profile serialization
//!
//! Writes one averaged atmospheric model as a flat space-delimited text
//! file: three header comment lines followed by one row per grid altitude
//! with columns [altitude_km, density, depth, refractivity], every numeric
//! field in `%.5E` scientific notation. Plain open-write-close discipline;
//! writes are not atomic.

use crate::app::models::AveragedProfile;
use crate::constants::format_scientific;
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Render an averaged profile to its serialized text form
pub fn render_averaged_profile(profile: &AveragedProfile) -> String {
    let mut output = String::new();
    output.push_str(&format!("# Atmospheric Model {}\n", profile.model_id()));
    output.push_str("# Col. #1          #2           #3            #4\n");
    output.push_str("# Alt [km]    rho [g/cm^3] thick [g/cm^2]    n-1\n");

    for (i, altitude) in profile.altitudes_km.iter().enumerate() {
        output.push_str(&format!(
            "{} {} {} {}\n",
            format_scientific(*altitude),
            format_scientific(profile.density[i]),
            format_scientific(profile.depth[i]),
            format_scientific(profile.refractivity[i]),
        ));
    }

    output
}

/// Write an averaged profile into the given directory, returning the path
/// of the created file
pub fn write_averaged_profile(directory: &Path, profile: &AveragedProfile) -> Result<PathBuf> {
    let path = directory.join(profile.file_name());
    fs::write(&path, render_averaged_profile(profile))
        .map_err(|e| Error::io(format!("failed to write {}", path.display()), e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_profile() -> AveragedProfile {
        AveragedProfile {
            site_id: 1,
            year: 2000,
            month: 1,
            altitudes_km: vec![0.0, 10.0, 120.0],
            density: vec![1.2e-3, 4.1e-4, 1.0e-5],
            depth: vec![1036.1, 274.2, 0.0],
            refractivity: vec![3.0e-3; 3],
        }
    }

    #[test]
    fn test_render_header_lines() {
        let rendered = render_averaged_profile(&test_profile());
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "# Atmospheric Model 10001");
        assert_eq!(lines[1], "# Col. #1          #2           #3            #4");
        assert_eq!(lines[2], "# Alt [km]    rho [g/cm^3] thick [g/cm^2]    n-1");
        assert_eq!(lines.len(), 3 + 3);
    }

    #[test]
    fn test_render_data_rows() {
        let rendered = render_averaged_profile(&test_profile());
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[3], "0.00000E+00 1.20000E-03 1.03610E+03 3.00000E-03");
        assert_eq!(lines[4], "1.00000E+01 4.10000E-04 2.74200E+02 3.00000E-03");
        assert_eq!(lines[5], "1.20000E+02 1.00000E-05 0.00000E+00 3.00000E-03");
    }

    #[test]
    fn test_write_creates_named_file() {
        let dir = TempDir::new().unwrap();
        let path = write_averaged_profile(dir.path(), &test_profile()).unwrap();
        assert_eq!(path.file_name().unwrap(), "atmprof10001.dat");
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, render_averaged_profile(&test_profile()));
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(write_averaged_profile(&missing, &test_profile()).is_err());
    }
}
