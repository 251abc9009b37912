//! Monthly accumulation pipeline
//!
//! Drives the whole extraction/averaging cycle for a set of sites: for each
//! calendar day in the configured year range, at local midnight and noon,
//! the site-local time is resolved to UTC, the raw profile filename is
//! derived, the external tool is invoked for missing files, and existing
//! files are evaluated on the altitude grid and folded into the running
//! monthly sums. The last timestamp of each calendar month triggers a
//! flush: the sums become an averaged profile on disk and the state resets.
//!
//! Everything is sequential and synchronous; each site is processed to
//! completion before the next one starts, and the accumulator state is
//! owned exclusively by the current site-month iteration.

use crate::app::models::Site;
use crate::app::services::accumulator::AccumulatorState;
use crate::app::services::extractor::{ExtractionRequest, ProfileExtractor};
use crate::app::services::profile_model::evaluate_grid;
use crate::app::services::profile_writer::write_averaged_profile;
use crate::app::services::timezone::TimezoneResolver;
use crate::constants::{
    altitude_grid_km, raw_profile_filename, DEFAULT_MAX_HEIGHT_M, DEFAULT_MIN_HEIGHT_M,
    LOCAL_HOURS,
};
use crate::{Error, RawProfileTable, Result};
use chrono::{Datelike, NaiveDate};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Configuration for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory holding raw and averaged profile files
    pub atm_dir: PathBuf,

    /// First year to process (inclusive)
    pub start_year: i32,

    /// Last year to process (inclusive)
    pub end_year: i32,

    /// Invoke the external tool for missing raw files
    pub extract: bool,

    /// Evaluate, accumulate and write monthly averages
    pub average: bool,

    /// Minimum height passed to the extraction tool, in meters
    pub min_height_m: f64,

    /// Maximum height passed to the extraction tool, in meters
    pub max_height_m: f64,

    /// Show a per-site progress bar
    pub show_progress: bool,
}

impl PipelineConfig {
    /// Create a configuration covering a single year with extraction and
    /// averaging enabled and no progress bar
    pub fn for_years(atm_dir: PathBuf, start_year: i32, end_year: i32) -> Self {
        Self {
            atm_dir,
            start_year,
            end_year,
            extract: true,
            average: true,
            min_height_m: DEFAULT_MIN_HEIGHT_M,
            max_height_m: DEFAULT_MAX_HEIGHT_M,
            show_progress: false,
        }
    }
}

/// Counters reported at the end of a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Sites fully processed
    pub sites_processed: usize,

    /// Averaged profile files written
    pub months_written: usize,

    /// Month boundaries reached with zero folded timestamps
    pub empty_months: usize,

    /// Timestamps folded into monthly sums
    pub timestamps_folded: usize,

    /// Timestamps whose raw file was missing during averaging
    pub timestamps_missing: usize,

    /// Extraction tool invocations requested
    pub extractions_requested: usize,
}

/// Sequential extraction and monthly averaging pipeline
pub struct MonthlyPipeline {
    config: PipelineConfig,
    extractor: Box<dyn ProfileExtractor>,
    timezone: Box<dyn TimezoneResolver>,
}

impl MonthlyPipeline {
    /// Create a pipeline from its configuration and collaborators
    pub fn new(
        config: PipelineConfig,
        extractor: Box<dyn ProfileExtractor>,
        timezone: Box<dyn TimezoneResolver>,
    ) -> Self {
        Self {
            config,
            extractor,
            timezone,
        }
    }

    /// Validate the configuration before a run
    pub fn validate(&self) -> Result<()> {
        if self.config.end_year < self.config.start_year {
            return Err(Error::configuration(format!(
                "end year {} precedes start year {}",
                self.config.end_year, self.config.start_year
            )));
        }
        if !self.config.atm_dir.is_dir() {
            return Err(Error::configuration(format!(
                "atm directory does not exist: {}",
                self.config.atm_dir.display()
            )));
        }
        Ok(())
    }

    /// Process every site sequentially over the configured year range
    pub fn run(&self, sites: &[&Site]) -> Result<PipelineStats> {
        self.validate()?;

        let mut stats = PipelineStats::default();
        for site in sites {
            self.process_site(site, &mut stats)?;
            stats.sites_processed += 1;
        }
        Ok(stats)
    }

    /// Process one site over the configured year range
    fn process_site(&self, site: &Site, stats: &mut PipelineStats) -> Result<()> {
        info!(
            "Processing site {} ({}) for {}..={}",
            site.site_id,
            site.name.as_deref().unwrap_or("unnamed"),
            self.config.start_year,
            self.config.end_year
        );

        let grid = altitude_grid_km();
        let mut state = AccumulatorState::new(grid.len());
        let progress = self.site_progress_bar(site);

        for year in self.config.start_year..=self.config.end_year {
            for date in days_in_year(year) {
                for &hour in LOCAL_HOURS.iter() {
                    self.process_timestamp(site, date, hour, &grid, &mut state, stats)?;
                    if let Some(bar) = &progress {
                        bar.inc(1);
                    }
                }
            }
        }

        if let Some(bar) = progress {
            bar.finish_and_clear();
        }
        Ok(())
    }

    /// Process one (site, date, local hour) sampling point
    fn process_timestamp(
        &self,
        site: &Site,
        date: NaiveDate,
        hour: u32,
        grid: &[f64],
        state: &mut AccumulatorState,
        stats: &mut PipelineStats,
    ) -> Result<()> {
        let local = match date.and_hms_opt(hour, 0, 0) {
            Some(local) => local,
            None => {
                warn!("Skipping invalid local time {} {:02}:00", date, hour);
                return Ok(());
            }
        };

        let utc_seconds = match self
            .timezone
            .utc_seconds(site.latitude, site.longitude, local)
        {
            Ok(utc) => utc,
            Err(e) => {
                // Timezone failures skip the timestamp, same as a missing
                // raw file; the month averages over what remains
                warn!("Skipping {} {:02}:00 at site {}: {}", date, hour, site.site_id, e);
                return Ok(());
            }
        };

        let raw_path = self
            .config
            .atm_dir
            .join(raw_profile_filename(site.site_id, utc_seconds));
        debug!("{} {} {:02}:00 -> {}", site.site_id, date, hour, raw_path.display());

        if self.config.extract && !raw_path.exists() {
            let request = ExtractionRequest {
                utc_seconds,
                output_path: &raw_path,
                min_height_m: self.config.min_height_m,
                max_height_m: self.config.max_height_m,
                latitude: site.latitude,
                longitude: site.longitude,
            };
            match self.extractor.extract(&request) {
                Ok(()) => stats.extractions_requested += 1,
                // No retry; the missing file is handled below
                Err(e) => warn!("Extraction failed for {}: {}", raw_path.display(), e),
            }
        }

        if self.config.average {
            if raw_path.exists() {
                match RawProfileTable::from_file(&raw_path) {
                    Ok(table) => {
                        state.fold(&evaluate_grid(&table, grid));
                        stats.timestamps_folded += 1;
                    }
                    Err(e) => {
                        warn!("Skipping unreadable profile {}: {}", raw_path.display(), e);
                        stats.timestamps_missing += 1;
                    }
                }
            } else {
                info!("No file {}", raw_path.display());
                stats.timestamps_missing += 1;
            }

            // The flush check runs for every month-end timestamp, even
            // when the raw file was missing, so sums can never carry over
            // into the next month
            if is_month_end(date, hour) {
                match state.flush(site.site_id, date.year(), date.month(), grid) {
                    Some(profile) => {
                        let path = write_averaged_profile(&self.config.atm_dir, &profile)?;
                        info!("new {} created", path.display());
                        stats.months_written += 1;
                    }
                    None => {
                        warn!(
                            "Warning: no files for {}/{}",
                            date.month(),
                            date.year()
                        );
                        stats.empty_months += 1;
                    }
                }
            }
        }

        Ok(())
    }

    fn site_progress_bar(&self, site: &Site) -> Option<ProgressBar> {
        if !self.config.show_progress {
            return None;
        }

        let days: u64 = (self.config.start_year..=self.config.end_year)
            .map(|year| if is_leap_year(year) { 366 } else { 365 })
            .sum();
        let bar = ProgressBar::new(days * LOCAL_HOURS.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        bar.set_message(format!("site {}", site.site_id));
        Some(bar)
    }
}

/// True when the given year is a leap year
pub(crate) fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

/// Number of days in a calendar month
pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    let first = match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(first) => first,
        None => return 0,
    };
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match next {
        Some(next) => next.signed_duration_since(first).num_days() as u32,
        None => 0,
    }
}

/// Iterate every calendar day of a year in order
pub(crate) fn days_in_year(year: i32) -> impl Iterator<Item = NaiveDate> {
    (1..=12u32).flat_map(move |month| {
        (1..=days_in_month(year, month))
            .filter_map(move |day| NaiveDate::from_ymd_opt(year, month, day))
    })
}

/// True for the last sampled timestamp of a calendar month: the last day of
/// the month at the second (later) configured local hour
pub(crate) fn is_month_end(date: NaiveDate, hour: u32) -> bool {
    date.day() == days_in_month(date.year(), date.month()) && hour == LOCAL_HOURS[LOCAL_HOURS.len() - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::timezone::FixedUtcResolver;
    use crate::constants::averaged_profile_filename;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Extractor stub that counts invocations and never creates files
    struct CountingExtractor {
        calls: Arc<AtomicUsize>,
    }

    impl ProfileExtractor for CountingExtractor {
        fn extract(&self, _request: &ExtractionRequest<'_>) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn raw_table_text() -> &'static str {
        "# test profile\n\
         4.0e5 1.0e6 4.0e6 1.0e7 1.128292e9\n\
         -186.555305 -94.919 0.61289 0.0 0.01128292\n\
         1222.6562 1144.9069 1305.5948 540.1778 1.0\n\
         994186.38 878153.55 636143.04 772170.16 1.0e9\n"
    }

    fn write_raw_files(dir: &std::path::Path, site: &Site, year: i32, month: u32) {
        for day in 1..=days_in_month(year, month) {
            for &hour in LOCAL_HOURS.iter() {
                let local = NaiveDate::from_ymd_opt(year, month, day)
                    .unwrap()
                    .and_hms_opt(hour, 0, 0)
                    .unwrap();
                let utc = local.and_utc().timestamp();
                let name = raw_profile_filename(site.site_id, utc);
                std::fs::write(dir.join(name), raw_table_text()).unwrap();
            }
        }
    }

    fn pipeline(dir: &TempDir, year: i32, extract: bool, average: bool) -> (MonthlyPipeline, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut config = PipelineConfig::for_years(dir.path().to_path_buf(), year, year);
        config.extract = extract;
        config.average = average;
        let pipeline = MonthlyPipeline::new(
            config,
            Box::new(CountingExtractor {
                calls: Arc::clone(&calls),
            }),
            Box::new(FixedUtcResolver),
        );
        (pipeline, calls)
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2018, 1), 31);
        assert_eq!(days_in_month(2018, 4), 30);
        assert_eq!(days_in_month(2018, 12), 31);
        // Leap year handling
        assert_eq!(days_in_month(2018, 2), 28);
        assert_eq!(days_in_month(2020, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
    }

    #[test]
    fn test_days_in_year_count() {
        assert_eq!(days_in_year(2018).count(), 365);
        assert_eq!(days_in_year(2020).count(), 366);
    }

    #[test]
    fn test_month_end_detection() {
        let jan31 = NaiveDate::from_ymd_opt(2018, 1, 31).unwrap();
        let jan30 = NaiveDate::from_ymd_opt(2018, 1, 30).unwrap();

        // Only the second configured hour of the last day flushes
        assert!(is_month_end(jan31, 12));
        assert!(!is_month_end(jan31, 0));
        assert!(!is_month_end(jan30, 12));
    }

    #[test]
    fn test_month_end_detection_february() {
        // Non-leap year flushes on the 28th, leap year on the 29th
        assert!(is_month_end(NaiveDate::from_ymd_opt(2018, 2, 28).unwrap(), 12));
        assert!(!is_month_end(NaiveDate::from_ymd_opt(2020, 2, 28).unwrap(), 12));
        assert!(is_month_end(NaiveDate::from_ymd_opt(2020, 2, 29).unwrap(), 12));
    }

    #[test]
    fn test_extraction_skipped_when_file_exists() {
        // Idempotence: re-running extraction over existing files must not
        // re-invoke the tool
        let dir = TempDir::new().unwrap();
        let site = Site::new(1, None, 0.0, 0.0).unwrap();
        for month in 1..=12 {
            write_raw_files(dir.path(), &site, 2018, month);
        }

        let (pipeline, calls) = pipeline(&dir, 2018, true, false);
        pipeline.run(&[&site]).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_extraction_requested_for_missing_files() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(1, None, 0.0, 0.0).unwrap();

        let (pipeline, calls) = pipeline(&dir, 2018, true, false);
        let stats = pipeline.run(&[&site]).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 365 * 2);
        assert_eq!(stats.extractions_requested, 365 * 2);
        assert_eq!(stats.months_written, 0);
    }

    #[test]
    fn test_partial_month_averages_present_files_only() {
        // Files exist only for March; March is written from its own
        // timestamps and every other month is reported empty
        let dir = TempDir::new().unwrap();
        let site = Site::new(2, None, 0.0, 0.0).unwrap();
        write_raw_files(dir.path(), &site, 2018, 3);

        let (pipeline, _) = pipeline(&dir, 2018, false, true);
        let stats = pipeline.run(&[&site]).unwrap();

        assert_eq!(stats.months_written, 1);
        assert_eq!(stats.empty_months, 11);
        assert_eq!(stats.timestamps_folded, 31 * 2);
        assert_eq!(stats.timestamps_missing, (365 - 31) * 2);
        assert!(dir.path().join(averaged_profile_filename(2, 2018, 3)).exists());
    }

    #[test]
    fn test_leap_february_flushes_once_on_the_29th() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(1, None, 0.0, 0.0).unwrap();
        write_raw_files(dir.path(), &site, 2020, 2);

        let (pipeline, _) = pipeline(&dir, 2020, false, true);
        let stats = pipeline.run(&[&site]).unwrap();

        assert_eq!(stats.months_written, 1);
        assert_eq!(stats.timestamps_folded, 29 * 2);
        assert!(dir.path().join(averaged_profile_filename(1, 2020, 2)).exists());
    }

    #[test]
    fn test_unreadable_profile_is_skipped() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(1, None, 0.0, 0.0).unwrap();
        write_raw_files(dir.path(), &site, 2018, 1);

        // Corrupt one file; its timestamp is excluded from the average
        let local = NaiveDate::from_ymd_opt(2018, 1, 10)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let bad = dir
            .path()
            .join(raw_profile_filename(1, local.and_utc().timestamp()));
        std::fs::write(&bad, "garbage\n").unwrap();

        let (pipeline, _) = pipeline(&dir, 2018, false, true);
        let stats = pipeline.run(&[&site]).unwrap();
        assert_eq!(stats.timestamps_folded, 31 * 2 - 1);
        assert_eq!(stats.months_written, 1);
    }

    #[test]
    fn test_invalid_year_range_rejected() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(1, None, 0.0, 0.0).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let config = PipelineConfig::for_years(dir.path().to_path_buf(), 2018, 2017);
        let pipeline = MonthlyPipeline::new(
            config,
            Box::new(CountingExtractor { calls }),
            Box::new(FixedUtcResolver),
        );
        assert!(pipeline.run(&[&site]).is_err());
    }
}
