//! Monthly accumulation state for averaged atmospheric models
//!
//! One `AccumulatorState` is owned exclusively by the current (site, month)
//! iteration of the pipeline: evaluated profiles are folded in one timestamp
//! at a time, and at the month boundary the state is flushed into an
//! `AveragedProfile` and reset. The reset happens unconditionally, even when
//! an empty month produces no output, so stale sums never leak into the
//! next month.

use crate::app::models::{AveragedProfile, EvaluatedProfile};
use crate::constants::NEGATIVE_FLOOR;

/// Running per-altitude sums for one in-progress site-month
#[derive(Debug, Clone)]
pub struct AccumulatorState {
    /// Sum of evaluated densities per grid altitude
    density_sums: Vec<f64>,

    /// Sum of evaluated depths per grid altitude
    depth_sums: Vec<f64>,

    /// Sum of evaluated refractivities per grid altitude
    refractivity_sums: Vec<f64>,

    /// Number of timestamps folded in so far
    samples: usize,
}

impl AccumulatorState {
    /// Create a zero-initialized state for a grid of the given length
    pub fn new(grid_len: usize) -> Self {
        Self {
            density_sums: vec![0.0; grid_len],
            depth_sums: vec![0.0; grid_len],
            refractivity_sums: vec![0.0; grid_len],
            samples: 0,
        }
    }

    /// Number of timestamps folded since the last reset
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Fold one evaluated profile into the running sums
    ///
    /// The profile must be parallel to the grid this state was created for.
    pub fn fold(&mut self, profile: &EvaluatedProfile) {
        debug_assert_eq!(profile.density.len(), self.density_sums.len());

        for (sum, value) in self.density_sums.iter_mut().zip(&profile.density) {
            *sum += value;
        }
        for (sum, value) in self.depth_sums.iter_mut().zip(&profile.depth) {
            *sum += value;
        }
        for (sum, value) in self.refractivity_sums.iter_mut().zip(&profile.refractivity) {
            *sum += value;
        }

        self.samples += 1;
    }

    /// Finalize the month: average the sums, sanitize, and reset
    ///
    /// Returns `None` when no timestamps were folded (an empty month). In
    /// either case the sums and the sample count are reset to zero.
    /// Sanitization clamps negative means to a small positive floor and
    /// forces the depth at the last grid altitude to exactly zero, since the
    /// depth must vanish at the top of the atmosphere.
    pub fn flush(
        &mut self,
        site_id: u32,
        year: i32,
        month: u32,
        altitudes_km: &[f64],
    ) -> Option<AveragedProfile> {
        let samples = self.samples;
        let profile = if samples == 0 {
            None
        } else {
            let count = samples as f64;
            let mut density: Vec<f64> = self.density_sums.iter().map(|s| s / count).collect();
            let mut depth: Vec<f64> = self.depth_sums.iter().map(|s| s / count).collect();
            let mut refractivity: Vec<f64> =
                self.refractivity_sums.iter().map(|s| s / count).collect();

            for value in density
                .iter_mut()
                .chain(depth.iter_mut())
                .chain(refractivity.iter_mut())
            {
                if *value < 0.0 {
                    *value = NEGATIVE_FLOOR;
                }
            }
            if let Some(last) = depth.last_mut() {
                *last = 0.0;
            }

            Some(AveragedProfile {
                site_id,
                year,
                month,
                altitudes_km: altitudes_km.to_vec(),
                density,
                depth,
                refractivity,
            })
        };

        self.reset();
        profile
    }

    /// Reset all sums and the sample count to zero
    pub fn reset(&mut self) {
        self.density_sums.fill(0.0);
        self.depth_sums.fill(0.0);
        self.refractivity_sums.fill(0.0);
        self.samples = 0;
    }
}
