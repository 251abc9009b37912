//! Piecewise atmospheric profile model
//!
//! Pure, stateless evaluation of density and vertical atmospheric depth at
//! an arbitrary altitude, given a raw GDAS parameter table. The atmosphere
//! is described by four exponential layers (depth `a + b * exp(-h/c)`) and a
//! linear top layer (`a - b * h / c`), the same parameterization used by
//! air-shower simulation codes. All altitudes passed to this module are in
//! centimeters; grid altitudes in kilometers are converted on evaluation.

use crate::app::models::{EvaluatedProfile, RawProfileTable};
use crate::constants::{KM_TO_CM, REFRACTIVITY_PLACEHOLDER};

/// Index of the linear top layer
pub const TOP_LAYER: usize = 4;

/// Select the model layer governing an altitude
///
/// Returns the smallest exponential layer index whose boundary lies above
/// the altitude; altitudes at or above every exponential boundary fall into
/// the top layer. The scan order matters: boundaries are non-decreasing, so
/// the first match is the governing layer.
pub fn select_layer(altitude_cm: f64, table: &RawProfileTable) -> usize {
    for layer in 0..TOP_LAYER {
        if altitude_cm < table.boundary(layer) {
            return layer;
        }
    }
    TOP_LAYER
}

/// Vertical atmospheric depth at an altitude, in g/cm^2
///
/// Exponential layers follow the barometric form `a + b * exp(-h/c)`; the
/// top layer is extrapolated linearly as `a - b * h / c` so the depth
/// vanishes at the top of the atmosphere.
pub fn depth(altitude_cm: f64, table: &RawProfileTable) -> f64 {
    let layer = select_layer(altitude_cm, table);
    if layer == TOP_LAYER {
        table.a(layer) - table.b(layer) * altitude_cm / table.c(layer)
    } else {
        table.a(layer) + table.b(layer) * (-altitude_cm / table.c(layer)).exp()
    }
}

/// Density at an altitude, in g/cm^3
///
/// In the exponential layers density is the negative altitude-derivative of
/// the depth, `b * exp(-h/c) / c`. The top layer uses
/// `(b / c) * (boundary / h)`, which divides by the altitude: it is
/// undefined at zero, but the top layer is only ever selected at high
/// altitudes for physically meaningful boundary data.
pub fn density(altitude_cm: f64, table: &RawProfileTable) -> f64 {
    let layer = select_layer(altitude_cm, table);
    if layer == TOP_LAYER {
        (table.b(layer) / table.c(layer)) * (table.boundary(layer) / altitude_cm)
    } else {
        table.b(layer) * (-altitude_cm / table.c(layer)).exp() / table.c(layer)
    }
}

/// Refractive index minus one
///
/// Fixed placeholder: the downstream simulation does not consume a real
/// refractivity model yet.
pub fn refractivity() -> f64 {
    REFRACTIVITY_PLACEHOLDER
}

/// Evaluate one raw table at every grid altitude (km), producing the
/// parallel density/depth/refractivity sequences folded by the accumulator
pub fn evaluate_grid(table: &RawProfileTable, grid_km: &[f64]) -> EvaluatedProfile {
    let mut profile = EvaluatedProfile {
        density: Vec::with_capacity(grid_km.len()),
        depth: Vec::with_capacity(grid_km.len()),
        refractivity: Vec::with_capacity(grid_km.len()),
    };

    for &altitude_km in grid_km {
        let altitude_cm = altitude_km * KM_TO_CM;
        profile.density.push(density(altitude_cm, table));
        profile.depth.push(depth(altitude_cm, table));
        profile.refractivity.push(refractivity());
    }

    profile
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::altitude_grid_km;
    use approx::assert_relative_eq;

    /// CORSIKA-style US standard atmosphere parameters
    fn test_table() -> RawProfileTable {
        RawProfileTable::new([
            [4.0e5, 1.0e6, 4.0e6, 1.0e7, 1.128292e9],
            [-186.555305, -94.919, 0.61289, 0.0, 0.01128292],
            [1222.6562, 1144.9069, 1305.5948, 540.1778, 1.0],
            [994186.38, 878153.55, 636143.04, 772170.16, 1.0e9],
        ])
        .unwrap()
    }

    #[test]
    fn test_select_layer_below_first_boundary() {
        let table = test_table();
        assert_eq!(select_layer(0.0, &table), 0);
        assert_eq!(select_layer(1.0e5, &table), 0);
        assert_eq!(select_layer(3.999e5, &table), 0);
    }

    #[test]
    fn test_select_layer_interior_boundaries() {
        let table = test_table();
        // Boundaries are exclusive: an altitude exactly on a boundary
        // belongs to the next layer up
        assert_eq!(select_layer(4.0e5, &table), 1);
        assert_eq!(select_layer(9.999e5, &table), 1);
        assert_eq!(select_layer(1.0e6, &table), 2);
        assert_eq!(select_layer(4.0e6, &table), 3);
    }

    #[test]
    fn test_select_layer_top() {
        let table = test_table();
        assert_eq!(select_layer(1.0e7, &table), TOP_LAYER);
        assert_eq!(select_layer(1.2e7, &table), TOP_LAYER);
    }

    #[test]
    fn test_depth_monotonic_within_exponential_layer() {
        let table = test_table();
        // Sample layer 2 (1e6..4e6 cm) densely; depth must not increase
        let mut previous = depth(1.0e6, &table);
        let mut altitude = 1.0e6;
        while altitude < 4.0e6 {
            altitude += 5.0e4;
            let current = depth(altitude, &table);
            assert!(
                current <= previous,
                "depth increased from {} to {} at {} cm",
                previous,
                current,
                altitude
            );
            previous = current;
        }
    }

    #[test]
    fn test_density_is_depth_derivative_in_exponential_layers() {
        let table = test_table();
        let h = 2.0e6;
        let dh = 1.0e2;
        let numeric = -(depth(h + dh, &table) - depth(h - dh, &table)) / (2.0 * dh);
        assert_relative_eq!(density(h, &table), numeric, max_relative = 1.0e-6);
    }

    #[test]
    fn test_density_non_negative_in_exponential_layers() {
        let table = test_table();
        for altitude_km in altitude_grid_km() {
            let altitude_cm = altitude_km * KM_TO_CM;
            if select_layer(altitude_cm, &table) != TOP_LAYER {
                assert!(density(altitude_cm, &table) >= 0.0);
            }
        }
    }

    #[test]
    fn test_top_layer_sign_follows_coefficients() {
        let table = test_table();
        // With positive b and c the observed top-layer density is positive;
        // the depth turns negative once h exceeds a*c/b and is clamped
        // downstream, not here
        assert!(density(1.1e7, &table) > 0.0);
        assert!(depth(1.2e9, &table) < 0.0);
    }

    #[test]
    fn test_top_layer_never_selected_at_zero_altitude() {
        // The top-layer density divides by the altitude; the grid's zero
        // point must structurally resolve to layer 0
        let table = test_table();
        assert_eq!(select_layer(0.0, &table), 0);
        assert!(density(0.0, &table).is_finite());
    }

    #[test]
    fn test_refractivity_is_constant() {
        assert_eq!(refractivity(), 3.0e-3);
    }

    #[test]
    fn test_evaluate_grid_converts_km_to_cm() {
        let table = test_table();
        let profile = evaluate_grid(&table, &[0.0, 10.0, 120.0]);
        assert_eq!(profile.density.len(), 3);
        assert_relative_eq!(profile.depth[1], depth(10.0 * KM_TO_CM, &table));
        assert_relative_eq!(profile.density[2], density(120.0 * KM_TO_CM, &table));
        assert_eq!(profile.refractivity, vec![3.0e-3; 3]);
    }

    #[test]
    fn test_evaluate_grid_ground_depth_is_physical() {
        // Roughly one atmosphere of overburden at sea level
        let table = test_table();
        let profile = evaluate_grid(&table, &altitude_grid_km());
        assert!(profile.depth[0] > 1000.0 && profile.depth[0] < 1100.0);
    }
}
