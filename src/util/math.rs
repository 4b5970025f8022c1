//! Mathematical helpers for physical-space geometry.

/// Squared Euclidean length of a per-axis offset scaled to millimetres.
///
/// `offset[i]` is an index-space displacement along axis `i`, `spacing[i]`
/// the physical size of one voxel step along that axis. Only the first
/// `ndim` entries are read.
pub(crate) fn scaled_distance_sq(offset: &[f64], spacing: &[f64], ndim: usize) -> f64 {
    let mut acc = 0.0;
    for axis in 0..ndim {
        let d = offset[axis] * spacing[axis];
        acc += d * d;
    }
    acc
}

/// Measure of a ball of radius `r` in `ndim` dimensions.
///
/// Disc area for `ndim == 2`, sphere volume for `ndim == 3`. Used to relate
/// kernel mass to the physical region it samples.
pub(crate) fn ball_measure(radius: f64, ndim: usize) -> f64 {
    match ndim {
        2 => std::f64::consts::PI * radius * radius,
        _ => 4.0 / 3.0 * std::f64::consts::PI * radius * radius * radius,
    }
}

#[cfg(test)]
mod tests {
    use super::{ball_measure, scaled_distance_sq};

    #[test]
    fn scaled_distance_accounts_for_spacing() {
        let d = scaled_distance_sq(&[1.0, 2.0, 0.0], &[2.0, 1.0, 5.0], 3);
        assert!((d - 8.0).abs() < 1e-12);
    }

    #[test]
    fn scaled_distance_ignores_axes_beyond_ndim() {
        let d = scaled_distance_sq(&[3.0, 4.0, 100.0], &[1.0, 1.0, 1.0], 2);
        assert!((d - 25.0).abs() < 1e-12);
    }

    #[test]
    fn ball_measure_matches_closed_forms() {
        assert!((ball_measure(2.0, 2) - 4.0 * std::f64::consts::PI).abs() < 1e-12);
        let one_ml = ball_measure(6.2035049089940, 3);
        assert!((one_ml - 1000.0).abs() < 1e-6);
    }
}
