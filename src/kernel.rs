//! Spherical averaging kernels.
//!
//! A kernel discretizes a physical sphere onto the voxel grid of the volume
//! it will be convolved with. Each voxel weight is the fraction of that voxel
//! covered by the sphere, estimated by sub-voxel sampling: every voxel is
//! split into two sub-cells per axis and each sub-cell center is tested
//! against the radius in millimetres. Weights are left unnormalized; the
//! convolver decides how to normalize per boundary policy.

use ndarray::{ArrayD, IxDyn};

use crate::trace::trace_debug;
use crate::util::math::scaled_distance_sq;
use crate::util::{VoxPeakError, VoxPeakResult};

/// Sub-cells per axis used to estimate partial voxel coverage.
const SUB_CELLS_PER_AXIS: usize = 2;

/// A convolution kernel on a voxel grid with known spacing.
///
/// Extents are odd along every axis so the kernel has a unique center voxel.
#[derive(Clone, Debug)]
pub struct Kernel {
    weights: ArrayD<f64>,
    spacing: Vec<f64>,
}

impl Kernel {
    /// Builds the spherical kernel for a grid spacing and a radius in
    /// millimetres.
    ///
    /// The extent along axis `i` is `2 * radius / spacing[i]` truncated,
    /// incremented to the next odd count. A radius too small to reach any
    /// sub-cell center yields a single-voxel kernel with unit weight rather
    /// than an empty one.
    pub fn sphere(spacing: &[f64], radius_mm: f64) -> VoxPeakResult<Self> {
        let ndim = spacing.len();
        if !(2..=3).contains(&ndim) {
            return Err(VoxPeakError::UnsupportedDimension { ndim });
        }
        if spacing.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(VoxPeakError::InvalidGeometry {
                reason: "spacing entries must be finite and positive",
            });
        }
        if !radius_mm.is_finite() || radius_mm <= 0.0 {
            return Err(VoxPeakError::InvalidRadius { radius: radius_mm });
        }

        let mut extent = vec![0usize; ndim];
        let mut center = [0.0f64; 3];
        for axis in 0..ndim {
            let mut count = (2.0 * radius_mm / spacing[axis]) as usize;
            if count % 2 == 0 {
                count += 1;
            }
            extent[axis] = count;
            center[axis] = 0.5 * (count as f64 - 1.0);
        }

        let sub_size = 1.0 / SUB_CELLS_PER_AXIS as f64;
        let sub_fraction = sub_size.powi(ndim as i32);
        let sub_combos = SUB_CELLS_PER_AXIS.pow(ndim as u32);
        let radius_sq = radius_mm * radius_mm;

        let mut weights = ArrayD::<f64>::zeros(IxDyn(&extent));
        for (idx, weight) in weights.indexed_iter_mut() {
            let mut covered = 0.0;
            for combo in 0..sub_combos {
                let mut offset = [0.0f64; 3];
                for axis in 0..ndim {
                    let cell = (combo >> axis) & 1;
                    let sub_center = -0.5 + sub_size * (cell as f64 + 0.5);
                    offset[axis] = idx[axis] as f64 + sub_center - center[axis];
                }
                if scaled_distance_sq(&offset, spacing, ndim) <= radius_sq {
                    covered += sub_fraction;
                }
            }
            *weight = covered;
        }

        if weights.sum() <= 0.0 {
            let center_idx: Vec<usize> = extent.iter().map(|n| (n - 1) / 2).collect();
            weights[IxDyn(&center_idx)] = 1.0;
        }

        trace_debug!(
            "sphere_kernel_built",
            radius_mm = radius_mm,
            taps = weights.len()
        );

        Ok(Self {
            weights,
            spacing: spacing.to_vec(),
        })
    }

    /// Returns the weights.
    pub fn weights(&self) -> &ArrayD<f64> {
        &self.weights
    }

    /// Returns the grid spacing the kernel was built for.
    pub fn spacing(&self) -> &[f64] {
        &self.spacing
    }

    /// Returns the extent in voxels per axis (always odd).
    pub fn extent(&self) -> &[usize] {
        self.weights.shape()
    }

    /// Returns the index of the center voxel.
    pub fn center_index(&self) -> Vec<usize> {
        self.extent().iter().map(|n| (n - 1) / 2).collect()
    }

    /// Returns the number of taps.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Returns true when the kernel has no taps (never for built kernels).
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Returns the total weight.
    pub fn sum(&self) -> f64 {
        self.weights.sum()
    }

    /// Returns the number of axes.
    pub fn ndim(&self) -> usize {
        self.weights.ndim()
    }
}
