//! Volumetric convolution with selectable path and boundary policy.
//!
//! Both paths evaluate the same true N-D convolution; the FFT path exists
//! for large kernels, the direct path for small ones. Normalization is
//! boundary-aware: dividing by the kernel weight
//! actually applied at each voxel keeps a constant volume constant under
//! either policy, instead of darkening toward zero-padded borders.

mod direct;
mod fft;

use ndarray::{ArrayD, Zip};

use crate::kernel::Kernel;
use crate::trace::{trace_debug, trace_span};
use crate::util::{VoxPeakError, VoxPeakResult};
use crate::volume::{Volume, Voxel};

/// How samples beyond the volume bounds contribute.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BoundaryPolicy {
    /// Out-of-bounds samples contribute zero weight and zero value.
    ZeroPad,
    /// Out-of-bounds samples replicate the nearest edge voxel.
    Extend,
}

/// Which convolution path to run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum ConvolveMethod {
    /// Pick by kernel size: direct up to [`DIRECT_TAP_LIMIT`] taps, FFT
    /// beyond.
    #[default]
    Auto,
    /// Nested tap loops in the spatial domain.
    Direct,
    /// Per-axis FFTs with linear-convolution padding.
    Fft,
}

/// Kernel size at which [`ConvolveMethod::Auto`] switches to the FFT path.
pub const DIRECT_TAP_LIMIT: usize = 300;

/// Coverage below this is treated as zero when normalizing.
const MIN_COVERAGE: f64 = 1e-12;

/// Options for [`convolve`].
#[derive(Copy, Clone, Debug)]
pub struct ConvolveOptions {
    /// Divide each voxel by the kernel weight applied there, making the
    /// output a local mean rather than a local sum.
    pub normalize: bool,
    /// Boundary handling for samples outside the volume.
    pub boundary: BoundaryPolicy,
    /// Path selection.
    pub method: ConvolveMethod,
}

impl Default for ConvolveOptions {
    fn default() -> Self {
        Self {
            normalize: true,
            boundary: BoundaryPolicy::ZeroPad,
            method: ConvolveMethod::Auto,
        }
    }
}

enum Path {
    Direct,
    Fft,
}

fn resolve(method: ConvolveMethod, taps: usize) -> Path {
    match method {
        ConvolveMethod::Direct => Path::Direct,
        ConvolveMethod::Fft => Path::Fft,
        ConvolveMethod::Auto => {
            if taps <= DIRECT_TAP_LIMIT {
                Path::Direct
            } else {
                Path::Fft
            }
        }
    }
}

/// Convolves a volume with a kernel.
///
/// The output carries the input's shape and geometry; spacing metadata is
/// preserved untouched. The kernel must match the volume's dimensionality.
pub fn convolve<A: Voxel>(
    input: &Volume<A>,
    kernel: &Kernel,
    options: &ConvolveOptions,
) -> VoxPeakResult<Volume<f64>> {
    if kernel.ndim() != input.ndim() {
        return Err(VoxPeakError::DimensionMismatch {
            expected: input.ndim(),
            got: kernel.ndim(),
        });
    }

    let _guard = trace_span!("convolve", taps = kernel.len()).entered();
    let path = resolve(options.method, kernel.len());
    trace_debug!(
        "convolve_path",
        taps = kernel.len(),
        fft = matches!(path, Path::Fft)
    );

    let data = input.to_f64_array();
    let need_coverage = options.normalize && options.boundary == BoundaryPolicy::ZeroPad;
    let (raw, coverage) = match path {
        Path::Direct => direct::convolve(&data, kernel, options.boundary, need_coverage),
        Path::Fft => fft::convolve(&data, kernel, options.boundary, need_coverage),
    };

    let values = if options.normalize {
        match options.boundary {
            BoundaryPolicy::Extend => {
                let total = kernel.sum();
                if total <= MIN_COVERAGE {
                    ArrayD::zeros(raw.raw_dim())
                } else {
                    raw.mapv(|v| v / total)
                }
            }
            BoundaryPolicy::ZeroPad => {
                let coverage =
                    coverage.expect("coverage computed for zero-pad normalization");
                Zip::from(&raw)
                    .and(&coverage)
                    .map_collect(|&v, &c| if c > MIN_COVERAGE { v / c } else { 0.0 })
            }
        }
    } else {
        raw
    };

    Volume::new(values, input.geometry().clone())
}
