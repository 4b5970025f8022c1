//! Direct (spatial-domain) convolution path.

use ndarray::{ArrayD, Dimension, IntoDimension, Ix2, Ix3, Zip};

use super::BoundaryPolicy;
use crate::kernel::Kernel;

/// Evaluates the true convolution tap by tap.
///
/// Returns the raw weighted sums and, when requested, the per-voxel sum of
/// kernel weight that fell inside the volume (the `ZeroPad` coverage field).
/// Zero-weight taps are skipped; they contribute to neither sum.
pub(crate) fn convolve(
    data: &ArrayD<f64>,
    kernel: &Kernel,
    boundary: BoundaryPolicy,
    need_coverage: bool,
) -> (ArrayD<f64>, Option<ArrayD<f64>>) {
    let ndim = data.ndim();
    let dims: Vec<usize> = data.shape().to_vec();
    let half: Vec<isize> = kernel
        .extent()
        .iter()
        .map(|n| ((n - 1) / 2) as isize)
        .collect();
    let weights = kernel.weights();

    let eval = |idx: &[usize]| -> (f64, f64) {
        let mut sum = 0.0;
        let mut used = 0.0;
        for (kidx, &w) in weights.indexed_iter() {
            if w == 0.0 {
                continue;
            }
            let mut sample = [0usize; 3];
            let mut inside = true;
            for axis in 0..ndim {
                let q = idx[axis] as isize + half[axis] - kidx[axis] as isize;
                if q < 0 || q >= dims[axis] as isize {
                    match boundary {
                        BoundaryPolicy::ZeroPad => {
                            inside = false;
                            break;
                        }
                        BoundaryPolicy::Extend => {
                            sample[axis] = q.clamp(0, dims[axis] as isize - 1) as usize;
                        }
                    }
                } else {
                    sample[axis] = q as usize;
                }
            }
            if inside {
                sum += w * data[&sample[..ndim]];
                used += w;
            }
        }
        (sum, used)
    };

    let mut out = ArrayD::<f64>::zeros(data.raw_dim());
    let mut coverage = if need_coverage {
        Some(ArrayD::<f64>::zeros(data.raw_dim()))
    } else {
        None
    };

    // `Zip::indexed` requires a statically sized dimension, so dispatch on
    // the 2-D/3-D dimensionality that `Volume::new` guarantees.
    match ndim {
        2 => fill_indexed::<Ix2>(&mut out, coverage.as_mut(), &eval),
        3 => fill_indexed::<Ix3>(&mut out, coverage.as_mut(), &eval),
        _ => unreachable!("volumes are validated as 2-D or 3-D"),
    }

    (out, coverage)
}

/// Writes `eval` results into `out` (and `coverage`, when present) through
/// statically dimensioned views of the buffers.
fn fill_indexed<D: Dimension + Copy>(
    out: &mut ArrayD<f64>,
    coverage: Option<&mut ArrayD<f64>>,
    eval: &(impl Fn(&[usize]) -> (f64, f64) + Sync),
) where
    D::Pattern: Send,
{
    let out = out
        .view_mut()
        .into_dimensionality::<D>()
        .expect("dispatched dimensionality matches");
    let coverage = coverage.map(|cov| {
        cov.view_mut()
            .into_dimensionality::<D>()
            .expect("dispatched dimensionality matches")
    });

    match coverage {
        Some(cov) => {
            let zip = Zip::indexed(out).and(cov);
            let fill = |idx: D::Pattern, out_v: &mut f64, cov_v: &mut f64| {
                let idx = idx.into_dimension();
                let (sum, used) = eval(idx.slice());
                *out_v = sum;
                *cov_v = used;
            };
            #[cfg(feature = "rayon")]
            zip.par_for_each(fill);
            #[cfg(not(feature = "rayon"))]
            zip.for_each(fill);
        }
        None => {
            let zip = Zip::indexed(out);
            let fill = |idx: D::Pattern, out_v: &mut f64| {
                let idx = idx.into_dimension();
                *out_v = eval(idx.slice()).0;
            };
            #[cfg(feature = "rayon")]
            zip.par_for_each(fill);
            #[cfg(not(feature = "rayon"))]
            zip.for_each(fill);
        }
    }
}
