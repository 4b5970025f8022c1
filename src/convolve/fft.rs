//! FFT convolution path.
//!
//! The N-dimensional transform is separable: each axis is handled by 1-D
//! FFTs over every lane along it. Work buffers are zero-padded to
//! `n + k - 1` per axis so the circular convolution equals the linear one,
//! and the output window at the kernel-center offset is cropped out.
//! rustfft transforms are unnormalized; the inverse pass is scaled by
//! `1 / len` once at extraction.

use std::sync::Arc;

use ndarray::{ArrayD, ArrayViewMut1, Axis, IxDyn, Slice, SliceInfoElem, Zip};
use num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use super::BoundaryPolicy;
use crate::kernel::Kernel;

/// Evaluates the true convolution through padded spectral multiplication.
///
/// Same contract as the direct path: raw weighted sums plus the optional
/// `ZeroPad` coverage field (here obtained by convolving a ones-volume with
/// the same kernel spectrum).
pub(crate) fn convolve(
    data: &ArrayD<f64>,
    kernel: &Kernel,
    boundary: BoundaryPolicy,
    need_coverage: bool,
) -> (ArrayD<f64>, Option<ArrayD<f64>>) {
    match boundary {
        BoundaryPolicy::ZeroPad => {
            let plan = FftConvolution::new(data.shape(), kernel);
            let raw = plan.run(data);
            let coverage = if need_coverage {
                Some(plan.run(&ArrayD::ones(data.raw_dim())))
            } else {
                None
            };
            (raw, coverage)
        }
        BoundaryPolicy::Extend => {
            // Edge replication turns the clamp policy into a zero-pad
            // convolution over a larger volume whose interior is cropped back.
            let margin = kernel.center_index();
            let padded = replicate_pad(data, &margin);
            let plan = FftConvolution::new(padded.shape(), kernel);
            let same = plan.run(&padded);
            let raw = crop(&same, &margin, data.shape());
            (raw, None)
        }
    }
}

/// Per-shape FFT plan: padded work shape, axis transforms and the kernel
/// spectrum, reusable across several inputs of the same shape.
struct FftConvolution {
    work_shape: Vec<usize>,
    half: Vec<usize>,
    kernel_spectrum: ArrayD<Complex<f64>>,
    forward: Vec<Arc<dyn Fft<f64>>>,
    inverse: Vec<Arc<dyn Fft<f64>>>,
}

impl FftConvolution {
    fn new(data_shape: &[usize], kernel: &Kernel) -> Self {
        let ndim = data_shape.len();
        let extent = kernel.extent();
        let work_shape: Vec<usize> = (0..ndim).map(|a| data_shape[a] + extent[a] - 1).collect();
        let half = kernel.center_index();

        let mut planner = FftPlanner::<f64>::new();
        let mut forward = Vec::with_capacity(ndim);
        let mut inverse = Vec::with_capacity(ndim);
        for &len in &work_shape {
            forward.push(planner.plan_fft_forward(len));
            inverse.push(planner.plan_fft_inverse(len));
        }

        let mut kernel_spectrum = ArrayD::<Complex<f64>>::zeros(IxDyn(&work_shape));
        {
            let window_info = corner_box(extent);
            let mut window = kernel_spectrum.slice_mut(window_info.as_slice());
            Zip::from(&mut window)
                .and(kernel.weights())
                .for_each(|slot, &w| *slot = Complex::new(w, 0.0));
        }
        for (axis, fft) in forward.iter().enumerate() {
            transform_lanes(&mut kernel_spectrum, Axis(axis), fft.as_ref());
        }

        Self {
            work_shape,
            half,
            kernel_spectrum,
            forward,
            inverse,
        }
    }

    /// Convolves one input of the planned shape, returning the same-size
    /// window.
    fn run(&self, data: &ArrayD<f64>) -> ArrayD<f64> {
        let mut work = ArrayD::<Complex<f64>>::zeros(IxDyn(&self.work_shape));
        {
            let window_info = corner_box(data.shape());
            let mut window = work.slice_mut(window_info.as_slice());
            Zip::from(&mut window)
                .and(data)
                .for_each(|slot, &v| *slot = Complex::new(v, 0.0));
        }

        for (axis, fft) in self.forward.iter().enumerate() {
            transform_lanes(&mut work, Axis(axis), fft.as_ref());
        }
        Zip::from(&mut work)
            .and(&self.kernel_spectrum)
            .for_each(|slot, k| *slot *= *k);
        for (axis, fft) in self.inverse.iter().enumerate() {
            transform_lanes(&mut work, Axis(axis), fft.as_ref());
        }

        let scale = 1.0 / self.work_shape.iter().product::<usize>() as f64;
        let window_info = offset_box(&self.half, data.shape());
        let window = work.slice(window_info.as_slice());
        let mut out = ArrayD::<f64>::zeros(data.raw_dim());
        Zip::from(&mut out)
            .and(&window)
            .for_each(|o, w| *o = w.re * scale);
        out
    }
}

/// Runs one 1-D transform over every lane along `axis`.
fn transform_lanes(work: &mut ArrayD<Complex<f64>>, axis: Axis, fft: &dyn Fft<f64>) {
    let lanes = work.lanes_mut(axis);
    let run_lane = |mut lane: ArrayViewMut1<'_, Complex<f64>>| {
        let mut buf: Vec<Complex<f64>> = lane.iter().copied().collect();
        fft.process(&mut buf);
        for (slot, value) in lane.iter_mut().zip(buf) {
            *slot = value;
        }
    };
    #[cfg(feature = "rayon")]
    Zip::from(lanes).par_for_each(run_lane);
    #[cfg(not(feature = "rayon"))]
    Zip::from(lanes).for_each(run_lane);
}

/// Clamp-pads a volume by `margin` voxels on every face.
fn replicate_pad(data: &ArrayD<f64>, margin: &[usize]) -> ArrayD<f64> {
    let ndim = data.ndim();
    let dims: Vec<usize> = data.shape().to_vec();
    let shape: Vec<usize> = (0..ndim).map(|a| dims[a] + 2 * margin[a]).collect();
    let mut padded = ArrayD::<f64>::zeros(IxDyn(&shape));
    for (idx, slot) in padded.indexed_iter_mut() {
        let mut src = [0usize; 3];
        for axis in 0..ndim {
            let i = idx[axis] as isize - margin[axis] as isize;
            src[axis] = i.clamp(0, dims[axis] as isize - 1) as usize;
        }
        *slot = data[&src[..ndim]];
    }
    padded
}

/// Copies out the box of `shape` voxels starting at `offset`.
fn crop(same: &ArrayD<f64>, offset: &[usize], shape: &[usize]) -> ArrayD<f64> {
    same.slice(offset_box(offset, shape).as_slice()).to_owned()
}

/// Slice info for the box `[0, end)` per axis.
fn corner_box(end: &[usize]) -> Vec<SliceInfoElem> {
    end.iter()
        .map(|&e| SliceInfoElem::from(Slice::from(0..e)))
        .collect()
}

/// Slice info for the box `[offset, offset + len)` per axis.
fn offset_box(offset: &[usize], len: &[usize]) -> Vec<SliceInfoElem> {
    offset
        .iter()
        .zip(len)
        .map(|(&o, &n)| SliceInfoElem::from(Slice::from(o..o + n)))
        .collect()
}
