//! Scalar volumes with physical metadata.
//!
//! `Volume` binds an N-dimensional sample array to a [`Geometry`] and is the
//! unit the engine operates on; `VolumeSeries` stacks frames of identical
//! shape and geometry for time-resolved data. Dimensionality is validated at
//! construction, so every `Volume` the rest of the crate sees is 2-D or 3-D.

use ndarray::{ArrayD, IxDyn};

use crate::geometry::{Geometry, WorldPoint};
use crate::util::{VoxPeakError, VoxPeakResult};

/// Scalar sample types accepted as engine input.
pub trait Voxel: Copy + 'static {
    /// Widens the sample to the convolver's working precision.
    fn as_f64(self) -> f64;
}

macro_rules! impl_voxel {
    ($($t:ty),* $(,)?) => {
        $(impl Voxel for $t {
            #[inline]
            fn as_f64(self) -> f64 {
                self as f64
            }
        })*
    };
}

impl_voxel!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

/// An N-dimensional scalar array bound to its physical geometry.
#[derive(Clone, Debug)]
pub struct Volume<A> {
    data: ArrayD<A>,
    geometry: Geometry,
}

impl<A> Volume<A> {
    /// Creates a volume from sample data and its geometry.
    ///
    /// The data must be 2-D or 3-D with no empty axis, and its
    /// dimensionality must match the geometry.
    pub fn new(data: ArrayD<A>, geometry: Geometry) -> VoxPeakResult<Self> {
        let ndim = data.ndim();
        if !(2..=3).contains(&ndim) {
            return Err(VoxPeakError::UnsupportedDimension { ndim });
        }
        if ndim != geometry.ndim() {
            return Err(VoxPeakError::DimensionMismatch {
                expected: geometry.ndim(),
                got: ndim,
            });
        }
        if data.shape().iter().any(|&n| n == 0) {
            return Err(VoxPeakError::InvalidInput("volume axes must be non-empty"));
        }
        Ok(Self { data, geometry })
    }

    /// Creates a volume of the given shape filled with one value.
    pub fn from_elem(shape: &[usize], geometry: Geometry, value: A) -> VoxPeakResult<Self>
    where
        A: Clone,
    {
        Self::new(ArrayD::from_elem(IxDyn(shape), value), geometry)
    }

    /// Returns the sample array.
    pub fn data(&self) -> &ArrayD<A> {
        &self.data
    }

    /// Returns the physical geometry.
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Returns the shape in voxels per axis.
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Returns the number of axes (2 or 3).
    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    /// Returns the sample at `index` if it is within bounds.
    pub fn get(&self, index: &[usize]) -> Option<&A> {
        self.data.get(index)
    }

    /// Maps a voxel index to its world position.
    pub fn index_to_world(&self, index: &[usize]) -> WorldPoint {
        self.geometry.index_to_world(index)
    }
}

impl<A: Voxel> Volume<A> {
    /// Copies the samples into an `f64` array for numeric processing.
    pub(crate) fn to_f64_array(&self) -> ArrayD<f64> {
        self.data.mapv(Voxel::as_f64)
    }
}

/// Label image element type: masks hold `0` outside, a label value inside.
pub type LabelVolume = Volume<u16>;

/// A non-empty sequence of frames sharing one shape and geometry.
#[derive(Clone, Debug)]
pub struct VolumeSeries<A> {
    frames: Vec<Volume<A>>,
}

impl<A> VolumeSeries<A> {
    /// Creates a series from one or more frames.
    ///
    /// All frames must share the shape and geometry of the first.
    pub fn new(frames: Vec<Volume<A>>) -> VoxPeakResult<Self> {
        if frames.is_empty() {
            return Err(VoxPeakError::InvalidInput("series needs at least one frame"));
        }
        for frame in &frames[1..] {
            if frame.shape() != frames[0].shape() {
                return Err(VoxPeakError::ShapeMismatch {
                    expected: frames[0].shape().to_vec(),
                    got: frame.shape().to_vec(),
                });
            }
            if frame.geometry() != frames[0].geometry() {
                return Err(VoxPeakError::InvalidInput(
                    "series frames must share one geometry",
                ));
            }
        }
        Ok(Self { frames })
    }

    /// Returns the frame at `time_step`.
    pub fn frame(&self, time_step: usize) -> VoxPeakResult<&Volume<A>> {
        self.frames.get(time_step).ok_or(VoxPeakError::InvalidTimeStep {
            time_step,
            frames: self.frames.len(),
        })
    }

    /// Returns the number of frames.
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Returns the shared geometry.
    pub fn geometry(&self) -> &Geometry {
        self.frames[0].geometry()
    }

    /// Returns the shared shape.
    pub fn shape(&self) -> &[usize] {
        self.frames[0].shape()
    }

    /// Returns the number of axes (2 or 3).
    pub fn ndim(&self) -> usize {
        self.frames[0].ndim()
    }
}

impl<A> From<Volume<A>> for VolumeSeries<A> {
    fn from(volume: Volume<A>) -> Self {
        Self {
            frames: vec![volume],
        }
    }
}
