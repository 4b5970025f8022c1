//! Error types for voxpeak.

use thiserror::Error;

/// Result alias for voxpeak operations.
pub type VoxPeakResult<T> = std::result::Result<T, VoxPeakError>;

/// Errors that can occur when running voxpeak algorithms.
#[derive(Debug, Error, PartialEq)]
pub enum VoxPeakError {
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// No input volume has been set on the generator.
    #[error("no input volume set")]
    MissingInput,
    /// Physical metadata failed validation.
    #[error("invalid geometry: {reason}")]
    InvalidGeometry { reason: &'static str },
    /// The volume dimensionality is outside the supported 2D/3D range.
    #[error("unsupported dimension: {ndim} (expected 2 or 3)")]
    UnsupportedDimension { ndim: usize },
    /// Two inputs that must share a dimensionality do not.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    /// Two inputs that must share a shape do not.
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },
    /// The requested time step does not exist in the input series.
    #[error("invalid time step: {time_step} (series has {frames} frames)")]
    InvalidTimeStep { time_step: usize, frames: usize },
    /// The search radius is not a positive finite length.
    #[error("invalid radius: {radius} mm")]
    InvalidRadius { radius: f64 },
    /// No voxel survived the search constraints, so no peak is defined.
    #[error("no hotspot found within the search constraints")]
    NoHotspotFound,
}
