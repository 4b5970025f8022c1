//! VoxPeak locates the hottest spherical neighborhood of a voxel volume.
//!
//! The crate convolves a 2D or 3D volume with a sphere-shaped averaging
//! kernel, finds the maximum of the local mean inside an allowed region
//! (optionally restricted to labeled voxels of a companion mask), and
//! rasterizes a sphere of the same radius at the winning position as a
//! binary label mask. Direct and FFT convolution paths are provided, with
//! optional parallelism via the `rayon` feature.

pub mod convolve;
pub mod extrema;
pub mod geometry;
pub mod hotspot;
pub mod kernel;
pub mod lowlevel;
pub mod mask;
mod trace;
pub mod util;
pub mod volume;

pub use geometry::{Geometry, IndexRegion, WorldPoint};
pub use kernel::Kernel;
pub use util::{VoxPeakError, VoxPeakResult};
pub use volume::{LabelVolume, Volume, VolumeSeries, Voxel};

pub use convolve::{convolve, BoundaryPolicy, ConvolveMethod, ConvolveOptions};
pub use extrema::{allowed_region, find_extrema, Extrema};
pub use hotspot::{HotspotConfig, HotspotMaskGenerator, DEFAULT_RADIUS_MM};
pub use mask::{fill_sphere_mask, MaskGenerator, StaticMaskGenerator};
