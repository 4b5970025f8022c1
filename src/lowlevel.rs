//! Low-level building blocks for custom hotspot pipelines.
//!
//! These re-exports give direct access to kernel construction, the
//! convolution paths, extrema search, and sphere rasterization for use
//! cases beyond the packaged pipeline. Most users should prefer the
//! top-level [`HotspotMaskGenerator`](crate::HotspotMaskGenerator).

pub use crate::convolve::{
    convolve, BoundaryPolicy, ConvolveMethod, ConvolveOptions, DIRECT_TAP_LIMIT,
};
pub use crate::extrema::{allowed_region, find_extrema, Extrema};
pub use crate::geometry::{Geometry, IndexRegion, WorldPoint};
pub use crate::kernel::Kernel;
pub use crate::mask::{fill_sphere_mask, MaskGenerator, StaticMaskGenerator};
pub use crate::volume::{LabelVolume, Volume, VolumeSeries, Voxel};
