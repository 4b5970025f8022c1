//! Sphere masks and mask-generator collaborators.

use ndarray::{ArrayD, Dimension, IxDyn};

use crate::geometry::{Geometry, WorldPoint};
use crate::util::{VoxPeakError, VoxPeakResult};
use crate::volume::{LabelVolume, Volume};

/// Rasterizes a solid sphere as a binary label volume.
///
/// Every voxel whose world position lies within `radius_mm` of `center`
/// (boundary inclusive) is set to 1, the rest to 0. This is deliberately
/// the simple full-volume scan; a center outside the volume yields an
/// all-zero mask rather than an error.
pub fn fill_sphere_mask(
    shape: &[usize],
    geometry: &Geometry,
    center: &WorldPoint,
    radius_mm: f64,
) -> VoxPeakResult<LabelVolume> {
    if shape.len() != geometry.ndim() {
        return Err(VoxPeakError::DimensionMismatch {
            expected: geometry.ndim(),
            got: shape.len(),
        });
    }
    if center.ndim() != geometry.ndim() {
        return Err(VoxPeakError::DimensionMismatch {
            expected: geometry.ndim(),
            got: center.ndim(),
        });
    }
    if !radius_mm.is_finite() {
        return Err(VoxPeakError::InvalidRadius { radius: radius_mm });
    }

    let mut data = ArrayD::<u16>::zeros(IxDyn(shape));
    for (idx, voxel) in data.indexed_iter_mut() {
        let world = geometry.index_to_world(idx.slice());
        if world.distance_to(center) <= radius_mm {
            *voxel = 1;
        }
    }
    Volume::new(data, geometry.clone())
}

/// Source of label volumes, one per time step.
///
/// `version` is a change counter: implementors give it a new value whenever
/// the masks they would hand out may have changed. Consumers compare
/// snapshots of it for equality instead of relying on wall-clock stamps.
pub trait MaskGenerator {
    /// Returns the label volume for `time_step`.
    fn mask(&mut self, time_step: usize) -> VoxPeakResult<&LabelVolume>;

    /// Returns the current version counter.
    fn version(&self) -> u64;
}

/// A [`MaskGenerator`] over precomputed label volumes.
pub struct StaticMaskGenerator {
    frames: Vec<LabelVolume>,
    version: u64,
}

impl StaticMaskGenerator {
    /// Creates a generator over one or more label frames sharing a shape
    /// and geometry.
    pub fn new(frames: Vec<LabelVolume>) -> VoxPeakResult<Self> {
        Self::validate(&frames)?;
        Ok(Self { frames, version: 1 })
    }

    /// Replaces all frames and bumps the version.
    pub fn replace_frames(&mut self, frames: Vec<LabelVolume>) -> VoxPeakResult<()> {
        Self::validate(&frames)?;
        self.frames = frames;
        self.version += 1;
        Ok(())
    }

    /// Returns the number of frames.
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    fn validate(frames: &[LabelVolume]) -> VoxPeakResult<()> {
        if frames.is_empty() {
            return Err(VoxPeakError::InvalidInput(
                "mask generator needs at least one frame",
            ));
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
                    "mask frames must share one geometry",
                ));
            }
        }
        Ok(())
    }
}

impl MaskGenerator for StaticMaskGenerator {
    fn mask(&mut self, time_step: usize) -> VoxPeakResult<&LabelVolume> {
        let frames = self.frames.len();
        self.frames
            .get(time_step)
            .ok_or(VoxPeakError::InvalidTimeStep { time_step, frames })
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::{fill_sphere_mask, MaskGenerator, StaticMaskGenerator};
    use crate::geometry::{Geometry, WorldPoint};
    use crate::util::VoxPeakError;
    use crate::volume::Volume;
    use ndarray::{arr2, Dimension};

    #[test]
    fn sphere_mask_matches_distance_predicate() {
        let geometry = Geometry::axis_aligned(&[1.0, 1.0, 1.0]).unwrap();
        let center = WorldPoint::new(&[5.0, 5.0, 5.0]).unwrap();
        let mask = fill_sphere_mask(&[10, 10, 10], &geometry, &center, 2.0).unwrap();

        let mut ones = 0usize;
        for (idx, &value) in mask.data().indexed_iter() {
            let world = geometry.index_to_world(idx.slice());
            let expected = u16::from(world.distance_to(&center) <= 2.0);
            assert_eq!(value, expected);
            ones += usize::from(value);
        }
        // Lattice points within distance 2 of an interior center.
        assert_eq!(ones, 33);
    }

    #[test]
    fn sphere_boundary_is_inclusive() {
        let geometry = Geometry::axis_aligned(&[1.0, 1.0]).unwrap();
        let center = WorldPoint::new(&[0.0, 0.0]).unwrap();
        let mask = fill_sphere_mask(&[5, 5], &geometry, &center, 3.0).unwrap();
        assert_eq!(*mask.get(&[3, 0]).unwrap(), 1);
        assert_eq!(*mask.get(&[4, 0]).unwrap(), 0);
        assert_eq!(*mask.get(&[3, 1]).unwrap(), 0);
    }

    #[test]
    fn anisotropic_spacing_scales_the_sphere() {
        let geometry = Geometry::axis_aligned(&[1.0, 1.0, 2.0]).unwrap();
        let center = WorldPoint::new(&[4.0, 4.0, 4.0]).unwrap();
        let mask = fill_sphere_mask(&[9, 9, 9], &geometry, &center, 2.1).unwrap();
        assert_eq!(*mask.get(&[4, 4, 2]).unwrap(), 1);
        assert_eq!(*mask.get(&[4, 4, 1]).unwrap(), 1);
        assert_eq!(*mask.get(&[4, 4, 3]).unwrap(), 1);
        assert_eq!(*mask.get(&[2, 4, 2]).unwrap(), 1);
        assert_eq!(*mask.get(&[1, 4, 2]).unwrap(), 0);
        assert_eq!(*mask.get(&[4, 4, 0]).unwrap(), 0);
    }

    #[test]
    fn rotated_direction_preserves_the_sphere() {
        // A pure rotation preserves world distances, so the mask must match
        // the axis-aligned mask of the same center voxel exactly.
        let rotated = Geometry::new(
            vec![1.0, 1.0],
            vec![0.0, 0.0],
            arr2(&[[0.0, -1.0], [1.0, 0.0]]),
        )
        .unwrap();
        let aligned = Geometry::axis_aligned(&[1.0, 1.0]).unwrap();

        let center_rot = rotated.index_to_world(&[4, 4]);
        let center_ali = aligned.index_to_world(&[4, 4]);
        let mask_rot = fill_sphere_mask(&[9, 9], &rotated, &center_rot, 2.5).unwrap();
        let mask_ali = fill_sphere_mask(&[9, 9], &aligned, &center_ali, 2.5).unwrap();

        assert_eq!(mask_rot.data(), mask_ali.data());
        assert_eq!(mask_rot.data().iter().filter(|&&v| v == 1).count(), 21);
    }

    #[test]
    fn far_center_yields_empty_mask() {
        let geometry = Geometry::axis_aligned(&[1.0, 1.0]).unwrap();
        let center = WorldPoint::new(&[100.0, 100.0]).unwrap();
        let mask = fill_sphere_mask(&[6, 6], &geometry, &center, 3.0).unwrap();
        assert!(mask.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn static_generator_selects_frames_and_versions() {
        let geometry = Geometry::axis_aligned(&[1.0, 1.0]).unwrap();
        let frame0 = Volume::from_elem(&[4, 4], geometry.clone(), 0u16).unwrap();
        let frame1 = Volume::from_elem(&[4, 4], geometry.clone(), 1u16).unwrap();
        let mut source = StaticMaskGenerator::new(vec![frame0, frame1]).unwrap();
        assert_eq!(source.version(), 1);
        assert_eq!(*source.mask(1).unwrap().get(&[0, 0]).unwrap(), 1);

        let err = source.mask(2).err().unwrap();
        assert_eq!(
            err,
            VoxPeakError::InvalidTimeStep {
                time_step: 2,
                frames: 2,
            }
        );

        let frame = Volume::from_elem(&[4, 4], geometry, 2u16).unwrap();
        source.replace_frames(vec![frame]).unwrap();
        assert_eq!(source.version(), 2);
        assert_eq!(source.num_frames(), 1);
    }
}
