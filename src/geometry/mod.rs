//! Physical-space metadata for volumes.
//!
//! `Geometry` carries the per-axis voxel spacing, the world position of the
//! index-origin voxel and a direction-cosine matrix, and maps voxel indices
//! into world coordinates. All lengths are in millimetres. Dimensionality is
//! fixed at construction to 2 or 3 axes.

use ndarray::Array2;

use crate::util::{VoxPeakError, VoxPeakResult};

pub mod region;

pub use region::IndexRegion;

/// Tolerance for the orthonormality check of direction matrices.
const DIRECTION_TOL: f64 = 1e-6;

/// Physical metadata of a volume: spacing, origin and direction cosines.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    spacing: Vec<f64>,
    origin: Vec<f64>,
    direction: Array2<f64>,
}

impl Geometry {
    /// Creates a geometry from explicit spacing, origin and direction.
    ///
    /// The direction matrix must be orthonormal; spacing entries must be
    /// finite and strictly positive; all parts must agree on a 2-D or 3-D
    /// dimensionality.
    pub fn new(spacing: Vec<f64>, origin: Vec<f64>, direction: Array2<f64>) -> VoxPeakResult<Self> {
        let ndim = spacing.len();
        if !(2..=3).contains(&ndim) {
            return Err(VoxPeakError::UnsupportedDimension { ndim });
        }
        if origin.len() != ndim {
            return Err(VoxPeakError::InvalidGeometry {
                reason: "origin length differs from spacing length",
            });
        }
        if direction.shape() != [ndim, ndim] {
            return Err(VoxPeakError::InvalidGeometry {
                reason: "direction matrix shape differs from spacing length",
            });
        }
        if spacing.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(VoxPeakError::InvalidGeometry {
                reason: "spacing entries must be finite and positive",
            });
        }
        if origin.iter().any(|o| !o.is_finite()) {
            return Err(VoxPeakError::InvalidGeometry {
                reason: "origin entries must be finite",
            });
        }
        let gram = direction.t().dot(&direction);
        let identity = Array2::<f64>::eye(ndim);
        let max_dev = gram
            .iter()
            .zip(identity.iter())
            .map(|(g, i)| (g - i).abs())
            .fold(0.0f64, f64::max);
        if !max_dev.is_finite() || max_dev > DIRECTION_TOL {
            return Err(VoxPeakError::InvalidGeometry {
                reason: "direction matrix is not orthonormal",
            });
        }
        Ok(Self {
            spacing,
            origin,
            direction,
        })
    }

    /// Creates a geometry with zero origin and identity direction.
    pub fn axis_aligned(spacing: &[f64]) -> VoxPeakResult<Self> {
        let ndim = spacing.len();
        if !(2..=3).contains(&ndim) {
            return Err(VoxPeakError::UnsupportedDimension { ndim });
        }
        Self::new(spacing.to_vec(), vec![0.0; ndim], Array2::eye(ndim))
    }

    /// Returns the number of axes (2 or 3).
    pub fn ndim(&self) -> usize {
        self.spacing.len()
    }

    /// Returns the per-axis voxel spacing in millimetres.
    pub fn spacing(&self) -> &[f64] {
        &self.spacing
    }

    /// Returns the world position of the voxel at index zero.
    pub fn origin(&self) -> &[f64] {
        &self.origin
    }

    /// Returns the direction-cosine matrix.
    pub fn direction(&self) -> &Array2<f64> {
        &self.direction
    }

    /// Maps a voxel index to its world position.
    ///
    /// `index` must have one entry per geometry axis.
    pub fn index_to_world(&self, index: &[usize]) -> WorldPoint {
        let ndim = self.ndim();
        debug_assert_eq!(index.len(), ndim);
        let mut scaled = [0.0f64; 3];
        for axis in 0..ndim {
            scaled[axis] = index[axis] as f64 * self.spacing[axis];
        }
        let mut coords = [0.0f64; 3];
        for row in 0..ndim {
            let mut acc = self.origin[row];
            for col in 0..ndim {
                acc += self.direction[[row, col]] * scaled[col];
            }
            coords[row] = acc;
        }
        WorldPoint { coords, ndim }
    }
}

/// A point in world coordinates, with 2 or 3 active axes.
///
/// Storage is a fixed three-slot array so the type stays `Copy` for both
/// dimensionalities; unused slots are zero.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WorldPoint {
    coords: [f64; 3],
    ndim: usize,
}

impl WorldPoint {
    /// Creates a point from 2 or 3 world coordinates.
    pub fn new(coords: &[f64]) -> VoxPeakResult<Self> {
        let ndim = coords.len();
        if !(2..=3).contains(&ndim) {
            return Err(VoxPeakError::UnsupportedDimension { ndim });
        }
        let mut fixed = [0.0f64; 3];
        fixed[..ndim].copy_from_slice(coords);
        Ok(Self {
            coords: fixed,
            ndim,
        })
    }

    /// Returns the active coordinates.
    pub fn coords(&self) -> &[f64] {
        &self.coords[..self.ndim]
    }

    /// Returns the number of active axes.
    pub fn ndim(&self) -> usize {
        self.ndim
    }

    /// Euclidean distance to another point of the same dimensionality.
    pub fn distance_to(&self, other: &WorldPoint) -> f64 {
        debug_assert_eq!(self.ndim, other.ndim);
        let mut acc = 0.0;
        for axis in 0..self.ndim {
            let d = self.coords[axis] - other.coords[axis];
            acc += d * d;
        }
        acc.sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::{Geometry, WorldPoint};
    use ndarray::array;

    #[test]
    fn index_to_world_applies_spacing_and_origin() {
        let geom = Geometry::new(
            vec![2.0, 1.0, 0.5],
            vec![10.0, -5.0, 0.0],
            ndarray::Array2::eye(3),
        )
        .unwrap();
        let p = geom.index_to_world(&[3, 4, 8]);
        assert_eq!(p.coords(), &[16.0, -1.0, 4.0]);
    }

    #[test]
    fn index_to_world_honours_direction() {
        // Quarter-turn in the plane: axis 0 of index space points along
        // world axis 1.
        let rot = array![[0.0, -1.0], [1.0, 0.0]];
        let geom = Geometry::new(vec![1.0, 1.0], vec![0.0, 0.0], rot).unwrap();
        let p = geom.index_to_world(&[2, 0]);
        assert_eq!(p.coords(), &[0.0, 2.0]);
    }

    #[test]
    fn distance_is_rotation_invariant() {
        let a = WorldPoint::new(&[1.0, 2.0, 2.0]).unwrap();
        let b = WorldPoint::new(&[0.0, 0.0, 0.0]).unwrap();
        assert!((a.distance_to(&b) - 3.0).abs() < 1e-12);
    }
}
