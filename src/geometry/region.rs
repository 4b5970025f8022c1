//! Axis-aligned index boxes used to constrain searches.

/// Half-open axis-aligned box in index space: `start[i] <= idx[i] < end[i]`.
///
/// Regions may be empty (some axis with `start >= end`); an empty region
/// contains no index and reports zero voxels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexRegion {
    start: Vec<usize>,
    end: Vec<usize>,
}

impl IndexRegion {
    /// Returns the region covering a whole volume of the given shape.
    pub fn full(shape: &[usize]) -> Self {
        Self {
            start: vec![0; shape.len()],
            end: shape.to_vec(),
        }
    }

    /// Returns this region shrunk by a per-axis margin on every face.
    ///
    /// Shrinking saturates: an axis whose extent is smaller than twice the
    /// margin collapses and the region becomes empty.
    pub fn shrunk(&self, margin: &[usize]) -> Self {
        debug_assert_eq!(margin.len(), self.ndim());
        let start = self
            .start
            .iter()
            .zip(margin)
            .map(|(s, m)| s.saturating_add(*m))
            .collect();
        let end = self
            .end
            .iter()
            .zip(margin)
            .map(|(e, m)| e.saturating_sub(*m))
            .collect();
        Self { start, end }
    }

    /// Returns the number of axes.
    pub fn ndim(&self) -> usize {
        self.start.len()
    }

    /// Returns the inclusive lower corner.
    pub fn start(&self) -> &[usize] {
        &self.start
    }

    /// Returns the exclusive upper corner.
    pub fn end(&self) -> &[usize] {
        &self.end
    }

    /// Returns true when no index lies inside the region.
    pub fn is_empty(&self) -> bool {
        self.start.iter().zip(&self.end).any(|(s, e)| s >= e)
    }

    /// Returns the number of voxels inside the region.
    pub fn num_voxels(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        self.start
            .iter()
            .zip(&self.end)
            .map(|(s, e)| e - s)
            .product()
    }

    /// Returns true when `index` lies inside the region.
    pub fn contains(&self, index: &[usize]) -> bool {
        index.len() == self.ndim()
            && index
                .iter()
                .zip(self.start.iter().zip(&self.end))
                .all(|(i, (s, e))| i >= s && i < e)
    }
}
