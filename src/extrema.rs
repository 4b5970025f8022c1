//! Constrained extremum search over scored volumes.

use ndarray::{Dimension, IxDyn, Slice, SliceInfoElem};

use crate::geometry::IndexRegion;
use crate::util::{VoxPeakError, VoxPeakResult};
use crate::volume::{LabelVolume, Volume};

/// Location and value of the maximum and minimum found by a search.
#[derive(Clone, Debug, PartialEq)]
pub struct Extrema {
    /// Index of the maximum, in volume coordinates.
    pub max_index: Vec<usize>,
    /// Score at the maximum.
    pub max_value: f64,
    /// Index of the minimum, in volume coordinates.
    pub min_index: Vec<usize>,
    /// Score at the minimum.
    pub min_value: f64,
}

/// Finds the maximum and minimum of `scored` inside `region`, optionally
/// restricted to voxels whose label equals `label`.
///
/// Returns `None` when no voxel qualifies (empty region, label absent, or
/// only NaN scores). Ties resolve to the first voxel in row-major scan
/// order: comparisons are strict and the seeds are infinite, so the rule
/// holds for any finite scores, all-negative volumes included. The region
/// is intersected with the volume bounds before scanning.
pub fn find_extrema(
    scored: &Volume<f64>,
    labels: Option<&LabelVolume>,
    label: u16,
    region: &IndexRegion,
) -> VoxPeakResult<Option<Extrema>> {
    if region.ndim() != scored.ndim() {
        return Err(VoxPeakError::DimensionMismatch {
            expected: scored.ndim(),
            got: region.ndim(),
        });
    }
    if let Some(labels) = labels {
        if labels.shape() != scored.shape() {
            return Err(VoxPeakError::ShapeMismatch {
                expected: scored.shape().to_vec(),
                got: labels.shape().to_vec(),
            });
        }
        if labels.geometry() != scored.geometry() {
            return Err(VoxPeakError::InvalidInput(
                "label volume geometry differs from scored volume",
            ));
        }
    }

    let start: Vec<usize> = region
        .start()
        .iter()
        .zip(scored.shape())
        .map(|(s, &n)| (*s).min(n))
        .collect();
    let end: Vec<usize> = region
        .end()
        .iter()
        .zip(scored.shape())
        .map(|(e, &n)| (*e).min(n))
        .collect();
    if start.iter().zip(&end).any(|(s, e)| s >= e) {
        return Ok(None);
    }
    let info: Vec<SliceInfoElem> = start
        .iter()
        .zip(&end)
        .map(|(&s, &e)| SliceInfoElem::from(Slice::from(s..e)))
        .collect();
    let scores = scored.data().slice(info.as_slice());

    let mut max_value = f64::NEG_INFINITY;
    let mut min_value = f64::INFINITY;
    let mut max_index: Option<Vec<usize>> = None;
    let mut min_index: Option<Vec<usize>> = None;

    let mut consider = |idx: IxDyn, value: f64| {
        if value > max_value {
            max_value = value;
            max_index = Some(absolute(&start, idx.slice()));
        }
        if value < min_value {
            min_value = value;
            min_index = Some(absolute(&start, idx.slice()));
        }
    };

    match labels {
        Some(labels) => {
            let label_view = labels.data().slice(info.as_slice());
            for ((idx, &value), &lab) in scores.indexed_iter().zip(label_view.iter()) {
                if lab != label {
                    continue;
                }
                consider(idx, value);
            }
        }
        None => {
            for (idx, &value) in scores.indexed_iter() {
                consider(idx, value);
            }
        }
    }

    match (max_index, min_index) {
        (Some(max_index), Some(min_index)) => Ok(Some(Extrema {
            max_index,
            max_value,
            min_index,
            min_value,
        })),
        _ => Ok(None),
    }
}

fn absolute(start: &[usize], relative: &[usize]) -> Vec<usize> {
    start.iter().zip(relative).map(|(s, r)| s + r).collect()
}

/// Region whose voxel centers keep a sphere of `margin_mm` radius inside
/// the volume's voxel-center bounding box.
///
/// A margin of zero or less returns the full region. The per-axis shrink is
/// `ceil(margin_mm / spacing + 0.5)` voxels, rounding outward so a sphere
/// centered anywhere in the region cannot poke past the box.
pub fn allowed_region(shape: &[usize], spacing: &[f64], margin_mm: f64) -> IndexRegion {
    debug_assert_eq!(shape.len(), spacing.len());
    let full = IndexRegion::full(shape);
    if margin_mm <= 0.0 {
        return full;
    }
    let margin: Vec<usize> = spacing
        .iter()
        .map(|s| (margin_mm / s + 0.5).ceil() as usize)
        .collect();
    full.shrunk(&margin)
}
