use ndarray::{arr2, ArrayD, IxDyn};
use voxpeak::{Geometry, StaticMaskGenerator, Volume, VolumeSeries, VoxPeakError, WorldPoint};

#[test]
fn geometry_rejects_unsupported_dimensionality() {
    let err = Geometry::axis_aligned(&[1.0]).err().unwrap();
    assert_eq!(err, VoxPeakError::UnsupportedDimension { ndim: 1 });

    let err = Geometry::axis_aligned(&[1.0, 1.0, 1.0, 1.0]).err().unwrap();
    assert_eq!(err, VoxPeakError::UnsupportedDimension { ndim: 4 });
}

#[test]
fn geometry_rejects_nonpositive_spacing() {
    let err = Geometry::axis_aligned(&[1.0, 0.0, 1.0]).err().unwrap();
    assert_eq!(
        err,
        VoxPeakError::InvalidGeometry {
            reason: "spacing entries must be finite and positive",
        }
    );

    let err = Geometry::axis_aligned(&[1.0, -2.0]).err().unwrap();
    assert_eq!(
        err,
        VoxPeakError::InvalidGeometry {
            reason: "spacing entries must be finite and positive",
        }
    );
}

#[test]
fn geometry_rejects_mismatched_origin() {
    let direction = arr2(&[[1.0, 0.0], [0.0, 1.0]]);
    let err = Geometry::new(vec![1.0, 1.0], vec![0.0], direction)
        .err()
        .unwrap();
    assert_eq!(
        err,
        VoxPeakError::InvalidGeometry {
            reason: "origin length differs from spacing length",
        }
    );
}

#[test]
fn geometry_rejects_non_orthonormal_direction() {
    let direction = arr2(&[[1.0, 0.0], [0.0, 2.0]]);
    let err = Geometry::new(vec![1.0, 1.0], vec![0.0, 0.0], direction)
        .err()
        .unwrap();
    assert_eq!(
        err,
        VoxPeakError::InvalidGeometry {
            reason: "direction matrix is not orthonormal",
        }
    );
}

#[test]
fn rotated_geometry_maps_indices_to_world() {
    // 90 degree rotation: the first index axis maps onto world y, the
    // second onto negative world x.
    let direction = arr2(&[[0.0, -1.0], [1.0, 0.0]]);
    let geometry = Geometry::new(vec![2.0, 3.0], vec![10.0, 20.0], direction).unwrap();

    let point = geometry.index_to_world(&[4, 5]);
    assert_eq!(point.ndim(), 2);
    assert!((point.coords()[0] - (-5.0)).abs() < 1e-12);
    assert!((point.coords()[1] - 28.0).abs() < 1e-12);
}

#[test]
fn world_point_distance_is_euclidean() {
    let a = WorldPoint::new(&[1.0, 2.0, 3.0]).unwrap();
    let b = WorldPoint::new(&[1.0, 6.0, 6.0]).unwrap();
    assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);

    let err = WorldPoint::new(&[1.0]).err().unwrap();
    assert_eq!(err, VoxPeakError::UnsupportedDimension { ndim: 1 });
}

#[test]
fn volume_rejects_geometry_dimension_mismatch() {
    let data = ArrayD::<f32>::zeros(IxDyn(&[3, 3, 3]));
    let geometry = Geometry::axis_aligned(&[1.0, 1.0]).unwrap();
    let err = Volume::new(data, geometry).err().unwrap();
    assert_eq!(err, VoxPeakError::DimensionMismatch { expected: 2, got: 3 });
}

#[test]
fn volume_rejects_empty_axis() {
    let data = ArrayD::<f32>::zeros(IxDyn(&[4, 0]));
    let geometry = Geometry::axis_aligned(&[1.0, 1.0]).unwrap();
    let err = Volume::new(data, geometry).err().unwrap();
    assert_eq!(err, VoxPeakError::InvalidInput("volume axes must be non-empty"));
}

#[test]
fn volume_get_checks_bounds() {
    let geometry = Geometry::axis_aligned(&[1.0, 1.0]).unwrap();
    let mut data = ArrayD::<i16>::zeros(IxDyn(&[2, 3]));
    data[[1, 2]] = 7;
    let volume = Volume::new(data, geometry).unwrap();

    assert_eq!(volume.get(&[1, 2]).copied(), Some(7));
    assert_eq!(volume.get(&[0, 0]).copied(), Some(0));
    assert!(volume.get(&[2, 0]).is_none());
    assert!(volume.get(&[0, 3]).is_none());
}

#[test]
fn series_rejects_empty_and_mixed_frames() {
    let err = VolumeSeries::<f32>::new(Vec::new()).err().unwrap();
    assert_eq!(err, VoxPeakError::InvalidInput("series needs at least one frame"));

    let geometry = Geometry::axis_aligned(&[1.0, 1.0]).unwrap();
    let a = Volume::from_elem(&[4, 4], geometry.clone(), 0.0f32).unwrap();
    let b = Volume::from_elem(&[4, 5], geometry, 0.0f32).unwrap();
    let err = VolumeSeries::new(vec![a, b]).err().unwrap();
    assert_eq!(
        err,
        VoxPeakError::ShapeMismatch {
            expected: vec![4, 4],
            got: vec![4, 5],
        }
    );

    let coarse = Geometry::axis_aligned(&[1.0, 1.0]).unwrap();
    let fine = Geometry::axis_aligned(&[0.5, 0.5]).unwrap();
    let a = Volume::from_elem(&[4, 4], coarse, 0.0f32).unwrap();
    let b = Volume::from_elem(&[4, 4], fine, 0.0f32).unwrap();
    let err = VolumeSeries::new(vec![a, b]).err().unwrap();
    assert_eq!(
        err,
        VoxPeakError::InvalidInput("series frames must share one geometry"),
    );
}

#[test]
fn series_frame_lookup_checks_time_step() {
    let geometry = Geometry::axis_aligned(&[1.0, 1.0]).unwrap();
    let a = Volume::from_elem(&[4, 4], geometry.clone(), 1.0f32).unwrap();
    let b = Volume::from_elem(&[4, 4], geometry, 2.0f32).unwrap();
    let series = VolumeSeries::new(vec![a, b]).unwrap();

    assert_eq!(series.num_frames(), 2);
    assert_eq!(series.frame(1).unwrap().data()[[0, 0]], 2.0);
    let err = series.frame(2).err().unwrap();
    assert_eq!(err, VoxPeakError::InvalidTimeStep { time_step: 2, frames: 2 });
}

#[test]
fn single_volume_converts_into_series() {
    let geometry = Geometry::axis_aligned(&[1.0, 1.0, 1.0]).unwrap();
    let volume = Volume::from_elem(&[3, 3, 3], geometry, 4u8).unwrap();
    let series: VolumeSeries<u8> = volume.into();
    assert_eq!(series.num_frames(), 1);
    assert_eq!(series.shape(), &[3, 3, 3]);
}

#[test]
fn static_mask_generator_validates_frames() {
    let err = StaticMaskGenerator::new(Vec::new()).err().unwrap();
    assert_eq!(
        err,
        VoxPeakError::InvalidInput("mask generator needs at least one frame"),
    );

    let geometry = Geometry::axis_aligned(&[1.0, 1.0]).unwrap();
    let a = Volume::from_elem(&[4, 4], geometry.clone(), 1u16).unwrap();
    let b = Volume::from_elem(&[5, 4], geometry, 1u16).unwrap();
    let err = StaticMaskGenerator::new(vec![a, b]).err().unwrap();
    assert_eq!(
        err,
        VoxPeakError::ShapeMismatch {
            expected: vec![4, 4],
            got: vec![5, 4],
        }
    );
}
