use ndarray::{s, Array2, Array3, Array4};

use diffpeak_core::{DiffpeakError, DiffractionStack, DiffractionVectors, ImageStack, PeakList};

#[test]
fn test_from_frames_converts_detector_counts() {
    let frames: Vec<Array2<u16>> = (0..6)
        .map(|i| Array2::from_elem((4, 5), 100 * i as u16))
        .collect();
    let stack = DiffractionStack::from_frames(vec![2, 3], &frames).unwrap();
    assert_eq!(stack.navigation_shape(), &[2, 3]);
    assert_eq!(stack.navigation_size(), 6);
    assert_eq!(stack.frame_shape(), (4, 5));
    assert_eq!(stack.frame(5)[[3, 4]], 500.0);
}

#[test]
fn test_from_frames_rejects_mismatched_frames() {
    let frames = vec![Array2::<f32>::zeros((4, 4)), Array2::<f32>::zeros((4, 5))];
    let err = DiffractionStack::from_frames(vec![2], &frames).unwrap_err();
    assert!(matches!(
        err,
        DiffpeakError::FrameShape {
            expected: (4, 4),
            found: (4, 5)
        }
    ));
}

#[test]
fn test_from_frames_rejects_wrong_count_and_rank() {
    let frames = vec![Array2::<f32>::zeros((4, 4)); 3];
    assert!(DiffractionStack::from_frames(vec![2, 2], &frames).is_err());
    assert!(DiffractionStack::from_frames(vec![1, 1, 3], &frames).is_err());
    let none: Vec<Array2<f32>> = Vec::new();
    assert!(matches!(
        DiffractionStack::from_frames(vec![0], &none),
        Err(DiffpeakError::EmptyStack)
    ));
}

#[test]
fn test_from_grid_is_row_major() {
    let mut data = Array4::<f32>::zeros((2, 3, 4, 4));
    data.slice_mut(s![1, 0, .., ..]).fill(7.0);
    let stack = DiffractionStack::from_grid(data).unwrap();
    assert_eq!(stack.navigation_shape(), &[2, 3]);
    assert!(stack.frame(3).iter().all(|&v| v == 7.0));
    assert!(stack.frame(1).iter().all(|&v| v == 0.0));
}

#[test]
fn test_single_and_line_stacks() {
    let single = DiffractionStack::single(Array2::ones((6, 8)));
    assert!(single.navigation_shape().is_empty());
    assert_eq!(single.navigation_size(), 1);
    assert_eq!((single.width(), single.height()), (8, 6));
    assert_eq!(single.calibration(), 1.0);

    let line = DiffractionStack::from_line(Array3::zeros((5, 6, 8))).with_calibration(0.02);
    assert_eq!(line.navigation_shape(), &[5]);
    assert_eq!(line.calibration(), 0.02);
}

#[test]
fn test_get_out_of_range() {
    let stack = DiffractionStack::from_line(Array3::zeros((3, 4, 4)));
    assert!(stack.get(2).is_ok());
    assert!(matches!(
        stack.get(3),
        Err(DiffpeakError::NavigationIndexOutOfRange { index: 3, total: 3 })
    ));
}

#[test]
fn test_vectors_layout() {
    let v = DiffractionVectors::new(
        vec![2],
        vec![vec![[1.0, 2.0]], vec![[3.0, 4.0], [5.0, 6.0]]],
    )
    .unwrap();
    assert_eq!(v.navigation_size(), 2);
    assert_eq!(v.total_peaks(), 3);
    assert_eq!(v.peaks(1), &[[3.0, 4.0], [5.0, 6.0]]);

    let (shape, lists) = v.into_inner();
    assert_eq!(shape, vec![2]);
    assert_eq!(lists.len(), 2);
}

#[test]
fn test_vectors_wrong_list_count() {
    let err = DiffractionVectors::new(vec![2, 2], vec![Vec::new(); 3]).unwrap_err();
    assert!(matches!(err, DiffpeakError::InvalidParameter(_)));
}

#[test]
fn test_single_vectors_have_no_navigation() {
    let v = DiffractionVectors::single(vec![[0.5, -0.5]]);
    assert!(v.navigation_shape().is_empty());
    assert_eq!(v.navigation_size(), 1);
    assert_eq!(v.iter().count(), 1);
}
