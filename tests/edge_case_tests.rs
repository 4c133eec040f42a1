//! Edge case tests for filters, landmarks, mapping and the tracker

use mouthguard_tracker::{
    config::{Config, GestureConfig, PoseConfig},
    filters::create_filter,
    gesture::{GestureClassifier, GestureState},
    landmarks::{BoundingBox, FaceDetection, FrameDescriptor, Landmark, LandmarkSet},
    pose_mapping::{Pose, PoseMapper},
    tracker::{CycleOutcome, DetectionOutcome, Tracker},
    Error,
};

fn flat_mouth(x: f32, y: f32) -> Vec<Landmark> {
    vec![Landmark::new(x, y); 20]
}

#[test]
fn test_filter_extreme_values() {
    let filters = vec!["none", "moving_average:5", "exponential:0.8"];

    for filter_str in filters {
        let mut filter = create_filter(filter_str).unwrap();

        let extreme_values = vec![
            (f64::INFINITY, f64::NEG_INFINITY),
            (f64::NAN, f64::NAN),
            (f64::MAX, f64::MIN),
            (1e100, -1e100),
            (0.0, 0.0),
        ];

        // Only checks that nothing panics
        for (x, y) in extreme_values {
            let _ = filter.apply(x, y);
        }
    }
}

#[test]
fn test_filter_reset_behavior() {
    for filter_str in ["moving_average:3", "exponential:0.5"] {
        let mut filter = create_filter(filter_str).unwrap();

        filter.apply(10.0, 20.0);
        filter.apply(15.0, 25.0);
        let before_reset = filter.apply(25.0, 35.0);

        filter.reset();
        let after_reset = filter.apply(25.0, 35.0);

        assert_eq!(after_reset, (25.0, 35.0), "Filter {} kept state", filter.name());
        assert_ne!(before_reset, after_reset);
    }
}

#[test]
fn test_invalid_filter_specs() {
    for spec in ["kalman", "exponential:0", "exponential:1.5", "moving_average:0", "exponential:abc"] {
        assert!(
            matches!(create_filter(spec), Err(Error::FilterError(_))),
            "{spec} should be rejected"
        );
    }
}

#[test]
fn test_landmark_counts() {
    assert!(LandmarkSet::from_mouth(flat_mouth(1.0, 1.0)).is_ok());
    assert!(matches!(
        LandmarkSet::from_mouth(vec![Landmark::new(0.0, 0.0); 19]),
        Err(Error::InvalidInput(_))
    ));
    assert!(LandmarkSet::from_face_68(&[Landmark::new(0.0, 0.0); 20]).is_err());

    let mut face: Vec<Landmark> = (0..68).map(|i| Landmark::new(i as f32, 0.0)).collect();
    let mouth = LandmarkSet::from_face_68(&face).unwrap();
    assert_eq!(mouth.left_corner(), Landmark::new(48.0, 0.0));
    assert_eq!(mouth.right_corner(), Landmark::new(54.0, 0.0));

    // Non-finite points outside the mouth are ignored
    face[0] = Landmark::new(f32::NAN, 0.0);
    assert!(LandmarkSet::from_face_68(&face).is_ok());
    face[60] = Landmark::new(f32::INFINITY, 0.0);
    assert!(LandmarkSet::from_face_68(&face).is_err());
}

#[test]
fn test_zero_width_mouth_hides() {
    let mapper = PoseMapper::new(PoseConfig::default());
    let landmarks = LandmarkSet::from_mouth(flat_mouth(180.0, 300.0)).unwrap();
    let pose = mapper.map(&landmarks, &FrameDescriptor::new(360, 640), GestureState::OPEN);
    assert_eq!(pose, Pose::hidden());
}

#[test]
fn test_empty_frame_hides() {
    let mapper = PoseMapper::new(PoseConfig::default());
    let mut points = flat_mouth(180.0, 300.0);
    points[0] = Landmark::new(150.0, 300.0);
    points[6] = Landmark::new(210.0, 300.0);
    let landmarks = LandmarkSet::from_mouth(points).unwrap();

    for frame in [FrameDescriptor::new(0, 640), FrameDescriptor::new(360, 0)] {
        assert_eq!(mapper.map(&landmarks, &frame, GestureState::OPEN), Pose::hidden());
    }
}

#[test]
fn test_landmarks_outside_frame_still_map() {
    let mapper = PoseMapper::new(PoseConfig::default());
    let mut points = flat_mouth(-50.0, 900.0);
    points[0] = Landmark::new(-80.0, 900.0);
    points[6] = Landmark::new(-20.0, 900.0);
    points[13] = Landmark::new(-50.0, 890.0);
    points[19] = Landmark::new(-50.0, 910.0);
    let landmarks = LandmarkSet::from_mouth(points).unwrap();

    let pose = mapper.map(&landmarks, &FrameDescriptor::new(360, 640), GestureState::OPEN);
    assert!(pose.visible);
    assert!(pose.position.iter().all(|v| v.is_finite()));
}

#[test]
fn test_tiny_mouth_uses_min_scale() {
    let config = PoseConfig::default();
    let min_scale = config.min_scale;
    let mapper = PoseMapper::new(config);
    let mut points = flat_mouth(180.0, 300.0);
    points[0] = Landmark::new(179.0, 300.0);
    points[6] = Landmark::new(181.0, 300.0);
    let landmarks = LandmarkSet::from_mouth(points).unwrap();

    let pose = mapper.map(&landmarks, &FrameDescriptor::new(360, 640), GestureState::OPEN);
    assert!((pose.scale.x - min_scale).abs() < f32::EPSILON);
}

#[test]
fn test_threshold_scales_with_reference_height() {
    let classifier = GestureClassifier::new(GestureConfig {
        open_threshold_px: 10.0,
        reference_height: Some(640),
    });

    assert!((classifier.threshold_for(&FrameDescriptor::new(720, 1280)) - 20.0).abs() < 1e-6);
    assert!((classifier.threshold_for(&FrameDescriptor::new(360, 640)) - 10.0).abs() < 1e-6);
    // Unknown height falls back to the fixed threshold
    assert!((classifier.threshold_for(&FrameDescriptor::new(0, 0)) - 10.0).abs() < 1e-6);
}

#[test]
fn test_bounding_box_centroid() {
    let bbox = BoundingBox::new(10.0, 20.0, 100.0, 50.0);
    assert_eq!(bbox.centroid(), Landmark::new(60.0, 45.0));
}

#[test]
fn test_cleared_asset_hides_next_pose() {
    use mouthguard_tracker::asset::OverlayAsset;
    use std::sync::Arc;

    let mut tracker = Tracker::new(&Config::default()).unwrap();
    tracker.select_asset(Arc::new(OverlayAsset {
        name: "m".to_string(),
        source: "m.glb".into(),
        data: Arc::from(&b"x"[..]),
    }));
    tracker.clear_asset();
    assert!(!tracker.asset().is_selected());

    let mut points = flat_mouth(180.0, 300.0);
    points[0] = Landmark::new(150.0, 300.0);
    points[6] = Landmark::new(210.0, 300.0);
    points[13] = Landmark::new(180.0, 290.0);
    points[19] = Landmark::new(180.0, 310.0);
    let face = FaceDetection {
        bbox: BoundingBox::new(100.0, 200.0, 160.0, 200.0),
        landmarks: LandmarkSet::from_mouth(points).unwrap(),
    };

    let frame = FrameDescriptor::new(360, 640);
    let ticket = tracker.begin_cycle(0, frame).ticket().unwrap();
    match tracker.complete_cycle(&ticket, DetectionOutcome::Face(face)) {
        CycleOutcome::Updated(update) => assert!(!update.pose.visible),
        other => panic!("Expected Updated, got {other:?}"),
    }
    assert_eq!(tracker.gesture(), GestureState::CLOSED);
}
