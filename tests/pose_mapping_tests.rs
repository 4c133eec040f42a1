//! Property and regression tests for landmark to pose mapping

use mouthguard_tracker::{
    config::PoseConfig,
    gesture::GestureState,
    landmarks::{FrameDescriptor, Landmark, LandmarkSet},
    pose_mapping::{MirrorMode, PoseMapper},
};
use proptest::prelude::*;
use std::f32::consts::PI;

fn mouth_between(left: Landmark, right: Landmark, opening: f32) -> LandmarkSet {
    let cx = (left.x + right.x) / 2.0;
    let cy = (left.y + right.y) / 2.0;
    let mut points = vec![Landmark::new(cx, cy); 20];
    points[0] = left;
    points[6] = right;
    points[13] = Landmark::new(cx, cy - opening / 2.0);
    points[19] = Landmark::new(cx, cy + opening / 2.0);
    LandmarkSet::from_mouth(points).unwrap()
}

fn mapper(source_mirrored: bool, canvas_mirrored: bool) -> PoseMapper {
    PoseMapper::new(PoseConfig {
        source_mirrored,
        canvas_mirrored,
        ..PoseConfig::default()
    })
}

proptest! {
    #[test]
    fn mapping_is_deterministic(
        lx in 0.0_f32..360.0, ly in 0.0_f32..640.0,
        rx in 0.0_f32..360.0, ry in 0.0_f32..640.0,
        opening in 0.0_f32..40.0,
        open in any::<bool>(),
    ) {
        let landmarks = mouth_between(Landmark::new(lx, ly), Landmark::new(rx, ry), opening);
        let frame = FrameDescriptor::new(360, 640);
        let gesture = GestureState { mouth_open: open };
        let mapper = mapper(true, false);

        let first = mapper.map(&landmarks, &frame, gesture);
        let second = mapper.map(&landmarks, &frame, gesture);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn centered_mouth_has_zero_ndc_x(
        half_width in 1_u32..1000,
        height in 1_u32..2000,
        spread in 1_u32..100,
        source_mirrored in any::<bool>(),
        canvas_mirrored in any::<bool>(),
    ) {
        let width = half_width * 2;
        let frame = FrameDescriptor::new(width, height);
        let center = half_width as f32;
        let spread = spread.min(half_width) as f32;
        let landmarks = mouth_between(
            Landmark::new(center - spread, height as f32 / 2.0),
            Landmark::new(center + spread, height as f32 / 2.0),
            4.0,
        );
        let mapper = mapper(source_mirrored, canvas_mirrored);

        let (ndc_x, _) = mapper.normalize(Landmark::new(center, 0.0), &frame).unwrap();
        prop_assert_eq!(ndc_x, 0.0);

        let pose = mapper.map(&landmarks, &frame, GestureState::OPEN);
        prop_assert_eq!(pose.position.x, 0.0);
    }

    #[test]
    fn visible_poses_are_finite_and_above_min_scale(
        lx in 0.0_f32..180.0, rx in 180.0_f32..360.0,
        y in 0.0_f32..640.0,
    ) {
        let landmarks = mouth_between(Landmark::new(lx, y), Landmark::new(rx, y), 12.0);
        let pose = mapper(false, false).map(&landmarks, &FrameDescriptor::new(360, 640), GestureState::OPEN);

        if rx - lx > 1e-3 {
            prop_assert!(pose.visible);
            prop_assert!(pose.scale.x >= PoseConfig::default().min_scale);
            prop_assert!(pose.position.iter().all(|v| v.is_finite()));
        }
    }
}

#[test]
fn test_mirror_resolution_table() {
    assert_eq!(MirrorMode::resolve(false, false), MirrorMode::None);
    assert_eq!(MirrorMode::resolve(true, false), MirrorMode::Flip);
    assert_eq!(MirrorMode::resolve(true, true), MirrorMode::None);
    assert_eq!(MirrorMode::resolve(false, true), MirrorMode::None);
}

#[test]
fn test_worked_example_position_and_scale() {
    let frame = FrameDescriptor::new(360, 640);
    let landmarks = mouth_between(Landmark::new(150.0, 300.0), Landmark::new(210.0, 300.0), 10.0);
    let pose = mapper(false, false).map(&landmarks, &frame, GestureState::OPEN);

    let plane_height = 2.0 * (25.0_f32.to_radians()).tan() * 5.0;
    let ndc_y = -((300.0 / 640.0) * 2.0 - 1.0);

    assert!(pose.visible);
    assert!(pose.position.x.abs() < 1e-6);
    assert!((pose.position.y - ndc_y * plane_height / 2.0).abs() < 1e-5);
    assert!((pose.position.z - 0.05).abs() < 1e-6);

    let s = (0.001 * (60.0 / 360.0) * 15.0_f32).max(0.0005);
    assert!((pose.scale.x - s).abs() < 1e-7);
    assert!((pose.scale.y - 0.8 * s).abs() < 1e-7);
    assert!((pose.scale.z - 0.6 * s).abs() < 1e-7);
    assert!((pose.rotation.x - PI).abs() < 1e-6);
    assert!(pose.rotation.z.abs() < 1e-6);
}

#[test]
fn test_off_center_mouth_moves_with_mirror() {
    let frame = FrameDescriptor::new(360, 640);
    let landmarks = mouth_between(Landmark::new(40.0, 300.0), Landmark::new(100.0, 300.0), 10.0);

    let plain = mapper(false, false).map(&landmarks, &frame, GestureState::OPEN);
    let flipped = mapper(true, false).map(&landmarks, &frame, GestureState::OPEN);

    assert!(plain.position.x < 0.0);
    assert!((flipped.position.x + plain.position.x).abs() < 1e-6);
    assert!((flipped.position.y - plain.position.y).abs() < 1e-6);
}

#[test]
fn test_fixed_aspect_ratio_overrides_frame() {
    let frame = FrameDescriptor::new(360, 640);
    let landmarks = mouth_between(Landmark::new(300.0, 300.0), Landmark::new(360.0, 300.0), 10.0);

    let follow = PoseMapper::new(PoseConfig::default()).map(&landmarks, &frame, GestureState::OPEN);
    let fixed = PoseMapper::new(PoseConfig {
        aspect_ratio: Some(16.0 / 9.0),
        ..PoseConfig::default()
    })
    .map(&landmarks, &frame, GestureState::OPEN);

    assert!(fixed.position.x.abs() > follow.position.x.abs());
    assert!((fixed.position.y - follow.position.y).abs() < 1e-6);
}
