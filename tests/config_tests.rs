//! Tests for configuration loading, saving and validation

use mouthguard_tracker::{
    config::{Config, EXAMPLE_CONFIG},
    Error,
};
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("mouthguard_{}_{}", std::process::id(), name))
}

#[test]
fn test_config_file_round_trip() {
    let path = temp_path("config.yaml");
    let mut config = Config::default();
    config.gesture.open_threshold_px = 12.5;
    config.gesture.reference_height = Some(640);
    config.tracking.grace_misses = 8;
    config.smoothing.filter = "moving_average".to_string();
    config.smoothing.moving_average_window = 4;

    config.to_file(&path).unwrap();
    let loaded = Config::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.gesture, config.gesture);
    assert_eq!(loaded.tracking, config.tracking);
    assert_eq!(loaded.smoothing, config.smoothing);
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_missing_file_is_io_error() {
    let result = Config::from_file(temp_path("does_not_exist.yaml"));
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_malformed_yaml_is_config_error() {
    let result = Config::from_yaml("scheduler: [not, a, map]");
    assert!(matches!(result, Err(Error::ConfigError(_))));
}

#[test]
fn test_example_config_validates() {
    let config = Config::from_yaml(EXAMPLE_CONFIG).unwrap();
    assert!(config.validate().is_ok());
    assert!(config.create_filter().is_ok());
}

#[test]
fn test_validation_rules() {
    let cases: Vec<(&str, Box<dyn Fn(&mut Config)>)> = vec![
        ("zero tick", Box::new(|c: &mut Config| c.scheduler.tick_interval_ms = 0)),
        ("decay of one", Box::new(|c: &mut Config| c.scheduler.velocity_decay = 1.0)),
        ("inverted bands", Box::new(|c: &mut Config| c.scheduler.medium_velocity = 20.0)),
        ("zero threshold", Box::new(|c: &mut Config| c.gesture.open_threshold_px = 0.0)),
        ("nan threshold", Box::new(|c: &mut Config| c.gesture.open_threshold_px = f32::NAN)),
        ("zero reference height", Box::new(|c: &mut Config| c.gesture.reference_height = Some(0))),
        ("flat fov", Box::new(|c: &mut Config| c.pose.fov_degrees = 180.0)),
        ("camera at plane", Box::new(|c: &mut Config| c.pose.camera_distance = 0.0)),
        ("negative aspect", Box::new(|c: &mut Config| c.pose.aspect_ratio = Some(-1.0))),
        ("zero base scale", Box::new(|c: &mut Config| c.pose.base_scale = 0.0)),
        ("negative min scale", Box::new(|c: &mut Config| c.pose.min_scale = -0.1)),
        ("opacity above one", Box::new(|c: &mut Config| c.asset.opacity = 1.5)),
        ("empty window", Box::new(|c: &mut Config| {
            c.smoothing.filter = "moving_average".to_string();
            c.smoothing.moving_average_window = 0;
        })),
        ("nan decay", Box::new(|c: &mut Config| c.scheduler.velocity_decay = f64::NAN)),
        ("infinite fast band", Box::new(|c: &mut Config| c.scheduler.fast_velocity = f64::INFINITY)),
        ("nan fov", Box::new(|c: &mut Config| c.pose.fov_degrees = f32::NAN)),
        ("nan camera distance", Box::new(|c: &mut Config| c.pose.camera_distance = f32::NAN)),
        ("infinite camera distance", Box::new(|c: &mut Config| c.pose.camera_distance = f32::INFINITY)),
        ("nan aspect", Box::new(|c: &mut Config| c.pose.aspect_ratio = Some(f32::NAN))),
        ("nan base scale", Box::new(|c: &mut Config| c.pose.base_scale = f32::NAN)),
        ("infinite scale factor", Box::new(|c: &mut Config| c.pose.scale_factor = f32::INFINITY)),
        ("nan min scale", Box::new(|c: &mut Config| c.pose.min_scale = f32::NAN)),
        ("nan y ratio", Box::new(|c: &mut Config| c.pose.scale_y_ratio = f32::NAN)),
        ("infinite depth offset", Box::new(|c: &mut Config| c.pose.depth_offset = f32::NEG_INFINITY)),
        ("nan opacity", Box::new(|c: &mut Config| c.asset.opacity = f32::NAN)),
        ("nan alpha", Box::new(|c: &mut Config| {
            c.smoothing.filter = "exponential".to_string();
            c.smoothing.exponential_alpha = f64::NAN;
        })),
        ("missing asset", Box::new(|c: &mut Config| c.asset.path = Some(temp_path("missing.glb")))),
    ];

    for (name, mutate) in cases {
        let mut config = Config::default();
        mutate(&mut config);
        assert!(
            matches!(config.validate(), Err(Error::ConfigError(_))),
            "{name} should be rejected"
        );
    }
}

#[test]
fn test_filter_spec_strings() {
    let mut config = Config::default();
    for (spec, name) in [
        ("none", "NoFilter"),
        ("exponential", "ExponentialFilter"),
        ("exponential:0.3", "ExponentialFilter"),
        ("moving_average", "MovingAverageFilter"),
        ("movingaverage:7", "MovingAverageFilter"),
    ] {
        config.smoothing.filter = spec.to_string();
        assert_eq!(config.create_filter().unwrap().name(), name, "spec {spec}");
    }
}

#[test]
fn test_filter_kind_is_case_insensitive_and_uses_configured_parameters() {
    let mut config = Config::default();
    config.smoothing.filter = "Exponential".to_string();
    config.smoothing.exponential_alpha = 0.25;
    let mut filter = config.create_filter().unwrap();
    filter.apply(0.0, 0.0);
    assert_eq!(filter.apply(4.0, 4.0), (1.0, 1.0));

    config.smoothing.filter = " Moving_Average ".to_string();
    config.smoothing.moving_average_window = 2;
    let mut filter = config.create_filter().unwrap();
    filter.apply(0.0, 0.0);
    filter.apply(4.0, 4.0);
    assert_eq!(filter.apply(8.0, 8.0), (6.0, 6.0));

    config.smoothing.filter = "EXPONENTIAL:0.5".to_string();
    assert_eq!(config.create_filter().unwrap().name(), "ExponentialFilter");
}
