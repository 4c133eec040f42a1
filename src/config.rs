//! Configuration management for the mouthguard tracker

use crate::{constants::*, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Detection scheduling
    pub scheduler: SchedulerConfig,

    /// Mouth-open classification
    pub gesture: GestureConfig,

    /// Landmark to 3D pose mapping
    pub pose: PoseConfig,

    /// Face loss handling
    pub tracking: TrackingConfig,

    /// Optional positional smoothing
    pub smoothing: SmoothingConfig,

    /// Overlay asset
    pub asset: AssetConfig,
}

/// Detection scheduler parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Period of the driver tick
    pub tick_interval_ms: u64,

    /// Polling interval before any motion has been measured
    pub initial_interval_ms: u64,

    /// Weight of the previous velocity (`v' = decay * v + (1 - decay) * distance`)
    pub velocity_decay: f64,

    /// Velocity above which the fast interval is used
    pub fast_velocity: f64,

    /// Velocity above which the medium interval is used
    pub medium_velocity: f64,

    /// Interval for a fast-moving face
    pub fast_interval_ms: u64,

    /// Interval for a moderately moving face
    pub medium_interval_ms: u64,

    /// Interval for a still face
    pub slow_interval_ms: u64,
}

/// Gesture classifier parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Inner lip separation at which the mouth counts as open
    pub open_threshold_px: f32,

    /// Frame height the threshold was calibrated at; `None` keeps it in raw pixels
    pub reference_height: Option<u32>,
}

/// Pose mapper parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseConfig {
    /// Vertical field of view of the renderer camera
    pub fov_degrees: f32,

    /// Distance of the renderer camera along its principal axis
    pub camera_distance: f32,

    /// Viewport aspect ratio; `None` uses the frame aspect
    pub aspect_ratio: Option<f32>,

    /// Base scale of the asset
    pub base_scale: f32,

    /// Multiplier applied to the relative mouth width
    pub scale_factor: f32,

    /// Lower bound for the X scale
    pub min_scale: f32,

    /// Y scale relative to X
    pub scale_y_ratio: f32,

    /// Z scale relative to X
    pub scale_z_ratio: f32,

    /// Offset of the overlay toward the camera
    pub depth_offset: f32,

    /// The source video is horizontally mirrored (front camera)
    pub source_mirrored: bool,

    /// The overlay canvas is mirrored independently of the video
    pub canvas_mirrored: bool,
}

/// Face loss policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Consecutive missed detections tolerated before the overlay is hidden
    pub grace_misses: u32,

    /// Hide the overlay while no asset is selected
    pub require_asset: bool,
}

/// Smoothing filter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Filter type (`none`, `exponential`, `moving_average`)
    pub filter: String,

    /// Moving average window size
    pub moving_average_window: usize,

    /// Exponential filter alpha value
    pub exponential_alpha: f64,
}

/// Overlay asset configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Path of the asset to load at startup
    pub path: Option<PathBuf>,

    /// Material opacity of the per-session clone
    pub opacity: f32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            initial_interval_ms: DEFAULT_MEDIUM_INTERVAL_MS,
            velocity_decay: DEFAULT_VELOCITY_DECAY,
            fast_velocity: DEFAULT_FAST_VELOCITY,
            medium_velocity: DEFAULT_MEDIUM_VELOCITY,
            fast_interval_ms: DEFAULT_FAST_INTERVAL_MS,
            medium_interval_ms: DEFAULT_MEDIUM_INTERVAL_MS,
            slow_interval_ms: DEFAULT_SLOW_INTERVAL_MS,
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            open_threshold_px: DEFAULT_MOUTH_OPEN_THRESHOLD_PX,
            reference_height: None,
        }
    }
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            fov_degrees: DEFAULT_FOV_DEGREES,
            camera_distance: DEFAULT_CAMERA_DISTANCE,
            aspect_ratio: None,
            base_scale: DEFAULT_BASE_SCALE,
            scale_factor: DEFAULT_SCALE_FACTOR,
            min_scale: DEFAULT_MIN_SCALE,
            scale_y_ratio: DEFAULT_SCALE_Y_RATIO,
            scale_z_ratio: DEFAULT_SCALE_Z_RATIO,
            depth_offset: DEFAULT_DEPTH_OFFSET,
            source_mirrored: true,
            canvas_mirrored: true,
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            grace_misses: DEFAULT_GRACE_MISSES,
            require_asset: true,
        }
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            filter: "none".to_string(),
            moving_average_window: 3,
            exponential_alpha: 0.5,
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            path: None,
            opacity: DEFAULT_ASSET_OPACITY,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Create the positional smoothing filter from configuration
    ///
    /// A bare `exponential` or `moving_average` takes its parameter from the
    /// smoothing section; anything else is parsed by [`crate::filters::create_filter`].
    pub fn create_filter(&self) -> Result<Box<dyn crate::filters::PointFilter>> {
        let kind = self.smoothing.filter.trim().to_lowercase();
        let spec = match kind.as_str() {
            "exponential" => format!("exponential:{}", self.smoothing.exponential_alpha),
            "moving_average" | "movingaverage" => format!("moving_average:{}", self.smoothing.moving_average_window),
            _ => kind,
        };
        crate::filters::create_filter(&spec)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let s = &self.scheduler;
        if s.tick_interval_ms == 0 || s.initial_interval_ms == 0 {
            return Err(Error::ConfigError(
                "Tick and initial intervals must be greater than 0".to_string(),
            ));
        }
        if s.fast_interval_ms == 0 {
            return Err(Error::ConfigError("Fast interval must be greater than 0".to_string()));
        }
        if !(s.fast_interval_ms <= s.medium_interval_ms && s.medium_interval_ms <= s.slow_interval_ms) {
            return Err(Error::ConfigError(
                "Intervals must satisfy fast <= medium <= slow".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&s.velocity_decay) {
            return Err(Error::ConfigError(
                "Velocity decay must be in [0.0, 1.0)".to_string(),
            ));
        }
        if !(s.medium_velocity >= 0.0 && s.medium_velocity <= s.fast_velocity && s.fast_velocity.is_finite()) {
            return Err(Error::ConfigError(
                "Velocity bands must satisfy 0 <= medium <= fast".to_string(),
            ));
        }

        let g = &self.gesture;
        if !(g.open_threshold_px > 0.0 && g.open_threshold_px.is_finite()) {
            return Err(Error::ConfigError(
                "Mouth open threshold must be a positive number of pixels".to_string(),
            ));
        }
        if g.reference_height == Some(0) {
            return Err(Error::ConfigError("Reference height must be greater than 0".to_string()));
        }

        let p = &self.pose;
        if !(p.fov_degrees > 0.0 && p.fov_degrees < 180.0) {
            return Err(Error::ConfigError(
                "Field of view must be between 0 and 180 degrees".to_string(),
            ));
        }
        if !is_positive(p.camera_distance) {
            return Err(Error::ConfigError("Camera distance must be positive".to_string()));
        }
        if p.aspect_ratio.is_some_and(|aspect| !is_positive(aspect)) {
            return Err(Error::ConfigError("Aspect ratio must be positive".to_string()));
        }
        if !is_positive(p.base_scale) || !is_positive(p.scale_factor) {
            return Err(Error::ConfigError(
                "Base scale and scale factor must be positive".to_string(),
            ));
        }
        if !(p.min_scale >= 0.0 && p.min_scale.is_finite()) {
            return Err(Error::ConfigError("Minimum scale must not be negative".to_string()));
        }
        if !(p.scale_y_ratio.is_finite() && p.scale_z_ratio.is_finite() && p.depth_offset.is_finite()) {
            return Err(Error::ConfigError(
                "Scale ratios and depth offset must be finite".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.asset.opacity) {
            return Err(Error::ConfigError(
                "Asset opacity must be between 0.0 and 1.0".to_string(),
            ));
        }

        self.create_filter()
            .map_err(|e| Error::ConfigError(format!("Invalid smoothing filter: {e}")))?;

        if let Some(path) = &self.asset.path {
            if !path.exists() {
                return Err(Error::ConfigError(format!(
                    "Overlay asset not found: {}",
                    path.display()
                )));
            }
        }

        Ok(())
    }
}

/// Finite and strictly positive; NaN fails
fn is_positive(value: f32) -> bool {
    value > 0.0 && value.is_finite()
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Mouthguard Tracker Configuration

# Detection scheduling
scheduler:
  tick_interval_ms: 16
  initial_interval_ms: 50
  velocity_decay: 0.7
  fast_velocity: 10.0
  medium_velocity: 5.0
  fast_interval_ms: 30
  medium_interval_ms: 50
  slow_interval_ms: 100

# Mouth open classification
gesture:
  open_threshold_px: 10.0
  # Set to the frame height the threshold was tuned at to scale it with resolution
  reference_height: null

# Landmark to 3D pose mapping
pose:
  fov_degrees: 50.0
  camera_distance: 5.0
  aspect_ratio: null
  base_scale: 0.001
  scale_factor: 15.0
  min_scale: 0.0005
  scale_y_ratio: 0.8
  scale_z_ratio: 0.6
  depth_offset: 0.05
  source_mirrored: true
  canvas_mirrored: true

# Face loss handling
tracking:
  grace_misses: 5
  require_asset: true

# Positional smoothing (none, exponential, moving_average)
smoothing:
  filter: "none"
  moving_average_window: 3
  exponential_alpha: 0.5

# Overlay asset
asset:
  path: null
  opacity: 0.9
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_matches_defaults() {
        let parsed = Config::from_yaml(EXAMPLE_CONFIG).unwrap();
        let defaults = Config::default();

        assert_eq!(parsed.scheduler, defaults.scheduler);
        assert_eq!(parsed.gesture, defaults.gesture);
        assert_eq!(parsed.pose, defaults.pose);
        assert_eq!(parsed.tracking, defaults.tracking);
        assert_eq!(parsed.smoothing, defaults.smoothing);
        assert_eq!(parsed.asset, defaults.asset);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed = Config::from_yaml("gesture:\n  open_threshold_px: 14.0\n").unwrap();
        assert_eq!(parsed.gesture.open_threshold_px, 14.0);
        assert_eq!(parsed.scheduler, SchedulerConfig::default());
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unordered_intervals() {
        let mut config = Config::default();
        config.scheduler.fast_interval_ms = 200;
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_validate_rejects_bad_filter() {
        let mut config = Config::default();
        config.smoothing.filter = "kalman".to_string();
        assert!(config.validate().is_err());

        config.smoothing.filter = "exponential".to_string();
        config.smoothing.exponential_alpha = 0.0;
        assert!(config.validate().is_err());
    }
}
