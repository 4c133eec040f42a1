//! Constants used throughout the tracker

/// Number of points in the full face landmark layout
pub const NUM_FACE_LANDMARKS: usize = 68;

/// Number of points in the mouth contour
pub const NUM_MOUTH_LANDMARKS: usize = 20;

/// Index of the first mouth point within the 68-point layout
pub const FACE_MOUTH_START: usize = 48;

/// Mouth contour indices
pub const LEFT_MOUTH_CORNER: usize = 0;
pub const RIGHT_MOUTH_CORNER: usize = 6;
pub const INNER_LIP_TOP: usize = 13;
pub const INNER_LIP_BOTTOM: usize = 19;

/// Polling intervals chosen by the scheduler's velocity bands (milliseconds)
pub const DEFAULT_FAST_INTERVAL_MS: u64 = 30;
pub const DEFAULT_MEDIUM_INTERVAL_MS: u64 = 50;
pub const DEFAULT_SLOW_INTERVAL_MS: u64 = 100;

/// Velocity band boundaries (pixels per detection)
pub const DEFAULT_FAST_VELOCITY: f64 = 10.0;
pub const DEFAULT_MEDIUM_VELOCITY: f64 = 5.0;

/// Weight of the previous velocity in the moving average
pub const DEFAULT_VELOCITY_DECAY: f64 = 0.7;

/// Inner lip separation at which the mouth counts as open (pixels)
pub const DEFAULT_MOUTH_OPEN_THRESHOLD_PX: f32 = 10.0;

/// Renderer camera defaults
pub const DEFAULT_FOV_DEGREES: f32 = 50.0;
pub const DEFAULT_CAMERA_DISTANCE: f32 = 5.0;

/// Overlay scale defaults
pub const DEFAULT_BASE_SCALE: f32 = 0.001;
pub const DEFAULT_SCALE_FACTOR: f32 = 15.0;
pub const DEFAULT_MIN_SCALE: f32 = 0.0005;
pub const DEFAULT_SCALE_Y_RATIO: f32 = 0.8;
pub const DEFAULT_SCALE_Z_RATIO: f32 = 0.6;

/// Offset of the overlay toward the camera
pub const DEFAULT_DEPTH_OFFSET: f32 = 0.05;

/// Consecutive missed detections tolerated before hiding the overlay
pub const DEFAULT_GRACE_MISSES: u32 = 5;

/// Material opacity of the per-session asset clone
pub const DEFAULT_ASSET_OPACITY: f32 = 0.9;

/// Tick period of the driver loop (milliseconds)
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 16;

/// Numeric precision epsilon
pub const EPSILON: f32 = 1e-6;
