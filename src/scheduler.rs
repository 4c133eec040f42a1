//! Detection scheduling driven by face motion.
//!
//! The scheduler tracks how far the face bounding box moves between
//! detections, smooths that into a velocity and picks the polling interval
//! from fixed velocity bands: a fast face is re-detected often, a still one
//! rarely.

use crate::{config::SchedulerConfig, landmarks::{BoundingBox, Landmark}};
use log::debug;

/// Motion history owned by the scheduler
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    /// Centroid of the last detected face, `None` before the first detection
    pub last_position: Option<Landmark>,
    /// Smoothed displacement per detection (pixels)
    pub velocity: f64,
    /// Current polling interval (milliseconds)
    pub interval_ms: u64,
}

/// Decides when the landmark provider should run
#[derive(Debug, Clone)]
pub struct DetectionScheduler {
    config: SchedulerConfig,
    last_detection_ms: Option<u64>,
    motion: MotionSample,
}

impl DetectionScheduler {
    /// Create a scheduler that has not detected anything yet
    #[must_use]
    pub fn new(config: SchedulerConfig) -> Self {
        let motion = MotionSample {
            last_position: None,
            velocity: 0.0,
            interval_ms: config.initial_interval_ms,
        };
        Self {
            config,
            last_detection_ms: None,
            motion,
        }
    }

    /// Whether a detection is due at `now_ms`, without changing any state
    #[must_use]
    pub fn is_due(&self, now_ms: u64) -> bool {
        match self.last_detection_ms {
            Some(last) => now_ms.saturating_sub(last) >= self.motion.interval_ms,
            None => true,
        }
    }

    /// Scheduling tick: returns true and records the detection time when one is due
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if !self.is_due(now_ms) {
            return false;
        }
        self.last_detection_ms = Some(now_ms);
        true
    }

    /// Feed the bounding box of a successful detection
    ///
    /// The first detection only stores the position. Later ones update the
    /// velocity and re-derive the interval.
    pub fn record_face(&mut self, bbox: &BoundingBox) {
        let position = bbox.centroid();
        if !(position.x.is_finite() && position.y.is_finite()) {
            debug!("Ignoring face box with non-finite centre");
            return;
        }

        let Some(previous) = self.motion.last_position else {
            self.motion.last_position = Some(position);
            return;
        };

        let distance = f64::from(position.distance_to(&previous));
        let decay = self.config.velocity_decay;
        let velocity = decay.mul_add(self.motion.velocity, (1.0 - decay) * distance);

        // NaN would stick forever in the average; overflow saturates so the
        // fastest band still applies
        if !velocity.is_nan() {
            self.motion.velocity = velocity.clamp(0.0, f64::MAX);
        }
        self.motion.interval_ms = self.interval_for(self.motion.velocity);
        self.motion.last_position = Some(position);

        debug!(
            "Face moved {:.1}px, velocity {:.2}, next interval {}ms",
            distance, self.motion.velocity, self.motion.interval_ms
        );
    }

    /// Band lookup from velocity to polling interval
    #[must_use]
    pub fn interval_for(&self, velocity: f64) -> u64 {
        if velocity > self.config.fast_velocity {
            self.config.fast_interval_ms
        } else if velocity > self.config.medium_velocity {
            self.config.medium_interval_ms
        } else {
            self.config.slow_interval_ms
        }
    }

    #[must_use]
    pub fn motion(&self) -> &MotionSample {
        &self.motion
    }

    #[must_use]
    pub fn interval_ms(&self) -> u64 {
        self.motion.interval_ms
    }

    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.motion.velocity
    }

    #[must_use]
    pub fn last_detection_ms(&self) -> Option<u64> {
        self.last_detection_ms
    }
}
