//! Mouth open/closed classification from inner lip geometry.

use crate::{
    config::GestureConfig,
    landmarks::{FrameDescriptor, LandmarkSet},
};

/// Binary gesture derived from one landmark set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GestureState {
    pub mouth_open: bool,
}

impl GestureState {
    pub const CLOSED: Self = Self { mouth_open: false };
    pub const OPEN: Self = Self { mouth_open: true };
}

/// Threshold classifier on the inner lip separation.
///
/// The mouth is open when `|bottom.y - top.y| >= threshold`; a separation of
/// exactly the threshold counts as open.
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    config: GestureConfig,
}

impl GestureClassifier {
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self { config }
    }

    /// Threshold in pixels for a frame of the given size
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn threshold_for(&self, frame: &FrameDescriptor) -> f32 {
        match self.config.reference_height {
            Some(reference) if reference > 0 && frame.height > 0 => {
                self.config.open_threshold_px * (frame.height as f32 / reference as f32)
            }
            _ => self.config.open_threshold_px,
        }
    }

    /// Classify a landmark set
    #[must_use]
    pub fn classify(&self, landmarks: &LandmarkSet, frame: &FrameDescriptor) -> GestureState {
        GestureState {
            mouth_open: landmarks.mouth_opening() >= self.threshold_for(frame),
        }
    }
}
