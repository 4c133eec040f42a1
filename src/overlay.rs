//! Renderer-facing side of the pipeline.

use crate::{asset::AssetInstance, pose_mapping::Pose};
use log::{debug, info};

/// A pose tagged with the detection cycle that produced it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseUpdate {
    /// Sequence number of the detection cycle, 0 before the first one
    pub sequence: u64,
    pub pose: Pose,
}

impl Default for PoseUpdate {
    fn default() -> Self {
        Self {
            sequence: 0,
            pose: Pose::hidden(),
        }
    }
}

/// Draws the overlay asset. Implemented by the rendering engine.
pub trait OverlayRenderer: Send {
    /// Render the asset at `pose`, or hide it when the pose is not visible.
    /// Called at most once per detection cycle.
    fn set_pose(&mut self, pose: &Pose);

    /// A new asset instance was selected for this session
    fn attach_asset(&mut self, _asset: &AssetInstance) {}
}

/// Renderer that only logs the poses it receives
#[derive(Debug, Default)]
pub struct LogRenderer {
    updates: u64,
    visible_updates: u64,
}

impl LogRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn updates(&self) -> u64 {
        self.updates
    }

    #[must_use]
    pub fn visible_updates(&self) -> u64 {
        self.visible_updates
    }
}

impl OverlayRenderer for LogRenderer {
    fn set_pose(&mut self, pose: &Pose) {
        self.updates += 1;
        if pose.visible {
            self.visible_updates += 1;
            info!(
                "pose pos=({:.3}, {:.3}, {:.3}) scale=({:.5}, {:.5}, {:.5}) roll={:.1}°",
                pose.position.x,
                pose.position.y,
                pose.position.z,
                pose.scale.x,
                pose.scale.y,
                pose.scale.z,
                pose.rotation.z.to_degrees()
            );
        } else {
            debug!("pose hidden");
        }
    }

    fn attach_asset(&mut self, asset: &AssetInstance) {
        info!("Attached asset '{}' (opacity {:.2})", asset.asset.name, asset.opacity);
    }
}
