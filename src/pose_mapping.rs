//! Mapping of 2D mouth landmarks to a 3D overlay pose.
//!
//! The mapper goes pixel space → normalized device coordinates → the world
//! plane seen by the renderer camera at its working distance. It is a pure
//! function of its inputs so identical landmarks, frame and gesture always
//! produce a bit-identical [`Pose`].

use crate::{
    config::PoseConfig,
    constants::EPSILON,
    gesture::GestureState,
    landmarks::{FrameDescriptor, Landmark, LandmarkSet},
};
use nalgebra::Vector3;
use std::f32::consts::PI;

/// Placement of the overlay object in renderer space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// World position
    pub position: Vector3<f32>,
    /// Non-uniform scale
    pub scale: Vector3<f32>,
    /// Euler angles in radians (x, y, z)
    pub rotation: Vector3<f32>,
    /// Whether the renderer should draw the object
    pub visible: bool,
}

impl Pose {
    /// A pose telling the renderer to hide the object
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            position: Vector3::zeros(),
            scale: Vector3::zeros(),
            rotation: Vector3::zeros(),
            visible: false,
        }
    }

    fn is_finite(&self) -> bool {
        self.position.iter().chain(self.scale.iter()).chain(self.rotation.iter()).all(|v| v.is_finite())
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::hidden()
    }
}

/// Perspective camera of the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendererCamera {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Distance from the camera to the overlay plane
    pub distance: f32,
    /// Viewport aspect ratio, `None` to follow the frame
    pub aspect_ratio: Option<f32>,
}

impl RendererCamera {
    /// Size (width, height) of the visible plane at the camera distance
    #[must_use]
    pub fn plane_size(&self, aspect_ratio: f32) -> (f32, f32) {
        let fov = self.fov_degrees.to_radians();
        let height = 2.0 * (fov / 2.0).tan() * self.distance;
        (height * aspect_ratio, height)
    }
}

/// Where the horizontal mirror of a front camera is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorMode {
    /// The mapper does not flip; either nothing is mirrored or the canvas mirrors itself
    None,
    /// The source is mirrored but the canvas is not, so the mapper flips X
    Flip,
}

impl MirrorMode {
    /// Resolve the mode so the mirror is applied exactly once across the pipeline
    #[must_use]
    pub const fn resolve(source_mirrored: bool, canvas_mirrored: bool) -> Self {
        if source_mirrored && !canvas_mirrored {
            Self::Flip
        } else {
            Self::None
        }
    }
}

/// Converts landmark sets into overlay poses
#[derive(Debug, Clone)]
pub struct PoseMapper {
    config: PoseConfig,
    camera: RendererCamera,
    mirror: MirrorMode,
}

impl PoseMapper {
    #[must_use]
    pub fn new(config: PoseConfig) -> Self {
        let camera = RendererCamera {
            fov_degrees: config.fov_degrees,
            distance: config.camera_distance,
            aspect_ratio: config.aspect_ratio,
        };
        let mirror = MirrorMode::resolve(config.source_mirrored, config.canvas_mirrored);
        Self { config, camera, mirror }
    }

    #[must_use]
    pub fn camera(&self) -> &RendererCamera {
        &self.camera
    }

    #[must_use]
    pub fn mirror(&self) -> MirrorMode {
        self.mirror
    }

    /// Pixel point to normalized device coordinates in [-1, 1]
    ///
    /// Returns `None` for an empty frame.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn normalize(&self, point: Landmark, frame: &FrameDescriptor) -> Option<(f32, f32)> {
        if frame.is_empty() {
            return None;
        }
        let ndc_x = (point.x / frame.width as f32).mul_add(2.0, -1.0);
        let ndc_y = -(point.y / frame.height as f32).mul_add(2.0, -1.0);
        let ndc_x = match self.mirror {
            MirrorMode::None => ndc_x,
            MirrorMode::Flip => -ndc_x,
        };
        Some((ndc_x, ndc_y))
    }

    /// Compute the overlay pose for one detection
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn map(&self, landmarks: &LandmarkSet, frame: &FrameDescriptor, gesture: GestureState) -> Pose {
        let mouth_width = landmarks.mouth_width();
        if mouth_width <= EPSILON {
            return Pose::hidden();
        }

        let left = landmarks.left_corner();
        let right = landmarks.right_corner();
        let center = Landmark::new(
            (left.x + right.x) / 2.0,
            (landmarks.inner_top().y + landmarks.inner_bottom().y) / 2.0,
        );

        let Some((ndc_x, ndc_y)) = self.normalize(center, frame) else {
            return Pose::hidden();
        };
        let Some(aspect) = self.camera.aspect_ratio.or_else(|| frame.aspect_ratio()) else {
            return Pose::hidden();
        };

        let (plane_width, plane_height) = self.camera.plane_size(aspect);
        let position = Vector3::new(
            ndc_x * plane_width / 2.0,
            ndc_y * plane_height / 2.0,
            self.config.depth_offset,
        );

        let relative_width = mouth_width / frame.width as f32;
        let s = (self.config.base_scale * relative_width * self.config.scale_factor).max(self.config.min_scale);
        let scale = Vector3::new(s, s * self.config.scale_y_ratio, s * self.config.scale_z_ratio);

        // The asset is authored upside down, hence the half turn about X
        let angle = (right.y - left.y).atan2(right.x - left.x);
        let roll = match self.mirror {
            MirrorMode::None => -angle,
            MirrorMode::Flip => angle,
        };
        let rotation = Vector3::new(PI, 0.0, roll);

        let pose = Pose {
            position,
            scale,
            rotation,
            visible: gesture.mouth_open,
        };

        if pose.is_finite() {
            pose
        } else {
            Pose::hidden()
        }
    }
}
