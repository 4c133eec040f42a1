//! Landmark data model and the detection-side interfaces.
//!
//! A [`LandmarkProvider`] turns a [`VideoFrame`] into at most one
//! [`FaceDetection`]; the tracker only ever looks at the mouth contour of
//! that detection, stored as a [`LandmarkSet`].

use crate::{
    constants::{
        FACE_MOUTH_START, INNER_LIP_BOTTOM, INNER_LIP_TOP, LEFT_MOUTH_CORNER, NUM_FACE_LANDMARKS,
        NUM_MOUTH_LANDMARKS, RIGHT_MOUTH_CORNER,
    },
    error::NoFaceFound,
    Error, Result,
};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A single 2D landmark in frame pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another landmark
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f32, f32)> for Landmark {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Mouth contour of one successful detection.
///
/// Always holds exactly [`NUM_MOUTH_LANDMARKS`] finite points. Index 0 is the
/// left mouth corner, 6 the right corner, 13 and 19 the inner top and bottom lip.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    points: Vec<Landmark>,
}

impl LandmarkSet {
    /// Build a set from the 20-point mouth contour
    ///
    /// # Errors
    ///
    /// Returns an error if the point count is wrong or a coordinate is not finite
    pub fn from_mouth(points: Vec<Landmark>) -> Result<Self> {
        if points.len() != NUM_MOUTH_LANDMARKS {
            return Err(Error::InvalidInput(format!(
                "Expected {} mouth landmarks, got {}",
                NUM_MOUTH_LANDMARKS,
                points.len()
            )));
        }
        if let Some(idx) = points.iter().position(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(Error::InvalidInput(format!("Landmark {idx} has a non-finite coordinate")));
        }
        Ok(Self { points })
    }

    /// Build a set from a full 68-point face layout, keeping the mouth contour
    ///
    /// # Errors
    ///
    /// Returns an error if the point count is not 68 or a mouth coordinate is not finite
    pub fn from_face_68(points: &[Landmark]) -> Result<Self> {
        if points.len() != NUM_FACE_LANDMARKS {
            return Err(Error::InvalidInput(format!(
                "Expected {} face landmarks, got {}",
                NUM_FACE_LANDMARKS,
                points.len()
            )));
        }
        Self::from_mouth(points[FACE_MOUTH_START..].to_vec())
    }

    #[must_use]
    pub fn points(&self) -> &[Landmark] {
        &self.points
    }

    #[must_use]
    pub fn left_corner(&self) -> Landmark {
        self.points[LEFT_MOUTH_CORNER]
    }

    #[must_use]
    pub fn right_corner(&self) -> Landmark {
        self.points[RIGHT_MOUTH_CORNER]
    }

    #[must_use]
    pub fn inner_top(&self) -> Landmark {
        self.points[INNER_LIP_TOP]
    }

    #[must_use]
    pub fn inner_bottom(&self) -> Landmark {
        self.points[INNER_LIP_BOTTOM]
    }

    /// Horizontal distance between the mouth corners
    #[must_use]
    pub fn mouth_width(&self) -> f32 {
        (self.right_corner().x - self.left_corner().x).abs()
    }

    /// Vertical separation of the inner lips
    #[must_use]
    pub fn mouth_opening(&self) -> f32 {
        (self.inner_bottom().y - self.inner_top().y).abs()
    }
}

/// Axis-aligned face bounding box in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Centre point of the box
    #[must_use]
    pub fn centroid(&self) -> Landmark {
        Landmark::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Size of the current source frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrameDescriptor {
    pub width: u32,
    pub height: u32,
}

impl FrameDescriptor {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A frame with a zero dimension (camera still warming up)
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height, `None` for an empty frame
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn aspect_ratio(&self) -> Option<f32> {
        if self.is_empty() {
            None
        } else {
            Some(self.width as f32 / self.height as f32)
        }
    }
}

/// One captured video frame
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Position of the frame in its stream
    pub index: u64,
    /// Pixel data, shared so detection tasks can hold it cheaply
    pub image: Arc<RgbImage>,
}

impl VideoFrame {
    #[must_use]
    pub fn new(index: u64, image: Arc<RgbImage>) -> Self {
        Self { index, image }
    }

    #[must_use]
    pub fn descriptor(&self) -> FrameDescriptor {
        FrameDescriptor::new(self.image.width(), self.image.height())
    }
}

/// A detected face: its bounding box and mouth landmarks
#[derive(Debug, Clone, PartialEq)]
pub struct FaceDetection {
    pub bbox: BoundingBox,
    pub landmarks: LandmarkSet,
}

/// Landmark model consumed as a black box.
///
/// Each call must be independent of the previous ones: the same frame always
/// yields the same answer.
pub trait LandmarkProvider: Send + Sync {
    /// Detect the single tracked face in `frame`
    ///
    /// # Errors
    ///
    /// Returns [`NoFaceFound`] when the frame contains no face
    fn detect(&self, frame: &VideoFrame) -> std::result::Result<FaceDetection, NoFaceFound>;
}

/// Source of video frames (camera, file, replay)
pub trait FrameSource: Send {
    /// Latest frame, `Ok(None)` at end of stream
    ///
    /// # Errors
    ///
    /// Returns [`Error::Camera`] when acquisition fails; the caller retries on its next tick
    fn next_frame(&mut self) -> Result<Option<VideoFrame>>;
}
