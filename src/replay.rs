//! Recorded landmark traces for offline runs.
//!
//! A trace stores the frame size and, per frame, either a detection or
//! `null` for "no face". [`ReplaySource`] turns the trace into a frame stream
//! and [`ReplayProvider`] answers detections by frame index, so each call is
//! independent of every other call.
//!
//! ```yaml
//! frame: { width: 360, height: 640 }
//! detections:
//!   - bbox: { x: 120, y: 220, width: 120, height: 160 }
//!     mouth: [[150, 300], [155, 298], ...]   # 20 points, or `face:` with 68
//!   - null
//! ```

use crate::{
    constants::{NUM_FACE_LANDMARKS, NUM_MOUTH_LANDMARKS},
    error::NoFaceFound,
    landmarks::{BoundingBox, FaceDetection, FrameDescriptor, FrameSource, Landmark, LandmarkProvider, LandmarkSet, VideoFrame},
    Error, Result,
};
use image::RgbImage;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// One recorded detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceDetection {
    pub bbox: BoundingBox,
    /// 20-point mouth contour
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mouth: Option<Vec<[f32; 2]>>,
    /// Full 68-point face layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face: Option<Vec<[f32; 2]>>,
}

impl TraceDetection {
    fn to_detection(&self) -> Result<FaceDetection> {
        let to_points = |raw: &[[f32; 2]]| raw.iter().map(|&[x, y]| Landmark::new(x, y)).collect::<Vec<_>>();

        let landmarks = match (&self.mouth, &self.face) {
            (Some(mouth), None) => LandmarkSet::from_mouth(to_points(mouth.as_slice()))?,
            (None, Some(face)) => LandmarkSet::from_face_68(&to_points(face.as_slice()))?,
            _ => {
                return Err(Error::Trace(format!(
                    "Detection needs exactly one of `mouth` ({NUM_MOUTH_LANDMARKS} points) or `face` ({NUM_FACE_LANDMARKS} points)"
                )))
            }
        };

        Ok(FaceDetection {
            bbox: self.bbox,
            landmarks,
        })
    }
}

/// Raw trace file contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceFile {
    pub frame: FrameDescriptor,
    pub detections: Vec<Option<TraceDetection>>,
}

/// A validated trace
#[derive(Debug, Clone)]
pub struct ReplayTrace {
    frame: FrameDescriptor,
    detections: Vec<Option<FaceDetection>>,
}

impl ReplayTrace {
    /// Load and validate a YAML trace file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading replay trace from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate YAML trace text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file: TraceFile =
            serde_yaml::from_str(content).map_err(|e| Error::Trace(format!("Failed to parse trace: {e}")))?;
        Self::from_trace_file(&file)
    }

    /// Validate an in-memory trace
    pub fn from_trace_file(file: &TraceFile) -> Result<Self> {
        let detections = file
            .detections
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                entry
                    .as_ref()
                    .map(TraceDetection::to_detection)
                    .transpose()
                    .map_err(|e| Error::Trace(format!("Frame {idx}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            frame: file.frame,
            detections,
        })
    }

    /// Build a trace directly from detections
    #[must_use]
    pub fn new(frame: FrameDescriptor, detections: Vec<Option<FaceDetection>>) -> Self {
        Self { frame, detections }
    }

    #[must_use]
    pub fn frame(&self) -> FrameDescriptor {
        self.frame
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.detections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    /// Detection recorded for a frame index
    #[must_use]
    pub fn detection(&self, index: u64) -> Option<&FaceDetection> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.detections.get(i))
            .and_then(Option::as_ref)
    }
}

/// Frame source that yields one blank frame per trace entry
pub struct ReplaySource {
    image: Arc<RgbImage>,
    next_index: u64,
    total: u64,
}

impl ReplaySource {
    #[must_use]
    pub fn new(trace: &ReplayTrace) -> Self {
        let frame = trace.frame();
        Self {
            image: Arc::new(RgbImage::new(frame.width, frame.height)),
            next_index: 0,
            total: trace.len() as u64,
        }
    }
}

impl FrameSource for ReplaySource {
    fn next_frame(&mut self) -> Result<Option<VideoFrame>> {
        if self.next_index >= self.total {
            return Ok(None);
        }
        let frame = VideoFrame::new(self.next_index, Arc::clone(&self.image));
        self.next_index += 1;
        Ok(Some(frame))
    }
}

/// Landmark provider answering from a trace by frame index
pub struct ReplayProvider {
    trace: Arc<ReplayTrace>,
}

impl ReplayProvider {
    #[must_use]
    pub fn new(trace: Arc<ReplayTrace>) -> Self {
        Self { trace }
    }
}

impl LandmarkProvider for ReplayProvider {
    fn detect(&self, frame: &VideoFrame) -> std::result::Result<FaceDetection, NoFaceFound> {
        self.trace.detection(frame.index).cloned().ok_or(NoFaceFound)
    }
}
