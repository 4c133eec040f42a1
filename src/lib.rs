//! Mouth tracking and overlay alignment for live video.
//!
//! This library places a 3D mouthguard model over the wearer's mouth in real
//! time. It sits between a landmark model (consumed as a black box through
//! [`landmarks::LandmarkProvider`]) and a renderer (reached through
//! [`overlay::OverlayRenderer`]):
//!
//! 1. The detection scheduler decides when to run the landmark model, polling
//!    faster while the face moves and slower while it is still
//! 2. The gesture classifier decides whether the mouth is open from the inner
//!    lip separation
//! 3. The pose mapper turns the mouth landmarks into a position, scale and
//!    rotation in the renderer's world space
//! 4. The tracker ties these together, one detection cycle at a time, and
//!    hides the overlay when the face has been lost for too long
//!
//! # Examples
//!
//! ## Mapping a single detection
//!
//! ```
//! use mouthguard_tracker::{
//!     config::Config,
//!     gesture::GestureClassifier,
//!     landmarks::{FrameDescriptor, Landmark, LandmarkSet},
//!     pose_mapping::PoseMapper,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let classifier = GestureClassifier::new(config.gesture.clone());
//! let mapper = PoseMapper::new(config.pose.clone());
//!
//! let mut points = vec![Landmark::new(180.0, 300.0); 20];
//! points[0] = Landmark::new(150.0, 300.0); // left corner
//! points[6] = Landmark::new(210.0, 300.0); // right corner
//! points[13] = Landmark::new(180.0, 295.0); // inner top lip
//! points[19] = Landmark::new(180.0, 305.0); // inner bottom lip
//! let mouth = LandmarkSet::from_mouth(points)?;
//!
//! let frame = FrameDescriptor::new(360, 640);
//! let gesture = classifier.classify(&mouth, &frame);
//! let pose = mapper.map(&mouth, &frame, gesture);
//! assert!(pose.visible);
//! # Ok(())
//! # }
//! ```
//!
//! ## Driving the scheduler
//!
//! ```
//! use mouthguard_tracker::{config::SchedulerConfig, landmarks::BoundingBox, scheduler::DetectionScheduler};
//!
//! let mut scheduler = DetectionScheduler::new(SchedulerConfig::default());
//! assert!(scheduler.poll(0));
//! scheduler.record_face(&BoundingBox::new(50.0, 50.0, 100.0, 100.0));
//! scheduler.record_face(&BoundingBox::new(100.0, 90.0, 100.0, 100.0));
//! assert_eq!(scheduler.interval_ms(), 30);
//! ```

/// Overlay asset loading and per-session instances
pub mod asset;

/// Asynchronous tracking loop
pub mod app;

/// Command-line arguments
pub mod cli;

/// Configuration management
pub mod config;

/// Constants used throughout the tracker
pub mod constants;

/// Error types and result handling
pub mod error;

/// Positional smoothing filters
pub mod filters;

/// Mouth open/closed classification
pub mod gesture;

/// Landmark data model and provider interfaces
pub mod landmarks;

/// Renderer interface and pose updates
pub mod overlay;

/// Landmark to 3D pose mapping
pub mod pose_mapping;

/// Recorded landmark traces
pub mod replay;

/// Motion-adaptive detection scheduling
pub mod scheduler;

/// Detection cycle state machine
pub mod tracker;

pub use error::{Error, NoFaceFound, Result};
