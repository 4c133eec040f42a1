//! Detection cycle state machine.
//!
//! The tracker owns every piece of cross-cycle state (motion history, the
//! sticky gesture, sequence numbers, the face-loss counter) and is driven
//! through two entry points: [`Tracker::begin_cycle`] (or
//! [`Tracker::skip_cycle`] when there is no frame) on each tick and
//! [`Tracker::complete_cycle`] when the landmark provider answers. It does
//! no I/O and never blocks, so the whole policy can be tested synchronously.

use crate::{
    asset::{AssetInstance, AssetSlot, OverlayAsset},
    config::{Config, TrackingConfig},
    error::NoFaceFound,
    filters::PointFilter,
    gesture::{GestureClassifier, GestureState},
    landmarks::{FaceDetection, FrameDescriptor},
    overlay::PoseUpdate,
    pose_mapping::{Pose, PoseMapper},
    scheduler::DetectionScheduler,
    Result,
};
use log::{debug, info, warn};
use std::sync::Arc;

/// Handle for one issued detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionTicket {
    /// Monotonic cycle number, starting at 1
    pub sequence: u64,
    /// Size of the frame handed to the provider
    pub frame: FrameDescriptor,
    /// Tick time at which the detection was issued
    pub issued_at_ms: u64,
}

/// What the landmark provider reported for a cycle
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionOutcome {
    /// A face was found
    Face(FaceDetection),
    /// No face in the frame
    NoFace,
    /// The detection task itself failed; handled like a missing face
    Failed(String),
}

impl From<std::result::Result<FaceDetection, NoFaceFound>> for DetectionOutcome {
    fn from(result: std::result::Result<FaceDetection, NoFaceFound>) -> Self {
        match result {
            Ok(face) => Self::Face(face),
            Err(NoFaceFound) => Self::NoFace,
        }
    }
}

/// Result of a scheduling tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleStart {
    /// Run the landmark provider for this ticket
    Detect(DetectionTicket),
    /// No frame to detect on; the tick counted as a miss
    Missed(CycleOutcome),
    /// Nothing due this tick
    Wait,
}

impl CycleStart {
    /// The ticket, when a detection was issued
    #[must_use]
    pub fn ticket(self) -> Option<DetectionTicket> {
        match self {
            Self::Detect(ticket) => Some(ticket),
            Self::Missed(_) | Self::Wait => None,
        }
    }
}

/// Effect of a completed cycle on the overlay
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    /// A new pose was computed from this cycle's landmarks
    Updated(PoseUpdate),
    /// No face, still within the grace period (or already hidden): keep what the renderer has
    Held,
    /// The grace period ran out: the overlay must be hidden
    Hidden(PoseUpdate),
    /// Result arrived after teardown or was older than one already applied
    Discarded,
}

/// Counters over the tracker's lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackerStats {
    pub detections_issued: u64,
    pub faces_found: u64,
    pub misses: u64,
    pub discarded: u64,
}

/// The scheduling, classification and alignment state machine
pub struct Tracker {
    scheduler: DetectionScheduler,
    classifier: GestureClassifier,
    mapper: PoseMapper,
    filter: Box<dyn PointFilter>,
    tracking: TrackingConfig,
    asset: AssetSlot,
    asset_opacity: f32,
    gesture: GestureState,
    next_sequence: u64,
    in_flight: Option<u64>,
    last_applied: u64,
    consecutive_misses: u32,
    overlay_hidden: bool,
    torn_down: bool,
    stats: TrackerStats,
}

impl Tracker {
    /// Build a tracker from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the smoothing filter configuration is invalid
    pub fn new(config: &Config) -> Result<Self> {
        let filter = config.create_filter()?;
        info!(
            "Tracker ready: threshold {}px, grace {} misses, smoothing {}",
            config.gesture.open_threshold_px,
            config.tracking.grace_misses,
            filter.name()
        );

        Ok(Self {
            scheduler: DetectionScheduler::new(config.scheduler.clone()),
            classifier: GestureClassifier::new(config.gesture.clone()),
            mapper: PoseMapper::new(config.pose.clone()),
            filter,
            tracking: config.tracking.clone(),
            asset: AssetSlot::new(),
            asset_opacity: config.asset.opacity,
            gesture: GestureState::CLOSED,
            next_sequence: 0,
            in_flight: None,
            last_applied: 0,
            consecutive_misses: 0,
            overlay_hidden: true,
            torn_down: false,
            stats: TrackerStats::default(),
        })
    }

    /// Scheduling tick for a frame of the given size
    ///
    /// An empty frame (camera warm-up) cannot be detected on and is counted
    /// as a miss once per due interval.
    pub fn begin_cycle(&mut self, now_ms: u64, frame: FrameDescriptor) -> CycleStart {
        if frame.is_empty() {
            debug!("Frame not ready ({}x{})", frame.width, frame.height);
            return self.skip_cycle(now_ms).map_or(CycleStart::Wait, CycleStart::Missed);
        }
        if !self.ready(now_ms) {
            return CycleStart::Wait;
        }

        let ticket = self.next_ticket(now_ms, frame);
        self.in_flight = Some(ticket.sequence);
        self.stats.detections_issued += 1;
        CycleStart::Detect(ticket)
    }

    /// Scheduling tick without a usable frame (camera error or empty frame).
    /// Returns the miss outcome when a detection was due.
    pub fn skip_cycle(&mut self, now_ms: u64) -> Option<CycleOutcome> {
        if !self.ready(now_ms) {
            return None;
        }
        let ticket = self.next_ticket(now_ms, FrameDescriptor::new(0, 0));
        self.last_applied = ticket.sequence;
        Some(self.apply_miss(&ticket))
    }

    fn ready(&mut self, now_ms: u64) -> bool {
        !self.torn_down && self.in_flight.is_none() && self.scheduler.poll(now_ms)
    }

    fn next_ticket(&mut self, now_ms: u64, frame: FrameDescriptor) -> DetectionTicket {
        self.next_sequence += 1;
        DetectionTicket {
            sequence: self.next_sequence,
            frame,
            issued_at_ms: now_ms,
        }
    }

    /// Apply the provider's answer for `ticket`
    pub fn complete_cycle(&mut self, ticket: &DetectionTicket, outcome: DetectionOutcome) -> CycleOutcome {
        if self.in_flight == Some(ticket.sequence) {
            self.in_flight = None;
        }
        if self.torn_down || ticket.sequence <= self.last_applied {
            debug!("Discarding detection #{}", ticket.sequence);
            self.stats.discarded += 1;
            return CycleOutcome::Discarded;
        }
        self.last_applied = ticket.sequence;

        match outcome {
            DetectionOutcome::Face(face) => self.apply_face(ticket, &face),
            DetectionOutcome::NoFace => self.apply_miss(ticket),
            DetectionOutcome::Failed(reason) => {
                warn!("Detection #{} failed: {}", ticket.sequence, reason);
                self.apply_miss(ticket)
            }
        }
    }

    fn apply_face(&mut self, ticket: &DetectionTicket, face: &FaceDetection) -> CycleOutcome {
        self.stats.faces_found += 1;
        self.consecutive_misses = 0;
        self.scheduler.record_face(&face.bbox);

        let pose = if self.tracking.require_asset && !self.asset.is_selected() {
            self.gesture = GestureState::CLOSED;
            Pose::hidden()
        } else {
            self.gesture = self.classifier.classify(&face.landmarks, &ticket.frame);
            self.smooth(self.mapper.map(&face.landmarks, &ticket.frame, self.gesture))
        };

        self.overlay_hidden = !pose.visible;
        CycleOutcome::Updated(PoseUpdate {
            sequence: ticket.sequence,
            pose,
        })
    }

    fn apply_miss(&mut self, ticket: &DetectionTicket) -> CycleOutcome {
        self.stats.misses += 1;
        self.consecutive_misses = self.consecutive_misses.saturating_add(1);

        if self.consecutive_misses > self.tracking.grace_misses && !self.overlay_hidden {
            info!(
                "No face for {} detections, hiding overlay",
                self.consecutive_misses
            );
            self.overlay_hidden = true;
            self.filter.reset();
            return CycleOutcome::Hidden(PoseUpdate {
                sequence: ticket.sequence,
                pose: Pose::hidden(),
            });
        }
        CycleOutcome::Held
    }

    #[allow(clippy::cast_possible_truncation)]
    fn smooth(&mut self, mut pose: Pose) -> Pose {
        if pose.visible {
            let (x, y) = self
                .filter
                .apply(f64::from(pose.position.x), f64::from(pose.position.y));
            pose.position.x = x as f32;
            pose.position.y = y as f32;
        }
        pose
    }

    /// Select the overlay asset for this session
    pub fn select_asset(&mut self, asset: Arc<OverlayAsset>) -> &AssetInstance {
        self.asset.select(asset, self.asset_opacity)
    }

    /// Drop the overlay asset
    pub fn clear_asset(&mut self) {
        self.asset.clear();
        self.gesture = GestureState::CLOSED;
    }

    /// Stop accepting results; everything completing afterwards is discarded
    pub fn teardown(&mut self) {
        self.torn_down = true;
        self.in_flight = None;
        self.overlay_hidden = true;
    }

    #[must_use]
    pub fn gesture(&self) -> GestureState {
        self.gesture
    }

    #[must_use]
    pub fn scheduler(&self) -> &DetectionScheduler {
        &self.scheduler
    }

    #[must_use]
    pub fn asset(&self) -> &AssetSlot {
        &self.asset
    }

    #[must_use]
    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    #[must_use]
    pub fn consecutive_misses(&self) -> u32 {
        self.consecutive_misses
    }

    #[must_use]
    pub fn stats(&self) -> TrackerStats {
        self.stats
    }
}
