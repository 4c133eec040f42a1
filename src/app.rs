//! Main application module: the asynchronous tracking loop.
//!
//! A single loop multiplexes three event sources with `tokio::select!`:
//! shutdown, detection completions and the periodic tick. Each issued
//! detection runs the (blocking) landmark provider on the blocking pool and
//! reports back through a completion queue, so all tracker state is touched
//! from this one loop only.

use crate::{
    asset::OverlayAsset,
    config::Config,
    error::Result,
    landmarks::{FrameSource, LandmarkProvider, VideoFrame},
    overlay::{OverlayRenderer, PoseUpdate},
    pose_mapping::Pose,
    tracker::{CycleOutcome, CycleStart, DetectionOutcome, DetectionTicket, Tracker, TrackerStats},
};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};

/// Health of the pipeline as seen by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineStatus {
    /// Created, not running yet
    Idle,
    /// Tick loop active
    Running,
    /// Frame acquisition failed on the last tick; retried on the next one
    CameraUnavailable(String),
    /// Loop finished and torn down
    Stopped,
}

/// Why the loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Shutdown was requested or its sender dropped
    Shutdown,
    /// The frame source reached the end of its stream
    EndOfStream,
}

/// Summary returned when the loop ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub reason: StopReason,
    pub ticks: u64,
    pub tracker: TrackerStats,
    pub poses_published: u64,
}

struct Completion {
    ticket: DetectionTicket,
    outcome: DetectionOutcome,
}

/// Ties a frame source, a landmark provider and a renderer to the tracker
pub struct OverlayApp<P, S, R> {
    config: Config,
    provider: Arc<P>,
    source: S,
    renderer: R,
    tracker: Tracker,
    pose_tx: watch::Sender<PoseUpdate>,
    status_tx: watch::Sender<PipelineStatus>,
    poses_published: u64,
}

impl<P, S, R> OverlayApp<P, S, R>
where
    P: LandmarkProvider + 'static,
    S: FrameSource,
    R: OverlayRenderer,
{
    /// Create a new tracking application
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    pub fn new(config: Config, provider: P, source: S, renderer: R) -> Result<Self> {
        info!("Initializing mouthguard tracker");
        config.validate()?;
        let tracker = Tracker::new(&config)?;
        let (pose_tx, _) = watch::channel(PoseUpdate::default());
        let (status_tx, _) = watch::channel(PipelineStatus::Idle);

        Ok(Self {
            config,
            provider: Arc::new(provider),
            source,
            renderer,
            tracker,
            pose_tx,
            status_tx,
            poses_published: 0,
        })
    }

    /// Receiver of the most recent pose, for render loops running at display rate
    #[must_use]
    pub fn subscribe_poses(&self) -> watch::Receiver<PoseUpdate> {
        self.pose_tx.subscribe()
    }

    /// Receiver of the pipeline status
    #[must_use]
    pub fn subscribe_status(&self) -> watch::Receiver<PipelineStatus> {
        self.status_tx.subscribe()
    }

    /// Select the overlay asset and hand its session clone to the renderer
    pub fn select_asset(&mut self, asset: Arc<OverlayAsset>) {
        let instance = self.tracker.select_asset(asset);
        self.renderer.attach_asset(instance);
    }

    #[must_use]
    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Run until shutdown is signalled (or its sender dropped) or the source ends
    ///
    /// # Errors
    ///
    /// Currently never fails once started; camera errors are reported through the status channel
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<RunStats> {
        info!("Starting tracking loop");
        let tick_period = Duration::from_millis(self.config.scheduler.tick_interval_ms);
        let mut ticker = tokio::time::interval(tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let (done_tx, mut done_rx) = mpsc::channel::<Completion>(1);
        let mut in_flight: Option<JoinHandle<()>> = None;
        let started = Instant::now();
        let mut ticks = 0_u64;
        self.status_tx.send_replace(PipelineStatus::Running);

        let reason = loop {
            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Shutdown requested");
                        break StopReason::Shutdown;
                    }
                }
                Some(completion) = done_rx.recv() => {
                    in_flight = None;
                    let outcome = self.tracker.complete_cycle(&completion.ticket, completion.outcome);
                    self.apply(outcome);
                }
                _ = ticker.tick() => {
                    ticks += 1;
                    let now_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                    match self.on_tick(now_ms, &done_tx) {
                        Ok(Some(handle)) => in_flight = Some(handle),
                        Ok(None) => {}
                        Err(StopReason::EndOfStream) => {
                            info!("End of stream reached");
                            break StopReason::EndOfStream;
                        }
                        Err(StopReason::Shutdown) => break StopReason::Shutdown,
                    }
                }
            }
        };

        // Teardown: nothing completing from here on may reach the renderer
        if let Some(handle) = in_flight.take() {
            handle.abort();
        }
        self.tracker.teardown();
        drop(done_rx);
        // Outranks every cycle sequence so no reader treats it as stale
        self.publish(PoseUpdate {
            sequence: u64::MAX,
            pose: Pose::hidden(),
        });
        self.status_tx.send_replace(PipelineStatus::Stopped);
        info!("Tracking loop stopped after {} ticks", ticks);

        Ok(RunStats {
            reason,
            ticks,
            tracker: self.tracker.stats(),
            poses_published: self.poses_published,
        })
    }

    fn on_tick(
        &mut self,
        now_ms: u64,
        done_tx: &mpsc::Sender<Completion>,
    ) -> std::result::Result<Option<JoinHandle<()>>, StopReason> {
        if self.tracker.in_flight().is_some() {
            return Ok(None);
        }

        let frame = match self.source.next_frame() {
            Ok(Some(frame)) => {
                if matches!(*self.status_tx.borrow(), PipelineStatus::CameraUnavailable(_)) {
                    info!("Camera recovered");
                    self.status_tx.send_replace(PipelineStatus::Running);
                }
                frame
            }
            Ok(None) => return Err(StopReason::EndOfStream),
            Err(e) => {
                warn!("Frame acquisition failed: {}", e);
                self.status_tx.send_replace(PipelineStatus::CameraUnavailable(e.to_string()));
                // No frame still counts against the grace period
                if let Some(outcome) = self.tracker.skip_cycle(now_ms) {
                    self.apply(outcome);
                }
                return Ok(None);
            }
        };

        match self.tracker.begin_cycle(now_ms, frame.descriptor()) {
            CycleStart::Detect(ticket) => {
                debug!("Issuing detection #{} at {}ms", ticket.sequence, now_ms);
                Ok(Some(self.spawn_detection(ticket, frame, done_tx.clone())))
            }
            CycleStart::Missed(outcome) => {
                self.apply(outcome);
                Ok(None)
            }
            CycleStart::Wait => Ok(None),
        }
    }

    fn spawn_detection(
        &self,
        ticket: DetectionTicket,
        frame: VideoFrame,
        done_tx: mpsc::Sender<Completion>,
    ) -> JoinHandle<()> {
        let provider = Arc::clone(&self.provider);
        tokio::spawn(async move {
            let outcome = match tokio::task::spawn_blocking(move || provider.detect(&frame)).await {
                Ok(result) => DetectionOutcome::from(result),
                Err(e) => DetectionOutcome::Failed(e.to_string()),
            };
            // The receiver is gone after teardown; the result is dropped with it
            let _ = done_tx.send(Completion { ticket, outcome }).await;
        })
    }

    fn apply(&mut self, outcome: CycleOutcome) {
        match outcome {
            CycleOutcome::Updated(update) | CycleOutcome::Hidden(update) => self.publish(update),
            CycleOutcome::Held | CycleOutcome::Discarded => {}
        }
    }

    fn publish(&mut self, update: PoseUpdate) {
        self.renderer.set_pose(&update.pose);
        self.pose_tx.send_replace(update);
        self.poses_published += 1;
    }
}
