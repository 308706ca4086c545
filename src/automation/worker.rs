//! The retry scheduler: one matching attempt per iteration, progressive
//! backoff on consecutive misses, interruptible waits in between.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::sync::{mpsc, watch};
use tokio::time::sleep;

use super::dispatch;
use super::types::{RunState, WorkerEvent};
use crate::matching::{Detector, render_overlay};
use crate::screen::ScreenControl;
use crate::settings::Settings;

/// Longest wait between attempts under sustained failure. Caps the backoff
/// so detection latency stays bounded once the target reappears.
pub(crate) const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Where the match overlay is written when debug mode is on.
const DEBUG_OVERLAY_PATH: &str = "debug-match.png";

/// Wait before the next attempt after `failures` consecutive misses:
/// `min(MAX_BACKOFF, base × failures)`.
pub(crate) fn backoff_delay(base: Duration, failures: u32) -> Duration {
    let scaled = base.as_secs_f64() * f64::from(failures.max(1));
    Duration::from_secs_f64(scaled.min(MAX_BACKOFF.as_secs_f64()))
}

enum Attempt {
    Clicked {
        x: u32,
        y: u32,
        confidence: f32,
        scale: f32,
    },
    Miss,
    Failed(String),
}

/// One run's worth of scheduler state. Owns the settings snapshot, the
/// detector and the failure counter; the controller only holds the stop
/// flag.
pub struct Worker<S: ScreenControl> {
    settings: Settings,
    screen: Arc<S>,
    detector: Detector,
    consecutive_failures: u32,
    state: RunState,
    events: mpsc::Sender<WorkerEvent>,
    stop_rx: watch::Receiver<bool>,
}

impl<S: ScreenControl> Worker<S> {
    pub fn new(
        settings: Settings,
        screen: Arc<S>,
        events: mpsc::Sender<WorkerEvent>,
        stop_rx: watch::Receiver<bool>,
    ) -> Self {
        let detector = Detector::new(&settings);
        Self {
            settings,
            screen,
            detector,
            consecutive_failures: 0,
            state: RunState::Idle,
            events,
            stop_rx,
        }
    }

    /// Run the loop until stop is signaled. Attempts are strictly
    /// sequential; the only suspension points are the two waits below.
    pub async fn run(mut self) {
        self.set_state(RunState::Running);
        info!(
            "automation loop started (base interval {:.1}s)",
            self.settings.retry_interval_seconds
        );

        loop {
            if self.stop_requested() {
                self.set_state(RunState::Stopping);
                break;
            }

            let wait = match self.attempt() {
                Attempt::Clicked {
                    x,
                    y,
                    confidence,
                    scale,
                } => {
                    self.consecutive_failures = 0;
                    self.emit(WorkerEvent::Clicked {
                        x,
                        y,
                        confidence,
                        scale,
                    });
                    self.settings.retry_interval()
                }
                outcome => {
                    if let Attempt::Failed(reason) = outcome {
                        self.emit(WorkerEvent::AttemptFailed(reason));
                    }
                    self.consecutive_failures += 1;
                    self.emit(WorkerEvent::NotFound {
                        consecutive_failures: self.consecutive_failures,
                    });
                    if self.consecutive_failures > self.settings.max_retries {
                        warn!(
                            "no match after {} attempts (max_retries {})",
                            self.consecutive_failures, self.settings.max_retries
                        );
                        self.emit(WorkerEvent::RetriesExhausted {
                            consecutive_failures: self.consecutive_failures,
                        });
                    }
                    backoff_delay(self.settings.retry_interval(), self.consecutive_failures)
                }
            };

            if self.wait_for(wait).await {
                self.set_state(RunState::Stopping);
                break;
            }
        }

        self.set_state(RunState::Idle);
        self.emit(WorkerEvent::Stopped);
        info!("automation loop stopped");
    }

    /// One capture → match → click attempt. Every recoverable error is
    /// swallowed here so the loop survives any single bad attempt.
    fn attempt(&mut self) -> Attempt {
        let capture = match self.screen.capture_region(self.settings.capture_region) {
            Ok(capture) => capture,
            Err(e) => {
                error!("capture failed: {e}");
                return Attempt::Failed(format!("capture failed: {e}"));
            }
        };

        let result = self.detector.detect(&capture);
        if !result.found {
            info!(
                "target not found (best confidence {:.3})",
                result.confidence
            );
            return Attempt::Miss;
        }

        if self.settings.debug {
            let overlay = render_overlay(&capture, &result);
            if let Err(e) = overlay.save(DEBUG_OVERLAY_PATH) {
                warn!("failed to save debug overlay: {e}");
            }
        }

        match dispatch::dispatch(
            self.screen.as_ref(),
            &result,
            self.settings.capture_region,
        ) {
            Ok((x, y)) => {
                info!(
                    "target found at ({x},{y}) scale {:.2} confidence {:.2}, clicked",
                    result.scale, result.confidence
                );
                Attempt::Clicked {
                    x,
                    y,
                    confidence: result.confidence,
                    scale: result.scale,
                }
            }
            Err(e) => {
                error!("click failed: {e}");
                Attempt::Failed(format!("click failed: {e}"))
            }
        }
    }

    fn stop_requested(&self) -> bool {
        !*self.stop_rx.borrow()
    }

    /// Sleep up to `duration`, returning true when stop was signaled before
    /// the full duration elapsed.
    async fn wait_for(&mut self, duration: Duration) -> bool {
        tokio::select! {
            _ = sleep(duration) => false,
            _ = self.stop_rx.changed() => true,
        }
    }

    fn set_state(&mut self, state: RunState) {
        if self.state != state {
            debug!("worker state: {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    // Events are advisory; drop them instead of stalling the loop when the
    // frontend falls behind.
    fn emit(&self, event: WorkerEvent) {
        let _ = self.events.try_send(event);
    }
}
