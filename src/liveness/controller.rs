//! Liveness capture controller
//!
//! State machine: Idle → Streaming → FlashBlue → FlashGreen → Captured, with
//! Error reachable from any camera or capture failure. The camera stream is
//! an exclusively-owned resource released exactly once on every exit path.
//!
//! Real-time delays are not taken here; the controller asks a
//! [`FlashScheduler`] for them and the host fires them back through
//! [`LivenessCaptureController::on_timer`]. Every attempt carries an
//! [`AttemptId`] and stale callbacks are dropped, so a superseded attempt can
//! never land a frame after a new one has started.

use chrono::{DateTime, Utc};

use crate::config::LivenessTiming;
use crate::error::SignalError;
use crate::liveness::types::{
    AttemptId, CaptureFrame, CapturePhase, EncodedImage, FrameLabel, LivenessCapture,
    LivenessState,
};

/// Host seam for camera access
pub trait Camera {
    /// Request exclusive access to the camera device
    fn request_stream(&mut self) -> Result<Box<dyn CameraStream>, SignalError>;
}

/// An acquired, exclusive camera stream
pub trait CameraStream {
    /// Grab the current frame under the given tint overlay
    fn capture_frame(&mut self, label: FrameLabel) -> Result<EncodedImage, SignalError>;
    /// Stop all tracks and turn the capture indicator off
    fn release(&mut self);
}

/// Host seam for the countdown and flash-hold delays
pub trait FlashScheduler {
    /// Ask the host to call `on_timer(attempt, phase, ..)` after `delay_ms`
    fn schedule(&mut self, attempt: AttemptId, phase: CapturePhase, delay_ms: u64);
    /// Drop any pending timers for the given attempt
    fn cancel(&mut self, attempt: AttemptId);
}

/// Releases the stream exactly once, whether explicitly or on drop.
struct StreamGuard {
    stream: Box<dyn CameraStream>,
    released: bool,
}

impl StreamGuard {
    fn new(stream: Box<dyn CameraStream>) -> Self {
        Self {
            stream,
            released: false,
        }
    }

    fn capture_frame(&mut self, label: FrameLabel) -> Result<EncodedImage, SignalError> {
        self.stream.capture_frame(label)
    }

    fn release(&mut self) {
        if !self.released {
            self.stream.release();
            self.released = true;
        }
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.release();
    }
}

/// Drives the two-color flash capture sequence.
pub struct LivenessCaptureController {
    timing: LivenessTiming,
    state: LivenessState,
    status: Option<String>,
    attempt: AttemptId,
    stream: Option<StreamGuard>,
    pending_blue: Option<CaptureFrame>,
    capture: Option<LivenessCapture>,
}

impl Default for LivenessCaptureController {
    fn default() -> Self {
        Self::new(LivenessTiming::default())
    }
}

impl LivenessCaptureController {
    pub fn new(timing: LivenessTiming) -> Self {
        Self {
            timing,
            state: LivenessState::Idle,
            status: None,
            attempt: 0,
            stream: None,
            pending_blue: None,
            capture: None,
        }
    }

    pub fn state(&self) -> LivenessState {
        self.state
    }

    /// User-facing status message, if one is set
    pub fn status_message(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Identifier of the current attempt
    pub fn attempt(&self) -> AttemptId {
        self.attempt
    }

    /// The completed capture, if the sequence reached `Captured`
    pub fn capture(&self) -> Option<&LivenessCapture> {
        self.capture.as_ref()
    }

    /// Consume the completed capture and return the controller to `Idle`,
    /// ready for a fresh attempt, or fail if the sequence never finished.
    pub fn take_capture(&mut self) -> Result<LivenessCapture, SignalError> {
        match self.capture.take() {
            Some(capture) => {
                self.state = LivenessState::Idle;
                self.status = None;
                Ok(capture)
            }
            None => Err(SignalError::IncompleteCapture(format!(
                "no capture available in state {:?}",
                self.state
            ))),
        }
    }

    /// User-initiated start: request the camera and begin the countdown.
    ///
    /// Supersedes any in-flight attempt. On denial the controller moves to
    /// `Error` with a status message, produces no frames, and returns the
    /// camera error.
    pub fn start(
        &mut self,
        camera: &mut dyn Camera,
        scheduler: &mut dyn FlashScheduler,
    ) -> Result<(), SignalError> {
        self.supersede(scheduler);

        match camera.request_stream() {
            Ok(stream) => {
                self.stream = Some(StreamGuard::new(stream));
                self.state = LivenessState::Streaming;
                self.status = Some("Hold still; capture starts shortly.".to_string());
                scheduler.schedule(self.attempt, CapturePhase::Countdown, self.timing.countdown_ms);
                Ok(())
            }
            Err(e) => {
                self.state = LivenessState::Error;
                self.status = Some("Could not access camera. Please allow permission.".to_string());
                Err(e)
            }
        }
    }

    /// Host callback for an elapsed timer.
    ///
    /// Callbacks from superseded attempts, or that do not match the current
    /// state, are silently dropped. Frames are produced only here, only in
    /// the `FlashBlue`/`FlashGreen` states.
    pub fn on_timer(
        &mut self,
        scheduler: &mut dyn FlashScheduler,
        attempt: AttemptId,
        phase: CapturePhase,
        now: DateTime<Utc>,
    ) -> Result<(), SignalError> {
        if attempt != self.attempt {
            return Ok(());
        }

        match (phase, self.state) {
            (CapturePhase::Countdown, LivenessState::Streaming) => {
                self.state = LivenessState::FlashBlue;
                scheduler.schedule(self.attempt, CapturePhase::HoldBlue, self.timing.flash_hold_ms);
                Ok(())
            }
            (CapturePhase::HoldBlue, LivenessState::FlashBlue) => {
                let frame = self.grab_frame(FrameLabel::BlueTint, now)?;
                self.pending_blue = Some(frame);
                self.state = LivenessState::FlashGreen;
                scheduler.schedule(
                    self.attempt,
                    CapturePhase::HoldGreen,
                    self.timing.flash_hold_ms,
                );
                Ok(())
            }
            (CapturePhase::HoldGreen, LivenessState::FlashGreen) => {
                let green_tint = self.grab_frame(FrameLabel::GreenTint, now)?;
                let Some(blue_tint) = self.pending_blue.take() else {
                    return Err(self.fail(SignalError::IncompleteCapture(
                        "green frame captured without a blue frame".to_string(),
                    )));
                };
                self.release_stream();
                self.capture = Some(LivenessCapture {
                    blue_tint,
                    green_tint,
                });
                self.state = LivenessState::Captured;
                self.status = Some("Liveness captured successfully.".to_string());
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// User-initiated recapture: clear capture state and return to `Idle`.
    /// The camera must be re-requested via [`start`](Self::start).
    pub fn recapture(&mut self, scheduler: &mut dyn FlashScheduler) {
        self.supersede(scheduler);
        self.state = LivenessState::Idle;
        self.status = None;
    }

    /// Externally triggered abandonment (e.g. navigating away mid-stream).
    /// Releases the camera and drops any in-flight attempt.
    pub fn abandon(&mut self, scheduler: &mut dyn FlashScheduler) {
        self.supersede(scheduler);
        self.state = LivenessState::Idle;
        self.status = None;
    }

    /// Invalidate the current attempt: cancel its timers, release the
    /// stream, and clear partial capture state.
    fn supersede(&mut self, scheduler: &mut dyn FlashScheduler) {
        scheduler.cancel(self.attempt);
        self.attempt += 1;
        self.release_stream();
        self.pending_blue = None;
        self.capture = None;
    }

    fn grab_frame(
        &mut self,
        label: FrameLabel,
        now: DateTime<Utc>,
    ) -> Result<CaptureFrame, SignalError> {
        let Some(guard) = self.stream.as_mut() else {
            return Err(self.fail(SignalError::CaptureFailed(
                "no active camera stream".to_string(),
            )));
        };
        match guard.capture_frame(label) {
            Ok(image) => Ok(CaptureFrame {
                label,
                image,
                captured_at: now,
            }),
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Move to `Error`, releasing the stream so the capture indicator is
    /// never left on after a failure.
    fn fail(&mut self, error: SignalError) -> SignalError {
        self.release_stream();
        self.pending_blue = None;
        self.state = LivenessState::Error;
        self.status = Some(format!("Capture failed: {}", error));
        error
    }

    fn release_stream(&mut self) {
        if let Some(mut guard) = self.stream.take() {
            guard.release();
        }
    }
}
