//! Liveness capture module
//!
//! Drives a camera-based capture state machine through a brief two-color
//! flash sequence, producing an ordered pair of tinted frames as a
//! lightweight defense against static-photo submissions.

pub mod controller;
pub mod types;

pub use controller::{Camera, CameraStream, FlashScheduler, LivenessCaptureController};
pub use types::{
    AttemptId, CaptureFrame, CapturePhase, EncodedImage, FrameLabel, LivenessCapture,
    LivenessState,
};
