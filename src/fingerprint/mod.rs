//! Device fingerprint module
//!
//! Samples environment and rendering attributes and reduces them to a single
//! deterministic hash used as a weak device-identity signal.

pub mod environment;
pub mod generator;

pub use environment::{
    gather, CanvasOp, CanvasScene, EnvironmentAttributes, EnvironmentProbe, ScreenResolution,
    CANVAS_UNAVAILABLE,
};
pub use generator::{DeviceFingerprint, DeviceFingerprintGenerator, FINGERPRINT_HEX_LEN};
