//! FormShield - Deterministic anti-fraud signal collection engine
//!
//! FormShield gathers three independent signal families from an untrusted
//! client before a form submission, for a server-side risk model to weigh:
//!
//! - **Behavioral biometrics**: focus/keystroke/blur timing per form field
//! - **Device fingerprint**: a deterministic hash of environment and
//!   rendering attributes
//! - **Liveness capture**: a two-color flash sequence producing an ordered
//!   pair of tinted camera frames
//!
//! The collectors share no state and are independently testable; time,
//! camera access, and environment sampling come in through host seams, so
//! the engine itself is synchronous and deterministic. A [`FormSession`]
//! owns all three outputs for one submission attempt and assembles the
//! payload consumed by the external submission coordinator.

pub mod behavior;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod liveness;
pub mod payload;
pub mod session;

pub use behavior::{AggregateBehavioralMetrics, FieldEvent, FieldMetricsTracker, KeyInput};
pub use config::{LivenessTiming, TrackerConfig};
pub use error::SignalError;
pub use fingerprint::{DeviceFingerprint, DeviceFingerprintGenerator, EnvironmentProbe};
pub use liveness::{LivenessCapture, LivenessCaptureController};
pub use payload::{assemble, validate_for_submission, SubmissionSignals};
pub use session::{FormSession, SessionTrace};

/// Engine version embedded in diagnostics
pub const FORMSHIELD_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for diagnostics
pub const PRODUCER_NAME: &str = "formshield";
