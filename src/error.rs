//! Error types for FormShield

use thiserror::Error;

/// Errors that can occur during signal collection
///
/// None of these are retried by the core and none is process-fatal; every
/// failure is scoped to a single submission attempt. Callers decide whether a
/// failure blocks submission (required for an incomplete liveness capture) or
/// degrades the payload (acceptable for a missing fingerprint).
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("Camera permission denied: {0}")]
    PermissionDenied(String),

    #[error("Unsupported capability: {0}")]
    UnsupportedCapability(String),

    #[error("Incomplete liveness capture: {0}")]
    IncompleteCapture(String),

    #[error("Invalid collector configuration: {0}")]
    InvalidConfig(String),

    #[error("Frame capture failed: {0}")]
    CaptureFailed(String),

    #[error("Failed to parse session trace: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}
