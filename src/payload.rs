//! Submission payload assembly
//!
//! The collectors' only boundary: the flat field mapping contributed to the
//! submission payload an external coordinator posts to the scoring endpoint.

use serde::{Deserialize, Serialize};

use crate::behavior::AggregateBehavioralMetrics;
use crate::error::SignalError;
use crate::fingerprint::DeviceFingerprint;
use crate::liveness::LivenessCapture;

/// The two liveness frames as they travel in the payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceCaptureData {
    pub blue_tint: String,
    pub green_tint: String,
}

impl From<&LivenessCapture> for FaceCaptureData {
    fn from(capture: &LivenessCapture) -> Self {
        Self {
            blue_tint: capture.blue_tint.image.as_str().to_string(),
            green_tint: capture.green_tint.image.as_str().to_string(),
        }
    }
}

/// Fields contributed to the submission payload.
///
/// Behavioral fields are null when no keystroke was ever recorded: with zero
/// keypresses there is no behavioral signal to report, only noise.
/// `face_capture_data` is omitted entirely when absent; the submission
/// coordinator must reject payloads without it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionSignals {
    /// 64-char hex fingerprint, or null when unavailable
    pub device_fingerprint: Option<String>,
    /// Average words per minute, or null
    pub behavioral_wpm: Option<f64>,
    /// Corrections over keypresses, in [0, 1], or null
    pub behavioral_error_rate: Option<f64>,
    /// Mean hesitation time in milliseconds, or null
    pub behavioral_hesitation_ms: Option<f64>,
    /// Ordered pair of tinted frames; absent when the liveness sequence did
    /// not complete
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face_capture_data: Option<FaceCaptureData>,
}

/// Assemble the payload, reading each collector output once.
pub fn assemble(
    metrics: &AggregateBehavioralMetrics,
    fingerprint: &DeviceFingerprint,
    capture: Option<&LivenessCapture>,
) -> SubmissionSignals {
    let (behavioral_wpm, behavioral_error_rate, behavioral_hesitation_ms) =
        if metrics.total_key_presses > 0 {
            (
                Some(metrics.average_wpm),
                Some(f64::from(metrics.total_corrections) / f64::from(metrics.total_key_presses)),
                metrics.average_hesitation_ms,
            )
        } else {
            (None, None, None)
        };

    SubmissionSignals {
        device_fingerprint: fingerprint.as_hex().map(str::to_string),
        behavioral_wpm,
        behavioral_error_rate,
        behavioral_hesitation_ms,
        face_capture_data: capture.map(FaceCaptureData::from),
    }
}

/// Enforce the submission contract: liveness data must be present.
///
/// A missing fingerprint or missing behavioral metrics degrade the payload
/// and are accepted; a missing capture blocks submission.
pub fn validate_for_submission(signals: &SubmissionSignals) -> Result<(), SignalError> {
    if signals.face_capture_data.is_none() {
        return Err(SignalError::IncompleteCapture(
            "face capture is required before submission".to_string(),
        ));
    }
    Ok(())
}
