//! Form session ownership and trace replay
//!
//! A [`FormSession`] is the explicit owner of the collectors for one form
//! lifetime: created on form mount, discarded on submit or navigation away.
//! Nothing here is process-wide; a page reload starts from scratch.
//!
//! [`SessionTrace`] is the offline counterpart of the live page wiring: a
//! recorded client session as one JSON document, replayable into a session
//! for analysis and for the CLI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::behavior::{FieldEvent, FieldMetricsTracker, FieldValueSnapshot};
use crate::config::TrackerConfig;
use crate::error::SignalError;
use crate::fingerprint::{DeviceFingerprint, DeviceFingerprintGenerator, EnvironmentAttributes};
use crate::liveness::LivenessCapture;
use crate::payload::{self, SubmissionSignals};

/// Owns the per-form collector state for one submission attempt.
pub struct FormSession {
    /// Unique session instance identifier
    pub session_id: Uuid,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    tracker: FieldMetricsTracker,
    fingerprint: DeviceFingerprint,
    capture: Option<LivenessCapture>,
}

impl FormSession {
    /// Create a session for the configured field set. The fingerprint starts
    /// unavailable and the capture absent until recorded.
    pub fn new(config: &TrackerConfig, created_at: DateTime<Utc>) -> Result<Self, SignalError> {
        Ok(Self {
            session_id: Uuid::new_v4(),
            created_at,
            tracker: FieldMetricsTracker::new(config)?,
            fingerprint: DeviceFingerprint::Unavailable,
            capture: None,
        })
    }

    /// Dispatch a field event into the behavioral tracker
    pub fn handle_field_event(&mut self, field: &str, event: &FieldEvent) {
        self.tracker.handle_event(field, event);
    }

    /// Record the generated device fingerprint
    pub fn record_fingerprint(&mut self, fingerprint: DeviceFingerprint) {
        self.fingerprint = fingerprint;
    }

    /// Attach a completed liveness capture
    pub fn attach_capture(&mut self, capture: LivenessCapture) {
        self.capture = Some(capture);
    }

    pub fn tracker(&self) -> &FieldMetricsTracker {
        &self.tracker
    }

    /// Assemble the submission payload, reading each collector once, and
    /// enforce the submission contract. Consumes the session: collector
    /// state does not outlive the submission attempt.
    pub fn finalize(self, snapshot: &FieldValueSnapshot) -> Result<SubmissionSignals, SignalError> {
        let metrics = self.tracker.aggregate_metrics(snapshot);
        let signals = payload::assemble(&metrics, &self.fingerprint, self.capture.as_ref());
        payload::validate_for_submission(&signals)?;
        Ok(signals)
    }

    /// Assemble without enforcing the liveness requirement, for inspection
    /// of incomplete sessions.
    pub fn finalize_unchecked(self, snapshot: &FieldValueSnapshot) -> SubmissionSignals {
        let metrics = self.tracker.aggregate_metrics(snapshot);
        payload::assemble(&metrics, &self.fingerprint, self.capture.as_ref())
    }
}

/// One field event in a recorded trace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Logical field name the event targets
    pub field: String,
    #[serde(flatten)]
    pub event: FieldEvent,
}

/// A recorded client session: tracked-field config, the event stream, the
/// final field values, any environment attributes that were sampled, and the
/// liveness capture if one completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTrace {
    /// Logical names of the tracked fields
    pub tracked_fields: Vec<String>,
    /// Timestamped field events in recorded order
    pub events: Vec<TraceEvent>,
    /// Final field values at submission time
    #[serde(default)]
    pub field_values: HashMap<String, String>,
    /// Environment attributes sampled for fingerprinting, if any
    #[serde(default)]
    pub environment: Option<EnvironmentAttributes>,
    /// Completed liveness capture recorded for the session, if any
    #[serde(default)]
    pub face_capture: Option<LivenessCapture>,
}

impl SessionTrace {
    /// Parse a trace from JSON
    pub fn from_json(json: &str) -> Result<Self, SignalError> {
        serde_json::from_str(json)
            .map_err(|e| SignalError::ParseError(format!("invalid session trace: {}", e)))
    }

    /// Validate the trace against its own field list
    pub fn validate(&self) -> Result<(), SignalError> {
        let config = TrackerConfig::new(self.tracked_fields.iter().cloned());
        config.validate()?;
        for traced in &self.events {
            if !self.tracked_fields.contains(&traced.field) {
                return Err(SignalError::ParseError(format!(
                    "event targets untracked field: {}",
                    traced.field
                )));
            }
        }
        Ok(())
    }

    /// Replay the trace into a fresh session, generating a fingerprint from
    /// the recorded environment and attaching the recorded liveness capture
    /// when present.
    pub fn replay(&self, now: DateTime<Utc>) -> Result<FormSession, SignalError> {
        let config = TrackerConfig::new(self.tracked_fields.iter().cloned());
        let mut session = FormSession::new(&config, now)?;

        for traced in &self.events {
            session.handle_field_event(&traced.field, &traced.event);
        }
        if let Some(environment) = &self.environment {
            session.record_fingerprint(DeviceFingerprintGenerator::new().generate(environment));
        }
        if let Some(capture) = &self.face_capture {
            session.attach_capture(capture.clone());
        }
        Ok(session)
    }

    /// Snapshot of the recorded final field values
    pub fn value_snapshot(&self) -> FieldValueSnapshot {
        FieldValueSnapshot::from_values(
            self.field_values
                .iter()
                .map(|(field, value)| (field.as_str(), value.as_str())),
        )
    }
}
