//! Behavioral data types
//!
//! This module defines the events dispatched into the field metrics tracker
//! and the per-field / aggregate metric structures it produces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Classification of a keystroke as seen by the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyInput {
    /// A printable character key
    Character,
    /// Backspace key
    Backspace,
    /// Delete key
    Delete,
    /// Arrow keys, tab, modifiers and anything else non-printing
    Navigation,
}

impl KeyInput {
    /// Whether this key counts as a correction (deletion)
    pub fn is_deletion(&self) -> bool {
        matches!(self, KeyInput::Backspace | KeyInput::Delete)
    }
}

/// Kind of a field event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldEventKind {
    /// Field gained focus
    Focus,
    /// A key was pressed while the field had focus
    Keystroke { key: KeyInput },
    /// Field lost focus
    Blur,
}

/// A single timestamped event on a tracked field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldEvent {
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// What happened
    #[serde(flatten)]
    pub kind: FieldEventKind,
}

impl FieldEvent {
    pub fn focus(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            kind: FieldEventKind::Focus,
        }
    }

    pub fn keystroke(timestamp: DateTime<Utc>, key: KeyInput) -> Self {
        Self {
            timestamp,
            kind: FieldEventKind::Keystroke { key },
        }
    }

    pub fn blur(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            kind: FieldEventKind::Blur,
        }
    }
}

/// Per-field interaction phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldPhase {
    /// No focus, or focus lost
    Idle,
    /// Focused but nothing typed yet this cycle
    Focused,
    /// Focused with at least one keystroke recorded
    Typing,
}

/// Timing and count metrics for a single tracked field
///
/// Invariants: `correction_count <= keypress_count`; `hesitation_ms` is set
/// at most once per field unless the field is reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMetricRecord {
    /// Time from first focus to first keystroke (ms); unset until the first
    /// keystroke lands
    pub hesitation_ms: Option<f64>,
    /// Time from first keystroke to the most recent blur (ms); unset until
    /// the field has been blurred after typing
    pub duration_ms: Option<f64>,
    /// Total keydown events observed on the field
    pub keypress_count: u32,
    /// Keypresses that were deletions (subset of `keypress_count`)
    pub correction_count: u32,
    /// Timestamp of the first focus; write-once
    pub start_time: Option<DateTime<Utc>>,
    /// Timestamp of the first keystroke; write-once
    pub first_key_time: Option<DateTime<Utc>>,
    /// Current interaction phase
    pub phase: FieldPhase,
}

impl Default for FieldMetricRecord {
    fn default() -> Self {
        Self {
            hesitation_ms: None,
            duration_ms: None,
            keypress_count: 0,
            correction_count: 0,
            start_time: None,
            first_key_time: None,
            phase: FieldPhase::Idle,
        }
    }
}

/// Current character counts per tracked field, captured at aggregation time
///
/// The average-WPM numerator uses the characters still present in each field
/// when the accessor is called, not a running count of inserted characters. A
/// tracked field absent from the snapshot is silently skipped for the
/// character count while its timings and counts still contribute.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldValueSnapshot {
    values: HashMap<String, usize>,
}

impl FieldValueSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from (field name, current value) pairs
    pub fn from_values<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Self {
            values: values
                .into_iter()
                .map(|(field, value)| (field.to_string(), value.chars().count()))
                .collect(),
        }
    }

    /// Record the current character count for a field
    pub fn set_char_count(&mut self, field: &str, count: usize) {
        self.values.insert(field.to_string(), count);
    }

    /// Character count for a field, if it was present at snapshot time
    pub fn char_count(&self, field: &str) -> Option<usize> {
        self.values.get(field).copied()
    }
}

/// Aggregate behavioral metrics over all tracked fields
///
/// Derived and recomputed on demand; never stored by the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateBehavioralMetrics {
    /// Sum of per-field typing durations (ms)
    pub total_typing_duration_ms: f64,
    /// Sum of per-field keypress counts
    pub total_key_presses: u32,
    /// Sum of per-field correction counts
    pub total_corrections: u32,
    /// Mean of recorded hesitation times over fields that have one; fields
    /// never typed into are excluded, not treated as zero
    pub average_hesitation_ms: Option<f64>,
    /// Words per minute, with a word standardized to 5 characters; 0 when
    /// there is no typing duration or no characters remain in any field
    pub average_wpm: f64,
}
