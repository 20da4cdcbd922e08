//! Field metrics tracker
//!
//! Explicit state machine over focus/keystroke/blur events for a configured
//! set of form fields. Raw DOM callbacks become message dispatch into
//! [`FieldMetricsTracker::handle_event`], which makes the per-field
//! transitions directly testable without a DOM.

use std::collections::HashMap;

use crate::behavior::types::{
    AggregateBehavioralMetrics, FieldEvent, FieldEventKind, FieldMetricRecord, FieldPhase,
    FieldValueSnapshot,
};
use crate::config::TrackerConfig;
use crate::error::SignalError;

/// Characters per standardized "word" for WPM
const CHARS_PER_WORD: f64 = 5.0;

/// Milliseconds per minute
const MS_PER_MINUTE: f64 = 60_000.0;

/// Tracks typing behavior across a fixed, named set of input fields.
///
/// One instance is owned by a form session: created on form mount, discarded
/// on submit or navigation away. There is no process-wide shared state.
#[derive(Debug, Clone)]
pub struct FieldMetricsTracker {
    fields: HashMap<String, FieldMetricRecord>,
}

impl FieldMetricsTracker {
    /// Create a tracker for the configured field set.
    ///
    /// The config is validated here; an empty, blank, or duplicated field
    /// list is rejected up front rather than surfacing per event.
    pub fn new(config: &TrackerConfig) -> Result<Self, SignalError> {
        config.validate()?;
        let fields = config
            .fields
            .iter()
            .map(|name| (name.clone(), FieldMetricRecord::default()))
            .collect();
        Ok(Self { fields })
    }

    /// Dispatch a field event into the state machine.
    ///
    /// Events for fields outside the configured set are silently ignored, as
    /// are events that do not match the field's current phase (a keystroke
    /// with no prior focus, a blur while idle).
    pub fn handle_event(&mut self, field: &str, event: &FieldEvent) {
        let Some(record) = self.fields.get_mut(field) else {
            return;
        };

        match event.kind {
            FieldEventKind::Focus => {
                // start_time is write-once across focus cycles
                if record.start_time.is_none() {
                    record.start_time = Some(event.timestamp);
                }
                if record.phase == FieldPhase::Idle {
                    record.phase = FieldPhase::Focused;
                }
            }
            FieldEventKind::Keystroke { key } => {
                if record.phase == FieldPhase::Idle {
                    return;
                }
                if record.first_key_time.is_none() {
                    record.first_key_time = Some(event.timestamp);
                    if let Some(start) = record.start_time {
                        record.hesitation_ms =
                            Some((event.timestamp - start).num_milliseconds() as f64);
                    }
                }
                record.keypress_count += 1;
                if key.is_deletion() {
                    record.correction_count += 1;
                }
                record.phase = FieldPhase::Typing;
            }
            FieldEventKind::Blur => {
                if record.phase == FieldPhase::Idle {
                    return;
                }
                if record.start_time.is_some() {
                    if let Some(first_key) = record.first_key_time {
                        record.duration_ms =
                            Some((event.timestamp - first_key).num_milliseconds() as f64);
                    }
                }
                record.phase = FieldPhase::Idle;
            }
        }
    }

    /// Restore a field to its initial record, clearing recorded hesitation
    pub fn reset_field(&mut self, field: &str) {
        if let Some(record) = self.fields.get_mut(field) {
            *record = FieldMetricRecord::default();
        }
    }

    /// The metric record for a tracked field
    pub fn record(&self, field: &str) -> Option<&FieldMetricRecord> {
        self.fields.get(field)
    }

    /// Names of the tracked fields (arbitrary order)
    pub fn tracked_fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Compute aggregate behavioral metrics over all tracked fields.
    ///
    /// The WPM numerator uses the characters present in each field at call
    /// time: a field where 50 characters were typed and 45 deleted reports
    /// only 5, while the deletions still inflated `total_key_presses` and
    /// `total_corrections`. Pure and idempotent for a given snapshot.
    pub fn aggregate_metrics(&self, snapshot: &FieldValueSnapshot) -> AggregateBehavioralMetrics {
        let mut total_typing_duration_ms = 0.0;
        let mut total_key_presses = 0u32;
        let mut total_corrections = 0u32;
        let mut total_hesitation_ms = 0.0;
        let mut fields_with_hesitation = 0u32;
        let mut total_characters = 0usize;

        for (name, record) in &self.fields {
            total_typing_duration_ms += record.duration_ms.unwrap_or(0.0);
            total_key_presses += record.keypress_count;
            total_corrections += record.correction_count;

            if let Some(hesitation) = record.hesitation_ms {
                total_hesitation_ms += hesitation;
                fields_with_hesitation += 1;
            }
            if let Some(count) = snapshot.char_count(name) {
                total_characters += count;
            }
        }

        let average_hesitation_ms = if fields_with_hesitation > 0 {
            Some(total_hesitation_ms / f64::from(fields_with_hesitation))
        } else {
            None
        };

        let average_wpm = if total_typing_duration_ms > 0.0 && total_characters > 0 {
            let words = total_characters as f64 / CHARS_PER_WORD;
            let minutes = total_typing_duration_ms / MS_PER_MINUTE;
            words / minutes
        } else {
            0.0
        };

        AggregateBehavioralMetrics {
            total_typing_duration_ms,
            total_key_presses,
            total_corrections,
            average_hesitation_ms,
            average_wpm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::types::KeyInput;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn at(ms: i64) -> DateTime<Utc> {
        t0() + Duration::milliseconds(ms)
    }

    fn tracker(fields: &[&str]) -> FieldMetricsTracker {
        FieldMetricsTracker::new(&TrackerConfig::new(fields.iter().copied())).unwrap()
    }

    fn type_chars(tracker: &mut FieldMetricsTracker, field: &str, start_ms: i64, count: usize) {
        for i in 0..count {
            tracker.handle_event(
                field,
                &FieldEvent::keystroke(at(start_ms + i as i64 * 100), KeyInput::Character),
            );
        }
    }

    #[test]
    fn test_reference_scenario() {
        // Focus at t=0, first keystroke at t=500, blur at t=2000,
        // final field value 10 characters.
        let mut tracker = tracker(&["email"]);
        tracker.handle_event("email", &FieldEvent::focus(at(0)));
        tracker.handle_event("email", &FieldEvent::keystroke(at(500), KeyInput::Character));
        tracker.handle_event("email", &FieldEvent::blur(at(2000)));

        let record = tracker.record("email").unwrap();
        assert_eq!(record.hesitation_ms, Some(500.0));
        assert_eq!(record.duration_ms, Some(1500.0));

        let mut snapshot = FieldValueSnapshot::new();
        snapshot.set_char_count("email", 10);
        let metrics = tracker.aggregate_metrics(&snapshot);

        // (10 / 5) / (1500 / 60000) = 80 WPM
        assert_eq!(metrics.average_wpm, 80.0);
        assert_eq!(metrics.average_hesitation_ms, Some(500.0));
        assert_eq!(metrics.total_typing_duration_ms, 1500.0);
    }

    #[test]
    fn test_keypress_and_correction_counts() {
        let mut tracker = tracker(&["pan-number"]);
        tracker.handle_event("pan-number", &FieldEvent::focus(at(0)));
        type_chars(&mut tracker, "pan-number", 100, 4);
        tracker.handle_event(
            "pan-number",
            &FieldEvent::keystroke(at(600), KeyInput::Backspace),
        );
        tracker.handle_event(
            "pan-number",
            &FieldEvent::keystroke(at(700), KeyInput::Delete),
        );

        let record = tracker.record("pan-number").unwrap();
        assert_eq!(record.keypress_count, 6);
        assert_eq!(record.correction_count, 2);
        assert!(record.correction_count <= record.keypress_count);
    }

    #[test]
    fn test_total_keypresses_sum_over_fields() {
        let mut tracker = tracker(&["a", "b"]);
        tracker.handle_event("a", &FieldEvent::focus(at(0)));
        type_chars(&mut tracker, "a", 100, 3);
        tracker.handle_event("b", &FieldEvent::focus(at(1000)));
        type_chars(&mut tracker, "b", 1100, 5);

        let metrics = tracker.aggregate_metrics(&FieldValueSnapshot::new());
        assert_eq!(metrics.total_key_presses, 8);
        assert!(metrics.total_corrections <= metrics.total_key_presses);
    }

    #[test]
    fn test_untracked_field_silently_ignored() {
        let mut tracker = tracker(&["email"]);
        tracker.handle_event("unknown", &FieldEvent::focus(at(0)));
        tracker.handle_event("unknown", &FieldEvent::keystroke(at(100), KeyInput::Character));

        let metrics = tracker.aggregate_metrics(&FieldValueSnapshot::new());
        assert_eq!(metrics.total_key_presses, 0);
    }

    #[test]
    fn test_keystroke_without_focus_ignored() {
        let mut tracker = tracker(&["email"]);
        tracker.handle_event("email", &FieldEvent::keystroke(at(0), KeyInput::Character));

        let record = tracker.record("email").unwrap();
        assert_eq!(record.keypress_count, 0);
        assert!(record.hesitation_ms.is_none());
        assert_eq!(record.phase, FieldPhase::Idle);
    }

    #[test]
    fn test_blur_without_typing_leaves_duration_unset() {
        let mut tracker = tracker(&["email"]);
        tracker.handle_event("email", &FieldEvent::focus(at(0)));
        tracker.handle_event("email", &FieldEvent::blur(at(900)));

        let record = tracker.record("email").unwrap();
        assert!(record.duration_ms.is_none());
        assert_eq!(record.phase, FieldPhase::Idle);
    }

    #[test]
    fn test_refocus_does_not_reset_hesitation() {
        let mut tracker = tracker(&["email"]);
        tracker.handle_event("email", &FieldEvent::focus(at(0)));
        tracker.handle_event("email", &FieldEvent::keystroke(at(300), KeyInput::Character));
        tracker.handle_event("email", &FieldEvent::blur(at(1000)));

        // Second focus cycle much later; hesitation stays at 300ms and the
        // duration keeps running from the original first keystroke.
        tracker.handle_event("email", &FieldEvent::focus(at(10_000)));
        tracker.handle_event(
            "email",
            &FieldEvent::keystroke(at(10_100), KeyInput::Character),
        );
        tracker.handle_event("email", &FieldEvent::blur(at(10_500)));

        let record = tracker.record("email").unwrap();
        assert_eq!(record.hesitation_ms, Some(300.0));
        assert_eq!(record.start_time, Some(at(0)));
        assert_eq!(record.first_key_time, Some(at(300)));
        assert_eq!(record.duration_ms, Some(10_200.0));
        assert_eq!(record.keypress_count, 2);
    }

    #[test]
    fn test_reset_field_clears_hesitation() {
        let mut tracker = tracker(&["email"]);
        tracker.handle_event("email", &FieldEvent::focus(at(0)));
        tracker.handle_event("email", &FieldEvent::keystroke(at(250), KeyInput::Character));
        tracker.reset_field("email");

        let record = tracker.record("email").unwrap();
        assert!(record.hesitation_ms.is_none());
        assert!(record.start_time.is_none());

        // A fresh focus cycle records a new hesitation
        tracker.handle_event("email", &FieldEvent::focus(at(5000)));
        tracker.handle_event("email", &FieldEvent::keystroke(at(5400), KeyInput::Character));
        assert_eq!(
            tracker.record("email").unwrap().hesitation_ms,
            Some(400.0)
        );
    }

    #[test]
    fn test_hesitation_average_excludes_untyped_fields() {
        let mut tracker = tracker(&["a", "b", "c"]);
        tracker.handle_event("a", &FieldEvent::focus(at(0)));
        tracker.handle_event("a", &FieldEvent::keystroke(at(200), KeyInput::Character));
        tracker.handle_event("b", &FieldEvent::focus(at(1000)));
        tracker.handle_event("b", &FieldEvent::keystroke(at(1600), KeyInput::Character));
        // Field "c" is focused but never typed into
        tracker.handle_event("c", &FieldEvent::focus(at(2000)));

        let metrics = tracker.aggregate_metrics(&FieldValueSnapshot::new());
        assert_eq!(metrics.average_hesitation_ms, Some(400.0));
    }

    #[test]
    fn test_zero_hesitation_counts_toward_average() {
        // A keystroke in the same millisecond as focus is a real hesitation
        // of zero, not a missing value.
        let mut tracker = tracker(&["a"]);
        tracker.handle_event("a", &FieldEvent::focus(at(0)));
        tracker.handle_event("a", &FieldEvent::keystroke(at(0), KeyInput::Character));

        let metrics = tracker.aggregate_metrics(&FieldValueSnapshot::new());
        assert_eq!(metrics.average_hesitation_ms, Some(0.0));
    }

    #[test]
    fn test_wpm_zero_without_duration_or_characters() {
        let mut tracker = tracker(&["a"]);
        tracker.handle_event("a", &FieldEvent::focus(at(0)));
        tracker.handle_event("a", &FieldEvent::keystroke(at(100), KeyInput::Character));

        // No blur yet: duration unset, WPM must be 0
        let mut snapshot = FieldValueSnapshot::new();
        snapshot.set_char_count("a", 1);
        assert_eq!(tracker.aggregate_metrics(&snapshot).average_wpm, 0.0);

        // Blur recorded but every character deleted: WPM still 0
        tracker.handle_event("a", &FieldEvent::blur(at(1000)));
        let mut empty = FieldValueSnapshot::new();
        empty.set_char_count("a", 0);
        let metrics = tracker.aggregate_metrics(&empty);
        assert_eq!(metrics.average_wpm, 0.0);
        assert!(metrics.average_wpm >= 0.0);
    }

    #[test]
    fn test_deletions_inflate_counts_but_not_wpm_numerator() {
        let mut tracker = tracker(&["notes"]);
        tracker.handle_event("notes", &FieldEvent::focus(at(0)));
        type_chars(&mut tracker, "notes", 100, 10);
        for i in 0..5 {
            tracker.handle_event(
                "notes",
                &FieldEvent::keystroke(at(1200 + i * 100), KeyInput::Backspace),
            );
        }
        tracker.handle_event("notes", &FieldEvent::blur(at(3100)));

        // 5 characters remain of the 10 typed
        let mut snapshot = FieldValueSnapshot::new();
        snapshot.set_char_count("notes", 5);
        let metrics = tracker.aggregate_metrics(&snapshot);

        assert_eq!(metrics.total_key_presses, 15);
        assert_eq!(metrics.total_corrections, 5);
        // (5/5) / (3000/60000) = 20 WPM
        assert_eq!(metrics.average_wpm, 20.0);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let mut tracker = tracker(&["a"]);
        tracker.handle_event("a", &FieldEvent::focus(at(0)));
        type_chars(&mut tracker, "a", 100, 6);
        tracker.handle_event("a", &FieldEvent::blur(at(2000)));

        let mut snapshot = FieldValueSnapshot::new();
        snapshot.set_char_count("a", 6);
        let first = tracker.aggregate_metrics(&snapshot);
        let second = tracker.aggregate_metrics(&snapshot);
        assert_eq!(first, second);
    }

    #[test]
    fn test_field_missing_from_snapshot_skipped() {
        let mut tracker = tracker(&["a", "b"]);
        tracker.handle_event("a", &FieldEvent::focus(at(0)));
        type_chars(&mut tracker, "a", 100, 4);
        tracker.handle_event("a", &FieldEvent::blur(at(1000)));

        // Snapshot only covers "b"; "a" contributes timings but no chars
        let mut snapshot = FieldValueSnapshot::new();
        snapshot.set_char_count("b", 0);
        let metrics = tracker.aggregate_metrics(&snapshot);
        assert_eq!(metrics.total_key_presses, 4);
        assert_eq!(metrics.average_wpm, 0.0);
    }
}
