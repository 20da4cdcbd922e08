//! Behavioral biometrics module
//!
//! Turns raw focus/keystroke/blur events on a configured set of form fields
//! into per-field timing records and an aggregate behavioral summary.

pub mod tracker;
pub mod types;

pub use tracker::FieldMetricsTracker;
pub use types::{
    AggregateBehavioralMetrics, FieldEvent, FieldEventKind, FieldMetricRecord, FieldPhase,
    FieldValueSnapshot, KeyInput,
};
