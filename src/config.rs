//! Collector configuration
//!
//! Configuration is consumed, not produced, by the collectors: the mapping of
//! DOM elements to logical field names is an external wiring concern. Configs
//! are validated at construction time rather than resolved ad hoc per event.

use serde::{Deserialize, Serialize};

use crate::error::SignalError;

/// The set of logical field names a [`FieldMetricsTracker`] observes.
///
/// [`FieldMetricsTracker`]: crate::behavior::FieldMetricsTracker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Logical names of the tracked input fields
    pub fields: Vec<String>,
}

impl TrackerConfig {
    /// Build a config from an iterator of field names
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Validate the field list: non-empty, no blank names, no duplicates
    pub fn validate(&self) -> Result<(), SignalError> {
        if self.fields.is_empty() {
            return Err(SignalError::InvalidConfig(
                "tracker requires at least one field".to_string(),
            ));
        }
        for (i, field) in self.fields.iter().enumerate() {
            if field.trim().is_empty() {
                return Err(SignalError::InvalidConfig(format!(
                    "field name at index {} is blank",
                    i
                )));
            }
            if self.fields[..i].contains(field) {
                return Err(SignalError::InvalidConfig(format!(
                    "duplicate field name: {}",
                    field
                )));
            }
        }
        Ok(())
    }
}

/// Default countdown before the first flash (milliseconds)
pub const DEFAULT_COUNTDOWN_MS: u64 = 1500;

/// Default hold interval for each flash overlay (milliseconds)
pub const DEFAULT_FLASH_HOLD_MS: u64 = 300;

/// Timing parameters for the liveness flash sequence
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LivenessTiming {
    /// Delay between the stream going live and the first flash (ms)
    pub countdown_ms: u64,
    /// Hold interval for each tinted overlay before its frame is taken (ms)
    pub flash_hold_ms: u64,
}

impl Default for LivenessTiming {
    fn default() -> Self {
        Self {
            countdown_ms: DEFAULT_COUNTDOWN_MS,
            flash_hold_ms: DEFAULT_FLASH_HOLD_MS,
        }
    }
}
