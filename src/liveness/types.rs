//! Liveness capture types

use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a capture attempt. Bumped on every start/recapture so that
/// callbacks from a superseded attempt can be recognized and dropped.
pub type AttemptId = u64;

/// Which flash a frame was captured under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameLabel {
    BlueTint,
    GreenTint,
}

impl FrameLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameLabel::BlueTint => "blue_tint",
            FrameLabel::GreenTint => "green_tint",
        }
    }
}

/// An encoded still image, carried as a `data:` URL string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedImage(String);

impl EncodedImage {
    /// Wrap an already-encoded data URL
    pub fn from_data_url(data_url: impl Into<String>) -> Self {
        Self(data_url.into())
    }

    /// Encode raw image bytes as a data URL
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        Self(format!("data:{};base64,{}", mime, encoded))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One captured frame with its flash label and capture time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureFrame {
    pub label: FrameLabel,
    pub image: EncodedImage,
    pub captured_at: DateTime<Utc>,
}

/// A completed liveness capture: both frames present, blue before green.
///
/// There is no partial form of this type; an attempt that does not reach
/// both frames produces no `LivenessCapture` at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessCapture {
    pub blue_tint: CaptureFrame,
    pub green_tint: CaptureFrame,
}

/// Scheduler phases of the flash sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapturePhase {
    /// Countdown after the stream goes live, before the blue overlay
    Countdown,
    /// Blue overlay hold, ending in the blue frame capture
    HoldBlue,
    /// Green overlay hold, ending in the green frame capture
    HoldGreen,
}

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LivenessState {
    Idle,
    Streaming,
    FlashBlue,
    FlashGreen,
    Captured,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_label_names() {
        assert_eq!(FrameLabel::BlueTint.as_str(), "blue_tint");
        assert_eq!(FrameLabel::GreenTint.as_str(), "green_tint");
    }

    #[test]
    fn test_encoded_image_from_bytes() {
        let image = EncodedImage::from_bytes("image/jpeg", b"abc");
        assert_eq!(image.as_str(), "data:image/jpeg;base64,YWJj");
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&LivenessState::FlashBlue).unwrap();
        assert_eq!(json, "\"flash_blue\"");
    }
}
