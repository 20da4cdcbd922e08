//! Environment attribute collection
//!
//! Five attributes feed the fingerprint: user agent, screen resolution,
//! timezone, language, and a canvas render. Each is sampled through the
//! [`EnvironmentProbe`] seam so the generator stays host-agnostic and every
//! sub-step can fail independently without sinking the whole computation.

use serde::{Deserialize, Serialize};

use crate::error::SignalError;

/// Component recorded in place of the canvas render when the host cannot
/// produce one. A fixed sentinel keeps the overall hash deterministic across
/// retries on the same degraded device.
pub const CANVAS_UNAVAILABLE: &str = "canvas-unavailable";

/// Fixed text drawn by the canvas probe
const CANVAS_PROBE_TEXT: &str = "formshield-probe-v1";

/// Screen geometry triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenResolution {
    pub width: u32,
    pub height: u32,
    pub color_depth: u32,
}

impl ScreenResolution {
    /// Canonical "WxHxD" form used in the fingerprint material
    pub fn canonical(&self) -> String {
        format!("{}x{}x{}", self.width, self.height, self.color_depth)
    }
}

/// A single fixed drawing operation of the canvas probe scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CanvasOp {
    SetFont { font: String },
    FillRect { color: String, x: i32, y: i32, width: i32, height: i32 },
    FillText { color: String, text: String, x: i32, y: i32 },
}

/// The fixed scene a host renderer draws before serializing the canvas.
///
/// Identical declared fonts still render differently across GPU, driver, and
/// font-substitution stacks, which is what makes the serialized canvas a
/// useful rendering fingerprint component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasScene {
    pub ops: Vec<CanvasOp>,
}

impl CanvasScene {
    /// The standard probe scene: fixed font, fill colors, and pixel offsets
    pub fn standard() -> Self {
        Self {
            ops: vec![
                CanvasOp::SetFont {
                    font: "14px 'Arial'".to_string(),
                },
                CanvasOp::FillRect {
                    color: "#f60".to_string(),
                    x: 125,
                    y: 1,
                    width: 62,
                    height: 20,
                },
                CanvasOp::FillText {
                    color: "#069".to_string(),
                    text: CANVAS_PROBE_TEXT.to_string(),
                    x: 2,
                    y: 15,
                },
                CanvasOp::FillText {
                    color: "rgba(102, 204, 0, 0.7)".to_string(),
                    text: CANVAS_PROBE_TEXT.to_string(),
                    x: 4,
                    y: 17,
                },
            ],
        }
    }
}

/// Host seam for sampling environment attributes.
///
/// Every accessor is fallible; a failing accessor degrades the fingerprint
/// instead of aborting it.
pub trait EnvironmentProbe {
    fn user_agent(&self) -> Result<String, SignalError>;
    fn screen_resolution(&self) -> Result<ScreenResolution, SignalError>;
    fn timezone(&self) -> Result<String, SignalError>;
    fn language(&self) -> Result<String, SignalError>;
    /// Render the given scene offscreen and serialize the canvas to an
    /// encoded image string (data URL). Callers pass
    /// [`CanvasScene::standard`]; the host draws exactly the ops it is
    /// handed.
    fn canvas_data_url(&self, scene: &CanvasScene) -> Result<String, SignalError>;
}

/// Environment attributes at the time of capture.
///
/// `None` marks an attribute the host could not provide. The canvas slot is
/// special-cased: a failed render is recorded as [`CANVAS_UNAVAILABLE`]
/// rather than dropped, so retries on the same device hash identically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentAttributes {
    pub user_agent: Option<String>,
    pub screen: Option<ScreenResolution>,
    pub timezone: Option<String>,
    pub language: Option<String>,
    pub canvas_data_url: Option<String>,
}

impl EnvironmentAttributes {
    /// Whether every attribute is missing
    pub fn is_empty(&self) -> bool {
        self.user_agent.is_none()
            && self.screen.is_none()
            && self.timezone.is_none()
            && self.language.is_none()
            && self.canvas_data_url.is_none()
    }
}

/// Sample all five attributes from a probe, best-effort.
pub fn gather(probe: &dyn EnvironmentProbe) -> EnvironmentAttributes {
    let mut attrs = EnvironmentAttributes {
        user_agent: probe.user_agent().ok(),
        screen: probe.screen_resolution().ok(),
        timezone: probe.timezone().ok(),
        language: probe.language().ok(),
        canvas_data_url: None,
    };
    match probe.canvas_data_url(&CanvasScene::standard()) {
        Ok(data_url) => attrs.canvas_data_url = Some(data_url),
        Err(_) => {
            // A failed render on an otherwise readable environment becomes
            // the fixed sentinel; with nothing else readable there is
            // nothing left to fingerprint and the attributes stay empty.
            if !attrs.is_empty() {
                attrs.canvas_data_url = Some(CANVAS_UNAVAILABLE.to_string());
            }
        }
    }
    attrs
}
