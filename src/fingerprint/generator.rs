//! Device fingerprint generator
//!
//! Serializes the sampled environment attributes into one canonical structure
//! and hashes it with SHA-256, rendered as lowercase hex. Same environment
//! inputs produce an identical output; the consuming fraud model relies on
//! that for cross-session matching.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::fingerprint::environment::{EnvironmentAttributes, EnvironmentProbe};

/// Length of a rendered fingerprint (SHA-256, hex)
pub const FINGERPRINT_HEX_LEN: usize = 64;

/// A device fingerprint, or the explicit "unavailable" sentinel.
///
/// `Unavailable` is a value, not an error: downstream submission must not be
/// blocked by its absence alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeviceFingerprint {
    /// 64 lowercase hex characters
    Available(String),
    /// The overall computation could not complete
    Unavailable,
}

impl DeviceFingerprint {
    pub fn is_available(&self) -> bool {
        matches!(self, DeviceFingerprint::Available(_))
    }

    /// The hex digest, if one was produced
    pub fn as_hex(&self) -> Option<&str> {
        match self {
            DeviceFingerprint::Available(hex) => Some(hex),
            DeviceFingerprint::Unavailable => None,
        }
    }
}

/// Canonical hash material. Field declaration order fixes the serialized
/// layout, which fixes the digest.
#[derive(Serialize)]
struct FingerprintMaterial<'a> {
    user_agent: Option<&'a str>,
    screen_resolution: Option<String>,
    timezone: Option<&'a str>,
    language: Option<&'a str>,
    canvas_hash: Option<&'a str>,
}

/// Stateless generator reducing environment attributes to a fingerprint
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceFingerprintGenerator;

impl DeviceFingerprintGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Sample a probe and generate in one step
    pub fn generate_from_probe(&self, probe: &dyn EnvironmentProbe) -> DeviceFingerprint {
        self.generate(&crate::fingerprint::environment::gather(probe))
    }

    /// Reduce attributes to a fingerprint.
    ///
    /// Missing attributes degrade the hash material rather than aborting:
    /// a hash is produced from whatever attributes exist. Only when every
    /// attribute is missing, or the material cannot be serialized, does this
    /// return [`DeviceFingerprint::Unavailable`].
    pub fn generate(&self, attrs: &EnvironmentAttributes) -> DeviceFingerprint {
        if attrs.is_empty() {
            return DeviceFingerprint::Unavailable;
        }

        let material = FingerprintMaterial {
            user_agent: attrs.user_agent.as_deref(),
            screen_resolution: attrs.screen.map(|s| s.canonical()),
            timezone: attrs.timezone.as_deref(),
            language: attrs.language.as_deref(),
            canvas_hash: attrs.canvas_data_url.as_deref(),
        };

        let Ok(serialized) = serde_json::to_vec(&material) else {
            return DeviceFingerprint::Unavailable;
        };

        let digest = Sha256::digest(&serialized);
        let hex = digest.iter().map(|b| format!("{:02x}", b)).collect();
        DeviceFingerprint::Available(hex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::environment::{ScreenResolution, CANVAS_UNAVAILABLE};
    use pretty_assertions::assert_eq;

    fn full_attrs() -> EnvironmentAttributes {
        EnvironmentAttributes {
            user_agent: Some("Mozilla/5.0 (X11; Linux x86_64)".to_string()),
            screen: Some(ScreenResolution {
                width: 1920,
                height: 1080,
                color_depth: 24,
            }),
            timezone: Some("Asia/Kolkata".to_string()),
            language: Some("en-IN".to_string()),
            canvas_data_url: Some("data:image/png;base64,AAAA".to_string()),
        }
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let generator = DeviceFingerprintGenerator::new();
        let first = generator.generate(&full_attrs());
        let second = generator.generate(&full_attrs());
        assert_eq!(first, second);
        assert!(first.is_available());
    }

    #[test]
    fn test_fingerprint_shape() {
        let fp = DeviceFingerprintGenerator::new().generate(&full_attrs());
        let hex = fp.as_hex().unwrap();
        assert_eq!(hex.len(), FINGERPRINT_HEX_LEN);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_different_attributes_different_hash() {
        let generator = DeviceFingerprintGenerator::new();
        let base = generator.generate(&full_attrs());

        let mut changed = full_attrs();
        changed.language = Some("hi-IN".to_string());
        assert_ne!(base, generator.generate(&changed));
    }

    #[test]
    fn test_degraded_canvas_still_hashes() {
        // Canvas rendering failed; the remaining four attributes still
        // produce a fingerprint.
        let mut attrs = full_attrs();
        attrs.canvas_data_url = Some(CANVAS_UNAVAILABLE.to_string());

        let fp = DeviceFingerprintGenerator::new().generate(&attrs);
        assert!(fp.is_available());
        assert_ne!(fp, DeviceFingerprintGenerator::new().generate(&full_attrs()));
    }

    #[test]
    fn test_partial_attributes_still_hash() {
        let attrs = EnvironmentAttributes {
            user_agent: Some("Mozilla/5.0".to_string()),
            ..Default::default()
        };
        assert!(DeviceFingerprintGenerator::new().generate(&attrs).is_available());
    }

    #[test]
    fn test_empty_attributes_unavailable() {
        let fp = DeviceFingerprintGenerator::new().generate(&EnvironmentAttributes::default());
        assert_eq!(fp, DeviceFingerprint::Unavailable);
        assert!(fp.as_hex().is_none());
    }

    #[test]
    fn test_unavailable_serializes_as_null() {
        let json = serde_json::to_string(&DeviceFingerprint::Unavailable).unwrap();
        assert_eq!(json, "null");
    }
}
