//! Serializable paint settings profile.
//!
//! A [`PaintProfile`] captures every user-facing setting of a
//! [`PaintSession`](crate::PaintSession) in a JSON-friendly format, so a host
//! can persist it with the document or hand it across a process boundary.
//!
//! # Example
//!
//! ```
//! use alpha_paint::{BlendMode, IsolationMode, PaintProfile, TransferSettings};
//!
//! let profile = PaintProfile::new()
//!     .with_isolation_mode(IsolationMode::Multi)
//!     .with_transfer(TransferSettings {
//!         blend_mode: BlendMode::Multiply,
//!         factor: 0.5,
//!         ..TransferSettings::default()
//!     });
//!
//! let json = profile.to_json().unwrap();
//! let restored = PaintProfile::from_json(&json).unwrap();
//! assert_eq!(restored.transfer.blend_mode, BlendMode::Multiply);
//! ```

use serde::{Deserialize, Serialize};

use crate::blend::BlendMode;
use crate::color::ChannelSet;
use crate::isolation::IsolationMode;
use crate::tools::GradientShape;

// ============================================================================
// Section settings
// ============================================================================

/// Defaults for the blend transfer panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct TransferSettings {
    pub blend_mode: BlendMode,

    /// Layer to read from. `None` until the user picks one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_layer: Option<String>,

    /// Source channel toggles in RGBA order. All off means RGB.
    pub source_channels: [bool; 4],

    /// Layer scaling the factor per loop.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factor_layer: Option<String>,

    /// Blend strength (0.0-1.0).
    pub factor: f32,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            blend_mode: BlendMode::Mix,
            source_layer: None,
            source_channels: [false; 4],
            factor_layer: None,
            factor: 1.0,
        }
    }
}

impl TransferSettings {
    pub fn source_channel_set(&self) -> ChannelSet {
        ChannelSet::from_flags(self.source_channels)
    }
}

/// Where color selection takes its reference colors from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub enum SelectMode {
    /// The brush primary color.
    #[default]
    Brush,
    /// Every color of the active palette.
    Palette,
}

/// Settings for select-by-color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct SelectionSettings {
    pub mode: SelectMode,

    /// Per-channel tolerance when comparing colors.
    pub error_margin: f32,

    /// Deselect vertices that have any non-matching loop.
    pub restrict_loops: bool,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            mode: SelectMode::Brush,
            error_margin: 0.001,
            restrict_loops: false,
        }
    }
}

/// Settings for the gradient tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct GradientSettings {
    pub shape: GradientShape,

    /// Blend through the hue circle instead of straight RGB.
    pub hue_blend: bool,
}

fn default_true() -> bool {
    true
}

// ============================================================================
// PaintProfile
// ============================================================================

/// A serializable profile containing all paint settings.
///
/// Missing fields take their defaults, so `{}` is a valid profile.
///
/// # JSON Format
///
/// ```json
/// {
///   "isolationMode": "mono",
///   "allowFillAll": true,
///   "transfer": {
///     "blendMode": "multiply",
///     "sourceChannels": [true, false, false, false],
///     "factor": 0.5
///   },
///   "selection": { "mode": "brush", "errorMargin": 0.001, "restrictLoops": false },
///   "gradient": { "shape": "radial", "hueBlend": false }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct PaintProfile {
    #[serde(default)]
    pub isolation_mode: IsolationMode,

    /// Let fill and sample act on every vertex when nothing is selected.
    #[serde(default = "default_true")]
    pub allow_fill_all: bool,

    #[serde(default)]
    pub transfer: TransferSettings,

    #[serde(default)]
    pub selection: SelectionSettings,

    #[serde(default)]
    pub gradient: GradientSettings,
}

impl Default for PaintProfile {
    fn default() -> Self {
        Self {
            isolation_mode: IsolationMode::default(),
            allow_fill_all: true,
            transfer: TransferSettings::default(),
            selection: SelectionSettings::default(),
            gradient: GradientSettings::default(),
        }
    }
}

impl PaintProfile {
    /// Creates a profile with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_isolation_mode(mut self, mode: IsolationMode) -> Self {
        self.isolation_mode = mode;
        self
    }

    pub fn with_allow_fill_all(mut self, allow: bool) -> Self {
        self.allow_fill_all = allow;
        self
    }

    pub fn with_transfer(mut self, settings: TransferSettings) -> Self {
        self.transfer = settings;
        self
    }

    pub fn with_selection(mut self, settings: SelectionSettings) -> Self {
        self.selection = settings;
        self
    }

    pub fn with_gradient(mut self, settings: GradientSettings) -> Self {
        self.gradient = settings;
        self
    }

    /// Serializes the profile to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the profile to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes a profile from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_serialization_roundtrip() {
        let profile = PaintProfile::new()
            .with_isolation_mode(IsolationMode::Multi)
            .with_allow_fill_all(false)
            .with_transfer(TransferSettings {
                blend_mode: BlendMode::SoftLight,
                source_layer: Some("AO".into()),
                source_channels: [true, false, true, false],
                factor_layer: None,
                factor: 0.25,
            })
            .with_gradient(GradientSettings {
                shape: GradientShape::Radial,
                hue_blend: true,
            });

        let json = profile.to_json().unwrap();
        let restored = PaintProfile::from_json(&json).unwrap();

        assert_eq!(restored, profile);
        assert_eq!(
            restored.transfer.source_channel_set().to_suffix(),
            "02"
        );
    }

    #[test]
    fn profile_json_format() {
        let json = PaintProfile::new().to_json_pretty().unwrap();

        // Verify camelCase serialization
        assert!(json.contains("\"isolationMode\""));
        assert!(json.contains("\"allowFillAll\""));
        assert!(json.contains("\"errorMargin\""));
        assert!(json.contains("\"hueBlend\""));
        assert!(!json.contains("\"sourceLayer\""));
    }

    #[test]
    fn enum_values_serialize_as_names() {
        let profile = PaintProfile::new().with_transfer(TransferSettings {
            blend_mode: BlendMode::LinearBurn,
            ..TransferSettings::default()
        });
        let json = profile.to_json().unwrap();
        assert!(json.contains("\"linear-burn\""));
        assert!(json.contains("\"mono\""));
        assert!(json.contains("\"brush\""));
    }

    #[test]
    fn empty_profile_deserializes() {
        let profile = PaintProfile::from_json("{}").unwrap();
        assert_eq!(profile, PaintProfile::default());
        assert!(profile.allow_fill_all);
        assert_eq!(profile.transfer.factor, 1.0);
        assert_eq!(profile.selection.error_margin, 0.001);
    }

    #[test]
    fn partial_sections_fill_in_defaults() {
        let profile =
            PaintProfile::from_json(r#"{ "selection": { "restrictLoops": true } }"#).unwrap();
        assert!(profile.selection.restrict_loops);
        assert_eq!(profile.selection.mode, SelectMode::Brush);
        assert_eq!(profile.selection.error_margin, 0.001);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(PaintProfile::from_json(r#"{ "isolationMode": "triple" }"#).is_err());
    }
}
