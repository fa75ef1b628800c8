//! Blend modes and the layer-to-layer blend compositor.
//!
//! [`BlendMode`] is a closed set of pure functions over a source value `S`
//! and a destination value `D`. Most modes work channel by channel; PaintMix
//! and the HSV component modes need the whole RGB triple.
//!
//! The compositor ([`transfer`]) applies a mode from one color layer onto
//! another, restricted to the destination's isolated channels, and gates the
//! result with a factor mask.

pub mod compositor;

pub use compositor::{BlendTransfer, transfer};

use serde::{Deserialize, Serialize};

use crate::color::{self, Rgb, clamp01};

// ============================================================================
// BlendMode
// ============================================================================

/// How a source color is combined with a destination color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    // ── Normal ──────────────────────────────────
    #[default]
    Mix,
    PaintMix,
    AlphaOver,

    // ── Light ───────────────────────────────────
    Add,
    Lighten,
    ColorDodge,
    Screen,

    // ── Dark ────────────────────────────────────
    Darken,
    Multiply,
    LinearBurn,
    ColorBurn,

    // ── Cancel ──────────────────────────────────
    Subtract,
    Divide,

    // ── Contrast ────────────────────────────────
    Overlay,
    HardLight,
    SoftLight,

    // ── Component ───────────────────────────────
    Hue,
    Saturation,
    Color,
    Value,
}

impl BlendMode {
    /// All blend modes in display order.
    pub const ALL: [BlendMode; 20] = [
        Self::Mix,
        Self::PaintMix,
        Self::AlphaOver,
        Self::Add,
        Self::Lighten,
        Self::ColorDodge,
        Self::Screen,
        Self::Darken,
        Self::Multiply,
        Self::LinearBurn,
        Self::ColorBurn,
        Self::Subtract,
        Self::Divide,
        Self::Overlay,
        Self::HardLight,
        Self::SoftLight,
        Self::Hue,
        Self::Saturation,
        Self::Color,
        Self::Value,
    ];

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Mix => "Mix",
            Self::PaintMix => "Paint Mix",
            Self::AlphaOver => "Alpha Over",
            Self::Add => "Add",
            Self::Lighten => "Lighten",
            Self::ColorDodge => "Color Dodge",
            Self::Screen => "Screen",
            Self::Darken => "Darken",
            Self::Multiply => "Multiply",
            Self::LinearBurn => "Linear Burn",
            Self::ColorBurn => "Color Burn",
            Self::Subtract => "Subtract",
            Self::Divide => "Divide",
            Self::Overlay => "Overlay",
            Self::HardLight => "Hard Light",
            Self::SoftLight => "Soft Light",
            Self::Hue => "Hue",
            Self::Saturation => "Saturation",
            Self::Color => "Color",
            Self::Value => "Value",
        }
    }

    /// Category for UI grouping.
    pub fn category(self) -> &'static str {
        match self {
            Self::Mix | Self::PaintMix | Self::AlphaOver => "Normal",
            Self::Add | Self::Lighten | Self::ColorDodge | Self::Screen => "Light",
            Self::Darken | Self::Multiply | Self::LinearBurn | Self::ColorBurn => "Dark",
            Self::Subtract | Self::Divide => "Cancel",
            Self::Overlay | Self::HardLight | Self::SoftLight => "Contrast",
            Self::Hue | Self::Saturation | Self::Color | Self::Value => "Component",
        }
    }

    /// Short formula shown as a tooltip.
    pub fn formula(self) -> &'static str {
        match self {
            Self::Mix => "S",
            Self::PaintMix => "pigment-like mix of S and D",
            Self::AlphaOver => "S*sA + D*(1-sA)",
            Self::Add => "S+D",
            Self::Lighten => "max(S,D)",
            Self::ColorDodge => "D/(1-S)",
            Self::Screen => "1-(1-S)*(1-D)",
            Self::Darken => "min(S,D)",
            Self::Multiply => "S*D",
            Self::LinearBurn => "S+D-1",
            Self::ColorBurn => "1-(1-D)/S",
            Self::Subtract => "D-S",
            Self::Divide => "D/S",
            Self::Overlay => "multiply or screen, by source value",
            Self::HardLight => "multiply or screen, by destination value",
            Self::SoftLight => "(1-2D)*S^2 + 2D*S",
            Self::Hue => "S.h",
            Self::Saturation => "S.s",
            Self::Color => "S.h, S.s",
            Self::Value => "S.v",
        }
    }

    /// True for modes that combine the RGB triple jointly rather than
    /// channel by channel.
    pub fn is_joint(self) -> bool {
        matches!(
            self,
            Self::PaintMix | Self::Hue | Self::Saturation | Self::Color | Self::Value
        )
    }

    /// Blends one channel.
    ///
    /// Joint modes return `s` unchanged here; use [`blend_rgb`](Self::blend_rgb)
    /// for them. AlphaOver needs the source alpha, see
    /// [`alpha_over`](Self::alpha_over).
    pub fn blend_channel(self, s: f32, d: f32) -> f32 {
        match self {
            Self::Mix => s,
            Self::AlphaOver => s,
            Self::Add => clamp01(d + s),
            Self::Lighten => s.max(d),
            Self::ColorDodge => {
                if s == 1.0 {
                    1.0
                } else {
                    clamp01(d / (1.0 - s))
                }
            }
            Self::Screen => clamp01(1.0 - (1.0 - s) * (1.0 - d)),
            Self::Darken => s.min(d),
            Self::Multiply => s * d,
            Self::LinearBurn => clamp01(s + d - 1.0),
            Self::ColorBurn => {
                if s == 0.0 {
                    0.0
                } else {
                    clamp01(1.0 - (1.0 - d) / s)
                }
            }
            Self::Subtract => clamp01(d - s),
            Self::Divide => {
                if s == 0.0 {
                    1.0
                } else {
                    clamp01(d / s)
                }
            }
            Self::Overlay => contrast(s < 0.5, s, d),
            Self::HardLight => contrast(d < 0.5, s, d),
            Self::SoftLight => clamp01((1.0 - 2.0 * d) * s * s + 2.0 * d * s),
            Self::PaintMix | Self::Hue | Self::Saturation | Self::Color | Self::Value => s,
        }
    }

    /// Source over destination, weighted by the source alpha `a`.
    pub fn alpha_over(s: f32, d: f32, a: f32) -> f32 {
        s * a + d * (1.0 - a)
    }

    /// Blends an RGB triple.
    ///
    /// Per-channel modes are applied to each component; joint modes mix
    /// across components.
    pub fn blend_rgb(self, s: Rgb, d: Rgb) -> Rgb {
        match self {
            Self::PaintMix => paint_mix(s, d),
            Self::Hue | Self::Saturation | Self::Color | Self::Value => {
                let src = color::to_hsv(s);
                let mut dst = color::to_hsv(d);
                if matches!(self, Self::Hue | Self::Color) {
                    dst.hue = src.hue;
                }
                if matches!(self, Self::Saturation | Self::Color) {
                    dst.saturation = src.saturation;
                }
                if self == Self::Value {
                    dst.value = src.value;
                }
                color::from_hsv(dst)
            }
            _ => [0usize, 1, 2].map(|c| self.blend_channel(s[c], d[c])),
        }
    }
}

/// Multiply for dark, screen for light; `dark` picks the branch.
fn contrast(dark: bool, s: f32, d: f32) -> f32 {
    if dark {
        clamp01(d * 2.0 * s)
    } else {
        clamp01(1.0 - 2.0 * (1.0 - s) * (1.0 - d))
    }
}

/// Pigment-style mix: each side darkens the other's complementary channels
/// before the two are added.
fn paint_mix(s: Rgb, d: Rgb) -> Rgb {
    let [sr, sg, sb] = s;
    let [dr, dg, db] = d;
    [
        clamp01(
            clamp01(dr * (1.0 - 0.25 * sb) * (1.0 - 0.25 * sg))
                + clamp01(sr * (1.0 - 0.25 * db) * (1.0 - 0.25 * dg)),
        ),
        clamp01(clamp01(dg * (1.0 - 0.7 * sr)) + clamp01(sg * (1.0 - 0.3 * dr))),
        clamp01(clamp01(db * (1.0 - 0.3 * sg)) + clamp01(sb * (1.0 - 0.7 * dg))),
    ]
}

// ============================================================================
// Tests
// ============================================================================
