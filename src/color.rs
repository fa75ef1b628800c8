//! Color primitives: channels, channel sets and HSV helpers.
//!
//! Colors are stored per loop as plain `[f32; 4]` arrays so that a channel
//! index can address them directly. HSV conversions go through `palette`,
//! operating on the stored (non-linearized) values.

use std::fmt;

use palette::{Hsv, IntoColor, Srgb};
use serde::{Deserialize, Serialize};

use crate::error::{PaintError, Result};

/// Per-loop RGBA color, each component in `[0, 1]`.
pub type Rgba = [f32; 4];

/// RGB triple, each component in `[0, 1]`.
pub type Rgb = [f32; 3];

/// Opaque white, the fill value of freshly created layers.
pub const WHITE: Rgba = [1.0, 1.0, 1.0, 1.0];

/// 128/255, the neutral value used by the shading pipeline.
pub const NEUTRAL: f32 = 128.0 / 255.0;

/// Standard shading color: no occlusion, neutral smoothing, depth and width.
pub const STANDARD_SHADING: Rgba = [1.0, 0.502, 0.502, 0.502];

/// Clamps a value into `[0, 1]`.
pub fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

/// Drops the alpha component.
pub fn rgb(color: Rgba) -> Rgb {
    [color[0], color[1], color[2]]
}

// ============================================================================
// Channel
// ============================================================================

/// One RGBA channel, together with what it encodes for the shading pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub enum Channel {
    /// Ambient occlusion (higher = no occlusion).
    Red = 0,
    /// Shadow smoothing (higher = sharper).
    Green = 1,
    /// Outline depth index (higher = behind).
    Blue = 2,
    /// Outline thickness (higher = thicker).
    Alpha = 3,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Self::Red, Self::Green, Self::Blue, Self::Alpha];

    /// Index into an [`Rgba`] array.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Parses the digit used in isolation layer suffixes (`'0'..='3'`).
    pub fn from_digit(digit: char) -> Option<Self> {
        digit
            .to_digit(10)
            .and_then(|d| Self::from_index(d as usize))
    }

    pub fn digit(self) -> char {
        char::from(b'0' + self as u8)
    }

    /// Single-letter label (`R`, `G`, `B`, `A`).
    pub fn label(self) -> char {
        match self {
            Self::Red => 'R',
            Self::Green => 'G',
            Self::Blue => 'B',
            Self::Alpha => 'A',
        }
    }
}

// ============================================================================
// ChannelSet
// ============================================================================

/// A small set of channels stored as four flag bits.
///
/// Iteration always yields channels in ascending index order, which is also
/// the order of the digits written by [`ChannelSet::to_suffix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChannelSet(u8);

impl ChannelSet {
    pub const EMPTY: Self = Self(0);
    pub const RGB: Self = Self(0b0111);
    pub const ALL: Self = Self(0b1111);

    pub fn single(channel: Channel) -> Self {
        Self(1 << channel.index())
    }

    pub fn contains(self, channel: Channel) -> bool {
        self.0 & (1 << channel.index()) != 0
    }

    /// Adds a channel. Returns true if it was not already present.
    pub fn insert(&mut self, channel: Channel) -> bool {
        let added = !self.contains(channel);
        self.0 |= 1 << channel.index();
        added
    }

    /// Removes a channel. Returns true if it was present.
    pub fn remove(&mut self, channel: Channel) -> bool {
        let removed = self.contains(channel);
        self.0 &= !(1 << channel.index());
        removed
    }

    pub fn with(mut self, channel: Channel) -> Self {
        self.insert(channel);
        self
    }

    pub fn without(mut self, channel: Channel) -> Self {
        self.remove(channel);
        self
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn is_full(self) -> bool {
        self == Self::ALL
    }

    pub fn has_alpha(self) -> bool {
        self.contains(Channel::Alpha)
    }

    pub fn iter(self) -> impl Iterator<Item = Channel> {
        Channel::ALL.into_iter().filter(move |c| self.contains(*c))
    }

    /// Channel indices in ascending order.
    pub fn indices(self) -> impl Iterator<Item = usize> {
        self.iter().map(Channel::index)
    }

    /// Encodes the set as sorted channel digits, e.g. `{B, R}` → `"02"`.
    pub fn to_suffix(self) -> String {
        self.iter().map(Channel::digit).collect()
    }

    /// Decodes a digit string in any order; duplicates are ignored.
    ///
    /// Fails on any character other than `'0'..='3'`.
    pub fn from_suffix(suffix: &str) -> Result<Self> {
        suffix
            .chars()
            .map(|c| Channel::from_digit(c).ok_or_else(|| PaintError::MalformedIsolation(suffix.to_string())))
            .collect()
    }

    /// Builds a set from per-channel toggles in RGBA order.
    pub fn from_flags(flags: [bool; 4]) -> Self {
        Channel::ALL
            .into_iter()
            .zip(flags)
            .filter_map(|(c, on)| on.then_some(c))
            .collect()
    }

    pub fn to_flags(self) -> [bool; 4] {
        Channel::ALL.map(|c| self.contains(c))
    }
}

impl FromIterator<Channel> for ChannelSet {
    fn from_iter<I: IntoIterator<Item = Channel>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for channel in iter {
            set.insert(channel);
        }
        set
    }
}

impl fmt::Display for ChannelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        for channel in self.iter() {
            write!(f, "{}", channel.label())?;
        }
        Ok(())
    }
}

// ============================================================================
// HSV helpers
// ============================================================================

/// Converts an RGB triple to HSV.
pub fn to_hsv(color: Rgb) -> Hsv {
    Srgb::new(color[0], color[1], color[2]).into_color()
}

/// Converts HSV back to an RGB triple.
pub fn from_hsv(hsv: Hsv) -> Rgb {
    let rgb: Srgb = hsv.into_color();
    [rgb.red, rgb.green, rgb.blue]
}

/// Builds an RGB triple from hue as a fraction of a turn, saturation and value.
pub fn from_hsv_fractions(hue: f32, saturation: f32, value: f32) -> Rgb {
    from_hsv(Hsv::new(hue * 360.0, saturation, value))
}

/// Hue as a fraction of a full turn, in `[0, 1)`.
pub fn hue_fraction(hsv: &Hsv) -> f32 {
    hsv.hue.into_positive_degrees() / 360.0
}

/// HSV value (the brightest RGB component).
pub fn value(color: Rgb) -> f32 {
    to_hsv(color).value
}

// ============================================================================
// Tests
// ============================================================================
