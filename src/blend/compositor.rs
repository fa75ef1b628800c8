//! Blend transfer from one color layer into another.

use log::{debug, warn};

use super::BlendMode;
use crate::color::{Channel, ChannelSet, Rgba, clamp01, rgb};
use crate::error::{PaintError, Result};
use crate::isolation::{self, Isolation};
use crate::layer::ColorLayers;

// ============================================================================
// BlendTransfer
// ============================================================================

/// Describes one blend transfer.
///
/// The destination's isolated channels (decoded from its name) decide which
/// channels are written. `source_channels` chooses which source channels are
/// read; an empty set means RGB.
#[derive(Debug, Clone, PartialEq)]
pub struct BlendTransfer {
    /// Layer the colors are read from.
    pub source: String,
    /// Layer the result is written to.
    pub destination: String,
    pub mode: BlendMode,
    pub source_channels: ChannelSet,
    /// Layer whose channels scale the factor per loop.
    pub factor_layer: Option<String>,
    /// Overall strength in `[0, 1]`.
    pub factor: f32,
}

impl BlendTransfer {
    /// Full-strength transfer of the source RGB.
    pub fn new(source: impl Into<String>, destination: impl Into<String>, mode: BlendMode) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            mode,
            source_channels: ChannelSet::EMPTY,
            factor_layer: None,
            factor: 1.0,
        }
    }

    /// Reads only `channels` from the source. Empty means RGB.
    pub fn with_source_channels(mut self, channels: ChannelSet) -> Self {
        self.source_channels = channels;
        self
    }

    /// Scales the factor per loop and channel by `layer`'s colors.
    pub fn with_factor_layer(mut self, layer: impl Into<String>) -> Self {
        self.factor_layer = Some(layer.into());
        self
    }

    /// Sets the factor, clamped to `[0, 1]`.
    pub fn with_factor(mut self, factor: f32) -> Self {
        self.factor = clamp01(factor);
        self
    }
}

// ============================================================================
// Channel routing
// ============================================================================

/// Which source channels feed which destination channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Routing {
    /// Every target channel reads the mean of the source channels.
    Average,
    /// Each target channel reads the same source channel.
    Direct,
}

fn routing(source: ChannelSet, targets: ChannelSet, alpha_mode: bool) -> Result<Routing> {
    if source.len() == 1 || targets.len() == 1 || alpha_mode {
        Ok(Routing::Average)
    } else if source == targets {
        Ok(Routing::Direct)
    } else {
        Err(PaintError::UnsupportedTransfer {
            source_channels: source,
            isolated_channels: targets,
        })
    }
}

// ============================================================================
// Transfer
// ============================================================================

/// Blends `op.source` into `op.destination` and makes the destination active.
///
/// Returns the destination channels that were written. On error nothing is
/// modified.
pub fn transfer(layers: &mut ColorLayers, op: &BlendTransfer) -> Result<ChannelSet> {
    let isolated = isolation::channels_of(&op.destination)?;
    let alpha_mode = isolated.has_alpha();
    let mut targets = Isolation::paint_channels(isolated);
    let mut source = op.source_channels;

    if op.mode == BlendMode::AlphaOver {
        targets.remove(Channel::Alpha);
        source.remove(Channel::Alpha);
    }
    if source.is_empty() {
        source = ChannelSet::RGB;
    }

    let routing = routing(source, targets, alpha_mode).inspect_err(|e| warn!("{e}"))?;

    // Working copy of the source, so source and destination may be the same layer.
    let mut blended: Vec<Rgba> = layers.require(&op.source)?.colors().to_vec();
    let factors: Option<Vec<Rgba>> = match &op.factor_layer {
        Some(name) => Some(layers.require(name)?.colors().to_vec()),
        None => None,
    };
    let dst = layers.require_mut(&op.destination)?;

    if routing == Routing::Average {
        let n = source.len() as f32;
        for color in &mut blended {
            let mean = source.indices().map(|c| color[c]).sum::<f32>() / n;
            for c in targets.indices() {
                color[c] = mean;
            }
        }
    }

    let factor = clamp01(op.factor);
    for (i, (out, d)) in blended.iter_mut().zip(dst.colors_mut()).enumerate() {
        apply_mode(op.mode, out, d, targets);

        for c in targets.indices() {
            let f = match &factors {
                Some(layer) => layer[i][c] * factor,
                None => factor,
            };
            d[c] = out[c] * f + d[c] * (1.0 - f);
        }
    }

    layers.set_active(&op.destination);
    debug!(
        "{} {:?} -> {:?} ({} into {}, factor {})",
        op.mode.name(),
        op.source,
        op.destination,
        source,
        targets,
        factor
    );
    Ok(targets)
}

/// Blends one loop in place: `out` holds the routed source color on entry and
/// the blend result on exit.
fn apply_mode(mode: BlendMode, out: &mut Rgba, d: &Rgba, targets: ChannelSet) {
    match mode {
        BlendMode::Mix => {}
        BlendMode::AlphaOver => {
            let a = out[3];
            for c in targets.indices() {
                out[c] = BlendMode::alpha_over(out[c], d[c], a);
            }
        }
        m if m.is_joint() => {
            let [r, g, b] = m.blend_rgb(rgb(*out), rgb(*d));
            out[0] = r;
            out[1] = g;
            out[2] = b;
        }
        m => {
            for c in targets.indices() {
                out[c] = m.blend_channel(out[c], d[c]);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
