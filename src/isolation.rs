//! Channel isolation: presenting a subset of RGBA channels as its own layer.
//!
//! Isolating a channel creates a *derived* layer next to the active *base*
//! layer. The derived layer shows the isolated channels so they can be painted
//! on their own, and is merged back into the base layer when the isolation
//! changes or ends.
//!
//! # Representation
//!
//! - Without alpha: each isolated channel keeps its position in the derived
//!   layer (`derived[c] = base[c]`), every other RGB position is 0.
//! - With alpha: the derived RGB is the base alpha as grayscale. RGB channels
//!   isolated alongside alpha are merged into the base when alpha joins, so a
//!   derived layer never mixes RGB data with alpha data.
//!
//! # Transitions
//!
//! Every call to [`isolate`] is one transition: the outgoing derived layer is
//! committed into the base and removed, then a derived layer for the new
//! channel set is built from the updated base. Committing reads alpha back as
//! the HSV value of the derived RGB and copies every other channel 1:1, so a
//! toggle-on followed by a toggle-off is lossless.
//!
//! # Persisted form
//!
//! The isolation is stored in the host only through the derived layer's name,
//! `base + SEPARATOR + digits` (for example `Col_viewLayer_generated_02`).
//! [`Isolation`] is the typed form; names are produced and parsed only here.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::color::{self, Channel, ChannelSet, Rgba};
use crate::error::{PaintError, Result};
use crate::layer::ColorLayers;

/// Token joining a base layer name and the isolated channel digits.
pub const SEPARATOR: &str = "_viewLayer_generated_";

/// How a newly isolated channel combines with the current isolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub enum IsolationMode {
    /// Only one channel is isolated at a time.
    #[default]
    Mono,
    /// Channels accumulate into the isolated set.
    Multi,
}

// ============================================================================
// Isolation
// ============================================================================

/// A derived layer's association with its base layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Isolation {
    /// Name of the base layer the channels belong to.
    pub base: String,
    /// Channels shown by the derived layer.
    pub channels: ChannelSet,
}

impl Isolation {
    /// Associates `channels` with the base layer `base`.
    pub fn new(base: impl Into<String>, channels: ChannelSet) -> Self {
        Self {
            base: base.into(),
            channels,
        }
    }

    /// Host-visible name of the derived layer.
    pub fn layer_name(&self) -> String {
        format!("{}{}{}", self.base, SEPARATOR, self.channels.to_suffix())
    }

    /// Decodes a derived layer name.
    ///
    /// Returns `Ok(None)` for names without the separator, and an error when
    /// the part after the first separator is not a channel digit string.
    pub fn parse(name: &str) -> Result<Option<Self>> {
        let Some((base, suffix)) = name.split_once(SEPARATOR) else {
            return Ok(None);
        };
        let channels = ChannelSet::from_suffix(suffix)
            .map_err(|_| PaintError::MalformedIsolation(name.to_string()))?;
        Ok(Some(Self::new(base, channels)))
    }

    /// Channels a paint or blend operation should write on this layer.
    ///
    /// Alpha isolation is painted through the grayscale RGB, so it maps to RGB
    /// like the non-isolated case.
    pub fn paint_channels(channels: ChannelSet) -> ChannelSet {
        if channels.is_empty() || channels.has_alpha() {
            ChannelSet::RGB
        } else {
            channels
        }
    }
}

/// Isolated channels encoded in a layer name; empty for base layers.
///
/// Fails with [`PaintError::MalformedIsolation`] like [`Isolation::parse`].
pub fn channels_of(layer_name: &str) -> Result<ChannelSet> {
    Ok(Isolation::parse(layer_name)?
        .map(|isolation| isolation.channels)
        .unwrap_or_default())
}

// ============================================================================
// Resolution
// ============================================================================

/// The base layer behind the active layer and its current isolation, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub base: String,
    /// Name and decoded form of the derived layer.
    pub derived: Option<(String, Isolation)>,
}

impl Resolved {
    /// Channels currently isolated; empty when the base itself is active.
    pub fn channels(&self) -> ChannelSet {
        self.derived
            .as_ref()
            .map(|(_, iso)| iso.channels)
            .unwrap_or_default()
    }
}

/// Works out which base and derived layer the active layer belongs to.
///
/// If the active layer is a derived layer whose base is missing, the base is
/// recreated as a copy of it. If the active layer is a base layer, any layer
/// named `base + SEPARATOR + …` is picked up as its derived layer.
pub fn resolve(layers: &mut ColorLayers) -> Result<Resolved> {
    let active = layers.active()?.name().to_string();

    if let Some(isolation) = Isolation::parse(&active)? {
        if !layers.contains(&isolation.base) {
            warn!("base layer {:?} missing, recreating from {:?}", isolation.base, active);
            layers.create_copy(isolation.base.clone(), &active)?;
        }
        return Ok(Resolved {
            base: isolation.base.clone(),
            derived: Some((active, isolation)),
        });
    }

    let prefix = format!("{active}{SEPARATOR}");
    let derived = match layers.find_prefixed(&prefix) {
        Some(layer) => {
            let name = layer.name().to_string();
            Isolation::parse(&name)?.map(|iso| (name, iso))
        }
        None => None,
    };
    Ok(Resolved {
        base: active,
        derived,
    })
}

// ============================================================================
// Transitions
// ============================================================================

/// Result of an isolation transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A derived layer for these channels is now active.
    Isolated(Isolation),
    /// Isolation ended; the base layer with this name is active.
    Merged(String),
}

impl Outcome {
    /// Name of the layer that is now active.
    pub fn active_layer(&self) -> String {
        match self {
            Self::Isolated(isolation) => isolation.layer_name(),
            Self::Merged(base) => base.clone(),
        }
    }

    /// The isolation now in effect, `None` after a merge.
    pub fn isolation(&self) -> Option<&Isolation> {
        match self {
            Self::Isolated(isolation) => Some(isolation),
            Self::Merged(_) => None,
        }
    }
}

/// Toggles `channel` in the active layer's isolation.
///
/// An isolated channel is toggled off; otherwise it is toggled on, replacing
/// the current set in [`IsolationMode::Mono`] and joining it in
/// [`IsolationMode::Multi`]. Isolating all four channels is the same as
/// isolating none, so that transition merges back into the base layer.
pub fn isolate(layers: &mut ColorLayers, mode: IsolationMode, channel: Channel) -> Result<Outcome> {
    let resolved = resolve(layers)?;
    let former = resolved.channels();

    let mut target = if former.contains(channel) {
        former.without(channel)
    } else {
        match mode {
            IsolationMode::Mono => ChannelSet::single(channel),
            IsolationMode::Multi => former.with(channel),
        }
    };
    if target.is_full() {
        target = ChannelSet::EMPTY;
    }

    debug!(
        "isolate {}: {} -> {} on {:?}",
        channel.label(),
        former,
        target,
        resolved.base
    );
    transition(layers, resolved, target)
}

/// Commits the current derived layer into its base and activates the base.
///
/// Returns the base name, or `None` if the active layer had no isolation.
pub fn reconcile(layers: &mut ColorLayers) -> Result<Option<String>> {
    let resolved = resolve(layers)?;
    if resolved.derived.is_none() {
        return Ok(None);
    }
    let base = resolved.base.clone();
    transition(layers, resolved, ChannelSet::EMPTY)?;
    Ok(Some(base))
}

/// Throws the derived layer away without committing it and activates the
/// base layer.
///
/// Returns the base name, or `None` if the active layer had no isolation.
pub fn discard(layers: &mut ColorLayers) -> Result<Option<String>> {
    let resolved = resolve(layers)?;
    let Some((derived, _)) = resolved.derived else {
        return Ok(None);
    };
    layers.remove(&derived);
    layers.set_active(&resolved.base);
    debug!("discarded {derived:?}");
    Ok(Some(resolved.base))
}

fn transition(layers: &mut ColorLayers, resolved: Resolved, target: ChannelSet) -> Result<Outcome> {
    let Resolved { base, derived } = resolved;

    // Refuse up front if the new derived name is held by a stray layer, so
    // a failed transition leaves the layers untouched.
    if !target.is_empty() {
        let next = Isolation::new(base.as_str(), target).layer_name();
        let outgoing = derived.as_ref().map(|(name, _)| name.as_str());
        if layers.contains(&next) && outgoing != Some(next.as_str()) {
            warn!("cannot isolate {target} on {base:?}: {next:?} already exists");
            return Err(PaintError::DuplicateLayer(next));
        }
    }

    if let Some((name, isolation)) = derived {
        commit(layers, &base, &name, isolation.channels)?;
        layers.remove(&name);
    }

    if target.is_empty() {
        layers.set_active(&base);
        return Ok(Outcome::Merged(base));
    }

    let isolation = Isolation::new(base, target);
    build(layers, &isolation)?;
    Ok(Outcome::Isolated(isolation))
}

/// Writes the channels shown by a derived layer back into its base.
fn commit(layers: &mut ColorLayers, base: &str, derived: &str, channels: ChannelSet) -> Result<()> {
    let shown: Vec<Rgba> = layers.require(derived)?.colors().to_vec();
    let base = layers.require_mut(base)?;

    for (dst, src) in base.colors_mut().iter_mut().zip(&shown) {
        if channels.has_alpha() {
            dst[3] = color::value(color::rgb(*src));
        } else {
            for c in channels.indices() {
                dst[c] = src[c];
            }
        }
    }
    Ok(())
}

/// Creates the derived layer for `isolation` from the current base data and
/// makes it active.
fn build(layers: &mut ColorLayers, isolation: &Isolation) -> Result<()> {
    let source: Vec<Rgba> = layers.require(&isolation.base)?.colors().to_vec();
    let name = isolation.layer_name();
    let channels = isolation.channels;

    let derived = layers.create(name.clone())?;
    for (dst, src) in derived.colors_mut().iter_mut().zip(&source) {
        *dst = if channels.has_alpha() {
            let a = src[3];
            [a, a, a, 1.0]
        } else {
            let mut shown = [0.0, 0.0, 0.0, 1.0];
            for c in channels.indices() {
                shown[c] = src[c];
            }
            shown
        };
    }
    layers.set_active(&name);
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: Rgba = [1.0, 0.5, 0.5, 0.5];

    fn layers_with(colors: &[Rgba]) -> ColorLayers {
        let mut layers = ColorLayers::new(colors.len());
        let base = layers.create("Col").unwrap();
        for (i, c) in colors.iter().enumerate() {
            base.set(i, *c);
        }
        layers
    }

    fn base(layers: &ColorLayers, i: usize) -> Rgba {
        layers.get("Col").unwrap().get(i)
    }

    fn active(layers: &ColorLayers, i: usize) -> Rgba {
        layers.active().unwrap().get(i)
    }

    fn derived_count(layers: &ColorLayers) -> usize {
        layers.names().filter(|n| n.contains(SEPARATOR)).count()
    }

    #[test]
    fn names_encode_base_and_sorted_digits() {
        let iso = Isolation::new("Col", ChannelSet::from_suffix("31").unwrap());
        assert_eq!(iso.layer_name(), "Col_viewLayer_generated_13");
        assert_eq!(Isolation::parse(&iso.layer_name()).unwrap(), Some(iso));
        assert_eq!(Isolation::parse("Col").unwrap(), None);
        assert!(Isolation::parse("Col_viewLayer_generated_x").is_err());
        assert_eq!(
            channels_of("Col_viewLayer_generated_2").unwrap(),
            ChannelSet::single(Channel::Blue)
        );
        assert_eq!(channels_of("Col").unwrap(), ChannelSet::EMPTY);
        assert!(matches!(
            channels_of("Col_viewLayer_generated_x"),
            Err(PaintError::MalformedIsolation(_))
        ));
    }

    #[test]
    fn toggle_on_then_off_restores_every_channel() {
        let colors = [BASE, [0.1, 0.2, 0.3, 0.4], [0.9, 0.0, 0.25, 1.0]];
        for channel in Channel::ALL {
            for mode in [IsolationMode::Mono, IsolationMode::Multi] {
                let mut layers = layers_with(&colors);
                isolate(&mut layers, mode, channel).unwrap();
                let out = isolate(&mut layers, mode, channel).unwrap();

                assert_eq!(out, Outcome::Merged("Col".into()));
                assert_eq!(layers.active().unwrap().name(), "Col");
                assert_eq!(derived_count(&layers), 0);
                for (i, c) in colors.iter().enumerate() {
                    assert_eq!(base(&layers, i), *c, "{channel:?} {mode:?} loop {i}");
                }
            }
        }
    }

    #[test]
    fn isolating_a_color_channel_keeps_its_position() {
        let mut layers = layers_with(&[BASE]);
        let out = isolate(&mut layers, IsolationMode::Mono, Channel::Red).unwrap();

        assert_eq!(out.active_layer(), "Col_viewLayer_generated_0");
        assert_eq!(active(&layers, 0), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(base(&layers, 0), BASE);
    }

    #[test]
    fn mono_replaces_the_isolated_channel() {
        let mut layers = layers_with(&[BASE]);
        isolate(&mut layers, IsolationMode::Mono, Channel::Red).unwrap();
        let out = isolate(&mut layers, IsolationMode::Mono, Channel::Green).unwrap();

        assert_eq!(out.isolation().unwrap().channels, ChannelSet::single(Channel::Green));
        assert_eq!(active(&layers, 0), [0.0, 0.5, 0.0, 1.0]);
        assert_eq!(base(&layers, 0)[0], 1.0);
        assert_eq!(derived_count(&layers), 1);
    }

    #[test]
    fn mono_switch_commits_edits_of_the_previous_channel() {
        let mut layers = layers_with(&[BASE]);
        isolate(&mut layers, IsolationMode::Mono, Channel::Red).unwrap();
        layers.active_mut().unwrap().set_channel(0, 0, 0.25);
        isolate(&mut layers, IsolationMode::Mono, Channel::Blue).unwrap();

        assert_eq!(base(&layers, 0), [0.25, 0.5, 0.5, 0.5]);
    }

    #[test]
    fn alpha_isolation_is_grayscale() {
        let colors = [BASE, [0.0, 0.0, 0.0, 0.8], [0.3, 0.6, 0.9, 0.0]];
        let mut layers = layers_with(&colors);
        isolate(&mut layers, IsolationMode::Mono, Channel::Alpha).unwrap();

        for (i, c) in colors.iter().enumerate() {
            let shown = active(&layers, i);
            assert_eq!(shown[0], c[3]);
            assert_eq!(shown[1], c[3]);
            assert_eq!(shown[2], c[3]);
        }
    }

    #[test]
    fn painted_alpha_is_read_back_as_value() {
        let mut layers = layers_with(&[BASE]);
        isolate(&mut layers, IsolationMode::Mono, Channel::Alpha).unwrap();
        layers.active_mut().unwrap().set(0, [0.2, 0.7, 0.1, 1.0]);
        isolate(&mut layers, IsolationMode::Mono, Channel::Alpha).unwrap();

        assert!((base(&layers, 0)[3] - 0.7).abs() < 1e-6);
        assert_eq!(color::rgb(base(&layers, 0)), [1.0, 0.5, 0.5]);
    }

    #[test]
    fn multi_accumulates_channels() {
        let mut layers = layers_with(&[[0.1, 0.2, 0.3, 0.4]]);
        isolate(&mut layers, IsolationMode::Multi, Channel::Red).unwrap();
        let out = isolate(&mut layers, IsolationMode::Multi, Channel::Blue).unwrap();

        assert_eq!(out.active_layer(), "Col_viewLayer_generated_02");
        assert_eq!(active(&layers, 0), [0.1, 0.0, 0.3, 1.0]);
        assert_eq!(derived_count(&layers), 1);
    }

    #[test]
    fn multi_keeps_edits_of_channels_still_isolated() {
        let mut layers = layers_with(&[[0.1, 0.2, 0.3, 0.4]]);
        isolate(&mut layers, IsolationMode::Multi, Channel::Red).unwrap();
        layers.active_mut().unwrap().set_channel(0, 0, 0.9);
        isolate(&mut layers, IsolationMode::Multi, Channel::Green).unwrap();

        assert_eq!(active(&layers, 0), [0.9, 0.2, 0.0, 1.0]);

        let out = isolate(&mut layers, IsolationMode::Multi, Channel::Red).unwrap();
        assert_eq!(out.isolation().unwrap().channels, ChannelSet::single(Channel::Green));
        assert_eq!(active(&layers, 0), [0.0, 0.2, 0.0, 1.0]);
        assert_eq!(base(&layers, 0), [0.9, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn adding_alpha_commits_color_channels_first() {
        let mut layers = layers_with(&[[0.1, 0.2, 0.3, 0.4]]);
        isolate(&mut layers, IsolationMode::Multi, Channel::Green).unwrap();
        layers.active_mut().unwrap().set_channel(0, 1, 0.75);
        isolate(&mut layers, IsolationMode::Multi, Channel::Alpha).unwrap();

        assert_eq!(base(&layers, 0), [0.1, 0.75, 0.3, 0.4]);
        assert_eq!(active(&layers, 0), [0.4, 0.4, 0.4, 1.0]);
    }

    #[test]
    fn adding_a_color_channel_while_alpha_is_isolated_keeps_grayscale() {
        let mut layers = layers_with(&[[0.1, 0.2, 0.3, 0.4]]);
        isolate(&mut layers, IsolationMode::Multi, Channel::Alpha).unwrap();
        layers.active_mut().unwrap().set(0, [0.6, 0.6, 0.6, 1.0]);
        let out = isolate(&mut layers, IsolationMode::Multi, Channel::Red).unwrap();

        assert_eq!(out.active_layer(), "Col_viewLayer_generated_03");
        assert_eq!(active(&layers, 0), [0.6, 0.6, 0.6, 1.0]);
        assert_eq!(base(&layers, 0)[3], 0.6);
    }

    #[test]
    fn removing_a_color_channel_keeps_alpha_grayscale() {
        let mut layers = layers_with(&[[0.1, 0.2, 0.3, 0.4]]);
        isolate(&mut layers, IsolationMode::Multi, Channel::Red).unwrap();
        isolate(&mut layers, IsolationMode::Multi, Channel::Alpha).unwrap();
        layers.active_mut().unwrap().set(0, [0.7, 0.7, 0.7, 1.0]);
        let out = isolate(&mut layers, IsolationMode::Multi, Channel::Red).unwrap();

        assert_eq!(out.active_layer(), "Col_viewLayer_generated_3");
        assert_eq!(active(&layers, 0), [0.7, 0.7, 0.7, 1.0]);
        assert_eq!(base(&layers, 0), [0.1, 0.2, 0.3, 0.7]);
        assert_eq!(derived_count(&layers), 1);
    }

    #[test]
    fn removing_alpha_leaves_remaining_channels_from_base() {
        let mut layers = layers_with(&[[0.1, 0.2, 0.3, 0.4]]);
        isolate(&mut layers, IsolationMode::Multi, Channel::Blue).unwrap();
        isolate(&mut layers, IsolationMode::Multi, Channel::Alpha).unwrap();
        layers.active_mut().unwrap().set(0, [0.5, 0.5, 0.5, 1.0]);
        let out = isolate(&mut layers, IsolationMode::Multi, Channel::Alpha).unwrap();

        assert_eq!(out.isolation().unwrap().channels, ChannelSet::single(Channel::Blue));
        assert_eq!(active(&layers, 0), [0.0, 0.0, 0.3, 1.0]);
        assert_eq!(base(&layers, 0)[3], 0.5);
    }

    #[test]
    fn isolating_everything_merges_back() {
        let mut layers = layers_with(&[BASE]);
        for channel in [Channel::Red, Channel::Green, Channel::Blue] {
            isolate(&mut layers, IsolationMode::Multi, channel).unwrap();
        }
        let out = isolate(&mut layers, IsolationMode::Multi, Channel::Alpha).unwrap();

        assert_eq!(out, Outcome::Merged("Col".into()));
        assert_eq!(derived_count(&layers), 0);
        assert_eq!(base(&layers, 0), BASE);
    }

    #[test]
    fn base_active_with_existing_derived_layer_is_resolved() {
        let mut layers = layers_with(&[BASE]);
        isolate(&mut layers, IsolationMode::Mono, Channel::Green).unwrap();
        layers.set_active("Col");

        let resolved = resolve(&mut layers).unwrap();
        assert_eq!(resolved.channels(), ChannelSet::single(Channel::Green));

        let out = isolate(&mut layers, IsolationMode::Mono, Channel::Green).unwrap();
        assert_eq!(out, Outcome::Merged("Col".into()));
        assert_eq!(derived_count(&layers), 0);
    }

    #[test]
    fn missing_base_is_recreated_from_derived() {
        let mut layers = ColorLayers::new(1);
        layers
            .create("Col_viewLayer_generated_1")
            .unwrap()
            .set(0, [0.0, 0.3, 0.0, 1.0]);

        let out = isolate(&mut layers, IsolationMode::Mono, Channel::Green).unwrap();
        assert_eq!(out, Outcome::Merged("Col".into()));
        assert_eq!(base(&layers, 0)[1], 0.3);
    }

    #[test]
    fn stray_derived_layer_blocks_transition_without_changes() {
        let mut layers = layers_with(&[[0.1, 0.2, 0.3, 0.4]]);
        layers
            .create("Col_viewLayer_generated_0")
            .unwrap()
            .set(0, [0.9, 0.0, 0.0, 1.0]);
        layers.create("Col_viewLayer_generated_1").unwrap();
        layers.set_active("Col_viewLayer_generated_0");

        let err = isolate(&mut layers, IsolationMode::Mono, Channel::Green).unwrap_err();
        assert!(matches!(err, PaintError::DuplicateLayer(name) if name == "Col_viewLayer_generated_1"));

        assert_eq!(
            layers.names().collect::<Vec<_>>(),
            ["Col", "Col_viewLayer_generated_0", "Col_viewLayer_generated_1"]
        );
        assert_eq!(base(&layers, 0), [0.1, 0.2, 0.3, 0.4]);
        assert_eq!(layers.active().unwrap().name(), "Col_viewLayer_generated_0");

        // Toggling the current channel off still works.
        let out = isolate(&mut layers, IsolationMode::Mono, Channel::Red).unwrap();
        assert_eq!(out, Outcome::Merged("Col".into()));
        assert_eq!(base(&layers, 0), [0.9, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn reconcile_and_discard() {
        let mut layers = layers_with(&[BASE]);
        assert_eq!(reconcile(&mut layers).unwrap(), None);

        isolate(&mut layers, IsolationMode::Mono, Channel::Red).unwrap();
        layers.active_mut().unwrap().set_channel(0, 0, 0.2);
        assert_eq!(reconcile(&mut layers).unwrap(), Some("Col".into()));
        assert_eq!(base(&layers, 0)[0], 0.2);

        isolate(&mut layers, IsolationMode::Mono, Channel::Red).unwrap();
        layers.active_mut().unwrap().set_channel(0, 0, 0.9);
        assert_eq!(discard(&mut layers).unwrap(), Some("Col".into()));
        assert_eq!(base(&layers, 0)[0], 0.2);
        assert_eq!(derived_count(&layers), 0);
    }

    #[test]
    fn no_layers_is_reported() {
        let mut layers = ColorLayers::new(4);
        assert!(matches!(
            isolate(&mut layers, IsolationMode::Mono, Channel::Red),
            Err(PaintError::NoColorLayers)
        ));
    }
}
