//! Per-loop color layer storage.
//!
//! A mesh owns a set of named [`ColorLayer`]s, all sized to the mesh's loop
//! count, and tracks which one is active. This is the storage the isolation
//! state machine and the blend compositor read and write.
//!
//! Layer names are unique. The active layer is tracked by name; resolving it
//! falls back to the first layer when the recorded name no longer exists,
//! mirroring how hosts report "the" active color attribute.

use crate::color::{Rgba, WHITE};
use crate::error::{PaintError, Result};
use crate::mesh::LoopId;

// ============================================================================
// ColorLayer
// ============================================================================

/// A named mapping from loop to RGBA color.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorLayer {
    name: String,
    colors: Vec<Rgba>,
}

impl ColorLayer {
    /// Creates a layer of `loop_count` entries, all set to `fill`.
    pub fn new(name: impl Into<String>, loop_count: usize, fill: Rgba) -> Self {
        Self {
            name: name.into(),
            colors: vec![fill; loop_count],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the color stored for a loop.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a loop of the owning mesh.
    pub fn get(&self, id: LoopId) -> Rgba {
        self.colors[id]
    }

    /// Overwrites the color of loop `id`.
    pub fn set(&mut self, id: LoopId, color: Rgba) {
        self.colors[id] = color;
    }

    /// Overwrites one RGBA component (0-3) of loop `id`.
    pub fn set_channel(&mut self, id: LoopId, channel: usize, value: f32) {
        self.colors[id][channel] = value;
    }

    /// Writes the same color to every loop.
    pub fn fill(&mut self, color: Rgba) {
        self.colors.fill(color);
    }

    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }

    pub fn colors_mut(&mut self) -> &mut [Rgba] {
        &mut self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

// ============================================================================
// ColorLayers
// ============================================================================

/// The set of color layers owned by one mesh.
#[derive(Debug, Clone, Default)]
pub struct ColorLayers {
    layers: Vec<ColorLayer>,
    active: Option<String>,
    loop_count: usize,
}

impl ColorLayers {
    /// Creates an empty layer set for a mesh with `loop_count` loops.
    pub fn new(loop_count: usize) -> Self {
        Self {
            layers: Vec::new(),
            active: None,
            loop_count,
        }
    }

    pub fn loop_count(&self) -> usize {
        self.loop_count
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layer names in creation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(ColorLayer::name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColorLayer> {
        self.layers.iter()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&ColorLayer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ColorLayer> {
        self.layers.iter_mut().find(|l| l.name == name)
    }

    /// Like [`get`](Self::get), but reports a missing layer as an error.
    pub fn require(&self, name: &str) -> Result<&ColorLayer> {
        self.get(name)
            .ok_or_else(|| PaintError::LayerNotFound(name.to_string()))
    }

    pub fn require_mut(&mut self, name: &str) -> Result<&mut ColorLayer> {
        self.get_mut(name)
            .ok_or_else(|| PaintError::LayerNotFound(name.to_string()))
    }

    /// Creates a new white layer. Fails if the name is taken.
    ///
    /// The first layer created becomes active.
    pub fn create(&mut self, name: impl Into<String>) -> Result<&mut ColorLayer> {
        self.insert(ColorLayer::new(name, self.loop_count, WHITE))
    }

    /// Creates a new layer holding a copy of `source`'s colors.
    pub fn create_copy(&mut self, name: impl Into<String>, source: &str) -> Result<&mut ColorLayer> {
        let colors = self.require(source)?.colors.clone();
        self.insert(ColorLayer {
            name: name.into(),
            colors,
        })
    }

    fn insert(&mut self, layer: ColorLayer) -> Result<&mut ColorLayer> {
        if self.contains(&layer.name) {
            return Err(PaintError::DuplicateLayer(layer.name));
        }
        if self.active.is_none() {
            self.active = Some(layer.name.clone());
        }
        self.layers.push(layer);
        let last = self.layers.len() - 1;
        Ok(&mut self.layers[last])
    }

    /// Removes a layer and returns it, if it existed.
    pub fn remove(&mut self, name: &str) -> Option<ColorLayer> {
        let index = self.position(name)?;
        Some(self.layers.remove(index))
    }

    /// The recorded active layer name, which may be stale.
    pub fn active_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Resolves the active layer, falling back to the first layer.
    pub fn active(&self) -> Result<&ColorLayer> {
        self.active
            .as_deref()
            .and_then(|name| self.get(name))
            .or_else(|| self.layers.first())
            .ok_or(PaintError::NoColorLayers)
    }

    pub fn active_mut(&mut self) -> Result<&mut ColorLayer> {
        let name = self.active()?.name.clone();
        self.require_mut(&name)
    }

    /// Marks a layer active. Returns false, leaving the active layer
    /// unchanged, if no layer has that name.
    pub fn set_active(&mut self, name: &str) -> bool {
        if self.contains(name) {
            self.active = Some(name.to_string());
            true
        } else {
            false
        }
    }

    /// First layer whose name starts with `prefix`.
    pub fn find_prefixed(&self, prefix: &str) -> Option<&ColorLayer> {
        self.layers.iter().find(|l| l.name.starts_with(prefix))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.name == name)
    }
}

// ============================================================================
// Tests
// ============================================================================
