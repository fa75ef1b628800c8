//! Color palettes and the palette library.

use std::cmp::Ordering;
use std::collections::HashSet;

use log::debug;

use super::masked_vertices;
use crate::color::{self, NEUTRAL, Rgb};
use crate::error::{PaintError, Result};
use crate::mesh::Mesh;

/// Name of the palette the sampler collects into.
pub const DEFAULT_PALETTE: &str = "Shading Defaults";

// ============================================================================
// Palette
// ============================================================================

/// A named list of RGB colors with an optional active entry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Palette {
    name: String,
    colors: Vec<Rgb>,
    active: Option<usize>,
}

impl Palette {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            colors: Vec::new(),
            active: None,
        }
    }

    /// The standard shading presets: neutral, full occlusion, soft shadow,
    /// and mid gray. The first one is active.
    pub fn shading_defaults() -> Self {
        let quarter = 64.0 / 255.0;
        Self {
            name: DEFAULT_PALETTE.to_string(),
            colors: vec![
                [1.0, NEUTRAL, NEUTRAL],
                [0.0, NEUTRAL, NEUTRAL],
                [1.0, quarter, NEUTRAL],
                [NEUTRAL, NEUTRAL, NEUTRAL],
            ],
            active: Some(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Exact membership test.
    pub fn contains(&self, color: Rgb) -> bool {
        self.colors.contains(&color)
    }

    /// Appends a color and returns its index.
    pub fn push(&mut self, color: Rgb) -> usize {
        self.colors.push(color);
        self.colors.len() - 1
    }

    pub fn active_color(&self) -> Option<Rgb> {
        self.active.and_then(|i| self.colors.get(i).copied())
    }

    /// Marks an entry active. Out-of-range indices are ignored.
    pub fn set_active(&mut self, index: usize) {
        if index < self.colors.len() {
            self.active = Some(index);
        }
    }

    /// Sorts by hue, then saturation, then value. The active entry follows
    /// its color.
    pub fn sort_by_hsv(&mut self) {
        let active = self.active_color();
        self.colors.sort_by(|a, b| hsv_order(*a, *b));
        self.active = active.and_then(|c| self.colors.iter().position(|x| *x == c));
    }
}

fn hsv_order(a: Rgb, b: Rgb) -> Ordering {
    let key = |c: Rgb| {
        let hsv = color::to_hsv(c);
        [color::hue_fraction(&hsv), hsv.saturation, hsv.value]
    };
    let (ka, kb) = (key(a), key(b));
    ka.iter()
        .zip(&kb)
        .map(|(x, y)| x.total_cmp(y))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

// ============================================================================
// PaletteLibrary
// ============================================================================

/// All palettes of a session and which one is active.
#[derive(Debug, Clone, Default)]
pub struct PaletteLibrary {
    palettes: Vec<Palette>,
    active: Option<usize>,
}

impl PaletteLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Palette> {
        self.palettes.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Palette> {
        self.palettes.iter().find(|p| p.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Palette> {
        self.palettes.iter_mut().find(|p| p.name == name)
    }

    /// First palette holding exactly this color.
    pub fn find_by_color(&self, color: Rgb) -> Option<&Palette> {
        self.palettes.iter().find(|p| p.contains(color))
    }

    /// Adds an empty palette and makes it active.
    ///
    /// A taken name gets a numeric suffix (`name.001`, `name.002`, ...).
    pub fn create(&mut self, name: &str) -> &mut Palette {
        let name = self.unique_name(name);
        self.add(Palette::new(name))
    }

    fn add(&mut self, palette: Palette) -> &mut Palette {
        debug!("new palette {:?}", palette.name);
        self.palettes.push(palette);
        let index = self.palettes.len() - 1;
        self.active = Some(index);
        &mut self.palettes[index]
    }

    fn unique_name(&self, name: &str) -> String {
        if self.get(name).is_none() {
            return name.to_string();
        }
        (1..)
            .map(|n| format!("{name}.{n:03}"))
            .find(|candidate| self.get(candidate).is_none())
            .unwrap_or_else(|| name.to_string())
    }

    pub fn active(&self) -> Option<&Palette> {
        self.active.and_then(|i| self.palettes.get(i))
    }

    pub fn active_mut(&mut self) -> Option<&mut Palette> {
        self.active.and_then(|i| self.palettes.get_mut(i))
    }

    pub fn set_active(&mut self, name: &str) -> Result<()> {
        let index = self
            .palettes
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| PaintError::PaletteNotFound(name.to_string()))?;
        self.active = Some(index);
        Ok(())
    }

    /// Removes the active palette and activates the one before it. Removing
    /// the first palette activates the last remaining one.
    pub fn remove_active(&mut self) -> Result<Palette> {
        let index = self
            .active
            .filter(|&i| i < self.palettes.len())
            .ok_or_else(|| PaintError::PaletteNotFound("<active>".to_string()))?;
        let removed = self.palettes.remove(index);
        self.active = match (index, self.palettes.len()) {
            (_, 0) => None,
            (0, len) => Some(len - 1),
            (i, _) => Some(i - 1),
        };
        debug!("removed palette {:?}", removed.name);
        Ok(removed)
    }

    /// The default shading palette, created and activated on first use.
    pub fn default_palette(&mut self) -> &mut Palette {
        match self.palettes.iter().position(|p| p.name == DEFAULT_PALETTE) {
            Some(index) => &mut self.palettes[index],
            None => self.add(Palette::shading_defaults()),
        }
    }
}

// ============================================================================
// Palette from layer
// ============================================================================

/// Builds a palette from the distinct RGB colors of the active layer.
///
/// Under the vertex mask only selected vertices contribute; the face mask
/// restricts loops. The palette is named after the layer, sorted by HSV and
/// made active.
pub fn palette_from_layer<'a>(mesh: &Mesh, library: &'a mut PaletteLibrary) -> Result<&'a mut Palette> {
    mesh.check_layers()?;
    let layer = mesh.layers.active()?;

    let mut seen = HashSet::new();
    let mut colors = Vec::new();
    for v in masked_vertices(mesh) {
        for l in mesh.masked_loops(v) {
            let rgb = color::rgb(layer.get(l));
            if seen.insert(rgb.map(f32::to_bits)) {
                colors.push(rgb);
            }
        }
    }

    let palette = library.create(layer.name());
    palette.colors = colors;
    palette.sort_by_hsv();
    debug!("palette {:?} with {} colors", palette.name, palette.len());
    Ok(palette)
}
