//! Painting tools built on top of the layer store.
//!
//! Each tool is a free function over a [`Mesh`] plus whatever host state it
//! needs (brush, palettes, viewport). Tools check their preconditions first
//! and only then write, so an `Err` leaves the mesh unchanged.

pub mod export;
pub mod fill;
pub mod gradient;
pub mod palette;
pub mod sample;
pub mod select;

pub use export::optimize_for_export;
pub use fill::paint_fill;
pub use gradient::{
    GradientEvent, GradientOverlay, GradientParams, GradientShape, GradientTool, ToolStatus,
    Viewport, paint_gradient,
};
pub use self::palette::{DEFAULT_PALETTE, Palette, PaletteLibrary, palette_from_layer};
pub use sample::sample_average;
pub use select::select_by_color;

use crate::color::{Rgb, Rgba};
use crate::error::{PaintError, Result};
use crate::mesh::{LoopId, Mesh, VertexId};

// ============================================================================
// BrushState
// ============================================================================

/// The host's brush colors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushState {
    pub primary: Rgb,
    pub secondary: Rgb,
}

impl Default for BrushState {
    fn default() -> Self {
        Self {
            primary: [1.0, 1.0, 1.0],
            secondary: [0.0, 0.0, 0.0],
        }
    }
}

impl BrushState {
    pub fn new(primary: Rgb, secondary: Rgb) -> Self {
        Self { primary, secondary }
    }

    /// Primary color as opaque RGBA.
    pub fn primary_rgba(&self) -> Rgba {
        opaque(self.primary)
    }
}

fn opaque([r, g, b]: Rgb) -> Rgba {
    [r, g, b, 1.0]
}

// ============================================================================
// Targeting
// ============================================================================

/// Vertices a fill-style tool operates on.
///
/// With the vertex mask on, only selected vertices; otherwise every vertex
/// if `allow_all` is set, else [`PaintError::NothingSelected`].
pub(crate) fn target_vertices(mesh: &Mesh, allow_all: bool) -> Result<Vec<VertexId>> {
    if mesh.mask.vertex {
        Ok(mesh.selected_vertices().collect())
    } else if allow_all {
        Ok((0..mesh.vertices().len()).collect())
    } else {
        Err(PaintError::NothingSelected)
    }
}

/// Vertices visible to read-only tools: selected ones under the vertex mask,
/// all of them otherwise.
pub(crate) fn masked_vertices(mesh: &Mesh) -> Vec<VertexId> {
    if mesh.mask.vertex {
        mesh.selected_vertices().collect()
    } else {
        (0..mesh.vertices().len()).collect()
    }
}

/// Loops of `vertices` that pass the face mask, in vertex order.
pub(crate) fn target_loops(mesh: &Mesh, vertices: &[VertexId]) -> Vec<LoopId> {
    vertices
        .iter()
        .flat_map(|&v| mesh.masked_loops(v))
        .collect()
}
