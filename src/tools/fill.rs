//! Flat fill with the brush color.

use log::debug;

use super::{BrushState, target_loops, target_vertices};
use crate::error::Result;
use crate::isolation::{self, Isolation};
use crate::mesh::Mesh;

/// Paints the brush primary color into the active layer.
///
/// Only the isolated channels are written; with nothing or alpha isolated
/// that is RGB. Returns the number of loops painted.
pub fn paint_fill(mesh: &mut Mesh, brush: &BrushState, allow_all: bool) -> Result<usize> {
    mesh.check_layers()?;
    let channels = Isolation::paint_channels(isolation::channels_of(mesh.layers.active()?.name())?);
    let vertices = target_vertices(mesh, allow_all)?;
    let loops = target_loops(mesh, &vertices);

    let color = brush.primary_rgba();
    let layer = mesh.layers.active_mut()?;
    for &l in &loops {
        for c in channels.indices() {
            layer.set_channel(l, c, color[c]);
        }
    }

    debug!("filled {} loops of {:?} ({channels})", loops.len(), layer.name());
    Ok(loops.len())
}
