//! Average color sampling into the brush.

use log::debug;

use super::{BrushState, PaletteLibrary, target_loops, target_vertices};
use crate::color::{self, Rgb};
use crate::error::{PaintError, Result};
use crate::mesh::Mesh;

/// Averages the RGB of the target loops of the active layer.
///
/// The result becomes the brush primary color and is appended to the default
/// shading palette (created on first use) unless an identical entry exists.
pub fn sample_average(
    mesh: &Mesh,
    allow_all: bool,
    brush: &mut BrushState,
    palettes: &mut PaletteLibrary,
) -> Result<Rgb> {
    mesh.check_layers()?;
    let layer = mesh.layers.active()?;
    let vertices = target_vertices(mesh, allow_all)?;
    let loops = target_loops(mesh, &vertices);
    if loops.is_empty() {
        return Err(PaintError::NothingToSample);
    }

    let mut sum = [0.0f32; 3];
    for &l in &loops {
        for (s, v) in sum.iter_mut().zip(color::rgb(layer.get(l))) {
            *s += v;
        }
    }
    let n = loops.len() as f32;
    let average = sum.map(|s| s / n);

    brush.primary = average;
    let palette = palettes.default_palette();
    if !palette.contains(average) {
        let index = palette.push(average);
        palette.set_active(index);
    }

    debug!("sampled {average:?} from {} loops", loops.len());
    Ok(average)
}
