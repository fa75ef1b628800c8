//! Vertex selection by color.

use log::debug;

use super::{BrushState, PaletteLibrary};
use crate::color::{self, Rgb};
use crate::error::{PaintError, Result};
use crate::mesh::Mesh;
use crate::profile::{SelectMode, SelectionSettings};

/// Selects vertices whose loops match the brush or palette colors in the
/// active layer, and turns the vertex mask on.
///
/// A loop matches a color when each RGB component lies within
/// `error_margin` of it. A vertex is selected when one of its loops matches.
/// With `restrict_loops`, a vertex that has any non-matching loop is
/// deselected instead. Other vertices keep their selection. Returns the
/// number of selected vertices afterwards.
pub fn select_by_color(
    mesh: &mut Mesh,
    brush: &BrushState,
    palettes: &PaletteLibrary,
    settings: &SelectionSettings,
) -> Result<usize> {
    let targets: Vec<Rgb> = match settings.mode {
        SelectMode::Brush => vec![brush.primary],
        SelectMode::Palette => palettes
            .active()
            .ok_or_else(|| PaintError::PaletteNotFound("<active>".to_string()))?
            .colors()
            .to_vec(),
    };
    mesh.check_layers()?;
    let layer = mesh.layers.active()?;
    let margin = settings.error_margin.max(0.0);

    let mut changes = Vec::new();
    for (v, vertex) in mesh.vertices().iter().enumerate() {
        let mut matched = false;
        let mut mismatched = false;
        for &l in vertex.loops() {
            let rgb = color::rgb(layer.get(l));
            if targets.iter().any(|t| within(rgb, *t, margin)) {
                matched = true;
            } else {
                mismatched = true;
            }
        }
        if settings.restrict_loops && mismatched {
            changes.push((v, false));
        } else if matched {
            changes.push((v, true));
        }
    }

    for (v, selected) in changes {
        mesh.select_vertex(v, selected);
    }
    mesh.mask.vertex = true;

    let count = mesh.selected_vertices().count();
    debug!("color select ({:?}): {count} vertices", settings.mode);
    Ok(count)
}

fn within(a: Rgb, b: Rgb, margin: f32) -> bool {
    a.iter().zip(b).all(|(x, y)| (x - y).abs() <= margin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::tests::quad;

    const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

    fn painted() -> Mesh {
        let mut mesh = quad();
        let layer = mesh.layers.create("Col").unwrap();
        // Vertex 1 owns loops 2 (red) and 3 (white); vertex 0 owns loop 0.
        layer.set(0, RED);
        layer.set(2, [1.0, 0.0005, 0.0, 1.0]);
        mesh
    }

    fn brush() -> BrushState {
        BrushState::new([1.0, 0.0, 0.0], [0.0; 3])
    }

    #[test]
    fn selects_matching_vertices() {
        let mut mesh = painted();
        let settings = SelectionSettings::default();
        let count = select_by_color(&mut mesh, &brush(), &PaletteLibrary::new(), &settings).unwrap();

        assert_eq!(count, 2);
        assert!(mesh.mask.vertex);
        assert_eq!(mesh.selected_vertices().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn restrict_loops_drops_partial_matches() {
        let mut mesh = painted();
        mesh.select_vertex(1, true);
        mesh.select_vertex(3, true);
        let settings = SelectionSettings {
            restrict_loops: true,
            ..SelectionSettings::default()
        };
        select_by_color(&mut mesh, &brush(), &PaletteLibrary::new(), &settings).unwrap();
        assert_eq!(mesh.selected_vertices().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn error_margin_controls_precision() {
        let mut mesh = painted();
        let settings = SelectionSettings {
            error_margin: 0.0,
            ..SelectionSettings::default()
        };
        select_by_color(&mut mesh, &brush(), &PaletteLibrary::new(), &settings).unwrap();
        assert_eq!(mesh.selected_vertices().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn palette_mode_matches_any_entry() {
        let mut mesh = painted();
        let mut palettes = PaletteLibrary::new();
        let palette = palettes.create("P");
        palette.push([0.0, 0.0, 0.0]);
        palette.push([1.0, 1.0, 1.0]);

        let settings = SelectionSettings {
            mode: SelectMode::Palette,
            ..SelectionSettings::default()
        };
        select_by_color(&mut mesh, &brush(), &palettes, &settings).unwrap();
        // Every vertex except 0 has a white loop.
        assert_eq!(mesh.selected_vertices().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn palette_mode_needs_a_palette() {
        let mut mesh = painted();
        let settings = SelectionSettings {
            mode: SelectMode::Palette,
            ..SelectionSettings::default()
        };
        assert!(matches!(
            select_by_color(&mut mesh, &brush(), &PaletteLibrary::new(), &settings),
            Err(PaintError::PaletteNotFound(_))
        ));
        assert!(!mesh.mask.vertex);
    }
}
