//! One-click preparation of the color data for export.

use log::{debug, info};

use crate::color::Rgba;
use crate::error::Result;
use crate::isolation;
use crate::layer::ColorLayers;

/// Layer name the shading pipeline reads at export time.
pub const EXPORT_LAYER: &str = "COLOR";

/// Leaves the mesh with a single `COLOR` layer filled with `fill`, active.
///
/// Any isolation is committed first. With `delete_others`, every layer
/// except `COLOR` is removed. `COLOR` is created when missing, and its
/// contents are overwritten either way.
pub fn optimize_for_export(layers: &mut ColorLayers, delete_others: bool, fill: Rgba) -> Result<()> {
    if !layers.is_empty() {
        isolation::reconcile(layers)?;
    }

    if delete_others {
        let doomed: Vec<String> = layers
            .names()
            .filter(|name| *name != EXPORT_LAYER)
            .map(str::to_string)
            .collect();
        for name in &doomed {
            layers.remove(name);
        }
        debug!("removed {} layers before export", doomed.len());
    }

    if !layers.contains(EXPORT_LAYER) {
        layers.create(EXPORT_LAYER)?;
    }
    layers.require_mut(EXPORT_LAYER)?.fill(fill);
    layers.set_active(EXPORT_LAYER);

    info!("{EXPORT_LAYER} layer ready for export");
    Ok(())
}
