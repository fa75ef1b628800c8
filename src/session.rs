//! Per-document paint session.

use crate::blend::{BlendTransfer, transfer};
use crate::color::{Channel, ChannelSet, Rgb, STANDARD_SHADING};
use crate::error::{PaintError, Result};
use crate::isolation::{self, Isolation, IsolationMode, Outcome};
use crate::mesh::Mesh;
use crate::profile::{GradientSettings, PaintProfile, SelectionSettings, TransferSettings};
use crate::tools::{self, BrushState, GradientTool, Palette, PaletteLibrary};

// ============================================================================
// Configurable Trait
// ============================================================================

/// Trait for types that can be configured from a [`PaintProfile`].
pub trait Configurable {
    /// Applies a profile's settings to this instance.
    fn apply_profile(&mut self, profile: &PaintProfile);

    /// Exports the current settings as a profile.
    fn export_profile(&self) -> PaintProfile;
}

// ============================================================================
// PaintSession
// ============================================================================

/// Paint state for one document.
///
/// Holds the user settings, the brush and palettes, and the isolation the
/// session last observed or produced. The mesh is passed to every operation
/// so the host stays its owner.
///
/// # Example
///
/// ```
/// use alpha_paint::{Channel, Mesh, PaintSession};
/// use glam::Vec3;
///
/// let mut mesh = Mesh::from_faces([Vec3::ZERO, Vec3::X, Vec3::Y], &[&[0, 1, 2]]);
/// mesh.layers.create("Col").unwrap();
///
/// let mut session = PaintSession::new();
/// session.isolate(&mut mesh, Channel::Green).unwrap();
/// assert_eq!(session.isolation().unwrap().base, "Col");
///
/// session.brush.primary = [0.0, 0.25, 0.0];
/// session.fill(&mut mesh).unwrap();
///
/// session.reconcile(&mut mesh).unwrap();
/// assert_eq!(mesh.layers.get("Col").unwrap().get(0), [1.0, 0.25, 1.0, 1.0]);
/// ```
#[derive(Debug, Clone)]
pub struct PaintSession {
    pub isolation_mode: IsolationMode,
    /// Let fill and sample act on every vertex when nothing is selected.
    pub allow_fill_all: bool,
    pub transfer: TransferSettings,
    pub selection: SelectionSettings,
    pub gradient: GradientSettings,
    pub brush: BrushState,
    pub palettes: PaletteLibrary,
    isolation: Option<Isolation>,
}

impl Default for PaintSession {
    fn default() -> Self {
        let profile = PaintProfile::default();
        Self {
            isolation_mode: profile.isolation_mode,
            allow_fill_all: profile.allow_fill_all,
            transfer: profile.transfer,
            selection: profile.selection,
            gradient: profile.gradient,
            brush: BrushState::default(),
            palettes: PaletteLibrary::new(),
            isolation: None,
        }
    }
}

impl PaintSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// The isolation as of the last operation or [`sync`](Self::sync).
    pub fn isolation(&self) -> Option<&Isolation> {
        self.isolation.as_ref()
    }

    /// Re-reads the isolation from the mesh, e.g. after the host changed the
    /// active layer.
    pub fn sync(&mut self, mesh: &mut Mesh) -> Result<Option<&Isolation>> {
        let resolved = isolation::resolve(&mut mesh.layers)?;
        self.isolation = resolved.derived.map(|(_, iso)| iso);
        Ok(self.isolation.as_ref())
    }

    /// Toggles a channel using the session's isolation mode.
    pub fn isolate(&mut self, mesh: &mut Mesh, channel: Channel) -> Result<Outcome> {
        let outcome = isolation::isolate(&mut mesh.layers, self.isolation_mode, channel)?;
        self.isolation = outcome.isolation().cloned();
        Ok(outcome)
    }

    /// Commits any isolation back into its base layer.
    pub fn reconcile(&mut self, mesh: &mut Mesh) -> Result<Option<String>> {
        let base = isolation::reconcile(&mut mesh.layers)?;
        self.isolation = None;
        Ok(base)
    }

    /// Drops any isolation without committing it.
    pub fn discard(&mut self, mesh: &mut Mesh) -> Result<Option<String>> {
        let base = isolation::discard(&mut mesh.layers)?;
        self.isolation = None;
        Ok(base)
    }

    /// Blends the configured source layer into the active layer.
    ///
    /// Without a configured source the first layer is used.
    pub fn blend(&mut self, mesh: &mut Mesh) -> Result<ChannelSet> {
        let destination = mesh.layers.active()?.name().to_string();
        let source = match &self.transfer.source_layer {
            Some(name) => name.clone(),
            None => mesh
                .layers
                .names()
                .next()
                .map(str::to_string)
                .ok_or(PaintError::NoColorLayers)?,
        };

        let mut op = BlendTransfer::new(source, destination, self.transfer.blend_mode)
            .with_source_channels(self.transfer.source_channel_set())
            .with_factor(self.transfer.factor);
        if let Some(factor_layer) = &self.transfer.factor_layer {
            op = op.with_factor_layer(factor_layer.clone());
        }
        transfer(&mut mesh.layers, &op)
    }

    /// Fills the target loops with the brush primary color.
    pub fn fill(&self, mesh: &mut Mesh) -> Result<usize> {
        tools::paint_fill(mesh, &self.brush, self.allow_fill_all)
    }

    /// Samples the average color of the targets into the brush.
    pub fn sample(&mut self, mesh: &Mesh) -> Result<Rgb> {
        tools::sample_average(mesh, self.allow_fill_all, &mut self.brush, &mut self.palettes)
    }

    /// Builds a palette from the active layer's colors.
    pub fn palette_from_layer(&mut self, mesh: &Mesh) -> Result<&Palette> {
        tools::palette_from_layer(mesh, &mut self.palettes).map(|p| &*p)
    }

    /// Selects vertices by brush or palette color.
    pub fn select_by_color(&self, mesh: &mut Mesh) -> Result<usize> {
        tools::select_by_color(mesh, &self.brush, &self.palettes, &self.selection)
    }

    /// A fresh gradient tool with the session's gradient settings.
    pub fn gradient_tool(&self) -> GradientTool {
        GradientTool::new(self.gradient)
    }

    /// Prepares the mesh for export with the standard shading color.
    pub fn optimize_for_export(&mut self, mesh: &mut Mesh, delete_others: bool) -> Result<()> {
        tools::optimize_for_export(&mut mesh.layers, delete_others, STANDARD_SHADING)?;
        self.isolation = None;
        Ok(())
    }
}

impl Configurable for PaintSession {
    fn apply_profile(&mut self, profile: &PaintProfile) {
        self.isolation_mode = profile.isolation_mode;
        self.allow_fill_all = profile.allow_fill_all;
        self.transfer = profile.transfer.clone();
        self.selection = profile.selection.clone();
        self.gradient = profile.gradient;
    }

    fn export_profile(&self) -> PaintProfile {
        PaintProfile {
            isolation_mode: self.isolation_mode,
            allow_fill_all: self.allow_fill_all,
            transfer: self.transfer.clone(),
            selection: self.selection.clone(),
            gradient: self.gradient,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
