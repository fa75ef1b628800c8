//! Screen-space gradient painting.
//!
//! A gradient is defined by a line drawn in the viewport. Every target vertex
//! is projected to the screen and gets a parameter `t` in `[0, 1]` from its
//! position relative to the line; its loops receive the color interpolated
//! between the two endpoint colors.
//!
//! [`paint_gradient`] is the one-shot operation. [`GradientTool`] wraps it in
//! the interactive press-drag-release flow and produces overlay draw data
//! while the line is being drawn.

use glam::{Vec2, Vec3};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::color::{self, Rgb, Rgba};
use crate::error::{PaintError, Result};
use crate::mesh::Mesh;
use crate::profile::GradientSettings;

use super::{BrushState, masked_vertices, target_loops};

/// Distance in pixels within which shift-drag snaps the line to an axis.
pub const AXIS_SNAP_DISTANCE: f32 = 20.0;

/// Segments of the radial overlay circle.
const CIRCLE_STEPS: usize = 50;

// ============================================================================
// Viewport
// ============================================================================

/// Projection from world space to viewport pixels, provided by the host.
pub trait Viewport {
    /// Returns `None` for points that do not project (e.g. behind the camera).
    fn project(&self, world: Vec3) -> Option<Vec2>;
}

// ============================================================================
// Parameters
// ============================================================================

/// How `t` is derived from a vertex position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub enum GradientShape {
    /// Projection onto the drawn line.
    #[default]
    Linear,
    /// Distance from the start point.
    Radial,
}

/// A fully specified gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientParams {
    pub start: Vec2,
    pub end: Vec2,
    pub start_color: Rgb,
    pub end_color: Rgb,
    pub shape: GradientShape,
    /// Interpolate in HSV along the shortest hue path instead of in RGB.
    pub hue_blend: bool,
}

impl GradientParams {
    /// Gradient parameter of a screen point, clamped to `[0, 1]`.
    ///
    /// Returns `None` when the line has zero length.
    pub fn t(&self, point: Vec2) -> Option<f32> {
        let line = self.end - self.start;
        let length_sq = line.length_squared();
        if length_sq == 0.0 {
            return None;
        }
        let offset = point - self.start;
        let t = match self.shape {
            GradientShape::Linear => offset.dot(line) / length_sq,
            GradientShape::Radial => offset.length() / length_sq.sqrt(),
        };
        Some(color::clamp01(t))
    }

    /// Color at parameter `t`.
    pub fn color_at(&self, t: f32) -> Rgb {
        if self.hue_blend {
            hue_lerp(self.start_color, self.end_color, t)
        } else {
            let [a, b] = [self.start_color, self.end_color];
            [0usize, 1, 2].map(|c| a[c] + (b[c] - a[c]) * t)
        }
    }
}

/// HSV interpolation taking the short way around the hue circle.
fn hue_lerp(start: Rgb, end: Rgb, t: f32) -> Rgb {
    let a = color::to_hsv(start);
    let b = color::to_hsv(end);
    let h0 = color::hue_fraction(&a);

    let mut dh = color::hue_fraction(&b) - h0;
    if dh > 0.5 {
        dh -= 1.0;
    } else if dh < -0.5 {
        dh += 1.0;
    }

    let hue = (h0 + dh * t).rem_euclid(1.0);
    let saturation = a.saturation + (b.saturation - a.saturation) * t;
    let value = a.value + (b.value - a.value) * t;
    color::from_hsv_fractions(hue, saturation, value)
}

// ============================================================================
// One-shot painting
// ============================================================================

/// Paints a gradient into the RGB of the active layer.
///
/// Targets the selected vertices under the vertex mask and every vertex
/// otherwise; the face mask restricts loops. Alpha is left untouched and
/// vertices the viewport cannot project are skipped. Returns the number of
/// loops painted.
pub fn paint_gradient(mesh: &mut Mesh, viewport: &impl Viewport, params: &GradientParams) -> Result<usize> {
    if params.start == params.end {
        return Err(PaintError::DegenerateGradient);
    }
    mesh.check_layers()?;
    mesh.layers.active()?;

    let mut writes = Vec::new();
    for v in masked_vertices(mesh) {
        let Some(screen) = viewport.project(mesh.vertices()[v].position) else {
            continue;
        };
        let Some(t) = params.t(screen) else {
            continue;
        };
        let [r, g, b] = params.color_at(t);
        for l in target_loops(mesh, &[v]) {
            writes.push((l, [r, g, b]));
        }
    }

    let layer = mesh.layers.active_mut()?;
    for &(l, [r, g, b]) in &writes {
        let mut c = layer.get(l);
        c[..3].copy_from_slice(&[r, g, b]);
        layer.set(l, c);
    }

    debug!("gradient painted {} loops of {:?}", writes.len(), layer.name());
    Ok(writes.len())
}

/// Snaps `end` onto the vertical or horizontal axis through `start` when it
/// lies within `delta` pixels of it. The vertical axis wins ties.
pub fn axis_snap(start: Vec2, end: Vec2, delta: f32) -> Vec2 {
    if (end.x - start.x).abs() < delta {
        Vec2::new(start.x, end.y)
    } else if (end.y - start.y).abs() < delta {
        Vec2::new(end.x, start.y)
    } else {
        end
    }
}

// ============================================================================
// Interactive tool
// ============================================================================

/// Input events understood by [`GradientTool`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientEvent {
    /// Primary button pressed at `cursor`.
    Press { cursor: Vec2, shift: bool },
    /// Cursor moved.
    Move { cursor: Vec2, shift: bool },
    /// Primary button released.
    Release { cursor: Vec2, shift: bool },
    /// Camera navigation input (middle mouse, wheel).
    Navigate,
    /// Escape or secondary button.
    Cancel,
}

/// What the host should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStatus {
    /// Keep feeding events.
    Running,
    /// Hand the event on to the viewport; the tool keeps running.
    PassThrough,
    /// The gradient was painted into this many loops. The tool is done.
    Finished(usize),
    /// The tool stopped without touching the mesh.
    Cancelled,
}

/// Draw data for the line being dragged.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientOverlay {
    /// Start and end point in viewport pixels.
    pub line: [Vec2; 2],
    /// Colors at the start and end point.
    pub colors: [Rgba; 2],
    /// Closed outline of the radial extent; empty for linear gradients.
    pub circle: Vec<Vec2>,
}

#[derive(Debug, Clone, Copy)]
struct DrawnLine {
    start: Vec2,
    end: Vec2,
    colors: [Rgb; 2],
}

/// Modal press-drag-release gradient tool.
///
/// The endpoint colors are captured from the brush when the line starts. The
/// mesh is only written when the line is committed.
#[derive(Debug, Clone, Default)]
pub struct GradientTool {
    settings: GradientSettings,
    line: Option<DrawnLine>,
}

impl GradientTool {
    pub fn new(settings: GradientSettings) -> Self {
        Self {
            settings,
            line: None,
        }
    }

    pub fn settings(&self) -> &GradientSettings {
        &self.settings
    }

    /// Whether a line is currently being drawn.
    pub fn is_drawing(&self) -> bool {
        self.line.is_some()
    }

    /// Feeds one input event.
    ///
    /// While a line is drawn, a press behaves like a release. A release on
    /// the start point keeps the tool running so the user can still drag.
    pub fn handle(
        &mut self,
        event: GradientEvent,
        brush: &BrushState,
        mesh: &mut Mesh,
        viewport: &impl Viewport,
    ) -> Result<ToolStatus> {
        match (event, self.line.as_mut()) {
            (GradientEvent::Navigate, _) => Ok(ToolStatus::PassThrough),
            (GradientEvent::Cancel, _) => {
                self.line = None;
                Ok(ToolStatus::Cancelled)
            }
            (GradientEvent::Press { cursor, .. }, None) => {
                self.line = Some(DrawnLine {
                    start: cursor,
                    end: cursor,
                    colors: [brush.primary, brush.secondary],
                });
                Ok(ToolStatus::Running)
            }
            (GradientEvent::Move { .. } | GradientEvent::Release { .. }, None) => Ok(ToolStatus::Running),
            (GradientEvent::Move { cursor, shift }, Some(line)) => {
                line.end = snapped(line.start, cursor, shift);
                Ok(ToolStatus::Running)
            }
            (
                GradientEvent::Press { cursor, shift } | GradientEvent::Release { cursor, shift },
                Some(line),
            ) => {
                line.end = snapped(line.start, cursor, shift);
                if line.end == line.start {
                    return Ok(ToolStatus::Running);
                }
                let line = *line;
                self.line = None;
                self.commit(line, mesh, viewport).map(ToolStatus::Finished)
            }
        }
    }

    fn commit(&self, line: DrawnLine, mesh: &mut Mesh, viewport: &impl Viewport) -> Result<usize> {
        let params = GradientParams {
            start: line.start,
            end: line.end,
            start_color: line.colors[0],
            end_color: line.colors[1],
            shape: self.settings.shape,
            hue_blend: self.settings.hue_blend,
        };
        paint_gradient(mesh, viewport, &params)
    }

    /// Overlay for the line in progress, if any.
    pub fn overlay(&self) -> Option<GradientOverlay> {
        let line = self.line?;
        let circle = match self.settings.shape {
            GradientShape::Linear => Vec::new(),
            GradientShape::Radial => circle_points(line.start, line.start.distance(line.end)),
        };
        let [a, b] = line.colors;
        Some(GradientOverlay {
            line: [line.start, line.end],
            colors: [[a[0], a[1], a[2], 1.0], [b[0], b[1], b[2], 1.0]],
            circle,
        })
    }
}

fn snapped(start: Vec2, cursor: Vec2, shift: bool) -> Vec2 {
    if shift {
        axis_snap(start, cursor, AXIS_SNAP_DISTANCE)
    } else {
        cursor
    }
}

/// `CIRCLE_STEPS + 1` points around `center`; the last repeats the first.
fn circle_points(center: Vec2, radius: f32) -> Vec<Vec2> {
    (0..=CIRCLE_STEPS)
        .map(|i| {
            let angle = std::f32::consts::TAU * i as f32 / CIRCLE_STEPS as f32;
            center + radius * Vec2::new(angle.cos(), angle.sin())
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::tests::quad;

    /// Maps world units to 100 px, ignoring depth.
    struct Ortho;

    impl Viewport for Ortho {
        fn project(&self, world: Vec3) -> Option<Vec2> {
            Some(world.truncate() * 100.0)
        }
    }

    fn close(a: Rgb, b: Rgb) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-4)
    }

    fn params(shape: GradientShape) -> GradientParams {
        GradientParams {
            start: Vec2::new(0.0, 0.0),
            end: Vec2::new(100.0, 0.0),
            start_color: [0.0, 0.0, 0.0],
            end_color: [1.0, 1.0, 1.0],
            shape,
            hue_blend: false,
        }
    }

    #[test]
    fn linear_parameter_is_clamped_projection() {
        let p = params(GradientShape::Linear);
        assert_eq!(p.t(Vec2::new(50.0, 80.0)), Some(0.5));
        assert_eq!(p.t(Vec2::new(-20.0, 0.0)), Some(0.0));
        assert_eq!(p.t(Vec2::new(300.0, 0.0)), Some(1.0));
    }

    #[test]
    fn radial_parameter_is_distance() {
        let p = params(GradientShape::Radial);
        assert_eq!(p.t(Vec2::new(0.0, 50.0)), Some(0.5));
        assert_eq!(p.t(Vec2::new(-100.0, 100.0)), Some(1.0));
    }

    #[test]
    fn hue_blend_takes_shortest_path() {
        let mut p = params(GradientShape::Linear);
        p.hue_blend = true;
        // Red to magenta (hue 0 -> 5/6) wraps backwards through 11/12.
        p.start_color = [1.0, 0.0, 0.0];
        p.end_color = [1.0, 0.0, 1.0];
        let mid = p.color_at(0.5);
        assert!(close(mid, [1.0, 0.0, 0.5]), "{mid:?}");
    }

    #[test]
    fn paints_rgb_and_keeps_alpha() {
        let mut mesh = quad();
        mesh.layers.create("Col").unwrap().fill([0.0, 0.0, 0.0, 0.3]);

        let painted = paint_gradient(&mut mesh, &Ortho, &params(GradientShape::Linear)).unwrap();
        assert_eq!(painted, 6);

        let layer = mesh.layers.active().unwrap();
        // Vertex 0 at x = 0, vertex 3 at x = 100.
        assert_eq!(layer.get(0), [0.0, 0.0, 0.0, 0.3]);
        assert_eq!(layer.get(5), [1.0, 1.0, 1.0, 0.3]);
    }

    #[test]
    fn vertex_mask_limits_targets() {
        let mut mesh = quad();
        mesh.layers.create("Col").unwrap();
        mesh.mask.vertex = true;
        mesh.select_vertex(0, true);

        let painted = paint_gradient(&mut mesh, &Ortho, &params(GradientShape::Linear)).unwrap();
        assert_eq!(painted, 1);
        assert_eq!(mesh.layers.active().unwrap().get(5), [1.0; 4]);
    }

    #[test]
    fn zero_length_line_is_rejected() {
        let mut mesh = quad();
        mesh.layers.create("Col").unwrap();
        let mut p = params(GradientShape::Linear);
        p.end = p.start;
        assert!(matches!(
            paint_gradient(&mut mesh, &Ortho, &p),
            Err(PaintError::DegenerateGradient)
        ));
    }

    #[test]
    fn axis_snapping() {
        let start = Vec2::new(100.0, 100.0);
        assert_eq!(axis_snap(start, Vec2::new(110.0, 300.0), 20.0), Vec2::new(100.0, 300.0));
        assert_eq!(axis_snap(start, Vec2::new(300.0, 85.0), 20.0), Vec2::new(300.0, 100.0));
        assert_eq!(axis_snap(start, Vec2::new(150.0, 150.0), 20.0), Vec2::new(150.0, 150.0));
    }

    #[test]
    fn modal_flow_paints_once_on_release() {
        let mut mesh = quad();
        mesh.layers.create("Col").unwrap();
        let brush = BrushState::new([1.0, 0.0, 0.0], [0.0, 0.0, 1.0]);
        let mut tool = GradientTool::default();
        let at = |x: f32, y: f32| Vec2::new(x, y);

        let status = tool
            .handle(GradientEvent::Press { cursor: at(0.0, 0.0), shift: false }, &brush, &mut mesh, &Ortho)
            .unwrap();
        assert_eq!(status, ToolStatus::Running);
        assert!(tool.is_drawing());

        // Releasing on the start point keeps the tool alive.
        let status = tool
            .handle(GradientEvent::Release { cursor: at(0.0, 0.0), shift: false }, &brush, &mut mesh, &Ortho)
            .unwrap();
        assert_eq!(status, ToolStatus::Running);

        tool.handle(GradientEvent::Move { cursor: at(100.0, 7.0), shift: true }, &brush, &mut mesh, &Ortho)
            .unwrap();
        let overlay = tool.overlay().unwrap();
        assert_eq!(overlay.line, [at(0.0, 0.0), at(100.0, 0.0)]);
        assert_eq!(overlay.colors, [[1.0, 0.0, 0.0, 1.0], [0.0, 0.0, 1.0, 1.0]]);
        assert!(overlay.circle.is_empty());
        assert_eq!(mesh.layers.active().unwrap().get(0), [1.0; 4]);

        assert_eq!(
            tool.handle(GradientEvent::Navigate, &brush, &mut mesh, &Ortho).unwrap(),
            ToolStatus::PassThrough
        );

        let status = tool
            .handle(GradientEvent::Release { cursor: at(100.0, 7.0), shift: true }, &brush, &mut mesh, &Ortho)
            .unwrap();
        assert_eq!(status, ToolStatus::Finished(6));
        assert!(!tool.is_drawing());

        let layer = mesh.layers.active().unwrap();
        assert_eq!(layer.get(0), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(layer.get(5), [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn cancel_discards_the_line() {
        let mut mesh = quad();
        mesh.layers.create("Col").unwrap();
        let brush = BrushState::default();
        let mut tool = GradientTool::new(GradientSettings {
            shape: GradientShape::Radial,
            hue_blend: false,
        });

        tool.handle(GradientEvent::Press { cursor: Vec2::ZERO, shift: false }, &brush, &mut mesh, &Ortho)
            .unwrap();
        tool.handle(GradientEvent::Move { cursor: Vec2::new(30.0, 40.0), shift: false }, &brush, &mut mesh, &Ortho)
            .unwrap();

        let overlay = tool.overlay().unwrap();
        assert_eq!(overlay.circle.len(), CIRCLE_STEPS + 1);
        assert!((overlay.circle[0] - Vec2::new(50.0, 0.0)).length() < 1e-4);

        let status = tool.handle(GradientEvent::Cancel, &brush, &mut mesh, &Ortho).unwrap();
        assert_eq!(status, ToolStatus::Cancelled);
        assert!(tool.overlay().is_none());
        assert!(mesh.layers.active().unwrap().colors().iter().all(|c| *c == [1.0; 4]));
    }
}
