//! alpha-paint: channel-isolated vertex color painting
//!
//! This crate manipulates per-loop RGBA color layers of a mesh whose channels
//! encode shading parameters: R is ambient occlusion, G shadow smoothing,
//! B outline depth and A outline thickness. It lets a host editor paint those
//! channels one (or a few) at a time, blend layers into each other, and run a
//! handful of painting tools.
//!
//! # Example
//!
//! ```
//! use alpha_paint::{BlendMode, BlendTransfer, Channel, IsolationMode, Mesh, isolation, transfer};
//! use glam::Vec3;
//!
//! let mut mesh = Mesh::from_faces([Vec3::ZERO, Vec3::X, Vec3::Y], &[&[0, 1, 2]]);
//! mesh.layers.create("Col").unwrap().fill([1.0, 0.5, 0.5, 0.5]);
//! mesh.layers.create("AO").unwrap().fill([0.2, 0.2, 0.2, 1.0]);
//!
//! // Show the occlusion channel on its own.
//! let outcome = isolation::isolate(&mut mesh.layers, IsolationMode::Mono, Channel::Red).unwrap();
//! let view = outcome.active_layer();
//! assert_eq!(view, "Col_viewLayer_generated_0");
//!
//! // Multiply the baked occlusion into it.
//! let op = BlendTransfer::new("AO", view, BlendMode::Multiply);
//! transfer(&mut mesh.layers, &op).unwrap();
//!
//! // Write it back.
//! isolation::reconcile(&mut mesh.layers).unwrap();
//! let color = mesh.layers.get("Col").unwrap().get(0);
//! assert!((color[0] - 0.2).abs() < 1e-6);
//! assert_eq!(&color[1..], &[0.5, 0.5, 0.5]);
//! ```
//!
//! # Serializable Profiles
//!
//! Session settings round-trip through [`PaintProfile`] with the
//! [`Configurable`] trait:
//!
//! ```
//! use alpha_paint::{Configurable, IsolationMode, PaintProfile, PaintSession};
//!
//! let mut session = PaintSession::new();
//! session.apply_profile(&PaintProfile::new().with_isolation_mode(IsolationMode::Multi));
//!
//! let json = session.export_profile().to_json().unwrap();
//! assert!(json.contains("\"multi\""));
//! ```

pub mod blend;
pub mod color;
mod error;
pub mod isolation;
mod layer;
mod mesh;
mod profile;
mod session;
pub mod tools;

pub use blend::{BlendMode, BlendTransfer, transfer};
pub use color::{Channel, ChannelSet, Rgb, Rgba};
pub use error::{PaintError, Result};
pub use isolation::{Isolation, IsolationMode, Outcome, SEPARATOR};
pub use layer::{ColorLayer, ColorLayers};
pub use mesh::{Face, FaceId, LoopId, Mesh, MeshLoop, PaintMask, Vertex, VertexId};
pub use profile::{
    GradientSettings, PaintProfile, SelectMode, SelectionSettings, TransferSettings,
};
pub use session::{Configurable, PaintSession};
pub use tools::{
    BrushState, GradientEvent, GradientOverlay, GradientParams, GradientShape, GradientTool,
    Palette, PaletteLibrary, ToolStatus, Viewport,
};
