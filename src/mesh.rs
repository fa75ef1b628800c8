//! Mesh topology as seen by the painting tools.
//!
//! The host editor owns the real mesh; an adapter fills this structure with
//! the parts the painter consumes: vertices (with world-space positions and
//! selection), faces (with selection) and the loops joining them. Colors live
//! per loop in [`ColorLayers`], because a vertex shared by several faces can
//! carry a different color in each of them.

use glam::Vec3;

use crate::error::{PaintError, Result};
use crate::layer::ColorLayers;

/// Index of a loop (one corner of one face).
pub type LoopId = usize;

/// Index of a vertex.
pub type VertexId = usize;

/// Index of a face.
pub type FaceId = usize;

/// Selection masks the host applies while painting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaintMask {
    /// Only loops belonging to selected faces are painted.
    pub face: bool,
    /// Only selected vertices are painted.
    pub vertex: bool,
}

/// A mesh face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Face {
    pub selected: bool,
}

/// A mesh vertex and the loops touching it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Vertex {
    /// World-space position.
    pub position: Vec3,
    pub selected: bool,
    loops: Vec<LoopId>,
}

impl Vertex {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            selected: false,
            loops: Vec::new(),
        }
    }

    /// Loops (face corners) linked to this vertex.
    pub fn loops(&self) -> &[LoopId] {
        &self.loops
    }
}

/// One face corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshLoop {
    pub vertex: VertexId,
    pub face: FaceId,
}

/// Mesh topology plus its color layers.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    faces: Vec<Face>,
    loops: Vec<MeshLoop>,
    /// Per-loop color layers.
    pub layers: ColorLayers,
    /// Active selection masks.
    pub mask: PaintMask,
}

impl Mesh {
    /// Builds a mesh from vertex positions and faces given as vertex indices.
    ///
    /// Every face corner becomes one loop, numbered in face order. The
    /// returned mesh has no color layers yet.
    ///
    /// # Panics
    ///
    /// Panics if a face references a vertex index out of range.
    pub fn from_faces(positions: impl IntoIterator<Item = Vec3>, faces: &[&[VertexId]]) -> Self {
        let mut mesh = Self {
            vertices: positions.into_iter().map(Vertex::new).collect(),
            ..Self::default()
        };
        for corners in faces {
            mesh.push_face(corners);
        }
        mesh.layers = ColorLayers::new(mesh.loops.len());
        mesh
    }

    fn push_face(&mut self, corners: &[VertexId]) {
        let face = self.faces.len();
        self.faces.push(Face::default());
        for &vertex in corners {
            let id = self.loops.len();
            self.loops.push(MeshLoop { vertex, face });
            self.vertices[vertex].loops.push(id);
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id)
    }

    pub fn loop_count(&self) -> usize {
        self.loops.len()
    }

    /// Fails with [`PaintError::LayerSizeMismatch`] when [`Mesh::layers`] was
    /// sized for a different number of loops.
    pub fn check_layers(&self) -> Result<()> {
        let found = self.layers.loop_count();
        if found != self.loops.len() {
            return Err(PaintError::LayerSizeMismatch {
                expected: self.loops.len(),
                found,
            });
        }
        Ok(())
    }

    pub fn mesh_loop(&self, id: LoopId) -> MeshLoop {
        self.loops[id]
    }

    /// Face owning a loop.
    pub fn loop_face(&self, id: LoopId) -> &Face {
        &self.faces[self.loops[id].face]
    }

    pub fn select_vertex(&mut self, id: VertexId, selected: bool) {
        if let Some(vertex) = self.vertices.get_mut(id) {
            vertex.selected = selected;
        }
    }

    pub fn select_face(&mut self, id: FaceId, selected: bool) {
        if let Some(face) = self.faces.get_mut(id) {
            face.selected = selected;
        }
    }

    /// Ids of the currently selected vertices.
    pub fn selected_vertices(&self) -> impl Iterator<Item = VertexId> {
        self.vertices
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.selected.then_some(i))
    }

    /// Loops of a vertex that pass the face mask.
    pub fn masked_loops(&self, vertex: VertexId) -> impl Iterator<Item = LoopId> {
        let face_mask = self.mask.face;
        self.vertices[vertex]
            .loops
            .iter()
            .copied()
            .filter(move |&l| !face_mask || self.loop_face(l).selected)
    }
}

// ============================================================================
// Tests
// ============================================================================
