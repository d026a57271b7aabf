//! CPU-side geometry of a chunk.

use crate::engine_state::rendering::Vertex;

/// Index pattern of a quad: two counter-clockwise triangles over four corners.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

/// The vertex and index lists produced by a mesh pass. Cleared and refilled on
/// every build.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ChunkMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl ChunkMesh {
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Appends a quad given its corners in emission order.
    pub fn push_quad(&mut self, corners: [Vertex; 4]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&corners);
        self.indices.extend(QUAD_INDICES.iter().map(|i| base + i));
    }

    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}
