//! # Rendering Module
//!
//! Everything between a chunk's voxels and a draw call: the mesher, the
//! vertex format and the GPU buffer backends.
//!
//! ## Key Components
//!
//! * `meshing` - Greedy mesh generation from voxel grids
//! * `buffers` - Buffer lifetime behind the `BufferBackend` trait
//! * `Vertex` - The vertex layout shared with the shaders
//! * `ChunkDraw` - Per-chunk parameters handed to the draw callback

use cgmath::{Matrix4, Point3, SquareMatrix};

use crate::engine_state::voxels::chunk::ChunkId;

pub mod buffers;
pub mod meshing;
pub mod vertex;

pub use vertex::Vertex;

/// What a renderer needs to draw one chunk besides its buffers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkDraw {
    pub chunk_id: ChunkId,
    /// Chunk coordinate, for debugging and sorting.
    pub position: Point3<i32>,
    /// Vertices are already in world space, so this is always the identity.
    pub model: Matrix4<f32>,
    pub index_count: u32,
}

impl ChunkDraw {
    pub fn new(chunk_id: ChunkId, position: Point3<i32>, index_count: u32) -> Self {
        ChunkDraw {
            chunk_id,
            position,
            model: Matrix4::identity(),
            index_count,
        }
    }
}
