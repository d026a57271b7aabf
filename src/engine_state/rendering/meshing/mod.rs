//! # Meshing Module
//!
//! Turns the voxel grid of a chunk into renderable geometry.
//!
//! ## Key Components
//!
//! * `ChunkMeshBuilder` - The mesh pass as seen by the streaming pipeline
//! * `GreedyMeshBuilder` - The greedy mesher, see [`greedy`]
//! * `ChunkMesh` - The vertex and index lists a pass produces
//!
//! ## State Handling
//!
//! `build` runs only on chunks awaiting their first build and leaves them
//! awaiting buffer generation. `rebuild` runs only on edited chunks and leaves
//! them awaiting a buffer refresh. Chunks without blocks skip the upload and
//! go straight to `Ready` with an empty mesh. If the chunk is edited while the
//! mesh is being built, the closing transition fails and the chunk keeps its
//! rebuild request.

use cgmath::Point3;
use log::debug;
use web_time::Instant;

use crate::engine_state::voxels::chunk::{chunk_state::ChunkState, Chunk, VoxelGrid};

pub mod chunk_mesh;
pub mod greedy;

use chunk_mesh::ChunkMesh;

/// A mesh pass over chunks.
pub trait ChunkMeshBuilder: Send + Sync {
    /// Replaces the contents of `mesh` with the geometry of `grid`, placed at
    /// `world_origin`.
    fn build_mesh(&self, grid: &VoxelGrid, world_origin: Point3<i32>, mesh: &mut ChunkMesh);

    /// Builds the first mesh of a chunk awaiting build.
    ///
    /// # Returns
    /// `false` if the chunk was in any other state and nothing happened.
    fn build(&self, chunk: &Chunk) -> bool {
        run_mesh_pass(
            self,
            chunk,
            ChunkState::AwaitingBuild,
            ChunkState::AwaitingBufferGeneration,
        )
    }

    /// Rebuilds the mesh of an edited chunk.
    ///
    /// # Returns
    /// `false` if the chunk was in any other state and nothing happened.
    fn rebuild(&self, chunk: &Chunk) -> bool {
        run_mesh_pass(
            self,
            chunk,
            ChunkState::AwaitingRebuild,
            ChunkState::AwaitingBufferRefresh,
        )
    }
}

fn run_mesh_pass<B: ChunkMeshBuilder + ?Sized>(
    builder: &B,
    chunk: &Chunk,
    awaiting: ChunkState,
    built: ChunkState,
) -> bool {
    if !chunk.state_cell().transition(awaiting, ChunkState::Building) {
        return false;
    }

    let start = Instant::now();
    let empty = {
        let grid = chunk.voxels();
        let mut mesh = chunk.mesh_mut();
        // Edits take the voxel write lock, so this cannot change under us.
        let empty = chunk.is_empty();
        if empty {
            mesh.clear();
        } else {
            builder.build_mesh(&grid, chunk.world_position(), &mut mesh);
        }
        debug!(
            "Meshed chunk {:?} from {:?}: {} quads in {:?}",
            chunk.position(),
            awaiting,
            mesh.quad_count(),
            start.elapsed()
        );
        empty
    };

    let next = if empty { ChunkState::Ready } else { built };
    chunk.state_cell().transition(ChunkState::Building, next);
    true
}

/// Meshes chunks with [`greedy::build_greedy_mesh`].
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedyMeshBuilder;

impl ChunkMeshBuilder for GreedyMeshBuilder {
    fn build_mesh(&self, grid: &VoxelGrid, world_origin: Point3<i32>, mesh: &mut ChunkMesh) {
        greedy::build_greedy_mesh(grid, world_origin, mesh);
    }
}
