//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a 64x64x64 cube of voxels together
//! with the mesh derived from it and the pipeline state that says what must
//! happen to it next.
//!
//! ## Concurrency
//!
//! A chunk is shared between the streaming worker, which generates, lights and
//! meshes it, and the render thread, which uploads and draws it. Chunks are
//! handed around as `Arc<Chunk>` and every field is safe to touch from both
//! threads:
//! - `state`, `is_empty` and `buffers_queued` are atomics,
//! - the voxel grid and the mesh live in separate [`MtResource`]s.
//!
//! When both locks are needed, the voxel lock is always taken before the mesh
//! lock.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{RwLockReadGuard, RwLockWriteGuard};

use cgmath::Point3;

use crate::core::MtResource;
use crate::engine_state::rendering::meshing::chunk_mesh::ChunkMesh;

use super::block::{block_light::BlockLight, Block};
use super::bounding_box::BoundingBox;

pub mod chunk_state;
pub mod voxel_grid;

use chunk_state::{ChunkState, ChunkStateCell};
pub use voxel_grid::{block_index, VoxelGrid, CHUNK_SIZE, CHUNK_SIZE_CUBED, CHUNK_SIZE_SQUARED};

/// Process-unique identifier of a chunk, used to key GPU resources.
pub type ChunkId = u64;

static NEXT_CHUNK_ID: AtomicU64 = AtomicU64::new(0);

/// A 64x64x64 collection of voxel blocks in the world.
///
/// Chunks are the fundamental unit of world data. They are created by their
/// [`ChunkColumn`](super::chunk_column::ChunkColumn) and never move.
#[derive(Debug)]
pub struct Chunk {
    id: ChunkId,
    /// The position of this chunk in chunk coordinates (not block coordinates).
    position: Point3<i32>,
    /// The world-space block coordinate of this chunk's (0, 0, 0) voxel.
    world_position: Point3<i32>,
    bounding_box: BoundingBox,
    state: ChunkStateCell,
    is_empty: AtomicBool,
    buffers_queued: AtomicBool,
    voxels: MtResource<VoxelGrid>,
    mesh: MtResource<ChunkMesh>,
}

impl Chunk {
    /// Creates a new chunk of air awaiting generation.
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates of the new chunk
    pub fn new(position: Point3<i32>) -> Self {
        let size = CHUNK_SIZE as i32;
        let world_position = Point3::new(position.x * size, position.y * size, position.z * size);
        let bounding_box = BoundingBox::new(
            world_position,
            Point3::new(
                world_position.x + size,
                world_position.y + size,
                world_position.z + size,
            ),
        );

        Chunk {
            id: NEXT_CHUNK_ID.fetch_add(1, Ordering::Relaxed),
            position,
            world_position,
            bounding_box,
            state: ChunkStateCell::new(ChunkState::AwaitingGeneration),
            is_empty: AtomicBool::new(true),
            buffers_queued: AtomicBool::new(false),
            voxels: MtResource::new(VoxelGrid::new()),
            mesh: MtResource::new(ChunkMesh::default()),
        }
    }

    pub fn id(&self) -> ChunkId {
        self.id
    }

    pub fn position(&self) -> Point3<i32> {
        self.position
    }

    pub fn world_position(&self) -> Point3<i32> {
        self.world_position
    }

    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    /// The current pipeline state.
    pub fn state(&self) -> ChunkState {
        self.state.load()
    }

    /// The atomic cell behind [`Chunk::state`], for pipeline stages.
    pub fn state_cell(&self) -> &ChunkStateCell {
        &self.state
    }

    /// `true` until a non-air block is written. Never becomes `true` again.
    pub fn is_empty(&self) -> bool {
        self.is_empty.load(Ordering::Acquire)
    }

    /// Gets the block at the specified chunk-relative coordinates.
    ///
    /// # Panics
    /// Panics if the coordinates are outside the chunk.
    pub fn get_block(&self, x: usize, y: usize, z: usize) -> Block {
        self.voxels.get().get(x, y, z)
    }

    /// Gets the light at the specified chunk-relative coordinates.
    ///
    /// # Panics
    /// Panics if the coordinates are outside the chunk.
    pub fn get_light(&self, x: usize, y: usize, z: usize) -> BlockLight {
        self.voxels.get().light(x, y, z)
    }

    /// Writes a block and asks for the mesh to be rebuilt.
    ///
    /// The state moves as [`ChunkState::after_edit`] says: chunks that are
    /// not generated or lit yet keep their state, a chunk being lit is lit
    /// again, and removed chunks stay removed.
    ///
    /// # Panics
    /// Panics if the coordinates are outside the chunk.
    pub fn set_block(&self, x: usize, y: usize, z: usize, block: Block) {
        self.edit_voxels(|grid| {
            grid.set(x, y, z, block);
        });
        self.state.request_rebuild();
    }

    /// Read access to the voxel grid.
    pub fn voxels(&self) -> RwLockReadGuard<'_, VoxelGrid> {
        self.voxels.get()
    }

    /// Runs `edit` with exclusive access to the voxel grid and updates
    /// [`Chunk::is_empty`] from the result. Does not touch the pipeline state.
    pub fn edit_voxels<R>(&self, edit: impl FnOnce(&mut VoxelGrid) -> R) -> R {
        let mut grid = self.voxels.get_mut();
        let result = edit(&mut grid);
        if grid.has_blocks() {
            self.is_empty.store(false, Ordering::Release);
        }
        result
    }

    /// Read access to the current mesh.
    pub fn mesh(&self) -> RwLockReadGuard<'_, ChunkMesh> {
        self.mesh.get()
    }

    pub(crate) fn mesh_mut(&self) -> RwLockWriteGuard<'_, ChunkMesh> {
        self.mesh.get_mut()
    }

    /// Marks the chunk as queued for the render thread.
    ///
    /// # Returns
    /// `false` if it was already queued.
    pub(crate) fn try_queue_buffers(&self) -> bool {
        !self.buffers_queued.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn clear_buffers_queued(&self) {
        self.buffers_queued.store(false, Ordering::Release);
    }

    /// Moves the chunk to its terminal state. Every later stage no-ops.
    pub fn mark_for_removal(&self) {
        self.state.store(ChunkState::AwaitingRemoval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;

    #[test]
    fn world_position_and_bounds_follow_chunk_coordinates() {
        let chunk = Chunk::new(Point3::new(-1, 2, 3));
        assert_eq!(chunk.world_position(), Point3::new(-64, 128, 192));
        assert_eq!(chunk.bounding_box().max, Point3::new(0, 192, 256));
        assert_eq!(chunk.state(), ChunkState::AwaitingGeneration);
        assert!(chunk.is_empty());
    }

    #[test]
    fn ids_are_unique() {
        let a = Chunk::new(Point3::new(0, 0, 0));
        let b = Chunk::new(Point3::new(0, 0, 0));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn set_block_only_changes_the_target_voxel() {
        let chunk = Chunk::new(Point3::new(0, 0, 0));
        chunk.set_block(5, 6, 7, Block::new(BlockType::Stone));

        assert_eq!(chunk.get_block(5, 6, 7), Block::new(BlockType::Stone));
        assert_eq!(chunk.get_block(5, 6, 8), Block::AIR);
        assert_eq!(chunk.get_block(7, 6, 5), Block::AIR);
        assert!(!chunk.is_empty());
    }

    #[test]
    fn is_empty_stays_false_after_clearing() {
        let chunk = Chunk::new(Point3::new(0, 0, 0));
        chunk.set_block(0, 0, 0, Block::new(BlockType::Dirt));
        chunk.set_block(0, 0, 0, Block::AIR);
        assert!(!chunk.is_empty());
    }

    #[test]
    fn edits_request_rebuild_only_after_generation() {
        let chunk = Chunk::new(Point3::new(0, 0, 0));
        chunk.set_block(1, 1, 1, Block::new(BlockType::Grass));
        assert_eq!(chunk.state(), ChunkState::AwaitingGeneration);

        chunk.state_cell().store(ChunkState::Ready);
        chunk.set_block(1, 1, 1, Block::AIR);
        assert_eq!(chunk.state(), ChunkState::AwaitingRebuild);

        chunk.mark_for_removal();
        chunk.set_block(1, 1, 1, Block::new(BlockType::Grass));
        assert_eq!(chunk.state(), ChunkState::AwaitingRemoval);
    }

    #[test]
    fn edits_before_or_during_lighting_keep_the_chunk_unlit() {
        let chunk = Chunk::new(Point3::new(0, 0, 0));
        chunk.state_cell().store(ChunkState::AwaitingLighting);
        chunk.set_block(2, 2, 2, Block::new(BlockType::Stone));
        assert_eq!(chunk.state(), ChunkState::AwaitingLighting);

        chunk.state_cell().store(ChunkState::Lighting);
        chunk.set_block(2, 3, 2, Block::new(BlockType::Stone));
        assert_eq!(chunk.state(), ChunkState::AwaitingRelighting);

        chunk.set_block(2, 4, 2, Block::new(BlockType::Stone));
        assert_eq!(chunk.state(), ChunkState::AwaitingRelighting);
    }

    #[test]
    fn buffers_are_queued_once_until_cleared() {
        let chunk = Chunk::new(Point3::new(0, 0, 0));
        assert!(chunk.try_queue_buffers());
        assert!(!chunk.try_queue_buffers());
        chunk.clear_buffers_queued();
        assert!(chunk.try_queue_buffers());
    }
}
