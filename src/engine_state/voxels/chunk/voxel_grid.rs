//! # Voxel Grid Module
//!
//! Dense storage for the blocks and light of a single chunk.
//!
//! ## Memory Optimization
//!
//! A 64³ chunk holds 262 144 voxels, which is 256 KiB of block identifiers and
//! 1 MiB of light. Most chunks in a streamed world are pure air (everything
//! above the surface), so both arrays are allocated lazily:
//! - the block array on the first non-air write,
//! - the light array on the first lighting pass over a chunk that has blocks.
//!
//! An unallocated block array reads as air everywhere. An unallocated light
//! array reads as darkness before the chunk is lit and as full sun after,
//! because a lit chunk without blocks has nothing to cast shade.

use crate::engine_state::voxels::block::{
    block_light::BlockLight, Block, BlockTypeSize,
};

/// The edge length of a chunk in blocks.
pub const CHUNK_SIZE: usize = 64;
/// The number of blocks in a single 2D plane of a chunk (CHUNK_SIZE²).
pub const CHUNK_SIZE_SQUARED: usize = CHUNK_SIZE * CHUNK_SIZE;
/// The total number of blocks in a chunk (CHUNK_SIZE³).
pub const CHUNK_SIZE_CUBED: usize = CHUNK_SIZE_SQUARED * CHUNK_SIZE;

/// Converts chunk-local coordinates into an index into the block and light
/// arrays. This is the only place the voxel layout is defined.
#[inline]
pub const fn block_index(x: usize, y: usize, z: usize) -> usize {
    x + y * CHUNK_SIZE + z * CHUNK_SIZE_SQUARED
}

/// Inverse of [`block_index`].
#[inline]
pub const fn index_to_coords(index: usize) -> (usize, usize, usize) {
    (
        index % CHUNK_SIZE,
        (index / CHUNK_SIZE) % CHUNK_SIZE,
        index / CHUNK_SIZE_SQUARED,
    )
}

#[inline]
fn assert_in_chunk(x: usize, y: usize, z: usize) {
    assert!(
        x < CHUNK_SIZE && y < CHUNK_SIZE && z < CHUNK_SIZE,
        "voxel ({x}, {y}, {z}) is outside the chunk"
    );
}

/// Block identifiers plus a parallel array of [`BlockLight`].
#[derive(Debug, Default)]
pub struct VoxelGrid {
    blocks: Option<Box<[BlockTypeSize]>>,
    lights: Option<Box<[BlockLight]>>,
    lit: bool,
}

impl VoxelGrid {
    /// Creates a grid that is air everywhere and has not been lit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` once any non-air block has been written.
    pub fn has_blocks(&self) -> bool {
        self.blocks.is_some()
    }

    /// The raw block identifiers, or `None` if the grid has never held a block.
    pub fn blocks(&self) -> Option<&[BlockTypeSize]> {
        self.blocks.as_deref()
    }

    /// Gets the block at the specified chunk-relative coordinates.
    ///
    /// # Panics
    /// Panics if the coordinates are out of bounds.
    pub fn get(&self, x: usize, y: usize, z: usize) -> Block {
        assert_in_chunk(x, y, z);
        self.get_index(block_index(x, y, z))
    }

    /// Gets the block at a flat index produced by [`block_index`].
    pub fn get_index(&self, index: usize) -> Block {
        match &self.blocks {
            Some(blocks) => Block::from_id(blocks[index]),
            None => Block::AIR,
        }
    }

    /// Writes a block at the specified chunk-relative coordinates.
    ///
    /// Writing air into a grid that has never held a block is free.
    ///
    /// # Returns
    /// `true` if a non-air block was written.
    ///
    /// # Panics
    /// Panics if the coordinates are out of bounds.
    pub fn set(&mut self, x: usize, y: usize, z: usize, block: Block) -> bool {
        assert_in_chunk(x, y, z);
        let index = block_index(x, y, z);

        if !block.exists() {
            if let Some(blocks) = &mut self.blocks {
                blocks[index] = block.block_type;
            }
            return false;
        }

        let blocks = self
            .blocks
            .get_or_insert_with(|| vec![Block::AIR.block_type; CHUNK_SIZE_CUBED].into_boxed_slice());
        blocks[index] = block.block_type;
        true
    }

    /// Gets the light at the specified chunk-relative coordinates.
    ///
    /// # Panics
    /// Panics if the coordinates are out of bounds.
    pub fn light(&self, x: usize, y: usize, z: usize) -> BlockLight {
        assert_in_chunk(x, y, z);
        match &self.lights {
            Some(lights) => lights[block_index(x, y, z)],
            None if self.lit => BlockLight::FULL_SUN,
            None => BlockLight::DARK,
        }
    }

    /// Splits the grid into its block identifiers and a mutable light array.
    ///
    /// # Returns
    /// `None` if the grid has never held a block.
    pub fn blocks_and_lights_mut(&mut self) -> Option<(&[BlockTypeSize], &mut [BlockLight])> {
        let blocks = self.blocks.as_deref()?;
        let lights = self
            .lights
            .get_or_insert_with(|| vec![BlockLight::DARK; CHUNK_SIZE_CUBED].into_boxed_slice());
        Some((blocks, lights))
    }

    /// Records that the lighting pass has run over this grid.
    pub fn mark_lit(&mut self) {
        self.lit = true;
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}
