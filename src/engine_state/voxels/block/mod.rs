//! # Block Module
//!
//! This module provides the core block-related functionality for the voxel engine.
//! It includes block type definitions, block face handling, per-voxel light and
//! the block data structure stored in chunks.

use block_type::BlockType;
use phf::phf_map;

pub mod block_light;
pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
/// This is used for efficient storage of block data.
pub type BlockTypeSize = u8;

/// An RGBA color with channels normalized to `0.0..=1.0`.
pub type Color = [f32; 4];

/// Color used for identifiers that have no entry in [`BLOCK_COLORS`].
///
/// Bright magenta makes unmapped blocks obvious in the rendered world
/// instead of failing mesh generation.
pub const ERROR_COLOR: Color = [1.0, 0.0, 1.0, 1.0];

/// Maps each block identifier to its display color.
///
/// Air is fully transparent; it never produces faces, but has an entry so
/// that only genuinely unknown identifiers fall back to [`ERROR_COLOR`].
pub static BLOCK_COLORS: phf::Map<u8, Color> = phf_map! {
    0u8 => [0.0, 0.0, 0.0, 0.0],
    1u8 => [130.0 / 255.0, 133.0 / 255.0, 143.0 / 255.0, 1.0],
    2u8 => [150.0 / 255.0, 103.0 / 255.0, 56.0 / 255.0, 1.0],
    3u8 => [62.0 / 255.0, 129.0 / 255.0, 73.0 / 255.0, 1.0],
};

/// Represents a single voxel block in the world.
///
/// This is a lightweight structure that stores only the block identifier.
/// Two blocks are equal when their identifiers are equal.
///
/// # Memory Layout
/// The `#[repr(C)]` attribute ensures a consistent memory layout so a slice of
/// blocks can be reinterpreted as raw identifiers.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq, Eq, Hash, Default)]
pub struct Block {
    /// The type of this block, encoded as a `BlockTypeSize` for compact storage.
    pub block_type: BlockTypeSize,
}

impl Block {
    /// The empty block.
    pub const AIR: Block = Block { block_type: 0 };

    /// Creates a new block of the specified type.
    pub fn new(block_type: BlockType) -> Self {
        Block {
            block_type: block_type as BlockTypeSize,
        }
    }

    /// Creates a block from a raw identifier, which need not name a known type.
    pub const fn from_id(block_type: BlockTypeSize) -> Self {
        Block { block_type }
    }

    /// Returns `true` if this block is anything other than air.
    pub fn exists(&self) -> bool {
        self.block_type != BlockType::Air as BlockTypeSize
    }

    /// The display color for this block's identifier.
    ///
    /// Unknown identifiers return [`ERROR_COLOR`].
    pub fn color(&self) -> Color {
        BLOCK_COLORS
            .get(&self.block_type)
            .copied()
            .unwrap_or(ERROR_COLOR)
    }
}

impl From<BlockType> for Block {
    fn from(block_type: BlockType) -> Self {
        Block::new(block_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn air_does_not_exist() {
        assert!(!Block::AIR.exists());
        assert!(Block::new(BlockType::Stone).exists());
        assert!(Block::from_id(200).exists());
    }

    #[test]
    fn equality_is_by_identifier() {
        assert_eq!(Block::new(BlockType::Dirt), Block::from_id(2));
        assert_ne!(Block::new(BlockType::Dirt), Block::new(BlockType::Grass));
    }

    #[test]
    fn known_blocks_have_fixed_colors() {
        let stone = Block::new(BlockType::Stone).color();
        assert!((stone[0] - 130.0 / 255.0).abs() < f32::EPSILON);
        assert_eq!(stone[3], 1.0);
        assert_eq!(Block::AIR.color()[3], 0.0);
    }

    #[test]
    fn unknown_blocks_use_error_color() {
        assert_eq!(Block::from_id(77).color(), ERROR_COLOR);
    }
}
