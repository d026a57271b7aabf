//! # Block Type Module
//!
//! This module defines the different materials a voxel can be made of.

use super::BlockTypeSize;

/// Enumerates all known block materials in the voxel world.
///
/// The discriminant of each variant is the identifier stored in a chunk's
/// block array. Identifiers that do not name a variant are still valid block
/// values; they render with the error color.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BlockType {
    /// Empty space. Non-solid and transparent.
    Air = 0,

    /// Bedrock-like filler found below the dirt band.
    Stone = 1,

    /// The layer directly below the surface.
    Dirt = 2,

    /// The surface layer.
    Grass = 3,
}
