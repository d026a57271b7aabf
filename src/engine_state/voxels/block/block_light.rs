/// Maximum light value a voxel can hold. Sunlit open air starts here.
pub const MAX_LIGHT_VALUE: u8 = 16;

/// Per-voxel light, stored in a chunk's light array parallel to its blocks.
///
/// Only the sun channel is written by the lighting pass; the color channels
/// are reset to zero and reserved for colored light sources.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlockLight {
    pub sun: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl BlockLight {
    /// A light value with only the sun channel set.
    pub const fn sun(sun: u8) -> Self {
        BlockLight { sun, r: 0, g: 0, b: 0 }
    }

    /// Full, unobstructed sunlight.
    pub const FULL_SUN: BlockLight = BlockLight::sun(MAX_LIGHT_VALUE);

    /// No light at all.
    pub const DARK: BlockLight = BlockLight::sun(0);
}
