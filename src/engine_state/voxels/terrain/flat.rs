use cgmath::Point3;

use crate::engine_state::voxels::block::{block_type::BlockType, Block};
use crate::engine_state::voxels::chunk::{VoxelGrid, CHUNK_SIZE};

use super::TerrainGenerator;

/// Highest world Y filled with stone.
pub const STONE_HEIGHT: i32 = 5;
/// Highest world Y filled with dirt.
pub const DIRT_HEIGHT: i32 = STONE_HEIGHT + 3;
/// World Y of the grass layer.
pub const GRASS_HEIGHT: i32 = DIRT_HEIGHT + 1;

/// Infinite flat layers: stone up to y = 5, dirt up to 8 and grass at 9.
///
/// The seed is kept for reporting only.
#[derive(Debug, Clone)]
pub struct FlatTerrain {
    seed: u32,
}

impl FlatTerrain {
    pub fn new(seed: u32) -> Self {
        FlatTerrain { seed }
    }

    /// The block at world height `y`.
    pub fn block_at(y: i32) -> Block {
        if y == GRASS_HEIGHT {
            Block::new(BlockType::Grass)
        } else if y <= DIRT_HEIGHT && y > STONE_HEIGHT {
            Block::new(BlockType::Dirt)
        } else if y <= STONE_HEIGHT {
            Block::new(BlockType::Stone)
        } else {
            Block::AIR
        }
    }
}

impl TerrainGenerator for FlatTerrain {
    fn seed(&self) -> u32 {
        self.seed
    }

    fn generate_terrain(&self, origin: Point3<i32>, grid: &mut VoxelGrid) {
        for y in 0..CHUNK_SIZE {
            let block = Self::block_at(origin.y + y as i32);
            if !block.exists() {
                continue;
            }
            for z in 0..CHUNK_SIZE {
                for x in 0..CHUNK_SIZE {
                    grid.set(x, y, z, block);
                }
            }
        }
    }
}
