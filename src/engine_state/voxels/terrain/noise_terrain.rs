use cgmath::Point3;
use noise::{NoiseFn, Perlin};

use crate::engine_state::voxels::block::{block_type::BlockType, Block};
use crate::engine_state::voxels::chunk::{VoxelGrid, CHUNK_SIZE};
use crate::engine_state::voxels::chunk_column::WORLD_HEIGHT;

use super::TerrainGenerator;

/// Thickness of the dirt band below the grass.
pub const DIRT_DEPTH: i32 = 3;

/// Rolling hills sampled from a 2D Perlin heightmap.
///
/// Each (x, z) column gets a surface height of
/// `base_height + round(perlin(x * scale, z * scale) * amplitude)`, clamped
/// to the world. The surface block is grass, the [`DIRT_DEPTH`] blocks below
/// it are dirt and everything further down is stone.
pub struct NoiseTerrain {
    seed: u32,
    perlin: Perlin,
    base_height: i32,
    amplitude: f64,
    scale: f64,
}

impl NoiseTerrain {
    pub fn new(seed: u32, base_height: i32, amplitude: f64, scale: f64) -> Self {
        NoiseTerrain {
            seed,
            perlin: Perlin::new(seed),
            base_height,
            amplitude,
            scale,
        }
    }

    /// The surface height of the world column at (`x`, `z`).
    pub fn height_at(&self, x: i32, z: i32) -> i32 {
        let sample = self
            .perlin
            .get([x as f64 * self.scale, z as f64 * self.scale]);
        let height = self.base_height + (sample * self.amplitude).round() as i32;
        height.clamp(0, WORLD_HEIGHT - 1)
    }

    fn block_at(y: i32, surface: i32) -> Block {
        if y == surface {
            Block::new(BlockType::Grass)
        } else if y < surface && y >= surface - DIRT_DEPTH {
            Block::new(BlockType::Dirt)
        } else if y < surface {
            Block::new(BlockType::Stone)
        } else {
            Block::AIR
        }
    }
}

impl TerrainGenerator for NoiseTerrain {
    fn seed(&self) -> u32 {
        self.seed
    }

    fn generate_terrain(&self, origin: Point3<i32>, grid: &mut VoxelGrid) {
        let size = CHUNK_SIZE as i32;
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                let surface = self.height_at(origin.x + x as i32, origin.z + z as i32);
                if surface < origin.y {
                    continue;
                }
                let top = (surface - origin.y).min(size - 1) as usize;
                for y in 0..=top {
                    grid.set(x, y, z, Self::block_at(origin.y + y as i32, surface));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terrain() -> NoiseTerrain {
        NoiseTerrain::new(42, 32, 12.0, 0.01)
    }

    #[test]
    fn same_seed_same_heights() {
        let a = terrain();
        let b = terrain();
        for (x, z) in [(0, 0), (-300, 17), (1000, -1000)] {
            assert_eq!(a.height_at(x, z), b.height_at(x, z));
        }
    }

    #[test]
    fn heights_stay_near_the_base() {
        let terrain = terrain();
        for x in (-500..500).step_by(37) {
            let height = terrain.height_at(x, x / 3);
            assert!((32 - 12..=32 + 12).contains(&height), "{height}");
        }
    }

    #[test]
    fn columns_are_grass_over_dirt_over_stone() {
        let terrain = terrain();
        let mut grid = VoxelGrid::new();
        terrain.generate_terrain(Point3::new(0, 0, 0), &mut grid);

        let surface = terrain.height_at(10, 20) as usize;
        assert_eq!(grid.get(10, surface, 20), Block::new(BlockType::Grass));
        assert_eq!(grid.get(10, surface - 1, 20), Block::new(BlockType::Dirt));
        assert_eq!(grid.get(10, surface - 3, 20), Block::new(BlockType::Dirt));
        assert_eq!(grid.get(10, surface - 4, 20), Block::new(BlockType::Stone));
        assert_eq!(grid.get(10, surface + 1, 20), Block::AIR);
    }

    #[test]
    fn sky_chunks_stay_empty() {
        let mut grid = VoxelGrid::new();
        terrain().generate_terrain(Point3::new(0, 128, 0), &mut grid);
        assert!(!grid.has_blocks());
    }
}
