//! # Terrain Module
//!
//! Terrain generators fill a freshly created chunk with blocks. A generator
//! sees only the chunk's world origin and its own seed, so the same seed
//! always produces the same world regardless of the order chunks stream in.
//!
//! ## Implementations
//! - [`FlatTerrain`]: fixed stone, dirt and grass layers, useful for debugging
//! - [`NoiseTerrain`]: rolling hills from a 2D Perlin heightmap

use cgmath::Point3;
use log::debug;
use web_time::Instant;

use crate::engine_state::config::TerrainConfig;

use super::chunk::{chunk_state::ChunkState, Chunk, VoxelGrid};

pub mod flat;
pub mod noise_terrain;

pub use flat::FlatTerrain;
pub use noise_terrain::NoiseTerrain;

/// Fills chunks with terrain.
pub trait TerrainGenerator: Send + Sync {
    /// The seed this generator was created with.
    fn seed(&self) -> u32;

    /// Writes the terrain for the chunk whose (0, 0, 0) voxel sits at
    /// `origin` into `grid`. The grid starts out as all air.
    fn generate_terrain(&self, origin: Point3<i32>, grid: &mut VoxelGrid);

    /// Generates `chunk` if it is awaiting generation.
    ///
    /// Moves the chunk through `Generating` and leaves it awaiting lighting.
    /// If the chunk was marked for removal meanwhile it stays removed.
    ///
    /// # Returns
    /// `false` if the chunk was in any other state and nothing happened.
    fn generate(&self, chunk: &Chunk) -> bool {
        if !chunk
            .state_cell()
            .transition(ChunkState::AwaitingGeneration, ChunkState::Generating)
        {
            return false;
        }

        let start = Instant::now();
        chunk.edit_voxels(|grid| self.generate_terrain(chunk.world_position(), grid));
        debug!(
            "Generated chunk {:?} in {:?}",
            chunk.position(),
            start.elapsed()
        );

        chunk
            .state_cell()
            .transition(ChunkState::Generating, ChunkState::AwaitingLighting);
        true
    }
}

/// Builds the generator selected by `config`.
pub fn terrain_from_config(config: &TerrainConfig, seed: u32) -> Box<dyn TerrainGenerator> {
    match *config {
        TerrainConfig::Flat => Box::new(FlatTerrain::new(seed)),
        TerrainConfig::Noise {
            base_height,
            amplitude,
            scale,
        } => Box::new(NoiseTerrain::new(seed, base_height, amplitude, scale)),
    }
}
