//! # Lighting Module
//!
//! Computes per-voxel sunlight for a chunk in two passes:
//!
//! 1. **Seeding**: every voxel column is scanned from the top of the chunk
//!    down. Voxels above the first solid block receive full sun, that block
//!    and everything below it receive none.
//! 2. **Propagation**: sunlight floods sideways and downwards (never up) from
//!    every lit air voxel, losing a tenth of its value per hop, until it drops
//!    to 1 or hits a solid block.
//!
//! Each chunk is lit as if open to the sky. Light never crosses chunk
//! borders.

use std::collections::VecDeque;

use bitvec::prelude::BitVec;
use log::debug;
use web_time::Instant;

use super::block::{
    block_light::{BlockLight, MAX_LIGHT_VALUE},
    Block, BlockTypeSize,
};
use super::chunk::{
    block_index, chunk_state::ChunkState, voxel_grid::index_to_coords, Chunk, VoxelGrid,
    CHUNK_SIZE,
};

/// Stateless sunlight pass over a chunk.
pub struct LightingProcessor;

impl LightingProcessor {
    /// Lights `chunk` if it is awaiting lighting or relighting.
    ///
    /// The chunk is left in `Lighting`; use [`LightingProcessor::finish`] to
    /// advance it.
    ///
    /// # Returns
    /// `false` if the chunk was in any other state and nothing happened.
    pub fn process(chunk: &Chunk) -> bool {
        Self::light(chunk).is_some()
    }

    /// Same as [`LightingProcessor::process`], but reports the state the chunk
    /// was lit from so that the caller can pass it to
    /// [`LightingProcessor::finish`].
    pub fn light(chunk: &Chunk) -> Option<ChunkState> {
        let previous = chunk.state_cell().transition_from_any(
            &[ChunkState::AwaitingLighting, ChunkState::AwaitingRelighting],
            ChunkState::Lighting,
        )?;

        let start = Instant::now();
        chunk.edit_voxels(light_grid);
        debug!("Lit chunk {:?} in {:?}", chunk.position(), start.elapsed());

        Some(previous)
    }

    /// Moves a lit chunk to the stage after lighting: a first build when it
    /// was lit from `AwaitingLighting`, a rebuild when it was relit.
    ///
    /// # Returns
    /// `false` if the chunk is no longer in `Lighting`, e.g. because it was
    /// edited or evicted meanwhile.
    pub fn finish(chunk: &Chunk, lit_from: ChunkState) -> bool {
        let next = match lit_from {
            ChunkState::AwaitingRelighting => ChunkState::AwaitingRebuild,
            _ => ChunkState::AwaitingBuild,
        };
        chunk.state_cell().transition(ChunkState::Lighting, next)
    }
}

/// Recomputes all light in `grid`.
///
/// A grid without blocks gets no light array and reads as full sun.
pub fn light_grid(grid: &mut VoxelGrid) {
    if let Some((blocks, lights)) = grid.blocks_and_lights_mut() {
        let opaque = opacity_mask(blocks);
        seed_sunlight(&opaque, lights);
        propagate_sunlight(&opaque, lights);
    }
    grid.mark_lit();
}

/// One bit per voxel, set where the block stops light.
fn opacity_mask(blocks: &[BlockTypeSize]) -> BitVec {
    blocks.iter().map(|&id| Block::from_id(id).exists()).collect()
}

fn seed_sunlight(opaque: &BitVec, lights: &mut [BlockLight]) {
    for z in 0..CHUNK_SIZE {
        for x in 0..CHUNK_SIZE {
            let mut in_shade = false;
            for y in (0..CHUNK_SIZE).rev() {
                let index = block_index(x, y, z);
                in_shade |= opaque[index];
                lights[index] = if in_shade {
                    BlockLight::DARK
                } else {
                    BlockLight::sun(MAX_LIGHT_VALUE)
                };
            }
        }
    }
}

/// Light passed on by a voxel holding `light`.
#[inline]
pub fn attenuate(light: u8) -> u8 {
    ((light as u16 * 9) / 10) as u8
}

fn propagate_sunlight(opaque: &BitVec, lights: &mut [BlockLight]) {
    let mut queue: VecDeque<usize> = (0..lights.len())
        .filter(|&index| !opaque[index] && lights[index].sun > 1)
        .collect();

    while let Some(index) = queue.pop_front() {
        let propagated = attenuate(lights[index].sun);
        if propagated <= 1 {
            continue;
        }

        let (x, y, z) = index_to_coords(index);
        for neighbour in spread_targets(x, y, z).into_iter().flatten() {
            if opaque[neighbour] || propagated <= lights[neighbour].sun {
                continue;
            }
            lights[neighbour].sun = propagated;
            queue.push_back(neighbour);
        }
    }
}

/// The four horizontal neighbours and the voxel below, where inside the chunk.
fn spread_targets(x: usize, y: usize, z: usize) -> [Option<usize>; 5] {
    let last = CHUNK_SIZE - 1;
    [
        (x < last).then(|| block_index(x + 1, y, z)),
        (x > 0).then(|| block_index(x - 1, y, z)),
        (z < last).then(|| block_index(x, y, z + 1)),
        (z > 0).then(|| block_index(x, y, z - 1)),
        (y > 0).then(|| block_index(x, y - 1, z)),
    ]
}
