//! # Chunk State Module
//!
//! Every chunk moves through a fixed pipeline:
//!
//! ```text
//! AwaitingGeneration -> Generating -> AwaitingLighting -> Lighting
//!     -> AwaitingBuild -> Building -> AwaitingBufferGeneration
//!     -> GeneratingBuffers -> Ready
//! ```
//!
//! Edits re-enter the pipeline through `AwaitingRebuild -> Building ->
//! AwaitingBufferRefresh -> RefreshingBuffers -> Ready`, and
//! `AwaitingRelighting -> Lighting -> AwaitingRebuild` recomputes light first.
//! `AwaitingRemoval` is terminal.
//!
//! The state is shared between the streaming worker and the render thread, so
//! it lives in an [`ChunkStateCell`] and every stage moves it with a single
//! compare-and-swap. A stage that finds the chunk in any other state than the
//! one it expects does nothing.

use std::sync::atomic::{AtomicU8, Ordering};

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

/// The discrete pipeline stage a chunk currently occupies.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, FromPrimitive)]
#[repr(u8)]
pub enum ChunkState {
    /// Chunk awaits initial generation.
    AwaitingGeneration = 0,
    /// Terrain is being written into the chunk.
    Generating,
    /// Chunk awaits initial lighting.
    AwaitingLighting,
    /// Sunlight is being computed.
    Lighting,
    /// Chunk awaits its first mesh build.
    AwaitingBuild,
    /// The mesh is being built.
    Building,
    /// The mesh is waiting for GPU buffers to be created.
    AwaitingBufferGeneration,
    /// GPU buffers are being created on the render thread.
    GeneratingBuffers,
    /// Chunk can be drawn.
    Ready,
    /// A rebuilt mesh is waiting to be copied into the GPU buffers.
    AwaitingBufferRefresh,
    /// GPU buffers are being refreshed on the render thread.
    RefreshingBuffers,
    /// A block was edited; the mesh must be rebuilt.
    AwaitingRebuild,
    /// Light must be recomputed before the next rebuild.
    AwaitingRelighting,
    /// Chunk is being evicted and must not be processed further.
    AwaitingRemoval,
}

impl ChunkState {
    /// Every state, in declaration order.
    pub const ALL: [ChunkState; 14] = [
        ChunkState::AwaitingGeneration,
        ChunkState::Generating,
        ChunkState::AwaitingLighting,
        ChunkState::Lighting,
        ChunkState::AwaitingBuild,
        ChunkState::Building,
        ChunkState::AwaitingBufferGeneration,
        ChunkState::GeneratingBuffers,
        ChunkState::Ready,
        ChunkState::AwaitingBufferRefresh,
        ChunkState::RefreshingBuffers,
        ChunkState::AwaitingRebuild,
        ChunkState::AwaitingRelighting,
        ChunkState::AwaitingRemoval,
    ];

    /// The state a block edit moves a chunk in this state to, or `None` if
    /// the edit leaves the state alone.
    ///
    /// Chunks that have not been generated or lit yet pick the edit up on
    /// their own. An edit during lighting is relit. Evicted chunks stay
    /// evicted. Everything else is rebuilt.
    pub fn after_edit(self) -> Option<ChunkState> {
        match self {
            ChunkState::AwaitingGeneration
            | ChunkState::Generating
            | ChunkState::AwaitingLighting
            | ChunkState::AwaitingRelighting
            | ChunkState::AwaitingRemoval => None,
            ChunkState::Lighting => Some(ChunkState::AwaitingRelighting),
            _ => Some(ChunkState::AwaitingRebuild),
        }
    }

    /// Whether the chunk is waiting for the render thread to upload its mesh.
    pub fn awaits_buffers(self) -> bool {
        matches!(
            self,
            ChunkState::AwaitingBufferGeneration | ChunkState::AwaitingBufferRefresh
        )
    }
}

/// Atomic storage for a [`ChunkState`].
///
/// Each write is the publication point seen by the other thread. Transitions
/// use compare-and-swap so that a stage never overwrites a state it did not
/// expect, e.g. a rebuild request that arrived while the mesh was building.
#[derive(Debug)]
pub struct ChunkStateCell(AtomicU8);

impl ChunkStateCell {
    pub fn new(state: ChunkState) -> Self {
        ChunkStateCell(AtomicU8::new(state as u8))
    }

    pub fn load(&self) -> ChunkState {
        Self::decode(self.0.load(Ordering::Acquire))
    }

    /// Unconditionally overwrites the state.
    pub fn store(&self, state: ChunkState) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Moves from `from` to `to` if and only if the current state is `from`.
    ///
    /// # Returns
    /// `true` if the transition happened.
    pub fn transition(&self, from: ChunkState, to: ChunkState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Moves to `to` from whichever of `from` the chunk is currently in.
    ///
    /// # Returns
    /// The state the chunk was in, or `None` if it matched none of `from`.
    pub fn transition_from_any(&self, from: &[ChunkState], to: ChunkState) -> Option<ChunkState> {
        self.0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                from.contains(&Self::decode(current)).then_some(to as u8)
            })
            .ok()
            .map(Self::decode)
    }

    /// Applies [`ChunkState::after_edit`] to the current state.
    ///
    /// # Returns
    /// `true` if the state changed.
    pub fn request_rebuild(&self) -> bool {
        self.0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Self::decode(current).after_edit().map(|next| next as u8)
            })
            .is_ok()
    }

    fn decode(value: u8) -> ChunkState {
        ChunkState::from_u8(value).expect("chunk state cell only ever holds valid states")
    }
}
