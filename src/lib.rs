#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Streamer
//!
//! A streaming voxel world built with Rust and WGPU.
//!
//! The world is divided into columns of eight 64³ chunks. As the camera moves,
//! columns around it are generated, lit and greedily meshed on a background
//! worker thread, while the render thread uploads finished meshes and draws
//! them. Columns that fall outside the cache window are evicted and their GPU
//! buffers released.
//!
//! ## Key Modules
//!
//! * `core` - Shared-ownership utilities used throughout the engine
//! * `engine_state` - Voxels, the streaming pipeline and the rendering interfaces
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cgmath::Point3;
//! use voxel_streamer::{RecordingBackend, World, WorldConfig};
//!
//! let mut world = World::new(WorldConfig::default(), RecordingBackend::new())?;
//! loop {
//!     world.update(Point3::new(0.0, 80.0, 0.0));
//!     world.draw(|_buffers, _draw| {
//!         // issue draw calls
//!     });
//! }
//! # Ok::<(), voxel_streamer::WorldError>(())
//! ```
//!
//! ## Threads
//!
//! Chunks are shared as `Arc<Chunk>` between the render thread and the
//! worker. Ownership of a chunk's next step is decided by atomic state
//! transitions, so no stage ever runs twice on the same chunk concurrently.

use log::info;

pub mod core;
pub mod engine_state;

pub use engine_state::config::{ConfigError, TerrainConfig, WorldConfig};
pub use engine_state::error::WorldError;
pub use engine_state::rendering::buffers::{
    BufferBackend, RecordingBackend, WgpuBufferBackend, WgpuChunkBuffers,
};
pub use engine_state::rendering::ChunkDraw;
pub use engine_state::voxels::block::{block_type::BlockType, Block};
pub use engine_state::voxels::world::{UpdateReport, World, WorldStats};

/// Initializes `env_logger`, writing to stdout and filtered by `RUST_LOG`.
///
/// Safe to call more than once; only the first call installs the logger.
pub fn init_logging() {
    let mut log_builder = env_logger::Builder::new();
    if log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .try_init()
        .is_ok()
    {
        info!("Logger initialized");
    }
}
