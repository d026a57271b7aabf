//! # Engine State Module
//!
//! The streaming engine: voxel data, the background pipeline that processes
//! it, and the rendering interfaces that consume it.
//!
//! ## Key Components
//!
//! * `voxels` - Blocks, chunks, columns, terrain, lighting and the `World`
//! * `rendering` - Greedy meshing, the vertex layout and GPU buffer backends
//! * `task_management` - The streaming pipeline and its worker thread
//! * `config` - `WorldConfig`, loaded from JSON
//! * `error` - `WorldError`
//!
//! ## Threads
//!
//! The render thread owns the `World`, calls `update` and `draw` once per
//! frame and may edit blocks. A single worker thread owns the scanning.
//! Chunks are shared between them as `Arc<Chunk>` and change hands through
//! atomic state transitions.

pub mod config;
pub mod error;
pub mod rendering;
pub mod task_management;
pub mod voxels;
