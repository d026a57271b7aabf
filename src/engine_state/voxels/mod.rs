//! # Voxels Module
//!
//! This module contains the voxel data model and the stages that fill it,
//! from individual blocks up to the streamed world.
//!
//! ## Architecture
//!
//! The voxel system is organized into several key components:
//!
//! * **Block**: Block identifiers, colors, light and face directions
//! * **Chunk**: 64³ voxel grids with their mesh and pipeline state
//! * **Chunk Column**: 8 chunks stacked vertically, the unit of streaming
//! * **Terrain**: Pluggable generators that fill new chunks
//! * **Lighting**: Sunlight seeding and flood fill
//! * **World**: The render thread's handle on the streamed world
//!
//! ## Data Flow
//!
//! 1. Columns are created when they enter the cache window
//! 2. Terrain generation fills their chunks
//! 3. Chunks in the view window are lit and meshed
//! 4. Meshes are uploaded by the render thread and drawn
//! 5. Edits send chunks back to step 3
//! 6. Columns leaving the cache window are evicted and their buffers freed

pub mod block;
pub mod bounding_box;
pub mod chunk;
pub mod chunk_column;
pub mod lighting;
pub mod terrain;
pub mod world;
