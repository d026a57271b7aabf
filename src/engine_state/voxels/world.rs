//! # World Module
//!
//! This module provides the `World` struct, the render thread's view of the
//! streamed voxel world.
//!
//! ## Architecture
//!
//! The world owns a [`StreamingPipeline`] shared with one background
//! [`StreamingWorker`]. The worker creates, generates, lights, meshes and
//! evicts chunks. The world owns everything that must stay on the render
//! thread:
//! - the [`BufferBackend`] and the GPU buffers of every chunk, keyed by chunk id
//! - the receiving ends of the hand-off queue and the eviction queue
//!
//! ## Frame Loop
//!
//! Call [`World::update`] with the camera position, then [`World::draw`], once
//! per frame. `update` re-centers the view and cache windows, uploads the
//! meshes the worker finished, frees the buffers of evicted chunks and starts
//! the worker on the first call.
//!
//! ## Coordinates
//!
//! Block coordinates are global. Negative coordinates are floor-divided into
//! columns, so block x = -1 lives in column x = -1 at local x = 63.

use std::collections::{BTreeMap, HashMap};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use cgmath::{Point2, Point3};
use log::{debug, info};

use crate::engine_state::config::WorldConfig;
use crate::engine_state::error::WorldError;
use crate::engine_state::rendering::buffers::BufferBackend;
use crate::engine_state::rendering::meshing::{ChunkMeshBuilder, GreedyMeshBuilder};
use crate::engine_state::rendering::ChunkDraw;
use crate::engine_state::task_management::pipeline::{StreamingPipeline, StreamingWindows};
use crate::engine_state::task_management::StreamingWorker;

use super::block::Block;
use super::chunk::{chunk_state::ChunkState, Chunk, ChunkId, CHUNK_SIZE};
use super::chunk_column::{ChunkColumn, ColumnCoord, WORLD_HEIGHT};
use super::terrain::{terrain_from_config, TerrainGenerator};

/// What one [`World::drain_queues`] call did on the render thread.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UpdateReport {
    pub buffers_created: usize,
    pub buffers_refreshed: usize,
    pub buffers_deleted: usize,
    /// Handed-off chunks that had moved on (edited or evicted) by the time
    /// they were popped.
    pub skipped: usize,
}

/// A snapshot of the world for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldStats {
    pub center: ColumnCoord,
    pub columns: usize,
    pub chunks: usize,
    pub states: BTreeMap<ChunkState, usize>,
    pub non_empty_chunks: usize,
    pub buffers: usize,
    pub drawn_last_frame: usize,
}

impl WorldStats {
    pub fn count(&self, state: ChunkState) -> usize {
        self.states.get(&state).copied().unwrap_or(0)
    }
}

/// A streamed, infinite voxel world.
pub struct World<B: BufferBackend> {
    config: WorldConfig,
    pipeline: Arc<StreamingPipeline>,
    buffer_receiver: Receiver<Arc<Chunk>>,
    eviction_receiver: Receiver<ChunkId>,
    worker: Option<StreamingWorker>,
    backend: B,
    buffers: HashMap<ChunkId, B::Buffers>,
    drawn_last_frame: usize,
}

/// The column containing the camera.
pub fn camera_column(camera_position: Point3<f32>) -> ColumnCoord {
    let size = CHUNK_SIZE as f32;
    Point2::new(
        (camera_position.x / size).floor() as i32,
        (camera_position.z / size).floor() as i32,
    )
}

impl<B: BufferBackend> World<B> {
    /// Creates a world with the terrain selected in `config` and the greedy
    /// mesher.
    ///
    /// # Errors
    /// Returns [`WorldError::Config`] if the configuration is invalid.
    pub fn new(config: WorldConfig, backend: B) -> Result<Self, WorldError> {
        config.validate()?;
        let seed = config.resolve_seed();
        let generator = terrain_from_config(&config.terrain, seed);
        Self::with_strategies(config, backend, generator, Box::new(GreedyMeshBuilder))
    }

    /// Creates a world with a custom terrain generator and mesh builder.
    ///
    /// # Errors
    /// Returns [`WorldError::Config`] if the configuration is invalid.
    pub fn with_strategies(
        config: WorldConfig,
        backend: B,
        generator: Box<dyn TerrainGenerator>,
        mesh_builder: Box<dyn ChunkMeshBuilder>,
    ) -> Result<Self, WorldError> {
        config.validate()?;
        info!(
            "Creating world: view range {}, cache range {}, seed {}",
            config.view_range,
            config.cache_range,
            generator.seed()
        );

        let (pipeline, receivers) = StreamingPipeline::new(
            StreamingWindows::new(Point2::new(0, 0), config.view_range, config.cache_range),
            generator,
            mesh_builder,
            config.max_chunk_operations_per_tick,
            config.buffer_queue_capacity,
        );

        Ok(World {
            config,
            pipeline: Arc::new(pipeline),
            buffer_receiver: receivers.buffers,
            eviction_receiver: receivers.evictions,
            worker: None,
            backend,
            buffers: HashMap::new(),
            drawn_last_frame: 0,
        })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &StreamingPipeline {
        &self.pipeline
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The GPU buffers owned for a chunk, if any.
    pub fn buffers(&self, chunk_id: ChunkId) -> Option<&B::Buffers> {
        self.buffers.get(&chunk_id)
    }

    pub fn is_worker_running(&self) -> bool {
        self.worker.as_ref().is_some_and(StreamingWorker::is_running)
    }

    /// Per-frame update. Call once per frame from the render thread.
    ///
    /// # Panics
    /// Panics if the worker thread cannot be spawned.
    pub fn update(&mut self, camera_position: Point3<f32>) -> UpdateReport {
        self.move_camera(camera_position);
        let report = self.drain_queues();

        if self.worker.is_none() {
            self.worker = Some(StreamingWorker::spawn(
                self.pipeline.clone(),
                self.config.tick_interval(),
            ));
        }

        report
    }

    /// Re-centers the windows on the camera column and wakes the worker if
    /// that column changed.
    ///
    /// # Returns
    /// `true` if the camera entered a new column.
    pub fn move_camera(&mut self, camera_position: Point3<f32>) -> bool {
        let center = camera_column(camera_position);
        if self.pipeline.windows().center == center {
            return false;
        }

        debug!("Camera entered column {center:?}");
        self.pipeline.set_windows(StreamingWindows::new(
            center,
            self.config.view_range,
            self.config.cache_range,
        ));
        self.wake_worker();
        true
    }

    /// Uploads the meshes handed off by the worker and frees the buffers of
    /// evicted chunks.
    pub fn drain_queues(&mut self) -> UpdateReport {
        let mut report = UpdateReport::default();

        while let Ok(chunk) = self.buffer_receiver.try_recv() {
            chunk.clear_buffers_queued();
            if self.generate_buffers(&chunk) {
                report.buffers_created += 1;
            } else if self.refresh_buffers(&chunk) {
                report.buffers_refreshed += 1;
            } else {
                report.skipped += 1;
            }
        }

        while let Ok(chunk_id) = self.eviction_receiver.try_recv() {
            if let Some(buffers) = self.buffers.remove(&chunk_id) {
                self.backend.delete_buffers(buffers);
                report.buffers_deleted += 1;
            }
        }

        report
    }

    /// Creates the buffers of a chunk awaiting buffer generation.
    ///
    /// # Returns
    /// `false` if the chunk was in any other state.
    pub fn generate_buffers(&mut self, chunk: &Chunk) -> bool {
        let cell = chunk.state_cell();
        if !cell.transition(ChunkState::AwaitingBufferGeneration, ChunkState::GeneratingBuffers) {
            return false;
        }

        let buffers = self.backend.create_buffers(&chunk.mesh());
        if let Some(stale) = self.buffers.insert(chunk.id(), buffers) {
            self.backend.delete_buffers(stale);
        }

        cell.transition(ChunkState::GeneratingBuffers, ChunkState::Ready);
        true
    }

    /// Copies a rebuilt mesh into the chunk's buffers, creating them if the
    /// chunk has none yet.
    ///
    /// # Returns
    /// `false` if the chunk was not awaiting a buffer refresh.
    pub fn refresh_buffers(&mut self, chunk: &Chunk) -> bool {
        let cell = chunk.state_cell();
        if !cell.transition(ChunkState::AwaitingBufferRefresh, ChunkState::RefreshingBuffers) {
            return false;
        }

        {
            let mesh = chunk.mesh();
            match self.buffers.get_mut(&chunk.id()) {
                Some(buffers) => self.backend.refresh_buffers(buffers, &mesh),
                None => {
                    let buffers = self.backend.create_buffers(&mesh);
                    self.buffers.insert(chunk.id(), buffers);
                }
            }
        }

        cell.transition(ChunkState::RefreshingBuffers, ChunkState::Ready);
        true
    }

    /// Calls `draw_chunk` for every ready chunk in the view window that has
    /// geometry and buffers.
    ///
    /// # Returns
    /// The number of chunks drawn.
    pub fn draw<F>(&mut self, mut draw_chunk: F) -> usize
    where
        F: FnMut(&B::Buffers, &ChunkDraw),
    {
        let view = self.pipeline.windows().view;
        let mut drawn = 0;

        for column in self.pipeline.columns_snapshot() {
            for chunk in column.chunks() {
                if chunk.state() != ChunkState::Ready
                    || chunk.is_empty()
                    || !chunk.bounding_box().intersects(&view)
                {
                    continue;
                }
                let Some(buffers) = self.buffers.get(&chunk.id()) else {
                    continue;
                };
                let index_count = chunk.mesh().index_count();
                if index_count == 0 {
                    continue;
                }

                draw_chunk(
                    buffers,
                    &ChunkDraw::new(chunk.id(), chunk.position(), index_count),
                );
                drawn += 1;
            }
        }

        self.drawn_last_frame = drawn;
        drawn
    }

    /// Gets the block at global block coordinates.
    ///
    /// # Errors
    /// [`WorldError::OutOfBounds`] if `y` is outside the world height,
    /// [`WorldError::ColumnNotLoaded`] if the column is not streamed in.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Result<Block, WorldError> {
        let (column, local_x, local_z) = self.locate(x, y, z)?;
        column.get_block(local_x, y, local_z)
    }

    /// Sets the block at global block coordinates and schedules the affected
    /// chunk for a rebuild, or for relighting first when `relight_on_edit` is
    /// set.
    ///
    /// # Errors
    /// Same as [`World::get_block`].
    pub fn set_block(&self, x: i32, y: i32, z: i32, block: Block) -> Result<(), WorldError> {
        let (column, local_x, local_z) = self.locate(x, y, z)?;
        let chunk = column.set_block(local_x, y, local_z, block)?;

        if self.config.relight_on_edit {
            chunk
                .state_cell()
                .transition(ChunkState::AwaitingRebuild, ChunkState::AwaitingRelighting);
        }
        self.wake_worker();
        Ok(())
    }

    fn locate(&self, x: i32, y: i32, z: i32) -> Result<(Arc<ChunkColumn>, i32, i32), WorldError> {
        if !(0..WORLD_HEIGHT).contains(&y) {
            return Err(WorldError::OutOfBounds(Point3::new(x, y, z)));
        }

        let size = CHUNK_SIZE as i32;
        let coord = Point2::new(x.div_euclid(size), z.div_euclid(size));
        let column = self
            .pipeline
            .column(coord)
            .ok_or(WorldError::ColumnNotLoaded(coord))?;

        Ok((column, x.rem_euclid(size), z.rem_euclid(size)))
    }

    fn wake_worker(&self) {
        if let Some(worker) = &self.worker {
            worker.wake();
        }
    }

    /// Counts chunks per state.
    pub fn stats(&self) -> WorldStats {
        let columns = self.pipeline.columns_snapshot();
        let mut stats = WorldStats {
            center: self.pipeline.windows().center,
            columns: columns.len(),
            chunks: 0,
            states: BTreeMap::new(),
            non_empty_chunks: 0,
            buffers: self.buffers.len(),
            drawn_last_frame: self.drawn_last_frame,
        };

        for chunk in columns.iter().flat_map(|column| column.chunks().iter()) {
            stats.chunks += 1;
            *stats.states.entry(chunk.state()).or_insert(0) += 1;
            if !chunk.is_empty() {
                stats.non_empty_chunks += 1;
            }
        }

        stats
    }
}

impl<B: BufferBackend> Drop for World<B> {
    fn drop(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            worker.shutdown();
        }
        for (_, buffers) in self.buffers.drain() {
            self.backend.delete_buffers(buffers);
        }
    }
}
