//! # Streaming Pipeline
//!
//! One scan of the streaming pipeline does two things:
//!
//! 1. **Sync columns**: creates every missing column inside the cache window
//!    and evicts every column that left it. Evicted chunks are marked
//!    `AwaitingRemoval` and their ids are sent to the render thread, which
//!    frees their GPU buffers.
//! 2. **Process chunks**: walks the loaded chunks, nearest columns first.
//!    Chunks inside the view window advance one pipeline stage (generate,
//!    light, build, rebuild, or queue for the render thread). Chunks that are
//!    only inside the cache window are generated and nothing else.
//!
//! At most `max_chunk_operations_per_tick` generate, light and mesh operations
//! run per scan. A scan that hits the limit says so in its [`ScanReport`], so
//! the worker can scan again without sleeping.

use std::collections::HashMap;
use std::sync::mpsc::{channel, sync_channel, Receiver, Sender, SyncSender, TrySendError};
use std::sync::Arc;

use cgmath::{Point2, Point3};
use log::{info, warn};

use crate::core::MtResource;
use crate::engine_state::rendering::meshing::ChunkMeshBuilder;
use crate::engine_state::voxels::{
    bounding_box::BoundingBox,
    chunk::{chunk_state::ChunkState, Chunk, ChunkId, CHUNK_SIZE},
    chunk_column::{ChunkColumn, ColumnCoord, WORLD_HEIGHT},
    lighting::LightingProcessor,
    terrain::TerrainGenerator,
};

/// The loaded columns, keyed by column coordinate.
pub type ColumnMap = HashMap<ColumnCoord, Arc<ChunkColumn>>;

/// The view and cache boxes around the camera column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamingWindows {
    pub center: ColumnCoord,
    pub view_range: u32,
    pub cache_range: u32,
    pub view: BoundingBox,
    pub cache: BoundingBox,
}

impl StreamingWindows {
    pub fn new(center: ColumnCoord, view_range: u32, cache_range: u32) -> Self {
        StreamingWindows {
            center,
            view_range,
            cache_range,
            view: Self::window_box(center, view_range),
            cache: Self::window_box(center, cache_range),
        }
    }

    /// The box covering columns `center - range ..= center + range` on both
    /// horizontal axes and the full world height.
    pub fn window_box(center: ColumnCoord, range: u32) -> BoundingBox {
        let size = CHUNK_SIZE as i32;
        let range = range as i32;
        BoundingBox::new(
            Point3::new((center.x - range) * size, 0, (center.y - range) * size),
            Point3::new(
                (center.x + range + 1) * size,
                WORLD_HEIGHT,
                (center.y + range + 1) * size,
            ),
        )
    }

    /// Every column coordinate inside the cache window.
    pub fn cache_columns(&self) -> impl Iterator<Item = ColumnCoord> {
        let range = self.cache_range as i32;
        let center = self.center;
        (center.x - range..=center.x + range).flat_map(move |x| {
            (center.y - range..=center.y + range).map(move |z| Point2::new(x, z))
        })
    }

    /// Chebyshev distance in columns from the camera column.
    pub fn distance(&self, coord: ColumnCoord) -> u32 {
        (coord.x - self.center.x)
            .unsigned_abs()
            .max((coord.y - self.center.y).unsigned_abs())
    }
}

/// What one scan did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub created_columns: usize,
    pub evicted_columns: usize,
    pub generated: usize,
    pub lit: usize,
    pub built: usize,
    pub rebuilt: usize,
    /// Chunks handed to the render thread.
    pub queued: usize,
    /// Chunks left for a later scan because the hand-off queue was full.
    pub deferred: usize,
    /// The scan stopped early because the operation budget ran out.
    pub budget_exhausted: bool,
}

impl ScanReport {
    /// Generate, light and mesh operations performed.
    pub fn operations(&self) -> usize {
        self.generated + self.lit + self.built + self.rebuilt
    }
}

/// The receiving ends the render thread drains.
#[derive(Debug)]
pub struct PipelineReceivers {
    /// Chunks whose mesh is waiting for GPU buffers.
    pub buffers: Receiver<Arc<Chunk>>,
    /// Ids of evicted chunks whose GPU buffers must be freed.
    pub evictions: Receiver<ChunkId>,
}

/// Drives every loaded chunk through its pipeline.
pub struct StreamingPipeline {
    columns: MtResource<ColumnMap>,
    windows: MtResource<StreamingWindows>,
    generator: Box<dyn TerrainGenerator>,
    mesh_builder: Box<dyn ChunkMeshBuilder>,
    max_operations: usize,
    buffer_sender: SyncSender<Arc<Chunk>>,
    eviction_sender: Sender<ChunkId>,
}

impl StreamingPipeline {
    /// Creates a pipeline with windows centered on column (0, 0).
    ///
    /// # Arguments
    /// * `windows` - The initial view and cache windows
    /// * `generator` - Fills new chunks with terrain
    /// * `mesh_builder` - Builds chunk meshes
    /// * `max_operations` - Generate, light and mesh operations per scan
    /// * `queue_capacity` - Capacity of the hand-off queue to the render thread
    pub fn new(
        windows: StreamingWindows,
        generator: Box<dyn TerrainGenerator>,
        mesh_builder: Box<dyn ChunkMeshBuilder>,
        max_operations: usize,
        queue_capacity: usize,
    ) -> (Self, PipelineReceivers) {
        let (buffer_sender, buffers) = sync_channel(queue_capacity);
        let (eviction_sender, evictions) = channel();

        let pipeline = StreamingPipeline {
            columns: MtResource::new(HashMap::new()),
            windows: MtResource::new(windows),
            generator,
            mesh_builder,
            max_operations,
            buffer_sender,
            eviction_sender,
        };

        (pipeline, PipelineReceivers { buffers, evictions })
    }

    pub fn windows(&self) -> StreamingWindows {
        *self.windows.get()
    }

    /// Re-centers the windows. Takes effect on the next scan.
    pub fn set_windows(&self, windows: StreamingWindows) {
        *self.windows.get_mut() = windows;
    }

    /// Looks up a loaded column.
    pub fn column(&self, coord: ColumnCoord) -> Option<Arc<ChunkColumn>> {
        self.columns.get().get(&coord).cloned()
    }

    /// The loaded columns at this moment. The map lock is released on return.
    pub fn columns_snapshot(&self) -> Vec<Arc<ChunkColumn>> {
        self.columns.get().values().cloned().collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.get().len()
    }

    /// Runs one budgeted pass over the world.
    pub fn scan(&self) -> ScanReport {
        let windows = self.windows();
        let mut report = ScanReport::default();

        self.sync_columns(&windows, &mut report);

        let mut columns = self.columns_snapshot();
        columns.sort_by_key(|column| windows.distance(column.coord()));

        'columns: for column in &columns {
            for chunk in column.chunks() {
                if report.operations() >= self.max_operations {
                    report.budget_exhausted = true;
                    break 'columns;
                }

                let bounds = chunk.bounding_box();
                if bounds.intersects(&windows.view) {
                    self.advance_in_view(chunk, &mut report);
                } else if bounds.intersects(&windows.cache) && self.generator.generate(chunk) {
                    report.generated += 1;
                }
            }
        }

        if report.deferred > 0 {
            warn!(
                "Hand-off queue full, deferred {} chunks to the next scan",
                report.deferred
            );
        }

        report
    }

    /// Creates the columns that entered the cache window and evicts the ones
    /// that left it.
    pub fn sync_columns(&self, windows: &StreamingWindows, report: &mut ScanReport) {
        let mut columns = self.columns.get_mut();

        for coord in windows.cache_columns() {
            columns.entry(coord).or_insert_with(|| {
                report.created_columns += 1;
                Arc::new(ChunkColumn::new(coord))
            });
        }

        let leaving: Vec<ColumnCoord> = columns
            .iter()
            .filter(|(_, column)| !column.bounding_box().intersects(&windows.cache))
            .map(|(coord, _)| *coord)
            .collect();

        for coord in leaving {
            let Some(column) = columns.remove(&coord) else {
                continue;
            };
            for chunk in column.chunks() {
                chunk.mark_for_removal();
                // The render thread may be gone during shutdown.
                let _ = self.eviction_sender.send(chunk.id());
            }
            report.evicted_columns += 1;
        }

        if report.created_columns > 0 || report.evicted_columns > 0 {
            info!(
                "Columns around {:?}: {} created, {} evicted, {} loaded",
                windows.center,
                report.created_columns,
                report.evicted_columns,
                columns.len()
            );
        }
    }

    fn advance_in_view(&self, chunk: &Arc<Chunk>, report: &mut ScanReport) {
        match chunk.state() {
            ChunkState::AwaitingGeneration => {
                if self.generator.generate(chunk) {
                    report.generated += 1;
                }
            }
            ChunkState::AwaitingLighting | ChunkState::AwaitingRelighting => {
                if let Some(lit_from) = LightingProcessor::light(chunk) {
                    LightingProcessor::finish(chunk, lit_from);
                    report.lit += 1;
                }
            }
            ChunkState::AwaitingBuild => {
                if self.mesh_builder.build(chunk) {
                    report.built += 1;
                }
            }
            ChunkState::AwaitingRebuild => {
                if self.mesh_builder.rebuild(chunk) {
                    report.rebuilt += 1;
                }
            }
            state if state.awaits_buffers() => self.queue_for_buffers(chunk, report),
            _ => {}
        }
    }

    /// Hands `chunk` to the render thread unless it is already queued.
    fn queue_for_buffers(&self, chunk: &Arc<Chunk>, report: &mut ScanReport) {
        if !chunk.try_queue_buffers() {
            return;
        }

        match self.buffer_sender.try_send(chunk.clone()) {
            Ok(()) => report.queued += 1,
            Err(TrySendError::Full(_)) => {
                chunk.clear_buffers_queued();
                report.deferred += 1;
            }
            Err(TrySendError::Disconnected(_)) => chunk.clear_buffers_queued(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::rendering::meshing::GreedyMeshBuilder;
    use crate::engine_state::voxels::terrain::FlatTerrain;

    fn pipeline(
        center: ColumnCoord,
        view: u32,
        cache: u32,
        budget: usize,
        capacity: usize,
    ) -> (StreamingPipeline, PipelineReceivers) {
        StreamingPipeline::new(
            StreamingWindows::new(center, view, cache),
            Box::new(FlatTerrain::new(0)),
            Box::new(GreedyMeshBuilder),
            budget,
            capacity,
        )
    }

    #[test]
    fn window_spans_inclusive_column_range() {
        let windows = StreamingWindows::new(Point2::new(1, -1), 2, 3);
        assert_eq!(windows.view.min, Point3::new(-64, 0, -192));
        assert_eq!(windows.view.max, Point3::new(256, 512, 128));
        assert_eq!(windows.cache_columns().count(), 49);
        assert!(windows.cache_columns().all(|c| windows.distance(c) <= 3));
    }

    #[test]
    fn only_columns_inside_the_window_intersect_it() {
        let windows = StreamingWindows::new(Point2::new(0, 0), 2, 3);
        let inside = ChunkColumn::new(Point2::new(3, -3));
        let outside = ChunkColumn::new(Point2::new(4, 0));
        assert!(inside.bounding_box().intersects(&windows.cache));
        assert!(!outside.bounding_box().intersects(&windows.cache));
        assert!(!inside.bounding_box().intersects(&windows.view));
    }

    #[test]
    fn sync_creates_and_evicts_columns() {
        let (pipeline, receivers) = pipeline(Point2::new(0, 0), 0, 1, 8, 4);
        let mut report = ScanReport::default();
        pipeline.sync_columns(&pipeline.windows(), &mut report);
        assert_eq!(report.created_columns, 9);
        assert_eq!(pipeline.column_count(), 9);

        let evicted_column = pipeline.column(Point2::new(-1, 0)).unwrap();
        let moved = StreamingWindows::new(Point2::new(2, 0), 0, 1);
        pipeline.set_windows(moved);
        let mut report = ScanReport::default();
        pipeline.sync_columns(&moved, &mut report);

        assert_eq!(report.evicted_columns, 6);
        assert_eq!(report.created_columns, 6);
        assert_eq!(pipeline.column_count(), 9);
        assert!(evicted_column
            .chunks()
            .iter()
            .all(|chunk| chunk.state() == ChunkState::AwaitingRemoval));
        assert_eq!(receivers.evictions.try_iter().count(), 6 * 8);
    }

    #[test]
    fn cache_only_chunks_are_generated_but_not_lit() {
        let (pipeline, _receivers) = pipeline(Point2::new(0, 0), 0, 1, usize::MAX, 64);
        for _ in 0..4 {
            pipeline.scan();
        }

        let cached = pipeline.column(Point2::new(1, 1)).unwrap();
        assert!(cached
            .chunks()
            .iter()
            .all(|chunk| chunk.state() == ChunkState::AwaitingLighting));

        let viewed = pipeline.column(Point2::new(0, 0)).unwrap();
        assert_eq!(viewed.chunks()[0].state(), ChunkState::AwaitingBufferGeneration);
        // Sky chunks have nothing to upload.
        assert_eq!(viewed.chunks()[7].state(), ChunkState::Ready);
    }

    #[test]
    fn budget_limits_operations_per_scan() {
        let (pipeline, _receivers) = pipeline(Point2::new(0, 0), 1, 1, 5, 64);
        let report = pipeline.scan();
        assert_eq!(report.operations(), 5);
        assert!(report.budget_exhausted);
    }

    #[test]
    fn chunks_are_queued_once_and_deferred_when_full() {
        let (pipeline, receivers) = pipeline(Point2::new(0, 0), 0, 0, usize::MAX, 1);
        let mut queued = 0;
        let mut deferred = 0;
        for _ in 0..5 {
            let report = pipeline.scan();
            queued += report.queued;
            deferred += report.deferred;
        }

        // Only the ground chunk has a mesh and the queue holds one entry.
        assert_eq!(queued, 1);
        assert_eq!(deferred, 0);
        let chunk = receivers.buffers.try_recv().unwrap();
        assert_eq!(chunk.position(), Point3::new(0, 0, 0));
        assert!(receivers.buffers.try_recv().is_err());
    }

    #[test]
    fn full_queue_defers_to_a_later_scan() {
        let (pipeline, receivers) = pipeline(Point2::new(0, 0), 1, 1, usize::MAX, 1);
        let mut deferred = 0;
        for _ in 0..5 {
            deferred += pipeline.scan().deferred;
        }
        assert!(deferred > 0);

        let first = receivers.buffers.try_recv().unwrap();
        first.clear_buffers_queued();
        let report = pipeline.scan();
        assert_eq!(report.queued, 1);
    }
}
