//! # Task Management System
//!
//! This module runs the streaming pipeline on a background thread so that
//! terrain generation, lighting and meshing never stall a frame.
//!
//! ## Architecture Overview
//!
//! - `StreamingPipeline`: One budgeted scan over the loaded world (see [`pipeline`])
//! - `StreamingWorker`: The thread that runs scans, and the handle that controls it
//! - `WorkerCommand`: Messages from the render thread to the worker
//!
//! ## Worker Lifecycle
//! 1. The world spawns the worker on its first update
//! 2. The worker scans, then waits for a command for up to one tick interval
//! 3. A scan that ran out of budget is followed by another one immediately
//! 4. `WorkerCommand::Wake` (camera changed column, block edited) ends the wait early
//! 5. `WorkerCommand::Shutdown`, or the control channel closing, ends the loop
//! 6. Dropping the `StreamingWorker` sends `Shutdown` and joins the thread
//!
//! ## Example Usage
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use cgmath::Point2;
//! use voxel_streamer::engine_state::rendering::meshing::GreedyMeshBuilder;
//! use voxel_streamer::engine_state::task_management::{
//!     pipeline::{StreamingPipeline, StreamingWindows},
//!     StreamingWorker,
//! };
//! use voxel_streamer::engine_state::voxels::terrain::FlatTerrain;
//!
//! let (pipeline, receivers) = StreamingPipeline::new(
//!     StreamingWindows::new(Point2::new(0, 0), 2, 3),
//!     Box::new(FlatTerrain::new(0)),
//!     Box::new(GreedyMeshBuilder),
//!     8,
//!     64,
//! );
//! let worker = StreamingWorker::spawn(Arc::new(pipeline), Duration::from_millis(16));
//!
//! // In your main/game loop:
//! while let Ok(chunk) = receivers.buffers.try_recv() {
//!     // upload chunk.mesh()
//! }
//! worker.wake();
//! ```

pub mod pipeline;

use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{error, info, trace};

use pipeline::StreamingPipeline;

/// Messages from the render thread to the streaming worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerCommand {
    /// Scan again now instead of waiting for the tick.
    Wake,
    /// Finish the current scan and exit.
    Shutdown,
}

/// Handle to the background thread running the streaming pipeline.
#[derive(Debug)]
pub struct StreamingWorker {
    commands: Sender<WorkerCommand>,
    handle: Option<JoinHandle<()>>,
}

impl StreamingWorker {
    /// Starts the worker thread.
    ///
    /// # Arguments
    /// * `pipeline` - The pipeline to scan
    /// * `tick_interval` - How long to wait between scans that did not run out
    ///   of budget
    ///
    /// # Panics
    /// Panics if the underlying thread creation fails.
    pub fn spawn(pipeline: Arc<StreamingPipeline>, tick_interval: Duration) -> Self {
        let (commands, command_receiver) = channel();
        let handle = thread::spawn(move || run(&pipeline, &command_receiver, tick_interval));
        info!("Streaming worker started, tick interval {tick_interval:?}");

        StreamingWorker {
            commands,
            handle: Some(handle),
        }
    }

    /// Asks the worker to scan without waiting for the next tick.
    pub fn wake(&self) {
        let _ = self.commands.send(WorkerCommand::Wake);
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stops the worker and waits for it to exit. Does nothing if it was
    /// already stopped.
    pub fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        let _ = self.commands.send(WorkerCommand::Shutdown);
        if handle.join().is_err() {
            error!("Streaming worker panicked");
        }
    }
}

impl Drop for StreamingWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(pipeline: &StreamingPipeline, commands: &Receiver<WorkerCommand>, tick_interval: Duration) {
    let mut scans: u64 = 0;
    loop {
        let report = pipeline.scan();
        scans += 1;
        trace!("Scan {scans}: {report:?}");

        let wait = if report.budget_exhausted {
            Duration::ZERO
        } else {
            tick_interval
        };

        match commands.recv_timeout(wait) {
            Ok(WorkerCommand::Wake) | Err(RecvTimeoutError::Timeout) => {}
            Ok(WorkerCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    info!("Streaming worker stopped after {scans} scans");
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use cgmath::Point2;

    use super::pipeline::StreamingWindows;
    use super::*;
    use crate::engine_state::rendering::meshing::GreedyMeshBuilder;
    use crate::engine_state::voxels::terrain::FlatTerrain;

    #[test]
    fn worker_streams_until_shut_down() {
        let (pipeline, receivers) = StreamingPipeline::new(
            StreamingWindows::new(Point2::new(0, 0), 0, 0),
            Box::new(FlatTerrain::new(0)),
            Box::new(GreedyMeshBuilder),
            8,
            4,
        );
        let pipeline = Arc::new(pipeline);
        let mut worker = StreamingWorker::spawn(pipeline.clone(), Duration::from_millis(1));
        assert!(worker.is_running());

        let chunk = receivers
            .buffers
            .recv_timeout(Duration::from_secs(10))
            .expect("ground chunk reaches the hand-off queue");
        assert_eq!(chunk.position().y, 0);

        worker.shutdown();
        assert!(!worker.is_running());
        worker.shutdown();
    }

    #[test]
    fn wake_ends_the_wait_early() {
        let (pipeline, _receivers) = StreamingPipeline::new(
            StreamingWindows::new(Point2::new(0, 0), 0, 0),
            Box::new(FlatTerrain::new(0)),
            Box::new(GreedyMeshBuilder),
            8,
            4,
        );
        let pipeline = Arc::new(pipeline);
        let worker = StreamingWorker::spawn(pipeline.clone(), Duration::from_secs(3600));

        let start = Instant::now();
        while pipeline.column_count() == 0 {
            assert!(start.elapsed() < Duration::from_secs(10));
            thread::yield_now();
        }

        pipeline.set_windows(StreamingWindows::new(Point2::new(5, 5), 0, 0));
        worker.wake();
        while pipeline.column(Point2::new(5, 5)).is_none() {
            assert!(start.elapsed() < Duration::from_secs(10));
            thread::sleep(Duration::from_millis(1));
        }
        drop(worker);
    }
}
