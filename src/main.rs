//! # Voxel Streamer Headless Driver
//!
//! Streams a world around a camera that walks along the x axis, without a
//! window or GPU. Meshes are kept on the CPU by a `RecordingBackend`, and
//! chunk statistics are logged as the camera moves.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- [config.json] [frames]
//! ```

use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use cgmath::Point3;
use log::{error, info};

use voxel_streamer::{RecordingBackend, World, WorldConfig};

const DEFAULT_FRAMES: u32 = 600;
const CAMERA_HEIGHT: f32 = 80.0;
/// Blocks per frame.
const CAMERA_SPEED: f32 = 1.5;
const FRAME_TIME: Duration = Duration::from_millis(16);
const STATS_EVERY: u32 = 60;

fn main() -> ExitCode {
    voxel_streamer::init_logging();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => match WorldConfig::from_file(&path) {
            Ok(config) => config,
            Err(err) => {
                error!("Failed to load config {path}: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => WorldConfig::default(),
    };
    let frames = match args.next().map(|frames| frames.parse::<u32>()) {
        Some(Ok(frames)) => frames,
        Some(Err(err)) => {
            error!("Invalid frame count: {err}");
            return ExitCode::FAILURE;
        }
        None => DEFAULT_FRAMES,
    };

    let mut world = match World::new(config, RecordingBackend::new()) {
        Ok(world) => world,
        Err(err) => {
            error!("Failed to create world: {err}");
            return ExitCode::FAILURE;
        }
    };

    info!("Streaming for {frames} frames");
    let mut indices_drawn: u64 = 0;
    for frame in 0..frames {
        let camera_position = Point3::new(frame as f32 * CAMERA_SPEED, CAMERA_HEIGHT, 0.0);
        world.update(camera_position);
        world.draw(|_, draw| indices_drawn += u64::from(draw.index_count));

        if frame % STATS_EVERY == 0 {
            let stats = world.stats();
            info!(
                "Frame {frame}: center {:?}, {} columns, {} chunks drawn, {} buffers, states {:?}",
                stats.center, stats.columns, stats.drawn_last_frame, stats.buffers, stats.states
            );
        }
        thread::sleep(FRAME_TIME);
    }

    let backend = world.backend();
    info!(
        "Done: {} buffers created, {} refreshed, {} deleted, {indices_drawn} indices drawn",
        backend.created, backend.refreshed, backend.deleted
    );
    ExitCode::SUCCESS
}
