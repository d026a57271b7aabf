//! # World Configuration
//!
//! Tunables for streaming, terrain and the background worker, loaded from
//! JSON. Every field has a default, so `{}` is a valid configuration.
//!
//! ```json
//! {
//!     "view_range": 2,
//!     "cache_range": 3,
//!     "seed": 1234,
//!     "terrain": { "type": "noise", "base_height": 32, "amplitude": 12.0, "scale": 0.01 },
//!     "tick_interval_ms": 16,
//!     "max_chunk_operations_per_tick": 8,
//!     "buffer_queue_capacity": 64,
//!     "relight_on_edit": false
//! }
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cache range ({cache_range}) must be at least the view range ({view_range})")]
    InvalidRanges { view_range: u32, cache_range: u32 },
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
}

/// Reads and deserializes a JSON file.
pub fn load_config<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, ConfigError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let config = serde_json::from_reader(reader)?;
    Ok(config)
}

/// Which terrain strategy fills newly generated chunks.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TerrainConfig {
    /// Fixed stone, dirt and grass layers.
    Flat,
    /// Perlin heightmap.
    Noise {
        #[serde(default = "default_base_height")]
        base_height: i32,
        #[serde(default = "default_amplitude")]
        amplitude: f64,
        #[serde(default = "default_scale")]
        scale: f64,
    },
}

fn default_base_height() -> i32 {
    32
}

fn default_amplitude() -> f64 {
    12.0
}

fn default_scale() -> f64 {
    0.01
}

impl Default for TerrainConfig {
    fn default() -> Self {
        TerrainConfig::Flat
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Columns around the camera column that are lit, meshed and drawn.
    pub view_range: u32,
    /// Columns around the camera column that stay loaded. Must be at least
    /// `view_range`.
    pub cache_range: u32,
    /// Terrain seed. A random one is picked when absent.
    pub seed: Option<u32>,
    pub terrain: TerrainConfig,
    /// How long the worker waits between scans when it has nothing urgent.
    pub tick_interval_ms: u64,
    /// Generate, light and build operations allowed per scan.
    pub max_chunk_operations_per_tick: usize,
    /// Capacity of the queue of chunks waiting for GPU buffers.
    pub buffer_queue_capacity: usize,
    /// Recompute light before rebuilding an edited chunk.
    pub relight_on_edit: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            view_range: 2,
            cache_range: 3,
            seed: None,
            terrain: TerrainConfig::default(),
            tick_interval_ms: 16,
            max_chunk_operations_per_tick: 8,
            buffer_queue_capacity: 64,
            relight_on_edit: false,
        }
    }
}

impl WorldConfig {
    /// Parses and validates a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config: WorldConfig = load_config(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants deserialization cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_range < self.view_range {
            return Err(ConfigError::InvalidRanges {
                view_range: self.view_range,
                cache_range: self.cache_range,
            });
        }
        if self.max_chunk_operations_per_tick == 0 {
            return Err(ConfigError::Zero {
                field: "max_chunk_operations_per_tick",
            });
        }
        if self.buffer_queue_capacity == 0 {
            return Err(ConfigError::Zero {
                field: "buffer_queue_capacity",
            });
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// The configured seed, or a random one.
    pub fn resolve_seed(&self) -> u32 {
        self.seed.unwrap_or_else(|| fastrand::u32(..))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let config = WorldConfig::from_json_str("{}").unwrap();
        assert_eq!(config, WorldConfig::default());
        assert_eq!(config.tick_interval(), Duration::from_millis(16));
    }

    #[test]
    fn parses_noise_terrain() {
        let config = WorldConfig::from_json_str(
            r#"{ "seed": 7, "terrain": { "type": "noise", "amplitude": 4.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.resolve_seed(), 7);
        assert_eq!(
            config.terrain,
            TerrainConfig::Noise {
                base_height: 32,
                amplitude: 4.0,
                scale: 0.01
            }
        );
    }

    #[test]
    fn rejects_cache_smaller_than_view() {
        let error = WorldConfig::from_json_str(r#"{ "view_range": 4, "cache_range": 3 }"#)
            .unwrap_err();
        assert!(matches!(
            error,
            ConfigError::InvalidRanges {
                view_range: 4,
                cache_range: 3
            }
        ));
    }

    #[test]
    fn rejects_zero_budget() {
        let error =
            WorldConfig::from_json_str(r#"{ "max_chunk_operations_per_tick": 0 }"#).unwrap_err();
        assert!(matches!(error, ConfigError::Zero { .. }));
    }

    #[test]
    fn reports_malformed_json() {
        assert!(matches!(
            WorldConfig::from_json_str("{ view_range: }"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            WorldConfig::from_file("/definitely/not/here.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
