use cgmath::{Point2, Point3};
use thiserror::Error;

use super::config::ConfigError;

#[derive(Error, Debug)]
pub enum WorldError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("column ({}, {}) is not loaded", .0.x, .0.y)]
    ColumnNotLoaded(Point2<i32>),
    #[error("block ({}, {}, {}) is outside the addressable volume", .0.x, .0.y, .0.z)]
    OutOfBounds(Point3<i32>),
}
