//! # Chunk Column Module
//!
//! A column is a vertical stack of [`COLUMN_HEIGHT`] chunks sharing one
//! horizontal coordinate. It is the unit the world streams in and out: a
//! column is created whole when it enters the cache window and evicted whole
//! when it leaves.

use std::sync::Arc;

use cgmath::{Point2, Point3};

use crate::engine_state::error::WorldError;

use super::block::Block;
use super::bounding_box::BoundingBox;
use super::chunk::{Chunk, CHUNK_SIZE};

/// Number of chunks stacked in a column.
pub const COLUMN_HEIGHT: usize = 8;
/// Height of the world in blocks.
pub const WORLD_HEIGHT: i32 = (COLUMN_HEIGHT * CHUNK_SIZE) as i32;

/// Horizontal coordinate of a column, in columns. `y` of the point is the
/// world Z axis.
pub type ColumnCoord = Point2<i32>;

/// A vertical stack of chunks sharing one horizontal coordinate. Columns are
/// created and evicted as a unit.
#[derive(Debug)]
pub struct ChunkColumn {
    coord: ColumnCoord,
    chunks: [Arc<Chunk>; COLUMN_HEIGHT],
}

impl ChunkColumn {
    /// Creates a column of chunks awaiting generation.
    pub fn new(coord: ColumnCoord) -> Self {
        let chunks = std::array::from_fn(|i| {
            Arc::new(Chunk::new(Point3::new(coord.x, i as i32, coord.y)))
        });
        ChunkColumn { coord, chunks }
    }

    pub fn coord(&self) -> ColumnCoord {
        self.coord
    }

    /// The world-space block coordinate of the column's lowest corner.
    pub fn world_position(&self) -> Point3<i32> {
        let size = CHUNK_SIZE as i32;
        Point3::new(self.coord.x * size, 0, self.coord.y * size)
    }

    /// The volume covered by every chunk of the column.
    pub fn bounding_box(&self) -> BoundingBox {
        let min = self.world_position();
        let size = CHUNK_SIZE as i32;
        BoundingBox::new(min, Point3::new(min.x + size, WORLD_HEIGHT, min.z + size))
    }

    /// The chunks from bottom to top.
    pub fn chunks(&self) -> &[Arc<Chunk>; COLUMN_HEIGHT] {
        &self.chunks
    }

    /// Gets the block at column-local `x`, `z` and world `y`.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Result<Block, WorldError> {
        let (chunk, x, y, z) = self.locate(x, y, z)?;
        Ok(chunk.get_block(x, y, z))
    }

    /// Sets the block at column-local `x`, `z` and world `y`.
    ///
    /// # Returns
    /// The chunk that was edited.
    pub fn set_block(&self, x: i32, y: i32, z: i32, block: Block) -> Result<&Arc<Chunk>, WorldError> {
        let (chunk, x, y, z) = self.locate(x, y, z)?;
        chunk.set_block(x, y, z, block);
        Ok(chunk)
    }

    fn locate(&self, x: i32, y: i32, z: i32) -> Result<(&Arc<Chunk>, usize, usize, usize), WorldError> {
        let size = CHUNK_SIZE as i32;
        if !(0..size).contains(&x) || !(0..WORLD_HEIGHT).contains(&y) || !(0..size).contains(&z) {
            return Err(WorldError::OutOfBounds(Point3::new(x, y, z)));
        }
        let chunk = &self.chunks[(y / size) as usize];
        Ok((chunk, x as usize, (y % size) as usize, z as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;

    #[test]
    fn chunks_are_stacked_along_y() {
        let column = ChunkColumn::new(Point2::new(2, -3));
        for (i, chunk) in column.chunks().iter().enumerate() {
            assert_eq!(chunk.position(), Point3::new(2, i as i32, -3));
        }
        assert_eq!(column.world_position(), Point3::new(128, 0, -192));
        assert_eq!(column.bounding_box().max, Point3::new(192, 512, -128));
    }

    #[test]
    fn routes_global_y_to_the_right_chunk() {
        let column = ChunkColumn::new(Point2::new(0, 0));
        let edited = column.set_block(3, 130, 4, Block::new(BlockType::Stone)).unwrap();
        assert_eq!(edited.position().y, 2);
        assert_eq!(column.chunks()[2].get_block(3, 2, 4), Block::new(BlockType::Stone));
        assert_eq!(column.get_block(3, 130, 4).unwrap(), Block::new(BlockType::Stone));
        assert!(column.chunks()[1].is_empty());
    }

    #[test]
    fn rejects_coordinates_outside_the_column() {
        let column = ChunkColumn::new(Point2::new(0, 0));
        for (x, y, z) in [(0, -1, 0), (0, WORLD_HEIGHT, 0), (64, 0, 0), (0, 0, -1)] {
            assert!(matches!(
                column.get_block(x, y, z),
                Err(WorldError::OutOfBounds(_))
            ));
        }
    }
}
