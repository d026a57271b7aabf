//! Integer axis-aligned bounding boxes used for range checks.

use cgmath::Point3;

/// An axis-aligned box in world block coordinates.
///
/// `min` is inclusive and `max` exclusive, so a chunk at origin `o` covers
/// `o .. o + CHUNK_SIZE` on every axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    pub min: Point3<i32>,
    pub max: Point3<i32>,
}

impl BoundingBox {
    pub fn new(min: Point3<i32>, max: Point3<i32>) -> Self {
        BoundingBox { min, max }
    }

    /// Returns `true` if the interiors of the two boxes overlap.
    ///
    /// Boxes that only share a face do not intersect, so neighbouring chunks
    /// never count as part of each other's range.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
            && self.min.z < other.max.z
            && other.min.z < self.max.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(x: i32, y: i32, z: i32, size: i32) -> BoundingBox {
        BoundingBox::new(Point3::new(x, y, z), Point3::new(x + size, y + size, z + size))
    }

    #[test]
    fn overlapping_boxes_intersect() {
        assert!(cube(0, 0, 0, 10).intersects(&cube(5, 5, 5, 10)));
        assert!(cube(5, 5, 5, 10).intersects(&cube(0, 0, 0, 10)));
    }

    #[test]
    fn touching_boxes_do_not_intersect() {
        assert!(!cube(0, 0, 0, 10).intersects(&cube(10, 0, 0, 10)));
        assert!(!cube(0, 0, 0, 10).intersects(&cube(0, -10, 0, 10)));
    }

    #[test]
    fn partial_and_full_overlap_both_intersect() {
        let window = cube(0, 0, 0, 64);
        assert!(window.intersects(&cube(60, 0, 0, 8)));
        assert!(window.intersects(&cube(8, 8, 8, 8)));
    }
}
