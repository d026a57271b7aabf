//! # Block Side Module
//!
//! This module defines the six faces of a voxel block as seen by the mesher,
//! together with the per-face shading and vertex winding rules.

/// Represents the six possible faces of a voxel block.
///
/// The direction a face points determines how its color is shaded and in
/// which order its four corners are emitted.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The top face (facing positive Y)
    Top,

    /// The bottom face (facing negative Y)
    Bottom,

    /// The front face (facing positive Z)
    Front,

    /// The back face (facing negative Z)
    Back,

    /// The left face (facing negative X)
    Left,

    /// The right face (facing positive X)
    Right,
}

/// Color multiplier applied to the four vertical faces.
pub const SIDE_FACE_SHADE: f32 = 0.8;
/// Color multiplier applied to downward faces.
pub const BOTTOM_FACE_SHADE: f32 = 0.5;

impl BlockSide {
    /// Returns an array containing all six block faces.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::Top,
            BlockSide::Bottom,
            BlockSide::Front,
            BlockSide::Back,
            BlockSide::Left,
            BlockSide::Right,
        ]
    }

    /// Returns the face produced by the mesher for sweep axis `axis`
    /// (0 = X, 1 = Y, 2 = Z) and the given pass.
    ///
    /// The back-face pass produces faces pointing towards the negative end of
    /// the axis, the front-face pass towards the positive end.
    ///
    /// # Panics
    /// Panics if `axis` is not 0, 1 or 2.
    pub fn from_axis(axis: usize, back_face: bool) -> Self {
        match (axis, back_face) {
            (0, true) => BlockSide::Left,
            (0, false) => BlockSide::Right,
            (1, true) => BlockSide::Bottom,
            (1, false) => BlockSide::Top,
            (2, true) => BlockSide::Back,
            (2, false) => BlockSide::Front,
            _ => panic!("invalid sweep axis {axis}"),
        }
    }

    /// The multiplier applied to the RGB channels of faces on this side.
    ///
    /// This is a cheap stand-in for ambient occlusion: tops are unshaded,
    /// sides are slightly darker and bottoms darker still.
    pub fn shade_factor(self) -> f32 {
        match self {
            BlockSide::Top => 1.0,
            BlockSide::Bottom => BOTTOM_FACE_SHADE,
            BlockSide::Front | BlockSide::Back | BlockSide::Left | BlockSide::Right => {
                SIDE_FACE_SHADE
            }
        }
    }

    /// Whether quads on this side are emitted in the mirrored corner order.
    ///
    /// Back, left and bottom faces point towards the negative end of their
    /// axis, so their corners must be reversed to stay counter-clockwise
    /// when seen from outside the block.
    pub fn uses_reversed_winding(self) -> bool {
        matches!(self, BlockSide::Back | BlockSide::Left | BlockSide::Bottom)
    }

    /// The outward unit normal of this face.
    pub fn normal(self) -> [i32; 3] {
        match self {
            BlockSide::Top => [0, 1, 0],
            BlockSide::Bottom => [0, -1, 0],
            BlockSide::Front => [0, 0, 1],
            BlockSide::Back => [0, 0, -1],
            BlockSide::Left => [-1, 0, 0],
            BlockSide::Right => [1, 0, 0],
        }
    }
}
