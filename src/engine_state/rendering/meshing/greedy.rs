//! Greedy meshing implementation for chunk rendering.
//!
//! This module implements binary greedy meshing, which merges adjacent coplanar
//! faces of the same block type into larger quads, significantly reducing the
//! number of vertices needed to render a chunk.
//!
//! ## Algorithm
//!
//! For each axis `d` (with perpendicular axes `u = (d + 1) % 3` and
//! `v = (d + 2) % 3`) and for each face direction, a plane is swept along `d`
//! from just outside the chunk (`-1`) to its last voxel. At each position a
//! `CHUNK_SIZE²` mask records, for every cell of the plane, the block whose
//! face is visible across it, or nothing if both voxels straddling the plane
//! are solid or both are air. The mask is then consumed row-major: each
//! non-empty cell grows as wide as the run of equal cells, then as tall as the
//! following rows allow, and the resulting rectangle becomes one quad.
//!
//! Voxels outside the chunk count as air, so chunk borders always get faces.

use cgmath::{Point3, Vector3};

use crate::engine_state::rendering::Vertex;
use crate::engine_state::voxels::block::{block_side::BlockSide, Block, BlockTypeSize, Color};
use crate::engine_state::voxels::chunk::{block_index, VoxelGrid, CHUNK_SIZE, CHUNK_SIZE_SQUARED};

use super::chunk_mesh::ChunkMesh;

/// A merged rectangle of faces, in chunk-local coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GreedyQuad {
    /// The direction the quad faces.
    pub side: BlockSide,
    /// The block whose color the quad takes.
    pub block: Block,
    /// The corner with the smallest coordinates, on the sweep plane.
    pub origin: [i32; 3],
    /// Extent along the first perpendicular axis.
    pub du: [i32; 3],
    /// Extent along the second perpendicular axis.
    pub dv: [i32; 3],
}

impl GreedyQuad {
    /// The four corners as bottom-left, top-left, top-right, bottom-right.
    pub fn corners(&self) -> [[i32; 3]; 4] {
        let o = self.origin;
        let (du, dv) = (self.du, self.dv);
        [
            o,
            [o[0] + du[0], o[1] + du[1], o[2] + du[2]],
            [
                o[0] + du[0] + dv[0],
                o[1] + du[1] + dv[1],
                o[2] + du[2] + dv[2],
            ],
            [o[0] + dv[0], o[1] + dv[1], o[2] + dv[2]],
        ]
    }

    /// Number of voxel faces the quad covers.
    pub fn area(&self) -> i32 {
        self.du.iter().sum::<i32>() * self.dv.iter().sum::<i32>()
    }
}

#[inline]
fn block_at(blocks: &[BlockTypeSize], x: [i32; 3]) -> BlockTypeSize {
    blocks[block_index(x[0] as usize, x[1] as usize, x[2] as usize)]
}

/// Computes the greedy quads for `grid`.
pub fn greedy_quads(grid: &VoxelGrid) -> Vec<GreedyQuad> {
    let Some(blocks) = grid.blocks() else {
        return Vec::new();
    };

    let size = CHUNK_SIZE as i32;
    let air = Block::AIR.block_type;
    let mut quads = Vec::new();
    let mut mask = vec![air; CHUNK_SIZE_SQUARED];

    for back_face in [true, false] {
        for d in 0..3 {
            let u = (d + 1) % 3;
            let v = (d + 2) % 3;
            let side = BlockSide::from_axis(d, back_face);

            let mut q = [0i32; 3];
            q[d] = 1;
            let mut x = [0i32; 3];

            x[d] = -1;
            while x[d] < size {
                let mut n = 0;
                for xv in 0..size {
                    x[v] = xv;
                    for xu in 0..size {
                        x[u] = xu;
                        let current = if x[d] >= 0 { block_at(blocks, x) } else { air };
                        let compare = if x[d] < size - 1 {
                            block_at(blocks, [x[0] + q[0], x[1] + q[1], x[2] + q[2]])
                        } else {
                            air
                        };

                        mask[n] = if current != air && compare != air {
                            air
                        } else if back_face {
                            compare
                        } else {
                            current
                        };
                        n += 1;
                    }
                }

                x[d] += 1;
                merge_mask(&mut mask, |i, j, w, h, cell| {
                    let mut origin = x;
                    origin[u] = i as i32;
                    origin[v] = j as i32;
                    let mut du = [0; 3];
                    du[u] = w as i32;
                    let mut dv = [0; 3];
                    dv[v] = h as i32;

                    quads.push(GreedyQuad {
                        side,
                        block: Block::from_id(cell),
                        origin,
                        du,
                        dv,
                    });
                });
            }
        }
    }

    quads
}

/// Consumes `mask` into maximal rectangles of equal cells, calling
/// `emit(i, j, width, height, cell)` for each.
fn merge_mask(
    mask: &mut [BlockTypeSize],
    mut emit: impl FnMut(usize, usize, usize, usize, BlockTypeSize),
) {
    let air = Block::AIR.block_type;
    let mut n = 0;

    for j in 0..CHUNK_SIZE {
        let mut i = 0;
        while i < CHUNK_SIZE {
            let cell = mask[n];
            if cell == air {
                i += 1;
                n += 1;
                continue;
            }

            let mut w = 1;
            while i + w < CHUNK_SIZE && mask[n + w] == cell {
                w += 1;
            }

            let mut h = 1;
            'rows: while j + h < CHUNK_SIZE {
                for k in 0..w {
                    if mask[n + k + h * CHUNK_SIZE] != cell {
                        break 'rows;
                    }
                }
                h += 1;
            }

            emit(i, j, w, h, cell);

            for l in 0..h {
                mask[n + l * CHUNK_SIZE..n + l * CHUNK_SIZE + w].fill(air);
            }
            i += w;
            n += w;
        }
    }
}

/// Applies the face shading of `side` to the RGB channels of `color`.
pub fn shade(color: Color, side: BlockSide) -> Color {
    let factor = side.shade_factor();
    [color[0] * factor, color[1] * factor, color[2] * factor, color[3]]
}

/// Appends `quad` to `mesh`, translated to `world_origin`.
pub fn emit_quad(mesh: &mut ChunkMesh, world_origin: Point3<i32>, quad: &GreedyQuad) {
    let color = shade(quad.block.color(), quad.side);
    let [bottom_left, top_left, top_right, bottom_right] = quad
        .corners()
        .map(|corner| Vertex::new(world_origin + Vector3::from(corner), color));

    if quad.side.uses_reversed_winding() {
        mesh.push_quad([bottom_right, top_right, top_left, bottom_left]);
    } else {
        mesh.push_quad([bottom_left, top_left, top_right, bottom_right]);
    }
}

/// Clears `mesh` and fills it with the greedy mesh of `grid`.
pub fn build_greedy_mesh(grid: &VoxelGrid, world_origin: Point3<i32>, mesh: &mut ChunkMesh) {
    mesh.clear();
    for quad in greedy_quads(grid) {
        emit_quad(mesh, world_origin, &quad);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;

    #[test]
    fn empty_grid_has_no_quads() {
        assert!(greedy_quads(&VoxelGrid::new()).is_empty());
    }

    #[test]
    fn full_layer_merges_into_one_quad_per_side() {
        let mut grid = VoxelGrid::new();
        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                grid.set(x, 0, z, Block::new(BlockType::Stone));
            }
        }

        let quads = greedy_quads(&grid);
        assert_eq!(quads.len(), 6);
        let top = quads.iter().find(|q| q.side == BlockSide::Top).unwrap();
        assert_eq!(top.area(), 64 * 64);
        assert_eq!(top.origin, [0, 1, 0]);
    }

    #[test]
    fn different_blocks_do_not_merge() {
        let mut grid = VoxelGrid::new();
        grid.set(0, 0, 0, Block::new(BlockType::Stone));
        grid.set(1, 0, 0, Block::new(BlockType::Dirt));

        let tops: Vec<_> = greedy_quads(&grid)
            .into_iter()
            .filter(|q| q.side == BlockSide::Top)
            .collect();
        assert_eq!(tops.len(), 2);
    }

    #[test]
    fn hidden_faces_between_solids_are_culled() {
        let mut grid = VoxelGrid::new();
        grid.set(0, 0, 0, Block::new(BlockType::Stone));
        grid.set(1, 0, 0, Block::new(BlockType::Stone));

        let quads = greedy_quads(&grid);
        assert_eq!(quads.len(), 6);
        let total: i32 = quads.iter().map(GreedyQuad::area).sum();
        assert_eq!(total, 10);
    }

    #[test]
    fn shading_leaves_alpha_alone() {
        let shaded = shade([1.0, 0.5, 0.25, 0.75], BlockSide::Bottom);
        assert_eq!(shaded, [0.5, 0.25, 0.125, 0.75]);
        assert_eq!(shade([1.0; 4], BlockSide::Top), [1.0; 4]);
    }

    #[test]
    fn emitted_triangles_face_outwards() {
        let mut grid = VoxelGrid::new();
        grid.set(3, 4, 5, Block::new(BlockType::Grass));

        for quad in greedy_quads(&grid) {
            let mut mesh = ChunkMesh::default();
            emit_quad(&mut mesh, Point3::new(0, 0, 0), &quad);
            let p: Vec<Vector3<f32>> = mesh.vertices.iter().map(|v| v.position.into()).collect();
            let normal = (p[1] - p[0]).cross(p[2] - p[0]);
            let sign = |value: f32| (value > 0.0) as i32 - (value < 0.0) as i32;
            assert_eq!(
                [sign(normal.x), sign(normal.y), sign(normal.z)],
                quad.side.normal(),
                "{:?}",
                quad.side
            );
        }
    }
}
