use std::collections::{HashMap, HashSet};

use cgmath::{Point2, Point3};
use voxel_streamer::engine_state::rendering::meshing::greedy::greedy_quads;
use voxel_streamer::engine_state::rendering::meshing::GreedyMeshBuilder;
use voxel_streamer::engine_state::rendering::Vertex;
use voxel_streamer::engine_state::voxels::block::block_side::BlockSide;
use voxel_streamer::engine_state::voxels::chunk::chunk_state::ChunkState;
use voxel_streamer::engine_state::voxels::chunk::{VoxelGrid, CHUNK_SIZE};
use voxel_streamer::engine_state::voxels::terrain::TerrainGenerator;
use voxel_streamer::{Block, BlockType, RecordingBackend, World, WorldConfig};

struct NoTerrain;

impl TerrainGenerator for NoTerrain {
    fn seed(&self) -> u32 {
        0
    }

    fn generate_terrain(&self, _origin: Point3<i32>, _grid: &mut VoxelGrid) {}
}

fn empty_world() -> World<RecordingBackend> {
    let config = WorldConfig {
        view_range: 0,
        cache_range: 0,
        max_chunk_operations_per_tick: usize::MAX,
        ..WorldConfig::default()
    };
    World::with_strategies(
        config,
        RecordingBackend::new(),
        Box::new(NoTerrain),
        Box::new(GreedyMeshBuilder),
    )
    .unwrap()
}

fn settle(world: &mut World<RecordingBackend>) {
    for _ in 0..16 {
        world.pipeline().scan();
        world.drain_queues();
    }
}

fn quad_on_plane(vertices: &[Vertex], axis: usize, value: f32) -> &[Vertex] {
    vertices
        .chunks(4)
        .find(|quad| quad.iter().all(|vertex| vertex.position[axis] == value))
        .unwrap()
}

#[test]
fn single_block_becomes_six_shaded_quads() {
    let mut world = empty_world();
    settle(&mut world);
    let chunk = world.pipeline().column(Point2::new(0, 0)).unwrap().chunks()[0].clone();
    assert_eq!(chunk.state(), ChunkState::Ready);
    assert!(chunk.is_empty());
    assert_eq!(world.draw(|_, _| {}), 0);

    let stone = Block::new(BlockType::Stone);
    world.set_block(0, 0, 0, stone).unwrap();
    settle(&mut world);
    assert_eq!(chunk.state(), ChunkState::Ready);

    let buffers = world.buffers(chunk.id()).unwrap();
    assert_eq!(buffers.vertices.len(), 24);
    assert_eq!(buffers.indices.len(), 36);

    let color = stone.color();
    let top = quad_on_plane(&buffers.vertices, 1, 1.0);
    assert!(top.iter().all(|vertex| vertex.color == color));

    let bottom = quad_on_plane(&buffers.vertices, 1, 0.0);
    let shaded = [color[0] * 0.5, color[1] * 0.5, color[2] * 0.5, color[3]];
    assert!(bottom.iter().all(|vertex| vertex.color == shaded));

    let right = quad_on_plane(&buffers.vertices, 0, 1.0);
    assert!(right.iter().all(|vertex| vertex.color[0] == color[0] * 0.8));

    let mut draws = Vec::new();
    assert_eq!(world.draw(|_, draw| draws.push(draw.index_count)), 1);
    assert_eq!(draws, vec![36]);
}

/// Every visible face, as (side, voxel, block id), emitted one per voxel.
fn naive_faces(grid: &VoxelGrid, extent: i32) -> HashSet<(BlockSide, [i32; 3], u8)> {
    let size = CHUNK_SIZE as i32;
    let mut faces = HashSet::new();
    for x in 0..extent {
        for y in 0..extent {
            for z in 0..extent {
                let block = grid.get(x as usize, y as usize, z as usize);
                if !block.exists() {
                    continue;
                }
                for side in BlockSide::all() {
                    let [nx, ny, nz] = side.normal();
                    let neighbour = [x + nx, y + ny, z + nz];
                    let open = neighbour.iter().any(|c| !(0..size).contains(c))
                        || !grid
                            .get(
                                neighbour[0] as usize,
                                neighbour[1] as usize,
                                neighbour[2] as usize,
                            )
                            .exists();
                    if open {
                        faces.insert((side, [x, y, z], block.block_type));
                    }
                }
            }
        }
    }
    faces
}

/// Expands greedy quads back into one face per covered voxel.
fn greedy_faces(grid: &VoxelGrid) -> (HashSet<(BlockSide, [i32; 3], u8)>, usize) {
    let mut faces = HashSet::new();
    let mut total = 0;
    for quad in greedy_quads(grid) {
        let axis = quad.side.normal().iter().position(|n| *n != 0).unwrap();
        let outward = quad.side.normal()[axis] > 0;
        let width: i32 = quad.du.iter().sum();
        let height: i32 = quad.dv.iter().sum();
        let u_axis = quad.du.iter().position(|d| *d != 0).unwrap();
        let v_axis = quad.dv.iter().position(|d| *d != 0).unwrap();

        for i in 0..width {
            for j in 0..height {
                let mut voxel = quad.origin;
                voxel[u_axis] += i;
                voxel[v_axis] += j;
                if outward {
                    voxel[axis] -= 1;
                }
                faces.insert((quad.side, voxel, quad.block.block_type));
                total += 1;
            }
        }
    }
    (faces, total)
}

#[test]
fn greedy_mesh_covers_exactly_the_visible_faces() {
    let extent = 20;
    let mut rng = fastrand::Rng::with_seed(0x5eed);

    for _ in 0..4 {
        let mut grid = VoxelGrid::new();
        let density = rng.f32() * 0.8 + 0.1;
        for x in 0..extent {
            for y in 0..extent {
                for z in 0..extent {
                    if rng.f32() < density {
                        grid.set(x, y, z, Block::from_id(rng.u8(1..=3)));
                    }
                }
            }
        }

        let expected = naive_faces(&grid, extent as i32);
        let (covered, total) = greedy_faces(&grid);
        assert_eq!(total, covered.len(), "quads overlap");
        assert_eq!(covered, expected);

        let mut per_side: HashMap<BlockSide, i32> = HashMap::new();
        for quad in greedy_quads(&grid) {
            *per_side.entry(quad.side).or_insert(0) += quad.area();
        }
        for side in BlockSide::all() {
            let naive = expected.iter().filter(|(s, _, _)| *s == side).count() as i32;
            assert_eq!(per_side.get(&side).copied().unwrap_or(0), naive, "{side:?}");
        }
    }
}

#[test]
fn greedy_merges_uniform_slabs() {
    let mut grid = VoxelGrid::new();
    for x in 0..CHUNK_SIZE {
        for z in 0..CHUNK_SIZE {
            for y in 0..4 {
                grid.set(x, y, z, Block::new(BlockType::Dirt));
            }
        }
    }

    let quads = greedy_quads(&grid);
    assert_eq!(quads.len(), 6);
    let top = quads.iter().find(|q| q.side == BlockSide::Top).unwrap();
    assert_eq!(top.origin[1], 4);
    assert_eq!(top.area(), (CHUNK_SIZE * CHUNK_SIZE) as i32);
}
