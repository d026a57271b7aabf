//! Vertex data structures and layouts for chunk rendering.
//!
//! This module defines the vertex format emitted by the mesher and the matching
//! `wgpu` layout a renderer binds it with.

use cgmath::Point3;

use crate::engine_state::voxels::block::Color;

/// A vertex of a chunk mesh.
///
/// Positions are in world space; the model matrix of every chunk is the
/// identity. Colors are already shaded per face.
///
/// # Memory Layout
/// - Position: 3x f32 (12 bytes)
/// - Color: 4x f32 (16 bytes)
///
/// Total size: 28 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// X, Y and Z coordinates in world space
    pub position: [f32; 3],
    /// RGBA color (normalized 0.0-1.0)
    pub color: [f32; 4],
}

impl Vertex {
    /// Creates a new vertex.
    ///
    /// # Arguments
    /// * `pos` - The 3D position of the vertex in world space
    /// * `color` - The shaded face color
    pub fn new(pos: Point3<i32>, color: Color) -> Self {
        Vertex {
            position: [pos.x as f32, pos.y as f32, pos.z as f32],
            color,
        }
    }

    /// Returns the vertex buffer layout description for the shader pipeline.
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec3<f32>)
    /// - `location = 1`: color (vec4<f32>)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}
