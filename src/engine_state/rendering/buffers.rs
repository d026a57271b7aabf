//! # Chunk Buffer Module
//!
//! GPU buffer lifetime for chunk meshes. The world only ever talks to a
//! [`BufferBackend`], always from the render thread:
//!
//! * `create_buffers` when a chunk's first mesh is ready,
//! * `refresh_buffers` when an edited chunk was rebuilt,
//! * `delete_buffers` when the chunk was evicted.
//!
//! [`WgpuBufferBackend`] uploads to a `wgpu` device. [`RecordingBackend`] keeps
//! CPU copies and counts calls, for headless runs and tests.

use wgpu::util::DeviceExt;

use super::meshing::chunk_mesh::ChunkMesh;
use super::Vertex;

/// Creates, updates and frees the GPU copies of chunk meshes.
pub trait BufferBackend {
    /// The handles owned for one chunk.
    type Buffers;

    fn create_buffers(&mut self, mesh: &ChunkMesh) -> Self::Buffers;

    fn refresh_buffers(&mut self, buffers: &mut Self::Buffers, mesh: &ChunkMesh);

    fn delete_buffers(&mut self, buffers: Self::Buffers);
}

/// Vertex and index buffers of one chunk on a `wgpu` device.
#[derive(Debug)]
pub struct WgpuChunkBuffers {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl WgpuChunkBuffers {
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Binds the buffers and issues the indexed draw for this chunk.
    pub fn record(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Uploads chunk meshes with `wgpu`.
pub struct WgpuBufferBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl WgpuBufferBackend {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        WgpuBufferBackend { device, queue }
    }

    fn create_buffer(&self, label: &str, contents: &[u8], usage: wgpu::BufferUsages) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: usage | wgpu::BufferUsages::COPY_DST,
            })
    }

    /// Writes `contents` into `buffer` in place when it fits, otherwise
    /// replaces the buffer with a larger one.
    fn write_or_grow(
        &self,
        buffer: &mut wgpu::Buffer,
        label: &str,
        contents: &[u8],
        usage: wgpu::BufferUsages,
    ) {
        if contents.len() as wgpu::BufferAddress <= buffer.size() {
            self.queue.write_buffer(buffer, 0, contents);
        } else {
            let replacement = self.create_buffer(label, contents, usage);
            std::mem::replace(buffer, replacement).destroy();
        }
    }
}

impl BufferBackend for WgpuBufferBackend {
    type Buffers = WgpuChunkBuffers;

    fn create_buffers(&mut self, mesh: &ChunkMesh) -> WgpuChunkBuffers {
        WgpuChunkBuffers {
            vertex_buffer: self.create_buffer(
                "Chunk Vertex Buffer",
                bytemuck::cast_slice(&mesh.vertices),
                wgpu::BufferUsages::VERTEX,
            ),
            index_buffer: self.create_buffer(
                "Chunk Index Buffer",
                bytemuck::cast_slice(&mesh.indices),
                wgpu::BufferUsages::INDEX,
            ),
            index_count: mesh.index_count(),
        }
    }

    fn refresh_buffers(&mut self, buffers: &mut WgpuChunkBuffers, mesh: &ChunkMesh) {
        self.write_or_grow(
            &mut buffers.vertex_buffer,
            "Chunk Vertex Buffer",
            bytemuck::cast_slice(&mesh.vertices),
            wgpu::BufferUsages::VERTEX,
        );
        self.write_or_grow(
            &mut buffers.index_buffer,
            "Chunk Index Buffer",
            bytemuck::cast_slice(&mesh.indices),
            wgpu::BufferUsages::INDEX,
        );
        buffers.index_count = mesh.index_count();
    }

    fn delete_buffers(&mut self, buffers: WgpuChunkBuffers) {
        buffers.vertex_buffer.destroy();
        buffers.index_buffer.destroy();
    }
}

/// CPU copy of a chunk mesh held by [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedBuffers {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    /// Number of uploads into these buffers, starting at 1.
    pub uploads: u32,
}

/// A backend without a GPU. Copies meshes and counts every call.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub created: usize,
    pub refreshed: usize,
    pub deleted: usize,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers created and not yet deleted.
    pub fn live(&self) -> usize {
        self.created - self.deleted
    }
}

impl BufferBackend for RecordingBackend {
    type Buffers = RecordedBuffers;

    fn create_buffers(&mut self, mesh: &ChunkMesh) -> RecordedBuffers {
        self.created += 1;
        RecordedBuffers {
            vertices: mesh.vertices.clone(),
            indices: mesh.indices.clone(),
            uploads: 1,
        }
    }

    fn refresh_buffers(&mut self, buffers: &mut RecordedBuffers, mesh: &ChunkMesh) {
        self.refreshed += 1;
        buffers.vertices.clone_from(&mesh.vertices);
        buffers.indices.clone_from(&mesh.indices);
        buffers.uploads += 1;
    }

    fn delete_buffers(&mut self, _buffers: RecordedBuffers) {
        self.deleted += 1;
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Point3;

    use super::*;

    #[test]
    fn recording_backend_tracks_lifetimes() {
        let mut backend = RecordingBackend::new();
        let mut mesh = ChunkMesh::default();
        mesh.push_quad([Vertex::new(Point3::new(0, 0, 0), [1.0; 4]); 4]);

        let mut buffers = backend.create_buffers(&mesh);
        assert_eq!(buffers.indices.len(), 6);

        mesh.clear();
        backend.refresh_buffers(&mut buffers, &mesh);
        assert!(buffers.vertices.is_empty());
        assert_eq!(buffers.uploads, 2);

        assert_eq!(backend.live(), 1);
        backend.delete_buffers(buffers);
        assert_eq!(backend.live(), 0);
        assert_eq!((backend.created, backend.refreshed, backend.deleted), (1, 1, 1));
    }
}
