//! CPU-side mesh data.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Interleaved vertex layout shared by all mesh buffers.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const STRIDE: usize = std::mem::size_of::<Self>();

    #[must_use]
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Vertex and index data waiting to be uploaded to the backend.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    #[must_use]
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// An XZ-plane quad centered at the origin. Handy as a smoke-test mesh.
    #[must_use]
    pub fn plane(width: f32, depth: f32) -> Self {
        let (hw, hd) = (width * 0.5, depth * 0.5);
        let up = [0.0, 1.0, 0.0];
        Self {
            vertices: vec![
                Vertex::new([-hw, 0.0, -hd], up, [0.0, 0.0]),
                Vertex::new([hw, 0.0, -hd], up, [1.0, 0.0]),
                Vertex::new([hw, 0.0, hd], up, [1.0, 1.0]),
                Vertex::new([-hw, 0.0, hd], up, [0.0, 1.0]),
            ],
            indices: vec![0, 2, 1, 0, 3, 2],
        }
    }

    /// Vertex data as raw bytes for upload.
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index data as raw bytes for upload.
    #[must_use]
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Axis-aligned bounds of the positions, or `None` for an empty mesh.
    #[must_use]
    pub fn aabb(&self) -> Option<(Vec3, Vec3)> {
        let mut verts = self.vertices.iter().map(|v| Vec3::from(v.position));
        let first = verts.next()?;
        let (min, max) = verts.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some((min, max))
    }
}
