//! Renderable submission glue: GPU meshes, mesh renderables, and models.
//!
//! A [`GpuMesh`] is the uploaded form of
//! [`MeshData`](crate::resources::MeshData) and lives in a
//! [`ResourceRegistry`](crate::ResourceRegistry) under a string key. A
//! [`MeshRenderable`] pairs one mesh entry with a material and knows how to
//! enqueue itself; a [`Model`] is a named group of renderables drawn under a
//! single world transform.
//!
//! Ownership: a renderable holds one registry reference on its mesh for its
//! whole life, so a mesh it submits can never be evicted mid-frame. Dropping
//! the last renderable (via [`MeshRenderable::destroy`]) cascades into the
//! registry release that frees the GPU buffers.

use glam::{Mat4, Vec3};
use smallvec::SmallVec;

use crate::errors::{LumenError, Result};
use crate::render::backend::{BufferHandle, BufferUsage, DrawSubmission, GpuBackend};
use crate::render::queue::{Bucket, RenderQueue};
use crate::resources::handle::ResourceTeardown;
use crate::resources::material::Material;
use crate::resources::mesh::MeshData;
use crate::resources::registry::ResourceRegistry;

/// Vertex/index buffers uploaded to the backend.
#[derive(Debug)]
pub struct GpuMesh {
    pub vertex_buffer: BufferHandle,
    pub vertex_count: u32,
    pub index_buffer: Option<BufferHandle>,
    pub index_count: u32,
}

impl GpuMesh {
    /// Uploads CPU mesh data into fresh backend buffers.
    pub fn upload(gpu: &mut dyn GpuBackend, data: &MeshData) -> Self {
        let vertex_bytes = data.vertex_bytes();
        let vertex_buffer =
            gpu.create_buffer(vertex_bytes.len(), BufferUsage::VERTEX, Some(vertex_bytes));
        let index_buffer = if data.indices.is_empty() {
            None
        } else {
            let index_bytes = data.index_bytes();
            Some(gpu.create_buffer(index_bytes.len(), BufferUsage::INDEX, Some(index_bytes)))
        };
        Self {
            vertex_buffer,
            vertex_count: data.vertices.len() as u32,
            index_buffer,
            index_count: data.indices.len() as u32,
        }
    }
}

impl ResourceTeardown for GpuMesh {
    fn teardown(&mut self, gpu: &mut dyn GpuBackend) {
        gpu.destroy_buffer(self.vertex_buffer);
        if let Some(index_buffer) = self.index_buffer.take() {
            gpu.destroy_buffer(index_buffer);
        }
    }
}

/// One mesh + material pairing that can enqueue itself for drawing.
pub struct MeshRenderable {
    mesh_key: String,
    material_id: u32,
    bucket: Bucket,
}

impl MeshRenderable {
    /// Creates a renderable over the mesh registered under `mesh_key`,
    /// taking a registry reference on it.
    pub fn new(
        meshes: &mut ResourceRegistry<GpuMesh>,
        mesh_key: &str,
        material: &Material,
    ) -> Result<Self> {
        if !meshes.contains(mesh_key) {
            return Err(LumenError::ResourceNotFound(mesh_key.to_owned()));
        }
        meshes.add_ref(mesh_key);
        Ok(Self {
            mesh_key: mesh_key.to_owned(),
            material_id: material.id(),
            bucket: if material.transparent {
                Bucket::Transparent
            } else {
                Bucket::Opaque
            },
        })
    }

    #[must_use]
    pub fn mesh_key(&self) -> &str {
        &self.mesh_key
    }

    /// Enqueues this renderable for the current frame. `depth` is the
    /// view-space distance used for sorting.
    ///
    /// The mesh entry is alive by construction (this renderable holds a
    /// reference on it).
    pub fn render(
        &self,
        meshes: &ResourceRegistry<GpuMesh>,
        queue: &mut RenderQueue,
        transform: Mat4,
        depth: f32,
    ) {
        let Some(mesh) = meshes.get(&self.mesh_key) else {
            // Unreachable while this renderable holds its reference; losing
            // the entry anyway means the refcount protocol was violated.
            log::error!("mesh '{}' missing during submission", self.mesh_key);
            return;
        };
        queue.push(
            self.bucket,
            depth,
            DrawSubmission {
                vertex_buffer: mesh.vertex_buffer,
                vertex_count: mesh.vertex_count,
                index_buffer: mesh.index_buffer,
                index_count: mesh.index_count,
                transform,
                material_id: self.material_id,
            },
        );
    }

    /// Releases the mesh reference. Must not be called while this
    /// renderable's submissions are still queued for the current frame;
    /// flush the queue first.
    pub fn destroy(self, meshes: &mut ResourceRegistry<GpuMesh>, gpu: &mut dyn GpuBackend) {
        meshes.release(&self.mesh_key, gpu);
    }
}

/// A named group of renderable parts sharing one world transform.
pub struct Model {
    pub name: String,
    parts: SmallVec<[MeshRenderable; 4]>,
}

impl Model {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parts: SmallVec::new(),
        }
    }

    pub fn add_part(&mut self, part: MeshRenderable) {
        self.parts.push(part);
    }

    #[must_use]
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Enqueues every part under `world`. Depth is the squared distance from
    /// `view_position` to the model origin, shared by all parts.
    pub fn render(
        &self,
        meshes: &ResourceRegistry<GpuMesh>,
        queue: &mut RenderQueue,
        world: Mat4,
        view_position: Vec3,
    ) {
        let origin = world.w_axis.truncate();
        let depth = view_position.distance_squared(origin);
        for part in &self.parts {
            part.render(meshes, queue, world, depth);
        }
    }

    /// Destroys every part, cascading the mesh releases.
    pub fn destroy(self, meshes: &mut ResourceRegistry<GpuMesh>, gpu: &mut dyn GpuBackend) {
        for part in self.parts {
            part.destroy(meshes, gpu);
        }
    }
}
