#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod errors;
pub mod render;
pub mod resources;
pub mod scene;
pub mod settings;

pub use errors::{LumenError, Result};
pub use render::backend::{
    BufferHandle, BufferUsage, DrawSubmission, FenceHandle, FenceStatus, GpuBackend,
    HeadlessBackend,
};
pub use render::frame::{FrameCycle, FrameState};
pub use render::queue::{Bucket, RenderQueue, SortKey};
pub use render::renderable::{GpuMesh, MeshRenderable, Model};
pub use render::transient::{TransientAlloc, TransientBufferPool};
pub use resources::bytes::FileSource;
pub use resources::handle::{Counted, DeletionPolicy, ResourceId, ResourceTeardown};
pub use resources::material::Material;
pub use resources::mesh::{MeshData, Vertex};
pub use resources::registry::{ResourceLoader, ResourceRegistry};
pub use scene::transform::Transform;
pub use settings::EngineSettings;
