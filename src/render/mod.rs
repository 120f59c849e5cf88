//! The render core: GPU backend abstraction, frame lifecycle, transient
//! buffer pool, and the sort-keyed submission queue.

pub mod backend;
pub mod frame;
pub mod queue;
pub mod renderable;
pub mod transient;

pub use backend::{
    BufferHandle, BufferUsage, DrawSubmission, FenceHandle, FenceStatus, GpuBackend,
    HeadlessBackend,
};
pub use frame::{FrameCycle, FrameState};
pub use queue::{Bucket, RenderQueue, SortKey};
pub use renderable::{GpuMesh, MeshRenderable, Model};
pub use transient::{TransientAlloc, TransientBufferPool};
