//! CPU-side resource model: counted cells, keyed registries, and the plain
//! data types (mesh, material) that get uploaded to the GPU backend.

pub mod bytes;
pub mod handle;
pub mod material;
pub mod mesh;
pub mod registry;

pub use bytes::FileSource;
pub use handle::{Counted, DeletionPolicy, ResourceId, ResourceTeardown};
pub use material::Material;
pub use mesh::{MeshData, Vertex};
pub use registry::{ResourceLoader, ResourceRegistry};
