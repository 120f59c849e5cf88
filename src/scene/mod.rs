//! Spatial data consumed by renderable submission.

pub mod transform;

pub use transform::Transform;
