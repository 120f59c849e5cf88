//! Material description.
//!
//! Thin on purpose: the core needs a material identity for sort keys and a
//! transparency flag for bucketing. Shading parameters live here so loaders
//! have somewhere to put them, but no shader system interprets them yet.

use std::sync::atomic::{AtomicU32, Ordering};

use glam::Vec4;

static NEXT_MATERIAL_ID: AtomicU32 = AtomicU32::new(1);

/// Surface description attached to renderables.
#[derive(Clone, Debug)]
pub struct Material {
    pub name: String,
    /// Linear-space RGBA base color.
    pub base_color: Vec4,
    /// Skip lighting entirely.
    pub unlit: bool,
    /// Transparent materials sort into the back-to-front bucket.
    pub transparent: bool,
    /// Registry key of the base color texture, when textured.
    pub texture_key: Option<String>,
    id: u32,
}

impl Material {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_color: Vec4::ONE,
            unlit: false,
            transparent: false,
            texture_key: None,
            id: NEXT_MATERIAL_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Process-unique ID, packed into draw sort keys. Keys carry 22 bits of
    /// material ID, so distinct IDs group distinctly up to 4M materials per
    /// process.
    #[inline]
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }
}
