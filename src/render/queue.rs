//! Render Queue
//!
//! Draw submissions are collected over the frame, sorted by a packed key,
//! and flushed to the backend in one pass. Opaque draws sort front-to-back
//! (cheap early-Z), transparent draws back-to-front (correct blending).

use crate::render::backend::{DrawSubmission, GpuBackend};

/// Coarse draw ordering group.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Bucket {
    Opaque,
    Transparent,
}

/// Packed sort key: bucket, material, depth.
///
/// Layout (high to low): 2 bucket bits, 22 material bits, 30 depth bits
/// taken from the float's bit pattern (valid for non-negative depths, which
/// view-space distances are).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey(u64);

impl SortKey {
    #[must_use]
    pub fn new(bucket: Bucket, material_id: u32, depth: f32) -> Self {
        debug_assert!(
            material_id < 1 << 22,
            "material id exceeds the 22-bit sort key budget"
        );
        let b_bits = (bucket as u64 & 0x3) << 62;
        let m_bits = (u64::from(material_id) & 0x3F_FFFF) << 30;
        let d_u32 = if depth.is_sign_negative() {
            0
        } else {
            depth.to_bits() >> 2
        };
        let d_bits = u64::from(d_u32) & 0x3FFF_FFFF;
        Self(b_bits | m_bits | d_bits)
    }

    #[inline]
    #[must_use]
    pub fn bits(self) -> u64 {
        self.0
    }
}

struct QueuedDraw {
    key: SortKey,
    draw: DrawSubmission,
}

/// Per-frame list of draw submissions.
///
/// The backing vectors are reused across frames; `flush` clears but does not
/// shrink them.
#[derive(Default)]
pub struct RenderQueue {
    opaque: Vec<QueuedDraw>,
    transparent: Vec<QueuedDraw>,
}

impl RenderQueue {
    #[must_use]
    pub fn new() -> Self {
        Self {
            opaque: Vec::with_capacity(512),
            transparent: Vec::with_capacity(128),
        }
    }

    /// Enqueues one draw. `depth` is the view-space distance used for
    /// ordering within the bucket.
    pub fn push(&mut self, bucket: Bucket, depth: f32, draw: DrawSubmission) {
        let key = SortKey::new(bucket, draw.material_id, depth);
        let item = QueuedDraw { key, draw };
        match bucket {
            Bucket::Opaque => self.opaque.push(item),
            Bucket::Transparent => self.transparent.push(item),
        }
    }

    /// Sorts both buckets and submits everything to the backend, opaque
    /// first, then clears the queue.
    pub fn flush(&mut self, gpu: &mut dyn GpuBackend) {
        self.opaque.sort_unstable_by(|a, b| a.key.cmp(&b.key));
        self.transparent.sort_unstable_by(|a, b| b.key.cmp(&a.key));

        for item in self.opaque.drain(..).chain(self.transparent.drain(..)) {
            gpu.submit(&item.draw);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.opaque.len() + self.transparent.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.opaque.is_empty() && self.transparent.is_empty()
    }
}
