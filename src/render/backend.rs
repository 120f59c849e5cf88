//! GPU Backend Abstraction
//!
//! The engine core never talks to a graphics API directly; it drives a
//! [`GpuBackend`] that owns buffers, accepts draw submissions, and hands out
//! fences. A real implementation wraps the platform API. The bundled
//! [`HeadlessBackend`] records everything it is asked to do, which makes it
//! both the test double and a usable backend for headless tools.

use std::time::Duration;

use bitflags::bitflags;
use glam::Mat4;
use slotmap::{SlotMap, new_key_type};

bitflags! {
    /// Intended use of a backend buffer.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct BufferUsage: u32 {
        const VERTEX    = 1 << 0;
        const INDEX     = 1 << 1;
        const UNIFORM   = 1 << 2;
        /// Per-frame data; contents are only valid until reclamation.
        const TRANSIENT = 1 << 3;
    }
}

new_key_type! {
    /// Handle to a backend-owned buffer.
    pub struct BufferHandle;

    /// Handle to a backend fence.
    pub struct FenceHandle;
}

/// Result of waiting on a fence.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FenceStatus {
    Signaled,
    TimedOut,
}

/// One draw call worth of state, produced by renderables and consumed by the
/// backend when the queue flushes.
#[derive(Clone, Debug)]
pub struct DrawSubmission {
    pub vertex_buffer: BufferHandle,
    pub vertex_count: u32,
    /// `None` draws non-indexed.
    pub index_buffer: Option<BufferHandle>,
    pub index_count: u32,
    pub transform: Mat4,
    pub material_id: u32,
}

/// The GPU collaborator interface.
///
/// Single-threaded by design: the render thread owns the backend, and fences
/// are the only CPU/GPU synchronization primitive.
pub trait GpuBackend {
    /// Allocates a buffer, optionally filled with `initial` (which must fit).
    fn create_buffer(
        &mut self,
        size: usize,
        usage: BufferUsage,
        initial: Option<&[u8]>,
    ) -> BufferHandle;

    /// Writes `bytes` into the buffer at `offset`.
    ///
    /// # Panics
    ///
    /// Panics on an unknown handle or an out-of-bounds write; both are
    /// programming bugs.
    fn write_buffer(&mut self, buffer: BufferHandle, offset: usize, bytes: &[u8]);

    /// Frees a buffer. Unknown handles panic (double destroy).
    fn destroy_buffer(&mut self, buffer: BufferHandle);

    /// Queues one draw for the current frame.
    fn submit(&mut self, draw: &DrawSubmission);

    /// Inserts a fence after all work submitted so far.
    fn fence(&mut self) -> FenceHandle;

    /// Blocks until the fence signals or `timeout` elapses.
    fn wait_fence(&mut self, fence: FenceHandle, timeout: Duration) -> FenceStatus;

    /// Releases a fence object.
    fn delete_fence(&mut self, fence: FenceHandle);
}

// ─── Headless backend ─────────────────────────────────────────────────────────

struct HeadlessBuffer {
    data: Vec<u8>,
    usage: BufferUsage,
}

/// Number of `wait_fence` calls left before a headless fence signals.
struct HeadlessFence {
    remaining_waits: u32,
}

/// A backend that performs no GPU work and records everything instead.
///
/// Fences signal immediately by default; set
/// [`set_fence_latency`](Self::set_fence_latency) to make each fence require
/// that many `wait_fence` calls first, which is how tests exercise the stall
/// path.
#[derive(Default)]
pub struct HeadlessBackend {
    buffers: SlotMap<BufferHandle, HeadlessBuffer>,
    fences: SlotMap<FenceHandle, HeadlessFence>,
    submissions: Vec<DrawSubmission>,
    fence_latency: u32,
    buffers_created: u32,
    buffers_destroyed: u32,
}

impl HeadlessBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every fence created from now on signals only after this many
    /// `wait_fence` calls.
    pub fn set_fence_latency(&mut self, waits: u32) {
        self.fence_latency = waits;
    }

    /// Draws recorded since construction, in submission order.
    #[must_use]
    pub fn submissions(&self) -> &[DrawSubmission] {
        &self.submissions
    }

    pub fn clear_submissions(&mut self) {
        self.submissions.clear();
    }

    /// Currently live (created and not destroyed) buffers.
    #[must_use]
    pub fn live_buffer_count(&self) -> usize {
        self.buffers.len()
    }

    #[must_use]
    pub fn buffers_created(&self) -> u32 {
        self.buffers_created
    }

    #[must_use]
    pub fn buffers_destroyed(&self) -> u32 {
        self.buffers_destroyed
    }

    /// Snapshot of a buffer's contents.
    #[must_use]
    pub fn buffer_bytes(&self, buffer: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(buffer).map(|b| b.data.as_slice())
    }

    /// The usage flags a buffer was created with.
    #[must_use]
    pub fn buffer_usage(&self, buffer: BufferHandle) -> Option<BufferUsage> {
        self.buffers.get(buffer).map(|b| b.usage)
    }
}

impl GpuBackend for HeadlessBackend {
    fn create_buffer(
        &mut self,
        size: usize,
        usage: BufferUsage,
        initial: Option<&[u8]>,
    ) -> BufferHandle {
        let mut data = vec![0u8; size];
        if let Some(bytes) = initial {
            assert!(bytes.len() <= size, "initial data larger than buffer");
            data[..bytes.len()].copy_from_slice(bytes);
        }
        self.buffers_created += 1;
        self.buffers.insert(HeadlessBuffer { data, usage })
    }

    fn write_buffer(&mut self, buffer: BufferHandle, offset: usize, bytes: &[u8]) {
        let Some(buf) = self.buffers.get_mut(buffer) else {
            panic!("write_buffer on unknown buffer handle");
        };
        assert!(
            offset + bytes.len() <= buf.data.len(),
            "write_buffer out of bounds: offset {offset} + {} > {}",
            bytes.len(),
            buf.data.len()
        );
        buf.data[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        assert!(
            self.buffers.remove(buffer).is_some(),
            "destroy_buffer on unknown buffer handle (double destroy?)"
        );
        self.buffers_destroyed += 1;
    }

    fn submit(&mut self, draw: &DrawSubmission) {
        self.submissions.push(draw.clone());
    }

    fn fence(&mut self) -> FenceHandle {
        self.fences.insert(HeadlessFence {
            remaining_waits: self.fence_latency,
        })
    }

    fn wait_fence(&mut self, fence: FenceHandle, _timeout: Duration) -> FenceStatus {
        let Some(f) = self.fences.get_mut(fence) else {
            panic!("wait_fence on unknown fence handle");
        };
        if f.remaining_waits == 0 {
            FenceStatus::Signaled
        } else {
            f.remaining_waits -= 1;
            FenceStatus::TimedOut
        }
    }

    fn delete_fence(&mut self, fence: FenceHandle) {
        assert!(
            self.fences.remove(fence).is_some(),
            "delete_fence on unknown fence handle"
        );
    }
}
