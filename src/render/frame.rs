//! Frame Lifecycle
//!
//! [`FrameCycle`] owns the monotonic frame counter, the `Idle`/`InFrame`
//! state, and the transient buffer pool. The render loop brackets every frame
//! with [`begin_frame`](FrameCycle::begin_frame) and
//! [`end_frame`](FrameCycle::end_frame):
//!
//! - `begin_frame` reclaims the transient allocations of frame N-2 (their
//!   fence has had two frames to signal).
//! - `end_frame` fences this frame's transient slot and then increments the
//!   frame counter by exactly one.
//!
//! Frame-to-frame sequencing is the only temporal guarantee the core relies
//! on; everything runs on the single render thread.

use crate::render::backend::GpuBackend;
use crate::render::transient::{TransientAlloc, TransientBufferPool};
use crate::settings::EngineSettings;

/// Where the render loop currently is.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FrameState {
    Idle,
    InFrame,
}

/// Per-frame sequencing: counter, state, and transient reclamation.
pub struct FrameCycle {
    state: FrameState,
    frame_counter: u64,
    pool: TransientBufferPool,
    trim_idle_frames: u32,
}

impl FrameCycle {
    #[must_use]
    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            state: FrameState::Idle,
            frame_counter: 0,
            pool: TransientBufferPool::new(settings),
            trim_idle_frames: settings.trim_idle_frames,
        }
    }

    /// Opens a frame and reclaims frame N-2's transient allocations.
    ///
    /// A `begin_frame` while already in a frame means the previous frame was
    /// never ended; it is tolerated with a warning and does not advance the
    /// counter.
    pub fn begin_frame(&mut self, gpu: &mut dyn GpuBackend) {
        if self.state == FrameState::InFrame {
            log::warn!(
                "begin_frame while frame {} is still open (missing end_frame?)",
                self.frame_counter
            );
        }
        self.state = FrameState::InFrame;
        self.pool.reclaim(gpu);
    }

    /// Closes the frame: fences this frame's transient slot, then increments
    /// the frame counter by exactly one.
    ///
    /// # Panics
    ///
    /// Panics when no frame is open; an unpaired `end_frame` is a bug in the
    /// render loop.
    pub fn end_frame(&mut self, gpu: &mut dyn GpuBackend) {
        assert!(
            self.state == FrameState::InFrame,
            "end_frame without a matching begin_frame"
        );
        self.pool.sync(gpu);
        self.frame_counter += 1;
        self.state = FrameState::Idle;
    }

    /// Monotonic count of completed frames.
    #[inline]
    #[must_use]
    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Allocates transient space for this frame and uploads `bytes`.
    ///
    /// # Panics
    ///
    /// Panics outside a frame; transient data has no meaning without one.
    pub fn alloc_transient(&mut self, gpu: &mut dyn GpuBackend, bytes: &[u8]) -> TransientAlloc {
        assert!(
            self.state == FrameState::InFrame,
            "transient allocation outside begin_frame/end_frame"
        );
        self.pool.alloc(gpu, bytes)
    }

    /// Shrinks the transient pool using the configured idle threshold.
    /// Cheap; call it on a coarse cadence (e.g. once a second).
    pub fn trim_transients(&mut self, gpu: &mut dyn GpuBackend) {
        self.pool.trim(gpu, self.trim_idle_frames);
    }

    /// Read access to the transient pool, for stats overlays.
    #[must_use]
    pub fn transient_pool(&self) -> &TransientBufferPool {
        &self.pool
    }

    /// Releases all pool memory. Only valid between frames.
    pub fn shutdown(&mut self, gpu: &mut dyn GpuBackend) {
        assert!(
            self.state == FrameState::Idle,
            "shutdown during an open frame"
        );
        self.pool.shutdown(gpu);
    }
}
