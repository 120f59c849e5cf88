//! Engine Settings
//!
//! Global configuration consumed once when the render core is constructed.
//!
//! The defaults are tuned for a desktop frame budget: a 256 KiB transient
//! page split into power-of-two blocks between 256 B and 64 KiB, and a 1 ms
//! fence wait before a frame is considered stalled.
//!
//! # Example
//!
//! ```rust,ignore
//! use lumen::{EngineSettings, FrameCycle};
//!
//! let settings = EngineSettings {
//!     fence_timeout: std::time::Duration::from_millis(4),
//!     ..Default::default()
//! };
//! let frame = FrameCycle::new(&settings);
//! ```

use std::time::Duration;

/// Global configuration for the render core.
///
/// Consumed once by [`FrameCycle::new`](crate::FrameCycle::new) to size the
/// transient buffer pool and set synchronization policy. Runtime changes are
/// not supported; rebuild the frame cycle to apply new settings.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Size in bytes of one transient pool page. Each page is a single
    /// backend buffer sub-allocated into fixed-size blocks.
    ///
    /// Must be a power of two and at least `max_block_size`.
    pub transient_page_size: usize,

    /// Smallest transient block size class in bytes. Requests below this are
    /// rounded up. Must be a power of two.
    pub min_block_size: usize,

    /// Largest pooled block size class in bytes. Requests above this get a
    /// dedicated buffer that is destroyed on reclamation instead of being
    /// returned to a free list. Must be a power of two.
    pub max_block_size: usize,

    /// How long to wait on the frame N-2 fence before logging a stall and
    /// reclaiming anyway.
    pub fence_timeout: Duration,

    /// Number of frames a fully-free size class may sit idle before
    /// [`TransientBufferPool::trim`](crate::TransientBufferPool::trim)
    /// releases its pages.
    pub trim_idle_frames: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            transient_page_size: 256 * 1024,
            min_block_size: 256,
            max_block_size: 64 * 1024,
            fence_timeout: Duration::from_millis(1),
            trim_idle_frames: 600,
        }
    }
}

impl EngineSettings {
    /// Panics if the pool sizing fields are inconsistent.
    ///
    /// Called by the frame cycle during construction; exposed so embedders
    /// validating external configuration can fail early.
    pub fn validate(&self) {
        assert!(
            self.min_block_size.is_power_of_two(),
            "min_block_size must be a power of two"
        );
        assert!(
            self.max_block_size.is_power_of_two(),
            "max_block_size must be a power of two"
        );
        assert!(
            self.transient_page_size.is_power_of_two(),
            "transient_page_size must be a power of two"
        );
        assert!(
            self.min_block_size <= self.max_block_size,
            "min_block_size must not exceed max_block_size"
        );
        assert!(
            self.max_block_size <= self.transient_page_size,
            "transient_page_size must hold at least one max-size block"
        );
    }
}
