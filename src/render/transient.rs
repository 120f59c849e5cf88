//! Transient Buffer Pool
//!
//! Provides GPU buffer space for short-lived, per-frame data. Allocations are
//! sub-ranges of pooled pages, grouped into power-of-two size classes; a
//! request larger than the biggest class gets a dedicated buffer.
//!
//! # Design
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │               TransientBufferPool                    │
//! │                                                      │
//! │  classes: [SizeClass]   pages + free block lists     │
//! │  in_flight: [Vec<SlotEntry>; 3]  ring by frame % 3   │
//! │  fences:   [Option<FenceHandle>; 3]                  │
//! │                                                      │
//! │  alloc()    → TransientAlloc  (during a frame)       │
//! │  sync()     → fence this frame's slot (frame end)    │
//! │  reclaim()  → wait N-2 fence, free its slot          │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! # The N-2 rule
//!
//! A block written in frame `F` may still be read by the GPU while frames
//! `F` and `F+1` are in flight, so it is only returned to the free lists once
//! frame `F+2` begins and the fence issued at the end of `F` has signaled.
//! Three in-flight slots are enough: during frame `F` the ring holds the
//! allocations of `F`, `F-1`, and `F-2`, and `reclaim` empties the `F-2`
//! slot.
//!
//! A fence that has not signaled within the configured timeout is a stall,
//! not a crash: it is logged and the slot is reclaimed anyway.
//!
//! # Memory strategy
//!
//! Pages are never destroyed during normal rendering; blocks cycle through
//! the free lists. Call [`trim`](TransientBufferPool::trim) after load spikes
//! or resolution changes to release size classes that have gone idle.

use std::time::Duration;

use crate::render::backend::{BufferHandle, BufferUsage, FenceHandle, FenceStatus, GpuBackend};
use crate::settings::EngineSettings;

/// A sub-range of a pooled (or dedicated) backend buffer, valid until the
/// frame it was allocated in is reclaimed.
#[derive(Clone, Copy, Debug)]
pub struct TransientAlloc {
    pub buffer: BufferHandle,
    pub offset: usize,
    pub size: usize,
}

/// Location of one block inside a size class.
#[derive(Clone, Copy, Debug)]
struct BlockIndex {
    page: u32,
    block: u32,
}

/// An allocation owed back to the pool when its frame is reclaimed.
enum SlotEntry {
    Block { class: usize, index: BlockIndex },
    Large { buffer: BufferHandle },
}

struct SizeClass {
    block_size: usize,
    /// One backend buffer per page.
    pages: Vec<BufferHandle>,
    free: Vec<BlockIndex>,
    /// Frames since this class last served an allocation. Drives `trim`.
    idle_frames: u32,
}

/// Per-class counts reported by [`TransientBufferPool::stats`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassStats {
    pub block_size: usize,
    pub free_blocks: usize,
    pub total_blocks: usize,
}

/// Pool of per-frame GPU buffer space with fenced, frame-delayed reclamation.
pub struct TransientBufferPool {
    classes: Vec<SizeClass>,
    min_block_log: u32,
    max_block_size: usize,
    page_size: usize,
    fence_timeout: Duration,

    in_flight: [Vec<SlotEntry>; 3],
    fences: [Option<FenceHandle>; 3],
    /// Ring slot receiving this frame's allocations.
    sync_cycle: usize,
}

impl TransientBufferPool {
    #[must_use]
    pub fn new(settings: &EngineSettings) -> Self {
        settings.validate();
        let min_log = settings.min_block_size.trailing_zeros();
        let max_log = settings.max_block_size.trailing_zeros();
        let classes = (min_log..=max_log)
            .map(|log| SizeClass {
                block_size: 1usize << log,
                pages: Vec::new(),
                free: Vec::new(),
                idle_frames: 0,
            })
            .collect();
        Self {
            classes,
            min_block_log: min_log,
            max_block_size: settings.max_block_size,
            page_size: settings.transient_page_size,
            fence_timeout: settings.fence_timeout,
            in_flight: [Vec::new(), Vec::new(), Vec::new()],
            fences: [None, None, None],
            sync_cycle: 0,
        }
    }

    // ── Allocation (during a frame) ────────────────────────────────────────

    /// Allocates transient space for `bytes` and uploads them.
    ///
    /// The returned range belongs to the current frame's slot and is handed
    /// back to the pool automatically two frames later.
    pub fn alloc(&mut self, gpu: &mut dyn GpuBackend, bytes: &[u8]) -> TransientAlloc {
        assert!(!bytes.is_empty(), "zero-size transient allocation");

        if bytes.len() > self.max_block_size {
            return self.alloc_large(gpu, bytes);
        }

        let class = self.class_for(bytes.len());
        let index = self.take_block(gpu, class);
        let offset = index.block as usize * self.classes[class].block_size;
        let buffer = self.classes[class].pages[index.page as usize];
        gpu.write_buffer(buffer, offset, bytes);

        self.classes[class].idle_frames = 0;
        self.in_flight[self.sync_cycle].push(SlotEntry::Block { class, index });
        TransientAlloc {
            buffer,
            offset,
            size: bytes.len(),
        }
    }

    fn alloc_large(&mut self, gpu: &mut dyn GpuBackend, bytes: &[u8]) -> TransientAlloc {
        log::debug!("transient large allocation: {} bytes", bytes.len());
        let buffer = gpu.create_buffer(bytes.len(), BufferUsage::TRANSIENT, Some(bytes));
        self.in_flight[self.sync_cycle].push(SlotEntry::Large { buffer });
        TransientAlloc {
            buffer,
            offset: 0,
            size: bytes.len(),
        }
    }

    fn class_for(&self, size: usize) -> usize {
        let log = size.next_power_of_two().trailing_zeros();
        log.saturating_sub(self.min_block_log) as usize
    }

    fn take_block(&mut self, gpu: &mut dyn GpuBackend, class: usize) -> BlockIndex {
        if self.classes[class].free.is_empty() {
            self.grow_class(gpu, class);
        }
        self.classes[class]
            .free
            .pop()
            .expect("grow_class must leave free blocks")
    }

    fn grow_class(&mut self, gpu: &mut dyn GpuBackend, class: usize) {
        let c = &mut self.classes[class];
        let buffer = gpu.create_buffer(
            self.page_size,
            BufferUsage::TRANSIENT | BufferUsage::UNIFORM,
            None,
        );
        let page = c.pages.len() as u32;
        c.pages.push(buffer);
        let blocks = (self.page_size / c.block_size) as u32;
        for block in 0..blocks {
            c.free.push(BlockIndex { page, block });
        }
        log::debug!(
            "transient pool grew: class {} B, page {page}, {blocks} blocks",
            c.block_size
        );
    }

    // ── Frame boundary ─────────────────────────────────────────────────────

    /// Fences the current frame's slot and advances the ring. Called once
    /// from `end_frame`.
    pub fn sync(&mut self, gpu: &mut dyn GpuBackend) {
        debug_assert!(
            self.fences[self.sync_cycle].is_none(),
            "slot fenced twice without reclamation"
        );
        self.fences[self.sync_cycle] = Some(gpu.fence());
        self.sync_cycle = (self.sync_cycle + 1) % 3;
    }

    /// Reclaims the slot two frames back: waits on its fence (logging a
    /// warning on timeout) and returns its allocations to the free lists.
    /// Called once from `begin_frame`.
    pub fn reclaim(&mut self, gpu: &mut dyn GpuBackend) {
        // With the ring advanced at each sync, the slot after the current one
        // holds frame N-2's allocations.
        let slot = (self.sync_cycle + 1) % 3;

        if let Some(fence) = self.fences[slot].take() {
            if gpu.wait_fence(fence, self.fence_timeout) == FenceStatus::TimedOut {
                log::warn!(
                    "timeout expired while waiting for frame N-2 to finish; reclaiming anyway"
                );
            }
            gpu.delete_fence(fence);
        }

        // Detach the slot's list so its entries can be pushed back into the
        // size classes; the vector (and its capacity) is returned afterwards.
        let mut entries = std::mem::take(&mut self.in_flight[slot]);
        for entry in entries.drain(..) {
            match entry {
                SlotEntry::Block { class, index } => self.classes[class].free.push(index),
                SlotEntry::Large { buffer } => gpu.destroy_buffer(buffer),
            }
        }
        self.in_flight[slot] = entries;

        for c in &mut self.classes {
            c.idle_frames = c.idle_frames.saturating_add(1);
        }
    }

    // ── Maintenance ────────────────────────────────────────────────────────

    /// Destroys the pages of size classes that are fully free and have not
    /// served an allocation for more than `max_idle_frames`.
    pub fn trim(&mut self, gpu: &mut dyn GpuBackend, max_idle_frames: u32) {
        for c in &mut self.classes {
            let blocks_per_page = self.page_size / c.block_size;
            let fully_free = c.free.len() == c.pages.len() * blocks_per_page;
            if fully_free && !c.pages.is_empty() && c.idle_frames > max_idle_frames {
                log::debug!(
                    "trimming transient class {} B ({} pages)",
                    c.block_size,
                    c.pages.len()
                );
                for page in c.pages.drain(..) {
                    gpu.destroy_buffer(page);
                }
                c.free.clear();
            }
        }
    }

    /// Per-class block counts, for debug overlays and tests.
    #[must_use]
    pub fn stats(&self) -> Vec<ClassStats> {
        self.classes
            .iter()
            .map(|c| ClassStats {
                block_size: c.block_size,
                free_blocks: c.free.len(),
                total_blocks: c.pages.len() * (self.page_size / c.block_size),
            })
            .collect()
    }

    /// Allocations still owed to the pool across all in-flight slots.
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.iter().map(Vec::len).sum()
    }

    /// Releases every page and pending large buffer. Only valid outside a
    /// frame; pending fences are waited on first.
    pub fn shutdown(&mut self, gpu: &mut dyn GpuBackend) {
        for slot in 0..3 {
            if let Some(fence) = self.fences[slot].take() {
                if gpu.wait_fence(fence, self.fence_timeout) == FenceStatus::TimedOut {
                    log::warn!("timeout expired during transient pool shutdown");
                }
                gpu.delete_fence(fence);
            }
            for entry in self.in_flight[slot].drain(..) {
                if let SlotEntry::Large { buffer } = entry {
                    gpu.destroy_buffer(buffer);
                }
                // Pooled blocks die with their pages below.
            }
        }
        for c in &mut self.classes {
            for page in c.pages.drain(..) {
                gpu.destroy_buffer(page);
            }
            c.free.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backend::HeadlessBackend;

    fn pool() -> (TransientBufferPool, HeadlessBackend) {
        let settings = EngineSettings {
            transient_page_size: 1024,
            min_block_size: 64,
            max_block_size: 256,
            ..Default::default()
        };
        (TransientBufferPool::new(&settings), HeadlessBackend::new())
    }

    #[test]
    fn size_class_selection_rounds_up() {
        let (pool, _) = pool();
        assert_eq!(pool.class_for(1), 0);
        assert_eq!(pool.class_for(64), 0);
        assert_eq!(pool.class_for(65), 1);
        assert_eq!(pool.class_for(256), 2);
    }

    #[test]
    fn blocks_recycle_after_two_syncs() {
        let (mut pool, mut gpu) = pool();

        pool.alloc(&mut gpu, &[1u8; 64]);
        assert_eq!(pool.in_flight_count(), 1);
        pool.sync(&mut gpu); // end frame 0

        pool.reclaim(&mut gpu); // begin frame 1: nothing reclaimable yet
        assert_eq!(pool.in_flight_count(), 1);
        pool.sync(&mut gpu); // end frame 1

        pool.reclaim(&mut gpu); // begin frame 2: frame 0's block returns
        assert_eq!(pool.in_flight_count(), 0);
        let stats = pool.stats();
        assert_eq!(stats[0].free_blocks, stats[0].total_blocks);
    }

    #[test]
    fn oversized_requests_use_dedicated_buffers() {
        let (mut pool, mut gpu) = pool();
        let a = pool.alloc(&mut gpu, &vec![7u8; 4096]);
        assert_eq!(a.offset, 0);
        assert_eq!(gpu.buffer_bytes(a.buffer).unwrap()[0], 7);

        pool.sync(&mut gpu);
        pool.reclaim(&mut gpu);
        pool.sync(&mut gpu);
        let live_before = gpu.live_buffer_count();
        pool.reclaim(&mut gpu); // destroys the dedicated buffer
        assert_eq!(gpu.live_buffer_count(), live_before - 1);
    }

    #[test]
    fn trim_releases_idle_classes() {
        let (mut pool, mut gpu) = pool();
        pool.alloc(&mut gpu, &[0u8; 64]);
        // Age the class past the idle threshold with empty frames.
        for _ in 0..5 {
            pool.sync(&mut gpu);
            pool.reclaim(&mut gpu);
        }
        pool.trim(&mut gpu, 3);
        assert_eq!(pool.stats()[0].total_blocks, 0);
        assert_eq!(gpu.live_buffer_count(), 0);
    }
}
