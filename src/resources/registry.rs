//! Keyed Resource Registry
//!
//! Load-once cache mapping string keys to [`Counted`] resources.
//!
//! # Design
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │            ResourceRegistry<T>                   │
//! │                                                  │
//! │  entries: FxHashMap<String, Counted<T>>          │
//! │                                                  │
//! │  load(key, loader)  → hit: existing id,          │
//! │                       miss: loader runs once     │
//! │  add_ref / release  → release erases the slot    │
//! │                       on the 1 → 0 transition    │
//! │  dump()             → one log line per entry     │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! The registry is a plain value: construct it, pass it into the render
//! subsystem, drop it (via [`clear`](ResourceRegistry::clear)) when the
//! subsystem shuts down. There is no global instance.
//!
//! # Eviction
//!
//! A release that drops an entry to zero references under
//! [`DeletionPolicy::Delete`] tears the resource down and removes the map
//! slot, so keys never accumulate as dead tombstones. This cannot race with
//! an in-flight draw: anything enqueued for the current frame holds a
//! reference, so its count is at least one until the queue is flushed and the
//! reference released.

use rustc_hash::FxHashMap;

use crate::errors::{LumenError, Result};
use crate::render::backend::GpuBackend;
use crate::resources::handle::{Counted, DeletionPolicy, ResourceId, ResourceTeardown};

/// Produces a resource for a registry key on a cache miss.
///
/// Implemented for closures of the matching shape.
pub trait ResourceLoader<T> {
    fn load(&mut self, key: &str, gpu: &mut dyn GpuBackend) -> Result<T>;
}

impl<T, F> ResourceLoader<T> for F
where
    F: FnMut(&str, &mut dyn GpuBackend) -> Result<T>,
{
    fn load(&mut self, key: &str, gpu: &mut dyn GpuBackend) -> Result<T> {
        self(key, gpu)
    }
}

/// Keyed cache of counted resources of one type.
pub struct ResourceRegistry<T: ResourceTeardown> {
    /// Label used in log output, e.g. `"meshes"`.
    label: &'static str,
    entries: FxHashMap<String, Counted<T>>,
    /// Counter backing generated keys for resources created in code rather
    /// than loaded from a path.
    next_generated: u64,
}

impl<T: ResourceTeardown> ResourceRegistry<T> {
    #[must_use]
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            entries: FxHashMap::default(),
            next_generated: 0,
        }
    }

    // ── Loading ────────────────────────────────────────────────────────────

    /// Returns the entry for `key`, invoking `loader` only on a cache miss.
    ///
    /// A hit returns the existing entry's ID without touching its reference
    /// count; the identity of the resource is stable for as long as the entry
    /// lives. A miss inserts the loaded resource with a count of one under
    /// [`DeletionPolicy::Delete`].
    pub fn load(
        &mut self,
        key: &str,
        gpu: &mut dyn GpuBackend,
        loader: &mut dyn ResourceLoader<T>,
    ) -> Result<ResourceId> {
        if let Some(entry) = self.entries.get(key) {
            return Ok(entry.id());
        }
        let value = loader.load(key, gpu)?;
        let cell = Counted::new(value, DeletionPolicy::Delete);
        let id = cell.id();
        log::debug!("{}: loaded '{key}'", self.label);
        self.entries.insert(key.to_owned(), cell);
        Ok(id)
    }

    /// Inserts an already-built resource under an explicit key.
    ///
    /// Fails with [`LumenError::DuplicateKey`] if the key is occupied.
    pub fn insert(&mut self, key: &str, value: T, policy: DeletionPolicy) -> Result<ResourceId> {
        if self.entries.contains_key(key) {
            return Err(LumenError::DuplicateKey(key.to_owned()));
        }
        let cell = Counted::new(value, policy);
        let id = cell.id();
        self.entries.insert(key.to_owned(), cell);
        Ok(id)
    }

    /// Inserts a generated (non-loaded) resource under a fresh unique key and
    /// returns the key.
    pub fn insert_generated(&mut self, value: T, policy: DeletionPolicy) -> (String, ResourceId) {
        let key = format!("{}#{}", self.label, self.next_generated);
        self.next_generated += 1;
        let cell = Counted::new(value, policy);
        let id = cell.id();
        self.entries.insert(key.clone(), cell);
        (key, id)
    }

    // ── Reference counting ─────────────────────────────────────────────────

    /// Increments the count of the entry for `key`.
    ///
    /// # Panics
    ///
    /// Panics if `key` has no entry; taking a reference on a resource that
    /// was never loaded is a programming bug.
    pub fn add_ref(&mut self, key: &str) -> u32 {
        let Some(entry) = self.entries.get_mut(key) else {
            panic!("{}: add_ref on unknown key '{key}'", self.label);
        };
        entry.add_ref()
    }

    /// Decrements the count of the entry for `key`, returning the remaining
    /// count. On the 1 → 0 transition under [`DeletionPolicy::Delete`] the
    /// resource is torn down and the slot removed. `Keep` entries stay
    /// resident at zero.
    ///
    /// # Panics
    ///
    /// Panics on an unknown key or on a release past zero.
    pub fn release(&mut self, key: &str, gpu: &mut dyn GpuBackend) -> u32 {
        let Some(entry) = self.entries.get_mut(key) else {
            panic!("{}: release on unknown key '{key}'", self.label);
        };
        let remaining = entry.release(gpu);
        if remaining == 0 && entry.is_torn_down() {
            self.entries.remove(key);
            log::debug!("{}: evicted '{key}'", self.label);
        }
        remaining
    }

    // ── Lookup ─────────────────────────────────────────────────────────────

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key).and_then(Counted::get)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        self.entries.get_mut(key).and_then(Counted::get_mut)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn id(&self, key: &str) -> Option<ResourceId> {
        self.entries.get(key).map(Counted::id)
    }

    #[must_use]
    pub fn ref_count(&self, key: &str) -> Option<u32> {
        self.entries.get(key).map(Counted::ref_count)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // ── Diagnostics & shutdown ─────────────────────────────────────────────

    /// Logs one line per entry: key, live count, policy, residency.
    ///
    /// A debugging aid, not part of the functional contract.
    pub fn dump(&self) {
        log::info!("{}: {} entries", self.label, self.entries.len());
        for (key, entry) in &self.entries {
            let residency = if entry.is_torn_down() {
                "torn-down"
            } else if entry.ref_count() == 0 {
                "resident (unreferenced)"
            } else {
                "resident"
            };
            log::info!(
                "  '{key}' refs={} policy={:?} {residency}",
                entry.ref_count(),
                entry.policy(),
            );
        }
    }

    /// Tears down every entry, regardless of policy, and empties the map.
    ///
    /// Entries still holding live references are a leak upstream and are
    /// logged as warnings before being destroyed anyway.
    pub fn clear(&mut self, gpu: &mut dyn GpuBackend) {
        for (key, entry) in &mut self.entries {
            if entry.ref_count() > 0 && !entry.is_torn_down() {
                log::warn!(
                    "{}: clearing '{key}' with {} live reference(s)",
                    self.label,
                    entry.ref_count()
                );
            }
            entry.destroy(gpu);
        }
        self.entries.clear();
    }
}
