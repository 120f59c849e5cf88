//! Counted Resource Cell
//!
//! Explicit reference counting with a deletion policy, the ownership unit
//! stored by [`ResourceRegistry`](crate::ResourceRegistry).
//!
//! # Design Principles
//! - The count is a plain integer behind `&mut`: all mutations happen on the
//!   single render thread that owns the registry, so no atomics are needed.
//! - Teardown is an explicit capability ([`ResourceTeardown`]) rather than a
//!   destructor, because freeing GPU objects needs the backend in hand.
//! - Teardown fires exactly once, on the 1 → 0 transition under
//!   [`DeletionPolicy::Delete`]. Releasing past zero is a double-release bug
//!   and panics.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::render::backend::GpuBackend;

/// Process-unique resource ID generator.
static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a counted resource.
///
/// Two loads that hit the same registry entry observe the same ID; a reload
/// after eviction gets a fresh one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ResourceId(u64);

impl ResourceId {
    fn next() -> Self {
        Self(NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw ID value, usable as a cache key.
    #[inline]
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Controls whether a resource self-destructs when its count reaches zero.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum DeletionPolicy {
    /// Tear the resource down on the 1 → 0 count transition.
    #[default]
    Delete,
    /// Never tear down automatically. Used for shared defaults whose real
    /// owner lives outside the registry; they survive at count zero.
    Keep,
}

/// Capability to free whatever a resource owns on the GPU or CPU.
///
/// CPU-only resources ignore the backend argument.
pub trait ResourceTeardown {
    fn teardown(&mut self, gpu: &mut dyn GpuBackend);
}

/// A reference-counted resource cell.
///
/// Owns the resource value, its count, and its deletion policy. Created with
/// a count of one (the creator's reference).
#[derive(Debug)]
pub struct Counted<T: ResourceTeardown> {
    inner: Option<T>,
    refs: u32,
    policy: DeletionPolicy,
    id: ResourceId,
}

impl<T: ResourceTeardown> Counted<T> {
    /// Wraps a resource with an initial count of one.
    pub fn new(value: T, policy: DeletionPolicy) -> Self {
        Self {
            inner: Some(value),
            refs: 1,
            policy,
            id: ResourceId::next(),
        }
    }

    /// Increments the reference count.
    pub fn add_ref(&mut self) -> u32 {
        self.refs += 1;
        self.refs
    }

    /// Decrements the reference count, returning the remaining count.
    ///
    /// On the 1 → 0 transition under [`DeletionPolicy::Delete`] the resource
    /// is torn down through `gpu` and dropped.
    ///
    /// # Panics
    ///
    /// Panics if the count is already zero. A release past zero means some
    /// caller released a reference it did not own.
    pub fn release(&mut self, gpu: &mut dyn GpuBackend) -> u32 {
        assert!(
            self.refs > 0,
            "release on a resource whose reference count is already zero (double release)"
        );
        self.refs -= 1;
        if self.refs == 0 && self.policy == DeletionPolicy::Delete {
            // `take` guarantees teardown runs at most once.
            if let Some(mut value) = self.inner.take() {
                value.teardown(gpu);
            }
        }
        self.refs
    }

    /// Tears the resource down now, regardless of count or policy.
    ///
    /// Used by registry shutdown. Idempotent.
    pub fn destroy(&mut self, gpu: &mut dyn GpuBackend) {
        if let Some(mut value) = self.inner.take() {
            value.teardown(gpu);
        }
    }

    /// Current reference count.
    #[inline]
    #[must_use]
    pub fn ref_count(&self) -> u32 {
        self.refs
    }

    #[inline]
    #[must_use]
    pub fn policy(&self) -> DeletionPolicy {
        self.policy
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// `true` once teardown has run.
    #[inline]
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.inner.is_none()
    }

    /// The resource value, if not yet torn down.
    #[inline]
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        self.inner.as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.inner.as_mut()
    }
}
