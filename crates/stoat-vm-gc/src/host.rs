//! Host runtime seam: opaque handles and the traversal/refcount adapter.
//!
//! The collector operates over an object graph it does not own. The host
//! runtime mints opaque handles for objects, reference slots and workers
//! and exposes its object model through [`RuntimeHost`]; the collector
//! never dereferences a handle itself and holding one does not extend any
//! object's lifetime.

use std::num::NonZeroU64;

/// Opaque handle to a host-managed object.
///
/// The raw value is minted by the host, typically the object's address or
/// allocation id. Used purely as a lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef(NonZeroU64);

impl ObjectRef {
    /// Wrap a raw host value. Returns `None` for the null object.
    #[inline]
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    /// The raw host value.
    #[inline]
    pub fn as_raw(self) -> u64 {
        self.0.get()
    }
}

/// Address of a reference location inside a host object.
///
/// Clearing a slot through [`RuntimeHost::clear_reference`] atomically
/// stores the null reference and drops one strong count from the slot's
/// previous target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot(u64);

impl Slot {
    /// Wrap a raw slot address.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw slot address.
    #[inline]
    pub fn as_raw(self) -> u64 {
        self.0
    }
}

/// Opaque identity token for a runtime worker thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerId(u64);

impl WorkerId {
    /// Wrap a raw worker identity.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw worker identity.
    #[inline]
    pub fn as_raw(self) -> u64 {
        self.0
    }
}

/// The host runtime's view of its object model and roots.
///
/// One implementation per embedding. Every method is invoked with the
/// coordinator lock held and must not call back into the collector; the
/// walkers are expected to be non-reentrant and allocation-free.
pub trait RuntimeHost: Send + Sync {
    /// Whether `obj`'s type descriptor carries the atomic-reference flag.
    fn is_atomic_candidate(&self, obj: ObjectRef) -> bool;

    /// Current strong reference count of `obj`'s container. Stack
    /// references are not included (delayed reference counting).
    fn refcount(&self, obj: ObjectRef) -> i32;

    /// Invoke `visit` exactly once per outgoing reference slot of `obj`
    /// with the slot's current target: all payload elements for array
    /// objects, the declared reference offsets otherwise.
    fn for_each_field(&self, obj: ObjectRef, visit: &mut dyn FnMut(Slot, Option<ObjectRef>));

    /// Store the null reference into `slot`, running the host's standard
    /// release sequence on the previous target.
    fn clear_reference(&self, slot: Slot);

    /// Invoke `visit` for every live atomic-reference object. The host
    /// keeps each object's per-reference lock held for the duration of the
    /// outer call, so the closure's topology cannot mutate mid-walk.
    fn walk_atomic_roots(&self, visit: &mut dyn FnMut(ObjectRef));

    /// Invoke `visit` for every stack root of `worker`.
    fn walk_stack_roots(&self, worker: WorkerId, visit: &mut dyn FnMut(ObjectRef));
}
