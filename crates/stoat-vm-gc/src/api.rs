//! Process-wide façade over a single [`CyclicCollector`] instance.
//!
//! The embedding runtime calls these free functions from its bootstrap,
//! worker-lifecycle and safepoint paths. Tests construct
//! [`CyclicCollector`] values directly instead of going through the
//! global.
//!
//! Calling any operation other than [`init`]/[`shutdown`] without an
//! installed collector is a programming error and panics.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::collector::CyclicCollector;
use crate::config::CollectorConfig;
use crate::error::CycleGcError;
use crate::host::{ObjectRef, RuntimeHost, WorkerId};

static COLLECTOR: RwLock<Option<Arc<CyclicCollector>>> = RwLock::new(None);

/// Install the process-wide collector and start its engine thread.
pub fn init(host: Arc<dyn RuntimeHost>, config: CollectorConfig) -> Result<(), CycleGcError> {
    let mut slot = COLLECTOR.write();
    if slot.is_some() {
        return Err(CycleGcError::AlreadyInitialized);
    }
    *slot = Some(CyclicCollector::new(host, config));
    Ok(())
}

/// Terminate the engine, zero any still-pending slots and drop the
/// collector.
pub fn shutdown() -> Result<(), CycleGcError> {
    let collector = COLLECTOR
        .write()
        .take()
        .ok_or(CycleGcError::NotInitialized)?;
    collector.shutdown();
    Ok(())
}

fn with<R>(f: impl FnOnce(&CyclicCollector) -> R) -> R {
    let guard = COLLECTOR.read();
    let collector = guard
        .as_deref()
        .expect("cyclic collector is not initialized");
    f(collector)
}

/// Register a runtime worker thread.
pub fn add_worker(worker: WorkerId) {
    with(|c| c.add_worker(worker));
}

/// Deregister a runtime worker thread, flushing its stack contribution
/// first.
pub fn remove_worker(worker: WorkerId) {
    with(|c| c.remove_worker(worker));
}

/// Rendezvous tick for `worker`; called periodically from the worker's
/// safepoint path.
pub fn rendezvous(worker: WorkerId) {
    with(|c| c.rendezvous(worker));
}

/// Request a collection cycle regardless of the trigger policy.
pub fn schedule() {
    with(|c| c.schedule());
}

/// Track a newly created atomic reference as a candidate cycle root.
pub fn add_atomic_root(obj: ObjectRef) {
    with(|c| c.add_atomic_root(obj));
}

/// Stop tracking an atomic reference; must precede the host freeing it.
pub fn remove_atomic_root(obj: ObjectRef) {
    with(|c| c.remove_atomic_root(obj));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Slot;

    struct EmptyHost;

    impl RuntimeHost for EmptyHost {
        fn is_atomic_candidate(&self, _obj: ObjectRef) -> bool {
            false
        }
        fn refcount(&self, _obj: ObjectRef) -> i32 {
            0
        }
        fn for_each_field(&self, _obj: ObjectRef, _visit: &mut dyn FnMut(Slot, Option<ObjectRef>)) {
        }
        fn clear_reference(&self, _slot: Slot) {}
        fn walk_atomic_roots(&self, _visit: &mut dyn FnMut(ObjectRef)) {}
        fn walk_stack_roots(&self, _worker: WorkerId, _visit: &mut dyn FnMut(ObjectRef)) {}
    }

    // One test owns the global's whole lifecycle so parallel test
    // execution never observes a half-installed collector.
    #[test]
    fn test_global_lifecycle() {
        assert_eq!(shutdown(), Err(CycleGcError::NotInitialized));
        init(Arc::new(EmptyHost), CollectorConfig::default()).unwrap();
        assert_eq!(
            init(Arc::new(EmptyHost), CollectorConfig::default()),
            Err(CycleGcError::AlreadyInitialized)
        );
        let worker = WorkerId::from_raw(1);
        add_worker(worker);
        rendezvous(worker);
        schedule();
        remove_worker(worker);
        shutdown().unwrap();
        assert_eq!(shutdown(), Err(CycleGcError::NotInitialized));
    }
}
