//! The collector value: coordinator state plus the engine thread lifecycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use parking_lot::{Condvar, Mutex};
use tracing::debug;

use crate::config::CollectorConfig;
use crate::engine::{self, GcStats};
use crate::host::{ObjectRef, RuntimeHost, WorkerId};
use crate::rendezvous::RendezvousState;
use crate::trigger::CollectTrigger;

/// Shared collector internals. Everything mutable lives in
/// [`RendezvousState`] under `state`; `collecting` sits outside the mutex
/// so the rendezvous fast path never takes a lock while the engine runs.
///
/// Lock order: `state` before `stats`; host per-reference locks are only
/// ever taken by the engine, through the host's atomic-roots walker, while
/// `state` is already held.
pub(crate) struct CollectorShared {
    pub(crate) host: Arc<dyn RuntimeHost>,
    pub(crate) state: Mutex<RendezvousState>,
    /// Wakes the engine when the rendezvous barrier completes or
    /// termination is requested.
    pub(crate) engine_wake: Condvar,
    /// The engine is inside a collection pass.
    pub(crate) collecting: AtomicBool,
    pub(crate) trigger: CollectTrigger,
    pub(crate) stats: Mutex<GcStats>,
}

/// Incremental cyclic garbage collector for shared atomic references.
///
/// Construction spawns the background engine thread; [`shutdown`] (or
/// dropping the last handle) terminates and joins it. One instance
/// normally exists per process behind the [`crate::api`] façade, but
/// instances are first-class values and any number may coexist in tests.
///
/// [`shutdown`]: CyclicCollector::shutdown
pub struct CyclicCollector {
    shared: Arc<CollectorShared>,
    engine: Mutex<Option<JoinHandle<()>>>,
}

impl CyclicCollector {
    /// Create a collector over `host` and start its engine thread.
    pub fn new(host: Arc<dyn RuntimeHost>, config: CollectorConfig) -> Arc<Self> {
        let shared = Arc::new(CollectorShared {
            host,
            state: Mutex::new(RendezvousState::default()),
            engine_wake: Condvar::new(),
            collecting: AtomicBool::new(false),
            trigger: CollectTrigger::new(&config),
            stats: Mutex::new(GcStats::default()),
        });
        let engine = {
            let shared = Arc::clone(&shared);
            std::thread::Builder::new()
                .name(config.engine_thread_name.clone())
                .spawn(move || engine::engine_loop(shared))
                .expect("failed to spawn cycle collector engine thread")
        };
        debug!(thread = %config.engine_thread_name, "cyclic collector started");
        Arc::new(Self {
            shared,
            engine: Mutex::new(Some(engine)),
        })
    }

    /// Register a worker thread. The first worker ever registered is
    /// remembered as the UI worker.
    pub fn add_worker(&self, worker: WorkerId) {
        self.shared.add_worker(worker);
    }

    /// Deregister a worker. Its stack contribution is flushed (and a
    /// collection forced) before the alive count drops, so a cycle kept
    /// alive only by the dying stack is reconsidered promptly.
    pub fn remove_worker(&self, worker: WorkerId) {
        self.shared.remove_worker(worker);
    }

    /// Rendezvous tick for `worker`: drains pending slot clears and, when
    /// a collection is due, contributes the worker's stack accounting.
    pub fn rendezvous(&self, worker: WorkerId) {
        self.shared.rendezvous(worker);
    }

    /// Request a collection cycle regardless of the trigger policy.
    pub fn schedule(&self) {
        self.shared.trigger.request();
    }

    /// Track a newly created atomic reference as a candidate cycle root.
    pub fn add_atomic_root(&self, obj: ObjectRef) {
        self.shared.state.lock().registry.add(obj);
    }

    /// Stop tracking an atomic reference. The host must call this before
    /// freeing the object.
    pub fn remove_atomic_root(&self, obj: ObjectRef) {
        self.shared.state.lock().registry.remove(obj);
    }

    /// Whether the engine is inside a collection pass.
    pub fn collecting(&self) -> bool {
        self.shared.collecting.load(Ordering::Acquire)
    }

    /// Number of currently registered workers.
    pub fn alive_workers(&self) -> u32 {
        self.shared.state.lock().alive_workers
    }

    /// The first worker ever registered, if any.
    pub fn first_worker(&self) -> Option<WorkerId> {
        self.shared.state.lock().first_worker
    }

    /// Snapshot of the collection statistics.
    pub fn stats(&self) -> GcStats {
        self.shared.stats.lock().clone()
    }

    /// Terminate the engine thread, then zero any slots still awaiting a
    /// rendezvous. Idempotent; an in-flight pass completes first.
    pub fn shutdown(&self) {
        let Some(handle) = self.engine.lock().take() else {
            return;
        };
        {
            let mut state = self.shared.state.lock();
            state.terminate = true;
            self.shared.engine_wake.notify_one();
        }
        let _ = handle.join();
        let mut state = self.shared.state.lock();
        self.shared.drain_pending_clears(&mut state);
        debug!("cyclic collector stopped");
    }
}

impl Drop for CyclicCollector {
    fn drop(&mut self) {
        self.shutdown();
    }
}
