//! Worker rendezvous: the barrier through which every alive worker
//! contributes its stack-root accounting before a collection pass runs,
//! and the safe point at which previously identified cycle slots are
//! zeroed.

use std::sync::atomic::Ordering;

use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use crate::collector::CollectorShared;
use crate::host::{Slot, WorkerId};
use crate::roots::RootRegistry;

/// Coordinator state guarded by the collector mutex.
#[derive(Default)]
pub(crate) struct RendezvousState {
    /// Inner-count accumulator for candidate atomic roots.
    pub(crate) registry: RootRegistry,
    /// Workers that have contributed to the current cycle.
    pub(crate) seen: FxHashSet<WorkerId>,
    /// Number of currently registered workers.
    pub(crate) alive_workers: u32,
    /// The first worker ever registered, assumed to be the UI thread.
    /// Recorded for observability; nothing is gated on it yet.
    pub(crate) first_worker: Option<WorkerId>,
    /// Engine wake cause: the rendezvous barrier completed.
    pub(crate) run_requested: bool,
    /// Engine wake cause: shutdown.
    pub(crate) terminate: bool,
    /// Slots identified by the last engine pass, each still pointing at
    /// its original target until drained here.
    pub(crate) pending_clears: Vec<Slot>,
}

impl CollectorShared {
    pub(crate) fn add_worker(&self, worker: WorkerId) {
        let mut state = self.state.lock();
        if state.first_worker.is_none() {
            state.first_worker = Some(worker);
        }
        state.alive_workers += 1;
        debug!(
            worker = worker.as_raw(),
            alive = state.alive_workers,
            "worker registered"
        );
    }

    /// Deregister `worker`. A collection is forced and the worker's stack
    /// contribution flushed inline before the alive count drops, so a
    /// cycle kept alive only by this stack gets reconsidered.
    pub(crate) fn remove_worker(&self, worker: WorkerId) {
        let mut state = self.state.lock();
        assert!(
            state.alive_workers > 0,
            "removing worker {worker:?} but none are registered"
        );
        self.trigger.request();
        self.rendezvous_locked(&mut state, worker);
        state.seen.remove(&worker);
        state.alive_workers -= 1;
        debug!(
            worker = worker.as_raw(),
            alive = state.alive_workers,
            "worker deregistered"
        );
    }

    /// Rendezvous tick for `worker`. The fast path takes no lock: nothing
    /// to do while the engine is mid-pass or no collection is due.
    pub(crate) fn rendezvous(&self, worker: WorkerId) {
        if self.collecting.load(Ordering::Acquire) {
            return;
        }
        if !self.trigger.check() {
            return;
        }
        let mut state = self.state.lock();
        self.rendezvous_locked(&mut state, worker);
    }

    pub(crate) fn rendezvous_locked(&self, state: &mut RendezvousState, worker: WorkerId) {
        self.drain_pending_clears(state);
        if !state.seen.insert(worker) {
            return;
        }
        // Stack roots are external references the delayed-RC scheme keeps
        // out of refcounts; subtract them so they cannot be mistaken for
        // inner cycle edges.
        let RendezvousState { registry, .. } = state;
        self.host.walk_stack_roots(worker, &mut |obj| {
            registry.increment(self.host.as_ref(), obj, -1);
        });
        trace!(
            worker = worker.as_raw(),
            seen = state.seen.len(),
            alive = state.alive_workers,
            "stack contribution applied"
        );
        if state.seen.len() as u32 >= state.alive_workers {
            state.run_requested = true;
            self.engine_wake.notify_one();
        }
    }

    /// Zero the slots identified by the last engine pass. Runs at the
    /// start of every rendezvous, on a worker thread, under the
    /// coordinator lock: the host's release sequence may invoke finalizers
    /// and must see the standard worker execution context.
    pub(crate) fn drain_pending_clears(&self, state: &mut RendezvousState) {
        if state.pending_clears.is_empty() {
            return;
        }
        let slots = std::mem::take(&mut state.pending_clears);
        trace!(slots = slots.len(), "zeroing cycle slots");
        for slot in &slots {
            self.host.clear_reference(*slot);
        }
        self.stats.lock().slots_cleared += slots.len() as u64;
    }
}
