//! Background collection engine: transitive-closure walk over the atomic
//! rootset, inner-count aggregation and dead-cycle identification.
//!
//! ## Algorithm
//!
//! - Re-enumerate the atomic rootset from the host; the host keeps each
//!   per-reference lock held for the duration of the walk, freezing the
//!   closure's topology (everything else in the closure is frozen by the
//!   runtime's immutability guarantee)
//! - Walk the transitive closure once, counting every inner edge into an
//!   atomic candidate; each object's fields are enumerated exactly once
//! - A candidate whose inner count equals its actual refcount receives no
//!   references from outside the closure. Candidates whose counts differ
//!   are externally held, and everything reachable from them is kept
//! - The surviving matches form dead cycles; their outgoing slots are
//!   queued for zeroing at the next rendezvous rather than cleared here,
//!   since the host's release sequence may run finalizers
//!
//! A refcount that mutates concurrently with the comparison simply fails
//! to match; the object is reconsidered on the next cycle.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Instant;

use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use crate::collector::CollectorShared;
use crate::host::ObjectRef;
use crate::rendezvous::RendezvousState;

/// Collection statistics.
#[derive(Debug, Default, Clone)]
pub struct GcStats {
    /// Completed collection passes
    pub collections: u64,
    /// Atomic roots enumerated by the last pass
    pub last_roots: usize,
    /// Objects visited by the last closure walk
    pub last_visited: usize,
    /// Dead-cycle members identified by the last pass
    pub last_cycle_members: usize,
    /// Slots scheduled for zeroing by the last pass
    pub last_slots_scheduled: usize,
    /// Slots zeroed so far, across all rendezvous drains
    pub slots_cleared: u64,
    /// Longest pass so far, in nanoseconds
    pub max_pass_ns: u64,
}

/// Result of one collection pass, folded into [`GcStats`].
struct PassSummary {
    roots: usize,
    visited: usize,
    cycle_members: usize,
    slots_scheduled: usize,
}

/// Engine thread body. Parks on the coordinator condvar until either the
/// rendezvous barrier completes for a requested cycle or termination is
/// requested; an in-flight pass always finishes before termination is
/// observed.
pub(crate) fn engine_loop(shared: Arc<CollectorShared>) {
    let mut state = shared.state.lock();
    loop {
        while !state.terminate && !state.run_requested {
            shared.engine_wake.wait(&mut state);
        }
        if state.terminate {
            break;
        }
        shared.collecting.store(true, Ordering::Release);
        state.seen.clear();

        let started = Instant::now();
        let summary = collect_locked(&shared, &mut state);
        let elapsed_ns = started.elapsed().as_nanos() as u64;

        state.registry.clear();
        state.run_requested = false;
        shared.trigger.clear_pending();
        shared.collecting.store(false, Ordering::Release);

        debug!(
            roots = summary.roots,
            visited = summary.visited,
            cycle_members = summary.cycle_members,
            slots = summary.slots_scheduled,
            elapsed_us = elapsed_ns / 1_000,
            "collection pass complete"
        );
        let mut stats = shared.stats.lock();
        stats.collections += 1;
        stats.last_roots = summary.roots;
        stats.last_visited = summary.visited;
        stats.last_cycle_members = summary.cycle_members;
        stats.last_slots_scheduled = summary.slots_scheduled;
        stats.max_pass_ns = stats.max_pass_ns.max(elapsed_ns);
    }
    debug!("engine terminating");
}

/// One collection pass, run with the coordinator lock held.
fn collect_locked(shared: &CollectorShared, state: &mut RendezvousState) -> PassSummary {
    let host = shared.host.as_ref();

    // Re-enumerate the rootset; the registry's add/remove stream is only a
    // hint and the host walk is authoritative.
    let mut rootset: Vec<ObjectRef> = Vec::new();
    host.walk_atomic_roots(&mut |obj| {
        debug_assert!(
            host.is_atomic_candidate(obj),
            "atomic roots walk produced a non-candidate object"
        );
        rootset.push(obj);
    });

    // Closure walk. Each visited object's fields are enumerated exactly
    // once; every edge into an atomic candidate bumps its accumulator, on
    // top of the stack contributions already applied at rendezvous.
    let mut visited: FxHashSet<ObjectRef> = FxHashSet::default();
    let mut to_visit: VecDeque<ObjectRef> = VecDeque::new();
    for &root in &rootset {
        if visited.insert(root) {
            to_visit.push_back(root);
        }
    }
    {
        let RendezvousState { registry, .. } = &mut *state;
        while let Some(obj) = to_visit.pop_front() {
            host.for_each_field(obj, &mut |_slot, target| {
                let Some(target) = target else { return };
                registry.increment(host, target, 1);
                if visited.insert(target) {
                    to_visit.push_back(target);
                }
            });
        }
    }

    // Compare once per candidate against a single refcount read.
    let comparisons: Vec<(ObjectRef, i32, i32)> = state
        .registry
        .iter()
        .map(|(obj, inner)| (obj, inner, host.refcount(obj)))
        .collect();

    // A mismatch means the candidate is referenced from outside the
    // closure (an external handle, or a live stack already subtracted at
    // rendezvous). Nothing reachable from it is cycle garbage.
    let mut kept: FxHashSet<ObjectRef> = FxHashSet::default();
    let mut keep_queue: VecDeque<ObjectRef> = VecDeque::new();
    for &(obj, inner, actual) in &comparisons {
        if inner != actual && kept.insert(obj) {
            keep_queue.push_back(obj);
        }
    }
    while let Some(obj) = keep_queue.pop_front() {
        host.for_each_field(obj, &mut |_slot, target| {
            let Some(target) = target else { return };
            if kept.insert(target) {
                keep_queue.push_back(target);
            }
        });
    }

    // Survivors of the comparison hold only inner references: dead cycles.
    // Queue their outgoing slots; zeroing is deferred to a worker thread.
    let mut cycle_members = 0usize;
    let mut slots_scheduled = 0usize;
    let RendezvousState { pending_clears, .. } = &mut *state;
    for &(obj, inner, actual) in &comparisons {
        // A candidate with no strong references left is already on the
        // plain RC's reclamation path.
        if actual <= 0 || inner != actual || kept.contains(&obj) {
            continue;
        }
        cycle_members += 1;
        trace!(obj = obj.as_raw(), refcount = actual, "cycle member found");
        host.for_each_field(obj, &mut |slot, _target| {
            pending_clears.push(slot);
            slots_scheduled += 1;
        });
    }

    PassSummary {
        roots: rootset.len(),
        visited: visited.len(),
        cycle_members,
        slots_scheduled,
    }
}
