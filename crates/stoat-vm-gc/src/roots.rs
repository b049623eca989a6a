//! Root registry: the inner-count accumulator for candidate cycle roots.

use rustc_hash::FxHashMap;

use crate::host::{ObjectRef, RuntimeHost};

/// Accumulator mapping each candidate atomic root to the signed sum of
/// contributions discovered for the current cycle: `+1` per inner edge
/// found by the closure walk, `-1` per stack root reported at rendezvous.
///
/// The registry is not the source of truth for the set of live atomic
/// roots; the engine re-enumerates those from the host on every cycle.
/// Entries are scratch state, cleared between cycles.
#[derive(Debug, Default)]
pub(crate) struct RootRegistry {
    counts: FxHashMap<ObjectRef, i32>,
}

impl RootRegistry {
    /// Track `obj` as a candidate cycle root. Re-insertion resets the
    /// accumulator to zero.
    pub(crate) fn add(&mut self, obj: ObjectRef) {
        self.counts.insert(obj, 0);
    }

    /// Stop tracking `obj`.
    pub(crate) fn remove(&mut self, obj: ObjectRef) {
        self.counts.remove(&obj);
    }

    /// Adjust `obj`'s accumulator by `delta`. Objects without the
    /// atomic-candidate flag are ignored.
    pub(crate) fn increment(&mut self, host: &dyn RuntimeHost, obj: ObjectRef, delta: i32) {
        if host.is_atomic_candidate(obj) {
            *self.counts.entry(obj).or_insert(0) += delta;
        }
    }

    /// Drop all entries, releasing the cycle's scratch state.
    pub(crate) fn clear(&mut self) {
        self.counts.clear();
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (ObjectRef, i32)> + '_ {
        self.counts.iter().map(|(&obj, &count)| (obj, count))
    }

    #[cfg(test)]
    pub(crate) fn get(&self, obj: ObjectRef) -> Option<i32> {
        self.counts.get(&obj).copied()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.counts.len()
    }
}
