//! Collection trigger: tick filter plus wall-clock throttle.
//!
//! Every rendezvous call increments the tick counter; the clock is read at
//! most once per `tick_window` ticks, and the trigger schedules at most one
//! collection per `min_collect_interval`. Explicit scheduling bypasses both
//! filters.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;

use crate::config::CollectorConfig;

pub(crate) struct CollectTrigger {
    current_tick: AtomicU32,
    last_tick: AtomicU32,
    /// Microseconds since `epoch` at the last scheduled collection.
    last_stamp_us: AtomicU64,
    /// A collection cycle has been requested and not yet completed.
    pending: AtomicBool,
    /// Serializes the wall-clock refresh so two racing callers cannot
    /// schedule two collections in one interval.
    refresh: Mutex<()>,
    epoch: Instant,
    tick_window: u32,
    min_interval_us: u64,
}

impl CollectTrigger {
    pub(crate) fn new(config: &CollectorConfig) -> Self {
        Self {
            current_tick: AtomicU32::new(0),
            last_tick: AtomicU32::new(0),
            last_stamp_us: AtomicU64::new(0),
            pending: AtomicBool::new(false),
            refresh: Mutex::new(()),
            epoch: Instant::now(),
            tick_window: config.tick_window,
            min_interval_us: config.min_collect_interval.as_micros() as u64,
        }
    }

    fn now_us(&self) -> u64 {
        self.epoch.elapsed().as_micros() as u64
    }

    /// Per-rendezvous check. Returns whether a collection cycle is due.
    pub(crate) fn check(&self) -> bool {
        let tick = self
            .current_tick
            .fetch_add(1, Ordering::Relaxed)
            .wrapping_add(1);
        if self.pending.load(Ordering::Acquire) {
            return true;
        }
        let delta = tick.wrapping_sub(self.last_tick.load(Ordering::Relaxed)) as i32;
        if (0..=self.tick_window as i32).contains(&delta) {
            return false;
        }
        let stamp = self.last_stamp_us.load(Ordering::Relaxed);
        if self.now_us().saturating_sub(stamp) <= self.min_interval_us {
            return false;
        }
        let _guard = self.refresh.lock();
        // Re-check under the refresh lock: a racing caller may have just
        // consumed this interval.
        let now = self.now_us();
        if now - self.last_stamp_us.load(Ordering::Relaxed) <= self.min_interval_us {
            return self.pending.load(Ordering::Acquire);
        }
        self.last_tick
            .store(self.current_tick.load(Ordering::Relaxed), Ordering::Relaxed);
        self.last_stamp_us.store(now, Ordering::Relaxed);
        self.pending.store(true, Ordering::Release);
        true
    }

    /// Explicit request: host `schedule` call or worker removal.
    pub(crate) fn request(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Consumed by the engine at the end of a pass.
    pub(crate) fn clear_pending(&self) {
        self.pending.store(false, Ordering::Release);
    }

    #[cfg(test)]
    fn set_ticks(&self, current: u32, last: u32) {
        self.current_tick.store(current, Ordering::Relaxed);
        self.last_tick.store(last, Ordering::Relaxed);
    }
}
