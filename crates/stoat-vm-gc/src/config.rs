//! Collector configuration.

use std::time::Duration;

/// Tuning knobs for the collection trigger and the engine thread.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Rendezvous ticks between wall-clock reads (default: 10)
    pub tick_window: u32,
    /// Minimum wall-clock interval between trigger-initiated collections
    /// (default: 10 ms). Explicit scheduling bypasses this.
    pub min_collect_interval: Duration,
    /// Name of the background engine thread (default: `stoat-gc-cycles`)
    pub engine_thread_name: String,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            tick_window: 10,
            min_collect_interval: Duration::from_millis(10),
            engine_thread_name: "stoat-gc-cycles".to_string(),
        }
    }
}
