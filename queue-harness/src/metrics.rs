//! Harness metrics.

use metriken::{Counter, Gauge, metric};
use queue_core::PoolStats;

#[metric(name = "queue_create", description = "Queues created")]
pub static QUEUE_CREATE: Counter = Counter::new();

#[metric(name = "queue_destroy", description = "Queues destroyed")]
pub static QUEUE_DESTROY: Counter = Counter::new();

#[metric(name = "queue_enqueue", description = "Bytes enqueued")]
pub static QUEUE_ENQUEUE: Counter = Counter::new();

#[metric(name = "queue_dequeue", description = "Bytes dequeued")]
pub static QUEUE_DEQUEUE: Counter = Counter::new();

#[metric(
    name = "segments_in_use",
    description = "Segments currently owned by queues"
)]
pub static SEGMENTS_IN_USE: Gauge = Gauge::new();

/// Refresh gauges from the pool.
pub fn record_pool(stats: &PoolStats) {
    SEGMENTS_IN_USE.set(stats.in_use as i64);
}

/// Format a one-line summary of the counters.
pub fn summary() -> String {
    format!(
        "queue_create={} queue_destroy={} queue_enqueue={} queue_dequeue={} segments_in_use={}",
        QUEUE_CREATE.value(),
        QUEUE_DESTROY.value(),
        QUEUE_ENQUEUE.value(),
        QUEUE_DEQUEUE.value(),
        SEGMENTS_IN_USE.value(),
    )
}
