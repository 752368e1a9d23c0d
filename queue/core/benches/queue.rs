//! Benchmarks for queue hot paths.
//!
//! - Enqueue/dequeue within a single segment (no allocation)
//! - Streaming through segment boundaries (allocate + release per 14 bytes)
//! - Queue create/destroy churn
//!
//! Run with: cargo bench -p queue-core --bench queue

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use queue_core::{QueueManager, SEGMENT_PAYLOAD};

/// Benchmark a byte in and straight back out (queue stays within one segment).
fn bench_ping_pong(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue/ping_pong");
    group.throughput(Throughput::Elements(1));

    let mut manager = QueueManager::new();
    let queue = manager.create_queue().unwrap();

    group.bench_function("enqueue_dequeue", |b| {
        b.iter(|| {
            manager.enqueue_byte(queue, black_box(0xAB)).unwrap();
            black_box(manager.dequeue_byte(queue).unwrap());
        });
    });

    group.finish();
}

/// Benchmark filling a queue to a given depth and draining it again.
fn bench_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue/stream");

    for depth in [SEGMENT_PAYLOAD, 128, 1024] {
        group.throughput(Throughput::Elements(depth as u64));
        group.bench_with_input(BenchmarkId::new("fill_drain", depth), &depth, |b, &depth| {
            let mut manager = QueueManager::new();
            let queue = manager.create_queue().unwrap();
            b.iter(|| {
                for i in 0..depth {
                    manager.enqueue_byte(queue, i as u8).unwrap();
                }
                for _ in 0..depth {
                    black_box(manager.dequeue_byte(queue).unwrap());
                }
            });
        });
    }

    group.finish();
}

/// Benchmark queue creation and destruction with a few bytes in flight.
fn bench_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue/lifecycle");
    group.throughput(Throughput::Elements(1));

    let mut manager = QueueManager::new();
    // Occupy low slots so the descriptor scan has work to do.
    for _ in 0..32 {
        manager.create_queue().unwrap();
    }

    group.bench_function("create_fill_destroy", |b| {
        b.iter(|| {
            let queue = manager.create_queue().unwrap();
            for i in 0..32u8 {
                manager.enqueue_byte(queue, i).unwrap();
            }
            manager.destroy_queue(black_box(queue)).unwrap();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_ping_pong, bench_stream, bench_lifecycle);
criterion_main!(benches);
