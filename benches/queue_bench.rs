//! Benchmarks for the pending queue.
//!
//! Covers insert/pop throughput, identity replacement, and ordered drains at
//! mixed priorities.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::sync::Arc;
use std::time::Instant;

use lane_scheduler::core::{PendingQueue, Priority, WorkItem};
use rand::prelude::*;

fn make_item(id: &str, class: Priority, ready_at: Instant, seq: u64) -> WorkItem {
    WorkItem {
        id: id.to_string(),
        class,
        task: Arc::new(|| {}),
        ready_at,
        seq,
    }
}

fn random_class(rng: &mut impl Rng) -> Priority {
    match rng.random_range(0..3) {
        0 => Priority::High,
        1 => Priority::Normal,
        _ => Priority::Background,
    }
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("pending_insert");
    for size in [100_u64, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let now = Instant::now();
            let mut rng = StdRng::seed_from_u64(42);
            b.iter(|| {
                let queue = PendingQueue::new();
                for seq in 0..size {
                    let class = random_class(&mut rng);
                    queue.insert(make_item(&format!("task-{seq}"), class, now, seq));
                }
                black_box(queue.len())
            });
        });
    }
    group.finish();
}

fn bench_insert_replace(c: &mut Criterion) {
    c.bench_function("pending_insert_replace_same_id", |b| {
        let now = Instant::now();
        b.iter(|| {
            let queue = PendingQueue::new();
            for seq in 0..1_000_u64 {
                queue.insert(make_item("hot-id", Priority::Normal, now, seq));
            }
            black_box(queue.len())
        });
    });
}

fn bench_ordered_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("pending_drain");
    for size in [1_000_u64, 10_000] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let now = Instant::now();
            let mut rng = StdRng::seed_from_u64(7);
            b.iter(|| {
                let queue = PendingQueue::new();
                for seq in 0..size {
                    let class = random_class(&mut rng);
                    queue.insert(make_item(&format!("task-{seq}"), class, now, seq));
                }
                let mut drained = 0_u64;
                while queue.pop_ready_or_none(now).is_some() {
                    drained += 1;
                }
                black_box(drained)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_insert, bench_insert_replace, bench_ordered_drain);
criterion_main!(benches);
