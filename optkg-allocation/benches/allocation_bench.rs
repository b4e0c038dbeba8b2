//! Criterion benchmarks for optkg-allocation.
//!
//! Synthetic registry: 200 tasks x 10 workers drawn from a pool of 40.
//! - One selection sweep over the full pool (2000 pairs)
//! - Full allocation run, budget 500, cold and warm survival cache

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use optkg_allocation::policy::KnowledgeGradient;
use optkg_allocation::pool::CandidatePool;
use optkg_allocation::posterior::PosteriorUpdater;
use optkg_allocation::{AllocationSettings, Allocator, Registry, SurvivalCache};
use optkg_core::config::DegeneratePolicy;
use optkg_core::types::{BetaParams, Label};

const TASKS: usize = 200;
const WORKERS_PER_TASK: usize = 10;
const WORKER_POOL: usize = 40;

/// Deterministic registry: worker `w` agrees with the hidden truth unless
/// `(task * 7 + w) % 5 == 0`.
fn synthetic_registry() -> Registry {
    let mut builder = Registry::builder();
    for task in 0..TASKS {
        let name = format!("task-{task}");
        let truth = if task % 3 == 0 {
            Label::Negative
        } else {
            Label::Positive
        };
        for slot in 0..WORKERS_PER_TASK {
            let w = (task * 3 + slot * 7) % WORKER_POOL;
            let label = if (task * 7 + w) % 5 == 0 {
                match truth {
                    Label::Positive => Label::Negative,
                    Label::Negative => Label::Positive,
                }
            } else {
                truth
            };
            builder.response(&name, &format!("worker-{w}"), label);
        }
        builder
            .gold(&name, truth)
            .unwrap_or_else(|e| panic!("gold for {name}: {e}"));
    }
    builder
        .build()
        .unwrap_or_else(|e| panic!("synthetic registry: {e}"))
}

fn bench_select_next(c: &mut Criterion) {
    let registry = synthetic_registry();
    let pool = CandidatePool::from_registry(&registry);
    let tasks = vec![BetaParams::uniform(); registry.task_count()];
    let workers = vec![BetaParams::new(4.0, 1.0); registry.worker_count()];
    let cache = SurvivalCache::new();
    let policy = KnowledgeGradient::new(&cache, PosteriorUpdater::default(), DegeneratePolicy::Skip);

    c.bench_function("select_next_2000_pairs", |b| {
        b.iter(|| {
            let outcome = policy
                .select_next(black_box(&tasks), black_box(&workers), black_box(&pool))
                .unwrap_or_else(|e| panic!("selection failed: {e}"));
            black_box(outcome.selection.reward)
        });
    });
}

fn bench_full_run(c: &mut Criterion) {
    let registry = synthetic_registry();

    c.bench_function("run_budget_500_cold_cache", |b| {
        b.iter_batched(
            SurvivalCache::new,
            |cache| {
                let mut allocator =
                    Allocator::new(&registry, &cache, AllocationSettings::default());
                let outcome = allocator
                    .run(500)
                    .unwrap_or_else(|e| panic!("run failed: {e}"));
                black_box(outcome.partition.len())
            },
            BatchSize::SmallInput,
        );
    });

    let warm = SurvivalCache::new();
    Allocator::new(&registry, &warm, AllocationSettings::default())
        .run(500)
        .unwrap_or_else(|e| panic!("warm-up run failed: {e}"));
    c.bench_function("run_budget_500_warm_cache", |b| {
        b.iter(|| {
            let mut allocator = Allocator::new(&registry, &warm, AllocationSettings::default());
            let outcome = allocator
                .run(black_box(500))
                .unwrap_or_else(|e| panic!("run failed: {e}"));
            black_box(outcome.partition.len())
        });
    });
}

criterion_group!(benches, bench_select_next, bench_full_run);
criterion_main!(benches);
