use optkg_allocation::beta::{beta_survival, decision_score};
use optkg_allocation::pool::CandidatePool;
use optkg_allocation::posterior::PosteriorUpdater;
use optkg_allocation::{AllocationSettings, Allocator, Registry, SurvivalCache};
use optkg_core::config::BudgetPolicy;
use optkg_core::errors::PosteriorError;
use optkg_core::types::{BetaParams, Label};
use proptest::prelude::*;

fn shape() -> impl Strategy<Value = f64> {
    0.05f64..60.0
}

fn label() -> impl Strategy<Value = Label> {
    prop_oneof![Just(Label::Positive), Just(Label::Negative)]
}

/// Small registries: up to 6 tasks, each answered by 1..=4 of 5 workers.
fn registry() -> impl Strategy<Value = Registry> {
    prop::collection::vec(prop::collection::vec(any::<bool>(), 1..=4), 1..=6).prop_map(|tasks| {
        let mut b = Registry::builder();
        for (t, answers) in tasks.iter().enumerate() {
            for (w, &positive) in answers.iter().enumerate() {
                let label = if positive {
                    Label::Positive
                } else {
                    Label::Negative
                };
                b.response(&format!("t{t}"), &format!("w{}", (t + w) % 5), label);
            }
        }
        b.build().unwrap()
    })
}

proptest! {
    #[test]
    fn updates_stay_positive_or_report_degeneracy(
        a in shape(), b in shape(), c in shape(), d in shape(), z in label()
    ) {
        let up = PosteriorUpdater::default();
        let task = BetaParams::new(a, b);
        let worker = BetaParams::new(c, d);
        for result in [up.update_task(task, worker, z), up.update_worker(task, worker, z)] {
            match result {
                Ok(p) => prop_assert!(p.alpha > 0.0 && p.beta > 0.0 && p.is_valid(), "{p}"),
                Err(PosteriorError::DegenerateVariance { .. })
                | Err(PosteriorError::NonPositiveShape { .. }) => {}
                Err(other) => prop_assert!(false, "unexpected error {other}"),
            }
        }
    }

    #[test]
    fn decision_score_is_symmetric_and_bounded(p in 0.0f64..=1.0) {
        let h = decision_score(p);
        prop_assert_eq!(h, decision_score(1.0 - p));
        prop_assert!((0.5..=1.0).contains(&h));
    }

    #[test]
    fn survival_grows_with_alpha_and_shrinks_with_beta(
        a in 0.5f64..30.0, b in 0.5f64..30.0, step in 0.01f64..5.0
    ) {
        let base = beta_survival(BetaParams::new(a, b)).unwrap();
        let more_alpha = beta_survival(BetaParams::new(a + step, b)).unwrap();
        let more_beta = beta_survival(BetaParams::new(a, b + step)).unwrap();
        prop_assert!(more_alpha >= base - 1e-9, "{more_alpha} < {base}");
        prop_assert!(more_beta <= base + 1e-9, "{more_beta} > {base}");
    }

    #[test]
    fn cached_survival_equals_uncached(a in shape(), b in shape()) {
        let cache = SurvivalCache::new();
        let params = BetaParams::new(a, b);
        let first = cache.survival(params).unwrap();
        let second = cache.survival(params).unwrap();
        prop_assert_eq!(first.to_bits(), second.to_bits());
        prop_assert_eq!(first.to_bits(), beta_survival(params).unwrap().to_bits());
        prop_assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn draining_the_pool_visits_every_pair_once(reg in registry()) {
        let mut pool = CandidatePool::from_registry(&reg);
        let mut evicted = 0usize;
        loop {
            let Some(task) = pool.remaining_tasks().last() else {
                break;
            };
            let (pos, candidate) = pool.workers_of(task).last().unwrap();
            prop_assert_eq!(reg.response_at(task, pos).unwrap().worker, candidate.worker);
            pool.evict(task, pos).unwrap();
            evicted += 1;
            prop_assert_eq!(pool.pair_count(), reg.pair_count() - evicted);
        }
        prop_assert_eq!(evicted, reg.pair_count());
        prop_assert_eq!(pool.task_count(), 0);
    }

    #[test]
    fn truncated_runs_spend_min_of_budget_and_pairs(reg in registry(), budget in 0u64..30) {
        let cache = SurvivalCache::new();
        let settings = AllocationSettings {
            budget_policy: BudgetPolicy::Truncate,
            ..Default::default()
        };
        let outcome = Allocator::new(&reg, &cache, settings).run(budget).unwrap();
        let expected = budget.min(reg.pair_count() as u64);
        prop_assert_eq!(outcome.iterations, expected);
        prop_assert_eq!(outcome.chosen.len() as u64, expected);
        prop_assert_eq!(outcome.truncated, budget > reg.pair_count() as u64);

        let mut distinct = outcome.chosen.clone();
        distinct.sort();
        distinct.dedup();
        prop_assert_eq!(outcome.partition.len(), distinct.len());
    }
}
