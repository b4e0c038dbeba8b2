//! Accuracy of a decision partition against gold labels, and budget sweeps.

use rayon::prelude::*;
use serde::Serialize;

use optkg_core::errors::AllocationError;
use optkg_core::types::{Label, TaskId};

use crate::allocation::{AllocationSettings, Allocator, DecisionPartition};
use crate::beta::SurvivalCache;
use crate::dataset::Registry;

/// How many decided tasks agree with their gold label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    pub correct: usize,
    /// Tasks in the registry that carry a gold label.
    pub gold_tasks: usize,
    pub accuracy: f64,
}

/// Score a partition: positive tasks with gold 1 plus negative tasks with
/// gold 0, over every gold-labelled task in the registry. Tasks that were
/// never queried count against the accuracy.
pub fn evaluate(partition: &DecisionPartition, registry: &Registry) -> Evaluation {
    let agrees = |tasks: &[TaskId], expected: Label| {
        tasks
            .iter()
            .filter(|&&t| registry.gold(t) == Some(expected))
            .count()
    };
    let correct =
        agrees(&partition.positive, Label::Positive) + agrees(&partition.negative, Label::Negative);
    let gold_tasks = registry
        .records()
        .iter()
        .filter(|r| r.gold.is_some())
        .count();
    let accuracy = if gold_tasks == 0 {
        0.0
    } else {
        correct as f64 / gold_tasks as f64
    };
    Evaluation {
        correct,
        gold_tasks,
        accuracy,
    }
}

/// One budget of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepPoint {
    pub budget: u64,
    pub iterations: u64,
    pub truncated: bool,
    pub positive: usize,
    pub negative: usize,
    pub correct: usize,
    pub accuracy: f64,
}

/// Run an independent allocation per budget and score each against gold.
///
/// Runs execute in parallel and share `cache`; points come back in the
/// order of `budgets`. The first failing run aborts the sweep.
pub fn budget_sweep(
    registry: &Registry,
    cache: &SurvivalCache,
    settings: AllocationSettings,
    budgets: &[u64],
) -> Result<Vec<SweepPoint>, AllocationError> {
    tracing::info!(
        points = budgets.len(),
        tasks = registry.task_count(),
        pairs = registry.pair_count(),
        "budget sweep started"
    );
    let points = budgets
        .par_iter()
        .map(|&budget| {
            let mut allocator = Allocator::new(registry, cache, settings);
            let outcome = allocator.run(budget)?;
            let evaluation = evaluate(&outcome.partition, registry);
            Ok(SweepPoint {
                budget,
                iterations: outcome.iterations,
                truncated: outcome.truncated,
                positive: outcome.partition.positive.len(),
                negative: outcome.partition.negative.len(),
                correct: evaluation.correct,
                accuracy: evaluation.accuracy,
            })
        })
        .collect::<Result<Vec<_>, AllocationError>>()?;

    let stats = cache.stats();
    tracing::info!(
        points = points.len(),
        cache_entries = stats.entries,
        cache_hit_rate = stats.hit_rate(),
        "budget sweep finished"
    );
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        let mut b = Registry::builder();
        b.response("T1", "W1", Label::Positive)
            .response("T2", "W1", Label::Negative)
            .response("T3", "W1", Label::Positive);
        b.gold("T1", Label::Positive).unwrap();
        b.gold("T2", Label::Positive).unwrap();
        b.build().unwrap()
    }

    #[test]
    fn test_evaluate_counts_both_sides() {
        let reg = registry();
        let t = |n: &str| reg.task_id(n).unwrap();
        let partition = DecisionPartition {
            positive: vec![t("T1"), t("T3")],
            negative: vec![t("T2")],
        };
        let eval = evaluate(&partition, &reg);
        assert_eq!(eval.gold_tasks, 2);
        assert_eq!(eval.correct, 1);
        assert!((eval.accuracy - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_partition_scores_zero() {
        let reg = registry();
        let eval = evaluate(&DecisionPartition::default(), &reg);
        assert_eq!(eval.correct, 0);
        assert_eq!(eval.accuracy, 0.0);
    }

    #[test]
    fn test_no_gold_means_zero_accuracy() {
        let mut b = Registry::builder();
        b.response("T1", "W1", Label::Positive);
        let reg = b.build().unwrap();
        let partition = DecisionPartition {
            positive: vec![reg.task_id("T1").unwrap()],
            negative: vec![],
        };
        assert_eq!(evaluate(&partition, &reg).accuracy, 0.0);
    }
}
