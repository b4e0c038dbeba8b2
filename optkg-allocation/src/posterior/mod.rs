//! PosteriorUpdate: moment-matched Beta posteriors for tasks and workers.
//!
//! A worker with reliability ρ labels a task with latent θ; the label is 1
//! with probability `θρ + (1-θ)(1-ρ)`. That likelihood is not conjugate to
//! the Beta priors, so after observing `z` the exact first two posterior
//! moments of θ (or ρ) are computed in closed form and a Beta distribution
//! with the same mean and variance replaces the posterior.
//!
//! Both directions are pure functions of `(a, b, c, d, z)`.

use optkg_core::constants::DEFAULT_VARIANCE_EPSILON;
use optkg_core::errors::PosteriorError;
use optkg_core::types::{BetaParams, Label};

/// First two moments of a posterior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    /// E[x]
    pub mean: f64,
    /// E[x²]
    pub second: f64,
}

impl Moments {
    pub fn variance(&self) -> f64 {
        self.second - self.mean * self.mean
    }
}

/// Moment-matching update with a configurable variance floor.
#[derive(Debug, Clone, Copy)]
pub struct PosteriorUpdater {
    variance_epsilon: f64,
}

impl PosteriorUpdater {
    pub fn new(variance_epsilon: f64) -> Self {
        Self { variance_epsilon }
    }

    pub fn variance_epsilon(&self) -> f64 {
        self.variance_epsilon
    }

    /// New task parameters `(a', b')` after `worker` gives `label` to `task`.
    pub fn update_task(
        &self,
        task: BetaParams,
        worker: BetaParams,
        label: Label,
    ) -> Result<BetaParams, PosteriorError> {
        check_params("task", task)?;
        check_params("worker", worker)?;
        self.match_moments(task_moments(task, worker, label))
    }

    /// New worker parameters `(c', d')` after the worker gives `label` to `task`.
    pub fn update_worker(
        &self,
        task: BetaParams,
        worker: BetaParams,
        label: Label,
    ) -> Result<BetaParams, PosteriorError> {
        check_params("task", task)?;
        check_params("worker", worker)?;
        self.match_moments(worker_moments(task, worker, label))
    }

    /// Beta parameters whose mean and variance equal `moments`.
    ///
    /// `alpha = μ(μ-ν)/(ν-μ²)`, `beta = (1-μ)(μ-ν)/(ν-μ²)`.
    pub fn match_moments(&self, moments: Moments) -> Result<BetaParams, PosteriorError> {
        let Moments { mean, second } = moments;
        let variance = moments.variance();
        if !variance.is_finite() || variance < self.variance_epsilon {
            return Err(PosteriorError::DegenerateVariance {
                mean,
                second_moment: second,
                variance,
            });
        }
        let spread = mean - second;
        let alpha = mean * spread / variance;
        let beta = (1.0 - mean) * spread / variance;
        let matched = BetaParams::new(alpha, beta);
        if !matched.is_valid() {
            return Err(PosteriorError::NonPositiveShape { alpha, beta });
        }
        Ok(matched)
    }
}

impl Default for PosteriorUpdater {
    fn default() -> Self {
        Self::new(DEFAULT_VARIANCE_EPSILON)
    }
}

fn check_params(role: &'static str, params: BetaParams) -> Result<(), PosteriorError> {
    if params.is_valid() {
        Ok(())
    } else {
        Err(PosteriorError::InvalidParameters {
            role,
            alpha: params.alpha,
            beta: params.beta,
        })
    }
}

/// Exact posterior moments of θ given one label.
pub fn task_moments(task: BetaParams, worker: BetaParams, label: Label) -> Moments {
    let (a, b) = (task.alpha, task.beta);
    let (c, d) = (worker.alpha, worker.beta);
    let n1 = a + b + 1.0;
    let n2 = a + b + 2.0;
    match label {
        Label::Positive => {
            let evidence = a * c + b * d;
            Moments {
                mean: a * ((a + 1.0) * c + b * d) / (n1 * evidence),
                second: a * (a + 1.0) * ((a + 2.0) * c + b * d) / (n1 * n2 * evidence),
            }
        }
        Label::Negative => {
            let evidence = b * c + a * d;
            Moments {
                mean: a * (b * c + (a + 1.0) * d) / (n1 * evidence),
                second: a * (a + 1.0) * (b * c + (a + 2.0) * d) / (n1 * n2 * evidence),
            }
        }
    }
}

/// Exact posterior moments of ρ given one label.
pub fn worker_moments(task: BetaParams, worker: BetaParams, label: Label) -> Moments {
    let (a, b) = (task.alpha, task.beta);
    let (c, d) = (worker.alpha, worker.beta);
    let m1 = c + d + 1.0;
    let m2 = c + d + 2.0;
    match label {
        Label::Positive => {
            let evidence = a * c + b * d;
            Moments {
                mean: c * (a * (c + 1.0) + b * d) / (m1 * evidence),
                second: c * (c + 1.0) * (a * (c + 2.0) + b * d) / (m1 * m2 * evidence),
            }
        }
        Label::Negative => {
            let evidence = b * c + a * d;
            Moments {
                mean: c * (b * (c + 1.0) + a * d) / (m1 * evidence),
                second: c * (c + 1.0) * (b * (c + 2.0) + a * d) / (m1 * m2 * evidence),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(x: f64, y: f64) -> bool {
        (x - y).abs() < EPS
    }

    #[test]
    fn test_uniform_task_positive_label() {
        // μ = 9/15, ν = 26/60, so a' = 15/11 and b' = 10/11.
        let up = PosteriorUpdater::default();
        let next = up
            .update_task(BetaParams::uniform(), BetaParams::new(4.0, 1.0), Label::Positive)
            .unwrap();
        assert!(close(next.alpha, 15.0 / 11.0), "alpha = {}", next.alpha);
        assert!(close(next.beta, 10.0 / 11.0), "beta = {}", next.beta);
    }

    #[test]
    fn test_uniform_task_labels_mirror() {
        let up = PosteriorUpdater::default();
        let worker = BetaParams::new(4.0, 1.0);
        let pos = up.update_task(BetaParams::uniform(), worker, Label::Positive).unwrap();
        let neg = up.update_task(BetaParams::uniform(), worker, Label::Negative).unwrap();
        assert!(close(pos.alpha, neg.beta));
        assert!(close(pos.beta, neg.alpha));
    }

    #[test]
    fn test_worker_unchanged_by_uninformative_task() {
        // A uniform task says nothing about whether the worker was right.
        let up = PosteriorUpdater::default();
        let worker = BetaParams::new(4.0, 1.0);
        for label in Label::ALL {
            let next = up.update_worker(BetaParams::uniform(), worker, label).unwrap();
            assert!(close(next.alpha, 4.0), "alpha = {}", next.alpha);
            assert!(close(next.beta, 1.0), "beta = {}", next.beta);
        }
    }

    #[test]
    fn test_agreeing_label_raises_worker_reliability() {
        let up = PosteriorUpdater::default();
        let confident_positive = BetaParams::new(20.0, 2.0);
        let worker = BetaParams::new(4.0, 1.0);
        let agree = up.update_worker(confident_positive, worker, Label::Positive).unwrap();
        let disagree = up.update_worker(confident_positive, worker, Label::Negative).unwrap();
        assert!(agree.mean() > worker.mean());
        assert!(disagree.mean() < worker.mean());
    }

    #[test]
    fn test_unreliable_worker_flips_evidence() {
        let up = PosteriorUpdater::default();
        let adversary = BetaParams::new(1.0, 4.0);
        let next = up.update_task(BetaParams::uniform(), adversary, Label::Positive).unwrap();
        assert!(next.alpha < next.beta);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let up = PosteriorUpdater::default();
        let err = up
            .update_task(BetaParams::new(0.0, 1.0), BetaParams::new(4.0, 1.0), Label::Positive)
            .unwrap_err();
        assert!(matches!(err, PosteriorError::InvalidParameters { role: "task", .. }));

        let err = up
            .update_worker(BetaParams::uniform(), BetaParams::new(4.0, f64::NAN), Label::Negative)
            .unwrap_err();
        assert!(matches!(err, PosteriorError::InvalidParameters { role: "worker", .. }));
    }

    #[test]
    fn test_degenerate_variance_detected() {
        let up = PosteriorUpdater::default();
        let err = up
            .match_moments(Moments {
                mean: 0.5,
                second: 0.25,
            })
            .unwrap_err();
        assert!(matches!(err, PosteriorError::DegenerateVariance { .. }));
    }

    #[test]
    fn test_large_epsilon_turns_update_degenerate() {
        let strict = PosteriorUpdater::new(1.0);
        let err = strict
            .update_task(BetaParams::uniform(), BetaParams::new(4.0, 1.0), Label::Positive)
            .unwrap_err();
        assert!(matches!(err, PosteriorError::DegenerateVariance { .. }));
    }

    #[test]
    fn test_impossible_moments_give_non_positive_shape() {
        let up = PosteriorUpdater::default();
        // ν > μ is not achievable on [0, 1]; the matched shapes go negative.
        let err = up
            .match_moments(Moments {
                mean: 0.5,
                second: 0.6,
            })
            .unwrap_err();
        assert!(matches!(err, PosteriorError::NonPositiveShape { .. }));
    }
}
