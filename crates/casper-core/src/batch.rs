//! Batch runs: many independent trials of one display under one config.
//!
//! Trials share no mutable state (each owns its RNG, accumulators, and
//! scrutiny queue), so a batch fans out across worker threads. Per-trial
//! seeds are derived from the base seed by trial index, which keeps the
//! output identical regardless of how rayon schedules the work.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::display::Display;
use crate::error::{ModelError, Result};
use crate::trial::{TrialResult, run_trial};

/// Aggregate statistics over one batch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub trials: usize,
    /// Mean simulated response time, in ticks.
    pub mean_rt: f64,
    /// Population standard deviation of response time.
    pub sd_rt: f64,
    /// Fraction of trials whose decision matched the display ground truth.
    pub accuracy: f64,
    pub mean_parallel_rejections: f64,
    pub mean_serial_evaluations: f64,
    /// Fraction of trials that needed serial scrutiny at all.
    pub escalation_rate: f64,
}

impl BatchSummary {
    pub fn from_results(display: &Display, results: &[TrialResult]) -> Self {
        let n = results.len();
        let count = n as f64;

        let mean_rt = results.iter().map(|r| r.elapsed).sum::<f64>() / count;
        let sd_rt = (results
            .iter()
            .map(|r| (r.elapsed - mean_rt).powi(2))
            .sum::<f64>()
            / count)
            .sqrt();
        let accuracy = results.iter().filter(|r| r.correct_for(display)).count() as f64 / count;
        let mean_parallel_rejections = results
            .iter()
            .map(|r| r.parallel_rejections as f64)
            .sum::<f64>()
            / count;
        let mean_serial_evaluations = results
            .iter()
            .map(|r| r.serial_evaluations as f64)
            .sum::<f64>()
            / count;
        let escalation_rate =
            results.iter().filter(|r| r.serial_evaluations > 0).count() as f64 / count;

        Self {
            trials: n,
            mean_rt,
            sd_rt,
            accuracy,
            mean_parallel_rejections,
            mean_serial_evaluations,
            escalation_rate,
        }
    }
}

/// Per-trial results plus their summary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub results: Vec<TrialResult>,
    pub summary: BatchSummary,
}

/// Seed for trial `index` within a batch. `seed_from_u64` already runs the
/// value through SplitMix64, so consecutive offsets decorrelate fine.
fn trial_seed(base: u64, index: usize) -> u64 {
    base.wrapping_add(index as u64)
}

/// Run `trials` independent trials in parallel. Deterministic: results are
/// collected in trial order and each trial's seed depends only on the base
/// seed and its index.
pub fn run_batch(display: &Display, config: &RunConfig, trials: usize) -> Result<BatchOutcome> {
    config.validate()?;
    if trials == 0 {
        return Err(ModelError::InvalidConfig(
            "batch needs at least one trial".to_string(),
        ));
    }
    let base_seed = config
        .seed
        .ok_or_else(|| ModelError::InvalidConfig("seed is required".to_string()))?;

    let results: Result<Vec<TrialResult>> = (0..trials)
        .into_par_iter()
        .map(|i| run_trial(display, &config.with_seed(trial_seed(base_seed, i))))
        .collect();
    let results = results?;

    let summary = BatchSummary::from_results(display, &results);
    Ok(BatchOutcome { results, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::Item;
    use crate::feature::FeatureSpace;
    use crate::trial::Decision;

    fn orientation_display(angles: &[f64], target: Option<usize>) -> Display {
        let items = angles
            .iter()
            .enumerate()
            .map(|(i, &angle)| Item::new(vec![angle], target == Some(i)))
            .collect();
        Display::new(FeatureSpace::orientation(), items).unwrap()
    }

    #[test]
    fn test_batch_is_reproducible() {
        let display = orientation_display(&[0.0, 30.0, 60.0, 90.0, 120.0], Some(0));
        let config = RunConfig::seeded(42);
        let a = run_batch(&display, &config, 20).unwrap();
        let b = run_batch(&display, &config, 20).unwrap();
        assert_eq!(a, b, "same base seed must reproduce the whole batch");
    }

    #[test]
    fn test_batch_matches_sequential_runs() {
        let display = orientation_display(&[0.0, 45.0, 90.0, 135.0], Some(0));
        let config = RunConfig::seeded(7);
        let batch = run_batch(&display, &config, 10).unwrap();

        for (i, parallel_result) in batch.results.iter().enumerate() {
            let sequential =
                run_trial(&display, &config.with_seed(7 + i as u64)).unwrap();
            assert_eq!(
                *parallel_result, sequential,
                "trial {i} must not depend on scheduling"
            );
        }
    }

    #[test]
    fn test_pop_out_summary() {
        let display = orientation_display(&[0.0, 90.0, 90.0, 90.0, 90.0, 90.0], Some(0));
        let config = RunConfig::seeded(42);
        let batch = run_batch(&display, &config, 50).unwrap();

        assert_eq!(batch.summary.trials, 50);
        assert_eq!(batch.summary.accuracy, 1.0);
        assert!(
            batch.summary.mean_rt < 20.0,
            "pop-out should be fast, got {}",
            batch.summary.mean_rt
        );
        assert!(
            batch.results.iter().all(|r| r.decision == Decision::TargetFound),
            "every pop-out trial finds the target"
        );
    }

    #[test]
    fn test_zero_contrast_summary_escalates() {
        let display = orientation_display(&[45.0, 45.0, 45.0, 45.0], None);
        let mut config = RunConfig::seeded(42);
        config.noise_sd = 0.01;
        let batch = run_batch(&display, &config, 20).unwrap();
        assert_eq!(batch.summary.escalation_rate, 1.0);
        assert_eq!(batch.summary.accuracy, 1.0);
        assert!(batch.summary.mean_serial_evaluations >= 4.0 - 1e-9);
    }

    #[test]
    fn test_empty_batch_rejected() {
        let display = orientation_display(&[0.0, 90.0], None);
        assert!(run_batch(&display, &RunConfig::seeded(1), 0).is_err());
    }

    #[test]
    fn test_sd_computation() {
        let display = orientation_display(&[0.0, 90.0], None);
        let mut config = RunConfig::seeded(1);
        config.noise_sd = 0.0;
        config.exogenous_cue_noise = 0.0;
        // fully deterministic trials: sd must be exactly zero
        let batch = run_batch(&display, &config, 5).unwrap();
        assert_eq!(batch.summary.sd_rt, 0.0);
    }
}
