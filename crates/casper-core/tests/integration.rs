//! Integration tests exercising the full search pipeline: display →
//! saliency → parallel accumulation → serial scrutiny → result, plus the
//! emergent effects the model exists to reproduce. Stochastic properties
//! are averaged over many derived seeds with wide margins.

use casper_core::{
    Decision, Display, DisplayBuilder, FeatureSpace, Item, RunConfig, TraceEventKind,
    run_batch, run_trial,
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn orientation_display(angles: &[f64], target: Option<usize>) -> Display {
    let items = angles
        .iter()
        .enumerate()
        .map(|(i, &angle)| Item::new(vec![angle], target == Some(i)))
        .collect();
    Display::new(FeatureSpace::orientation(), items).unwrap()
}

/// Target-absent display of two interleaved distractor classes.
fn two_class_display(per_class: usize) -> Display {
    let mut angles = Vec::new();
    for _ in 0..per_class {
        angles.push(80.0);
        angles.push(100.0);
    }
    orientation_display(&angles, None)
}

#[test]
fn determinism_end_to_end() {
    let display = DisplayBuilder::new()
        .target(casper_core::Color::Red, casper_core::Shape::Vertical)
        .distractors(casper_core::Color::Green, casper_core::Shape::Vertical, 3)
        .distractors(casper_core::Color::Red, casper_core::Shape::Horizontal, 3)
        .build()
        .unwrap();

    let mut config = RunConfig::seeded(2024);
    config.record_trace = true;

    let a = run_trial(&display, &config).unwrap();
    let b = run_trial(&display, &config).unwrap();
    assert_eq!(a, b, "repeated invocation must be bit-identical");

    let batch_a = run_batch(&display, &config, 16).unwrap();
    let batch_b = run_batch(&display, &config, 16).unwrap();
    assert_eq!(batch_a, batch_b, "batches must not depend on scheduling");
}

#[test]
fn set_size_effect_is_monotone() {
    let config = RunConfig::seeded(500);
    let mut means = Vec::new();
    for per_class in [2usize, 4, 8] {
        let display = two_class_display(per_class);
        let batch = run_batch(&display, &config, 30).unwrap();
        means.push(batch.summary.mean_rt);
    }

    assert!(
        means[0] < means[1] && means[1] < means[2],
        "mean RT must grow with set size: {means:?}"
    );
}

#[test]
fn saliency_monotonicity_speeds_rejection() {
    // displays differ only in how far item 0 sits from the 90-degree
    // crowd: 90 degrees away in A, 30 degrees away in B
    let display_a = orientation_display(&[0.0, 90.0, 90.0, 90.0], None);
    let display_b = orientation_display(&[60.0, 90.0, 90.0, 90.0], None);

    let mut config = RunConfig::seeded(0);
    config.noise_sd = 0.05;
    config.record_trace = true;

    let mean_rejection_time = |display: &Display| {
        let mut times = Vec::new();
        for seed in 0..40u64 {
            let result = run_trial(display, &config.with_seed(seed)).unwrap();
            let trace = result.trace.unwrap();
            let rejected_at = trace
                .iter()
                .find(|e| e.item == 0 && e.kind == TraceEventKind::ParallelRejected)
                .map(|e| e.time)
                .expect("item 0 should parallel-reject under low noise");
            times.push(rejected_at);
        }
        times.iter().sum::<f64>() / times.len() as f64
    };

    let fast = mean_rejection_time(&display_a);
    let slow = mean_rejection_time(&display_b);
    assert!(
        fast < slow,
        "higher contrast must reject no slower: {fast} vs {slow}"
    );
}

#[test]
fn target_absent_is_never_found() {
    let displays = [
        orientation_display(&[0.0, 90.0, 90.0, 90.0], None),
        orientation_display(&[45.0, 45.0, 45.0, 45.0], None),
        two_class_display(4),
    ];

    for display in &displays {
        for seed in 0..50u64 {
            let result = run_trial(display, &RunConfig::seeded(seed)).unwrap();
            assert_eq!(
                result.decision,
                Decision::TargetAbsent,
                "seed {seed}: absent display produced a found decision"
            );
            assert_eq!(result.found, None);
        }
    }
}

#[test]
fn scrutiny_queue_is_strict_fifo() {
    // zero-contrast display: everything escalates, then drains serially
    let display = orientation_display(&[45.0; 5], None);
    let mut config = RunConfig::seeded(42);
    config.noise_sd = 0.01;
    config.record_trace = true;

    let result = run_trial(&display, &config).unwrap();
    let trace = result.trace.unwrap();

    let escalated: Vec<usize> = trace
        .iter()
        .filter(|e| e.kind == TraceEventKind::Escalated)
        .map(|e| e.item)
        .collect();
    let serially_resolved: Vec<usize> = trace
        .iter()
        .filter(|e| {
            matches!(
                e.kind,
                TraceEventKind::SerialRejected | TraceEventKind::SerialAccepted
            )
        })
        .map(|e| e.item)
        .collect();

    assert_eq!(escalated.len(), 5);
    assert_eq!(
        escalated, serially_resolved,
        "serial evaluation must follow escalation order exactly"
    );

    // timestamps never decrease, and no item resolves twice
    let mut last = f64::NEG_INFINITY;
    for event in &trace {
        assert!(event.time >= last, "trace went backwards at {event:?}");
        last = event.time;
    }
    let mut seen = std::collections::HashSet::new();
    for &item in &serially_resolved {
        assert!(seen.insert(item), "item {item} scrutinized twice");
    }
}

#[test]
fn termination_is_bounded_by_cutoff() {
    // degenerate parameters: drift-free items, no dwell limit
    let display = orientation_display(&[45.0; 5], None);
    let mut config = RunConfig::seeded(42);
    config.noise_sd = 0.0;
    config.max_dwell = f64::INFINITY;
    config.safety_cutoff = 200.0;
    config.serial.spread = 0.0;
    config.record_trace = true;

    let result = run_trial(&display, &config).unwrap();

    // worst case per serial item: shift + base * (1 + gain)
    let per_item = config.attention_shift_cost
        + config.serial.base_cost * (1.0 + config.serial.difficulty_gain);
    let bound = config.safety_cutoff + 5.0 * per_item + config.target_absent_cost;
    assert!(
        result.elapsed <= bound + 1e-9,
        "elapsed {} exceeds bound {bound}",
        result.elapsed
    );

    let trace = result.trace.unwrap();
    assert_eq!(
        trace
            .iter()
            .filter(|e| e.kind == TraceEventKind::CutoffEscalated)
            .count(),
        5,
        "every item should have been force-escalated at the cutoff"
    );
}

#[test]
fn pop_out_beats_heterogeneous_displays() {
    let config = RunConfig::seeded(0);
    let trials = 60usize;

    // homogeneous: 5 identical 90-degree distractors, 0-degree target
    let pop_out = orientation_display(&[0.0, 90.0, 90.0, 90.0, 90.0, 90.0], Some(0));
    let pop_results: Vec<_> = (0..trials)
        .map(|k| run_trial(&pop_out, &config.with_seed(k as u64)).unwrap())
        .collect();

    // heterogeneous: 5 distinct random orientations per trial
    let het_results: Vec<_> = (0..trials)
        .map(|k| {
            let mut rng = SmallRng::seed_from_u64(k as u64);
            let mut angles = vec![0.0];
            for _ in 0..5 {
                angles.push(rng.random_range(10.0..170.0));
            }
            let display = orientation_display(&angles, Some(0));
            run_trial(&display, &config.with_seed(k as u64)).unwrap()
        })
        .collect();

    let stats = |results: &[casper_core::TrialResult]| {
        let n = results.len() as f64;
        let mean = results.iter().map(|r| r.elapsed).sum::<f64>() / n;
        let sd = (results
            .iter()
            .map(|r| (r.elapsed - mean).powi(2))
            .sum::<f64>()
            / n)
            .sqrt();
        (mean, sd)
    };

    let (pop_mean, pop_sd) = stats(&pop_results);
    let (het_mean, het_sd) = stats(&het_results);

    assert!(
        pop_mean < het_mean,
        "pop-out should be faster: {pop_mean} vs {het_mean}"
    );
    assert!(
        pop_sd < het_sd,
        "pop-out should be less variable: {pop_sd} vs {het_sd}"
    );
    assert!(
        pop_results.iter().all(|r| r.serial_evaluations == 0),
        "pop-out targets resolve in parallel"
    );

    // both conditions always answer correctly
    for result in pop_results.iter().chain(het_results.iter()) {
        assert_eq!(result.decision, Decision::TargetFound);
        assert_eq!(result.found, Some(0));
    }
}

#[test]
fn trial_result_serde_roundtrip() {
    let display = orientation_display(&[0.0, 90.0, 90.0], Some(0));
    let mut config = RunConfig::seeded(77);
    config.record_trace = true;

    let result = run_trial(&display, &config).unwrap();
    let json = serde_json::to_string(&result).unwrap();
    let back: casper_core::TrialResult = serde_json::from_str(&json).unwrap();
    assert_eq!(result, back);
}
