use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::allocator::{AttentionAllocator, ParallelOutcome};
use crate::config::RunConfig;
use crate::display::Display;
use crate::error::{ModelError, Result};
use crate::saliency::{SaliencyMap, compute_saliencies};
use crate::scrutiny::{ScrutinyStep, SerialScrutinizer};
use crate::trace::{Trace, TraceEvent};

/// Terminal decision of one trial.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// The target was located (in parallel or under serial scrutiny).
    TargetFound,
    /// Every item was rejected; the display holds no target.
    TargetAbsent,
}

/// Outcome of one simulated search trial.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub decision: Decision,
    /// Total simulated time, in ticks.
    pub elapsed: f64,
    /// Index of the found item on a TargetFound decision.
    pub found: Option<usize>,
    /// Distractors rejected without focused attention.
    pub parallel_rejections: usize,
    /// Items evaluated under serial scrutiny.
    pub serial_evaluations: usize,
    /// Eye movements made during serial scrutiny.
    pub eye_movements: usize,
    /// Per-item status-change events, when the config asked for them.
    pub trace: Option<Vec<TraceEvent>>,
}

impl TrialResult {
    /// Whether the decision matches the display's ground truth.
    pub fn correct_for(&self, display: &Display) -> bool {
        match self.decision {
            Decision::TargetFound => self.found == display.target_index(),
            Decision::TargetAbsent => display.target_index().is_none(),
        }
    }
}

enum Phase {
    Parallel(AttentionAllocator),
    Serial(SerialScrutinizer),
    Finished,
}

/// One running trial, advanced a step at a time.
///
/// A step is one tick of the parallel stage or one serial evaluation, so a
/// caller driving the trial itself (a visualizer, an experiment timeout)
/// can abort between steps by dropping the trial; all state is owned here.
pub struct Trial<'a> {
    display: &'a Display,
    config: RunConfig,
    saliency: SaliencyMap,
    rng: SmallRng,
    trace: Trace,
    phase: Phase,
    parallel_rejections: usize,
}

impl<'a> Trial<'a> {
    /// Validate the config and set up the parallel stage. The display was
    /// validated at construction; the config is checked here, before any
    /// simulation begins.
    pub fn new(display: &'a Display, config: &RunConfig) -> Result<Self> {
        config.validate()?;
        let seed = config
            .seed
            .ok_or_else(|| ModelError::InvalidConfig("seed is required".to_string()))?;

        let saliency = compute_saliencies(display, config);
        let mut rng = SmallRng::seed_from_u64(seed);
        let allocator = AttentionAllocator::new(display, &saliency, config, &mut rng);

        Ok(Self {
            display,
            config: config.clone(),
            saliency,
            rng,
            trace: Trace::new(config.record_trace),
            phase: Phase::Parallel(allocator),
            parallel_rejections: 0,
        })
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished)
    }

    pub fn saliency(&self) -> &SaliencyMap {
        &self.saliency
    }

    /// Advance one step. Returns the result on the step that completes the
    /// trial; `None` while the trial is still running (and on any call
    /// after completion).
    pub fn step(&mut self) -> Option<TrialResult> {
        match &mut self.phase {
            Phase::Parallel(allocator) => {
                match allocator.step(&self.config, &mut self.rng, &mut self.trace) {
                    ParallelOutcome::Running => None,
                    ParallelOutcome::TargetFound => {
                        let elapsed = allocator.time();
                        self.parallel_rejections = allocator.rejections();
                        let found = self.display.target_index();
                        self.phase = Phase::Finished;
                        Some(self.found_result(elapsed, found, 0, 0))
                    }
                    ParallelOutcome::Complete => {
                        let time = allocator.time();
                        self.parallel_rejections = allocator.rejections();
                        let queue = allocator.take_queue();
                        if queue.is_empty() {
                            self.phase = Phase::Finished;
                            Some(self.absent_result(time, 0, 0))
                        } else {
                            self.phase = Phase::Serial(SerialScrutinizer::new(
                                queue,
                                time,
                                self.display.center(),
                            ));
                            None
                        }
                    }
                }
            }
            Phase::Serial(scrutinizer) => {
                match scrutinizer.scrutinize_next(
                    self.display,
                    &self.saliency,
                    &self.config,
                    &mut self.rng,
                    &mut self.trace,
                ) {
                    Some(ScrutinyStep::Rejected(_)) => None,
                    Some(ScrutinyStep::TargetFound(item)) => {
                        let elapsed = scrutinizer.time();
                        let evaluated = scrutinizer.evaluated();
                        let eye_movements = scrutinizer.eye_movements();
                        self.phase = Phase::Finished;
                        Some(self.found_result(elapsed, Some(item), evaluated, eye_movements))
                    }
                    None => {
                        let time = scrutinizer.time();
                        let evaluated = scrutinizer.evaluated();
                        let eye_movements = scrutinizer.eye_movements();
                        self.phase = Phase::Finished;
                        Some(self.absent_result(time, evaluated, eye_movements))
                    }
                }
            }
            Phase::Finished => None,
        }
    }

    fn found_result(
        &mut self,
        elapsed: f64,
        found: Option<usize>,
        serial_evaluations: usize,
        eye_movements: usize,
    ) -> TrialResult {
        TrialResult {
            decision: Decision::TargetFound,
            elapsed,
            found,
            parallel_rejections: self.parallel_rejections,
            serial_evaluations,
            eye_movements,
            trace: std::mem::take(&mut self.trace).into_events(),
        }
    }

    fn absent_result(
        &mut self,
        time: f64,
        serial_evaluations: usize,
        eye_movements: usize,
    ) -> TrialResult {
        TrialResult {
            decision: Decision::TargetAbsent,
            elapsed: time + self.config.target_absent_cost,
            found: None,
            parallel_rejections: self.parallel_rejections,
            serial_evaluations,
            eye_movements,
            trace: std::mem::take(&mut self.trace).into_events(),
        }
    }
}

/// Run one trial to its terminal decision. The sole external entry point:
/// deterministic given the config seed, fails fast on invalid input, and
/// guaranteed to terminate by the safety cutoff plus the worst-case serial
/// drain.
pub fn run_trial(display: &Display, config: &RunConfig) -> Result<TrialResult> {
    let mut trial = Trial::new(display, config)?;
    loop {
        if let Some(result) = trial.step() {
            return Ok(result);
        }
    }
}
