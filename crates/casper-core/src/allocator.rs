use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::constants::EPSILON;
use crate::display::Display;
use crate::layout::eccentricity_weights;
use crate::saliency::SaliencyMap;
use crate::scrutiny::ScrutinyQueue;
use crate::trace::{Trace, TraceEventKind};

/// Per-item state tag. `Pending` is the only non-terminal state for the
/// parallel stage; `Escalated` hands the item to the serial scrutinizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    ParallelRejected,
    ParallelAccepted,
    Escalated,
}

/// The evolving state of one trial's parallel stage: per-item evidence
/// accumulators and status tags, plus the tick clock. Owned by exactly one
/// trial and discarded at trial end.
#[derive(Clone, Debug)]
pub struct AllocationState {
    evidence: Vec<f64>,
    status: Vec<ItemStatus>,
    time: f64,
}

impl AllocationState {
    pub fn evidence(&self, item: usize) -> f64 {
        self.evidence[item]
    }

    pub fn status(&self, item: usize) -> ItemStatus {
        self.status[item]
    }

    pub fn statuses(&self) -> &[ItemStatus] {
        &self.status
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn pending_count(&self) -> usize {
        self.status
            .iter()
            .filter(|&&s| s == ItemStatus::Pending)
            .count()
    }
}

/// What a tick of the parallel stage produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParallelOutcome {
    /// Pending items remain; keep stepping.
    Running,
    /// The target crossed its acceptance threshold; the search is over.
    TargetFound,
    /// No pending items remain: everything was rejected or escalated.
    Complete,
}

/// The stochastic accumulation engine.
///
/// Each tick, every pending item receives an evidence increment
/// proportional to its saliency and to its share of the attentional
/// resource; the share is proportional to saliency and diluted by the
/// number of competitors, which is what produces the set-size effect.
/// The target drifts toward its acceptance bound, distractors toward
/// their (negative) rejection bound, both under Gaussian noise. Items
/// that reach neither bound within the dwell window escalate to the
/// scrutiny queue; the safety cutoff force-escalates whatever is left, so
/// the stage terminates for any valid parameters.
#[derive(Debug)]
pub struct AttentionAllocator {
    salience: Vec<f64>,
    salience_pow: Vec<f64>,
    eccentricity: Vec<f64>,
    is_target: Vec<bool>,
    state: AllocationState,
    queue: ScrutinyQueue,
    rejections: usize,
}

impl AttentionAllocator {
    /// Set up accumulators for one trial. Initial evidence carries a small
    /// uniform jitter (symmetry breaking between identical items).
    pub fn new(
        display: &Display,
        saliency: &SaliencyMap,
        config: &RunConfig,
        rng: &mut impl Rng,
    ) -> Self {
        let n = display.len();
        let salience: Vec<f64> = saliency.scores().to_vec();
        let salience_pow = salience
            .iter()
            .map(|s| s.powf(config.salience_weighting))
            .collect();
        let evidence = (0..n)
            .map(|_| rng.random::<f64>() * config.exogenous_cue_noise)
            .collect();

        Self {
            salience,
            salience_pow,
            eccentricity: eccentricity_weights(display, &config.distance_falloff),
            is_target: display.items().iter().map(|item| item.is_target).collect(),
            state: AllocationState {
                evidence,
                status: vec![ItemStatus::Pending; n],
                time: 0.0,
            },
            queue: ScrutinyQueue::new(),
            rejections: 0,
        }
    }

    /// Advance simulated time by one tick.
    pub fn step(
        &mut self,
        config: &RunConfig,
        rng: &mut impl Rng,
        trace: &mut Trace,
    ) -> ParallelOutcome {
        let n = self.state.status.len();
        self.state.time += 1.0;
        let now = self.state.time;

        // Resource shares from the statuses at tick start. When every
        // pending saliency is ~0 the resource splits equally.
        let mut pending = 0usize;
        let mut share_denominator = 0.0;
        for i in 0..n {
            if self.state.status[i] == ItemStatus::Pending {
                pending += 1;
                share_denominator += self.salience_pow[i];
            }
        }
        if pending == 0 {
            return ParallelOutcome::Complete;
        }
        let equal_split = share_denominator <= EPSILON;

        // Synchronous update of every pending accumulator.
        for i in 0..n {
            if self.state.status[i] != ItemStatus::Pending {
                continue;
            }
            let share = if equal_split {
                1.0 / pending as f64
            } else {
                self.salience_pow[i] / share_denominator
            };
            let direction = if self.is_target[i] { 1.0 } else { -1.0 };
            let drift =
                config.allocation_rate * self.salience[i] * share * direction * self.eccentricity[i];
            let noise = config.noise_sd * gauss_random(rng);

            self.state.evidence[i] *= 1.0 - config.integrator_decay;
            self.state.evidence[i] += drift + noise;
        }

        // Threshold crossings are identity-gated: only the target can be
        // accepted, only distractors can be rejected.
        for i in 0..n {
            if self.state.status[i] != ItemStatus::Pending {
                continue;
            }
            if self.is_target[i] {
                if self.state.evidence[i] >= config.acceptance_threshold {
                    self.state.status[i] = ItemStatus::ParallelAccepted;
                    trace.push(now, i, TraceEventKind::ParallelAccepted);
                    return ParallelOutcome::TargetFound;
                }
            } else if self.state.evidence[i] <= -config.rejection_threshold {
                self.state.status[i] = ItemStatus::ParallelRejected;
                self.rejections += 1;
                trace.push(now, i, TraceEventKind::ParallelRejected);
            }
        }

        // Dwell expiry and the absolute safety cutoff both escalate, in
        // item-index order at the current time. The cutoff is a recovered
        // condition for degenerate parameters, not an error.
        if now >= config.safety_cutoff {
            self.escalate_pending(now, TraceEventKind::CutoffEscalated, trace);
        } else if now >= config.max_dwell {
            self.escalate_pending(now, TraceEventKind::Escalated, trace);
        }

        if self.state.pending_count() == 0 {
            ParallelOutcome::Complete
        } else {
            ParallelOutcome::Running
        }
    }

    fn escalate_pending(&mut self, now: f64, kind: TraceEventKind, trace: &mut Trace) {
        for i in 0..self.state.status.len() {
            if self.state.status[i] == ItemStatus::Pending {
                self.state.status[i] = ItemStatus::Escalated;
                self.queue.push(i, now);
                trace.push(now, i, kind);
            }
        }
    }

    pub fn state(&self) -> &AllocationState {
        &self.state
    }

    pub fn time(&self) -> f64 {
        self.state.time
    }

    /// Distractors rejected without focused attention so far.
    pub fn rejections(&self) -> usize {
        self.rejections
    }

    /// Hand the escalation queue to the serial stage.
    pub fn take_queue(&mut self) -> ScrutinyQueue {
        std::mem::take(&mut self.queue)
    }
}

/// Box-Muller transform over the trial RNG; standard normal.
pub(crate) fn gauss_random(rng: &mut impl Rng) -> f64 {
    let u1: f64 = rng.random::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}
