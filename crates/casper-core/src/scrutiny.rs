use std::collections::VecDeque;

use rand::Rng;

use crate::allocator::gauss_random;
use crate::config::RunConfig;
use crate::display::Display;
use crate::saliency::SaliencyMap;
use crate::trace::{Trace, TraceEventKind};

/// One escalated item awaiting focused attention.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Escalation {
    pub item: usize,
    pub escalated_at: f64,
}

/// Items awaiting serial evaluation, strictly ordered by escalation time
/// (ties broken by item index at push time). Consumed destructively.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScrutinyQueue {
    entries: VecDeque<Escalation>,
}

impl ScrutinyQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an escalation. Escalation times never decrease during a
    /// trial, so appending preserves FIFO order.
    pub fn push(&mut self, item: usize, escalated_at: f64) {
        debug_assert!(
            self.entries
                .back()
                .is_none_or(|last| last.escalated_at <= escalated_at),
            "escalation times must be non-decreasing"
        );
        self.entries.push_back(Escalation {
            item,
            escalated_at,
        });
    }

    pub fn pop(&mut self) -> Option<Escalation> {
        self.entries.pop_front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Escalation> {
        self.entries.iter()
    }
}

/// Outcome of evaluating one dequeued item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrutinyStep {
    Rejected(usize),
    TargetFound(usize),
}

/// The focused-attention bottleneck: items are evaluated one at a time in
/// strict FIFO order, each paying an attention-shift cost, an optional
/// eye-movement cost, and a sampled scrutiny duration.
#[derive(Debug)]
pub struct SerialScrutinizer {
    queue: ScrutinyQueue,
    time: f64,
    fixation: Option<[f64; 2]>,
    evaluated: usize,
    eye_movements: usize,
}

impl SerialScrutinizer {
    pub fn new(queue: ScrutinyQueue, start_time: f64, fixation: Option<[f64; 2]>) -> Self {
        Self {
            queue,
            time: start_time,
            fixation,
            evaluated: 0,
            eye_movements: 0,
        }
    }

    /// Dequeue and evaluate the next item; `None` once the queue is empty.
    ///
    /// A dequeued target terminates the search immediately; the caller
    /// reads the decision time from `time()`.
    pub fn scrutinize_next(
        &mut self,
        display: &Display,
        saliency: &SaliencyMap,
        config: &RunConfig,
        rng: &mut impl Rng,
        trace: &mut Trace,
    ) -> Option<ScrutinyStep> {
        let escalation = self.queue.pop()?;
        let item = escalation.item;

        self.time += config.attention_shift_cost;
        if config.permit_eye_movements
            && let Some(location) = display.items()[item].location
        {
            self.time += config.eye_movement_cost;
            self.fixation = Some(location);
            self.eye_movements += 1;
            trace.push(self.time, item, TraceEventKind::FixationMoved);
        }

        self.time += sample_duration(saliency.get(item), config, rng);
        self.evaluated += 1;

        if display.items()[item].is_target {
            trace.push(self.time, item, TraceEventKind::SerialAccepted);
            Some(ScrutinyStep::TargetFound(item))
        } else {
            trace.push(self.time, item, TraceEventKind::SerialRejected);
            Some(ScrutinyStep::Rejected(item))
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn evaluated(&self) -> usize {
        self.evaluated
    }

    pub fn eye_movements(&self) -> usize {
        self.eye_movements
    }

    pub fn fixation(&self) -> Option<[f64; 2]> {
        self.fixation
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

/// Scrutiny duration for an item of saliency `s`: mean
/// `base_cost * (1 + difficulty_gain * (1 - s/ceiling))` times a mean-one
/// log-normal multiplier (`spread` = 0 makes the draw deterministic).
/// Low-saliency items cost more time.
fn sample_duration(saliency: f64, config: &RunConfig, rng: &mut impl Rng) -> f64 {
    let difficulty = 1.0 - (saliency / config.singleton_saliency).clamp(0.0, 1.0);
    let mean = config.serial.base_cost * (1.0 + config.serial.difficulty_gain * difficulty);

    let spread = config.serial.spread;
    if spread > 0.0 {
        mean * (spread * gauss_random(rng) - spread * spread / 2.0).exp()
    } else {
        mean
    }
}
