use serde::{Deserialize, Serialize};

/// What happened to an item at a point in simulated time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceEventKind {
    /// Rejected during parallel accumulation, without focused attention.
    ParallelRejected,
    /// Accepted as the target during parallel accumulation.
    ParallelAccepted,
    /// Dwell expired; handed to the scrutiny queue.
    Escalated,
    /// Force-escalated at the safety cutoff.
    CutoffEscalated,
    /// Rejected under serial scrutiny.
    SerialRejected,
    /// Identified as the target under serial scrutiny.
    SerialAccepted,
    /// The eyes moved to this item.
    FixationMoved,
}

/// One per-item status change, timestamped in simulation ticks.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub time: f64,
    pub item: usize,
    pub kind: TraceEventKind,
}

/// Event recorder for one trial. A no-op unless the config asked for a
/// trace, so the hot loop pays nothing by default.
#[derive(Debug, Default)]
pub(crate) struct Trace {
    events: Option<Vec<TraceEvent>>,
}

impl Trace {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            events: enabled.then(Vec::new),
        }
    }

    pub(crate) fn push(&mut self, time: f64, item: usize, kind: TraceEventKind) {
        if let Some(events) = &mut self.events {
            events.push(TraceEvent { time, item, kind });
        }
    }

    pub(crate) fn into_events(self) -> Option<Vec<TraceEvent>> {
        self.events
    }
}
