//! CASPER visual search simulation engine.
//!
//! Models human visual search over a display of items: per-item saliency
//! (template contrast against the rest of the display) drives a stochastic
//! accumulation race in which a shared attentional resource is allocated
//! proportional to salience. Items are rejected or accepted in parallel
//! when their evidence crosses a bound; items that resolve neither way
//! within the dwell window escalate to a serial, one-at-a-time scrutiny
//! stage. The emergent set-size and distractor-heterogeneity effects are
//! the point of the model.
//!
//! Zero I/O: pure math engine with no opinions about rendering, prompts,
//! or persistence. Every trial is driven by an explicit `Display` +
//! `RunConfig` pair and a seed; identical inputs give identical results.

pub mod allocator;
pub mod batch;
pub mod config;
pub mod constants;
pub mod display;
pub mod error;
pub mod feature;
pub mod layout;
pub mod saliency;
pub mod scrutiny;
pub mod stimuli;
pub mod trace;
pub mod trial;

pub use allocator::{AllocationState, AttentionAllocator, ItemStatus, ParallelOutcome};
pub use batch::{BatchOutcome, BatchSummary, run_batch};
pub use config::{DistanceFalloff, RunConfig, SerialCost};
pub use display::{Display, Item};
pub use error::{ModelError, Result};
pub use feature::{Dimension, FeatureSpace};
pub use layout::{DisplayGeometry, cartesian_locations, eccentricity_weights, polar_locations};
pub use saliency::{SaliencyMap, compute_saliencies};
pub use scrutiny::{Escalation, ScrutinyQueue, ScrutinyStep, SerialScrutinizer};
pub use stimuli::{Color, DisplayBuilder, Shape, feature_vector, relevance_weights, stimulus_space};
pub use trace::{TraceEvent, TraceEventKind};
pub use trial::{Decision, Trial, TrialResult, run_trial};
