/// Evidence a target's accumulator must reach to be accepted as a match
pub const DEFAULT_ACCEPTANCE_THRESHOLD: f64 = 2.0;

/// Evidence magnitude a distractor's accumulator must reach to be rejected
pub const DEFAULT_REJECTION_THRESHOLD: f64 = 1.0;

/// Attentional resource delivered per tick across all pending items
pub const DEFAULT_ALLOCATION_RATE: f64 = 1.0;

/// Standard deviation of the per-tick accumulator noise
pub const DEFAULT_NOISE_SD: f64 = 0.1;

/// Symmetry-breaking jitter applied to accumulators at trial start
pub const DEFAULT_EXOGENOUS_CUE_NOISE: f64 = 0.1;

/// Per-tick accumulator decay; 1 - decay is the proportion preserved
pub const DEFAULT_INTEGRATOR_DECAY: f64 = 0.01;

/// Exponent on saliency when computing resource shares (0 = equal split)
pub const DEFAULT_SALIENCE_WEIGHTING: f64 = 1.0;

/// Ticks an item may stay pending before escalating to serial scrutiny
pub const DEFAULT_MAX_DWELL: f64 = 50.0;

/// Absolute tick bound; all pending items are force-escalated here
pub const DEFAULT_SAFETY_CUTOFF: f64 = 1000.0;

/// Saliency assigned to the sole item of a one-item display
pub const DEFAULT_SINGLETON_SALIENCY: f64 = 1.0;

/// Mean serial-scrutiny duration for a maximally salient item
pub const DEFAULT_SERIAL_BASE_COST: f64 = 8.0;

/// How strongly low saliency inflates serial-scrutiny duration
pub const DEFAULT_SERIAL_DIFFICULTY_GAIN: f64 = 1.0;

/// Log-normal sigma of the serial-scrutiny duration draw (0 = deterministic)
pub const DEFAULT_SERIAL_SPREAD: f64 = 0.2;

/// Ticks spent switching attention to a newly dequeued item
pub const DEFAULT_ATTENTION_SHIFT_COST: f64 = 2.0;

/// Ticks spent moving the eyes to a located item
pub const DEFAULT_EYE_MOVEMENT_COST: f64 = 3.0;

/// Flat cost added when a trial concludes target-absent
pub const DEFAULT_TARGET_ABSENT_COST: f64 = 2.0;

/// Radius of the simulated display, in screen units
pub const DEFAULT_DISPLAY_RADIUS: f64 = 200.0;

/// Radius of a single item; half a side for square items
pub const DEFAULT_ITEM_RADIUS: f64 = 10.0;

/// Distance between adjacent item origins; 2 * item radius plus a buffer
pub const DEFAULT_ITEM_SPACING: f64 = 22.0;

/// Center of the simulated display, in screen coordinates
pub const DEFAULT_DISPLAY_CENTER: [f64; 2] = [300.0, 300.0];

/// Numerical epsilon for near-zero comparisons
pub const EPSILON: f64 = 1e-10;
