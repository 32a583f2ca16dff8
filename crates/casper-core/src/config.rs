use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ACCEPTANCE_THRESHOLD, DEFAULT_ALLOCATION_RATE, DEFAULT_ATTENTION_SHIFT_COST,
    DEFAULT_EXOGENOUS_CUE_NOISE, DEFAULT_EYE_MOVEMENT_COST, DEFAULT_INTEGRATOR_DECAY,
    DEFAULT_MAX_DWELL, DEFAULT_NOISE_SD, DEFAULT_REJECTION_THRESHOLD, DEFAULT_SAFETY_CUTOFF,
    DEFAULT_SALIENCE_WEIGHTING, DEFAULT_SERIAL_BASE_COST, DEFAULT_SERIAL_DIFFICULTY_GAIN,
    DEFAULT_SERIAL_SPREAD, DEFAULT_SINGLETON_SALIENCY, DEFAULT_TARGET_ABSENT_COST,
};
use crate::error::{ModelError, Result};

/// Parameters of the serial-scrutiny duration draw.
///
/// Mean duration for an item of saliency s is
/// `base_cost * (1 + difficulty_gain * (1 - s/ceiling))`; `spread` is the
/// sigma of a mean-one log-normal multiplier (0 = deterministic).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialCost {
    pub base_cost: f64,
    pub difficulty_gain: f64,
    pub spread: f64,
}

impl Default for SerialCost {
    fn default() -> Self {
        Self {
            base_cost: DEFAULT_SERIAL_BASE_COST,
            difficulty_gain: DEFAULT_SERIAL_DIFFICULTY_GAIN,
            spread: DEFAULT_SERIAL_SPREAD,
        }
    }
}

/// How an item's distance from fixation scales its accumulation rate.
/// Only applies to displays whose items carry locations.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DistanceFalloff {
    /// No eccentricity cost.
    #[default]
    Uniform,
    /// Weight = 1 - distance/zero_at, clamped at zero.
    Linear { zero_at: f64 },
    /// Weight = 1 / (1 + rate * distance/radius).
    Reciprocal { rate: f64, radius: f64 },
}

/// All numeric parameters of one trial. Immutable for the trial's duration.
///
/// The seed is deliberately optional-but-required: reproducibility is a hard
/// requirement of the model, so `validate` treats a missing seed as a
/// configuration error rather than defaulting one in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// RNG seed for all stochastic draws in the trial.
    pub seed: Option<u64>,

    /// Attentional resource delivered per tick, shared across pending items.
    pub allocation_rate: f64,
    /// Target acceptance bound (positive; accumulator crosses upward).
    pub acceptance_threshold: f64,
    /// Distractor rejection bound (positive; accumulator crosses downward).
    pub rejection_threshold: f64,
    /// Standard deviation of per-tick accumulator noise.
    pub noise_sd: f64,
    /// Uniform [0, x) jitter on accumulators at trial start.
    pub exogenous_cue_noise: f64,
    /// Per-tick accumulator decay in [0, 1).
    pub integrator_decay: f64,
    /// Exponent on saliency in the resource-share computation.
    pub salience_weighting: f64,

    /// Ticks before a pending item escalates to serial scrutiny. May be
    /// infinite to disable dwell-based escalation.
    pub max_dwell: f64,
    /// Absolute tick bound; pending items are force-escalated here.
    pub safety_cutoff: f64,
    /// Saliency assigned when a display has a single item.
    pub singleton_saliency: f64,

    pub serial: SerialCost,
    /// Ticks to switch attention to a newly dequeued item.
    pub attention_shift_cost: f64,
    /// Ticks to move the eyes to a located item.
    pub eye_movement_cost: f64,
    /// Whether serial scrutiny refixates located items.
    pub permit_eye_movements: bool,
    /// Flat cost added when a trial concludes target-absent.
    pub target_absent_cost: f64,

    pub distance_falloff: DistanceFalloff,
    /// Record the per-item status-change trace in the TrialResult.
    pub record_trace: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: None,
            allocation_rate: DEFAULT_ALLOCATION_RATE,
            acceptance_threshold: DEFAULT_ACCEPTANCE_THRESHOLD,
            rejection_threshold: DEFAULT_REJECTION_THRESHOLD,
            noise_sd: DEFAULT_NOISE_SD,
            exogenous_cue_noise: DEFAULT_EXOGENOUS_CUE_NOISE,
            integrator_decay: DEFAULT_INTEGRATOR_DECAY,
            salience_weighting: DEFAULT_SALIENCE_WEIGHTING,
            max_dwell: DEFAULT_MAX_DWELL,
            safety_cutoff: DEFAULT_SAFETY_CUTOFF,
            singleton_saliency: DEFAULT_SINGLETON_SALIENCY,
            serial: SerialCost::default(),
            attention_shift_cost: DEFAULT_ATTENTION_SHIFT_COST,
            eye_movement_cost: DEFAULT_EYE_MOVEMENT_COST,
            permit_eye_movements: true,
            target_absent_cost: DEFAULT_TARGET_ABSENT_COST,
            distance_falloff: DistanceFalloff::default(),
            record_trace: false,
        }
    }
}

impl RunConfig {
    /// Default parameters with the given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Copy of this config with a different seed.
    pub fn with_seed(&self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self.clone()
        }
    }

    /// Fail fast on parameters that would make the simulation meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.seed.is_none() {
            return Err(ModelError::InvalidConfig(
                "seed is required for reproducibility".to_string(),
            ));
        }
        if !(self.allocation_rate > 0.0) {
            return Err(ModelError::InvalidConfig(
                "allocation_rate must be > 0".to_string(),
            ));
        }
        if !(self.acceptance_threshold > 0.0) {
            return Err(ModelError::InvalidConfig(
                "acceptance_threshold must be > 0".to_string(),
            ));
        }
        if !(self.rejection_threshold > 0.0) {
            return Err(ModelError::InvalidConfig(
                "rejection_threshold must be > 0".to_string(),
            ));
        }
        if !(self.noise_sd >= 0.0) {
            return Err(ModelError::InvalidConfig(
                "noise_sd must be >= 0".to_string(),
            ));
        }
        if !(self.exogenous_cue_noise >= 0.0) {
            return Err(ModelError::InvalidConfig(
                "exogenous_cue_noise must be >= 0".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.integrator_decay) {
            return Err(ModelError::InvalidConfig(
                "integrator_decay must be in [0, 1)".to_string(),
            ));
        }
        if !(self.salience_weighting >= 0.0) {
            return Err(ModelError::InvalidConfig(
                "salience_weighting must be >= 0".to_string(),
            ));
        }
        if !(self.max_dwell > 0.0) {
            return Err(ModelError::InvalidConfig(
                "max_dwell must be > 0".to_string(),
            ));
        }
        if !(self.safety_cutoff > 0.0) || !self.safety_cutoff.is_finite() {
            return Err(ModelError::InvalidConfig(
                "safety_cutoff must be finite and > 0".to_string(),
            ));
        }
        if !(self.singleton_saliency > 0.0) {
            return Err(ModelError::InvalidConfig(
                "singleton_saliency must be > 0".to_string(),
            ));
        }
        if !(self.serial.base_cost > 0.0) {
            return Err(ModelError::InvalidConfig(
                "serial.base_cost must be > 0".to_string(),
            ));
        }
        if !(self.serial.difficulty_gain >= 0.0) {
            return Err(ModelError::InvalidConfig(
                "serial.difficulty_gain must be >= 0".to_string(),
            ));
        }
        if !(self.serial.spread >= 0.0) {
            return Err(ModelError::InvalidConfig(
                "serial.spread must be >= 0".to_string(),
            ));
        }
        if !(self.attention_shift_cost >= 0.0) {
            return Err(ModelError::InvalidConfig(
                "attention_shift_cost must be >= 0".to_string(),
            ));
        }
        if !(self.eye_movement_cost >= 0.0) {
            return Err(ModelError::InvalidConfig(
                "eye_movement_cost must be >= 0".to_string(),
            ));
        }
        if !(self.target_absent_cost >= 0.0) {
            return Err(ModelError::InvalidConfig(
                "target_absent_cost must be >= 0".to_string(),
            ));
        }
        match self.distance_falloff {
            DistanceFalloff::Uniform => {}
            DistanceFalloff::Linear { zero_at } => {
                if !(zero_at > 0.0) {
                    return Err(ModelError::InvalidConfig(
                        "distance_falloff zero_at must be > 0".to_string(),
                    ));
                }
            }
            DistanceFalloff::Reciprocal { rate, radius } => {
                if !(rate >= 0.0) || !(radius > 0.0) {
                    return Err(ModelError::InvalidConfig(
                        "distance_falloff rate must be >= 0 and radius > 0".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid_once_seeded() {
        assert!(RunConfig::seeded(42).validate().is_ok());
    }

    #[test]
    fn test_missing_seed_rejected() {
        let config = RunConfig::default();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ModelError::InvalidConfig(_)), "got {err}");
    }

    #[test]
    fn test_bad_parameters_rejected() {
        let mut config = RunConfig::seeded(1);
        config.allocation_rate = 0.0;
        assert!(config.validate().is_err(), "rate 0 should be rejected");

        let mut config = RunConfig::seeded(1);
        config.rejection_threshold = -1.0;
        assert!(config.validate().is_err(), "negative threshold rejected");

        let mut config = RunConfig::seeded(1);
        config.noise_sd = -0.1;
        assert!(config.validate().is_err(), "negative noise rejected");

        let mut config = RunConfig::seeded(1);
        config.integrator_decay = 1.0;
        assert!(config.validate().is_err(), "decay 1.0 rejected");

        let mut config = RunConfig::seeded(1);
        config.acceptance_threshold = f64::NAN;
        assert!(config.validate().is_err(), "NaN threshold rejected");
    }

    #[test]
    fn test_infinite_dwell_allowed_finite_cutoff_required() {
        let mut config = RunConfig::seeded(1);
        config.max_dwell = f64::INFINITY;
        assert!(config.validate().is_ok(), "infinite dwell is legal");

        config.safety_cutoff = f64::INFINITY;
        assert!(config.validate().is_err(), "cutoff must stay finite");
    }

    #[test]
    fn test_with_seed_keeps_other_fields() {
        let mut config = RunConfig::seeded(1);
        config.noise_sd = 0.25;
        let reseeded = config.with_seed(99);
        assert_eq!(reseeded.seed, Some(99));
        assert_eq!(reseeded.noise_sd, 0.25);
    }

    #[test]
    fn test_falloff_validation() {
        let mut config = RunConfig::seeded(1);
        config.distance_falloff = DistanceFalloff::Linear { zero_at: 0.0 };
        assert!(config.validate().is_err());

        config.distance_falloff = DistanceFalloff::Reciprocal {
            rate: 1.0,
            radius: 200.0,
        };
        assert!(config.validate().is_ok());
    }
}
