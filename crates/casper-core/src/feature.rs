use serde::{Deserialize, Serialize};

use crate::constants::EPSILON;
use crate::error::{ModelError, Result};

/// One feature dimension and its distance rule.
///
/// The closed set of variants replaces any dispatch over "feature type":
/// each carries its own normalization so per-dimension distances land in
/// [0, 1] and compose into a single scalar.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Dimension {
    /// Circular quantity (e.g. orientation). Distance is the shortest arc,
    /// normalized by the half-period.
    Angular { period: f64, weight: f64 },
    /// Continuous quantity. Distance is |a - b| / scale, clamped at 1.
    Linear { scale: f64, weight: f64 },
    /// Discrete code. Distance is 0 on equality, 1 otherwise.
    Categorical { weight: f64 },
}

impl Dimension {
    pub fn weight(&self) -> f64 {
        match *self {
            Dimension::Angular { weight, .. }
            | Dimension::Linear { weight, .. }
            | Dimension::Categorical { weight } => weight,
        }
    }

    /// Normalized distance between two values on this dimension, in [0, 1].
    pub fn component_distance(&self, a: f64, b: f64) -> f64 {
        match *self {
            Dimension::Angular { period, .. } => {
                let diff = (a - b).rem_euclid(period);
                let arc = diff.min(period - diff);
                arc / (period / 2.0)
            }
            Dimension::Linear { scale, .. } => ((a - b).abs() / scale).min(1.0),
            Dimension::Categorical { .. } => {
                if (a - b).abs() < EPSILON {
                    0.0
                } else {
                    1.0
                }
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if !(self.weight() >= 0.0) {
            return Err(ModelError::InvalidConfig(
                "dimension weight must be >= 0".to_string(),
            ));
        }
        match *self {
            Dimension::Angular { period, .. } if !(period > 0.0) => Err(
                ModelError::InvalidConfig("angular period must be > 0".to_string()),
            ),
            Dimension::Linear { scale, .. } if !(scale > 0.0) => Err(ModelError::InvalidConfig(
                "linear scale must be > 0".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// The declared dimensions of a display's feature vectors, with the
/// pairwise distance metric over them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureSpace {
    dims: Vec<Dimension>,
}

impl FeatureSpace {
    /// Validate and build a space. At least one dimension must carry
    /// positive weight, otherwise every distance would be zero.
    pub fn new(dims: Vec<Dimension>) -> Result<Self> {
        if dims.is_empty() {
            return Err(ModelError::InvalidConfig(
                "feature space needs at least one dimension".to_string(),
            ));
        }
        for dim in &dims {
            dim.validate()?;
        }
        if !dims.iter().any(|d| d.weight() > 0.0) {
            return Err(ModelError::InvalidConfig(
                "feature space needs at least one positive weight".to_string(),
            ));
        }
        Ok(Self { dims })
    }

    /// A space of `len` identical linear dimensions, unit weight.
    pub fn uniform_linear(len: usize, scale: f64) -> Result<Self> {
        Self::new(vec![Dimension::Linear { scale, weight: 1.0 }; len])
    }

    /// A single orientation dimension in degrees (bars wrap at 180°).
    pub fn orientation() -> Self {
        Self {
            dims: vec![Dimension::Angular {
                period: 180.0,
                weight: 1.0,
            }],
        }
    }

    pub fn len(&self) -> usize {
        self.dims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dims
    }

    /// Same dimensions with new weights (relevance reweighting).
    pub fn reweighted(&self, weights: &[f64]) -> Result<Self> {
        if weights.len() != self.dims.len() {
            return Err(ModelError::InvalidConfig(format!(
                "expected {} weights, got {}",
                self.dims.len(),
                weights.len()
            )));
        }
        let dims = self
            .dims
            .iter()
            .zip(weights)
            .map(|(dim, &weight)| match *dim {
                Dimension::Angular { period, .. } => Dimension::Angular { period, weight },
                Dimension::Linear { scale, .. } => Dimension::Linear { scale, weight },
                Dimension::Categorical { .. } => Dimension::Categorical { weight },
            })
            .collect();
        Self::new(dims)
    }

    /// Weight-normalized mean of per-dimension distances. Symmetric,
    /// in [0, 1], and zero iff the vectors agree on every
    /// positively-weighted dimension.
    ///
    /// Callers guarantee arity (Display validation enforces it).
    pub fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        debug_assert_eq!(a.len(), self.dims.len());
        debug_assert_eq!(b.len(), self.dims.len());

        let mut sum = 0.0;
        let mut weight_sum = 0.0;
        for (i, dim) in self.dims.iter().enumerate() {
            let w = dim.weight();
            if w <= 0.0 {
                continue;
            }
            sum += w * dim.component_distance(a[i], b[i]);
            weight_sum += w;
        }
        sum / weight_sum
    }
}
