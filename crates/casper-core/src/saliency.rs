use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::display::Display;

/// Per-item template-contrast scores for one trial.
///
/// Computed fresh per trial and immutable afterwards; the allocator only
/// reads it for resource weighting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaliencyMap {
    scores: Vec<f64>,
}

impl SaliencyMap {
    pub fn get(&self, item: usize) -> f64 {
        self.scores[item]
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Saliency of item i = mean feature distance to every other display item.
///
/// Items that look very different from their surroundings score high (easy
/// parallel rejection); items that resemble their surroundings score low
/// (likely serial scrutiny). With normalized feature distances the scores
/// land in [0, 1]. A one-item display has no neighbors, so its sole item
/// gets the configured ceiling. Deterministic: all randomness lives in the
/// allocator.
pub fn compute_saliencies(display: &Display, config: &RunConfig) -> SaliencyMap {
    let n = display.len();
    if n == 1 {
        return SaliencyMap {
            scores: vec![config.singleton_saliency],
        };
    }

    let mut sums = vec![0.0; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = display.item_distance(i, j);
            sums[i] += d;
            sums[j] += d;
        }
    }

    let neighbors = (n - 1) as f64;
    let scores = sums.into_iter().map(|sum| sum / neighbors).collect();
    SaliencyMap { scores }
}
