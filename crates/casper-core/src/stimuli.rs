//! Stimulus lexicon: named colors and shapes mapped to opponent-coded
//! feature vectors, plus a builder that assembles validated displays from
//! them. Color channels are paired opponent banks (B/W, R/G, B/Y); shape
//! channels code verticality, diagonals, and junction types.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::display::{Display, Item};
use crate::error::{ModelError, Result};
use crate::feature::{Dimension, FeatureSpace};
use crate::layout::{DisplayGeometry, cartesian_locations};

/// Feature dimensions contributed by color.
pub const COLOR_DIMS: usize = 18;
/// Feature dimensions contributed by shape.
pub const SHAPE_DIMS: usize = 19;
/// Total stimulus feature dimensions.
pub const STIMULUS_DIMS: usize = COLOR_DIMS + SHAPE_DIMS;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
    Red,
    Green,
    Blue,
    Yellow,
    Orange,
    Pink,
}

impl Color {
    pub const ALL: [Color; 8] = [
        Color::White,
        Color::Black,
        Color::Red,
        Color::Green,
        Color::Blue,
        Color::Yellow,
        Color::Orange,
        Color::Pink,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
            Color::Red => "red",
            Color::Green => "green",
            Color::Blue => "blue",
            Color::Yellow => "yellow",
            Color::Orange => "orange",
            Color::Pink => "pink",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        let lower = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| ModelError::UnknownStimulus(format!("color '{s}'")))
    }

    /// Opponent channels: [B/W, R/G, B/Y], three units per pole.
    fn channels(&self) -> [f64; COLOR_DIMS] {
        match self {
            Color::White => [
                1., 1., 1., -1., -1., -1., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0.,
            ],
            Color::Black => [
                -1., -1., -1., 1., 1., 1., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0.,
            ],
            Color::Red => [
                0., 0., 0., 0., 0., 0., 1., 1., 1., -1., -1., -1., 0., 0., 0., 0., 0., 0.,
            ],
            Color::Green => [
                0., 0., 0., 0., 0., 0., -1., -1., -1., 1., 1., 1., 0., 0., 0., 0., 0., 0.,
            ],
            Color::Blue => [
                0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 1., 1., 1., -1., -1., -1.,
            ],
            Color::Yellow => [
                0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., -1., -1., -1., 1., 1., 1.,
            ],
            Color::Orange => [
                0., 0., 0., 0., 0., 0., 1., 1., 0., -1., -1., 0., -1., 0., 0., 1., 0., 0.,
            ],
            Color::Pink => [
                1., 1., 0., -1., -1., 0., 1., 0., 0., -1., 0., 0., 0., 0., 0., 0., 0., 0.,
            ],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Vertical,
    Horizontal,
    T1,
    T2,
    T3,
    T4,
    L1,
    L2,
    L3,
    L4,
    D1,
    D2,
    X,
    O,
    Q,
}

impl Shape {
    pub const ALL: [Shape; 15] = [
        Shape::Vertical,
        Shape::Horizontal,
        Shape::T1,
        Shape::T2,
        Shape::T3,
        Shape::T4,
        Shape::L1,
        Shape::L2,
        Shape::L3,
        Shape::L4,
        Shape::D1,
        Shape::D2,
        Shape::X,
        Shape::O,
        Shape::Q,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Vertical => "vertical",
            Shape::Horizontal => "horizontal",
            Shape::T1 => "t1",
            Shape::T2 => "t2",
            Shape::T3 => "t3",
            Shape::T4 => "t4",
            Shape::L1 => "l1",
            Shape::L2 => "l2",
            Shape::L3 => "l3",
            Shape::L4 => "l4",
            Shape::D1 => "d1",
            Shape::D2 => "d2",
            Shape::X => "x",
            Shape::O => "o",
            Shape::Q => "q",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        let lower = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|shape| shape.as_str() == lower)
            .ok_or_else(|| ModelError::UnknownStimulus(format!("shape '{s}'")))
    }

    /// Channels: [V/H, diagonal, L-junctions, T-junctions, crossing].
    fn channels(&self) -> [f64; SHAPE_DIMS] {
        match self {
            Shape::Vertical => [
                1., 1., 1., -1., -1., -1., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0.,
            ],
            Shape::Horizontal => [
                -1., -1., -1., 1., 1., 1., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0.,
            ],
            Shape::T1 => [
                1., 0., 0., 1., 0., 0., -1., 0., -1., 0., 0., 0., 0., 0., 1., 0., 0., 0., 0.,
            ],
            Shape::T2 => [
                1., 0., 0., 1., 0., 0., -1., 0., -1., 0., 0., 0., 0., 0., 0., 1., 0., 0., 0.,
            ],
            Shape::T3 => [
                1., 0., 0., 1., 0., 0., -1., 0., -1., 0., 0., 0., 0., 0., 0., 0., 1., 0., 0.,
            ],
            Shape::T4 => [
                1., 0., 0., 1., 0., 0., -1., 0., -1., 0., 0., 0., 0., 0., 0., 0., 0., 1., 0.,
            ],
            Shape::L1 => [
                1., 0., 0., 1., 0., 0., -1., 0., -1., 0., 1., 0., 0., 0., 0., 0., 0., 0., 0.,
            ],
            Shape::L2 => [
                1., 0., 0., 1., 0., 0., -1., 0., -1., 0., 0., 1., 0., 0., 0., 0., 0., 0., 0.,
            ],
            Shape::L3 => [
                1., 0., 0., 1., 0., 0., -1., 0., -1., 0., 0., 0., 1., 0., 0., 0., 0., 0., 0.,
            ],
            Shape::L4 => [
                1., 0., 0., 1., 0., 0., -1., 0., -1., 0., 0., 0., 0., 1., 0., 0., 0., 0., 0.,
            ],
            Shape::D1 => [
                -1., 0., 0., -1., 0., 0., 1., 1., -1., -1., 0., 0., 0., 0., 0., 0., 0., 0., 0.,
            ],
            Shape::D2 => [
                0., -1., 0., 0., 0., -1., -1., -1., 1., 1., 0., 0., 0., 0., 0., 0., 0., 0., 0.,
            ],
            Shape::X => [
                -1., 0., 0., 0., 0., -1., 1., 1., 1., 1., 0., 0., 0., 0., 0., 0., 0., 0., 1.,
            ],
            Shape::O => [
                1., 1., 0., 1., 1., 0., 0., 0., 0., -1., 1., 1., 1., 1., 0., 0., 0., 0., 0.,
            ],
            Shape::Q => [
                1., 1., 0., 1., 1., 0., 1., 0., 0., 0., 1., 1., 1., 1., 0., 0., 0., 0., 1.,
            ],
        }
    }
}

/// Concatenated color + shape vector for one stimulus.
pub fn feature_vector(color: Color, shape: Shape) -> Vec<f64> {
    let mut features = Vec::with_capacity(STIMULUS_DIMS);
    features.extend_from_slice(&color.channels());
    features.extend_from_slice(&shape.channels());
    features
}

/// The space stimulus vectors live in: opponent codes span [-1, 1], so
/// every dimension is linear with scale 2.
pub fn stimulus_space() -> FeatureSpace {
    FeatureSpace::uniform_linear(STIMULUS_DIMS, 2.0)
        .expect("stimulus space dimensions are fixed and valid")
}

/// Per-dimension relevance weights for a set of vectors: a dimension is
/// relevant iff the vectors disagree on it somewhere. Irrelevant
/// dimensions carry `irrelevant_weight` (0 removes them from the metric).
pub fn relevance_weights(
    vectors: &[Vec<f64>],
    relevant_weight: f64,
    irrelevant_weight: f64,
) -> Vec<f64> {
    let dims = vectors.first().map(|v| v.len()).unwrap_or(0);
    (0..dims)
        .map(|d| {
            let first = vectors[0][d];
            if vectors.iter().any(|v| v[d] != first) {
                relevant_weight
            } else {
                irrelevant_weight
            }
        })
        .collect()
}

/// Assembles a validated display from lexicon stimuli: at most one target
/// (always item 0, as in classic search displays), then distractor groups
/// in declaration order.
#[derive(Clone, Debug, Default)]
pub struct DisplayBuilder {
    target: Option<(Color, Shape)>,
    distractors: Vec<(Color, Shape, usize)>,
    relevance: Option<(f64, f64)>,
    layout: Option<(DisplayGeometry, u64)>,
}

impl DisplayBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(mut self, color: Color, shape: Shape) -> Self {
        self.target = Some((color, shape));
        self
    }

    /// Add `count` identical distractors.
    pub fn distractors(mut self, color: Color, shape: Shape, count: usize) -> Self {
        self.distractors.push((color, shape, count));
        self
    }

    /// Down-weight dimensions the display's items all agree on.
    pub fn relevance_weighting(mut self, relevant: f64, irrelevant: f64) -> Self {
        self.relevance = Some((relevant, irrelevant));
        self
    }

    /// Scatter the items over a seeded cartesian grid.
    pub fn layout(mut self, geometry: DisplayGeometry, seed: u64) -> Self {
        self.layout = Some((geometry, seed));
        self
    }

    pub fn build(self) -> Result<Display> {
        let mut items = Vec::new();
        if let Some((color, shape)) = self.target {
            items.push(Item::new(feature_vector(color, shape), true));
        }
        for (color, shape, count) in &self.distractors {
            for _ in 0..*count {
                items.push(Item::new(feature_vector(*color, *shape), false));
            }
        }

        let space = match self.relevance {
            None => stimulus_space(),
            Some((relevant, irrelevant)) => {
                let vectors: Vec<Vec<f64>> =
                    items.iter().map(|item| item.features.clone()).collect();
                let weights = relevance_weights(&vectors, relevant, irrelevant);
                stimulus_space().reweighted(&weights)?
            }
        };

        let mut center = None;
        if let Some((geometry, seed)) = self.layout {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut locations = cartesian_locations(&geometry, &mut rng);
            if locations.len() < items.len() {
                return Err(ModelError::InvalidDisplay(format!(
                    "geometry offers {} locations for {} items",
                    locations.len(),
                    items.len()
                )));
            }
            for item in &mut items {
                item.location = locations.pop();
            }
            center = Some(geometry.center);
        }

        let display = Display::new(space, items)?;
        Ok(match center {
            Some(center) => display.with_center(center),
            None => display,
        })
    }
}
