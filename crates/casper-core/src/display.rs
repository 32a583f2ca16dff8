use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::feature::FeatureSpace;

/// One item in a search display: the target, or a distractor.
///
/// An item's identity is its position in the display's item list; the
/// engine reports items by that index throughout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub features: Vec<f64>,
    pub is_target: bool,
    /// Screen position, if the display models space. Items without
    /// locations are processed with uniform eccentricity weight.
    pub location: Option<[f64; 2]>,
}

impl Item {
    pub fn new(features: Vec<f64>, is_target: bool) -> Self {
        Self {
            features,
            is_target,
            location: None,
        }
    }

    pub fn with_location(mut self, location: [f64; 2]) -> Self {
        self.location = Some(location);
        self
    }
}

/// A validated search display: the feature space its vectors live in plus
/// an ordered item list with at most one target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Display {
    space: FeatureSpace,
    items: Vec<Item>,
    /// Initial fixation point for eccentricity weighting and eye movements.
    center: Option<[f64; 2]>,
}

impl Display {
    /// Fail fast on anything the simulation cannot meaningfully run on:
    /// empty displays, dimensionality mismatches, non-finite features,
    /// more than one target.
    pub fn new(space: FeatureSpace, items: Vec<Item>) -> Result<Self> {
        if items.is_empty() {
            return Err(ModelError::InvalidDisplay(
                "display has no items".to_string(),
            ));
        }
        for (i, item) in items.iter().enumerate() {
            if item.features.len() != space.len() {
                return Err(ModelError::InvalidDisplay(format!(
                    "item {i} has {} features, space declares {}",
                    item.features.len(),
                    space.len()
                )));
            }
            if item.features.iter().any(|v| !v.is_finite()) {
                return Err(ModelError::InvalidDisplay(format!(
                    "item {i} has a non-finite feature value"
                )));
            }
        }
        let target_count = items.iter().filter(|item| item.is_target).count();
        if target_count > 1 {
            return Err(ModelError::InvalidDisplay(format!(
                "display has {target_count} targets, at most one allowed"
            )));
        }
        Ok(Self {
            space,
            items,
            center: None,
        })
    }

    pub fn with_center(mut self, center: [f64; 2]) -> Self {
        self.center = Some(center);
        self
    }

    pub fn space(&self) -> &FeatureSpace {
        &self.space
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of the target, if this is a target-present display.
    pub fn target_index(&self) -> Option<usize> {
        self.items.iter().position(|item| item.is_target)
    }

    pub fn center(&self) -> Option<[f64; 2]> {
        self.center
    }

    /// Feature distance between two items by index.
    pub fn item_distance(&self, a: usize, b: usize) -> f64 {
        self.space
            .distance(&self.items[a].features, &self.items[b].features)
    }
}
