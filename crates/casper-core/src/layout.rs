use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::config::DistanceFalloff;
use crate::constants::{
    DEFAULT_DISPLAY_CENTER, DEFAULT_DISPLAY_RADIUS, DEFAULT_ITEM_RADIUS, DEFAULT_ITEM_SPACING,
};
use crate::display::Display;

/// Spatial extent of the simulated display.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayGeometry {
    pub center: [f64; 2],
    pub radius: f64,
    pub item_radius: f64,
    pub item_spacing: f64,
}

impl Default for DisplayGeometry {
    fn default() -> Self {
        Self {
            center: DEFAULT_DISPLAY_CENTER,
            radius: DEFAULT_DISPLAY_RADIUS,
            item_radius: DEFAULT_ITEM_RADIUS,
            item_spacing: DEFAULT_ITEM_SPACING,
        }
    }
}

/// Candidate item locations on a cartesian grid covering the display,
/// in randomized order.
pub fn cartesian_locations(geometry: &DisplayGeometry, rng: &mut impl Rng) -> Vec<[f64; 2]> {
    let min_x = geometry.center[0] - geometry.radius;
    let max_x = min_x + 2.0 * geometry.radius - 2.0 * geometry.item_radius;
    let min_y = geometry.center[1] - geometry.radius;
    let max_y = min_y + 2.0 * geometry.radius - 2.0 * geometry.item_radius;

    let mut locations = Vec::new();
    let mut x = min_x;
    while x + geometry.item_radius <= max_x {
        let mut y = min_y;
        while y + geometry.item_radius <= max_y {
            locations.push([x, y]);
            y += geometry.item_spacing;
        }
        x += geometry.item_spacing;
    }

    locations.shuffle(rng);
    locations
}

/// Candidate item locations on concentric rings around the display center,
/// in randomized order. `dense` packs each ring as tightly as the item
/// spacing allows; otherwise angles advance by a fixed π/4 and radii grow
/// geometrically.
pub fn polar_locations(
    geometry: &DisplayGeometry,
    dense: bool,
    rng: &mut impl Rng,
) -> Vec<[f64; 2]> {
    let mut locations = Vec::new();
    let mut radius = geometry.item_spacing * 2.0;

    while radius + geometry.item_radius < geometry.radius {
        let angle_increment = if dense {
            let circumference = std::f64::consts::TAU * radius;
            (geometry.item_spacing / circumference) * std::f64::consts::TAU
        } else {
            std::f64::consts::FRAC_PI_4
        };

        let mut angle = 0.0;
        while angle < std::f64::consts::TAU {
            let (sin, cos) = f64::sin_cos(angle);
            locations.push([
                geometry.center[0] + radius * cos,
                geometry.center[1] + radius * sin,
            ]);
            angle += angle_increment;
        }

        if dense {
            radius += geometry.item_spacing;
        } else {
            radius *= 1.5;
        }
    }

    locations.shuffle(rng);
    locations
}

fn euclidean(a: [f64; 2], b: [f64; 2]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
}

/// Per-item accumulation weight as a function of distance from fixation.
///
/// Fixation is the display center, or the centroid of located items when no
/// center was declared. Items without locations, and displays under a
/// `Uniform` falloff, get weight 1.0.
pub fn eccentricity_weights(display: &Display, falloff: &DistanceFalloff) -> Vec<f64> {
    let n = display.len();
    if matches!(falloff, DistanceFalloff::Uniform) {
        return vec![1.0; n];
    }

    let located: Vec<[f64; 2]> = display.items().iter().filter_map(|i| i.location).collect();
    if located.is_empty() {
        return vec![1.0; n];
    }
    let fixation = display.center().unwrap_or_else(|| {
        let count = located.len() as f64;
        [
            located.iter().map(|l| l[0]).sum::<f64>() / count,
            located.iter().map(|l| l[1]).sum::<f64>() / count,
        ]
    });

    display
        .items()
        .iter()
        .map(|item| match item.location {
            None => 1.0,
            Some(location) => {
                let distance = euclidean(location, fixation);
                match *falloff {
                    DistanceFalloff::Uniform => 1.0,
                    DistanceFalloff::Linear { zero_at } => (1.0 - distance / zero_at).max(0.0),
                    DistanceFalloff::Reciprocal { rate, radius } => {
                        1.0 / (1.0 + rate * distance / radius)
                    }
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::Item;
    use crate::feature::FeatureSpace;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    #[test]
    fn test_cartesian_grid_covers_display() {
        let geometry = DisplayGeometry::default();
        let locations = cartesian_locations(&geometry, &mut rng());
        assert!(locations.len() > 50, "grid too sparse: {}", locations.len());
        for loc in &locations {
            assert!(loc[0] >= geometry.center[0] - geometry.radius);
            assert!(loc[1] >= geometry.center[1] - geometry.radius);
            assert!(loc[0] <= geometry.center[0] + geometry.radius);
            assert!(loc[1] <= geometry.center[1] + geometry.radius);
        }
    }

    #[test]
    fn test_polar_rings_stay_inside_radius() {
        let geometry = DisplayGeometry::default();
        for dense in [false, true] {
            let locations = polar_locations(&geometry, dense, &mut rng());
            assert!(!locations.is_empty());
            for loc in &locations {
                let d = euclidean(*loc, geometry.center);
                assert!(
                    d + geometry.item_radius <= geometry.radius + 1e-9,
                    "location {loc:?} outside display (dense={dense})"
                );
            }
        }
    }

    #[test]
    fn test_dense_packs_more_locations() {
        let geometry = DisplayGeometry::default();
        let sparse = polar_locations(&geometry, false, &mut rng());
        let dense = polar_locations(&geometry, true, &mut rng());
        assert!(dense.len() > sparse.len());
    }

    #[test]
    fn test_shuffle_is_seeded() {
        let geometry = DisplayGeometry::default();
        let a = cartesian_locations(&geometry, &mut rng());
        let b = cartesian_locations(&geometry, &mut rng());
        assert_eq!(a, b, "same seed must give the same order");

        let c = cartesian_locations(&geometry, &mut SmallRng::seed_from_u64(7));
        assert_ne!(a, c, "different seed should reorder");
    }

    fn located_display() -> Display {
        let items = vec![
            Item::new(vec![0.0], false).with_location([0.0, 0.0]),
            Item::new(vec![90.0], false).with_location([100.0, 0.0]),
            Item::new(vec![90.0], false).with_location([300.0, 0.0]),
        ];
        Display::new(FeatureSpace::orientation(), items)
            .unwrap()
            .with_center([0.0, 0.0])
    }

    #[test]
    fn test_uniform_falloff_is_all_ones() {
        let weights = eccentricity_weights(&located_display(), &DistanceFalloff::Uniform);
        assert_eq!(weights, vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_linear_falloff_clamps_at_zero() {
        let falloff = DistanceFalloff::Linear { zero_at: 200.0 };
        let weights = eccentricity_weights(&located_display(), &falloff);
        assert!((weights[0] - 1.0).abs() < 1e-12);
        assert!((weights[1] - 0.5).abs() < 1e-12);
        assert_eq!(weights[2], 0.0, "beyond zero_at clamps to 0");
    }

    #[test]
    fn test_reciprocal_falloff_decreases() {
        let falloff = DistanceFalloff::Reciprocal {
            rate: 1.0,
            radius: 100.0,
        };
        let weights = eccentricity_weights(&located_display(), &falloff);
        assert!(weights[0] > weights[1]);
        assert!(weights[1] > weights[2]);
        assert!(weights[2] > 0.0, "reciprocal never reaches zero");
    }

    #[test]
    fn test_unlocated_items_get_unit_weight() {
        let items = vec![Item::new(vec![0.0], false), Item::new(vec![90.0], false)];
        let display = Display::new(FeatureSpace::orientation(), items).unwrap();
        let falloff = DistanceFalloff::Linear { zero_at: 100.0 };
        assert_eq!(eccentricity_weights(&display, &falloff), vec![1.0, 1.0]);
    }
}
