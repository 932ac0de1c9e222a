//! Heuristic desirability of a candidate placement.
//!
//! The score adds up per-feature terms (door clearance, window preference)
//! and a wall preference term for the nearest wall. Higher is better; scores
//! can be negative.

use std::f64::consts::{FRAC_PI_4, TAU};

use crate::geometry::{distance, nearest_wall, wall_feature_position};
use crate::model::{FeatureKind, FurnitureItem, RoomFeature, RoomLayout, Rotation, Wall};
use crate::rules::{PlacementRule, WindowPreference, rule_for};
use crate::types::Vec2;

/// Subtracted for every door closer than the rule's minimum distance.
pub const DOOR_PROXIMITY_PENALTY: f64 = 10.0;
/// Numerator of the `adjacent` window bonus `5 / (d + 1)`.
pub const WINDOW_ADJACENT_WEIGHT: f64 = 5.0;
/// Numerator of the `avoid` window penalty `3 / (d + 1)`.
pub const WINDOW_AVOID_WEIGHT: f64 = 3.0;
/// Flat bonus for an item facing a window.
pub const WINDOW_FACING_BONUS: f64 = 5.0;
/// Bonus or penalty for the nearest wall being preferred or avoided.
pub const WALL_PREFERENCE_WEIGHT: f64 = 5.0;

/// Scores `item` anchored at `position` with `rotation` inside `layout`.
///
/// Unknown categories use the neutral rule and always score 0.
pub fn score_position(
    item: &FurnitureItem,
    position: Vec2,
    rotation: Rotation,
    layout: &RoomLayout,
) -> f64 {
    score_with_rule(rule_for(item), position, rotation, layout)
}

/// Same as [`score_position`] with an explicit rule.
pub fn score_with_rule(
    rule: &PlacementRule,
    position: Vec2,
    rotation: Rotation,
    layout: &RoomLayout,
) -> f64 {
    let mut score = 0.0;

    for feature in &layout.features {
        let feature_pos = wall_feature_position(feature, &layout.dimensions);
        let d = distance(position, feature_pos);

        match feature.kind {
            FeatureKind::Door => {
                if d < rule.min_distance_from_door {
                    score -= DOOR_PROXIMITY_PENALTY;
                }
            }
            FeatureKind::Window => {
                score += window_term(rule.window_preference, d, rotation, feature);
            }
        }
    }

    let wall = nearest_wall(position, &layout.dimensions);
    if rule.prefers(wall) {
        score += WALL_PREFERENCE_WEIGHT;
    }
    if rule.avoids(wall) {
        score -= WALL_PREFERENCE_WEIGHT;
    }

    score
}

fn window_term(
    preference: WindowPreference,
    distance: f64,
    rotation: Rotation,
    window: &RoomFeature,
) -> f64 {
    match preference {
        WindowPreference::Adjacent => WINDOW_ADJACENT_WEIGHT / (distance + 1.0),
        WindowPreference::Avoid => -WINDOW_AVOID_WEIGHT / (distance + 1.0),
        WindowPreference::Facing => {
            if is_facing_window(rotation, window) {
                WINDOW_FACING_BONUS
            } else {
                0.0
            }
        }
        WindowPreference::Neutral => 0.0,
    }
}

/// Compass direction an item with the given yaw faces.
///
/// The yaw is normalized into `[0, 2π)` and split into quadrants centered on
/// 0 (north), π/2 (east), π (south) and 3π/2 (west). A yaw exactly on a
/// quadrant boundary falls into the later quadrant.
pub fn facing_direction(yaw: f64) -> Wall {
    let normalized = yaw.rem_euclid(TAU);

    if normalized < FRAC_PI_4 || normalized >= 7.0 * FRAC_PI_4 {
        Wall::North
    } else if normalized < 3.0 * FRAC_PI_4 {
        Wall::East
    } else if normalized < 5.0 * FRAC_PI_4 {
        Wall::South
    } else {
        Wall::West
    }
}

/// An item faces a window when its facing direction is the opposite of the
/// window's wall: an item facing north matches a window on the south wall.
pub fn is_facing_window(rotation: Rotation, window: &RoomFeature) -> bool {
    facing_direction(rotation.yaw()) == window.wall.opposite()
}
