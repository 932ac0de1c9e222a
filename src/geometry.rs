//! Geometric helpers for collision detection and wall-relative coordinates.
//!
//! All functions work on the floor plane and are pure. Footprints are
//! axis-aligned because rotations are restricted to quarter turns.

use crate::model::{FurnitureItem, RoomDimensions, RoomFeature, Rotation, Wall};
use crate::types::{EPSILON_GENERAL, FloorRect, Footprint, Vec2};

/// Euclidean distance between two floor points.
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f64 {
    a.distance_to(&b)
}

/// Converts a wall-relative feature position into floor coordinates.
///
/// North and south openings vary along x at `z = length` and `z = 0`;
/// east and west openings vary along z at `x = width` and `x = 0`.
///
/// # Examples
/// ```
/// use place_it_now::geometry::wall_feature_position;
/// use place_it_now::model::{RoomDimensions, RoomFeature, Wall};
/// use place_it_now::types::Vec2;
///
/// let room = RoomDimensions::new(4.0, 5.0, 2.8).unwrap();
/// let door = RoomFeature::door(Wall::South, 0.5).unwrap();
/// assert_eq!(wall_feature_position(&door, &room), Vec2::new(2.0, 0.0));
/// ```
pub fn wall_feature_position(feature: &RoomFeature, dims: &RoomDimensions) -> Vec2 {
    match feature.wall {
        Wall::North => Vec2::new(dims.width * feature.position, dims.length),
        Wall::South => Vec2::new(dims.width * feature.position, 0.0),
        Wall::East => Vec2::new(dims.width, dims.length * feature.position),
        Wall::West => Vec2::new(0.0, dims.length * feature.position),
    }
}

/// Perpendicular distance from a point to a wall.
#[inline]
pub fn distance_to_wall(position: Vec2, wall: Wall, dims: &RoomDimensions) -> f64 {
    match wall {
        Wall::North => (position.z - dims.length).abs(),
        Wall::South => position.z.abs(),
        Wall::East => (position.x - dims.width).abs(),
        Wall::West => position.x.abs(),
    }
}

/// Returns the wall closest to `position`.
///
/// Ties keep the earlier wall in `Wall::ALL` order, so north wins any tie it
/// takes part in.
pub fn nearest_wall(position: Vec2, dims: &RoomDimensions) -> Wall {
    let mut nearest = Wall::North;
    let mut nearest_distance = distance_to_wall(position, nearest, dims);

    for wall in Wall::ALL.into_iter().skip(1) {
        let d = distance_to_wall(position, wall, dims);
        if d < nearest_distance {
            nearest = wall;
            nearest_distance = d;
        }
    }

    nearest
}

/// Footprint of `item` after applying `rotation`.
#[inline]
pub fn effective_footprint(item: &FurnitureItem, rotation: Rotation) -> Footprint {
    let footprint = item.dimensions.footprint();
    if rotation.is_quarter_turn() {
        footprint.swapped()
    } else {
        footprint
    }
}

/// Axis-aligned overlap test. Rectangles that only touch do not collide.
#[inline]
pub fn boxes_overlap(pos_a: Vec2, footprint_a: Footprint, pos_b: Vec2, footprint_b: Footprint) -> bool {
    FloorRect::from_origin_and_footprint(pos_a, footprint_a)
        .intersects(&FloorRect::from_origin_and_footprint(pos_b, footprint_b))
}

/// Checks whether a footprint anchored at `pos` stays inside the floor.
#[inline]
pub fn within_bounds(pos: Vec2, footprint: Footprint, dims: &RoomDimensions) -> bool {
    dims.floor().contains_rect(
        &FloorRect::from_origin_and_footprint(pos, footprint),
        EPSILON_GENERAL,
    )
}

/// Length of the overlap of two intervals, at least 0.
#[inline]
pub fn overlap_1d(a1: f64, a2: f64, b1: f64, b2: f64) -> f64 {
    (a2.min(b2) - a1.max(b1)).max(0.0)
}

/// Overlap area of two floor rectangles.
pub fn overlap_area(a: &FloorRect, b: &FloorRect) -> f64 {
    overlap_1d(a.min.x, a.max.x, b.min.x, b.max.x) * overlap_1d(a.min.z, a.max.z, b.min.z, b.max.z)
}
