//! Common value types for the floor plane.
//!
//! The planner works in a top-down view of the room: `x` runs along the
//! room width (west to east) and `z` along the room length (south to north).
//! Height never takes part in placement, so everything here is 2D.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Global numerical tolerance for floating-point comparisons.
///
/// Used for boundary checks and grid generation.
pub const EPSILON_GENERAL: f64 = 1e-9;

/// A point on the floor plane.
///
/// # Examples
/// ```
/// use place_it_now::types::Vec2;
///
/// let door = Vec2::new(2.0, 0.0);
/// let bed = Vec2::new(2.0, 3.0);
/// assert_eq!(bed.distance_to(&door), 3.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct Vec2 {
    pub x: f64,
    pub z: f64,
}

impl Vec2 {
    #[inline]
    pub const fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    /// The room origin (south-west corner).
    #[inline]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }

    /// Lifts the point into the renderer's `[x, y, z]` convention with `y = 0`.
    #[inline]
    pub const fn to_xyz(&self) -> [f64; 3] {
        [self.x, 0.0, self.z]
    }
}

impl Add for Vec2 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.z + rhs.z)
    }
}

impl Sub for Vec2 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.z - rhs.z)
    }
}

/// Extent of an object on the floor: `width` along x, `length` along z.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Footprint {
    pub width: f64,
    pub length: f64,
}

impl Footprint {
    #[inline]
    pub const fn new(width: f64, length: f64) -> Self {
        Self { width, length }
    }

    /// The same footprint turned by a quarter.
    #[inline]
    pub const fn swapped(&self) -> Self {
        Self::new(self.length, self.width)
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.length
    }

    /// Checks whether this footprint fits inside `outer` without rotation.
    #[inline]
    pub fn fits_within(&self, outer: &Self, tolerance: f64) -> bool {
        self.width <= outer.width + tolerance && self.length <= outer.length + tolerance
    }

    /// Checks whether this footprint fits inside `outer` in either orientation.
    #[inline]
    pub fn fits_within_any_orientation(&self, outer: &Self, tolerance: f64) -> bool {
        self.fits_within(outer, tolerance) || self.swapped().fits_within(outer, tolerance)
    }
}

/// Axis-aligned rectangle on the floor plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloorRect {
    /// South-west corner
    pub min: Vec2,
    /// North-east corner
    pub max: Vec2,
}

impl FloorRect {
    #[inline]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Creates a rectangle anchored at `origin` and extending by `footprint`.
    #[inline]
    pub fn from_origin_and_footprint(origin: Vec2, footprint: Footprint) -> Self {
        Self {
            min: origin,
            max: origin + Vec2::new(footprint.width, footprint.length),
        }
    }

    /// Separating-axis test. Rectangles that only share an edge do not intersect.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        !(self.max.x <= other.min.x
            || other.max.x <= self.min.x
            || self.max.z <= other.min.z
            || other.max.z <= self.min.z)
    }

    /// Checks whether `other` lies entirely inside this rectangle.
    #[inline]
    pub fn contains_rect(&self, other: &Self, tolerance: f64) -> bool {
        other.min.x >= self.min.x - tolerance
            && other.min.z >= self.min.z - tolerance
            && other.max.x <= self.max.x + tolerance
            && other.max.z <= self.max.z + tolerance
    }

    #[inline]
    pub fn footprint(&self) -> Footprint {
        Footprint::new(self.max.x - self.min.x, self.max.z - self.min.z)
    }
}

/// Validation helpers shared by the model constructors.
pub mod validation {
    /// Rejects zero, negative, NaN and infinite values.
    pub fn positive_finite(value: f64, name: &str) -> Result<(), String> {
        if value.is_nan() {
            return Err(format!("{} must not be NaN", name));
        }
        if value.is_infinite() {
            return Err(format!("{} must not be infinite", name));
        }
        if value <= 0.0 {
            return Err(format!("{} must be positive, got: {}", name, value));
        }
        Ok(())
    }

    /// Accepts values in the closed unit interval.
    pub fn unit_fraction(value: f64, name: &str) -> Result<(), String> {
        if !(0.0..=1.0).contains(&value) {
            return Err(format!("{} must be between 0 and 1, got: {}", name, value));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_operations() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(4.0, 6.0);

        assert_eq!(a + b, Vec2::new(5.0, 8.0));
        assert_eq!(b - a, Vec2::new(3.0, 4.0));
        assert!((a.distance_to(&b) - 5.0).abs() < EPSILON_GENERAL);
        assert_eq!(a.to_xyz(), [1.0, 0.0, 2.0]);
    }

    #[test]
    fn test_footprint_orientation_fit() {
        let bed = Footprint::new(0.9, 2.0);
        let alcove = Footprint::new(2.1, 1.0);

        assert!(!bed.fits_within(&alcove, EPSILON_GENERAL));
        assert!(bed.fits_within_any_orientation(&alcove, EPSILON_GENERAL));
        assert!((bed.area() - 1.8).abs() < EPSILON_GENERAL);
    }

    #[test]
    fn test_floor_rect_intersects() {
        let a = FloorRect::from_origin_and_footprint(Vec2::zero(), Footprint::new(2.0, 2.0));
        let b = FloorRect::from_origin_and_footprint(Vec2::new(1.0, 1.0), Footprint::new(2.0, 2.0));
        let touching =
            FloorRect::from_origin_and_footprint(Vec2::new(2.0, 0.0), Footprint::new(1.0, 1.0));
        let far = FloorRect::from_origin_and_footprint(Vec2::new(5.0, 5.0), Footprint::new(1.0, 1.0));

        assert!(a.intersects(&b));
        assert!(!a.intersects(&touching));
        assert!(!a.intersects(&far));
    }

    #[test]
    fn test_floor_rect_containment() {
        let room = FloorRect::from_origin_and_footprint(Vec2::zero(), Footprint::new(4.0, 5.0));
        let inside =
            FloorRect::from_origin_and_footprint(Vec2::new(3.0, 3.0), Footprint::new(1.0, 2.0));
        let outside =
            FloorRect::from_origin_and_footprint(Vec2::new(3.5, 3.0), Footprint::new(1.0, 2.0));

        assert!(room.contains_rect(&inside, EPSILON_GENERAL));
        assert!(!room.contains_rect(&outside, EPSILON_GENERAL));
        assert_eq!(inside.footprint(), Footprint::new(1.0, 2.0));
    }

    #[test]
    fn test_validation_helpers() {
        assert!(validation::positive_finite(2.5, "Width").is_ok());
        assert!(validation::positive_finite(0.0, "Width").is_err());
        assert!(validation::positive_finite(-1.0, "Width").is_err());
        assert!(validation::positive_finite(f64::NAN, "Width").is_err());
        assert!(validation::positive_finite(f64::INFINITY, "Width").is_err());

        assert!(validation::unit_fraction(0.0, "Position").is_ok());
        assert!(validation::unit_fraction(1.0, "Position").is_ok());
        assert!(validation::unit_fraction(1.01, "Position").is_err());
        assert!(validation::unit_fraction(f64::NAN, "Position").is_err());
    }
}
