//! Data models for the room planner.
//!
//! This module defines the plain data the planner consumes and produces:
//! - `RoomDimensions`, `RoomFeature` and `RoomLayout` describe the room
//! - `FurnitureItem` is an immutable catalog entry
//! - `Rotation` and `Placement` describe where an item ends up
//!
//! Constructors validate their input; the search itself assumes validated data.

use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

use crate::types::{FloorRect, Footprint, Vec2, validation};

/// Validation error for room and furniture data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid room dimensions: {0}")]
    InvalidRoomDimensions(String),
    #[error("Invalid furniture dimensions: {0}")]
    InvalidFurnitureDimensions(String),
    #[error("Invalid feature position: {0}")]
    InvalidFeaturePosition(String),
    #[error("Invalid feature size: {0}")]
    InvalidFeatureSize(String),
    #[error("Unrecognized wall: '{0}'")]
    UnrecognizedWall(String),
    #[error("Unrecognized feature type: '{0}'")]
    UnrecognizedFeatureKind(String),
    #[error("Room grid too large: {0}")]
    GridTooLarge(String),
    #[error("Too many iterations: {0}")]
    TooManyIterations(String),
}

/// One of the four walls of a rectangular room.
///
/// North is the wall at `z = length`, south at `z = 0`, east at `x = width`
/// and west at `x = 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Wall {
    North,
    South,
    East,
    West,
}

impl Wall {
    /// All walls in the order used to break distance ties.
    pub const ALL: [Wall; 4] = [Wall::North, Wall::South, Wall::East, Wall::West];

    pub fn opposite(self) -> Self {
        match self {
            Wall::North => Wall::South,
            Wall::South => Wall::North,
            Wall::East => Wall::West,
            Wall::West => Wall::East,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Wall::North => "north",
            Wall::South => "south",
            Wall::East => "east",
            Wall::West => "west",
        }
    }
}

impl fmt::Display for Wall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Wall {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "north" => Ok(Wall::North),
            "south" => Ok(Wall::South),
            "east" => Ok(Wall::East),
            "west" => Ok(Wall::West),
            _ => Err(ValidationError::UnrecognizedWall(s.to_string())),
        }
    }
}

/// Kind of wall opening.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Window,
    Door,
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureKind::Window => f.write_str("Window"),
            FeatureKind::Door => f.write_str("Door"),
        }
    }
}

impl FromStr for FeatureKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "window" => Ok(FeatureKind::Window),
            "door" => Ok(FeatureKind::Door),
            _ => Err(ValidationError::UnrecognizedFeatureKind(s.to_string())),
        }
    }
}

/// Interior dimensions of a room in meters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({ "width": 4.0, "length": 5.0, "height": 2.8 }))]
pub struct RoomDimensions {
    pub width: f64,
    pub length: f64,
    pub height: f64,
}

impl RoomDimensions {
    /// Creates room dimensions, rejecting non-positive or non-finite values.
    ///
    /// # Examples
    /// ```
    /// use place_it_now::model::RoomDimensions;
    ///
    /// assert!(RoomDimensions::new(4.0, 5.0, 2.8).is_ok());
    /// assert!(RoomDimensions::new(0.0, 5.0, 2.8).is_err());
    /// ```
    pub fn new(width: f64, length: f64, height: f64) -> Result<Self, ValidationError> {
        Self {
            width,
            length,
            height,
        }
        .validated()
    }

    /// Re-checks values that arrived through deserialization.
    pub fn validated(self) -> Result<Self, ValidationError> {
        validation::positive_finite(self.width, "Room width")
            .and_then(|_| validation::positive_finite(self.length, "Room length"))
            .and_then(|_| validation::positive_finite(self.height, "Room height"))
            .map_err(ValidationError::InvalidRoomDimensions)?;
        Ok(self)
    }

    #[inline]
    pub fn footprint(&self) -> Footprint {
        Footprint::new(self.width, self.length)
    }

    /// The floor as a rectangle `[0, width] × [0, length]`.
    #[inline]
    pub fn floor(&self) -> FloorRect {
        FloorRect::from_origin_and_footprint(Vec2::zero(), self.footprint())
    }

    #[inline]
    pub fn floor_area(&self) -> f64 {
        self.width * self.length
    }
}

/// A door or window anchored to a wall.
///
/// # Fields
/// * `kind` - Door or window
/// * `wall` - Wall the opening sits in
/// * `position` - Fractional offset along the wall (0 to 1)
/// * `width` - Opening width in meters
/// * `height` - Opening height in meters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({ "type": "door", "wall": "south", "position": 0.5, "width": 0.9, "height": 2.0 }))]
pub struct RoomFeature {
    #[serde(rename = "type")]
    pub kind: FeatureKind,
    pub wall: Wall,
    pub position: f64,
    pub width: f64,
    pub height: f64,
}

impl RoomFeature {
    pub fn new(
        kind: FeatureKind,
        wall: Wall,
        position: f64,
        width: f64,
        height: f64,
    ) -> Result<Self, ValidationError> {
        Self {
            kind,
            wall,
            position,
            width,
            height,
        }
        .validated()
    }

    /// Convenience constructor for a door.
    pub fn door(wall: Wall, position: f64) -> Result<Self, ValidationError> {
        Self::new(FeatureKind::Door, wall, position, 0.9, 2.0)
    }

    /// Convenience constructor for a window.
    pub fn window(wall: Wall, position: f64) -> Result<Self, ValidationError> {
        Self::new(FeatureKind::Window, wall, position, 1.0, 1.2)
    }

    pub fn validated(self) -> Result<Self, ValidationError> {
        validation::unit_fraction(self.position, "Feature position")
            .map_err(ValidationError::InvalidFeaturePosition)?;
        validation::positive_finite(self.width, "Feature width")
            .and_then(|_| validation::positive_finite(self.height, "Feature height"))
            .map_err(ValidationError::InvalidFeatureSize)?;
        Ok(self)
    }

    #[inline]
    pub fn is_door(&self) -> bool {
        self.kind == FeatureKind::Door
    }
}

impl fmt::Display for RoomFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on {} wall at {}%",
            self.kind,
            self.wall,
            (self.position * 100.0).round()
        )
    }
}

/// Room dimensions together with the openings in its walls.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RoomLayout {
    pub dimensions: RoomDimensions,
    #[serde(default)]
    pub features: Vec<RoomFeature>,
}

impl RoomLayout {
    pub fn new(dimensions: RoomDimensions, features: Vec<RoomFeature>) -> Self {
        Self {
            dimensions,
            features,
        }
    }

    /// A layout without doors or windows.
    pub fn empty(dimensions: RoomDimensions) -> Self {
        Self::new(dimensions, Vec::new())
    }

    pub fn doors(&self) -> impl Iterator<Item = &RoomFeature> {
        self.features.iter().filter(|f| f.is_door())
    }
}

/// Physical size of a furniture item in meters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FurnitureDimensions {
    pub width: f64,
    pub length: f64,
    pub height: f64,
}

impl FurnitureDimensions {
    pub fn new(width: f64, length: f64, height: f64) -> Result<Self, ValidationError> {
        Self {
            width,
            length,
            height,
        }
        .validated()
    }

    pub fn validated(self) -> Result<Self, ValidationError> {
        validation::positive_finite(self.width, "Furniture width")
            .and_then(|_| validation::positive_finite(self.length, "Furniture length"))
            .and_then(|_| validation::positive_finite(self.height, "Furniture height"))
            .map_err(ValidationError::InvalidFurnitureDimensions)?;
        Ok(self)
    }

    /// Unrotated floor footprint.
    #[inline]
    pub fn footprint(&self) -> Footprint {
        Footprint::new(self.width, self.length)
    }
}

/// A furniture catalog entry.
///
/// # Fields
/// * `id` - Catalog identifier
/// * `name` - Display name
/// * `category` - Free-form category; drives the placement rules
/// * `dimensions` - Physical size
/// * `price` - Display price as listed in the catalog
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": "bed-single",
    "name": "Single Bed",
    "category": "bed",
    "dimensions": { "width": 0.9, "length": 2.0, "height": 0.5 },
    "price": "TSh 250,000"
}))]
pub struct FurnitureItem {
    pub id: String,
    pub name: String,
    pub category: String,
    pub dimensions: FurnitureDimensions,
    #[serde(default)]
    pub price: String,
}

impl FurnitureItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        dimensions: FurnitureDimensions,
        price: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            dimensions,
            price: price.into(),
        }
    }

    pub fn validated(self) -> Result<Self, ValidationError> {
        let dimensions = self.dimensions.validated()?;
        Ok(Self { dimensions, ..self })
    }

    /// Floor area of the unrotated footprint.
    #[inline]
    pub fn floor_area(&self) -> f64 {
        self.dimensions.footprint().area()
    }
}

/// Yaw of a placed item, restricted to quarter turns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Candidate order used by the search.
    pub const ALL: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    /// Yaw in radians.
    pub fn yaw(self) -> f64 {
        match self {
            Rotation::Deg0 => 0.0,
            Rotation::Deg90 => FRAC_PI_2,
            Rotation::Deg180 => PI,
            Rotation::Deg270 => 3.0 * FRAC_PI_2,
        }
    }

    /// Snaps an arbitrary yaw to the nearest quarter turn.
    pub fn from_yaw(yaw: f64) -> Self {
        let quarters = (yaw / FRAC_PI_2).round().rem_euclid(4.0);
        match quarters as u8 {
            1 => Rotation::Deg90,
            2 => Rotation::Deg180,
            3 => Rotation::Deg270,
            _ => Rotation::Deg0,
        }
    }

    /// True for 90° and 270°, where width and length trade places.
    #[inline]
    pub fn is_quarter_turn(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }

    /// Renderer convention `[0, yaw, 0]`.
    #[inline]
    pub fn to_euler(self) -> [f64; 3] {
        [0.0, self.yaw(), 0.0]
    }
}

/// A furniture item placed in the room.
///
/// `origin` is the south-west corner of the rotated footprint and is also the
/// reference point for door and window distances.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    pub item: FurnitureItem,
    pub origin: Vec2,
    pub rotation: Rotation,
    pub score: f64,
}

impl Placement {
    pub fn new(item: FurnitureItem, origin: Vec2, rotation: Rotation, score: f64) -> Self {
        Self {
            item,
            origin,
            rotation,
            score,
        }
    }

    /// Position in the renderer convention `[x, 0, z]`.
    #[inline]
    pub fn position(&self) -> [f64; 3] {
        self.origin.to_xyz()
    }

    /// Footprint after rotation.
    #[inline]
    pub fn footprint(&self) -> Footprint {
        crate::geometry::effective_footprint(&self.item, self.rotation)
    }

    /// Occupied floor rectangle.
    #[inline]
    pub fn bounds(&self) -> FloorRect {
        FloorRect::from_origin_and_footprint(self.origin, self.footprint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_dimensions_reject_non_positive_values() {
        assert!(RoomDimensions::new(4.0, 5.0, 2.8).is_ok());
        assert!(matches!(
            RoomDimensions::new(-4.0, 5.0, 2.8),
            Err(ValidationError::InvalidRoomDimensions(_))
        ));
        assert!(matches!(
            RoomDimensions::new(4.0, 5.0, f64::NAN),
            Err(ValidationError::InvalidRoomDimensions(_))
        ));
    }

    #[test]
    fn feature_position_must_be_a_fraction() {
        assert!(RoomFeature::door(Wall::South, 0.0).is_ok());
        assert!(RoomFeature::door(Wall::South, 1.0).is_ok());
        assert!(matches!(
            RoomFeature::door(Wall::South, 1.5),
            Err(ValidationError::InvalidFeaturePosition(_))
        ));
        assert!(matches!(
            RoomFeature::new(FeatureKind::Window, Wall::North, 0.5, 0.0, 1.0),
            Err(ValidationError::InvalidFeatureSize(_))
        ));
    }

    #[test]
    fn wall_parsing_is_closed() {
        assert_eq!("North".parse::<Wall>(), Ok(Wall::North));
        assert_eq!(" west ".parse::<Wall>(), Ok(Wall::West));
        assert_eq!(
            "ceiling".parse::<Wall>(),
            Err(ValidationError::UnrecognizedWall("ceiling".to_string()))
        );
        assert!(matches!(
            "skylight".parse::<FeatureKind>(),
            Err(ValidationError::UnrecognizedFeatureKind(_))
        ));
    }

    #[test]
    fn walls_have_opposites() {
        for wall in Wall::ALL {
            assert_ne!(wall, wall.opposite());
            assert_eq!(wall, wall.opposite().opposite());
        }
    }

    #[test]
    fn feature_description_reads_naturally() {
        let window = RoomFeature::window(Wall::North, 0.5).unwrap();
        assert_eq!(window.to_string(), "Window on north wall at 50%");

        let door = RoomFeature::door(Wall::East, 0.333).unwrap();
        assert_eq!(door.to_string(), "Door on east wall at 33%");
    }

    #[test]
    fn feature_deserializes_from_wire_format() {
        let feature: RoomFeature = serde_json::from_value(json!({
            "type": "door",
            "wall": "south",
            "position": 0.5,
            "width": 0.9,
            "height": 2.0
        }))
        .unwrap();
        assert!(feature.is_door());
        assert_eq!(feature.wall, Wall::South);

        let bad: Result<RoomFeature, _> = serde_json::from_value(json!({
            "type": "door",
            "wall": "up",
            "position": 0.5,
            "width": 0.9,
            "height": 2.0
        }));
        assert!(bad.is_err());
    }

    #[test]
    fn rotation_yaw_round_trips_through_snapping() {
        for rotation in Rotation::ALL {
            assert_eq!(Rotation::from_yaw(rotation.yaw()), rotation);
        }
        assert_eq!(Rotation::from_yaw(-FRAC_PI_2), Rotation::Deg270);
        assert_eq!(Rotation::from_yaw(2.0 * PI + 0.1), Rotation::Deg0);
        assert!(Rotation::Deg90.is_quarter_turn());
        assert!(!Rotation::Deg180.is_quarter_turn());
    }

    #[test]
    fn placement_bounds_follow_rotation() {
        let item = FurnitureItem::new(
            "bed",
            "Bed",
            "bed",
            FurnitureDimensions::new(0.9, 2.0, 0.5).unwrap(),
            "",
        );
        let placement = Placement::new(item, Vec2::new(1.0, 4.0), Rotation::Deg90, 5.0);

        assert_eq!(placement.position(), [1.0, 0.0, 4.0]);
        assert_eq!(placement.footprint(), Footprint::new(2.0, 0.9));
        let bounds = placement.bounds();
        assert!((bounds.max.x - 3.0).abs() < 1e-12);
        assert!((bounds.max.z - 4.9).abs() < 1e-12);
    }
}
