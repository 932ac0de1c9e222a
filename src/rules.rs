//! Per-category placement rules.
//!
//! Furniture categories are free-form strings in the catalog. The planner
//! recognizes a fixed set of them (case-insensitively) and treats everything
//! else as `Other`, which carries a neutral rule.

use std::fmt;

use crate::model::{FurnitureItem, Wall};

/// How an item relates to windows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowPreference {
    /// Closer to windows is better.
    Adjacent,
    /// Closer to windows is worse.
    Avoid,
    /// The item should look toward a window.
    Facing,
    Neutral,
}

/// Static placement preferences for one furniture category.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementRule {
    pub preferred_walls: &'static [Wall],
    pub avoid_walls: &'static [Wall],
    /// Minimum distance in meters between the item's reference point and any door.
    pub min_distance_from_door: f64,
    pub window_preference: WindowPreference,
    /// Informational only; not used by the scorer.
    pub prefer_natural_light: bool,
}

impl PlacementRule {
    /// A rule that neither rewards nor penalizes anything.
    pub const NEUTRAL: PlacementRule = PlacementRule {
        preferred_walls: &[],
        avoid_walls: &[],
        min_distance_from_door: 0.0,
        window_preference: WindowPreference::Neutral,
        prefer_natural_light: false,
    };

    const BED: PlacementRule = PlacementRule {
        preferred_walls: &[Wall::North, Wall::East],
        avoid_walls: &[],
        min_distance_from_door: 1.0,
        window_preference: WindowPreference::Adjacent,
        prefer_natural_light: false,
    };

    const SOFA: PlacementRule = PlacementRule {
        preferred_walls: &[Wall::North, Wall::South],
        avoid_walls: &[],
        min_distance_from_door: 0.5,
        window_preference: WindowPreference::Facing,
        prefer_natural_light: false,
    };

    const DINING_TABLE: PlacementRule = PlacementRule {
        preferred_walls: &[],
        avoid_walls: &[],
        min_distance_from_door: 1.0,
        window_preference: WindowPreference::Neutral,
        prefer_natural_light: true,
    };

    const WARDROBE: PlacementRule = PlacementRule {
        preferred_walls: &[Wall::South, Wall::West],
        avoid_walls: &[],
        min_distance_from_door: 0.3,
        window_preference: WindowPreference::Avoid,
        prefer_natural_light: false,
    };

    #[inline]
    pub fn prefers(&self, wall: Wall) -> bool {
        self.preferred_walls.contains(&wall)
    }

    #[inline]
    pub fn avoids(&self, wall: Wall) -> bool {
        self.avoid_walls.contains(&wall)
    }
}

/// Furniture categories with dedicated placement rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FurnitureCategory {
    Bed,
    Sofa,
    DiningTable,
    Wardrobe,
    Other,
}

impl FurnitureCategory {
    /// Maps a catalog category label to a known category.
    ///
    /// Matching is on the uppercased label: `BED`, `SOFA`, `DINING-TABLE`
    /// and `WARDROBE`. Anything else is `Other`.
    pub fn from_label(label: &str) -> Self {
        match label.to_ascii_uppercase().as_str() {
            "BED" => FurnitureCategory::Bed,
            "SOFA" => FurnitureCategory::Sofa,
            "DINING-TABLE" => FurnitureCategory::DiningTable,
            "WARDROBE" => FurnitureCategory::Wardrobe,
            _ => FurnitureCategory::Other,
        }
    }

    pub fn of(item: &FurnitureItem) -> Self {
        Self::from_label(&item.category)
    }

    pub fn rule(self) -> &'static PlacementRule {
        match self {
            FurnitureCategory::Bed => &PlacementRule::BED,
            FurnitureCategory::Sofa => &PlacementRule::SOFA,
            FurnitureCategory::DiningTable => &PlacementRule::DINING_TABLE,
            FurnitureCategory::Wardrobe => &PlacementRule::WARDROBE,
            FurnitureCategory::Other => &PlacementRule::NEUTRAL,
        }
    }
}

impl fmt::Display for FurnitureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FurnitureCategory::Bed => "BED",
            FurnitureCategory::Sofa => "SOFA",
            FurnitureCategory::DiningTable => "DINING-TABLE",
            FurnitureCategory::Wardrobe => "WARDROBE",
            FurnitureCategory::Other => "OTHER",
        };
        f.write_str(label)
    }
}

/// Placement rule for an item, neutral when its category is unknown.
#[inline]
pub fn rule_for(item: &FurnitureItem) -> &'static PlacementRule {
    FurnitureCategory::of(item).rule()
}
