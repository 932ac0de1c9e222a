//! Furniture arrangement search.
//!
//! A greedy grid search places furniture one item at a time, largest floor
//! footprint first. Every free grid cell is tried in all four quarter-turn
//! rotations; candidates must stay inside the room, must not collide with
//! furniture already placed and must keep the category's clearance from every
//! door. The best-scoring candidate wins and the cells it covers leave the
//! pool. The whole pass (a trial) repeats `max_iterations` times and the
//! highest-scoring trial is returned.
//!
//! With `TrialOrdering::Deterministic` every trial is identical, so extra
//! iterations only repeat work. `TrialOrdering::Shuffled` varies the cell
//! order between trials, which changes how ties between equally scored cells
//! are broken.

use std::cmp::Ordering;

use serde::Serialize;
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::geometry::{
    boxes_overlap, distance, effective_footprint, wall_feature_position, within_bounds,
};
use crate::model::{
    FurnitureItem, Placement, RoomDimensions, RoomLayout, Rotation, ValidationError,
};
use crate::rules::rule_for;
use crate::scorer::score_position;
use crate::types::{EPSILON_GENERAL, Vec2};

/// How trials differ from one another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TrialOrdering {
    /// Every trial walks the grid in the same order.
    #[default]
    Deterministic,
    /// Trial 0 walks the grid in order; later trials shuffle it with a PRNG
    /// seeded from `seed` and the trial index.
    Shuffled { seed: u64 },
}

/// Configuration for the arrangement search.
#[derive(Copy, Clone, Debug)]
pub struct ArrangementConfig {
    /// Spacing of candidate positions in meters
    pub grid_step: f64,
    /// Number of trials
    pub max_iterations: usize,
    /// Tolerance for grid generation
    pub epsilon: f64,
    pub trial_ordering: TrialOrdering,
}

impl ArrangementConfig {
    pub const DEFAULT_GRID_STEP: f64 = 0.5;
    pub const DEFAULT_MAX_ITERATIONS: usize = 100;
    pub const DEFAULT_EPSILON: f64 = EPSILON_GENERAL;
    /// Upper bound on candidate positions per room.
    pub const MAX_GRID_CELLS: usize = 1_000_000;

    pub fn builder() -> ArrangementConfigBuilder {
        ArrangementConfigBuilder::default()
    }

    /// Checks that the candidate grid for `dims` stays within
    /// [`Self::MAX_GRID_CELLS`] and returns its size.
    pub fn check_grid(&self, dims: &RoomDimensions) -> Result<usize, ValidationError> {
        match grid_cell_count(dims, self.grid_step, self.epsilon) {
            Some(cells) if cells <= Self::MAX_GRID_CELLS => Ok(cells),
            _ => Err(ValidationError::GridTooLarge(format!(
                "{} x {} m at {} m spacing exceeds {} candidate positions",
                dims.width,
                dims.length,
                self.grid_step,
                Self::MAX_GRID_CELLS
            ))),
        }
    }
}

impl Default for ArrangementConfig {
    fn default() -> Self {
        Self {
            grid_step: Self::DEFAULT_GRID_STEP,
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            epsilon: Self::DEFAULT_EPSILON,
            trial_ordering: TrialOrdering::Deterministic,
        }
    }
}

/// Builder for [`ArrangementConfig`].
#[derive(Clone, Debug, Default)]
pub struct ArrangementConfigBuilder {
    config: ArrangementConfig,
}

impl ArrangementConfigBuilder {
    /// Sets the grid spacing. Non-positive values keep the current step.
    pub fn grid_step(mut self, step: f64) -> Self {
        if step > 0.0 && step.is_finite() {
            self.config.grid_step = step;
        }
        self
    }

    /// Sets the number of trials, at least one.
    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.config.max_iterations = iterations.max(1);
        self
    }

    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.config.epsilon = epsilon;
        self
    }

    pub fn trial_ordering(mut self, ordering: TrialOrdering) -> Self {
        self.config.trial_ordering = ordering;
        self
    }

    /// Shorthand for `TrialOrdering::Shuffled { seed }`.
    pub fn shuffled(self, seed: u64) -> Self {
        self.trial_ordering(TrialOrdering::Shuffled { seed })
    }

    pub fn build(self) -> ArrangementConfig {
        self.config
    }
}

/// Outcome of an arrangement search.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrangementResult {
    pub placements: Vec<Placement>,
    pub unplaced: Vec<UnplacedItem>,
    pub total_score: f64,
    pub trials_run: usize,
}

impl ArrangementResult {
    fn empty() -> Self {
        Self {
            placements: Vec::new(),
            unplaced: Vec::new(),
            total_score: 0.0,
            trials_run: 0,
        }
    }

    /// True when every requested item was placed.
    pub fn is_complete(&self) -> bool {
        self.unplaced.is_empty()
    }

    pub fn placed_count(&self) -> usize {
        self.placements.len()
    }

    pub fn unplaced_count(&self) -> usize {
        self.unplaced.len()
    }

    /// Floor area covered by placed furniture.
    pub fn occupied_area(&self) -> f64 {
        self.placements.iter().map(|p| p.footprint().area()).sum()
    }

    /// Share of the floor covered by furniture in percent.
    pub fn coverage_percent(&self, room: &RoomDimensions) -> f64 {
        let floor = room.floor_area();
        if floor <= 0.0 {
            return 0.0;
        }
        (self.occupied_area() / floor) * 100.0
    }
}

/// Item that did not make it into the arrangement.
#[derive(Clone, Debug, PartialEq)]
pub struct UnplacedItem {
    pub item: FurnitureItem,
    pub reason: UnplacedReason,
}

/// Why an item could not be placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnplacedReason {
    /// The footprint is larger than the floor in both orientations.
    ExceedsRoom,
    /// No free cell satisfies the bounds, collision and clearance rules.
    NoValidPosition,
    /// The room has more candidate positions than the search accepts.
    GridTooLarge,
}

impl UnplacedReason {
    pub fn code(&self) -> &'static str {
        match self {
            UnplacedReason::ExceedsRoom => "exceeds_room",
            UnplacedReason::NoValidPosition => "no_valid_position",
            UnplacedReason::GridTooLarge => "grid_too_large",
        }
    }
}

impl std::fmt::Display for UnplacedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnplacedReason::ExceedsRoom => {
                write!(f, "Item is larger than the room in every orientation")
            }
            UnplacedReason::NoValidPosition => {
                write!(
                    f,
                    "No free position keeps the item inside the room, clear of other furniture and away from doors"
                )
            }
            UnplacedReason::GridTooLarge => {
                write!(f, "The room has too many candidate positions to search")
            }
        }
    }
}

/// Events emitted during the search for live visualization.
#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(tag = "type")]
pub enum ArrangeEvent {
    /// A trial begins.
    TrialStarted { trial: usize },
    /// An item was placed within the current trial.
    ItemPlaced {
        trial: usize,
        id: String,
        position: [f64; 3],
        rotation: [f64; 3],
        score: f64,
    },
    /// An item was left out of the current trial.
    ItemSkipped {
        trial: usize,
        id: String,
        reason_code: String,
        reason_text: String,
    },
    /// A trial ended.
    TrialFinished {
        trial: usize,
        total_score: f64,
        placed: usize,
        improved: bool,
    },
    /// Search complete.
    Finished {
        trials: usize,
        placed: usize,
        unplaced: usize,
        best_score: f64,
    },
}

/// Suggests an arrangement with the default grid and `max_iterations` trials.
///
/// Items that cannot be placed are left out of the returned list. Use
/// [`arrange_with_config`] to learn which items were dropped and why.
pub fn suggest_optimal_arrangement(
    furniture: &[FurnitureItem],
    layout: &RoomLayout,
    max_iterations: usize,
) -> Vec<Placement> {
    if max_iterations == 0 {
        return Vec::new();
    }
    let config = ArrangementConfig::builder()
        .max_iterations(max_iterations)
        .build();
    arrange_with_config(furniture, layout, config).placements
}

/// Arrangement search with the default configuration.
pub fn arrange(furniture: &[FurnitureItem], layout: &RoomLayout) -> ArrangementResult {
    arrange_with_config(furniture, layout, ArrangementConfig::default())
}

/// Arrangement search with a custom configuration.
pub fn arrange_with_config(
    furniture: &[FurnitureItem],
    layout: &RoomLayout,
    config: ArrangementConfig,
) -> ArrangementResult {
    arrange_with_progress(furniture, layout, config, |_| {})
}

/// Arrangement search that reports every step through `on_event`.
pub fn arrange_with_progress(
    furniture: &[FurnitureItem],
    layout: &RoomLayout,
    config: ArrangementConfig,
    mut on_event: impl FnMut(&ArrangeEvent),
) -> ArrangementResult {
    if furniture.is_empty() {
        on_event(&ArrangeEvent::Finished {
            trials: 0,
            placed: 0,
            unplaced: 0,
            best_score: 0.0,
        });
        return ArrangementResult::empty();
    }

    // Big items first; the sort is stable so equal areas keep input order.
    let mut sorted: Vec<FurnitureItem> = furniture.to_vec();
    sorted.sort_by(|a, b| {
        b.floor_area()
            .partial_cmp(&a.floor_area())
            .unwrap_or(Ordering::Equal)
    });

    if let Err(err) = config.check_grid(&layout.dimensions) {
        warn!(error = %err, items = furniture.len(), "skipping arrangement search");
        on_event(&ArrangeEvent::Finished {
            trials: 0,
            placed: 0,
            unplaced: sorted.len(),
            best_score: 0.0,
        });
        return ArrangementResult {
            unplaced: sorted
                .into_iter()
                .map(|item| UnplacedItem {
                    item,
                    reason: UnplacedReason::GridTooLarge,
                })
                .collect(),
            ..ArrangementResult::empty()
        };
    }

    let grid = generate_grid_positions(&layout.dimensions, config.grid_step, config.epsilon);
    let iterations = config.max_iterations.max(1);

    let mut best: Option<Trial> = None;
    for trial_index in 0..iterations {
        on_event(&ArrangeEvent::TrialStarted { trial: trial_index });

        let cells = trial_cells(&grid, trial_index, config.trial_ordering);
        let trial = run_trial(&sorted, layout, cells, trial_index, &mut on_event);

        let improved = best
            .as_ref()
            .is_none_or(|current| trial.total_score > current.total_score);
        on_event(&ArrangeEvent::TrialFinished {
            trial: trial_index,
            total_score: trial.total_score,
            placed: trial.placements.len(),
            improved,
        });
        if improved {
            best = Some(trial);
        }
    }

    let best = best.unwrap_or_else(Trial::empty);
    debug!(
        items = furniture.len(),
        placed = best.placements.len(),
        unplaced = best.unplaced.len(),
        best_score = best.total_score,
        trials = iterations,
        "arrangement search finished"
    );

    on_event(&ArrangeEvent::Finished {
        trials: iterations,
        placed: best.placements.len(),
        unplaced: best.unplaced.len(),
        best_score: best.total_score,
    });

    ArrangementResult {
        placements: best.placements,
        unplaced: best.unplaced,
        total_score: best.total_score,
        trials_run: iterations,
    }
}

/// One greedy pass over all items.
struct Trial {
    placements: Vec<Placement>,
    unplaced: Vec<UnplacedItem>,
    total_score: f64,
}

impl Trial {
    fn empty() -> Self {
        Self {
            placements: Vec::new(),
            unplaced: Vec::new(),
            total_score: 0.0,
        }
    }
}

fn trial_cells(grid: &[Vec2], trial_index: usize, ordering: TrialOrdering) -> Vec<Vec2> {
    let mut cells = grid.to_vec();
    if let TrialOrdering::Shuffled { seed } = ordering {
        if trial_index > 0 {
            let mut rng = fastrand::Rng::with_seed(seed.wrapping_add(trial_index as u64));
            rng.shuffle(&mut cells);
        }
    }
    cells
}

fn run_trial(
    sorted: &[FurnitureItem],
    layout: &RoomLayout,
    mut cells: Vec<Vec2>,
    trial_index: usize,
    on_event: &mut impl FnMut(&ArrangeEvent),
) -> Trial {
    let mut trial = Trial::empty();

    for item in sorted {
        match best_candidate(item, &cells, layout, &trial.placements) {
            Some(candidate) => {
                let placement = Placement::new(
                    item.clone(),
                    candidate.origin,
                    candidate.rotation,
                    candidate.score,
                );
                on_event(&ArrangeEvent::ItemPlaced {
                    trial: trial_index,
                    id: item.id.clone(),
                    position: placement.position(),
                    rotation: placement.rotation.to_euler(),
                    score: placement.score,
                });

                // Drop cells the new item covers. Approximate: a cell goes when
                // the same footprint anchored there would overlap the item.
                let footprint = placement.footprint();
                cells.retain(|cell| !boxes_overlap(*cell, footprint, placement.origin, footprint));

                trial.total_score += placement.score;
                trial.placements.push(placement);
            }
            None => {
                let reason = unplaced_reason(item, &layout.dimensions);
                on_event(&ArrangeEvent::ItemSkipped {
                    trial: trial_index,
                    id: item.id.clone(),
                    reason_code: reason.code().to_string(),
                    reason_text: reason.to_string(),
                });
                trial.unplaced.push(UnplacedItem {
                    item: item.clone(),
                    reason,
                });
            }
        }
    }

    trial
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    origin: Vec2,
    rotation: Rotation,
    score: f64,
}

/// Best legal position for `item`. Ties keep the first candidate found.
fn best_candidate(
    item: &FurnitureItem,
    cells: &[Vec2],
    layout: &RoomLayout,
    placed: &[Placement],
) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;

    for &origin in cells {
        for rotation in Rotation::ALL {
            if !can_place_furniture(item, origin, rotation, layout, placed) {
                continue;
            }
            let score = score_position(item, origin, rotation, layout);
            if best.is_none_or(|current| score > current.score) {
                best = Some(Candidate {
                    origin,
                    rotation,
                    score,
                });
            }
        }
    }

    best
}

fn unplaced_reason(item: &FurnitureItem, room: &RoomDimensions) -> UnplacedReason {
    if item
        .dimensions
        .footprint()
        .fits_within_any_orientation(&room.footprint(), EPSILON_GENERAL)
    {
        UnplacedReason::NoValidPosition
    } else {
        UnplacedReason::ExceedsRoom
    }
}

/// Number of grid positions per axis and in total, or `None` when the count
/// does not fit in `usize`.
fn grid_axes(dims: &RoomDimensions, step: f64, epsilon: f64) -> Option<(usize, usize, usize)> {
    let axis_steps = |extent: f64| {
        let steps = (extent / step + epsilon).floor();
        if steps.is_finite() && steps >= 0.0 && steps < usize::MAX as f64 {
            Some(steps as usize)
        } else {
            None
        }
    };
    let steps_x = axis_steps(dims.width)?;
    let steps_z = axis_steps(dims.length)?;
    let cells = steps_x
        .checked_add(1)?
        .checked_mul(steps_z.checked_add(1)?)?;
    Some((steps_x, steps_z, cells))
}

/// Size of the grid [`generate_grid_positions`] would produce.
pub fn grid_cell_count(dims: &RoomDimensions, step: f64, epsilon: f64) -> Option<usize> {
    grid_axes(dims, step, epsilon).map(|(_, _, cells)| cells)
}

/// Candidate positions at `step` spacing over `[0, width] × [0, length]`,
/// both edges included. Ordered by x, then z.
///
/// Grids larger than [`ArrangementConfig::MAX_GRID_CELLS`] come back empty.
pub fn generate_grid_positions(dims: &RoomDimensions, step: f64, epsilon: f64) -> Vec<Vec2> {
    let Some((steps_x, steps_z, cells)) = grid_axes(dims, step, epsilon)
        .filter(|&(_, _, cells)| cells <= ArrangementConfig::MAX_GRID_CELLS)
    else {
        warn!(
            width = dims.width,
            length = dims.length,
            step,
            "candidate grid too large, no positions generated"
        );
        return Vec::new();
    };

    let mut positions = Vec::with_capacity(cells);
    for i in 0..=steps_x {
        let x = i as f64 * step;
        for j in 0..=steps_z {
            positions.push(Vec2::new(x, j as f64 * step));
        }
    }
    positions
}

/// Checks bounds, collisions with `existing` and door clearance.
pub fn can_place_furniture(
    item: &FurnitureItem,
    origin: Vec2,
    rotation: Rotation,
    layout: &RoomLayout,
    existing: &[Placement],
) -> bool {
    let footprint = effective_footprint(item, rotation);

    if !within_bounds(origin, footprint, &layout.dimensions) {
        return false;
    }

    if existing
        .iter()
        .any(|p| boxes_overlap(origin, footprint, p.origin, p.footprint()))
    {
        return false;
    }

    let min_clearance = rule_for(item).min_distance_from_door;
    !layout.doors().any(|door| {
        distance(origin, wall_feature_position(door, &layout.dimensions)) < min_clearance
    })
}

/// Checks whether `item` fits anywhere in an empty-walled room next to
/// `existing`, in any rotation. No scoring and no door rules.
pub fn does_furniture_fit(
    item: &FurnitureItem,
    room: &RoomDimensions,
    existing: &[Placement],
) -> bool {
    does_furniture_fit_with_config(item, room, existing, &ArrangementConfig::default())
}

/// [`does_furniture_fit`] with a custom grid.
pub fn does_furniture_fit_with_config(
    item: &FurnitureItem,
    room: &RoomDimensions,
    existing: &[Placement],
    config: &ArrangementConfig,
) -> bool {
    let layout = RoomLayout::empty(*room);
    let grid = generate_grid_positions(room, config.grid_step, config.epsilon);

    Rotation::ALL.into_iter().any(|rotation| {
        grid.iter()
            .any(|&origin| can_place_furniture(item, origin, rotation, &layout, existing))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::nearest_wall;
    use crate::model::{FurnitureDimensions, RoomFeature, Wall};

    fn room(width: f64, length: f64) -> RoomDimensions {
        RoomDimensions::new(width, length, 2.8).unwrap()
    }

    fn item(id: &str, category: &str, width: f64, length: f64) -> FurnitureItem {
        FurnitureItem::new(
            id,
            id,
            category,
            FurnitureDimensions::new(width, length, 1.0).unwrap(),
            "",
        )
    }

    fn assert_valid_arrangement(placements: &[Placement], layout: &RoomLayout) {
        for (i, a) in placements.iter().enumerate() {
            assert!(
                within_bounds(a.origin, a.footprint(), &layout.dimensions),
                "{} leaves the room",
                a.item.id
            );
            for b in &placements[i + 1..] {
                assert!(
                    !a.bounds().intersects(&b.bounds()),
                    "{} overlaps {}",
                    a.item.id,
                    b.item.id
                );
            }
            let clearance = rule_for(&a.item).min_distance_from_door;
            for door in layout.doors() {
                let door_pos = wall_feature_position(door, &layout.dimensions);
                assert!(distance(a.origin, door_pos) >= clearance);
            }
        }
    }

    #[test]
    fn grid_covers_room_inclusive() {
        let grid = generate_grid_positions(&room(4.0, 5.0), 0.5, EPSILON_GENERAL);
        assert_eq!(grid.len(), 9 * 11);
        assert_eq!(grid.first(), Some(&Vec2::new(0.0, 0.0)));
        assert_eq!(grid[1], Vec2::new(0.0, 0.5));
        assert_eq!(grid.last(), Some(&Vec2::new(4.0, 5.0)));
    }

    #[test]
    fn grid_ignores_partial_last_step() {
        let grid = generate_grid_positions(&room(1.2, 0.7), 0.5, EPSILON_GENERAL);
        // x in {0, 0.5, 1.0}, z in {0, 0.5}
        assert_eq!(grid.len(), 6);
        assert!(grid.iter().all(|p| p.x <= 1.2 && p.z <= 0.7));
    }

    #[test]
    fn empty_furniture_yields_empty_arrangement() {
        let layout = RoomLayout::empty(room(4.0, 5.0));
        let result = arrange(&[], &layout);
        assert!(result.placements.is_empty());
        assert!(result.is_complete());
        assert!(suggest_optimal_arrangement(&[], &layout, 100).is_empty());
    }

    #[test]
    fn bed_respects_door_and_prefers_north_or_east() {
        let layout = RoomLayout::new(
            room(4.0, 5.0),
            vec![RoomFeature::door(Wall::South, 0.5).unwrap()],
        );
        let bed = item("bed-single", "BED", 0.9, 2.0);

        let placements = suggest_optimal_arrangement(&[bed], &layout, 100);
        assert_eq!(placements.len(), 1);

        let placement = &placements[0];
        let door = Vec2::new(2.0, 0.0);
        assert!(distance(placement.origin, door) >= 1.0);
        assert!(matches!(
            nearest_wall(placement.origin, &layout.dimensions),
            Wall::North | Wall::East
        ));
        assert_eq!(placement.score, 5.0);
        assert_eq!(placement.origin, Vec2::new(1.0, 4.0));
        assert_eq!(placement.rotation, Rotation::Deg90);
        assert_valid_arrangement(&placements, &layout);
    }

    #[test]
    fn largest_item_is_placed_first() {
        let layout = RoomLayout::empty(room(4.0, 5.0));
        let furniture = vec![
            item("stool", "other", 0.5, 0.5),
            item("table", "other", 2.0, 2.0),
        ];

        let result = arrange(&furniture, &layout);
        assert_eq!(result.placed_count(), 2);
        assert_eq!(result.placements[0].item.id, "table");
        assert_eq!(result.placements[0].origin, Vec2::zero());
        assert_valid_arrangement(&result.placements, &layout);
    }

    #[test]
    fn drops_items_beyond_capacity() {
        let layout = RoomLayout::empty(room(4.0, 4.0));
        let furniture = vec![
            item("a", "other", 3.0, 3.0),
            item("b", "other", 3.0, 3.0),
            item("c", "other", 3.0, 3.0),
        ];

        let result = arrange(&furniture, &layout);
        assert_eq!(result.placed_count(), 1);
        assert_eq!(result.unplaced_count(), 2);
        assert!(!result.is_complete());
        assert!(
            result
                .unplaced
                .iter()
                .all(|u| u.reason == UnplacedReason::NoValidPosition)
        );
        assert_valid_arrangement(&result.placements, &layout);

        let literal = suggest_optimal_arrangement(&furniture, &layout, 10);
        assert_eq!(literal.len(), 1);
    }

    #[test]
    fn oversized_item_is_reported() {
        let layout = RoomLayout::empty(room(2.0, 2.0));
        let result = arrange(&[item("piano", "other", 2.5, 1.5)], &layout);
        assert!(result.placements.is_empty());
        assert_eq!(result.unplaced.len(), 1);
        assert_eq!(result.unplaced[0].reason, UnplacedReason::ExceedsRoom);
        assert_eq!(result.unplaced[0].reason.code(), "exceeds_room");
    }

    #[test]
    fn rotation_lets_long_items_fit() {
        let layout = RoomLayout::empty(room(2.5, 1.0));
        let result = arrange(&[item("bed", "other", 0.9, 2.0)], &layout);
        assert_eq!(result.placed_count(), 1);
        assert!(result.placements[0].rotation.is_quarter_turn());
    }

    #[test]
    fn door_clearance_is_a_hard_constraint() {
        let layout = RoomLayout::new(
            room(4.0, 5.0),
            vec![RoomFeature::door(Wall::South, 0.5).unwrap()],
        );
        let bed = item("bed", "bed", 0.9, 2.0);

        assert!(!can_place_furniture(&bed, Vec2::new(2.0, 0.5), Rotation::Deg0, &layout, &[]));
        assert!(can_place_furniture(&bed, Vec2::new(2.0, 1.0), Rotation::Deg0, &layout, &[]));

        let stool = item("stool", "other", 0.5, 0.5);
        assert!(can_place_furniture(&stool, Vec2::new(2.0, 0.0), Rotation::Deg0, &layout, &[]));
    }

    #[test]
    fn deterministic_trials_are_identical() {
        let layout = RoomLayout::new(
            room(4.0, 5.0),
            vec![
                RoomFeature::door(Wall::South, 0.5).unwrap(),
                RoomFeature::window(Wall::East, 0.5).unwrap(),
            ],
        );
        let furniture = vec![
            item("bed", "bed", 0.9, 2.0),
            item("wardrobe", "wardrobe", 1.2, 0.6),
            item("sofa", "sofa", 2.0, 0.85),
        ];

        let first = suggest_optimal_arrangement(&furniture, &layout, 100);
        let second = suggest_optimal_arrangement(&furniture, &layout, 100);
        let single = suggest_optimal_arrangement(&furniture, &layout, 1);

        assert_eq!(first, second);
        assert_eq!(first, single);
        assert_valid_arrangement(&first, &layout);
    }

    #[test]
    fn shuffled_trials_are_reproducible_and_valid() {
        let layout = RoomLayout::new(
            room(5.0, 4.0),
            vec![
                RoomFeature::door(Wall::West, 0.25).unwrap(),
                RoomFeature::window(Wall::North, 0.5).unwrap(),
            ],
        );
        let furniture = vec![
            item("bed", "bed", 1.4, 2.0),
            item("table", "dining-table", 1.5, 0.9),
            item("wardrobe", "wardrobe", 1.2, 0.6),
        ];
        let config = ArrangementConfig::builder()
            .max_iterations(20)
            .shuffled(7)
            .build();

        let a = arrange_with_config(&furniture, &layout, config);
        let b = arrange_with_config(&furniture, &layout, config);
        assert_eq!(a, b);
        assert_valid_arrangement(&a.placements, &layout);

        // Trial 0 is the deterministic pass, so shuffling never scores lower.
        let baseline = arrange(&furniture, &layout);
        assert!(a.total_score >= baseline.total_score);
    }

    #[test]
    fn progress_events_describe_every_trial() {
        let layout = RoomLayout::empty(room(3.0, 3.0));
        let furniture = vec![item("a", "other", 1.0, 1.0), item("huge", "other", 4.0, 4.0)];
        let config = ArrangementConfig::builder().max_iterations(3).build();

        let mut events = Vec::new();
        let result = arrange_with_progress(&furniture, &layout, config, |e| events.push(e.clone()));

        let started = events
            .iter()
            .filter(|e| matches!(e, ArrangeEvent::TrialStarted { .. }))
            .count();
        let skipped = events
            .iter()
            .filter(|e| matches!(e, ArrangeEvent::ItemSkipped { .. }))
            .count();
        assert_eq!(started, 3);
        assert_eq!(skipped, 3);
        assert!(matches!(
            events.last(),
            Some(ArrangeEvent::Finished {
                trials: 3,
                placed: 1,
                unplaced: 1,
                ..
            })
        ));
        assert_eq!(result.trials_run, 3);
        // Only the first trial can strictly improve on nothing.
        let improved = events
            .iter()
            .filter(|e| matches!(e, ArrangeEvent::TrialFinished { improved: true, .. }))
            .count();
        assert_eq!(improved, 1);
    }

    #[test]
    fn zero_iterations_return_nothing() {
        let layout = RoomLayout::empty(room(4.0, 4.0));
        let furniture = vec![item("a", "other", 1.0, 1.0)];
        assert!(suggest_optimal_arrangement(&furniture, &layout, 0).is_empty());
        assert_eq!(ArrangementConfig::builder().max_iterations(0).build().max_iterations, 1);
    }

    #[test]
    fn pruning_uses_the_rotated_footprint() {
        // The runner only fits turned a quarter, covering x 0..2.5, z 0..0.5.
        let layout = RoomLayout::empty(room(3.0, 1.0));
        let furniture = vec![
            item("runner", "other", 0.5, 2.5),
            item("stool", "other", 0.5, 0.5),
        ];
        let config = ArrangementConfig::builder().max_iterations(1).build();
        let result = arrange_with_config(&furniture, &layout, config);

        assert_eq!(result.placements[0].rotation, Rotation::Deg90);
        assert_eq!(result.placements[0].origin, Vec2::zero());
        // (0, 0.5) survives pruning because it lies outside the turned footprint.
        assert_eq!(result.placements[1].origin, Vec2::new(0.0, 0.5));
    }

    #[test]
    fn grid_cell_count_is_checked() {
        assert_eq!(grid_cell_count(&room(4.0, 5.0), 0.5, EPSILON_GENERAL), Some(99));
        assert_eq!(grid_cell_count(&room(1e12, 1e12), 0.5, EPSILON_GENERAL), None);
        assert_eq!(grid_cell_count(&room(f64::MAX, 1.0), 0.5, EPSILON_GENERAL), None);

        let config = ArrangementConfig::default();
        assert_eq!(config.check_grid(&room(4.0, 5.0)), Ok(99));
        assert!(matches!(
            config.check_grid(&room(1e5, 1e5)),
            Err(ValidationError::GridTooLarge(_))
        ));
    }

    #[test]
    fn huge_rooms_are_reported_instead_of_searched() {
        let layout = RoomLayout::empty(room(1e12, 1e12));
        let bed = item("bed", "bed", 1.0, 1.0);

        assert!(generate_grid_positions(&layout.dimensions, 0.5, EPSILON_GENERAL).is_empty());
        assert!(suggest_optimal_arrangement(std::slice::from_ref(&bed), &layout, 1).is_empty());
        assert!(!does_furniture_fit(&bed, &layout.dimensions, &[]));

        let mut events = Vec::new();
        let result = arrange_with_progress(
            std::slice::from_ref(&bed),
            &layout,
            ArrangementConfig::default(),
            |evt| events.push(evt.clone()),
        );
        assert_eq!(result.unplaced.len(), 1);
        assert_eq!(result.unplaced[0].reason, UnplacedReason::GridTooLarge);
        assert_eq!(result.trials_run, 0);
        assert!(matches!(
            events.as_slice(),
            [ArrangeEvent::Finished { unplaced: 1, .. }]
        ));
    }

    #[test]
    fn fit_check_against_existing_furniture() {
        let dims = room(2.0, 2.0);
        let table = item("table", "other", 2.0, 1.0);
        assert!(does_furniture_fit(&table, &dims, &[]));

        let occupying = Placement::new(
            item("rug", "other", 2.0, 1.5),
            Vec2::zero(),
            Rotation::Deg0,
            0.0,
        );
        assert!(!does_furniture_fit(&table, &dims, std::slice::from_ref(&occupying)));
        assert!(does_furniture_fit(
            &item("stool", "other", 0.5, 0.5),
            &dims,
            std::slice::from_ref(&occupying)
        ));
        assert!(!does_furniture_fit(&item("piano", "other", 2.5, 2.5), &dims, &[]));
    }

    #[test]
    fn coverage_reflects_placed_area() {
        let dims = room(4.0, 4.0);
        let result = arrange(&[item("a", "other", 2.0, 2.0)], &RoomLayout::empty(dims));
        assert!((result.occupied_area() - 4.0).abs() < 1e-9);
        assert!((result.coverage_percent(&dims) - 25.0).abs() < 1e-9);
    }
}
