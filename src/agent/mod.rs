//! Pac-Man decision agent. Each turn it scores the cells reachable by one
//! legal move and picks the best one.
//!
//! Scoring is split into independent fields that all write into one
//! [`WeightMap`]: [`threat`] for ghosts and [`reward`] for food and capsules.
//! Both measure distances with the wall-aware BFS in [`distance`].

pub mod distance;
pub mod engine;
pub mod reward;
pub mod threat;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::components::{Direction, GridPosition};
use crate::config::AgentConfig;
use distance::{Distance, WallGrid};

pub use engine::{Decision, DecisionEngine, ScoredMove};

/// A ghost as seen this turn. Positions can be fractional while a ghost is
/// between cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GhostObservation {
    pub x: f32,
    pub y: f32,
    pub edible_timer: u32,
}

impl GhostObservation {
    pub fn at(cell: GridPosition, edible_timer: u32) -> Self {
        Self {
            x: cell.x as f32,
            y: cell.y as f32,
            edible_timer,
        }
    }

    /// The cell the ghost occupies. Fractional coordinates truncate toward zero.
    pub fn cell(&self) -> GridPosition {
        GridPosition {
            x: self.x as i32,
            y: self.y as i32,
        }
    }
}

/// Everything the agent reads from the game on one turn. Walls are static and
/// live in the engine's [`WallGrid`] instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub pacman: GridPosition,
    pub legal_moves: Vec<Direction>,
    pub food: Vec<GridPosition>,
    pub capsules: Vec<GridPosition>,
    pub ghosts: Vec<GhostObservation>,
}

/// Accumulated score per cell for a single turn.
///
/// Every contribution adds to whatever is already stored for the cell, so the
/// order in which fields run never changes the final weights.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeightMap {
    weights: HashMap<GridPosition, i32>,
}

impl WeightMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, pos: GridPosition, amount: i32) {
        let weight = self.weights.entry(pos).or_insert(0);
        *weight = weight.saturating_add(amount);
    }

    /// Weight of `pos`; cells nothing touched weigh 0.
    pub fn get(&self, pos: GridPosition) -> i32 {
        self.weights.get(&pos).copied().unwrap_or(0)
    }

    pub fn contains(&self, pos: GridPosition) -> bool {
        self.weights.contains_key(&pos)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (GridPosition, i32)> + '_ {
        self.weights.iter().map(|(pos, w)| (*pos, *w))
    }
}

/// Shared inputs of the scoring fields for one turn.
#[derive(Debug, Clone, Copy)]
pub struct TurnContext<'a> {
    pub grid: &'a WallGrid,
    pub config: &'a AgentConfig,
    pub pacman: GridPosition,
    pub candidates: &'a [GridPosition],
}

impl TurnContext<'_> {
    /// The candidate closest to `target` by maze distance. Ties go to the
    /// earliest candidate.
    pub fn closest_candidate(&self, target: GridPosition) -> Option<GridPosition> {
        closest(self.grid, target, self.candidates.iter().copied())
    }
}

/// First of `options` with the smallest maze distance to `target`.
pub fn closest(
    grid: &WallGrid,
    target: GridPosition,
    options: impl IntoIterator<Item = GridPosition>,
) -> Option<GridPosition> {
    options
        .into_iter()
        .map(|pos| (pos, grid.distance(pos, target)))
        .min_by_key(|(_, dist)| *dist)
        .map(|(pos, _)| pos)
}

/// Straight-line Manhattan distance from a cell to a possibly fractional point.
pub fn manhattan(a: GridPosition, x: f32, y: f32) -> f32 {
    (a.x as f32 - x).abs() + (a.y as f32 - y).abs()
}

/// Shorthand used by the fields when a distance only matters if finite.
pub(crate) fn within(dist: Distance, limit: u32) -> bool {
    matches!(dist, Distance::Steps(n) if n <= limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_map_accumulates() {
        let mut weights = WeightMap::new();
        let cell = GridPosition::new(3, 4);
        weights.add(cell, -90);
        weights.add(cell, 5);
        weights.add(cell, 1);
        assert_eq!(weights.get(cell), -84);
        assert_eq!(weights.len(), 1);
    }

    #[test]
    fn untouched_cells_weigh_zero() {
        let weights = WeightMap::new();
        assert_eq!(weights.get(GridPosition::new(1, 1)), 0);
        assert!(!weights.contains(GridPosition::new(1, 1)));
    }

    #[test]
    fn ghost_cell_truncates() {
        let ghost = GhostObservation {
            x: 3.5,
            y: 2.9,
            edible_timer: 0,
        };
        assert_eq!(ghost.cell(), GridPosition::new(3, 2));
    }

    #[test]
    fn manhattan_handles_fractions() {
        let d = manhattan(GridPosition::new(1, 1), 3.5, 1.0);
        assert!((d - 2.5).abs() < f32::EPSILON);
    }

    #[test]
    fn closest_prefers_first_on_ties() {
        let grid = WallGrid::open(5, 5);
        let target = GridPosition::new(2, 2);
        let pick = closest(
            &grid,
            target,
            [GridPosition::new(2, 3), GridPosition::new(1, 2)],
        );
        assert_eq!(pick, Some(GridPosition::new(2, 3)));
    }
}
