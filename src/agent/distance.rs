//! Wall-aware shortest paths on the static board.
//!
//! Every traversal goes through [`WallGrid::flood`], a breadth-first expansion
//! over 4-connected open cells with an optional depth bound. Point-to-point
//! [`WallGrid::distance`] is the same flood stopped at the target.

use std::collections::HashSet;

use pathfinding::prelude::dijkstra_reach;

use crate::components::{Direction, GridPosition};

/// Length of the shortest wall-free path between two cells.
///
/// `Unreachable` orders after every finite distance, so it loses any
/// "closest" comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Distance {
    Steps(u32),
    Unreachable,
}

impl Distance {
    pub fn steps(self) -> Option<u32> {
        match self {
            Distance::Steps(n) => Some(n),
            Distance::Unreachable => None,
        }
    }

    pub fn is_finite(self) -> bool {
        matches!(self, Distance::Steps(_))
    }
}

/// Board dimensions and wall cells, fixed for the whole game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallGrid {
    width: i32,
    height: i32,
    walls: HashSet<GridPosition>,
}

impl WallGrid {
    pub fn new(width: i32, height: i32, walls: impl IntoIterator<Item = GridPosition>) -> Self {
        Self {
            width,
            height,
            walls: walls.into_iter().collect(),
        }
    }

    /// A board with no walls at all.
    pub fn open(width: i32, height: i32) -> Self {
        Self::new(width, height, [])
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn is_wall(&self, pos: GridPosition) -> bool {
        self.walls.contains(&pos)
    }

    pub fn in_bounds(&self, pos: GridPosition) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// In bounds and not a wall.
    pub fn is_open(&self, pos: GridPosition) -> bool {
        self.in_bounds(pos) && !self.is_wall(pos)
    }

    /// Open 4-connected neighbours of `pos`.
    pub fn neighbors(&self, pos: GridPosition) -> impl Iterator<Item = GridPosition> + '_ {
        Direction::CARDINAL
            .into_iter()
            .map(move |dir| pos.step(dir))
            .filter(move |next| self.is_open(*next))
    }

    /// Moves available from `pos`: every cardinal direction into an open cell,
    /// followed by `Stop`.
    pub fn legal_moves(&self, pos: GridPosition) -> Vec<Direction> {
        Direction::CARDINAL
            .into_iter()
            .filter(|dir| self.is_open(pos.step(*dir)))
            .chain(std::iter::once(Direction::Stop))
            .collect()
    }

    /// Breadth-first expansion from `source`, yielding each reachable cell once
    /// with its depth. The source comes first at depth 0 and depths never
    /// decrease. With `max_depth` set, cells deeper than the bound are not
    /// produced.
    ///
    /// The source itself is not checked against walls or bounds.
    pub fn flood(
        &self,
        source: GridPosition,
        max_depth: Option<u32>,
    ) -> impl Iterator<Item = (GridPosition, u32)> + '_ {
        let limit = max_depth.unwrap_or(u32::MAX);
        let rest = dijkstra_reach(&source, move |pos: &GridPosition| {
            self.neighbors(*pos).map(|next| (next, 1u32))
        })
        .filter(move |item| item.node != source)
        .map(|item| (item.node, item.total_cost))
        .take_while(move |(_, depth)| *depth <= limit);

        std::iter::once((source, 0)).chain(rest)
    }

    /// Shortest path length from `from` to `to` avoiding walls.
    pub fn distance(&self, from: GridPosition, to: GridPosition) -> Distance {
        if from == to {
            return Distance::Steps(0);
        }
        self.flood(from, None)
            .find(|(pos, _)| *pos == to)
            .map_or(Distance::Unreachable, |(_, depth)| Distance::Steps(depth))
    }
}
