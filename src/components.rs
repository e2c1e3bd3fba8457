use bevy::prelude::*;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Grid and spatial
// ---------------------------------------------------------------------------

/// A cell on the board. `y` grows upward, so `(1, 1)` is the bottom-left
/// playable corner of a walled layout.
#[derive(
    Component,
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The cell reached by taking `dir` from here.
    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Cardinal moves plus the stay-in-place pseudo-move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    Stop,
}

impl Direction {
    /// The four moving directions, in the order legal moves are enumerated.
    pub const CARDINAL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Grid offset for this direction.
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Stop => (0, 0),
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Stop => Direction::Stop,
        }
    }
}

// ---------------------------------------------------------------------------
// Entity markers
// ---------------------------------------------------------------------------

#[derive(Component, Debug)]
pub struct Pacman;

/// A ghost and its edible timer in turns (0 = dangerous).
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Ghost {
    pub edible_timer: u32,
}

/// Last direction a ghost moved, used to avoid reversing.
#[derive(Component, Debug, Clone, Copy)]
pub struct Heading(pub Direction);

#[derive(Component, Debug)]
pub struct Food;

#[derive(Component, Debug)]
pub struct Capsule;

/// Spawn position for respawning after being eaten.
#[derive(Component, Debug, Clone, Copy)]
pub struct SpawnPosition(pub GridPosition);
