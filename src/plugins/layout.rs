//! Layout loading and board spawning.
//!
//! Parses classic Pac-Man layout files into a [`Layout`] resource and spawns
//! the headless board entities from it.

use std::fs;
use std::path::Path;

use bevy::prelude::*;
use micromegas_tracing::prelude::{info, span_scope};

use crate::agent::distance::WallGrid;
use crate::components::{Capsule, Direction, Food, Ghost, GridPosition, Heading, Pacman, SpawnPosition};
use crate::error::LayoutError;

// ---------------------------------------------------------------------------
// Tile types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileType {
    Wall,
    Floor,
    Food,
    Capsule,
    PacmanSpawn,
    GhostSpawn,
}

impl TileType {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '%' => Some(TileType::Wall),
            '.' => Some(TileType::Food),
            'o' => Some(TileType::Capsule),
            ' ' => Some(TileType::Floor),
            'P' => Some(TileType::PacmanSpawn),
            'G' => Some(TileType::GhostSpawn),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Layout resource
// ---------------------------------------------------------------------------

/// A parsed board: walls plus the starting positions of everything on it.
#[derive(Resource, Debug, Clone)]
pub struct Layout {
    pub walls: WallGrid,
    pub pacman_spawn: GridPosition,
    pub ghost_spawns: Vec<GridPosition>,
    pub food: Vec<GridPosition>,
    pub capsules: Vec<GridPosition>,
}

impl Layout {
    /// Parse layout text. The first line is the top row of the board.
    pub fn parse(text: &str) -> Result<Self, LayoutError> {
        // Blank lines around the board are dropped; blank rows inside it are floor.
        let mut lines: Vec<&str> = text
            .lines()
            .skip_while(|l| l.trim().is_empty())
            .collect();
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }
        if lines.is_empty() {
            return Err(LayoutError::Empty);
        }

        let height = lines.len();
        let width = lines.iter().map(|l| l.trim_end().chars().count()).max().unwrap_or(0);
        if width == 0 {
            return Err(LayoutError::ZeroWidth);
        }

        let mut walls = Vec::new();
        let mut pacman_spawn = None;
        let mut ghost_spawns = Vec::new();
        let mut food = Vec::new();
        let mut capsules = Vec::new();

        for (line, text) in lines.iter().enumerate() {
            // Short rows are padded with floor, which needs no entry.
            for (column, ch) in text.trim_end().chars().enumerate() {
                let tile = TileType::from_char(ch).ok_or(LayoutError::UnknownTile {
                    ch,
                    column,
                    line,
                })?;

                let pos = GridPosition {
                    x: column as i32,
                    y: (height - 1 - line) as i32,
                };

                match tile {
                    TileType::Wall => walls.push(pos),
                    TileType::Food => food.push(pos),
                    TileType::Capsule => capsules.push(pos),
                    TileType::PacmanSpawn => {
                        if pacman_spawn.is_some() {
                            return Err(LayoutError::MultiplePacman { column, line });
                        }
                        pacman_spawn = Some(pos);
                    }
                    TileType::GhostSpawn => ghost_spawns.push(pos),
                    TileType::Floor => {}
                }
            }
        }

        let pacman_spawn = pacman_spawn.ok_or(LayoutError::MissingPacman)?;

        // Bottom row first, left to right.
        food.sort_by_key(|p| (p.y, p.x));
        capsules.sort_by_key(|p| (p.y, p.x));

        Ok(Layout {
            walls: WallGrid::new(width as i32, height as i32, walls),
            pacman_spawn,
            ghost_spawns,
            food,
            capsules,
        })
    }

    pub fn load(path: &Path) -> Result<Self, LayoutError> {
        let text = fs::read_to_string(path).map_err(|source| LayoutError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn width(&self) -> i32 {
        self.walls.width()
    }

    pub fn height(&self) -> i32 {
        self.walls.height()
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Spawn Pac-Man, ghosts, food and capsules from the layout.
pub fn spawn_board(mut commands: Commands, layout: Res<Layout>) {
    span_scope!("spawn_board");

    commands.spawn((Pacman, layout.pacman_spawn));

    for spawn in &layout.ghost_spawns {
        commands.spawn((
            Ghost::default(),
            *spawn,
            SpawnPosition(*spawn),
            Heading(Direction::Stop),
        ));
    }
    for pos in &layout.food {
        commands.spawn((Food, *pos));
    }
    for pos in &layout.capsules {
        commands.spawn((Capsule, *pos));
    }

    info!(
        "board spawned: {}x{} food={} capsules={} ghosts={}",
        layout.width(),
        layout.height(),
        layout.food.len(),
        layout.capsules.len(),
        layout.ghost_spawns.len()
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_LAYOUT: &str = "\
%%%%%
%P.o%
%G  %
%%%%%";

    #[test]
    fn parse_small_layout() {
        let layout = Layout::parse(TEST_LAYOUT).unwrap();
        assert_eq!(layout.width(), 5);
        assert_eq!(layout.height(), 4);
        // Top text row is y = 3, so the second line is y = 2.
        assert_eq!(layout.pacman_spawn, GridPosition { x: 1, y: 2 });
        assert_eq!(layout.ghost_spawns, vec![GridPosition { x: 1, y: 1 }]);
        assert_eq!(layout.food, vec![GridPosition { x: 2, y: 2 }]);
        assert_eq!(layout.capsules, vec![GridPosition { x: 3, y: 2 }]);
    }

    #[test]
    fn walls_are_closed() {
        let layout = Layout::parse(TEST_LAYOUT).unwrap();
        assert!(layout.walls.is_wall(GridPosition { x: 0, y: 0 }));
        assert!(layout.walls.is_wall(GridPosition { x: 4, y: 3 }));
        assert!(!layout.walls.is_wall(GridPosition { x: 2, y: 1 }));
        assert!(!layout.walls.is_open(GridPosition { x: -1, y: 0 }));
        assert!(layout.walls.is_open(GridPosition { x: 3, y: 1 }));
    }

    #[test]
    fn short_rows_are_floor() {
        let layout = Layout::parse("%%%%\n%P\n%%%%").unwrap();
        assert_eq!(layout.width(), 4);
        assert!(layout.walls.is_open(GridPosition { x: 3, y: 1 }));
    }

    #[test]
    fn blank_interior_row_is_floor() {
        let layout = Layout::parse("%%%%\n%P.%\n    \n%%%%\n\n").unwrap();
        assert_eq!(layout.height(), 4);
        assert_eq!(layout.pacman_spawn, GridPosition { x: 1, y: 2 });
        assert!(layout.walls.is_open(GridPosition { x: 1, y: 1 }));
        assert!(!layout.walls.is_open(GridPosition { x: 1, y: 0 }));
    }

    #[test]
    fn food_sorted_bottom_up() {
        let layout = Layout::parse("%%%%\n%..%\n%P.%\n%%%%").unwrap();
        assert_eq!(
            layout.food,
            vec![
                GridPosition { x: 2, y: 1 },
                GridPosition { x: 1, y: 2 },
                GridPosition { x: 2, y: 2 },
            ]
        );
    }

    #[test]
    fn malformed_layout_no_pacman() {
        let result = Layout::parse("%%%%\n%..%\n%%%%");
        assert!(matches!(result, Err(LayoutError::MissingPacman)));
    }

    #[test]
    fn malformed_layout_bad_char() {
        let result = Layout::parse("%%%%\n%P?%\n%%%%");
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            LayoutError::UnknownTile {
                ch: '?',
                column: 2,
                line: 1
            }
        ));
        assert!(err.to_string().contains("unknown tile character"));
    }

    #[test]
    fn malformed_layout_duplicate_pacman() {
        let result = Layout::parse("%%%%\n%PP%\n%%%%");
        assert!(matches!(
            result,
            Err(LayoutError::MultiplePacman { column: 2, line: 1 })
        ));
    }

    #[test]
    fn empty_layout() {
        assert!(matches!(Layout::parse("\n\n"), Err(LayoutError::Empty)));
    }

    #[test]
    fn parse_bundled_layouts() {
        for name in ["small_grid", "medium_maze"] {
            let path = format!("assets/layouts/{name}.lay");
            let layout = Layout::load(Path::new(&path))
                .unwrap_or_else(|e| panic!("Failed to load {path}: {e}"));
            assert!(!layout.food.is_empty(), "{name} has no food");
            assert!(!layout.ghost_spawns.is_empty(), "{name} has no ghosts");
        }
    }

    #[test]
    fn small_grid_uses_small_board_rules() {
        let layout = Layout::load(Path::new("assets/layouts/small_grid.lay")).unwrap();
        assert!(layout.width() <= 7);
        assert!(layout.walls.is_open(GridPosition { x: 1, y: 1 }));
    }
}
