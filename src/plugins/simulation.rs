//! Game rules for the headless harness: pellets, ghosts, collisions and the
//! end of the game.

use bevy::prelude::*;
use micromegas_tracing::prelude::{debug, imetric, info, span_fn, span_scope};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::agent::distance::WallGrid;
use crate::app_state::GamePhase;
use crate::components::{Capsule, Direction, Food, Ghost, GridPosition, Heading, Pacman, SpawnPosition};
use crate::plugins::layout::Layout;
use crate::resources::{GameStats, GhostRng, Outcome};

pub const FOOD_SCORE: i64 = 10;
pub const GHOST_SCORE: i64 = 200;
pub const WIN_BONUS: i64 = 500;
pub const LOSE_PENALTY: i64 = -500;
/// Edible turns granted by a capsule.
pub const SCARED_TURNS: u32 = 40;

// ---------------------------------------------------------------------------
// Ghost movement
// ---------------------------------------------------------------------------

fn open_moves(walls: &WallGrid, pos: GridPosition) -> Vec<Direction> {
    Direction::CARDINAL
        .into_iter()
        .filter(|dir| walls.is_open(pos.step(*dir)))
        .collect()
}

/// For edible ghosts: the move that ends furthest from Pac-Man.
pub fn flee_direction(walls: &WallGrid, ghost: GridPosition, pacman: GridPosition) -> Direction {
    let mut best = Direction::Stop;
    let mut best_dist = -1;
    for dir in open_moves(walls, ghost) {
        let next = ghost.step(dir);
        let dist = (next.x - pacman.x).abs() + (next.y - pacman.y).abs();
        if dist > best_dist {
            best = dir;
            best_dist = dist;
        }
    }
    best
}

/// For dangerous ghosts: a random legal move that does not turn back, unless
/// turning back is the only way out.
pub fn wander_direction<R: Rng>(
    walls: &WallGrid,
    ghost: GridPosition,
    heading: Direction,
    rng: &mut R,
) -> Direction {
    let legal = open_moves(walls, ghost);
    let forward: Vec<Direction> = legal
        .iter()
        .copied()
        .filter(|dir| heading == Direction::Stop || *dir != heading.opposite())
        .collect();
    let options = if forward.is_empty() { &legal } else { &forward };
    options.choose(rng).copied().unwrap_or(Direction::Stop)
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Eat whatever sits under Pac-Man.
pub fn eat_pellets(
    mut commands: Commands,
    mut stats: ResMut<GameStats>,
    pacman: Query<&GridPosition, With<Pacman>>,
    food: Query<(Entity, &GridPosition), (With<Food>, Without<Pacman>)>,
    capsules: Query<(Entity, &GridPosition), (With<Capsule>, Without<Pacman>)>,
    mut ghosts: Query<&mut Ghost>,
) {
    if stats.is_decided() {
        return;
    }
    let Ok(pos) = pacman.single() else {
        return;
    };

    let mut remaining = 0;
    for (entity, food_pos) in &food {
        if food_pos == pos {
            commands.entity(entity).despawn();
            stats.score += FOOD_SCORE;
            stats.food_eaten += 1;
        } else {
            remaining += 1;
        }
    }

    for (entity, capsule_pos) in &capsules {
        if capsule_pos == pos {
            commands.entity(entity).despawn();
            stats.capsules_eaten += 1;
            for mut ghost in &mut ghosts {
                ghost.edible_timer = SCARED_TURNS;
            }
            debug!("capsule eaten at {:?}", pos);
        }
    }

    if remaining == 0 {
        stats.finish(Outcome::Won, WIN_BONUS);
    }
}

/// Settle every ghost sharing Pac-Man's cell. Runs after each side moves.
pub fn resolve_collisions(
    mut stats: ResMut<GameStats>,
    pacman: Query<&GridPosition, (With<Pacman>, Without<Ghost>)>,
    mut ghosts: Query<
        (&mut GridPosition, &mut Ghost, &mut Heading, &SpawnPosition),
        Without<Pacman>,
    >,
) {
    if stats.is_decided() {
        return;
    }
    let Ok(pacman_pos) = pacman.single() else {
        return;
    };

    for (mut pos, mut ghost, mut heading, spawn) in &mut ghosts {
        if *pos != *pacman_pos {
            continue;
        }
        if ghost.edible_timer > 0 {
            stats.score += GHOST_SCORE;
            stats.ghosts_eaten += 1;
            *pos = spawn.0;
            ghost.edible_timer = 0;
            heading.0 = Direction::Stop;
            debug!("ghost eaten at {:?}", pacman_pos);
        } else {
            stats.finish(Outcome::Lost, LOSE_PENALTY);
            return;
        }
    }
}

pub fn ghost_turn(
    layout: Res<Layout>,
    stats: Res<GameStats>,
    mut rng: ResMut<GhostRng>,
    pacman: Query<&GridPosition, (With<Pacman>, Without<Ghost>)>,
    mut ghosts: Query<(&mut GridPosition, &mut Heading, &Ghost), Without<Pacman>>,
) {
    if stats.is_decided() {
        return;
    }
    let Ok(pacman_pos) = pacman.single() else {
        return;
    };

    for (mut pos, mut heading, ghost) in &mut ghosts {
        let dir = if ghost.edible_timer > 0 {
            flee_direction(&layout.walls, *pos, *pacman_pos)
        } else {
            wander_direction(&layout.walls, *pos, heading.0, &mut rng.0)
        };
        *pos = pos.step(dir);
        heading.0 = dir;
    }
}

pub fn tick_ghost_timers(stats: Res<GameStats>, mut ghosts: Query<&mut Ghost>) {
    if stats.is_decided() {
        return;
    }
    for mut ghost in &mut ghosts {
        ghost.edible_timer = ghost.edible_timer.saturating_sub(1);
    }
}

/// Leave `Playing` once the turn has decided the game.
pub fn finish_turn(stats: Res<GameStats>, mut next_phase: ResMut<NextState<GamePhase>>) {
    match stats.outcome {
        Some(Outcome::Won) => next_phase.set(GamePhase::Won),
        Some(Outcome::Lost) => next_phase.set(GamePhase::Lost),
        _ => {}
    }
}

#[span_fn]
pub fn announce_result(stats: Res<GameStats>, phase: Res<State<GamePhase>>) {
    info!(
        "game over: {:?} score={} turns={} food={} ghosts={}",
        phase.get(),
        stats.score,
        stats.turns,
        stats.food_eaten,
        stats.ghosts_eaten
    );
    imetric!("game_turns", "count", stats.turns as u64);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
