//! Per-turn orchestration: candidates, scoring fields, arg-max.

use micromegas_tracing::prelude::*;
use serde::Serialize;

use super::distance::WallGrid;
use super::{Observation, TurnContext, WeightMap, reward, threat};
use crate::components::{Direction, GridPosition};
use crate::config::AgentConfig;

/// A candidate move and the weight its destination ended up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoredMove {
    pub direction: Direction,
    pub position: GridPosition,
    pub weight: i32,
}

/// Outcome of one turn's evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub direction: Direction,
    pub position: GridPosition,
    pub weight: i32,
    /// Every candidate in enumeration order.
    pub scored: Vec<ScoredMove>,
}

/// Greedy one-step decision maker over a fixed board.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    grid: WallGrid,
    config: AgentConfig,
}

impl DecisionEngine {
    pub fn new(grid: WallGrid, config: AgentConfig) -> Self {
        Self { grid, config }
    }

    pub fn grid(&self) -> &WallGrid {
        &self.grid
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// The move to commit this turn, or `None` when no move other than
    /// `Stop` is legal.
    pub fn choose_move(&self, obs: &Observation) -> Option<Direction> {
        self.evaluate(obs).map(|decision| decision.direction)
    }

    /// Score every candidate and pick the heaviest. Ties go to the candidate
    /// enumerated first.
    #[span_fn]
    pub fn evaluate(&self, obs: &Observation) -> Option<Decision> {
        let moves = candidate_moves(obs);
        if moves.is_empty() {
            warn!("no legal move besides stop at {:?}", obs.pacman);
            return None;
        }
        let candidates: Vec<GridPosition> = moves.iter().map(|(_, pos)| *pos).collect();

        let weights = self.weigh(obs, &candidates);

        let scored: Vec<ScoredMove> = moves
            .iter()
            .map(|(direction, position)| ScoredMove {
                direction: *direction,
                position: *position,
                weight: weights.get(*position),
            })
            .collect();

        let mut best = scored[0];
        for entry in &scored[1..] {
            if entry.weight > best.weight {
                best = *entry;
            }
        }

        imetric!("decision_candidates", "count", scored.len() as u64);
        debug!(
            "decision: {:?} -> {:?} weight={} of {}",
            obs.pacman,
            best.direction,
            best.weight,
            scored.len()
        );

        Some(Decision {
            direction: best.direction,
            position: best.position,
            weight: best.weight,
            scored,
        })
    }

    /// Run the threat field and then the reward field over a fresh map.
    pub fn weigh(&self, obs: &Observation, candidates: &[GridPosition]) -> WeightMap {
        let ctx = TurnContext {
            grid: &self.grid,
            config: &self.config,
            pacman: obs.pacman,
            candidates,
        };
        let mut weights = WeightMap::new();
        threat::apply(&ctx, &obs.ghosts, &mut weights);
        reward::apply(&ctx, &obs.food, &obs.capsules, &obs.ghosts, &mut weights);
        weights
    }
}

/// Legal moves other than `Stop`, paired with the cell each one reaches.
pub fn candidate_moves(obs: &Observation) -> Vec<(Direction, GridPosition)> {
    obs.legal_moves
        .iter()
        .filter(|dir| **dir != Direction::Stop)
        .map(|dir| (*dir, obs.pacman.step(*dir)))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
