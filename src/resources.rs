use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Won,
    Lost,
    TimedOut,
}

/// Running tally of one game.
#[derive(Resource, Debug, Default, Clone)]
pub struct GameStats {
    pub score: i64,
    pub turns: u32,
    pub food_eaten: u32,
    pub capsules_eaten: u32,
    pub ghosts_eaten: u32,
    /// Set by the turn that decides the game.
    pub outcome: Option<Outcome>,
}

impl GameStats {
    pub fn finish(&mut self, outcome: Outcome, bonus: i64) {
        if self.outcome.is_none() {
            self.score += bonus;
            self.outcome = Some(outcome);
        }
    }

    pub fn is_decided(&self) -> bool {
        self.outcome.is_some()
    }
}

/// Seeded randomness for ghost movement, so a seed replays the same game.
#[derive(Resource, Debug)]
pub struct GhostRng(pub StdRng);

impl GhostRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
