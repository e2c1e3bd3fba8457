//! Per-game reports and session summaries.

use serde::{Deserialize, Serialize};

use crate::resources::{GameStats, Outcome};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameReport {
    pub seed: u64,
    pub outcome: Outcome,
    pub score: i64,
    pub turns: u32,
    pub food_eaten: u32,
    pub capsules_eaten: u32,
    pub ghosts_eaten: u32,
}

impl GameReport {
    /// Snapshot of a finished game. Undecided games count as timed out.
    pub fn from_stats(seed: u64, stats: &GameStats) -> Self {
        Self {
            seed,
            outcome: stats.outcome.unwrap_or(Outcome::TimedOut),
            score: stats.score,
            turns: stats.turns,
            food_eaten: stats.food_eaten,
            capsules_eaten: stats.capsules_eaten,
            ghosts_eaten: stats.ghosts_eaten,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub layout: String,
    pub max_turns: u32,
    pub games: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub avg_score: f64,
    pub avg_turns: f64,
    pub max_score: i64,
    /// Best score first.
    pub runs: Vec<GameReport>,
}

impl SessionSummary {
    pub fn new(layout: impl Into<String>, max_turns: u32, mut runs: Vec<GameReport>) -> Self {
        let games = runs.len();
        let wins = runs.iter().filter(|r| r.outcome == Outcome::Won).count();
        let sum_score: i64 = runs.iter().map(|r| r.score).sum();
        let sum_turns: u64 = runs.iter().map(|r| r.turns as u64).sum();
        let max_score = runs.iter().map(|r| r.score).max().unwrap_or(0);

        let per_game = |total: f64| {
            if games == 0 {
                0.0
            } else {
                total / games as f64
            }
        };

        runs.sort_by(|a, b| b.score.cmp(&a.score));

        Self {
            layout: layout.into(),
            max_turns,
            games,
            wins,
            win_rate: per_game(wins as f64),
            avg_score: per_game(sum_score as f64),
            avg_turns: per_game(sum_turns as f64),
            max_score,
            runs,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
