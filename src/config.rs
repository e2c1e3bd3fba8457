//! Agent tuning constants, fixed for the lifetime of a game.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::components::GridPosition;
use crate::error::ConfigError;

/// Weights and thresholds used by the scoring fields.
///
/// Every field has a default, so a JSON file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Score of a dangerous ghost's own cell.
    pub ghost_penalty: i32,
    /// Added back per step of distance from a dangerous ghost.
    pub ghost_penalty_decay: i32,
    /// How many steps a dangerous ghost's penalty spreads.
    pub threat_radius: u32,
    /// Ghosts with an edible timer above this are stealthy; at or below they
    /// count as dangerous.
    pub stealth_threshold: u32,
    /// Stealthy ghosts further than this (maze distance) are ignored.
    pub stealth_range: u32,
    pub stealth_bonus: i32,
    pub food_reward: i32,
    /// Multiplier for the last food when it is within `endgame_range`.
    pub endgame_multiplier: i32,
    pub endgame_range: u32,
    /// Boards this wide or narrower use the two-food anchor rule.
    pub small_board_width: i32,
    pub small_board_anchor: GridPosition,
    pub capsule_reward: i32,
    /// Capsules are skipped while any ghost is closer than this (Manhattan).
    pub capsule_clearance: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            ghost_penalty: -100,
            ghost_penalty_decay: 10,
            threat_radius: 5,
            stealth_threshold: 5,
            stealth_range: 8,
            stealth_bonus: 5,
            food_reward: 1,
            endgame_multiplier: 50,
            endgame_range: 2,
            small_board_width: 7,
            small_board_anchor: GridPosition { x: 1, y: 1 },
            capsule_reward: 3,
            capsule_clearance: 5,
        }
    }
}

impl AgentConfig {
    /// Penalty for a cell `depth` steps from a dangerous ghost.
    /// Saturates instead of wrapping on extreme values.
    pub fn threat_penalty(&self, depth: u32) -> i32 {
        let depth = i32::try_from(depth).unwrap_or(i32::MAX);
        self.ghost_penalty
            .saturating_add(depth.saturating_mul(self.ghost_penalty_decay))
    }

    /// Endgame reward for the last food, or `None` if it overflows.
    pub fn endgame_reward(&self) -> Option<i32> {
        self.food_reward.checked_mul(self.endgame_multiplier)
    }

    /// Reject configurations where the outermost threat ring is not a penalty,
    /// or where the endgame reward does not fit in a weight.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let edge = self.threat_penalty(self.threat_radius);
        if edge >= 0 {
            return Err(ConfigError::NonNegativeThreat {
                radius: self.threat_radius,
                score: edge,
            });
        }
        if self.endgame_reward().is_none() {
            return Err(ConfigError::EndgameOverflow {
                food_reward: self.food_reward,
                multiplier: self.endgame_multiplier,
            });
        }
        Ok(())
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
