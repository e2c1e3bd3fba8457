//! Errors raised while loading layouts and agent configuration.
//!
//! Turn-by-turn decision making never fails; only the inputs read once at
//! start-up can be rejected.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("empty layout")]
    Empty,

    #[error("layout has zero width")]
    ZeroWidth,

    #[error("unknown tile character '{ch}' at column {column}, line {line}")]
    UnknownTile { ch: char, column: usize, line: usize },

    #[error("no pacman spawn ('P') found in layout")]
    MissingPacman,

    #[error("multiple pacman spawns, second at column {column}, line {line}")]
    MultiplePacman { column: usize, line: usize },

    #[error("failed to read layout {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config json")]
    Parse(#[from] serde_json::Error),

    #[error(
        "threat ring at radius {radius} would score {score}; penalties must stay negative"
    )]
    NonNegativeThreat { radius: u32, score: i32 },

    #[error("endgame reward {food_reward} x {multiplier} overflows")]
    EndgameOverflow { food_reward: i32, multiplier: i32 },
}
