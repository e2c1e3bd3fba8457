use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, States)]
pub enum GamePhase {
    #[default]
    Playing,
    Won,
    Lost,
}
