//! Turn-level telemetry: score and progress metrics after every turn.

use bevy::prelude::*;
use micromegas_tracing::prelude::{fmetric, imetric, span_scope};

use crate::app_state::GamePhase;
use crate::resources::GameStats;

pub struct TelemetryPlugin;

impl Plugin for TelemetryPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Last, turn_telemetry.run_if(in_state(GamePhase::Playing)));
    }
}

fn turn_telemetry(stats: Res<GameStats>) {
    span_scope!("turn");
    fmetric!("score", "points", stats.score as f64);
    imetric!("food_eaten", "count", stats.food_eaten as u64);
}
