pub mod agent;
pub mod app_state;
pub mod components;
pub mod config;
pub mod error;
pub mod plugins;
pub mod report;
pub mod resources;
pub mod session;
pub mod tracing_bridge;

use bevy::prelude::*;
use micromegas_tracing::prelude::{debug, span_fn, span_scope};

use agent::DecisionEngine;
use app_state::GamePhase;
use config::AgentConfig;
use plugins::autopilot::{Autopilot, LastDecision, pacman_turn};
use plugins::layout::{Layout, spawn_board};
use plugins::simulation::{
    announce_result, eat_pellets, finish_turn, ghost_turn, resolve_collisions, tick_ghost_timers,
};
use plugins::telemetry::TelemetryPlugin;
use resources::{GameStats, GhostRng};

/// Plays one game on `layout` with the decision engine at the wheel. Every
/// `App::update` is one turn.
///
/// Add `StatesPlugin` first when building on `MinimalPlugins`.
pub struct PilotPlugin {
    pub layout: Layout,
    pub config: AgentConfig,
    pub seed: u64,
}

impl PilotPlugin {
    pub fn new(layout: Layout, config: AgentConfig, seed: u64) -> Self {
        Self {
            layout,
            config,
            seed,
        }
    }
}

impl Plugin for PilotPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GamePhase>();

        let engine = DecisionEngine::new(self.layout.walls.clone(), self.config.clone());
        app.insert_resource(self.layout.clone());
        app.insert_resource(Autopilot(engine));
        app.insert_resource(GhostRng::seeded(self.seed));
        app.init_resource::<GameStats>();
        app.init_resource::<LastDecision>();

        app.add_plugins(TelemetryPlugin);

        app.add_systems(Startup, (spawn_board, log_start).chain());
        app.add_systems(
            Update,
            (
                pacman_turn,
                eat_pellets,
                resolve_collisions,
                ghost_turn,
                resolve_collisions,
                tick_ghost_timers,
                finish_turn,
            )
                .chain()
                .run_if(in_state(GamePhase::Playing)),
        );
        app.add_systems(OnEnter(GamePhase::Won), announce_result);
        app.add_systems(OnEnter(GamePhase::Lost), announce_result);
    }
}

#[span_fn]
fn log_start(autopilot: Res<Autopilot>) {
    let grid = autopilot.0.grid();
    debug!("autopilot engaged on {}x{} board", grid.width(), grid.height());
}
