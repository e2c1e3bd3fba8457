//! Headless game runs: one game per seed, driven turn by turn.

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use micromegas_tracing::prelude::{fmetric, info};

use crate::PilotPlugin;
use crate::app_state::GamePhase;
use crate::config::AgentConfig;
use crate::plugins::layout::Layout;
use crate::report::{GameReport, SessionSummary};
use crate::resources::GameStats;

/// Build a headless app ready to play `layout`. Nothing has run yet; the
/// first `update` spawns the board and plays turn one.
pub fn build_app(layout: &Layout, config: &AgentConfig, seed: u64) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);
    app.add_plugins(PilotPlugin::new(layout.clone(), config.clone(), seed));
    app.finish();
    app.cleanup();
    app
}

/// Play one game to the end, or until `max_turns` turns have passed.
pub fn play_game(layout: &Layout, config: &AgentConfig, seed: u64, max_turns: u32) -> GameReport {
    let mut app = build_app(layout, config, seed);

    // One extra update lets a decided game reach its final phase.
    for turn in 0..=max_turns {
        if turn == max_turns && !is_decided(&app) {
            break;
        }
        let span = tracing::info_span!("turn", turn);
        span.in_scope(|| app.update());

        if phase(&app) != GamePhase::Playing {
            break;
        }
    }

    let report = GameReport::from_stats(seed, app.world().resource::<GameStats>());
    info!(
        "seed {} finished: {:?} score={} turns={}",
        seed, report.outcome, report.score, report.turns
    );
    report
}

/// Play `games` games with seeds `first_seed`, `first_seed + 1`, and so on.
pub fn play_session(
    name: &str,
    layout: &Layout,
    config: &AgentConfig,
    first_seed: u64,
    games: usize,
    max_turns: u32,
) -> SessionSummary {
    let runs = (0..games as u64)
        .map(|i| play_game(layout, config, first_seed.wrapping_add(i), max_turns))
        .collect();
    let summary = SessionSummary::new(name, max_turns, runs);
    fmetric!("session_win_rate", "ratio", summary.win_rate);
    summary
}

fn phase(app: &App) -> GamePhase {
    *app.world().resource::<State<GamePhase>>().get()
}

fn is_decided(app: &App) -> bool {
    app.world().resource::<GameStats>().is_decided()
}
