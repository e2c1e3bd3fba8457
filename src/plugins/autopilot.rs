//! Pac-Man's turn: observe the board, ask the decision engine, move.

use bevy::prelude::*;
use micromegas_tracing::prelude::{fmetric, span_scope};

use crate::agent::{Decision, DecisionEngine, GhostObservation, Observation};
use crate::components::{Capsule, Direction, Food, Ghost, GridPosition, Pacman};
use crate::resources::GameStats;

/// The engine driving Pac-Man.
#[derive(Resource, Debug, Clone)]
pub struct Autopilot(pub DecisionEngine);

/// The most recent decision, kept for telemetry and tests.
#[derive(Resource, Debug, Default, Clone)]
pub struct LastDecision(pub Option<Decision>);

/// Build what the agent sees from the current world state.
pub fn observe(
    engine: &DecisionEngine,
    pacman: GridPosition,
    food: impl IntoIterator<Item = GridPosition>,
    capsules: impl IntoIterator<Item = GridPosition>,
    ghosts: impl IntoIterator<Item = (GridPosition, u32)>,
) -> Observation {
    let mut food: Vec<GridPosition> = food.into_iter().collect();
    let mut capsules: Vec<GridPosition> = capsules.into_iter().collect();
    // Query order depends on storage; sort so tie-breaks are reproducible.
    food.sort_by_key(|p| (p.y, p.x));
    capsules.sort_by_key(|p| (p.y, p.x));

    Observation {
        pacman,
        legal_moves: engine.grid().legal_moves(pacman),
        food,
        capsules,
        ghosts: ghosts
            .into_iter()
            .map(|(pos, timer)| GhostObservation::at(pos, timer))
            .collect(),
    }
}

#[allow(clippy::type_complexity)]
pub fn pacman_turn(
    autopilot: Res<Autopilot>,
    mut stats: ResMut<GameStats>,
    mut last: ResMut<LastDecision>,
    mut pacman: Query<&mut GridPosition, With<Pacman>>,
    food: Query<&GridPosition, (With<Food>, Without<Pacman>)>,
    capsules: Query<&GridPosition, (With<Capsule>, Without<Pacman>)>,
    ghosts: Query<(&GridPosition, &Ghost), Without<Pacman>>,
) {
    span_scope!("pacman_turn");
    let Ok(mut pos) = pacman.single_mut() else {
        return;
    };

    stats.turns += 1;
    stats.score -= 1;

    let obs = observe(
        &autopilot.0,
        *pos,
        food.iter().copied(),
        capsules.iter().copied(),
        ghosts.iter().map(|(p, g)| (*p, g.edible_timer)),
    );

    let decision = autopilot.0.evaluate(&obs);
    let direction = decision
        .as_ref()
        .map(|d| d.direction)
        .unwrap_or(Direction::Stop);

    if let Some(d) = &decision {
        fmetric!("chosen_weight", "weight", d.weight as f64);
    }
    *pos = pos.step(direction);
    last.0 = decision;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::distance::WallGrid;
    use crate::config::AgentConfig;

    fn setup_app(grid: WallGrid) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(Autopilot(DecisionEngine::new(grid, AgentConfig::default())));
        app.init_resource::<GameStats>();
        app.init_resource::<LastDecision>();
        app.add_systems(Update, pacman_turn);
        app
    }

    fn pacman_pos(app: &mut App) -> GridPosition {
        let mut query = app.world_mut().query_filtered::<&GridPosition, With<Pacman>>();
        *query.single(app.world()).unwrap()
    }

    #[test]
    fn observation_sorts_food_and_lists_legal_moves() {
        let engine = DecisionEngine::new(WallGrid::open(3, 3), AgentConfig::default());
        let obs = observe(
            &engine,
            GridPosition::new(0, 0),
            [GridPosition::new(2, 2), GridPosition::new(1, 0)],
            [],
            [(GridPosition::new(2, 0), 3)],
        );
        assert_eq!(obs.food, vec![GridPosition::new(1, 0), GridPosition::new(2, 2)]);
        assert_eq!(
            obs.legal_moves,
            vec![Direction::Up, Direction::Right, Direction::Stop]
        );
        assert_eq!(obs.ghosts[0].edible_timer, 3);
    }

    #[test]
    fn pacman_moves_toward_food() {
        let mut app = setup_app(WallGrid::open(5, 1));
        app.world_mut().spawn((Pacman, GridPosition::new(2, 0)));
        app.world_mut().spawn((Food, GridPosition::new(4, 0)));

        app.update();

        let pos = pacman_pos(&mut app);
        assert_eq!(pos, GridPosition::new(3, 0));

        let stats = app.world().resource::<GameStats>();
        assert_eq!(stats.turns, 1);
        assert_eq!(stats.score, -1);
        let last = app.world().resource::<LastDecision>();
        assert_eq!(last.0.as_ref().map(|d| d.direction), Some(Direction::Right));
    }

    #[test]
    fn boxed_in_pacman_stays() {
        let mut app = setup_app(WallGrid::open(1, 1));
        app.world_mut().spawn((Pacman, GridPosition::new(0, 0)));

        app.update();

        let pos = pacman_pos(&mut app);
        assert_eq!(pos, GridPosition::new(0, 0));
        assert!(app.world().resource::<LastDecision>().0.is_none());
    }
}
