//! Food and capsule rewards.

use micromegas_tracing::prelude::*;

use super::{GhostObservation, TurnContext, WeightMap, closest, manhattan, within};
use crate::components::GridPosition;

/// Apply the food and capsule contributions to `weights`.
#[span_fn]
pub fn apply(
    ctx: &TurnContext<'_>,
    food: &[GridPosition],
    capsules: &[GridPosition],
    ghosts: &[GhostObservation],
    weights: &mut WeightMap,
) {
    food_reward(ctx, food, weights);
    capsule_reward(ctx, capsules, ghosts, weights);
}

/// Steer toward the nearest food.
///
/// On small boards with two foods left, the candidate nearest the anchor
/// corner is rewarded instead, which stops Pac-Man oscillating between two
/// equally distant goals. The very last food gets a large multiplier once it
/// is within reach.
pub fn food_reward(ctx: &TurnContext<'_>, food: &[GridPosition], weights: &mut WeightMap) {
    if food.is_empty() {
        return;
    }

    let config = ctx.config;
    if ctx.grid.width() <= config.small_board_width && food.len() == 2 {
        if let Some(target) = ctx.closest_candidate(config.small_board_anchor) {
            weights.add(target, config.food_reward);
        }
        return;
    }

    let Some(nearest) = closest(ctx.grid, ctx.pacman, food.iter().copied()) else {
        return;
    };
    let Some(target) = ctx.closest_candidate(nearest) else {
        return;
    };

    let last_in_reach =
        food.len() == 1 && within(ctx.grid.distance(ctx.pacman, nearest), config.endgame_range);
    let reward = if last_in_reach {
        config.food_reward.saturating_mul(config.endgame_multiplier)
    } else {
        config.food_reward
    };
    weights.add(target, reward);
}

/// Steer toward the nearest capsule, unless it would be wasted or the detour
/// is too risky.
pub fn capsule_reward(
    ctx: &TurnContext<'_>,
    capsules: &[GridPosition],
    ghosts: &[GhostObservation],
    weights: &mut WeightMap,
) {
    if !capsule_worthwhile(ctx, capsules, ghosts) {
        return;
    }

    let Some(nearest) = closest(ctx.grid, ctx.pacman, capsules.iter().copied()) else {
        return;
    };
    if let Some(target) = ctx.closest_candidate(nearest) {
        weights.add(target, ctx.config.capsule_reward);
    }
}

/// Capsules are only worth chasing when one is left, no ghost is already
/// edible and no ghost is within `capsule_clearance` in a straight line.
pub fn capsule_worthwhile(
    ctx: &TurnContext<'_>,
    capsules: &[GridPosition],
    ghosts: &[GhostObservation],
) -> bool {
    if capsules.is_empty() {
        return false;
    }
    if ghosts.iter().any(|ghost| ghost.edible_timer > 0) {
        return false;
    }
    let clearance = ctx.config.capsule_clearance as f32;
    !ghosts
        .iter()
        .any(|ghost| manhattan(ctx.pacman, ghost.x, ghost.y) < clearance)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::distance::WallGrid;
    use crate::config::AgentConfig;

    fn p(x: i32, y: i32) -> GridPosition {
        GridPosition::new(x, y)
    }

    fn ctx<'a>(
        grid: &'a WallGrid,
        config: &'a AgentConfig,
        pacman: GridPosition,
        candidates: &'a [GridPosition],
    ) -> TurnContext<'a> {
        TurnContext {
            grid,
            config,
            pacman,
            candidates,
        }
    }

    #[test]
    fn nearest_food_rewards_closest_candidate() {
        let grid = WallGrid::open(10, 10);
        let config = AgentConfig::default();
        let candidates = [p(4, 5), p(6, 5), p(5, 6), p(5, 4)];
        let ctx = ctx(&grid, &config, p(5, 5), &candidates);
        let mut weights = WeightMap::new();

        food_reward(&ctx, &[p(9, 9), p(5, 1), p(0, 5)], &mut weights);

        // (5,1) is 4 away; (0,5) is 5 away; (9,9) is 8 away.
        assert_eq!(weights.get(p(5, 4)), 1);
        assert_eq!(weights.len(), 1);
    }

    #[test]
    fn nearest_food_measured_from_pacman_not_candidates() {
        // Wall between Pac-Man and the food directly to the right.
        let grid = WallGrid::new(10, 3, [p(5, 1), p(5, 0)]);
        let config = AgentConfig::default();
        let candidates = [p(3, 1), p(4, 2), p(4, 0)];
        let ctx = ctx(&grid, &config, p(4, 1), &candidates);
        let mut weights = WeightMap::new();

        food_reward(&ctx, &[p(6, 1), p(0, 1)], &mut weights);

        // (6,1) needs 4 steps around the wall, (0,1) needs 4 as well; first wins.
        assert_eq!(weights.get(p(4, 2)), 1);
    }

    #[test]
    fn last_food_in_reach_gets_multiplier() {
        let grid = WallGrid::open(10, 10);
        let config = AgentConfig::default();
        let candidates = [p(4, 5), p(6, 5)];
        let ctx = ctx(&grid, &config, p(5, 5), &candidates);
        let mut weights = WeightMap::new();

        food_reward(&ctx, &[p(7, 5)], &mut weights);

        assert_eq!(weights.get(p(6, 5)), 50 * config.food_reward);
        assert_eq!(weights.get(p(4, 5)), 0);
    }

    #[test]
    fn last_food_out_of_reach_gets_base_reward() {
        let grid = WallGrid::open(10, 10);
        let config = AgentConfig::default();
        let candidates = [p(4, 5), p(6, 5)];
        let ctx = ctx(&grid, &config, p(5, 5), &candidates);
        let mut weights = WeightMap::new();

        food_reward(&ctx, &[p(8, 5)], &mut weights);

        assert_eq!(weights.get(p(6, 5)), config.food_reward);
    }

    #[test]
    fn unvalidated_endgame_reward_saturates() {
        let grid = WallGrid::open(10, 10);
        let config = AgentConfig {
            food_reward: i32::MAX / 2,
            ..AgentConfig::default()
        };
        let candidates = [p(4, 5), p(6, 5)];
        let ctx = ctx(&grid, &config, p(5, 5), &candidates);
        let mut weights = WeightMap::new();

        food_reward(&ctx, &[p(7, 5)], &mut weights);
        weights.add(p(6, 5), i32::MAX);

        assert_eq!(weights.get(p(6, 5)), i32::MAX);
    }

    #[test]
    fn small_board_with_two_foods_heads_for_anchor() {
        let grid = WallGrid::open(7, 7);
        let config = AgentConfig::default();
        let candidates = [p(3, 4), p(3, 2), p(4, 3), p(2, 3)];
        let ctx = ctx(&grid, &config, p(3, 3), &candidates);
        let mut weights = WeightMap::new();

        // Both foods sit at the top right, yet the anchor (1,1) wins.
        food_reward(&ctx, &[p(4, 4), p(5, 5)], &mut weights);

        assert_eq!(weights.get(p(3, 2)), 1);
        assert_eq!(weights.len(), 1);
    }

    #[test]
    fn wide_board_ignores_anchor_rule() {
        let grid = WallGrid::open(8, 7);
        let config = AgentConfig::default();
        let candidates = [p(3, 4), p(3, 2)];
        let ctx = ctx(&grid, &config, p(3, 3), &candidates);
        let mut weights = WeightMap::new();

        food_reward(&ctx, &[p(3, 6), p(7, 6)], &mut weights);

        assert_eq!(weights.get(p(3, 4)), 1);
        assert_eq!(weights.get(p(3, 2)), 0);
    }

    #[test]
    fn no_food_no_reward() {
        let grid = WallGrid::open(5, 5);
        let config = AgentConfig::default();
        let candidates = [p(1, 2)];
        let ctx = ctx(&grid, &config, p(2, 2), &candidates);
        let mut weights = WeightMap::new();

        food_reward(&ctx, &[], &mut weights);
        assert!(weights.is_empty());
    }

    #[test]
    fn capsule_rewards_closest_candidate() {
        let grid = WallGrid::open(12, 12);
        let config = AgentConfig::default();
        let candidates = [p(4, 5), p(6, 5)];
        let ctx = ctx(&grid, &config, p(5, 5), &candidates);
        let mut weights = WeightMap::new();

        let ghosts = [GhostObservation::at(p(11, 11), 0)];
        capsule_reward(&ctx, &[p(1, 5)], &ghosts, &mut weights);

        assert_eq!(weights.get(p(4, 5)), config.capsule_reward);
    }

    #[test]
    fn capsule_skipped_while_ghost_edible() {
        let grid = WallGrid::open(12, 12);
        let config = AgentConfig::default();
        let candidates = [p(4, 5), p(6, 5)];
        let ctx = ctx(&grid, &config, p(5, 5), &candidates);
        let mut weights = WeightMap::new();

        let ghosts = [GhostObservation::at(p(11, 11), 3)];
        capsule_reward(&ctx, &[p(1, 5)], &ghosts, &mut weights);

        assert!(weights.is_empty());
    }

    #[test]
    fn capsule_skipped_when_ghost_close() {
        let grid = WallGrid::open(12, 12);
        let config = AgentConfig::default();
        let candidates = [p(4, 5), p(6, 5)];
        let ctx = ctx(&grid, &config, p(5, 5), &candidates);

        // Manhattan 4 is inside the clearance, 5 is not.
        let near = [GhostObservation::at(p(7, 7), 0)];
        assert!(!capsule_worthwhile(&ctx, &[p(1, 5)], &near));
        let edge = [GhostObservation::at(p(8, 7), 0)];
        assert!(capsule_worthwhile(&ctx, &[p(1, 5)], &edge));
    }

    #[test]
    fn capsule_skipped_when_none_left() {
        let grid = WallGrid::open(5, 5);
        let config = AgentConfig::default();
        let candidates = [p(1, 2)];
        let ctx = ctx(&grid, &config, p(2, 2), &candidates);
        assert!(!capsule_worthwhile(&ctx, &[], &[]));
    }

    #[test]
    fn food_and_capsule_stack_on_same_candidate() {
        let grid = WallGrid::open(12, 12);
        let config = AgentConfig::default();
        let candidates = [p(4, 5), p(6, 5)];
        let ctx = ctx(&grid, &config, p(5, 5), &candidates);
        let mut weights = WeightMap::new();

        apply(&ctx, &[p(2, 5), p(11, 0)], &[p(1, 5)], &[], &mut weights);

        assert_eq!(weights.get(p(4, 5)), config.food_reward + config.capsule_reward);
    }
}
