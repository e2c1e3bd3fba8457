//! Ghost threat field.
//!
//! Dangerous ghosts push a decaying penalty over every cell within
//! `threat_radius` steps. Stealthy ghosts (long edible timer) are not a threat
//! this turn; when one is close, the candidate nearest to it gets a small bonus.

use micromegas_tracing::prelude::*;

use super::{GhostObservation, TurnContext, WeightMap, within};
use crate::components::GridPosition;

/// Apply every ghost's contribution to `weights`.
#[span_fn]
pub fn apply(ctx: &TurnContext<'_>, ghosts: &[GhostObservation], weights: &mut WeightMap) {
    for ghost in ghosts {
        if is_stealthy(ctx, ghost) {
            stealth_bonus(ctx, ghost.cell(), weights);
        } else {
            flood_penalty(ctx, ghost.cell(), weights);
        }
    }
}

pub fn is_stealthy(ctx: &TurnContext<'_>, ghost: &GhostObservation) -> bool {
    ghost.edible_timer > ctx.config.stealth_threshold
}

/// Reward the candidate nearest to a stealthy ghost, if the ghost is within
/// `stealth_range` of Pac-Man.
pub fn stealth_bonus(ctx: &TurnContext<'_>, ghost: GridPosition, weights: &mut WeightMap) {
    let dist = ctx.grid.distance(ctx.pacman, ghost);
    if !within(dist, ctx.config.stealth_range) {
        return;
    }
    if let Some(target) = ctx.closest_candidate(ghost) {
        weights.add(target, ctx.config.stealth_bonus);
    }
}

/// Spread a dangerous ghost's penalty outward from its cell.
pub fn flood_penalty(ctx: &TurnContext<'_>, ghost: GridPosition, weights: &mut WeightMap) {
    for (cell, depth) in ctx.grid.flood(ghost, Some(ctx.config.threat_radius)) {
        weights.add(cell, ctx.config.threat_penalty(depth));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
