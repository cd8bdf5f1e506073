use rand::Rng;

use crate::config::{PICKUP_ITEM_SCORE, PICKUP_SPEED_BONUS};
use crate::level::{CellKind, Grid};
use crate::snake::Position;

/// Reward carried by the pickup item, scaled by the game level when eaten.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickupReward {
    pub item_score: u32,
    pub speed_bonus: f32,
}

impl Default for PickupReward {
    fn default() -> Self {
        Self {
            item_score: PICKUP_ITEM_SCORE,
            speed_bonus: PICKUP_SPEED_BONUS,
        }
    }
}

impl PickupReward {
    /// Score awarded at `game_level`.
    #[must_use]
    pub fn points(self, game_level: u32) -> u32 {
        self.item_score.saturating_mul(game_level)
    }

    /// Speed increase at `game_level`. Negative bonuses count as positive.
    #[must_use]
    pub fn speedup(self, game_level: u32) -> f32 {
        self.speed_bonus.abs() * game_level as f32
    }
}

/// Picks a uniformly random empty cell, or `None` when the grid has none.
///
/// Scans the whole grid, so it is meant for construction and pickup events
/// rather than every tick.
#[must_use]
pub fn spawn_position<R: Rng + ?Sized>(rng: &mut R, grid: &Grid) -> Option<Position> {
    let candidates: Vec<Position> = grid
        .cells()
        .filter(|(_, kind)| *kind == CellKind::Empty)
        .map(|(position, _)| position)
        .collect();

    if candidates.is_empty() {
        return None;
    }

    let index = rng.gen_range(0..candidates.len());
    Some(candidates[index])
}
