//! Data-driven game balance
//!
//! Timer periods, entity lifetimes and effect durations. Missing fields fall
//! back to defaults so older saved settings keep loading.

use serde::{Deserialize, Serialize};

use crate::sim::EntityKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Spawn attempts (period) and lifetimes, ms ===
    pub special_food_every_ms: u64,
    pub special_food_lifetime_ms: u64,
    pub bomb_every_ms: u64,
    pub bomb_lifetime_ms: u64,
    pub star_every_ms: u64,
    pub star_lifetime_ms: u64,
    pub color_food_every_ms: u64,
    pub color_food_lifetime_ms: u64,

    // === Effects ===
    /// Invincibility from a star or colour food
    pub invincibility_ms: u64,
    /// Milliseconds shaved off the move interval after special food
    pub speed_boost_ms: u64,
    /// How long the special-food boost lasts
    pub speed_boost_duration_ms: u64,
    /// Cosmetic colour cycle after colour food
    pub color_cycle_ms: u64,
    pub color_cycle_step_ms: u64,

    // === Rules ===
    /// Running into an obstacle ends the match
    pub fatal_obstacles: bool,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            special_food_every_ms: 6000,
            special_food_lifetime_ms: 3500,
            bomb_every_ms: 9000,
            bomb_lifetime_ms: 5000,
            star_every_ms: 15000,
            star_lifetime_ms: 4000,
            color_food_every_ms: 12000,
            color_food_lifetime_ms: 4000,

            invincibility_ms: 5000,
            speed_boost_ms: 30,
            speed_boost_duration_ms: 3000,
            color_cycle_ms: 5000,
            color_cycle_step_ms: 250,

            fatal_obstacles: false,
        }
    }
}

impl Tuning {
    /// Period between spawn attempts for an entity kind
    pub fn spawn_every_ms(&self, kind: EntityKind) -> u64 {
        match kind {
            EntityKind::SpecialFood => self.special_food_every_ms,
            EntityKind::ColorFood => self.color_food_every_ms,
            EntityKind::Star => self.star_every_ms,
            EntityKind::Bomb => self.bomb_every_ms,
        }
    }

    /// How long a spawned entity stays on the board
    pub fn lifetime_ms(&self, kind: EntityKind) -> u64 {
        match kind {
            EntityKind::SpecialFood => self.special_food_lifetime_ms,
            EntityKind::ColorFood => self.color_food_lifetime_ms,
            EntityKind::Star => self.star_lifetime_ms,
            EntityKind::Bomb => self.bomb_lifetime_ms,
        }
    }
}
