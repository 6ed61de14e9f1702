//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Virtual time only (milliseconds handed in by the caller)
//! - Seeded RNG only
//! - No rendering, storage or platform dependencies

pub mod autopilot;
pub mod grid;
pub mod scheduler;
pub mod spawn;
pub mod state;
pub mod tick;

pub use grid::{Direction, Position, in_bounds, random_free_cell, wrap};
pub use scheduler::{Scheduler, TimerKind, move_interval_ms};
pub use state::{
    Consumable, DeathCause, EntityKind, EntitySlot, GameEvent, GameMode, GamePhase, GameState,
};
pub use tick::{change_direction, tick};
