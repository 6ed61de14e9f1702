//! Randomized placement of food, power-ups, bombs and obstacles

use glam::IVec2;
use rand::Rng;

use super::grid::{Position, random_free_cell};
use super::state::{EntityKind, EntitySlot, GameState};
use crate::consts::{GRID_SIZE, OBSTACLE_ATTEMPTS};

/// Place a transient entity on a free cell for `lifetime_ms`.
///
/// No-op (returns `None`) while an entity of the same kind is visible.
pub fn spawn_entity<R: Rng + ?Sized>(
    state: &mut GameState,
    kind: EntityKind,
    rng: &mut R,
    lifetime_ms: u64,
) -> Option<Position> {
    if state.slot(kind).is_visible() {
        return None;
    }

    let mut excluded = state.occupied_cells();
    if kind == EntityKind::Bomb {
        // Never drop a bomb where the snake is about to move
        excluded.push(state.cell_ahead());
    }

    let pos = random_free_cell(rng, &excluded);
    let expires_at_ms = state.now_ms + lifetime_ms;
    *state.slot_mut(kind) = EntitySlot::Visible { pos, expires_at_ms };
    log::debug!("Spawned {:?} at ({}, {})", kind, pos.x, pos.y);
    Some(pos)
}

/// Clear an entity whose lifetime has run out. Returns true if it was cleared.
pub fn expire_entity(state: &mut GameState, kind: EntityKind) -> bool {
    let now = state.now_ms;
    let slot = state.slot_mut(kind);
    if slot.is_expired(now) {
        *slot = EntitySlot::Absent;
        log::debug!("{:?} expired", kind);
        true
    } else {
        false
    }
}

/// Move the primary food to a random free cell
pub fn relocate_food<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) -> Position {
    state.food = None;
    let pos = random_free_cell(rng, &state.occupied_cells());
    state.food = Some(pos);
    pos
}

/// Try to place `count` obstacles.
///
/// Each slot samples the whole board up to `OBSTACLE_ATTEMPTS` times and is
/// skipped silently if every sample lands on an occupied cell. Returns the
/// number actually placed.
pub fn place_obstacles<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R, count: usize) -> usize {
    let ahead = state.cell_ahead();
    let mut placed = 0;

    for _ in 0..count {
        let occupied = state.occupied_cells();
        for _ in 0..OBSTACLE_ATTEMPTS {
            let candidate = IVec2::new(
                rng.random_range(0..GRID_SIZE),
                rng.random_range(0..GRID_SIZE),
            );
            if candidate != ahead && !occupied.contains(&candidate) {
                state.obstacles.push(candidate);
                placed += 1;
                break;
            }
        }
    }

    if placed < count {
        log::debug!("Placed {} of {} obstacles", placed, count);
    }
    placed
}
