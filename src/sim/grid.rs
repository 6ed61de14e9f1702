//! Board coordinates and bounds utilities
//!
//! The board is a square of `GRID_SIZE` cells per side, 0-indexed, with y
//! growing downward (screen convention).

use glam::IVec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::consts::GRID_SIZE;

/// A board cell
pub type Position = IVec2;

/// Movement direction of the snake head
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// The 180° reversal of this direction
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }

    /// One-cell offset
    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }
}

/// True iff the cell lies on the board
#[inline]
pub fn in_bounds(pos: Position) -> bool {
    (0..GRID_SIZE).contains(&pos.x) && (0..GRID_SIZE).contains(&pos.y)
}

/// Wrap both coordinates back onto the board (used while invincible)
#[inline]
pub fn wrap(pos: Position) -> Position {
    IVec2::new(pos.x.rem_euclid(GRID_SIZE), pos.y.rem_euclid(GRID_SIZE))
}

/// Board center, the fallback when no free cell exists
#[inline]
pub fn center() -> Position {
    IVec2::splat(GRID_SIZE / 2)
}

/// Iterate every cell in row-major order
pub fn cells() -> impl Iterator<Item = Position> {
    (0..GRID_SIZE).flat_map(|y| (0..GRID_SIZE).map(move |x| IVec2::new(x, y)))
}

/// Uniformly sample a cell not contained in `excluded`.
///
/// Returns the board center when every cell is excluded.
pub fn random_free_cell<R: Rng + ?Sized>(rng: &mut R, excluded: &[Position]) -> Position {
    let free: Vec<Position> = cells().filter(|c| !excluded.contains(c)).collect();
    free.choose(rng).copied().unwrap_or_else(center)
}
