//! Idle/demo mode - a greedy player
//!
//! Heads for the primary food along the shortest Manhattan path while
//! refusing moves that would be fatal on the very next tick.

use super::grid::{Direction, Position, in_bounds, wrap};
use super::state::GameState;

/// Pick a heading for the next move, or `None` if every move is fatal
pub fn steer(state: &GameState) -> Option<Direction> {
    let head = state.head();
    let target = state.food;

    Direction::ALL
        .into_iter()
        .filter(|dir| !dir.is_opposite(state.direction))
        .filter_map(|dir| {
            let next = next_cell(state, head, dir)?;
            let distance = target.map(|t| manhattan(next, t)).unwrap_or(0);
            // Ties keep the current heading
            let turn_penalty = i32::from(dir != state.direction);
            Some((distance, turn_penalty, dir))
        })
        .min_by_key(|(distance, turn_penalty, _)| (*distance, *turn_penalty))
        .map(|(_, _, dir)| dir)
}

/// The cell `dir` leads to, if entering it is safe
fn next_cell(state: &GameState, head: Position, dir: Direction) -> Option<Position> {
    let mut next = head + dir.delta();
    if state.invincible {
        next = wrap(next);
    } else if !in_bounds(next) {
        return None;
    }

    let blocked = state.obstacles.contains(&next)
        || (!state.invincible && (state.snake.contains(&next) || state.bomb.is_at(next)));
    (!blocked).then_some(next)
}

fn manhattan(a: Position, b: Position) -> i32 {
    (a - b).abs().element_sum()
}
