//! One movement step of the rules engine
//!
//! Moves the snake one cell, resolves collisions and consumption, and applies
//! scoring, leveling and win/loss transitions. Timer-driven follow-ups (effect
//! durations, interval changes) are reported as `GameEvent`s for the engine.

use std::collections::VecDeque;

use rand::Rng;

use super::grid::{Direction, Position, in_bounds, wrap};
use super::spawn::{place_obstacles, relocate_food};
use super::state::{Consumable, DeathCause, EntitySlot, GameEvent, GamePhase, GameState};
use crate::consts::{MAX_LEVEL, POINTS_PER_LEVEL};
use crate::tuning::Tuning;

/// Queue a new heading for the next move.
///
/// A 180° reversal of the last executed move is silently ignored. Returns
/// whether the heading was accepted.
pub fn change_direction(state: &mut GameState, direction: Direction) -> bool {
    if state.phase.is_terminal() || direction.is_opposite(state.direction) {
        return false;
    }
    state.pending_direction = direction;
    true
}

/// Advance the match by one cell. No-op unless the match is running.
pub fn tick<R: Rng + ?Sized>(
    state: &mut GameState,
    rng: &mut R,
    tuning: &Tuning,
) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.phase != GamePhase::Running {
        return events;
    }

    state.direction = state.pending_direction;
    let mut head = state.head() + state.direction.delta();
    if state.invincible {
        head = wrap(head);
    }

    if let Some(cause) = detect_collision(state, head, tuning) {
        end_match(state, &mut events, cause);
        return events;
    }

    let prev_len = state.len();
    state.snake.push_front(head);

    match consumable_at(state, head) {
        Some(item) => consume(state, item, prev_len, rng, tuning, &mut events),
        None => {
            state.snake.pop_back();
        }
    }

    if state.phase == GamePhase::Running
        && (state.score >= state.mode.winning_score() || state.level >= MAX_LEVEL)
    {
        state.phase = GamePhase::Won;
        log::info!(
            "Match won: score {}, level {} ({})",
            state.score,
            state.level,
            state.mode.as_str()
        );
        events.push(GameEvent::Won);
    }

    events
}

/// Fatal contact for a head about to enter `head`
fn detect_collision(state: &GameState, head: Position, tuning: &Tuning) -> Option<DeathCause> {
    if state.invincible {
        return None;
    }
    if !in_bounds(head) {
        return Some(DeathCause::Wall);
    }
    if state.snake.contains(&head) {
        return Some(DeathCause::SelfCollision);
    }
    if tuning.fatal_obstacles && state.obstacles.contains(&head) {
        return Some(DeathCause::Obstacle);
    }
    None
}

/// Highest-priority item on `cell`. Bombs are ignored while invincible.
pub fn consumable_at(state: &GameState, cell: Position) -> Option<Consumable> {
    Consumable::PRIORITY.into_iter().find(|item| match item {
        Consumable::Food => state.food == Some(cell),
        Consumable::Bomb => !state.invincible && state.bomb.is_at(cell),
        other => other
            .entity()
            .is_some_and(|kind| state.slot(kind).is_at(cell)),
    })
}

fn consume<R: Rng + ?Sized>(
    state: &mut GameState,
    item: Consumable,
    prev_len: usize,
    rng: &mut R,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) {
    if let Some(kind) = item.entity() {
        *state.slot_mut(kind) = EntitySlot::Absent;
    }

    if item == Consumable::Bomb && prev_len <= 2 {
        end_match(state, events, DeathCause::Bomb);
        return;
    }

    let target = (prev_len as i64 + i64::from(item.growth())).max(1) as usize;
    settle_length(&mut state.snake, target);
    state.score += item.points();
    events.push(GameEvent::Ate(item));

    match item {
        Consumable::Food => {
            relocate_food(state, rng);
            level_up(state, rng, events);
        }
        Consumable::SpecialFood => {
            state.speed_boost_ms = tuning.speed_boost_ms;
            events.push(GameEvent::SpeedBoosted);
        }
        Consumable::Star => {
            state.invincible = true;
            events.push(GameEvent::InvincibilityGranted);
        }
        Consumable::ColorFood => {
            state.invincible = true;
            state.color_cycle = Some(0);
            events.push(GameEvent::InvincibilityGranted);
            events.push(GameEvent::ColorCycleStarted);
        }
        Consumable::Bomb => {}
    }
}

/// Raise the level once per `POINTS_PER_LEVEL` earned, placing obstacles on
/// modes that have them
fn level_up<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R, events: &mut Vec<GameEvent>) {
    let earned = (1 + state.score / POINTS_PER_LEVEL).min(MAX_LEVEL);
    while state.level < earned {
        state.level += 1;
        log::info!("Level up: {}", state.level);
        events.push(GameEvent::LevelUp { level: state.level });

        if state.mode.obstacles_enabled() {
            let wanted = state.mode.obstacles_per_level();
            let count = place_obstacles(state, rng, wanted);
            events.push(GameEvent::ObstaclesPlaced { count });
        }
    }
}

/// Trim the tail or duplicate it until the snake is `target` long
fn settle_length(snake: &mut VecDeque<Position>, target: usize) {
    snake.truncate(target);
    while snake.len() < target {
        match snake.back().copied() {
            Some(tail) => snake.push_back(tail),
            None => break,
        }
    }
}

fn end_match(state: &mut GameState, events: &mut Vec<GameEvent>, cause: DeathCause) {
    state.phase = GamePhase::GameOver;
    log::info!(
        "Game over ({:?}): score {}, level {}",
        cause,
        state.score,
        state.level
    );
    events.push(GameEvent::GameOver(cause));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::GRID_SIZE;
    use crate::sim::state::{EntityKind, GameMode};
    use glam::IVec2;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    /// Running match with the food parked in a corner out of the way
    fn running(mode: GameMode) -> (GameState, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(12345);
        let mut state = GameState::new_game(mode, &mut rng, 0);
        state.food = Some(IVec2::new(0, GRID_SIZE - 1));
        (state, rng)
    }

    /// Horizontal snake with its head at (x, y), body trailing to the left
    fn with_snake(state: &mut GameState, x: i32, y: i32, len: i32) {
        state.snake = (0..len).map(|i| IVec2::new(x - i, y)).collect();
    }

    fn visible(pos: Position) -> EntitySlot {
        EntitySlot::Visible {
            pos,
            expires_at_ms: u64::MAX,
        }
    }

    #[test]
    fn test_reversal_rejected() {
        let (mut state, _) = running(GameMode::Easy);
        assert!(!change_direction(&mut state, Direction::Left));
        assert_eq!(state.pending_direction, Direction::Right);
        assert!(change_direction(&mut state, Direction::Up));
        assert_eq!(state.pending_direction, Direction::Up);
    }

    #[test]
    fn test_two_inputs_between_ticks_cannot_reverse() {
        let (mut state, mut rng) = running(GameMode::Easy);
        change_direction(&mut state, Direction::Up);
        // Still moving right until the next tick
        assert!(!change_direction(&mut state, Direction::Left));
        tick(&mut state, &mut rng, &Tuning::default());
        assert_eq!(state.head(), IVec2::new(5, 4));
    }

    #[test]
    fn test_plain_move_keeps_length() {
        let (mut state, mut rng) = running(GameMode::Easy);
        with_snake(&mut state, 7, 7, 4);
        let events = tick(&mut state, &mut rng, &Tuning::default());
        assert!(events.is_empty());
        assert_eq!(state.len(), 4);
        assert_eq!(state.head(), IVec2::new(8, 7));
        assert_eq!(state.snake.back(), Some(&IVec2::new(5, 7)));
    }

    #[test]
    fn test_wall_after_ten_moves_right() {
        let (mut state, mut rng) = running(GameMode::Easy);
        let tuning = Tuning::default();
        for _ in 0..9 {
            tick(&mut state, &mut rng, &tuning);
            assert_eq!(state.phase, GamePhase::Running);
        }
        assert_eq!(state.head().x, GRID_SIZE - 1);
        let events = tick(&mut state, &mut rng, &tuning);
        assert_eq!(events, vec![GameEvent::GameOver(DeathCause::Wall)]);
        assert!(state.is_game_over());

        // Terminal: further ticks do nothing
        assert!(tick(&mut state, &mut rng, &tuning).is_empty());
        assert_eq!(state.head().x, GRID_SIZE - 1);
    }

    #[test]
    fn test_self_collision() {
        let (mut state, mut rng) = running(GameMode::Easy);
        // Head at (5,5), body curls down and back: (4,5) (4,6) (5,6) (6,6)
        state.snake = [(5, 5), (4, 5), (4, 6), (5, 6), (6, 6)]
            .into_iter()
            .map(|(x, y)| IVec2::new(x, y))
            .collect();
        change_direction(&mut state, Direction::Down);
        let events = tick(&mut state, &mut rng, &Tuning::default());
        assert_eq!(events, vec![GameEvent::GameOver(DeathCause::SelfCollision)]);
    }

    #[test]
    fn test_invincible_wraps_instead_of_dying() {
        let (mut state, mut rng) = running(GameMode::Easy);
        with_snake(&mut state, GRID_SIZE - 1, 3, 2);
        state.invincible = true;
        tick(&mut state, &mut rng, &Tuning::default());
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.head(), IVec2::new(0, 3));
    }

    #[test]
    fn test_eat_food() {
        let (mut state, mut rng) = running(GameMode::Easy);
        state.food = Some(IVec2::new(6, 5));
        let events = tick(&mut state, &mut rng, &Tuning::default());
        assert_eq!(events, vec![GameEvent::Ate(Consumable::Food)]);
        assert_eq!(state.score, 10);
        assert_eq!(state.len(), 2);
        let food = state.food.unwrap();
        assert!(!state.snake.contains(&food));
    }

    #[test]
    fn test_food_level_up_places_obstacles() {
        let (mut state, mut rng) = running(GameMode::Hard);
        state.score = 40;
        state.food = Some(IVec2::new(6, 5));
        let events = tick(&mut state, &mut rng, &Tuning::default());
        assert_eq!(state.level, 2);
        assert!(events.contains(&GameEvent::LevelUp { level: 2 }));
        assert!(events.iter().any(|e| matches!(e, GameEvent::ObstaclesPlaced { .. })));
        assert!(!state.obstacles.is_empty());
    }

    #[test]
    fn test_easy_level_up_has_no_obstacles() {
        let (mut state, mut rng) = running(GameMode::Easy);
        state.score = 40;
        state.food = Some(IVec2::new(6, 5));
        tick(&mut state, &mut rng, &Tuning::default());
        assert_eq!(state.level, 2);
        assert!(state.obstacles.is_empty());
    }

    #[test]
    fn test_special_food_grows_two() {
        let (mut state, mut rng) = running(GameMode::Easy);
        with_snake(&mut state, 5, 5, 3);
        state.special_food = visible(IVec2::new(6, 5));
        let events = tick(&mut state, &mut rng, &Tuning::default());
        assert_eq!(state.len(), 5);
        assert_eq!(state.score, 20);
        assert!(!state.special_food.is_visible());
        assert!(events.contains(&GameEvent::SpeedBoosted));
    }

    #[test]
    fn test_star_grants_invincibility() {
        let (mut state, mut rng) = running(GameMode::Easy);
        with_snake(&mut state, 5, 5, 3);
        state.star = visible(IVec2::new(6, 5));
        let events = tick(&mut state, &mut rng, &Tuning::default());
        assert!(state.invincible);
        assert_eq!(state.len(), 3);
        assert_eq!(state.score, 10);
        assert!(events.contains(&GameEvent::InvincibilityGranted));
    }

    #[test]
    fn test_color_food() {
        let (mut state, mut rng) = running(GameMode::Medium);
        state.color_food = visible(IVec2::new(6, 5));
        let events = tick(&mut state, &mut rng, &Tuning::default());
        assert!(state.invincible);
        assert_eq!(state.color_cycle, Some(0));
        assert_eq!(state.len(), 2);
        assert_eq!(state.score, 10);
        assert!(events.contains(&GameEvent::ColorCycleStarted));
    }

    #[test]
    fn test_bomb_shrinks() {
        let (mut state, mut rng) = running(GameMode::Easy);
        with_snake(&mut state, 5, 5, 4);
        state.bomb = visible(IVec2::new(6, 5));
        tick(&mut state, &mut rng, &Tuning::default());
        assert_eq!(state.len(), 3);
        assert_eq!(state.score, 0);
        assert!(!state.bomb.is_visible());
        assert_eq!(state.phase, GamePhase::Running);
    }

    #[test]
    fn test_bomb_on_short_snake_ends_match() {
        let (mut state, mut rng) = running(GameMode::Easy);
        with_snake(&mut state, 5, 5, 2);
        state.bomb = visible(IVec2::new(6, 5));
        let events = tick(&mut state, &mut rng, &Tuning::default());
        assert_eq!(events, vec![GameEvent::GameOver(DeathCause::Bomb)]);
    }

    #[test]
    fn test_bomb_ignored_while_invincible() {
        let (mut state, mut rng) = running(GameMode::Easy);
        with_snake(&mut state, 5, 5, 4);
        state.invincible = true;
        state.bomb = visible(IVec2::new(6, 5));
        let events = tick(&mut state, &mut rng, &Tuning::default());
        assert!(events.is_empty());
        assert_eq!(state.len(), 4);
        assert!(state.bomb.is_visible());
    }

    #[test]
    fn test_consumption_priority() {
        let (mut state, mut rng) = running(GameMode::Medium);
        let cell = IVec2::new(6, 5);
        state.food = Some(cell);
        state.special_food = visible(cell);
        state.star = visible(cell);
        state.bomb = visible(cell);
        state.color_food = visible(cell);

        assert_eq!(consumable_at(&state, cell), Some(Consumable::Food));
        state.food = None;
        assert_eq!(consumable_at(&state, cell), Some(Consumable::SpecialFood));
        state.special_food = EntitySlot::Absent;
        assert_eq!(consumable_at(&state, cell), Some(Consumable::Star));
        state.star = EntitySlot::Absent;
        assert_eq!(consumable_at(&state, cell), Some(Consumable::Bomb));
        state.invincible = true;
        assert_eq!(consumable_at(&state, cell), Some(Consumable::ColorFood));

        // Only the winner is consumed
        state.invincible = false;
        state.star = visible(cell);
        tick(&mut state, &mut rng, &Tuning::default());
        assert!(!state.star.is_visible());
        assert!(state.bomb.is_visible());
        assert!(state.slot(EntityKind::ColorFood).is_visible());
    }

    #[test]
    fn test_obstacles_fatal_only_when_configured() {
        let (mut state, mut rng) = running(GameMode::Medium);
        state.obstacles.push(IVec2::new(6, 5));
        let mut lenient = state.clone();
        tick(&mut lenient, &mut rng, &Tuning::default());
        assert_eq!(lenient.phase, GamePhase::Running);

        let strict = Tuning {
            fatal_obstacles: true,
            ..Tuning::default()
        };
        let events = tick(&mut state, &mut rng, &strict);
        assert_eq!(events, vec![GameEvent::GameOver(DeathCause::Obstacle)]);
    }

    #[test]
    fn test_reaching_winning_score_wins() {
        let (mut state, mut rng) = running(GameMode::Medium);
        state.score = 290;
        state.level = 6;
        state.food = Some(IVec2::new(6, 5));
        let events = tick(&mut state, &mut rng, &Tuning::default());
        assert_eq!(events.last(), Some(&GameEvent::Won));
        assert!(state.has_won());

        let head = state.head();
        assert!(tick(&mut state, &mut rng, &Tuning::default()).is_empty());
        assert_eq!(state.head(), head);
    }

    #[test]
    fn test_max_level_wins() {
        let (mut state, mut rng) = running(GameMode::Expert);
        state.level = MAX_LEVEL;
        tick(&mut state, &mut rng, &Tuning::default());
        assert!(state.has_won());
    }

    #[test]
    fn test_paused_tick_is_noop() {
        let (mut state, mut rng) = running(GameMode::Easy);
        state.phase = GamePhase::Paused;
        assert!(tick(&mut state, &mut rng, &Tuning::default()).is_empty());
        assert_eq!(state.head(), IVec2::new(5, 5));
    }

    proptest! {
        #[test]
        fn prop_effective_move_never_reverses(inputs in proptest::collection::vec((0usize..4, 0usize..4), 1..80)) {
            let (mut state, mut rng) = running(GameMode::Easy);
            with_snake(&mut state, 7, 7, 3);
            state.invincible = true;
            let tuning = Tuning::default();
            for (a, b) in inputs {
                change_direction(&mut state, Direction::ALL[a]);
                change_direction(&mut state, Direction::ALL[b]);
                let before = state.direction;
                let old_head = state.head();
                tick(&mut state, &mut rng, &tuning);
                if state.phase != GamePhase::Running {
                    break;
                }
                prop_assert!(!state.direction.is_opposite(before));
                prop_assert_eq!(state.head(), wrap(old_head + state.direction.delta()));
            }
        }

        #[test]
        fn prop_plain_moves_preserve_length(len in 1i32..8, inputs in proptest::collection::vec(0usize..4, 1..60)) {
            let (mut state, mut rng) = running(GameMode::Easy);
            with_snake(&mut state, 7, 7, len);
            state.food = None;
            state.invincible = true;
            let tuning = Tuning::default();
            for d in inputs {
                change_direction(&mut state, Direction::ALL[d]);
                tick(&mut state, &mut rng, &tuning);
                prop_assert_eq!(state.len(), len as usize);
            }
        }
    }
}
