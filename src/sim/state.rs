//! Game state and core simulation types
//!
//! Everything the UI needs to draw one match lives here.

use std::collections::VecDeque;

use glam::IVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::grid::{Direction, Position, random_free_cell};
use crate::consts::*;

/// Difficulty preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GameMode {
    #[default]
    Easy,
    Medium,
    Hard,
    Expert,
}

impl GameMode {
    pub const ALL: [GameMode; 4] = [
        GameMode::Easy,
        GameMode::Medium,
        GameMode::Hard,
        GameMode::Expert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Easy => "Easy",
            GameMode::Medium => "Medium",
            GameMode::Hard => "Hard",
            GameMode::Expert => "Expert",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(GameMode::Easy),
            "medium" | "med" => Some(GameMode::Medium),
            "hard" => Some(GameMode::Hard),
            "expert" => Some(GameMode::Expert),
            _ => None,
        }
    }

    /// Move interval at level 0 (ms)
    pub fn base_interval_ms(&self) -> u64 {
        match self {
            GameMode::Easy => 700,
            GameMode::Medium => 450,
            GameMode::Hard => 250,
            GameMode::Expert => 180,
        }
    }

    /// Score that wins the match
    pub fn winning_score(&self) -> u32 {
        match self {
            GameMode::Easy => 150,
            GameMode::Medium => 300,
            GameMode::Hard => 400,
            GameMode::Expert => 450,
        }
    }

    /// Whether obstacles (and the colour food that comes with them) appear
    pub fn obstacles_enabled(&self) -> bool {
        !matches!(self, GameMode::Easy)
    }

    /// Obstacles placed on every level gained
    pub fn obstacles_per_level(&self) -> usize {
        match self {
            GameMode::Easy => 0,
            GameMode::Medium => 1,
            GameMode::Hard => 2,
            GameMode::Expert => 3,
        }
    }
}

/// Match lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Running,
    Paused,
    GameOver,
    Won,
}

impl GamePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::Won)
    }
}

/// Transient board entities with their own lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    SpecialFood,
    ColorFood,
    Star,
    Bomb,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::SpecialFood,
        EntityKind::ColorFood,
        EntityKind::Star,
        EntityKind::Bomb,
    ];
}

/// Visibility of one transient entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EntitySlot {
    #[default]
    Absent,
    Visible { pos: Position, expires_at_ms: u64 },
}

impl EntitySlot {
    pub fn position(&self) -> Option<Position> {
        match self {
            EntitySlot::Absent => None,
            EntitySlot::Visible { pos, .. } => Some(*pos),
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(self, EntitySlot::Visible { .. })
    }

    pub fn is_at(&self, cell: Position) -> bool {
        self.position() == Some(cell)
    }

    /// True once the slot's lifetime has run out at `now_ms`
    pub fn is_expired(&self, now_ms: u64) -> bool {
        match self {
            EntitySlot::Absent => false,
            EntitySlot::Visible { expires_at_ms, .. } => now_ms >= *expires_at_ms,
        }
    }
}

/// Anything the head can consume, in resolution priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Consumable {
    Food,
    SpecialFood,
    Star,
    Bomb,
    ColorFood,
}

impl Consumable {
    /// Resolution order when several items share the head cell
    pub const PRIORITY: [Consumable; 5] = [
        Consumable::Food,
        Consumable::SpecialFood,
        Consumable::Star,
        Consumable::Bomb,
        Consumable::ColorFood,
    ];

    pub fn points(&self) -> u32 {
        match self {
            Consumable::Food => FOOD_POINTS,
            Consumable::SpecialFood => SPECIAL_FOOD_POINTS,
            Consumable::Star => STAR_POINTS,
            Consumable::Bomb => 0,
            Consumable::ColorFood => COLOR_FOOD_POINTS,
        }
    }

    /// Net change in snake length for the tick it is consumed on
    pub fn growth(&self) -> i32 {
        match self {
            Consumable::Food => 1,
            Consumable::SpecialFood => 2,
            Consumable::Star => 0,
            Consumable::Bomb => -1,
            Consumable::ColorFood => 1,
        }
    }

    /// The transient slot backing this consumable (primary food has none)
    pub fn entity(&self) -> Option<EntityKind> {
        match self {
            Consumable::Food => None,
            Consumable::SpecialFood => Some(EntityKind::SpecialFood),
            Consumable::Star => Some(EntityKind::Star),
            Consumable::Bomb => Some(EntityKind::Bomb),
            Consumable::ColorFood => Some(EntityKind::ColorFood),
        }
    }
}

/// Why a match was lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Wall,
    SelfCollision,
    Obstacle,
    Bomb,
}

/// Something that happened during a tick, for the engine to react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Ate(Consumable),
    LevelUp { level: u32 },
    ObstaclesPlaced { count: usize },
    InvincibilityGranted,
    ColorCycleStarted,
    SpeedBoosted,
    GameOver(DeathCause),
    Won,
}

/// Complete state of one match (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub mode: GameMode,
    /// Head first
    pub snake: VecDeque<Position>,
    /// Direction of the last executed move
    pub direction: Direction,
    /// Direction the next move will take
    pub pending_direction: Direction,
    /// Primary food (absent only while being reassigned)
    pub food: Option<Position>,
    pub obstacles: Vec<Position>,
    pub score: u32,
    pub level: u32,
    pub phase: GamePhase,
    /// Virtual clock at match start
    pub started_at_ms: u64,
    /// Virtual clock as of the last engine update
    pub now_ms: u64,
    pub invincible: bool,
    pub special_food: EntitySlot,
    pub color_food: EntitySlot,
    pub star: EntitySlot,
    pub bomb: EntitySlot,
    /// Active special-food speed boost (ms shaved off the move interval)
    pub speed_boost_ms: u64,
    /// Palette index while the colour-food effect runs
    pub color_cycle: Option<usize>,
}

impl GameState {
    /// Fresh match: one-cell snake heading right, food on a random free cell
    pub fn new_game<R: Rng + ?Sized>(mode: GameMode, rng: &mut R, now_ms: u64) -> Self {
        let head = IVec2::new(START_X, START_Y);
        let mut snake = VecDeque::with_capacity(32);
        snake.push_back(head);

        let food = random_free_cell(rng, &[head]);

        Self {
            mode,
            snake,
            direction: Direction::Right,
            pending_direction: Direction::Right,
            food: Some(food),
            obstacles: Vec::new(),
            score: 0,
            level: 1,
            phase: GamePhase::Running,
            started_at_ms: now_ms,
            now_ms,
            invincible: false,
            special_food: EntitySlot::Absent,
            color_food: EntitySlot::Absent,
            star: EntitySlot::Absent,
            bomb: EntitySlot::Absent,
            speed_boost_ms: 0,
            color_cycle: None,
        }
    }

    pub fn head(&self) -> Position {
        // The snake is never empty during play; fall back to the start cell
        self.snake
            .front()
            .copied()
            .unwrap_or(IVec2::new(START_X, START_Y))
    }

    pub fn len(&self) -> usize {
        self.snake.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snake.is_empty()
    }

    pub fn is_paused(&self) -> bool {
        self.phase == GamePhase::Paused
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn has_won(&self) -> bool {
        self.phase == GamePhase::Won
    }

    /// Time played, excluding pauses
    pub fn elapsed_ms(&self) -> u64 {
        self.now_ms.saturating_sub(self.started_at_ms)
    }

    pub fn slot(&self, kind: EntityKind) -> &EntitySlot {
        match kind {
            EntityKind::SpecialFood => &self.special_food,
            EntityKind::ColorFood => &self.color_food,
            EntityKind::Star => &self.star,
            EntityKind::Bomb => &self.bomb,
        }
    }

    pub fn slot_mut(&mut self, kind: EntityKind) -> &mut EntitySlot {
        match kind {
            EntityKind::SpecialFood => &mut self.special_food,
            EntityKind::ColorFood => &mut self.color_food,
            EntityKind::Star => &mut self.star,
            EntityKind::Bomb => &mut self.bomb,
        }
    }

    /// Cells holding the snake, obstacles, food or any visible entity
    pub fn occupied_cells(&self) -> Vec<Position> {
        let mut cells: Vec<Position> = self
            .snake
            .iter()
            .chain(self.obstacles.iter())
            .copied()
            .collect();
        cells.extend(self.food);
        cells.extend(EntityKind::ALL.iter().filter_map(|k| self.slot(*k).position()));
        cells
    }

    /// Cell the head will enter on the next move (unwrapped)
    pub fn cell_ahead(&self) -> Position {
        self.head() + self.pending_direction.delta()
    }

    /// Cosmetic body colour (0xRRGGBB)
    pub fn snake_color(&self) -> u32 {
        match self.color_cycle {
            Some(i) => SNAKE_CYCLE_PALETTE[i % SNAKE_CYCLE_PALETTE.len()],
            None => SNAKE_BASE_COLOR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_new_game() {
        let mut rng = Pcg32::seed_from_u64(42);
        let state = GameState::new_game(GameMode::Medium, &mut rng, 1000);
        assert_eq!(state.snake.len(), 1);
        assert_eq!(state.head(), IVec2::new(START_X, START_Y));
        assert_eq!(state.direction, Direction::Right);
        assert_eq!(state.score, 0);
        assert_eq!(state.level, 1);
        assert_eq!(state.phase, GamePhase::Running);
        assert_ne!(state.food, Some(state.head()));
        assert!(state.food.is_some());
        assert_eq!(state.elapsed_ms(), 0);
        assert!(EntityKind::ALL.iter().all(|k| !state.slot(*k).is_visible()));
    }

    #[test]
    fn test_mode_tags_round_trip() {
        for mode in GameMode::ALL {
            assert_eq!(GameMode::from_str(mode.as_str()), Some(mode));
        }
        assert_eq!(GameMode::from_str("nightmare"), None);
    }

    #[test]
    fn test_easy_has_no_obstacles() {
        assert!(!GameMode::Easy.obstacles_enabled());
        assert_eq!(GameMode::Easy.obstacles_per_level(), 0);
        assert!(GameMode::Expert.obstacles_enabled());
    }

    #[test]
    fn test_slot_expiry() {
        let slot = EntitySlot::Visible {
            pos: IVec2::new(1, 1),
            expires_at_ms: 500,
        };
        assert!(!slot.is_expired(499));
        assert!(slot.is_expired(500));
        assert!(!EntitySlot::Absent.is_expired(u64::MAX));
    }

    #[test]
    fn test_snake_color_cycles() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut state = GameState::new_game(GameMode::Easy, &mut rng, 0);
        assert_eq!(state.snake_color(), SNAKE_BASE_COLOR);
        state.color_cycle = Some(SNAKE_CYCLE_PALETTE.len() + 1);
        assert_eq!(state.snake_color(), SNAKE_CYCLE_PALETTE[1]);
    }
}
