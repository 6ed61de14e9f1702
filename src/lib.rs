//! Wrist Snake - A watch-sized Snake arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, rules, spawning, timers)
//! - `game`: Engine that drives the simulation from virtual time and input
//! - `highscores`: Per-player bounded leaderboard
//! - `persistence`: Key-value storage backends
//! - `settings`: Player preferences
//! - `tuning`: Data-driven game balance

pub mod game;
pub mod highscores;
pub mod persistence;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use game::{Command, Game};
pub use highscores::{HighScoreEntry, HighScores, ScoreStore};
pub use persistence::{FileStore, KeyValueStore, MemoryStore};
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Cells per side of the square board
    pub const GRID_SIZE: i32 = 15;
    /// Highest reachable level; reaching it wins the match
    pub const MAX_LEVEL: u32 = 10;
    /// Snake head at match start
    pub const START_X: i32 = 5;
    pub const START_Y: i32 = 5;

    /// Points per consumable
    pub const FOOD_POINTS: u32 = 10;
    pub const SPECIAL_FOOD_POINTS: u32 = 20;
    pub const STAR_POINTS: u32 = 10;
    pub const COLOR_FOOD_POINTS: u32 = 10;

    /// Cumulative points per level
    pub const POINTS_PER_LEVEL: u32 = 50;

    /// Fastest allowed move interval (ms)
    pub const SPEED_FLOOR_MS: u64 = 100;
    /// Interval reduction per level (ms)
    pub const LEVEL_STEP_MS: u64 = 15;

    /// Placement retries per obstacle before giving up on that slot
    pub const OBSTACLE_ATTEMPTS: u32 = 10;

    /// Base snake colour (0xRRGGBB)
    pub const SNAKE_BASE_COLOR: u32 = 0x34C759;
    /// Colours cycled through while the colour-food effect runs
    pub const SNAKE_CYCLE_PALETTE: [u32; 6] =
        [0xAF52DE, 0xFF2D55, 0xFF9500, 0xFFCC00, 0x5AC8FA, 0x007AFF];
}

/// Milliseconds since the Unix epoch, used for score timestamps
pub fn now_millis() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}
