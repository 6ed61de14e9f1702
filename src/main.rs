//! Wrist Snake entry point
//!
//! Headless native runner: plays one match on autopilot at a fixed frame
//! step, records the result and prints the leaderboard.

use anyhow::{Context, Result};

use wrist_snake::sim::{GameMode, autopilot};
use wrist_snake::{FileStore, Game, ScoreStore, Settings};

/// Host frame step (ms)
const FRAME_MS: u64 = 16;
/// Give up on a match that somehow never ends
const MAX_FRAMES: u32 = 200_000;

fn main() -> Result<()> {
    env_logger::init();
    log::info!("Wrist Snake (native) starting...");

    let path =
        std::env::var("WRIST_SNAKE_SAVE").unwrap_or_else(|_| "wrist-snake.json".to_string());
    let mut storage =
        FileStore::open(&path).with_context(|| format!("opening save file {}", path))?;

    let mut settings = Settings::load(&storage);
    if let Some(mode) = std::env::args().nth(1).as_deref().and_then(GameMode::from_str) {
        settings.mode = mode;
        settings.save(&mut storage);
    }

    let seed = wrist_snake::now_millis() as u64;
    let scores = ScoreStore::open(storage);
    let mut game = Game::new(
        settings.mode,
        seed,
        settings.tuning.clone(),
        scores,
        settings.player_name.clone(),
    );

    for _ in 0..MAX_FRAMES {
        if let Some(dir) = autopilot::steer(game.state()) {
            game.change_direction(dir);
        }
        game.advance(FRAME_MS);
        for event in game.drain_events() {
            log::debug!("{:?}", event);
        }
        if game.phase().is_terminal() {
            break;
        }
    }

    let state = game.state();
    let outcome = if game.has_won() { "Won" } else { "Game over" };
    println!(
        "{} on {}: score {}, level {}, length {}, {:.1}s",
        outcome,
        state.mode.as_str(),
        state.score,
        state.level,
        state.len(),
        game.elapsed_ms() as f64 / 1000.0
    );

    println!("\nHigh scores:");
    for (rank, entry) in game.scores().top_scores().iter().enumerate() {
        println!(
            "{:>2}. {:<12} {:>5}  level {:>2}  {}",
            rank + 1,
            entry.player_name,
            entry.score,
            entry.level,
            entry.mode
        );
    }

    Ok(())
}
