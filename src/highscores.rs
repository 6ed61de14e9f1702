//! High score leaderboard system
//!
//! Keeps the top 3 scores of every player, persisted as a single JSON array
//! through a `KeyValueStore`.

use serde::{Deserialize, Serialize};

use crate::persistence::KeyValueStore;
use crate::sim::GameMode;

/// Maximum number of scores kept per player
pub const MAX_SCORES_PER_PLAYER: usize = 3;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Unique within the store
    pub id: u64,
    pub player_name: String,
    pub score: u32,
    /// Level reached
    pub level: u32,
    /// Mode tag (`GameMode::as_str`)
    pub mode: String,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboard, sorted descending by score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build from arbitrary records, enforcing order and the per-player cap
    pub fn from_entries(entries: Vec<HighScoreEntry>) -> Self {
        let mut scores = Self { entries };
        scores.normalize();
        scores
    }

    /// Add a new score. Returns the rank (1-indexed) within the player's list,
    /// or None if it didn't make their top scores.
    pub fn add_score(
        &mut self,
        player_name: &str,
        score: u32,
        level: u32,
        mode: GameMode,
        timestamp: f64,
    ) -> Option<usize> {
        let id = self.next_id();
        self.entries.push(HighScoreEntry {
            id,
            player_name: player_name.to_string(),
            score,
            level,
            mode: mode.as_str().to_string(),
            timestamp,
        });
        self.normalize();

        self.for_player(player_name)
            .iter()
            .position(|e| e.id == id)
            .map(|i| i + 1)
    }

    /// A player's kept scores, best first
    pub fn for_player(&self, player_name: &str) -> Vec<&HighScoreEntry> {
        self.entries
            .iter()
            .filter(|e| e.player_name == player_name)
            .collect()
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    fn next_id(&self) -> u64 {
        self.entries.iter().map(|e| e.id).max().map_or(1, |id| id + 1)
    }

    /// Sort descending (stable, so older records win ties) and drop every
    /// entry beyond a player's top `MAX_SCORES_PER_PLAYER`
    fn normalize(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));

        let mut seen: Vec<(String, usize)> = Vec::new();
        self.entries.retain(|e| {
            match seen.iter_mut().find(|(name, _)| *name == e.player_name) {
                Some((_, count)) => {
                    *count += 1;
                    *count <= MAX_SCORES_PER_PLAYER
                }
                None => {
                    seen.push((e.player_name.clone(), 1));
                    true
                }
            }
        });
    }
}

/// Leaderboard persisted through a key-value store
#[derive(Debug)]
pub struct ScoreStore<S: KeyValueStore> {
    storage: S,
}

impl<S: KeyValueStore> ScoreStore<S> {
    /// Storage key for the leaderboard
    pub const SCORES_KEY: &'static str = "snake_highscores";
    /// Storage key for the most recent score
    pub const LAST_SCORE_KEY: &'static str = "snake_last_score";

    /// Wrap a store, initialising it if it has never held scores
    pub fn open(storage: S) -> Self {
        let mut store = Self { storage };
        if store.storage.get(Self::SCORES_KEY).is_none() {
            store.reset();
        }
        store
    }

    /// Load high scores; an unreadable blob counts as no scores yet
    pub fn load(&self) -> HighScores {
        let Some(json) = self.storage.get(Self::SCORES_KEY) else {
            return HighScores::new();
        };

        match serde_json::from_str::<Vec<HighScoreEntry>>(&json) {
            Ok(entries) => HighScores::from_entries(entries),
            Err(e) => {
                log::warn!("Failed to decode high scores: {}", e);
                HighScores::new()
            }
        }
    }

    /// Record a finished match now
    pub fn save_score(
        &mut self,
        player_name: &str,
        score: u32,
        level: u32,
        mode: GameMode,
    ) -> Option<usize> {
        self.save_score_at(player_name, score, level, mode, crate::now_millis())
    }

    /// Record a finished match with an explicit timestamp
    pub fn save_score_at(
        &mut self,
        player_name: &str,
        score: u32,
        level: u32,
        mode: GameMode,
        timestamp: f64,
    ) -> Option<usize> {
        let mut scores = self.load();
        let rank = scores.add_score(player_name, score, level, mode, timestamp);

        match serde_json::to_string(&scores) {
            Ok(json) => self.storage.set(Self::SCORES_KEY, json),
            Err(e) => log::warn!("Failed to encode high scores: {}", e),
        }
        self.storage.set(Self::LAST_SCORE_KEY, score.to_string());

        log::info!(
            "High scores saved ({} entries), {} scored {} on {}",
            scores.entries.len(),
            player_name,
            score,
            mode.as_str()
        );
        if score >= mode.winning_score() {
            log::info!("{} cleared {} with {} points", player_name, mode.as_str(), score);
        }
        rank
    }

    /// Every kept record, best first
    pub fn top_scores(&self) -> Vec<HighScoreEntry> {
        self.load().entries
    }

    pub fn last_score(&self) -> Option<u32> {
        self.storage
            .get(Self::LAST_SCORE_KEY)
            .and_then(|s| s.parse().ok())
    }

    /// Forget every stored score
    pub fn reset(&mut self) {
        log::info!("Resetting high scores");
        self.storage.remove(Self::SCORES_KEY);
        self.storage.remove(Self::LAST_SCORE_KEY);
    }
}
