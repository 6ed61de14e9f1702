//! Player settings and preferences
//!
//! Persisted separately from the leaderboard in the same key-value store.

use serde::{Deserialize, Serialize};

use crate::persistence::KeyValueStore;
use crate::sim::GameMode;
use crate::tuning::Tuning;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Name recorded with high scores
    pub player_name: String,
    /// Mode preselected on the mode picker
    pub mode: GameMode,
    /// Game balance overrides
    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player_name: "Player".to_string(),
            mode: GameMode::Easy,
            tuning: Tuning::default(),
        }
    }
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = "snake_settings";

    /// Set the player name, ignoring blank input
    pub fn set_player_name(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.player_name = name.to_string();
        true
    }

    /// Load settings, falling back to defaults
    pub fn load<S: KeyValueStore>(storage: &S) -> Self {
        if let Some(json) = storage.get(Self::STORAGE_KEY) {
            match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring unreadable settings: {}", e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    pub fn save<S: KeyValueStore>(&self, storage: &mut S) {
        match serde_json::to_string(self) {
            Ok(json) => {
                storage.set(Self::STORAGE_KEY, json);
                log::info!("Settings saved");
            }
            Err(e) => log::warn!("Failed to encode settings: {}", e),
        }
    }
}
