//! Game settings and preferences
//!
//! Read from a JSON file at startup. Every field has a default, so a
//! partial file (or none at all) is fine.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::audio::AudioManager;
use crate::clock::SimulationClock;
use crate::consts::*;
use crate::error::ConfigError;
use crate::platform::TimeSource;
use crate::sim::MatchConfig;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Name the high score is recorded under
    pub player_name: String,
    /// Seed for the match RNG
    pub seed: u64,

    // === Loop ===
    /// Ticks run per loop iteration before backlog is dropped
    pub max_catch_up_ticks: u32,
    /// Stop the match after this many ticks (headless runs)
    pub max_match_ticks: Option<u64>,

    // === Gameplay ===
    pub viewport_width: f32,
    /// Chance per tick of losing one point of score
    pub score_decay_chance: f64,

    // === HUD ===
    /// Start with the debug overlay on
    pub show_debug: bool,

    // === Persistence ===
    pub highscore_path: PathBuf,
    /// How long shutdown waits for the score write
    pub persist_timeout_ms: u64,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player_name: "Player".to_string(),
            seed: 0,

            max_catch_up_ticks: MAX_CATCH_UP_TICKS,
            max_match_ticks: None,

            viewport_width: VIEWPORT_WIDTH,
            score_decay_chance: SCORE_DECAY_CHANCE,

            show_debug: false,

            highscore_path: PathBuf::from("highscores.json"),
            persist_timeout_ms: 2000,

            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.6,
            muted: false,
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults if it is missing
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        let settings: Settings = serde_json::from_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings.sanitized())
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Clamp every field into its valid range
    pub fn sanitized(mut self) -> Self {
        if self.player_name.trim().is_empty() {
            log::warn!("Empty player name, using default");
            self.player_name = Self::default().player_name;
        }
        self.max_catch_up_ticks = self.max_catch_up_ticks.max(1);
        if !(self.viewport_width.is_finite() && self.viewport_width > 0.0) {
            self.viewport_width = VIEWPORT_WIDTH;
        }
        self.score_decay_chance = if self.score_decay_chance.is_finite() {
            self.score_decay_chance.clamp(0.0, 1.0)
        } else {
            SCORE_DECAY_CHANCE
        };
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self.music_volume = self.music_volume.clamp(0.0, 1.0);
        self
    }

    /// Per-match tuning taken from these settings
    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            player_name: self.player_name.clone(),
            seed: self.seed,
            score_decay_chance: self.score_decay_chance,
            viewport_width: self.viewport_width,
        }
    }

    /// Game loop clock reading `time`
    pub fn clock<T: TimeSource>(&self, time: T) -> SimulationClock<T> {
        SimulationClock::with_time_source(time, self.max_catch_up_ticks)
    }

    pub fn persist_timeout(&self) -> Duration {
        Duration::from_millis(self.persist_timeout_ms)
    }

    /// Audio backend configured with these volumes
    pub fn audio_manager(&self) -> AudioManager {
        let mut audio = AudioManager::default();
        audio.set_master_volume(self.master_volume);
        audio.set_sfx_volume(self.sfx_volume);
        audio.set_music_volume(self.music_volume);
        audio.set_muted(self.muted);
        audio
    }
}
