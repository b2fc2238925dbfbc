//! Audio cues
//!
//! The match only issues fire-and-forget cues; nothing it does depends on
//! what the audio backend makes of them. [`AudioManager`] is the headless
//! backend: it tracks the music state, applies volume settings and logs.

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;

/// One-shot sound effects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Player died
    Death,
    /// Level cleared
    Victory,
}

impl SoundEffect {
    pub fn name(self) -> &'static str {
        match self {
            SoundEffect::Death => "death",
            SoundEffect::Victory => "victory",
        }
    }
}

/// Everything the match can ask of the audio backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    /// Start a random background track
    MusicStart,
    MusicPause,
    MusicResume,
    MusicStop,
    /// Release the background track's resources
    MusicCull,
    Effect(SoundEffect),
    /// Cut a one-shot short and release it
    StopEffect(SoundEffect),
}

/// Receives audio cues
pub trait AudioSink {
    fn cue(&mut self, cue: AudioCue);
}

/// Collects cues; handy for hosts that forward them elsewhere
impl AudioSink for Vec<AudioCue> {
    fn cue(&mut self, cue: AudioCue) {
        self.push(cue);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicState {
    Stopped,
    Playing,
    Paused,
}

/// Headless audio backend
#[derive(Debug)]
pub struct AudioManager {
    tracks: Vec<String>,
    current_track: Option<usize>,
    music: MusicState,
    rng: Pcg32,
    master_volume: f32,
    music_volume: f32,
    sfx_volume: f32,
    muted: bool,
    effects_played: u32,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(
            vec![
                "sounds/music/castle_theme.ogg".to_string(),
                "sounds/music/battle_march.ogg".to_string(),
                "sounds/music/dark_halls.ogg".to_string(),
            ],
            0,
        )
    }
}

impl AudioManager {
    pub fn new(tracks: Vec<String>, seed: u64) -> Self {
        Self {
            tracks,
            current_track: None,
            music: MusicState::Stopped,
            rng: Pcg32::seed_from_u64(seed),
            master_volume: 0.8,
            music_volume: 0.6,
            sfx_volume: 1.0,
            muted: false,
            effects_played: 0,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set music volume (0.0 - 1.0)
    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn music_state(&self) -> MusicState {
        self.music
    }

    pub fn current_track(&self) -> Option<&str> {
        self.current_track.map(|i| self.tracks[i].as_str())
    }

    /// One-shots that were loud enough to play
    pub fn effects_played(&self) -> u32 {
        self.effects_played
    }

    fn effective_volume(&self, channel: f32) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * channel
        }
    }

    fn start_music(&mut self) {
        if self.tracks.is_empty() {
            log::warn!("No background music available");
            return;
        }
        let track = self.rng.random_range(0..self.tracks.len());
        self.current_track = Some(track);
        self.music = MusicState::Playing;
        log::debug!(
            "Music: {} at volume {:.2}",
            self.tracks[track],
            self.effective_volume(self.music_volume)
        );
    }
}

impl AudioSink for AudioManager {
    fn cue(&mut self, cue: AudioCue) {
        match cue {
            AudioCue::MusicStart => self.start_music(),
            AudioCue::MusicPause if self.music == MusicState::Playing => {
                self.music = MusicState::Paused;
            }
            AudioCue::MusicResume if self.music == MusicState::Paused => {
                self.music = MusicState::Playing;
            }
            AudioCue::MusicStop => self.music = MusicState::Stopped,
            AudioCue::MusicCull => {
                self.music = MusicState::Stopped;
                self.current_track = None;
            }
            AudioCue::Effect(effect) => {
                let vol = self.effective_volume(self.sfx_volume);
                if vol <= 0.0 {
                    return;
                }
                self.effects_played += 1;
                log::debug!("Effect: {} at volume {vol:.2}", effect.name());
            }
            AudioCue::StopEffect(effect) => log::trace!("Effect stopped: {}", effect.name()),
            AudioCue::MusicPause | AudioCue::MusicResume => {
                log::trace!("Ignoring {cue:?} while music is {:?}", self.music);
            }
        }
    }
}
