//! Castle Run - a side-scrolling sword fighting game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, AI, match state)
//! - `clock`: Fixed-timestep loop driving the simulation
//! - `game`: Match controller wiring the simulation to its collaborators
//! - `level`: Level data format and loading
//! - `platform`, `render`, `audio`, `persistence`: Collaborator seams
//! - `settings`: Data-driven configuration

pub mod audio;
pub mod clock;
pub mod error;
pub mod game;
pub mod highscores;
pub mod level;
pub mod persistence;
pub mod platform;
pub mod render;
pub mod settings;
pub mod sim;

pub use clock::{FrameStats, LoopStatus, Simulation, SimulationClock};
pub use game::MatchController;
pub use highscores::HighScores;
pub use settings::Settings;

/// Game configuration constants
///
/// World units are pixels, y grows downward and
/// velocities are expressed in units per tick.
pub mod consts {
    /// Simulation rate (ticks per second)
    pub const TICK_RATE: u32 = 120;
    /// Maximum catch-up ticks per loop iteration to prevent spiral of death
    pub const MAX_CATCH_UP_TICKS: u32 = 8;

    /// Downward acceleration per tick
    pub const GRAVITY: f32 = 0.5;
    /// Maximum falling speed
    pub const TERMINAL_VELOCITY: f32 = 20.0;

    /// Player body dimensions
    pub const PLAYER_WIDTH: f32 = 100.0;
    pub const PLAYER_HEIGHT: f32 = 300.0;
    pub const PLAYER_MAX_HEALTH: i32 = 100;

    /// Horizontal speeds
    pub const WALK_SPEED: f32 = 4.0;
    pub const RUN_SPEED: f32 = 8.0;
    pub const CROUCH_SPEED: f32 = 2.0;
    /// Initial jump velocity (negative is up)
    pub const JUMP_VELOCITY: f32 = -14.0;

    /// Stamina pool
    pub const STAMINA_MAX: f32 = 1000.0;
    pub const STAMINA_RUN_DRAIN: f32 = 4.0;
    pub const STAMINA_STRIKE_DRAIN: f32 = 6.0;
    pub const STAMINA_REGEN: f32 = 2.0;
    /// Stamina needed before an exhausted actor may run or strike again
    pub const EXHAUSTION_RECOVERY: f32 = 200.0;

    /// Player sword
    pub const SWORD_WIDTH: f32 = 120.0;
    pub const SWORD_HEIGHT: f32 = 40.0;
    pub const SWORD_DAMAGE: i32 = 25;
    pub const PLAYER_SWING_TICKS: u32 = 24;

    /// Score awarded for each enemy killed
    pub const KILL_SCORE: u64 = 50;
    /// Default chance per tick that the score decays by one point
    pub const SCORE_DECAY_CHANCE: f64 = 0.005;

    /// Visible width of the play field
    pub const VIEWPORT_WIDTH: f32 = 1280.0;
    /// The finish line only counts while the player stands above this height
    pub const WIN_MAX_Y: f32 = 1000.0;
    /// Falling below this height kills an actor
    pub const DEFAULT_KILL_PLANE_Y: f32 = 2000.0;
}
