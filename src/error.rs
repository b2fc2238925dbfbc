//! Error types for the fallible edges of the game: loading levels and
//! settings, persisting high scores, and presenting frames.

use thiserror::Error;

/// Failure to present a frame. The loop logs it and keeps running.
#[derive(Debug, Error)]
pub enum RenderError {
    /// An image or sound could not be loaded
    #[error("asset unavailable: {0}")]
    Asset(String),
    #[error("render surface lost")]
    SurfaceLost,
}

/// Failure to read or write high scores
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("score store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("score data malformed: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("score store did not answer within {0} ms")]
    Timeout(u64),
    #[error("score recorder is gone")]
    Disconnected,
}

/// Failure to load a level
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("cannot read level {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse level: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid level: {0}")]
    Invalid(String),
}

/// Failure to load or save settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("settings I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings malformed: {0}")]
    Parse(#[from] serde_json::Error),
}
