//! JSON file score store
//!
//! The whole table lives in one JSON file. Writes go to a temporary
//! sibling first and are renamed over the real file, so a crash mid-write
//! leaves the previous table intact. A file that no longer parses is moved
//! aside to `<name>.bak` and the table starts over.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use super::ScoreStore;
use crate::error::PersistenceError;
use crate::highscores::{HighScores, ScoreRecord};

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    scores: HighScores,
}

impl JsonFileStore {
    /// Open the store at `path`, creating an empty table if it is missing
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();
        let scores = load(&path)?;
        log::info!("High scores: {} ({} players)", path.display(), scores.len());
        Ok(Self { path, scores })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn scores(&self) -> &HighScores {
        &self.scores
    }

    fn save(&self) -> Result<(), PersistenceError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(&self.scores)?;
        let tmp = sibling(&self.path, "tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        log::debug!("High scores saved ({} entries)", self.scores.len());
        Ok(())
    }
}

impl ScoreStore for JsonFileStore {
    fn query(&mut self, name: &str) -> Result<Option<ScoreRecord>, PersistenceError> {
        Ok(self.scores.get(name).cloned())
    }

    fn upsert(&mut self, name: &str, score: u64, date: NaiveDate) -> Result<(), PersistenceError> {
        let previous = self.scores.clone();
        self.scores.upsert(name, score, date);
        if let Err(e) = self.save() {
            // Keep memory in step with what is on disk
            self.scores = previous;
            return Err(e);
        }
        Ok(())
    }
}

fn load(path: &Path) -> Result<HighScores, PersistenceError> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::info!("No high scores found, starting fresh");
            return Ok(HighScores::new());
        }
        Err(e) => return Err(e.into()),
    };

    match serde_json::from_str::<HighScores>(&json) {
        Ok(scores) => Ok(scores),
        Err(e) => {
            let backup = sibling(path, "bak");
            log::warn!(
                "High score file {} is corrupt ({e}), moving it to {}",
                path.display(),
                backup.display()
            );
            fs::rename(path, &backup)?;
            Ok(HighScores::new())
        }
    }
}

/// `scores.json` -> `scores.json.<ext>`
fn sibling(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}
