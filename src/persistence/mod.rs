//! High score persistence
//!
//! - [`ScoreStore`]: parameterized query/upsert by player name
//! - [`MemoryStore`] and [`JsonFileStore`]: the shipped stores
//! - [`record_result`]: keep a new score only if it beats the old one
//! - [`ScoreRecorder`]: runs the write on a background thread

pub mod file;
pub mod recorder;

use chrono::NaiveDate;

use crate::error::PersistenceError;
use crate::highscores::{HighScores, ScoreRecord};
use crate::sim::MatchResult;

pub use file::JsonFileStore;
pub use recorder::{RecorderStatus, ScoreRecorder};

/// Storage for one best score per player
pub trait ScoreStore {
    fn query(&mut self, name: &str) -> Result<Option<ScoreRecord>, PersistenceError>;
    fn upsert(&mut self, name: &str, score: u64, date: NaiveDate) -> Result<(), PersistenceError>;
}

/// What [`record_result`] did with a score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// First score for this player
    Inserted,
    /// Beat the previous best
    Improved { previous: u64 },
    /// Did not beat the previous best; nothing written
    Kept { best: u64 },
}

impl RecordOutcome {
    pub fn wrote(self) -> bool {
        !matches!(self, RecordOutcome::Kept { .. })
    }
}

/// Store `result` if it is the player's first or best score
pub fn record_result(
    store: &mut dyn ScoreStore,
    result: &MatchResult,
) -> Result<RecordOutcome, PersistenceError> {
    let name = result.player_name.as_str();
    let date = result.timestamp.date_naive();

    let outcome = match store.query(name)? {
        Some(existing) if result.score <= existing.score => {
            return Ok(RecordOutcome::Kept {
                best: existing.score,
            });
        }
        Some(existing) => RecordOutcome::Improved {
            previous: existing.score,
        },
        None => RecordOutcome::Inserted,
    };

    store.upsert(name, result.score, date)?;
    log::info!("Recorded score {} for {} ({:?})", result.score, name, outcome);
    Ok(outcome)
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    scores: HighScores,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scores(&self) -> &HighScores {
        &self.scores
    }
}

impl ScoreStore for MemoryStore {
    fn query(&mut self, name: &str) -> Result<Option<ScoreRecord>, PersistenceError> {
        Ok(self.scores.get(name).cloned())
    }

    fn upsert(&mut self, name: &str, score: u64, date: NaiveDate) -> Result<(), PersistenceError> {
        self.scores.upsert(name, score, date);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::MatchOutcome;
    use chrono::{TimeZone, Utc};

    fn result(name: &str, score: u64) -> MatchResult {
        MatchResult {
            outcome: MatchOutcome::Won,
            score,
            player_name: name.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 3, 18, 30, 0).unwrap(),
            ticks: 1000,
        }
    }

    #[test]
    fn test_upsert_only_if_better() {
        let mut store = MemoryStore::new();
        let outcome = record_result(&mut store, &result("ada", 300)).unwrap();
        assert_eq!(outcome, RecordOutcome::Inserted);

        let outcome = record_result(&mut store, &result("ada", 200)).unwrap();
        assert_eq!(outcome, RecordOutcome::Kept { best: 300 });
        assert!(!outcome.wrote());
        assert_eq!(store.scores().get("ada").unwrap().score, 300);

        // Equal is not better
        let outcome = record_result(&mut store, &result("ada", 300)).unwrap();
        assert_eq!(outcome, RecordOutcome::Kept { best: 300 });

        let outcome = record_result(&mut store, &result("ada", 301)).unwrap();
        assert_eq!(outcome, RecordOutcome::Improved { previous: 300 });
        let record = store.scores().get("ada").unwrap();
        assert_eq!(record.score, 301);
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 5, 3).unwrap());
    }

    #[test]
    fn test_names_are_data_not_syntax() {
        let mut store = MemoryStore::new();
        let name = "x'; DROP TABLE scores; --";
        record_result(&mut store, &result(name, 10)).unwrap();
        record_result(&mut store, &result("bob", 20)).unwrap();
        assert_eq!(store.scores().get(name).unwrap().score, 10);
        assert_eq!(store.scores().len(), 2);
    }
}
