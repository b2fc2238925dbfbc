//! High score table
//!
//! One record per player name, kept sorted by score (highest first).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of entries shown on the leaderboard
pub const LEADERBOARD_SIZE: usize = 10;

/// A player's best result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub name: String,
    pub score: u64,
    /// Day the score was achieved
    pub date: NaiveDate,
}

/// High score table
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HighScores {
    pub entries: Vec<ScoreRecord>,
}

impl HighScores {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Record for `name`, if the player has one
    pub fn get(&self, name: &str) -> Option<&ScoreRecord> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Insert or replace the record for `name`.
    ///
    /// Replaces unconditionally; deciding whether the new score is worth
    /// keeping is up to the caller. Returns the record's rank (1-indexed).
    pub fn upsert(&mut self, name: &str, score: u64, date: NaiveDate) -> usize {
        self.entries.retain(|e| e.name != name);

        let entry = ScoreRecord {
            name: name.to_string(),
            score,
            date,
        };

        // Ties keep the older record ahead
        let pos = self.entries.iter().position(|e| score > e.score);
        match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        }
    }

    /// Rank of `name` (1-indexed)
    pub fn rank(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name).map(|i| i + 1)
    }

    /// Whether `score` would make the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < LEADERBOARD_SIZE {
            return true;
        }
        self.entries
            .get(LEADERBOARD_SIZE - 1)
            .is_none_or(|e| score > e.score)
    }

    /// The visible leaderboard
    pub fn leaderboard(&self) -> &[ScoreRecord] {
        &self.entries[..self.entries.len().min(LEADERBOARD_SIZE)]
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}
