//! Background score recording
//!
//! The store may be slow (disk, network). The write runs on its own
//! thread and reports back over a channel, which the game loop polls
//! without blocking. At shutdown [`ScoreRecorder::finish`] waits for the
//! write, but only up to a deadline.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::{RecordOutcome, ScoreStore, record_result};
use crate::error::PersistenceError;
use crate::sim::MatchResult;

/// A store shared between the game and the recorder thread
pub type SharedStore = Arc<Mutex<dyn ScoreStore + Send>>;

type Report = Result<RecordOutcome, PersistenceError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderStatus {
    /// Nothing submitted yet
    Idle,
    /// Write in flight
    Pending,
    Recorded(RecordOutcome),
    Failed,
}

/// Records at most one match result per match
pub struct ScoreRecorder {
    store: SharedStore,
    rx: Option<Receiver<Report>>,
    worker: Option<JoinHandle<()>>,
    status: RecorderStatus,
    error: Option<PersistenceError>,
}

impl ScoreRecorder {
    pub fn new(store: impl ScoreStore + Send + 'static) -> Self {
        Self::shared(Arc::new(Mutex::new(store)))
    }

    pub fn shared(store: SharedStore) -> Self {
        Self {
            store,
            rx: None,
            worker: None,
            status: RecorderStatus::Idle,
            error: None,
        }
    }

    pub fn status(&self) -> RecorderStatus {
        self.status
    }

    /// Whether a result has been submitted
    pub fn submitted(&self) -> bool {
        self.status != RecorderStatus::Idle
    }

    /// Start writing `result` in the background.
    ///
    /// Returns `false` and does nothing if a result was already submitted.
    pub fn record(&mut self, result: MatchResult) -> bool {
        if self.submitted() {
            log::warn!("Ignoring a second result for this match");
            return false;
        }

        let (tx, rx) = mpsc::channel();
        let store = Arc::clone(&self.store);
        let spawned = thread::Builder::new()
            .name("score-recorder".to_string())
            .spawn(move || {
                let mut store = store.lock().unwrap_or_else(PoisonError::into_inner);
                let report = record_result(&mut *store, &result);
                // The game may have shut down already; nobody to tell
                let _ = tx.send(report);
            });

        match spawned {
            Ok(worker) => {
                self.rx = Some(rx);
                self.worker = Some(worker);
                self.status = RecorderStatus::Pending;
            }
            Err(e) => {
                log::warn!("Could not start score recorder: {e}");
                self.fail(e.into());
            }
        }
        true
    }

    /// Check for a finished write without blocking
    pub fn poll(&mut self) -> RecorderStatus {
        let Some(rx) = &self.rx else {
            return self.status;
        };
        match rx.try_recv() {
            Ok(report) => self.settle(report),
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => self.fail(PersistenceError::Disconnected),
        }
        self.status
    }

    /// Wait up to `timeout` for the write.
    ///
    /// `Ok(None)` when nothing was ever submitted. A timeout leaves the
    /// write pending, so this may be called again.
    pub fn finish(&mut self, timeout: Duration) -> Result<Option<RecordOutcome>, PersistenceError> {
        if let Some(rx) = &self.rx {
            match rx.recv_timeout(timeout) {
                Ok(report) => self.settle(report),
                Err(RecvTimeoutError::Timeout) => {
                    log::warn!("Score write still pending after {timeout:?}");
                    return Err(PersistenceError::Timeout(timeout.as_millis() as u64));
                }
                Err(RecvTimeoutError::Disconnected) => self.fail(PersistenceError::Disconnected),
            }
        }

        if let Some(e) = self.error.take() {
            return Err(e);
        }
        match self.status {
            RecorderStatus::Recorded(outcome) => Ok(Some(outcome)),
            _ => Ok(None),
        }
    }

    fn settle(&mut self, report: Report) {
        match report {
            Ok(outcome) => {
                log::debug!("Score write finished: {outcome:?}");
                self.status = RecorderStatus::Recorded(outcome);
                self.rx = None;
                self.join();
            }
            Err(e) => self.fail(e),
        }
    }

    fn fail(&mut self, error: PersistenceError) {
        log::warn!("Failed to record score: {error}");
        self.status = RecorderStatus::Failed;
        self.error = Some(error);
        self.rx = None;
        self.join();
    }

    fn join(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("Score recorder thread panicked");
            }
        }
    }
}

impl std::fmt::Debug for ScoreRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreRecorder")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::ScoreRecord;
    use crate::persistence::MemoryStore;
    use crate::sim::MatchOutcome;
    use chrono::{NaiveDate, Utc};

    fn result(score: u64) -> MatchResult {
        MatchResult {
            outcome: MatchOutcome::Lost,
            score,
            player_name: "ada".to_string(),
            timestamp: Utc::now(),
            ticks: 10,
        }
    }

    struct SlowStore(Duration);

    impl ScoreStore for SlowStore {
        fn query(&mut self, _name: &str) -> Result<Option<ScoreRecord>, PersistenceError> {
            thread::sleep(self.0);
            Ok(None)
        }

        fn upsert(&mut self, _: &str, _: u64, _: NaiveDate) -> Result<(), PersistenceError> {
            Ok(())
        }
    }

    struct BrokenStore;

    impl ScoreStore for BrokenStore {
        fn query(&mut self, _name: &str) -> Result<Option<ScoreRecord>, PersistenceError> {
            Err(std::io::Error::other("disk on fire").into())
        }

        fn upsert(&mut self, _: &str, _: u64, _: NaiveDate) -> Result<(), PersistenceError> {
            unreachable!()
        }
    }

    #[test]
    fn test_records_once() {
        let store = Arc::new(Mutex::new(MemoryStore::new()));
        let mut recorder = ScoreRecorder::shared(store.clone());
        assert_eq!(recorder.finish(Duration::ZERO).unwrap(), None);

        assert!(recorder.record(result(40)));
        assert!(!recorder.record(result(90)));

        let outcome = recorder.finish(Duration::from_secs(5)).unwrap();
        assert_eq!(outcome, Some(RecordOutcome::Inserted));
        assert_eq!(recorder.poll(), RecorderStatus::Recorded(RecordOutcome::Inserted));
        assert_eq!(store.lock().unwrap().scores().get("ada").unwrap().score, 40);
    }

    #[test]
    fn test_finish_times_out_then_completes() {
        let mut recorder = ScoreRecorder::new(SlowStore(Duration::from_millis(300)));
        recorder.record(result(1));
        assert_eq!(recorder.poll(), RecorderStatus::Pending);

        let err = recorder.finish(Duration::from_millis(1)).unwrap_err();
        assert!(matches!(err, PersistenceError::Timeout(1)));

        let outcome = recorder.finish(Duration::from_secs(5)).unwrap();
        assert_eq!(outcome, Some(RecordOutcome::Inserted));
    }

    #[test]
    fn test_store_failure_is_reported() {
        let mut recorder = ScoreRecorder::new(BrokenStore);
        recorder.record(result(1));
        let err = recorder.finish(Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, PersistenceError::Io(_)));
        assert_eq!(recorder.status(), RecorderStatus::Failed);
    }
}
