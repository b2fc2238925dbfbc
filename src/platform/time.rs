//! Monotonic time and sleeping

use std::time::{Duration, Instant};

/// A monotonic clock the game loop can read and block on
pub trait TimeSource {
    /// Time since an arbitrary, fixed origin. Never goes backwards.
    fn now(&self) -> Duration;

    /// Block the calling thread for roughly `duration`
    fn sleep(&mut self, duration: Duration);
}

/// Real time backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct MonotonicTime {
    origin: Instant,
}

impl MonotonicTime {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicTime {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Hand-driven time. Sleeping advances the clock instantly.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualTime {
    now: Duration,
}

impl ManualTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }
}

impl TimeSource for ManualTime {
    fn now(&self) -> Duration {
        self.now
    }

    fn sleep(&mut self, duration: Duration) {
        self.advance(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_time_sleep_advances() {
        let mut time = ManualTime::new();
        assert_eq!(time.now(), Duration::ZERO);
        time.sleep(Duration::from_millis(5));
        time.advance(Duration::from_millis(10));
        assert_eq!(time.now(), Duration::from_millis(15));
    }

    #[test]
    fn test_monotonic_time_never_goes_back() {
        let mut time = MonotonicTime::new();
        let a = time.now();
        time.sleep(Duration::from_millis(1));
        assert!(time.now() >= a + Duration::from_millis(1));
    }
}
