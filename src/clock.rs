//! Fixed timestep game loop
//!
//! Wall-clock time is accumulated into a lag budget which is spent in
//! whole ticks. Rendering happens once per loop iteration no matter how
//! many ticks ran, so simulation speed is independent of frame rate.
//!
//! The tick rate is always [`TICK_RATE`]: every speed and timer in
//! [`crate::consts`] is expressed per tick.

use std::time::Duration;

use crate::consts::{MAX_CATCH_UP_TICKS, TICK_RATE};
use crate::platform::{MonotonicTime, TimeSource};

const STATS_WINDOW: Duration = Duration::from_secs(1);

/// What the loop should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStatus {
    Running,
    /// Keep rendering, but run no ticks
    Paused,
    Stopped,
}

/// Updates and frames counted over the last complete one-second window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub ups: u32,
    pub fps: u32,
}

/// Something the clock can drive
pub trait Simulation {
    /// Advance exactly one fixed timestep
    fn tick(&mut self);

    /// Present the current state
    fn render(&mut self, stats: FrameStats);

    fn status(&self) -> LoopStatus;

    /// Called once per iteration while paused, so the simulation can
    /// watch for a resume request
    fn poll_paused(&mut self) {}
}

/// Drives a [`Simulation`] at a fixed tick rate
#[derive(Debug)]
pub struct SimulationClock<T: TimeSource = MonotonicTime> {
    time: T,
    tick_duration: Duration,
    max_catch_up: u32,
    lag: Duration,
    last_time: Option<Duration>,
    // Stats window
    window: Duration,
    updates: u32,
    frames: u32,
    stats: FrameStats,
    // Lifetime totals
    ticks_run: u64,
    ticks_dropped: u64,
}

impl SimulationClock<MonotonicTime> {
    /// Real-time clock
    pub fn new(max_catch_up: u32) -> Self {
        Self::with_time_source(MonotonicTime::new(), max_catch_up)
    }
}

impl Default for SimulationClock<MonotonicTime> {
    fn default() -> Self {
        Self::new(MAX_CATCH_UP_TICKS)
    }
}

impl<T: TimeSource> SimulationClock<T> {
    pub fn with_time_source(time: T, max_catch_up: u32) -> Self {
        Self {
            time,
            tick_duration: Duration::from_secs(1) / TICK_RATE,
            max_catch_up: max_catch_up.max(1),
            lag: Duration::ZERO,
            last_time: None,
            window: Duration::ZERO,
            updates: 0,
            frames: 0,
            stats: FrameStats::default(),
            ticks_run: 0,
            ticks_dropped: 0,
        }
    }

    #[inline]
    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    /// Most recent complete UPS/FPS snapshot
    #[inline]
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn ticks_run(&self) -> u64 {
        self.ticks_run
    }

    /// Whole ticks of backlog discarded by the catch-up cap
    pub fn ticks_dropped(&self) -> u64 {
        self.ticks_dropped
    }

    pub fn time(&self) -> &T {
        &self.time
    }

    /// Run until the simulation reports [`LoopStatus::Stopped`]
    pub fn run_until_stopped(&mut self, sim: &mut impl Simulation) {
        log::info!(
            "Game loop started ({:?} per tick, catch-up cap {})",
            self.tick_duration,
            self.max_catch_up
        );

        while sim.status() != LoopStatus::Stopped {
            let now = self.time.now();
            let elapsed = self
                .last_time
                .map_or(Duration::ZERO, |last| now.saturating_sub(last));
            self.last_time = Some(now);

            self.step(sim, elapsed);

            match sim.status() {
                LoopStatus::Running => {
                    // Sleep until the next tick is due
                    let wait = self.tick_duration.saturating_sub(self.lag);
                    self.time.sleep(wait);
                }
                LoopStatus::Paused => {
                    // Time spent paused never reaches the lag budget
                    self.last_time = None;
                    self.time.sleep(self.tick_duration);
                }
                LoopStatus::Stopped => {}
            }
        }

        log::info!(
            "Game loop stopped after {} ticks ({} dropped)",
            self.ticks_run,
            self.ticks_dropped
        );
    }

    /// One loop iteration with `elapsed` time since the previous one.
    ///
    /// Returns the number of ticks run.
    pub fn step(&mut self, sim: &mut impl Simulation, elapsed: Duration) -> u32 {
        let mut ticks = 0;
        match sim.status() {
            LoopStatus::Stopped => return 0,
            LoopStatus::Paused => sim.poll_paused(),
            LoopStatus::Running => {
                self.lag += elapsed;
                while self.lag >= self.tick_duration && ticks < self.max_catch_up {
                    sim.tick();
                    self.lag -= self.tick_duration;
                    ticks += 1;
                    if sim.status() != LoopStatus::Running {
                        break;
                    }
                }

                if sim.status() != LoopStatus::Running {
                    self.lag = Duration::ZERO;
                } else if self.lag >= self.tick_duration {
                    let backlog = self.lag.as_nanos() / self.tick_duration.as_nanos();
                    self.lag -= self.tick_duration * backlog as u32;
                    self.ticks_dropped += backlog as u64;
                    log::debug!("Falling behind, dropped {backlog} ticks of backlog");
                }
            }
        }

        self.updates += ticks;
        self.ticks_run += ticks as u64;
        self.frames += 1;
        self.window += elapsed;
        if self.window >= STATS_WINDOW {
            self.stats = FrameStats {
                ups: self.updates,
                fps: self.frames,
            };
            self.updates = 0;
            self.frames = 0;
            self.window -= STATS_WINDOW;
            if self.window >= STATS_WINDOW {
                // A stall longer than a whole window
                self.window = Duration::ZERO;
            }
        }

        sim.render(self.stats);
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::ManualTime;

    /// Counts calls and stops after a fixed number of ticks
    #[derive(Default)]
    struct Counter {
        ticks: u32,
        renders: u32,
        pause_polls: u32,
        stop_after: u32,
        paused: bool,
        last_stats: FrameStats,
    }

    impl Simulation for Counter {
        fn tick(&mut self) {
            self.ticks += 1;
        }

        fn render(&mut self, stats: FrameStats) {
            self.renders += 1;
            self.last_stats = stats;
        }

        fn status(&self) -> LoopStatus {
            if self.ticks >= self.stop_after {
                LoopStatus::Stopped
            } else if self.paused {
                LoopStatus::Paused
            } else {
                LoopStatus::Running
            }
        }

        fn poll_paused(&mut self) {
            self.pause_polls += 1;
        }
    }

    fn counter(stop_after: u32) -> Counter {
        Counter {
            stop_after,
            ..Counter::default()
        }
    }

    fn clock() -> SimulationClock<ManualTime> {
        SimulationClock::with_time_source(ManualTime::new(), 8)
    }

    #[test]
    fn test_remainder_carries_over() {
        let mut clock = clock();
        let td = clock.tick_duration();
        let mut sim = counter(u32::MAX);

        assert_eq!(clock.step(&mut sim, td * 2 + td / 2), 2);
        assert_eq!(clock.step(&mut sim, td - td / 2), 1);
        assert_eq!(clock.step(&mut sim, Duration::ZERO), 0);
        assert_eq!(sim.ticks, 3);
        assert_eq!(sim.renders, 3);
    }

    #[test]
    fn test_catch_up_is_capped() {
        let mut clock = clock();
        let td = clock.tick_duration();
        let mut sim = counter(u32::MAX);

        assert_eq!(clock.step(&mut sim, td * 20 + td / 2), 8);
        assert_eq!(clock.ticks_dropped(), 12);
        // Backlog is gone, only the fraction remains
        assert_eq!(clock.step(&mut sim, td / 4), 0);
        assert_eq!(clock.step(&mut sim, td - td / 2 - td / 4), 1);
        assert_eq!(clock.ticks_run(), 9);
    }

    #[test]
    fn test_paused_runs_no_ticks() {
        let mut clock = clock();
        let td = clock.tick_duration();
        let mut sim = counter(u32::MAX);
        sim.paused = true;

        assert_eq!(clock.step(&mut sim, td * 100), 0);
        assert_eq!(sim.ticks, 0);
        assert_eq!(sim.pause_polls, 1);
        assert_eq!(sim.renders, 1);

        // Paused time was never banked
        sim.paused = false;
        assert_eq!(clock.step(&mut sim, Duration::ZERO), 0);
        assert_eq!(clock.step(&mut sim, td), 1);
    }

    #[test]
    fn test_stopped_does_nothing() {
        let mut clock = clock();
        let mut sim = counter(0);
        assert_eq!(clock.step(&mut sim, Duration::from_secs(1)), 0);
        assert_eq!(sim.renders, 0);
    }

    #[test]
    fn test_run_until_stopped_paces_by_sleeping() {
        let mut clock = clock();
        let mut sim = counter(360);
        clock.run_until_stopped(&mut sim);

        assert_eq!(sim.ticks, 360);
        assert_eq!(clock.ticks_dropped(), 0);
        // Three seconds of simulated time at 120 Hz
        let elapsed = clock.time().now();
        let expected = clock.tick_duration() * 360;
        assert!(elapsed >= expected - clock.tick_duration());
        assert!(elapsed <= expected + clock.tick_duration());
        assert_eq!(sim.last_stats.ups, TICK_RATE);
    }

    #[test]
    fn test_stats_window() {
        let mut clock = clock();
        let td = clock.tick_duration();
        let mut sim = counter(u32::MAX);
        for _ in 0..119 {
            clock.step(&mut sim, td);
        }
        assert_eq!(clock.stats(), FrameStats::default());
        // 120 * td is a hair under a second
        clock.step(&mut sim, td * 2);
        assert_eq!(clock.stats(), FrameStats { ups: 121, fps: 120 });
        assert_eq!(sim.last_stats, clock.stats());
    }
}
