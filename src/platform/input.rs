//! Input sources
//!
//! Device plumbing (keyboards, gamepads, edge detection) lives outside the
//! simulation. Whatever reads the device hands the match a [`TickInput`]
//! once per tick; one-shot toggles must already be edge-detected.

use crate::sim::TickInput;

/// Produces the player's intent for the next tick
pub trait InputSource {
    fn poll(&mut self) -> TickInput;
}

/// One segment of a scripted input sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptStep {
    /// Number of polls this input is held for
    pub ticks: u32,
    pub input: TickInput,
}

impl ScriptStep {
    pub fn new(ticks: u32, input: TickInput) -> Self {
        Self { ticks, input }
    }
}

/// Plays back a fixed input script, for tests and the headless demo.
///
/// Held flags repeat for the whole step. Toggles (pause, debug) only fire
/// on the first poll of their step so a held key toggles once.
#[derive(Debug, Clone)]
pub struct ScriptedInput {
    steps: Vec<ScriptStep>,
    looping: bool,
    step: usize,
    elapsed: u32,
}

impl ScriptedInput {
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self {
            steps,
            looping: false,
            step: 0,
            elapsed: 0,
        }
    }

    /// Start over from the first step once the script runs out
    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    /// Whether a non-looping script has played every step
    pub fn is_finished(&self) -> bool {
        !self.looping && self.step >= self.steps.len()
    }

    /// Walk right, jumping and swinging at regular intervals
    pub fn demo() -> Self {
        let walk = TickInput {
            move_right: true,
            ..TickInput::default()
        };
        let run = TickInput { run: true, ..walk };
        let jump = TickInput { jump: true, ..run };
        let strike = TickInput { strike: true, ..walk };
        Self::new(vec![
            ScriptStep::new(120, walk),
            ScriptStep::new(90, run),
            ScriptStep::new(20, jump),
            ScriptStep::new(30, strike),
            ScriptStep::new(60, TickInput::default()),
        ])
        .looping()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> TickInput {
        if self.steps.is_empty() {
            return TickInput::default();
        }
        if self.step >= self.steps.len() {
            if !self.looping {
                return TickInput::default();
            }
            self.step = 0;
            self.elapsed = 0;
        }

        let current = self.steps[self.step];
        let mut input = current.input;
        if self.elapsed > 0 {
            input.toggle_pause = false;
            input.toggle_debug = false;
        }

        self.elapsed += 1;
        if self.elapsed >= current.ticks {
            self.step += 1;
            self.elapsed = 0;
        }
        input
    }
}
