//! Platform abstraction layer
//!
//! The simulation never touches devices or the wall clock directly:
//! - Time: [`TimeSource`] (monotonic clock and blocking sleep)
//! - Input: [`InputSource`] (intent flags polled once per tick)

pub mod input;
pub mod time;

pub use input::{InputSource, ScriptStep, ScriptedInput};
pub use time::{ManualTime, MonotonicTime, TimeSource};
