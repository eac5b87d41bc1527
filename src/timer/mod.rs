//! Timer core for interval workouts.
//!
//! Pure, synchronous building blocks with no I/O:
//! - `duration`: total seconds for exercises and workouts
//! - `sequence`: expansion of exercises into timed steps
//! - `machine`: the phase state machine with skip, rewind and pause
//! - `announce`: de-duplicated spoken cue detection

pub mod announce;
pub mod duration;
pub mod machine;
pub mod sequence;

pub use announce::{Announcer, Cue};
pub use duration::{exercise_duration, workout_duration};
pub use machine::{TimerMachine, TimerState};
pub use sequence::{build_steps, normalize_exercises};

/// Length of the count-in before the first work step.
pub const PREP_SECONDS: u32 = 10;

/// Elapsed seconds after which skip-back restarts the current step instead of
/// moving to the previous one.
pub const REWIND_THRESHOLD_SECONDS: u32 = 5;
