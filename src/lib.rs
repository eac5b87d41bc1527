//! HIIT Timer Library
//!
//! This library provides the core functionality for the HIIT timer CLI.
//! It includes:
//! - The pure timer core: durations, step sequencing, the phase state machine
//!   and spoken cue detection
//! - The daemon: timer engine, one-second scheduler, IPC server and event
//!   dispatcher
//! - Text-to-speech and a fallback cue tone for announcements
//! - Workout library and completion history persistence
//! - CLI command parsing, IPC client and display utilities

pub mod cli;
pub mod config;
pub mod daemon;
pub mod sound;
pub mod speech;
pub mod storage;
pub mod timer;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    ExerciseConfig, IpcRequest, IpcResponse, Phase, QuickTimerSettings, StartParams, Step,
    StepKind, TimerStatus, WorkoutPlan,
};

pub use config::HiitConfig;

// Re-export the timer core
pub use timer::{
    build_steps, exercise_duration, workout_duration, Announcer, Cue, TimerMachine,
    PREP_SECONDS, REWIND_THRESHOLD_SECONDS,
};

// Re-export collaborator types
pub use sound::{MockTonePlayer, RodioTonePlayer, SoundError, TonePlayer};
pub use speech::{CommandSpeaker, MockSpeaker, Speaker, SpeechError};
pub use storage::{StorageError, WorkoutHistory, WorkoutLibrary};
