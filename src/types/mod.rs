//! Core data types for the HIIT timer.
//!
//! This module defines the data structures used for:
//! - Exercise and workout definitions with clamping at the input boundary
//! - The flattened step sequence and timer phases
//! - The read-only status snapshot exposed to the CLI
//! - IPC request/response serialization

use serde::{Deserialize, Serialize};

// ============================================================================
// Limits
// ============================================================================

/// Allowed range for the number of sets of a saved exercise.
pub const EXERCISE_SETS_RANGE: (u32, u32) = (1, 50);

/// Allowed range for work seconds of a saved exercise.
pub const EXERCISE_WORK_RANGE: (u32, u32) = (5, 3600);

/// Allowed range for rest and last-rest seconds of a saved exercise.
pub const EXERCISE_REST_RANGE: (u32, u32) = (0, 3600);

/// Allowed range for quick timer sets.
pub const QUICK_SETS_RANGE: (u32, u32) = (1, 20);

/// Allowed range for quick timer work and rest seconds.
pub const QUICK_SECONDS_RANGE: (u32, u32) = (5, 600);

fn clamp_to(value: u32, (min, max): (u32, u32)) -> u32 {
    value.clamp(min, max)
}

// ============================================================================
// Phase
// ============================================================================

/// Represents the current phase of the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No workout loaded
    #[default]
    Idle,
    /// Count-in before the first work step
    Prepare,
    /// Work interval
    Work,
    /// Rest interval
    Rest,
    /// Sequence fully consumed
    Done,
}

impl Phase {
    /// Returns the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Prepare => "prepare",
            Phase::Work => "work",
            Phase::Rest => "rest",
            Phase::Done => "done",
        }
    }

    /// Returns true for the bookend states from which a new run may start.
    pub fn is_stopped(&self) -> bool {
        matches!(self, Phase::Idle | Phase::Done)
    }
}

// ============================================================================
// Step
// ============================================================================

/// Kind of a timed step in the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    Prepare,
    Work,
    Rest,
}

impl From<StepKind> for Phase {
    fn from(kind: StepKind) -> Self {
        match kind {
            StepKind::Prepare => Phase::Prepare,
            StepKind::Work => Phase::Work,
            StepKind::Rest => Phase::Rest,
        }
    }
}

/// One atomic timed phase in the flattened run sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub kind: StepKind,
    /// Duration in seconds
    pub duration: u32,
    /// Index into the exercise list; `None` for the prepare step
    pub exercise_index: Option<usize>,
    /// 1-based set number
    pub set_number: Option<u32>,
    pub total_sets: Option<u32>,
    pub exercise_name: Option<String>,
}

impl Step {
    /// Creates the prepare step that opens every sequence.
    pub fn prepare(duration: u32) -> Self {
        Self {
            kind: StepKind::Prepare,
            duration,
            exercise_index: None,
            set_number: None,
            total_sets: None,
            exercise_name: None,
        }
    }
}

// ============================================================================
// ExerciseConfig
// ============================================================================

/// One repeatable exercise block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseConfig {
    pub id: String,
    pub name: String,
    /// Number of sets (1-50)
    pub sets: u32,
    /// Work seconds per set (5-3600)
    pub work_seconds: u32,
    /// Rest seconds between sets (0-3600)
    pub rest_seconds: u32,
    /// Rest seconds after the final set (0-3600)
    #[serde(default)]
    pub rest_last_seconds: u32,
}

impl ExerciseConfig {
    /// Creates an exercise with no rest after the final set.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        sets: u32,
        work_seconds: u32,
        rest_seconds: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sets,
            work_seconds,
            rest_seconds,
            rest_last_seconds: 0,
        }
    }

    /// Sets the rest duration after the final set.
    pub fn with_rest_last_seconds(mut self, seconds: u32) -> Self {
        self.rest_last_seconds = seconds;
        self
    }

    /// Returns a copy with every field clamped into its allowed range.
    pub fn normalized(&self) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            sets: clamp_to(self.sets, EXERCISE_SETS_RANGE),
            work_seconds: clamp_to(self.work_seconds, EXERCISE_WORK_RANGE),
            rest_seconds: clamp_to(self.rest_seconds, EXERCISE_REST_RANGE),
            rest_last_seconds: clamp_to(self.rest_last_seconds, EXERCISE_REST_RANGE),
        }
    }
}

// ============================================================================
// WorkoutPlan
// ============================================================================

/// A saved, named list of exercises.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub exercises: Vec<ExerciseConfig>,
}

// ============================================================================
// QuickTimerSettings
// ============================================================================

/// Ambient sets/work/rest used by an ad-hoc quick timer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuickTimerSettings {
    /// Number of sets (1-20)
    pub sets: u32,
    /// Work seconds (5-600)
    pub work_seconds: u32,
    /// Rest seconds between sets (5-600)
    pub rest_seconds: u32,
}

impl Default for QuickTimerSettings {
    fn default() -> Self {
        Self {
            sets: 4,
            work_seconds: 30,
            rest_seconds: 60,
        }
    }
}

impl QuickTimerSettings {
    /// Returns a copy with the specified sets, clamped.
    pub fn with_sets(mut self, sets: u32) -> Self {
        self.sets = clamp_to(sets, QUICK_SETS_RANGE);
        self
    }

    /// Returns a copy with the specified work seconds, clamped.
    pub fn with_work_seconds(mut self, seconds: u32) -> Self {
        self.work_seconds = clamp_to(seconds, QUICK_SECONDS_RANGE);
        self
    }

    /// Returns a copy with the specified rest seconds, clamped.
    pub fn with_rest_seconds(mut self, seconds: u32) -> Self {
        self.rest_seconds = clamp_to(seconds, QUICK_SECONDS_RANGE);
        self
    }

    /// Returns a copy with every field clamped into its allowed range.
    pub fn clamped(self) -> Self {
        Self::default()
            .with_sets(self.sets)
            .with_work_seconds(self.work_seconds)
            .with_rest_seconds(self.rest_seconds)
    }

    /// The one-exercise list a quick run is built from.
    pub fn as_exercise(&self) -> ExerciseConfig {
        ExerciseConfig::new("quick", "", self.sets, self.work_seconds, self.rest_seconds)
    }
}

// ============================================================================
// TimerStatus
// ============================================================================

/// Read-only status snapshot of the timer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerStatus {
    pub phase: Phase,
    pub remaining_seconds: u32,
    /// 0 when the current step has no set
    pub current_set_number: u32,
    pub total_sets_for_current_exercise: u32,
    pub step_duration: u32,
    /// Current exercise name, falling back to the workout label
    pub exercise_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_exercise_index: Option<usize>,
    pub total_exercises: usize,
    pub overall_remaining: u32,
    pub is_paused: bool,
    pub is_running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workout_name: Option<String>,
}

// ============================================================================
// IPC Types
// ============================================================================

/// Parameters for the start command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartParams {
    /// Saved workout id or name; quick timer when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sets: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest_seconds: Option<u32>,
}

/// IPC request from client to daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum IpcRequest {
    /// Start a new run
    Start {
        #[serde(flatten)]
        params: StartParams,
    },
    /// Pause or resume the current run
    TogglePause,
    /// Skip to the next step
    SkipForward,
    /// Restart the current step or go back one step
    SkipBack,
    /// Stop and return to idle
    Reset,
    /// Query the current status
    Status,
}

/// IPC response from daemon to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcResponse {
    /// Response status ("success" or "error")
    pub status: String,
    /// Human-readable message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<TimerStatus>,
}

impl IpcResponse {
    /// Creates a success response.
    pub fn success(message: impl Into<String>, data: Option<TimerStatus>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }

    /// Returns true for an error response.
    pub fn is_error(&self) -> bool {
        self.status == "error"
    }
}

// ============================================================================
// Tests
// ============================================================================
