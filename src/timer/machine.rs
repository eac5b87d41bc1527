//! Timer state machine.
//!
//! `TimerMachine` owns the step sequence of one run plus the mutable
//! `TimerState`. Every operation is synchronous and safe to call in any state;
//! calls that make no sense in the current state are no-ops and return `false`.
//!
//! ```text
//! Idle → Prepare → Work → Rest → Work → … → Work → Done
//! ```

use tracing::{debug, info};

use super::duration::workout_duration;
use super::sequence::{build_steps, normalize_exercises};
use super::{PREP_SECONDS, REWIND_THRESHOLD_SECONDS};
use crate::types::{ExerciseConfig, Phase, QuickTimerSettings, Step, TimerStatus};

// ============================================================================
// TimerState
// ============================================================================

/// Mutable state of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerState {
    pub phase: Phase,
    /// `None` exactly when idle
    pub current_step_index: Option<usize>,
    pub remaining_seconds: u32,
    pub is_running: bool,
    pub is_paused: bool,
}

// ============================================================================
// TimerMachine
// ============================================================================

/// Finite-state machine driving one interval workout.
#[derive(Debug, Clone, Default)]
pub struct TimerMachine {
    settings: QuickTimerSettings,
    steps: Vec<Step>,
    exercises: Vec<ExerciseConfig>,
    workout_name: Option<String>,
    state: TimerState,
}

impl TimerMachine {
    /// Creates an idle machine with the given quick timer settings.
    pub fn new(settings: QuickTimerSettings) -> Self {
        Self {
            settings: settings.clamped(),
            ..Self::default()
        }
    }

    /// Returns the quick timer settings.
    pub fn settings(&self) -> QuickTimerSettings {
        self.settings
    }

    /// Replaces the quick timer settings. Takes effect on the next quick start.
    pub fn set_settings(&mut self, settings: QuickTimerSettings) {
        self.settings = settings.clamped();
    }

    /// Starts a run over the given exercises.
    ///
    /// An empty list returns the machine to idle and reports `false`.
    pub fn start(&mut self, exercises: &[ExerciseConfig], workout_name: Option<String>) -> bool {
        let normalized = normalize_exercises(exercises);
        let steps = build_steps(&normalized, PREP_SECONDS);

        let Some(first) = steps.first() else {
            debug!("Start ignored: no exercises");
            self.reset();
            return false;
        };

        self.state = TimerState {
            phase: first.kind.into(),
            current_step_index: Some(0),
            remaining_seconds: first.duration,
            is_running: true,
            is_paused: false,
        };
        info!(
            steps = steps.len(),
            exercises = normalized.len(),
            "Workout started"
        );

        self.steps = steps;
        self.exercises = normalized;
        self.workout_name = workout_name;
        true
    }

    /// Starts a quick run from the current settings.
    pub fn start_quick(&mut self) -> bool {
        let exercise = self.settings.as_exercise();
        self.start(&[exercise], None)
    }

    /// Returns to idle, discarding the sequence.
    pub fn reset(&mut self) {
        self.steps.clear();
        self.exercises.clear();
        self.workout_name = None;
        self.state = TimerState::default();
    }

    /// Moves to the next step, or to `Done` from the last step.
    ///
    /// Used both by the countdown reaching zero and by skip-forward.
    pub fn advance(&mut self) -> bool {
        let Some(index) = self.state.current_step_index else {
            return false;
        };
        if self.steps.is_empty() || self.state.phase == Phase::Done {
            return false;
        }

        let next_index = index + 1;
        match self.steps.get(next_index) {
            Some(next) => {
                self.state.phase = next.kind.into();
                self.state.remaining_seconds = next.duration;
                self.state.current_step_index = Some(next_index);
                debug!(step = next_index, phase = self.state.phase.as_str(), "Advanced");
            }
            None => {
                self.state.phase = Phase::Done;
                self.state.is_running = false;
                self.state.is_paused = false;
                self.state.remaining_seconds = 0;
                info!("Workout finished");
            }
        }
        true
    }

    /// Manual skip forward. No-op unless running.
    pub fn skip_forward(&mut self) -> bool {
        if !self.state.is_running {
            return false;
        }
        self.advance()
    }

    /// Manual skip back.
    ///
    /// Restarts the current step once it has run for at least
    /// [`REWIND_THRESHOLD_SECONDS`]; otherwise moves to the previous step. The
    /// first step is restarted rather than underflowing. No-op unless running.
    pub fn rewind(&mut self) -> bool {
        if !self.state.is_running {
            return false;
        }
        let Some((index, duration)) = self
            .current_step_with_index()
            .map(|(index, step)| (index, step.duration))
        else {
            return false;
        };

        let elapsed = duration.saturating_sub(self.state.remaining_seconds);
        if elapsed >= REWIND_THRESHOLD_SECONDS || index == 0 {
            self.state.remaining_seconds = duration;
            debug!(step = index, elapsed, "Restarted current step");
            return true;
        }

        let previous_index = index - 1;
        let previous = &self.steps[previous_index];
        self.state.phase = previous.kind.into();
        self.state.remaining_seconds = previous.duration;
        self.state.current_step_index = Some(previous_index);
        debug!(step = previous_index, "Moved back one step");
        true
    }

    /// Flips the paused flag while a run is in progress.
    pub fn toggle_pause(&mut self) -> bool {
        if !self.state.is_running || self.state.phase == Phase::Done {
            return false;
        }
        self.state.is_paused = !self.state.is_paused;
        true
    }

    /// Decrements the remaining time by one second, floored at zero.
    ///
    /// Returns true if the current step has reached zero. Ignored unless the
    /// machine is counting.
    pub fn tick(&mut self) -> bool {
        if !self.is_counting() {
            return false;
        }
        self.state.remaining_seconds = self.state.remaining_seconds.saturating_sub(1);
        self.state.remaining_seconds == 0
    }

    /// Returns true while ticks should be applied.
    pub fn is_counting(&self) -> bool {
        self.state.is_running
            && !self.state.is_paused
            && self.state.phase != Phase::Done
            && self.state.remaining_seconds > 0
    }

    /// Seconds left in the whole workout from the current instant.
    pub fn overall_remaining(&self) -> u32 {
        match self.state.phase {
            Phase::Idle => workout_duration(&[self.settings.as_exercise()], PREP_SECONDS),
            Phase::Done => 0,
            _ => {
                let future: u32 = self
                    .state
                    .current_step_index
                    .map(|index| self.steps.iter().skip(index + 1).map(|s| s.duration).sum())
                    .unwrap_or(0);
                self.state.remaining_seconds + future
            }
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> &TimerState {
        &self.state
    }

    /// Returns the step sequence of the current run.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Returns the normalized exercises of the current run.
    pub fn exercises(&self) -> &[ExerciseConfig] {
        &self.exercises
    }

    /// Returns the label of the current run, if any.
    pub fn workout_name(&self) -> Option<&str> {
        self.workout_name.as_deref()
    }

    /// Returns the active step.
    pub fn current_step(&self) -> Option<&Step> {
        self.current_step_with_index().map(|(_, step)| step)
    }

    fn current_step_with_index(&self) -> Option<(usize, &Step)> {
        let index = self.state.current_step_index?;
        self.steps.get(index).map(|step| (index, step))
    }

    /// Builds the read-only status snapshot.
    pub fn status(&self) -> TimerStatus {
        let step = self.current_step();
        let current_exercise_index = step.and_then(|s| s.exercise_index);
        let current_exercise = current_exercise_index.and_then(|i| self.exercises.get(i));

        let exercise_name = step
            .and_then(|s| s.exercise_name.clone())
            .or_else(|| self.workout_name.clone())
            .unwrap_or_default();

        TimerStatus {
            phase: self.state.phase,
            remaining_seconds: self.state.remaining_seconds,
            current_set_number: step.and_then(|s| s.set_number).unwrap_or(0),
            total_sets_for_current_exercise: step
                .and_then(|s| s.total_sets)
                .or_else(|| current_exercise.map(|e| e.sets))
                .unwrap_or(0),
            step_duration: step.map(|s| s.duration).unwrap_or(0),
            exercise_name,
            current_exercise_index,
            total_exercises: self.exercises.len(),
            overall_remaining: self.overall_remaining(),
            is_paused: self.state.is_paused,
            is_running: self.state.is_running,
            workout_name: self.workout_name.clone(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
