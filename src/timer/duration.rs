//! Total-duration arithmetic for exercises and workouts.
//!
//! These totals are for display and for the idle overall-remaining value.
//! The step sequence is always built by the sequencer, never from these sums.

use crate::types::ExerciseConfig;

/// Total seconds for one exercise.
///
/// `sets * work + (sets - 1) * rest + rest_last`, saturating at `u32::MAX`.
pub fn exercise_duration(exercise: &ExerciseConfig) -> u32 {
    let between_sets_rest = exercise
        .sets
        .saturating_sub(1)
        .saturating_mul(exercise.rest_seconds);
    exercise
        .sets
        .saturating_mul(exercise.work_seconds)
        .saturating_add(between_sets_rest)
        .saturating_add(exercise.rest_last_seconds)
}

/// Total seconds for a workout, including the prepare count-in.
pub fn workout_duration(exercises: &[ExerciseConfig], prep_seconds: u32) -> u32 {
    exercises
        .iter()
        .map(exercise_duration)
        .fold(prep_seconds, u32::saturating_add)
}
