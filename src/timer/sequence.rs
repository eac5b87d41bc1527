//! Step sequence builder.
//!
//! Expands an ordered exercise list into the flat list of timed steps a run
//! walks through: one prepare step, then for every set a work step followed by
//! a rest step when the applicable rest is non-zero.

use crate::types::{ExerciseConfig, Step, StepKind};

/// Clamps every exercise into its allowed ranges.
pub fn normalize_exercises(exercises: &[ExerciseConfig]) -> Vec<ExerciseConfig> {
    exercises.iter().map(ExerciseConfig::normalized).collect()
}

/// Builds the step sequence for an already-normalized exercise list.
///
/// Returns an empty sequence for an empty list, so callers never start a
/// zero-length run.
pub fn build_steps(exercises: &[ExerciseConfig], prep_seconds: u32) -> Vec<Step> {
    if exercises.is_empty() {
        return Vec::new();
    }

    let mut steps = vec![Step::prepare(prep_seconds)];

    for (exercise_index, exercise) in exercises.iter().enumerate() {
        let exercise_name = Some(exercise.name.clone()).filter(|name| !name.is_empty());

        for set_number in 1..=exercise.sets {
            let step = |kind, duration| Step {
                kind,
                duration,
                exercise_index: Some(exercise_index),
                set_number: Some(set_number),
                total_sets: Some(exercise.sets),
                exercise_name: exercise_name.clone(),
            };

            steps.push(step(StepKind::Work, exercise.work_seconds));

            let rest = if set_number == exercise.sets {
                exercise.rest_last_seconds
            } else {
                exercise.rest_seconds
            };
            if rest > 0 {
                steps.push(step(StepKind::Rest, rest));
            }
        }
    }

    steps
}
