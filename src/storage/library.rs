//! Workout library.
//!
//! The library is a JSON list of [`WorkoutPlan`]s, newest first. Mutations are
//! made in memory; call [`WorkoutLibrary::save`] to persist them.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use uuid::Uuid;

use super::{read_json, write_json, StorageError};
use crate::types::{ExerciseConfig, WorkoutPlan};

/// Library file name inside the data directory.
pub const WORKOUTS_FILE: &str = "workouts.json";

/// Name given to a workout created without one.
pub const DEFAULT_WORKOUT_NAME: &str = "New workout";

/// Saved workouts backed by a JSON file.
#[derive(Debug, Clone)]
pub struct WorkoutLibrary {
    path: PathBuf,
    workouts: Vec<WorkoutPlan>,
}

impl WorkoutLibrary {
    /// Opens the library in `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(data_dir: &Path) -> Result<Self, StorageError> {
        Self::load(data_dir.join(WORKOUTS_FILE))
    }

    /// Loads the library from a specific file.
    ///
    /// Every exercise is normalized, so hand-edited values are clamped the
    /// same way as saved ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: PathBuf) -> Result<Self, StorageError> {
        let mut workouts: Vec<WorkoutPlan> = read_json(&path)?;
        for workout in &mut workouts {
            for exercise in &mut workout.exercises {
                *exercise = exercise.normalized();
            }
        }
        debug!(count = workouts.len(), path = %path.display(), "Workout library loaded");
        Ok(Self { path, workouts })
    }

    /// Writes the library back to its file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self) -> Result<(), StorageError> {
        write_json(&self.path, &self.workouts)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns all workouts, newest first.
    pub fn workouts(&self) -> &[WorkoutPlan] {
        &self.workouts
    }

    /// Returns the workout with this exact id.
    pub fn get(&self, id: &str) -> Option<&WorkoutPlan> {
        self.workouts.iter().find(|w| w.id == id)
    }

    /// Looks a workout up by id, then by case-insensitive name.
    pub fn find(&self, id_or_name: &str) -> Option<&WorkoutPlan> {
        self.get(id_or_name).or_else(|| {
            self.workouts
                .iter()
                .find(|w| w.name.eq_ignore_ascii_case(id_or_name))
        })
    }

    /// Like [`WorkoutLibrary::find`], as an error when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::WorkoutNotFound` if no workout matches.
    pub fn resolve(&self, id_or_name: &str) -> Result<&WorkoutPlan, StorageError> {
        self.find(id_or_name)
            .ok_or_else(|| StorageError::WorkoutNotFound(id_or_name.to_string()))
    }

    /// Creates an empty workout at the front of the list.
    pub fn create(&mut self, name: Option<&str>) -> &WorkoutPlan {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_WORKOUT_NAME);

        let workout = WorkoutPlan {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            exercises: Vec::new(),
        };
        info!(id = %workout.id, name = %workout.name, "Workout created");
        self.workouts.insert(0, workout);
        &self.workouts[0]
    }

    /// Renames a workout.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::WorkoutNotFound` if no workout matches.
    pub fn rename(&mut self, id_or_name: &str, name: &str) -> Result<(), StorageError> {
        let workout = self.find_mut(id_or_name)?;
        workout.name = name.trim().to_string();
        Ok(())
    }

    /// Removes a workout and returns it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::WorkoutNotFound` if no workout matches.
    pub fn delete(&mut self, id_or_name: &str) -> Result<WorkoutPlan, StorageError> {
        let index = self.position(id_or_name)?;
        Ok(self.workouts.remove(index))
    }

    /// Adds an exercise, or replaces the one with the same id.
    ///
    /// The exercise is normalized first. An empty id is replaced by a fresh
    /// one. Returns the stored exercise.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::WorkoutNotFound` if no workout matches.
    pub fn upsert_exercise(
        &mut self,
        workout: &str,
        exercise: ExerciseConfig,
    ) -> Result<ExerciseConfig, StorageError> {
        let mut exercise = exercise.normalized();
        if exercise.id.is_empty() {
            exercise.id = Uuid::new_v4().to_string();
        }

        let plan = self.find_mut(workout)?;
        match plan.exercises.iter_mut().find(|e| e.id == exercise.id) {
            Some(existing) => *existing = exercise.clone(),
            None => plan.exercises.push(exercise.clone()),
        }
        Ok(exercise)
    }

    /// Removes an exercise by id, or by case-insensitive name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::WorkoutNotFound` or
    /// `StorageError::ExerciseNotFound` if either lookup misses.
    pub fn delete_exercise(
        &mut self,
        workout: &str,
        exercise: &str,
    ) -> Result<ExerciseConfig, StorageError> {
        let plan = self.find_mut(workout)?;
        let index = plan
            .exercises
            .iter()
            .position(|e| e.id == exercise)
            .or_else(|| {
                plan.exercises
                    .iter()
                    .position(|e| e.name.eq_ignore_ascii_case(exercise))
            })
            .ok_or_else(|| StorageError::ExerciseNotFound(exercise.to_string()))?;
        Ok(plan.exercises.remove(index))
    }

    fn position(&self, id_or_name: &str) -> Result<usize, StorageError> {
        self.workouts
            .iter()
            .position(|w| w.id == id_or_name)
            .or_else(|| {
                self.workouts
                    .iter()
                    .position(|w| w.name.eq_ignore_ascii_case(id_or_name))
            })
            .ok_or_else(|| StorageError::WorkoutNotFound(id_or_name.to_string()))
    }

    fn find_mut(&mut self, id_or_name: &str) -> Result<&mut WorkoutPlan, StorageError> {
        let index = self.position(id_or_name)?;
        Ok(&mut self.workouts[index])
    }
}
