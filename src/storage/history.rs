//! Completion history.
//!
//! A JSON list of local dates (`"YYYY-MM-DD"`) on which a workout ran to the
//! end. Each date appears at most once.

use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use tracing::info;

use super::{read_json, write_json, StorageError};

/// History file name inside the data directory.
pub const HISTORY_FILE: &str = "history.json";

/// Formats a date as a history key.
#[must_use]
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Completed-workout dates backed by a JSON file.
#[derive(Debug, Clone)]
pub struct WorkoutHistory {
    path: PathBuf,
    dates: Vec<String>,
}

impl WorkoutHistory {
    /// Opens the history in `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(data_dir: &Path) -> Result<Self, StorageError> {
        let path = data_dir.join(HISTORY_FILE);
        let dates = read_json(&path)?;
        Ok(Self { path, dates })
    }

    /// Returns the recorded date keys in insertion order.
    pub fn dates(&self) -> &[String] {
        &self.dates
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        let key = date_key(date);
        self.dates.iter().any(|d| *d == key)
    }

    /// Records `date` and persists the history.
    ///
    /// Returns false without touching the file if the date was already
    /// recorded. The date is kept in memory only once the write succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn mark_completed(&mut self, date: NaiveDate) -> Result<bool, StorageError> {
        let key = date_key(date);
        if self.dates.contains(&key) {
            return Ok(false);
        }

        let mut dates = self.dates.clone();
        dates.push(key);
        write_json(&self.path, &dates)?;
        self.dates = dates;
        info!(date = %date, "Workout completion recorded");
        Ok(true)
    }

    /// Returns the days of `year`/`month` with a completion, ascending.
    ///
    /// Keys that do not parse as dates are ignored.
    pub fn completed_days_in_month(&self, year: i32, month: u32) -> Vec<u32> {
        let mut days: Vec<u32> = self
            .dates
            .iter()
            .filter_map(|key| NaiveDate::parse_from_str(key, "%Y-%m-%d").ok())
            .filter(|date| date.year() == year && date.month() == month)
            .map(|date| date.day())
            .collect();
        days.sort_unstable();
        days.dedup();
        days
    }
}
