//! Display utilities for the HIIT timer CLI.
//!
//! This module provides formatted output for:
//! - Control command results and timer status
//! - Saved workouts with their durations
//! - The monthly completion calendar
//! - Error messages
//!
//! Each `render_*` function builds the text; the matching `show_*` prints it.

use chrono::{Datelike, NaiveDate};

use crate::timer::{exercise_duration, workout_duration, PREP_SECONDS};
use crate::types::{IpcResponse, Phase, TimerStatus, WorkoutPlan};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the daemon's message for a control command, followed by a
    /// one-line status summary while a run is active.
    pub fn show_result(response: &IpcResponse) {
        print!("{}", Self::render_result(response));
    }

    pub fn show_status(response: &IpcResponse) {
        match &response.data {
            Some(status) => print!("{}", Self::render_status(status)),
            None => println!("タイマーの状態を取得できませんでした"),
        }
    }

    pub fn show_workouts(workouts: &[WorkoutPlan]) {
        print!("{}", Self::render_workout_list(workouts));
    }

    pub fn show_workout(workout: &WorkoutPlan) {
        print!("{}", Self::render_workout(workout));
    }

    pub fn show_calendar(year: i32, month: u32, completed_days: &[u32]) {
        match Self::render_calendar(year, month, completed_days) {
            Some(calendar) => print!("{}", calendar),
            None => Self::show_error(&format!("{}年{}月は表示できません", year, month)),
        }
    }

    /// Shows a one-line success message.
    pub fn show_message(message: &str) {
        println!("* {}", message);
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("エラー: {}", message);
    }

    // ------------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------------

    fn render_result(response: &IpcResponse) -> String {
        let mut out = format!("* {}\n", response.message);
        if let Some(status) = response.data.as_ref().filter(|s| s.is_running) {
            out.push_str(&format!(
                "  {} 残り {}\n",
                Self::state_label(status),
                Self::format_time(status.remaining_seconds)
            ));
        }
        out
    }

    fn render_status(status: &TimerStatus) -> String {
        let mut out = String::from("HIIT タイマー ステータス\n");
        out.push_str("─────────────────────────────\n");
        out.push_str(&format!("状態: {}\n", Self::state_label(status)));

        match status.phase {
            Phase::Idle => {
                out.push_str(&format!(
                    "クイックタイマー合計: {}\n",
                    Self::format_time(status.overall_remaining)
                ));
            }
            Phase::Done => {
                if let Some(name) = &status.workout_name {
                    out.push_str(&format!("ワークアウト: {}\n", name));
                }
            }
            Phase::Prepare | Phase::Work | Phase::Rest => {
                if let Some(name) = &status.workout_name {
                    out.push_str(&format!("ワークアウト: {}\n", name));
                }
                if !status.exercise_name.is_empty() {
                    out.push_str(&format!("エクササイズ: {}\n", status.exercise_name));
                }
                if let Some(index) = status.current_exercise_index {
                    out.push_str(&format!(
                        "種目: {}/{}\n",
                        index + 1,
                        status.total_exercises
                    ));
                }
                if status.current_set_number > 0 {
                    out.push_str(&format!(
                        "セット: {}/{}\n",
                        status.current_set_number, status.total_sets_for_current_exercise
                    ));
                }
                out.push_str(&format!(
                    "残り時間: {}\n",
                    Self::format_time(status.remaining_seconds)
                ));
                out.push_str(&format!(
                    "全体の残り: {}\n",
                    Self::format_time(status.overall_remaining)
                ));
            }
        }
        out
    }

    fn render_workout_list(workouts: &[WorkoutPlan]) -> String {
        if workouts.is_empty() {
            return "保存されたワークアウトはありません\n".to_string();
        }

        workouts
            .iter()
            .map(|w| {
                format!(
                    "{}  {} ({}種目, {})\n",
                    w.id,
                    w.name,
                    w.exercises.len(),
                    Self::format_time(workout_duration(&w.exercises, PREP_SECONDS))
                )
            })
            .collect()
    }

    fn render_workout(workout: &WorkoutPlan) -> String {
        let mut out = format!("{}\n", workout.name);
        out.push_str(&format!("ID: {}\n", workout.id));
        out.push_str("─────────────────────────────\n");

        if workout.exercises.is_empty() {
            out.push_str("エクササイズがありません\n");
        }
        for (i, exercise) in workout.exercises.iter().enumerate() {
            out.push_str(&format!(
                "{}. {}  {}セット x ワーク{}秒 / レスト{}秒",
                i + 1,
                exercise.name,
                exercise.sets,
                exercise.work_seconds,
                exercise.rest_seconds
            ));
            if exercise.rest_last_seconds > 0 {
                out.push_str(&format!(" / 最後のレスト{}秒", exercise.rest_last_seconds));
            }
            out.push_str(&format!("  [{}]\n", Self::format_time(exercise_duration(exercise))));
        }

        out.push_str(&format!(
            "合計 (準備{}秒を含む): {}\n",
            PREP_SECONDS,
            Self::format_time(workout_duration(&workout.exercises, PREP_SECONDS))
        ));
        out
    }

    /// Renders a Sunday-first month grid. Completed days carry a `*`.
    ///
    /// Returns `None` if the month does not exist.
    fn render_calendar(year: i32, month: u32, completed_days: &[u32]) -> Option<String> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        let days_in_month = (next_month - first).num_days() as u32;
        let offset = first.weekday().num_days_from_sunday();

        let mut out = format!("{}年{}月\n", year, month);
        out.push_str(" Su  Mo  Tu  We  Th  Fr  Sa\n");

        let mut line = "    ".repeat(offset as usize);
        for day in 1..=days_in_month {
            let mark = if completed_days.contains(&day) { '*' } else { ' ' };
            line.push_str(&format!(" {:>2}{}", day, mark));
            if (offset + day) % 7 == 0 {
                out.push_str(line.trim_end());
                out.push('\n');
                line.clear();
            }
        }
        if !line.is_empty() {
            out.push_str(line.trim_end());
            out.push('\n');
        }

        out.push_str(&format!("完了日数: {}\n", completed_days.len()));
        Some(out)
    }

    fn state_label(status: &TimerStatus) -> String {
        let label = Self::phase_label(status.phase);
        if status.is_paused {
            format!("{} (一時停止中)", label)
        } else {
            label.to_string()
        }
    }

    fn phase_label(phase: Phase) -> &'static str {
        match phase {
            Phase::Idle => "待機中",
            Phase::Prepare => "準備",
            Phase::Work => "ワーク",
            Phase::Rest => "レスト",
            Phase::Done => "完了",
        }
    }

    /// Formats seconds as `MM:SS`.
    fn format_time(total_seconds: u32) -> String {
        format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
    }
}

// ============================================================================
// Tests
// ============================================================================
