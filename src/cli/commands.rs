//! Command definitions for the HIIT timer CLI.
//!
//! Uses clap derive macro for argument parsing.

use clap::{Args, Parser, Subcommand};

// ============================================================================
// CLI Structure
// ============================================================================

/// HIIT timer CLI
#[derive(Parser, Debug)]
#[command(
    name = "hiit",
    version,
    about = "音声ガイド付きインターバルトレーニングタイマー",
    long_about = "準備・ワーク・レストを自動で進めるHIITタイマー。\n\
                  タイマーはデーモンで動作し、フェーズの切り替えと残り5秒を読み上げます。",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start a saved workout or a quick timer
    Start(StartArgs),

    /// Pause or resume the current workout
    Pause,

    /// Skip to the next step
    Next,

    /// Restart the current step, or go back one step near its beginning
    Back,

    /// Stop the workout and return to idle
    Reset,

    /// Show current timer status
    Status,

    /// Run the timer daemon in the foreground
    Daemon,

    /// Manage saved workouts
    Workout {
        #[command(subcommand)]
        command: WorkoutCommand,
    },

    /// Show days with a completed workout
    History(HistoryArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Start Command Arguments
// ============================================================================

/// Arguments for the start command
///
/// Without `--workout`, a quick timer starts from the daemon's current quick
/// settings with any of `--sets`, `--work` and `--rest` applied on top.
#[derive(Args, Debug, Clone, Default)]
pub struct StartArgs {
    /// Saved workout id or name
    #[arg(
        short = 'W',
        long,
        conflicts_with_all = ["sets", "work", "rest"],
        value_parser = validate_name
    )]
    pub workout: Option<String>,

    /// Quick timer sets (1-20)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=20))]
    pub sets: Option<u32>,

    /// Quick timer work seconds (5-600)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(5..=600))]
    pub work: Option<u32>,

    /// Quick timer rest seconds (5-600)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(5..=600))]
    pub rest: Option<u32>,
}

// ============================================================================
// Workout Subcommands
// ============================================================================

/// Workout library subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum WorkoutCommand {
    /// List saved workouts
    List,

    /// Show a workout's exercises and durations
    Show {
        /// Workout id or name
        workout: String,
    },

    /// Create an empty workout
    Create {
        /// Workout name ("New workout" when omitted)
        #[arg(value_parser = validate_name)]
        name: Option<String>,
    },

    /// Rename a workout
    Rename {
        /// Workout id or name
        workout: String,
        /// New name
        #[arg(value_parser = validate_name)]
        name: String,
    },

    /// Delete a workout
    Delete {
        /// Workout id or name
        workout: String,
    },

    /// Add an exercise to a workout, or replace one by id
    AddExercise(ExerciseArgs),

    /// Remove an exercise from a workout
    RemoveExercise {
        /// Workout id or name
        workout: String,
        /// Exercise id or name
        exercise: String,
    },
}

/// Arguments for adding or replacing an exercise
#[derive(Args, Debug, Clone)]
pub struct ExerciseArgs {
    /// Workout id or name
    pub workout: String,

    /// Exercise name, spoken as "Work <name>"
    #[arg(value_parser = validate_name)]
    pub name: String,

    /// Number of sets (1-50)
    #[arg(
        short,
        long,
        default_value = "4",
        value_parser = clap::value_parser!(u32).range(1..=50)
    )]
    pub sets: u32,

    /// Work seconds per set (5-3600)
    #[arg(
        short,
        long,
        default_value = "30",
        value_parser = clap::value_parser!(u32).range(5..=3600)
    )]
    pub work: u32,

    /// Rest seconds between sets (0-3600)
    #[arg(
        short,
        long,
        default_value = "30",
        value_parser = clap::value_parser!(u32).range(0..=3600)
    )]
    pub rest: u32,

    /// Rest seconds after the final set (0-3600)
    #[arg(
        long,
        default_value = "0",
        value_parser = clap::value_parser!(u32).range(0..=3600)
    )]
    pub rest_last: u32,

    /// Replace the exercise with this id instead of adding a new one
    #[arg(long)]
    pub id: Option<String>,
}

// ============================================================================
// History Arguments
// ============================================================================

/// Arguments for the history command
#[derive(Args, Debug, Clone, Default)]
pub struct HistoryArgs {
    /// Month to show as YYYY-MM (current month when omitted)
    #[arg(short, long, value_parser = parse_month)]
    pub month: Option<(i32, u32)>,
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Validates a workout or exercise name.
///
/// - Must not be blank
/// - Must not exceed 100 characters
fn validate_name(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        return Err("名前は空にできません".to_string());
    }
    if s.chars().count() > 100 {
        return Err("名前は100文字以内にしてください".to_string());
    }
    Ok(s.to_string())
}

/// Parses `YYYY-MM` into (year, month).
fn parse_month(s: &str) -> Result<(i32, u32), String> {
    let err = || format!("'{}' は YYYY-MM 形式ではありません", s);

    let (year, month) = s.split_once('-').ok_or_else(err)?;
    let year: i32 = year.parse().map_err(|_| err())?;
    let month: u32 = month.parse().map_err(|_| err())?;
    if !(1..=12).contains(&month) {
        return Err(err());
    }
    Ok((year, month))
}

// ============================================================================
// Tests
// ============================================================================
