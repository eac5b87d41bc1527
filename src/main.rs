//! HIIT timer CLI - voice-guided interval training
//!
//! A workout runs in the daemon as:
//! - a 10 second prepare count-in
//! - work and rest intervals for every set of every exercise
//! - spoken phase changes and a 5-to-1 countdown at the end of each step

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::{CommandFactory, Parser};

use hiit::cli::{
    Cli, Commands, Display, ExerciseArgs, HistoryArgs, IpcClient, WorkoutCommand,
};
use hiit::storage::{self, StorageError, WorkoutHistory, WorkoutLibrary};
use hiit::types::ExerciseConfig;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        if let Some(storage_error) = e.downcast_ref::<StorageError>() {
            eprintln!("  {}", storage_error.suggestion());
        }
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` wins; otherwise `warn`, or `info` with `--verbose`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Start(args)) => {
            let response = IpcClient::new()?.start(&args).await?;
            Display::show_result(&response);
        }
        Some(Commands::Pause) => {
            let response = IpcClient::new()?.toggle_pause().await?;
            Display::show_result(&response);
        }
        Some(Commands::Next) => {
            let response = IpcClient::new()?.skip_forward().await?;
            Display::show_result(&response);
        }
        Some(Commands::Back) => {
            let response = IpcClient::new()?.skip_back().await?;
            Display::show_result(&response);
        }
        Some(Commands::Reset) => {
            let response = IpcClient::new()?.reset().await?;
            Display::show_result(&response);
        }
        Some(Commands::Status) => {
            let response = IpcClient::new()?.status().await?;
            Display::show_status(&response);
        }
        Some(Commands::Daemon) => {
            hiit::daemon::run(storage::data_dir()?).await?;
        }
        Some(Commands::Workout { command }) => {
            execute_workout(&storage::data_dir()?, command)?;
        }
        Some(Commands::History(args)) => {
            show_history(&storage::data_dir()?, &args)?;
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
        }
        None => {
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Runs a workout library command against the files in `data_dir`.
fn execute_workout(data_dir: &Path, command: WorkoutCommand) -> Result<()> {
    let mut library = WorkoutLibrary::open(data_dir)?;

    match command {
        WorkoutCommand::List => {
            Display::show_workouts(library.workouts());
            return Ok(());
        }
        WorkoutCommand::Show { workout } => {
            Display::show_workout(library.resolve(&workout)?);
            return Ok(());
        }
        WorkoutCommand::Create { name } => {
            let plan = library.create(name.as_deref());
            Display::show_message(&format!(
                "ワークアウト '{}' を作成しました (ID: {})",
                plan.name, plan.id
            ));
        }
        WorkoutCommand::Rename { workout, name } => {
            library.rename(&workout, &name)?;
            Display::show_message(&format!("ワークアウトの名前を '{}' に変更しました", name));
        }
        WorkoutCommand::Delete { workout } => {
            let removed = library.delete(&workout)?;
            Display::show_message(&format!("ワークアウト '{}' を削除しました", removed.name));
        }
        WorkoutCommand::AddExercise(args) => {
            let workout = args.workout.clone();
            let stored = library.upsert_exercise(&workout, exercise_from_args(args))?;
            Display::show_message(&format!(
                "エクササイズ '{}' を保存しました (ID: {})",
                stored.name, stored.id
            ));
        }
        WorkoutCommand::RemoveExercise { workout, exercise } => {
            let removed = library.delete_exercise(&workout, &exercise)?;
            Display::show_message(&format!("エクササイズ '{}' を削除しました", removed.name));
        }
    }

    library.save().context("ワークアウトを保存できませんでした")?;
    Ok(())
}

fn exercise_from_args(args: ExerciseArgs) -> ExerciseConfig {
    ExerciseConfig::new(
        args.id.unwrap_or_default(),
        args.name,
        args.sets,
        args.work,
        args.rest,
    )
    .with_rest_last_seconds(args.rest_last)
}

/// Prints the completion calendar for the requested month, or this month.
fn show_history(data_dir: &Path, args: &HistoryArgs) -> Result<()> {
    let history = WorkoutHistory::open(data_dir)?;
    let (year, month) = args.month.unwrap_or_else(|| {
        let today = chrono::Local::now().date_naive();
        (today.year(), today.month())
    });

    Display::show_calendar(year, month, &history.completed_days_in_month(year, month));
    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
