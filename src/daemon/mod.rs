//! Daemon module for the HIIT timer.
//!
//! This module contains the daemon functionality:
//! - `timer`: Timer engine wrapping the state machine and announcement trigger
//! - `scheduler`: One-second countdown ticks
//! - `ipc`: Unix socket server for CLI commands
//! - `dispatch`: Speech, fallback tone and completion history side effects
//!
//! [`run`] wires them together and runs until Ctrl-C or SIGTERM.

pub mod dispatch;
pub mod ipc;
pub mod scheduler;
pub mod timer;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn};

pub use dispatch::EventDispatcher;
pub use ipc::{socket_path, IpcServer, RequestHandler};
pub use scheduler::{ChannelTicker, IntervalTicker, Scheduler, TickHandle, Ticker};
pub use timer::{TimerEngine, TimerEvent};

use crate::config::HiitConfig;
use crate::sound::try_create_player;
use crate::speech::{CommandSpeaker, Speaker};
use crate::storage::WorkoutHistory;

/// Runs the daemon with everything stored under `data_dir`.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the socket
/// cannot be bound.
pub async fn run(data_dir: PathBuf) -> Result<()> {
    let config = HiitConfig::load(&data_dir)?;

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let engine = TimerEngine::new(config.quick, event_tx);
    let control = engine.subscribe();
    let engine = Arc::new(Mutex::new(engine));

    let server = IpcServer::new(&socket_path(&data_dir))?;
    let handler = Arc::new(RequestHandler::new(engine.clone(), data_dir.clone()));
    let scheduler = Scheduler::new(engine, control, IntervalTicker::default());

    let speaker = CommandSpeaker::new(config.speech.clone());
    if config.speech.enabled && !speaker.is_available() {
        warn!(
            "読み上げコマンド '{}' が見つかりません。代替トーンを使用します",
            speaker.command()
        );
    }
    let tone_player = if config.sound.fallback_tone {
        try_create_player(false)
    } else {
        None
    };

    let mut dispatcher = EventDispatcher::new(speaker, tone_player);
    match WorkoutHistory::open(&data_dir) {
        Ok(history) => dispatcher = dispatcher.with_history(history),
        Err(e) => warn!("完了履歴を記録できません: {}", e),
    }

    info!("デーモンを起動しました: {:?}", server.socket_path());

    tokio::select! {
        _ = scheduler.run() => {}
        _ = server.serve(handler) => {}
        _ = dispatcher.run(event_rx) => {}
        result = shutdown_signal() => {
            result?;
            info!("デーモンを停止します");
        }
    }

    Ok(())
}

/// Resolves on Ctrl-C, or on SIGTERM where available.
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate =
            signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result.context("Failed to listen for Ctrl-C"),
            _ = terminate.recv() => Ok(()),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl-C")
    }
}
