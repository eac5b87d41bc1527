//! IPC server for the HIIT timer daemon.
//!
//! This module provides Unix Domain Socket IPC functionality:
//! - Server that listens on a Unix socket, one request per connection
//! - Request handling that drives the `TimerEngine`
//! - Workout lookup in the saved library for `start`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Mutex;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

use crate::storage::WorkoutLibrary;
use crate::types::{IpcRequest, IpcResponse, StartParams};

use super::timer::TimerEngine;

// ============================================================================
// Constants
// ============================================================================

/// Socket file name inside the data directory.
pub const SOCKET_FILE: &str = "hiit.sock";

/// Maximum request size in bytes (4KB)
pub const MAX_REQUEST_SIZE: usize = 4096;

/// Read timeout in seconds
const READ_TIMEOUT_SECS: u64 = 5;

/// Returns the socket path inside `data_dir`.
pub fn socket_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SOCKET_FILE)
}

// ============================================================================
// IpcError
// ============================================================================

/// IPC-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Read error
    #[error("Failed to read request: {0}")]
    ReadError(String),

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Request too large
    #[error("Request too large (max {MAX_REQUEST_SIZE} bytes)")]
    RequestTooLarge,

    /// Client closed the connection without sending a request
    #[error("Connection closed by client")]
    ConnectionClosed,
}

// ============================================================================
// IpcServer
// ============================================================================

/// Unix Domain Socket IPC server.
pub struct IpcServer {
    listener: UnixListener,
    /// Socket path (for cleanup)
    socket_path: PathBuf,
}

impl IpcServer {
    /// Creates a new IPC server bound to the specified socket path.
    ///
    /// If the socket file already exists, it will be removed before binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be bound.
    pub fn new(socket_path: &Path) -> Result<Self> {
        if socket_path.exists() {
            std::fs::remove_file(socket_path)
                .with_context(|| format!("Failed to remove existing socket: {:?}", socket_path))?;
        }

        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create socket directory: {:?}", parent))?;
        }

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("Failed to bind Unix socket: {:?}", socket_path))?;

        info!("IPC server listening on {:?}", socket_path);

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Accepts an incoming client connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be accepted.
    pub async fn accept(&self) -> Result<UnixStream> {
        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        Ok(stream)
    }

    /// Accepts connections forever, answering each on its own task.
    pub async fn serve(&self, handler: Arc<RequestHandler>) {
        loop {
            let mut stream = match self.accept().await {
                Ok(stream) => stream,
                Err(e) => {
                    warn!("{:#}", e);
                    continue;
                }
            };

            let handler = handler.clone();
            tokio::spawn(async move {
                if let Err(e) = Self::handle_connection(&mut stream, &handler).await {
                    debug!("Connection ended with error: {:#}", e);
                }
            });
        }
    }

    /// Reads one request, dispatches it and writes the response.
    ///
    /// A request that cannot be parsed still gets an error response.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails.
    pub async fn handle_connection(
        stream: &mut UnixStream,
        handler: &RequestHandler,
    ) -> Result<()> {
        let response = match Self::receive_request(stream).await {
            Ok(request) => handler.handle(request).await,
            Err(e) => {
                if matches!(
                    e.downcast_ref::<IpcError>(),
                    Some(IpcError::ConnectionClosed)
                ) {
                    return Ok(());
                }
                IpcResponse::error(format!("リクエストを処理できません: {:#}", e))
            }
        };
        Self::send_response(stream, &response).await
    }

    /// Receives and deserializes an IPC request from the stream.
    ///
    /// Applies a read timeout to prevent blocking indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or deserialization fails.
    pub async fn receive_request(stream: &mut UnixStream) -> Result<IpcRequest> {
        let mut buffer = vec![0u8; MAX_REQUEST_SIZE + 1];

        let read_result = timeout(
            Duration::from_secs(READ_TIMEOUT_SECS),
            stream.read(&mut buffer),
        )
        .await;

        let n = match read_result {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(IpcError::ReadError(e.to_string()).into()),
            Err(_) => return Err(IpcError::Timeout.into()),
        };

        if n == 0 {
            return Err(IpcError::ConnectionClosed.into());
        }
        if n > MAX_REQUEST_SIZE {
            return Err(IpcError::RequestTooLarge.into());
        }

        let request: IpcRequest = serde_json::from_slice(&buffer[..n])
            .with_context(|| "Failed to deserialize IPC request")?;

        Ok(request)
    }

    /// Serializes and sends an IPC response to the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub async fn send_response(stream: &mut UnixStream, response: &IpcResponse) -> Result<()> {
        let json = serde_json::to_vec(response).context("Failed to serialize IPC response")?;

        stream
            .write_all(&json)
            .await
            .context("Failed to write response")?;
        stream.flush().await.context("Failed to flush response")?;

        Ok(())
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        // Clean up socket file on drop
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

// ============================================================================
// RequestHandler
// ============================================================================

/// Handles IPC requests by dispatching to TimerEngine.
pub struct RequestHandler {
    engine: Arc<Mutex<TimerEngine>>,
    /// Directory holding the workout library
    data_dir: PathBuf,
}

impl RequestHandler {
    /// Creates a new request handler.
    ///
    /// The workout library in `data_dir` is re-read on every `start` so that
    /// edits made through the CLI apply without restarting the daemon.
    pub fn new(engine: Arc<Mutex<TimerEngine>>, data_dir: PathBuf) -> Self {
        Self { engine, data_dir }
    }

    /// Handles an IPC request and returns the appropriate response.
    pub async fn handle(&self, request: IpcRequest) -> IpcResponse {
        debug!(?request, "IPC request");
        match request {
            IpcRequest::Start { params } => self.handle_start(params).await,
            IpcRequest::TogglePause => self.handle_toggle_pause().await,
            IpcRequest::SkipForward => self.handle_skip_forward().await,
            IpcRequest::SkipBack => self.handle_skip_back().await,
            IpcRequest::Reset => self.handle_reset().await,
            IpcRequest::Status => self.handle_status().await,
        }
    }

    /// Handles the start command.
    async fn handle_start(&self, params: StartParams) -> IpcResponse {
        match params.workout {
            Some(ref workout) => self.start_workout(workout).await,
            None => self.start_quick(&params).await,
        }
    }

    async fn start_workout(&self, workout: &str) -> IpcResponse {
        let library = match WorkoutLibrary::open(&self.data_dir) {
            Ok(library) => library,
            Err(e) => return IpcResponse::error(e.to_string()),
        };
        let plan = match library.resolve(workout) {
            Ok(plan) => plan,
            Err(e) => return IpcResponse::error(e.to_string()),
        };

        let mut engine = self.engine.lock().await;
        if !engine.start(&plan.exercises, Some(plan.name.clone())) {
            return IpcResponse::error(format!(
                "ワークアウト '{}' にエクササイズがありません",
                plan.name
            ));
        }

        IpcResponse::success(
            format!("ワークアウト '{}' を開始しました", plan.name),
            Some(engine.status()),
        )
    }

    async fn start_quick(&self, params: &StartParams) -> IpcResponse {
        let mut engine = self.engine.lock().await;

        let mut settings = engine.quick_settings();
        if let Some(sets) = params.sets {
            settings = settings.with_sets(sets);
        }
        if let Some(work) = params.work_seconds {
            settings = settings.with_work_seconds(work);
        }
        if let Some(rest) = params.rest_seconds {
            settings = settings.with_rest_seconds(rest);
        }
        engine.set_quick_settings(settings);
        engine.start_quick();

        IpcResponse::success("クイックタイマーを開始しました", Some(engine.status()))
    }

    /// Handles the pause/resume toggle.
    async fn handle_toggle_pause(&self) -> IpcResponse {
        let mut engine = self.engine.lock().await;

        if !engine.toggle_pause() {
            return Self::unchanged(&engine);
        }
        let message = if engine.status().is_paused {
            "一時停止しました"
        } else {
            "再開しました"
        };
        IpcResponse::success(message, Some(engine.status()))
    }

    /// Handles the skip-forward command.
    async fn handle_skip_forward(&self) -> IpcResponse {
        let mut engine = self.engine.lock().await;

        if !engine.skip_forward() {
            return Self::unchanged(&engine);
        }
        IpcResponse::success("次のステップへ進みました", Some(engine.status()))
    }

    /// Handles the skip-back command.
    async fn handle_skip_back(&self) -> IpcResponse {
        let mut engine = self.engine.lock().await;

        if !engine.skip_back() {
            return Self::unchanged(&engine);
        }
        IpcResponse::success("ステップを戻しました", Some(engine.status()))
    }

    /// Handles the reset command.
    async fn handle_reset(&self) -> IpcResponse {
        let mut engine = self.engine.lock().await;
        engine.reset();
        IpcResponse::success("タイマーをリセットしました", Some(engine.status()))
    }

    /// Handles the status command.
    async fn handle_status(&self) -> IpcResponse {
        let engine = self.engine.lock().await;
        IpcResponse::success("", Some(engine.status()))
    }

    fn unchanged(engine: &TimerEngine) -> IpcResponse {
        IpcResponse::success(
            "実行中のワークアウトがないため、何も変更されませんでした",
            Some(engine.status()),
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
