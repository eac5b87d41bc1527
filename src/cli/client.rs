//! IPC client for talking to the HIIT timer daemon.
//!
//! This module provides:
//! - Unix Domain Socket client
//! - Request/response handling
//! - Connection retry logic
//! - Timeout handling

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::timeout;

use crate::cli::commands::StartArgs;
use crate::daemon::ipc::socket_path;
use crate::storage;
use crate::types::{IpcRequest, IpcResponse, StartParams};

// ============================================================================
// Constants
// ============================================================================

/// Connection timeout in seconds
const CONNECTION_TIMEOUT_SECS: u64 = 5;

/// Read/write timeout in seconds
const IO_TIMEOUT_SECS: u64 = 5;

/// Maximum response size in bytes (64KB)
const MAX_RESPONSE_SIZE: usize = 65536;

/// Maximum retry attempts
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds, multiplied by the attempt number
const RETRY_DELAY_MS: u64 = 500;

// ============================================================================
// IpcClient
// ============================================================================

/// IPC client for daemon communication.
pub struct IpcClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl IpcClient {
    /// Creates a client for the socket in the default data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be determined.
    pub fn new() -> Result<Self> {
        let data_dir = storage::data_dir().context("データディレクトリを特定できません")?;
        Ok(Self::for_data_dir(&data_dir))
    }

    /// Creates a client for the socket inside `data_dir`.
    pub fn for_data_dir(data_dir: &Path) -> Self {
        Self::with_socket_path(socket_path(data_dir))
    }

    /// Creates a client with a custom socket path.
    pub fn with_socket_path(socket_path: PathBuf) -> Self {
        Self {
            socket_path,
            timeout: Duration::from_secs(CONNECTION_TIMEOUT_SECS),
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Starts a saved workout, or the quick timer when no workout is given.
    pub async fn start(&self, args: &StartArgs) -> Result<IpcResponse> {
        let params = StartParams {
            workout: args.workout.clone(),
            sets: args.sets,
            work_seconds: args.work,
            rest_seconds: args.rest,
        };

        self.send_request_with_retry(&IpcRequest::Start { params })
            .await
    }

    pub async fn toggle_pause(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::TogglePause).await
    }

    pub async fn skip_forward(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::SkipForward).await
    }

    pub async fn skip_back(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::SkipBack).await
    }

    pub async fn reset(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Reset).await
    }

    pub async fn status(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Status).await
    }

    /// Sends a request, retrying with linear back-off.
    ///
    /// An error response from the daemon is final and is not retried.
    async fn send_request_with_retry(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let mut attempt = 1;
        loop {
            let error = match self.send_request(request).await {
                Ok(response) if response.is_error() => anyhow::bail!("{}", response.message),
                Ok(response) => return Ok(response),
                Err(e) => e,
            };

            tracing::warn!("リクエスト失敗 (試行 {}/{}): {}", attempt, MAX_RETRIES, error);
            if attempt >= MAX_RETRIES {
                return Err(error);
            }

            let delay = Duration::from_millis(RETRY_DELAY_MS * u64::from(attempt));
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Sends a single request and reads the daemon's response.
    async fn send_request(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let mut stream = timeout(self.timeout, UnixStream::connect(&self.socket_path))
            .await
            .context("接続がタイムアウトしました")?
            .context("デーモンに接続できません。'hiit daemon' を起動してください")?;

        let request_json =
            serde_json::to_string(request).context("リクエストのシリアライズに失敗しました")?;

        timeout(
            Duration::from_secs(IO_TIMEOUT_SECS),
            stream.write_all(request_json.as_bytes()),
        )
        .await
        .context("書き込みがタイムアウトしました")?
        .context("リクエストの送信に失敗しました")?;

        timeout(Duration::from_secs(IO_TIMEOUT_SECS), stream.flush())
            .await
            .context("フラッシュがタイムアウトしました")?
            .context("フラッシュに失敗しました")?;

        // Half-close so the daemon sees the end of the request
        stream
            .shutdown()
            .await
            .context("シャットダウンに失敗しました")?;

        let mut buffer = Vec::with_capacity(4096);
        let n = timeout(
            Duration::from_secs(IO_TIMEOUT_SECS),
            (&mut stream)
                .take(MAX_RESPONSE_SIZE as u64)
                .read_to_end(&mut buffer),
        )
        .await
        .context("読み込みがタイムアウトしました")?
        .context("レスポンスの受信に失敗しました")?;

        if n == 0 {
            anyhow::bail!("デーモンからの応答がありませんでした");
        }

        serde_json::from_slice(&buffer).context("レスポンスのパースに失敗しました")
    }
}

// ============================================================================
// Tests
// ============================================================================
