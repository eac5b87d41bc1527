//! Speech error types.
//!
//! Every speech error is recoverable: a failed cue falls back to a tone and the
//! workout keeps running.

use thiserror::Error;

/// Errors that can occur while speaking a cue.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpeechError {
    /// The text-to-speech command is not installed.
    #[error("読み上げコマンド '{0}' が見つかりません")]
    CommandNotFound(String),

    /// The command did not finish in time.
    #[error("読み上げがタイムアウトしました（{0}秒）")]
    Timeout(u64),

    /// The command exited with an error.
    #[error("読み上げコマンド '{0}' の実行に失敗しました: {1}")]
    ExecutionFailed(String, String),

    /// Generic speech error.
    #[error("読み上げエラー: {0}")]
    Other(String),
}

impl SpeechError {
    /// Returns true if the command is missing.
    #[must_use]
    pub fn is_command_not_found(&self) -> bool {
        matches!(self, Self::CommandNotFound(_))
    }

    /// Returns true if this error is a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::CommandNotFound(_) => {
                "config.toml の [speech] command に読み上げコマンドを指定してください"
            }
            Self::Timeout(_) => "[speech] timeout_seconds を延長してください",
            Self::ExecutionFailed(_, _) => "読み上げコマンドを単体で実行して動作を確認してください",
            Self::Other(_) => "設定を確認し、デーモンを再起動してください",
        }
    }
}
