//! Storage error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing persisted data.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Neither `HIIT_HOME` nor a home directory is available.
    #[error("ホームディレクトリが見つかりません")]
    HomeDirectoryNotFound,

    /// Reading or writing a file failed.
    #[error("ファイルの読み書きに失敗しました: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A data file exists but is not valid JSON of the expected shape.
    #[error("データファイルが破損しています: {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Serializing data failed.
    #[error("データのシリアライズに失敗しました: {0}")]
    Serialize(#[from] serde_json::Error),

    /// No workout matches the given id or name.
    #[error("ワークアウト '{0}' が見つかりません")]
    WorkoutNotFound(String),

    /// No exercise matches the given id or name.
    #[error("エクササイズ '{0}' が見つかりません")]
    ExerciseNotFound(String),
}

impl StorageError {
    /// Returns true if the error means a lookup missed.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::WorkoutNotFound(_) | Self::ExerciseNotFound(_))
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::HomeDirectoryNotFound => "HIIT_HOME 環境変数でデータディレクトリを指定してください",
            Self::Io { .. } => "データディレクトリの権限を確認してください",
            Self::Corrupt { .. } => "ファイルを修正するか、バックアップを取ってから削除してください",
            Self::Serialize(_) => "アプリケーションを再起動してください",
            Self::WorkoutNotFound(_) => "'hiit workout list' で登録済みのワークアウトを確認してください",
            Self::ExerciseNotFound(_) => "'hiit workout show' でエクササイズを確認してください",
        }
    }
}
