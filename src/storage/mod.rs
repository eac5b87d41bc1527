//! Persistence for the HIIT timer.
//!
//! Everything lives in one data directory (`$HIIT_HOME`, else `~/.hiit`):
//!
//! ```text
//! ~/.hiit/
//! ├── config.toml    daemon configuration
//! ├── workouts.json  workout library
//! ├── history.json   completion dates
//! └── hiit.sock      daemon socket
//! ```
//!
//! A missing file reads as empty. A file that exists but cannot be parsed is
//! an error and is never overwritten.

mod error;
mod history;
mod library;

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use error::StorageError;
pub use history::{date_key, WorkoutHistory, HISTORY_FILE};
pub use library::{WorkoutLibrary, DEFAULT_WORKOUT_NAME, WORKOUTS_FILE};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "HIIT_HOME";

/// Data directory under the home directory.
const DEFAULT_DATA_DIR: &str = ".hiit";

/// Returns the data directory.
///
/// # Errors
///
/// Returns `StorageError::HomeDirectoryNotFound` if `HIIT_HOME` is unset and
/// the home directory cannot be determined.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_DATA_DIR))
        .ok_or(StorageError::HomeDirectoryNotFound)
}

/// Reads a JSON file, returning `T::default()` if it does not exist.
pub(crate) fn read_json<T>(path: &Path) -> Result<T, StorageError>
where
    T: DeserializeOwned + Default,
{
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(source) => {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_slice(&bytes).map_err(|source| StorageError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `value` as pretty JSON, replacing the file atomically.
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let io_err = |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let json = serde_json::to_vec_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}
