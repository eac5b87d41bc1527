//! TOML daemon configuration.
//!
//! Stored at `<data dir>/config.toml`. Every section and key is optional:
//!
//! ```toml
//! [quick]
//! sets = 4
//! work_seconds = 30
//! rest_seconds = 60
//!
//! [speech]
//! enabled = true
//! command = "espeak"
//! timeout_seconds = 5
//!
//! [sound]
//! fallback_tone = true
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::sound::SoundConfig;
use crate::speech::SpeechConfig;
use crate::types::QuickTimerSettings;

/// Config file name inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Daemon configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HiitConfig {
    /// Ambient quick timer settings
    #[serde(default)]
    pub quick: QuickTimerSettings,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub sound: SoundConfig,
}

impl HiitConfig {
    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join(CONFIG_FILE)
    }

    /// Loads the configuration, or the defaults if the file does not exist.
    ///
    /// Quick timer values are clamped into their allowed ranges.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = Self::path(data_dir);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("設定ファイルを読み込めません: {:?}", path))
            }
        };

        let mut config: HiitConfig = toml::from_str(&content)
            .with_context(|| format!("設定ファイルの形式が不正です: {:?}", path))?;
        config.quick = config.quick.clamped();
        Ok(config)
    }

    /// Writes the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("データディレクトリを作成できません: {:?}", data_dir))?;
        let content = toml::to_string_pretty(self).context("設定のシリアライズに失敗しました")?;
        let path = Self::path(data_dir);
        std::fs::write(&path, content)
            .with_context(|| format!("設定ファイルを書き込めません: {:?}", path))?;
        Ok(())
    }
}
