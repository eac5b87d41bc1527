//! Speech configuration types.

use serde::{Deserialize, Serialize};

use super::command::DEFAULT_TIMEOUT_SECONDS;

fn default_enabled() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

/// Spoken cue configuration (`[speech]` in `config.toml`).
///
/// ```
/// use hiit::speech::SpeechConfig;
///
/// let config = SpeechConfig::default();
/// assert!(config.enabled);
/// assert!(config.command.is_none());
/// assert_eq!(config.timeout_seconds, 5);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpeechConfig {
    /// Whether cues are spoken at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Speech command; the platform default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Timeout for one utterance in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            command: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl SpeechConfig {
    /// Creates a configuration with speech turned off.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Creates an enabled configuration using the given command.
    #[must_use]
    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            command: Some(command.into()),
            ..Self::default()
        }
    }
}
