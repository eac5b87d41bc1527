//! Spoken workout cues.
//!
//! Cue texts ("Prepare", "Work Squat", "3", ...) are handed to a `Speaker`.
//! The production speaker runs an external text-to-speech command; tests use
//! `MockSpeaker`.
//!
//! # Error Handling
//!
//! Speech never affects the timer. Callers log a failure and fall back to the
//! cue tone from [`crate::sound`].

pub mod command;
pub mod config;
pub mod error;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub use command::{default_command, resolve_command, speak_with_command};
pub use config::SpeechConfig;
pub use error::SpeechError;

/// Something that can say a short text out loud.
#[allow(async_fn_in_trait)]
pub trait Speaker {
    /// Speaks `text`, returning once the utterance has finished.
    async fn speak(&self, text: &str) -> Result<(), SpeechError>;

    /// Returns true if speech can be attempted.
    fn is_available(&self) -> bool;
}

impl<S: Speaker + ?Sized> Speaker for Arc<S> {
    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        (**self).speak(text).await
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}

// ============================================================================
// CommandSpeaker
// ============================================================================

/// Speaker backed by an external command.
#[derive(Debug, Clone)]
pub struct CommandSpeaker {
    config: SpeechConfig,
}

impl CommandSpeaker {
    #[must_use]
    pub fn new(config: SpeechConfig) -> Self {
        Self { config }
    }

    /// Returns the command this speaker runs.
    #[must_use]
    pub fn command(&self) -> &str {
        self.config.command.as_deref().unwrap_or(default_command())
    }
}

impl Speaker for CommandSpeaker {
    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        if !self.config.enabled || text.is_empty() {
            return Ok(());
        }
        speak_with_command(self.command(), text, self.config.timeout_seconds).await
    }

    fn is_available(&self) -> bool {
        self.config.enabled && resolve_command(self.command()).is_some()
    }
}

// ============================================================================
// MockSpeaker
// ============================================================================

/// Speaker that records what it was asked to say.
#[derive(Debug, Default)]
pub struct MockSpeaker {
    spoken: Mutex<Vec<String>>,
    should_fail: AtomicBool,
}

impl MockSpeaker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Returns every text passed to `speak`, including failed attempts.
    #[must_use]
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut spoken) = self.spoken.lock() {
            spoken.clear();
        }
    }
}

impl Speaker for MockSpeaker {
    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        if let Ok(mut spoken) = self.spoken.lock() {
            spoken.push(text.to_string());
        }
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SpeechError::ExecutionFailed(
                "mock".to_string(),
                "simulated failure".to_string(),
            ));
        }
        Ok(())
    }

    fn is_available(&self) -> bool {
        true
    }
}
