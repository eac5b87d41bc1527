//! Fallback cue tone for the HIIT timer.
//!
//! When a cue cannot be spoken, a short beep is played instead:
//!
//! - 880 Hz sine wave
//! - 220 ms long
//! - Gain 0.18
//!
//! Playback is non-blocking and degrades to silence when no audio device is
//! present.

mod error;
mod player;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use error::SoundError;
pub use player::{try_create_player, RodioTonePlayer};

/// A synthesized sine tone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub duration: Duration,
    pub gain: f32,
}

/// The beep played when speech fails.
pub const CUE_TONE: Tone = Tone {
    frequency_hz: 880.0,
    duration: Duration::from_millis(220),
    gain: 0.18,
};

/// Fallback tone configuration (`[sound]` in `config.toml`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SoundConfig {
    /// Play [`CUE_TONE`] when a cue cannot be spoken.
    #[serde(default = "default_fallback_tone")]
    pub fallback_tone: bool,
}

fn default_fallback_tone() -> bool {
    true
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            fallback_tone: default_fallback_tone(),
        }
    }
}

/// Trait for tone playback implementations.
pub trait TonePlayer {
    /// Plays a tone. Non-blocking; the tone plays in the background.
    ///
    /// # Errors
    ///
    /// Returns an error if playback fails.
    fn play(&self, tone: &Tone) -> Result<(), SoundError>;

    /// Returns true if sound playback is disabled.
    fn is_disabled(&self) -> bool;

    /// Enables tone playback.
    fn enable(&self);

    /// Disables tone playback. Later `play` calls succeed without sound.
    fn disable(&self);
}

impl<P: TonePlayer + ?Sized> TonePlayer for Arc<P> {
    fn play(&self, tone: &Tone) -> Result<(), SoundError> {
        (**self).play(tone)
    }

    fn is_disabled(&self) -> bool {
        (**self).is_disabled()
    }

    fn enable(&self) {
        (**self).enable()
    }

    fn disable(&self) {
        (**self).disable()
    }
}

impl TonePlayer for RodioTonePlayer {
    fn play(&self, tone: &Tone) -> Result<(), SoundError> {
        RodioTonePlayer::play(self, tone)
    }

    fn is_disabled(&self) -> bool {
        RodioTonePlayer::is_disabled(self)
    }

    fn enable(&self) {
        RodioTonePlayer::enable(self)
    }

    fn disable(&self) {
        RodioTonePlayer::disable(self)
    }
}

/// Mock tone player for testing.
#[derive(Debug, Default)]
pub struct MockTonePlayer {
    play_calls: Mutex<Vec<Tone>>,
    disabled: AtomicBool,
    should_fail: AtomicBool,
}

impl MockTonePlayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn play_count(&self) -> usize {
        self.play_calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn get_play_calls(&self) -> Vec<Tone> {
        self.play_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl TonePlayer for MockTonePlayer {
    fn play(&self, tone: &Tone) -> Result<(), SoundError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SoundError::PlaybackError("Mock failure".to_string()));
        }
        if self.disabled.load(Ordering::SeqCst) {
            return Ok(());
        }
        if let Ok(mut calls) = self.play_calls.lock() {
            calls.push(*tone);
        }
        Ok(())
    }

    fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    fn enable(&self) {
        self.disabled.store(false, Ordering::SeqCst);
    }

    fn disable(&self) {
        self.disabled.store(true, Ordering::SeqCst);
    }
}
