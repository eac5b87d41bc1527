//! Tone player implementation using rodio.
//!
//! The cue tone is synthesized from a sine wave, so no audio files are needed.

use std::sync::atomic::{AtomicBool, Ordering};

use rodio::source::{SineWave, Source};
use rodio::{OutputStream, OutputStreamHandle, Sink};
use tracing::{debug, warn};

use super::error::SoundError;
use super::Tone;

/// A tone player that uses rodio for audio playback.
///
/// Playback is non-blocking; the tone finishes in the background.
pub struct RodioTonePlayer {
    /// The audio output stream (must be kept alive for playback).
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    disabled: AtomicBool,
}

impl RodioTonePlayer {
    /// Opens the default audio output.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::DeviceNotAvailable` if no audio output device
    /// is available.
    pub fn new(disabled: bool) -> Result<Self, SoundError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| SoundError::DeviceNotAvailable(e.to_string()))?;

        debug!("Audio output stream initialized");

        Ok(Self {
            _stream: stream,
            stream_handle,
            disabled: AtomicBool::new(disabled),
        })
    }

    /// Plays `tone` without waiting for it to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if no sink can be created on the output stream.
    pub fn play(&self, tone: &Tone) -> Result<(), SoundError> {
        if self.disabled.load(Ordering::Relaxed) {
            debug!("Sound playback disabled, skipping");
            return Ok(());
        }

        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| SoundError::StreamError(e.to_string()))?;

        let source = SineWave::new(tone.frequency_hz)
            .take_duration(tone.duration)
            .amplify(tone.gain);
        sink.append(source);
        sink.detach();

        debug!(frequency = tone.frequency_hz, "Tone playback started (detached)");
        Ok(())
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Relaxed)
    }

    pub fn enable(&self) {
        self.disabled.store(false, Ordering::Relaxed);
    }

    pub fn disable(&self) {
        self.disabled.store(true, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for RodioTonePlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioTonePlayer")
            .field("disabled", &self.disabled.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Creates a tone player, returning None if audio is unavailable.
///
/// If audio initialization fails, a warning is logged and None is returned.
#[must_use]
pub fn try_create_player(disabled: bool) -> Option<RodioTonePlayer> {
    match RodioTonePlayer::new(disabled) {
        Ok(player) => Some(player),
        Err(e) => {
            warn!("Audio not available, cue tone disabled: {}", e);
            None
        }
    }
}
