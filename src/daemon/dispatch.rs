//! Event dispatcher for the HIIT timer daemon.
//!
//! Consumes `TimerEvent`s from the engine and drives the side effects:
//! - Speaks announcement cues, falling back to the cue tone on failure
//! - Records today's date in the completion history when a run finishes
//!
//! Events that queued up while a cue was being spoken are handled as one
//! batch. A countdown cue in that batch is dropped when a newer cue follows
//! it, so speech never lags behind the clock. The engine still emits every
//! countdown cue exactly once.
//!
//! Failures here are logged and dropped; they never reach the engine.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::timer::TimerEvent;
use crate::sound::{TonePlayer, CUE_TONE};
use crate::speech::Speaker;
use crate::storage::WorkoutHistory;
use crate::timer::Cue;

/// Delivers engine events to the speech, sound and history collaborators.
pub struct EventDispatcher<S: Speaker, P: TonePlayer> {
    speaker: S,
    tone_player: Option<P>,
    history: Option<WorkoutHistory>,
}

impl<S: Speaker, P: TonePlayer> EventDispatcher<S, P> {
    /// Creates a dispatcher. Without a tone player, failed cues stay silent.
    pub fn new(speaker: S, tone_player: Option<P>) -> Self {
        Self {
            speaker,
            tone_player,
            history: None,
        }
    }

    /// Records completions in `history`.
    pub fn with_history(mut self, history: WorkoutHistory) -> Self {
        self.history = Some(history);
        self
    }

    pub fn speaker(&self) -> &S {
        &self.speaker
    }

    pub fn tone_player(&self) -> Option<&P> {
        self.tone_player.as_ref()
    }

    pub fn history(&self) -> Option<&WorkoutHistory> {
        self.history.as_ref()
    }

    /// Runs until the event channel closes.
    ///
    /// Events that queued up while a cue was being spoken are handled as one
    /// batch, in which an outdated countdown number is skipped.
    pub async fn run(mut self, mut rx: mpsc::UnboundedReceiver<TimerEvent>) {
        while let Some(event) = rx.recv().await {
            let mut batch = vec![event];
            while let Ok(event) = rx.try_recv() {
                batch.push(event);
            }

            for event in drop_stale_countdowns(batch) {
                self.handle(event).await;
            }
        }
        debug!("Event dispatcher stopped");
    }

    /// Handles one event.
    pub async fn handle(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::Announce(cue) => self.announce(&cue).await,
            TimerEvent::Completed { workout_name } => {
                info!(workout = ?workout_name, "Workout completed");
                self.record_completion();
            }
            other => debug!(event = ?other, "Timer event"),
        }
    }

    async fn announce(&self, cue: &Cue) {
        let text = cue.text();
        if let Err(e) = self.speaker.speak(&text).await {
            warn!("読み上げに失敗しました ({}): {}", text, e);
            self.play_fallback_tone();
        }
    }

    fn play_fallback_tone(&self) {
        let Some(player) = &self.tone_player else {
            return;
        };
        if let Err(e) = player.play(&CUE_TONE) {
            warn!("代替トーンの再生に失敗しました: {}", e);
        }
    }

    fn record_completion(&mut self) {
        let Some(history) = self.history.as_mut() else {
            return;
        };
        let today = chrono::Local::now().date_naive();
        if let Err(e) = history.mark_completed(today) {
            warn!("完了履歴を保存できませんでした: {}", e);
        }
    }
}

/// Removes countdown cues that are followed by a newer cue in the same batch.
fn drop_stale_countdowns(batch: Vec<TimerEvent>) -> Vec<TimerEvent> {
    let last_announce = batch
        .iter()
        .rposition(|event| matches!(event, TimerEvent::Announce(_)));

    batch
        .into_iter()
        .enumerate()
        .filter(|(index, event)| match event {
            TimerEvent::Announce(Cue::Countdown { .. }) => Some(*index) == last_announce,
            _ => true,
        })
        .map(|(_, event)| event)
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
