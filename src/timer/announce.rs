//! Announcement trigger.
//!
//! Derives spoken cues from status snapshots taken after each transition.
//! Phase-entry cues fire once per phase change; countdown cues fire once per
//! value in the final five seconds of a step.

use serde::{Deserialize, Serialize};

use crate::types::{Phase, TimerStatus};

/// Remaining-second values that get a countdown cue.
const COUNTDOWN_FROM: u32 = 5;

/// A cue for the speech collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Cue {
    /// A new phase has been entered
    PhaseEntry {
        phase: Phase,
        exercise_name: Option<String>,
    },
    /// Final-seconds countdown
    Countdown { remaining_seconds: u32 },
}

impl Cue {
    /// Returns the text to speak for this cue.
    pub fn text(&self) -> String {
        match self {
            Cue::PhaseEntry { phase, exercise_name } => match phase {
                Phase::Prepare => "Prepare".to_string(),
                Phase::Work => match exercise_name {
                    Some(name) => format!("Work {}", name),
                    None => "Work".to_string(),
                },
                Phase::Rest => "Rest".to_string(),
                Phase::Done => "Great work!".to_string(),
                Phase::Idle => String::new(),
            },
            Cue::Countdown { remaining_seconds } => remaining_seconds.to_string(),
        }
    }
}

/// De-duplicating cue detector.
#[derive(Debug, Clone, Default)]
pub struct Announcer {
    last_phase: Option<Phase>,
    last_countdown: Option<u32>,
}

impl Announcer {
    /// Creates an announcer with empty memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets what has been announced. Called on reset and on every start.
    pub fn clear(&mut self) {
        self.last_phase = None;
        self.last_countdown = None;
    }

    /// Returns the cues due for this snapshot, phase entry first.
    pub fn observe(&mut self, status: &TimerStatus) -> Vec<Cue> {
        let mut cues = Vec::new();

        if self.last_phase != Some(status.phase) {
            self.last_phase = Some(status.phase);
            if status.phase != Phase::Idle {
                let exercise_name = Some(status.exercise_name.clone())
                    .filter(|name| status.phase == Phase::Work && !name.is_empty());
                cues.push(Cue::PhaseEntry {
                    phase: status.phase,
                    exercise_name,
                });
            }
        }

        if status.is_running && !status.is_paused && status.phase != Phase::Done {
            let remaining = status.remaining_seconds;
            if (1..=COUNTDOWN_FROM).contains(&remaining) {
                if self.last_countdown != Some(remaining) {
                    self.last_countdown = Some(remaining);
                    cues.push(Cue::Countdown {
                        remaining_seconds: remaining,
                    });
                }
            } else if remaining > COUNTDOWN_FROM {
                self.last_countdown = None;
            }
        }

        cues
    }
}
