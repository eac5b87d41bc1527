//! Timer engine for the HIIT timer.
//!
//! This module wraps the pure timer core for use inside the daemon:
//! - Runs every operation through the state machine
//! - Derives spoken cues after each transition
//! - Publishes events for speech, sound and completion history
//! - Signals control changes to the countdown scheduler

use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::timer::{Announcer, Cue, TimerMachine};
use crate::types::{ExerciseConfig, Phase, QuickTimerSettings, TimerStatus};

// ============================================================================
// TimerEvent
// ============================================================================

/// Timer events for announcements and external integrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// A run started
    Started {
        workout_name: Option<String>,
        total_steps: usize,
    },
    /// A new step became current (including restarts via skip-back)
    StepEntered { phase: Phase, step_index: usize },
    /// A cue should be spoken
    Announce(Cue),
    /// Timer paused
    Paused,
    /// Timer resumed
    Resumed,
    /// One second elapsed
    Tick { remaining_seconds: u32 },
    /// The run reached its end
    Completed { workout_name: Option<String> },
    /// Timer returned to idle
    Reset,
}

// ============================================================================
// TimerEngine
// ============================================================================

/// Timer engine that owns the state machine and publishes its transitions.
pub struct TimerEngine {
    machine: TimerMachine,
    announcer: Announcer,
    /// Event sender channel
    event_tx: mpsc::UnboundedSender<TimerEvent>,
    /// Bumped on every manual operation so the scheduler can restart its ticker
    control_tx: watch::Sender<u64>,
}

impl TimerEngine {
    /// Creates an idle engine with the given quick timer settings and event channel.
    pub fn new(settings: QuickTimerSettings, event_tx: mpsc::UnboundedSender<TimerEvent>) -> Self {
        let (control_tx, _) = watch::channel(0);
        Self {
            machine: TimerMachine::new(settings),
            announcer: Announcer::new(),
            event_tx,
            control_tx,
        }
    }

    /// Subscribes to control changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.control_tx.subscribe()
    }

    /// Replaces the quick timer settings used by [`TimerEngine::start_quick`].
    pub fn set_quick_settings(&mut self, settings: QuickTimerSettings) {
        self.machine.set_settings(settings);
    }

    /// Returns the quick timer settings.
    pub fn quick_settings(&self) -> QuickTimerSettings {
        self.machine.settings()
    }

    /// Starts a run over the given exercises.
    ///
    /// Returns false (and leaves the engine idle) for an empty list.
    pub fn start(&mut self, exercises: &[ExerciseConfig], workout_name: Option<String>) -> bool {
        let started = self.machine.start(exercises, workout_name);
        self.after_start(started)
    }

    /// Starts a quick run from the current quick timer settings.
    pub fn start_quick(&mut self) -> bool {
        let started = self.machine.start_quick();
        self.after_start(started)
    }

    fn after_start(&mut self, started: bool) -> bool {
        self.announcer.clear();
        self.notify_control();

        if !started {
            self.emit(TimerEvent::Reset);
            return false;
        }

        self.emit(TimerEvent::Started {
            workout_name: self.machine.workout_name().map(str::to_string),
            total_steps: self.machine.steps().len(),
        });
        self.emit_step_entered();
        self.announce();
        true
    }

    /// Returns to idle. Always succeeds.
    pub fn reset(&mut self) {
        self.machine.reset();
        self.announcer.clear();
        self.notify_control();
        info!("Timer reset");
        self.emit(TimerEvent::Reset);
    }

    /// Skips to the next step. No-op unless running.
    pub fn skip_forward(&mut self) -> bool {
        if !self.machine.skip_forward() {
            return false;
        }
        self.notify_control();
        self.after_step_change();
        true
    }

    /// Restarts the current step or moves back one step. No-op unless running.
    pub fn skip_back(&mut self) -> bool {
        if !self.machine.rewind() {
            return false;
        }
        self.notify_control();
        self.after_step_change();
        true
    }

    /// Pauses or resumes. No-op unless a run is in progress.
    pub fn toggle_pause(&mut self) -> bool {
        if !self.machine.toggle_pause() {
            return false;
        }
        self.notify_control();

        if self.machine.state().is_paused {
            info!("Timer paused");
            self.emit(TimerEvent::Paused);
        } else {
            info!("Timer resumed");
            self.emit(TimerEvent::Resumed);
            self.announce();
        }
        true
    }

    /// Applies one scheduler tick.
    ///
    /// Reaching zero advances to the next step within the same call, so no
    /// further tick can observe the step at zero.
    pub fn handle_tick(&mut self) {
        if !self.machine.is_counting() {
            return;
        }

        let completed = self.machine.tick();
        self.emit(TimerEvent::Tick {
            remaining_seconds: self.machine.state().remaining_seconds,
        });

        if completed {
            self.machine.advance();
            self.after_step_change();
        } else {
            self.announce();
        }
    }

    /// Returns true while the scheduler should deliver ticks.
    pub fn is_counting(&self) -> bool {
        self.machine.is_counting()
    }

    /// Returns the read-only status snapshot.
    pub fn status(&self) -> TimerStatus {
        self.machine.status()
    }

    /// Returns a reference to the state machine.
    pub fn machine(&self) -> &TimerMachine {
        &self.machine
    }

    /// Returns a mutable reference to the state machine (for testing).
    #[cfg(test)]
    pub fn machine_mut(&mut self) -> &mut TimerMachine {
        &mut self.machine
    }

    fn after_step_change(&mut self) {
        if self.machine.state().phase == Phase::Done {
            self.emit(TimerEvent::Completed {
                workout_name: self.machine.workout_name().map(str::to_string),
            });
        } else {
            self.emit_step_entered();
        }
        self.announce();
    }

    fn emit_step_entered(&self) {
        if let Some(step_index) = self.machine.state().current_step_index {
            self.emit(TimerEvent::StepEntered {
                phase: self.machine.state().phase,
                step_index,
            });
        }
    }

    fn announce(&mut self) {
        let status = self.machine.status();
        for cue in self.announcer.observe(&status) {
            debug!(text = %cue.text(), "Cue");
            self.emit(TimerEvent::Announce(cue));
        }
    }

    fn notify_control(&self) {
        self.control_tx.send_modify(|generation| *generation = generation.wrapping_add(1));
    }

    fn emit(&self, event: TimerEvent) {
        if self.event_tx.send(event).is_err() {
            debug!("No event listener; event dropped");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::PREP_SECONDS;

    fn create_engine() -> (TimerEngine, mpsc::UnboundedReceiver<TimerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let engine = TimerEngine::new(QuickTimerSettings::default(), tx);
        (engine, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<TimerEvent>) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn spoken(events: &[TimerEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|event| match event {
                TimerEvent::Announce(cue) => Some(cue.text()),
                _ => None,
            })
            .collect()
    }

    fn single_set(work: u32) -> Vec<ExerciseConfig> {
        vec![ExerciseConfig::new("a", "Squat", 1, work, 0)]
    }

    // ------------------------------------------------------------------------
    // Start / Reset Tests
    // ------------------------------------------------------------------------

    mod start_reset_tests {
        use super::*;

        #[test]
        fn test_new_engine_is_idle() {
            let (engine, _rx) = create_engine();
            let status = engine.status();

            assert_eq!(status.phase, Phase::Idle);
            assert!(!status.is_running);
            assert_eq!(status.overall_remaining, 310);
        }

        #[test]
        fn test_start_emits_started_and_prepare_cue() {
            let (mut engine, mut rx) = create_engine();

            assert!(engine.start(&single_set(5), Some("Legs".to_string())));

            let events = drain(&mut rx);
            assert_eq!(
                events[0],
                TimerEvent::Started {
                    workout_name: Some("Legs".to_string()),
                    total_steps: 2,
                }
            );
            assert_eq!(
                events[1],
                TimerEvent::StepEntered {
                    phase: Phase::Prepare,
                    step_index: 0,
                }
            );
            assert_eq!(spoken(&events), vec!["Prepare"]);
        }

        #[test]
        fn test_start_empty_is_noop_to_idle() {
            let (mut engine, mut rx) = create_engine();

            assert!(!engine.start(&[], None));

            assert_eq!(engine.status().phase, Phase::Idle);
            assert_eq!(drain(&mut rx), vec![TimerEvent::Reset]);
        }

        #[test]
        fn test_start_quick_uses_settings() {
            let (mut engine, _rx) = create_engine();
            engine.set_quick_settings(QuickTimerSettings::default().with_sets(2));

            assert!(engine.start_quick());
            assert_eq!(engine.machine().steps().len(), 4);
            assert_eq!(engine.quick_settings().sets, 2);
        }

        #[test]
        fn test_reset_clears_announcement_memory() {
            let (mut engine, mut rx) = create_engine();
            engine.start(&single_set(5), None);
            engine.reset();
            drain(&mut rx);

            engine.start(&single_set(5), None);
            assert_eq!(spoken(&drain(&mut rx)), vec!["Prepare"]);
        }

        #[test]
        fn test_reset_bumps_control_generation() {
            let (mut engine, _rx) = create_engine();
            let control = engine.subscribe();
            let before = *control.borrow();

            engine.reset();

            assert_ne!(*control.borrow(), before);
        }

        #[test]
        fn test_engine_works_without_listener() {
            let (mut engine, rx) = create_engine();
            drop(rx);

            assert!(engine.start(&single_set(5), None));
            engine.handle_tick();
            assert_eq!(engine.status().remaining_seconds, PREP_SECONDS - 1);
        }
    }

    // ------------------------------------------------------------------------
    // Tick Tests
    // ------------------------------------------------------------------------

    mod tick_tests {
        use super::*;

        #[test]
        fn test_tick_emits_remaining() {
            let (mut engine, mut rx) = create_engine();
            engine.start(&single_set(5), None);
            drain(&mut rx);

            engine.handle_tick();

            assert_eq!(
                drain(&mut rx),
                vec![TimerEvent::Tick {
                    remaining_seconds: PREP_SECONDS - 1
                }]
            );
        }

        #[test]
        fn test_tick_to_zero_advances_immediately() {
            let (mut engine, _rx) = create_engine();
            engine.start(&single_set(5), None);
            engine.machine_mut().tick();

            for _ in 0..PREP_SECONDS - 1 {
                engine.handle_tick();
            }

            let status = engine.status();
            assert_eq!(status.phase, Phase::Work);
            assert_eq!(status.remaining_seconds, 5);
        }

        #[test]
        fn test_full_run_cues() {
            let (mut engine, mut rx) = create_engine();
            engine.start(&single_set(5), None);

            for _ in 0..15 {
                engine.handle_tick();
            }

            let events = drain(&mut rx);
            assert_eq!(
                spoken(&events),
                vec![
                    "Prepare", "5", "4", "3", "2", "1", "Work Squat", "5", "4", "3", "2", "1",
                    "Great work!"
                ]
            );
            assert_eq!(
                events
                    .iter()
                    .filter(|e| matches!(e, TimerEvent::Completed { .. }))
                    .count(),
                1
            );
            assert_eq!(engine.status().phase, Phase::Done);
            assert!(!engine.status().is_running);
        }

        #[test]
        fn test_tick_after_done_is_ignored() {
            let (mut engine, mut rx) = create_engine();
            engine.start(&single_set(5), None);
            for _ in 0..15 {
                engine.handle_tick();
            }
            drain(&mut rx);

            engine.handle_tick();

            assert!(drain(&mut rx).is_empty());
        }

        #[test]
        fn test_tick_while_paused_is_ignored() {
            let (mut engine, mut rx) = create_engine();
            engine.start(&single_set(5), None);
            engine.toggle_pause();
            drain(&mut rx);

            engine.handle_tick();

            assert!(drain(&mut rx).is_empty());
            assert_eq!(engine.status().remaining_seconds, PREP_SECONDS);
        }
    }

    // ------------------------------------------------------------------------
    // Control Tests
    // ------------------------------------------------------------------------

    mod control_tests {
        use super::*;

        #[test]
        fn test_toggle_pause_events() {
            let (mut engine, mut rx) = create_engine();
            engine.start(&single_set(5), None);
            drain(&mut rx);

            assert!(engine.toggle_pause());
            assert_eq!(drain(&mut rx), vec![TimerEvent::Paused]);

            assert!(engine.toggle_pause());
            assert_eq!(drain(&mut rx), vec![TimerEvent::Resumed]);
        }

        #[test]
        fn test_controls_are_noops_when_idle() {
            let (mut engine, mut rx) = create_engine();
            let control = engine.subscribe();

            assert!(!engine.toggle_pause());
            assert!(!engine.skip_forward());
            assert!(!engine.skip_back());

            assert!(drain(&mut rx).is_empty());
            assert!(!control.has_changed().unwrap());
        }

        #[test]
        fn test_skip_forward_to_done_emits_completed() {
            let (mut engine, mut rx) = create_engine();
            engine.start(&single_set(5), Some("Legs".to_string()));
            drain(&mut rx);

            engine.skip_forward();
            engine.skip_forward();

            let events = drain(&mut rx);
            assert!(events.contains(&TimerEvent::Completed {
                workout_name: Some("Legs".to_string())
            }));
            assert_eq!(spoken(&events), vec!["Work Squat", "5", "Great work!"]);
        }

        #[test]
        fn test_skip_back_restart_emits_step_entered() {
            let (mut engine, mut rx) = create_engine();
            engine.start(&single_set(30), None);
            engine.skip_forward();
            for _ in 0..10 {
                engine.handle_tick();
            }
            drain(&mut rx);

            assert!(engine.skip_back());

            assert_eq!(engine.status().remaining_seconds, 30);
            assert_eq!(
                drain(&mut rx),
                vec![TimerEvent::StepEntered {
                    phase: Phase::Work,
                    step_index: 1,
                }]
            );
        }

        #[test]
        fn test_skip_bumps_control_generation() {
            let (mut engine, _rx) = create_engine();
            engine.start(&single_set(5), None);
            let mut control = engine.subscribe();
            control.borrow_and_update();

            engine.skip_forward();

            assert!(control.has_changed().unwrap());
        }
    }
}
