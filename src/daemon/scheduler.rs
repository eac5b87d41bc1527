//! Countdown scheduler for the HIIT timer.
//!
//! Delivers one tick per second to the timer engine while it is counting:
//! - `Ticker`: resettable one-second tick source
//! - `IntervalTicker`: tokio interval (production)
//! - `ChannelTicker`: manually driven ticks (tests)
//! - `Scheduler`: the loop tying a ticker to the engine
//!
//! Every manual operation on the engine bumps its control generation. The
//! scheduler restarts its ticker on each change, so a resumed or skipped step
//! always gets a full second before its first tick.

use std::sync::Arc;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::time::{interval_at, Duration, Instant, Interval, MissedTickBehavior};
use tracing::debug;

use super::timer::TimerEngine;

/// Tick period.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

// ============================================================================
// Ticker Trait
// ============================================================================

/// Resettable source of periodic ticks.
#[allow(async_fn_in_trait)]
pub trait Ticker {
    /// Waits for the next tick.
    async fn tick(&mut self);

    /// Restarts the period from now, discarding any pending tick.
    fn reset(&mut self);
}

// ============================================================================
// IntervalTicker
// ============================================================================

/// Ticker backed by `tokio::time::Interval`.
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    /// Creates a ticker whose first tick is one full period away.
    pub fn new(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval }
    }
}

impl Default for IntervalTicker {
    fn default() -> Self {
        Self::new(TICK_PERIOD)
    }
}

impl Ticker for IntervalTicker {
    async fn tick(&mut self) {
        self.interval.tick().await;
    }

    fn reset(&mut self) {
        self.interval.reset();
    }
}

// ============================================================================
// ChannelTicker
// ============================================================================

/// Ticker driven by a [`TickHandle`].
pub struct ChannelTicker {
    rx: mpsc::UnboundedReceiver<()>,
}

/// Sends ticks to a [`ChannelTicker`].
#[derive(Clone)]
pub struct TickHandle {
    tx: mpsc::UnboundedSender<()>,
}

impl ChannelTicker {
    /// Creates a ticker and the handle that drives it.
    pub fn new() -> (Self, TickHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx }, TickHandle { tx })
    }
}

impl TickHandle {
    /// Queues one tick.
    pub fn tick(&self) {
        let _ = self.tx.send(());
    }
}

impl Ticker for ChannelTicker {
    async fn tick(&mut self) {
        if self.rx.recv().await.is_none() {
            // Handle dropped: no more ticks will ever arrive
            std::future::pending::<()>().await;
        }
    }

    fn reset(&mut self) {
        while self.rx.try_recv().is_ok() {}
    }
}

// ============================================================================
// Scheduler
// ============================================================================

/// Drives a [`TimerEngine`] from a [`Ticker`].
pub struct Scheduler<T: Ticker> {
    engine: Arc<Mutex<TimerEngine>>,
    control: watch::Receiver<u64>,
    ticker: T,
}

impl<T: Ticker> Scheduler<T> {
    /// Creates a scheduler.
    ///
    /// `control` must come from [`TimerEngine::subscribe`] on the same engine.
    pub fn new(engine: Arc<Mutex<TimerEngine>>, control: watch::Receiver<u64>, ticker: T) -> Self {
        Self {
            engine,
            control,
            ticker,
        }
    }

    /// Runs until the engine's control channel closes.
    pub async fn run(mut self) {
        loop {
            let counting = self.engine.lock().await.is_counting();

            if counting {
                tokio::select! {
                    _ = self.ticker.tick() => {
                        let mut engine = self.engine.lock().await;
                        // A manual operation that won the lock owns this second
                        if matches!(self.control.has_changed(), Ok(false)) {
                            engine.handle_tick();
                        }
                    }
                    changed = self.control.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        self.ticker.reset();
                    }
                }
            } else {
                if self.control.changed().await.is_err() {
                    break;
                }
                self.ticker.reset();
            }
        }
        debug!("Scheduler stopped");
    }
}

// ============================================================================
// Tests
// ============================================================================
