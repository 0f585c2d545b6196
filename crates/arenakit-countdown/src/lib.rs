//! Cancellable countdown scheduling for arenakit.
//!
//! Provides the lobby countdown ([`CountdownScheduler`]) and a cancellable
//! one-shot delay ([`Deadline`]). Neither spawns tasks of its own: both are
//! futures meant to sit inside an arena actor's `tokio::select!` loop, so
//! every tick is applied on the same task that handles joins and leaves.
//!
//! # Integration
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* join, leave, transition */ }
//!         tick = countdown.wait_for_tick() => {
//!             match countdown.apply(tick) {
//!                 TickOutcome::Progress { seconds, announce } => { /* message */ }
//!                 TickOutcome::Finished => { /* enter next phase */ }
//!                 TickOutcome::Stale => {}
//!             }
//!         }
//!     }
//! }
//! ```
//!
//! # Stale ticks
//!
//! Every `start` bumps a generation counter and every tick carries the
//! generation it was scheduled under. [`CountdownScheduler::apply`] drops a
//! tick whose generation no longer matches, so a tick produced before a
//! `cancel` can never fire a transition after it.

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for a [`CountdownScheduler`].
#[derive(Debug, Clone)]
pub struct CountdownConfig {
    /// Length of the countdown in whole seconds.
    pub duration_secs: u32,
    /// Time between ticks. One second for a real lobby; tests may shrink it.
    pub tick_interval: Duration,
    /// Every tick at or below this many seconds is announced.
    pub announce_below: u32,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            duration_secs: 30,
            tick_interval: Duration::from_secs(1),
            announce_below: 10,
        }
    }
}

impl CountdownConfig {
    /// Longest countdown accepted (one hour).
    pub const MAX_DURATION_SECS: u32 = 3600;

    /// A config for `duration_secs` with default tick interval and checkpoints.
    pub fn with_duration(duration_secs: u32) -> Self {
        Self {
            duration_secs,
            ..Default::default()
        }
    }

    /// Clamp out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`CountdownScheduler::new`]. Rules:
    /// - `duration_secs` capped to [`Self::MAX_DURATION_SECS`].
    /// - A zero `tick_interval` is replaced by one second.
    pub fn validated(mut self) -> Self {
        if self.duration_secs > Self::MAX_DURATION_SECS {
            warn!(
                duration = self.duration_secs,
                max = Self::MAX_DURATION_SECS,
                "countdown duration exceeds maximum, clamping"
            );
            self.duration_secs = Self::MAX_DURATION_SECS;
        }
        if self.tick_interval.is_zero() {
            warn!("countdown tick interval is zero, using one second");
            self.tick_interval = Duration::from_secs(1);
        }
        self
    }

    /// Whether the tick showing `seconds` left should be announced.
    ///
    /// Checkpoints are the halfway mark and every second at or below
    /// `announce_below`.
    pub fn is_checkpoint(&self, seconds: u32) -> bool {
        seconds == self.duration_secs / 2 || seconds <= self.announce_below
    }
}

// ---------------------------------------------------------------------------
// Tick types
// ---------------------------------------------------------------------------

/// A tick produced by [`CountdownScheduler::wait_for_tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownTick {
    /// The generation of the countdown run that scheduled this tick.
    pub generation: u64,
    /// Tick number within that run, starting at 1.
    pub tick: u64,
}

/// What applying a tick did to the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The countdown moved one second closer to zero.
    Progress {
        /// Seconds left as shown on this tick, before the decrement.
        seconds: u32,
        /// `true` when this tick is a checkpoint worth broadcasting.
        announce: bool,
    },
    /// The countdown reached zero and stopped itself. Fires exactly once
    /// per run.
    Finished,
    /// The tick belonged to a cancelled or finished run and was ignored.
    Stale,
}

/// Lifetime counters for one scheduler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountdownMetrics {
    pub started: u64,
    pub cancelled: u64,
    pub finished: u64,
    pub ticks: u64,
    pub stale_ticks: u64,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// The lobby countdown for one arena.
///
/// `remaining` is in whole seconds, never negative, and only moves down
/// while the countdown is active. It is reset to the full duration by
/// [`start`](Self::start) and [`cancel`](Self::cancel) and nowhere else.
///
/// The first tick fires as soon as the countdown starts, then once per
/// `tick_interval`, so a 30 second countdown shows 30, 29, .., 1 and
/// finishes on the tick that finds zero, 30 intervals after the start.
#[derive(Debug)]
pub struct CountdownScheduler {
    config: CountdownConfig,
    remaining: u32,
    active: bool,
    generation: u64,
    tick_count: u64,
    /// When the next tick should fire (Tokio instant for `sleep_until`).
    next_tick: Option<Instant>,
    metrics: CountdownMetrics,
}

impl CountdownScheduler {
    /// Create an idle scheduler from config.
    pub fn new(config: CountdownConfig) -> Self {
        let config = config.validated();
        debug!(
            duration_secs = config.duration_secs,
            interval_ms = config.tick_interval.as_millis() as u64,
            "countdown scheduler created"
        );
        Self {
            remaining: config.duration_secs,
            config,
            active: false,
            generation: 0,
            tick_count: 0,
            next_tick: None,
            metrics: CountdownMetrics::default(),
        }
    }

    /// Create an idle scheduler for `duration_secs` with default settings.
    pub fn with_duration(duration_secs: u32) -> Self {
        Self::new(CountdownConfig::with_duration(duration_secs))
    }

    /// Start counting down from the full duration.
    ///
    /// Returns `false` and changes nothing if a countdown is already
    /// running, so a second start can never double-schedule ticks.
    pub fn start(&mut self) -> bool {
        if self.active {
            debug!(remaining = self.remaining, "countdown already running, start ignored");
            return false;
        }
        self.active = true;
        self.remaining = self.config.duration_secs;
        self.generation += 1;
        self.tick_count = 0;
        self.next_tick = Some(Instant::now());
        self.metrics.started += 1;
        debug!(
            generation = self.generation,
            duration_secs = self.config.duration_secs,
            "countdown started"
        );
        true
    }

    /// Stop the countdown and reset `remaining` to the full duration.
    ///
    /// Idempotent. Returns `true` only when this call stopped a running
    /// countdown; later calls just re-apply the reset. Ticks scheduled
    /// before the cancel are stale from this point on.
    pub fn cancel(&mut self) -> bool {
        let was_active = self.active;
        self.active = false;
        self.next_tick = None;
        self.remaining = self.config.duration_secs;
        if was_active {
            self.metrics.cancelled += 1;
            debug!(generation = self.generation, "countdown cancelled");
        }
        was_active
    }

    /// Wait until the next tick is due.
    ///
    /// Pends forever while the countdown is idle; `tokio::select!` keeps
    /// serving its other branches. Cancel-safe: dropping the future before
    /// it resolves loses nothing.
    pub async fn wait_for_tick(&mut self) -> CountdownTick {
        let next = match self.next_tick {
            Some(next) if self.active => next,
            _ => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        };

        time::sleep_until(next).await;

        self.next_tick = Some(next + self.config.tick_interval);
        self.tick_count += 1;
        CountdownTick {
            generation: self.generation,
            tick: self.tick_count,
        }
    }

    /// Apply a tick produced by [`wait_for_tick`](Self::wait_for_tick).
    ///
    /// At zero the countdown stops itself and reports
    /// [`TickOutcome::Finished`]; otherwise `remaining` drops by one.
    pub fn apply(&mut self, tick: CountdownTick) -> TickOutcome {
        if !self.active || tick.generation != self.generation {
            self.metrics.stale_ticks += 1;
            trace!(
                tick_generation = tick.generation,
                generation = self.generation,
                "stale countdown tick ignored"
            );
            return TickOutcome::Stale;
        }

        self.metrics.ticks += 1;

        if self.remaining == 0 {
            self.active = false;
            self.next_tick = None;
            self.metrics.finished += 1;
            debug!(generation = self.generation, "countdown finished");
            return TickOutcome::Finished;
        }

        let seconds = self.remaining;
        let announce = self.config.is_checkpoint(seconds);
        self.remaining -= 1;
        trace!(tick = tick.tick, seconds, announce, "countdown tick");
        TickOutcome::Progress { seconds, announce }
    }

    /// Apply a tick for the current run immediately, without waiting.
    ///
    /// For hosts that drive the countdown from their own clock.
    pub fn tick(&mut self) -> TickOutcome {
        self.tick_count += 1;
        self.apply(CountdownTick {
            generation: self.generation,
            tick: self.tick_count,
        })
    }

    /// Change the countdown length. Takes effect on the next `start`; an
    /// idle scheduler also resets `remaining` to the new length.
    pub fn set_duration(&mut self, duration_secs: u32) {
        self.config = CountdownConfig {
            duration_secs,
            ..self.config.clone()
        }
        .validated();
        if !self.active {
            self.remaining = self.config.duration_secs;
        }
    }

    /// Seconds left on the countdown.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// The configured length in seconds.
    pub fn duration(&self) -> u32 {
        self.config.duration_secs
    }

    /// Whether a countdown is running.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Generation of the current (or last) run.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The active configuration.
    pub fn config(&self) -> &CountdownConfig {
        &self.config
    }

    /// Snapshot of lifetime counters.
    pub fn metrics(&self) -> &CountdownMetrics {
        &self.metrics
    }
}

// ---------------------------------------------------------------------------
// Deadline
// ---------------------------------------------------------------------------

/// A cancellable "run once after N seconds" timer.
///
/// Like the countdown, it is a future for a `select!` loop rather than a
/// spawned task. Firing disarms it.
#[derive(Debug, Default)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// A disarmed deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) the deadline to fire `after` from now.
    pub fn arm(&mut self, after: Duration) {
        self.at = Some(Instant::now() + after);
        debug!(after_ms = after.as_millis() as u64, "deadline armed");
    }

    /// Disarm the deadline. Returns `true` if it was armed.
    pub fn disarm(&mut self) -> bool {
        self.at.take().is_some()
    }

    /// Whether the deadline is waiting to fire.
    pub fn is_armed(&self) -> bool {
        self.at.is_some()
    }

    /// Wait for the deadline, then disarm it. Pends forever while disarmed.
    ///
    /// Cancel-safe: re-arming or disarming between polls is picked up by
    /// the next call.
    pub async fn wait(&mut self) {
        let Some(at) = self.at else {
            std::future::pending::<()>().await;
            return;
        };
        time::sleep_until(at).await;
        self.at = None;
    }
}
