#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic tick scheduler for Meteor Defence.
//!
//! The driving loop polls a monotonic millisecond clock and asks this system
//! which tick commands are due. Each tick category tracks its own
//! "last fired" timestamp and fires when `now >= last + period`; firing
//! rebases the timestamp to `now`, so a late poll drifts rather than
//! producing a catch-up burst. Pausing freezes both timers and resuming
//! rebases them by the paused span, so paused wall-time never counts.

use meteor_defence_core::{Command, Event};

const DEFAULT_ASTEROID_PERIOD_MS: u64 = 500;
const DEFAULT_PROJECTILE_PERIOD_MS: u64 = 500;
const MIN_ASTEROID_PERIOD_MS: u64 = 100;

/// Milliseconds shaved off the asteroid period per score point.
const ACCELERATION_MS_PER_POINT: f64 = 1.8;

/// Configuration parameters required to construct the cadence system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    asteroid_period_ms: u64,
    projectile_period_ms: u64,
    min_asteroid_period_ms: u64,
}

impl Config {
    /// Creates a new configuration with explicit periods.
    #[must_use]
    pub const fn new(
        asteroid_period_ms: u64,
        projectile_period_ms: u64,
        min_asteroid_period_ms: u64,
    ) -> Self {
        Self {
            asteroid_period_ms,
            projectile_period_ms,
            min_asteroid_period_ms,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            DEFAULT_ASTEROID_PERIOD_MS,
            DEFAULT_PROJECTILE_PERIOD_MS,
            MIN_ASTEROID_PERIOD_MS,
        )
    }
}

/// Pure scheduler emitting tick commands on elapsed-time comparisons.
#[derive(Debug)]
pub struct Cadence {
    config: Config,
    last_asteroid_ms: u64,
    last_projectile_ms: u64,
    pause_started_ms: Option<u64>,
}

impl Cadence {
    /// Creates a new cadence system using the supplied configuration.
    ///
    /// Both timers start at `now_ms`, so the first ticks fire one full
    /// period after construction.
    #[must_use]
    pub fn new(config: Config, now_ms: u64) -> Self {
        Self {
            config,
            last_asteroid_ms: now_ms,
            last_projectile_ms: now_ms,
            pause_started_ms: None,
        }
    }

    /// Asteroid period for the given score: the base period shrinks as the
    /// score grows, floored so the cadence never collapses to zero.
    #[must_use]
    pub fn asteroid_period_ms(&self, score: u32) -> u64 {
        let shaved = (f64::from(score) * ACCELERATION_MS_PER_POINT) as u64;
        self.config
            .asteroid_period_ms
            .saturating_sub(shaved)
            .max(self.config.min_asteroid_period_ms)
    }

    /// Consumes world events to track pause spans and field resets.
    pub fn handle(&mut self, events: &[Event], now_ms: u64) {
        for event in events {
            match event {
                Event::PauseChanged { paused: true } => {
                    if self.pause_started_ms.is_none() {
                        self.pause_started_ms = Some(now_ms);
                    }
                }
                Event::PauseChanged { paused: false } => {
                    if let Some(started) = self.pause_started_ms.take() {
                        let span = now_ms.saturating_sub(started);
                        self.last_asteroid_ms = self.last_asteroid_ms.saturating_add(span);
                        self.last_projectile_ms = self.last_projectile_ms.saturating_add(span);
                    }
                }
                Event::FieldReset => {
                    self.last_asteroid_ms = now_ms;
                    self.last_projectile_ms = now_ms;
                    self.pause_started_ms = None;
                }
                _ => {}
            }
        }
    }

    /// Emits the tick commands due at `now_ms` for the given score.
    pub fn poll(&mut self, now_ms: u64, score: u32, out: &mut Vec<Command>) {
        if self.pause_started_ms.is_some() {
            return;
        }

        if now_ms >= self.last_asteroid_ms + self.asteroid_period_ms(score) {
            out.push(Command::AdvanceAsteroids);
            self.last_asteroid_ms = now_ms;
        }
        if now_ms >= self.last_projectile_ms + self.config.projectile_period_ms {
            out.push(Command::AdvanceProjectiles);
            self.last_projectile_ms = now_ms;
        }
    }
}
