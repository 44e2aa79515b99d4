#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Non-blocking buzzer scheduler for Meteor Defence.
//!
//! World events start short tone-step sequences; the driving loop polls
//! [`Audio::current_tone`] with its monotonic millisecond clock and feeds
//! whatever frequency comes back to the buzzer. Nothing here blocks or
//! sleeps, so the scheduler is safe to call from the tick loop.

use meteor_defence_core::Event;

/// One buzzer step: a frequency held for a fixed span.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToneStep {
    /// Frequency to drive the buzzer with, in hertz.
    pub frequency_hz: u16,
    /// How long the step lasts, in milliseconds.
    pub duration_ms: u64,
}

const fn step(frequency_hz: u16, duration_ms: u64) -> ToneStep {
    ToneStep {
        frequency_hz,
        duration_ms,
    }
}

const SHOOT_STEPS: &[ToneStep] = &[step(3_000, 100)];
const HIT_STEPS: &[ToneStep] = &[step(1_200, 100)];
const BASE_HIT_STEPS: &[ToneStep] = &[step(500, 110), step(350, 180), step(200, 414)];
const STARTUP_STEPS: &[ToneStep] = &[
    step(800, 92),
    step(1_500, 56),
    step(2_000, 170),
    step(2_500, 345),
];

/// Cues the scheduler knows how to play.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cue {
    Shoot,
    Hit,
    BaseHit,
    Startup,
}

impl Cue {
    const fn steps(self) -> &'static [ToneStep] {
        match self {
            Self::Shoot => SHOOT_STEPS,
            Self::Hit => HIT_STEPS,
            Self::BaseHit => BASE_HIT_STEPS,
            Self::Startup => STARTUP_STEPS,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct ActiveCue {
    cue: Cue,
    started_ms: u64,
}

/// Pure sound scheduler driven by events and a polled clock.
#[derive(Debug, Default)]
pub struct Audio {
    active: Option<ActiveCue>,
}

impl Audio {
    /// Creates a silent scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes world events, starting or replacing the active cue.
    ///
    /// A base strike preempts whatever is playing; shoot and hit cues
    /// replace anything except an in-flight base-hit sequence.
    pub fn handle(&mut self, events: &[Event], now_ms: u64) {
        for event in events {
            match event {
                Event::FieldReset => self.start(Cue::Startup, now_ms),
                Event::BaseStruck { .. } => self.start(Cue::BaseHit, now_ms),
                Event::ProjectileFired { .. } => self.start_unless_base_hit(Cue::Shoot, now_ms),
                Event::AsteroidShotDown { .. } => self.start_unless_base_hit(Cue::Hit, now_ms),
                _ => {}
            }
        }
    }

    /// Frequency the buzzer should emit at `now_ms`, if any.
    ///
    /// Expired cues clear themselves; the call never blocks.
    pub fn current_tone(&mut self, now_ms: u64) -> Option<u16> {
        let active = self.active?;
        let mut elapsed = now_ms.saturating_sub(active.started_ms);
        for tone in active.cue.steps() {
            if elapsed < tone.duration_ms {
                return Some(tone.frequency_hz);
            }
            elapsed -= tone.duration_ms;
        }
        self.active = None;
        None
    }

    /// True while a cue still has steps left at `now_ms`.
    #[must_use]
    pub fn is_playing(&self, now_ms: u64) -> bool {
        self.active.is_some_and(|active| {
            let total: u64 = active
                .cue
                .steps()
                .iter()
                .map(|tone| tone.duration_ms)
                .sum();
            now_ms.saturating_sub(active.started_ms) < total
        })
    }

    fn start(&mut self, cue: Cue, now_ms: u64) {
        self.active = Some(ActiveCue {
            cue,
            started_ms: now_ms,
        });
    }

    fn start_unless_base_hit(&mut self, cue: Cue, now_ms: u64) {
        let blocking = self
            .active
            .is_some_and(|active| active.cue == Cue::BaseHit && self.is_playing(now_ms));
        if !blocking {
            self.start(cue, now_ms);
        }
    }
}
