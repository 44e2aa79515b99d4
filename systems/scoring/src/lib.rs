#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Event-fed score tally for Meteor Defence.

use meteor_defence_core::Event;

/// Pure system folding world events into a monotonically increasing score.
///
/// Every asteroid shot down is worth one point. Base strikes never score,
/// and nothing ever decrements the tally.
#[derive(Debug, Default)]
pub struct Scoring {
    score: u32,
}

impl Scoring {
    /// Creates a new scoring system with an empty tally.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current score.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Consumes world events, awarding points and resetting on a new game.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::AsteroidShotDown { .. } => {
                    self.score = self.score.saturating_add(1);
                }
                Event::FieldReset => {
                    self.score = 0;
                }
                _ => {}
            }
        }
    }
}
