//! Session wiring: one world, the pure systems around it, and the frame
//! update driven by the rendering backend.

use std::time::Duration;

use meteor_defence_core::{Command, Direction, Event};
use meteor_defence_rendering::{populate_frame, Explosions, FrameInput, FrameStatus, LedFrame};
use meteor_defence_system_audio::Audio;
use meteor_defence_system_cadence::{Cadence, Config as CadenceConfig};
use meteor_defence_system_scoring::Scoring;
use meteor_defence_world::{self as world, query, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::replay_transfer::ReplayTape;

/// A live windowed game: the authoritative world plus every system the
/// presentation needs, advanced once per rendered frame.
pub(crate) struct GameSession {
    world: World,
    cadence: Cadence,
    scoring: Scoring,
    audio: Audio,
    explosions: Explosions,
    seed_rng: ChaCha8Rng,
    clock_ms: u64,
    record: bool,
    tape: ReplayTape,
    events: Vec<Event>,
    due_commands: Vec<Command>,
}

impl GameSession {
    /// Creates a session and starts its first game.
    pub(crate) fn new(seed_rng: ChaCha8Rng, record: bool) -> Self {
        let mut session = Self {
            world: World::new(),
            cadence: Cadence::new(CadenceConfig::default(), 0),
            scoring: Scoring::new(),
            audio: Audio::new(),
            explosions: Explosions::new(),
            seed_rng,
            clock_ms: 0,
            record,
            tape: ReplayTape::new(0),
            events: Vec::new(),
            due_commands: Vec::new(),
        };
        session.start_new_game();

        // The backend has not ticked yet, so pump the boot events through
        // the systems here; later events flow through `advance`.
        session.scoring.handle(&session.events);
        session.audio.handle(&session.events, 0);
        session.cadence.handle(&session.events, 0);
        session.events.clear();
        session
    }

    fn start_new_game(&mut self) {
        let seed: u64 = self.seed_rng.gen();
        self.tape = ReplayTape::new(seed);
        self.apply(Command::StartGame { seed });
    }

    fn apply(&mut self, command: Command) {
        if self.record {
            self.tape.push(self.clock_ms, command);
        }
        world::apply(&mut self.world, command, &mut self.events);
    }

    fn print_tape(&self) {
        if self.record {
            println!("replay: {}", self.tape.encode());
        }
    }

    /// Advances the session by one rendered frame.
    ///
    /// Returns `None` when the player quits, which ends the backend loop.
    pub(crate) fn advance(
        &mut self,
        dt: Duration,
        input: FrameInput,
        frame: &mut LedFrame,
    ) -> Option<FrameStatus> {
        if input.quit {
            self.print_tape();
            return None;
        }

        self.clock_ms = self.clock_ms.saturating_add(dt.as_millis() as u64);
        let now = self.clock_ms;
        self.events.clear();

        if query::is_game_over(&self.world) {
            // Ticks stop at game over; only a restart is accepted.
            if input.restart {
                self.print_tape();
                self.start_new_game();
            }
        } else {
            if input.pause_toggle {
                let paused = query::is_paused(&self.world);
                self.apply(Command::SetPaused { paused: !paused });
            }
            if input.move_left {
                self.apply(Command::MoveBase {
                    direction: Direction::Left,
                });
            }
            if input.move_right {
                self.apply(Command::MoveBase {
                    direction: Direction::Right,
                });
            }
            if input.fire {
                self.apply(Command::Fire);
            }

            self.due_commands.clear();
            self.cadence
                .poll(now, self.scoring.score(), &mut self.due_commands);
            for index in 0..self.due_commands.len() {
                let command = self.due_commands[index];
                self.apply(command);
            }
        }

        self.scoring.handle(&self.events);
        self.audio.handle(&self.events, now);
        self.cadence.handle(&self.events, now);
        self.explosions.handle(&self.events, now);
        self.explosions.advance(now);

        populate_frame(
            frame,
            &query::base_footprint(&self.world),
            &query::asteroid_view(&self.world).into_vec(),
            &query::projectile_view(&self.world).into_vec(),
        );
        self.explosions.overlay(frame);

        Some(FrameStatus {
            score: self.scoring.score(),
            lives: query::lives(&self.world),
            paused: query::is_paused(&self.world),
            game_over: query::is_game_over(&self.world),
            tone_hz: self.audio.current_tone(now),
        })
    }
}

/// Final state of a headless replay run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ReplayOutcome {
    /// Score after the last recorded command.
    pub score: u32,
    /// Lives after the last recorded command.
    pub lives: i8,
    /// Whether the recorded game had ended.
    pub game_over: bool,
}

/// Re-runs a recorded tape against a fresh world.
///
/// The world evolves from the tape's seed and command order alone, so two
/// runs of the same tape are byte-identical.
pub(crate) fn replay_outcome(tape: &ReplayTape) -> ReplayOutcome {
    let mut world = World::with_seed(tape.seed);
    let mut scoring = Scoring::new();
    let mut events = Vec::new();

    for entry in &tape.entries {
        world::apply(&mut world, entry.command.into_command(), &mut events);
    }
    scoring.handle(&events);

    ReplayOutcome {
        score: scoring.score(),
        lives: query::lives(&world),
        game_over: query::is_game_over(&world),
    }
}

#[cfg(test)]
mod tests {
    use super::{replay_outcome, GameSession};
    use meteor_defence_rendering::{FrameInput, LedFrame};
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::time::Duration;

    fn fire_input() -> FrameInput {
        FrameInput {
            fire: true,
            ..FrameInput::default()
        }
    }

    #[test]
    fn recorded_sessions_replay_to_the_same_outcome() {
        let mut session = GameSession::new(ChaCha8Rng::seed_from_u64(1234), true);
        let mut frame = LedFrame::new();
        let step = Duration::from_millis(50);

        for tick in 0..200 {
            let input = if tick % 13 == 0 {
                fire_input()
            } else if tick % 7 == 0 {
                FrameInput {
                    move_right: true,
                    ..FrameInput::default()
                }
            } else if tick % 5 == 0 {
                FrameInput {
                    move_left: true,
                    ..FrameInput::default()
                }
            } else {
                FrameInput::default()
            };
            let status = session.advance(step, input, &mut frame);
            assert!(status.is_some());
        }

        let live_score = session.scoring.score();
        let outcome = replay_outcome(&session.tape);

        assert_eq!(outcome.score, live_score);
        assert_eq!(
            outcome.lives,
            meteor_defence_world::query::lives(&session.world)
        );
    }

    #[test]
    fn quit_ends_the_session() {
        let mut session = GameSession::new(ChaCha8Rng::seed_from_u64(9), false);
        let mut frame = LedFrame::new();

        let status = session.advance(
            Duration::from_millis(16),
            FrameInput {
                quit: true,
                ..FrameInput::default()
            },
            &mut frame,
        );
        assert!(status.is_none());
    }

    #[test]
    fn pause_freezes_the_session_clockwork() {
        let mut session = GameSession::new(ChaCha8Rng::seed_from_u64(77), false);
        let mut frame = LedFrame::new();
        let step = Duration::from_millis(50);

        let status = session
            .advance(
                step,
                FrameInput {
                    pause_toggle: true,
                    ..FrameInput::default()
                },
                &mut frame,
            )
            .expect("session continues");
        assert!(status.paused);

        let before = meteor_defence_world::query::asteroid_view(&session.world).into_vec();
        for _ in 0..100 {
            let _ = session.advance(step, FrameInput::default(), &mut frame);
        }
        let after = meteor_defence_world::query::asteroid_view(&session.world).into_vec();
        assert_eq!(before, after, "paused field must not evolve");
    }
}
