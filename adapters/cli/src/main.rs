#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Meteor Defence experience.

mod replay_transfer;
mod session;

use anyhow::Result;
use clap::Parser;
use meteor_defence_core::WELCOME_BANNER;
use meteor_defence_rendering::{Presentation, RenderingBackend};
use meteor_defence_rendering_macroquad::MacroquadBackend;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Arcade-style asteroid defence on a simulated LED panel.
#[derive(Debug, Parser)]
#[command(name = "meteor-defence", version, about)]
struct Args {
    /// Seed for the session's deterministic random source.
    #[arg(long)]
    seed: Option<u64>,

    /// Print finished games as shareable replay strings.
    #[arg(long)]
    record: bool,

    /// Re-run a recorded replay string headlessly and print the outcome.
    #[arg(long, value_name = "STRING")]
    replay: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(encoded) = args.replay.as_deref() {
        return run_replay(encoded);
    }

    println!("{WELCOME_BANNER}");
    run_windowed(&args)
}

fn run_windowed(args: &Args) -> Result<()> {
    let seed_rng = match args.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::seed_from_u64(rand::thread_rng().gen()),
    };

    let mut session = session::GameSession::new(seed_rng, args.record);
    MacroquadBackend::new().run(Presentation::default(), move |dt, input, frame| {
        session.advance(dt, input, frame)
    })
}

fn run_replay(encoded: &str) -> Result<()> {
    let tape = replay_transfer::ReplayTape::decode(encoded)?;
    let outcome = session::replay_outcome(&tape);

    println!(
        "replayed {} commands from seed {}",
        tape.entries.len(),
        tape.seed
    );
    println!("score: {}", outcome.score);
    println!("lives: {}", outcome.lives);
    if outcome.game_over {
        println!("result: game over");
    } else {
        println!("result: still alive");
    }
    Ok(())
}
