use meteor_defence_core::{Command, Direction, MAX_ASTEROIDS, MAX_PROJECTILES};
use meteor_defence_world::{self as world, query, World};

/// Minimal standalone generator so the storm is reproducible without
/// depending on the world's internal random source.
struct CommandStorm {
    state: u64,
}

impl CommandStorm {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next(&mut self) -> Command {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        match (self.state >> 33) % 6 {
            0 => Command::MoveBase {
                direction: Direction::Left,
            },
            1 => Command::MoveBase {
                direction: Direction::Right,
            },
            2 => Command::Fire,
            3 => Command::AdvanceProjectiles,
            _ => Command::AdvanceAsteroids,
        }
    }
}

fn assert_no_shared_cells(world: &World) {
    let asteroids = query::asteroid_view(world).into_vec();
    let mut deduped = asteroids.clone();
    deduped.dedup();
    assert_eq!(asteroids, deduped, "two asteroids share a cell");

    let mut projectiles = query::projectile_view(world).into_vec();
    projectiles.sort_unstable();
    let mut deduped = projectiles.clone();
    deduped.dedup();
    assert_eq!(projectiles, deduped, "two projectiles share a cell");
}

#[test]
fn randomized_sessions_never_share_cells_or_exceed_capacity() {
    for seed in [3, 7, 1_000_003, 0xdead_beef] {
        let mut world = World::with_seed(seed);
        let mut storm = CommandStorm::new(seed ^ 0x5555_5555);
        let mut events = Vec::new();

        for _ in 0..400 {
            world::apply(&mut world, storm.next(), &mut events);
            events.clear();

            assert_no_shared_cells(&world);
            assert!(query::asteroid_view(&world).len() <= MAX_ASTEROIDS);
            assert!(query::projectile_view(&world).len() <= MAX_PROJECTILES);
            for cell in query::asteroid_view(&world).iter() {
                assert!(cell.is_valid());
            }
            for cell in query::projectile_view(&world).iter() {
                assert!(cell.is_valid());
            }
        }
    }
}

#[test]
fn asteroid_population_is_conserved_while_the_game_runs() {
    let mut world = World::with_seed(11);
    let mut events = Vec::new();

    // Ticks alone never change the population: every destruction inside a
    // tick respawns a replacement and bottom-row asteroids wrap.
    for _ in 0..200 {
        world::apply(&mut world, Command::AdvanceAsteroids, &mut events);
        events.clear();
        assert_eq!(query::asteroid_view(&world).len(), MAX_ASTEROIDS);
    }
}
