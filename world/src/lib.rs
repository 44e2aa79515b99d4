#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative game-state management for Meteor Defence.
//!
//! The world owns the base station, the asteroid and projectile lists, the
//! lives counter and the deterministic random source. All mutation flows
//! through [`apply`]; observers consume the emitted [`Event`] stream and the
//! read-only [`query`] module. The world never blocks: pausing is a state
//! flag that short-circuits command processing rather than a busy wait.

mod field;

use field::{AsteroidBelt, FieldRng, ProjectileRack};
use meteor_defence_core::{
    Command, Direction, Event, FireRejection, PackedCell, BASE_START_COLUMN, FIELD_HEIGHT,
    FIELD_WIDTH, MAX_ASTEROIDS, MAX_PROJECTILES, PROJECTILE_SPAWN_ROW, STARTING_LIVES, TOP_ROW,
};

const DEFAULT_FIELD_SEED: u64 = 0x6d65_7465_6f72_5f31;

/// Represents the authoritative Meteor Defence world state.
#[derive(Debug)]
pub struct World {
    base_column: u8,
    asteroids: AsteroidBelt,
    projectiles: ProjectileRack,
    lives: i8,
    rng: FieldRng,
    paused: bool,
}

impl World {
    /// Creates a world holding a freshly started game with the default seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_FIELD_SEED)
    }

    /// Creates a world holding a freshly started game with the given seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        let mut world = Self {
            base_column: BASE_START_COLUMN,
            asteroids: AsteroidBelt::new(),
            projectiles: ProjectileRack::new(),
            lives: STARTING_LIVES,
            rng: FieldRng::new(seed),
            paused: false,
        };
        world.reset(seed);
        world
    }

    fn reset(&mut self, seed: u64) {
        self.base_column = BASE_START_COLUMN;
        self.lives = STARTING_LIVES;
        self.paused = false;
        self.rng = FieldRng::new(seed);
        self.projectiles.clear();
        self.asteroids.clear();

        // Populate the starting field: random pairwise-distinct cells with
        // the lowest three rows kept clear. Collisions retry.
        while self.asteroids.len() < MAX_ASTEROIDS {
            let x = self.rng.column();
            let y = self.rng.spawn_row();
            if self.asteroids.find_at(x, y).is_none() {
                self.asteroids.push(PackedCell::pack(x, y));
            }
        }
    }

    fn start_game(&mut self, seed: u64, out_events: &mut Vec<Event>) {
        self.reset(seed);
        out_events.push(Event::FieldReset);
        for cell in self.asteroids.cells() {
            out_events.push(Event::AsteroidSpawned { cell: *cell });
        }
    }

    fn set_paused(&mut self, paused: bool, out_events: &mut Vec<Event>) {
        if self.paused != paused {
            self.paused = paused;
            out_events.push(Event::PauseChanged { paused });
        }
    }

    fn move_base(&mut self, direction: Direction, out_events: &mut Vec<Event>) -> bool {
        let from = self.base_column;
        let to = match direction {
            Direction::Left if from > 0 => from - 1,
            Direction::Right if from < FIELD_WIDTH - 1 => from + 1,
            _ => {
                out_events.push(Event::BaseMoveRejected { direction });
                return false;
            }
        };

        // The two grazing cells ahead of the motion are checked
        // independently before the base shifts; each occupied one costs a
        // life and consumes the asteroid without a respawn.
        let grazing = match direction {
            Direction::Left => [(from.checked_sub(2), 0), (from.checked_sub(1), 1)],
            Direction::Right => [(Some(from + 2), 0), (Some(from + 1), 1)],
        };
        for (column, row) in grazing {
            let Some(column) = column else { continue };
            if column >= FIELD_WIDTH {
                continue;
            }
            if let Some(index) = self.asteroids.find_at(column, row) {
                if let Some(asteroid) = self.asteroids.remove_at(index) {
                    self.lives -= 1;
                    out_events.push(Event::BaseStruck {
                        asteroid,
                        lives: self.lives,
                    });
                }
            }
        }

        self.base_column = to;
        out_events.push(Event::BaseMoved { from, to });
        true
    }

    fn fire(&mut self, out_events: &mut Vec<Event>) -> bool {
        if self.projectiles.len() >= MAX_PROJECTILES {
            out_events.push(Event::FireRejected {
                reason: FireRejection::RackFull,
            });
            return false;
        }
        if self
            .projectiles
            .find_at(self.base_column, PROJECTILE_SPAWN_ROW)
            .is_some()
        {
            out_events.push(Event::FireRejected {
                reason: FireRejection::SpawnCellOccupied,
            });
            return false;
        }

        let spawn = PackedCell::pack(self.base_column, PROJECTILE_SPAWN_ROW);
        if let Some(index) = self
            .asteroids
            .find_at(self.base_column, PROJECTILE_SPAWN_ROW)
        {
            // Firing straight into an asteroid resolves immediately; no
            // projectile enters the rack.
            let _ = self.asteroids.remove_at(index);
            out_events.push(Event::AsteroidShotDown { cell: spawn });
            self.regen(out_events);
        } else {
            self.projectiles.push(spawn);
            out_events.push(Event::ProjectileFired { cell: spawn });
        }
        true
    }

    fn advance_asteroids(&mut self, out_events: &mut Vec<Event>) {
        // The tick scans position space column-then-row and re-derives
        // membership at every cell, so an asteroid respawned into a cell
        // later in scan order is visited again within the same tick.
        for x in 0..FIELD_WIDTH {
            for y in 0..FIELD_HEIGHT {
                let Some(index) = self.asteroids.find_at(x, y) else {
                    continue;
                };
                let Some(cell) = self.asteroids.remove_at(index) else {
                    continue;
                };

                let below = if y > 0 {
                    self.projectiles.find_at(x, y - 1)
                } else {
                    None
                };

                if let Some(projectile) = self.projectiles.find_at(x, y) {
                    let _ = self.projectiles.remove_at(projectile);
                    out_events.push(Event::AsteroidShotDown { cell });
                    self.regen(out_events);
                } else if let Some(projectile) = below {
                    let _ = self.projectiles.remove_at(projectile);
                    out_events.push(Event::AsteroidShotDown {
                        cell: PackedCell::pack(x, y - 1),
                    });
                    self.regen(out_events);
                } else if self.base_blocks(x, y) {
                    self.lives -= 1;
                    out_events.push(Event::BaseStruck {
                        asteroid: cell,
                        lives: self.lives,
                    });
                    self.regen(out_events);
                } else if y == 0 {
                    // Bottom-row asteroids wrap back in at the top instead
                    // of leaving the field.
                    let to = self.free_top_row_cell();
                    self.asteroids.push(to);
                    out_events.push(Event::AsteroidWrapped { from: cell, to });
                } else {
                    let to = PackedCell::pack(x, y - 1);
                    self.asteroids.push(to);
                    out_events.push(Event::AsteroidMoved { from: cell, to });
                }
            }
        }
    }

    fn advance_projectiles(&mut self, out_events: &mut Vec<Event>) {
        let mut index = 0;
        while index < self.projectiles.len() {
            let Some(cell) = self.projectiles.get(index) else {
                break;
            };
            let (x, y) = (cell.x(), cell.y());
            let next_row = y + 1;

            if next_row == FIELD_HEIGHT {
                let _ = self.projectiles.remove_at(index);
                out_events.push(Event::ProjectileLeftField { cell });
                // The shifted-in projectile takes this index; do not advance.
            } else if let Some(asteroid) = self.asteroids.find_at(x, next_row) {
                let _ = self.projectiles.remove_at(index);
                let _ = self.asteroids.remove_at(asteroid);
                out_events.push(Event::AsteroidShotDown {
                    cell: PackedCell::pack(x, next_row),
                });
                self.regen(out_events);
            } else {
                let to = PackedCell::pack(x, next_row);
                self.projectiles.set(index, to);
                out_events.push(Event::ProjectileMoved { from: cell, to });
                index += 1;
            }
        }
    }

    /// Whether an asteroid at the given cell is about to enter the base
    /// footprint: directly above the centre, or diagonally adjacent one row
    /// up from the bottom corners.
    fn base_blocks(&self, x: u8, y: u8) -> bool {
        (y == 2 && x == self.base_column)
            || (y == 1 && (x + 1 == self.base_column || x == self.base_column + 1))
    }

    fn free_top_row_cell(&mut self) -> PackedCell {
        // Terminates: the belt capacity stays below the field width, so a
        // free top-row column always exists.
        loop {
            let column = self.rng.column();
            if self.asteroids.find_at(column, TOP_ROW).is_none() {
                return PackedCell::pack(column, TOP_ROW);
            }
        }
    }

    fn regen(&mut self, out_events: &mut Vec<Event>) {
        let cell = self.free_top_row_cell();
        self.asteroids.push(cell);
        out_events.push(Event::AsteroidSpawned { cell });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// While the world is paused every command other than [`Command::SetPaused`]
/// is dropped without effect.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.paused {
        if let Command::SetPaused { paused } = command {
            world.set_paused(paused, out_events);
        }
        return;
    }

    match command {
        Command::StartGame { seed } => world.start_game(seed, out_events),
        Command::MoveBase { direction } => {
            let _ = world.move_base(direction, out_events);
        }
        Command::Fire => {
            let _ = world.fire(out_events);
        }
        Command::AdvanceAsteroids => world.advance_asteroids(out_events),
        Command::AdvanceProjectiles => world.advance_projectiles(out_events),
        Command::SetPaused { paused } => world.set_paused(paused, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use meteor_defence_core::{PackedCell, FIELD_WIDTH};

    /// Centre column of the base station.
    #[must_use]
    pub fn base_column(world: &World) -> u8 {
        world.base_column
    }

    /// Cells occupied by the base station, clipped to the field.
    #[must_use]
    pub fn base_footprint(world: &World) -> Vec<PackedCell> {
        let centre = world.base_column;
        let mut cells = Vec::with_capacity(4);
        let leftmost = centre.saturating_sub(1);
        let rightmost = (centre + 1).min(FIELD_WIDTH - 1);
        for column in leftmost..=rightmost {
            cells.push(PackedCell::pack(column, 0));
        }
        cells.push(PackedCell::pack(centre, 1));
        cells
    }

    /// Lives remaining. May be negative after a double strike.
    #[must_use]
    pub fn lives(world: &World) -> i8 {
        world.lives
    }

    /// True iff the player has run out of lives. Pure function of lives.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.lives < 1
    }

    /// Whether the world currently drops gameplay commands.
    #[must_use]
    pub fn is_paused(world: &World) -> bool {
        world.paused
    }

    /// Captures a read-only view of the live asteroids.
    #[must_use]
    pub fn asteroid_view(world: &World) -> CellView {
        // Sorted copy: internal belt order is unstable and must not leak
        // into observers.
        let mut cells = world.asteroids.cells().to_vec();
        cells.sort_unstable();
        CellView { cells }
    }

    /// Captures a read-only view of the in-flight projectiles in rack order.
    #[must_use]
    pub fn projectile_view(world: &World) -> CellView {
        CellView {
            cells: world.projectiles.cells().to_vec(),
        }
    }

    /// Read-only snapshot of a set of live cells.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct CellView {
        cells: Vec<PackedCell>,
    }

    impl CellView {
        /// Iterator over the captured cells.
        pub fn iter(&self) -> impl Iterator<Item = &PackedCell> {
            self.cells.iter()
        }

        /// Number of captured cells.
        #[must_use]
        pub fn len(&self) -> usize {
            self.cells.len()
        }

        /// True when no cells were captured.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.cells.is_empty()
        }

        /// Whether any captured cell sits at the given coordinates.
        #[must_use]
        pub fn contains(&self, x: u8, y: u8) -> bool {
            let probe = PackedCell::pack(x, y);
            self.cells.iter().any(|cell| *cell == probe)
        }

        /// Consumes the view, yielding the underlying cells.
        #[must_use]
        pub fn into_vec(self) -> Vec<PackedCell> {
            self.cells
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clear_field(world: &mut World) {
        world.asteroids.clear();
        world.projectiles.clear();
    }

    fn place_asteroid(world: &mut World, x: u8, y: u8) {
        world.asteroids.push(PackedCell::pack(x, y));
    }

    fn place_projectile(world: &mut World, x: u8, y: u8) {
        world.projectiles.push(PackedCell::pack(x, y));
    }

    #[test]
    fn start_game_populates_a_fresh_field() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::StartGame { seed: 17 }, &mut events);

        assert_eq!(world.base_column, BASE_START_COLUMN);
        assert_eq!(world.lives, STARTING_LIVES);
        assert_eq!(world.projectiles.len(), 0);
        assert_eq!(world.asteroids.len(), MAX_ASTEROIDS);
        assert_eq!(events[0], Event::FieldReset);
        assert_eq!(events.len(), 1 + MAX_ASTEROIDS);

        let view = query::asteroid_view(&world);
        for cell in view.iter() {
            assert!(cell.y() >= 3, "lowest three rows must start clear");
        }
        let mut deduped = view.clone().into_vec();
        deduped.dedup();
        assert_eq!(deduped.len(), MAX_ASTEROIDS, "asteroids share no cell");
    }

    #[test]
    fn equal_seeds_produce_equal_fields() {
        let first = World::with_seed(99);
        let second = World::with_seed(99);
        assert_eq!(
            query::asteroid_view(&first).into_vec(),
            query::asteroid_view(&second).into_vec()
        );
    }

    #[test]
    fn move_at_left_boundary_is_rejected_without_effect() {
        let mut world = World::with_seed(1);
        clear_field(&mut world);
        world.base_column = 0;
        place_asteroid(&mut world, 1, 1);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::MoveBase {
                direction: Direction::Left,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::BaseMoveRejected {
                direction: Direction::Left
            }]
        );
        assert_eq!(world.base_column, 0);
        assert_eq!(world.lives, STARTING_LIVES);
        assert_eq!(world.asteroids.len(), 1, "no collision check at boundary");
    }

    #[test]
    fn move_at_right_boundary_is_rejected_without_effect() {
        let mut world = World::with_seed(1);
        clear_field(&mut world);
        world.base_column = 7;

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::MoveBase {
                direction: Direction::Right,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::BaseMoveRejected {
                direction: Direction::Right
            }]
        );
        assert_eq!(world.base_column, 7);
    }

    #[test]
    fn grazing_asteroids_strike_before_the_base_moves() {
        let mut world = World::with_seed(1);
        clear_field(&mut world);
        world.base_column = 4;
        place_asteroid(&mut world, 2, 0);
        place_asteroid(&mut world, 3, 1);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::MoveBase {
                direction: Direction::Left,
            },
            &mut events,
        );

        // Both grazing cells strike independently in the same move; the
        // asteroids are consumed with no respawn and no score.
        assert_eq!(world.lives, STARTING_LIVES - 2);
        assert_eq!(world.asteroids.len(), 0);
        assert_eq!(world.base_column, 3);
        assert_eq!(
            events.last(),
            Some(&Event::BaseMoved { from: 4, to: 3 })
        );
        let strikes = events
            .iter()
            .filter(|event| matches!(event, Event::BaseStruck { .. }))
            .count();
        assert_eq!(strikes, 2);
    }

    #[test]
    fn fire_places_a_projectile_above_the_base() {
        let mut world = World::with_seed(1);
        clear_field(&mut world);
        place_asteroid(&mut world, 3, 15);

        let mut events = Vec::new();
        apply(&mut world, Command::Fire, &mut events);

        // A top-row asteroid in the same column is no obstacle: the spawn
        // cell is row 2.
        assert_eq!(
            events,
            vec![Event::ProjectileFired {
                cell: PackedCell::pack(3, 2)
            }]
        );
        assert_eq!(world.projectiles.len(), 1);
        assert_eq!(world.asteroids.len(), 1);
    }

    #[test]
    fn second_fire_without_a_tick_is_rejected() {
        let mut world = World::with_seed(1);
        clear_field(&mut world);

        let mut events = Vec::new();
        apply(&mut world, Command::Fire, &mut events);
        apply(&mut world, Command::Fire, &mut events);

        assert_eq!(world.projectiles.len(), 1);
        assert_eq!(
            events.last(),
            Some(&Event::FireRejected {
                reason: FireRejection::SpawnCellOccupied
            })
        );
    }

    #[test]
    fn fire_into_an_asteroid_resolves_without_a_projectile() {
        let mut world = World::with_seed(1);
        clear_field(&mut world);
        place_asteroid(&mut world, BASE_START_COLUMN, PROJECTILE_SPAWN_ROW);

        let mut events = Vec::new();
        apply(&mut world, Command::Fire, &mut events);

        assert_eq!(world.projectiles.len(), 0);
        assert_eq!(world.asteroids.len(), 1, "respawn keeps the count");
        assert_eq!(
            events[0],
            Event::AsteroidShotDown {
                cell: PackedCell::pack(BASE_START_COLUMN, PROJECTILE_SPAWN_ROW)
            }
        );
        assert!(matches!(events[1], Event::AsteroidSpawned { .. }));
    }

    #[test]
    fn full_rack_rejects_fire() {
        let mut world = World::with_seed(1);
        clear_field(&mut world);
        for column in 0..MAX_PROJECTILES as u8 {
            place_projectile(&mut world, column, 9);
        }

        let mut events = Vec::new();
        apply(&mut world, Command::Fire, &mut events);

        assert_eq!(
            events,
            vec![Event::FireRejected {
                reason: FireRejection::RackFull
            }]
        );
        assert_eq!(world.projectiles.len(), MAX_PROJECTILES);
    }

    #[test]
    fn descending_asteroid_strikes_the_base_from_above() {
        let mut world = World::with_seed(1);
        clear_field(&mut world);
        place_asteroid(&mut world, BASE_START_COLUMN, 3);

        let mut events = Vec::new();
        apply(&mut world, Command::AdvanceAsteroids, &mut events);
        assert!(query::asteroid_view(&world).contains(BASE_START_COLUMN, 2));

        events.clear();
        apply(&mut world, Command::AdvanceAsteroids, &mut events);

        assert_eq!(world.lives, STARTING_LIVES - 1);
        assert_eq!(world.asteroids.len(), 1, "strike respawns a replacement");
        assert!(matches!(events[0], Event::BaseStruck { .. }));
    }

    #[test]
    fn diagonal_asteroid_strikes_the_base_corner() {
        let mut world = World::with_seed(1);
        clear_field(&mut world);
        world.base_column = 4;
        place_asteroid(&mut world, 3, 1);

        let mut events = Vec::new();
        apply(&mut world, Command::AdvanceAsteroids, &mut events);

        assert_eq!(world.lives, STARTING_LIVES - 1);
        assert!(matches!(events[0], Event::BaseStruck { .. }));
    }

    #[test]
    fn projectile_consumes_the_asteroid_entering_its_cell() {
        let mut world = World::with_seed(1);
        clear_field(&mut world);
        place_asteroid(&mut world, 5, 9);
        place_projectile(&mut world, 5, 8);

        let mut events = Vec::new();
        apply(&mut world, Command::AdvanceAsteroids, &mut events);

        assert_eq!(world.projectiles.len(), 0);
        assert_eq!(world.asteroids.len(), 1, "hit respawns a replacement");
        assert_eq!(
            events[0],
            Event::AsteroidShotDown {
                cell: PackedCell::pack(5, 8)
            }
        );
    }

    #[test]
    fn bottom_row_asteroid_wraps_to_the_top() {
        let mut world = World::with_seed(1);
        clear_field(&mut world);
        world.base_column = 7;
        place_asteroid(&mut world, 0, 0);

        let mut events = Vec::new();
        apply(&mut world, Command::AdvanceAsteroids, &mut events);

        assert_eq!(world.asteroids.len(), 1);
        let wrapped = events
            .iter()
            .find_map(|event| match event {
                Event::AsteroidWrapped { to, .. } => Some(*to),
                _ => None,
            })
            .expect("expected a wrap event");
        assert_eq!(wrapped.y(), TOP_ROW);
    }

    #[test]
    fn projectile_leaves_the_field_past_the_top_row() {
        let mut world = World::with_seed(1);
        clear_field(&mut world);
        place_projectile(&mut world, 4, 14);

        let mut events = Vec::new();
        apply(&mut world, Command::AdvanceProjectiles, &mut events);
        assert!(query::projectile_view(&world).contains(4, 15));

        events.clear();
        apply(&mut world, Command::AdvanceProjectiles, &mut events);

        assert_eq!(world.projectiles.len(), 0);
        assert_eq!(
            events,
            vec![Event::ProjectileLeftField {
                cell: PackedCell::pack(4, 15)
            }]
        );
    }

    #[test]
    fn climbing_projectile_destroys_the_asteroid_above() {
        let mut world = World::with_seed(1);
        clear_field(&mut world);
        place_asteroid(&mut world, 2, 11);
        place_projectile(&mut world, 2, 10);

        let mut events = Vec::new();
        apply(&mut world, Command::AdvanceProjectiles, &mut events);

        assert_eq!(world.projectiles.len(), 0);
        assert_eq!(world.asteroids.len(), 1);
        assert_eq!(
            events[0],
            Event::AsteroidShotDown {
                cell: PackedCell::pack(2, 11)
            }
        );
    }

    #[test]
    fn removal_during_projectile_tick_does_not_skip_the_shifted_entry() {
        let mut world = World::with_seed(1);
        clear_field(&mut world);
        place_projectile(&mut world, 0, 15);
        place_projectile(&mut world, 1, 9);

        let mut events = Vec::new();
        apply(&mut world, Command::AdvanceProjectiles, &mut events);

        // The first projectile leaves the field; the second shifts into its
        // index and must still advance this tick.
        assert_eq!(world.projectiles.len(), 1);
        assert!(query::projectile_view(&world).contains(1, 10));
    }

    #[test]
    fn paused_world_drops_gameplay_commands() {
        let mut world = World::with_seed(1);
        clear_field(&mut world);
        place_asteroid(&mut world, 6, 10);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetPaused { paused: true },
            &mut events,
        );
        assert_eq!(events, vec![Event::PauseChanged { paused: true }]);

        events.clear();
        apply(&mut world, Command::AdvanceAsteroids, &mut events);
        apply(&mut world, Command::Fire, &mut events);
        assert!(events.is_empty());
        assert!(query::asteroid_view(&world).contains(6, 10));

        apply(
            &mut world,
            Command::SetPaused { paused: false },
            &mut events,
        );
        assert_eq!(events, vec![Event::PauseChanged { paused: false }]);
    }

    #[test]
    fn game_over_tracks_lives_alone() {
        let mut world = World::with_seed(1);
        for lives in [4, 3, 2, 1] {
            world.lives = lives;
            assert!(!query::is_game_over(&world));
        }
        for lives in [0, -1] {
            world.lives = lives;
            assert!(query::is_game_over(&world));
        }
    }

    #[test]
    fn base_footprint_clips_at_the_field_edges() {
        let mut world = World::with_seed(1);

        world.base_column = 0;
        let footprint = query::base_footprint(&world);
        assert_eq!(
            footprint,
            vec![
                PackedCell::pack(0, 0),
                PackedCell::pack(1, 0),
                PackedCell::pack(0, 1),
            ]
        );

        world.base_column = 7;
        let footprint = query::base_footprint(&world);
        assert_eq!(
            footprint,
            vec![
                PackedCell::pack(6, 0),
                PackedCell::pack(7, 0),
                PackedCell::pack(7, 1),
            ]
        );
    }
}
