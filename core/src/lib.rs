#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Meteor Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use serde::{Deserialize, Serialize};

/// Number of columns on the game field.
pub const FIELD_WIDTH: u8 = 8;

/// Number of rows on the game field. Row zero is the bottom row.
pub const FIELD_HEIGHT: u8 = 16;

/// Topmost row, where regenerated asteroids enter the field.
pub const TOP_ROW: u8 = FIELD_HEIGHT - 1;

/// Maximum number of asteroids alive at once. Kept strictly below
/// [`FIELD_WIDTH`] so a free top-row column always exists for respawns.
pub const MAX_ASTEROIDS: usize = 7;

/// Maximum number of projectiles in flight at once.
pub const MAX_PROJECTILES: usize = 4;

/// Column the base centre occupies when a game starts.
pub const BASE_START_COLUMN: u8 = 3;

/// Row in which fired projectiles appear, directly above the base.
pub const PROJECTILE_SPAWN_ROW: u8 = 2;

/// Number of lives a fresh game grants the player.
pub const STARTING_LIVES: i8 = 4;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Meteor Defence.";

/// A field cell packed into a single byte.
///
/// The high nibble holds the column (x, 0..=7) and the low nibble the row
/// (y, 0..=15). The codec performs no range checks; callers guarantee the
/// domain. Any byte whose decoded column exceeds 7 is invalid, and the
/// all-ones byte is the reserved [`PackedCell::INVALID`] marker, which must
/// never be stored in a live entity list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackedCell(u8);

impl PackedCell {
    /// Reserved sentinel decoding to an out-of-range column.
    pub const INVALID: Self = Self(0xFF);

    /// Packs a column and row into a single byte.
    ///
    /// Assumes `x <= 7` and `y <= 15`; out-of-domain values are truncated
    /// into the nibbles without any error being raised.
    #[must_use]
    pub const fn pack(x: u8, y: u8) -> Self {
        Self((x << 4) | (y & 0x0F))
    }

    /// Column encoded in the high nibble.
    #[must_use]
    pub const fn x(&self) -> u8 {
        self.0 >> 4
    }

    /// Row encoded in the low nibble.
    #[must_use]
    pub const fn y(&self) -> u8 {
        self.0 & 0x0F
    }

    /// Raw byte representation.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Returns `true` when the decoded column lies on the field.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.x() < FIELD_WIDTH
    }
}

/// Horizontal movement directions available to the base station.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

/// Palette entries understood by the display adapters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelColour {
    /// Unlit pixel.
    Black,
    /// Asteroid pixel.
    Green,
    /// Projectile pixel.
    Red,
    /// Base-station pixel.
    Yellow,
    /// Bright explosion-animation pixel.
    Orange,
    /// Dim explosion-animation pixel.
    LightOrange,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Resets the world to a fresh game seeded with the provided value.
    StartGame {
        /// Seed for the deterministic random source.
        seed: u64,
    },
    /// Requests that the base station move one column sideways.
    MoveBase {
        /// Direction of the attempted move.
        direction: Direction,
    },
    /// Requests that a projectile be fired from the base station.
    Fire,
    /// Advances every asteroid one step of game time.
    AdvanceAsteroids,
    /// Advances every projectile one step of game time.
    AdvanceProjectiles,
    /// Enables or disables the paused state.
    SetPaused {
        /// Whether the world should be paused after processing.
        paused: bool,
    },
}

/// Reasons a fire request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FireRejection {
    /// The projectile list already holds the maximum number in flight.
    RackFull,
    /// A projectile already occupies the spawn cell above the base.
    SpawnCellOccupied,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that the field was reset for a new game.
    FieldReset,
    /// Confirms that an asteroid appeared at the provided cell.
    AsteroidSpawned {
        /// Cell the asteroid occupies after spawning.
        cell: PackedCell,
    },
    /// Confirms that an asteroid descended one row.
    AsteroidMoved {
        /// Cell the asteroid occupied before the step.
        from: PackedCell,
        /// Cell the asteroid occupies after the step.
        to: PackedCell,
    },
    /// Confirms that a bottom-row asteroid re-entered at the top row.
    AsteroidWrapped {
        /// Bottom-row cell the asteroid left.
        from: PackedCell,
        /// Top-row cell the asteroid re-entered at.
        to: PackedCell,
    },
    /// Reports that a projectile destroyed an asteroid.
    AsteroidShotDown {
        /// Cell where the collision resolved.
        cell: PackedCell,
    },
    /// Confirms that a projectile was created above the base.
    ProjectileFired {
        /// Spawn cell of the new projectile.
        cell: PackedCell,
    },
    /// Reports that a fire request was rejected.
    FireRejected {
        /// Specific reason the request failed.
        reason: FireRejection,
    },
    /// Confirms that a projectile climbed one row.
    ProjectileMoved {
        /// Cell the projectile occupied before the step.
        from: PackedCell,
        /// Cell the projectile occupies after the step.
        to: PackedCell,
    },
    /// Reports that a projectile passed the top row and left the field.
    ProjectileLeftField {
        /// Last cell the projectile occupied.
        cell: PackedCell,
    },
    /// Confirms that the base station moved one column.
    BaseMoved {
        /// Centre column before the move.
        from: u8,
        /// Centre column after the move.
        to: u8,
    },
    /// Reports that a base move was rejected at the field boundary.
    BaseMoveRejected {
        /// Direction of the rejected move.
        direction: Direction,
    },
    /// Reports that an asteroid struck the base station.
    BaseStruck {
        /// Cell of the asteroid that hit the base.
        asteroid: PackedCell,
        /// Lives remaining after the strike.
        lives: i8,
    },
    /// Announces that the paused state changed.
    PauseChanged {
        /// Whether the world is paused after processing.
        paused: bool,
    },
}
