//! Replay tapes encoded as single-line strings suitable for clipboard
//! transfer: a `meteor:v1:<seed>` header followed by a base64 JSON payload
//! of the recorded command entries.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use meteor_defence_core::{Command, Direction};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const REPLAY_DOMAIN: &str = "meteor";
const REPLAY_VERSION: &str = "v1";

/// Identifier prefix emitted before the seed and the encoded payload.
pub(crate) const REPLAY_HEADER: &str = "meteor:v1";
/// Delimiter used to separate the prefix, seed and payload.
const FIELD_DELIMITER: char = ':';

/// Serialisable rendition of the commands a session can record.
///
/// `StartGame` never appears on a tape; the seed lives in the header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum TapeCommand {
    /// Base moved one column left.
    MoveLeft,
    /// Base moved one column right.
    MoveRight,
    /// Projectile fired from the base.
    Fire,
    /// Asteroid tick.
    AdvanceAsteroids,
    /// Projectile tick.
    AdvanceProjectiles,
    /// Pause state changed.
    SetPaused {
        /// Requested paused state.
        paused: bool,
    },
}

impl TapeCommand {
    pub(crate) fn from_command(command: Command) -> Option<Self> {
        match command {
            Command::StartGame { .. } => None,
            Command::MoveBase {
                direction: Direction::Left,
            } => Some(Self::MoveLeft),
            Command::MoveBase {
                direction: Direction::Right,
            } => Some(Self::MoveRight),
            Command::Fire => Some(Self::Fire),
            Command::AdvanceAsteroids => Some(Self::AdvanceAsteroids),
            Command::AdvanceProjectiles => Some(Self::AdvanceProjectiles),
            Command::SetPaused { paused } => Some(Self::SetPaused { paused }),
        }
    }

    pub(crate) fn into_command(self) -> Command {
        match self {
            Self::MoveLeft => Command::MoveBase {
                direction: Direction::Left,
            },
            Self::MoveRight => Command::MoveBase {
                direction: Direction::Right,
            },
            Self::Fire => Command::Fire,
            Self::AdvanceAsteroids => Command::AdvanceAsteroids,
            Self::AdvanceProjectiles => Command::AdvanceProjectiles,
            Self::SetPaused { paused } => Command::SetPaused { paused },
        }
    }
}

/// One recorded command and the session clock at which it was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct TapeEntry {
    /// Session clock in milliseconds when the command was applied.
    pub at_ms: u64,
    /// The command itself.
    pub command: TapeCommand,
}

/// A complete recorded game: the world seed plus every command applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ReplayTape {
    /// Seed the recorded game started from.
    pub seed: u64,
    /// Commands in application order.
    pub entries: Vec<TapeEntry>,
}

impl ReplayTape {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            seed,
            entries: Vec::new(),
        }
    }

    /// Records a command; untapeable commands are dropped.
    pub(crate) fn push(&mut self, at_ms: u64, command: Command) {
        if let Some(command) = TapeCommand::from_command(command) {
            self.entries.push(TapeEntry { at_ms, command });
        }
    }

    /// Encodes the tape into a single-line string suitable for clipboard
    /// transfer.
    #[must_use]
    pub(crate) fn encode(&self) -> String {
        let json =
            serde_json::to_vec(&self.entries).expect("replay tape serialization never fails");
        let encoded = STANDARD_NO_PAD.encode(json);
        format!("{REPLAY_HEADER}:{}:{encoded}", self.seed)
    }

    /// Decodes a tape from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, ReplayTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ReplayTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(ReplayTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(ReplayTransferError::MissingVersion)?;
        let seed = parts.next().ok_or(ReplayTransferError::MissingSeed)?;
        let payload = parts.next().ok_or(ReplayTransferError::MissingPayload)?;

        if domain != REPLAY_DOMAIN {
            return Err(ReplayTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != REPLAY_VERSION {
            return Err(ReplayTransferError::UnsupportedVersion(version.to_owned()));
        }

        let seed = seed
            .trim()
            .parse::<u64>()
            .map_err(|_| ReplayTransferError::InvalidSeed(seed.to_owned()))?;
        let bytes = STANDARD_NO_PAD.decode(payload.as_bytes())?;
        let entries: Vec<TapeEntry> = serde_json::from_slice(&bytes)?;

        Ok(Self { seed, entries })
    }
}

/// Errors that can occur while decoding replay transfer strings.
#[derive(Debug, Error)]
pub(crate) enum ReplayTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("replay payload was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the encoded tape.
    #[error("replay string is missing the prefix")]
    MissingPrefix,
    /// The encoded tape did not contain a version segment.
    #[error("replay string is missing the version")]
    MissingVersion,
    /// The encoded tape did not include the seed segment.
    #[error("replay string is missing the seed")]
    MissingSeed,
    /// The encoded tape did not include the payload segment.
    #[error("replay string is missing the payload")]
    MissingPayload,
    /// The encoded tape used an unexpected prefix segment.
    #[error("replay prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded tape used an unsupported version identifier.
    #[error("replay version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The seed could not be parsed from the encoded tape.
    #[error("could not parse replay seed '{0}'")]
    InvalidSeed(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode replay payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// The decoded payload could not be deserialised.
    #[error("could not parse replay payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}
