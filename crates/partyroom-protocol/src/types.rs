//! Shared wire types.

use std::fmt;
use std::time::Duration;

use partyroom_transport::ConnectionId;
use serde::de::{Deserializer, IgnoredAny};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Short human-typeable room code, e.g. `K7QZ2M`.
///
/// Codes are compared case-insensitively: [`RoomCode::new`] upper-cases
/// whatever the client typed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for RoomCode {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        String::deserialize(d).map(RoomCode::new)
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Room options
// ---------------------------------------------------------------------------

/// Which game a room plays. Fixed at creation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum GameType {
    #[default]
    Dice,
    Roulette,
    HorseRace,
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameType::Dice => write!(f, "dice"),
            GameType::Roulette => write!(f, "roulette"),
            GameType::HorseRace => write!(f, "horse-race"),
        }
    }
}

/// How long a room lives before the reaper shuts it down.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum ExpiryHours {
    #[default]
    One,
    Three,
    Six,
}

impl ExpiryHours {
    pub fn hours(self) -> u8 {
        match self {
            ExpiryHours::One => 1,
            ExpiryHours::Three => 3,
            ExpiryHours::Six => 6,
        }
    }

    pub fn duration(self) -> Duration {
        Duration::from_secs(u64::from(self.hours()) * 3600)
    }
}

impl TryFrom<u8> for ExpiryHours {
    type Error = String;

    fn try_from(hours: u8) -> Result<Self, Self::Error> {
        match hours {
            1 => Ok(ExpiryHours::One),
            3 => Ok(ExpiryHours::Three),
            6 => Ok(ExpiryHours::Six),
            other => Err(format!("unsupported expiry {other}h")),
        }
    }
}

impl From<ExpiryHours> for u8 {
    fn from(e: ExpiryHours) -> u8 {
        e.hours()
    }
}

/// Phase of a room as clients see it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum RoomPhase {
    #[default]
    Waiting,
    Selecting,
    Countdown,
    Active,
    Result,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Valid(T),
    Invalid(IgnoredAny),
}

/// Deserializes `T`, falling back to `T::default()` on any unrecognised
/// value instead of rejecting the whole event.
pub(crate) fn or_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(match Lenient::<T>::deserialize(d)? {
        Lenient::Valid(value) => value,
        Lenient::Invalid(_) => T::default(),
    })
}

// ---------------------------------------------------------------------------
// Errors on the wire
// ---------------------------------------------------------------------------

/// Category of a rejected request, reported to the sender only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// Malformed or out-of-range input.
    Validation,
    /// A host-only action from a non-host.
    Permission,
    /// Duplicate host, duplicate roll, full room, wrong phase.
    Conflict,
    /// Throttled; the event was dropped.
    RateLimit,
    /// Room or user absent.
    NotFound,
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who an outbound event is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every connected member of the room.
    All,
    /// One connection.
    Conn(ConnectionId),
    /// Every connected member except one.
    AllExcept(ConnectionId),
}

impl Recipient {
    /// Whether `conn` should receive an event addressed to `self`.
    pub fn includes(self, conn: ConnectionId) -> bool {
        match self {
            Recipient::All => true,
            Recipient::Conn(target) => target == conn,
            Recipient::AllExcept(skip) => skip != conn,
        }
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Frame wrapper for every event in either direction.
///
/// `seq` and `timestamp` are optional when a client sends; the server
/// always fills them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<E> {
    /// Per-connection, per-direction counter.
    #[serde(default)]
    pub seq: u64,
    /// Milliseconds since the sender started.
    #[serde(default)]
    pub timestamp: u64,
    pub event: E,
}
