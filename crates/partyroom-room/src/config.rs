//! Room configuration and phase state machine.

use std::time::Duration;

use partyroom_protocol::{GameType, RoomPhase};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Limits and timings shared by every room on a server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Members allowed in one room, connected or waiting to reconnect.
    pub max_members: usize,

    pub max_name_len: usize,
    pub max_title_len: usize,
    pub max_password_len: usize,

    /// Chat messages kept per room.
    pub chat_history: usize,
    pub max_message_len: usize,

    /// How long a dropped member is kept for a same-name rejoin.
    /// Zero removes them as soon as the connection drops.
    pub reconnect_grace: Duration,

    pub countdown: Duration,
    /// Default delay between a race result and the room reopening.
    pub auto_restart: Duration,
    /// Upper bound a host may set the auto-restart delay to.
    pub max_auto_restart: Duration,
    pub roulette_spin: Duration,
    /// Added to the expected playback time before a race is closed
    /// without any client reporting the animation finished.
    pub race_safety_margin: Duration,

    /// Bounds for dice rolls.
    pub dice_default_range: (u32, u32),
    pub dice_max: u32,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_members: 30,
            max_name_len: 20,
            max_title_len: 30,
            max_password_len: 20,
            chat_history: 100,
            max_message_len: 200,
            reconnect_grace: Duration::from_secs(30),
            countdown: Duration::from_secs(3),
            auto_restart: Duration::from_secs(10),
            max_auto_restart: Duration::from_secs(60),
            roulette_spin: Duration::from_secs(5),
            race_safety_margin: Duration::from_secs(5),
            dice_default_range: (1, 100),
            dice_max: 1_000_000,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// Lifecycle of a round inside a room.
///
/// ```text
/// dice / roulette:  Waiting → Active → Waiting
/// horse race:       Waiting → Selecting → Countdown → Active → Result → Waiting
/// ```
///
/// Any horse-race phase may also fall straight back to `Waiting` when the
/// host cancels or resets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomState {
    #[default]
    Waiting,
    Selecting,
    Countdown,
    Active,
    Result,
}

impl RoomState {
    /// A round has started and not yet returned to `Waiting`.
    pub fn is_round_active(self) -> bool {
        !matches!(self, Self::Waiting)
    }

    /// Returns `true` if `game` may move from `self` to `target`.
    pub fn can_transition_to(self, target: Self, game: GameType) -> bool {
        use RoomState::*;
        match (game, self, target) {
            (GameType::HorseRace, Waiting, Selecting)
            | (GameType::HorseRace, Selecting, Countdown)
            | (GameType::HorseRace, Countdown, Active)
            | (GameType::HorseRace, Active, Result) => true,
            (GameType::HorseRace, from, Waiting) => from != Waiting,
            (GameType::Dice | GameType::Roulette, Waiting, Active)
            | (GameType::Dice | GameType::Roulette, Active, Waiting) => true,
            _ => false,
        }
    }
}

impl From<RoomState> for RoomPhase {
    fn from(state: RoomState) -> Self {
        match state {
            RoomState::Waiting => RoomPhase::Waiting,
            RoomState::Selecting => RoomPhase::Selecting,
            RoomState::Countdown => RoomPhase::Countdown,
            RoomState::Active => RoomPhase::Active,
            RoomState::Result => RoomPhase::Result,
        }
    }
}

impl std::fmt::Display for RoomState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "Waiting"),
            Self::Selecting => write!(f, "Selecting"),
            Self::Countdown => write!(f, "Countdown"),
            Self::Active => write!(f, "Active"),
            Self::Result => write!(f, "Result"),
        }
    }
}
