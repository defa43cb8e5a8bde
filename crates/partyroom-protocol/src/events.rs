//! Client and server event schemas.
//!
//! Both enums are adjacently tagged with camelCase names, so
//! `ClientEvent::JoinRoom(..)` travels as
//! `{"type":"joinRoom","data":{"roomId":"..","userName":".."}}` and unit
//! events as `{"type":"leaveRoom"}`.

use std::collections::BTreeMap;

use partyroom_race::{RaceParams, RankEntry, TrackLength, VehicleType, WinMode};
use serde::{Deserialize, Serialize};

use crate::types::{
    ErrorKind, ExpiryHours, GameType, RoomCode, RoomPhase, or_default,
};

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoom {
    pub user_name: String,
    pub room_name: String,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub password: Option<String>,
    /// Unknown values fall back to dice.
    #[serde(default, deserialize_with = "or_default")]
    pub game_type: GameType,
    /// Unknown values fall back to the shortest expiry.
    #[serde(default, deserialize_with = "or_default")]
    pub expiry_hours: ExpiryHours,
    #[serde(default, rename = "blockIPPerUser")]
    pub block_ip_per_user: bool,
    #[serde(default)]
    pub device_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoom {
    pub room_id: RoomCode,
    pub user_name: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
    /// Asks to be host. Only granted when nobody connected holds it.
    #[serde(default)]
    pub is_host: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRoll {
    /// Must name the sender.
    pub user_name: String,
    pub seed: u64,
    #[serde(default)]
    pub min: Option<u32>,
    #[serde(default)]
    pub max: Option<u32>,
}

/// Everything a client can ask for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    // -- Lobby --
    CreateRoom(CreateRoom),
    JoinRoom(JoinRoom),
    LeaveRoom,
    ListRooms,
    GetMenus { server_id: String },
    /// Adds a frequent menu for `server_id`. Answered with the new list.
    AddMenu { server_id: String, menu: String },
    Heartbeat { client_time: u64 },

    // -- Membership --
    ToggleReady,
    KickPlayer { target_name: String },
    TransferHost { target_name: String },

    // -- Rounds --
    StartGame,
    EndGame,
    RequestRoll(RequestRoll),
    UpdateDiceRange { min: u32, max: u32 },

    // -- Horse race --
    SelectHorse { horse_index: usize },
    SelectRandomHorse,
    StartHorseRace,
    EndHorseRace,
    ResetHorseRace,
    RaceAnimationComplete,
    SetTrackLength { track_length: TrackLength },
    SetWinMode { mode: WinMode },
    SetAutoRestart { seconds: u64 },

    // -- Chat --
    SendMessage { message: String },
    ToggleReaction { message_id: u64, emoji: String },
}

impl ClientEvent {
    /// Wire name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::CreateRoom(_) => "createRoom",
            ClientEvent::JoinRoom(_) => "joinRoom",
            ClientEvent::LeaveRoom => "leaveRoom",
            ClientEvent::ListRooms => "listRooms",
            ClientEvent::GetMenus { .. } => "getMenus",
            ClientEvent::AddMenu { .. } => "addMenu",
            ClientEvent::Heartbeat { .. } => "heartbeat",
            ClientEvent::ToggleReady => "toggleReady",
            ClientEvent::KickPlayer { .. } => "kickPlayer",
            ClientEvent::TransferHost { .. } => "transferHost",
            ClientEvent::StartGame => "startGame",
            ClientEvent::EndGame => "endGame",
            ClientEvent::RequestRoll(_) => "requestRoll",
            ClientEvent::UpdateDiceRange { .. } => "updateDiceRange",
            ClientEvent::SelectHorse { .. } => "selectHorse",
            ClientEvent::SelectRandomHorse => "selectRandomHorse",
            ClientEvent::StartHorseRace => "startHorseRace",
            ClientEvent::EndHorseRace => "endHorseRace",
            ClientEvent::ResetHorseRace => "resetHorseRace",
            ClientEvent::RaceAnimationComplete => "raceAnimationComplete",
            ClientEvent::SetTrackLength { .. } => "setTrackLength",
            ClientEvent::SetWinMode { .. } => "setWinMode",
            ClientEvent::SetAutoRestart { .. } => "setAutoRestart",
            ClientEvent::SendMessage { .. } => "sendMessage",
            ClientEvent::ToggleReaction { .. } => "toggleReaction",
        }
    }
}

// ---------------------------------------------------------------------------
// Server → client payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub name: String,
    pub is_host: bool,
    pub is_ready: bool,
    /// False while a dropped member waits out the reconnect grace.
    pub connected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceRoll {
    pub user_name: String,
    pub seed: u64,
    pub min: u32,
    pub max: u32,
    pub result: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: u64,
    pub user_name: String,
    pub message: String,
    /// Unix milliseconds.
    pub sent_at: u64,
    /// Emoji to the names who reacted with it.
    #[serde(default)]
    pub reactions: BTreeMap<String, Vec<String>>,
}

/// One row of the lobby listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub room_id: RoomCode,
    pub room_name: String,
    pub game_type: GameType,
    pub is_private: bool,
    pub members: usize,
    pub game_active: bool,
    pub expiry_hours: ExpiryHours,
    /// Unix milliseconds.
    pub created_at: u64,
}

/// Full view of a room, sent on create and join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub room_id: RoomCode,
    pub room_name: String,
    pub game_type: GameType,
    pub is_private: bool,
    pub expiry_hours: ExpiryHours,
    pub created_at: u64,
    /// The name the server assigned the receiver, possibly suffixed.
    pub your_name: String,
    pub is_host: bool,
    pub phase: RoomPhase,
    pub game_active: bool,
    pub users: Vec<UserInfo>,
    pub ready_users: Vec<String>,
    pub game_players: Vec<String>,
    pub dice_history: Vec<DiceRoll>,
    pub chat: Vec<ChatMessage>,
    pub track_length: TrackLength,
    pub win_mode: WinMode,
    pub auto_restart_secs: u64,
}

/// Everything the server can push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    // -- Lobby --
    RoomCreated(RoomSnapshot),
    RoomJoined(RoomSnapshot),
    RoomLeft { room_id: RoomCode },
    RoomDeleted { room_id: RoomCode, reason: String },
    RoomList { rooms: Vec<RoomSummary>, online: usize },
    MenuList { server_id: String, menus: Vec<String> },
    HeartbeatAck { client_time: u64, server_time: u64 },

    // -- Membership --
    UpdateUsers { users: Vec<UserInfo> },
    HostChanged { host: String },
    ReadyStateChanged { is_ready: bool },
    ReadyUsersUpdated { ready_users: Vec<String> },
    Kicked { by: String },

    // -- Rounds --
    GameStarted { game_type: GameType, players: Vec<String> },
    DiceRolled(DiceRoll),
    RollProgress { rolled: usize, total: usize, not_rolled: Vec<String> },
    AllPlayersRolled { results: Vec<DiceRoll> },
    GameEnded {
        game_type: GameType,
        /// Dice results of the round, in roll order.
        history: Vec<DiceRoll>,
        winner: Option<String>,
        forced: bool,
    },
    DiceRangeUpdated { user_name: String, min: u32, max: u32 },
    RouletteStarted { players: Vec<String>, winner: String, spin_ms: u64 },
    /// The drawn winner left mid-spin and another was drawn.
    RouletteWinnerChanged { players: Vec<String>, winner: String },
    RouletteEnded { winner: String },

    // -- Horse race --
    HorseSelectionStarted {
        horses: Vec<usize>,
        vehicles: Vec<VehicleType>,
        players: Vec<String>,
        track_length: TrackLength,
        win_mode: WinMode,
    },
    HorseSelectionUpdated { selected: Vec<String> },
    HorseRaceCountdown { seconds: u64, bets: BTreeMap<String, usize> },
    HorseRaceStarted {
        params: RaceParams,
        rankings: Vec<RankEntry>,
        bets: BTreeMap<String, usize>,
        duration: f64,
    },
    HorseRaceEnded {
        rankings: Vec<RankEntry>,
        winners: Vec<String>,
        mode: WinMode,
        forced: bool,
    },
    HorseRaceReset,
    TrackLengthChanged { track_length: TrackLength },
    WinModeChanged { mode: WinMode },
    AutoRestartChanged { seconds: u64 },

    // -- Chat --
    NewMessage(ChatMessage),
    MessageReactionUpdated {
        message_id: u64,
        reactions: BTreeMap<String, Vec<String>>,
    },

    Error { kind: ErrorKind, message: String },
}

impl ServerEvent {
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        ServerEvent::Error {
            kind,
            message: message.into(),
        }
    }
}
