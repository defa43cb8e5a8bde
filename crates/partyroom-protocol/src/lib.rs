//! Wire protocol for partyroom.
//!
//! - **Types** ([`RoomCode`], [`GameType`], [`ErrorKind`], [`Envelope`], ...)
//!   shared by both directions.
//! - **Events** ([`ClientEvent`], [`ServerEvent`]): one explicit payload
//!   schema per event name, validated by serde at the boundary.
//! - **Codec** ([`Codec`], [`JsonCodec`]): bytes in, events out.
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope<ClientEvent>) → Room actor
//! ```
//!
//! Every frame is adjacently tagged:
//!
//! ```json
//! {"seq":3,"timestamp":1200,"event":{"type":"joinRoom","data":{"roomId":"K7QZ2M","userName":"amy"}}}
//! ```

mod codec;
mod error;
mod events;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use events::{
    ChatMessage, ClientEvent, CreateRoom, DiceRoll, JoinRoom, RequestRoll,
    RoomSnapshot, RoomSummary, ServerEvent, UserInfo,
};
pub use types::{
    Envelope, ErrorKind, ExpiryHours, GameType, Recipient, RoomCode,
    RoomPhase,
};

pub use partyroom_race::{
    RaceParams, RankEntry, TrackLength, VehicleType, WinMode,
};
