//! # partyroom
//!
//! Real-time rooms for casual party games: dice, roulette and horse races,
//! played by browsers over WebSocket.
//!
//! The server is authoritative. Each room is an actor that applies its
//! events one at a time, rolls the dice and computes the race outcome,
//! then fans the results out to its members. Clients only animate what
//! they are told, and replay races with the same engine the server used.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use partyroom::prelude::*;
//!
//! # async fn run() -> Result<(), PartyroomError> {
//! let server = PartyroomServerBuilder::new()
//!     .bind("0.0.0.0:8080")
//!     .build(MemoryStore::new())
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;
mod store;

pub use config::ServerConfig;
pub use error::PartyroomError;
pub use server::{PartyroomServer, PartyroomServerBuilder};
pub use store::{MemoryStore, Store, StoreError};

/// Re-exports everything a server binary or a test client needs.
pub mod prelude {
    pub use crate::{
        MemoryStore, PartyroomError, PartyroomServer, PartyroomServerBuilder, ServerConfig,
        Store, StoreError,
    };

    pub use partyroom_protocol::{
        ChatMessage, ClientEvent, Codec, CreateRoom, DiceRoll, Envelope, ErrorKind,
        ExpiryHours, GameType, JoinRoom, JsonCodec, RequestRoll, RoomCode, RoomPhase,
        RoomSnapshot, RoomSummary, ServerEvent, UserInfo,
    };
    pub use partyroom_race::{RaceParams, RankEntry, Replay, TrackLength, VehicleType, WinMode};
    pub use partyroom_room::{RoomConfig, RoundRecord};
    pub use partyroom_session::RateLimitConfig;
}
