//! Rooms for partyroom.
//!
//! Each room is a synchronous state machine ([`Room`]) owned by its own
//! Tokio task. Connections talk to it through a [`RoomHandle`]; the
//! [`RoomRegistry`] maps room codes to handles.
//!
//! # Key types
//!
//! - [`Room`]: membership, host authority, readiness, rounds, chat
//! - [`RoomRegistry`]: creates rooms, finds them by code, expires them
//! - [`RoomHandle`]: sends commands to a running room actor
//! - [`RoomState`]: round lifecycle per game type
//! - [`RoomConfig`]: limits and timings shared by every room
//! - [`Outbox`]: events and finished rounds produced by one transition

mod actor;
mod config;
mod error;
mod host;
mod members;
mod outbox;
mod race;
mod registry;
mod room;
mod rounds;

pub use actor::{OutboundSender, RoomHandle, RoomSinks};
pub use config::{RoomConfig, RoomState};
pub use error::RoomError;
pub use members::{Member, Members};
pub use outbox::{Outbox, RoundRecord, unix_millis};
pub use registry::RoomRegistry;
pub use room::{Joiner, Room};
pub use rounds::roll_die;
