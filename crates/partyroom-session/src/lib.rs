//! Per-connection bookkeeping for partyroom.
//!
//! 1. **Identity** ([`generate_room_id`], [`resolve_unique_name`]): room
//!    codes that are unique among live rooms, and display names that are
//!    unique within a room.
//! 2. **Rate limiting** ([`RateLimiter`]): a fixed-window counter that
//!    gates every inbound event of one connection.
//! 3. **Session tracking** ([`SessionManager`]): which connections are
//!    online and which room each one is in.
//!
//! ```text
//! Room layer (above)     ← asks which room a connection is in
//!     ↕
//! Session layer (this crate)
//!     ↕
//! Protocol / transport   ← RoomCode, ConnectionId
//! ```

mod error;
mod identity;
mod manager;
mod rate_limit;

pub use error::SessionError;
pub use identity::{ROOM_CODE_ALPHABET, ROOM_CODE_LEN, generate_room_id, resolve_unique_name};
pub use manager::{Session, SessionManager};
pub use rate_limit::{RateLimitConfig, RateLimiter};
