//! Error types for the session layer.

use std::time::Duration;

use partyroom_protocol::{ErrorKind, RoomCode};
use partyroom_transport::ConnectionId;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Too many events in the current window. The event was dropped.
    #[error("rate limit exceeded, retry in {retry_after:?}")]
    RateLimited { retry_after: Duration },

    /// No session is registered for this connection.
    #[error("no session for {0}")]
    NotFound(ConnectionId),

    /// The connection is already a member of a room.
    #[error("already in room {0}")]
    AlreadyInRoom(RoomCode),

    /// The event needs room membership and the connection has none.
    #[error("not in a room")]
    NotInRoom,
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::RateLimited { .. } => ErrorKind::RateLimit,
            SessionError::NotFound(_) | SessionError::NotInRoom => {
                ErrorKind::NotFound
            }
            SessionError::AlreadyInRoom(_) => ErrorKind::Conflict,
        }
    }
}
