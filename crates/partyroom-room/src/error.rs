//! Error types for the room layer.

use partyroom_protocol::{ErrorKind, RoomCode};

/// A rejected room operation. Nothing was mutated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RoomError {
    /// Malformed or out-of-range input.
    #[error("{0}")]
    Validation(String),

    /// Host-only action from a non-host, or a wrong password.
    #[error("{0}")]
    Permission(String),

    /// The request clashes with the room's current state.
    #[error("{0}")]
    Conflict(String),

    /// The room or the named user does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The room's actor has stopped.
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),
}

impl RoomError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RoomError::Validation(_) => ErrorKind::Validation,
            RoomError::Permission(_) => ErrorKind::Permission,
            RoomError::Conflict(_) => ErrorKind::Conflict,
            RoomError::NotFound(_) | RoomError::Unavailable(_) => {
                ErrorKind::NotFound
            }
        }
    }
}
