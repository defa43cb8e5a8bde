//! Unified error type for the partyroom server.

use partyroom_protocol::{ErrorKind, ProtocolError};
use partyroom_room::RoomError;
use partyroom_session::SessionError;
use partyroom_transport::TransportError;

use crate::store::StoreError;

/// Top-level error that wraps every layer's error.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors, so the server and handler deal with this one type.
#[derive(Debug, thiserror::Error)]
pub enum PartyroomError {
    /// Connection I/O (bind, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Encoding or decoding a frame.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Rate limiting and connection bookkeeping.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A rejected room operation.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The persistence adapter failed or timed out.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PartyroomError {
    /// The wire kind reported to the client, for errors that are the
    /// client's to see. Transport and store failures stay server-side.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            PartyroomError::Protocol(e) => Some(e.kind()),
            PartyroomError::Session(e) => Some(e.kind()),
            PartyroomError::Room(e) => Some(e.kind()),
            PartyroomError::Transport(_) | PartyroomError::Store(_) => None,
        }
    }
}
