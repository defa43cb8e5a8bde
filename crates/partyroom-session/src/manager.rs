//! Registry of live connections.
//!
//! Owned by the server behind a mutex. Every accepted connection is
//! registered here until its handler exits, which is what the lobby's
//! online counter reports.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use partyroom_protocol::RoomCode;
use partyroom_transport::ConnectionId;
use tokio::time::Instant;

use crate::SessionError;

/// One live connection.
#[derive(Debug, Clone)]
pub struct Session {
    pub conn_id: ConnectionId,
    pub peer: SocketAddr,
    pub connected_at: Instant,
    /// The room this connection is a member of, if any.
    pub room: Option<RoomCode>,
}

impl Session {
    pub fn ip(&self) -> IpAddr {
        self.peer.ip()
    }
}

#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: HashMap<ConnectionId, Session>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly accepted connection.
    pub fn register(&mut self, conn_id: ConnectionId, peer: SocketAddr) {
        self.sessions.insert(
            conn_id,
            Session {
                conn_id,
                peer,
                connected_at: Instant::now(),
                room: None,
            },
        );
        tracing::debug!(%conn_id, %peer, online = self.sessions.len(), "session registered");
    }

    /// Forgets a connection. Returns the room it was in, if any.
    pub fn remove(&mut self, conn_id: ConnectionId) -> Option<RoomCode> {
        let session = self.sessions.remove(&conn_id)?;
        tracing::debug!(%conn_id, online = self.sessions.len(), "session removed");
        session.room
    }

    pub fn get(&self, conn_id: ConnectionId) -> Option<&Session> {
        self.sessions.get(&conn_id)
    }

    /// Records that `conn_id` entered `room`.
    ///
    /// # Errors
    /// - [`SessionError::NotFound`] for an unknown connection
    /// - [`SessionError::AlreadyInRoom`] if it is in a room already
    pub fn enter_room(
        &mut self,
        conn_id: ConnectionId,
        room: RoomCode,
    ) -> Result<(), SessionError> {
        let session = self
            .sessions
            .get_mut(&conn_id)
            .ok_or(SessionError::NotFound(conn_id))?;
        if let Some(current) = &session.room {
            return Err(SessionError::AlreadyInRoom(current.clone()));
        }
        session.room = Some(room);
        Ok(())
    }

    /// Clears the room of `conn_id`. Returns the room it left.
    pub fn leave_room(&mut self, conn_id: ConnectionId) -> Option<RoomCode> {
        self.sessions.get_mut(&conn_id)?.room.take()
    }

    /// The room `conn_id` is in.
    ///
    /// # Errors
    /// [`SessionError::NotInRoom`] if it is in none.
    pub fn room_of(&self, conn_id: ConnectionId) -> Result<&RoomCode, SessionError> {
        self.sessions
            .get(&conn_id)
            .and_then(|s| s.room.as_ref())
            .ok_or(SessionError::NotInRoom)
    }

    /// Number of live connections.
    pub fn online(&self) -> usize {
        self.sessions.len()
    }
}
