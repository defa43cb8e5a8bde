//! Host authority: who holds the host role and how it moves.

use partyroom_transport::ConnectionId;

use crate::RoomError;
use crate::members::{Member, Members};

impl Members {
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn host_member(&self) -> Option<&Member> {
        self.host().and_then(|h| self.by_name(h))
    }

    /// Whether `conn` is the connected host.
    pub fn is_host(&self, conn: ConnectionId) -> bool {
        self.by_conn(conn)
            .is_some_and(|m| self.host() == Some(m.name.as_str()))
    }

    /// Whether the host is currently connected.
    pub fn has_connected_host(&self) -> bool {
        self.host_member().is_some_and(|m| m.connected)
    }

    /// Restores the one-host invariant after a membership change.
    ///
    /// Keeps the current host while they are connected, or while nobody
    /// else is. Otherwise promotes the earliest-joined connected member,
    /// falling back to the earliest-joined member of any kind. Returns the
    /// new host's name when it changed.
    pub fn settle_host(&mut self) -> Option<String> {
        let anyone_connected = self.list.iter().any(|m| m.connected);
        let keep = self
            .host_member()
            .is_some_and(|m| m.connected || !anyone_connected);
        if keep {
            return None;
        }

        let next = self
            .list
            .iter()
            .find(|m| m.connected)
            .or(self.list.first())
            .map(|m| m.name.clone());
        if next == self.host {
            return None;
        }
        self.host = next;
        self.host.clone()
    }

    /// Voluntary hand-over from the host on `from` to `target`.
    ///
    /// # Errors
    /// - [`RoomError::Permission`] if `from` is not the host
    /// - [`RoomError::NotFound`] if `target` is not a connected member
    /// - [`RoomError::Validation`] if `target` is the host already
    pub fn transfer_host(
        &mut self,
        from: ConnectionId,
        target: &str,
    ) -> Result<(), RoomError> {
        if !self.is_host(from) {
            return Err(RoomError::Permission("only the host can transfer host".into()));
        }
        if !self.by_name(target).is_some_and(|m| m.connected) {
            return Err(RoomError::NotFound(format!("no connected member named {target}")));
        }
        if self.host() == Some(target) {
            return Err(RoomError::Validation("already host".into()));
        }
        self.host = Some(target.to_string());
        Ok(())
    }
}
