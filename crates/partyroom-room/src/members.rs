//! Room membership in join order.

use std::net::IpAddr;

use partyroom_protocol::UserInfo;
use partyroom_transport::ConnectionId;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct Member {
    /// Current connection. Replaced when the member reconnects.
    pub conn: ConnectionId,
    /// Unique within the room.
    pub name: String,
    pub ip: IpAddr,
    pub device_id: Option<String>,
    pub connected: bool,
    /// Set while disconnected: when the record is dropped for good.
    pub stale_until: Option<Instant>,
}

impl Member {
    pub fn new(
        conn: ConnectionId,
        name: String,
        ip: IpAddr,
        device_id: Option<String>,
    ) -> Self {
        Self {
            conn,
            name,
            ip,
            device_id,
            connected: true,
            stale_until: None,
        }
    }

    /// Best-effort "same person" check used by `blockIPPerUser`.
    pub fn same_origin(&self, ip: IpAddr, device_id: Option<&str>) -> bool {
        match (self.device_id.as_deref(), device_id) {
            (Some(a), Some(b)) => self.ip == ip && a == b,
            _ => self.ip == ip,
        }
    }
}

/// Members in join order plus the host pointer.
///
/// The host is stored as a single name, so at most one member can ever be
/// host; `settle_host` (in `host.rs`) makes it exactly one.
#[derive(Debug, Default)]
pub struct Members {
    pub(crate) list: Vec<Member>,
    pub(crate) host: Option<String>,
}

impl Members {
    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Member> {
        self.list.iter()
    }

    pub fn connected(&self) -> impl Iterator<Item = &Member> {
        self.list.iter().filter(|m| m.connected)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.list.iter().map(|m| m.name.as_str())
    }

    pub fn by_conn(&self, conn: ConnectionId) -> Option<&Member> {
        self.list.iter().find(|m| m.connected && m.conn == conn)
    }

    pub fn by_name(&self, name: &str) -> Option<&Member> {
        self.list.iter().find(|m| m.name == name)
    }

    pub fn by_name_mut(&mut self, name: &str) -> Option<&mut Member> {
        self.list.iter_mut().find(|m| m.name == name)
    }

    pub fn push(&mut self, member: Member) {
        self.list.push(member);
    }

    pub fn remove(&mut self, name: &str) -> Option<Member> {
        let idx = self.list.iter().position(|m| m.name == name)?;
        Some(self.list.remove(idx))
    }

    /// Earliest grace deadline among disconnected members.
    pub fn next_stale_deadline(&self) -> Option<Instant> {
        self.list.iter().filter_map(|m| m.stale_until).min()
    }

    /// Names of disconnected members whose grace has run out.
    pub fn expired(&self, now: Instant) -> Vec<String> {
        self.list
            .iter()
            .filter(|m| m.stale_until.is_some_and(|t| t <= now))
            .map(|m| m.name.clone())
            .collect()
    }

    pub fn user_infos(&self, is_ready: impl Fn(&str) -> bool) -> Vec<UserInfo> {
        self.list
            .iter()
            .map(|m| UserInfo {
                name: m.name.clone(),
                is_host: self.host.as_deref() == Some(m.name.as_str()),
                is_ready: is_ready(&m.name),
                connected: m.connected,
            })
            .collect()
    }
}
