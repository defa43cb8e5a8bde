//! Fan-out buffer filled by room transitions.

use std::time::{SystemTime, UNIX_EPOCH};

use partyroom_protocol::{DiceRoll, GameType, RankEntry, RoomCode, ServerEvent};
use partyroom_transport::ConnectionId;
use serde::Serialize;

/// A finished round, handed to the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRecord {
    pub room_id: RoomCode,
    pub room_name: String,
    pub game_type: GameType,
    pub players: Vec<String>,
    pub winners: Vec<String>,
    /// Dice rounds only, in roll order.
    pub dice: Vec<DiceRoll>,
    /// Horse races only, best first.
    pub rankings: Vec<RankEntry>,
    pub forced: bool,
    /// Unix milliseconds.
    pub finished_at: u64,
}

/// Events produced by one room transition, in emission order.
///
/// Recipients are resolved to connections when the event is emitted, so
/// a member removed later in the same transition still receives what was
/// addressed to them before.
#[derive(Debug, Default)]
pub struct Outbox {
    pub messages: Vec<(Vec<ConnectionId>, ServerEvent)>,
    pub records: Vec<RoundRecord>,
}

impl Outbox {
    pub fn push(&mut self, to: Vec<ConnectionId>, event: ServerEvent) {
        if !to.is_empty() {
            self.messages.push((to, event));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.records.is_empty()
    }

    /// Events delivered to `conn`, in order.
    pub fn for_conn(&self, conn: ConnectionId) -> impl Iterator<Item = &ServerEvent> {
        self.messages
            .iter()
            .filter(move |(to, _)| to.contains(&conn))
            .map(|(_, event)| event)
    }
}

/// Wall-clock milliseconds since the Unix epoch, as sent to clients.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_drops_events_without_recipients() {
        let mut out = Outbox::default();
        out.push(Vec::new(), ServerEvent::HorseRaceReset);
        assert!(out.is_empty());
    }

    #[test]
    fn test_for_conn_filters_by_recipient() {
        let a = ConnectionId::new(1);
        let b = ConnectionId::new(2);
        let mut out = Outbox::default();
        out.push(vec![a, b], ServerEvent::HorseRaceReset);
        out.push(vec![b], ServerEvent::HostChanged { host: "bob".into() });
        assert_eq!(out.for_conn(a).count(), 1);
        assert_eq!(out.for_conn(b).count(), 2);
    }
}
