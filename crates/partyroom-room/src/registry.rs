//! Session registry: the map of live rooms.

use std::collections::HashMap;

use partyroom_protocol::{CreateRoom, RoomCode};
use partyroom_session::generate_room_id;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::time::Instant;

use crate::actor::{OutboundSender, RoomHandle, RoomSinks, spawn_room};
use crate::room::{Joiner, Room};
use crate::{RoomConfig, RoomError};

/// Command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

struct RoomEntry {
    handle: RoomHandle,
    expires_at: Instant,
}

/// Every live room, keyed by code.
///
/// Only map operations happen here. Anything touching a room's state is
/// a command to that room's actor, sent through a cloned [`RoomHandle`]
/// after the caller has released whatever lock guards the registry.
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, RoomEntry>,
    config: RoomConfig,
    sinks: RoomSinks,
    rng: StdRng,
}

impl RoomRegistry {
    pub fn new(config: RoomConfig, sinks: RoomSinks) -> Self {
        Self {
            rooms: HashMap::new(),
            config,
            sinks,
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Opens a room under a fresh code and starts its actor. The creator's
    /// `roomCreated` is already on `sender` when this returns.
    pub fn create_room(
        &mut self,
        creator: Joiner,
        req: CreateRoom,
        sender: OutboundSender,
        now: Instant,
    ) -> Result<RoomHandle, RoomError> {
        let code = loop {
            let code = generate_room_id(&mut self.rng);
            if !self.rooms.contains_key(&code) {
                break code;
            }
        };
        let expires_at = now + req.expiry_hours.duration();
        let room = Room::create(code.clone(), creator, req, self.config.clone())?;
        let handle = spawn_room(
            room,
            (creator.conn, sender),
            self.sinks.clone(),
            DEFAULT_CHANNEL_SIZE,
        );
        self.rooms.insert(
            code,
            RoomEntry {
                handle: handle.clone(),
                expires_at,
            },
        );
        Ok(handle)
    }

    pub fn get(&self, code: &RoomCode) -> Result<RoomHandle, RoomError> {
        self.rooms
            .get(code)
            .map(|e| e.handle.clone())
            .ok_or_else(|| RoomError::NotFound(format!("no room {code}")))
    }

    /// Forgets `code` once its actor has stopped.
    pub fn release(&mut self, code: &RoomCode) -> bool {
        let closed = self.rooms.get(code).is_some_and(|e| e.handle.is_closed());
        if closed {
            self.rooms.remove(code);
            tracing::info!(room_id = %code, rooms = self.rooms.len(), "room removed");
        }
        closed
    }

    /// Every live room's handle, for listing without holding the lock.
    pub fn handles(&self) -> Vec<RoomHandle> {
        self.rooms.values().map(|e| e.handle.clone()).collect()
    }

    /// Removes and returns rooms whose expiry has passed. The caller
    /// shuts them down.
    pub fn take_expired(&mut self, now: Instant) -> Vec<RoomHandle> {
        let expired: Vec<RoomCode> = self
            .rooms
            .iter()
            .filter(|(_, e)| e.expires_at <= now)
            .map(|(code, _)| code.clone())
            .collect();
        expired
            .into_iter()
            .filter_map(|code| self.rooms.remove(&code))
            .map(|e| e.handle)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
