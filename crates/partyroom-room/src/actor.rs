//! Room actor: one Tokio task per room that owns its [`Room`].
//!
//! Every mutation of a room goes through the actor's command channel, so
//! events for one room are applied one at a time in arrival order while
//! different rooms run in parallel. Phase timers and reconnect grace are
//! the same loop waiting on [`Room::next_deadline`].

use std::collections::HashMap;

use partyroom_protocol::{ClientEvent, JoinRoom, RoomCode, RoomSummary, ServerEvent};
use partyroom_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::outbox::{Outbox, RoundRecord};
use crate::room::{Joiner, Room};
use crate::RoomError;

/// Channel delivering server events to one connection's handler.
pub type OutboundSender = mpsc::UnboundedSender<ServerEvent>;

/// Where a room reports things that outlive it.
#[derive(Debug, Clone)]
pub struct RoomSinks {
    /// Receives the room's code when its actor stops.
    pub closed: mpsc::UnboundedSender<RoomCode>,
    /// Finished rounds, for the persistence layer.
    pub records: mpsc::UnboundedSender<RoundRecord>,
}

pub(crate) enum RoomCommand {
    Join {
        joiner: Joiner,
        req: JoinRoom,
        sender: OutboundSender,
        reply: oneshot::Sender<Result<String, RoomError>>,
    },
    Leave {
        conn: ConnectionId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    /// Connection dropped without leaving. Fire-and-forget.
    Disconnect { conn: ConnectionId },
    /// In-room event. Errors go back to `conn` as an `error` event.
    Event { conn: ConnectionId, event: ClientEvent },
    GetInfo { reply: oneshot::Sender<RoomSummary> },
    /// Tells every member why, then stops.
    Shutdown { reason: String },
}

/// Handle to a running room actor. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Whether the actor has stopped taking commands.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Joins `joiner` and returns the name the room gave them.
    pub async fn join(
        &self,
        joiner: Joiner,
        req: JoinRoom,
        sender: OutboundSender,
    ) -> Result<String, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                joiner,
                req,
                sender,
                reply,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?;
        rx.await.map_err(|_| RoomError::Unavailable(self.code.clone()))?
    }

    pub async fn leave(&self, conn: ConnectionId) -> Result<(), RoomError> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Leave { conn, reply })
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?;
        rx.await.map_err(|_| RoomError::Unavailable(self.code.clone()))?
    }

    pub async fn disconnect(&self, conn: ConnectionId) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Disconnect { conn })
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    /// Forwards an in-room event (fire-and-forget).
    pub async fn send_event(
        &self,
        conn: ConnectionId,
        event: ClientEvent,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Event { conn, event })
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    pub async fn info(&self) -> Result<RoomSummary, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::GetInfo { reply })
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?;
        rx.await.map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    pub async fn shutdown(&self, reason: impl Into<String>) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown {
                reason: reason.into(),
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }
}

struct RoomActor {
    room: Room,
    senders: HashMap<ConnectionId, OutboundSender>,
    sinks: RoomSinks,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    async fn run(mut self) {
        let code = self.room.code().clone();
        tracing::info!(room_id = %code, "room actor started");

        loop {
            let deadline = self.room.next_deadline();
            tokio::select! {
                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else { break };
                    if !self.handle(cmd) {
                        break;
                    }
                }
                () = sleep_until_opt(deadline) => {
                    self.room.on_timer(Instant::now());
                }
            }
            self.flush();
            if self.room.is_empty() {
                tracing::info!(room_id = %code, "room empty, closing");
                break;
            }
        }

        // Closed before reporting, so the registry sees a dead handle.
        self.receiver.close();
        let _ = self.sinks.closed.send(code.clone());
        tracing::info!(room_id = %code, "room actor stopped");
    }

    /// Applies one command. Returns `false` when the actor should stop.
    fn handle(&mut self, cmd: RoomCommand) -> bool {
        match cmd {
            RoomCommand::Join {
                joiner,
                req,
                sender,
                reply,
            } => {
                let fresh = !self.senders.contains_key(&joiner.conn);
                if fresh {
                    self.senders.insert(joiner.conn, sender);
                }
                let result = self.room.join(joiner, req);
                if fresh && result.is_err() {
                    self.senders.remove(&joiner.conn);
                }
                let _ = reply.send(result);
            }
            RoomCommand::Leave { conn, reply } => {
                let result = self.room.leave(conn);
                // RoomLeft was addressed before removal; deliver it first.
                self.flush();
                let _ = reply.send(result);
            }
            RoomCommand::Disconnect { conn } => {
                self.room.disconnect(conn, Instant::now());
            }
            RoomCommand::Event { conn, event } => {
                let name = event.name();
                if let Err(e) = self.room.handle_event(conn, event, Instant::now()) {
                    tracing::debug!(
                        room_id = %self.room.code(),
                        %conn,
                        event = name,
                        error = %e,
                        "event rejected"
                    );
                    self.send_to(conn, ServerEvent::error(e.kind(), e.to_string()));
                }
            }
            RoomCommand::GetInfo { reply } => {
                let _ = reply.send(self.room.summary());
            }
            RoomCommand::Shutdown { reason } => {
                tracing::info!(room_id = %self.room.code(), reason = %reason, "room shutting down");
                let event = ServerEvent::RoomDeleted {
                    room_id: self.room.code().clone(),
                    reason,
                };
                for sender in self.senders.values() {
                    let _ = sender.send(event.clone());
                }
                return false;
            }
        }
        true
    }

    /// Delivers queued events and records, then forgets connections that
    /// are no longer connected members.
    fn flush(&mut self) {
        let Outbox { messages, records } = self.room.take_outbox();
        for (to, event) in messages {
            for conn in to {
                self.send_to(conn, event.clone());
            }
        }
        for record in records {
            let _ = self.sinks.records.send(record);
        }

        let members = self.room.members();
        self.senders
            .retain(|conn, _| members.by_conn(*conn).is_some());
    }

    /// Drops the event if the connection's handler is gone.
    fn send_to(&self, conn: ConnectionId, event: ServerEvent) {
        if let Some(sender) = self.senders.get(&conn) {
            let _ = sender.send(event);
        }
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// Spawns the actor for `room`. Events the room queued while being
/// created are delivered to `creator` first.
pub(crate) fn spawn_room(
    room: Room,
    creator: (ConnectionId, OutboundSender),
    sinks: RoomSinks,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);
    let code = room.code().clone();

    let mut actor = RoomActor {
        room,
        senders: HashMap::from([creator]),
        sinks,
        receiver: rx,
    };
    actor.flush();
    tokio::spawn(actor.run());

    RoomHandle { code, sender: tx }
}
