//! Per-connection handler: throttling, decoding and routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The task owns the socket, so it is the only writer. Room actors reach
//! the client through the connection's outbound channel, which the handler
//! drains in the same `select!` that reads inbound frames.
//!
//! Lobby events (create, join, leave, list, menus, heartbeat) are answered
//! here. Everything else goes to the actor of the room the connection is
//! in, which reports its own rejections back through the outbound channel.

use std::sync::Arc;

use partyroom_protocol::{
    ClientEvent, Codec, CreateRoom, Envelope, JoinRoom, ProtocolError, RoomCode,
    ServerEvent,
};
use partyroom_room::{Joiner, OutboundSender, RoomHandle, unix_millis};
use partyroom_session::{RateLimiter, SessionError};
use partyroom_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::server::ServerState;
use crate::store::{Store, StoreError};
use crate::PartyroomError;

/// Drop guard that releases a connection's session when the handler exits.
///
/// A member is marked disconnected rather than removed, so a same-name
/// rejoin inside the grace period reclaims the seat. Since `Drop` is
/// synchronous, the async cleanup runs on a fire-and-forget task.
struct SessionGuard<S: Store> {
    conn_id: ConnectionId,
    state: Arc<ServerState<S>>,
}

impl<S: Store> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let Some(code) = state.sessions.lock().await.remove(conn_id) else {
                return;
            };
            let handle = state.registry.lock().await.get(&code);
            if let Ok(handle) = handle {
                let _ = handle.disconnect(conn_id).await;
            }
        });
    }
}

/// Outbound framing state for one connection.
struct Outbound {
    seq: u64,
    start: Instant,
}

impl Outbound {
    fn frame(&mut self, event: ServerEvent) -> Envelope<ServerEvent> {
        let seq = self.seq;
        self.seq += 1;
        Envelope {
            seq,
            timestamp: self.start.elapsed().as_millis() as u64,
            event,
        }
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<S: Store>(
    conn: WebSocketConnection,
    state: Arc<ServerState<S>>,
) -> Result<(), PartyroomError> {
    let conn_id = conn.id();
    let peer = conn.peer_addr();
    tracing::debug!(%conn_id, %peer, "handling new connection");

    state.sessions.lock().await.register(conn_id, peer);
    let _guard = SessionGuard {
        conn_id,
        state: Arc::clone(&state),
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut out = Outbound {
        seq: 1,
        start: Instant::now(),
    };
    let mut limiter = RateLimiter::new(state.config.rate_limit.clone());
    let idle_timeout = state.config.idle_timeout;
    let idle = tokio::time::sleep(idle_timeout);
    tokio::pin!(idle);

    loop {
        tokio::select! {
            // Outbound first, so a room's last words are handled before
            // the next inbound frame can move this connection elsewhere.
            biased;

            Some(event) = rx.recv() => {
                if matches!(
                    event,
                    ServerEvent::RoomLeft { .. }
                        | ServerEvent::RoomDeleted { .. }
                        | ServerEvent::Kicked { .. }
                ) {
                    state.sessions.lock().await.leave_room(conn_id);
                }
                send_event(&conn, &state, &mut out, event).await?;
            }
            received = conn.recv() => {
                let data = match received {
                    Ok(Some(data)) => data,
                    Ok(None) => {
                        tracing::info!(%conn_id, "connection closed cleanly");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(%conn_id, error = %e, "recv error");
                        break;
                    }
                };
                idle.as_mut().reset(Instant::now() + idle_timeout);

                let reply = match process_frame(&conn, &state, &mut limiter, &tx, &data).await {
                    Ok(reply) => reply,
                    Err(e) => match e.kind() {
                        Some(kind) => Some(ServerEvent::error(kind, e.to_string())),
                        None => return Err(e),
                    },
                };
                if let Some(event) = reply {
                    send_event(&conn, &state, &mut out, event).await?;
                }
            }
            () = &mut idle => {
                tracing::info!(%conn_id, "connection timed out");
                break;
            }
        }
    }

    // _guard drops here → the room sees the disconnect.
    Ok(())
}

/// Throttles, decodes and dispatches one inbound frame. Returns the
/// direct reply, if the event has one.
async fn process_frame<S: Store>(
    conn: &WebSocketConnection,
    state: &Arc<ServerState<S>>,
    limiter: &mut RateLimiter,
    tx: &OutboundSender,
    data: &[u8],
) -> Result<Option<ServerEvent>, PartyroomError> {
    let conn_id = conn.id();
    if let Err(e) = limiter.check(Instant::now()) {
        tracing::warn!(%conn_id, error = %e, "event dropped");
        return Err(e.into());
    }
    if data.len() > state.config.max_frame_len {
        return Err(ProtocolError::InvalidMessage(format!(
            "frame of {} bytes exceeds {}",
            data.len(),
            state.config.max_frame_len
        ))
        .into());
    }
    let envelope: Envelope<ClientEvent> = state.codec.decode(data)?;
    tracing::debug!(%conn_id, event = envelope.event.name(), "event received");
    dispatch(conn, state, tx, envelope.event).await
}

async fn dispatch<S: Store>(
    conn: &WebSocketConnection,
    state: &Arc<ServerState<S>>,
    tx: &OutboundSender,
    event: ClientEvent,
) -> Result<Option<ServerEvent>, PartyroomError> {
    let conn_id = conn.id();
    let joiner = Joiner {
        conn: conn_id,
        ip: conn.peer_addr().ip(),
    };

    match event {
        ClientEvent::CreateRoom(req) => {
            create_room(state, joiner, req, tx).await?;
            Ok(None)
        }
        ClientEvent::JoinRoom(req) => {
            join_room(state, joiner, req, tx).await?;
            Ok(None)
        }
        ClientEvent::LeaveRoom => {
            let handle = current_room(state, conn_id).await?;
            let result = handle.leave(conn_id).await;
            state.sessions.lock().await.leave_room(conn_id);
            result?;
            Ok(None)
        }
        ClientEvent::ListRooms => {
            let handles = state.registry.lock().await.handles();
            let mut rooms = Vec::with_capacity(handles.len());
            for handle in &handles {
                if let Ok(info) = handle.info().await {
                    rooms.push(info);
                }
            }
            rooms.sort_by(|a, b| {
                (a.created_at, a.room_id.as_str()).cmp(&(b.created_at, b.room_id.as_str()))
            });
            let online = state.sessions.lock().await.online();
            Ok(Some(ServerEvent::RoomList { rooms, online }))
        }
        ClientEvent::GetMenus { server_id } => {
            let menus = get_menus(state, &server_id).await;
            Ok(Some(ServerEvent::MenuList { server_id, menus }))
        }
        ClientEvent::AddMenu { server_id, menu } => {
            add_menu(state, &server_id, &menu).await?;
            let menus = get_menus(state, &server_id).await;
            Ok(Some(ServerEvent::MenuList { server_id, menus }))
        }
        ClientEvent::Heartbeat { client_time } => Ok(Some(ServerEvent::HeartbeatAck {
            client_time,
            server_time: unix_millis(),
        })),
        event => {
            let handle = current_room(state, conn_id).await?;
            handle.send_event(conn_id, event).await?;
            Ok(None)
        }
    }
}

/// Fails with a conflict if `conn_id` is already in a room.
async fn ensure_lobby<S: Store>(
    state: &Arc<ServerState<S>>,
    conn_id: ConnectionId,
) -> Result<(), SessionError> {
    match state.sessions.lock().await.room_of(conn_id) {
        Ok(code) => Err(SessionError::AlreadyInRoom(code.clone())),
        Err(_) => Ok(()),
    }
}

async fn create_room<S: Store>(
    state: &Arc<ServerState<S>>,
    joiner: Joiner,
    req: CreateRoom,
    tx: &OutboundSender,
) -> Result<(), PartyroomError> {
    ensure_lobby(state, joiner.conn).await?;
    let handle = state
        .registry
        .lock()
        .await
        .create_room(joiner, req, tx.clone(), Instant::now())?;
    state
        .sessions
        .lock()
        .await
        .enter_room(joiner.conn, handle.code().clone())?;
    tracing::info!(room_id = %handle.code(), conn_id = %joiner.conn, "room created");
    Ok(())
}

async fn join_room<S: Store>(
    state: &Arc<ServerState<S>>,
    joiner: Joiner,
    req: JoinRoom,
    tx: &OutboundSender,
) -> Result<(), PartyroomError> {
    ensure_lobby(state, joiner.conn).await?;
    let handle = state.registry.lock().await.get(&req.room_id)?;
    let name = handle.join(joiner, req, tx.clone()).await?;
    state
        .sessions
        .lock()
        .await
        .enter_room(joiner.conn, handle.code().clone())?;
    tracing::info!(room_id = %handle.code(), conn_id = %joiner.conn, %name, "room joined");
    Ok(())
}

/// The handle of the room `conn_id` is in. A binding to a room that no
/// longer exists is cleared on the way out.
async fn current_room<S: Store>(
    state: &Arc<ServerState<S>>,
    conn_id: ConnectionId,
) -> Result<RoomHandle, PartyroomError> {
    let code: RoomCode = state.sessions.lock().await.room_of(conn_id)?.clone();
    let found = state.registry.lock().await.get(&code);
    match found {
        Ok(handle) if !handle.is_closed() => Ok(handle),
        _ => {
            state.sessions.lock().await.leave_room(conn_id);
            Err(SessionError::NotInRoom.into())
        }
    }
}

/// Menus for `server_id`. A failing or slow store yields an empty list.
async fn get_menus<S: Store>(state: &Arc<ServerState<S>>, server_id: &str) -> Vec<String> {
    let limit = state.config.store_timeout;
    let result = match tokio::time::timeout(limit, state.store.menus(server_id)).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(limit)),
    };
    result.unwrap_or_else(|e| {
        tracing::warn!(server_id, error = %e, "menu lookup failed");
        Vec::new()
    })
}

/// Stores a frequent menu. A failing or slow store is logged and the
/// client still gets the current list.
async fn add_menu<S: Store>(
    state: &Arc<ServerState<S>>,
    server_id: &str,
    menu: &str,
) -> Result<(), ProtocolError> {
    let menu = menu.trim();
    let len = menu.chars().count();
    if len == 0 || len > state.config.max_menu_len {
        return Err(ProtocolError::InvalidMessage(format!(
            "menus must be 1-{} characters",
            state.config.max_menu_len
        )));
    }
    let limit = state.config.store_timeout;
    let result = match tokio::time::timeout(limit, state.store.add_menu(server_id, menu)).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(limit)),
    };
    if let Err(e) = result {
        tracing::warn!(server_id, error = %e, "adding menu failed");
    }
    Ok(())
}

async fn send_event<S: Store>(
    conn: &WebSocketConnection,
    state: &Arc<ServerState<S>>,
    out: &mut Outbound,
    event: ServerEvent,
) -> Result<(), PartyroomError> {
    let bytes = state.codec.encode(&out.frame(event))?;
    conn.send(&bytes).await?;
    Ok(())
}
