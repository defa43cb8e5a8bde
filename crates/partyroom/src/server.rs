//! `PartyroomServer` builder and server loop.
//!
//! This is the entry point for running a partyroom server. It ties
//! together all the layers: transport → protocol → session → room, plus
//! the background tasks that forget closed rooms, expire old ones and
//! hand finished rounds to the store.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use partyroom_protocol::{JsonCodec, RoomCode};
use partyroom_room::{RoomConfig, RoomRegistry, RoomSinks, RoundRecord};
use partyroom_session::{RateLimitConfig, SessionManager};
use partyroom_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::time::{Instant, MissedTickBehavior};

use crate::handler::handle_connection;
use crate::store::Store;
use crate::{PartyroomError, ServerConfig};

/// Shared server state passed to each connection handler task.
///
/// Both mutexes guard map operations only. No lock is held while waiting
/// on a room actor or the store.
pub(crate) struct ServerState<S: Store> {
    pub(crate) sessions: Mutex<SessionManager>,
    pub(crate) registry: Mutex<RoomRegistry>,
    pub(crate) store: S,
    pub(crate) codec: JsonCodec,
    pub(crate) config: ServerConfig,
}

/// Builder for configuring and starting a partyroom server.
///
/// # Example
///
/// ```rust,no_run
/// use partyroom::prelude::*;
///
/// # async fn run() -> Result<(), PartyroomError> {
/// let server = PartyroomServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .build(MemoryStore::new())
///     .await?;
/// server.run().await
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct PartyroomServerBuilder {
    config: ServerConfig,
}

impl PartyroomServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every setting at once.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    pub fn store_timeout(mut self, timeout: Duration) -> Self {
        self.config.store_timeout = timeout;
        self
    }

    pub fn reaper_interval(mut self, interval: Duration) -> Self {
        self.config.reaper_interval = interval;
        self
    }

    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.config.room = config;
        self
    }

    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.config.rate_limit = config;
        self
    }

    /// Binds the listener. Nothing is accepted until
    /// [`run`](PartyroomServer::run).
    pub async fn build<S: Store>(self, store: S) -> Result<PartyroomServer<S>, PartyroomError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;

        let (closed_tx, closed) = mpsc::unbounded_channel();
        let (records_tx, records) = mpsc::unbounded_channel();
        let sinks = RoomSinks {
            closed: closed_tx,
            records: records_tx,
        };

        let state = Arc::new(ServerState {
            sessions: Mutex::new(SessionManager::new()),
            registry: Mutex::new(RoomRegistry::new(self.config.room.clone(), sinks)),
            store,
            codec: JsonCodec,
            config: self.config,
        });

        Ok(PartyroomServer {
            transport,
            state,
            closed,
            records,
        })
    }
}

/// A bound partyroom server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct PartyroomServer<S: Store> {
    transport: WebSocketTransport,
    state: Arc<ServerState<S>>,
    closed: UnboundedReceiver<RoomCode>,
    records: UnboundedReceiver<RoundRecord>,
}

impl<S: Store> PartyroomServer<S> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Spawns the room reaper and the round recorder, then a handler task
    /// for each accepted connection. Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), PartyroomError> {
        tracing::info!(addr = %self.state.config.bind_addr, "partyroom server running");

        tokio::spawn(reap_rooms(Arc::clone(&self.state), self.closed));
        tokio::spawn(record_rounds(Arc::clone(&self.state), self.records));

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

/// Forgets rooms whose actor stopped and shuts down rooms past their
/// expiry.
async fn reap_rooms<S: Store>(state: Arc<ServerState<S>>, mut closed: UnboundedReceiver<RoomCode>) {
    let mut ticker = tokio::time::interval(state.config.reaper_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            code = closed.recv() => {
                let Some(code) = code else { break };
                state.registry.lock().await.release(&code);
            }
            _ = ticker.tick() => {
                let expired = state.registry.lock().await.take_expired(Instant::now());
                for handle in expired {
                    tracing::info!(room_id = %handle.code(), "room expired");
                    if let Err(e) = handle.shutdown("expired").await {
                        tracing::debug!(error = %e, "expired room already stopped");
                    }
                }
            }
        }
    }
}

/// Hands finished rounds to the store one at a time. A slow or failing
/// store loses the record, never a room's progress.
async fn record_rounds<S: Store>(
    state: Arc<ServerState<S>>,
    mut records: UnboundedReceiver<RoundRecord>,
) {
    while let Some(record) = records.recv().await {
        let room_id = record.room_id.clone();
        let write = state.store.record_round(record);
        match tokio::time::timeout(state.config.store_timeout, write).await {
            Ok(Ok(())) => tracing::debug!(%room_id, "round recorded"),
            Ok(Err(e)) => tracing::warn!(%room_id, error = %e, "recording round failed"),
            Err(_) => tracing::warn!(%room_id, "recording round timed out"),
        }
    }
}
