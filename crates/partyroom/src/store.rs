//! Persistence adapter.
//!
//! The server never waits on a store from inside a room. Finished rounds
//! are drained from a channel by a background task, menu lookups happen on
//! the connection handler, and both are bounded by
//! [`ServerConfig::store_timeout`](crate::ServerConfig::store_timeout).

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use partyroom_room::RoundRecord;
use tokio::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store did not answer within {0:?}")]
    Timeout(Duration),

    #[error("could not read menu defaults: {0}")]
    Io(#[from] std::io::Error),

    #[error("menu defaults are not a JSON list of strings: {0}")]
    Format(#[from] serde_json::Error),

    /// Backend-specific failure.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Where finished rounds go and frequent menus come from.
///
/// Implement this for a database or an HTTP backend. [`MemoryStore`]
/// keeps everything in process.
pub trait Store: Send + Sync + 'static {
    /// Persists one finished round.
    fn record_round(
        &self,
        record: RoundRecord,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// The menu list for `server_id`: base defaults followed by that
    /// server's own additions.
    fn menus(
        &self,
        server_id: &str,
    ) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;

    /// Adds `menu` to `server_id`'s own list.
    fn add_menu(
        &self,
        server_id: &str,
        menu: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// In-process [`Store`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    base: Vec<String>,
    extra: Mutex<HashMap<String, Vec<String>>>,
    records: Mutex<Vec<RoundRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(base: Vec<String>) -> Self {
        Self {
            base,
            ..Self::default()
        }
    }

    /// Loads the base defaults from a JSON file holding a list of strings.
    pub fn load_base(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let data = std::fs::read(path)?;
        let base: Vec<String> = serde_json::from_slice(&data)?;
        Ok(Self::with_base(base))
    }

    /// Every round recorded so far, oldest first.
    pub async fn records(&self) -> Vec<RoundRecord> {
        self.records.lock().await.clone()
    }
}

impl Store for MemoryStore {
    async fn record_round(&self, record: RoundRecord) -> Result<(), StoreError> {
        self.records.lock().await.push(record);
        Ok(())
    }

    async fn menus(&self, server_id: &str) -> Result<Vec<String>, StoreError> {
        let extra = self.extra.lock().await;
        let mut menus = self.base.clone();
        if let Some(own) = extra.get(server_id) {
            menus.extend(own.iter().cloned());
        }
        Ok(menus)
    }

    /// Blank entries and ones already listed are ignored.
    async fn add_menu(&self, server_id: &str, menu: &str) -> Result<(), StoreError> {
        let menu = menu.trim();
        if menu.is_empty() || self.base.iter().any(|m| m == menu) {
            return Ok(());
        }
        let mut extra = self.extra.lock().await;
        let list = extra.entry(server_id.to_string()).or_default();
        if !list.iter().any(|m| m == menu) {
            list.push(menu.to_string());
        }
        Ok(())
    }
}

/// Lets a caller keep a handle on the store it gave the server.
impl<T: Store> Store for Arc<T> {
    fn record_round(
        &self,
        record: RoundRecord,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        (**self).record_round(record)
    }

    fn menus(
        &self,
        server_id: &str,
    ) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send {
        (**self).menus(server_id)
    }

    fn add_menu(
        &self,
        server_id: &str,
        menu: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        (**self).add_menu(server_id, menu)
    }
}
