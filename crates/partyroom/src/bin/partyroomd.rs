//! The partyroom server binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use partyroom::prelude::*;
use tracing_subscriber::EnvFilter;

/// Party-game room server.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    bind: String,
    /// Seconds of silence before a connection is dropped
    #[arg(long, default_value_t = 60)]
    idle_timeout: u64,
    /// Seconds a dropped member keeps their seat (0 leaves at once)
    #[arg(long, default_value_t = 30)]
    reconnect_grace: u64,
    /// Events a connection may send per 10 second window
    #[arg(long, default_value_t = 50)]
    rate_limit: u32,
    /// JSON list of default menus shared by every server id
    #[arg(long)]
    menus: Option<PathBuf>,
}

impl Args {
    fn server_config(&self) -> ServerConfig {
        let mut config = ServerConfig {
            bind_addr: self.bind.clone(),
            idle_timeout: Duration::from_secs(self.idle_timeout),
            ..ServerConfig::default()
        };
        config.room.reconnect_grace = Duration::from_secs(self.reconnect_grace);
        config.rate_limit.max_events = self.rate_limit;
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), PartyroomError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let store = match &args.menus {
        Some(path) => MemoryStore::load_base(path)?,
        None => MemoryStore::new(),
    };

    let server = PartyroomServerBuilder::new()
        .config(args.server_config())
        .build(store)
        .await?;

    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received Ctrl+C, shutting down");
            Ok(())
        }
    }
}
