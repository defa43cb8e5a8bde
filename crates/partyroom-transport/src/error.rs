#[cfg(feature = "websocket")]
use tokio_tungstenite::tungstenite;

/// Errors from the WebSocket layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The listening socket could not be bound.
    #[error("bind failed: {0}")]
    Bind(#[source] std::io::Error),

    /// A TCP connection could not be accepted.
    #[error("accept failed: {0}")]
    Accept(#[source] std::io::Error),

    #[cfg(feature = "websocket")]
    /// The peer connected but the WebSocket upgrade failed.
    #[error("handshake with {peer} failed: {source}")]
    Handshake {
        peer: std::net::SocketAddr,
        #[source]
        source: tungstenite::Error,
    },

    #[cfg(feature = "websocket")]
    #[error("send failed: {0}")]
    Send(#[source] tungstenite::Error),

    #[cfg(feature = "websocket")]
    #[error("receive failed: {0}")]
    Receive(#[source] tungstenite::Error),
}
