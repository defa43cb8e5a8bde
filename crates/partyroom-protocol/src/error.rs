//! Error types for the protocol layer.

use crate::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Malformed frame, unknown event type or missing field.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// Parsed, but breaks a protocol rule.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

impl ProtocolError {
    /// How the failure is reported back to the sender.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}
