//! Byte-level encoding of envelopes.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Converts wire types to and from bytes.
///
/// The server is generic over this so the JSON used by browsers can be
/// swapped for a compact format without touching the handler.
pub trait Codec: Send + Sync + 'static {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

/// JSON codec (`serde_json`). Behind the default `json` feature.
///
/// ```rust
/// use partyroom_protocol::{ClientEvent, Codec, Envelope, JsonCodec};
///
/// let frame = br#"{"event":{"type":"heartbeat","data":{"clientTime":5}}}"#;
/// let env: Envelope<ClientEvent> = JsonCodec.decode(frame).unwrap();
/// assert_eq!(env.event, ClientEvent::Heartbeat { client_time: 5 });
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
