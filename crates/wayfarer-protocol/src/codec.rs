//! Codec trait and implementations for serializing/deserializing messages.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The flows above this crate don't care HOW a response body becomes a
//! typed value; they just need something that implements [`Codec`].
//!
//! The game server speaks JSON, so [`JsonCodec`] is the only implementation.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// ## Trait bounds explained
///
/// - `Send + Sync` → safe to share between tasks (the client may be moved
///   into a spawned Tokio task).
/// - `'static` → the codec owns everything it needs.
///
/// `DeserializeOwned` (vs plain `Deserialize`) means the decoded value
/// doesn't borrow from the input bytes, so the response buffer can be
/// dropped right after decoding.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use wayfarer_protocol::{Codec, JsonCodec, LoginRequest};
///
/// let codec = JsonCodec;
/// let request = LoginRequest {
///     user_name: "alice".into(),
///     game_name: "demo".into(),
/// };
///
/// let bytes = codec.encode(&request).unwrap();
/// let decoded: LoginRequest = codec.decode(&bytes).unwrap();
/// assert_eq!(request, decoded);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BasicResponse;

    #[test]
    fn test_decode_malformed_bytes_is_decode_error() {
        let result: Result<BasicResponse, _> = JsonCodec.decode(b"{not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_empty_body_is_decode_error() {
        let result: Result<BasicResponse, _> = JsonCodec.decode(b"");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
