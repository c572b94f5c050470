//! Error types for the protocol layer.
//!
//! Each crate in Wayfarer defines its own error enum. A `ProtocolError`
//! always means "these bytes did not have the shape we expected", never
//! a network or state problem.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, a payload missing a field its
    /// declared head requires, or a value of the wrong type.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The outer envelope's `head` is not one this client understands.
    #[error("unknown client message head {0}")]
    UnknownMessageHead(i32),

    /// The inner agent event's `head` is not one this client understands.
    #[error("unknown agent event head {0}")]
    UnknownEventHead(i64),

    /// The message parsed but violates a protocol rule (e.g. an agent
    /// event body without a `head`, or an enum code out of range).
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
