//! Unified error type for the Wayfarer client.

use wayfarer_cache::CacheError;
use wayfarer_protocol::ProtocolError;
use wayfarer_session::SessionError;
use wayfarer_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// Flows return this single type. The `#[from]` attribute on each wrapped
/// variant lets `?` convert sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum WayfarerError {
    /// The request never got a 2xx response (after retries), or was cancelled.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A 2xx response body could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The session refused the result, or an endpoint is missing.
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The server answered with `error != 0`. Never retried; `message` is
    /// meant for the player.
    #[error("server error {code}: {message}")]
    Application { code: i32, message: String },

    /// The image service answered with `success: false`.
    #[error("image service error: {0}")]
    ImageService(String),

    /// The flow needs a logged-in player.
    #[error("not logged in")]
    NotLoggedIn,

    /// The arguments were rejected before any request was made.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl WayfarerError {
    /// Returns `true` if the flow was abandoned because its token was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Transport(TransportError::Cancelled))
    }
}
