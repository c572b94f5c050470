use std::time::Duration;

/// Errors that can occur in the transport layer.
///
/// Every variant except [`Cancelled`](Self::Cancelled) and
/// [`InvalidUrl`](Self::InvalidUrl) is transient as far as the
/// [`RequestClient`](crate::RequestClient) is concerned and triggers a retry.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request never produced a response (DNS, refused, reset, TLS).
    #[error("connection error: {0}")]
    Connection(String),

    /// The server answered with a non-2xx status.
    #[error("protocol error: HTTP {status}")]
    Protocol { status: u16 },

    /// A response arrived but its body could not be read.
    #[error("decode error: {0}")]
    Decode(String),

    /// The attempt did not finish within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The caller cancelled the request. No further attempts were made.
    #[error("request cancelled")]
    Cancelled,

    /// The URL could not be built or parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl TransportError {
    /// Returns `true` if another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Cancelled | Self::InvalidUrl(_))
    }
}
