//! HTTP transport layer for Wayfarer.
//!
//! Provides the [`HttpTransport`] trait (one request in, one raw response
//! out) and the [`RequestClient`] that wraps any transport with timeout,
//! bounded fixed-delay retry, and cancellation.
//!
//! Every network call in the client goes through [`RequestClient`], so
//! retry and timeout semantics are identical no matter which flow calls.
//!
//! # Feature Flags
//!
//! - `reqwest` (default): [`ReqwestTransport`], a transport backed by `reqwest`

mod client;
mod error;
#[cfg(feature = "reqwest")]
mod http;

pub use client::{RequestClient, RequestConfig, RequestOutcome};
pub use error::TransportError;
#[cfg(feature = "reqwest")]
pub use http::ReqwestTransport;

use std::fmt;
use std::future::Future;

/// Re-exported so callers can scope requests without depending on
/// `tokio-util` directly.
pub use tokio_util::sync::CancellationToken;

/// HTTP verb. The game server only uses these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// What kind of body the caller expects back. Drives the `Accept` header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Accept {
    #[default]
    Json,
    Image,
}

impl Accept {
    pub fn header_value(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Image => "image/*",
        }
    }
}

/// A single HTTP request, independent of any client library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// JSON body for POSTs. `None` sends no body.
    pub body: Option<Vec<u8>>,
    pub accept: Accept,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            body: None,
            accept: Accept::Json,
        }
    }

    pub fn post_json(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            body: Some(body),
            accept: Accept::Json,
        }
    }

    /// A GET that expects image bytes back.
    pub fn get_image(url: impl Into<String>) -> Self {
        Self {
            accept: Accept::Image,
            ..Self::get(url)
        }
    }
}

/// The status and body of a response, whatever the status was.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one HTTP request and returns the raw response.
///
/// Implementations report *any* status as `Ok`; classifying non-2xx as a
/// failure is the [`RequestClient`]'s job. They return `Err` only when no
/// usable response exists:
/// - [`TransportError::Connection`]: nothing came back
/// - [`TransportError::Decode`]: headers came back but the body couldn't be read
///
/// Dropping the returned future must abort the request.
pub trait HttpTransport: Send + Sync + 'static {
    fn send(
        &self,
        request: &HttpRequest,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}

/// Appends query pairs to `base`, percent-encoding keys and values.
///
/// Keys may repeat; each pair is appended in order, which is how the server
/// expects list parameters (`?actors=a&actors=b`).
///
/// # Errors
/// Returns [`TransportError::InvalidUrl`] if `base` is not an absolute URL.
pub fn build_url_with_query<K, V>(
    base: &str,
    pairs: impl IntoIterator<Item = (K, V)>,
) -> Result<String, TransportError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut url =
        url::Url::parse(base).map_err(|e| TransportError::InvalidUrl(format!("{base}: {e}")))?;
    {
        let mut query = url.query_pairs_mut();
        for (key, value) in pairs {
            query.append_pair(key.as_ref(), value.as_ref());
        }
    }
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_repeats_keys_in_order() {
        let url = build_url_with_query(
            "http://localhost:8000/api/view-actor/v1/alice/demo",
            [("actors", "Hero"), ("actors", "Ally")],
        )
        .unwrap();
        assert_eq!(
            url,
            "http://localhost:8000/api/view-actor/v1/alice/demo?actors=Hero&actors=Ally"
        );
    }

    #[test]
    fn test_build_url_percent_encodes_values() {
        let url = build_url_with_query("http://h/v", [("actors", "角色.战士 卡恩")]).unwrap();
        assert!(url.starts_with("http://h/v?actors="));
        assert!(!url.contains(' '));
    }

    #[test]
    fn test_build_url_rejects_relative_base() {
        let result = build_url_with_query("not a url", [("a", "b")]);
        assert!(matches!(result, Err(TransportError::InvalidUrl(_))));
    }

    #[test]
    fn test_raw_response_success_range() {
        assert!(RawResponse { status: 200, body: vec![] }.is_success());
        assert!(RawResponse { status: 204, body: vec![] }.is_success());
        assert!(!RawResponse { status: 302, body: vec![] }.is_success());
        assert!(!RawResponse { status: 500, body: vec![] }.is_success());
    }

    #[test]
    fn test_image_request_accepts_images() {
        let request = HttpRequest::get_image("http://h/a.png");
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.accept.header_value(), "image/*");
        assert!(request.body.is_none());
    }
}
