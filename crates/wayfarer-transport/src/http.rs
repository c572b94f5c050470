//! [`HttpTransport`] backed by `reqwest`.

use crate::{HttpRequest, HttpTransport, Method, RawResponse, TransportError};

const DEFAULT_USER_AGENT: &str = concat!("wayfarer/", env!("CARGO_PKG_VERSION"));

/// Sends requests with a shared `reqwest::Client`.
///
/// Timeouts are enforced by the [`RequestClient`](crate::RequestClient), not
/// by the underlying client, so one config governs every transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::with_user_agent(DEFAULT_USER_AGENT)
    }

    pub fn with_user_agent(user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }

    /// Wraps an already-configured client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> Result<RawResponse, TransportError> {
        let url = reqwest::Url::parse(&request.url)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {e}", request.url)))?;

        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        }
        .header(reqwest::header::ACCEPT, request.accept.header_value());

        if let Some(body) = &request.body {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;

        tracing::trace!(status, len = body.len(), url = %request.url, "response received");
        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}
