//! Timeout, retry, and cancellation around an [`HttpTransport`].

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::{HttpRequest, HttpTransport, RawResponse, TransportError};

// ---------------------------------------------------------------------------
// RequestConfig
// ---------------------------------------------------------------------------

/// How hard the [`RequestClient`] tries before giving up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestConfig {
    /// Upper bound on a single attempt, including reading the body.
    pub timeout: Duration,

    /// Total attempts, the first one included. `0` is treated as `1`.
    pub max_attempts: u32,

    /// Fixed pause between a failed attempt and the next one.
    pub retry_delay: Duration,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

impl RequestConfig {
    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

// ---------------------------------------------------------------------------
// RequestOutcome
// ---------------------------------------------------------------------------

/// The result of [`RequestClient::execute`].
///
/// Always produced; callers never see a panic or a bare transport error.
/// When `ok` is `false`, `error` says why and `status`/`body` hold whatever
/// the last attempt that reached the server got back.
#[derive(Debug)]
pub struct RequestOutcome {
    pub ok: bool,
    /// HTTP status of the last response, `0` if none arrived.
    pub status: u16,
    pub body: Vec<u8>,
    pub error: Option<TransportError>,
}

impl RequestOutcome {
    fn success(response: RawResponse) -> Self {
        Self {
            ok: true,
            status: response.status,
            body: response.body,
            error: None,
        }
    }

    fn failure(last: Option<RawResponse>, error: TransportError) -> Self {
        let last = last.unwrap_or_default();
        Self {
            ok: false,
            status: last.status,
            body: last.body,
            error: Some(error),
        }
    }

    /// The body as text, lossily decoded.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.error, Some(TransportError::Cancelled))
    }

    /// Converts into the body on success or the failure reason.
    pub fn into_result(self) -> Result<Vec<u8>, TransportError> {
        match (self.ok, self.error) {
            (true, _) => Ok(self.body),
            (false, Some(error)) => Err(error),
            (false, None) => Err(TransportError::Connection("request failed".into())),
        }
    }
}

// ---------------------------------------------------------------------------
// RequestClient
// ---------------------------------------------------------------------------

/// Runs requests through a transport with bounded retry.
///
/// Each attempt is raced against the cancellation token and the configured
/// timeout. A failed attempt is followed by a fixed `retry_delay` (also
/// cancellable) unless attempts are exhausted. Cancellation ends the whole
/// request immediately with [`TransportError::Cancelled`].
///
/// Cheap to clone; clones share the transport.
pub struct RequestClient<T> {
    transport: Arc<T>,
    config: RequestConfig,
}

impl<T> Clone for RequestClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            config: self.config.clone(),
        }
    }
}

impl<T: HttpTransport> RequestClient<T> {
    pub fn new(transport: T, config: RequestConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            config,
        }
    }

    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Executes `request` with this client's config.
    pub async fn execute(&self, request: &HttpRequest, cancel: &CancellationToken) -> RequestOutcome {
        self.execute_with(request, &self.config, cancel).await
    }

    /// Executes `request` with an explicit config, for one-off overrides.
    pub async fn execute_with(
        &self,
        request: &HttpRequest,
        config: &RequestConfig,
        cancel: &CancellationToken,
    ) -> RequestOutcome {
        let attempts = config.attempts();
        let mut last_response: Option<RawResponse> = None;
        let mut last_error = TransportError::Connection("no attempt made".into());

        for attempt in 1..=attempts {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!(method = %request.method, url = %request.url, "request cancelled");
                    return RequestOutcome::failure(last_response, TransportError::Cancelled);
                }
                result = tokio::time::timeout(config.timeout, self.transport.send(request)) => {
                    result.unwrap_or(Err(TransportError::Timeout(config.timeout)))
                }
            };

            let error = match result {
                Ok(response) if response.is_success() => {
                    if attempt > 1 {
                        tracing::info!(
                            attempt,
                            method = %request.method,
                            url = %request.url,
                            "request succeeded after retry"
                        );
                    }
                    return RequestOutcome::success(response);
                }
                Ok(response) => {
                    let error = TransportError::Protocol { status: response.status };
                    last_response = Some(response);
                    error
                }
                Err(error) => error,
            };

            if !error.is_retryable() {
                tracing::error!(
                    error = %error,
                    method = %request.method,
                    url = %request.url,
                    "request failed with non-retryable error"
                );
                return RequestOutcome::failure(last_response, error);
            }

            if attempt < attempts {
                tracing::warn!(
                    attempt,
                    max_attempts = attempts,
                    delay_ms = config.retry_delay.as_millis() as u64,
                    error = %error,
                    url = %request.url,
                    "request failed, retrying"
                );
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        tracing::debug!(url = %request.url, "request cancelled during retry delay");
                        return RequestOutcome::failure(last_response, TransportError::Cancelled);
                    }
                    _ = tokio::time::sleep(config.retry_delay) => {}
                }
            }

            last_error = error;
        }

        tracing::error!(
            attempts,
            error = %last_error,
            method = %request.method,
            url = %request.url,
            "request failed after all attempts"
        );
        RequestOutcome::failure(last_response, last_error)
    }

    pub async fn get(&self, url: &str, cancel: &CancellationToken) -> RequestOutcome {
        self.execute(&HttpRequest::get(url), cancel).await
    }

    /// GET expecting image bytes.
    pub async fn get_bytes(&self, url: &str, cancel: &CancellationToken) -> RequestOutcome {
        self.execute(&HttpRequest::get_image(url), cancel).await
    }

    /// POST an already-encoded JSON body.
    pub async fn post_json(
        &self,
        url: &str,
        body: Vec<u8>,
        cancel: &CancellationToken,
    ) -> RequestOutcome {
        self.execute(&HttpRequest::post_json(url, body), cancel).await
    }
}
