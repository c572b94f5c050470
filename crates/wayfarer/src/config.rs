//! Client configuration.

use std::time::Duration;

use wayfarer_cache::CacheConfig;
use wayfarer_transport::RequestConfig;

/// Where the endpoint table is fetched from at boot.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000/api_endpoints/v1/";

/// Base URL of the image generation service.
pub const DEFAULT_IMAGE_SERVER_URL: &str = "http://localhost:8300";

/// Everything a [`GameClient`](crate::GameClient) needs before it can talk
/// to a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Full URL of the endpoint table. Every other game-server URL comes
    /// from the table this returns.
    pub server_url: String,

    /// Base URL of the image service (no trailing slash).
    pub image_server_url: String,

    pub request: RequestConfig,

    pub cache: CacheConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            image_server_url: DEFAULT_IMAGE_SERVER_URL.to_string(),
            request: RequestConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Load from environment variables, using defaults for anything
    /// missing or unparsable.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `WAYFARER_SERVER_URL` | `server_url` |
    /// | `WAYFARER_IMAGE_SERVER_URL` | `image_server_url` |
    /// | `WAYFARER_REQUEST_TIMEOUT_SECS` | `request.timeout` |
    /// | `WAYFARER_MAX_ATTEMPTS` | `request.max_attempts` |
    /// | `WAYFARER_RETRY_DELAY_MS` | `request.retry_delay` |
    /// | `WAYFARER_CACHE_CAPACITY` | `cache.capacity` |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parse = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        Self {
            server_url: lookup("WAYFARER_SERVER_URL").unwrap_or(defaults.server_url),
            image_server_url: lookup("WAYFARER_IMAGE_SERVER_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.image_server_url),
            request: RequestConfig {
                timeout: parse("WAYFARER_REQUEST_TIMEOUT_SECS")
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.request.timeout),
                max_attempts: parse("WAYFARER_MAX_ATTEMPTS")
                    .and_then(|n| u32::try_from(n).ok())
                    .unwrap_or(defaults.request.max_attempts),
                retry_delay: parse("WAYFARER_RETRY_DELAY_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.request.retry_delay),
            },
            cache: CacheConfig {
                capacity: parse("WAYFARER_CACHE_CAPACITY")
                    .and_then(|n| usize::try_from(n).ok())
                    .or(defaults.cache.capacity),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.image_server_url, "http://localhost:8300");
        assert_eq!(config.request, RequestConfig::default());
        assert_eq!(config.cache.capacity, None);
    }

    #[test]
    fn test_from_lookup_empty_env_is_default() {
        assert_eq!(ClientConfig::from_lookup(lookup(&[])), ClientConfig::default());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("WAYFARER_SERVER_URL", "http://game:9000/api_endpoints/v1/"),
            ("WAYFARER_IMAGE_SERVER_URL", "http://img:8300/"),
            ("WAYFARER_REQUEST_TIMEOUT_SECS", "5"),
            ("WAYFARER_MAX_ATTEMPTS", "7"),
            ("WAYFARER_RETRY_DELAY_MS", "250"),
            ("WAYFARER_CACHE_CAPACITY", "64"),
        ]));

        assert_eq!(config.server_url, "http://game:9000/api_endpoints/v1/");
        assert_eq!(config.image_server_url, "http://img:8300");
        assert_eq!(config.request.timeout, Duration::from_secs(5));
        assert_eq!(config.request.max_attempts, 7);
        assert_eq!(config.request.retry_delay, Duration::from_millis(250));
        assert_eq!(config.cache.capacity, Some(64));
    }

    #[test]
    fn test_from_lookup_ignores_garbage_numbers() {
        let config = ClientConfig::from_lookup(lookup(&[("WAYFARER_MAX_ATTEMPTS", "lots")]));
        assert_eq!(config.request.max_attempts, 3);
    }
}
