use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::warn;

use crate::error::Result;

/// Retry behaviour for GraphQL POSTs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_retries: usize,
    /// Wait before retry `n`; the last entry repeats when retries outnumber
    /// delays.
    pub delays: Vec<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delays: vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
            ],
        }
    }
}

impl RetryConfig {
    /// Send exactly once.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            delays: Vec::new(),
        }
    }

    fn delay_before(&self, retry: usize) -> Duration {
        self.delays
            .get(retry)
            .or_else(|| self.delays.last())
            .copied()
            .unwrap_or_default()
    }
}

/// POST `body` as JSON with backoff.
///
/// Retries on network errors and 5xx responses.
/// Returns immediately on success or 4xx.
pub async fn retry_post(
    client: &reqwest::Client,
    url: &str,
    headers: &HeaderMap,
    body: &serde_json::Value,
    config: &RetryConfig,
) -> Result<reqwest::Response> {
    let max_attempts = config.max_retries + 1;
    let mut attempt = 0;

    loop {
        let result = client
            .post(url)
            .headers(headers.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(body)
            .send()
            .await;
        attempt += 1;
        let exhausted = attempt >= max_attempts;

        match result {
            Ok(resp) if resp.status().is_server_error() && !exhausted => {
                let delay = config.delay_before(attempt - 1);
                warn!(
                    attempt,
                    max_attempts,
                    status = %resp.status(),
                    delay_ms = delay.as_millis() as u64,
                    "graphql POST failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Ok(resp) => return Ok(resp),
            Err(e) if !exhausted && (e.is_connect() || e.is_timeout() || e.is_request()) => {
                let delay = config.delay_before(attempt - 1);
                warn!(
                    attempt,
                    max_attempts,
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    "graphql POST failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_backoff_schedule() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.delays.len(), 3);
    }

    #[test]
    fn last_delay_repeats() {
        let config = RetryConfig {
            max_retries: 5,
            delays: vec![Duration::from_millis(10), Duration::from_millis(50)],
        };
        assert_eq!(config.delay_before(0), Duration::from_millis(10));
        assert_eq!(config.delay_before(1), Duration::from_millis(50));
        assert_eq!(config.delay_before(4), Duration::from_millis(50));
    }

    #[test]
    fn none_has_no_delay() {
        let config = RetryConfig::none();
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.delay_before(0), Duration::ZERO);
    }

    #[tokio::test]
    async fn unreachable_host_fails_after_retries() {
        let client = reqwest::Client::new();
        let config = RetryConfig {
            max_retries: 1,
            delays: vec![Duration::ZERO],
        };
        // Port 9 (discard) is closed on test hosts.
        let err = retry_post(
            &client,
            "http://127.0.0.1:9/v1/graphql",
            &HeaderMap::new(),
            &serde_json::json!({}),
            &config,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, crate::Error::Http(_)));
    }
}
