//! Bounded retry with exponential backoff for upstream HTTP calls.
//!
//! Only transient failures are retried: request timeouts, connection
//! errors, HTTP 5xx, 408 and 429. Other client errors return immediately.

use reqwest::{Response, StatusCode};
use std::future::Future;
use std::time::Duration;

const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_INITIAL_DELAY_MS: u64 = 100;
const DEFAULT_MAX_DELAY_MS: u64 = 5_000;

/// Retry knobs for upstream calls.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Additional attempts after the first, so 3 means up to 4 calls.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on the backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, initial_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::from_millis(initial_delay_ms),
            max_delay: Duration::from_millis(max_delay_ms),
        }
    }

    /// Delay before retry number `attempt` (zero-based): doubles each time,
    /// capped at `max_delay`.
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }
}

fn retryable_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect()
}

fn retryable_status(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
}

/// Runs `operation` until it yields a non-retryable outcome or the attempt
/// budget is spent.
///
/// A response with a retryable status that survives every attempt is still
/// returned as `Ok`; callers decide what a non-success status means.
pub async fn with_retry<F, Fut>(
    config: &RetryConfig,
    operation: F,
) -> Result<Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Response, reqwest::Error>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(response)
                if retryable_status(response.status()) && attempt < config.max_retries =>
            {
                tracing::warn!(
                    status = %response.status(),
                    attempt,
                    "retryable status from upstream"
                );
            }
            Ok(response) => return Ok(response),
            Err(error) if !retryable_error(&error) || attempt >= config.max_retries => {
                return Err(error);
            }
            Err(error) => {
                tracing::warn!(error = %error, attempt, "retryable upstream error");
            }
        }

        let delay = config.delay_for_attempt(attempt);
        attempt += 1;
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_double_until_the_cap() {
        let config = RetryConfig::new(5, 100, 500);
        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(400));
        assert_eq!(config.delay_for_attempt(3), Duration::from_millis(500));
        assert_eq!(config.delay_for_attempt(10), Duration::from_millis(500));
    }

    #[test]
    fn classifies_retryable_statuses() {
        assert!(retryable_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(retryable_status(StatusCode::BAD_GATEWAY));
        assert!(retryable_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(retryable_status(StatusCode::REQUEST_TIMEOUT));
        assert!(retryable_status(StatusCode::TOO_MANY_REQUESTS));

        assert!(!retryable_status(StatusCode::OK));
        assert!(!retryable_status(StatusCode::BAD_REQUEST));
        assert!(!retryable_status(StatusCode::UNAUTHORIZED));
        assert!(!retryable_status(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn returns_first_success_without_retrying() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ping")
            .with_status(200)
            .with_body("pong")
            .expect(1)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/ping", server.url());
        let config = RetryConfig::new(3, 1, 10);

        let response = with_retry(&config, || client.get(&url).send())
            .await
            .expect("request succeeds");

        assert_eq!(response.status(), StatusCode::OK);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn exhausts_attempts_on_persistent_server_errors() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ping")
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/ping", server.url());
        let config = RetryConfig::new(2, 1, 10);

        let response = with_retry(&config, || client.get(&url).send())
            .await
            .expect("last response is still returned");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn does_not_retry_client_errors() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ping")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/ping", server.url());
        let config = RetryConfig::new(3, 1, 10);

        let response = with_retry(&config, || client.get(&url).send())
            .await
            .expect("response is returned untouched");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        mock.assert_async().await;
    }
}
