//! Bounded exponential backoff on rate-limited endpoint calls.
//!
//! Only HTTP 429 is retried. Every other failure ends the call immediately.

use log::{debug, warn};
use serde_json::Value;
use std::time::Duration;

use crate::ai::clock::Clock;
use crate::ai::transport::{Transport, TransportResponse};
use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Pause after the first rate-limited attempt; doubles on each further one.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay after the given 0-indexed attempt.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Posts `body` to `path`, bounding each attempt by `timeout` and backing off on 429.
///
/// Returns the first 2xx response. Exhausting the attempts on 429 yields
/// [`ClientError::RateLimited`]; transport errors, timeouts and other statuses yield
/// [`ClientError::Unavailable`].
pub async fn send_with_retry(
    transport: &dyn Transport,
    clock: &dyn Clock,
    policy: &RetryPolicy,
    timeout: Duration,
    path: &str,
    body: &Value,
) -> Result<TransportResponse, ClientError> {
    let attempts = policy.max_attempts.max(1);

    for attempt in 0..attempts {
        debug!("Attempt {} of {attempts}: POST {path}", attempt + 1);

        let response = match tokio::time::timeout(timeout, transport.post_json(path, body)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(ClientError::unavailable(format!("{e:#}"))),
            Err(_) => {
                return Err(ClientError::unavailable(format!(
                    "Request timeout after {}ms",
                    timeout.as_millis()
                )))
            }
        };

        if response.is_rate_limited() {
            if attempt + 1 < attempts {
                let delay = policy.delay_for_attempt(attempt);
                warn!("Rate limit exceeded. Retrying in {}ms...", delay.as_millis());
                clock.sleep(delay).await;
            }
            continue;
        }

        if !response.is_success() {
            return Err(ClientError::unavailable(format!(
                "API error: {} - {}",
                response.status,
                response.body.trim()
            )));
        }

        return Ok(response);
    }

    Err(ClientError::RateLimited { attempts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::clock::ManualClock;
    use crate::ai::testing::ScriptedTransport;
    use chrono::NaiveDate;
    use serde_json::json;

    fn clock() -> ManualClock {
        ManualClock::new(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
    }

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_secs(1))
    }

    #[test]
    fn delay_doubles_per_attempt() {
        let policy = policy(5);
        assert_eq!(policy.delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_secs(8));
    }

    #[test]
    fn at_least_one_attempt() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }

    #[tokio::test]
    async fn success_on_first_attempt() {
        let transport = ScriptedTransport::new(vec![Ok(TransportResponse::new(200, "{}"))]);
        let clock = clock();

        let response = send_with_retry(
            &transport,
            &clock,
            &policy(3),
            Duration::from_secs(5),
            "analyze",
            &json!({}),
        )
        .await
        .unwrap();

        assert_eq!(response.body, "{}");
        assert_eq!(transport.calls(), 1);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn retries_rate_limits_with_backoff() {
        let transport = ScriptedTransport::new(vec![
            Ok(TransportResponse::new(429, "")),
            Ok(TransportResponse::new(429, "")),
            Ok(TransportResponse::new(200, "ok")),
        ]);
        let clock = clock();

        let response = send_with_retry(
            &transport,
            &clock,
            &policy(3),
            Duration::from_secs(5),
            "analyze",
            &json!({}),
        )
        .await
        .unwrap();

        assert_eq!(response.body, "ok");
        assert_eq!(transport.calls(), 3);
        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[tokio::test]
    async fn gives_up_after_ceiling() {
        let transport = ScriptedTransport::repeating(TransportResponse::new(429, ""));
        let clock = clock();

        let err = send_with_retry(
            &transport,
            &clock,
            &policy(2),
            Duration::from_secs(5),
            "suggest",
            &json!({}),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ClientError::RateLimited { attempts: 2 }));
        assert_eq!(transport.calls(), 2);
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(1)]);
    }

    #[tokio::test]
    async fn other_statuses_are_not_retried() {
        let transport =
            ScriptedTransport::new(vec![Ok(TransportResponse::new(503, "overloaded"))]);
        let clock = clock();

        let err = send_with_retry(
            &transport,
            &clock,
            &policy(3),
            Duration::from_secs(5),
            "analyze",
            &json!({}),
        )
        .await
        .unwrap_err();

        match err {
            ClientError::Unavailable { message } => assert!(message.contains("503")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn transport_errors_are_unavailable() {
        let transport = ScriptedTransport::new(vec![Err(anyhow::anyhow!("connection refused"))]);
        let clock = clock();

        let err = send_with_retry(
            &transport,
            &clock,
            &policy(3),
            Duration::from_secs(5),
            "analyze",
            &json!({}),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ClientError::Unavailable { .. }));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn slow_responses_time_out() {
        let transport = ScriptedTransport::new(vec![Ok(TransportResponse::new(200, "late"))])
            .with_latency(Duration::from_secs(2));
        let clock = clock();

        let err = send_with_retry(
            &transport,
            &clock,
            &policy(3),
            Duration::from_millis(20),
            "analyze",
            &json!({}),
        )
        .await
        .unwrap_err();

        match err {
            ClientError::Unavailable { message } => assert!(message.contains("timeout")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
