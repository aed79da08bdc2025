use anyhow::Result;
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::ai::clock::{Clock, SystemClock};
use crate::ai::envelope::GenerateResponse;
use crate::ai::retry::{send_with_retry, RetryPolicy};
use crate::ai::transport::{HttpTransport, Transport};
use crate::config::Settings;
use crate::error::ClientError;
use crate::framework::SuggestedVariable;

pub const SUGGEST_PATH: &str = "suggest";

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

/// Proposes candidate variables for free text through the `/suggest` endpoint.
///
/// Unlike analysis there is no local fallback: every failure reaches the caller.
pub struct SuggestionClient {
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
    timeout: Duration,
}

impl SuggestionClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
        retry: RetryPolicy,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            clock,
            retry,
            timeout,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let timeout = Duration::from_millis(settings.endpoint.timeout_ms);
        let retry = RetryPolicy::new(
            settings.suggestion.max_attempts,
            Duration::from_millis(settings.suggestion.base_delay_ms),
        );
        let transport = HttpTransport::new(&settings.endpoint.base_url, timeout)?;
        Ok(Self::new(
            Arc::new(transport),
            Arc::new(SystemClock),
            retry,
            timeout,
        ))
    }

    pub async fn suggest(&self, text: &str) -> Result<Vec<SuggestedVariable>, ClientError> {
        if text.trim().is_empty() {
            return Err(ClientError::validation("Text is required for suggestions"));
        }

        debug!("Requesting variable suggestions, text length: {}", text.len());

        let body = json!({ "text": text });
        let response = send_with_retry(
            self.transport.as_ref(),
            self.clock.as_ref(),
            &self.retry,
            self.timeout,
            SUGGEST_PATH,
            &body,
        )
        .await?;

        let suggestions = parse_suggestions(&response.body)?;
        info!("Received {} variable suggestions", suggestions.len());
        Ok(suggestions)
    }
}

/// Parses a `/suggest` body: a bare JSON array, or a generative text envelope whose first
/// part holds one. Entries that do not validate are dropped.
pub fn parse_suggestions(body: &str) -> Result<Vec<SuggestedVariable>, ClientError> {
    let value: Value = serde_json::from_str(body)?;

    let payload = match value {
        Value::Array(_) => value,
        other => {
            let envelope: GenerateResponse = serde_json::from_value(other)?;
            let text = envelope.first_text().ok_or_else(|| {
                ClientError::unavailable("Unexpected API response format or no content")
            })?;
            serde_json::from_str(text)?
        }
    };

    let Value::Array(entries) = payload else {
        return Err(ClientError::unavailable(
            "Suggestion payload is not a JSON array",
        ));
    };

    Ok(entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match validate_entry(entry) {
            Ok(suggestion) => Some(suggestion),
            Err(reason) => {
                debug!("Dropping suggestion {index}: {reason}");
                None
            }
        })
        .collect())
}

fn validate_entry(entry: &Value) -> Result<SuggestedVariable, String> {
    let object = entry.as_object().ok_or("not an object")?;
    let field = |key: &str| -> Result<String, String> {
        object
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| format!("missing string field `{key}`"))
    };

    let variable_name = field("variableName")?;
    let original_text = field("originalText")?;
    let default_value = field("defaultValue")?;
    let hint = field("hint")?;

    if !IDENTIFIER.is_match(&variable_name) {
        return Err(format!("`{variable_name}` is not an identifier"));
    }
    if original_text.is_empty() {
        return Err("empty original text".to_string());
    }

    Ok(SuggestedVariable {
        variable_name,
        original_text,
        default_value,
        hint,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::clock::ManualClock;
    use crate::ai::testing::ScriptedTransport;
    use crate::ai::transport::TransportResponse;
    use chrono::NaiveDate;

    fn suggestion_array() -> Value {
        json!([
            {"variableName": "audience", "originalText": "students", "defaultValue": "beginners", "hint": "Who reads it"},
            {"variableName": "topic", "originalText": "photosynthesis", "defaultValue": "biology", "hint": "Subject"}
        ])
    }

    fn client(transport: Arc<ScriptedTransport>) -> (SuggestionClient, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()));
        let client = SuggestionClient::new(
            transport,
            clock.clone(),
            RetryPolicy::new(2, Duration::from_secs(1)),
            Duration::from_secs(6),
        );
        (client, clock)
    }

    #[tokio::test]
    async fn blank_text_is_rejected_locally() {
        let transport = Arc::new(ScriptedTransport::new(vec![]));
        let (client, _) = client(transport.clone());

        let err = client.suggest("  \n ").await.unwrap_err();

        assert!(matches!(err, ClientError::Validation { .. }));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn unwraps_envelope_into_suggestions() {
        let envelope = json!({
            "candidates": [{"content": {"parts": [{"text": suggestion_array().to_string()}]}}]
        });
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(TransportResponse::new(
            200,
            envelope.to_string(),
        ))]));
        let (client, _) = client(transport.clone());

        let suggestions = client.suggest("Explain photosynthesis to students").await.unwrap();

        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].variable_name, "audience");
        assert_eq!(suggestions[1].original_text, "photosynthesis");
        let requests = transport.requests();
        assert_eq!(requests[0].0, "suggest");
        assert_eq!(requests[0].1["text"], "Explain photosynthesis to students");
    }

    #[tokio::test]
    async fn rate_limits_surface_after_smaller_ceiling() {
        let transport = Arc::new(ScriptedTransport::repeating(TransportResponse::new(429, "")));
        let (client, clock) = client(transport.clone());

        let err = client.suggest("some text").await.unwrap_err();

        assert!(matches!(err, ClientError::RateLimited { attempts: 2 }));
        assert_eq!(transport.calls(), 2);
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(1)]);
    }

    #[tokio::test]
    async fn upstream_errors_propagate() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(TransportResponse::new(
            500,
            r#"{"error":"quota"}"#,
        ))]));
        let (client, _) = client(transport);

        let err = client.suggest("some text").await.unwrap_err();
        assert!(matches!(err, ClientError::Unavailable { .. }));
    }

    #[test]
    fn accepts_bare_arrays() {
        let parsed = parse_suggestions(&suggestion_array().to_string()).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn drops_invalid_entries() {
        let body = json!([
            {"variableName": "ok_name", "originalText": "word", "defaultValue": "", "hint": ""},
            {"variableName": "has space", "originalText": "word", "defaultValue": "x", "hint": "y"},
            {"variableName": "9lives", "originalText": "cat", "defaultValue": "x", "hint": "y"},
            {"variableName": "missing_hint", "originalText": "word", "defaultValue": "x"},
            {"variableName": "numeric", "originalText": 4, "defaultValue": "x", "hint": "y"},
            {"variableName": "empty_original", "originalText": "", "defaultValue": "x", "hint": "y"},
            "not an object"
        ])
        .to_string();

        let parsed = parse_suggestions(&body).unwrap();

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].variable_name, "ok_name");
    }

    #[test]
    fn non_array_payload_is_unavailable() {
        let envelope = json!({
            "candidates": [{"content": {"parts": [{"text": "{\"variableName\": \"x\"}"}]}}]
        })
        .to_string();

        for body in [envelope.as_str(), "{}", "not json"] {
            let err = parse_suggestions(body).unwrap_err();
            assert!(matches!(err, ClientError::Unavailable { .. }), "body: {body}");
        }
    }
}
