use anyhow::Result;
use log::{debug, info, warn};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::ai::clock::{Clock, SystemClock};
use crate::ai::envelope::GenerateResponse;
use crate::ai::governor::{RateGovernor, RateLimits};
use crate::ai::heuristic;
use crate::ai::retry::{send_with_retry, RetryPolicy};
use crate::ai::score::{EffectivenessScore, ScoreSource};
use crate::ai::transport::{HttpTransport, Transport};
use crate::config::Settings;
use crate::error::ClientError;

pub const ANALYZE_PATH: &str = "analyze";

/// Shortest prompt worth analysing, measured by [`prompt_length`].
pub const MIN_PROMPT_CHARS: usize = 10;

#[derive(Debug, Clone, Copy)]
pub struct AnalysisOptions {
    pub retry: RetryPolicy,
    pub timeout: Duration,
    pub limits: RateLimits,
}

impl AnalysisOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            retry: RetryPolicy::new(
                settings.analysis.max_attempts,
                Duration::from_millis(settings.analysis.base_delay_ms),
            ),
            timeout: Duration::from_millis(settings.endpoint.timeout_ms),
            limits: RateLimits {
                min_interval: Duration::from_millis(settings.analysis.min_interval_ms),
                daily_limit: settings.analysis.daily_limit,
            },
        }
    }
}

/// Length of the trimmed prompt in UTF-16 code units.
pub fn prompt_length(prompt_text: &str) -> usize {
    heuristic::trim_prompt(prompt_text).encode_utf16().count()
}

/// Rejects prompts shorter than [`MIN_PROMPT_CHARS`] once trimmed.
pub fn validate_prompt(prompt_text: &str) -> Result<(), ClientError> {
    if prompt_length(prompt_text) < MIN_PROMPT_CHARS {
        return Err(ClientError::validation(format!(
            "Prompt must be at least {MIN_PROMPT_CHARS} characters long for analysis"
        )));
    }
    Ok(())
}

/// Reads an effectiveness score from an endpoint body: either the score itself or a
/// generative text envelope whose first part holds it.
pub fn parse_score(body: &str) -> Result<EffectivenessScore, ClientError> {
    if let Ok(score) = serde_json::from_str::<EffectivenessScore>(body) {
        return Ok(score);
    }

    let envelope: GenerateResponse = serde_json::from_str(body)?;
    let text = envelope
        .first_text()
        .ok_or_else(|| ClientError::unavailable("Unexpected API response format or no content"))?;
    let score: EffectivenessScore = serde_json::from_str(text)?;
    Ok(score.with_source(ScoreSource::Model))
}

/// Scores finished prompts through the `/analyze` endpoint, degrading to the local heuristic.
pub struct AnalysisClient {
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    governor: RateGovernor,
    retry: RetryPolicy,
    timeout: Duration,
}

impl AnalysisClient {
    pub fn new(transport: Arc<dyn Transport>, clock: Arc<dyn Clock>, options: AnalysisOptions) -> Self {
        let governor = RateGovernor::new(clock.clone(), options.limits);
        Self {
            transport,
            clock,
            governor,
            retry: options.retry,
            timeout: options.timeout,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let options = AnalysisOptions::from_settings(settings);
        let transport = HttpTransport::new(&settings.endpoint.base_url, options.timeout)?;
        Ok(Self::new(Arc::new(transport), Arc::new(SystemClock), options))
    }

    /// Calls still available today.
    pub fn remaining_requests(&self) -> u32 {
        self.governor.remaining()
    }

    /// Scores `prompt_text`.
    ///
    /// Only a too-short prompt is an error. Rate limiting, timeouts, bad statuses and
    /// unreadable payloads all resolve to [`heuristic::fallback_score`].
    pub async fn analyze(&self, prompt_text: &str) -> Result<EffectivenessScore, ClientError> {
        validate_prompt(prompt_text)?;

        if self.governor.remaining() == 0 {
            warn!("Daily analysis quota exhausted, using fallback scoring");
            return Ok(heuristic::fallback_score(prompt_text));
        }

        self.governor.pace().await;
        self.governor.record_call();

        match self.request_score(prompt_text).await {
            Ok(score) => {
                info!("Analysis completed: {}", score.total_score);
                Ok(score)
            }
            Err(e) => {
                warn!("API failed, using fallback scoring: {e}");
                Ok(heuristic::fallback_score(prompt_text))
            }
        }
    }

    async fn request_score(&self, prompt_text: &str) -> Result<EffectivenessScore, ClientError> {
        debug!(
            "Requesting analysis, prompt length: {}",
            prompt_text.len()
        );

        let body = json!({ "promptText": prompt_text });
        let response = send_with_retry(
            self.transport.as_ref(),
            self.clock.as_ref(),
            &self.retry,
            self.timeout,
            ANALYZE_PATH,
            &body,
        )
        .await?;

        parse_score(&response.body)
    }
}
