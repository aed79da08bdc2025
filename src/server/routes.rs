use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use log::{error, info, warn};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use crate::ai::analysis::{parse_score, prompt_length, MIN_PROMPT_CHARS};
use crate::ai::clock::Clock;
use crate::ai::envelope::GenerateRequest;
use crate::ai::governor::DailyCounter;
use crate::ai::heuristic::fallback_score;
use crate::ai::score::ScoreSource;
use crate::server::prompt::PromptBuilder;
use crate::server::upstream::Upstream;

/// Shared state of the proxy routes.
#[derive(Clone)]
pub struct AppState {
    upstream: Option<Arc<dyn Upstream>>,
    clock: Arc<dyn Clock>,
    requests: Arc<Mutex<DailyCounter>>,
    analysis_model: String,
    suggestion_model: String,
    prompts: PromptBuilder,
}

impl AppState {
    /// `upstream` is `None` when no API key is configured; both routes then answer 500.
    pub fn new(
        upstream: Option<Arc<dyn Upstream>>,
        clock: Arc<dyn Clock>,
        analysis_model: impl Into<String>,
        suggestion_model: impl Into<String>,
        daily_limit: u32,
    ) -> Self {
        let requests = DailyCounter::new(daily_limit, clock.today());
        Self {
            upstream,
            clock,
            requests: Arc::new(Mutex::new(requests)),
            analysis_model: analysis_model.into(),
            suggestion_model: suggestion_model.into(),
            prompts: PromptBuilder::new(),
        }
    }

    /// Analysis requests accepted today.
    pub fn requests_today(&self) -> u32 {
        let today = self.clock.today();
        self.counter().used(today)
    }

    fn record_request(&self) {
        let today = self.clock.today();
        let mut counter = self.counter();
        let used = counter.record(today);
        info!("Requests used today: {used}/{}", counter.ceiling());
    }

    fn counter(&self) -> std::sync::MutexGuard<'_, DailyCounter> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/analyze", post(analyze).fallback(method_not_allowed))
        .route("/suggest", post(suggest).fallback(method_not_allowed))
        .with_state(state)
}

async fn method_not_allowed() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

async fn analyze(State(state): State<AppState>, body: Bytes) -> Response {
    let prompt_text = match string_field(&body, "promptText") {
        Some(text) if prompt_length(&text) >= MIN_PROMPT_CHARS => text,
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Prompt must be at least 10 characters long.",
            )
        }
    };

    let Some(upstream) = state.upstream.clone() else {
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Gemini API key not configured",
        );
    };

    state.record_request();

    let request = GenerateRequest::user_prompt(
        state.prompts.analysis_prompt(&prompt_text),
        state.prompts.analysis_config(),
    );

    let outcome = match upstream.generate(&state.analysis_model, &request).await {
        Ok(body) => parse_score(&body).map_err(anyhow::Error::from),
        Err(e) => Err(e),
    };

    match outcome {
        Ok(score) => Json(score.with_source(ScoreSource::Model)).into_response(),
        Err(e) => {
            warn!("Analysis upstream failed, using fallback: {e:#}");
            Json(fallback_score(&prompt_text)).into_response()
        }
    }
}

async fn suggest(State(state): State<AppState>, body: Bytes) -> Response {
    let text = match string_field(&body, "text") {
        Some(text) if !text.is_empty() => text,
        _ => return error_response(StatusCode::BAD_REQUEST, "Missing text input"),
    };

    let Some(upstream) = state.upstream.clone() else {
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Gemini API key not configured",
        );
    };

    let request = GenerateRequest::user_prompt(
        state.prompts.suggestion_prompt(&text),
        state.prompts.suggestion_config(),
    );

    let envelope = upstream
        .generate(&state.suggestion_model, &request)
        .await
        .and_then(|body| Ok(serde_json::from_str::<Value>(&body)?));

    match envelope {
        Ok(envelope) => Json(envelope).into_response(),
        Err(e) => {
            error!("Suggestion upstream failed: {e:#}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

/// A string field of a JSON object body. Unparseable bodies count as missing.
fn string_field(body: &[u8], field: &str) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value.get(field)?.as_str().map(str::to_string)
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
