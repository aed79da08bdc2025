//! Same-origin proxy in front of the generative text API.
//!
//! Exposes `POST /analyze` and `POST /suggest`, the only two endpoints the clients talk to.
//! The upstream model names and API key never leave this module.

pub mod prompt;
pub mod routes;
pub mod upstream;

use anyhow::{Context, Result};
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use crate::ai::clock::SystemClock;
use crate::config::Settings;

pub use prompt::PromptBuilder;
pub use routes::{router, AppState};
pub use upstream::{GeminiClient, Upstream};

impl AppState {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let upstream: Option<Arc<dyn Upstream>> = match settings.api_key() {
            Some(key) => Some(Arc::new(GeminiClient::new(
                &settings.server.upstream_base_url,
                key,
                Duration::from_millis(settings.server.upstream_timeout_ms),
            )?)),
            None => {
                warn!(
                    "{} is not set; /analyze and /suggest will answer 500",
                    settings.server.api_key_env
                );
                None
            }
        };

        Ok(Self::new(
            upstream,
            Arc::new(SystemClock),
            settings.server.analysis_model.clone(),
            settings.server.suggestion_model.clone(),
            settings.analysis.daily_limit,
        ))
    }
}

/// Binds `bind` (or the configured address) and serves until the process is stopped.
pub async fn serve(settings: &Settings, bind: Option<&str>) -> Result<()> {
    let state = AppState::from_settings(settings)?;
    let addr = bind.unwrap_or(&settings.server.bind);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind proxy listener on {addr}"))?;

    serve_on(listener, state).await
}

pub async fn serve_on(listener: TcpListener, state: AppState) -> Result<()> {
    info!("Starting proxy on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .await
        .context("Proxy server error")
}
