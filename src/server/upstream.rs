use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::ai::envelope::GenerateRequest;

/// The generative text service behind the proxy.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Sends one request to `model` and returns the raw response body on success.
    async fn generate(&self, model: &str, request: &GenerateRequest) -> Result<String>;
}

pub struct GeminiClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl GeminiClient {
    pub fn new(base_url: &str, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        let mut base_url = Url::parse(base_url).context("Invalid upstream base URL")?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
        })
    }

    /// `{base}/v1beta/models/{model}:generateContent?key=...`
    pub fn endpoint_url(&self, model: &str) -> Result<Url> {
        let mut url = self
            .base_url
            .join(&format!("v1beta/models/{model}:generateContent"))
            .with_context(|| format!("Failed to build URL for model {model}"))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }
}

#[async_trait]
impl Upstream for GeminiClient {
    async fn generate(&self, model: &str, request: &GenerateRequest) -> Result<String> {
        debug!("Sending generateContent request to {model}");

        let response = self
            .client
            .post(self.endpoint_url(model)?)
            .json(request)
            .send()
            .await
            .context("Failed to reach upstream API")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read upstream response")?;

        if !status.is_success() {
            return Err(anyhow!("Gemini API error: {} - {}", status.as_u16(), body.trim()));
        }

        info!("Upstream {model} answered with {} bytes", body.len());
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_generate_content_url() {
        let client = GeminiClient::new(
            "https://generativelanguage.googleapis.com",
            "secret key",
            Duration::from_secs(1),
        )
        .unwrap();

        let url = client.endpoint_url("gemini-2.5-flash-lite").unwrap();

        assert_eq!(
            url.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash-lite:generateContent?key=secret+key"
        );
    }

    #[test]
    fn keeps_base_path() {
        let client =
            GeminiClient::new("http://127.0.0.1:9/mock", "k", Duration::from_secs(1)).unwrap();
        let url = client.endpoint_url("m").unwrap();
        assert_eq!(url.path(), "/mock/v1beta/models/m:generateContent");
    }
}
