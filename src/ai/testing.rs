use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::ai::transport::{Transport, TransportResponse};

/// Replays canned responses and records the requests it saw.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<TransportResponse>>>,
    repeat: Option<TransportResponse>,
    latency: Option<Duration>,
    requests: Mutex<Vec<(String, Value)>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<TransportResponse>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            repeat: None,
            latency: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answers every request with the same response.
    pub fn repeating(response: TransportResponse) -> Self {
        Self {
            repeat: Some(response),
            ..Self::new(Vec::new())
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post_json(&self, path: &str, body: &Value) -> Result<TransportResponse> {
        self.requests
            .lock()
            .unwrap()
            .push((path.to_string(), body.clone()));

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let next = self.script.lock().unwrap().pop_front();
        match (next, &self.repeat) {
            (Some(result), _) => result,
            (None, Some(response)) => Ok(response.clone()),
            (None, None) => Err(anyhow!("no scripted response left")),
        }
    }
}
