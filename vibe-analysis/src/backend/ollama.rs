//! Ollama `/api/generate` client.
//!
//! Talks to a local Ollama instance with streaming disabled, so one request
//! yields one reply.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vibe_common::Result;

use super::{http_client, status_error, BackendError, CompletionClient, GenerationParams};

/// Client for a local Ollama server.
pub struct OllamaClient {
    base_url: String,
    model: String,
    timeout: Duration,
    client: Client,
}

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f64,
    num_predict: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            timeout,
            client: http_client(timeout)?,
        })
    }
}

#[async_trait]
impl CompletionClient for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> std::result::Result<String, BackendError> {
        let request = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: params.temperature,
                num_predict: params.max_tokens,
                top_p: params.top_p,
                top_k: params.top_k,
            },
        };

        let url = format!("{}/api/generate", self.base_url);
        debug!(url = %url, model = %self.model, "Sending Ollama generate request");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(e, self.timeout))?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let result: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| BackendError::from_reqwest(e, self.timeout))?;

        Ok(result.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = OllamaGenerateRequest {
            model: "deepseek-r1",
            prompt: "hi",
            stream: false,
            options: OllamaOptions {
                temperature: 0.1,
                num_predict: 128,
                top_p: None,
                top_k: None,
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "model": "deepseek-r1",
                "prompt": "hi",
                "stream": false,
                "options": {"temperature": 0.1, "num_predict": 128}
            })
        );
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = OllamaClient::new("http://localhost:11434/", "m", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url, "http://localhost:11434");
        assert_eq!(client.name(), "ollama");
    }
}
