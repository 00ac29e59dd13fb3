use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

use crate::config::CompletionConfig;
use super::types::{ApiErrorEnvelope, ApiRequest, ApiResponse, ChatRequest, CompletionError};

#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: ChatRequest) -> Result<String, CompletionError>;
}

#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
}

impl OpenAiBackend {
    pub fn new(api_key: impl Into<String>, api_base: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &CompletionConfig) -> Option<Self> {
        let api_key = config.resolve_api_key()?;
        Some(Self::new(api_key, config.api_base.clone(), Duration::from_secs(config.timeout_secs)))
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(&self, request: ChatRequest) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.api_base);
        let payload = ApiRequest::from(&request);

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&text)
                .map(|envelope| envelope.error.message)
                .unwrap_or(text);
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ApiResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(CompletionError::EmptyResponse)
    }
}
