use async_trait::async_trait;
use reqwest::Client;

use crate::error::{Result, StudyError};
use crate::models::{ChatRequest, ChatResponse, Provider};

#[cfg(test)]
use mockall::automock;

/// Chat-completions transport. One call, no retries.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn chat(&self, api_key: &str, req: &ChatRequest) -> Result<ChatResponse>;
}

pub struct DeepSeekTransport {
    client: Client,
    endpoint: String,
}

impl DeepSeekTransport {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl Transport for DeepSeekTransport {
    async fn chat(&self, api_key: &str, req: &ChatRequest) -> Result<ChatResponse> {
        tracing::debug!(
            model = %req.model,
            messages = req.messages.len(),
            json_mode = req.response_format.is_some(),
            "Sending chat-completions request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(req)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(status = status.as_u16(), "DeepSeek API error");
            return Err(StudyError::ProviderHttp {
                provider: Provider::DeepSeek,
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
