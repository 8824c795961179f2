use std::sync::Arc;

use crate::config::Config;
use crate::credentials::CredentialResolver;
use crate::error::Result;
use crate::gemini::{
    Content, GeminiApi, GeminiTransport, GenerateContentRequest, GenerationConfig,
};
use crate::models::{ChatMessage, ChatRequest, Provider};
use crate::schema::ResponseShape;
use crate::transport::{DeepSeekTransport, Transport};

#[derive(Debug, Clone)]
struct ModelSettings {
    model: String,
    temperature: f32,
}

/// Sends a prompt pair to whichever backend the caller selects and returns the raw model text.
pub struct ProviderAdapter {
    gemini: Arc<dyn GeminiApi>,
    deepseek: Arc<dyn Transport>,
    credentials: Arc<CredentialResolver>,
    gemini_settings: ModelSettings,
    deepseek_settings: ModelSettings,
}

impl ProviderAdapter {
    pub fn new(
        cfg: &Config,
        gemini: Arc<dyn GeminiApi>,
        deepseek: Arc<dyn Transport>,
        credentials: Arc<CredentialResolver>,
    ) -> Self {
        Self {
            gemini,
            deepseek,
            credentials,
            gemini_settings: ModelSettings {
                model: cfg.gemini.model.clone(),
                temperature: cfg.gemini.temperature,
            },
            deepseek_settings: ModelSettings {
                model: cfg.deepseek.model.clone(),
                temperature: cfg.deepseek.temperature,
            },
        }
    }

    /// Adapter wired to the real HTTP transports.
    pub fn from_config(cfg: &Config) -> Self {
        let client = cfg.http_client();
        Self::new(
            cfg,
            Arc::new(GeminiTransport::new(client.clone(), &cfg.gemini.base_url)),
            Arc::new(DeepSeekTransport::new(client, &cfg.deepseek.base_url)),
            Arc::new(CredentialResolver::from_config(cfg)),
        )
    }

    pub fn credentials(&self) -> &CredentialResolver {
        &self.credentials
    }

    /// One structured request. Gemini gets a response schema; DeepSeek gets JSON-object mode.
    pub async fn complete(
        &self,
        provider: Provider,
        system_instruction: &str,
        prompt: &str,
        shape: ResponseShape,
    ) -> Result<String> {
        tracing::info!(%provider, ?shape, "Dispatching structured request");
        match provider {
            Provider::Gemini => {
                let api_key = self.credentials.resolve(provider)?;
                let req = GenerateContentRequest {
                    contents: vec![Content::text(Some("user"), prompt)],
                    system_instruction: Some(Content::text(None, system_instruction)),
                    generation_config: Some(GenerationConfig {
                        temperature: Some(self.gemini_settings.temperature),
                        response_mime_type: Some("application/json".to_string()),
                        response_schema: Some(shape.gemini_schema()),
                    }),
                };
                let response = self
                    .gemini
                    .generate(&api_key, &self.gemini_settings.model, &req)
                    .await?;
                Ok(response
                    .text()
                    .unwrap_or_else(|| shape.empty_literal().to_string()))
            }
            Provider::DeepSeek => {
                let api_key = self.credentials.resolve(provider)?;
                let req = ChatRequest {
                    model: self.deepseek_settings.model.clone(),
                    messages: vec![
                        ChatMessage::system(format!(
                            "{system_instruction}\n\n{}",
                            shape.json_hint()
                        )),
                        ChatMessage::user(prompt),
                    ],
                    temperature: self.deepseek_settings.temperature,
                    response_format: Some(serde_json::json!({"type": "json_object"})),
                };
                let response = self.deepseek.chat(&api_key, &req).await?;
                Ok(response
                    .first_content()
                    .unwrap_or_else(|| shape.empty_literal())
                    .to_string())
            }
        }
    }

    /// Free-text reply over a whole conversation. Both backends are sent the full history.
    pub async fn converse(
        &self,
        provider: Provider,
        system_instruction: &str,
        history: &[ChatMessage],
    ) -> Result<String> {
        tracing::info!(%provider, turns = history.len(), "Dispatching chat turn");
        match provider {
            Provider::Gemini => {
                let api_key = self.credentials.resolve(provider)?;
                let req = GenerateContentRequest {
                    contents: history.iter().map(Content::from_message).collect(),
                    system_instruction: Some(Content::text(None, system_instruction)),
                    generation_config: Some(GenerationConfig {
                        temperature: Some(self.gemini_settings.temperature),
                        ..GenerationConfig::default()
                    }),
                };
                let response = self
                    .gemini
                    .generate(&api_key, &self.gemini_settings.model, &req)
                    .await?;
                Ok(response.text().unwrap_or_default())
            }
            Provider::DeepSeek => {
                let api_key = self.credentials.resolve(provider)?;
                let mut messages = Vec::with_capacity(history.len() + 1);
                messages.push(ChatMessage::system(system_instruction));
                messages.extend(history.iter().cloned());
                let req = ChatRequest {
                    model: self.deepseek_settings.model.clone(),
                    messages,
                    temperature: self.deepseek_settings.temperature,
                    response_format: None,
                };
                let response = self.deepseek.chat(&api_key, &req).await?;
                Ok(response.first_content().unwrap_or_default().to_string())
            }
        }
    }
}
