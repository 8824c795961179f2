pub mod adapter;
pub mod chat;
pub mod config;
pub mod credentials;
pub mod error;
pub mod gemini;
pub mod models;
pub mod parser;
pub mod prompts;
pub mod sanitize;
pub mod schema;
pub mod tasks;
pub mod transport;

use std::sync::Arc;

use crate::adapter::ProviderAdapter;
use crate::chat::ChatSession;
use crate::config::Config;
use crate::error::Result;
use crate::models::{AnalysisResult, Provider, VocabularyItem, WritingCritique};
use crate::tasks::StudyTasks;

pub use crate::error::StudyError;
pub use crate::tasks::split_word_list;

/// Entry point wiring configuration, credentials and both backends together.
pub struct StudyService {
    tasks: StudyTasks,
    adapter: Arc<ProviderAdapter>,
    default_provider: Provider,
}

impl StudyService {
    pub fn new(cfg: &Config) -> Self {
        let adapter = Arc::new(ProviderAdapter::from_config(cfg));
        Self::with_adapter(cfg, adapter)
    }

    pub fn with_adapter(cfg: &Config, adapter: Arc<ProviderAdapter>) -> Self {
        Self {
            tasks: StudyTasks::new(Arc::clone(&adapter), cfg.placeholders.clone()),
            adapter,
            default_provider: cfg.default_provider,
        }
    }

    pub fn default_provider(&self) -> Provider {
        self.default_provider
    }

    /// Supplies a key at runtime (e.g. entered by the user). Environment keys still win.
    pub fn inject_api_key(&self, provider: Provider, key: impl Into<String>) {
        self.adapter.credentials().inject(provider, key);
    }

    pub async fn generate_by_topic(
        &self,
        topic: &str,
        count: usize,
        difficulty: &str,
        provider: Provider,
    ) -> Result<Vec<VocabularyItem>> {
        self.tasks
            .generate_by_topic(topic, count, difficulty, provider)
            .await
    }

    pub async fn generate_from_list(
        &self,
        words: &[String],
        provider: Provider,
    ) -> Result<Vec<VocabularyItem>> {
        self.tasks.generate_from_list(words, provider).await
    }

    pub async fn analyze_classical_text(
        &self,
        text: &str,
        provider: Provider,
    ) -> Result<AnalysisResult> {
        self.tasks.analyze_classical_text(text, provider).await
    }

    pub async fn analyze_writing(
        &self,
        text: &str,
        context: Option<&str>,
        provider: Provider,
    ) -> Result<WritingCritique> {
        self.tasks.analyze_writing(text, context, provider).await
    }

    pub fn start_chat(&self, provider: Provider) -> ChatSession {
        self.tasks.start_chat(provider)
    }
}
