use std::collections::HashSet;
use std::sync::Arc;

use crate::adapter::ProviderAdapter;
use crate::chat::ChatSession;
use crate::config::Placeholders;
use crate::error::Result;
use crate::models::{AnalysisResult, Provider, VocabularyItem, WritingCritique};
use crate::parser::{parse_array, parse_object};
use crate::prompts;
use crate::sanitize::{analysis_from_object, critique_from_object, sanitize};
use crate::schema::ResponseShape;

/// Stateless study tasks: prompt, dispatch, parse, sanitize.
pub struct StudyTasks {
    adapter: Arc<ProviderAdapter>,
    placeholders: Placeholders,
}

impl StudyTasks {
    pub fn new(adapter: Arc<ProviderAdapter>, placeholders: Placeholders) -> Self {
        Self {
            adapter,
            placeholders,
        }
    }

    pub async fn generate_by_topic(
        &self,
        topic: &str,
        count: usize,
        difficulty: &str,
        provider: Provider,
    ) -> Result<Vec<VocabularyItem>> {
        tracing::info!(%provider, topic, count, difficulty, "Generating vocabulary by topic");
        let prompt = prompts::topic_prompt(topic, count, difficulty);
        self.vocabulary(provider, &prompt).await
    }

    pub async fn generate_from_list(
        &self,
        words: &[String],
        provider: Provider,
    ) -> Result<Vec<VocabularyItem>> {
        // Credentials are checked even when there is nothing to send
        self.adapter.credentials().resolve(provider)?;
        if words.is_empty() {
            tracing::debug!("Empty word list - nothing to generate");
            return Ok(Vec::new());
        }
        tracing::info!(%provider, words = words.len(), "Generating vocabulary from word list");
        let prompt = prompts::word_list_prompt(words);
        self.vocabulary(provider, &prompt).await
    }

    async fn vocabulary(&self, provider: Provider, prompt: &str) -> Result<Vec<VocabularyItem>> {
        let raw = self
            .adapter
            .complete(
                provider,
                prompts::VOCABULARY_SYSTEM,
                prompt,
                ResponseShape::VocabularyList,
            )
            .await?;
        let items = sanitize(&parse_array(&raw), &self.placeholders);
        tracing::info!(items = items.len(), "Vocabulary generated");
        Ok(items)
    }

    pub async fn analyze_classical_text(
        &self,
        text: &str,
        provider: Provider,
    ) -> Result<AnalysisResult> {
        tracing::info!(%provider, chars = text.chars().count(), "Analyzing classical text");
        let raw = self
            .adapter
            .complete(
                provider,
                prompts::CLASSICAL_SYSTEM,
                &prompts::classical_prompt(text),
                ResponseShape::ClassicalAnalysis,
            )
            .await?;
        Ok(analysis_from_object(&parse_object(&raw), &self.placeholders))
    }

    pub async fn analyze_writing(
        &self,
        text: &str,
        context: Option<&str>,
        provider: Provider,
    ) -> Result<WritingCritique> {
        tracing::info!(%provider, chars = text.chars().count(), "Analyzing writing");
        let raw = self
            .adapter
            .complete(
                provider,
                prompts::WRITING_SYSTEM,
                &prompts::writing_prompt(text, context),
                ResponseShape::WritingCritique,
            )
            .await?;
        Ok(critique_from_object(&parse_object(&raw), &self.placeholders))
    }

    /// Opens a tutoring chat bound to `provider` for its whole lifetime.
    pub fn start_chat(&self, provider: Provider) -> ChatSession {
        ChatSession::new(Arc::clone(&self.adapter), provider, prompts::CHAT_SYSTEM)
    }
}

/// Splits free-form word input on newlines, commas (ASCII and full-width),
/// enumeration commas and semicolons. Blanks and repeats are dropped.
pub fn split_word_list(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.split(['\n', '\r', ',', '，', '、', ';', '；'])
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .filter(|w| seen.insert(w.to_string()))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::test_support::adapter;
    use crate::error::StudyError;
    use crate::gemini::{Candidate, Content, GenerateContentResponse, MockGeminiApi};
    use crate::models::ChatResponse;
    use crate::transport::MockTransport;

    fn chat_response(content: &str) -> ChatResponse {
        serde_json::from_value(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        }))
        .unwrap()
    }

    fn gemini_response(text: &str) -> GenerateContentResponse {
        GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(Content::text(Some("model"), text)),
            }],
        }
    }

    fn deepseek_tasks(reply: &'static str) -> StudyTasks {
        let mut deepseek = MockTransport::new();
        deepseek
            .expect_chat()
            .times(1)
            .returning(move |_, _| Ok(chat_response(reply)));
        let adapter = adapter(
            MockGeminiApi::new(),
            deepseek,
            &[("DEEPSEEK_API_KEY", "sk-test")],
        );
        StudyTasks::new(Arc::new(adapter), Placeholders::default())
    }

    #[tokio::test]
    async fn test_generate_by_topic_deepseek_end_to_end() {
        let tasks = deepseek_tasks(
            r#"{"items":[{"term":"函件","definition":"","mnemonic":"記憶法A"}]}"#,
        );
        let items = tasks
            .generate_by_topic("商業公文", 1, "中等", Provider::DeepSeek)
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.word, "函件");
        assert_eq!(item.definition, "AI 未提供解釋");
        assert_eq!(item.mnemonic, "記憶法A");
        assert_eq!(item.example_sentence, "AI 未提供例句");
        assert!(item.tags.is_empty());
    }

    #[tokio::test]
    async fn test_generate_by_topic_prompt_embeds_parameters() {
        let mut deepseek = MockTransport::new();
        deepseek
            .expect_chat()
            .withf(|_, req| {
                let user = &req.messages[1].content;
                user.contains("商業公文") && user.contains('3') && user.contains("困難")
            })
            .times(1)
            .returning(|_, _| Ok(chat_response("[]")));
        let adapter = adapter(
            MockGeminiApi::new(),
            deepseek,
            &[("DEEPSEEK_API_KEY", "sk-test")],
        );
        let tasks = StudyTasks::new(Arc::new(adapter), Placeholders::default());
        let items = tasks
            .generate_by_topic("商業公文", 3, "困難", Provider::DeepSeek)
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_missing_deepseek_key_fails_before_network() {
        let mut deepseek = MockTransport::new();
        deepseek.expect_chat().times(0);
        let adapter = adapter(MockGeminiApi::new(), deepseek, &[]);
        let tasks = StudyTasks::new(Arc::new(adapter), Placeholders::default());

        let err = tasks
            .analyze_writing("我昨天去了學校。", None, Provider::DeepSeek)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StudyError::MissingCredential {
                provider: Provider::DeepSeek
            }
        ));
    }

    #[tokio::test]
    async fn test_generate_from_list_gemini_fenced_reply() {
        let mut gemini = MockGeminiApi::new();
        gemini
            .expect_generate()
            .withf(|_, _, req| {
                let prompt = req.contents[0].parts[0].text.as_deref().unwrap_or_default();
                prompt.contains("斟酌") && prompt.contains("醞釀")
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(gemini_response(
                    "```json\n[{\"word\":\"斟酌\",\"definition\":\"考慮\",\"exampleSentence\":[\"再三斟酌。\"],\"mnemonic\":\"倒酒要斟酌\",\"tags\":[\"動詞\"]},{\"word\":\"醞釀\"}]\n```",
                ))
            });
        let adapter = adapter(gemini, MockTransport::new(), &[]);
        let tasks = StudyTasks::new(Arc::new(adapter), Placeholders::default());

        let words = vec!["斟酌".to_string(), "醞釀".to_string()];
        let items = tasks
            .generate_from_list(&words, Provider::Gemini)
            .await
            .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].example_sentence, "再三斟酌。");
        assert_eq!(items[0].tags, vec!["動詞".to_string()]);
        assert_eq!(items[1].word, "醞釀");
        assert_eq!(items[1].mnemonic, "AI 未提供記憶法");
    }

    #[tokio::test]
    async fn test_generate_from_empty_list_skips_backend() {
        let mut gemini = MockGeminiApi::new();
        gemini.expect_generate().times(0);
        let adapter = adapter(gemini, MockTransport::new(), &[]);
        let tasks = StudyTasks::new(Arc::new(adapter), Placeholders::default());
        let items = tasks.generate_from_list(&[], Provider::Gemini).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_generate_from_empty_list_without_deepseek_key() {
        let mut deepseek = MockTransport::new();
        deepseek.expect_chat().times(0);
        let adapter = adapter(MockGeminiApi::new(), deepseek, &[]);
        let tasks = StudyTasks::new(Arc::new(adapter), Placeholders::default());

        let err = tasks
            .generate_from_list(&[], Provider::DeepSeek)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StudyError::MissingCredential {
                provider: Provider::DeepSeek
            }
        ));
    }

    #[tokio::test]
    async fn test_analyze_classical_text_array_wrapped() {
        let tasks = deepseek_tasks(
            r#"[{"translation":"學習並時常溫習","origin":"論語·學而","vocabulary":[{"character":"說","meaning":"同悅"}]}]"#,
        );
        let result = tasks
            .analyze_classical_text("學而時習之，不亦說乎", Provider::DeepSeek)
            .await
            .unwrap();
        assert_eq!(result.translation, "學習並時常溫習");
        assert_eq!(result.origin, "論語·學而");
        assert_eq!(result.usage, "");
        assert_eq!(result.vocabulary.len(), 1);
        assert_eq!(result.vocabulary[0].word, "說");
        assert_eq!(result.vocabulary[0].definition, "同悅");
    }

    #[tokio::test]
    async fn test_analyze_writing_malformed_reply_degrades() {
        let tasks = deepseek_tasks("I'm sorry, something went wrong.");
        let critique = tasks
            .analyze_writing("我昨天去了學校。", Some("日記"), Provider::DeepSeek)
            .await
            .unwrap();
        assert_eq!(critique, WritingCritique::default());
    }

    #[test]
    fn test_split_word_list() {
        let words = split_word_list("斟酌，醞釀、斟酌\n apple, banana;;\r\n 蘋果；");
        assert_eq!(words, vec!["斟酌", "醞釀", "apple", "banana", "蘋果"]);
        assert!(split_word_list(" \n , ").is_empty());
    }
}
