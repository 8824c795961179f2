//! Stateful tutoring conversation bound to one provider.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::Instrument;
use uuid::Uuid;

use crate::adapter::ProviderAdapter;
use crate::error::Result;
use crate::models::{ChatMessage, Provider};

/// Append-only conversation. Turns are serialized: the history lock is held
/// from appending the user message until the reply is appended, so a second
/// `send_message` on the same session waits for the first to finish.
pub struct ChatSession {
    id: Uuid,
    provider: Provider,
    system_instruction: String,
    adapter: Arc<ProviderAdapter>,
    history: Mutex<Vec<ChatMessage>>,
}

impl ChatSession {
    pub fn new(
        adapter: Arc<ProviderAdapter>,
        provider: Provider,
        system_instruction: impl Into<String>,
    ) -> Self {
        let id = Uuid::new_v4();
        tracing::info!(session = %id, %provider, "Chat session opened");
        Self {
            id,
            provider,
            system_instruction: system_instruction.into(),
            adapter,
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Sends one user turn and returns the assistant reply.
    ///
    /// On failure the user message stays in history and no reply is recorded.
    pub async fn send_message(&self, text: &str) -> Result<String> {
        let mut history = self.history.lock().await;
        history.push(ChatMessage::user(text));

        let span = tracing::info_span!("chat_turn", session = %self.id, turn = history.len());
        let reply = match self
            .adapter
            .converse(self.provider, &self.system_instruction, &history)
            .instrument(span)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("Chat turn failed: {}", e);
                return Err(e);
            }
        };

        history.push(ChatMessage::assistant(reply.clone()));
        Ok(reply)
    }

    /// Snapshot of the conversation so far.
    pub async fn history(&self) -> Vec<ChatMessage> {
        self.history.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::test_support::adapter;
    use crate::error::StudyError;
    use crate::gemini::{Candidate, Content, GenerateContentResponse, MockGeminiApi};
    use crate::models::{ChatResponse, ChatRole};
    use crate::transport::MockTransport;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn chat_response(content: &str) -> ChatResponse {
        serde_json::from_value(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_two_turns_produce_ordered_history() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let mut deepseek = MockTransport::new();
        deepseek.expect_chat().times(2).returning(move |_, req| {
            let n = seen.fetch_add(1, Ordering::SeqCst);
            // system + replayed history
            assert_eq!(req.messages.len(), 2 + n * 2);
            assert_eq!(req.messages[0].role, ChatRole::System);
            assert!(req.response_format.is_none());
            Ok(chat_response(&format!("reply {n}")))
        });
        let adapter = adapter(
            MockGeminiApi::new(),
            deepseek,
            &[("DEEPSEEK_API_KEY", "sk-test")],
        );
        let session = ChatSession::new(Arc::new(adapter), Provider::DeepSeek, "tutor");

        assert_eq!(session.send_message("first").await.unwrap(), "reply 0");
        assert_eq!(session.send_message("second").await.unwrap(), "reply 1");

        let history = session.history().await;
        let roles: Vec<ChatRole> = history.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                ChatRole::User,
                ChatRole::Assistant,
                ChatRole::User,
                ChatRole::Assistant
            ]
        );
        assert_eq!(history[2].content, "second");
        assert_eq!(history[3].content, "reply 1");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_turn_keeps_user_message() {
        let mut gemini = MockGeminiApi::new();
        gemini.expect_generate().times(1).returning(|_, _, _| {
            Err(StudyError::ProviderHttp {
                provider: Provider::Gemini,
                status: 500,
                body: "internal".to_string(),
            })
        });
        let adapter = adapter(gemini, MockTransport::new(), &[("GEMINI_API_KEY", "g")]);
        let session = ChatSession::new(Arc::new(adapter), Provider::Gemini, "tutor");

        let err = session.send_message("你好").await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(session.history().await, vec![ChatMessage::user("你好")]);
    }

    #[tokio::test]
    async fn test_missing_credential_turn() {
        let mut deepseek = MockTransport::new();
        deepseek.expect_chat().times(0);
        let adapter = adapter(MockGeminiApi::new(), deepseek, &[]);
        let session = ChatSession::new(Arc::new(adapter), Provider::DeepSeek, "tutor");

        assert!(matches!(
            session.send_message("hi").await,
            Err(StudyError::MissingCredential { .. })
        ));
        assert_eq!(session.history().await.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_sends_are_serialized() {
        let mut gemini = MockGeminiApi::new();
        gemini.expect_generate().times(2).returning(|_, _, req| {
            let last = req
                .contents
                .last()
                .and_then(|c| c.parts.first())
                .and_then(|p| p.text.clone())
                .unwrap_or_default();
            Ok(GenerateContentResponse {
                candidates: vec![Candidate {
                    content: Some(Content::text(Some("model"), format!("echo {last}"))),
                }],
            })
        });
        let adapter = adapter(gemini, MockTransport::new(), &[("GEMINI_API_KEY", "g")]);
        let session = Arc::new(ChatSession::new(
            Arc::new(adapter),
            Provider::Gemini,
            "tutor",
        ));

        let (a, b) = tokio::join!(session.send_message("a"), session.send_message("b"));
        a.unwrap();
        b.unwrap();

        let history = session.history().await;
        assert_eq!(history.len(), 4);
        for pair in history.chunks(2) {
            assert_eq!(pair[0].role, ChatRole::User);
            assert_eq!(pair[1].role, ChatRole::Assistant);
            assert_eq!(pair[1].content, format!("echo {}", pair[0].content));
        }
    }
}
