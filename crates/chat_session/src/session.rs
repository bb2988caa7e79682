//! One conversation with one model.

use crate::reasoning::{split_reasoning, GenerationResult, REASONING_OPEN};
use providers::InferenceBackend;
use shared::agent_api::ChatMessage;
use shared::{ChatError, DEFAULT_DIRECTIVE};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A completed exchange. Reasoning is never kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    user_message: String,
    assistant_answer: String,
}

impl Turn {
    pub fn user_message(&self) -> &str {
        &self.user_message
    }

    pub fn assistant_answer(&self) -> &str {
        &self.assistant_answer
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// System prompt, sent once at the start of a conversation
    pub directive: Option<String>,
    /// Whether the model's template opens a reasoning segment
    pub supports_reasoning: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            directive: Some(DEFAULT_DIRECTIVE.to_string()),
            supports_reasoning: false,
        }
    }
}

/// Check whether a backend's chat template opens a reasoning segment.
///
/// Renders a one-line greeting and looks for the opening marker in the
/// result. This is a heuristic over template text and may disagree with
/// what the model actually emits. Template errors count as "no".
pub fn capability_probe(backend: &dyn InferenceBackend) -> bool {
    match backend.render_prompt(&[ChatMessage::user("hello")]) {
        Ok(prompt) => prompt.contains(REASONING_OPEN),
        Err(e) => {
            debug!(backend = backend.name(), error = %e, "capability probe failed");
            false
        }
    }
}

/// Turn-taking with a single backend.
///
/// `send` takes `&mut self`, so a session has at most one request in
/// flight, and the transcript only changes once a reply is complete.
pub struct ChatSession {
    id: Uuid,
    backend: Arc<dyn InferenceBackend>,
    config: SessionConfig,
    transcript: Vec<Turn>,
}

impl ChatSession {
    /// Start a conversation with the default persona.
    pub fn new(backend: Arc<dyn InferenceBackend>) -> Self {
        Self::with_directive(backend, Some(DEFAULT_DIRECTIVE.to_string()))
    }

    pub fn with_directive(backend: Arc<dyn InferenceBackend>, directive: Option<String>) -> Self {
        let supports_reasoning = capability_probe(backend.as_ref());
        let id = Uuid::new_v4();
        info!(
            session = %id,
            backend = backend.name(),
            supports_reasoning,
            "chat session started"
        );
        Self {
            id,
            backend,
            config: SessionConfig {
                directive,
                supports_reasoning,
            },
            transcript: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn directive(&self) -> Option<&str> {
        self.config.directive.as_deref()
    }

    pub fn supports_reasoning(&self) -> bool {
        self.config.supports_reasoning
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    /// Re-run the reasoning probe against the backend.
    pub fn capability_probe(&self) -> bool {
        capability_probe(self.backend.as_ref())
    }

    /// Messages for the next request: the directive (only on an empty
    /// transcript), every prior turn in order, then `user_message`.
    pub fn build_request(&self, user_message: &str, directive: Option<&str>) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.transcript.len() * 2 + 2);

        if self.transcript.is_empty() {
            if let Some(directive) = directive.filter(|d| !d.is_empty()) {
                messages.push(ChatMessage::system(directive));
            }
        }

        for turn in &self.transcript {
            messages.push(ChatMessage::user(turn.user_message.as_str()));
            messages.push(ChatMessage::assistant(turn.assistant_answer.as_str()));
        }

        messages.push(ChatMessage::user(user_message));
        messages
    }

    /// Run one turn and record it on success.
    ///
    /// Any backend failure is returned as [`ChatError::Backend`] and leaves
    /// the transcript untouched, so the same message can be sent again.
    pub async fn send(
        &mut self,
        user_message: &str,
        directive: Option<&str>,
    ) -> Result<GenerationResult, ChatError> {
        let messages = self.build_request(user_message, directive);
        debug!(
            session = %self.id,
            messages = messages.len(),
            turn = self.transcript.len() + 1,
            "sending turn"
        );

        let prompt = self.backend.render_prompt(&messages).map_err(|e| {
            warn!(session = %self.id, error = %e, "prompt rendering failed");
            ChatError::Backend(e)
        })?;
        let raw = self.backend.generate(&prompt).await.map_err(|e| {
            warn!(session = %self.id, error = %e, "generation failed");
            ChatError::Backend(e)
        })?;

        let result = split_reasoning(&raw);
        self.transcript.push(Turn {
            user_message: user_message.to_string(),
            assistant_answer: result.answer.clone(),
        });
        debug!(
            session = %self.id,
            reasoning_chars = result.reasoning.len(),
            answer_chars = result.answer.len(),
            "turn complete"
        );
        Ok(result)
    }

    /// [`send`](Self::send) with the session's own directive.
    pub async fn chat(&mut self, user_message: &str) -> Result<GenerationResult, ChatError> {
        let directive = self.config.directive.clone();
        self.send(user_message, directive.as_deref()).await
    }

    /// Forget the conversation so far.
    pub fn reset(&mut self) {
        if !self.transcript.is_empty() {
            debug!(session = %self.id, turns = self.transcript.len(), "transcript cleared");
        }
        self.transcript.clear();
    }

    /// Replace the system prompt. The prompt defines the conversation, so
    /// the transcript is always cleared.
    pub fn update_directive(&mut self, directive: impl Into<String>) {
        self.config.directive = Some(directive.into());
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedBackend;

    fn session(backend: ScriptedBackend) -> (ChatSession, Arc<ScriptedBackend>) {
        let backend = Arc::new(backend);
        (ChatSession::new(backend.clone()), backend)
    }

    #[tokio::test]
    async fn test_transcript_grows_in_call_order() {
        let (mut session, _) = session(
            ScriptedBackend::new()
                .reply("one")
                .reply("two")
                .reply("three"),
        );

        for msg in ["a", "b", "c"] {
            session.chat(msg).await.unwrap();
        }

        let turns: Vec<(&str, &str)> = session
            .transcript()
            .iter()
            .map(|t| (t.user_message(), t.assistant_answer()))
            .collect();
        assert_eq!(turns, vec![("a", "one"), ("b", "two"), ("c", "three")]);
    }

    #[tokio::test]
    async fn test_directive_only_on_first_turn() {
        let (mut session, backend) = session(ScriptedBackend::new().reply("hi").reply("fine"));

        session.send("hello", Some("Be terse.")).await.unwrap();
        session.send("how are you?", Some("Be terse.")).await.unwrap();

        let requests = backend.requests();
        assert_eq!(
            requests[0],
            vec![ChatMessage::system("Be terse."), ChatMessage::user("hello")]
        );
        assert_eq!(
            requests[1],
            vec![
                ChatMessage::user("hello"),
                ChatMessage::assistant("hi"),
                ChatMessage::user("how are you?"),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_directive_is_not_sent() {
        let (mut session, backend) = session(ScriptedBackend::new().reply("x").reply("y"));

        session.send("a", Some("")).await.unwrap();
        session.reset();
        session.send("b", None).await.unwrap();

        let requests = backend.requests();
        assert_eq!(requests[0], vec![ChatMessage::user("a")]);
        assert_eq!(requests[1], vec![ChatMessage::user("b")]);
    }

    #[tokio::test]
    async fn test_whitespace_directive_is_sent() {
        let (mut session, backend) = session(ScriptedBackend::new().reply("x"));

        session.send("a", Some("   ")).await.unwrap();

        assert_eq!(
            backend.requests()[0],
            vec![ChatMessage::system("   "), ChatMessage::user("a")]
        );
    }

    #[tokio::test]
    async fn test_chat_uses_default_persona() {
        let (mut session, backend) = session(ScriptedBackend::new().reply("ok"));
        session.chat("hi").await.unwrap();

        assert_eq!(backend.requests()[0][0], ChatMessage::system(DEFAULT_DIRECTIVE));
    }

    #[tokio::test]
    async fn test_reasoning_is_split_and_not_persisted() {
        let (mut session, backend) = session(
            ScriptedBackend::new()
                .reply("<think>greet back</think>\n\nHello!")
                .reply("Sure."),
        );

        let result = session.chat("hi").await.unwrap();
        assert_eq!(result.reasoning, "greet back");
        assert_eq!(result.answer, "Hello!");

        session.chat("again").await.unwrap();
        let second = &backend.requests()[1];
        assert!(second.iter().all(|m| !m.content.contains("greet back")));
        assert_eq!(session.transcript()[0].assistant_answer(), "Hello!");
    }

    #[tokio::test]
    async fn test_lone_marker_records_empty_answer() {
        let (mut session, _) = session(ScriptedBackend::new().reply("</think>"));

        let result = session.chat("hi").await.unwrap();
        assert_eq!(result, GenerationResult::default());
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript()[0].assistant_answer(), "");
    }

    #[tokio::test]
    async fn test_reset_then_send() {
        let (mut session, backend) = session(
            ScriptedBackend::new()
                .reply("1")
                .reply("2")
                .reply("3"),
        );
        session.chat("a").await.unwrap();
        session.chat("b").await.unwrap();

        session.reset();
        session.reset();
        assert!(session.transcript().is_empty());

        session.chat("hi").await.unwrap();
        assert_eq!(session.transcript().len(), 1);
        // a fresh conversation gets the directive again
        assert_eq!(backend.requests()[2][0].role, "system");
    }

    #[tokio::test]
    async fn test_update_directive_clears_transcript() {
        let (mut session, backend) = session(ScriptedBackend::new().reply("1").reply("2"));
        session.chat("a").await.unwrap();

        session.update_directive("You are a pirate.");
        assert!(session.transcript().is_empty());
        assert_eq!(session.directive(), Some("You are a pirate."));

        session.chat("b").await.unwrap();
        assert_eq!(backend.requests()[1][0], ChatMessage::system("You are a pirate."));
    }

    #[tokio::test]
    async fn test_cleared_directive_sends_no_system_message() {
        let (mut session, backend) = session(ScriptedBackend::new().reply("1").reply("2"));
        session.chat("a").await.unwrap();

        session.update_directive("");
        session.chat("b").await.unwrap();

        assert_eq!(session.transcript().len(), 1);
        assert_eq!(backend.requests()[1], vec![ChatMessage::user("b")]);
    }

    #[tokio::test]
    async fn test_backend_failure_leaves_transcript_unchanged() {
        let (mut session, _) = session(
            ScriptedBackend::new()
                .reply("first")
                .fail("CUDA out of memory")
                .reply("second"),
        );
        session.chat("a").await.unwrap();
        let before = session.transcript().to_vec();

        let err = session.chat("b").await.unwrap_err();
        assert!(matches!(err, ChatError::Backend(_)));
        assert!(err.to_string().contains("CUDA out of memory"));
        assert_eq!(session.transcript(), before.as_slice());

        // the user can resend the same message
        session.chat("b").await.unwrap();
        assert_eq!(session.transcript().len(), 2);
        assert_eq!(session.transcript()[1].assistant_answer(), "second");
    }

    #[tokio::test]
    async fn test_render_failure_is_backend_error() {
        let (mut session, _) = session(ScriptedBackend::new().with_broken_template().reply("x"));

        let err = session.chat("hi").await.unwrap_err();
        assert!(matches!(err, ChatError::Backend(_)));
        assert!(session.transcript().is_empty());
    }

    #[test]
    fn test_probe_detects_reasoning_template() {
        let (session, _) = session(ScriptedBackend::new().with_reasoning_template());
        assert!(session.supports_reasoning());
        assert!(session.capability_probe());
    }

    #[test]
    fn test_probe_plain_template() {
        let (session, _) = session(ScriptedBackend::new());
        assert!(!session.supports_reasoning());
    }

    #[test]
    fn test_probe_swallows_template_errors() {
        let backend = ScriptedBackend::new().with_broken_template();
        assert!(!capability_probe(&backend));
    }

    #[test]
    fn test_probe_does_not_touch_requests() {
        let (session, backend) = session(ScriptedBackend::new().with_reasoning_template());
        assert!(session.transcript().is_empty());
        assert!(backend.requests().is_empty());
    }
}
