use anyhow::Result;
use async_trait::async_trait;
use shared::agent_api::ChatMessage;

/// A model that can template a conversation and generate a reply.
///
/// Both operations may fail for implementation-defined reasons; callers
/// treat any error as a backend failure.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Human-readable model name, used in logs and window titles
    fn name(&self) -> &str;

    /// Render `messages` into the exact prompt text the model expects,
    /// including the opening of the assistant turn.
    fn render_prompt(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Generate raw text continuing `rendered_prompt`.
    async fn generate(&self, rendered_prompt: &str) -> Result<String>;
}
