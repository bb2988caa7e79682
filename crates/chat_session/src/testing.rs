//! In-memory backend with scripted replies.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use providers::InferenceBackend;
use shared::agent_api::ChatMessage;
use std::collections::VecDeque;

pub struct ScriptedBackend {
    opens_reasoning: bool,
    broken_template: bool,
    replies: Mutex<VecDeque<Result<String, String>>>,
    rendered: Mutex<Option<Vec<ChatMessage>>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            opens_reasoning: false,
            broken_template: false,
            replies: Mutex::new(VecDeque::new()),
            rendered: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Generation prompt ends with an opening reasoning marker.
    pub fn with_reasoning_template(mut self) -> Self {
        self.opens_reasoning = true;
        self
    }

    /// Every render fails.
    pub fn with_broken_template(mut self) -> Self {
        self.broken_template = true;
        self
    }

    pub fn reply(self, text: &str) -> Self {
        self.replies.lock().push_back(Ok(text.to_string()));
        self
    }

    pub fn fail(self, error: &str) -> Self {
        self.replies.lock().push_back(Err(error.to_string()));
        self
    }

    /// Conversations that reached `generate`, in call order.
    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl InferenceBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn render_prompt(&self, messages: &[ChatMessage]) -> Result<String> {
        if self.broken_template {
            return Err(anyhow!("template error: unknown filter"));
        }
        *self.rendered.lock() = Some(messages.to_vec());

        let mut prompt: String = messages
            .iter()
            .map(|m| format!("{}: {}\n", m.role, m.content))
            .collect();
        prompt.push_str("assistant:");
        if self.opens_reasoning {
            prompt.push_str(" <think>\n");
        }
        Ok(prompt)
    }

    async fn generate(&self, _rendered_prompt: &str) -> Result<String> {
        if let Some(messages) = self.rendered.lock().take() {
            self.requests.lock().push(messages);
        }
        match self.replies.lock().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(e)) => Err(anyhow!(e)),
            None => Err(anyhow!("no scripted reply left")),
        }
    }
}
