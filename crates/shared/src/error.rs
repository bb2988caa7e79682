//! Error kinds surfaced by a chat session.

/// Errors returned to the caller of a chat operation.
///
/// Neither kind is retried, and a failed turn never reaches the transcript.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Model load, prompt templating or generation failed
    #[error("Backend error: {0:#}")]
    Backend(#[from] anyhow::Error),

    /// The selected model cannot be used as configured
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl ChatError {
    pub fn configuration(message: impl Into<String>) -> Self {
        ChatError::Configuration {
            message: message.into(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, ChatError::Configuration { .. })
    }
}
