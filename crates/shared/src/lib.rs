pub mod error;

pub use error::ChatError;

/// Persona used when the user has not set a system prompt.
pub const DEFAULT_DIRECTIVE: &str = "You are a helpful assistant.";

pub mod settings {
    use serde::{Deserialize, Serialize};
    use std::path::PathBuf;

    fn default_models_dir() -> PathBuf {
        PathBuf::from("models")
    }

    /// Connection to the local inference server.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(default)]
    pub struct ServerSettings {
        pub base_url: String, // e.g., "http://127.0.0.1:11434"
        pub connect_timeout_secs: u64,
        /// Whole-request limit. Unset means a reply may take as long as it needs.
        pub timeout_secs: Option<u64>,
    }

    impl Default for ServerSettings {
        fn default() -> Self {
            Self {
                base_url: "http://127.0.0.1:11434".into(),
                connect_timeout_secs: 10,
                timeout_secs: None,
            }
        }
    }

    /// Sampling parameters forwarded with every generation request
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct GenerationOptions {
        pub max_new_tokens: u32,
        pub temperature: f32,
        pub top_p: f32,
        pub repetition_penalty: f32,
    }

    impl Default for GenerationOptions {
        fn default() -> Self {
            Self {
                max_new_tokens: 2048,
                temperature: 0.7,
                top_p: 0.8,
                repetition_penalty: 1.1,
            }
        }
    }

    /// Everything the client reads from `settings.json`.
    ///
    /// The system prompt is not stored here; it only lives in memory for
    /// the lifetime of a session.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ChatSettings {
        #[serde(default = "default_models_dir")]
        pub models_dir: PathBuf,
        #[serde(default)]
        pub server: ServerSettings,
        #[serde(default)]
        pub generation: GenerationOptions,
        /// Model tag on the inference server. Defaults to the directory name.
        #[serde(default)]
        pub served_model: Option<String>,
        /// Preselected in the model picker
        #[serde(default)]
        pub last_model: Option<String>,
    }

    impl Default for ChatSettings {
        fn default() -> Self {
            Self {
                models_dir: default_models_dir(),
                server: ServerSettings::default(),
                generation: GenerationOptions::default(),
                served_model: None,
                last_model: None,
            }
        }
    }
}

pub mod agent_api {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ChatMessage {
        pub role: String, // "system" | "user" | "assistant"
        pub content: String,
    }

    impl ChatMessage {
        pub fn system(content: impl Into<String>) -> Self {
            Self {
                role: "system".to_string(),
                content: content.into(),
            }
        }

        pub fn user(content: impl Into<String>) -> Self {
            Self {
                role: "user".to_string(),
                content: content.into(),
            }
        }

        pub fn assistant(content: impl Into<String>) -> Self {
            Self {
                role: "assistant".to_string(),
                content: content.into(),
            }
        }
    }
}
