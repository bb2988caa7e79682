//! Inference backends for locally hosted chat models.
//!
//! A backend does two things: render a conversation into a prompt with the
//! model's own chat template, and turn that prompt into generated text.

pub mod backend;
pub mod local;
pub mod ollama;
pub mod template;

pub use backend::InferenceBackend;
pub use local::LocalModel;
pub use ollama::OllamaClient;
pub use template::ChatTemplate;
