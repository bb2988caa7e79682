//! A model directory under `models/` served by the local inference server.

use crate::backend::InferenceBackend;
use crate::ollama::OllamaClient;
use crate::template::ChatTemplate;
use anyhow::Result;
use async_trait::async_trait;
use shared::agent_api::ChatMessage;
use shared::settings::ChatSettings;
use shared::ChatError;
use std::fs;
use std::path::{Path, PathBuf};

/// File extensions that count as model weights.
const WEIGHT_EXTENSIONS: &[&str] = &["safetensors", "bin", "gguf"];

pub struct LocalModel {
    name: String,
    path: PathBuf,
    template: ChatTemplate,
    client: OllamaClient,
}

impl LocalModel {
    /// Validate a model directory and connect it to the inference server.
    ///
    /// Fails with a configuration error when the directory is missing, holds
    /// no weight files, or ships no usable chat template.
    pub fn open(path: &Path, settings: &ChatSettings) -> Result<Self, ChatError> {
        if !path.is_dir() {
            return Err(ChatError::configuration(format!(
                "model path does not exist: {}",
                path.display()
            )));
        }
        if !has_weight_files(path) {
            return Err(ChatError::configuration(format!(
                "no model files (.safetensors, .bin, .gguf) in {}",
                path.display()
            )));
        }

        let template = ChatTemplate::from_model_dir(path)
            .map_err(|e| ChatError::configuration(format!("{:#}", e)))?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let served = settings.served_model.clone().unwrap_or_else(|| name.clone());
        let client = OllamaClient::new(served, &settings.server, settings.generation.clone())?;

        tracing::info!(
            model = %name,
            served_as = %client.model(),
            server = %client.base(),
            "loaded local model"
        );

        Ok(Self {
            name,
            path: path.to_path_buf(),
            template,
            client,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl InferenceBackend for LocalModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn render_prompt(&self, messages: &[ChatMessage]) -> Result<String> {
        self.template.render(messages, true)
    }

    async fn generate(&self, rendered_prompt: &str) -> Result<String> {
        self.client.generate_raw(rendered_prompt).await
    }
}

fn has_weight_files(dir: &Path) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };
    entries.filter_map(|e| e.ok()).any(|entry| {
        let path = entry.path();
        path.is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| WEIGHT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TOKENIZER_CONFIG;

    fn model_dir(with_weights: bool, with_template: bool) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        if with_weights {
            fs::write(dir.path().join("model.safetensors"), b"weights").unwrap();
        }
        let config = if with_template {
            r#"{ "chat_template": "{% for m in messages %}[{{ m.role }}] {{ m.content }}\n{% endfor %}{% if add_generation_prompt %}[assistant] <think>\n{% endif %}" }"#
        } else {
            r#"{ "eos_token": "</s>" }"#
        };
        fs::write(dir.path().join(TOKENIZER_CONFIG), config).unwrap();
        dir
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalModel::open(&dir.path().join("nope"), &ChatSettings::default())
            .err()
            .unwrap();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_directory_without_weights() {
        let dir = model_dir(false, true);
        let err = LocalModel::open(dir.path(), &ChatSettings::default()).err().unwrap();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("no model files"));
    }

    #[test]
    fn test_directory_without_template() {
        let dir = model_dir(true, false);
        let err = LocalModel::open(dir.path(), &ChatSettings::default()).err().unwrap();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_open_and_render() {
        let dir = model_dir(true, true);
        let model = LocalModel::open(dir.path(), &ChatSettings::default()).unwrap();

        let prompt = model.render_prompt(&[ChatMessage::user("hello")]).unwrap();
        assert_eq!(prompt, "[user] hello\n[assistant] <think>\n");
        assert_eq!(model.path(), dir.path());
    }

    #[test]
    fn test_served_model_override() {
        let dir = model_dir(true, true);
        let settings = ChatSettings {
            served_model: Some("qwen3:8b".into()),
            ..ChatSettings::default()
        };
        let model = LocalModel::open(dir.path(), &settings).unwrap();
        assert_eq!(model.client.model(), "qwen3:8b");
        assert_ne!(model.name(), "qwen3:8b");
    }
}
