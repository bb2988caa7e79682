//! Hugging Face style chat templates rendered with minijinja.
//!
//! Model directories ship their prompt format as a Jinja template, either in
//! `chat_template.jinja` or inside `tokenizer_config.json`. The environment
//! here mirrors what `transformers` sets up: `trim_blocks`, `lstrip_blocks`,
//! Python string methods, `raise_exception` and `strftime_now`.

use anyhow::{anyhow, Context, Result};
use minijinja::{context, Environment, Error, ErrorKind};
use serde::Deserialize;
use shared::agent_api::ChatMessage;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const TEMPLATE_NAME: &str = "chat";
pub const TOKENIZER_CONFIG: &str = "tokenizer_config.json";
pub const TEMPLATE_FILE: &str = "chat_template.jinja";

// ── tokenizer_config.json ────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct TokenizerConfig {
    #[serde(default)]
    chat_template: Option<TemplateSource>,
    #[serde(default)]
    bos_token: Option<SpecialToken>,
    #[serde(default)]
    eos_token: Option<SpecialToken>,
}

/// Either a single template or a list of named variants.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TemplateSource {
    Single(String),
    Named(Vec<NamedTemplate>),
}

#[derive(Debug, Deserialize)]
struct NamedTemplate {
    name: String,
    template: String,
}

/// Special tokens appear as plain strings or as `AddedToken` objects.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SpecialToken {
    Plain(String),
    Added { content: String },
}

impl SpecialToken {
    fn into_content(self) -> String {
        match self {
            SpecialToken::Plain(s) => s,
            SpecialToken::Added { content } => content,
        }
    }
}

impl TemplateSource {
    fn into_default(self) -> Option<String> {
        match self {
            TemplateSource::Single(t) => Some(t),
            TemplateSource::Named(list) => {
                let pos = list.iter().position(|t| t.name == "default").unwrap_or(0);
                list.into_iter().nth(pos).map(|t| t.template)
            }
        }
    }
}

// ── Template ─────────────────────────────────────────────────────────

/// A compiled chat template plus the special tokens it may reference.
#[derive(Debug)]
pub struct ChatTemplate {
    env: Environment<'static>,
    bos_token: String,
    eos_token: String,
}

impl ChatTemplate {
    /// Compile `source` with the given special tokens.
    pub fn new(
        source: impl Into<String>,
        bos_token: impl Into<String>,
        eos_token: impl Into<String>,
    ) -> Result<Self> {
        let source: String = source.into();
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_unknown_method_callback(minijinja_contrib::pycompat::unknown_method_callback);
        env.add_function("raise_exception", raise_exception);
        env.add_function("strftime_now", strftime_now);
        env.add_template_owned(TEMPLATE_NAME, source)
            .context("chat template does not compile")?;

        Ok(Self {
            env,
            bos_token: bos_token.into(),
            eos_token: eos_token.into(),
        })
    }

    /// Load the template shipped in a model directory.
    ///
    /// `chat_template.jinja` wins over the `chat_template` key of
    /// `tokenizer_config.json`; special tokens always come from the latter.
    pub fn from_model_dir(dir: &Path) -> Result<Self> {
        let config_path = dir.join(TOKENIZER_CONFIG);
        let config: TokenizerConfig = if config_path.is_file() {
            let bytes = fs::read(&config_path)
                .with_context(|| format!("failed to read {}", config_path.display()))?;
            serde_json::from_slice(&bytes)
                .with_context(|| format!("malformed {}", config_path.display()))?
        } else {
            TokenizerConfig::default()
        };

        let template_path = dir.join(TEMPLATE_FILE);
        let source = if template_path.is_file() {
            fs::read_to_string(&template_path)
                .with_context(|| format!("failed to read {}", template_path.display()))?
        } else {
            config
                .chat_template
                .and_then(TemplateSource::into_default)
                .ok_or_else(|| anyhow!("no chat template found in {}", dir.display()))?
        };

        Self::new(
            source,
            config.bos_token.map(SpecialToken::into_content).unwrap_or_default(),
            config.eos_token.map(SpecialToken::into_content).unwrap_or_default(),
        )
    }

    /// Render a conversation. With `add_generation_prompt` the output ends
    /// with the header of a fresh assistant turn.
    pub fn render(&self, messages: &[ChatMessage], add_generation_prompt: bool) -> Result<String> {
        let template = self.env.get_template(TEMPLATE_NAME)?;
        let rendered = template
            .render(context! {
                messages => messages,
                add_generation_prompt => add_generation_prompt,
                bos_token => &self.bos_token,
                eos_token => &self.eos_token,
            })
            .context("failed to render chat template")?;
        Ok(rendered)
    }
}

fn raise_exception(message: String) -> Result<String, Error> {
    Err(Error::new(ErrorKind::InvalidOperation, message))
}

fn strftime_now(format: String) -> Result<String, Error> {
    let mut out = String::new();
    write!(out, "{}", chrono::Local::now().format(&format)).map_err(|_| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("invalid strftime format: {}", format),
        )
    })?;
    Ok(out)
}
