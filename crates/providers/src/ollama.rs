use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::settings::{GenerationOptions, ServerSettings};
use std::env;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    /// The prompt is already templated; the server must not wrap it again.
    raw: bool,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    num_predict: u32,
    temperature: f32,
    top_p: f32,
    repeat_penalty: f32,
}

impl From<&GenerationOptions> for OllamaOptions {
    fn from(opts: &GenerationOptions) -> Self {
        Self {
            num_predict: opts.max_new_tokens,
            temperature: opts.temperature,
            top_p: opts.top_p,
            repeat_penalty: opts.repetition_penalty,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Debug, Deserialize)]
struct OllamaErrorBody {
    error: String,
}

/// Resolve the server base URL; `OLLAMA_BASE_URL` wins over settings.
pub fn base_url(server: &ServerSettings) -> String {
    env::var("OLLAMA_BASE_URL")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| server.base_url.clone())
        .trim_end_matches('/')
        .to_string()
}

/// Raw-prompt completion client for an Ollama server.
pub struct OllamaClient {
    http: Client,
    base: String,
    model: String,
    options: GenerationOptions,
}

impl OllamaClient {
    pub fn new(model: String, server: &ServerSettings, options: GenerationOptions) -> Result<Self> {
        Self::with_base(model, base_url(server), server, options)
    }

    fn with_base(
        model: String,
        base: String,
        server: &ServerSettings,
        options: GenerationOptions,
    ) -> Result<Self> {
        let mut builder = Client::builder()
            .connect_timeout(Duration::from_secs(server.connect_timeout_secs))
            .pool_max_idle_per_host(2);
        if let Some(secs) = server.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base,
            model,
            options,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Complete an already-templated prompt in one non-streaming request.
    pub async fn generate_raw(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base);
        let req = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            raw: true,
            stream: false,
            options: OllamaOptions::from(&self.options),
        };
        let resp = self
            .http
            .post(url)
            .json(&req)
            .send()
            .await
            .map_err(|e| self.describe(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<OllamaErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            return Err(anyhow!("ollama error: {} {}", status, detail.trim()));
        }

        let body: OllamaGenerateResponse = resp.json().await.map_err(|e| self.describe(e))?;
        Ok(body.response)
    }

    /// Attach a context that says what went wrong in transport terms.
    fn describe(&self, err: reqwest::Error) -> anyhow::Error {
        let context = if err.is_timeout() {
            format!("request to inference server at {} timed out", self.base)
        } else if err.is_connect() {
            format!("could not reach inference server at {}", self.base)
        } else if err.is_decode() {
            format!("unexpected response from inference server at {}", self.base)
        } else {
            format!("request to inference server at {} failed", self.base)
        };
        anyhow::Error::new(err).context(context)
    }
}
