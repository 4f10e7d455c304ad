//! Blocking generative backends behind `TextBackend`.
//!
//! Both clients use `reqwest::blocking` and must be constructed and called off the
//! async runtime. `LlmClient` takes care of the calling side; `build_backend` is
//! invoked through `spawn_blocking` at startup.

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{LlmError, TextBackend};
use crate::config::{Config, LlmProvider};

// ────────────────────────────────────────────────────────────────────────────
// Ollama
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: String,
}

/// Local Ollama chat model.
pub struct OllamaBackend {
    client: Client,
    host: String,
    model: String,
    temperature: f32,
}

impl OllamaBackend {
    pub fn new(
        host: &str,
        model: &str,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            host: host.trim_end_matches('/').to_string(),
            model: model.to_string(),
            temperature,
        })
    }
}

impl TextBackend for OllamaBackend {
    fn name(&self) -> String {
        format!("ollama:{}", self.model)
    }

    fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let body = OllamaChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.host))
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: response.text().unwrap_or_default(),
            });
        }

        let parsed: OllamaChatResponse = response
            .json()
            .map_err(|e| LlmError::Decode(e.to_string()))?;
        Ok(parsed.message.content)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Anthropic
// ────────────────────────────────────────────────────────────────────────────

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Hardcoded to prevent drift between environments.
pub const ANTHROPIC_MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl AnthropicResponse {
    /// Extracts the text content from the first text block.
    fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Claude via the Anthropic Messages API.
pub struct AnthropicBackend {
    client: Client,
    api_key: String,
    temperature: f32,
}

impl AnthropicBackend {
    pub fn new(api_key: &str, temperature: f32, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key: api_key.to_string(),
            temperature,
        })
    }
}

impl TextBackend for AnthropicBackend {
    fn name(&self) -> String {
        format!("anthropic:{ANTHROPIC_MODEL}")
    }

    fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let body = AnthropicRequest {
            model: ANTHROPIC_MODEL,
            max_tokens: MAX_TOKENS,
            temperature: self.temperature,
            system,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            // Try to parse error message
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: AnthropicResponse = response
            .json()
            .map_err(|e| LlmError::Decode(e.to_string()))?;

        tracing::debug!(
            "Anthropic usage: input_tokens={}, output_tokens={}",
            parsed.usage.input_tokens,
            parsed.usage.output_tokens
        );

        parsed
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

/// Builds the configured backend. Call from a blocking context.
pub fn build_backend(config: &Config) -> Result<Arc<dyn TextBackend>, LlmError> {
    let timeout = Duration::from_secs(config.llm_timeout_secs);
    let backend: Arc<dyn TextBackend> = match config.llm_provider {
        LlmProvider::Ollama => Arc::new(OllamaBackend::new(
            &config.ollama_host,
            &config.ollama_model,
            config.llm_temperature,
            timeout,
        )?),
        LlmProvider::Anthropic => Arc::new(AnthropicBackend::new(
            config.anthropic_api_key.as_deref().unwrap_or_default(),
            config.llm_temperature,
            timeout,
        )?),
    };
    Ok(backend)
}
