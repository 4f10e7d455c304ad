/// LLM Client: the single point of entry for all generative backend calls in JobFlow.
///
/// ARCHITECTURAL RULE: No other module may talk to a generative backend directly.
/// All prompts for scoring, insights, tailoring and edits MUST go through `LlmClient`.
///
/// Backends are blocking at the protocol level. `LlmClient` moves every call onto
/// tokio's blocking pool and bounds it with a per-call timeout, so request handlers
/// never park a runtime worker while the model is thinking.
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

pub mod backends;
pub mod prompts;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Backend response could not be decoded: {0}")]
    Decode(String),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("LLM call exceeded {0:?}")]
    Timeout(Duration),

    #[error("LLM worker task failed: {0}")]
    Join(String),
}

/// A generative text backend. Implementations block the calling thread.
pub trait TextBackend: Send + Sync {
    /// Short label used in logs, e.g. "ollama:qwen3:4b".
    fn name(&self) -> String;

    fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError>;
}

/// The single LLM client used by all services in JobFlow.
/// Constructed once at startup and passed by handle; cheap to clone.
#[derive(Clone)]
pub struct LlmClient {
    backend: Arc<dyn TextBackend>,
    timeout: Duration,
    max_retries: u32,
}

impl LlmClient {
    pub fn new(backend: Arc<dyn TextBackend>) -> Self {
        Self {
            backend,
            timeout: DEFAULT_TIMEOUT,
            max_retries: 0,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Retries are off unless configured; a failed call surfaces immediately.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn backend_name(&self) -> String {
        self.backend.name()
    }

    /// Sends a system instruction plus user prompt and returns the generated text.
    /// Exceeding the client timeout is reported as `LlmError::Timeout`.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        self.call_with_timeout(prompt, system, self.timeout).await
    }

    /// Same as `call`, bounded by `timeout` instead of the client default.
    pub async fn call_with_timeout(
        &self,
        prompt: &str,
        system: &str,
        timeout: Duration,
    ) -> Result<String, LlmError> {
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1).min(5)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            match self.call_once(prompt, system, timeout).await {
                Ok(text) => {
                    debug!(
                        "LLM call succeeded via {}: prompt_chars={}, output_chars={}",
                        self.backend.name(),
                        prompt.len(),
                        text.len()
                    );
                    return Ok(text);
                }
                Err(e) => {
                    warn!("LLM call via {} failed: {e}", self.backend.name());
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(LlmError::EmptyContent))
    }

    async fn call_once(
        &self,
        prompt: &str,
        system: &str,
        timeout: Duration,
    ) -> Result<String, LlmError> {
        let backend = Arc::clone(&self.backend);
        let system = system.to_owned();
        let prompt = prompt.to_owned();

        let task = tokio::task::spawn_blocking(move || backend.complete(&system, &prompt));

        // On timeout the blocking thread runs to completion and its result is dropped.
        let text = match tokio::time::timeout(timeout, task).await {
            Err(_) => return Err(LlmError::Timeout(timeout)),
            Ok(Err(join_err)) => return Err(LlmError::Join(join_err.to_string())),
            Ok(Ok(result)) => result?,
        };

        if text.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(text)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub(crate) fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{client_for, Reply, ScriptedBackend};
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[tokio::test]
    async fn test_call_passes_system_and_prompt_to_backend() {
        let backend = ScriptedBackend::texts(&["hello"]);
        let llm = client_for(backend.clone());

        let out = llm.call("user prompt", "system prompt").await.unwrap();

        assert_eq!(out, "hello");
        assert_eq!(
            backend.call(0),
            ("system prompt".to_string(), "user prompt".to_string())
        );
    }

    #[tokio::test]
    async fn test_call_does_not_retry_by_default() {
        let backend = ScriptedBackend::new(vec![Reply::Fail, Reply::Text("ok".into())]);
        let llm = client_for(backend.clone());

        let err = llm.call("p", "s").await.unwrap_err();

        assert!(matches!(err, LlmError::Api { status: 503, .. }));
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_call_retries_when_configured() {
        let backend = ScriptedBackend::new(vec![Reply::Fail, Reply::Text("ok".into())]);
        let llm = client_for(backend.clone()).with_max_retries(1);

        let out = llm.call("p", "s").await.unwrap();

        assert_eq!(out, "ok");
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn test_call_times_out() {
        let backend = ScriptedBackend::new(vec![Reply::Sleep(Duration::from_millis(300))]);
        let llm = client_for(backend).with_timeout(Duration::from_millis(20));

        let err = llm.call("p", "s").await.unwrap_err();
        assert!(matches!(err, LlmError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_per_call_timeout_overrides_client_default() {
        let backend = ScriptedBackend::new(vec![
            Reply::Sleep(Duration::from_millis(300)),
            Reply::Sleep(Duration::from_millis(50)),
        ]);
        let llm = client_for(backend).with_timeout(Duration::from_secs(5));

        let err = llm
            .call_with_timeout("p", "s", Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Timeout(d) if d == Duration::from_millis(20)));

        let out = llm
            .call_with_timeout("p", "s", Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(out, "late");
    }

    #[tokio::test]
    async fn test_blank_output_is_empty_content() {
        let llm = client_for(ScriptedBackend::texts(&["   \n"]));
        let err = llm.call("p", "s").await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent));
    }
}
