use anyhow::{bail, Context, Result};

/// Which generative backend the gateway talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Ollama,
    Anthropic,
}

impl LlmProvider {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "ollama" => Ok(LlmProvider::Ollama),
            "anthropic" => Ok(LlmProvider::Anthropic),
            other => bail!("LLM_PROVIDER must be 'ollama' or 'anthropic', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Only DATABASE_URL is required; everything else has a working default.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,

    pub llm_provider: LlmProvider,
    pub ollama_host: String,
    pub ollama_model: String,
    pub anthropic_api_key: Option<String>,
    pub llm_temperature: f32,
    pub llm_timeout_secs: u64,
    pub llm_max_retries: u32,

    pub job_search_provider: String,
    /// Empty or unset disables the provider and forces sample postings.
    pub job_search_api_key: Option<String>,
    pub job_search_host: String,
    pub job_search_timeout_secs: u64,

    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_redirect_uri: String,
    pub google_scopes: Vec<String>,
    /// Origins the OAuth callback may redirect back to.
    pub frontend_origins: Vec<String>,
}

const DEFAULT_GOOGLE_SCOPES: &str = "openid \
    https://www.googleapis.com/auth/userinfo.email \
    https://www.googleapis.com/auth/userinfo.profile \
    https://www.googleapis.com/auth/drive.file";

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let llm_provider = LlmProvider::parse(&env_or("LLM_PROVIDER", "ollama"))?;
        let anthropic_api_key = optional_env("ANTHROPIC_API_KEY");
        if llm_provider == LlmProvider::Anthropic && anthropic_api_key.is_none() {
            bail!("ANTHROPIC_API_KEY is required when LLM_PROVIDER=anthropic");
        }

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),

            llm_provider,
            ollama_host: env_or("OLLAMA_HOST", "http://localhost:11434"),
            ollama_model: env_or("OLLAMA_MODEL", "qwen3:4b"),
            anthropic_api_key,
            llm_temperature: parse_env("LLM_TEMPERATURE", 0.15)?,
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
            llm_max_retries: parse_env("LLM_MAX_RETRIES", 0)?,

            job_search_provider: env_or("JOB_SEARCH_PROVIDER", "jsearch").to_lowercase(),
            job_search_api_key: optional_env("JOB_SEARCH_API_KEY"),
            job_search_host: env_or("JOB_SEARCH_HOST", "jsearch.p.rapidapi.com"),
            job_search_timeout_secs: parse_env("JOB_SEARCH_TIMEOUT_SECS", 20)?,

            google_client_id: env_or("GOOGLE_CLIENT_ID", ""),
            google_client_secret: env_or("GOOGLE_CLIENT_SECRET", ""),
            google_redirect_uri: env_or(
                "GOOGLE_REDIRECT_URI",
                "http://localhost:8000/api/v1/auth/google/callback",
            ),
            google_scopes: split_scopes(&env_or("GOOGLE_SCOPES", DEFAULT_GOOGLE_SCOPES)),
            frontend_origins: split_origins(&env_or("FRONTEND_ORIGINS", "http://localhost:5173")),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Treats unset and blank values the same way.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn split_scopes(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

/// Comma separated; trailing slashes are dropped so entries compare as origins.
fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/').to_string())
        .filter(|o| !o.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_provider_parse_is_case_insensitive() {
        assert_eq!(LlmProvider::parse("Ollama").unwrap(), LlmProvider::Ollama);
        assert_eq!(LlmProvider::parse(" ANTHROPIC ").unwrap(), LlmProvider::Anthropic);
    }

    #[test]
    fn test_llm_provider_rejects_unknown() {
        assert!(LlmProvider::parse("gpt").is_err());
    }

    #[test]
    fn test_default_scopes_include_drive_file() {
        let scopes = split_scopes(DEFAULT_GOOGLE_SCOPES);
        assert_eq!(scopes.len(), 4);
        assert!(scopes
            .iter()
            .any(|s| s == "https://www.googleapis.com/auth/drive.file"));
    }

    #[test]
    fn test_frontend_origins_are_trimmed() {
        assert_eq!(
            split_origins(" https://app.jobflow.dev/ ,http://localhost:5173,, "),
            vec!["https://app.jobflow.dev", "http://localhost:5173"]
        );
    }
}
