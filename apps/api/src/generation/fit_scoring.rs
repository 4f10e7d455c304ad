//! Match Scoring: asks the backend for a bare 0–100 number.
//!
//! A reply that is not a number, blank ones included, is recovered locally with
//! `FALLBACK_SCORE`; only a backend failure reaches the caller.

use tracing::warn;

use crate::generation::prompts::{build_score_prompt, SCORE_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};

/// Neutral score used when the backend reply cannot be read as a number.
pub const FALLBACK_SCORE: f64 = 50.0;

#[derive(Debug, Clone, PartialEq)]
pub enum ScoreOutcome {
    /// Parsed and clamped into [0, 100].
    Parsed(f64),
    /// The raw reply was not numeric; carries what the backend said.
    Fallback { raw: String },
}

impl ScoreOutcome {
    pub fn value(&self) -> f64 {
        match self {
            ScoreOutcome::Parsed(score) => *score,
            ScoreOutcome::Fallback { .. } => FALLBACK_SCORE,
        }
    }
}

pub fn parse_score(raw: &str) -> ScoreOutcome {
    match raw.trim().parse::<f64>() {
        Ok(score) if score.is_finite() => ScoreOutcome::Parsed(score.clamp(0.0, 100.0)),
        _ => ScoreOutcome::Fallback {
            raw: raw.to_string(),
        },
    }
}

/// Scores a resume against a job description. Always yields a value in [0, 100]
/// unless the backend itself is unavailable.
pub async fn score_match(
    llm: &LlmClient,
    resume_text: &str,
    jd_text: &str,
) -> Result<f64, LlmError> {
    let prompt = build_score_prompt(resume_text, jd_text);
    let raw = match llm.call(&prompt, SCORE_SYSTEM).await {
        Ok(raw) => raw,
        Err(LlmError::EmptyContent) => String::new(),
        Err(e) => return Err(e),
    };

    let outcome = parse_score(&raw);
    if let ScoreOutcome::Fallback { raw } = &outcome {
        warn!(
            "Unparseable match score {:?}, using {FALLBACK_SCORE}",
            raw.chars().take(80).collect::<String>()
        );
    }
    Ok(outcome.value())
}
