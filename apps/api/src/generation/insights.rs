//! Resume insights: structured summary of an uploaded resume.
//!
//! Unlike scoring this never fails: an unreachable backend or an unreadable
//! reply each produce a documented fallback.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::generation::prompts::build_insights_prompt;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{strip_json_fences, LlmClient, LlmError};

const UNAVAILABLE_SUMMARY_CHARS: usize = 200;
const UNPARSEABLE_SUMMARY_CHARS: usize = 250;

/// Insights have a fallback, so a slow backend takes it instead of stalling the request.
const INSIGHTS_TIMEOUT: Duration = Duration::from_secs(45);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeInsights {
    #[serde(default)]
    pub summary: String,
    #[serde(default, deserialize_with = "lenient_years")]
    pub years_experience: Option<f64>,
    #[serde(default)]
    pub top_skills: Vec<String>,
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl ResumeInsights {
    fn summary_only(text: &str, max_chars: usize) -> Self {
        Self {
            summary: text.chars().take(max_chars).collect(),
            ..Default::default()
        }
    }
}

#[derive(Debug)]
pub enum InsightsOutcome {
    Extracted(ResumeInsights),
    /// Backend unreachable; summary is the start of the resume itself.
    BackendUnavailable(ResumeInsights),
    /// Backend answered with something that is not the JSON we asked for,
    /// possibly nothing at all; summary is the start of that answer.
    Unparseable(ResumeInsights),
}

impl InsightsOutcome {
    pub fn into_insights(self) -> ResumeInsights {
        match self {
            InsightsOutcome::Extracted(insights)
            | InsightsOutcome::BackendUnavailable(insights)
            | InsightsOutcome::Unparseable(insights) => insights,
        }
    }
}

pub async fn extract_resume_insights(llm: &LlmClient, resume_text: &str) -> InsightsOutcome {
    let prompt = build_insights_prompt(resume_text);

    let raw = match llm
        .call_with_timeout(&prompt, JSON_ONLY_SYSTEM, INSIGHTS_TIMEOUT)
        .await
    {
        Ok(raw) => raw,
        Err(LlmError::EmptyContent) => String::new(),
        Err(error) => {
            warn!("Resume insights unavailable, summarizing raw resume: {error}");
            return InsightsOutcome::BackendUnavailable(ResumeInsights::summary_only(
                resume_text,
                UNAVAILABLE_SUMMARY_CHARS,
            ));
        }
    };

    match serde_json::from_str::<ResumeInsights>(strip_json_fences(&raw)) {
        Ok(insights) => InsightsOutcome::Extracted(insights),
        Err(error) => {
            warn!("Resume insights were not valid JSON: {error}");
            InsightsOutcome::Unparseable(ResumeInsights::summary_only(
                &raw,
                UNPARSEABLE_SUMMARY_CHARS,
            ))
        }
    }
}

/// Models write "6", 6, "6+ years" or null for the same thing.
fn lenient_years<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let digits: String = s
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            digits.parse().ok()
        }
        _ => None,
    })
}
