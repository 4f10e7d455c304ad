//! Document generation: tailored resume, cover letter and named edits.
//! Each function is exactly one gateway call; failures are returned as-is.

use crate::generation::prompts::{
    build_cover_letter_prompt, build_edit_prompt, build_resume_prompt, COVER_LETTER_SYSTEM,
    EDIT_SYSTEM, RESUME_SYSTEM,
};
use crate::llm_client::{LlmClient, LlmError};
use crate::models::tailoring::EditAction;

pub async fn generate_tailored_resume(
    llm: &LlmClient,
    resume_text: &str,
    jd_text: &str,
    match_score: Option<f64>,
    instructions: Option<&str>,
) -> Result<String, LlmError> {
    let prompt = build_resume_prompt(resume_text, jd_text, match_score, instructions);
    let text = llm.call(&prompt, RESUME_SYSTEM).await?;
    Ok(text.trim().to_string())
}

pub async fn generate_cover_letter(
    llm: &LlmClient,
    resume_text: &str,
    jd_text: &str,
    company: &str,
    instructions: Option<&str>,
) -> Result<String, LlmError> {
    let prompt = build_cover_letter_prompt(resume_text, jd_text, company, instructions);
    let text = llm.call(&prompt, COVER_LETTER_SYSTEM).await?;
    Ok(text.trim().to_string())
}

/// Rewrites `text` according to `action`.
pub async fn adapt_text(
    llm: &LlmClient,
    action: &EditAction,
    text: &str,
    jd_text: Option<&str>,
) -> Result<String, LlmError> {
    let prompt = build_edit_prompt(action, text, jd_text);
    let updated = llm.call(&prompt, EDIT_SYSTEM).await?;
    Ok(updated.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::{client_for, Reply, ScriptedBackend};

    #[tokio::test]
    async fn test_resume_generation_uses_rewriter_persona() {
        let backend = ScriptedBackend::texts(&["  Tailored resume\n"]);
        let llm = client_for(backend.clone());

        let text = generate_tailored_resume(&llm, "orig", "jd", Some(64.0), None)
            .await
            .unwrap();

        assert_eq!(text, "Tailored resume");
        let (system, prompt) = backend.call(0);
        assert_eq!(system, RESUME_SYSTEM);
        assert!(prompt.contains("Current match score: 64.0"));
    }

    #[tokio::test]
    async fn test_cover_letter_passes_instructions() {
        let backend = ScriptedBackend::texts(&["Dear team,"]);
        let llm = client_for(backend.clone());

        generate_cover_letter(&llm, "orig", "jd", "Acme", Some("mention relocation"))
            .await
            .unwrap();

        let (system, prompt) = backend.call(0);
        assert_eq!(system, COVER_LETTER_SYSTEM);
        assert!(prompt.contains("Additional instructions: mention relocation"));
    }

    #[tokio::test]
    async fn test_adapt_text_failure_propagates() {
        let llm = client_for(ScriptedBackend::new(vec![Reply::Fail]));
        let err = adapt_text(&llm, &EditAction::Improve, "text", None)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Api { .. }));
    }
}
