// All LLM prompt constants for the Generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::FINISHED_TEXT_ONLY;
use crate::models::tailoring::EditAction;

/// System prompt for match scoring.
pub const SCORE_SYSTEM: &str = "Return only the number.";

/// Match scoring prompt template. Replace `{resume_text}` and `{jd_text}`.
pub const SCORE_PROMPT_TEMPLATE: &str = "Compare the user's resume and the job description. \
Return only a number between 0 and 100 representing the match score considering skills, \
experience level, and keywords.
Resume:
{resume_text}

Job:
{jd_text}";

/// Resume insight prompt template. Replace `{resume_text}` before sending.
pub const INSIGHTS_PROMPT_TEMPLATE: &str = r#"You are a resume parsing assistant. Extract the following as JSON keys:
summary, years_experience, top_skills (array), industries (array), keywords (array).
Use concise bullet-style text.

Return a JSON object with this EXACT schema:
{
  "summary": "Backend engineer with 6 years building payment systems",
  "years_experience": 6,
  "top_skills": ["Rust", "PostgreSQL"],
  "industries": ["Fintech"],
  "keywords": ["distributed systems", "APIs"]
}

Resume:

{resume_text}"#;

pub const RESUME_SYSTEM: &str = "You are an expert resume rewriter.";

pub const COVER_LETTER_SYSTEM: &str = "You are a top-tier tech recruiter and writer.";

pub const EDIT_SYSTEM: &str = "You are a detail-oriented editor.";

/// Used for any action outside the known set.
pub const GENERIC_EDIT_INSTRUCTION: &str = "Improve this text for readability.";

pub fn edit_instruction(action: &EditAction) -> &'static str {
    match action {
        EditAction::Regenerate => "Rewrite from scratch with improved clarity.",
        EditAction::Improve => "Polish writing, fix grammar, strengthen impact.",
        EditAction::Shorten => "Reduce length by 20% while keeping key substance.",
        EditAction::Professional => "Increase formality and executive polish.",
        EditAction::MatchJd => "Align language and keywords with the job description.",
        EditAction::Other => GENERIC_EDIT_INSTRUCTION,
    }
}

pub fn build_score_prompt(resume_text: &str, jd_text: &str) -> String {
    SCORE_PROMPT_TEMPLATE
        .replace("{resume_text}", resume_text)
        .replace("{jd_text}", jd_text)
}

pub fn build_insights_prompt(resume_text: &str) -> String {
    INSIGHTS_PROMPT_TEMPLATE.replace("{resume_text}", resume_text)
}

pub fn build_resume_prompt(
    resume_text: &str,
    jd_text: &str,
    match_score: Option<f64>,
    instructions: Option<&str>,
) -> String {
    let mut prompt = format!(
        "Rewrite the resume so it remains truthful but spotlights the most relevant \
         achievements for the job. Use ATS-friendly bullet points. {FINISHED_TEXT_ONLY}\n\
         Job description:\n{jd_text}\n\nOriginal resume:\n{resume_text}\n"
    );
    if let Some(score) = match_score {
        prompt.push_str(&format!("\nCurrent match score: {score:.1}. Improve upon it.\n"));
    }
    if let Some(instructions) = instructions {
        prompt.push_str(&format!("\nUser instructions: {instructions}\n"));
    }
    prompt
}

pub fn build_cover_letter_prompt(
    resume_text: &str,
    jd_text: &str,
    company: &str,
    instructions: Option<&str>,
) -> String {
    let mut prompt = format!(
        "Draft a personalized cover letter referencing the role and resume achievements. \
         Include a greeting, an intro, two concise body paragraphs and a closing. \
         Keep it under 220 words. {FINISHED_TEXT_ONLY}\n\
         Company: {company}\nJob description:\n{jd_text}\n\nResume:\n{resume_text}\n"
    );
    if let Some(instructions) = instructions {
        prompt.push_str(&format!("\nAdditional instructions: {instructions}\n"));
    }
    prompt
}

/// The job description only reaches the prompt for `MatchJd`.
pub fn build_edit_prompt(action: &EditAction, text: &str, jd_text: Option<&str>) -> String {
    let extra = match (action, jd_text) {
        (EditAction::MatchJd, Some(jd)) => format!("\nJob description:\n{jd}\n"),
        _ => String::new(),
    };
    format!(
        "{} Respond only with the rewritten text. {FINISHED_TEXT_ONLY}{extra}\n\nOriginal text:\n{text}",
        edit_instruction(action)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_prompt_embeds_both_texts() {
        let prompt = build_score_prompt("RESUME BODY", "JD BODY");
        assert!(prompt.contains("between 0 and 100"));
        assert!(prompt.contains("Resume:\nRESUME BODY"));
        assert!(prompt.contains("Job:\nJD BODY"));
    }

    #[test]
    fn test_resume_prompt_optional_sections() {
        let bare = build_resume_prompt("r", "jd", None, None);
        assert!(!bare.contains("Current match score"));
        assert!(!bare.contains("User instructions"));

        let full = build_resume_prompt("r", "jd", Some(72.345), Some("Lead with Rust"));
        assert!(full.contains("Current match score: 72.3. Improve upon it."));
        assert!(full.contains("User instructions: Lead with Rust"));
        assert!(full.contains("em dashes"));
    }

    #[test]
    fn test_cover_letter_prompt_names_company() {
        let prompt = build_cover_letter_prompt("r", "jd", "Acme", None);
        assert!(prompt.contains("Company: Acme"));
        assert!(prompt.contains("under 220 words"));
        assert!(prompt.contains("two concise body paragraphs"));
    }

    #[test]
    fn test_edit_prompt_injects_jd_only_for_match_jd() {
        let matched = build_edit_prompt(&EditAction::MatchJd, "text", Some("JD BODY"));
        assert!(matched.contains("JD BODY"));

        let shortened = build_edit_prompt(&EditAction::Shorten, "text", Some("JD BODY"));
        assert!(!shortened.contains("JD BODY"));
        assert!(shortened.starts_with("Reduce length by 20%"));
    }

    #[test]
    fn test_unknown_action_uses_generic_instruction() {
        let prompt = build_edit_prompt(&EditAction::Other, "text", None);
        assert!(prompt.starts_with(GENERIC_EDIT_INSTRUCTION));
        assert!(prompt.ends_with("Original text:\ntext"));
    }
}
