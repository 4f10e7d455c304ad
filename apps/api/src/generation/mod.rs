// Generation: match scoring, resume insights and tailored document text.
// All LLM calls go through llm_client; nothing here talks to a backend directly.

pub mod fit_scoring;
pub mod handlers;
pub mod insights;
pub mod prompts;
pub mod tailor;
