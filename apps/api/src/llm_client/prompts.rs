//! Prompt fragments shared by every generation module.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "Return strictly valid JSON. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Appended to every document-producing prompt. Output is pasted straight into
/// ATS forms, so anything that is not the document itself is noise.
pub const FINISHED_TEXT_ONLY: &str = "Return ONLY the finished text. \
    No analysis, no headings such as 'Thoughts' or 'Notes', no explanations, no meta commentary. \
    Replace em dashes with simple punctuation such as commas, colons or periods.";
