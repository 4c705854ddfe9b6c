// Shared prompt fragments. Each feature that calls the model keeps its own
// prompts.rs alongside it; this file only holds the cross-cutting pieces.

/// Appended to every prompt that expects a JSON array back.
pub const JSON_LIST_RULES: &str = "\
RULES:
1. Output ONLY valid JSON.
2. Return a LIST of dictionaries.
3. Do not add conversational filler like \"Here is the JSON\".
4. Ensure all quotes are escaped correctly.";

/// Appended to every prompt that expects plain prose back.
pub const PLAIN_TEXT_RULES: &str = "\
Return only the requested text. Do NOT include placeholders like [Insert Date], \
markdown headings, or commentary about the text.";
