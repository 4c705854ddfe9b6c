// Tailoring: rewrites résumé sections and writes cover letters against the
// target job description. All model calls go through llm_client.

pub mod handlers;
pub mod prompts;
pub mod tailor;
