// All prompt templates for tailoring and cover letters.
// Placeholders in {braces} are substituted with `str::replace` before sending.

/// Replace: {job_description}, {experience_json}, {json_rules}
pub const TAILOR_EXPERIENCE_TEMPLATE: &str = r#"Act as an Expert Resume Writer.
Task: Rewrite the 'description' field of the work experience JSON below to match the Job Description.

Job Description Keywords:
{job_description}

Original Experience JSON:
{experience_json}

Keep the exact same keys (title, company, duration) and the same number of entries in the same order; only change 'description'.

{json_rules}"#;

/// Replace: {job_description}, {projects_json}, {json_rules}
pub const TAILOR_PROJECTS_TEMPLATE: &str = r#"Act as an Expert Resume Writer.
Task: Rewrite the 'description' field of the project JSON below to highlight what matters for the Job Description.

Job Description Keywords:
{job_description}

Original Projects JSON:
{projects_json}

Keep the exact same keys (title, tech) and the same number of entries in the same order; only change 'description'.

{json_rules}"#;

/// Replace: {current_role}, {skills}, {summary}, {job_description}, {text_rules}
pub const TAILOR_SUMMARY_TEMPLATE: &str = r#"Act as an Expert Resume Writer.
Task: Rewrite the professional summary below so it speaks directly to the Job Description.

Current Role: {current_role}
Skills: {skills}

Original Summary:
{summary}

Target Job Description:
{job_description}

Write 3-4 sentences in the first person without pronouns ("Built...", not "I built...").
{text_rules}"#;

/// Replace: {name}, {current_role}, {skills}, {job_description}, {today}, {text_rules}
pub const COVER_LETTER_TEMPLATE: &str = r#"You are a professional resume writer. Write a cover letter.

Candidate Name: {name}
Current Role: {current_role}
Skills: {skills}

Target Job Description:
{job_description}

Instructions:
1. Tone: Professional, confident, and enthusiastic.
2. Structure: Introduction (why I'm applying), Body (matching my skills to the JD), Conclusion (call to action).
3. Use today's date: {today}.
4. Keep it under 500 words.
5. Separate paragraphs with a blank line.
{text_rules}"#;

/// Substitutes `{key}` placeholders in one pass over `template`.
///
/// Inserted values are never rescanned, so braces inside user text survive
/// verbatim. Unknown placeholders are left as they are.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let known = values.iter().find(|(key, _)| {
            tail.starts_with(key) && tail[key.len()..].starts_with('}')
        });
        match known {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_replaces_known_keys_once() {
        let out = fill(
            "Role: {role}. JD: {jd}. Left: {other}",
            &[("role", "Engineer"), ("jd", "wants {role} and {jd}")],
        );
        assert_eq!(out, "Role: Engineer. JD: wants {role} and {jd}. Left: {other}");
    }

    #[test]
    fn test_fill_handles_stray_braces() {
        assert_eq!(fill("{ {a}}{", &[("a", "x")]), "{ x}{");
    }
}
