//! Builds tailoring prompts, calls the model, and validates what comes back.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::llm_client::extract::extract_list;
use crate::llm_client::prompts::{JSON_LIST_RULES, PLAIN_TEXT_RULES};
use crate::llm_client::{LlmError, TextGenerator};
use crate::models::{ExperienceEntry, ProjectEntry, Record};
use crate::tailoring::prompts::{
    fill, COVER_LETTER_TEMPLATE, TAILOR_EXPERIENCE_TEMPLATE, TAILOR_PROJECTS_TEMPLATE,
    TAILOR_SUMMARY_TEMPLATE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Not a JSON array of objects, by either extraction strategy.
    MalformedOutput,
    /// Decoded, but the entry count differs from the originals, so index pairing is unsafe.
    LengthMismatch,
}

/// Why a tailoring result was not applied. Carries the raw output for diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TailorFailure {
    pub kind: FailureKind,
    pub message: String,
    pub raw_output: String,
}

/// Tailored list, or the untouched originals plus the reason tailoring did not apply.
#[derive(Debug, Clone, PartialEq)]
pub struct Tailored<T> {
    pub items: Vec<T>,
    pub failure: Option<TailorFailure>,
}

impl<T> Tailored<T> {
    pub fn applied(&self) -> bool {
        self.failure.is_none()
    }
}

pub async fn tailor_experience(
    llm: &dyn TextGenerator,
    experience: &[ExperienceEntry],
    job_description: &str,
) -> Result<Tailored<ExperienceEntry>, LlmError> {
    let experience_json = to_json(experience);
    let prompt = fill(
        TAILOR_EXPERIENCE_TEMPLATE,
        &[
            ("job_description", job_description),
            ("experience_json", &experience_json),
            ("json_rules", JSON_LIST_RULES),
        ],
    );
    tailor_list(llm, &prompt, experience).await
}

pub async fn tailor_projects(
    llm: &dyn TextGenerator,
    projects: &[ProjectEntry],
    job_description: &str,
) -> Result<Tailored<ProjectEntry>, LlmError> {
    let projects_json = to_json(projects);
    let prompt = fill(
        TAILOR_PROJECTS_TEMPLATE,
        &[
            ("job_description", job_description),
            ("projects_json", &projects_json),
            ("json_rules", JSON_LIST_RULES),
        ],
    );
    tailor_list(llm, &prompt, projects).await
}

/// Returns the model's summary text, trimmed.
pub async fn tailor_summary(llm: &dyn TextGenerator, record: &Record) -> Result<String, LlmError> {
    let skills = record.skills.join(", ");
    let prompt = fill(
        TAILOR_SUMMARY_TEMPLATE,
        &[
            ("current_role", or_unspecified(&record.current_role)),
            ("skills", &skills),
            ("summary", &record.summary),
            ("job_description", &record.job_description),
            ("text_rules", PLAIN_TEXT_RULES),
        ],
    );
    let text = llm.generate(&prompt).await?;
    Ok(text.trim().to_string())
}

/// Returns the cover letter verbatim (trimmed); paragraphs are separated by blank lines.
pub async fn write_cover_letter(
    llm: &dyn TextGenerator,
    record: &Record,
    today: NaiveDate,
) -> Result<String, LlmError> {
    let skills = record.skills.join(", ");
    let today = today.format("%B %d, %Y").to_string();
    let prompt = fill(
        COVER_LETTER_TEMPLATE,
        &[
            ("name", &record.name),
            ("current_role", or_unspecified(&record.current_role)),
            ("skills", &skills),
            ("job_description", &record.job_description),
            ("today", &today),
            ("text_rules", PLAIN_TEXT_RULES),
        ],
    );
    let text = llm.generate(&prompt).await?;
    info!("Cover letter generated ({} chars)", text.len());
    Ok(text.trim().to_string())
}

/// Builds an entry from one decoded JSON object, reading every field leniently.
trait FromModelObject: Sized {
    fn from_object(object: &Map<String, Value>) -> Self;
}

impl FromModelObject for ExperienceEntry {
    fn from_object(object: &Map<String, Value>) -> Self {
        ExperienceEntry {
            title: field_text(object, "title"),
            company: field_text(object, "company"),
            duration: field_text(object, "duration"),
            description: field_text(object, "description"),
        }
    }
}

impl FromModelObject for ProjectEntry {
    fn from_object(object: &Map<String, Value>) -> Self {
        ProjectEntry {
            title: field_text(object, "title"),
            tech: field_text(object, "tech"),
            description: field_text(object, "description"),
        }
    }
}

/// Strings as-is, other scalars stringified, arrays joined line by line.
/// Missing keys and nulls read as "".
fn field_text(object: &Map<String, Value>, key: &str) -> String {
    object.get(key).map(value_text).unwrap_or_default()
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(value_text)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

async fn tailor_list<T>(
    llm: &dyn TextGenerator,
    prompt: &str,
    originals: &[T],
) -> Result<Tailored<T>, LlmError>
where
    T: FromModelObject + Clone,
{
    let raw = llm.generate(prompt).await?;
    let extracted = extract_list::<Value>(&raw, &[]);

    if let Some(error) = extracted.error {
        return Ok(not_applied(
            originals,
            FailureKind::MalformedOutput,
            error.to_string(),
            error.raw_output,
        ));
    }

    let objects: Option<Vec<&Map<String, Value>>> =
        extracted.items.iter().map(Value::as_object).collect();
    let Some(objects) = objects else {
        warn!("Tailoring reply is a JSON array but not of objects; discarding");
        return Ok(not_applied(
            originals,
            FailureKind::MalformedOutput,
            "The model returned a list whose entries are not JSON objects.".to_string(),
            raw,
        ));
    };

    if objects.len() != originals.len() {
        warn!(
            "Tailoring returned {} entries for {} originals; discarding",
            objects.len(),
            originals.len()
        );
        return Ok(not_applied(
            originals,
            FailureKind::LengthMismatch,
            format!(
                "The model returned {} entries for {} originals, so they cannot be matched up.",
                objects.len(),
                originals.len()
            ),
            raw,
        ));
    }

    info!("Tailored {} entries", objects.len());
    Ok(Tailored {
        items: objects.into_iter().map(T::from_object).collect(),
        failure: None,
    })
}

fn not_applied<T: Clone>(
    originals: &[T],
    kind: FailureKind,
    message: String,
    raw_output: String,
) -> Tailored<T> {
    Tailored {
        items: originals.to_vec(),
        failure: Some(TailorFailure {
            kind,
            message,
            raw_output,
        }),
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "[]".to_string())
}

fn or_unspecified(value: &str) -> &str {
    if value.is_empty() {
        "Not specified"
    } else {
        value
    }
}
