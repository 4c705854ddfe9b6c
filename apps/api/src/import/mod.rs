// Profile import: bulk-export files, public profile pages and the OAuth backend.
// Every entry point returns a ParsedProfile; failures become its `_error` field
// so a bad import never aborts the wizard.

pub mod archive;
pub mod handlers;
pub mod oauth;
pub mod scrape;
pub mod single;
pub mod table;

use thiserror::Error;
use tracing::{info, warn};

use crate::models::ParsedProfile;

/// Summaries are split on these when no explicit skills were found.
const SKILL_SEPARATORS: [char; 3] = [',', '\n', ';'];
const MAX_INFERRED_SKILL_CHARS: usize = 40;
const MAX_INFERRED_SKILLS: usize = 12;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid URL")]
    InvalidUrl,

    #[error("Could not fetch page (status {0})")]
    FetchStatus(u16),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Could not read archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Archive expands beyond the {0}-byte limit")]
    ArchiveTooLarge(usize),

    #[error("Could not read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Could not read JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Invalid selector '{0}'")]
    Selector(String),

    #[error("Unsupported file type: {0} (expected .zip, .csv or .json)")]
    UnsupportedFile(String),
}

/// What an uploaded export file is, judged by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Archive,
    Json,
    Csv,
}

impl UploadKind {
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let lower = file_name.to_lowercase();
        if lower.ends_with(".zip") {
            Some(UploadKind::Archive)
        } else if lower.ends_with(".json") {
            Some(UploadKind::Json)
        } else if lower.ends_with(".csv") {
            Some(UploadKind::Csv)
        } else {
            None
        }
    }
}

/// Normalizes an uploaded export (archive, JSON or CSV) into a ParsedProfile.
///
/// `max_decompressed` caps how much an archive may inflate to.
pub fn parse_upload(file_name: &str, bytes: &[u8], max_decompressed: usize) -> ParsedProfile {
    let mut parsed = match UploadKind::from_file_name(file_name) {
        Some(UploadKind::Archive) => archive::parse_archive(bytes, max_decompressed),
        Some(UploadKind::Json) => single::parse_json_file(bytes),
        Some(UploadKind::Csv) => single::parse_csv_file(bytes),
        None => {
            let mut parsed = ParsedProfile::default();
            parsed.note_error(ImportError::UnsupportedFile(file_name.to_string()));
            parsed
        }
    };

    if let Some(error) = &parsed.error {
        warn!("Could not fully parse export '{file_name}': {error}");
    }

    if parsed.record.skills.is_empty() && !parsed.record.summary.is_empty() {
        parsed.record.skills = infer_skills(&parsed.record.summary);
    }

    info!(
        "Parsed export '{}': {} experience, {} education, {} skills",
        file_name,
        parsed.record.experience.len(),
        parsed.record.education.len(),
        parsed.record.skills.len()
    );
    parsed
}

/// Guesses skills from a summary: short comma/semicolon/line-separated fragments, in order.
pub fn infer_skills(summary: &str) -> Vec<String> {
    summary
        .split(&SKILL_SEPARATORS[..])
        .map(str::trim)
        .filter(|s| !s.is_empty() && s.chars().count() < MAX_INFERRED_SKILL_CHARS)
        .take(MAX_INFERRED_SKILLS)
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_skills_drops_long_fragments_and_keeps_order() {
        let skills = infer_skills(
            "Python, Leadership, A very very long phrase exceeding forty characters total length, Go",
        );
        assert_eq!(skills, vec!["Python", "Leadership", "Go"]);
    }

    #[test]
    fn test_infer_skills_caps_at_twelve() {
        let summary = (1..=20).map(|i| format!("S{i}")).collect::<Vec<_>>().join(";");
        let skills = infer_skills(&summary);
        assert_eq!(skills.len(), 12);
        assert_eq!(skills[0], "S1");
        assert_eq!(skills[11], "S12");
    }

    #[test]
    fn test_infer_skills_splits_on_newlines_and_skips_blanks() {
        assert_eq!(infer_skills("Rust\nGo;;SQL,"), vec!["Rust", "Go", "SQL"]);
    }

    #[test]
    fn test_upload_kind_from_extension() {
        assert_eq!(
            UploadKind::from_file_name("Basic_LinkedInDataExport.ZIP"),
            Some(UploadKind::Archive)
        );
        assert_eq!(UploadKind::from_file_name("profile.json"), Some(UploadKind::Json));
        assert_eq!(UploadKind::from_file_name("Positions.csv"), Some(UploadKind::Csv));
        assert_eq!(UploadKind::from_file_name("resume.pdf"), None);
    }

    #[test]
    fn test_unsupported_upload_is_soft_error() {
        let parsed = parse_upload("resume.pdf", b"%PDF-1.4", 1024);
        assert!(parsed
            .error
            .as_deref()
            .unwrap()
            .starts_with("Unsupported file type"));
        assert_eq!(parsed.record, Default::default());
    }

    #[test]
    fn test_json_upload_infers_skills_from_summary() {
        let parsed = parse_upload(
            "profile.json",
            br#"{"fullName": "Ada Lovelace", "summary": "Rust, Distributed systems; Mentoring"}"#,
            1024,
        );
        assert_eq!(parsed.record.name, "Ada Lovelace");
        assert_eq!(
            parsed.record.skills,
            vec!["Rust", "Distributed systems", "Mentoring"]
        );
    }
}
