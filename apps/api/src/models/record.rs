use serde::{Deserialize, Serialize};

/// One job held by the candidate. Display order is the order the user typed them in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    pub duration: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectEntry {
    pub title: String,
    pub tech: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    pub degree: String,
    pub institution: String,
    pub year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificationEntry {
    pub title: String,
    pub issuer: String,
    pub year: String,
}

/// The candidate profile collected over a session.
///
/// Every scalar uses the empty string for "unset". `tailored_experience` and
/// `tailored_projects` line up with `experience` / `projects` by index, but
/// readers must not assume the lengths match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub current_role: String,
    pub summary: String,
    pub skills: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub projects: Vec<ProjectEntry>,
    pub education: Vec<EducationEntry>,
    pub certifications: Vec<CertificationEntry>,
    pub job_description: String,
    pub tailored_summary: String,
    pub tailored_experience: Vec<ExperienceEntry>,
    pub tailored_projects: Vec<ProjectEntry>,
}

/// Best-effort output of a profile import.
///
/// `error` is a soft failure: whatever was recovered before it happened is still
/// present in `record`, and the caller keeps going.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedProfile {
    #[serde(flatten)]
    pub record: Record,
    #[serde(rename = "_error", default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ParsedProfile {
    /// Records the first failure only; later ones are usually consequences of it.
    pub fn note_error(&mut self, error: impl ToString) {
        if self.error.is_none() {
            self.error = Some(error.to_string());
        }
    }
}
