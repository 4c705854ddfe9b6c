//! Non-destructive merge of imported data into the in-progress Record.

use crate::models::{ParsedProfile, Record};

/// Copies imported fields into `target` without touching anything the user filled in.
///
/// Scalars (name, email, phone, current_role, summary) are copied only when the
/// import has a value and the target is empty. Lists (skills, experience,
/// education) are all-or-nothing: copied only when the target list is empty.
/// No other field is read or written.
pub fn merge(parsed: &ParsedProfile, target: &mut Record) {
    let source = &parsed.record;

    fill_scalar(&source.name, &mut target.name);
    fill_scalar(&source.email, &mut target.email);
    fill_scalar(&source.phone, &mut target.phone);
    fill_scalar(&source.current_role, &mut target.current_role);
    fill_scalar(&source.summary, &mut target.summary);

    fill_list(&source.skills, &mut target.skills);
    fill_list(&source.experience, &mut target.experience);
    fill_list(&source.education, &mut target.education);
}

fn fill_scalar(source: &str, target: &mut String) {
    if !source.is_empty() && target.is_empty() {
        *target = source.to_string();
    }
}

fn fill_list<T: Clone>(source: &[T], target: &mut Vec<T>) {
    if !source.is_empty() && target.is_empty() {
        *target = source.to_vec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EducationEntry, ExperienceEntry, ProjectEntry};

    fn parsed() -> ParsedProfile {
        ParsedProfile {
            record: Record {
                name: "Imported Name".into(),
                email: "imported@example.com".into(),
                phone: "555-0100".into(),
                current_role: "Imported Role".into(),
                summary: "Imported summary".into(),
                skills: vec!["Rust".into()],
                experience: vec![ExperienceEntry {
                    title: "Imported Job".into(),
                    ..Default::default()
                }],
                education: vec![EducationEntry {
                    degree: "BSc".into(),
                    ..Default::default()
                }],
                projects: vec![ProjectEntry {
                    title: "Never merged".into(),
                    ..Default::default()
                }],
                job_description: "Never merged".into(),
                ..Default::default()
            },
            error: None,
        }
    }

    #[test]
    fn test_fills_empty_target() {
        let mut target = Record::default();
        merge(&parsed(), &mut target);
        assert_eq!(target.name, "Imported Name");
        assert_eq!(target.email, "imported@example.com");
        assert_eq!(target.phone, "555-0100");
        assert_eq!(target.current_role, "Imported Role");
        assert_eq!(target.summary, "Imported summary");
        assert_eq!(target.skills, vec!["Rust"]);
        assert_eq!(target.experience.len(), 1);
        assert_eq!(target.education.len(), 1);
    }

    #[test]
    fn test_never_overwrites_user_scalars() {
        let mut target = Record {
            name: "Typed Name".into(),
            summary: "Typed summary".into(),
            ..Default::default()
        };
        merge(&parsed(), &mut target);
        assert_eq!(target.name, "Typed Name");
        assert_eq!(target.summary, "Typed summary");
        assert_eq!(target.email, "imported@example.com");
    }

    #[test]
    fn test_lists_are_all_or_nothing() {
        let typed = vec![
            ExperienceEntry {
                title: "Typed A".into(),
                ..Default::default()
            },
            ExperienceEntry {
                title: "Typed B".into(),
                ..Default::default()
            },
        ];
        let mut target = Record {
            experience: typed.clone(),
            skills: vec!["Go".into()],
            ..Default::default()
        };
        merge(&parsed(), &mut target);
        assert_eq!(target.experience, typed);
        assert_eq!(target.skills, vec!["Go"]);
        assert_eq!(target.education.len(), 1);
    }

    #[test]
    fn test_empty_import_changes_nothing() {
        let mut target = Record {
            name: "Typed".into(),
            ..Default::default()
        };
        let before = target.clone();
        merge(&ParsedProfile::default(), &mut target);
        assert_eq!(target, before);
    }

    #[test]
    fn test_unlisted_fields_are_untouched() {
        let mut target = Record::default();
        merge(&parsed(), &mut target);
        assert!(target.projects.is_empty());
        assert!(target.job_description.is_empty());
        assert!(target.certifications.is_empty());
        assert!(target.tailored_experience.is_empty());
    }
}
