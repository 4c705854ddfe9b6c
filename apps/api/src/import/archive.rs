//! Bulk data-export archives (a zip of CSV and JSON files).
//!
//! Member files are recognised by name only. Each field is filled from an
//! ordered list of candidate columns and the first non-empty one wins.

use std::io::{Cursor, Read};

use serde_json::Value;
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::import::single::{first_json_str, json_str};
use crate::import::table::{format_duration, Table};
use crate::import::ImportError;
use crate::models::{EducationEntry, ExperienceEntry, ParsedProfile};

/// Headers that mark a file as holding the member's contact details.
const CONTACT_MARKERS: &[&str] = &["Full Name", "Email Address", "Headline"];
const EMAIL_COLUMNS: &[&str] = &["Email Address", "Email"];

const POSITION_FILE_MARKERS: &[&str] = &["position", "positions", "experience"];
const TITLE_COLUMNS: &[&str] = &["Title", "Position", "Job Title"];
const COMPANY_COLUMNS: &[&str] = &["Company", "Organization", "Company Name"];
const START_COLUMNS: &[&str] = &["Start Date", "Start", "Started On"];
const END_COLUMNS: &[&str] = &["End Date", "End", "Finished On"];
const DESCRIPTION_COLUMNS: &[&str] = &["Description", "Summary"];

const DEGREE_COLUMNS: &[&str] = &["Degree", "Title", "Degree Name"];
const INSTITUTION_COLUMNS: &[&str] = &["School", "Institution", "Organization", "School Name"];
const YEAR_COLUMNS: &[&str] = &["End Date", "Year", "Finished On"];

const SKILL_COLUMNS: &[&str] = &["Name", "Skill"];

struct Member {
    name: String,
    data: Vec<u8>,
}

impl Member {
    fn lower_name(&self) -> String {
        self.name.to_lowercase()
    }
}

/// Parses an export archive. Never fails: errors land in `_error` next to whatever was read.
///
/// At most `max_decompressed` bytes are inflated across all members; the sizes
/// claimed in the archive's headers are never trusted.
pub fn parse_archive(bytes: &[u8], max_decompressed: usize) -> ParsedProfile {
    let mut parsed = ParsedProfile::default();
    let members = read_members(bytes, max_decompressed, &mut parsed);
    apply_members(&members, &mut parsed);
    parsed
}

/// Reads every file member. On the first failure the error is noted and the
/// members read so far are returned.
fn read_members(bytes: &[u8], max_decompressed: usize, parsed: &mut ParsedProfile) -> Vec<Member> {
    let mut members = Vec::new();
    let mut archive = match ZipArchive::new(Cursor::new(bytes)) {
        Ok(archive) => archive,
        Err(e) => {
            parsed.note_error(ImportError::from(e));
            return members;
        }
    };

    let mut remaining = max_decompressed;
    for index in 0..archive.len() {
        match read_member(&mut archive, index, remaining, max_decompressed) {
            Ok(Some(member)) => {
                remaining -= member.data.len();
                members.push(member);
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Stopped reading archive at member {index}: {e}");
                parsed.note_error(e);
                break;
            }
        }
    }
    debug!(
        "Archive holds {} files ({} bytes inflated)",
        members.len(),
        max_decompressed - remaining
    );
    members
}

fn read_member(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    index: usize,
    remaining: usize,
    max_decompressed: usize,
) -> Result<Option<Member>, ImportError> {
    let file = archive.by_index(index)?;
    if file.is_dir() {
        return Ok(None);
    }
    let name = file.name().to_string();

    let mut data = Vec::new();
    file.take(remaining as u64 + 1).read_to_end(&mut data)?;
    if data.len() > remaining {
        return Err(ImportError::ArchiveTooLarge(max_decompressed));
    }
    Ok(Some(Member { name, data }))
}

fn apply_members(members: &[Member], parsed: &mut ParsedProfile) {
    let profile_json = members.iter().find(|m| {
        let name = m.lower_name();
        name.ends_with(".json") && (name.contains("profile") || name.contains("member"))
    });
    if let Some(member) = profile_json {
        match serde_json::from_slice::<Value>(&member.data) {
            Ok(data) => apply_profile_json(&data, parsed),
            Err(e) => {
                warn!("Skipping unreadable profile file {}: {e}", member.name);
                parsed.note_error(ImportError::from(e));
            }
        }
    }

    let mut tables = Vec::new();
    for member in members.iter().filter(|m| m.lower_name().ends_with(".csv")) {
        match Table::from_bytes(&member.data) {
            Ok(table) => tables.push((member.lower_name(), table)),
            Err(e) => {
                warn!("Skipping unreadable CSV {}: {e}", member.name);
                parsed.note_error(e);
            }
        }
    }

    for (file_name, table) in &tables {
        if table.has_any_column(CONTACT_MARKERS) {
            apply_contact_table(table, parsed);
        }
        if POSITION_FILE_MARKERS.iter().any(|m| file_name.contains(m)) {
            parsed.record.experience.extend(table.rows().map(|row| {
                ExperienceEntry {
                    title: row.first_of(TITLE_COLUMNS).to_string(),
                    company: row.first_of(COMPANY_COLUMNS).to_string(),
                    duration: format_duration(
                        row.first_of(START_COLUMNS),
                        row.first_of(END_COLUMNS),
                    ),
                    description: row.first_of(DESCRIPTION_COLUMNS).to_string(),
                }
            }));
        }
        if file_name.contains("education") {
            parsed
                .record
                .education
                .extend(table.rows().map(|row| EducationEntry {
                    degree: row.first_of(DEGREE_COLUMNS).to_string(),
                    institution: row.first_of(INSTITUTION_COLUMNS).to_string(),
                    year: row.first_of(YEAR_COLUMNS).to_string(),
                }));
        }
        if file_name.contains("skill") {
            parsed.record.skills.extend(
                table
                    .rows()
                    .map(|row| row.first_of(SKILL_COLUMNS))
                    .filter(|skill| !skill.is_empty())
                    .map(String::from),
            );
        }
    }

    if parsed.record.email.is_empty() {
        if let Some(email) = tables
            .iter()
            .filter_map(|(_, table)| table.first_row())
            .map(|row| row.first_containing("email"))
            .find(|email| !email.is_empty())
        {
            parsed.record.email = email.to_string();
        }
    }
}

fn apply_profile_json(data: &Value, parsed: &mut ParsedProfile) {
    let first = first_json_str(data, &["firstName", "localizedFirstName"]);
    let last = first_json_str(data, &["lastName", "localizedLastName"]);
    let joined = format!("{first} {last}");
    let joined = joined.trim();

    let name = if joined.is_empty() {
        json_str(data, "fullName")
    } else {
        joined
    };
    if !name.is_empty() {
        parsed.record.name = name.to_string();
    }

    let summary = json_str(data, "summary");
    if !summary.is_empty() {
        parsed.record.summary = summary.to_string();
    }
}

fn apply_contact_table(table: &Table, parsed: &mut ParsedProfile) {
    let Some(row) = table.first_row() else {
        return;
    };
    let record = &mut parsed.record;

    let full_name = row.get("Full Name");
    let name = if full_name.is_empty() {
        format!("{} {}", row.get("First Name"), row.get("Last Name"))
            .trim()
            .to_string()
    } else {
        full_name.to_string()
    };
    if !name.is_empty() {
        record.name = name;
    }

    let email = row.first_of(EMAIL_COLUMNS);
    if !email.is_empty() {
        record.email = email.to_string();
    }

    let headline = row.get("Headline");
    if !headline.is_empty() {
        record.current_role = headline.to_string();
    }

    if record.summary.is_empty() {
        record.summary = row.get("Summary").to_string();
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    use super::*;

    const LIMIT: usize = 1024 * 1024;

    fn build_zip(files: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents) in files {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_education_csv_only_archive() {
        let bytes = build_zip(&[(
            "Education.csv",
            "Degree,School,End Date\nBSc Computer Science,State University,2020\n",
        )]);
        let parsed = parse_archive(&bytes, LIMIT);

        assert_eq!(
            parsed.record.education,
            vec![EducationEntry {
                degree: "BSc Computer Science".into(),
                institution: "State University".into(),
                year: "2020".into(),
            }]
        );
        let expected = ParsedProfile {
            record: crate::models::Record {
                education: parsed.record.education.clone(),
                ..Default::default()
            },
            error: None,
        };
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_email_address_column_beats_email_column() {
        let bytes = build_zip(&[(
            "Profile.csv",
            "Full Name,Email,Email Address,Headline\n\
             Ada Lovelace,other@example.com,ada@example.com,Analyst\n",
        )]);
        let parsed = parse_archive(&bytes, LIMIT);
        assert_eq!(parsed.record.email, "ada@example.com");
        assert_eq!(parsed.record.name, "Ada Lovelace");
        assert_eq!(parsed.record.current_role, "Analyst");
    }

    #[test]
    fn test_contact_columns_match_case_insensitively() {
        let bytes = build_zip(&[(
            "contact.csv",
            "full name,email address\nGrace Hopper,grace@navy.mil\n",
        )]);
        let parsed = parse_archive(&bytes, LIMIT);
        assert_eq!(parsed.record.name, "Grace Hopper");
        assert_eq!(parsed.record.email, "grace@navy.mil");
    }

    #[test]
    fn test_positions_become_experience_in_row_order() {
        let bytes = build_zip(&[(
            "Positions.csv",
            "Company Name,Title,Description,Started On,Finished On\n\
             Acme,Engineer,Built pipelines,Jan 2019,\n\
             Initech,Lead,Led team,,\n",
        )]);
        let parsed = parse_archive(&bytes, LIMIT);
        assert_eq!(parsed.record.experience.len(), 2);
        assert_eq!(
            parsed.record.experience[0],
            ExperienceEntry {
                title: "Engineer".into(),
                company: "Acme".into(),
                duration: "Jan 2019".into(),
                description: "Built pipelines".into(),
            }
        );
        assert_eq!(parsed.record.experience[1].duration, "");
    }

    #[test]
    fn test_position_synonyms_follow_priority() {
        let bytes = build_zip(&[(
            "work_experience.csv",
            "Position,Title,Organization,Company,Start Date,End Date,Summary\n\
             Second,First,Org,Co,2018,2020,Did things\n",
        )]);
        let entry = &parse_archive(&bytes, LIMIT).record.experience[0];
        assert_eq!(entry.title, "First");
        assert_eq!(entry.company, "Co");
        assert_eq!(entry.duration, "2018 - 2020");
        assert_eq!(entry.description, "Did things");
    }

    #[test]
    fn test_profile_json_builds_name_from_parts() {
        let bytes = build_zip(&[(
            "member/profile.json",
            r#"{"localizedFirstName": "Ada", "lastName": "Lovelace", "summary": "Rust, Go"}"#,
        )]);
        let parsed = parse_archive(&bytes, LIMIT);
        assert_eq!(parsed.record.name, "Ada Lovelace");
        assert_eq!(parsed.record.summary, "Rust, Go");
    }

    #[test]
    fn test_profile_json_falls_back_to_full_name() {
        let bytes = build_zip(&[("Profile.json", r#"{"fullName": "Grace Hopper"}"#)]);
        assert_eq!(parse_archive(&bytes, LIMIT).record.name, "Grace Hopper");
    }

    #[test]
    fn test_email_fallback_scans_any_email_column() {
        let bytes = build_zip(&[
            ("Connections.csv", "First Name,Company\nBob,Acme\n"),
            ("Email Addresses.csv", "Primary,Email Address Value\nYes,me@example.com\n"),
        ]);
        assert_eq!(parse_archive(&bytes, LIMIT).record.email, "me@example.com");
    }

    #[test]
    fn test_skills_file_supplies_skills() {
        let bytes = build_zip(&[("Skills.csv", "Name\nRust\nPostgreSQL\n")]);
        assert_eq!(parse_archive(&bytes, LIMIT).record.skills, vec!["Rust", "PostgreSQL"]);
    }

    #[test]
    fn test_bad_member_keeps_partial_data() {
        let bytes = build_zip(&[
            ("profile.json", "{broken"),
            ("Education.csv", "Degree,School\nMSc,Tech\n"),
        ]);
        let parsed = parse_archive(&bytes, LIMIT);
        assert!(parsed.error.unwrap().starts_with("Could not read JSON"));
        assert_eq!(parsed.record.education[0].degree, "MSc");
    }

    #[test]
    fn test_not_a_zip_is_soft_error() {
        let parsed = parse_archive(b"plainly not a zip", LIMIT);
        assert!(parsed.error.unwrap().starts_with("Could not read archive"));
    }

    /// One stored member whose headers claim ~2 GiB uncompressed while holding 5 bytes.
    fn zip_with_lying_size() -> Vec<u8> {
        let name = b"notes.txt";
        let data = b"hello";
        let crc: u32 = 0x3610_A686;
        let claimed: u32 = 0x7FFF_FFFF;

        let mut out = Vec::new();
        out.extend_from_slice(&0x0403_4b50u32.to_le_bytes());
        out.extend_from_slice(&20u16.to_le_bytes()); // version needed
        out.extend_from_slice(&0u16.to_le_bytes()); // flags
        out.extend_from_slice(&0u16.to_le_bytes()); // stored
        out.extend_from_slice(&0u32.to_le_bytes()); // time + date
        out.extend_from_slice(&crc.to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&claimed.to_le_bytes());
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(name);
        out.extend_from_slice(data);

        let central_start = out.len() as u32;
        out.extend_from_slice(&0x0201_4b50u32.to_le_bytes());
        out.extend_from_slice(&20u16.to_le_bytes()); // version made by
        out.extend_from_slice(&20u16.to_le_bytes()); // version needed
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&crc.to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&claimed.to_le_bytes());
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // extra
        out.extend_from_slice(&0u16.to_le_bytes()); // comment
        out.extend_from_slice(&0u16.to_le_bytes()); // disk
        out.extend_from_slice(&0u16.to_le_bytes()); // internal attrs
        out.extend_from_slice(&0u32.to_le_bytes()); // external attrs
        out.extend_from_slice(&0u32.to_le_bytes()); // local header offset
        out.extend_from_slice(name);
        let central_len = out.len() as u32 - central_start;

        out.extend_from_slice(&0x0605_4b50u32.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&central_len.to_le_bytes());
        out.extend_from_slice(&central_start.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out
    }

    #[test]
    fn test_claimed_size_is_not_trusted() {
        // Must return (soft error or not) rather than allocate what the header claims.
        let parsed = parse_archive(&zip_with_lying_size(), LIMIT);
        assert_eq!(parsed.record, crate::models::Record::default());
    }

    #[test]
    fn test_inflated_members_are_capped() {
        let big = format!("Name\n{}", "Rust\n".repeat(10_000));
        let bytes = build_zip(&[("Skills.csv", big.as_str())]);
        let parsed = parse_archive(&bytes, 1024);
        assert_eq!(
            parsed.error.as_deref(),
            Some("Archive expands beyond the 1024-byte limit")
        );
        assert!(parsed.record.skills.is_empty());
    }

    #[test]
    fn test_cap_spans_all_members() {
        let half = format!("Name\n{}", "Go\n".repeat(200));
        let bytes = build_zip(&[("Skills.csv", half.as_str()), ("More skills.csv", half.as_str())]);
        let parsed = parse_archive(&bytes, half.len() + 10);
        assert!(parsed.error.unwrap().starts_with("Archive expands beyond"));
        // The first member fit and is still applied.
        assert_eq!(parsed.record.skills.len(), 200);
    }
}
