//! A single exported JSON or CSV file uploaded on its own.

use serde_json::Value;

use crate::import::table::Table;
use crate::import::ImportError;
use crate::models::{ExperienceEntry, ParsedProfile};

pub fn parse_json_file(bytes: &[u8]) -> ParsedProfile {
    let mut parsed = ParsedProfile::default();
    match serde_json::from_slice::<Value>(bytes) {
        Ok(data) => {
            let record = &mut parsed.record;
            record.name = first_json_str(&data, &["fullName", "name"]).to_string();
            record.summary = json_str(&data, "summary").to_string();
        }
        Err(e) => parsed.note_error(ImportError::from(e)),
    }
    parsed
}

pub fn parse_csv_file(bytes: &[u8]) -> ParsedProfile {
    let mut parsed = ParsedProfile::default();
    let table = match Table::from_bytes(bytes) {
        Ok(table) => table,
        Err(e) => {
            parsed.note_error(e);
            return parsed;
        }
    };

    if let Some(row) = table.first_row() {
        parsed.record.name = row.get("Full Name").to_string();
    }

    if table.has_column("Title") && table.has_column("Company") {
        parsed.record.experience = table
            .rows()
            .map(|row| ExperienceEntry {
                title: row.get("Title").to_string(),
                company: row.get("Company").to_string(),
                duration: row.get("Date Range").to_string(),
                description: row.get("Description").to_string(),
            })
            .collect();
    }

    parsed
}

/// String value at `key`; anything missing or non-string reads as "".
pub(crate) fn json_str<'a>(data: &'a Value, key: &str) -> &'a str {
    data.get(key).and_then(Value::as_str).unwrap_or("")
}

/// First non-empty string among `keys`, tried in order.
pub(crate) fn first_json_str<'a>(data: &'a Value, keys: &[&str]) -> &'a str {
    keys.iter()
        .map(|key| json_str(data, key))
        .find(|value| !value.is_empty())
        .unwrap_or("")
}
