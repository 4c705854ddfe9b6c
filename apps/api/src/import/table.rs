//! Header-addressed view over a CSV export file.
//!
//! Column names are matched case-insensitively. Lookups that take a list of
//! synonyms return the first column, in list order, holding a non-empty value.

use crate::import::ImportError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// One data row, read through its table's headers.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    values: &'a [String],
}

impl Table {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ImportError> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let values: Vec<String> = record?.iter().map(|v| v.trim().to_string()).collect();
            if values.iter().all(|v| v.is_empty()) {
                continue;
            }
            rows.push(values);
        }

        Ok(Table { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// True if any header equals one of `names`, ignoring case.
    pub fn has_any_column(&self, names: &[&str]) -> bool {
        names.iter().any(|name| self.has_column(name))
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |values| Row {
            table: self,
            values,
        })
    }

    pub fn first_row(&self) -> Option<Row<'_>> {
        self.rows().next()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
    }
}

impl<'a> Row<'a> {
    /// Value under `column`, or "" when the column or cell is missing.
    pub fn get(&self, column: &str) -> &'a str {
        self.table
            .column_index(column)
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// First non-empty value among `columns`, tried in order.
    pub fn first_of(&self, columns: &[&str]) -> &'a str {
        columns
            .iter()
            .map(|column| self.get(column))
            .find(|value| !value.is_empty())
            .unwrap_or("")
    }

    /// First non-empty value in any column whose header contains `needle`, ignoring case.
    pub fn first_containing(&self, needle: &str) -> &'a str {
        let needle = needle.to_lowercase();
        self.table
            .headers
            .iter()
            .zip(self.values.iter())
            .find(|(header, value)| header.to_lowercase().contains(&needle) && !value.is_empty())
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }
}

/// Joins a start and end date as `"{start} - {end}"`, trimming separators left by empty ends.
pub fn format_duration(start: &str, end: &str) -> String {
    format!("{start} - {end}")
        .trim_matches(|c| c == ' ' || c == '-')
        .to_string()
}
