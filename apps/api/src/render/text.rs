//! Word-wrapped, paginated plain-text documents.
//!
//! Pages are separated by a form feed (`\x0c`). Lines never exceed
//! `columns` characters; words longer than a line are hard-split.

use chrono::NaiveDate;

use crate::models::Record;
use crate::render::{DocumentRenderer, ExperienceVariant, RenderError};

const MIN_COLUMNS: usize = 20;
const MIN_LINES_PER_PAGE: usize = 5;
const DESCRIPTION_INDENT: &str = "  ";
const FORM_FEED: &str = "\x0c";

/// Layout parameters for one text page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageConfig {
    pub columns: usize,
    pub lines_per_page: usize,
}

impl Default for PageConfig {
    /// Roughly an A4 page in a monospaced 10pt face.
    fn default() -> Self {
        Self {
            columns: 80,
            lines_per_page: 60,
        }
    }
}

impl PageConfig {
    fn validate(&self) -> Result<(), RenderError> {
        if self.columns < MIN_COLUMNS || self.lines_per_page < MIN_LINES_PER_PAGE {
            return Err(RenderError::PageTooSmall {
                columns: self.columns,
                lines_per_page: self.lines_per_page,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextRenderer {
    page: PageConfig,
}

impl TextRenderer {
    pub fn new(page: PageConfig) -> Self {
        Self { page }
    }

    fn resume_lines(&self, record: &Record, variant: ExperienceVariant) -> Vec<String> {
        let mut doc = Lines::new(self.page.columns);

        doc.centered(&record.name);
        let contact = [&record.email, &record.phone, &record.current_role]
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" | ");
        doc.centered(&contact);
        doc.blank();

        let summary = match variant {
            ExperienceVariant::Tailored if !record.tailored_summary.is_empty() => {
                &record.tailored_summary
            }
            _ => &record.summary,
        };
        if !summary.is_empty() {
            doc.section("Professional Summary");
            doc.wrapped(summary, "");
            doc.blank();
        }

        if !record.education.is_empty() {
            doc.section("Education");
            for edu in &record.education {
                doc.wrapped(&with_year(&format!("{} - {}", edu.degree, edu.institution), &edu.year), "");
            }
            doc.blank();
        }

        let experience = pick(variant, &record.tailored_experience, &record.experience);
        if !experience.is_empty() {
            doc.section("Experience");
            for exp in experience {
                doc.wrapped(&exp.title, "");
                doc.wrapped(&format!("{} | {}", exp.company, exp.duration), "");
                doc.wrapped(&exp.description, DESCRIPTION_INDENT);
                doc.blank();
            }
        }

        if !record.skills.is_empty() {
            doc.section("Technical Skills");
            doc.wrapped(&record.skills.join(", "), "");
            doc.blank();
        }

        let projects = pick(variant, &record.tailored_projects, &record.projects);
        if !projects.is_empty() {
            doc.section("Projects");
            for proj in projects {
                doc.wrapped(&proj.title, "");
                if !proj.tech.is_empty() {
                    doc.wrapped(&format!("Tech: {}", proj.tech), DESCRIPTION_INDENT);
                }
                doc.wrapped(&proj.description, DESCRIPTION_INDENT);
                doc.blank();
            }
        }

        if !record.certifications.is_empty() {
            doc.section("Certifications");
            for cert in &record.certifications {
                doc.wrapped(&with_year(&format!("{} - {}", cert.title, cert.issuer), &cert.year), "");
            }
        }

        doc.finish()
    }

    fn cover_letter_lines(&self, text: &str, record: &Record, date: NaiveDate) -> Vec<String> {
        let mut doc = Lines::new(self.page.columns);
        for line in [&record.name, &record.email, &record.phone] {
            if !line.is_empty() {
                doc.wrapped(line, "");
            }
        }
        doc.blank();
        doc.wrapped(&date.format("%B %d, %Y").to_string(), "");
        doc.blank();

        for paragraph in text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
            doc.wrapped(paragraph, "");
            doc.blank();
        }
        doc.finish()
    }

    fn paginate(&self, lines: Vec<String>) -> Vec<u8> {
        lines
            .chunks(self.page.lines_per_page)
            .map(|page| {
                let mut text = page.join("\n");
                text.push('\n');
                text
            })
            .collect::<Vec<_>>()
            .join(FORM_FEED)
            .into_bytes()
    }
}

impl DocumentRenderer for TextRenderer {
    fn render_resume(
        &self,
        record: &Record,
        variant: ExperienceVariant,
    ) -> Result<Vec<u8>, RenderError> {
        self.page.validate()?;
        Ok(self.paginate(self.resume_lines(record, variant)))
    }

    fn render_cover_letter(
        &self,
        text: &str,
        record: &Record,
        date: NaiveDate,
    ) -> Result<Vec<u8>, RenderError> {
        self.page.validate()?;
        Ok(self.paginate(self.cover_letter_lines(text, record, date)))
    }

    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn file_extension(&self) -> &'static str {
        "txt"
    }
}

fn pick<'a, T>(variant: ExperienceVariant, tailored: &'a [T], original: &'a [T]) -> &'a [T] {
    match variant {
        ExperienceVariant::Tailored if !tailored.is_empty() => tailored,
        _ => original,
    }
}

fn with_year(text: &str, year: &str) -> String {
    if year.is_empty() {
        text.to_string()
    } else {
        format!("{text} ({year})")
    }
}

/// Accumulates output lines for one document.
struct Lines {
    columns: usize,
    lines: Vec<String>,
}

impl Lines {
    fn new(columns: usize) -> Self {
        Self {
            columns,
            lines: Vec::new(),
        }
    }

    fn blank(&mut self) {
        if self.lines.last().is_some_and(|l| !l.is_empty()) {
            self.lines.push(String::new());
        }
    }

    fn section(&mut self, title: &str) {
        self.lines.push(title.to_uppercase());
        self.lines.push("-".repeat(self.columns));
    }

    fn centered(&mut self, text: &str) {
        for line in wrap(text, self.columns, "") {
            let centered = format!("{:^width$}", line, width = self.columns);
            self.lines.push(centered.trim_end().to_string());
        }
    }

    fn wrapped(&mut self, text: &str, indent: &str) {
        self.lines.extend(wrap(text, self.columns, indent));
    }

    fn finish(mut self) -> Vec<String> {
        while self.lines.last().is_some_and(|l| l.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}

/// Greedy word wrap. Collapses runs of whitespace (including newlines) to one space.
fn wrap(text: &str, columns: usize, indent: &str) -> Vec<String> {
    let width = columns.saturating_sub(indent.chars().count()).max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        if word.is_empty() {
            continue;
        }
        let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
        if needed > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }
    if current_len > 0 {
        lines.push(current);
    }

    lines
        .into_iter()
        .map(|line| format!("{indent}{line}"))
        .collect()
}
