// Document rendering: turns a finished Record into a downloadable document.
// Handlers depend only on the DocumentRenderer trait; TextRenderer is the
// implementation wired up in main.

pub mod handlers;
pub mod text;

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::Record;

pub use text::{PageConfig, TextRenderer};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Page geometry {columns}x{lines_per_page} is too small to lay out a document")]
    PageTooSmall {
        columns: usize,
        lines_per_page: usize,
    },
}

/// Which experience/project/summary fields the résumé is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceVariant {
    Original,
    /// Tailored fields where present, falling back to the originals when empty.
    Tailored,
}

impl ExperienceVariant {
    pub fn from_flag(tailored: bool) -> Self {
        if tailored {
            ExperienceVariant::Tailored
        } else {
            ExperienceVariant::Original
        }
    }
}

pub trait DocumentRenderer: Send + Sync {
    fn render_resume(
        &self,
        record: &Record,
        variant: ExperienceVariant,
    ) -> Result<Vec<u8>, RenderError>;

    fn render_cover_letter(
        &self,
        text: &str,
        record: &Record,
        date: NaiveDate,
    ) -> Result<Vec<u8>, RenderError>;

    /// MIME type of the rendered bytes.
    fn content_type(&self) -> &'static str;

    /// File extension used for download names, without the dot.
    fn file_extension(&self) -> &'static str;
}
