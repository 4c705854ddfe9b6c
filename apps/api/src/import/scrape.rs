//! Best-effort import from a public profile page.
//!
//! Profile markup changes often and differs between logged-out and logged-in
//! layouts, so each field has an ordered list of CSS selectors. The first
//! selector matching anything wins; results from later selectors are never mixed in.

use std::time::Duration;

use reqwest::header::USER_AGENT;
use reqwest::{Client, StatusCode};
use scraper::{ElementRef, Html, Selector};
use tracing::{info, warn};
use url::Url;

use crate::import::ImportError;
use crate::models::{EducationEntry, ExperienceEntry, ParsedProfile};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0 Safari/537.36";

const MAX_SKILLS: usize = 20;
const MAX_EXPERIENCE: usize = 10;
const MAX_EDUCATION: usize = 10;

const NAME: &[&str] = &["h1", ".text-heading-xlarge", ".top-card-layout__title"];
const HEADLINE: &[&str] = &[
    "div.text-body-medium",
    ".text-body-medium",
    ".top-card-layout__headline",
];
const ABOUT: &[&str] = &["#about", ".pv-shared-text-with-see-more", "section#about"];
const SKILLS: &[&str] = &[
    ".skill-pill",
    ".pv-skill-category-entity__name-text",
    ".skill-name",
];

const EXPERIENCE_ITEMS: &[&str] = &[
    "section#experience-section li",
    ".experience__list-item",
    ".pv-position-entity",
];
const EXPERIENCE_TITLE: &[&str] = &["h3", ".t-16", ".pv-entity__summary-info h3"];
const EXPERIENCE_COMPANY: &[&str] = &[
    ".pv-entity__secondary-title",
    ".pv-entity__company-summary-info__company-name",
];
const EXPERIENCE_DATES: &[&str] = &[".pv-entity__date-range", ".date-range"];
const EXPERIENCE_DESCRIPTION: &[&str] = &[".pv-entity__description", ".description"];

const EDUCATION_ITEMS: &[&str] = &[
    "section#education-section li",
    ".education__list-item",
    ".pv-entity__school-summary-info",
];
const EDUCATION_DEGREE: &[&str] = &["h3", ".pv-entity__degree-name"];
const EDUCATION_SCHOOL: &[&str] = &["h4", ".pv-entity__school-name"];
const EDUCATION_DATES: &[&str] = &[".pv-entity__dates"];

/// An ordered list of alternative selectors for one field.
struct Chain(Vec<Selector>);

impl Chain {
    fn compile(selectors: &[&str]) -> Result<Self, ImportError> {
        selectors
            .iter()
            .map(|s| Selector::parse(s).map_err(|_| ImportError::Selector(s.to_string())))
            .collect::<Result<Vec<_>, _>>()
            .map(Chain)
    }

    /// All matches of the first selector that matches anything under `scope`.
    fn select_all<'a>(&self, scope: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        self.0
            .iter()
            .map(|selector| scope.select(selector).collect::<Vec<_>>())
            .find(|matches| !matches.is_empty())
            .unwrap_or_default()
    }

    fn select_one<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        self.0
            .iter()
            .find_map(|selector| scope.select(selector).next())
    }

    /// Text of the first match, or "" when nothing matches.
    fn text(&self, scope: ElementRef<'_>) -> String {
        self.select_one(scope).map(element_text).unwrap_or_default()
    }
}

struct ProfileSelectors {
    name: Chain,
    headline: Chain,
    about: Chain,
    skills: Chain,
    experience_items: Chain,
    experience_title: Chain,
    experience_company: Chain,
    experience_dates: Chain,
    experience_description: Chain,
    education_items: Chain,
    education_degree: Chain,
    education_school: Chain,
    education_dates: Chain,
}

impl ProfileSelectors {
    fn compile() -> Result<Self, ImportError> {
        Ok(Self {
            name: Chain::compile(NAME)?,
            headline: Chain::compile(HEADLINE)?,
            about: Chain::compile(ABOUT)?,
            skills: Chain::compile(SKILLS)?,
            experience_items: Chain::compile(EXPERIENCE_ITEMS)?,
            experience_title: Chain::compile(EXPERIENCE_TITLE)?,
            experience_company: Chain::compile(EXPERIENCE_COMPANY)?,
            experience_dates: Chain::compile(EXPERIENCE_DATES)?,
            experience_description: Chain::compile(EXPERIENCE_DESCRIPTION)?,
            education_items: Chain::compile(EDUCATION_ITEMS)?,
            education_degree: Chain::compile(EDUCATION_DEGREE)?,
            education_school: Chain::compile(EDUCATION_SCHOOL)?,
            education_dates: Chain::compile(EDUCATION_DATES)?,
        })
    }
}

/// Fetches and parses a public profile page. Failures come back as `_error`, never as `Err`.
pub async fn fetch_public_profile(client: &Client, url: &str, timeout: Duration) -> ParsedProfile {
    match try_fetch_public_profile(client, url, timeout).await {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Could not parse profile page {url}: {e}");
            let mut parsed = ParsedProfile::default();
            parsed.note_error(e);
            parsed
        }
    }
}

async fn try_fetch_public_profile(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> Result<ParsedProfile, ImportError> {
    let url = validate_url(url)?;

    let response = client
        .get(url)
        .header(USER_AGENT, BROWSER_USER_AGENT)
        .timeout(timeout)
        .send()
        .await?;
    if response.status() != StatusCode::OK {
        return Err(ImportError::FetchStatus(response.status().as_u16()));
    }

    let body = response.text().await?;
    let parsed = parse_profile_html(&body)?;
    info!(
        "Scraped profile page: {} skills, {} experience, {} education",
        parsed.record.skills.len(),
        parsed.record.experience.len(),
        parsed.record.education.len()
    );
    Ok(parsed)
}

/// Accepts absolute http(s) URLs with a host; checked before any network access.
pub fn validate_url(raw: &str) -> Result<Url, ImportError> {
    let url = Url::parse(raw.trim()).map_err(|_| ImportError::InvalidUrl)?;
    let has_host = url.host_str().map_or(false, |h| !h.is_empty());
    if matches!(url.scheme(), "http" | "https") && has_host {
        Ok(url)
    } else {
        Err(ImportError::InvalidUrl)
    }
}

/// Extracts profile fields from page markup. Missing elements read as "".
pub fn parse_profile_html(html: &str) -> Result<ParsedProfile, ImportError> {
    let selectors = ProfileSelectors::compile()?;
    let document = Html::parse_document(html);
    let root = document.root_element();

    let mut parsed = ParsedProfile::default();
    let record = &mut parsed.record;

    record.name = selectors.name.text(root);
    record.current_role = selectors.headline.text(root);
    record.summary = selectors.about.text(root);

    record.skills = selectors
        .skills
        .select_all(root)
        .into_iter()
        .take(MAX_SKILLS)
        .map(element_text)
        .filter(|skill| !skill.is_empty())
        .collect();

    record.experience = selectors
        .experience_items
        .select_all(root)
        .into_iter()
        .take(MAX_EXPERIENCE)
        .map(|item| ExperienceEntry {
            title: selectors.experience_title.text(item),
            company: selectors.experience_company.text(item),
            duration: selectors.experience_dates.text(item),
            description: selectors.experience_description.text(item),
        })
        .collect();

    record.education = selectors
        .education_items
        .select_all(root)
        .into_iter()
        .take(MAX_EDUCATION)
        .map(|item| EducationEntry {
            degree: selectors.education_degree.text(item),
            institution: selectors.education_school.text(item),
            year: selectors.education_dates.text(item),
        })
        .collect();

    Ok(parsed)
}

/// Whitespace-trimmed text nodes joined by single spaces.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
