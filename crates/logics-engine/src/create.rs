//! Document creation and promotion
//!
//! A new document is the kind's title heading, required indicators and
//! section template, with connector-provided text placed in the kind's
//! primary section. Rendering is pure; the id comes from the caller.

use crate::error::{EngineError, EngineResult, IndicatorError};
use crate::fixer::template_for;
use crate::indicators::{self, CANONICAL_ORDER};
use crate::project::{display_path, ProjectLayout};
use indexmap::IndexMap;
use logics_model::{slugify, DocKind, DocRef, Document, Section, SECTION_PREFIX};
use tracing::debug;

/// Highest id that fits the three-digit filename field
pub const MAX_ID: u32 = 999;

const PROMOTED_BACKLOG_TITLE: &str = "Promoted backlog item";
const PROMOTED_TASK_TITLE: &str = "Implementation task";
const PROMOTED_TASK_PLAN: [&str; 3] = [
    "- [ ] Clarify scope and acceptance criteria",
    "- [ ] Implement changes",
    "- [ ] Add/adjust tests and polish UX",
];

/// Everything needed to create one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocument {
    /// Kind to create
    pub kind: DocKind,
    /// Title for the heading line
    pub title: String,
    /// Slug override; derived from the title when `None`
    pub slug: Option<String>,
    /// Indicator values replacing the defaults
    pub indicators: IndexMap<String, String>,
    /// Free text for the primary section (e.g. an imported description)
    pub body: Option<String>,
    /// Section bodies replacing the template defaults, by header
    pub sections: IndexMap<String, Vec<String>>,
}

impl NewDocument {
    /// Document of `kind` titled `title` with template defaults
    #[must_use]
    pub fn new(kind: DocKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            slug: None,
            indicators: IndexMap::new(),
            body: None,
            sections: IndexMap::new(),
        }
    }

    /// With an explicit slug (still slugified)
    #[must_use]
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// With an indicator value
    #[must_use]
    pub fn with_indicator(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.indicators.insert(key.into(), value.into());
        self
    }

    /// With primary-section text
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// With the body of a template section replaced
    #[must_use]
    pub fn with_section<I, S>(mut self, header: impl Into<String>, body: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sections
            .insert(header.into(), body.into_iter().map(Into::into).collect());
        self
    }

    /// Slug the file will carry
    #[must_use]
    pub fn slug(&self) -> String {
        slugify(self.slug.as_deref().unwrap_or(&self.title))
    }
}

/// Split connector text into body lines that cannot open a section or title
fn body_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text
        .lines()
        .map(|line| {
            if line.starts_with(SECTION_PREFIX) {
                format!("#{line}")
            } else {
                line.trim_end().to_string()
            }
        })
        .collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    lines.drain(..start);
    lines
}

/// Trimmed title, refused when blank or spanning lines
pub(crate) fn validate_title(title: &str) -> EngineResult<&str> {
    let title = title.trim();
    if title.is_empty() {
        return Err(EngineError::EmptyTitle);
    }
    if title.contains(['\n', '\r']) {
        return Err(EngineError::MultilineTitle);
    }
    Ok(title)
}

/// Render a new document with id `id`
///
/// Section overrides go through the same header demotion as connector text.
///
/// # Errors
///
/// - [`EngineError::EmptyTitle`] for a blank title
/// - [`EngineError::MultilineTitle`] for a title with a line break
/// - [`EngineError::IdSpaceExhausted`] when `id` does not fit three digits
/// - [`EngineError::Indicator`] for an unknown or multi-line indicator override
pub fn render(new: &NewDocument, id: u32, layout: &ProjectLayout) -> EngineResult<Document> {
    let title = validate_title(&new.title)?;
    let dir = layout.kind_dir(new.kind);
    if id > MAX_ID {
        return Err(EngineError::IdSpaceExhausted { dir });
    }

    let doc_ref = DocRef::new(new.kind, id, new.slug());
    let path = dir.join(format!("{doc_ref}.md"));
    let mut doc = Document::with_heading(doc_ref, path, title);

    let required = indicators::required_keys(new.kind);
    for key in new.indicators.keys() {
        if !CANONICAL_ORDER.contains(&key.as_str()) {
            return Err(IndicatorError::UnknownKey(key.clone()).into());
        }
    }
    for &key in required {
        let value = new
            .indicators
            .get(key)
            .map(String::as_str)
            .or_else(|| indicators::default_value(key))
            .unwrap_or(indicators::UNKNOWN_PERCENT);
        indicators::set(&mut doc, key, value)?;
    }

    let template = template_for(new.kind);
    let connector = new
        .body
        .as_deref()
        .map(body_lines)
        .filter(|lines| !lines.is_empty());
    for section in template.sections {
        let body = match (new.sections.get(section.header), &connector) {
            (Some(lines), _) => body_lines(&lines.join("\n")),
            (None, Some(lines)) if section.header == template.primary => lines.clone(),
            _ => section.body.iter().map(|l| (*l).to_string()).collect(),
        };
        doc.push_section(Section::new(section.header, body));
    }
    debug!(doc_ref = %doc.doc_ref(), path = %doc.path().display(), "rendered new document");
    Ok(doc)
}

/// Creation request promoting `source` to `target`
///
/// Request → backlog puts `Promoted from` in Problem; backlog → task puts
/// `Derived from` in Context and seeds the Plan. The source title is reused.
///
/// # Errors
///
/// [`EngineError::UnsupportedPromotion`] for any other pair of kinds.
pub fn promotion(source: &Document, target: DocKind) -> EngineResult<NewDocument> {
    let title = source
        .heading()
        .map(|h| h.title().trim())
        .filter(|t| !t.is_empty());
    let from = display_path(source.path());
    match (source.kind(), target) {
        (Some(DocKind::Request), DocKind::Backlog) => Ok(NewDocument::new(
            target,
            title.unwrap_or(PROMOTED_BACKLOG_TITLE),
        )
        .with_section("# Problem", [format!("Promoted from `{from}`")])),
        (Some(DocKind::Backlog), DocKind::Task) => Ok(NewDocument::new(
            target,
            title.unwrap_or(PROMOTED_TASK_TITLE),
        )
        .with_section("# Context", [format!("Derived from `{from}`")])
        .with_section("# Plan", PROMOTED_TASK_PLAN)),
        _ => Err(EngineError::UnsupportedPromotion {
            from: source.doc_ref().to_string(),
            to: target,
        }),
    }
}
