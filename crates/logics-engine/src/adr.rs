//! Architecture decision records
//!
//! ADRs live in `architecture/` below the docs directory as
//! `adr_{ddd}_{slug}.md`. They share the title heading and indicator line
//! format of workflow documents but are not one of the workflow kinds, so
//! loading, fixing and linting leave them alone.

use crate::create::{validate_title, MAX_ID};
use crate::error::{EngineError, EngineResult, IndicatorError};
use crate::project::ProjectLayout;
use chrono::NaiveDate;
use logics_model::{slugify, DocRef, Document, Section};
use tracing::debug;

/// Filename prefix of decision records
pub const ADR_PREFIX: &str = "adr";

/// Status of a freshly written record
pub const DEFAULT_STATUS: &str = "Proposed";

const SECTIONS: [(&str, &str); 4] = [
    ("# Context", "Describe the problem, constraints, and drivers."),
    ("# Decision", "State the chosen option and rationale."),
    ("# Alternatives considered", "- Alternative option"),
    ("# Consequences", "- Operational/product consequence"),
];

/// Everything needed to write one decision record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAdr {
    /// Title for the heading line
    pub title: String,
    /// `Status` indicator value
    pub status: String,
}

impl NewAdr {
    /// Proposed record titled `title`
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            status: DEFAULT_STATUS.to_string(),
        }
    }

    /// With a status other than `Proposed`
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }
}

/// Render record `id` dated `date`
///
/// # Errors
///
/// - [`EngineError::EmptyTitle`] or [`EngineError::MultilineTitle`] for a bad title
/// - [`IndicatorError::MultilineValue`] for a status spanning lines
/// - [`EngineError::IdSpaceExhausted`] when `id` does not fit three digits
pub fn render_adr(
    new: &NewAdr,
    id: u32,
    layout: &ProjectLayout,
    date: NaiveDate,
) -> EngineResult<Document> {
    let title = validate_title(&new.title)?;
    let status = match new.status.trim() {
        "" => DEFAULT_STATUS,
        s if s.contains(['\n', '\r']) => {
            return Err(IndicatorError::MultilineValue {
                key: "Status".to_string(),
            }
            .into())
        }
        s => s,
    };
    let dir = layout.architecture_dir();
    if id > MAX_ID {
        return Err(EngineError::IdSpaceExhausted { dir });
    }

    let stem = format!("{ADR_PREFIX}_{id:03}_{}", slugify(title));
    let path = dir.join(format!("{stem}.md"));
    let mut doc = Document::with_heading(DocRef::from_stem(&stem), path, title);
    doc.indicators_mut()
        .insert(0, "Date", &date.format("%Y-%m-%d").to_string());
    doc.indicators_mut().insert(1, "Status", status);
    for (header, body) in SECTIONS {
        doc.push_section(Section::new(header, [body]));
    }
    doc.separate_indicators();
    debug!(doc_ref = %doc.doc_ref(), path = %doc.path().display(), "rendered decision record");
    Ok(doc)
}
