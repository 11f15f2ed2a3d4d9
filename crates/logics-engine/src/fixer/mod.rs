//! Section structural validator and fixer
//!
//! Adds missing structure without touching existing content:
//! - required indicators (and derived progress)
//! - required sections from the kind's [`KindTemplate`]
//! - optional [`SectionPack`]s
//! - cross-document "Derived from" references ([`crate::links`])

use crate::error::{EngineError, EngineResult};
use crate::indicators;
use crate::links::{self, SlugIndex};
use logics_model::{DocKind, Document, Section};
use tracing::{debug, warn};

mod templates;

pub use templates::{template_for, KindTemplate, Placement, SectionPack, SectionTemplate};

/// Insert `template` unless its header already exists. Returns whether the
/// document changed.
pub fn insert_template(doc: &mut Document, template: &SectionTemplate) -> bool {
    if doc.has_section(template.header) {
        return false;
    }
    let index = match template.placement {
        Placement::End => doc.sections().len(),
        Placement::Before(anchors) => anchors
            .iter()
            .find_map(|anchor| doc.section_index(anchor))
            .unwrap_or(doc.sections().len()),
    };
    debug!(doc_ref = %doc.doc_ref(), header = template.header, index, "inserting section");
    doc.insert_section(index, Section::new(template.header, template.body.iter().copied()));
    true
}

/// Ensure every required section of `kind` exists
///
/// Never duplicates a header and never alters an existing body.
pub fn ensure_sections(doc: &mut Document, kind: DocKind) -> bool {
    template_for(kind)
        .sections
        .iter()
        .fold(false, |changed, template| insert_template(doc, template) || changed)
}

/// Add an optional section pack
///
/// # Errors
///
/// [`EngineError::PackNotApplicable`] when the pack has no placement for `kind`.
pub fn apply_pack(doc: &mut Document, kind: DocKind, pack: SectionPack) -> EngineResult<bool> {
    let template = pack.template(kind).ok_or_else(|| EngineError::PackNotApplicable {
        pack: pack.to_string(),
        kind,
    })?;
    Ok(insert_template(doc, template))
}

/// What a fix pass does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixOptions {
    /// Derive `Progress` from checklists
    pub auto_progress: bool,
    /// Insert cross-document references
    pub cross_refs: bool,
    /// Report changes without writing
    pub dry_run: bool,
}

impl FixOptions {
    /// Create default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With progress derivation on or off
    #[inline]
    #[must_use]
    pub fn with_auto_progress(mut self, auto: bool) -> Self {
        self.auto_progress = auto;
        self
    }

    /// With cross-document references on or off
    #[inline]
    #[must_use]
    pub fn with_cross_refs(mut self, cross_refs: bool) -> Self {
        self.cross_refs = cross_refs;
        self
    }

    /// With dry run on or off
    #[inline]
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

impl Default for FixOptions {
    fn default() -> Self {
        Self {
            auto_progress: true,
            cross_refs: true,
            dry_run: false,
        }
    }
}

/// Run the full fix pipeline on one document
///
/// Untitled documents get their sections but no indicators (there is no
/// title line to anchor them); the linter reports the missing title.
///
/// # Errors
///
/// [`EngineError::UnknownDocKind`] when the prefix is not a known kind.
pub fn fix_document(
    doc: &mut Document,
    slugs: Option<&SlugIndex>,
    options: &FixOptions,
) -> EngineResult<bool> {
    let kind = doc
        .kind()
        .ok_or_else(|| EngineError::UnknownDocKind(doc.doc_ref().to_string()))?;
    let mut changed = false;

    if doc.heading().is_some() {
        if options.auto_progress && kind.tracks_progress() {
            changed |= indicators::apply_auto_progress(doc, kind)?;
        }
        changed |= indicators::ensure_required(doc, kind)?;
    } else {
        warn!(doc_ref = %doc.doc_ref(), "no title line, skipping indicators");
    }

    changed |= ensure_sections(doc, kind);

    if let (true, Some(slugs)) = (options.cross_refs, slugs) {
        changed |= links::ensure_cross_refs(doc, kind, slugs);
    }
    Ok(changed)
}
