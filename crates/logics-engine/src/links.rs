//! Cross-document reference linking
//!
//! Documents sharing a slug form the request → backlog → task chain. A
//! "Derived from" line is written only when exactly one candidate exists.

use crate::project::display_path;
use logics_model::{DocKind, Document, Section};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Documents grouped by slug then kind
#[derive(Debug, Clone, Default)]
pub struct SlugIndex {
    by_slug: BTreeMap<String, BTreeMap<DocKind, Vec<PathBuf>>>,
}

impl SlugIndex {
    /// Index every document with a known kind
    #[must_use]
    pub fn build(docs: &[Document]) -> Self {
        let mut index = Self::default();
        for doc in docs {
            if let Some(kind) = doc.kind() {
                index
                    .by_slug
                    .entry(doc.doc_ref().slug().to_string())
                    .or_default()
                    .entry(kind)
                    .or_default()
                    .push(doc.path().to_path_buf());
            }
        }
        index
    }

    /// Documents of `kind` sharing `slug`
    #[must_use]
    pub fn candidates(&self, slug: &str, kind: DocKind) -> &[PathBuf] {
        self.by_slug
            .get(slug)
            .and_then(|kinds| kinds.get(&kind))
            .map_or(&[], Vec::as_slice)
    }
}

fn derived_from(path: &Path) -> String {
    format!("Derived from `{}`", display_path(path))
}

fn sole_candidate<'a>(doc: &Document, candidates: &'a [PathBuf], source: DocKind) -> Option<&'a Path> {
    match candidates {
        [single] => Some(single.as_path()),
        [] => None,
        _ => {
            warn!(
                doc_ref = %doc.doc_ref(),
                source = %source,
                candidates = candidates.len(),
                "ambiguous derived-from candidates, leaving unresolved"
            );
            None
        }
    }
}

/// Insert the references implied by the slug index for a document of `kind`
pub fn ensure_cross_refs(doc: &mut Document, kind: DocKind, slugs: &SlugIndex) -> bool {
    let slug = doc.doc_ref().slug().to_string();
    match kind {
        DocKind::Backlog => {
            let candidates = slugs.candidates(&slug, DocKind::Request);
            sole_candidate(doc, candidates, DocKind::Request)
                .is_some_and(|path| ensure_notes_reference(doc, path))
        }
        DocKind::Task => {
            let candidates = slugs.candidates(&slug, DocKind::Backlog);
            sole_candidate(doc, candidates, DocKind::Backlog)
                .is_some_and(|path| ensure_context_reference(doc, path))
        }
        DocKind::Request => {
            ensure_backlog_listing(doc, slugs.candidates(&slug, DocKind::Backlog))
        }
        DocKind::Spec => false,
    }
}

fn mentions(section: &Section, needle: &str) -> bool {
    section.body().iter().any(|line| line.contains(needle))
}

/// Append `- Derived from `<path>`.` to `# Notes` (created if absent)
pub fn ensure_notes_reference(doc: &mut Document, source: &Path) -> bool {
    let needle = derived_from(source);
    let line = format!("- {needle}.");
    match doc.section_mut("# Notes") {
        Some(notes) if mentions(notes, &needle) => false,
        Some(notes) => {
            let at = notes.content().len();
            notes.body_mut().insert(at, line);
            debug!(source = %source.display(), "linked backlog item to request");
            true
        }
        None => {
            doc.push_section(Section::new("# Notes", [line]));
            true
        }
    }
}

/// Put `Derived from `<path>`.` at the start of `# Context` (created if absent)
pub fn ensure_context_reference(doc: &mut Document, source: &Path) -> bool {
    let needle = derived_from(source);
    let line = format!("{needle}.");
    match doc.section_mut("# Context") {
        Some(context) if mentions(context, &needle) => false,
        Some(context) => {
            context.body_mut().insert(0, line);
            debug!(source = %source.display(), "linked task to backlog item");
            true
        }
        None => {
            doc.insert_section(0, Section::new("# Context", [line]));
            true
        }
    }
}

/// List every backlog item under `# Backlog`; existing lines are kept
pub fn ensure_backlog_listing(doc: &mut Document, backlog: &[PathBuf]) -> bool {
    if backlog.is_empty() {
        return false;
    }
    let entries: Vec<String> = backlog
        .iter()
        .map(|p| format!("- `{}`", display_path(p)))
        .collect();

    let Some(section) = doc.section_mut("# Backlog") else {
        doc.push_section(Section::new("# Backlog", entries));
        return true;
    };

    let mut changed = false;
    for entry in entries {
        if section.body().iter().any(|line| line.trim() == entry) {
            continue;
        }
        let at = section.content().len();
        section.body_mut().insert(at, entry);
        changed = true;
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn docs() -> Vec<Document> {
        vec![
            Document::from_text("logics/request/req_000_login.md", "## req_000_login - Login\n# Backlog\n- (none yet)\n"),
            Document::from_text("logics/backlog/item_001_login.md", "## item_001_login - Login\n# Notes\n"),
            Document::from_text("logics/tasks/task_002_login.md", "## task_002_login - Login\n# Context\nWhy.\n\n# Plan\n"),
            Document::from_text("logics/backlog/item_003_export.md", "## item_003_export - Export\n"),
            Document::from_text("logics/backlog/item_004_export.md", "## item_004_export - Export\n"),
            Document::from_text("logics/tasks/task_005_export.md", "## task_005_export - Export\n# Context\n"),
        ]
    }

    #[test]
    fn backlog_links_to_single_request() {
        let docs = docs();
        let slugs = SlugIndex::build(&docs);
        let mut item = docs[1].clone();
        assert!(ensure_cross_refs(&mut item, DocKind::Backlog, &slugs));
        assert!(!ensure_cross_refs(&mut item, DocKind::Backlog, &slugs));
        assert_eq!(
            item.to_text(),
            "## item_001_login - Login\n# Notes\n- Derived from `logics/request/req_000_login.md`.\n"
        );
    }

    #[test]
    fn task_reference_goes_first_in_context() {
        let docs = docs();
        let slugs = SlugIndex::build(&docs);
        let mut task = docs[2].clone();
        assert!(ensure_cross_refs(&mut task, DocKind::Task, &slugs));
        assert_eq!(
            task.section("# Context").unwrap().content(),
            ["Derived from `logics/backlog/item_001_login.md`.", "Why."]
        );
        assert!(!ensure_cross_refs(&mut task, DocKind::Task, &slugs));
    }

    #[test]
    fn ambiguous_candidates_are_left_alone() {
        let docs = docs();
        let slugs = SlugIndex::build(&docs);
        let mut task = docs[5].clone();
        assert!(!ensure_cross_refs(&mut task, DocKind::Task, &slugs));
        assert_eq!(task.to_text(), docs[5].to_text());
    }

    #[test]
    fn request_lists_backlog_items() {
        let docs = docs();
        let slugs = SlugIndex::build(&docs);
        let mut request = docs[0].clone();
        assert!(ensure_cross_refs(&mut request, DocKind::Request, &slugs));
        assert_eq!(
            request.section("# Backlog").unwrap().content(),
            ["- (none yet)", "- `logics/backlog/item_001_login.md`"]
        );
        assert!(!ensure_cross_refs(&mut request, DocKind::Request, &slugs));
    }

    #[test]
    fn promoted_reference_without_period_counts() {
        let mut task = Document::from_text(
            "logics/tasks/task_002_login.md",
            "## task_002_login - Login\n# Context\nDerived from `logics/backlog/item_001_login.md`\n",
        );
        assert!(!ensure_context_reference(&mut task, Path::new("logics/backlog/item_001_login.md")));
    }
}
