//! Markdown reporters
//!
//! Pure functions of already-loaded documents and graphs. Nothing here reads
//! the repository or re-parses text, so equal inputs give byte-identical
//! output.

mod index;
mod relationships;
mod review;
mod roadmap;

pub use index::render_index;
pub use relationships::render_relationships;
pub use review::{render_global_review, ProgressBucket, ProgressHistogram};
pub use roadmap::{render_roadmap, RoadmapBucket};

use crate::project::display_path;
use logics_model::Document;

/// `[ref](path)` link to a document
fn doc_link(doc: &Document) -> String {
    format!("[{}]({})", doc.doc_ref(), display_path(doc.path()))
}

/// Join lines, dropping trailing blanks, ending with one newline
fn finish(mut lines: Vec<String>) -> String {
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Documents ordered by path
fn sorted_by_path(docs: &[Document]) -> Vec<&Document> {
    let mut sorted: Vec<&Document> = docs.iter().collect();
    sorted.sort_by(|a, b| a.path().cmp(b.path()));
    sorted
}

/// Documents ordered by ref, then path
fn sorted_by_ref(docs: &[Document]) -> Vec<&Document> {
    let mut sorted: Vec<&Document> = docs.iter().collect();
    sorted.sort_by(|a, b| {
        a.doc_ref()
            .as_str()
            .cmp(b.doc_ref().as_str())
            .then_with(|| a.path().cmp(b.path()))
    });
    sorted
}
