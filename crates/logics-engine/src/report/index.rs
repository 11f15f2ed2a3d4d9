//! `INDEX.md`: one table per kind

use super::{finish, sorted_by_path};
use crate::indicators::PROGRESS;
use crate::project::display_path;
use logics_model::{DocKind, Document};

const MISSING_TITLE: &str = "(missing title)";

fn heading_for(kind: DocKind) -> &'static str {
    match kind {
        DocKind::Request => "Requests",
        DocKind::Backlog => "Backlog",
        DocKind::Task => "Tasks",
        DocKind::Spec => "Specs",
    }
}

fn row(doc: &Document, with_progress: bool) -> String {
    let label = doc
        .heading()
        .and_then(|h| h.label())
        .unwrap_or(doc.doc_ref().as_str());
    let title = doc
        .heading()
        .map(|h| h.title().trim())
        .filter(|t| !t.is_empty())
        .unwrap_or(MISSING_TITLE);
    let link = format!("[{label}]({})", display_path(doc.path()));
    if with_progress {
        let progress = doc.indicators().get(PROGRESS).unwrap_or_default();
        format!("| {link} | {title} | {progress} |")
    } else {
        format!("| {link} | {title} |")
    }
}

/// Render the document index
///
/// Documents are grouped by the kind in their filename; unknown kinds are
/// not listed.
#[must_use]
pub fn render_index(docs: &[Document]) -> String {
    let sorted = sorted_by_path(docs);
    let mut lines = vec!["# Logics Index".to_string(), String::new()];
    for kind in DocKind::ALL {
        let entries: Vec<&Document> = sorted
            .iter()
            .copied()
            .filter(|d| d.kind() == Some(kind))
            .collect();
        lines.push(format!("## {}", heading_for(kind)));
        lines.push(String::new());
        if entries.is_empty() {
            lines.push("_None_".to_string());
            lines.push(String::new());
            continue;
        }
        let with_progress = kind.tracks_progress();
        if with_progress {
            lines.push("| Doc | Title | Progress |".to_string());
            lines.push("|---|---|---|".to_string());
        } else {
            lines.push("| Doc | Title |".to_string());
            lines.push("|---|---|".to_string());
        }
        lines.extend(entries.into_iter().map(|doc| row(doc, with_progress)));
        lines.push(String::new());
    }
    finish(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_tables_and_empty_kinds() {
        let docs = vec![
            Document::from_text(
                "logics/tasks/task_001_b.md",
                "## task_001_b - Second\n> Progress: 50%\n",
            ),
            Document::from_text("logics/tasks/task_000_a.md", "# Plan\n"),
            Document::from_text("logics/request/req_000_a.md", "## req_000_a - First\n"),
            Document::from_text("logics/tasks/notes.md", "## Notes\n"),
        ];
        assert_eq!(
            render_index(&docs),
            "# Logics Index

## Requests

| Doc | Title |
|---|---|
| [req_000_a](logics/request/req_000_a.md) | First |

## Backlog

_None_

## Tasks

| Doc | Title | Progress |
|---|---|---|
| [task_000_a](logics/tasks/task_000_a.md) | (missing title) |  |
| [task_001_b](logics/tasks/task_001_b.md) | Second | 50% |

## Specs

_None_
"
        );
    }

    #[test]
    fn input_order_does_not_matter() {
        let a = Document::from_text("logics/specs/spec_000_a.md", "## spec_000_a - A\n");
        let b = Document::from_text("logics/specs/spec_001_b.md", "## spec_001_b - B\n");
        assert_eq!(
            render_index(&[a.clone(), b.clone()]),
            render_index(&[b, a])
        );
    }
}
