//! `ROADMAP.md`: backlog items bucketed by Progress, Impact and Urgency

use super::{doc_link, finish, sorted_by_path};
use crate::indicators::PROGRESS;
use logics_model::{DocKind, Document};
use std::fmt::{self, Display, Formatter};

/// Roadmap column of a backlog item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoadmapBucket {
    /// High impact or high urgency
    Now,
    /// Everything not placed elsewhere
    Next,
    /// Low impact and low urgency
    Later,
    /// `Progress` is 100
    Done,
}

impl RoadmapBucket {
    /// Buckets in report order
    pub const ALL: [RoadmapBucket; 4] = [Self::Now, Self::Next, Self::Later, Self::Done];

    /// Bucket of `doc`; completion wins over priority
    #[must_use]
    pub fn of(doc: &Document) -> Self {
        let done = doc
            .indicators()
            .get(PROGRESS)
            .is_some_and(|p| matches!(p.trim(), "100%" | "100"));
        if done {
            return Self::Done;
        }
        let impact = priority(doc, "impact");
        let urgency = priority(doc, "urgency");
        let high = |v: &Option<String>| matches!(v.as_deref(), Some("high" | "h"));
        let low = |v: &Option<String>| matches!(v.as_deref(), Some("low" | "l"));
        if high(&impact) || high(&urgency) {
            Self::Now
        } else if low(&impact) && low(&urgency) {
            Self::Later
        } else {
            Self::Next
        }
    }

    /// Report heading text
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Now => "Now",
            Self::Next => "Next",
            Self::Later => "Later",
            Self::Done => "Done",
        }
    }
}

impl Display for RoadmapBucket {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lowercased value of the last `- <key>: value` body line
fn priority(doc: &Document, key: &str) -> Option<String> {
    let marker = format!("- {key}:");
    doc.intro()
        .iter()
        .chain(doc.sections().iter().flat_map(|s| s.body()))
        .rev()
        .find(|line| line.trim().to_lowercase().starts_with(&marker))
        .and_then(|line| line.split_once(':'))
        .map(|(_, value)| value.trim().to_lowercase())
}

fn entry(doc: &Document) -> String {
    match doc.indicators().get(PROGRESS).filter(|p| !p.is_empty()) {
        Some(progress) => format!("- {} - {} ({progress})", doc_link(doc), doc.title()),
        None => format!("- {} - {}", doc_link(doc), doc.title()),
    }
}

/// Render the roadmap for the backlog items among `docs`
#[must_use]
pub fn render_roadmap(docs: &[Document]) -> String {
    let items: Vec<&Document> = sorted_by_path(docs)
        .into_iter()
        .filter(|d| d.kind() == Some(DocKind::Backlog))
        .collect();

    let mut lines = vec!["# Roadmap".to_string(), String::new()];
    for bucket in RoadmapBucket::ALL {
        lines.push(format!("## {bucket}"));
        lines.push(String::new());
        let placed: Vec<String> = items
            .iter()
            .filter(|d| RoadmapBucket::of(d) == bucket)
            .map(|d| entry(d))
            .collect();
        if placed.is_empty() {
            lines.push("_None_".to_string());
        } else {
            lines.extend(placed);
        }
        lines.push(String::new());
    }
    finish(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(stem: &str, progress: &str, priority: &[&str]) -> Document {
        Document::from_text(
            format!("logics/backlog/{stem}.md"),
            &format!(
                "## {stem} - {stem} title\n> Progress: {progress}\n\n# Problem\nx\n\n# Notes\n{}\n",
                priority.join("\n")
            ),
        )
    }

    #[test]
    fn buckets_by_progress_then_priority() {
        assert_eq!(RoadmapBucket::of(&item("item_000_a", "100%", &["- Impact: high"])), RoadmapBucket::Done);
        assert_eq!(RoadmapBucket::of(&item("item_000_a", "100", &[])), RoadmapBucket::Done);
        assert_eq!(RoadmapBucket::of(&item("item_000_a", "10%", &["- Urgency: H"])), RoadmapBucket::Now);
        assert_eq!(
            RoadmapBucket::of(&item("item_000_a", "0%", &["- impact: low", "  - Urgency: l"])),
            RoadmapBucket::Later
        );
        assert_eq!(RoadmapBucket::of(&item("item_000_a", "0%", &["- Impact: low"])), RoadmapBucket::Next);
        assert_eq!(RoadmapBucket::of(&item("item_000_a", "??%", &[])), RoadmapBucket::Next);
    }

    #[test]
    fn last_priority_line_wins() {
        let doc = item("item_000_a", "0%", &["- Impact: high", "- Impact: low", "- Urgency: low"]);
        assert_eq!(RoadmapBucket::of(&doc), RoadmapBucket::Later);
    }

    #[test]
    fn renders_backlog_items_only() {
        let docs = vec![
            item("item_001_b", "50%", &["- Impact: high"]),
            item("item_000_a", "100%", &[]),
            Document::from_text("logics/tasks/task_000_a.md", "## task_000_a - A\n> Progress: 0%\n"),
        ];
        assert_eq!(
            render_roadmap(&docs),
            "# Roadmap

## Now

- [item_001_b](logics/backlog/item_001_b.md) - item_001_b title (50%)

## Next

_None_

## Later

_None_

## Done

- [item_000_a](logics/backlog/item_000_a.md) - item_000_a title (100%)
"
        );
    }

    #[test]
    fn missing_progress_has_no_suffix() {
        let doc = Document::from_text("logics/backlog/item_000_a.md", "## item_000_a - A\n");
        assert!(render_roadmap(&[doc]).contains("- [item_000_a](logics/backlog/item_000_a.md) - A\n"));
    }
}
