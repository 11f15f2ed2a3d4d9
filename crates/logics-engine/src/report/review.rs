//! Global review: snapshot, findings, progress histograms, recommendations

use super::{doc_link, finish};
use crate::indicators::{PROGRESS, UNKNOWN_PERCENT};
use crate::parser::LoadReport;
use chrono::{DateTime, Utc};
use logics_model::{DocKind, Document};
use std::fmt::{self, Display, Formatter};

const RECOMMENDATIONS: [&str; 5] = [
    "1. Replace template placeholders in active docs and remove `??%` indicators once the scope is understood.",
    "2. Ensure each backlog item has measurable acceptance criteria and a clear priority (Impact/Urgency).",
    "3. Ensure each task has a step-by-step plan and at least 1–2 concrete validation commands.",
    "4. Keep relationships explicit: link request → backlog → task (and spec when useful).",
    "5. Generate supporting views when the doc set grows: `logics/INDEX.md` + `logics/RELATIONSHIPS.md`.",
];

/// Progress histogram bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressBucket {
    /// No `Progress` indicator
    Missing,
    /// `??%`
    Unknown,
    /// Zero or below
    Zero,
    /// 1 to 49
    Started,
    /// 50 to 99
    Advanced,
    /// 100 or above
    Done,
    /// Not a percentage
    Invalid,
}

impl ProgressBucket {
    /// Buckets in report order
    pub const ALL: [ProgressBucket; 7] = [
        Self::Missing,
        Self::Unknown,
        Self::Zero,
        Self::Started,
        Self::Advanced,
        Self::Done,
        Self::Invalid,
    ];

    /// Bucket of a raw `Progress` value
    #[must_use]
    pub fn of(value: Option<&str>) -> Self {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Self::Missing;
        };
        if value == UNKNOWN_PERCENT {
            return Self::Unknown;
        }
        let digits = value.strip_suffix('%').unwrap_or(value);
        match digits.parse::<i64>() {
            Err(_) => Self::Invalid,
            Ok(pct) if pct <= 0 => Self::Zero,
            Ok(pct) if pct < 50 => Self::Started,
            Ok(pct) if pct < 100 => Self::Advanced,
            Ok(_) => Self::Done,
        }
    }

    /// Label in the histogram table
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Missing => "(missing)",
            Self::Unknown => "??%",
            Self::Zero => "0%",
            Self::Started => "1–49%",
            Self::Advanced => "50–99%",
            Self::Done => "100%",
            Self::Invalid => "(invalid)",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl Display for ProgressBucket {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Count of documents per [`ProgressBucket`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressHistogram {
    counts: [usize; 7],
}

impl ProgressHistogram {
    /// Histogram of the `Progress` indicator over `docs`
    #[must_use]
    pub fn of<'a>(docs: impl IntoIterator<Item = &'a Document>) -> Self {
        let mut histogram = Self::default();
        for doc in docs {
            histogram.counts[ProgressBucket::of(doc.indicators().get(PROGRESS)).index()] += 1;
        }
        histogram
    }

    /// Documents in `bucket`
    #[inline]
    #[must_use]
    pub fn count(&self, bucket: ProgressBucket) -> usize {
        self.counts[bucket.index()]
    }

    fn table(&self, title: &str, lines: &mut Vec<String>) {
        lines.push(format!("### {title}"));
        lines.push(String::new());
        lines.push("| Bucket | Count |".to_string());
        lines.push("|---|---:|".to_string());
        for bucket in ProgressBucket::ALL {
            lines.push(format!("| {bucket} | {} |", self.count(bucket)));
        }
        lines.push(String::new());
    }
}

fn has_placeholder(doc: &Document, placeholders: &[String]) -> bool {
    let text = doc.to_text();
    placeholders
        .iter()
        .any(|snippet| !snippet.is_empty() && text.contains(snippet.as_str()))
}

fn unknown_keys(doc: &Document) -> Vec<String> {
    doc.indicators()
        .to_map()
        .into_iter()
        .filter(|(_, value)| value == UNKNOWN_PERCENT)
        .map(|(key, _)| key)
        .collect()
}

/// Render the global review
///
/// `now` is printed as the generation time; `placeholders` are template
/// snippets whose presence marks a document as unfinished.
#[must_use]
pub fn render_global_review(
    report: &LoadReport,
    placeholders: &[String],
    now: DateTime<Utc>,
) -> String {
    let docs = &report.documents;
    let of_kind = |kind: DocKind| docs.iter().filter(move |d| d.kind() == Some(kind));
    let unknown = docs.iter().filter(|d| d.kind().is_none()).count();

    let mut lines = vec![
        "# Logics Global Review".to_string(),
        String::new(),
        format!("_Generated: {}_", now.format("%Y-%m-%d %H:%M UTC")),
        String::new(),
        "## Snapshot".to_string(),
        String::new(),
        format!("- Requests: {}", of_kind(DocKind::Request).count()),
        format!("- Backlog items: {}", of_kind(DocKind::Backlog).count()),
        format!("- Tasks: {}", of_kind(DocKind::Task).count()),
        format!("- Specs: {}", of_kind(DocKind::Spec).count()),
    ];
    if unknown > 0 {
        lines.push(format!("- Unknown doc refs: {unknown} (non-standard filename)"));
    }
    if !report.failures.is_empty() {
        lines.push(format!("- Unreadable files: {}", report.failures.len()));
    }
    lines.push(String::new());

    lines.push("## Findings".to_string());
    lines.push(String::new());
    if docs.is_empty() {
        lines.push("_No Logics docs found._".to_string());
        return finish(lines);
    }

    let with_placeholders: Vec<&Document> = docs
        .iter()
        .filter(|d| has_placeholder(d, placeholders))
        .collect();
    let stale: Vec<(&Document, Vec<String>)> = docs
        .iter()
        .map(|d| (d, unknown_keys(d)))
        .filter(|(_, keys)| !keys.is_empty())
        .collect();

    lines.push(format!("- Template placeholders remaining: {}", with_placeholders.len()));
    lines.push(format!("- Indicators with unknown values (`??%`): {}", stale.len()));
    lines.push(String::new());

    if !with_placeholders.is_empty() {
        lines.push("### Docs with template placeholders".to_string());
        lines.push(String::new());
        for doc in with_placeholders {
            lines.push(format!("- {} - {}", doc_link(doc), doc.title()));
        }
        lines.push(String::new());
    }

    if !stale.is_empty() {
        lines.push("### Docs with stale indicators".to_string());
        lines.push(String::new());
        for (doc, keys) in stale {
            lines.push(format!(
                "- {} - {} (unknown: {})",
                doc_link(doc),
                doc.title(),
                keys.join(", ")
            ));
        }
        lines.push(String::new());
    }

    if of_kind(DocKind::Task).next().is_some() {
        ProgressHistogram::of(of_kind(DocKind::Task)).table("Task progress distribution", &mut lines);
    }
    if of_kind(DocKind::Backlog).next().is_some() {
        ProgressHistogram::of(of_kind(DocKind::Backlog))
            .table("Backlog progress distribution", &mut lines);
    }

    lines.push("## Recommendations (prioritized)".to_string());
    lines.push(String::new());
    lines.extend(RECOMMENDATIONS.iter().map(|r| (*r).to_string()));
    finish(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PLACEHOLDERS;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn placeholders() -> Vec<String> {
        DEFAULT_PLACEHOLDERS.iter().map(|s| (*s).to_string()).collect()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn buckets() {
        assert_eq!(ProgressBucket::of(None), ProgressBucket::Missing);
        assert_eq!(ProgressBucket::of(Some("??%")), ProgressBucket::Unknown);
        assert_eq!(ProgressBucket::of(Some("0%")), ProgressBucket::Zero);
        assert_eq!(ProgressBucket::of(Some("-5%")), ProgressBucket::Zero);
        assert_eq!(ProgressBucket::of(Some("49%")), ProgressBucket::Started);
        assert_eq!(ProgressBucket::of(Some("50%")), ProgressBucket::Advanced);
        assert_eq!(ProgressBucket::of(Some("100%")), ProgressBucket::Done);
        assert_eq!(ProgressBucket::of(Some("120")), ProgressBucket::Done);
        assert_eq!(ProgressBucket::of(Some("half")), ProgressBucket::Invalid);
    }

    #[test]
    fn empty_corpus_stops_after_snapshot() {
        let text = render_global_review(&LoadReport::default(), &placeholders(), now());
        assert_eq!(
            text,
            "# Logics Global Review

_Generated: 2024-05-01 09:30 UTC_

## Snapshot

- Requests: 0
- Backlog items: 0
- Tasks: 0
- Specs: 0

## Findings

_No Logics docs found._
"
        );
    }

    #[test]
    fn flags_placeholders_and_unknown_indicators() {
        let report = LoadReport {
            documents: vec![
                Document::from_text(
                    "logics/tasks/task_000_a.md",
                    "## task_000_a - A\n> Understanding: ??%\n> Progress: 60%\n\n# Plan\n- [ ] First implementation step\n",
                ),
                Document::from_text("logics/tasks/task_001_b.md", "## task_001_b - B\n> Progress: 100%\n"),
                Document::from_text("logics/tasks/scratch.md", "notes\n"),
            ],
            failures: Vec::new(),
        };
        let text = render_global_review(&report, &placeholders(), now());
        assert!(text.contains("- Tasks: 2\n- Specs: 0\n- Unknown doc refs: 1 (non-standard filename)\n"));
        assert!(text.contains("- Template placeholders remaining: 1\n"));
        assert!(text.contains("- [task_000_a](logics/tasks/task_000_a.md) - A (unknown: Understanding)\n"));
        assert!(text.contains("| 50–99% | 1 |\n| 100% | 1 |\n"));
        assert!(!text.contains("Backlog progress distribution"));
        assert!(text.ends_with("`logics/RELATIONSHIPS.md`.\n"));
    }

    #[test]
    fn histogram_counts() {
        let docs = [
            Document::from_text("logics/backlog/item_000_a.md", "## item_000_a - A\n"),
            Document::from_text("logics/backlog/item_001_b.md", "## item_001_b - B\n> Progress: ??%\n"),
        ];
        let histogram = ProgressHistogram::of(&docs);
        assert_eq!(histogram.count(ProgressBucket::Missing), 1);
        assert_eq!(histogram.count(ProgressBucket::Unknown), 1);
        assert_eq!(histogram.count(ProgressBucket::Done), 0);
    }
}
