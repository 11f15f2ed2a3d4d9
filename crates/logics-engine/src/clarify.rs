//! Confidence booster
//!
//! Records answered clarification questions in a `# Clarifications` section
//! and raises `Understanding` and `Confidence` with the share of questions
//! answered. Values only go up unless set explicitly.

use crate::error::IndicatorError;
use crate::indicators::{self, parse_percent, round_half_even, CONFIDENCE, UNDERSTANDING};
use logics_model::{DocKind, Document, Section};
use tracing::debug;

/// Section holding the answered questions
pub const CLARIFICATIONS_HEADER: &str = "# Clarifications";

const BASE_QUESTIONS: [(&str, &str); 7] = [
    (
        "Define the primary outcome and scope boundaries (in/out).",
        "In: core deliverables. Out: adjacent features or polish.",
    ),
    (
        "Define time window and granularity for any trends/rollups.",
        "Rolling 7-day window, daily buckets, local midnight.",
    ),
    (
        "Define metric sources and what counts (include offline or background gains?).",
        "Use deltas, include offline/background gains if applicable.",
    ),
    (
        "Define active vs inactive time rules (if relevant).",
        "Active = process/action running. Inactive = no active process.",
    ),
    (
        "Define mobile vs desktop layout expectations.",
        "Mobile-first with condensed order; desktop uses a broader dashboard layout.",
    ),
    (
        "Define persistence and retention.",
        "Persist in saved state; retain only the last 7 days of data.",
    ),
    (
        "Define edge cases and empty states.",
        "No data -> zeros + empty state; new users -> seeded buckets.",
    ),
];

const BACKLOG_QUESTIONS: [(&str, &str); 2] = [
    (
        "Define acceptance criteria with measurable checks.",
        "Acceptance: outputs match spec; UI matches mockups; data persists across reloads.",
    ),
    (
        "Note dependencies and risks.",
        "Dependencies: data sources available; Risks: data drift, migration complexity.",
    ),
];

const TASK_QUESTIONS: [(&str, &str); 2] = [
    (
        "Define implementation checkpoints.",
        "Plan: data model -> aggregation -> UI -> QA.",
    ),
    (
        "Define validation commands.",
        "Run lint/tests/build relevant to the change.",
    ),
];

/// Understanding with nothing answered
const UNDERSTANDING_FLOOR: usize = 70;
/// Understanding gained by answering everything
const UNDERSTANDING_SPAN: usize = 24;
const CONFIDENCE_FLOOR: usize = 65;
const CONFIDENCE_SPAN: usize = 27;

/// One question and its answer; a blank answer counts as unanswered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clarification {
    /// Question text
    pub question: String,
    /// Answer text
    pub answer: String,
}

impl Clarification {
    /// Pair `question` with `answer`
    #[must_use]
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// Whether the answer has content
    #[must_use]
    pub fn is_answered(&self) -> bool {
        !self.answer.trim().is_empty()
    }

    /// `- question :: answer` body line
    #[must_use]
    pub fn entry(&self) -> String {
        format!("- {} :: {}", self.question.trim(), self.answer.trim())
    }
}

/// Standard questions for `kind`, each answered with its suggested default
#[must_use]
pub fn default_questions(kind: DocKind) -> Vec<Clarification> {
    let extra: &[(&str, &str)] = match kind {
        DocKind::Backlog => &BACKLOG_QUESTIONS,
        DocKind::Task => &TASK_QUESTIONS,
        DocKind::Request | DocKind::Spec => &[],
    };
    BASE_QUESTIONS
        .iter()
        .chain(extra)
        .map(|(q, a)| Clarification::new(*q, *a))
        .collect()
}

/// Answers to record plus optional explicit indicator values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfidenceBoost {
    /// Questions and answers, in entry order
    pub answers: Vec<Clarification>,
    /// Explicit `Understanding`; computed when `None`
    pub understanding: Option<String>,
    /// Explicit `Confidence`; computed when `None`
    pub confidence: Option<String>,
}

impl ConfidenceBoost {
    /// Boost recording `answers`
    #[must_use]
    pub fn new(answers: Vec<Clarification>) -> Self {
        Self {
            answers,
            ..Self::default()
        }
    }

    /// Every default question of `kind` with its suggested answer
    #[must_use]
    pub fn with_defaults(kind: DocKind) -> Self {
        Self::new(default_questions(kind))
    }

    /// With an explicit `Understanding` value
    #[must_use]
    pub fn with_understanding(mut self, value: impl Into<String>) -> Self {
        self.understanding = Some(value.into());
        self
    }

    /// With an explicit `Confidence` value
    #[must_use]
    pub fn with_confidence(mut self, value: impl Into<String>) -> Self {
        self.confidence = Some(value.into());
        self
    }

    /// `(understanding, confidence)` from the share of answered questions
    #[must_use]
    pub fn computed(&self) -> (usize, usize) {
        let total = self.answers.len();
        let answered = self.answers.iter().filter(|c| c.is_answered()).count();
        (
            UNDERSTANDING_FLOOR + round_half_even(UNDERSTANDING_SPAN * answered, total),
            CONFIDENCE_FLOOR + round_half_even(CONFIDENCE_SPAN * answered, total),
        )
    }
}

/// Explicit value, else the larger of the current percentage and `computed`
fn target(doc: &Document, key: &str, explicit: Option<&str>, computed: usize) -> String {
    if let Some(value) = explicit {
        return value.trim().to_string();
    }
    let current = indicators::get(doc, key)
        .and_then(parse_percent)
        .unwrap_or(0);
    format!("{}%", current.max(computed))
}

/// Append entries not already present to `# Clarifications`, creating it last
fn upsert_clarifications(doc: &mut Document, entries: Vec<String>) -> bool {
    match doc.section_mut(CLARIFICATIONS_HEADER) {
        Some(section) => {
            let fresh: Vec<String> = entries
                .into_iter()
                .filter(|e| !section.body().iter().any(|l| l.trim() == e.as_str()))
                .collect();
            if fresh.is_empty() {
                return false;
            }
            let at = section.content().len();
            section.body_mut().splice(at..at, fresh);
            true
        }
        None if entries.is_empty() => false,
        None => {
            doc.push_section(Section::new(CLARIFICATIONS_HEADER, entries));
            true
        }
    }
}

/// Record `boost` in `doc`; returns whether anything changed
///
/// # Errors
///
/// [`IndicatorError::MissingTitle`] when `doc` has no title line, or
/// [`IndicatorError::MultilineValue`] for an explicit value spanning lines.
/// `doc` is untouched on error.
pub fn apply(doc: &mut Document, boost: &ConfidenceBoost) -> Result<bool, IndicatorError> {
    let (understanding, confidence) = boost.computed();
    let understanding = target(doc, UNDERSTANDING, boost.understanding.as_deref(), understanding);
    let confidence = target(doc, CONFIDENCE, boost.confidence.as_deref(), confidence);

    let mut next = doc.clone();
    let mut changed = indicators::set(&mut next, UNDERSTANDING, &understanding)?;
    changed |= indicators::set(&mut next, CONFIDENCE, &confidence)?;
    changed |= upsert_clarifications(&mut next, boost.answers.iter().map(Clarification::entry).collect());
    *doc = next;
    debug!(
        doc_ref = %doc.doc_ref(),
        understanding = %understanding,
        confidence = %confidence,
        changed,
        "applied clarifications"
    );
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn backlog(indicators: &str) -> Document {
        Document::from_text(
            "logics/backlog/item_000_a.md",
            &format!("## item_000_a - A\n{indicators}\n# Problem\nx\n\n# Notes\n- n\n"),
        )
    }

    #[test]
    fn question_sets_per_kind() {
        assert_eq!(default_questions(DocKind::Request).len(), 7);
        assert_eq!(default_questions(DocKind::Backlog).len(), 9);
        let task = default_questions(DocKind::Task);
        assert_eq!(task.len(), 9);
        assert_eq!(task[8].question, "Define validation commands.");
    }

    #[test]
    fn computed_values_scale_with_answers() {
        assert_eq!(ConfidenceBoost::with_defaults(DocKind::Request).computed(), (94, 92));
        assert_eq!(ConfidenceBoost::default().computed(), (70, 65));
        let half = ConfidenceBoost::new(vec![
            Clarification::new("q1", "a"),
            Clarification::new("q2", " "),
        ]);
        assert_eq!(half.computed(), (82, 79));
    }

    #[test]
    fn unknown_values_are_raised_and_section_appended() {
        let mut doc = backlog("> Understanding: ??%\n> Confidence: ??%\n");
        let boost = ConfidenceBoost::new(vec![Clarification::new("Scope?", "Login only.")]);
        assert!(apply(&mut doc, &boost).unwrap());
        assert_eq!(
            doc.to_text(),
            "## item_000_a - A
> Understanding: 94%
> Confidence: 92%

# Problem
x

# Notes
- n

# Clarifications
- Scope? :: Login only.
"
        );
    }

    #[test]
    fn higher_current_values_are_kept() {
        let mut doc = backlog("> Understanding: 97%\n> Confidence: 50%\n");
        apply(&mut doc, &ConfidenceBoost::default()).unwrap();
        assert_eq!(indicators::get(&doc, UNDERSTANDING), Some("97%"));
        assert_eq!(indicators::get(&doc, CONFIDENCE), Some("65%"));
    }

    #[test]
    fn explicit_values_win() {
        let mut doc = backlog("> Understanding: 97%\n");
        let boost = ConfidenceBoost::default()
            .with_understanding("60%")
            .with_confidence("55%");
        apply(&mut doc, &boost).unwrap();
        assert_eq!(indicators::get(&doc, UNDERSTANDING), Some("60%"));
        assert_eq!(indicators::get(&doc, CONFIDENCE), Some("55%"));
    }

    #[test]
    fn existing_section_gets_new_entries_only() {
        let mut doc = Document::from_text(
            "logics/tasks/task_000_a.md",
            "## task_000_a - A\n> Understanding: 94%\n> Confidence: 92%\n\n# Clarifications\n- Scope? :: Login only.\n\n# Plan\n- [ ] x\n",
        );
        let boost = ConfidenceBoost::new(vec![
            Clarification::new("Scope?", "Login only."),
            Clarification::new("Tests?", "cargo test"),
        ]);
        assert!(apply(&mut doc, &boost).unwrap());
        assert_eq!(
            doc.section(CLARIFICATIONS_HEADER).unwrap().content(),
            ["- Scope? :: Login only.", "- Tests? :: cargo test"]
        );
        assert!(doc.to_text().ends_with("- Tests? :: cargo test\n\n# Plan\n- [ ] x\n"));
        assert!(!apply(&mut doc, &boost).unwrap());
    }

    #[test]
    fn untitled_document_is_rejected_untouched() {
        let mut doc = Document::from_text("logics/backlog/item_000_a.md", "# Problem\nx\n");
        let before = doc.clone();
        assert!(matches!(
            apply(&mut doc, &ConfidenceBoost::with_defaults(DocKind::Backlog)),
            Err(IndicatorError::MissingTitle { .. })
        ));
        assert_eq!(doc, before);

        let mut titled = backlog("> Understanding: 10%\n");
        let before = titled.clone();
        let boost = ConfidenceBoost::default().with_confidence("50%\n# Plan");
        assert!(matches!(
            apply(&mut titled, &boost),
            Err(IndicatorError::MultilineValue { .. })
        ));
        assert_eq!(titled, before);
    }
}
