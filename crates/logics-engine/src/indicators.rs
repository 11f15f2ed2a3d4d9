//! Indicator manager
//!
//! Reads and writes the `> Key: value` block under the title, keeping keys in
//! canonical order, and derives `Progress` from checklists.

use crate::error::IndicatorError;
use logics_model::{DocKind, Document};

/// `> From version: ...`
pub const FROM_VERSION: &str = "From version";
/// `> Understanding: ...`
pub const UNDERSTANDING: &str = "Understanding";
/// `> Confidence: ...`
pub const CONFIDENCE: &str = "Confidence";
/// `> Progress: ...` (backlog items and tasks)
pub const PROGRESS: &str = "Progress";

/// Canonical key order inside the block
pub const CANONICAL_ORDER: [&str; 4] = [FROM_VERSION, UNDERSTANDING, CONFIDENCE, PROGRESS];

/// Sentinel for a percentage nobody has assessed yet
pub const UNKNOWN_PERCENT: &str = "??%";

const REQUIRED_WITH_PROGRESS: [&str; 4] = CANONICAL_ORDER;
const REQUIRED_WITHOUT_PROGRESS: [&str; 3] = [FROM_VERSION, UNDERSTANDING, CONFIDENCE];

/// Default written for a missing required key
#[must_use]
pub fn default_value(key: &str) -> Option<&'static str> {
    match key {
        FROM_VERSION => Some("X.X.X"),
        UNDERSTANDING | CONFIDENCE => Some(UNKNOWN_PERCENT),
        PROGRESS => Some("0%"),
        _ => None,
    }
}

/// Keys a document of `kind` must carry, in canonical order
#[must_use]
pub fn required_keys(kind: DocKind) -> &'static [&'static str] {
    if kind.tracks_progress() {
        &REQUIRED_WITH_PROGRESS
    } else {
        &REQUIRED_WITHOUT_PROGRESS
    }
}

fn rank(key: &str) -> Option<usize> {
    CANONICAL_ORDER.iter().position(|k| *k == key)
}

/// Value of `key` in the indicator block
#[must_use]
pub fn get<'a>(doc: &'a Document, key: &str) -> Option<&'a str> {
    doc.indicators().get(key)
}

/// Set `key` to `value`, replacing in place or inserting in canonical order
///
/// Returns whether the document changed.
///
/// # Errors
///
/// [`IndicatorError::UnknownKey`] for keys outside [`CANONICAL_ORDER`],
/// [`IndicatorError::MultilineValue`] for a value with a line break,
/// [`IndicatorError::MissingTitle`] when the document has no title line.
pub fn set(doc: &mut Document, key: &str, value: &str) -> Result<bool, IndicatorError> {
    let key_rank = rank(key).ok_or_else(|| IndicatorError::UnknownKey(key.to_string()))?;
    if value.contains(['\n', '\r']) {
        return Err(IndicatorError::MultilineValue {
            key: key.to_string(),
        });
    }
    if doc.heading().is_none() {
        return Err(IndicatorError::MissingTitle {
            doc_ref: doc.doc_ref().to_string(),
        });
    }

    if let Some(index) = doc.indicators().position(key) {
        return Ok(doc.indicators_mut().replace(index, key, value));
    }

    let block = doc.indicators();
    let at = block
        .lines()
        .iter()
        .position(|line| line.key().and_then(rank).is_some_and(|r| r > key_rank))
        .unwrap_or(block.len());
    doc.indicators_mut().insert(at, key, value);
    doc.separate_indicators();
    Ok(true)
}

/// Insert defaults for every required key that is absent; never overwrites
///
/// # Errors
///
/// [`IndicatorError::MissingTitle`] when a key is missing and the document
/// has no title line to anchor it.
pub fn ensure_required(doc: &mut Document, kind: DocKind) -> Result<bool, IndicatorError> {
    let mut changed = false;
    for key in required_keys(kind) {
        if doc.indicators().contains(key) {
            continue;
        }
        let value = default_value(key).unwrap_or(UNKNOWN_PERCENT);
        changed |= set(doc, key, value)?;
    }
    Ok(changed)
}

/// Progress derived from checklists, or `None` when there is no basis
///
/// Tasks read `# Plan`; backlog items read `# Plan` then
/// `# Acceptance criteria` (first section with checklist lines wins).
/// Requests and specs never derive progress.
#[must_use]
pub fn compute_auto_progress(doc: &Document, kind: DocKind) -> Option<String> {
    let headers: &[&str] = match kind {
        DocKind::Task => &["# Plan"],
        DocKind::Backlog => &["# Plan", "# Acceptance criteria"],
        DocKind::Request | DocKind::Spec => return None,
    };
    headers.iter().find_map(|header| {
        let (done, total) = doc.section(header)?.checklist();
        (total > 0).then(|| format!("{}%", percent_half_even(done, total)))
    })
}

/// Set `Progress` from checklists when there is a basis; leaves it alone otherwise
///
/// # Errors
///
/// [`IndicatorError::MissingTitle`] when a value must be written into an
/// untitled document.
pub fn apply_auto_progress(doc: &mut Document, kind: DocKind) -> Result<bool, IndicatorError> {
    match compute_auto_progress(doc, kind) {
        Some(value) => set(doc, PROGRESS, &value),
        None => Ok(false),
    }
}

/// `round(done / total * 100)` with ties to even
fn percent_half_even(done: usize, total: usize) -> usize {
    round_half_even(done * 100, total)
}

/// `round(numerator / denominator)` with ties to even; `0` for a zero denominator
pub(crate) fn round_half_even(numerator: usize, denominator: usize) -> usize {
    if denominator == 0 {
        return 0;
    }
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    match (remainder * 2).cmp(&denominator) {
        std::cmp::Ordering::Greater => quotient + 1,
        std::cmp::Ordering::Equal if quotient % 2 == 1 => quotient + 1,
        _ => quotient,
    }
}

/// First run of digits in an indicator value (`"85%"` → 85, `"??%"` → `None`)
#[must_use]
pub fn parse_percent(value: &str) -> Option<usize> {
    let start = value.find(|c: char| c.is_ascii_digit())?;
    let digits: String = value[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}
