//! Line classification
//!
//! Every line of a document is classified once into a [`LineToken`]. The
//! structural builder in [`crate::document`] and the checklist scanner consume
//! these tokens instead of re-running ad hoc patterns.

use once_cell::sync::Lazy;
use regex::Regex;

static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^##\s+(\S+)\s*-\s*(.+?)\s*$").expect("static regex"));

static CHECKLIST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*- \[([xX ])\]\s?(.*)$").expect("static regex"));

/// Prefix of a level-1 section heading
pub const SECTION_PREFIX: &str = "# ";
/// Prefix of the level-2 title heading
pub const TITLE_PREFIX: &str = "## ";
/// Prefix of an indicator line
pub const INDICATOR_PREFIX: &str = "> ";

/// Typed classification of a single line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineToken<'a> {
    /// `## <label> - <title>` or `## <title>`
    TitleHeading {
        /// Ref as written before ` - `, if present
        label: Option<&'a str>,
        /// Title text
        title: &'a str,
    },
    /// `> key: value`; `key` is `None` when the line has no colon
    IndicatorLine {
        /// Trimmed key before the first colon
        key: Option<&'a str>,
        /// Trimmed value after the first colon (or the whole payload)
        value: &'a str,
    },
    /// `# Header`
    SectionHeading(&'a str),
    /// `- [ ] text` / `- [x] text`
    ChecklistLine {
        /// Whether the box is ticked
        done: bool,
        /// Item text
        text: &'a str,
    },
    /// Anything else
    PlainLine(&'a str),
}

impl LineToken<'_> {
    /// Whether this token opens a section
    #[inline]
    #[must_use]
    pub fn is_section_heading(&self) -> bool {
        matches!(self, Self::SectionHeading(_))
    }
}

/// Classify a single line without positional context
#[must_use]
pub fn classify_line(line: &str) -> LineToken<'_> {
    if line.starts_with(TITLE_PREFIX) {
        return match TITLE_RE.captures(line) {
            Some(caps) => {
                let label = caps.get(1).map(|m| m.as_str());
                let title = caps.get(2).map_or("", |m| m.as_str());
                LineToken::TitleHeading { label, title }
            }
            None => LineToken::TitleHeading {
                label: None,
                title: line[TITLE_PREFIX.len()..].trim(),
            },
        };
    }

    if line.starts_with(SECTION_PREFIX) {
        return LineToken::SectionHeading(line.trim());
    }

    if let Some(payload) = line.strip_prefix(INDICATOR_PREFIX) {
        return match payload.split_once(':') {
            Some((key, value)) => LineToken::IndicatorLine {
                key: Some(key.trim()),
                value: value.trim(),
            },
            None => LineToken::IndicatorLine {
                key: None,
                value: payload.trim(),
            },
        };
    }

    if let Some(caps) = CHECKLIST_RE.captures(line) {
        let done = caps.get(1).is_some_and(|m| m.as_str().eq_ignore_ascii_case("x"));
        let text = caps.get(2).map_or("", |m| m.as_str());
        return LineToken::ChecklistLine { done, text };
    }

    LineToken::PlainLine(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_with_label() {
        assert_eq!(
            classify_line("## item_001_login - Add login button"),
            LineToken::TitleHeading {
                label: Some("item_001_login"),
                title: "Add login button"
            }
        );
    }

    #[test]
    fn title_without_label() {
        assert_eq!(
            classify_line("## Just a title"),
            LineToken::TitleHeading {
                label: None,
                title: "Just a title"
            }
        );
    }

    #[test]
    fn section_heading_is_trimmed() {
        assert_eq!(classify_line("# Plan  "), LineToken::SectionHeading("# Plan"));
        assert!(classify_line("# Plan").is_section_heading());
        assert!(!classify_line("#Plan").is_section_heading());
    }

    #[test]
    fn indicator_splits_on_first_colon() {
        assert_eq!(
            classify_line("> From version: 1.2:3"),
            LineToken::IndicatorLine {
                key: Some("From version"),
                value: "1.2:3"
            }
        );
        assert_eq!(
            classify_line("> just a quote"),
            LineToken::IndicatorLine {
                key: None,
                value: "just a quote"
            }
        );
    }

    #[test]
    fn checklist_markers() {
        assert_eq!(
            classify_line("- [X] done"),
            LineToken::ChecklistLine {
                done: true,
                text: "done"
            }
        );
        assert_eq!(
            classify_line("  - [ ] todo"),
            LineToken::ChecklistLine {
                done: false,
                text: "todo"
            }
        );
        assert_eq!(classify_line("- [-] nope"), LineToken::PlainLine("- [-] nope"));
    }
}
