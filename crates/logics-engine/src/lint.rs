//! Structural linter
//!
//! Read-only counterpart of the fixer: reports what is missing or irregular
//! without touching any document. Undecodable files from the load pass are
//! reported next to parsed ones.

use crate::fixer::template_for;
use crate::indicators;
use crate::parser::LoadReport;
use crate::project::{display_path, ProjectLayout};
use logics_model::{DocKind, Document};
use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use tracing::debug;

/// One problem found in one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LintFinding {
    /// Name is not `{prefix}_{ddd}_{slug}.md`
    MalformedFilename(String),
    /// No `## ` title line before the first section
    MissingTitle,
    /// Title line does not start with `## <stem> - `
    HeadingMismatch {
        /// Expected line prefix
        expected: String,
    },
    /// Required indicator absent from the block
    MissingIndicator(&'static str),
    /// Required section absent
    MissingSection(&'static str),
    /// Header appearing more than once
    DuplicateSection(String),
    /// Prefix is not one of the known kinds
    UnknownKind,
    /// Document lives outside its kind's directory
    KindDirectoryMismatch {
        /// Kind from the filename
        kind: DocKind,
        /// Directory it should live in
        expected: String,
    },
    /// Bytes could not be decoded
    Undecodable(String),
}

impl Display for LintFinding {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedFilename(name) => write!(f, "bad filename: {name}"),
            Self::MissingTitle => f.write_str("missing first heading (expected '## ...')"),
            Self::HeadingMismatch { expected } => {
                write!(f, "bad heading: expected '{expected}<Title>'")
            }
            Self::MissingIndicator(key) => write!(f, "missing indicator: {key}"),
            Self::MissingSection(header) => write!(f, "missing section: {header}"),
            Self::DuplicateSection(header) => write!(f, "duplicate section: {header}"),
            Self::UnknownKind => f.write_str("unknown document kind"),
            Self::KindDirectoryMismatch { kind, expected } => {
                write!(f, "{kind} document outside {expected}/")
            }
            Self::Undecodable(reason) => write!(f, "undecodable: {reason}"),
        }
    }
}

/// A finding and the document it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintIssue {
    /// Root-relative path
    pub path: PathBuf,
    /// What is wrong
    pub finding: LintFinding,
}

/// Findings of a lint run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintReport {
    /// Every issue, in document order
    pub issues: Vec<LintIssue>,
    /// Number of files looked at
    pub checked: usize,
}

impl LintReport {
    /// No issues found
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

impl Display for LintReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return writeln!(f, "Logics lint: OK");
        }
        writeln!(f, "Logics lint: FAILED")?;
        for issue in &self.issues {
            writeln!(f, "- {}: {}", display_path(&issue.path), issue.finding)?;
        }
        Ok(())
    }
}

fn duplicate_headers(doc: &Document) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    doc.headers()
        .filter(|header| !seen.insert(*header) && reported.insert(*header))
        .map(str::to_string)
        .collect()
}

/// Findings for one parsed document
#[must_use]
pub fn lint_document(doc: &Document, layout: &ProjectLayout) -> Vec<LintFinding> {
    let mut findings = Vec::new();
    let doc_ref = doc.doc_ref();

    if !doc_ref.is_well_formed() {
        let name = doc
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        findings.push(LintFinding::MalformedFilename(name));
    }

    match doc.heading() {
        None => findings.push(LintFinding::MissingTitle),
        Some(heading) => {
            let expected = format!("## {doc_ref} - ");
            if !heading.raw().starts_with(&expected) {
                findings.push(LintFinding::HeadingMismatch { expected });
            }
        }
    }

    let Some(kind) = doc.kind() else {
        findings.push(LintFinding::UnknownKind);
        return findings;
    };

    for &key in indicators::required_keys(kind) {
        if !doc.indicators().contains(key) {
            findings.push(LintFinding::MissingIndicator(key));
        }
    }
    for header in template_for(kind).headers() {
        if !doc.has_section(header) {
            findings.push(LintFinding::MissingSection(header));
        }
    }
    findings.extend(duplicate_headers(doc).into_iter().map(LintFinding::DuplicateSection));

    if layout.kind_of_dir(doc.path()) != Some(kind) {
        findings.push(LintFinding::KindDirectoryMismatch {
            kind,
            expected: display_path(&layout.kind_dir(kind)),
        });
    }
    findings
}

/// Lint every loaded document plus the load failures
#[must_use]
pub fn lint(report: &LoadReport, layout: &ProjectLayout) -> LintReport {
    let mut lint = LintReport {
        checked: report.documents.len() + report.failures.len(),
        ..LintReport::default()
    };
    for doc in &report.documents {
        lint.issues.extend(lint_document(doc, layout).into_iter().map(|finding| LintIssue {
            path: doc.path().to_path_buf(),
            finding,
        }));
    }
    for failure in &report.failures {
        lint.issues.push(LintIssue {
            path: failure.path.clone(),
            finding: LintFinding::Undecodable(failure.error.to_string()),
        });
    }
    debug!(checked = lint.checked, issues = lint.issues.len(), "linted documents");
    lint
}
