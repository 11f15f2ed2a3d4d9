//! Parsing entry points (repository bytes → [`Document`])

use crate::error::{DocumentFailure, ParseError, RepositoryError};
use crate::project::ProjectLayout;
use crate::repository::DocumentRepository;
use logics_model::{DocKind, Document};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Parse one document
///
/// Structural irregularities are tolerated; only undecodable bytes fail.
///
/// # Errors
///
/// [`ParseError::Decode`] for non UTF-8 content, [`ParseError::Repository`]
/// when the file cannot be read.
pub fn parse<R: DocumentRepository + ?Sized>(repo: &R, path: &Path) -> Result<Document, ParseError> {
    let bytes = repo.read(path)?;
    let text = String::from_utf8(bytes).map_err(|e| ParseError::decode_error(path, e))?;
    let doc = Document::from_text(path, &text);
    debug!(
        path = %path.display(),
        doc_ref = %doc.doc_ref(),
        sections = doc.sections().len(),
        "parsed document"
    );
    Ok(doc)
}

/// Markdown files of every kind directory, in kind order then path order
///
/// # Errors
///
/// Propagates directory listing failures.
pub fn list_documents<R: DocumentRepository + ?Sized>(
    repo: &R,
    layout: &ProjectLayout,
) -> Result<Vec<PathBuf>, RepositoryError> {
    let mut paths = Vec::new();
    for kind in DocKind::ALL {
        let listed = repo.list(&layout.kind_dir(kind))?;
        paths.extend(
            listed
                .into_iter()
                .filter(|p| p.extension().is_some_and(|ext| ext == "md")),
        );
    }
    Ok(paths)
}

/// Result of loading every document: successes next to per-file failures
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Parsed documents, in listing order
    pub documents: Vec<Document>,
    /// Files that could not be parsed
    pub failures: Vec<DocumentFailure>,
}

impl LoadReport {
    /// Document at `path`, if it was loaded
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&Document> {
        self.documents.iter().find(|d| d.path() == path)
    }

    /// Whether every listed file parsed
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Load every document, skipping and recording the ones that fail
///
/// # Errors
///
/// Only directory listing failures abort the load.
pub fn load_documents<R: DocumentRepository + ?Sized>(
    repo: &R,
    layout: &ProjectLayout,
) -> Result<LoadReport, RepositoryError> {
    let mut report = LoadReport::default();
    for path in list_documents(repo, layout)? {
        match parse(repo, &path) {
            Ok(doc) => {
                if !doc.doc_ref().is_well_formed() {
                    warn!(path = %path.display(), "malformed filename, using stem as doc ref");
                }
                report.documents.push(doc);
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "skipping unreadable document");
                report.failures.push(DocumentFailure::new(path, error));
            }
        }
    }
    debug!(
        documents = report.documents.len(),
        failures = report.failures.len(),
        "loaded documents"
    );
    Ok(report)
}
