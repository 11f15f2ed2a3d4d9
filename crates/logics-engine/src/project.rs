//! Project discovery and directory layout

use crate::error::{EngineError, EngineResult};
use logics_model::{DocKind, DocRef};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Default docs directory, also the marker of a project root
pub const DEFAULT_DOCS_DIR: &str = "logics";

/// Architecture decision records, below the docs directory
pub const ARCHITECTURE_DIR: &str = "architecture";

/// Walk upward from `start` to the first ancestor containing `docs_dir/`
///
/// # Errors
///
/// [`EngineError::MissingProjectRoot`] when no ancestor qualifies.
pub fn discover_project_root(start: &Path, docs_dir: &str) -> EngineResult<PathBuf> {
    let start = std::fs::canonicalize(start).unwrap_or_else(|_| start.to_path_buf());
    let root = start
        .ancestors()
        .find(|candidate| candidate.join(docs_dir).is_dir())
        .map(Path::to_path_buf)
        .ok_or_else(|| EngineError::missing_project_root(&start, docs_dir))?;
    debug!(root = %root.display(), "discovered project root");
    Ok(root)
}

/// Kind directories below the docs directory, relative to the project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    docs_dir: PathBuf,
}

impl ProjectLayout {
    /// Layout rooted at `docs_dir`
    #[inline]
    #[must_use]
    pub fn new(docs_dir: impl Into<PathBuf>) -> Self {
        Self {
            docs_dir: docs_dir.into(),
        }
    }

    /// Docs directory
    #[inline]
    #[must_use]
    pub fn docs_dir(&self) -> &Path {
        &self.docs_dir
    }

    /// Directory holding architecture decision records
    #[must_use]
    pub fn architecture_dir(&self) -> PathBuf {
        self.docs_dir.join(ARCHITECTURE_DIR)
    }

    /// Directories a bootstrapped project carries, docs directory first
    #[must_use]
    pub fn skeleton_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = vec![self.docs_dir.clone(), self.architecture_dir()];
        dirs.extend(DocKind::ALL.into_iter().map(|kind| self.kind_dir(kind)));
        dirs
    }

    /// Directory holding documents of `kind`
    #[must_use]
    pub fn kind_dir(&self, kind: DocKind) -> PathBuf {
        self.docs_dir.join(kind.directory())
    }

    /// Canonical location of `doc_ref`, if its kind is known
    #[must_use]
    pub fn path_for(&self, doc_ref: &DocRef) -> Option<PathBuf> {
        doc_ref
            .kind()
            .map(|kind| self.kind_dir(kind).join(format!("{doc_ref}.md")))
    }

    /// Kind whose directory directly contains `path`
    #[must_use]
    pub fn kind_of_dir(&self, path: &Path) -> Option<DocKind> {
        let parent = path.parent()?;
        DocKind::ALL
            .into_iter()
            .find(|kind| parent == self.kind_dir(*kind).as_path())
    }
}

impl Default for ProjectLayout {
    fn default() -> Self {
        Self::new(DEFAULT_DOCS_DIR)
    }
}

/// Render a root-relative path with `/` separators, as written into documents
#[must_use]
pub fn display_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
