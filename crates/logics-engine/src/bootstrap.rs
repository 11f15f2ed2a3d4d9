//! Project skeleton
//!
//! Bootstrapping makes sure the docs directory and its kind and architecture
//! directories exist. Directories holding no file other than `.gitkeep` get an
//! empty `.gitkeep` so the skeleton survives a commit. Writing the `.gitkeep`
//! is what creates a missing directory, so a repository needs no separate
//! mkdir operation. The docs directory itself never gets one.

use crate::error::RepositoryError;
use crate::project::ProjectLayout;
use crate::repository::DocumentRepository;
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Placeholder keeping an empty directory under version control
pub const GITKEEP: &str = ".gitkeep";

/// Actions a bootstrap takes, or would take under `dry_run`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Skeleton directories that did not exist
    pub missing_dirs: Vec<PathBuf>,
    /// `.gitkeep` files written
    pub gitkeeps: Vec<PathBuf>,
    /// Whether writes were suppressed
    pub dry_run: bool,
}

impl BootstrapReport {
    /// Whether the skeleton was already complete
    #[inline]
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.missing_dirs.is_empty() && self.gitkeeps.is_empty()
    }
}

impl Display for BootstrapReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_noop() {
            return writeln!(f, "Logics bootstrap: OK (nothing to do)");
        }
        let marker = if self.dry_run { "[dry-run] " } else { "" };
        for dir in &self.missing_dirs {
            writeln!(f, "{marker}mkdir -p {}", dir.display())?;
        }
        for gitkeep in &self.gitkeeps {
            writeln!(f, "{marker}touch {}", gitkeep.display())?;
        }
        writeln!(f, "Logics bootstrap: OK")
    }
}

/// No file other than `.gitkeep` directly inside `dir`
fn is_effectively_empty<R: DocumentRepository + ?Sized>(
    repo: &R,
    dir: &Path,
) -> Result<bool, RepositoryError> {
    Ok(repo
        .list(dir)?
        .iter()
        .all(|path| path.file_name().is_some_and(|name| name == GITKEEP)))
}

/// Plan the skeleton actions for `layout` and apply them unless `dry_run`
///
/// Running it twice writes nothing the second time.
///
/// # Errors
///
/// Propagates listing and write failures; actions already applied stay applied.
pub fn bootstrap<R: DocumentRepository + ?Sized>(
    repo: &mut R,
    layout: &ProjectLayout,
    dry_run: bool,
) -> Result<BootstrapReport, RepositoryError> {
    let mut report = BootstrapReport {
        dry_run,
        ..BootstrapReport::default()
    };
    for dir in layout.skeleton_dirs() {
        if !repo.exists(&dir) {
            report.missing_dirs.push(dir.clone());
        }
        if dir.as_path() == layout.docs_dir() {
            continue;
        }
        let gitkeep = dir.join(GITKEEP);
        if is_effectively_empty(repo, &dir)? && !repo.exists(&gitkeep) {
            report.gitkeeps.push(gitkeep);
        }
    }

    if !dry_run {
        for gitkeep in &report.gitkeeps {
            repo.write(gitkeep, "")?;
        }
    }
    debug!(
        missing_dirs = report.missing_dirs.len(),
        gitkeeps = report.gitkeeps.len(),
        dry_run,
        "planned bootstrap"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryRepository;
    use pretty_assertions::assert_eq;

    #[test]
    fn fresh_repository_gets_every_directory() {
        let mut repo = MemoryRepository::new();
        let report = bootstrap(&mut repo, &ProjectLayout::default(), false).unwrap();
        assert_eq!(report.missing_dirs.len(), 6);
        assert_eq!(
            repo.paths().collect::<Vec<_>>(),
            [
                "logics/architecture/.gitkeep",
                "logics/backlog/.gitkeep",
                "logics/request/.gitkeep",
                "logics/specs/.gitkeep",
                "logics/tasks/.gitkeep",
            ]
            .map(Path::new)
        );
        assert_eq!(repo.text("logics/tasks/.gitkeep"), Some(""));
    }

    #[test]
    fn second_run_is_a_no_op() {
        let mut repo = MemoryRepository::new();
        bootstrap(&mut repo, &ProjectLayout::default(), false).unwrap();
        let again = bootstrap(&mut repo, &ProjectLayout::default(), false).unwrap();
        assert!(again.is_noop());
        assert_eq!(again.to_string(), "Logics bootstrap: OK (nothing to do)\n");
    }

    #[test]
    fn populated_directories_are_left_alone() {
        let mut repo = MemoryRepository::new()
            .with_file("logics/request/req_000_a.md", "## req_000_a - A\n")
            .with_file("logics/tasks/.gitkeep", "");
        let report = bootstrap(&mut repo, &ProjectLayout::default(), false).unwrap();
        assert_eq!(
            report.missing_dirs,
            ["logics/architecture", "logics/backlog", "logics/specs"].map(PathBuf::from)
        );
        assert_eq!(
            report.gitkeeps,
            [
                "logics/architecture/.gitkeep",
                "logics/backlog/.gitkeep",
                "logics/specs/.gitkeep",
            ]
            .map(PathBuf::from)
        );
        assert!(!repo.exists(Path::new("logics/request/.gitkeep")));
    }

    #[test]
    fn dry_run_writes_nothing() {
        let mut repo = MemoryRepository::new();
        let report = bootstrap(&mut repo, &ProjectLayout::default(), true).unwrap();
        assert!(repo.is_empty());
        let text = report.to_string();
        assert!(text.starts_with("[dry-run] mkdir -p logics\n"));
        assert!(text.contains("[dry-run] touch logics/specs/.gitkeep\n"));
    }
}
