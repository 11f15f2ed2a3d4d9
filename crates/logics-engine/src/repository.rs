//! Document repository
//!
//! All reads and writes go through [`DocumentRepository`] so the engine can
//! run against the filesystem ([`FsRepository`]) or an in-memory map
//! ([`MemoryRepository`]) in tests. Paths are always relative to the project
//! root.

use crate::error::RepositoryError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Storage backend for Logics documents
pub trait DocumentRepository {
    /// Direct children of `dir` that are files, sorted. A missing directory
    /// yields an empty list.
    fn list(&self, dir: &Path) -> Result<Vec<PathBuf>, RepositoryError>;

    /// Raw bytes of `path`
    fn read(&self, path: &Path) -> Result<Vec<u8>, RepositoryError>;

    /// Write `content` to `path`, creating parent directories
    fn write(&mut self, path: &Path, content: &str) -> Result<(), RepositoryError>;

    /// Whether `path` exists
    fn exists(&self, path: &Path) -> bool;

    /// Write `content` only if `path` does not exist yet
    fn write_new(&mut self, path: &Path, content: &str) -> Result<(), RepositoryError> {
        if self.exists(path) {
            return Err(RepositoryError::AlreadyExists(path.to_path_buf()));
        }
        self.write(path, content)
    }
}

/// Filesystem-backed repository rooted at the project root
#[derive(Debug, Clone)]
pub struct FsRepository {
    root: PathBuf,
}

impl FsRepository {
    /// Create repository for `root`
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Project root
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DocumentRepository for FsRepository {
    fn list(&self, dir: &Path) -> Result<Vec<PathBuf>, RepositoryError> {
        let entries = match fs::read_dir(self.root.join(dir)) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(RepositoryError::io_error(dir, e)),
        };

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| RepositoryError::io_error(dir, e))?;
            let file_type = entry.file_type().map_err(|e| RepositoryError::io_error(dir, e))?;
            if file_type.is_file() {
                paths.push(dir.join(entry.file_name()));
            }
        }
        paths.sort();
        Ok(paths)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, RepositoryError> {
        fs::read(self.root.join(path)).map_err(|e| RepositoryError::io_error(path, e))
    }

    fn write(&mut self, path: &Path, content: &str) -> Result<(), RepositoryError> {
        let full = self.root.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|e| RepositoryError::io_error(path, e))?;
        }
        fs::write(&full, content).map_err(|e| RepositoryError::io_error(path, e))?;
        debug!(path = %path.display(), bytes = content.len(), "wrote file");
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.root.join(path).exists()
    }
}

/// In-memory repository: an ordered map of path → bytes
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl MemoryRepository {
    /// Create empty repository
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a text file
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: &str) -> Self {
        self.files.insert(path.into(), content.as_bytes().to_vec());
        self
    }

    /// Insert raw bytes (used to simulate undecodable files)
    pub fn insert_bytes(&mut self, path: impl Into<PathBuf>, bytes: Vec<u8>) {
        self.files.insert(path.into(), bytes);
    }

    /// Text of `path`, if present and valid UTF-8
    #[must_use]
    pub fn text(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files
            .get(path.as_ref())
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    /// All stored paths
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    /// Number of stored files
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no files are stored
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl DocumentRepository for MemoryRepository {
    fn list(&self, dir: &Path) -> Result<Vec<PathBuf>, RepositoryError> {
        Ok(self
            .files
            .keys()
            .filter(|path| path.parent() == Some(dir))
            .cloned()
            .collect())
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, RepositoryError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(path.to_path_buf()))
    }

    fn write(&mut self, path: &Path, content: &str) -> Result<(), RepositoryError> {
        self.files.insert(path.to_path_buf(), content.as_bytes().to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
            || self.files.keys().any(|p| p.starts_with(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_list_is_non_recursive_and_sorted() {
        let repo = MemoryRepository::new()
            .with_file("logics/tasks/task_001_b.md", "b")
            .with_file("logics/tasks/task_000_a.md", "a")
            .with_file("logics/tasks/archive/task_009_old.md", "old");
        let listed = repo.list(Path::new("logics/tasks")).unwrap();
        assert_eq!(
            listed,
            vec![
                PathBuf::from("logics/tasks/task_000_a.md"),
                PathBuf::from("logics/tasks/task_001_b.md"),
            ]
        );
        assert!(repo.list(Path::new("logics/specs")).unwrap().is_empty());
    }

    #[test]
    fn memory_write_new_refuses_overwrite() {
        let mut repo = MemoryRepository::new().with_file("a.md", "x");
        let err = repo.write_new(Path::new("a.md"), "y").unwrap_err();
        assert!(matches!(err, RepositoryError::AlreadyExists(_)));
        assert_eq!(repo.text("a.md"), Some("x"));
    }

    #[test]
    fn memory_dirs_exist_through_children() {
        let repo = MemoryRepository::new().with_file("logics/request/req_000_a.md", "x");
        assert!(repo.exists(Path::new("logics")));
        assert!(!repo.exists(Path::new("logics/backlog")));
    }

    #[test]
    fn fs_repository_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = FsRepository::new(dir.path());
        let path = Path::new("logics/backlog/item_000_a.md");
        repo.write(path, "## item_000_a - A\n").unwrap();

        assert!(repo.exists(path));
        assert_eq!(repo.read(path).unwrap(), b"## item_000_a - A\n");
        assert_eq!(
            repo.list(Path::new("logics/backlog")).unwrap(),
            vec![path.to_path_buf()]
        );
        assert!(repo.list(Path::new("logics/tasks")).unwrap().is_empty());
        assert!(matches!(
            repo.read(Path::new("logics/missing.md")),
            Err(RepositoryError::NotFound(_))
        ));
    }
}
