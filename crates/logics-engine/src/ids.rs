//! Sequential id allocation

use crate::error::RepositoryError;
use crate::repository::DocumentRepository;
use std::path::Path;
use tracing::debug;

/// Id encoded in `file_name` when it matches `^{prefix}_(\d{3})_.*\.md$`
#[must_use]
pub fn id_from_file_name(file_name: &str, prefix: &str) -> Option<u32> {
    let rest = file_name.strip_prefix(prefix)?.strip_prefix('_')?;
    let digits = rest.get(..3)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let tail = rest[3..].strip_prefix('_')?;
    if !tail.ends_with(".md") {
        return None;
    }
    digits.parse().ok()
}

/// Next free id in `dir` for `prefix`: `max + 1`, or `0` when none match
///
/// Gaps are never filled. Non-matching names are ignored.
///
/// # Errors
///
/// Propagates directory listing failures.
pub fn allocate_id<R: DocumentRepository + ?Sized>(
    repo: &R,
    dir: &Path,
    prefix: &str,
) -> Result<u32, RepositoryError> {
    let next = repo
        .list(dir)?
        .iter()
        .filter_map(|path| path.file_name()?.to_str())
        .filter_map(|name| id_from_file_name(name, prefix))
        .max()
        .map_or(0, |max| max + 1);
    debug!(dir = %dir.display(), prefix, id = next, "allocated id");
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryRepository;

    #[test]
    fn parses_matching_names_only() {
        assert_eq!(id_from_file_name("item_004_login.md", "item"), Some(4));
        assert_eq!(id_from_file_name("item_004_.md", "item"), Some(4));
        assert_eq!(id_from_file_name("item_04_login.md", "item"), None);
        assert_eq!(id_from_file_name("item_0004_login.md", "item"), None);
        assert_eq!(id_from_file_name("item_004_login.txt", "item"), None);
        assert_eq!(id_from_file_name("task_004_login.md", "item"), None);
        assert_eq!(id_from_file_name("item_é04_x.md", "item"), None);
    }

    #[test]
    fn empty_directory_starts_at_zero() {
        let repo = MemoryRepository::new();
        assert_eq!(allocate_id(&repo, Path::new("logics/backlog"), "item").unwrap(), 0);
    }

    #[test]
    fn gaps_are_not_filled() {
        let repo = MemoryRepository::new()
            .with_file("logics/backlog/item_000_a.md", "")
            .with_file("logics/backlog/item_004_b.md", "")
            .with_file("logics/backlog/notes.md", "")
            .with_file("logics/backlog/item_12_bad.md", "");
        assert_eq!(allocate_id(&repo, Path::new("logics/backlog"), "item").unwrap(), 5);
    }
}
