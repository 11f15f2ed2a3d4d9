//! Error types for the Logics engine
//!
//! Provides error handling for:
//! - Repository access (list/read/write)
//! - Parsing (bytes → Document)
//! - Indicator edits
//! - Configuration loading
//! - Workspace operations (the umbrella [`EngineError`])

use logics_model::{DocKind, DocRefError};
use std::path::{Path, PathBuf};

/// Errors raised by a [`crate::DocumentRepository`]
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Underlying IO failure
    #[error("io error at {}: {source}", .path.display())]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// OS error
        #[source]
        source: std::io::Error,
    },

    /// Path does not exist in the repository
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Refused to overwrite an existing document
    #[error("already exists: {}", .0.display())]
    AlreadyExists(PathBuf),
}

impl RepositoryError {
    /// Create IO error for path, mapping `NotFound` to [`RepositoryError::NotFound`]
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::NotFound(path);
        }
        Self::Io { path, source }
    }
}

/// Errors during document parsing (bytes → Document)
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// File content is not valid UTF-8
    #[error("cannot decode {} as UTF-8: {source}", .path.display())]
    Decode {
        /// Undecodable file
        path: PathBuf,
        /// Decoder error
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// Repository failed to provide the bytes
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ParseError {
    /// Create decode error for path
    pub fn decode_error(path: impl Into<PathBuf>, source: std::string::FromUtf8Error) -> Self {
        Self::Decode {
            path: path.into(),
            source,
        }
    }
}

/// Errors while reading or writing indicators
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndicatorError {
    /// The indicator block lives under the title; without one there is no anchor
    #[error("{doc_ref} has no '## ' title line to anchor indicators")]
    MissingTitle {
        /// Ref of the untitled document
        doc_ref: String,
    },

    /// Key outside "From version", "Understanding", "Confidence", "Progress"
    #[error("unknown indicator key: '{0}'")]
    UnknownKey(String),

    /// Indicator values live on one `> Key: value` line
    #[error("value for indicator '{key}' must be a single line")]
    MultilineValue {
        /// Indicator key
        key: String,
    },
}

/// Errors while loading `logics.toml`
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read config {}: {source}", .path.display())]
    Io {
        /// Config file path
        path: PathBuf,
        /// Repository read failure
        #[source]
        source: RepositoryError,
    },

    /// Config file is not valid TOML for [`crate::EngineConfig`]
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Config values out of range
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Umbrella error for workspace operations
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No ancestor of `start` contains the docs directory
    #[error("could not locate project root from {} (missing '{marker}/' directory)", .start.display())]
    MissingProjectRoot {
        /// Directory the search started from
        start: PathBuf,
        /// Docs directory name looked for
        marker: String,
    },

    /// Prefix outside req/item/task/spec for a kind-specific operation
    #[error("unknown document kind for {0}")]
    UnknownDocKind(String),

    /// Promotion path not supported (only request → backlog and backlog → task)
    #[error("cannot promote {from} to {to}")]
    UnsupportedPromotion {
        /// Ref of the source document
        from: String,
        /// Requested target kind
        to: DocKind,
    },

    /// Section pack has no placement for this kind
    #[error("section pack '{pack}' does not apply to {kind} documents")]
    PackNotApplicable {
        /// Pack name
        pack: String,
        /// Kind of the target document
        kind: DocKind,
    },

    /// Titles must contain at least one non-blank character
    #[error("document title must not be empty")]
    EmptyTitle,

    /// A title is written into the single `## ` heading line
    #[error("document title must be a single line")]
    MultilineTitle,

    /// Ids are rendered with three digits
    #[error("no free id left in {} (ids are limited to 000-999)", .dir.display())]
    IdSpaceExhausted {
        /// Directory whose ids ran out
        dir: PathBuf,
    },

    /// Repository access failed
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// A document could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// An indicator could not be read or written
    #[error(transparent)]
    Indicator(#[from] IndicatorError),

    /// `logics.toml` could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A doc ref string was rejected
    #[error(transparent)]
    DocRef(#[from] DocRefError),
}

impl EngineError {
    /// Create missing-root error
    pub fn missing_project_root(start: &Path, marker: &str) -> Self {
        Self::MissingProjectRoot {
            start: start.to_path_buf(),
            marker: marker.to_string(),
        }
    }
}

/// Result alias for workspace operations
pub type EngineResult<T> = Result<T, EngineError>;

/// A document a batch operation could not process
#[derive(Debug)]
pub struct DocumentFailure {
    /// Document path, relative to the project root
    pub path: PathBuf,
    /// What went wrong
    pub error: EngineError,
}

impl DocumentFailure {
    /// Record a failure for `path`
    pub fn new(path: impl Into<PathBuf>, error: impl Into<EngineError>) -> Self {
        Self {
            path: path.into(),
            error: error.into(),
        }
    }
}

impl std::fmt::Display for DocumentFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_not_found_maps_to_not_found() {
        let err = RepositoryError::io_error(
            "logics/x.md",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, RepositoryError::NotFound(p) if p == Path::new("logics/x.md")));
    }

    #[test]
    fn messages_name_the_path() {
        let err = EngineError::missing_project_root(Path::new("/tmp/a"), "logics");
        assert_eq!(
            err.to_string(),
            "could not locate project root from /tmp/a (missing 'logics/' directory)"
        );
        let failure = DocumentFailure::new("logics/tasks/t.md", EngineError::EmptyTitle);
        assert_eq!(failure.to_string(), "logics/tasks/t.md: document title must not be empty");
    }
}
