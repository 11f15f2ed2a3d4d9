//! Engine configuration
//!
//! Read from an optional `logics.toml` at the project root:
//!
//! ```toml
//! docs_dir = "logics"
//!
//! [progress]
//! auto = true
//!
//! [duplicates]
//! threshold = 0.6
//! include_related = false
//! top = 40
//!
//! [review]
//! placeholders = ["Describe the need"]
//! ```

use crate::duplicates::{DuplicateOptions, RelatedPairs};
use crate::error::ConfigError;
use crate::project::DEFAULT_DOCS_DIR;
use crate::repository::DocumentRepository;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Config file name, looked up at the project root
pub const CONFIG_FILE: &str = "logics.toml";

/// Template snippets the global review flags as unfinished
pub const DEFAULT_PLACEHOLDERS: [&str; 8] = [
    "Describe the need",
    "Add context and constraints",
    "Describe the problem and user impact",
    "Define an objective acceptance check",
    "Define acceptance criteria",
    "First implementation step",
    "Second implementation step",
    "Third implementation step",
];

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Docs directory below the project root (also the root marker)
    pub docs_dir: String,
    /// Progress derivation
    pub progress: ProgressConfig,
    /// Duplicate detection
    pub duplicates: DuplicateConfig,
    /// Global review
    pub review: ReviewConfig,
}

/// Progress derivation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProgressConfig {
    /// Derive `Progress` from checklists during batch fixing
    pub auto: bool,
}

/// Duplicate detection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DuplicateConfig {
    /// Minimum score for a reported pair
    pub threshold: f64,
    /// Also compare documents sharing a slug
    pub include_related: bool,
    /// Maximum number of reported pairs
    pub top: usize,
}

/// Global review settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReviewConfig {
    /// Snippets that mark leftover template text
    pub placeholders: Vec<String>,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With docs directory
    #[inline]
    #[must_use]
    pub fn with_docs_dir(mut self, docs_dir: impl Into<String>) -> Self {
        self.docs_dir = docs_dir.into();
        self
    }

    /// With automatic progress derivation on or off
    #[inline]
    #[must_use]
    pub fn with_auto_progress(mut self, auto: bool) -> Self {
        self.progress.auto = auto;
        self
    }

    /// With duplicate threshold
    #[inline]
    #[must_use]
    pub fn with_duplicate_threshold(mut self, threshold: f64) -> Self {
        self.duplicates.threshold = threshold;
        self
    }

    /// With same-slug pairs included in duplicate detection
    #[inline]
    #[must_use]
    pub fn with_include_related(mut self, include: bool) -> Self {
        self.duplicates.include_related = include;
        self
    }

    /// Parse and validate TOML text
    ///
    /// # Errors
    ///
    /// [`ConfigError::Toml`] on syntax or schema errors,
    /// [`ConfigError::Invalid`] on out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `logics.toml` from the repository root; missing file → defaults
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] for unreadable or invalid files.
    pub fn load<R: DocumentRepository + ?Sized>(repo: &R) -> Result<Self, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        if !repo.exists(path) {
            debug!("no {CONFIG_FILE}, using defaults");
            return Ok(Self::default());
        }
        let bytes = repo.read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8(bytes)
            .map_err(|_| ConfigError::Invalid(format!("{CONFIG_FILE} is not valid UTF-8")))?;
        let config = Self::from_toml_str(&text)?;
        debug!(?config, "loaded {CONFIG_FILE}");
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.docs_dir.trim().is_empty() {
            return Err(ConfigError::Invalid("docs_dir must not be empty".into()));
        }
        let threshold = self.duplicates.threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::Invalid(format!(
                "duplicates.threshold must be within [0, 1], got {threshold}"
            )));
        }
        Ok(())
    }

    /// Duplicate detection options derived from this config
    #[must_use]
    pub fn duplicate_options(&self) -> DuplicateOptions {
        DuplicateOptions {
            threshold: self.duplicates.threshold,
            related: if self.duplicates.include_related {
                RelatedPairs::Include
            } else {
                RelatedPairs::Skip
            },
            top: Some(self.duplicates.top),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            docs_dir: DEFAULT_DOCS_DIR.to_string(),
            progress: ProgressConfig::default(),
            duplicates: DuplicateConfig::default(),
            review: ReviewConfig::default(),
        }
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self { auto: true }
    }
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            threshold: 0.6,
            include_related: false,
            top: 40,
        }
    }
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            placeholders: DEFAULT_PLACEHOLDERS.iter().map(ToString::to_string).collect(),
        }
    }
}
