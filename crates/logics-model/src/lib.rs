//! Logics Document Model
//!
//! Line-oriented model of the Markdown documents that drive the Logics
//! workflow (request, backlog item, task, spec).
//!
//! # Core Concepts
//!
//! - [`DocKind`] / [`DocRef`]: document kinds and `{prefix}_{id}_{slug}` identities
//! - [`LineToken`]: typed classification of every line
//! - [`Document`]: preamble, title heading, indicator block, intro and sections
//!
//! # Example
//!
//! ```rust
//! use logics_model::{DocKind, Document};
//!
//! let doc = Document::from_text(
//!     "logics/tasks/task_001_login.md",
//!     "## task_001_login - Login\n> Progress: 0%\n\n# Plan\n- [ ] Build\n",
//! );
//! assert_eq!(doc.kind(), Some(DocKind::Task));
//! assert_eq!(doc.indicators().get("Progress"), Some("0%"));
//! assert_eq!(doc.section("# Plan").map(|s| s.checklist()), Some((0, 1)));
//! ```

#![warn(unreachable_pub)]

mod doc_ref;
mod document;
mod lexer;

pub use doc_ref::{slugify, DocKind, DocRef, DocRefError};
pub use document::{scan_ref_tokens, Document, Heading, IndicatorBlock, IndicatorLine, Section};
pub use lexer::{classify_line, LineToken, INDICATOR_PREFIX, SECTION_PREFIX, TITLE_PREFIX};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
