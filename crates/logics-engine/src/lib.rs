//! Logics Engine - document-graph core for Logics workflow docs
//!
//! The engine:
//! - Parses `logics/{request,backlog,tasks,specs}/*.md` into [`Document`]s
//! - Allocates sequential ids and renders new documents from templates
//! - Keeps indicators and required sections in place, non-destructively
//! - Derives `Progress` from checklists
//! - Builds the cross-document reference graph
//! - Scores likely duplicates
//! - Renders index, relationship, roadmap and global review reports
//! - Bootstraps the directory skeleton, records clarifications and writes
//!   architecture decision records
//!
//! All storage goes through a [`DocumentRepository`]; [`MemoryRepository`]
//! runs the same code without touching the filesystem.
//!
//! # Example
//!
//! ```rust
//! use logics_engine::{DocKind, FixOptions, MemoryRepository, NewDocument, Workspace};
//!
//! # fn main() -> Result<(), logics_engine::EngineError> {
//! let mut ws = Workspace::with_repository(MemoryRepository::new())?;
//! let request = ws.create(&NewDocument::new(DocKind::Request, "Export CSV"))?;
//! let item = ws.promote(request.path(), DocKind::Backlog)?;
//! assert_eq!(item.doc_ref().as_str(), "item_000_export_csv");
//!
//! let report = ws.fix_all(&FixOptions::new())?;
//! assert!(report.is_complete());
//! assert_eq!(ws.graph()?.incoming("req_000_export_csv"), vec!["item_000_export_csv"]);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod adr;
pub mod bootstrap;
pub mod clarify;
pub mod config;
pub mod create;
pub mod duplicates;
pub mod error;
pub mod fixer;
pub mod graph;
pub mod ids;
pub mod indicators;
pub mod links;
pub mod lint;
pub mod parser;
pub mod project;
pub mod report;
pub mod repository;
pub mod workspace;

pub use adr::{render_adr, NewAdr};
pub use bootstrap::{bootstrap, BootstrapReport};
pub use clarify::{Clarification, ConfidenceBoost};
pub use config::{EngineConfig, CONFIG_FILE};
pub use create::NewDocument;
pub use duplicates::{find_duplicates, DuplicateOptions, DuplicatePair, PairMember, RelatedPairs};
pub use error::{
    ConfigError, DocumentFailure, EngineError, EngineResult, IndicatorError, ParseError,
    RepositoryError,
};
pub use fixer::{ensure_sections, FixOptions, SectionPack};
pub use graph::Graph;
pub use ids::allocate_id;
pub use indicators::{compute_auto_progress, ensure_required as ensure_required_indicators};
pub use lint::{LintFinding, LintIssue, LintReport};
pub use parser::{list_documents, parse, LoadReport};
pub use project::{discover_project_root, ProjectLayout};
pub use report::RoadmapBucket;
pub use repository::{DocumentRepository, FsRepository, MemoryRepository};
pub use workspace::{FixReport, Workspace};

pub use logics_model::{DocKind, DocRef, Document};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the Logics engine
    pub use crate::{
        Clarification, ConfidenceBoost, DocKind, DocRef, Document, DocumentRepository,
        EngineConfig, EngineError, EngineResult, FixOptions, FsRepository, Graph,
        MemoryRepository, NewAdr, NewDocument, SectionPack, Workspace,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
