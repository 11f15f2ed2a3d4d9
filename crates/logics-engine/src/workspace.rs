//! Batch façade over a document repository
//!
//! Every batch operation is one read pass (list + parse) followed, for
//! mutating operations, by one write per changed document. Per-document
//! failures are collected; single-document mutations fail fast and write
//! nothing on error.

use crate::adr::{self, NewAdr, ADR_PREFIX};
use crate::bootstrap::{self, BootstrapReport};
use crate::clarify::{self, ConfidenceBoost};
use crate::config::EngineConfig;
use crate::create::{self, NewDocument};
use crate::duplicates::{self, DuplicatePair};
use crate::error::{DocumentFailure, EngineError, EngineResult, RepositoryError};
use crate::fixer::{self, FixOptions, SectionPack};
use crate::graph::Graph;
use crate::ids;
use crate::indicators;
use crate::links::SlugIndex;
use crate::lint::{self, LintReport};
use crate::parser::{self, LoadReport};
use crate::project::{discover_project_root, ProjectLayout, DEFAULT_DOCS_DIR};
use crate::report;
use crate::repository::{DocumentRepository, FsRepository};
use chrono::{DateTime, NaiveDate, Utc};
use logics_model::{DocKind, Document};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome of [`Workspace::fix_all`]
#[derive(Debug, Default)]
pub struct FixReport {
    /// Documents that changed (written unless `dry_run`)
    pub changed: Vec<PathBuf>,
    /// Documents already in shape
    pub unchanged: usize,
    /// Documents with an unknown kind, left alone
    pub skipped: Vec<PathBuf>,
    /// Documents that could not be read, fixed or written
    pub failures: Vec<DocumentFailure>,
    /// Whether writes were suppressed
    pub dry_run: bool,
}

impl FixReport {
    /// Whether every document was processed
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Repository, layout and configuration bound together
#[derive(Debug)]
pub struct Workspace<R: DocumentRepository> {
    repo: R,
    layout: ProjectLayout,
    config: EngineConfig,
}

impl Workspace<FsRepository> {
    /// Open the project containing `start`, marked by a `logics/` directory
    ///
    /// # Errors
    ///
    /// [`EngineError::MissingProjectRoot`], or a [`crate::ConfigError`] for a
    /// broken `logics.toml`.
    pub fn open(start: &Path) -> EngineResult<Self> {
        Self::open_with_marker(start, DEFAULT_DOCS_DIR)
    }

    /// Open the project containing `start`, marked by `docs_dir/`
    ///
    /// # Errors
    ///
    /// Same as [`Workspace::open`].
    pub fn open_with_marker(start: &Path, docs_dir: &str) -> EngineResult<Self> {
        let root = discover_project_root(start, docs_dir)?;
        let workspace = Self::with_repository(FsRepository::new(&root))?;
        info!(root = %root.display(), docs_dir = %workspace.layout.docs_dir().display(), "opened workspace");
        Ok(workspace)
    }

    /// Bind the project at `root` as is, without looking for the docs directory
    ///
    /// Used to bootstrap a project that has no docs directory yet.
    ///
    /// # Errors
    ///
    /// A [`crate::ConfigError`] for a broken `logics.toml`.
    pub fn at_root(root: &Path) -> EngineResult<Self> {
        Self::with_repository(FsRepository::new(root))
    }
}

impl<R: DocumentRepository> Workspace<R> {
    /// Bind `repo` with an explicit configuration
    #[must_use]
    pub fn new(repo: R, config: EngineConfig) -> Self {
        Self {
            layout: ProjectLayout::new(&config.docs_dir),
            repo,
            config,
        }
    }

    /// Bind `repo`, reading `logics.toml` from it when present
    ///
    /// # Errors
    ///
    /// [`crate::ConfigError`] for an unreadable or invalid config file.
    pub fn with_repository(repo: R) -> EngineResult<Self> {
        let config = EngineConfig::load(&repo)?;
        Ok(Self::new(repo, config))
    }

    /// Underlying repository
    #[inline]
    #[must_use]
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Give the repository back
    #[must_use]
    pub fn into_repository(self) -> R {
        self.repo
    }

    /// Directory layout
    #[inline]
    #[must_use]
    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fix options derived from the configuration
    #[must_use]
    pub fn fix_options(&self) -> FixOptions {
        FixOptions::new().with_auto_progress(self.config.progress.auto)
    }

    /// Parse every document; undecodable files are recorded, not fatal
    ///
    /// # Errors
    ///
    /// Only when a kind directory cannot be listed.
    pub fn load(&self) -> EngineResult<LoadReport> {
        Ok(parser::load_documents(&self.repo, &self.layout)?)
    }

    /// Parse one document
    ///
    /// # Errors
    ///
    /// [`crate::ParseError`] for missing or undecodable files.
    pub fn parse(&self, path: &Path) -> EngineResult<Document> {
        Ok(parser::parse(&self.repo, path)?)
    }

    /// Next free id for `kind`
    ///
    /// # Errors
    ///
    /// Propagates listing failures.
    pub fn allocate_id(&self, kind: DocKind) -> EngineResult<u32> {
        Ok(ids::allocate_id(
            &self.repo,
            &self.layout.kind_dir(kind),
            kind.prefix(),
        )?)
    }

    /// Render `new` with the next free id, without writing
    ///
    /// # Errors
    ///
    /// See [`create::render`].
    pub fn preview(&self, new: &NewDocument) -> EngineResult<Document> {
        let id = self.allocate_id(new.kind)?;
        create::render(new, id, &self.layout)
    }

    /// Create `new` with the next free id
    ///
    /// # Errors
    ///
    /// See [`create::render`]; [`RepositoryError::AlreadyExists`] instead of
    /// overwriting a file.
    pub fn create(&mut self, new: &NewDocument) -> EngineResult<Document> {
        let doc = self.preview(new)?;
        self.repo.write_new(doc.path(), &doc.to_text())?;
        info!(doc_ref = %doc.doc_ref(), path = %doc.path().display(), "created document");
        Ok(doc)
    }

    /// Create the next-stage document from `source`
    ///
    /// # Errors
    ///
    /// [`EngineError::UnsupportedPromotion`] for pairs other than
    /// request → backlog and backlog → task, plus any [`Workspace::create`]
    /// error.
    pub fn promote(&mut self, source: &Path, target: DocKind) -> EngineResult<Document> {
        let source_doc = self.parse(source)?;
        let new = create::promotion(&source_doc, target)?;
        let doc = self.create(&new)?;
        info!(from = %source_doc.doc_ref(), to = %doc.doc_ref(), "promoted document");
        Ok(doc)
    }

    /// Set one indicator in one document
    ///
    /// # Errors
    ///
    /// Parse errors, [`crate::IndicatorError`], or the write failure.
    pub fn set_indicator(&mut self, path: &Path, key: &str, value: &str) -> EngineResult<bool> {
        let mut doc = self.parse(path)?;
        let changed = indicators::set(&mut doc, key, value)?;
        if changed {
            self.write(&doc)?;
        }
        Ok(changed)
    }

    /// Fix one document
    ///
    /// # Errors
    ///
    /// Parse errors, [`EngineError::UnknownDocKind`], or the write failure.
    pub fn fix_document(&mut self, path: &Path, options: &FixOptions) -> EngineResult<bool> {
        let slugs = if options.cross_refs {
            Some(SlugIndex::build(&self.load()?.documents))
        } else {
            None
        };
        let mut doc = self.parse(path)?;
        let changed = fixer::fix_document(&mut doc, slugs.as_ref(), options)?;
        if changed && !options.dry_run {
            self.write(&doc)?;
        }
        Ok(changed)
    }

    /// Fix every document of a known kind
    ///
    /// # Errors
    ///
    /// Only when a kind directory cannot be listed; everything else lands in
    /// [`FixReport::failures`].
    pub fn fix_all(&mut self, options: &FixOptions) -> EngineResult<FixReport> {
        let LoadReport {
            documents,
            failures,
        } = self.load()?;
        let slugs = SlugIndex::build(&documents);
        let mut report = FixReport {
            failures,
            dry_run: options.dry_run,
            ..FixReport::default()
        };

        for mut doc in documents {
            if doc.kind().is_none() {
                warn!(path = %doc.path().display(), "unknown document kind, skipping");
                report.skipped.push(doc.path().to_path_buf());
                continue;
            }
            match fixer::fix_document(&mut doc, Some(&slugs), options) {
                Ok(false) => report.unchanged += 1,
                Ok(true) if options.dry_run => report.changed.push(doc.path().to_path_buf()),
                Ok(true) => match self.write(&doc) {
                    Ok(()) => report.changed.push(doc.path().to_path_buf()),
                    Err(error) => {
                        warn!(path = %doc.path().display(), %error, "write failed");
                        report.failures.push(DocumentFailure::new(doc.path(), error));
                    }
                },
                Err(error) => {
                    warn!(path = %doc.path().display(), %error, "fix failed");
                    report.failures.push(DocumentFailure::new(doc.path(), error));
                }
            }
        }
        info!(
            changed = report.changed.len(),
            unchanged = report.unchanged,
            skipped = report.skipped.len(),
            failures = report.failures.len(),
            dry_run = report.dry_run,
            "fixed documents"
        );
        Ok(report)
    }

    /// Add an optional section pack to one document
    ///
    /// # Errors
    ///
    /// Parse errors, [`EngineError::UnknownDocKind`],
    /// [`EngineError::PackNotApplicable`], or the write failure.
    pub fn add_section_pack(&mut self, path: &Path, pack: SectionPack) -> EngineResult<bool> {
        let mut doc = self.parse(path)?;
        let kind = doc
            .kind()
            .ok_or_else(|| EngineError::UnknownDocKind(doc.doc_ref().to_string()))?;
        let changed = fixer::apply_pack(&mut doc, kind, pack)?;
        if changed {
            self.write(&doc)?;
        }
        Ok(changed)
    }

    /// Lint every document
    ///
    /// # Errors
    ///
    /// Only when a kind directory cannot be listed.
    pub fn lint(&self) -> EngineResult<LintReport> {
        Ok(lint::lint(&self.load()?, &self.layout))
    }

    /// Reference graph of every decodable document
    ///
    /// # Errors
    ///
    /// Only when a kind directory cannot be listed.
    pub fn graph(&self) -> EngineResult<Graph> {
        Ok(Graph::build(&self.load()?.documents))
    }

    /// Likely duplicates under the configured options
    ///
    /// # Errors
    ///
    /// Only when a kind directory cannot be listed.
    pub fn duplicates(&self) -> EngineResult<Vec<DuplicatePair>> {
        let report = self.load()?;
        Ok(duplicates::find_duplicates(
            &report.documents,
            &self.config.duplicate_options(),
        ))
    }

    /// `INDEX.md` contents
    ///
    /// # Errors
    ///
    /// Only when a kind directory cannot be listed.
    pub fn render_index(&self) -> EngineResult<String> {
        Ok(report::render_index(&self.load()?.documents))
    }

    /// `RELATIONSHIPS.md` contents
    ///
    /// # Errors
    ///
    /// Only when a kind directory cannot be listed.
    pub fn render_relationships(&self) -> EngineResult<String> {
        let documents = self.load()?.documents;
        let graph = Graph::build(&documents);
        Ok(report::render_relationships(&documents, &graph))
    }

    /// Global review stamped with `now`
    ///
    /// # Errors
    ///
    /// Only when a kind directory cannot be listed.
    pub fn render_global_review(&self, now: DateTime<Utc>) -> EngineResult<String> {
        let loaded = self.load()?;
        Ok(report::render_global_review(
            &loaded,
            &self.config.review.placeholders,
            now,
        ))
    }

    /// `ROADMAP.md` contents
    ///
    /// # Errors
    ///
    /// Only when a kind directory cannot be listed.
    pub fn render_roadmap(&self) -> EngineResult<String> {
        Ok(report::render_roadmap(&self.load()?.documents))
    }

    /// Create missing skeleton directories and `.gitkeep` placeholders
    ///
    /// # Errors
    ///
    /// Listing or write failures.
    pub fn bootstrap(&mut self, dry_run: bool) -> EngineResult<BootstrapReport> {
        let report = bootstrap::bootstrap(&mut self.repo, &self.layout, dry_run)?;
        info!(
            missing_dirs = report.missing_dirs.len(),
            gitkeeps = report.gitkeeps.len(),
            dry_run,
            "bootstrapped project"
        );
        Ok(report)
    }

    /// Record clarifications in one document and raise its indicators
    ///
    /// # Errors
    ///
    /// Parse errors, [`crate::IndicatorError`], or the write failure. Nothing
    /// is written on error.
    pub fn boost_confidence(&mut self, path: &Path, boost: &ConfidenceBoost) -> EngineResult<bool> {
        let mut doc = self.parse(path)?;
        let changed = clarify::apply(&mut doc, boost)?;
        if changed {
            self.write(&doc)?;
        }
        Ok(changed)
    }

    /// Next free decision record id
    ///
    /// # Errors
    ///
    /// Propagates listing failures.
    pub fn allocate_adr_id(&self) -> EngineResult<u32> {
        Ok(ids::allocate_id(
            &self.repo,
            &self.layout.architecture_dir(),
            ADR_PREFIX,
        )?)
    }

    /// Render `new` with the next free record id, without writing
    ///
    /// # Errors
    ///
    /// See [`adr::render_adr`].
    pub fn preview_adr(&self, new: &NewAdr, date: NaiveDate) -> EngineResult<Document> {
        let id = self.allocate_adr_id()?;
        adr::render_adr(new, id, &self.layout, date)
    }

    /// Write a new decision record dated `date`
    ///
    /// # Errors
    ///
    /// See [`adr::render_adr`]; [`RepositoryError::AlreadyExists`] instead of
    /// overwriting a file.
    pub fn create_adr(&mut self, new: &NewAdr, date: NaiveDate) -> EngineResult<Document> {
        let doc = self.preview_adr(new, date)?;
        self.repo.write_new(doc.path(), &doc.to_text())?;
        info!(doc_ref = %doc.doc_ref(), path = %doc.path().display(), "created decision record");
        Ok(doc)
    }

    fn write(&mut self, doc: &Document) -> Result<(), RepositoryError> {
        self.repo.write(doc.path(), &doc.to_text())?;
        info!(doc_ref = %doc.doc_ref(), path = %doc.path().display(), "wrote document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use crate::repository::MemoryRepository;
    use pretty_assertions::assert_eq;

    fn workspace(files: &[(&str, &str)]) -> Workspace<MemoryRepository> {
        let repo = files
            .iter()
            .fold(MemoryRepository::new(), |repo, (path, text)| repo.with_file(*path, text));
        Workspace::with_repository(repo).unwrap()
    }

    #[test]
    fn create_allocates_after_highest_id() {
        let mut ws = workspace(&[
            ("logics/backlog/item_000_a.md", ""),
            ("logics/backlog/item_004_b.md", ""),
        ]);
        let doc = ws.create(&NewDocument::new(DocKind::Backlog, "Export CSV")).unwrap();
        assert_eq!(doc.doc_ref().as_str(), "item_005_export_csv");
        assert_eq!(
            ws.repository().text("logics/backlog/item_005_export_csv.md"),
            Some(doc.to_text().as_str())
        );
    }

    #[test]
    fn preview_does_not_write() {
        let ws = workspace(&[]);
        let doc = ws.preview(&NewDocument::new(DocKind::Spec, "Search")).unwrap();
        assert_eq!(doc.doc_ref().as_str(), "spec_000_search");
        assert!(ws.repository().is_empty());
    }

    #[test]
    fn set_indicator_fails_without_writing() {
        let mut ws = workspace(&[("logics/tasks/task_000_a.md", "# Plan\n")]);
        let path = Path::new("logics/tasks/task_000_a.md");
        assert!(matches!(
            ws.set_indicator(path, "Progress", "10%"),
            Err(EngineError::Indicator(_))
        ));
        assert_eq!(ws.repository().text(path), Some("# Plan\n"));
        assert!(matches!(
            ws.set_indicator(Path::new("logics/tasks/missing.md"), "Progress", "1%"),
            Err(EngineError::Parse(ParseError::Repository(RepositoryError::NotFound(_))))
        ));
    }

    #[test]
    fn fix_all_dry_run_reports_without_writing() {
        let mut ws = workspace(&[
            ("logics/tasks/task_000_a.md", "## task_000_a - A\n"),
            ("logics/tasks/notes.md", "scratch\n"),
        ]);
        let report = ws.fix_all(&ws.fix_options().with_dry_run(true)).unwrap();
        assert_eq!(report.changed, vec![PathBuf::from("logics/tasks/task_000_a.md")]);
        assert_eq!(report.skipped, vec![PathBuf::from("logics/tasks/notes.md")]);
        assert!(report.dry_run);
        assert_eq!(
            ws.repository().text("logics/tasks/task_000_a.md"),
            Some("## task_000_a - A\n")
        );
    }

    #[test]
    fn section_pack_on_unknown_kind_is_rejected() {
        let mut ws = workspace(&[("logics/tasks/notes.md", "## Notes\n")]);
        assert!(matches!(
            ws.add_section_pack(Path::new("logics/tasks/notes.md"), SectionPack::Risks),
            Err(EngineError::UnknownDocKind(_))
        ));
    }

    #[test]
    fn bootstrap_then_create_lands_in_skeleton() {
        let mut ws = workspace(&[]);
        let report = ws.bootstrap(false).unwrap();
        assert_eq!(report.gitkeeps.len(), 5);
        assert!(ws.bootstrap(false).unwrap().is_noop());

        ws.create(&NewDocument::new(DocKind::Request, "Login")).unwrap();
        assert!(ws.load().unwrap().failures.is_empty());
        assert_eq!(ws.load().unwrap().documents.len(), 1);
    }

    #[test]
    fn roadmap_reads_backlog() {
        let ws = workspace(&[
            ("logics/backlog/item_000_a.md", "## item_000_a - A\n> Progress: 0%\n\n# Notes\n- Impact: high\n"),
            ("logics/backlog/item_001_b.md", "## item_001_b - B\n> Progress: 100%\n"),
        ]);
        let roadmap = ws.render_roadmap().unwrap();
        assert!(roadmap.contains("## Now\n\n- [item_000_a](logics/backlog/item_000_a.md) - A (0%)\n"));
        assert!(roadmap.contains("## Done\n\n- [item_001_b](logics/backlog/item_001_b.md) - B (100%)\n"));
    }

    #[test]
    fn boost_confidence_writes_once() {
        let path = Path::new("logics/request/req_000_a.md");
        let mut ws = workspace(&[(
            "logics/request/req_000_a.md",
            "## req_000_a - A\n> Understanding: ??%\n> Confidence: ??%\n\n# Needs\n- x\n",
        )]);
        let boost = ConfidenceBoost::with_defaults(DocKind::Request);
        assert!(ws.boost_confidence(path, &boost).unwrap());
        let text = ws.repository().text(path).unwrap().to_string();
        assert!(text.contains("> Understanding: 94%\n> Confidence: 92%\n"));
        assert!(text.contains("# Clarifications\n- Define the primary outcome"));
        assert!(!ws.boost_confidence(path, &boost).unwrap());

        let mut untitled = workspace(&[("logics/request/req_001_b.md", "# Needs\n")]);
        let untitled_path = Path::new("logics/request/req_001_b.md");
        assert!(matches!(
            untitled.boost_confidence(untitled_path, &boost),
            Err(EngineError::Indicator(_))
        ));
        assert_eq!(untitled.repository().text(untitled_path), Some("# Needs\n"));
    }

    #[test]
    fn decision_records_use_their_own_id_space() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let mut ws = workspace(&[
            ("logics/architecture/adr_003_old.md", ""),
            ("logics/request/req_007_a.md", "## req_007_a - A\n"),
        ]);
        assert_eq!(ws.allocate_adr_id().unwrap(), 4);
        let adr = ws.create_adr(&NewAdr::new("Use SQLite"), date).unwrap();
        assert_eq!(adr.path(), Path::new("logics/architecture/adr_004_use_sqlite.md"));
        assert!(ws
            .repository()
            .text("logics/architecture/adr_004_use_sqlite.md")
            .unwrap()
            .starts_with("## adr_004_use_sqlite - Use SQLite\n> Date: 2024-05-01\n> Status: Proposed\n"));
        assert_eq!(ws.load().unwrap().documents.len(), 1);

        let preview = ws.preview_adr(&NewAdr::new("Next"), date).unwrap();
        assert_eq!(preview.doc_ref().as_str(), "adr_005_next");
        assert!(!ws.repository().exists(preview.path()));
    }

    #[test]
    fn config_file_changes_layout() {
        let ws = workspace(&[
            ("logics.toml", "docs_dir = \"docs\"\n"),
            ("docs/request/req_000_a.md", "## req_000_a - A\n"),
        ]);
        assert_eq!(ws.layout().docs_dir(), Path::new("docs"));
        assert_eq!(ws.load().unwrap().documents.len(), 1);
    }
}
