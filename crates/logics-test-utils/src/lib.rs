//! Testing utilities for the Logics workspace
//!
//! Shared fixtures: canonical document text and a seeded in-memory
//! repository holding one request → backlog → task chain plus an unrelated
//! backlog item.

#![allow(missing_docs)]

use logics_engine::{EngineConfig, MemoryRepository, Workspace};
use logics_model::{DocKind, DocRef};

pub const LOGIN_REQUEST: &str = "logics/request/req_000_login.md";
pub const LOGIN_ITEM: &str = "logics/backlog/item_000_login.md";
pub const LOGIN_TASK: &str = "logics/tasks/task_000_login.md";
pub const EXPORT_ITEM: &str = "logics/backlog/item_001_export_csv.md";

pub fn request_text(doc_ref: &str, title: &str) -> String {
    format!(
        "## {doc_ref} - {title}
> From version: 1.0.0
> Understanding: 90%
> Confidence: 80%

# Needs
- Users can sign in

# Context
Web only.

# Backlog
- (none yet)
"
    )
}

pub fn backlog_text(doc_ref: &str, title: &str, progress: &str) -> String {
    format!(
        "## {doc_ref} - {title}
> From version: 1.0.0
> Understanding: 80%
> Confidence: 70%
> Progress: {progress}

# Problem
Users cannot sign in.

# Scope
- In: web
- Out: mobile

# Acceptance criteria
- Login form accepts valid credentials

# Priority
- Impact: high
- Urgency: medium

# Notes
"
    )
}

/// Task whose Plan has one checklist line per entry of `steps` (`true` = done)
pub fn task_text(doc_ref: &str, title: &str, steps: &[bool]) -> String {
    let plan: Vec<String> = steps
        .iter()
        .enumerate()
        .map(|(i, done)| format!("- [{}] Step {}", if *done { "x" } else { " " }, i + 1))
        .collect();
    format!(
        "## {doc_ref} - {title}
> From version: 1.0.0
> Understanding: 80%
> Confidence: 70%
> Progress: 0%

# Context
Work on the login flow.

# Plan
{}

# Validation
- cargo test

# Report
-

# Notes
",
        plan.join("\n")
    )
}

/// Path of a well-formed document of `kind`
pub fn doc_path(kind: DocKind, id: u32, slug: &str) -> String {
    let doc_ref = DocRef::new(kind, id, slug);
    format!("logics/{}/{doc_ref}.md", kind.directory())
}

/// Login chain (request, backlog item, half-done task) plus an export item
pub fn seeded_repository() -> MemoryRepository {
    MemoryRepository::new()
        .with_file(LOGIN_REQUEST, &request_text("req_000_login", "Login"))
        .with_file(LOGIN_ITEM, &backlog_text("item_000_login", "Login", "0%"))
        .with_file(
            LOGIN_TASK,
            &task_text("task_000_login", "Login", &[true, true, false, false]),
        )
        .with_file(EXPORT_ITEM, &backlog_text("item_001_export_csv", "Export CSV", "??%"))
}

pub fn workspace() -> Workspace<MemoryRepository> {
    Workspace::new(seeded_repository(), EngineConfig::default())
}

pub fn workspace_with(repo: MemoryRepository) -> Workspace<MemoryRepository> {
    Workspace::new(repo, EngineConfig::default())
}
