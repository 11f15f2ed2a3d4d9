use logics_engine::prelude::*;
use logics_engine::{ConfigError, ParseError, RepositoryError};
use logics_test_utils::{request_text, task_text};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("logics/request")).unwrap();
    fs::create_dir_all(dir.path().join("logics/tasks")).unwrap();
    fs::write(
        dir.path().join("logics/request/req_000_login.md"),
        request_text("req_000_login", "Login"),
    )
    .unwrap();
    dir
}

#[test]
fn test_open_discovers_root_from_nested_directory() {
    let dir = project();
    let ws = Workspace::open(&dir.path().join("logics/request")).unwrap();

    let root = fs::canonicalize(dir.path()).unwrap();
    assert_eq!(ws.repository().root(), root.as_path());
    assert_eq!(ws.load().unwrap().documents.len(), 1);
}

#[test]
fn test_open_without_marker_fails() {
    let dir = TempDir::new().unwrap();
    let err = Workspace::open_with_marker(dir.path(), "logics_marker_absent").unwrap_err();
    assert!(matches!(err, EngineError::MissingProjectRoot { .. }));
    assert!(err.to_string().contains("missing 'logics_marker_absent/' directory"));
}

#[test]
fn test_create_and_fix_on_disk() {
    let dir = project();
    let mut ws = Workspace::open(dir.path()).unwrap();

    let item = ws.create(&NewDocument::new(DocKind::Backlog, "Login")).unwrap();
    let on_disk = fs::read_to_string(dir.path().join(item.path())).unwrap();
    assert_eq!(on_disk, item.to_text());

    let report = ws.fix_all(&FixOptions::new()).unwrap();
    assert!(report.is_complete());
    let request = fs::read_to_string(dir.path().join("logics/request/req_000_login.md")).unwrap();
    assert!(request.contains("- `logics/backlog/item_000_login.md`"));
    assert!(ws.lint().unwrap().is_clean());
}

#[test]
fn test_fix_writes_progress_to_disk() {
    let dir = project();
    let path = dir.path().join("logics/tasks/task_000_login.md");
    fs::write(&path, task_text("task_000_login", "Login", &[true, true, true, false])).unwrap();

    let mut ws = Workspace::open(dir.path()).unwrap();
    let changed = ws
        .fix_document(Path::new("logics/tasks/task_000_login.md"), &FixOptions::new())
        .unwrap();
    assert!(changed);
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("> Progress: 75%\n"));
}

#[test]
fn test_create_refuses_to_overwrite() {
    let dir = project();
    let mut repo = FsRepository::new(dir.path());
    let err = repo
        .write_new(Path::new("logics/request/req_000_login.md"), "replaced")
        .unwrap_err();
    assert!(matches!(err, RepositoryError::AlreadyExists(_)));
    let kept = fs::read_to_string(dir.path().join("logics/request/req_000_login.md")).unwrap();
    assert!(kept.starts_with("## req_000_login - Login\n"));
}

#[test]
fn test_undecodable_file_is_reported_not_fatal() {
    let dir = project();
    fs::write(dir.path().join("logics/tasks/task_000_bad.md"), [0xff, 0xfe, 0x00]).unwrap();

    let ws = Workspace::open(dir.path()).unwrap();
    let report = ws.load().unwrap();
    assert_eq!(report.documents.len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        ws.parse(Path::new("logics/tasks/task_000_bad.md")),
        Err(EngineError::Parse(ParseError::Decode { .. }))
    ));
    assert!(!ws.lint().unwrap().is_clean());
}

#[test]
fn test_config_file_is_read_from_root() {
    let dir = project();
    fs::write(dir.path().join("logics.toml"), "[progress]\nauto = false\n").unwrap();
    let ws = Workspace::open(dir.path()).unwrap();
    assert!(!ws.fix_options().auto_progress);

    fs::write(dir.path().join("logics.toml"), "[duplicates]\nthreshold = 2.0\n").unwrap();
    let err = Workspace::open(dir.path()).unwrap_err();
    assert!(matches!(err, EngineError::Config(ConfigError::Invalid(_))));
}

#[test]
fn test_bootstrap_makes_project_openable() {
    let dir = TempDir::new().unwrap();
    assert!(Workspace::open(dir.path()).is_err());

    let mut ws = Workspace::at_root(dir.path()).unwrap();
    let planned = ws.bootstrap(true).unwrap();
    assert_eq!(planned.missing_dirs.len(), 6);
    assert!(!dir.path().join("logics").exists());

    let report = ws.bootstrap(false).unwrap();
    assert_eq!(report.gitkeeps.len(), 5);
    assert!(dir.path().join("logics/architecture/.gitkeep").is_file());
    assert!(dir.path().join("logics/specs/.gitkeep").is_file());
    assert!(!dir.path().join("logics/.gitkeep").exists());

    let mut reopened = Workspace::open(dir.path()).unwrap();
    assert!(reopened.bootstrap(false).unwrap().is_noop());
    assert!(reopened.load().unwrap().documents.is_empty());
}
