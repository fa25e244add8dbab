//! Convergence against a staged root on disk

use std::fs;

use pretty_assertions::assert_eq;
use rsyslog_core::{
    AttributeTree, ContentSource, ConvergenceRun, LocalFilesystem, Platform, PlatformFamily,
    PlatformStyle, RunState,
};
use tempfile::TempDir;

fn platform() -> Platform {
    Platform::new(PlatformFamily::Debian, PlatformStyle::Module)
}

fn tree() -> AttributeTree {
    AttributeTree::new()
        .with("server_ip", "10.0.0.1")
        .with("imfile.PollingInterval", 10)
}

#[test]
fn test_first_run_writes_and_requests_restart() {
    let temp = TempDir::new().unwrap();
    let fs = LocalFilesystem::staged(temp.path()).without_ownership();

    let convergence = ConvergenceRun::new(platform()).converge(&tree(), &fs).unwrap();
    assert_eq!(convergence.state, RunState::ChangesPending);

    let outcome = convergence.apply(&fs).unwrap();
    assert!(outcome.restart_requested);
    assert_eq!(outcome.written.len(), 4);

    let root = temp.path();
    assert!(root.join("etc/rsyslog.conf").is_file());
    assert!(root.join("etc/rsyslog.d/35-imfile.conf").is_file());
    assert!(root.join("etc/rsyslog.d/49-remote.conf").is_file());
    assert!(root.join("etc/rsyslog.d/50-default.conf").is_file());
    assert!(root.join("var/spool/rsyslog").is_dir());
}

#[test]
fn test_second_run_is_clean() {
    let temp = TempDir::new().unwrap();
    let fs = LocalFilesystem::staged(temp.path()).without_ownership();

    ConvergenceRun::new(platform())
        .converge(&tree(), &fs)
        .unwrap()
        .apply(&fs)
        .unwrap();

    let second = ConvergenceRun::new(platform()).converge(&tree(), &fs).unwrap();
    assert_eq!(second.state, RunState::Clean);

    let outcome = second.apply(&fs).unwrap();
    assert!(outcome.written.is_empty());
    assert!(!outcome.restart_requested);
}

#[test]
fn test_manual_edit_is_overwritten() {
    let temp = TempDir::new().unwrap();
    let fs = LocalFilesystem::staged(temp.path()).without_ownership();

    ConvergenceRun::new(platform())
        .converge(&tree(), &fs)
        .unwrap()
        .apply(&fs)
        .unwrap();

    let main = temp.path().join("etc/rsyslog.conf");
    fs::write(&main, "# hand edited\n").unwrap();

    let run = ConvergenceRun::new(platform()).converge(&tree(), &fs).unwrap();
    assert_eq!(run.report.changes.len(), 1);
    run.apply(&fs).unwrap();

    let restored = fs
        .previous_content(std::path::Path::new("/etc/rsyslog.conf"))
        .unwrap()
        .unwrap();
    assert!(restored.contains("$ModLoad imuxsock"));
}

#[cfg(unix)]
#[test]
fn test_modes_are_applied() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let fs = LocalFilesystem::staged(temp.path()).without_ownership();

    ConvergenceRun::new(platform())
        .converge(&tree(), &fs)
        .unwrap()
        .apply(&fs)
        .unwrap();

    let mode = |path: &str| {
        fs::metadata(temp.path().join(path)).unwrap().permissions().mode() & 0o777
    };
    assert_eq!(mode("etc/rsyslog.conf"), 0o644);
    assert_eq!(mode("etc/rsyslog.d"), 0o755);
    assert_eq!(mode("var/spool/rsyslog"), 0o700);
}
