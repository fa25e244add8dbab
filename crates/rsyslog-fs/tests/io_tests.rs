use assert_fs::prelude::*;
use predicates::prelude::*;
use rsyslog_fs::{Error, io};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_write_atomic_creates_parent_directories() {
    let temp = assert_fs::TempDir::new().unwrap();
    let target = temp.child("etc/rsyslog.d/50-default.conf");

    io::write_atomic(target.path(), b"*.emerg    :omusrmsg:*\n").unwrap();

    target.assert(predicate::path::is_file());
    target.assert(predicate::str::contains(":omusrmsg:*"));
}

#[test]
fn test_write_atomic_overwrites_existing() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("rsyslog.conf");
    fs::write(&file_path, "$MaxMessageSize 2k\n").unwrap();

    io::write_atomic(&file_path, b"$MaxMessageSize 64k\n").unwrap();

    let content = fs::read_to_string(&file_path).unwrap();
    assert_eq!(content, "$MaxMessageSize 64k\n");
}

#[test]
fn test_write_atomic_prepared_runs_before_replacing() {
    let temp = assert_fs::TempDir::new().unwrap();
    let target = temp.child("rsyslog.conf");
    target.write_str("$MaxMessageSize 2k\n").unwrap();

    let result = io::write_atomic_prepared(target.path(), b"$MaxMessageSize 64k\n", 0o644, |staged| {
        assert_ne!(staged, target.path());
        Err(Error::io(staged, std::io::Error::other("chown refused")))
    });

    assert!(matches!(result, Err(Error::Io { .. })));
    target.assert("$MaxMessageSize 2k\n");
    let entries = fs::read_dir(temp.path()).unwrap().count();
    assert_eq!(entries, 1);

    io::write_atomic_prepared(target.path(), b"$MaxMessageSize 64k\n", 0o644, |_| Ok(())).unwrap();
    target.assert("$MaxMessageSize 64k\n");
}

#[test]
fn test_read_text_nonexistent_file() {
    let result = io::read_text(std::path::Path::new("/nonexistent/rsyslog.conf"));
    assert!(matches!(result, Err(Error::Io { .. })));
}

#[test]
fn test_read_text_if_exists_reads_content() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("rsyslog.conf");
    file.write_str("$ModLoad imuxsock\n").unwrap();

    let content = io::read_text_if_exists(file.path()).unwrap();
    assert_eq!(content.as_deref(), Some("$ModLoad imuxsock\n"));
}

#[cfg(unix)]
#[test]
fn test_ensure_directory_applies_restrictive_mode() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let spool = temp.path().join("var/spool/rsyslog");

    io::ensure_directory(&spool, 0o700).unwrap();
    // Running twice is harmless
    io::ensure_directory(&spool, 0o700).unwrap();

    let mode = fs::metadata(&spool).unwrap().permissions().mode();
    assert!(spool.is_dir());
    assert_eq!(mode & 0o777, 0o700);
}
