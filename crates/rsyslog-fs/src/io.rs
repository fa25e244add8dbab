//! Atomic I/O operations with file locking

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use fs2::FileExt;

use crate::{Error, Result};

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename strategy to prevent partial writes.
/// Acquires an advisory lock to prevent concurrent access.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    write_atomic_inner(path, content, None, |_| Ok(()))
}

/// Write content atomically and set the permission bits before the rename,
/// so the file never appears on disk with the wrong mode.
pub fn write_atomic_with_mode(path: &Path, content: &[u8], mode: u32) -> Result<()> {
    write_atomic_inner(path, content, Some(mode), |_| Ok(()))
}

/// Like [`write_atomic_with_mode`], running `prepare` on the temp file just
/// before the rename. When `prepare` fails the temp file is removed and
/// `path` keeps its previous content.
pub fn write_atomic_prepared<F>(path: &Path, content: &[u8], mode: u32, prepare: F) -> Result<()>
where
    F: FnOnce(&Path) -> Result<()>,
{
    write_atomic_inner(path, content, Some(mode), prepare)
}

fn write_atomic_inner<F>(path: &Path, content: &[u8], mode: Option<u32>, prepare: F) -> Result<()>
where
    F: FnOnce(&Path) -> Result<()>,
{
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    // Same directory keeps the rename on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .lock_exclusive()
        .map_err(|_| Error::LockFailed {
            path: path.to_path_buf(),
        })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;

    if let Some(mode) = mode {
        apply_mode(&temp_file, &temp_path, mode)?;
    }

    temp_file.unlock().map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;

    drop(temp_file);
    if let Err(e) = prepare(&temp_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))?;

    tracing::trace!(path = %path.display(), bytes = content.len(), "Wrote file atomically");
    Ok(())
}

#[cfg(unix)]
fn apply_mode(file: &File, path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(mode))
        .map_err(|e| Error::io(path, e))
}

#[cfg(not(unix))]
fn apply_mode(_file: &File, path: &Path, mode: u32) -> Result<()> {
    tracing::debug!(path = %path.display(), mode = %format!("{:o}", mode), "Permission bits not supported on this platform");
    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Read text content from a file, returning `None` when it does not exist.
pub fn read_text_if_exists(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Create a directory (and its parents) and set its permission bits.
pub fn ensure_directory(path: &Path, mode: u32) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| Error::io(path, e))?;
    set_mode(path, mode)
}

/// Set the permission bits of an existing path.
#[cfg(unix)]
pub fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| Error::io(path, e))
}

#[cfg(not(unix))]
pub fn set_mode(path: &Path, mode: u32) -> Result<()> {
    tracing::debug!(path = %path.display(), mode = %format!("{:o}", mode), "Permission bits not supported on this platform");
    Ok(())
}
