//! Collaborator seams
//!
//! The engine never touches the filesystem directly. It reads persisted
//! content through a [`ContentSource`] and hands directories and files to a
//! [`FileSink`].

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rsyslog_fs::{AccountDb, io};

use crate::error::Result;
use crate::render::{ManagedDirectory, RenderedFile};

/// Supplies previously persisted content.
pub trait ContentSource {
    /// Content currently at `path`, or `None` when nothing is there.
    fn previous_content(&self, path: &Path) -> Result<Option<String>>;
}

/// Receives directories and files to persist.
pub trait FileSink {
    fn ensure_directory(&self, directory: &ManagedDirectory) -> Result<()>;

    fn write_file(&self, file: &RenderedFile) -> Result<()>;
}

/// Local filesystem, optionally rooted at a staging directory.
#[derive(Debug, Clone, Default)]
pub struct LocalFilesystem {
    root: Option<PathBuf>,
    accounts: Option<AccountDb>,
}

impl LocalFilesystem {
    /// Live host: absolute paths as rendered, names from `/etc/passwd`.
    pub fn new() -> Self {
        Self {
            root: None,
            accounts: Some(AccountDb::system()),
        }
    }

    /// Every path is placed under `root`; owner and group names resolve
    /// against the account databases inside it.
    pub fn staged(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            accounts: Some(AccountDb::under(&root)),
            root: Some(root),
        }
    }

    /// Skip ownership changes, for unprivileged runs.
    pub fn without_ownership(mut self) -> Self {
        self.accounts = None;
        self
    }

    /// Host path for a rendered path.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) => root.join(path.strip_prefix("/").unwrap_or(path)),
            None => path.to_path_buf(),
        }
    }

    fn apply_ownership(&self, path: &Path, owner: &str, group: &str) -> Result<()> {
        if let Some(accounts) = &self.accounts {
            accounts.chown(path, owner, group)?;
        }
        Ok(())
    }
}

impl ContentSource for LocalFilesystem {
    fn previous_content(&self, path: &Path) -> Result<Option<String>> {
        Ok(io::read_text_if_exists(&self.resolve(path))?)
    }
}

impl FileSink for LocalFilesystem {
    fn ensure_directory(&self, directory: &ManagedDirectory) -> Result<()> {
        let path = self.resolve(&directory.path);
        io::ensure_directory(&path, directory.mode)?;
        self.apply_ownership(&path, &directory.owner, &directory.group)?;
        tracing::debug!(path = %path.display(), mode = %format!("{:o}", directory.mode), "Ensured directory");
        Ok(())
    }

    fn write_file(&self, file: &RenderedFile) -> Result<()> {
        let path = self.resolve(&file.path);
        // Owned before the rename, so a failed chown leaves the old content
        // in place and the next run still sees a change
        io::write_atomic_prepared(&path, file.content.as_bytes(), file.mode, |temp| {
            match &self.accounts {
                Some(accounts) => accounts.chown(temp, &file.owner, &file.group),
                None => Ok(()),
            }
        })?;
        tracing::debug!(path = %path.display(), bytes = file.content.len(), "Wrote file");
        Ok(())
    }
}

/// In-memory collaborator for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryFilesystem {
    files: RefCell<BTreeMap<PathBuf, String>>,
    journal: RefCell<Vec<PathBuf>>,
}

impl MemoryFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.borrow_mut().insert(path.into(), content.into());
        self
    }

    pub fn file(&self, path: &Path) -> Option<String> {
        self.files.borrow().get(path).cloned()
    }

    /// Every directory and file handed over, in order.
    pub fn journal(&self) -> Vec<PathBuf> {
        self.journal.borrow().clone()
    }
}

impl ContentSource for MemoryFilesystem {
    fn previous_content(&self, path: &Path) -> Result<Option<String>> {
        Ok(self.file(path))
    }
}

impl FileSink for MemoryFilesystem {
    fn ensure_directory(&self, directory: &ManagedDirectory) -> Result<()> {
        self.journal.borrow_mut().push(directory.path.clone());
        Ok(())
    }

    fn write_file(&self, file: &RenderedFile) -> Result<()> {
        self.files
            .borrow_mut()
            .insert(file.path.clone(), file.content.clone());
        self.journal.borrow_mut().push(file.path.clone());
        Ok(())
    }
}
