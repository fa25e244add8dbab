//! Command implementations for rsyslog-cli

pub mod converge;
pub mod diff;
pub mod packages;
pub mod render;
pub mod validate;

use std::path::{Path, PathBuf};

use rsyslog_core::{AttributeTree, LocalFilesystem, Platform, PlatformFamily, PlatformStyle};
use rsyslog_fs::DocumentStore;
use serde_json::Value;

use crate::error::Result;

pub use converge::run_converge;
pub use diff::run_diff;
pub use packages::run_packages;
pub use render::run_render;
pub use validate::run_validate;

/// Inputs shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub tree: AttributeTree,
    pub platform: Platform,
}

impl Context {
    /// Load the attribute document, or start from an empty tree.
    pub fn load(
        attributes: Option<&Path>,
        family: PlatformFamily,
        style: PlatformStyle,
    ) -> Result<Self> {
        let tree = match attributes {
            Some(path) => {
                let document: Value = DocumentStore::new().load(path)?;
                tracing::debug!(path = %path.display(), "Loaded attribute document");
                AttributeTree::from_value(document)?
            }
            None => AttributeTree::new(),
        };

        Ok(Self {
            tree,
            platform: Platform::new(family, style),
        })
    }
}

/// Filesystem collaborator for `--root` / `--no-chown`.
pub(crate) fn filesystem(root: Option<&PathBuf>, chown: bool) -> LocalFilesystem {
    let fs = match root {
        Some(root) => LocalFilesystem::staged(root),
        None => LocalFilesystem::new(),
    };
    if chown { fs } else { fs.without_ownership() }
}
