//! User and group resolution for file ownership
//!
//! Names are looked up in passwd/group style databases so ownership can be
//! applied to staged trees (e.g. an image root) as well as the live host.

use std::path::{Path, PathBuf};

use crate::{Error, Result, io};

/// Location of the account databases used to resolve owner and group names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountDb {
    passwd: PathBuf,
    group: PathBuf,
}

impl AccountDb {
    /// Databases of the running host.
    pub fn system() -> Self {
        Self::under(Path::new("/"))
    }

    /// Databases under an alternate root.
    pub fn under(root: &Path) -> Self {
        Self {
            passwd: root.join("etc/passwd"),
            group: root.join("etc/group"),
        }
    }

    pub fn uid(&self, name: &str) -> Result<u32> {
        lookup_id(&self.passwd, name, "user")
    }

    pub fn gid(&self, name: &str) -> Result<u32> {
        lookup_id(&self.group, name, "group")
    }

    /// Change the owner and group of `path`.
    #[cfg(unix)]
    pub fn chown(&self, path: &Path, owner: &str, group: &str) -> Result<()> {
        let uid = self.uid(owner)?;
        let gid = self.gid(group)?;
        std::os::unix::fs::chown(path, Some(uid), Some(gid)).map_err(|e| Error::io(path, e))?;
        tracing::trace!(path = %path.display(), uid, gid, "Applied ownership");
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn chown(&self, path: &Path, owner: &str, group: &str) -> Result<()> {
        tracing::debug!(path = %path.display(), owner, group, "Ownership not supported on this platform");
        Ok(())
    }
}

impl Default for AccountDb {
    fn default() -> Self {
        Self::system()
    }
}

/// Both databases share the `name:password:id:...` layout.
fn lookup_id(database: &Path, name: &str, kind: &'static str) -> Result<u32> {
    if let Ok(id) = name.parse::<u32>() {
        return Ok(id);
    }

    let content = io::read_text(database)?;
    content
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .find_map(|line| {
            let mut fields = line.split(':');
            if fields.next()? != name {
                return None;
            }
            fields.nth(1)?.trim().parse::<u32>().ok()
        })
        .ok_or_else(|| Error::UnknownPrincipal {
            kind,
            name: name.to_string(),
            database: database.to_path_buf(),
        })
}
