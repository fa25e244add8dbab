//! Config rendering
//!
//! Turns a [`ResolvedConfig`] into the ordered set of files the filesystem
//! collaborator writes. Rendering is pure: the same configuration always
//! yields byte-identical content, which is what makes change detection
//! meaningful.

mod default_rules;
mod imfile;
mod main_conf;
mod remote;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::attributes::ResolvedConfig;
use crate::error::Error;

/// First line of every generated file.
pub const PROVENANCE_HEADER: &str =
    "# Config generated by rsyslog-converge - manual edits will be overwritten";

const CONFIG_FILE_MODE: u32 = 0o644;
const INCLUDE_DIR_MODE: u32 = 0o755;
const WORK_DIR_MODE: u32 = 0o700;

/// Stable identity of an output file, independent of its on-disk path.
///
/// Variants are declared in load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogicalFile {
    /// `rsyslog.conf`
    Main,
    /// `rsyslog.d/35-imfile.conf`
    ImfileWatch,
    /// `rsyslog.d/49-remote.conf`
    Remote,
    /// `rsyslog.d/50-default.conf`
    DefaultRules,
}

impl LogicalFile {
    pub const ALL: [LogicalFile; 4] = [
        LogicalFile::Main,
        LogicalFile::ImfileWatch,
        LogicalFile::Remote,
        LogicalFile::DefaultRules,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LogicalFile::Main => "main",
            LogicalFile::ImfileWatch => "imfile-watch",
            LogicalFile::Remote => "remote",
            LogicalFile::DefaultRules => "default-rules",
        }
    }

    /// File name inside its directory; include files carry a numeric prefix
    /// so the daemon loads them in a deterministic order.
    pub fn file_name(self) -> &'static str {
        match self {
            LogicalFile::Main => "rsyslog.conf",
            LogicalFile::ImfileWatch => "35-imfile.conf",
            LogicalFile::Remote => "49-remote.conf",
            LogicalFile::DefaultRules => "50-default.conf",
        }
    }
}

impl fmt::Display for LogicalFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogicalFile {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        LogicalFile::ALL
            .into_iter()
            .find(|file| file.as_str() == s || file.file_name() == s)
            .ok_or_else(|| Error::UnknownFile {
                name: s.to_string(),
            })
    }
}

/// A rendered file handed to the filesystem collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedFile {
    pub id: LogicalFile,
    pub path: PathBuf,
    pub content: String,
    pub owner: String,
    pub group: String,
    pub mode: u32,
}

/// A directory the filesystem collaborator must create before any writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManagedDirectory {
    pub path: PathBuf,
    pub owner: String,
    pub group: String,
    pub mode: u32,
}

/// On-disk locations derived from `config_prefix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    prefix: PathBuf,
}

impl Layout {
    pub fn new(config: &ResolvedConfig) -> Self {
        Self {
            prefix: PathBuf::from(&config.config_prefix),
        }
    }

    pub fn main_config(&self) -> PathBuf {
        self.prefix.join(LogicalFile::Main.file_name())
    }

    pub fn include_dir(&self) -> PathBuf {
        self.prefix.join("rsyslog.d")
    }

    pub fn path_of(&self, file: LogicalFile) -> PathBuf {
        match file {
            LogicalFile::Main => self.main_config(),
            other => self.include_dir().join(other.file_name()),
        }
    }
}

/// Pure renderer from resolved configuration to file contents.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigRenderer;

impl ConfigRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render every applicable file, in load order.
    pub fn render(&self, config: &ResolvedConfig) -> Vec<RenderedFile> {
        let layout = Layout::new(config);

        let files: Vec<RenderedFile> = LogicalFile::ALL
            .into_iter()
            .filter_map(|id| {
                let content = self.render_file(config, &layout, id)?;
                Some(RenderedFile {
                    id,
                    path: layout.path_of(id),
                    content,
                    owner: "root".to_string(),
                    group: "root".to_string(),
                    mode: CONFIG_FILE_MODE,
                })
            })
            .collect();

        tracing::debug!(
            files = ?files.iter().map(|f| f.id.as_str()).collect::<Vec<_>>(),
            "Rendered configuration"
        );
        files
    }

    /// Content of one file, or `None` when the file does not apply.
    pub fn render_file(
        &self,
        config: &ResolvedConfig,
        layout: &Layout,
        id: LogicalFile,
    ) -> Option<String> {
        match id {
            LogicalFile::Main => Some(main_conf::render(config, layout)),
            LogicalFile::ImfileWatch => {
                config.has_file_watch().then(|| imfile::render(config))
            }
            LogicalFile::Remote => config.forwards_remotely().then(|| remote::render(config)),
            LogicalFile::DefaultRules => Some(default_rules::render(config, layout)),
        }
    }

    /// Directories that must exist before the files are written.
    pub fn directories(&self, config: &ResolvedConfig) -> Vec<ManagedDirectory> {
        let layout = Layout::new(config);
        vec![
            ManagedDirectory {
                path: layout.include_dir(),
                owner: "root".to_string(),
                group: "root".to_string(),
                mode: INCLUDE_DIR_MODE,
            },
            ManagedDirectory {
                path: Path::new(&config.working_dir).to_path_buf(),
                owner: config.user.clone(),
                group: config.group.clone(),
                mode: WORK_DIR_MODE,
            },
        ]
    }
}

/// Line-oriented builder for config text.
#[derive(Debug, Default)]
pub(crate) struct Conf {
    out: String,
}

impl Conf {
    /// Starts with the provenance header.
    pub(crate) fn new() -> Self {
        let mut conf = Self::default();
        conf.line(PROVENANCE_HEADER);
        conf
    }

    pub(crate) fn line(&mut self, line: impl AsRef<str>) -> &mut Self {
        self.out.push_str(line.as_ref());
        self.out.push('\n');
        self
    }

    pub(crate) fn blank(&mut self) -> &mut Self {
        if !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
        self
    }

    pub(crate) fn comment(&mut self, text: &str) -> &mut Self {
        self.line(format!("# {text}"))
    }

    /// `$Name value`
    pub(crate) fn directive(&mut self, name: &str, value: impl fmt::Display) -> &mut Self {
        self.line(format!("${name} {value}"))
    }

    /// Boxed section banner in the style of the stock rsyslog.conf.
    pub(crate) fn banner(&mut self, title: &str) -> &mut Self {
        let inner = format!("#### {title} ####");
        let rule = "#".repeat(inner.len());
        self.blank();
        self.line(&rule).line(&inner).line(&rule);
        self.blank()
    }

    pub(crate) fn finish(mut self) -> String {
        while self.out.ends_with("\n\n") {
            self.out.pop();
        }
        self.out
    }
}

/// Double-quoted RainerScript parameter value.
pub(crate) fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
