//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use rsyslog_core::{LogicalFile, PlatformFamily, PlatformStyle};

/// rsyslog-converge - Render, validate and converge rsyslog configuration
#[derive(Parser, Debug)]
#[command(name = "rsyslog-converge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Attribute document (.toml, .json, .yaml or .yml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub attributes: Option<PathBuf>,

    /// Platform family of the target host (debian, ubuntu, rhel, centos, ...)
    #[arg(
        long,
        global = true,
        env = "RSYSLOG_CONVERGE_FAMILY",
        default_value = "debian"
    )]
    pub family: PlatformFamily,

    /// Config syntax style (legacy or module)
    #[arg(
        long,
        global = true,
        env = "RSYSLOG_CONVERGE_STYLE",
        default_value = "module"
    )]
    pub style: PlatformStyle,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Resolve and validate the attributes
    Validate {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// List the packages the configuration requires
    Packages {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Print rendered configuration files
    ///
    /// Examples:
    ///   rsyslog-converge render
    ///   rsyslog-converge render --file main
    ///   rsyslog-converge render --file 50-default.conf
    Render {
        /// Only print this file (main, imfile-watch, remote, default-rules or a file name)
        #[arg(long)]
        file: Option<LogicalFile>,
    },

    /// Preview what converge would change
    Diff {
        /// Compare against a staged root instead of /
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Write changed files and report whether a restart is needed
    Converge {
        /// Write under a staged root instead of /
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Do not change file ownership
        #[arg(long)]
        no_chown: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    ///
    /// Examples:
    ///   rsyslog-converge completions bash > ~/.local/share/bash-completion/completions/rsyslog-converge
    ///   rsyslog-converge completions zsh > ~/.zfunc/_rsyslog-converge
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
