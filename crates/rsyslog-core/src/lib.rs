//! Configuration synthesis and validation engine for rsyslog
//!
//! Turns a declarative attribute tree into a validated, platform-resolved
//! configuration, the exact set of config files the daemon needs, and a
//! single restart request when any of them changed:
//!
//! - **AttributeResolver**: merge caller attributes over per-family defaults
//! - **ConstraintValidator**: reject invalid combinations before rendering
//! - **PackageSelector**: base daemon, RELP transport and TLS packages
//! - **ConfigRenderer**: deterministic, platform-specific file contents
//! - **ChangeNotifier**: collapse content changes into one restart signal
//!
//! # Architecture
//!
//! ```text
//! AttributeTree -> AttributeResolver -> ResolvedConfig
//!                                            |
//!            +-------------------------------+---------------+
//!            |                               |               |
//!   ConstraintValidator (gate)        PackageSelector   ConfigRenderer
//!                                                            |
//!                                                     ChangeNotifier -> restart?
//! ```
//!
//! [`ConvergenceRun`] sequences the stages; filesystem access goes through
//! the [`ContentSource`] and [`FileSink`] traits.
//!
//! # Example
//!
//! ```no_run
//! use rsyslog_core::{
//!     AttributeTree, ConvergenceRun, LocalFilesystem, Platform, PlatformFamily, PlatformStyle,
//! };
//!
//! fn example() -> rsyslog_core::Result<()> {
//!     let tree = AttributeTree::new().with("server_ip", "10.0.0.1");
//!     let platform = Platform::new(PlatformFamily::Debian, PlatformStyle::Module);
//!     let fs = LocalFilesystem::new();
//!
//!     let convergence = ConvergenceRun::new(platform).converge(&tree, &fs)?;
//!     if convergence.apply(&fs)?.restart_requested {
//!         // restart the service
//!     }
//!     Ok(())
//! }
//! ```

pub mod attributes;
pub mod collab;
pub mod diff;
pub mod engine;
pub mod error;
pub mod notify;
pub mod packages;
pub mod platform;
pub mod render;
pub mod validation;

pub use attributes::{AttributeResolver, AttributeTree, ResolvedConfig};
pub use collab::{ContentSource, FileSink, LocalFilesystem, MemoryFilesystem};
pub use engine::{ApplyOutcome, Convergence, ConvergenceRun, FileDiff, Plan, RunState};
pub use error::{ConfigurationError, Error, Result};
pub use notify::{ChangeEvent, ChangeNotifier, ChangeReport, ChangeStatus};
pub use packages::{PackageReason, PackageRequirement, PackageSelector};
pub use platform::{Platform, PlatformFamily, PlatformStyle};
pub use render::{ConfigRenderer, LogicalFile, ManagedDirectory, RenderedFile};
pub use validation::ConstraintValidator;
