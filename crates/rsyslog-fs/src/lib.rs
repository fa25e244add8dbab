//! Filesystem collaborator for rsyslog-converge
//!
//! Provides atomic writes, permission and ownership application, checksums
//! and format-agnostic loading of attribute documents.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod owner;

pub use config::DocumentStore;
pub use error::{Error, Result};
pub use owner::AccountDb;
