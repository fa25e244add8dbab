//! Error types for rsyslog-core

use crate::engine::RunState;

/// Result type for rsyslog-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during a convergence run
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A cross-field invariant does not hold; the run is rejected
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The attribute document is not a mapping
    #[error("Malformed attributes: expected a mapping at the top level, found {found}")]
    MalformedAttributes { found: &'static str },

    /// Unknown platform family name
    #[error("Unknown platform family: {name}")]
    UnknownFamily { name: String },

    /// Unknown platform style name
    #[error("Unknown platform style: {name}")]
    UnknownStyle { name: String },

    /// Unknown logical file id
    #[error("Unknown logical file: {name}")]
    UnknownFile { name: String },

    /// A convergence run was driven out of order
    #[error("Invalid run transition from {from} to {to}")]
    InvalidTransition { from: RunState, to: RunState },

    /// Filesystem collaborator error
    #[error(transparent)]
    Fs(#[from] rsyslog_fs::Error),
}

/// A violated configuration invariant.
///
/// Raised by the constraint validator before anything is rendered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid configuration for `{attribute}`: {message}")]
pub struct ConfigurationError {
    /// Attribute the violation is reported against
    pub attribute: String,
    /// Human-readable description of the violation
    pub message: String,
}

impl ConfigurationError {
    pub fn new(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            message: message.into(),
        }
    }
}
