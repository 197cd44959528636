//! The one error type shared by every regwatch crate.
//!
//! Feed and source failures are mostly recorded in the run summary rather
//! than raised; a [`RegwatchError`] escaping `run_monitor` means the run
//! itself could not proceed. The `regwatch` binary reports it through
//! `color-eyre`.

use std::path::PathBuf;

/// Everything that can go wrong in a monitoring run.
#[derive(Debug, thiserror::Error)]
pub enum RegwatchError {
    /// `regwatch.toml` could not be read, parsed, or has invalid values.
    #[error("config error: {message}")]
    Config { message: String },

    /// A feed request failed or returned a non-success status.
    #[error("network error: {0}")]
    Network(String),

    /// A feed body or the dashboard page did not have the expected shape.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Records could not be serialized for the store or the dashboard.
    #[error("storage error: {0}")]
    Storage(String),

    /// The digest could not be built or handed to the mail server.
    #[error("notify error: {0}")]
    Notify(String),

    /// Reading or writing a store, config, or dashboard file failed.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A source definition would never match anything or has a bad feed URL.
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Result alias for regwatch operations.
pub type Result<T> = std::result::Result<T, RegwatchError>;

impl RegwatchError {
    /// Shorthand for [`RegwatchError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Shorthand for [`RegwatchError::Parse`].
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Shorthand for [`RegwatchError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Attach the file the failed operation was working on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
