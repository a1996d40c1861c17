//! Error handling for the apiforge scaffolding library.
//!
//! This module defines the main error type `Error` used throughout the library,
//! along with a convenient `Result` type alias. The variants follow the
//! failure taxonomy of a generation run: configuration problems are fatal
//! before any state is written, oracle and filesystem failures affect a single
//! unit of work, and repository or recovery-file problems degrade gracefully.
//!
//! # Examples
//!
//! ```
//! use apiforge::core::error::{Error, Result};
//!
//! fn might_fail() -> Result<()> {
//!     Err(Error::config("missing API key"))
//! }
//!
//! assert!(might_fail().is_err());
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Result type for apiforge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for apiforge operations
#[derive(Debug, Error)]
pub enum Error {
    /// Missing API key, unreadable template root, malformed config file
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network, authentication or rate-limit failure talking to the LLM
    #[error("Oracle transport error: {0}")]
    OracleTransport(String),

    /// The LLM answered but the reply lacked the requested structure
    #[error("Oracle protocol error: {0}")]
    OracleProtocol(String),

    /// A filesystem operation on a specific path failed
    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The diagram repository rejected or failed an operation
    #[error("Repository error: {0}")]
    Repository(String),

    /// A template could not be found in any template source
    #[error("Template not found: {0}")]
    TemplateMissing(String),

    /// Template engine error
    #[error("Template engine error: {0}")]
    Template(#[from] tera::Error),

    /// The recovery snapshot could not be read or has the wrong shape
    #[error("Invalid recovery state: {0}")]
    InvalidRecoveryState(String),

    /// ZIP archive creation failed
    #[error("Archive error: {0}")]
    Archive(String),

    /// A named record already exists and may not be overwritten
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// A named record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new oracle transport error
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        Self::OracleTransport(msg.into())
    }

    /// Create a new oracle protocol error
    pub fn protocol<S: Into<String>>(msg: S) -> Self {
        Self::OracleProtocol(msg.into())
    }

    /// Create a new repository error
    pub fn repository<S: Into<String>>(msg: S) -> Self {
        Self::Repository(msg.into())
    }

    /// Wrap an I/O error with the path it happened on
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Whether the error came from the LLM oracle (transport or protocol)
    pub fn is_oracle(&self) -> bool {
        matches!(self, Self::OracleTransport(_) | Self::OracleProtocol(_))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Self::Repository(e.to_string())
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        Self::Archive(e.to_string())
    }
}
