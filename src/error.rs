//! Error types for sqlmail.
//!
//! Every stage of the export job reports failures through [`ExportError`];
//! nothing is recovered locally, the first error ends the run.

use thiserror::Error;

/// Main error type for export job operations.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Configuration errors (missing file, malformed TOML, invalid values).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection, query execution or column metadata failures.
    #[error("Query error: {0}")]
    Query(String),

    /// A row value could not be decoded into a cell.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Spreadsheet persistence failures.
    #[error("Write error: {0}")]
    Write(String),

    /// SMTP connect, authentication or send failures.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl ExportError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a decode error with the given message.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Creates a write error with the given message.
    pub fn write(msg: impl Into<String>) -> Self {
        Self::Write(msg.into())
    }

    /// Creates a transport error with the given message.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "Configuration Error",
            Self::Query(_) => "Query Error",
            Self::Decode(_) => "Decode Error",
            Self::Write(_) => "Write Error",
            Self::Transport(_) => "Transport Error",
        }
    }
}

/// Result type alias using ExportError.
pub type Result<T> = std::result::Result<T, ExportError>;
