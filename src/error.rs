//! Error types for Scrapyard
//!
//! All modules use `ScrapyardResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Scrapyard operations
pub type ScrapyardResult<T> = Result<T, ScrapyardError>;

/// Exit code for a search that found nothing
pub const EXIT_MISS: u8 = 1;

/// Exit code for any failed operation other than extraction
pub const EXIT_FAILURE: u8 = 2;

/// Exit code for a failed extraction
pub const EXIT_ARCHIVE_CORRUPT: u8 = 255;

/// All errors that can occur in Scrapyard
#[derive(Error, Debug)]
pub enum ScrapyardError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Invalid yard {yard}: {reason}")]
    YardInvalid { yard: String, reason: String },

    // Backend errors
    #[error("Yard {yard} unavailable: {reason}")]
    BackendUnavailable { yard: String, reason: String },

    // Archive errors
    #[error("Failed to pack {path}: {reason}")]
    ArchiveCreate { path: PathBuf, reason: String },

    #[error("Failed to extract {path}: {reason}")]
    ArchiveCorrupt { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl ScrapyardError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a backend unavailable error
    pub fn backend(yard: impl Into<String>, reason: impl ToString) -> Self {
        Self::BackendUnavailable {
            yard: yard.into(),
            reason: reason.to_string(),
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ArchiveCorrupt { .. } => EXIT_ARCHIVE_CORRUPT,
            _ => EXIT_FAILURE,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::CommandFailed { .. } => {
                Some("Install the AWS CLI or set [s3] command in the config file")
            }
            Self::BackendUnavailable { .. } => {
                Some("Check that the yard exists and credentials are configured")
            }
            Self::ArchiveCorrupt { .. } => Some("Junk the broken entry and store it again"),
            _ => None,
        }
    }
}
