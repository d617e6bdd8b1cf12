//! Error types for gitfacts.
//!
//! Git lookups never produce these: a failed lookup is a
//! [`Lookup::Failed`](crate::core::facts::Lookup) value. The variants here
//! cover operator mistakes (bad configuration) and I/O around them.

use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in gitfacts.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // =========================================================================
    // Configuration errors
    // =========================================================================
    /// Configuration file not found.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Path where config was expected.
        path: PathBuf,
    },

    /// Failed to parse configuration file.
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        /// Description of the parse error.
        message: String,
        /// Optional source error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid configuration value.
    #[error("Invalid configuration: {field} - {message}")]
    ConfigInvalid {
        /// Field name that is invalid.
        field: String,
        /// Description of why it's invalid.
        message: String,
    },

    // =========================================================================
    // Git errors
    // =========================================================================
    /// Not in a Git repository.
    #[error("Not in a Git repository")]
    NotGitRepo,

    /// The git binary could not be located.
    #[error("Git binary not found: {binary}")]
    GitNotFound {
        /// The binary name or path that was searched for.
        binary: String,
    },

    // =========================================================================
    // I/O errors
    // =========================================================================
    /// File I/O error.
    #[error("I/O error: {message}")]
    Io {
        /// Description of what failed.
        message: String,
        /// Source error.
        #[source]
        source: std::io::Error,
    },

    // =========================================================================
    // Internal errors
    // =========================================================================
    /// Internal error (should never happen).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl Error {
    /// Creates a new configuration parse error with source.
    pub fn config_parse_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new invalid configuration error.
    pub fn config_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a new I/O error with context.
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Returns an exit code appropriate for this error.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::ConfigNotFound { .. } | Self::ConfigParse { .. } | Self::ConfigInvalid { .. } => {
                78
            }, // EX_CONFIG
            Self::NotGitRepo | Self::GitNotFound { .. } => 65, // EX_DATAERR
            Self::Io { .. } | Self::Internal { .. } => 1,
        }
    }
}
