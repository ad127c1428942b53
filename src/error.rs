/*!
 * Error types for medex
 */

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExportError>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_PARTIAL: i32 = 1;
pub const EXIT_FATAL: i32 = 2;

#[derive(Debug, Error)]
pub enum ExportError {
    /// Configuration error (missing keys, unparseable file or endpoint)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Token acquisition failed
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Catalog API returned a non-success status
    #[error("Catalog API error: {status}: {message}")]
    Api { status: u16, message: String },

    /// No streaming locator references the asset
    #[error("No streaming locator found for asset '{0}'")]
    LocatorNotFound(String),

    /// Streaming path did not have the expected shape
    #[error("Unexpected streaming path shape: {0}")]
    ManifestShape(String),

    /// Output file I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExportError {
    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // Fatal errors: nothing was exported and nothing could be
            ExportError::Config(_) | ExportError::Authentication(_) => EXIT_FATAL,
            // Everything else aborted a run that had already started
            _ => EXIT_PARTIAL,
        }
    }

    /// Check if this error always aborts the run, even in tolerant mode
    pub fn is_fatal(&self) -> bool {
        matches!(self, ExportError::Config(_) | ExportError::Authentication(_))
    }

    /// Check if this error can be skipped at asset granularity in tolerant mode
    pub fn is_per_asset(&self) -> bool {
        matches!(
            self,
            ExportError::LocatorNotFound(_)
                | ExportError::ManifestShape(_)
                | ExportError::Http(_)
                | ExportError::Api { .. }
        )
    }
}
