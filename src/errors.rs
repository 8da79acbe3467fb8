//! Unified error type for the ledger, its exports and the notification dispatcher.

use thiserror::Error;

/// Every failure the crate can surface to a caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Settings file or environment could not be turned into configuration
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// SeaORM / SQLite failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// The persisted store exists but cannot be decoded
    #[error("Storage error: {message}")]
    Storage {
        /// What went wrong
        message: String,
    },

    /// A record field failed its constraint; nothing was mutated
    #[error("Invalid {field}: {reason}")]
    Validation {
        /// Offending field, as named in the snapshot format
        field: &'static str,
        /// Human-readable constraint description
        reason: String,
    },

    /// The snapshot could not be parsed; the store is untouched
    #[error("Import failed: {message}")]
    ImportFailed {
        /// Parser message
        message: String,
    },

    /// The file was rejected by extension before any parse attempt
    #[error("Unsupported import format: {extension}")]
    UnsupportedFormat {
        /// The extension that was offered (empty when there was none)
        extension: String,
    },

    /// An export writer failed
    #[error("Export failed: {message}")]
    Export {
        /// What went wrong
        message: String,
    },

    /// The SMS provider rejected the message or could not be reached
    #[error("Notification failed: {message}")]
    Notification {
        /// Provider or transport message
        message: String,
    },

    /// JSON encoding/decoding
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Zip container error
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Spreadsheet writer error
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Shorthand for a [`Error::Validation`].
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
