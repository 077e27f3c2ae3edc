//! Catalog loading errors.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used by catalog operations.
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Errors that can occur while loading the widget catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read widget catalog `{}`: {source}", path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The catalog is not valid JSON.
    #[error("malformed widget catalog: {source}")]
    Malformed {
        /// Underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// An entry could not be reduced to a widget name.
    #[error("invalid widget catalog entry at index {index}: {reason}")]
    InvalidEntry {
        /// Zero-based position of the entry.
        index: usize,
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// A widget name appears more than once.
    #[error("widget `{name}` is listed more than once")]
    DuplicateWidget {
        /// The repeated widget name.
        name: String,
    },

    /// The catalog lists no widgets.
    #[error("widget catalog is empty")]
    Empty,
}
