/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::types::Timestamp;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Clipboard history errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
#[non_exhaustive]
pub enum ClipboardError {
    #[error("No clipboard entry with timestamp {0}")]
    #[diagnostic(
        code(clipboard::not_found),
        help("The entry may have expired or been cleared. Re-read the history before acting on it.")
    )]
    NotFound(Timestamp),

    #[error("Index {index} out of range (history size: {len})")]
    #[diagnostic(code(clipboard::index_out_of_range))]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Entry at index {0} is pinned")]
    #[diagnostic(
        code(clipboard::pinned),
        help("Unpin the entry before removing it.")
    )]
    Pinned(usize),

    #[error("Data too large: {size} bytes (max: {max})")]
    #[diagnostic(code(clipboard::too_large))]
    TooLarge { size: usize, max: usize },

    #[error("Invalid data: {0}")]
    #[diagnostic(code(clipboard::invalid_data))]
    InvalidData(String),

    #[error("Preference storage error: {0}")]
    #[diagnostic(
        code(clipboard::storage),
        help("Check that the preference file location exists and is writable.")
    )]
    Storage(String),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(clipboard::serialization))]
    Serialization(String),
}

impl From<serde_json::Error> for ClipboardError {
    fn from(err: serde_json::Error) -> Self {
        ClipboardError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for ClipboardError {
    fn from(err: std::io::Error) -> Self {
        ClipboardError::Storage(err.to_string())
    }
}

/// Result type for clipboard operations
pub type ClipboardResult<T> = Result<T, ClipboardError>;
