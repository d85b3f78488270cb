//! Error types for csvnest

use thiserror::Error;

/// Errors raised while encoding or decoding CSV
#[derive(Debug, Error)]
pub enum CsvError {
    /// The CSV rows themselves are malformed.
    #[error("Parse error on line {line}: {message}")]
    Parse { line: u64, message: String },
    /// A cell's inline notation is malformed.
    #[error("Invalid inline value at position {position}: {message}")]
    Inline { position: usize, message: String },
    /// A cell's text could not be coerced to the requested type.
    #[error("Could not convert value '{value}' to type '{type_name}': {reason}")]
    Conversion {
        value: String,
        type_name: String,
        reason: String,
    },
    /// A header named a property the target bean does not have.
    #[error("Unknown property '{property}' on bean '{bean}'")]
    UnknownProperty { property: String, bean: String },
    /// I/O operation failed while reading or writing data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The underlying CSV reader or writer reported an error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// JSON bridging failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CsvError {
    /// Shorthand for a conversion failure
    pub fn conversion(
        value: impl Into<String>,
        type_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CsvError::Conversion {
            value: value.into(),
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by a cell that could not be coerced
    pub fn is_conversion(&self) -> bool {
        matches!(
            self,
            CsvError::Conversion { .. } | CsvError::UnknownProperty { .. }
        )
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CsvError>;
