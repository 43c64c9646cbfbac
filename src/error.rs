//! Error types for webitel-contacts

/// Error type for boundary decoding and function-call failures.
///
/// `NullArgument` is the only hard failure a caller of `unique_contact` can
/// trigger on well-typed input; malformed rows and variable overwrites during
/// aggregation are diagnostics, never errors.
#[derive(Debug, thiserror::Error)]
pub enum ContactsError {
    #[error("argument must not be null")]
    NullArgument,

    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Decoding error: {0}")]
    Decoding(String),
}

impl ContactsError {
    pub fn mismatch(expected: &str, actual: &str) -> Self {
        ContactsError::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// Result type alias for webitel-contacts operations
pub type Result<T> = std::result::Result<T, ContactsError>;
