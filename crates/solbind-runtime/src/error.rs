//! Error types for the ABI codec

use thiserror::Error;

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

/// Errors raised while encoding or decoding ABI payloads
///
/// None of these are transient: each one means the input is malformed or
/// violates the wire format, so callers should surface them as-is.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Decoding needed more bytes than the buffer holds
    #[error("Insufficient data for {field}: need {needed} bytes, have {available}")]
    InsufficientData { field: String, needed: usize, available: usize },

    /// Padding, sign extension or payload bytes are inconsistent with the declared type
    #[error("Invalid encoding for {field}: {reason}")]
    InvalidEncoding { field: String, reason: String },

    /// A value does not fit the declared type width
    #[error("Value out of range for {ty}: {reason}")]
    ValueOutOfRange { ty: String, reason: String },

    /// A runtime value has a different shape than the type it is encoded as
    #[error("Type mismatch for {field}: expected {expected}, found {found}")]
    TypeMismatch { field: String, expected: String, found: String },
}

impl CodecError {
    pub fn insufficient_data(field: impl Into<String>, needed: usize, available: usize) -> Self {
        Self::InsufficientData { field: field.into(), needed, available }
    }

    pub fn invalid_encoding(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEncoding { field: field.into(), reason: reason.into() }
    }

    pub fn out_of_range(ty: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ValueOutOfRange { ty: ty.into(), reason: reason.into() }
    }

    pub fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch { field: field.into(), expected: expected.into(), found: found.into() }
    }
}
