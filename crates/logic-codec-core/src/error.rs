//! Error types for the logic codec.

use thiserror::Error;

/// Errors raised by schema resolution, encoding, decoding and interaction
/// canonicalization.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("missing argument: {0}")]
    MissingArgument(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Wraps any failure raised while processing a manifest or interaction.
    #[error("serialization failed: {source}")]
    SerializationFailed {
        #[source]
        source: Box<CodecError>,
    },

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),

    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

impl CodecError {
    /// Wrap an error as `SerializationFailed`, keeping it as the cause.
    ///
    /// An error that is already `SerializationFailed` is returned as is.
    pub fn serialization_failed(cause: CodecError) -> Self {
        match cause {
            CodecError::SerializationFailed { .. } => cause,
            other => CodecError::SerializationFailed {
                source: Box::new(other),
            },
        }
    }

    /// The wrapped cause of a `SerializationFailed` error.
    pub fn cause(&self) -> Option<&CodecError> {
        match self {
            CodecError::SerializationFailed { source } => Some(source),
            _ => None,
        }
    }
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_serialization_failed_keeps_cause() {
        let err = CodecError::serialization_failed(CodecError::MissingArgument("payload".into()));

        assert!(matches!(err.cause(), Some(CodecError::MissingArgument(_))));
        assert!(err.source().is_some());
        assert_eq!(
            err.to_string(),
            "serialization failed: missing argument: payload"
        );
    }

    #[test]
    fn test_serialization_failed_is_not_nested() {
        let inner = CodecError::serialization_failed(CodecError::NotFound("x".into()));
        let outer = CodecError::serialization_failed(inner);

        assert!(matches!(outer.cause(), Some(CodecError::NotFound(_))));
    }
}
