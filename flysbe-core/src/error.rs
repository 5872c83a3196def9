//! Error types for flysbe operations.

use thiserror::Error;

/// Core error type shared by every flysbe crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Buffer is too short for the requested operation.
    #[error("buffer too short: required {required} bytes, available {available} bytes")]
    BufferTooShort {
        /// Required buffer size in bytes.
        required: usize,
        /// Available buffer size in bytes.
        available: usize,
    },

    /// Invalid construction-time configuration.
    #[error("invalid configuration: {message}")]
    Configuration {
        /// Description of the problem.
        message: String,
    },

    /// A length exceeds the maximum a field can hold.
    #[error("length too large for {field}: {length} > {max}")]
    LengthExceeded {
        /// Field name.
        field: &'static str,
        /// Requested length.
        length: usize,
        /// Maximum permitted length.
        max: usize,
    },

    /// A field was accessed outside of its valid protocol stage.
    #[error("out of order: {message}")]
    Sequencing {
        /// Description of the violated ordering rule.
        message: String,
    },

    /// The character encoding cannot be used on this path.
    #[error("unsupported character encoding: {encoding}")]
    UnsupportedEncoding {
        /// Encoding name.
        encoding: String,
    },

    /// A character cannot be represented in the declared encoding.
    #[error("character {ch:?} at position {position} cannot be encoded as {encoding}")]
    Unmappable {
        /// Character index in the source.
        position: usize,
        /// The offending character.
        ch: char,
        /// Encoding name.
        encoding: &'static str,
    },

    /// Bytes that do not decode in the declared encoding.
    #[error("invalid {encoding} text at offset {offset}")]
    InvalidText {
        /// Byte offset of the first invalid sequence.
        offset: usize,
        /// Encoding name.
        encoding: &'static str,
    },

    /// A flyweight or session was used without a wrapped buffer.
    #[error("{name} is not wrapped around a buffer")]
    NotAttached {
        /// Name of the field or message.
        name: &'static str,
    },

    /// Template ID mismatch during decoding.
    #[error("template mismatch: expected {expected}, actual {actual}")]
    TemplateMismatch {
        /// Expected template ID.
        expected: u16,
        /// Actual template ID found.
        actual: u16,
    },

    /// Schema ID mismatch during decoding.
    #[error("schema mismatch: expected {expected}, actual {actual}")]
    SchemaMismatch {
        /// Expected schema ID.
        expected: u16,
        /// Actual schema ID found.
        actual: u16,
    },

    /// An enum name that matches no constant.
    #[error("unknown enum name: {name:?}")]
    UnknownEnumName {
        /// The unmatched name, lossily decoded as ASCII.
        name: String,
    },

    /// A value whose runtime type is not the codec's enum type.
    #[error("invalid enum value type (expected: {expected})")]
    EnumTypeMismatch {
        /// Expected enum type name.
        expected: &'static str,
    },
}

impl Error {
    /// Creates a sequencing error.
    pub fn sequencing(message: impl Into<String>) -> Self {
        Self::Sequencing {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Returns true if this is a protocol ordering violation.
    #[must_use]
    pub const fn is_sequencing(&self) -> bool {
        matches!(self, Self::Sequencing { .. })
    }
}

/// Result type alias for flysbe operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_buffer_too_short() {
        let err = Error::BufferTooShort {
            required: 100,
            available: 50,
        };
        let msg = err.to_string();
        assert!(msg.contains("100"));
        assert!(msg.contains("50"));
        assert!(msg.contains("buffer too short"));
    }

    #[test]
    fn test_error_display_length_exceeded() {
        let err = Error::LengthExceeded {
            field: "symbol",
            length: 9,
            max: 8,
        };
        assert_eq!(err.to_string(), "length too large for symbol: 9 > 8");
    }

    #[test]
    fn test_sequencing_helper() {
        let err = Error::sequencing("legGroup is not complete");
        assert!(err.is_sequencing());
        assert!(err.to_string().contains("legGroup is not complete"));
        assert!(!Error::configuration("x").is_sequencing());
    }

    #[test]
    fn test_error_display_unmappable() {
        let err = Error::Unmappable {
            position: 3,
            ch: 'é',
            encoding: "ASCII",
        };
        let msg = err.to_string();
        assert!(msg.contains("position 3"));
        assert!(msg.contains("ASCII"));
    }

    #[test]
    fn test_error_equality() {
        let err1 = Error::TemplateMismatch {
            expected: 1,
            actual: 2,
        };
        let err2 = err1.clone();
        assert_eq!(err1, err2);
        assert_ne!(
            err1,
            Error::TemplateMismatch {
                expected: 1,
                actual: 3
            }
        );
    }
}
