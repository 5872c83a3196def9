//! Message-level traits shared by schema encoders and decoders.

use crate::error::Result;
use crate::header::MessageHeader;

/// Schema constants and position accessors of a message flyweight.
///
/// Implementations wrap a byte buffer and track where the message starts
/// (`offset`) and how far it has been written or read (`limit`).
pub trait SbeMessage {
    /// Schema ID.
    const SCHEMA_ID: u16;

    /// Schema version.
    const SCHEMA_VERSION: u16;

    /// Schema template ID for this message type.
    const TEMPLATE_ID: u16;

    /// Block length (fixed portion size in bytes).
    const BLOCK_LENGTH: u16;

    /// Semantic type, empty if none.
    const SEMANTIC_TYPE: &'static str = "";

    /// Offset of the root block in the buffer.
    fn offset(&self) -> usize;

    /// Position one past the last byte written or read so far.
    fn limit(&self) -> usize;

    /// Bytes between the root block and the current limit.
    fn encoded_length(&self) -> usize {
        self.limit().saturating_sub(self.offset())
    }

    /// Returns the schema ID.
    fn sbe_schema_id(&self) -> u16 {
        Self::SCHEMA_ID
    }

    /// Returns the schema version.
    fn sbe_schema_version(&self) -> u16 {
        Self::SCHEMA_VERSION
    }

    /// Returns the template ID.
    fn sbe_template_id(&self) -> u16 {
        Self::TEMPLATE_ID
    }

    /// Returns the root block length.
    fn sbe_block_length(&self) -> u16 {
        Self::BLOCK_LENGTH
    }

    /// Returns the semantic type.
    fn sbe_semantic_type(&self) -> &'static str {
        Self::SEMANTIC_TYPE
    }

    /// Creates the message header for this message type.
    #[must_use]
    fn create_header() -> MessageHeader
    where
        Self: Sized,
    {
        MessageHeader::new(
            Self::BLOCK_LENGTH,
            Self::TEMPLATE_ID,
            Self::SCHEMA_ID,
            Self::SCHEMA_VERSION,
        )
    }

    /// Validates that a header belongs to this message type.
    ///
    /// # Errors
    /// Returns a template or schema mismatch error.
    fn validate_header(header: &MessageHeader) -> Result<()>
    where
        Self: Sized,
    {
        header.validate(Self::TEMPLATE_ID, Self::SCHEMA_ID)
    }
}
