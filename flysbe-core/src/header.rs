//! Wire headers.
//!
//! - [`MessageHeader`] - optional 8-byte header before the fixed block
//! - [`GroupHeader`] - 4-byte repeating group dimension
//! - [`VarDataHeader`] - 4-byte length before variable-length data

use crate::buffer::{ReadBuffer, WriteBuffer};
use crate::error::{Error, Result};

/// Standard SBE message header (8 bytes).
///
/// # Wire Format
/// ```text
/// +0: blockLength  (u16, 2 bytes)
/// +2: templateId   (u16, 2 bytes)
/// +4: schemaId     (u16, 2 bytes)
/// +6: version      (u16, 2 bytes)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageHeader {
    /// Length of the root block in bytes.
    pub block_length: u16,
    /// Message template identifier.
    pub template_id: u16,
    /// Schema identifier.
    pub schema_id: u16,
    /// Schema version number.
    pub version: u16,
}

impl MessageHeader {
    /// Encoded length of the message header in bytes.
    pub const ENCODED_LENGTH: usize = 8;

    /// Creates a new message header with the specified values.
    #[must_use]
    pub const fn new(block_length: u16, template_id: u16, schema_id: u16, version: u16) -> Self {
        Self {
            block_length,
            template_id,
            schema_id,
            version,
        }
    }

    /// Decodes the message header at the given offset.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if the header does not fit.
    pub fn try_wrap<B: ReadBuffer + ?Sized>(buffer: &B, offset: usize) -> Result<Self> {
        buffer.check_range(offset, Self::ENCODED_LENGTH)?;
        Ok(Self {
            block_length: buffer.get_u16_le(offset),
            template_id: buffer.get_u16_le(offset + 2),
            schema_id: buffer.get_u16_le(offset + 4),
            version: buffer.get_u16_le(offset + 6),
        })
    }

    /// Encodes the message header at the given offset.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if the header does not fit.
    pub fn encode<B: WriteBuffer + ?Sized>(&self, buffer: &mut B, offset: usize) -> Result<()> {
        buffer.check_range(offset, Self::ENCODED_LENGTH)?;
        buffer.put_u16_le(offset, self.block_length);
        buffer.put_u16_le(offset + 2, self.template_id);
        buffer.put_u16_le(offset + 4, self.schema_id);
        buffer.put_u16_le(offset + 6, self.version);
        Ok(())
    }

    /// Validates template and schema identifiers.
    ///
    /// # Errors
    /// Returns [`Error::TemplateMismatch`] or [`Error::SchemaMismatch`].
    pub fn validate(&self, template_id: u16, schema_id: u16) -> Result<()> {
        if self.template_id != template_id {
            return Err(Error::TemplateMismatch {
                expected: template_id,
                actual: self.template_id,
            });
        }
        if self.schema_id != schema_id {
            return Err(Error::SchemaMismatch {
                expected: schema_id,
                actual: self.schema_id,
            });
        }
        Ok(())
    }
}

/// Repeating group dimension (4 bytes).
///
/// The count must be on the wire before any entry, which is why encoders
/// declare it up front.
///
/// # Wire Format
/// ```text
/// +0: blockLength  (u16, 2 bytes) - length of one entry
/// +2: numInGroup   (u16, 2 bytes)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GroupHeader {
    /// Length of each group entry in bytes.
    pub block_length: u16,
    /// Number of entries in the group.
    pub num_in_group: u16,
}

impl GroupHeader {
    /// Encoded length of the group header in bytes.
    pub const ENCODED_LENGTH: usize = 4;

    /// Creates a new group header.
    #[must_use]
    pub const fn new(block_length: u16, num_in_group: u16) -> Self {
        Self {
            block_length,
            num_in_group,
        }
    }

    /// Decodes the group header at the given offset.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if the header does not fit.
    pub fn try_wrap<B: ReadBuffer + ?Sized>(buffer: &B, offset: usize) -> Result<Self> {
        buffer.check_range(offset, Self::ENCODED_LENGTH)?;
        Ok(Self {
            block_length: buffer.get_u16_le(offset),
            num_in_group: buffer.get_u16_le(offset + 2),
        })
    }

    /// Encodes the group header at the given offset.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if the header does not fit.
    pub fn encode<B: WriteBuffer + ?Sized>(&self, buffer: &mut B, offset: usize) -> Result<()> {
        buffer.check_range(offset, Self::ENCODED_LENGTH)?;
        buffer.put_u16_le(offset, self.block_length);
        buffer.put_u16_le(offset + 2, self.num_in_group);
        Ok(())
    }

    /// Returns the total size of the group (header + all entries).
    #[must_use]
    pub const fn group_size(&self) -> usize {
        Self::ENCODED_LENGTH + (self.block_length as usize * self.num_in_group as usize)
    }

    /// Returns true if the group is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.num_in_group == 0
    }
}

/// Variable-length data header: a little-endian u32 byte count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VarDataHeader {
    /// Length of the variable data in bytes.
    pub length: u32,
}

impl VarDataHeader {
    /// Encoded length of the var data header in bytes.
    pub const ENCODED_LENGTH: usize = 4;

    /// Creates a new var data header.
    #[must_use]
    pub const fn new(length: u32) -> Self {
        Self { length }
    }

    /// Decodes the var data header at the given offset.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if the header does not fit.
    pub fn try_wrap<B: ReadBuffer + ?Sized>(buffer: &B, offset: usize) -> Result<Self> {
        buffer.check_range(offset, Self::ENCODED_LENGTH)?;
        Ok(Self {
            length: buffer.get_u32_le(offset),
        })
    }

    /// Encodes the var data header at the given offset.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if the header does not fit.
    pub fn encode<B: WriteBuffer + ?Sized>(&self, buffer: &mut B, offset: usize) -> Result<()> {
        buffer.check_range(offset, Self::ENCODED_LENGTH)?;
        buffer.put_u32_le(offset, self.length);
        Ok(())
    }

    /// Returns the total size (header + data).
    #[must_use]
    pub const fn total_size(&self) -> usize {
        Self::ENCODED_LENGTH + self.length as usize
    }
}
