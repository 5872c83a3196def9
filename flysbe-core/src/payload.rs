//! Payload descriptor handed back when an encode completes.

use crate::buffer::check_range;
use crate::error::Result;
use crate::header::MessageHeader;

/// Borrowed view of an encoded message region.
///
/// It neither owns nor copies the bytes; it only records where the message
/// sits inside the externally owned buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadView<'a> {
    buffer: &'a [u8],
    offset: usize,
    header_length: usize,
    message_length: usize,
}

impl<'a> PayloadView<'a> {
    /// Creates a view of `header_length + message_length` bytes at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`](crate::Error::BufferTooShort) when
    /// the region does not fit inside `buffer`.
    pub fn new(
        buffer: &'a [u8],
        offset: usize,
        header_length: usize,
        message_length: usize,
    ) -> Result<Self> {
        let total = header_length.saturating_add(message_length);
        check_range(buffer.len(), offset, total)?;
        Ok(Self {
            buffer,
            offset,
            header_length,
            message_length,
        })
    }

    /// Returns the whole underlying buffer.
    #[must_use]
    pub const fn buffer(&self) -> &'a [u8] {
        self.buffer
    }

    /// Offset of the first byte (the header, if any).
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Length of the message header, 0 when none was written.
    #[must_use]
    pub const fn header_length(&self) -> usize {
        self.header_length
    }

    /// Length of the message body: block, groups and var data.
    #[must_use]
    pub const fn message_length(&self) -> usize {
        self.message_length
    }

    /// Header length plus message length.
    #[must_use]
    pub const fn total_length(&self) -> usize {
        self.header_length + self.message_length
    }

    /// Returns true when a message header precedes the body.
    #[must_use]
    pub const fn has_header(&self) -> bool {
        self.header_length == MessageHeader::ENCODED_LENGTH
    }

    /// The encoded bytes, header included.
    #[must_use]
    pub fn bytes(&self) -> &'a [u8] {
        &self.buffer[self.offset..self.offset + self.total_length()]
    }

    /// The encoded body, header excluded.
    #[must_use]
    pub fn message_bytes(&self) -> &'a [u8] {
        let start = self.offset + self.header_length;
        &self.buffer[start..start + self.message_length]
    }
}
