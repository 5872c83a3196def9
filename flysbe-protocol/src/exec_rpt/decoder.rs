//! `ExecRpt` decoder with forward skipping.

use super::schema::{
    BLOCK_LENGTH, LEG_BLOCK_LENGTH, PRICE_OFFSET, QUANTITY_OFFSET, REJECT_TEXT, SCHEMA_ID,
    SCHEMA_VERSION, SETTL_DATE, SYMBOL, TEMPLATE_ID,
};
use flysbe_codec::string::{FixedStringDecoder, VarStringDecoder};
use flysbe_core::buffer::{ReadBuffer, check_range};
use flysbe_core::header::{GroupHeader, MessageHeader, VarDataHeader};
use flysbe_core::{Error, PayloadView, Result, SbeMessage};
use std::fmt;

const MESSAGE_NAME: &str = "ExecRpt";

#[derive(Debug, Clone, Copy)]
struct LegCursor {
    started: bool,
    count: usize,
    entry_length: usize,
    base: usize,
    index: isize,
}

impl LegCursor {
    const fn new() -> Self {
        Self {
            started: false,
            count: 0,
            entry_length: 0,
            base: 0,
            index: -1,
        }
    }

    const fn end(&self) -> usize {
        self.base + self.count * self.entry_length
    }
}

/// Decoder for `ExecRpt` messages.
///
/// Reads follow the wire order. Asking for the trailing field while legs
/// remain unread skips over them; reading the legs or the trailing field a
/// second time in one pass is a sequencing error until
/// [`reset`](Self::reset).
#[derive(Debug, Clone)]
pub struct ExecRptDecoder<'a> {
    buffer: Option<&'a [u8]>,
    offset: usize,
    acting_block_length: usize,
    acting_version: u16,
    limit: usize,
    legs: LegCursor,
    tail_read: bool,
}

impl<'a> ExecRptDecoder<'a> {
    /// Creates an unattached decoder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: None,
            offset: 0,
            acting_block_length: BLOCK_LENGTH as usize,
            acting_version: SCHEMA_VERSION,
            limit: 0,
            legs: LegCursor::new(),
            tail_read: false,
        }
    }

    /// Wraps a message body at `offset` written with the given block length
    /// and schema version.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if the block does not fit.
    pub fn wrap(
        &mut self,
        buffer: &'a [u8],
        offset: usize,
        acting_block_length: u16,
        acting_version: u16,
    ) -> Result<&mut Self> {
        check_range(buffer.len(), offset, acting_block_length as usize)?;
        self.buffer = Some(buffer);
        self.offset = offset;
        self.acting_block_length = acting_block_length as usize;
        self.acting_version = acting_version;
        tracing::trace!(offset, acting_block_length, acting_version, "ExecRpt decoder wrapped");
        Ok(self.reset())
    }

    /// Reads and validates a message header at `offset`, then wraps the
    /// body after it.
    ///
    /// # Errors
    /// Returns a bounds error or a template/schema mismatch.
    pub fn wrap_with_header(&mut self, buffer: &'a [u8], offset: usize) -> Result<&mut Self> {
        let header = MessageHeader::try_wrap(buffer, offset)?;
        Self::validate_header(&header)?;
        self.wrap(
            buffer,
            offset + MessageHeader::ENCODED_LENGTH,
            header.block_length,
            header.version,
        )
    }

    /// Wraps the message an encoder described.
    ///
    /// # Errors
    /// Same as [`wrap`](Self::wrap) or [`wrap_with_header`](Self::wrap_with_header).
    pub fn wrap_payload(&mut self, payload: &PayloadView<'a>) -> Result<&mut Self> {
        if payload.has_header() {
            self.wrap_with_header(payload.buffer(), payload.offset())
        } else {
            self.wrap(
                payload.buffer(),
                payload.offset(),
                BLOCK_LENGTH,
                SCHEMA_VERSION,
            )
        }
    }

    /// Rewinds to the start of the message body for another pass.
    pub fn reset(&mut self) -> &mut Self {
        self.limit = self.offset + self.acting_block_length;
        self.legs = LegCursor::new();
        self.tail_read = false;
        self
    }

    /// Detaches from the buffer.
    pub fn unwrap(&mut self) -> Option<&'a [u8]> {
        self.offset = 0;
        self.limit = 0;
        self.legs = LegCursor::new();
        self.tail_read = false;
        self.buffer.take()
    }

    /// The wrapped buffer, if any.
    #[must_use]
    pub const fn buffer(&self) -> Option<&'a [u8]> {
        self.buffer
    }

    /// Returns true while attached.
    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.buffer.is_some()
    }

    /// Block length the message was written with.
    #[must_use]
    pub const fn acting_block_length(&self) -> usize {
        self.acting_block_length
    }

    /// Schema version the message was written with.
    #[must_use]
    pub const fn acting_version(&self) -> u16 {
        self.acting_version
    }

    fn attached(&self) -> Result<&'a [u8]> {
        self.buffer.ok_or(Error::NotAttached { name: MESSAGE_NAME })
    }

    /// Symbol, trailing NULs trimmed.
    ///
    /// # Errors
    /// Returns [`Error::NotAttached`] or a bounds error.
    pub fn symbol(&self) -> Result<String> {
        self.symbol_decoder()?.get()
    }

    /// Flyweight over the symbol field.
    ///
    /// # Errors
    /// Returns [`Error::NotAttached`].
    pub fn symbol_decoder(&self) -> Result<FixedStringDecoder<'a>> {
        Ok(FixedStringDecoder::attached(
            &SYMBOL,
            self.attached()?,
            self.offset,
        ))
    }

    /// Starts iterating the legs group.
    ///
    /// # Errors
    /// Returns a sequencing error if the group was already started in this
    /// pass, or a bounds error for a truncated group.
    pub fn legs(&mut self) -> Result<LegGroupDecoder<'_, 'a>> {
        self.attached()?;
        if self.legs.started {
            return Err(Error::sequencing("legs already read in this pass"));
        }
        self.start_legs()?;
        Ok(LegGroupDecoder { session: self })
    }

    /// Returns to the legs group, starting it if needed.
    ///
    /// # Errors
    /// Returns a bounds error for a truncated group.
    pub fn leg_group(&mut self) -> Result<LegGroupDecoder<'_, 'a>> {
        self.attached()?;
        if !self.legs.started {
            self.start_legs()?;
        }
        Ok(LegGroupDecoder { session: self })
    }

    fn start_legs(&mut self) -> Result<()> {
        let buffer = self.attached()?;
        let header = GroupHeader::try_wrap(buffer, self.limit)?;
        let count = header.num_in_group as usize;
        let entry_length = header.block_length as usize;
        if count > 0 && entry_length < LEG_BLOCK_LENGTH as usize {
            return Err(Error::BufferTooShort {
                required: LEG_BLOCK_LENGTH as usize,
                available: entry_length,
            });
        }
        let base = self.limit + GroupHeader::ENCODED_LENGTH;
        check_range(buffer.len(), base, count * entry_length)?;
        self.legs = LegCursor {
            started: true,
            count,
            entry_length,
            base,
            index: -1,
        };
        self.limit = base;
        Ok(())
    }

    fn next_leg(&mut self) -> Option<LegEntry<'a>> {
        let buffer = self.buffer?;
        let legs = &mut self.legs;
        if legs.index + 1 >= legs.count as isize {
            legs.index = legs.count as isize;
            self.limit = legs.end();
            return None;
        }
        legs.index += 1;
        let offset = legs.base + legs.index as usize * legs.entry_length;
        self.limit = offset + legs.entry_length;
        Some(LegEntry { buffer, offset })
    }

    fn remaining_legs(&self) -> usize {
        let legs = &self.legs;
        (legs.count as isize - (legs.index + 1)).max(0) as usize
    }

    fn skip_legs(&mut self) -> Result<()> {
        if !self.legs.started {
            self.start_legs()?;
        }
        let legs = &mut self.legs;
        let remaining = legs.count as isize - (legs.index + 1);
        if remaining > 0 {
            tracing::debug!(skipped = remaining, "skipping unread legs");
        }
        legs.index = legs.count as isize;
        self.limit = legs.end();
        Ok(())
    }

    /// Flyweight over the trailing text, skipping any unread legs.
    ///
    /// # Errors
    /// Returns a sequencing error on a second read in one pass, or a bounds
    /// error for a truncated message.
    pub fn reject_text(&mut self) -> Result<VarStringDecoder<'a>> {
        let buffer = self.attached()?;
        if self.tail_read {
            return Err(Error::sequencing("rejectText already read in this pass"));
        }
        self.skip_legs()?;
        let header = VarDataHeader::try_wrap(buffer, self.limit)?;
        check_range(buffer.len(), self.limit, header.total_size())?;
        let decoder = VarStringDecoder::attached(&REJECT_TEXT, buffer, self.limit);
        self.limit += header.total_size();
        self.tail_read = true;
        Ok(decoder)
    }

    fn render(&self) -> Result<String> {
        let mut pass = self.clone();
        pass.reset();
        let mut out = format!("{MESSAGE_NAME}{{symbol={}, legs=[", pass.symbol()?);
        let legs: Vec<LegEntry<'a>> = pass.legs()?.into_iter().collect();
        for (i, leg) in legs.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&format!(
                "{{settlDate={}, quantity={}, price={}}}",
                leg.settl_date()?,
                leg.quantity(),
                leg.price()
            ));
        }
        let text = pass.reject_text()?.get()?;
        out.push_str(&format!("], rejectText={text}}}"));
        Ok(out)
    }
}

impl Default for ExecRptDecoder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl SbeMessage for ExecRptDecoder<'_> {
    const SCHEMA_ID: u16 = SCHEMA_ID;
    const SCHEMA_VERSION: u16 = SCHEMA_VERSION;
    const TEMPLATE_ID: u16 = TEMPLATE_ID;
    const BLOCK_LENGTH: u16 = BLOCK_LENGTH;

    fn offset(&self) -> usize {
        self.offset
    }

    fn limit(&self) -> usize {
        self.limit
    }
}

/// Renders the whole message from a fresh pass; the decoder's own
/// position is untouched.
impl fmt::Display for ExecRptDecoder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render() {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "{MESSAGE_NAME}(?)"),
        }
    }
}

/// Cursor over the legs group.
///
/// [`next`](Self::next) yields one [`LegEntry`] per leg and the getters on
/// the group read the entry most recently yielded. [`count`](Self::count)
/// is the wire count and does not move the cursor. For iterator adapters
/// use [`iter`](Self::iter) or `into_iter()`.
pub struct LegGroupDecoder<'s, 'a> {
    session: &'s mut ExecRptDecoder<'a>,
}

impl<'a> LegGroupDecoder<'_, 'a> {
    /// Number of legs on the wire.
    #[must_use]
    pub fn count(&self) -> usize {
        self.session.legs.count
    }

    /// Legs not yet yielded.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.session.remaining_legs()
    }

    /// Advances to the next leg, `None` once the group is exhausted.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<LegEntry<'a>> {
        self.session.next_leg()
    }

    /// Iterator over the legs not yet yielded.
    pub fn iter(&mut self) -> LegIter<'_, 'a> {
        LegIter {
            session: &mut *self.session,
        }
    }

    /// Current entry, -1 before the first one.
    #[must_use]
    pub fn index(&self) -> isize {
        self.session.legs.index
    }

    /// Returns true if another entry remains.
    #[must_use]
    pub fn has_next(&self) -> bool {
        let legs = &self.session.legs;
        legs.index + 1 < legs.count as isize
    }

    /// The entry most recently yielded.
    ///
    /// # Errors
    /// Returns a sequencing error before the first or after the last entry.
    pub fn current(&self) -> Result<LegEntry<'a>> {
        let legs = &self.session.legs;
        if legs.index < 0 || legs.index >= legs.count as isize {
            return Err(Error::sequencing(format!(
                "leg accessed out of order: index {}, count {}",
                legs.index, legs.count
            )));
        }
        Ok(LegEntry {
            buffer: self.session.attached()?,
            offset: legs.base + legs.index as usize * legs.entry_length,
        })
    }

    /// Settlement date of the current leg.
    ///
    /// # Errors
    /// Returns a sequencing error outside an entry.
    pub fn settl_date(&self) -> Result<String> {
        self.current()?.settl_date()
    }

    /// Flyweight over the current leg's settlement date.
    ///
    /// # Errors
    /// Returns a sequencing error outside an entry.
    pub fn settl_date_decoder(&self) -> Result<FixedStringDecoder<'a>> {
        Ok(self.current()?.settl_date_decoder())
    }

    /// Quantity of the current leg.
    ///
    /// # Errors
    /// Returns a sequencing error outside an entry.
    pub fn quantity(&self) -> Result<i64> {
        Ok(self.current()?.quantity())
    }

    /// Price of the current leg.
    ///
    /// # Errors
    /// Returns a sequencing error outside an entry.
    pub fn price(&self) -> Result<f64> {
        Ok(self.current()?.price())
    }
}

impl<'s, 'a> IntoIterator for LegGroupDecoder<'s, 'a> {
    type Item = LegEntry<'a>;
    type IntoIter = LegIter<'s, 'a>;

    fn into_iter(self) -> Self::IntoIter {
        LegIter {
            session: self.session,
        }
    }
}

/// Iterator over the remaining legs; advances the decoder as it goes.
pub struct LegIter<'s, 'a> {
    session: &'s mut ExecRptDecoder<'a>,
}

impl<'a> Iterator for LegIter<'_, 'a> {
    type Item = LegEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.session.next_leg()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.session.remaining_legs();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for LegIter<'_, '_> {}

/// One leg of the group, bounds checked when the group was started.
#[derive(Debug, Clone, Copy)]
pub struct LegEntry<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> LegEntry<'a> {
    /// Offset of the entry in the buffer.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Settlement date, trailing NULs trimmed.
    ///
    /// # Errors
    /// Returns [`Error::InvalidText`] only for non-ASCII charsets.
    pub fn settl_date(&self) -> Result<String> {
        self.settl_date_decoder().get()
    }

    /// Flyweight over the settlement date.
    #[must_use]
    pub fn settl_date_decoder(&self) -> FixedStringDecoder<'a> {
        FixedStringDecoder::attached(&SETTL_DATE, self.buffer, self.offset)
    }

    /// Quantity.
    #[must_use]
    pub fn quantity(&self) -> i64 {
        self.buffer.get_i64_le(self.offset + QUANTITY_OFFSET)
    }

    /// Price.
    #[must_use]
    pub fn price(&self) -> f64 {
        self.buffer.get_f64_le(self.offset + PRICE_OFFSET)
    }
}
