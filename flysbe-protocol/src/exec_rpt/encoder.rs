//! `ExecRpt` encoder session and its stage handles.
//!
//! ```text
//! wrap ──> BlockEncoder ──leg_group_start(n)──> LegGroupEncoder
//!                                                  │ next() x n
//!                         leg_group_complete() <───┘
//!                                │
//!                                v
//!                        RejectTextEncoder ──put()──> PayloadView
//! ```

use super::schema::{
    BLOCK_LENGTH, LEG_BLOCK_LENGTH, PRICE_OFFSET, QUANTITY_OFFSET, REJECT_TEXT, SCHEMA_ID,
    SCHEMA_VERSION, SETTL_DATE, SYMBOL, TEMPLATE_ID,
};
use flysbe_codec::string::{FixedStringEncoder, VarStringEncoder};
use flysbe_codec::{ByteReader, CharReader, ValueEncoder};
use flysbe_core::buffer::{WriteBuffer, check_range};
use flysbe_core::header::{GroupHeader, MessageHeader};
use flysbe_core::meta::CharMeta;
use flysbe_core::{Error, PayloadView, Result, SbeMessage, UnmappablePolicy};

const MESSAGE_NAME: &str = "ExecRpt";

/// Progress through the legs group: `index` runs from -1 (not iterating)
/// to `count` (complete).
#[derive(Debug, Clone, Copy)]
struct LegCursor {
    started: bool,
    count: usize,
    index: isize,
    base: usize,
}

impl LegCursor {
    const fn new() -> Self {
        Self {
            started: false,
            count: 0,
            index: -1,
            base: 0,
        }
    }

    const fn is_complete(&self) -> bool {
        self.started && self.index == self.count as isize
    }

    const fn end(&self) -> usize {
        self.base + self.count * LEG_BLOCK_LENGTH as usize
    }
}

/// Encoder session for one `ExecRpt` message at a time.
///
/// The session holds cursor state only. The buffer is bound per call: a
/// stage handle borrows the session and the buffer together, so only one
/// stage is live at any moment and the buffer is free again once the
/// handle is gone. One session can therefore cycle through a ring of
/// buffers.
///
/// Every stage operation checks the cursor, so a stage obtained again
/// through [`block`](Self::block), [`leg_group`](Self::leg_group) or
/// [`reject_text`](Self::reject_text) is held to the same ordering. Those
/// calls must be given the buffer the message was started in.
#[derive(Debug, Clone)]
pub struct ExecRptEncoder {
    attached: bool,
    offset: usize,
    header_length: usize,
    limit: usize,
    legs: LegCursor,
    tail_written: bool,
    policy: UnmappablePolicy,
}

impl ExecRptEncoder {
    /// Creates an unattached encoder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            attached: false,
            offset: 0,
            header_length: 0,
            limit: 0,
            legs: LegCursor::new(),
            tail_written: false,
            policy: UnmappablePolicy::Error,
        }
    }

    /// Sets the policy for characters a field charset cannot represent.
    #[must_use]
    pub const fn unmappable_policy(mut self, policy: UnmappablePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Starts a message without a header at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if the root block does not fit.
    pub fn wrap<'b>(&'b mut self, buffer: &'b mut [u8], offset: usize) -> Result<BlockEncoder<'b>> {
        check_range(buffer.len(), offset, BLOCK_LENGTH as usize)?;
        self.attach(offset, 0);
        Ok(BlockEncoder {
            session: self,
            buffer,
        })
    }

    /// Writes the message header at `offset` and starts the message after
    /// it.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if header and root block do not fit.
    pub fn wrap_and_apply_header<'b>(
        &'b mut self,
        buffer: &'b mut [u8],
        offset: usize,
    ) -> Result<BlockEncoder<'b>> {
        check_range(
            buffer.len(),
            offset,
            MessageHeader::ENCODED_LENGTH + BLOCK_LENGTH as usize,
        )?;
        Self::create_header().encode(&mut *buffer, offset)?;
        self.attach(
            offset + MessageHeader::ENCODED_LENGTH,
            MessageHeader::ENCODED_LENGTH,
        );
        Ok(BlockEncoder {
            session: self,
            buffer,
        })
    }

    fn attach(&mut self, offset: usize, header_length: usize) {
        self.attached = true;
        self.offset = offset;
        self.header_length = header_length;
        self.limit = offset + BLOCK_LENGTH as usize;
        self.legs = LegCursor::new();
        self.tail_written = false;
        tracing::trace!(offset, header_length, "ExecRpt encoder wrapped");
    }

    /// Detaches the session and clears all cursor state.
    pub fn unwrap(&mut self) {
        self.attached = false;
        self.offset = 0;
        self.header_length = 0;
        self.limit = 0;
        self.legs = LegCursor::new();
        self.tail_written = false;
        tracing::trace!("ExecRpt encoder unwrapped");
    }

    /// Returns to the root block stage.
    ///
    /// # Errors
    /// Returns [`Error::NotAttached`], or [`Error::BufferTooShort`] if
    /// `buffer` cannot hold what was written so far.
    pub fn block<'b>(&'b mut self, buffer: &'b mut [u8]) -> Result<BlockEncoder<'b>> {
        self.check_resume(buffer)?;
        Ok(BlockEncoder {
            session: self,
            buffer,
        })
    }

    /// Returns to a started, incomplete legs group.
    ///
    /// # Errors
    /// Returns a sequencing error if the group was not started or is
    /// already complete, otherwise the same errors as [`block`](Self::block).
    pub fn leg_group<'b>(&'b mut self, buffer: &'b mut [u8]) -> Result<LegGroupEncoder<'b>> {
        self.check_resume(buffer)?;
        if !self.legs.started {
            return Err(Error::sequencing("leg group not started"));
        }
        if self.legs.is_complete() {
            return Err(Error::sequencing("leg group already complete"));
        }
        Ok(LegGroupEncoder {
            session: self,
            buffer,
        })
    }

    /// Returns to the trailing field stage.
    ///
    /// # Errors
    /// Returns a sequencing error unless the legs group is complete and
    /// the trailing field is still unwritten, otherwise the same errors as
    /// [`block`](Self::block).
    pub fn reject_text<'b>(&'b mut self, buffer: &'b mut [u8]) -> Result<RejectTextEncoder<'b>> {
        self.check_resume(buffer)?;
        self.check_tail()?;
        Ok(RejectTextEncoder {
            session: self,
            buffer,
        })
    }

    /// Returns true while attached.
    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.attached
    }

    /// Length of the message header, 0 when none was applied.
    #[must_use]
    pub const fn header_length(&self) -> usize {
        self.header_length
    }

    /// Descriptor of everything written so far into `buffer`.
    ///
    /// # Errors
    /// Returns [`Error::NotAttached`], or [`Error::BufferTooShort`] if
    /// `buffer` cannot hold the written region.
    pub fn payload<'b>(&self, buffer: &'b [u8]) -> Result<PayloadView<'b>> {
        if !self.attached {
            return Err(Error::NotAttached { name: MESSAGE_NAME });
        }
        PayloadView::new(
            buffer,
            self.offset - self.header_length,
            self.header_length,
            self.limit - self.offset,
        )
    }

    fn check_resume(&self, buffer: &[u8]) -> Result<()> {
        if !self.attached {
            return Err(Error::NotAttached { name: MESSAGE_NAME });
        }
        let written = if self.legs.started {
            self.limit.max(self.legs.end())
        } else {
            self.limit
        };
        check_range(buffer.len(), 0, written)
    }

    fn check_tail(&self) -> Result<()> {
        if !self.legs.is_complete() {
            return Err(Error::sequencing("leg group is not complete"));
        }
        if self.tail_written {
            return Err(Error::sequencing("rejectText already written"));
        }
        Ok(())
    }
}

impl Default for ExecRptEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SbeMessage for ExecRptEncoder {
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

fn fixed_encoder<'f>(
    buffer: &'f mut [u8],
    meta: &'static CharMeta,
    base: usize,
    policy: UnmappablePolicy,
) -> FixedStringEncoder<'f> {
    FixedStringEncoder::attached(meta, buffer, base).unmappable_policy(policy)
}

/// Root block stage.
pub struct BlockEncoder<'b> {
    session: &'b mut ExecRptEncoder,
    buffer: &'b mut [u8],
}

impl<'b> BlockEncoder<'b> {
    /// Sets the symbol.
    ///
    /// # Errors
    /// Returns a length or unmappable-character error.
    pub fn symbol(self, symbol: &str) -> Result<Self> {
        let offset = self.session.offset;
        let policy = self.session.policy;
        fixed_encoder(&mut *self.buffer, &SYMBOL, offset, policy).put(symbol)?;
        Ok(self)
    }

    /// Flyweight over the symbol field for the streaming put variants.
    pub fn symbol_encoder(&mut self) -> FixedStringEncoder<'_> {
        let offset = self.session.offset;
        let policy = self.session.policy;
        fixed_encoder(&mut *self.buffer, &SYMBOL, offset, policy)
    }

    /// The buffer this message is being written into.
    #[must_use]
    pub fn buffer(&self) -> &[u8] {
        &*self.buffer
    }

    /// Declares `count` legs and moves to the group stage.
    ///
    /// The capacity for the header and all declared entries is checked
    /// here, so entry setters never run out of buffer.
    ///
    /// # Errors
    /// Returns a sequencing error if the group was already started, or
    /// [`Error::BufferTooShort`].
    pub fn leg_group_start(self, count: u16) -> Result<LegGroupEncoder<'b>> {
        let Self { session, buffer } = self;
        if session.legs.started {
            return Err(Error::sequencing("leg group already started"));
        }
        let limit = session.limit;
        let entries = count as usize * LEG_BLOCK_LENGTH as usize;
        check_range(buffer.len(), limit, GroupHeader::ENCODED_LENGTH + entries)?;
        GroupHeader::new(LEG_BLOCK_LENGTH, count).encode(&mut *buffer, limit)?;
        let base = limit + GroupHeader::ENCODED_LENGTH;
        session.legs = LegCursor {
            started: true,
            count: count as usize,
            index: -1,
            base,
        };
        session.limit = base;
        Ok(LegGroupEncoder { session, buffer })
    }

    /// Writes an empty legs group and moves to the trailing field stage.
    ///
    /// # Errors
    /// Same as [`leg_group_start`](Self::leg_group_start).
    pub fn leg_group_empty(self) -> Result<RejectTextEncoder<'b>> {
        self.leg_group_start(0)?.leg_group_complete()
    }
}

/// Legs group stage; the cursor sits on one entry at a time.
pub struct LegGroupEncoder<'b> {
    session: &'b mut ExecRptEncoder,
    buffer: &'b mut [u8],
}

impl<'b> LegGroupEncoder<'b> {
    /// Number of declared legs.
    #[must_use]
    pub fn count(&self) -> usize {
        self.session.legs.count
    }

    /// Current entry, -1 before the first [`next`](Self::next).
    #[must_use]
    pub fn index(&self) -> isize {
        self.session.legs.index
    }

    /// Returns true if another declared entry remains.
    #[must_use]
    pub fn has_next(&self) -> bool {
        let legs = &self.session.legs;
        legs.index + 1 < legs.count as isize
    }

    /// Advances to the next declared entry.
    ///
    /// # Errors
    /// Returns a sequencing error once every declared entry was visited.
    #[allow(clippy::should_implement_trait)]
    pub fn next(self) -> Result<Self> {
        let legs = &mut self.session.legs;
        if legs.index + 1 >= legs.count as isize {
            return Err(Error::sequencing(format!(
                "all {} declared legs already written",
                legs.count
            )));
        }
        legs.index += 1;
        self.session.limit = legs.base + (legs.index as usize + 1) * LEG_BLOCK_LENGTH as usize;
        Ok(self)
    }

    fn entry_offset(&self) -> Result<usize> {
        let legs = &self.session.legs;
        if legs.index < 0 || legs.index >= legs.count as isize {
            return Err(Error::sequencing(format!(
                "leg accessed out of order: index {}, count {}",
                legs.index, legs.count
            )));
        }
        Ok(legs.base + legs.index as usize * LEG_BLOCK_LENGTH as usize)
    }

    /// Sets the settlement date of the current leg.
    ///
    /// # Errors
    /// Returns a sequencing, length or unmappable-character error.
    pub fn settl_date(self, settl_date: &str) -> Result<Self> {
        let offset = self.entry_offset()?;
        let policy = self.session.policy;
        fixed_encoder(&mut *self.buffer, &SETTL_DATE, offset, policy).put(settl_date)?;
        Ok(self)
    }

    /// Flyweight over the current leg's settlement date.
    ///
    /// # Errors
    /// Returns a sequencing error outside an entry.
    pub fn settl_date_encoder(&mut self) -> Result<FixedStringEncoder<'_>> {
        let offset = self.entry_offset()?;
        let policy = self.session.policy;
        Ok(fixed_encoder(&mut *self.buffer, &SETTL_DATE, offset, policy))
    }

    /// Sets the quantity of the current leg.
    ///
    /// # Errors
    /// Returns a sequencing error outside an entry.
    pub fn quantity(self, quantity: i64) -> Result<Self> {
        let offset = self.entry_offset()?;
        self.buffer.put_i64_le(offset + QUANTITY_OFFSET, quantity);
        Ok(self)
    }

    /// Sets the price of the current leg.
    ///
    /// # Errors
    /// Returns a sequencing error outside an entry.
    pub fn price(self, price: f64) -> Result<Self> {
        let offset = self.entry_offset()?;
        self.buffer.put_f64_le(offset + PRICE_OFFSET, price);
        Ok(self)
    }

    /// Closes the group and moves to the trailing field stage.
    ///
    /// # Errors
    /// Returns a sequencing error unless every declared leg was visited.
    pub fn leg_group_complete(self) -> Result<RejectTextEncoder<'b>> {
        let Self { session, buffer } = self;
        let legs = &mut session.legs;
        if legs.index + 1 != legs.count as isize {
            return Err(Error::sequencing(format!(
                "missing legs: {} of {} written",
                legs.index + 1,
                legs.count
            )));
        }
        legs.index = legs.count as isize;
        Ok(RejectTextEncoder { session, buffer })
    }
}

/// Trailing field stage; writing consumes the handle and yields the
/// payload.
pub struct RejectTextEncoder<'b> {
    session: &'b mut ExecRptEncoder,
    buffer: &'b mut [u8],
}

impl<'b> RejectTextEncoder<'b> {
    fn write_with<F>(self, write: F) -> Result<PayloadView<'b>>
    where
        F: FnOnce(&mut VarStringEncoder<'_>) -> Result<usize>,
    {
        let Self { session, buffer } = self;
        session.check_tail()?;
        let limit = session.limit;
        let written = {
            let mut encoder = VarStringEncoder::attached(&REJECT_TEXT, &mut *buffer, limit)
                .unmappable_policy(session.policy);
            write(&mut encoder)?
        };
        session.limit = limit + REJECT_TEXT.header_length + written;
        session.tail_written = true;
        session.payload(buffer)
    }

    /// Writes the text.
    ///
    /// # Errors
    /// Returns a sequencing, bounds or unmappable-character error.
    pub fn put(self, text: &str) -> Result<PayloadView<'b>> {
        self.write_with(|encoder| encoder.put(text))
    }

    /// Writes raw bytes.
    ///
    /// # Errors
    /// Returns a sequencing, length or bounds error.
    pub fn put_bytes(self, bytes: &[u8]) -> Result<PayloadView<'b>> {
        self.write_with(|encoder| encoder.put_bytes(bytes))
    }

    /// Pulls `length` bytes through `reader`.
    ///
    /// # Errors
    /// Returns a sequencing, length or bounds error.
    pub fn put_from_bytes<S, R>(
        self,
        src: &S,
        src_offset: usize,
        reader: &R,
        length: usize,
    ) -> Result<PayloadView<'b>>
    where
        S: ?Sized,
        R: ByteReader<S> + ?Sized,
    {
        self.write_with(|encoder| encoder.put_from_bytes(src, src_offset, reader, length))
    }

    /// Pulls `length` chars through `reader`.
    ///
    /// # Errors
    /// Returns a sequencing, length, bounds or unmappable-character error.
    pub fn put_from_chars<S, R>(
        self,
        src: &S,
        src_offset: usize,
        reader: &R,
        length: usize,
    ) -> Result<PayloadView<'b>>
    where
        S: ?Sized,
        R: CharReader<S> + ?Sized,
    {
        self.write_with(|encoder| encoder.put_from_chars(src, src_offset, reader, length))
    }

    /// Lets `value_encoder` write `value`.
    ///
    /// # Errors
    /// Returns a sequencing error or the value encoder's error.
    pub fn put_value<T, E>(self, value: &T, value_encoder: &E) -> Result<PayloadView<'b>>
    where
        T: ?Sized,
        E: ValueEncoder<T> + ?Sized,
    {
        self.write_with(|encoder| encoder.put_value(value, value_encoder))
    }

    /// Writes an empty text.
    ///
    /// # Errors
    /// Returns a sequencing or bounds error.
    pub fn empty(self) -> Result<PayloadView<'b>> {
        self.write_with(|encoder| encoder.empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flysbe_codec::StringFactory;
    use flysbe_codec::adapter::{byte_from_slice, char_from_slice};
    use flysbe_core::ReadBuffer;

    #[test]
    fn test_block_and_group_layout() {
        let mut buf = [0u8; 128];
        let mut encoder = ExecRptEncoder::new();
        let payload = encoder
            .wrap(&mut buf, 0)
            .unwrap()
            .symbol("AUDUSD")
            .unwrap()
            .leg_group_start(1)
            .unwrap()
            .next()
            .unwrap()
            .settl_date("20191010")
            .unwrap()
            .quantity(100_000)
            .unwrap()
            .price(1.23)
            .unwrap()
            .leg_group_complete()
            .unwrap()
            .put("bla")
            .unwrap();

        assert_eq!(payload.offset(), 0);
        assert_eq!(payload.header_length(), 0);
        assert_eq!(payload.message_length(), 8 + 4 + 24 + 4 + 3);

        let bytes = payload.bytes();
        assert_eq!(&bytes[..8], b"AUDUSD\0\0");
        assert_eq!(bytes.get_u16_le(8), 24);
        assert_eq!(bytes.get_u16_le(10), 1);
        assert_eq!(&bytes[12..20], b"20191010");
        assert_eq!(bytes.get_i64_le(20), 100_000);
        assert_eq!(bytes.get_f64_le(28), 1.23);
        assert_eq!(bytes.get_u32_le(36), 3);
        assert_eq!(&bytes[40..43], b"bla");
    }

    #[test]
    fn test_wrap_and_apply_header() {
        let mut buf = [0u8; 64];
        let mut encoder = ExecRptEncoder::new();
        let payload = encoder
            .wrap_and_apply_header(&mut buf, 4)
            .unwrap()
            .symbol("EURUSD")
            .unwrap()
            .leg_group_empty()
            .unwrap()
            .empty()
            .unwrap();
        assert_eq!(payload.offset(), 4);
        assert_eq!(payload.header_length(), 8);
        assert_eq!(payload.message_length(), 8 + 4 + 4);
        assert_eq!(payload.total_length(), 24);
        let header = MessageHeader::try_wrap(payload.buffer(), 4).unwrap();
        assert_eq!(header, MessageHeader::new(8, 1, 1, 0));
    }

    #[test]
    fn test_wrap_too_small() {
        let mut buf = [0u8; 7];
        let mut encoder = ExecRptEncoder::new();
        assert!(matches!(
            encoder.wrap(&mut buf, 0),
            Err(Error::BufferTooShort { .. })
        ));
        assert!(!encoder.is_attached());
    }

    #[test]
    fn test_group_capacity_checked_up_front() {
        let mut buf = [0u8; 8 + 4 + 24];
        let mut encoder = ExecRptEncoder::new();
        let block = encoder.wrap(&mut buf, 0).unwrap();
        assert!(matches!(
            block.leg_group_start(2),
            Err(Error::BufferTooShort { .. })
        ));
        assert!(encoder.leg_group(&mut buf).err().unwrap().is_sequencing());
    }

    #[test]
    fn test_leg_field_before_next() {
        let mut buf = [0u8; 128];
        let mut encoder = ExecRptEncoder::new();
        let group = encoder
            .wrap(&mut buf, 0)
            .unwrap()
            .leg_group_start(1)
            .unwrap();
        let err = group.quantity(1).err().unwrap();
        assert!(err.is_sequencing());
    }

    #[test]
    fn test_next_beyond_count() {
        let mut buf = [0u8; 128];
        let mut encoder = ExecRptEncoder::new();
        let group = encoder
            .wrap(&mut buf, 0)
            .unwrap()
            .leg_group_start(1)
            .unwrap()
            .next()
            .unwrap();
        assert!(!group.has_next());
        assert!(group.next().err().unwrap().is_sequencing());
    }

    #[test]
    fn test_complete_with_missing_legs() {
        let mut buf = [0u8; 128];
        let mut encoder = ExecRptEncoder::new();
        let group = encoder
            .wrap(&mut buf, 0)
            .unwrap()
            .leg_group_start(2)
            .unwrap()
            .next()
            .unwrap();
        let err = group.leg_group_complete().err().unwrap();
        assert_eq!(err, Error::sequencing("missing legs: 1 of 2 written"));

        // resume and finish
        let group = encoder.leg_group(&mut buf).unwrap().next().unwrap();
        assert_eq!(group.index(), 1);
        assert!(group.leg_group_complete().is_ok());
    }

    #[test]
    fn test_group_started_twice() {
        let mut buf = [0u8; 128];
        let mut encoder = ExecRptEncoder::new();
        encoder
            .wrap(&mut buf, 0)
            .unwrap()
            .leg_group_start(0)
            .unwrap();
        let block = encoder.block(&mut buf).unwrap();
        assert!(block.leg_group_start(0).err().unwrap().is_sequencing());
    }

    #[test]
    fn test_reject_text_before_group_complete() {
        let mut buf = [0u8; 128];
        let mut encoder = ExecRptEncoder::new();
        encoder.wrap(&mut buf, 0).unwrap();
        assert!(encoder.reject_text(&mut buf).err().unwrap().is_sequencing());
        encoder.block(&mut buf).unwrap().leg_group_start(1).unwrap();
        assert!(encoder.reject_text(&mut buf).err().unwrap().is_sequencing());
    }

    #[test]
    fn test_reject_text_written_twice() {
        let mut buf = [0u8; 128];
        let mut encoder = ExecRptEncoder::new();
        encoder
            .wrap(&mut buf, 0)
            .unwrap()
            .leg_group_empty()
            .unwrap()
            .put("first")
            .unwrap();
        let err = encoder.reject_text(&mut buf).err().unwrap();
        assert_eq!(err, Error::sequencing("rejectText already written"));
        assert!(encoder.leg_group(&mut buf).err().unwrap().is_sequencing());
    }

    #[test]
    fn test_rewrap_resets_state() {
        let mut first = [0u8; 64];
        let mut second = [0u8; 64];
        let mut encoder = ExecRptEncoder::new();
        encoder
            .wrap(&mut first, 0)
            .unwrap()
            .leg_group_empty()
            .unwrap()
            .put("x")
            .unwrap();
        let payload = encoder
            .wrap(&mut second, 0)
            .unwrap()
            .leg_group_empty()
            .unwrap()
            .put("y")
            .unwrap();
        assert_eq!(payload.message_length(), 8 + 4 + 4 + 1);
    }

    #[test]
    fn test_unwrap_detaches() {
        let mut buf = [0u8; 64];
        let mut encoder = ExecRptEncoder::new();
        encoder.wrap(&mut buf, 0).unwrap();
        assert!(encoder.is_attached());
        encoder.unwrap();
        assert!(!encoder.is_attached());
        assert_eq!(
            encoder.block(&mut buf).err().unwrap(),
            Error::NotAttached { name: "ExecRpt" }
        );
        assert!(encoder.payload(&buf).is_err());
    }

    #[test]
    fn test_symbol_too_long_is_rejected() {
        let mut buf = [0u8; 64];
        let mut encoder = ExecRptEncoder::new();
        let err = encoder
            .wrap(&mut buf, 0)
            .unwrap()
            .symbol("AUDUSD.FX")
            .err()
            .unwrap();
        assert!(matches!(err, Error::LengthExceeded { field: "symbol", .. }));
    }

    #[test]
    fn test_unmappable_policy_reaches_reject_text() {
        let mut buf = [0u8; 64];
        let mut encoder = ExecRptEncoder::new();
        let err = encoder
            .wrap(&mut buf, 0)
            .unwrap()
            .leg_group_empty()
            .unwrap()
            .put("naïve")
            .err()
            .unwrap();
        assert!(matches!(err, Error::Unmappable { position: 2, .. }));
        // nothing was written, the stage can be retried
        let payload = encoder.reject_text(&mut buf).unwrap().put("naive").unwrap();
        assert_eq!(payload.message_length(), 8 + 4 + 4 + 5);

        let mut buf = [0u8; 64];
        let mut lossy = ExecRptEncoder::new().unmappable_policy(UnmappablePolicy::QUESTION_MARK);
        let payload = lossy
            .wrap(&mut buf, 0)
            .unwrap()
            .leg_group_empty()
            .unwrap()
            .put("naïve")
            .unwrap();
        assert_eq!(&payload.bytes()[16..21], b"na?ve");
    }

    #[test]
    fn test_reject_text_streaming_variants() {
        let mut buf = [0u8; 64];
        let mut encoder = ExecRptEncoder::new();
        let chars = ['o', 'k'];
        let payload = encoder
            .wrap(&mut buf, 0)
            .unwrap()
            .leg_group_empty()
            .unwrap()
            .put_from_chars(&chars[..], 0, &char_from_slice, 2)
            .unwrap();
        assert_eq!(&payload.bytes()[12..18], &[2, 0, 0, 0, b'o', b'k']);

        let payload = encoder
            .wrap(&mut buf, 0)
            .unwrap()
            .leg_group_empty()
            .unwrap()
            .put_value("value", &StringFactory::ASCII)
            .unwrap();
        assert_eq!(payload.message_length(), 8 + 4 + 4 + 5);
    }

    #[test]
    fn test_metadata_accessors() {
        let mut buf = [0u8; 64];
        let mut encoder = ExecRptEncoder::new();
        encoder.wrap_and_apply_header(&mut buf, 0).unwrap();
        assert_eq!(encoder.sbe_schema_id(), 1);
        assert_eq!(encoder.sbe_template_id(), 1);
        assert_eq!(encoder.sbe_block_length(), 8);
        assert_eq!(encoder.sbe_schema_version(), 0);
        assert_eq!(encoder.offset(), 8);
        assert_eq!(encoder.limit(), 16);
        assert_eq!(encoder.encoded_length(), 8);
        assert_eq!(encoder.header_length(), 8);
    }

    #[test]
    fn test_ring_of_buffers_reuses_one_session() {
        let mut ring = [[0u8; 64]; 2];
        let mut encoder = ExecRptEncoder::new();
        for i in 0..4 {
            let text = if i % 2 == 0 { "even" } else { "odd" };
            let payload = encoder
                .wrap(&mut ring[i % 2], 0)
                .unwrap()
                .symbol("AUDUSD")
                .unwrap()
                .leg_group_empty()
                .unwrap()
                .put(text)
                .unwrap();
            assert_eq!(payload.message_length(), 8 + 4 + 4 + text.len());
        }
        assert_eq!(&ring[0][16..20], b"even");
        assert_eq!(&ring[1][16..19], b"odd");
    }

    #[test]
    fn test_resume_checks_buffer_length() {
        let mut buf = [0u8; 64];
        let mut short = [0u8; 16];
        let mut encoder = ExecRptEncoder::new();
        encoder
            .wrap(&mut buf, 0)
            .unwrap()
            .leg_group_start(1)
            .unwrap();
        assert!(matches!(
            encoder.leg_group(&mut short),
            Err(Error::BufferTooShort {
                required: 36,
                available: 16
            })
        ));
        assert!(encoder.leg_group(&mut buf).is_ok());
    }

    #[test]
    fn test_streaming_field_encoders() {
        let mut buf = [0u8; 64];
        let mut encoder = ExecRptEncoder::new();
        let mut block = encoder.wrap(&mut buf, 0).unwrap();
        block
            .symbol_encoder()
            .put_from_bytes(&b"USDJPY"[..], 0, &byte_from_slice, 6)
            .unwrap();
        assert_eq!(&block.buffer()[..8], b"USDJPY\0\0");
        let mut group = block.leg_group_start(1).unwrap();
        assert!(group.settl_date_encoder().err().unwrap().is_sequencing());
        let mut group = group.next().unwrap();
        group.settl_date_encoder().unwrap().put("20200101").unwrap();
        let payload = group.leg_group_complete().unwrap().empty().unwrap();
        assert_eq!(&payload.bytes()[12..20], b"20200101");
    }
}
