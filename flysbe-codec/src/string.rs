//! Flyweight string codec for fixed and variable-length text fields.
//!
//! A flyweight is unattached until [`wrap`](FlyweightStringDecoder::wrap)
//! binds it to a buffer and offset. Every accessor on an unattached
//! flyweight fails with [`Error::NotAttached`].
//!
//! Fixed fields are NUL padded: decoding trims trailing zero bytes and
//! encoding zero-fills whatever the text does not cover. Variable fields
//! carry a little-endian u32 byte count in front of the data.
//!
//! Fields declared as ASCII take the fast path, where every element copy is
//! a direct byte/char cast. Other charsets decode or encode the whole
//! window once and copy from the result.

use crate::adapter::{ByteReader, ByteWriter, CharReader, CharWriter};
use crate::value::{LengthToBuffer, ValueDecoder, ValueEncoder};
use flysbe_core::buffer::{ReadBuffer, WriteBuffer, check_range};
use flysbe_core::meta::{CharMeta, MAX_VAR_LENGTH, VarCharMeta};
use flysbe_core::{Charset, Error, Result, UnmappablePolicy};
use std::borrow::Cow;
use std::fmt;

/// Where a text field's data lives relative to the flyweight offset.
pub trait FieldLayout: 'static {
    /// Field name.
    fn name(&self) -> &'static str;

    /// Declared character encoding.
    fn charset(&self) -> Charset;

    /// Offset of the first data byte for a flyweight wrapped at `offset`.
    fn data_offset(&self, offset: usize) -> usize;

    /// Length of the data window: the padded length of a fixed field, the
    /// header value of a variable one.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if a length header is out of range.
    fn window_length(&self, buffer: &[u8], offset: usize) -> Result<usize>;

    /// Narrows a data window to the meaningful bytes.
    fn trim<'b>(&self, window: &'b [u8]) -> &'b [u8];

    /// Validates `length`, writes any length header and returns the
    /// window that the data goes into.
    ///
    /// Nothing is written when an error is returned.
    ///
    /// # Errors
    /// Returns [`Error::LengthExceeded`] or [`Error::BufferTooShort`].
    fn reserve<'b>(&self, buffer: &'b mut [u8], offset: usize, length: usize)
    -> Result<&'b mut [u8]>;
}

impl FieldLayout for CharMeta {
    fn name(&self) -> &'static str {
        self.name
    }

    fn charset(&self) -> Charset {
        self.charset
    }

    #[inline]
    fn data_offset(&self, offset: usize) -> usize {
        offset.saturating_add(self.encoding_offset)
    }

    #[inline]
    fn window_length(&self, _buffer: &[u8], _offset: usize) -> Result<usize> {
        Ok(self.length)
    }

    #[inline]
    fn trim<'b>(&self, window: &'b [u8]) -> &'b [u8] {
        let end = window.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        &window[..end]
    }

    fn reserve<'b>(
        &self,
        buffer: &'b mut [u8],
        offset: usize,
        length: usize,
    ) -> Result<&'b mut [u8]> {
        if length > self.length {
            return Err(Error::LengthExceeded {
                field: self.name,
                length,
                max: self.length,
            });
        }
        let start = self.data_offset(offset);
        check_range(buffer.len(), start, self.length)?;
        Ok(&mut buffer[start..start + self.length])
    }
}

impl FieldLayout for VarCharMeta {
    fn name(&self) -> &'static str {
        self.name
    }

    fn charset(&self) -> Charset {
        self.charset
    }

    #[inline]
    fn data_offset(&self, offset: usize) -> usize {
        offset.saturating_add(self.header_length)
    }

    #[inline]
    fn window_length(&self, buffer: &[u8], offset: usize) -> Result<usize> {
        buffer.check_range(offset, self.header_length)?;
        Ok(buffer.get_u32_le(offset) as usize)
    }

    #[inline]
    fn trim<'b>(&self, window: &'b [u8]) -> &'b [u8] {
        window
    }

    fn reserve<'b>(
        &self,
        buffer: &'b mut [u8],
        offset: usize,
        length: usize,
    ) -> Result<&'b mut [u8]> {
        if length > MAX_VAR_LENGTH {
            return Err(Error::LengthExceeded {
                field: self.name,
                length,
                max: MAX_VAR_LENGTH,
            });
        }
        check_range(buffer.len(), offset, self.header_length.saturating_add(length))?;
        buffer.put_u32_le(offset, length as u32);
        let start = offset + self.header_length;
        Ok(&mut buffer[start..start + length])
    }
}

/// Encodes text for `charset`, logging once when characters were replaced.
pub(crate) fn encode_text(
    charset: Charset,
    policy: UnmappablePolicy,
    text: &str,
) -> Result<Cow<'_, [u8]>> {
    let bytes = charset.encode(text, policy)?;
    if let (UnmappablePolicy::Substitute(byte), Cow::Owned(_)) = (policy, &bytes) {
        let max = match charset {
            Charset::Ascii => 0x7F,
            Charset::Latin1 => 0xFF,
            Charset::Utf8 | Charset::Utf16Le => u32::MAX,
        };
        let substituted = text.chars().filter(|&c| c as u32 > max).count();
        if substituted > 0 {
            tracing::warn!(
                encoding = charset.name(),
                substituted,
                replacement = byte,
                "substituted unmappable characters"
            );
        }
    }
    Ok(bytes)
}

/// Read-only flyweight over one text field.
pub struct FlyweightStringDecoder<'a, L: FieldLayout> {
    meta: &'static L,
    buffer: Option<&'a [u8]>,
    offset: usize,
}

/// Decoder for a fixed-length, NUL-padded field.
pub type FixedStringDecoder<'a> = FlyweightStringDecoder<'a, CharMeta>;

/// Decoder for a length-prefixed field.
pub type VarStringDecoder<'a> = FlyweightStringDecoder<'a, VarCharMeta>;

impl<'a, L: FieldLayout> FlyweightStringDecoder<'a, L> {
    /// Creates an unattached decoder.
    #[must_use]
    pub const fn new(meta: &'static L) -> Self {
        Self {
            meta,
            buffer: None,
            offset: 0,
        }
    }

    /// Creates a decoder attached to `buffer` at `offset`.
    #[must_use]
    pub const fn attached(meta: &'static L, buffer: &'a [u8], offset: usize) -> Self {
        Self {
            meta,
            buffer: Some(buffer),
            offset,
        }
    }

    /// Binds the flyweight to `buffer` at `offset`.
    pub fn wrap(&mut self, buffer: &'a [u8], offset: usize) -> &mut Self {
        self.buffer = Some(buffer);
        self.offset = offset;
        self
    }

    /// Detaches the flyweight.
    pub fn unwrap(&mut self) {
        self.buffer = None;
        self.offset = 0;
    }

    /// Returns true while attached.
    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.buffer.is_some()
    }

    /// Field metadata.
    #[must_use]
    pub const fn meta(&self) -> &'static L {
        self.meta
    }

    /// The attached buffer, if any.
    #[must_use]
    pub const fn buffer(&self) -> Option<&'a [u8]> {
        self.buffer
    }

    /// Offset the flyweight is wrapped at.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Offset of the first data byte.
    #[must_use]
    pub fn data_offset(&self) -> usize {
        self.meta.data_offset(self.offset)
    }

    fn attached_buffer(&self) -> Result<&'a [u8]> {
        self.buffer.ok_or(Error::NotAttached {
            name: self.meta.name(),
        })
    }

    /// The whole data window, padding included.
    ///
    /// # Errors
    /// Returns [`Error::NotAttached`] or [`Error::BufferTooShort`].
    pub fn raw(&self) -> Result<&'a [u8]> {
        let buffer = self.attached_buffer()?;
        let length = self.meta.window_length(buffer, self.offset)?;
        buffer.try_get_bytes(self.data_offset(), length)
    }

    /// The data bytes, trailing NULs of a fixed field trimmed.
    ///
    /// # Errors
    /// Returns [`Error::NotAttached`] or [`Error::BufferTooShort`].
    pub fn data(&self) -> Result<&'a [u8]> {
        self.raw().map(|window| self.meta.trim(window))
    }

    /// Length of the data window, padding included.
    ///
    /// # Errors
    /// Returns [`Error::NotAttached`] or [`Error::BufferTooShort`].
    pub fn length(&self) -> Result<usize> {
        self.raw().map(<[u8]>::len)
    }

    /// Length of the data, trailing NULs of a fixed field excluded.
    ///
    /// # Errors
    /// Returns [`Error::NotAttached`] or [`Error::BufferTooShort`].
    pub fn data_length(&self) -> Result<usize> {
        self.data().map(<[u8]>::len)
    }

    /// Decodes the field into a new string.
    ///
    /// # Errors
    /// Returns [`Error::NotAttached`], [`Error::BufferTooShort`] or
    /// [`Error::InvalidText`].
    pub fn get(&self) -> Result<String> {
        self.meta.charset().decode(self.data()?)
    }

    /// Applies `decoder` directly to the field window.
    ///
    /// # Errors
    /// Propagates access errors and the decoder's own errors.
    pub fn get_with<T, D>(&self, decoder: &mut D) -> Result<T>
    where
        D: ValueDecoder<T> + ?Sized,
    {
        let window = if decoder.trailing_zeros() {
            self.raw()?
        } else {
            self.data()?
        };
        decoder.decode(window)
    }

    /// Streams at most `max_len` data bytes into `dst` starting at
    /// `dst_offset`, returning the count copied.
    ///
    /// # Errors
    /// Returns [`Error::NotAttached`] or [`Error::BufferTooShort`].
    pub fn get_bytes_into<D, W>(
        &self,
        dst: &mut D,
        dst_offset: usize,
        writer: &W,
        max_len: usize,
    ) -> Result<usize>
    where
        D: ?Sized,
        W: ByteWriter<D> + ?Sized,
    {
        let data = self.data()?;
        let count = data.len().min(max_len);
        let end = dst_offset.saturating_add(count);
        for (i, &b) in data[..count].iter().enumerate() {
            writer.write(dst, dst_offset.saturating_add(i), end, b);
        }
        Ok(count)
    }

    /// Streams at most `max_len` decoded chars into `dst` starting at
    /// `dst_offset`, returning the count copied.
    ///
    /// # Errors
    /// Returns access errors, or [`Error::InvalidText`] on the full
    /// decode path.
    pub fn get_chars_into<D, W>(
        &self,
        dst: &mut D,
        dst_offset: usize,
        writer: &W,
        max_len: usize,
    ) -> Result<usize>
    where
        D: ?Sized,
        W: CharWriter<D> + ?Sized,
    {
        let data = self.data()?;
        if self.meta.charset().is_ascii() {
            let count = data.len().min(max_len);
            let end = dst_offset.saturating_add(count);
            for (i, &b) in data[..count].iter().enumerate() {
                writer.write(dst, dst_offset.saturating_add(i), end, b as char);
            }
            return Ok(count);
        }
        let text = self.meta.charset().decode(data)?;
        let count = text.chars().count().min(max_len);
        let end = dst_offset.saturating_add(count);
        for (i, ch) in text.chars().take(count).enumerate() {
            writer.write(dst, dst_offset.saturating_add(i), end, ch);
        }
        Ok(count)
    }

    /// Appends the decoded field to `out`, returning the number of chars
    /// appended.
    ///
    /// # Errors
    /// Same as [`get`](Self::get).
    pub fn append_to(&self, out: &mut String) -> Result<usize> {
        let data = self.data()?;
        if self.meta.charset().is_ascii() {
            out.reserve(data.len());
            out.extend(data.iter().map(|&b| b as char));
            return Ok(data.len());
        }
        let text = self.meta.charset().decode(data)?;
        out.push_str(&text);
        Ok(text.chars().count())
    }
}

impl<L: FieldLayout> fmt::Display for FlyweightStringDecoder<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "{}(?)", self.meta.name()),
        }
    }
}

impl<L: FieldLayout> fmt::Debug for FlyweightStringDecoder<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlyweightStringDecoder")
            .field("field", &self.meta.name())
            .field("attached", &self.is_attached())
            .field("offset", &self.offset)
            .finish()
    }
}

/// Writing flyweight over one text field.
///
/// Every `put` validates the length and the buffer range before the first
/// byte is written, and returns the number of data bytes written.
pub struct FlyweightStringEncoder<'a, L: FieldLayout> {
    meta: &'static L,
    buffer: Option<&'a mut [u8]>,
    offset: usize,
    policy: UnmappablePolicy,
}

/// Encoder for a fixed-length, NUL-padded field.
pub type FixedStringEncoder<'a> = FlyweightStringEncoder<'a, CharMeta>;

/// Encoder for a length-prefixed field.
pub type VarStringEncoder<'a> = FlyweightStringEncoder<'a, VarCharMeta>;

impl<'a, L: FieldLayout> FlyweightStringEncoder<'a, L> {
    /// Creates an unattached encoder.
    #[must_use]
    pub const fn new(meta: &'static L) -> Self {
        Self {
            meta,
            buffer: None,
            offset: 0,
            policy: UnmappablePolicy::Error,
        }
    }

    /// Creates an encoder attached to `buffer` at `offset`.
    #[must_use]
    pub const fn attached(meta: &'static L, buffer: &'a mut [u8], offset: usize) -> Self {
        Self {
            meta,
            buffer: Some(buffer),
            offset,
            policy: UnmappablePolicy::Error,
        }
    }

    /// Sets the policy for characters the field charset cannot represent.
    #[must_use]
    pub const fn unmappable_policy(mut self, policy: UnmappablePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the unmappable-character policy.
    #[must_use]
    pub const fn policy(&self) -> UnmappablePolicy {
        self.policy
    }

    /// Binds the flyweight to `buffer` at `offset`.
    pub fn wrap(&mut self, buffer: &'a mut [u8], offset: usize) -> &mut Self {
        self.buffer = Some(buffer);
        self.offset = offset;
        self
    }

    /// Detaches the flyweight, handing the buffer back.
    pub fn unwrap(&mut self) -> Option<&'a mut [u8]> {
        self.offset = 0;
        self.buffer.take()
    }

    /// Returns true while attached.
    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.buffer.is_some()
    }

    /// Field metadata.
    #[must_use]
    pub const fn meta(&self) -> &'static L {
        self.meta
    }

    /// Offset the flyweight is wrapped at.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Offset of the first data byte.
    #[must_use]
    pub fn data_offset(&self) -> usize {
        self.meta.data_offset(self.offset)
    }

    /// Number of bytes the field occupies once `length` data bytes are
    /// written: the padded length of a fixed field, header plus data for a
    /// variable one.
    #[must_use]
    pub fn encoded_length(&self, length: usize) -> usize {
        self.data_offset() - self.offset + length
    }

    fn reserve(&mut self, length: usize) -> Result<&mut [u8]> {
        let meta = self.meta;
        let offset = self.offset;
        let buffer = self
            .buffer
            .as_deref_mut()
            .ok_or(Error::NotAttached { name: meta.name() })?;
        meta.reserve(buffer, offset, length)
    }

    fn write_padded(&mut self, bytes: &[u8]) -> Result<usize> {
        let window = self.reserve(bytes.len())?;
        let (data, padding) = window.split_at_mut(bytes.len());
        data.copy_from_slice(bytes);
        padding.fill(0);
        Ok(bytes.len())
    }

    /// Writes the empty string.
    ///
    /// # Errors
    /// Returns [`Error::NotAttached`] or [`Error::BufferTooShort`].
    pub fn empty(&mut self) -> Result<usize> {
        self.write_padded(&[])
    }

    /// Encodes `text` in the field charset.
    ///
    /// # Errors
    /// Returns a length, bounds or unmappable-character error; nothing is
    /// written in that case.
    pub fn put(&mut self, text: &str) -> Result<usize> {
        let bytes = encode_text(self.meta.charset(), self.policy, text)?;
        self.write_padded(&bytes)
    }

    /// Copies raw bytes into the field.
    ///
    /// # Errors
    /// Returns a length or bounds error.
    pub fn put_bytes(&mut self, src: &[u8]) -> Result<usize> {
        self.write_padded(src)
    }

    /// Pulls `length` bytes from `src` starting at `src_offset`.
    ///
    /// # Errors
    /// Returns a length or bounds error.
    pub fn put_from_bytes<S, R>(
        &mut self,
        src: &S,
        src_offset: usize,
        reader: &R,
        length: usize,
    ) -> Result<usize>
    where
        S: ?Sized,
        R: ByteReader<S> + ?Sized,
    {
        let window = self.reserve(length)?;
        for (i, slot) in window[..length].iter_mut().enumerate() {
            *slot = reader.read(src, src_offset + i);
        }
        window[length..].fill(0);
        Ok(length)
    }

    /// Pulls `length` chars from `src` starting at `src_offset`.
    ///
    /// # Errors
    /// Returns a length, bounds or unmappable-character error.
    pub fn put_from_chars<S, R>(
        &mut self,
        src: &S,
        src_offset: usize,
        reader: &R,
        length: usize,
    ) -> Result<usize>
    where
        S: ?Sized,
        R: CharReader<S> + ?Sized,
    {
        let charset = self.meta.charset();
        if !charset.is_ascii() {
            let text: String = (0..length)
                .map(|i| reader.read(src, src_offset + i))
                .collect();
            return self.put(&text);
        }
        let policy = self.policy;
        let mut substituted = 0usize;
        for i in 0..length {
            let ch = reader.read(src, src_offset + i);
            if !ch.is_ascii() {
                charset.single_byte(ch, i, policy)?;
                substituted += 1;
            }
        }
        let window = self.reserve(length)?;
        for (i, slot) in window[..length].iter_mut().enumerate() {
            *slot = charset.single_byte(reader.read(src, src_offset + i), i, policy)?;
        }
        window[length..].fill(0);
        if substituted > 0 {
            tracing::warn!(
                encoding = charset.name(),
                substituted,
                "substituted unmappable characters"
            );
        }
        Ok(length)
    }

    /// Lets `encoder` write `value` through a length-to-buffer sink.
    ///
    /// Fixed fields are zero-filled past the bytes the encoder reports.
    ///
    /// # Errors
    /// Propagates the encoder's errors and length or bounds errors.
    pub fn put_value<T, E>(&mut self, value: &T, encoder: &E) -> Result<usize>
    where
        T: ?Sized,
        E: ValueEncoder<T> + ?Sized,
    {
        let meta = self.meta;
        let offset = self.offset;
        let buffer = self
            .buffer
            .as_deref_mut()
            .ok_or(Error::NotAttached { name: meta.name() })?;
        let mut sink = WindowSink {
            meta,
            buffer,
            offset,
            window: None,
        };
        let written = encoder.encode(value, &mut sink)?;
        let Some(window) = sink.window else {
            return self.write_padded(&[]);
        };
        if written > window {
            return Err(Error::LengthExceeded {
                field: meta.name(),
                length: written,
                max: window,
            });
        }
        let start = meta.data_offset(offset);
        sink.buffer[start + written..start + window].fill(0);
        Ok(written)
    }
}

impl<L: FieldLayout> fmt::Debug for FlyweightStringEncoder<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlyweightStringEncoder")
            .field("field", &self.meta.name())
            .field("attached", &self.is_attached())
            .field("offset", &self.offset)
            .field("policy", &self.policy)
            .finish()
    }
}

struct WindowSink<'b, L: FieldLayout> {
    meta: &'static L,
    buffer: &'b mut [u8],
    offset: usize,
    window: Option<usize>,
}

impl<L: FieldLayout> LengthToBuffer for WindowSink<'_, L> {
    fn buffer_for(&mut self, length: usize) -> Result<&mut [u8]> {
        let window = self.meta.reserve(self.buffer, self.offset, length)?;
        self.window = Some(window.len());
        Ok(window)
    }
}
