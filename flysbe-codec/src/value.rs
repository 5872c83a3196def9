//! Value decoder and encoder seams.
//!
//! A [`ValueDecoder`] turns a raw field window into a value without going
//! through an intermediate `String`; a [`ValueEncoder`] writes a value into
//! a window the field hands out once the length is known.

use flysbe_core::compare::BufferComparator;
use flysbe_core::{Charset, Result, UnmappablePolicy};
use std::sync::Arc;

/// Decodes a value from raw field bytes.
pub trait ValueDecoder<T> {
    /// Decodes `bytes`.
    ///
    /// # Errors
    /// Implementation specific.
    fn decode(&mut self, bytes: &[u8]) -> Result<T>;

    /// When true, fixed fields pass the padded window instead of the
    /// window with trailing NULs trimmed.
    fn trailing_zeros(&self) -> bool {
        false
    }
}

impl<T, D: ValueDecoder<T> + ?Sized> ValueDecoder<T> for &mut D {
    fn decode(&mut self, bytes: &[u8]) -> Result<T> {
        (**self).decode(bytes)
    }

    fn trailing_zeros(&self) -> bool {
        (**self).trailing_zeros()
    }
}

impl<T, D: ValueDecoder<T> + ?Sized> ValueDecoder<T> for Box<D> {
    fn decode(&mut self, bytes: &[u8]) -> Result<T> {
        (**self).decode(bytes)
    }

    fn trailing_zeros(&self) -> bool {
        (**self).trailing_zeros()
    }
}

/// Adapts a closure into a [`ValueDecoder`].
#[derive(Debug, Clone, Copy)]
pub struct DecodeFn<F> {
    f: F,
    trailing_zeros: bool,
}

impl<F> DecodeFn<F> {
    /// Wraps `f`.
    pub const fn new(f: F) -> Self {
        Self {
            f,
            trailing_zeros: false,
        }
    }

    /// Requests the padded window for fixed fields.
    #[must_use]
    pub const fn with_trailing_zeros(mut self) -> Self {
        self.trailing_zeros = true;
        self
    }
}

impl<T, F> ValueDecoder<T> for DecodeFn<F>
where
    F: FnMut(&[u8]) -> Result<T>,
{
    fn decode(&mut self, bytes: &[u8]) -> Result<T> {
        (self.f)(bytes)
    }

    fn trailing_zeros(&self) -> bool {
        self.trailing_zeros
    }
}

/// Hands out the destination window once the encoded length is known.
///
/// For a fixed field the window is the whole padded field; for a variable
/// field it is exactly `length` bytes and the length header is already
/// written.
pub trait LengthToBuffer {
    /// Validates `length` and returns the window to write into.
    ///
    /// # Errors
    /// Returns a length or bounds error; nothing is written in that case.
    fn buffer_for(&mut self, length: usize) -> Result<&mut [u8]>;
}

/// Encodes a value through a [`LengthToBuffer`] sink.
pub trait ValueEncoder<T: ?Sized> {
    /// Writes `value` and returns the number of bytes written.
    ///
    /// # Errors
    /// Implementation specific, or propagated from the sink.
    fn encode(&self, value: &T, sink: &mut dyn LengthToBuffer) -> Result<usize>;
}

/// Adapts a closure into a [`ValueEncoder`].
#[derive(Debug, Clone, Copy)]
pub struct EncodeFn<F>(pub F);

impl<T: ?Sized, F> ValueEncoder<T> for EncodeFn<F>
where
    F: Fn(&T, &mut dyn LengthToBuffer) -> Result<usize>,
{
    fn encode(&self, value: &T, sink: &mut dyn LengthToBuffer) -> Result<usize> {
        (self.0)(value, sink)
    }
}

/// Ready-made text decoder and encoder for one charset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StringFactory {
    charset: Charset,
    policy: UnmappablePolicy,
}

impl StringFactory {
    /// 7-bit ASCII.
    pub const ASCII: Self = Self::new(Charset::Ascii);
    /// UTF-8.
    pub const UTF8: Self = Self::new(Charset::Utf8);
    /// ISO-8859-1.
    pub const LATIN1: Self = Self::new(Charset::Latin1);
    /// Little-endian UTF-16 code units.
    pub const UTF16LE: Self = Self::new(Charset::Utf16Le);

    /// Creates a factory for `charset` that rejects unmappable characters.
    #[must_use]
    pub const fn new(charset: Charset) -> Self {
        Self {
            charset,
            policy: UnmappablePolicy::Error,
        }
    }

    /// Sets the policy used when encoding.
    #[must_use]
    pub const fn unmappable_policy(mut self, policy: UnmappablePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the charset.
    #[must_use]
    pub const fn charset(&self) -> Charset {
        self.charset
    }

    /// The comparator whose order matches this charset's units.
    #[must_use]
    pub const fn comparator(&self) -> BufferComparator {
        match self.charset {
            Charset::Ascii => BufferComparator::Ascii,
            Charset::Utf16Le => BufferComparator::Char,
            Charset::Utf8 | Charset::Latin1 => BufferComparator::Byte,
        }
    }
}

impl ValueDecoder<String> for StringFactory {
    fn decode(&mut self, bytes: &[u8]) -> Result<String> {
        self.charset.decode(bytes)
    }
}

impl ValueDecoder<Arc<str>> for StringFactory {
    fn decode(&mut self, bytes: &[u8]) -> Result<Arc<str>> {
        self.charset.decode(bytes).map(Arc::from)
    }
}

impl ValueEncoder<str> for StringFactory {
    fn encode(&self, value: &str, sink: &mut dyn LengthToBuffer) -> Result<usize> {
        let bytes = crate::string::encode_text(self.charset, self.policy, value)?;
        let window = sink.buffer_for(bytes.len())?;
        window[..bytes.len()].copy_from_slice(&bytes);
        Ok(bytes.len())
    }
}
