//! Character encodings understood by the string flyweights.
//!
//! [`Charset::Ascii`] selects the fast path: every element copy is a direct
//! byte/char cast. All other encodings go through a full decode or encode
//! of the field window.

use crate::error::{Error, Result};
use std::borrow::Cow;

/// Character encoding declared for a text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Charset {
    /// 7-bit US-ASCII, one byte per char.
    #[default]
    Ascii,
    /// UTF-8.
    Utf8,
    /// ISO-8859-1, one byte per char.
    Latin1,
    /// Little-endian UTF-16 code units.
    Utf16Le,
}

impl Charset {
    /// Parses an encoding name as it appears in a schema.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedEncoding`] for unknown names.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_uppercase().replace('_', "-").as_str() {
            "ASCII" | "US-ASCII" => Ok(Self::Ascii),
            "UTF-8" | "UTF8" => Ok(Self::Utf8),
            "ISO-8859-1" | "ISO8859-1" | "LATIN1" | "LATIN-1" => Ok(Self::Latin1),
            "UTF-16LE" | "UTF16LE" | "CHAR" => Ok(Self::Utf16Le),
            _ => Err(Error::UnsupportedEncoding {
                encoding: name.to_string(),
            }),
        }
    }

    /// Returns the canonical encoding name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ascii => "ASCII",
            Self::Utf8 => "UTF-8",
            Self::Latin1 => "ISO-8859-1",
            Self::Utf16Le => "UTF-16LE",
        }
    }

    /// Returns true for the byte/char cast fast path.
    #[inline]
    #[must_use]
    pub const fn is_ascii(self) -> bool {
        matches!(self, Self::Ascii)
    }

    /// Decodes raw field bytes into text.
    ///
    /// ASCII and Latin-1 bytes are cast straight to `char`; an odd trailing
    /// byte of a UTF-16 window is ignored.
    ///
    /// # Errors
    /// Returns [`Error::InvalidText`] for malformed UTF-8 or UTF-16.
    pub fn decode(self, bytes: &[u8]) -> Result<String> {
        match self {
            Self::Ascii | Self::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
            Self::Utf8 => std::str::from_utf8(bytes)
                .map(str::to_owned)
                .map_err(|e| Error::InvalidText {
                    offset: e.valid_up_to(),
                    encoding: self.name(),
                }),
            Self::Utf16Le => {
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16(&units).map_err(|_| Error::InvalidText {
                    offset: 0,
                    encoding: self.name(),
                })
            }
        }
    }

    /// Encodes text, borrowing the input when no conversion is needed.
    ///
    /// # Errors
    /// Returns [`Error::Unmappable`] when `policy` is
    /// [`UnmappablePolicy::Error`] and a character has no representation.
    pub fn encode<'s>(self, text: &'s str, policy: UnmappablePolicy) -> Result<Cow<'s, [u8]>> {
        match self {
            Self::Utf8 => Ok(Cow::Borrowed(text.as_bytes())),
            Self::Ascii if text.is_ascii() => Ok(Cow::Borrowed(text.as_bytes())),
            _ => self.encode_chars(text.chars(), policy).map(Cow::Owned),
        }
    }

    /// Encodes a sequence of chars into a fresh byte vector.
    ///
    /// # Errors
    /// Returns [`Error::Unmappable`] under [`UnmappablePolicy::Error`].
    pub fn encode_chars<I>(self, chars: I, policy: UnmappablePolicy) -> Result<Vec<u8>>
    where
        I: IntoIterator<Item = char>,
    {
        let chars = chars.into_iter();
        let mut out = Vec::with_capacity(chars.size_hint().0);
        for (position, ch) in chars.enumerate() {
            match self {
                Self::Ascii | Self::Latin1 => out.push(self.single_byte(ch, position, policy)?),
                Self::Utf8 => {
                    let mut buf = [0u8; 4];
                    out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                }
                Self::Utf16Le => {
                    let mut buf = [0u16; 2];
                    for unit in ch.encode_utf16(&mut buf) {
                        out.extend_from_slice(&unit.to_le_bytes());
                    }
                }
            }
        }
        Ok(out)
    }

    /// Maps one char to a single byte for ASCII or Latin-1.
    ///
    /// # Errors
    /// Returns [`Error::Unmappable`] under [`UnmappablePolicy::Error`], and
    /// [`Error::UnsupportedEncoding`] for multi-byte encodings.
    #[inline]
    pub fn single_byte(self, ch: char, position: usize, policy: UnmappablePolicy) -> Result<u8> {
        let max = match self {
            Self::Ascii => 0x7F,
            Self::Latin1 => 0xFF,
            Self::Utf8 | Self::Utf16Le => {
                return Err(Error::UnsupportedEncoding {
                    encoding: self.name().to_string(),
                });
            }
        };
        if (ch as u32) <= max {
            return Ok(ch as u8);
        }
        match policy {
            UnmappablePolicy::Error => Err(Error::Unmappable {
                position,
                ch,
                encoding: self.name(),
            }),
            UnmappablePolicy::Substitute(byte) => Ok(byte),
        }
    }
}

impl std::fmt::Display for Charset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// What to do with a character the target encoding cannot represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UnmappablePolicy {
    /// Reject the whole write before any byte is written.
    #[default]
    Error,
    /// Write the given byte instead (historically `b'?'`).
    Substitute(u8),
}

impl UnmappablePolicy {
    /// The lossy policy that replaces unmappable characters with `?`.
    pub const QUESTION_MARK: Self = Self::Substitute(b'?');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(Charset::from_name("ASCII").unwrap(), Charset::Ascii);
        assert_eq!(Charset::from_name("US-ASCII").unwrap(), Charset::Ascii);
        assert_eq!(Charset::from_name("utf-8").unwrap(), Charset::Utf8);
        assert_eq!(Charset::from_name("ISO_8859_1").unwrap(), Charset::Latin1);
        assert_eq!(Charset::from_name("UTF-16LE").unwrap(), Charset::Utf16Le);
        assert!(matches!(
            Charset::from_name("EBCDIC"),
            Err(Error::UnsupportedEncoding { .. })
        ));
    }

    #[test]
    fn test_name_round_trips() {
        for charset in [
            Charset::Ascii,
            Charset::Utf8,
            Charset::Latin1,
            Charset::Utf16Le,
        ] {
            assert_eq!(Charset::from_name(charset.name()).unwrap(), charset);
        }
    }

    #[test]
    fn test_ascii_encode_borrows() {
        let encoded = Charset::Ascii.encode("AUDUSD", UnmappablePolicy::Error).unwrap();
        assert!(matches!(encoded, Cow::Borrowed(_)));
        assert_eq!(&*encoded, b"AUDUSD");
    }

    #[test]
    fn test_ascii_unmappable_policy() {
        let err = Charset::Ascii.encode("caf\u{e9}", UnmappablePolicy::Error);
        assert_eq!(
            err,
            Err(Error::Unmappable {
                position: 3,
                ch: '\u{e9}',
                encoding: "ASCII"
            })
        );
        let lossy = Charset::Ascii
            .encode("caf\u{e9}", UnmappablePolicy::QUESTION_MARK)
            .unwrap();
        assert_eq!(&*lossy, b"caf?");
    }

    #[test]
    fn test_latin1_round_trip() {
        let encoded = Charset::Latin1.encode("caf\u{e9}", UnmappablePolicy::Error).unwrap();
        assert_eq!(&*encoded, &[b'c', b'a', b'f', 0xE9]);
        assert_eq!(Charset::Latin1.decode(&encoded).unwrap(), "caf\u{e9}");
        assert!(Charset::Latin1.encode("\u{20ac}", UnmappablePolicy::Error).is_err());
    }

    #[test]
    fn test_utf8_decode_error_offset() {
        let err = Charset::Utf8.decode(&[b'o', b'k', 0xFF]).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidText {
                offset: 2,
                encoding: "UTF-8"
            }
        );
    }

    #[test]
    fn test_utf16_round_trip() {
        let encoded = Charset::Utf16Le.encode("x\u{1F600}", UnmappablePolicy::Error).unwrap();
        assert_eq!(encoded.len(), 6);
        assert_eq!(Charset::Utf16Le.decode(&encoded).unwrap(), "x\u{1F600}");
    }

    #[test]
    fn test_single_byte_rejects_multibyte_charsets() {
        assert!(matches!(
            Charset::Utf8.single_byte('a', 0, UnmappablePolicy::Error),
            Err(Error::UnsupportedEncoding { .. })
        ));
    }
}
