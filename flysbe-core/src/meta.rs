//! Immutable field metadata.
//!
//! One metadata value describes one schema field. It is created once per
//! schema (usually as a `static`) and shared read-only by every flyweight
//! that views that field.

use crate::charset::Charset;

/// Largest byte length a variable-length field may carry.
pub const MAX_VAR_LENGTH: usize = 1 << 30;

/// Field presence indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Presence {
    /// Field is required and must have a value.
    #[default]
    Required,
    /// Field is optional and may be null.
    Optional,
    /// Field has a constant value defined in the schema.
    Constant,
}

impl Presence {
    /// Parses presence from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "required" => Some(Self::Required),
            "optional" => Some(Self::Optional),
            "constant" => Some(Self::Constant),
            _ => None,
        }
    }
}

/// Metadata of a fixed-length, NUL-padded character field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharMeta {
    /// Field name.
    pub name: &'static str,
    /// Schema field id.
    pub id: u16,
    /// Offset of the field from the start of its block.
    pub encoding_offset: usize,
    /// Declared length in bytes.
    pub length: usize,
    /// Character encoding.
    pub charset: Charset,
    /// Schema version that introduced the field.
    pub since_version: u16,
    /// Field presence.
    pub presence: Presence,
    /// Semantic type, empty if none.
    pub semantic_type: &'static str,
    /// Free-form description, empty if none.
    pub description: &'static str,
}

impl CharMeta {
    /// Creates metadata for a required fixed-length field.
    #[must_use]
    pub const fn new(
        name: &'static str,
        id: u16,
        encoding_offset: usize,
        length: usize,
        charset: Charset,
    ) -> Self {
        Self {
            name,
            id,
            encoding_offset,
            length,
            charset,
            since_version: 0,
            presence: Presence::Required,
            semantic_type: "",
            description: "",
        }
    }

    /// Sets the schema version that introduced the field.
    #[must_use]
    pub const fn since_version(mut self, version: u16) -> Self {
        self.since_version = version;
        self
    }

    /// Sets the presence.
    #[must_use]
    pub const fn presence(mut self, presence: Presence) -> Self {
        self.presence = presence;
        self
    }

    /// Sets the semantic type.
    #[must_use]
    pub const fn semantic_type(mut self, semantic_type: &'static str) -> Self {
        self.semantic_type = semantic_type;
        self
    }

    /// Sets the description.
    #[must_use]
    pub const fn description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Encoded length in bytes; always the declared length.
    #[must_use]
    pub const fn encoding_length(&self) -> usize {
        self.length
    }
}

/// Metadata of a variable-length, length-prefixed character field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarCharMeta {
    /// Field name.
    pub name: &'static str,
    /// Schema field id.
    pub id: u16,
    /// Length of the little-endian u32 length header.
    pub header_length: usize,
    /// Character encoding.
    pub charset: Charset,
    /// Schema version that introduced the field.
    pub since_version: u16,
    /// Semantic type, empty if none.
    pub semantic_type: &'static str,
    /// Free-form description, empty if none.
    pub description: &'static str,
}

impl VarCharMeta {
    /// Length of the standard u32 length header.
    pub const HEADER_LENGTH: usize = 4;

    /// Creates metadata for a variable-length field with a u32 header.
    #[must_use]
    pub const fn new(name: &'static str, id: u16, charset: Charset) -> Self {
        Self {
            name,
            id,
            header_length: Self::HEADER_LENGTH,
            charset,
            since_version: 0,
            semantic_type: "",
            description: "",
        }
    }

    /// Sets the schema version that introduced the field.
    #[must_use]
    pub const fn since_version(mut self, version: u16) -> Self {
        self.since_version = version;
        self
    }

    /// Sets the semantic type.
    #[must_use]
    pub const fn semantic_type(mut self, semantic_type: &'static str) -> Self {
        self.semantic_type = semantic_type;
        self
    }

    /// Sets the description.
    #[must_use]
    pub const fn description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }
}
