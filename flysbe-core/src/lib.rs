//! # flysbe core
//!
//! Core types for flyweight SBE codecs.
//!
//! This crate provides:
//! - Buffer traits for zero-copy read/write over externally owned bytes
//! - Byte, ASCII and UTF-16 comparators for raw field windows
//! - Character encodings and the unmappable-character policy
//! - Immutable field metadata for fixed and variable text fields
//! - Message, group and var-data headers
//! - The payload descriptor and message metadata trait
//! - The shared error type

pub mod buffer;
pub mod charset;
pub mod compare;
pub mod enums;
pub mod error;
pub mod header;
pub mod message;
pub mod meta;
pub mod payload;

pub use buffer::{AlignedBuffer, ReadBuffer, WriteBuffer};
pub use charset::{Charset, UnmappablePolicy};
pub use compare::BufferComparator;
pub use enums::NamedEnum;
pub use error::{Error, Result};
pub use header::{GroupHeader, MessageHeader, VarDataHeader};
pub use message::SbeMessage;
pub use meta::{CharMeta, MAX_VAR_LENGTH, Presence, VarCharMeta};
pub use payload::PayloadView;
