//! Prelude module for convenient imports.
//!
//! ```ignore
//! use flysbe::prelude::*;
//! ```

// Core types
pub use flysbe_core::buffer::{AlignedBuffer, ReadBuffer, WriteBuffer};
pub use flysbe_core::error::{Error as CoreError, Result as CoreResult};
pub use flysbe_core::{
    BufferComparator, CharMeta, Charset, NamedEnum, PayloadView, SbeMessage, UnmappablePolicy,
    VarCharMeta,
};

// Codec types
pub use flysbe_codec::{
    ByteReader, ByteWriter, CharReader, CharWriter, EnumNameCodec, FixedStringDecoder,
    FixedStringEncoder, StringCache, StringFactory, ValueCache, ValueDecoder, ValueEncoder,
    VarStringDecoder, VarStringEncoder,
};

// Protocol types
pub use flysbe_protocol::{
    ExecRptDecoder, ExecRptEncoder, LegEntry, LegGroupDecoder, LegGroupEncoder, LegIter,
};

pub use flysbe_derive::EnumName;
