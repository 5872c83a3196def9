//! # flysbe
//!
//! Flyweight SBE (Simple Binary Encoding) text codecs for Rust.
//!
//! flysbe reads and writes text fields in place over externally owned
//! buffers, without allocating on the hot path.
//!
//! ## Features
//!
//! - **Flyweight strings** - Fixed NUL-padded and u32 length-prefixed fields
//! - **Streaming adapters** - Copy through any reader/writer closure
//! - **Interning cache** - Bounded, sorted cache keyed by raw field bytes
//! - **Enum names** - Encode and decode enum constants by name
//! - **Ordered sessions** - Type-state encoder and skip-forward decoder
//!
//! ## Quick Start
//!
//! ```ignore
//! use flysbe::prelude::*;
//!
//! let mut buf = [0u8; 128];
//! let mut encoder = ExecRptEncoder::new();
//! let payload = encoder
//!     .wrap_and_apply_header(&mut buf, 0)?
//!     .symbol("AUDUSD")?
//!     .leg_group_empty()?
//!     .put("bla")?;
//!
//! let mut decoder = ExecRptDecoder::new();
//! decoder.wrap_payload(&payload)?;
//! assert_eq!(decoder.symbol()?, "AUDUSD");
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`] - Buffers, comparators, charsets, field metadata, headers
//! - [`codec`] - String flyweights, adapters, cache, enum name codec
//! - [`protocol`] - Ordered message sessions

pub mod prelude;

/// Buffers, comparators, field metadata and headers.
pub mod core {
    pub use flysbe_core::*;
}

/// String flyweights, adapters, cache and enum codec.
pub mod codec {
    pub use flysbe_codec::*;
}

/// Ordered message sessions.
pub mod protocol {
    pub use flysbe_protocol::*;
}

// Re-export commonly used items at the crate root
pub use flysbe_core::{
    BufferComparator, Charset, Error, NamedEnum, PayloadView, Result, UnmappablePolicy,
};

pub use flysbe_codec::{
    EnumNameCodec, FixedStringDecoder, FixedStringEncoder, StringCache, VarStringDecoder,
    VarStringEncoder,
};

pub use flysbe_derive::EnumName;

pub use flysbe_protocol::{ExecRptDecoder, ExecRptEncoder};
