//! # flysbe codec
//!
//! Flyweight text codecs over externally owned SBE buffers.
//!
//! This crate provides:
//! - Fixed-length and length-prefixed string flyweights
//! - Pull/push element adapters for zero-allocation streaming
//! - Value decoder and encoder seams with ready-made string factories
//! - A bounded interning cache keyed by raw field bytes
//! - An enum codec that writes constants by name

pub mod adapter;
pub mod cache;
pub mod enum_codec;
pub mod string;
pub mod value;

pub use adapter::{ByteReader, ByteWriter, CharReader, CharWriter};
pub use cache::{CacheBuilder, StringCache, ValueCache};
pub use enum_codec::{EnumNameCodec, EnumNameCodecBuilder};
pub use string::{
    FieldLayout, FixedStringDecoder, FixedStringEncoder, FlyweightStringDecoder,
    FlyweightStringEncoder, VarStringDecoder, VarStringEncoder,
};
pub use value::{DecodeFn, EncodeFn, LengthToBuffer, StringFactory, ValueDecoder, ValueEncoder};
