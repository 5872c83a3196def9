//! Enum codec that puts the constant's name on the wire.
//!
//! Names are sorted once per enum type with the ASCII comparator and packed
//! into one contiguous byte region. The table is built on first use and
//! shared process-wide; it is never mutated afterwards.

use crate::value::{LengthToBuffer, ValueDecoder, ValueEncoder};
use flysbe_core::compare::BufferComparator;
use flysbe_core::{Error, NamedEnum, Result};
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

type Registry = RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>;

static TABLES: OnceLock<Registry> = OnceLock::new();

/// Sorted, packed name table of one enum type.
struct NameTable<E> {
    names: Box<[u8]>,
    spans: Box<[(usize, usize)]>,
    values: Box<[E]>,
    max_name_length: usize,
}

impl<E: NamedEnum> NameTable<E> {
    fn build() -> Self {
        let mut values = E::VARIANTS.to_vec();
        for i in 1..values.len() {
            let mut j = i;
            while j > 0
                && BufferComparator::Ascii
                    .compare(values[j].name().as_bytes(), values[j - 1].name().as_bytes())
                    .is_lt()
            {
                values.swap(j, j - 1);
                j -= 1;
            }
        }

        let total: usize = values.iter().map(|v| v.name().len()).sum();
        let mut names = Vec::with_capacity(total);
        let mut spans = Vec::with_capacity(values.len());
        for value in &values {
            let start = names.len();
            names.extend(value.name().bytes().map(|b| b & 0x7F));
            spans.push((start, names.len()));
        }
        let max_name_length = spans.iter().map(|(s, e)| e - s).max().unwrap_or(0);

        tracing::debug!(
            enum_type = std::any::type_name::<E>(),
            count = values.len(),
            bytes = total,
            "built enum name table"
        );

        Self {
            names: names.into_boxed_slice(),
            spans: spans.into_boxed_slice(),
            values: values.into_boxed_slice(),
            max_name_length,
        }
    }

    fn shared() -> Arc<Self> {
        let registry = TABLES.get_or_init(Registry::default);
        let cached = registry.read().get(&TypeId::of::<E>()).cloned();
        let erased = match cached {
            Some(table) => table,
            None => {
                let mut tables = registry.write();
                let entry = tables.entry(TypeId::of::<E>()).or_insert_with(|| {
                    let table: Arc<dyn Any + Send + Sync> = Arc::new(Self::build());
                    table
                });
                Arc::clone(entry)
            }
        };
        erased
            .downcast::<Self>()
            .unwrap_or_else(|_| Arc::new(Self::build()))
    }

    fn find(&self, name: &[u8]) -> Option<E> {
        self.spans
            .binary_search_by(|&(start, end)| {
                BufferComparator::Ascii.compare(&self.names[start..end], name)
            })
            .ok()
            .map(|index| self.values[index])
    }
}

type UnknownFn<E> = Arc<dyn Fn(&[u8]) -> Option<E> + Send + Sync>;

enum OnUnknown<E> {
    Value(Option<E>),
    Reject,
    With(UnknownFn<E>),
}

impl<E: Copy> Clone for OnUnknown<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Value(v) => Self::Value(*v),
            Self::Reject => Self::Reject,
            Self::With(f) => Self::With(Arc::clone(f)),
        }
    }
}

/// Decodes enum constants from their names and encodes them back.
///
/// Decoding empty input yields the configured empty value. An unknown name
/// goes to the configured fallback, which yields `None` unless set.
pub struct EnumNameCodec<E: NamedEnum> {
    table: Arc<NameTable<E>>,
    empty_value: Option<E>,
    on_unknown: OnUnknown<E>,
}

impl<E: NamedEnum> EnumNameCodec<E> {
    /// Creates a codec with no empty value and no unknown-name fallback.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts a builder.
    #[must_use]
    pub fn builder() -> EnumNameCodecBuilder<E> {
        EnumNameCodecBuilder {
            empty_value: None,
            on_unknown: OnUnknown::Value(None),
        }
    }

    /// Number of constants.
    #[must_use]
    pub fn enum_value_count(&self) -> usize {
        self.table.values.len()
    }

    /// Length of the longest name.
    #[must_use]
    pub fn enum_name_max_length(&self) -> usize {
        self.table.max_name_length
    }

    /// Constant at `index` in name order.
    #[must_use]
    pub fn enum_value_by_name_index(&self, index: usize) -> Option<E> {
        self.table.values.get(index).copied()
    }

    /// Value decoded from empty input.
    #[must_use]
    pub const fn empty_value(&self) -> Option<E> {
        self.empty_value
    }

    /// Decodes a constant from its name bytes.
    ///
    /// # Errors
    /// Returns [`Error::UnknownEnumName`] only when unknown names are
    /// rejected.
    pub fn decode_name(&self, bytes: &[u8]) -> Result<Option<E>> {
        if bytes.is_empty() {
            return Ok(self.empty_value);
        }
        if let Some(value) = self.table.find(bytes) {
            return Ok(Some(value));
        }
        match &self.on_unknown {
            OnUnknown::Value(value) => Ok(*value),
            OnUnknown::With(f) => Ok(f(bytes)),
            OnUnknown::Reject => Err(Error::UnknownEnumName {
                name: String::from_utf8_lossy(bytes).into_owned(),
            }),
        }
    }

    /// Encodes a value whose type is only known at run time.
    ///
    /// Accepts `E` and `Option<E>`.
    ///
    /// # Errors
    /// Returns [`Error::EnumTypeMismatch`] for any other type, or a sink
    /// error.
    pub fn encode_any(&self, value: &dyn Any, sink: &mut dyn LengthToBuffer) -> Result<usize> {
        if let Some(value) = value.downcast_ref::<E>() {
            return encode_name(value.name(), sink);
        }
        if let Some(value) = value.downcast_ref::<Option<E>>() {
            return encode_name(value.map_or("", |v| v.name()), sink);
        }
        Err(Error::EnumTypeMismatch {
            expected: std::any::type_name::<E>(),
        })
    }
}

fn encode_name(name: &str, sink: &mut dyn LengthToBuffer) -> Result<usize> {
    let window = sink.buffer_for(name.len())?;
    for (slot, b) in window.iter_mut().zip(name.bytes()) {
        *slot = b & 0x7F;
    }
    Ok(name.len())
}

impl<E: NamedEnum> Default for EnumNameCodec<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: NamedEnum> Clone for EnumNameCodec<E> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
            empty_value: self.empty_value,
            on_unknown: self.on_unknown.clone(),
        }
    }
}

impl<E: NamedEnum> fmt::Debug for EnumNameCodec<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumNameCodec")
            .field("enum_type", &std::any::type_name::<E>())
            .field("count", &self.table.values.len())
            .finish()
    }
}

impl<E: NamedEnum> ValueDecoder<Option<E>> for EnumNameCodec<E> {
    fn decode(&mut self, bytes: &[u8]) -> Result<Option<E>> {
        self.decode_name(bytes)
    }
}

impl<E: NamedEnum> ValueEncoder<E> for EnumNameCodec<E> {
    fn encode(&self, value: &E, sink: &mut dyn LengthToBuffer) -> Result<usize> {
        encode_name(value.name(), sink)
    }
}

impl<E: NamedEnum> ValueEncoder<Option<E>> for EnumNameCodec<E> {
    fn encode(&self, value: &Option<E>, sink: &mut dyn LengthToBuffer) -> Result<usize> {
        encode_name(value.map_or("", |v| v.name()), sink)
    }
}

/// Builder for [`EnumNameCodec`].
pub struct EnumNameCodecBuilder<E: NamedEnum> {
    empty_value: Option<E>,
    on_unknown: OnUnknown<E>,
}

impl<E: NamedEnum> EnumNameCodecBuilder<E> {
    /// Value returned for empty input.
    #[must_use]
    pub fn empty_value(mut self, value: E) -> Self {
        self.empty_value = Some(value);
        self
    }

    /// Value returned for an unknown name.
    #[must_use]
    pub fn unknown_value(mut self, value: E) -> Self {
        self.on_unknown = OnUnknown::Value(Some(value));
        self
    }

    /// Function deciding the value for an unknown name.
    #[must_use]
    pub fn on_unknown<F>(mut self, f: F) -> Self
    where
        F: Fn(&[u8]) -> Option<E> + Send + Sync + 'static,
    {
        self.on_unknown = OnUnknown::With(Arc::new(f));
        self
    }

    /// Fails decoding of unknown names with [`Error::UnknownEnumName`].
    #[must_use]
    pub fn reject_unknown(mut self) -> Self {
        self.on_unknown = OnUnknown::Reject;
        self
    }

    /// Builds the codec, building the shared name table if needed.
    #[must_use]
    pub fn build(self) -> EnumNameCodec<E> {
        EnumNameCodec {
            table: NameTable::shared(),
            empty_value: self.empty_value,
            on_unknown: self.on_unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::string::{FixedStringDecoder, FixedStringEncoder};
    use flysbe_core::{CharMeta, Charset};
    use flysbe_derive::EnumName;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, EnumName)]
    enum Side {
        Sell,
        Buy,
        #[sbe(name = "SELL_SHORT")]
        SellShort,
        Cross,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, EnumName)]
    enum Empty {}

    static SIDE: CharMeta = CharMeta::new("side", 54, 0, 10, Charset::Ascii);

    struct Window(Vec<u8>);

    impl LengthToBuffer for Window {
        fn buffer_for(&mut self, length: usize) -> Result<&mut [u8]> {
            self.0 = vec![0; length];
            Ok(&mut self.0[..])
        }
    }

    #[test]
    fn test_table_sorted_by_ascii_name() {
        let codec = EnumNameCodec::<Side>::new();
        let names: Vec<&str> = (0..codec.enum_value_count())
            .filter_map(|i| codec.enum_value_by_name_index(i))
            .map(|v| v.name())
            .collect();
        assert_eq!(names, vec!["Buy", "Cross", "SELL_SHORT", "Sell"]);
        assert_eq!(codec.enum_name_max_length(), 10);
        assert_eq!(codec.enum_value_by_name_index(4), None);
    }

    #[test]
    fn test_decode_hits_and_misses() {
        let codec = EnumNameCodec::<Side>::new();
        assert_eq!(codec.decode_name(b"Buy").unwrap(), Some(Side::Buy));
        assert_eq!(codec.decode_name(b"SELL_SHORT").unwrap(), Some(Side::SellShort));
        assert_eq!(codec.decode_name(b"Bu").unwrap(), None);
        assert_eq!(codec.decode_name(b"").unwrap(), None);
    }

    #[test]
    fn test_empty_and_unknown_values() {
        let codec = EnumNameCodec::<Side>::builder()
            .empty_value(Side::Cross)
            .unknown_value(Side::Sell)
            .build();
        assert_eq!(codec.decode_name(b"").unwrap(), Some(Side::Cross));
        assert_eq!(codec.decode_name(b"Hold").unwrap(), Some(Side::Sell));

        let codec = EnumNameCodec::<Side>::builder()
            .on_unknown(|raw| (raw == b"B").then_some(Side::Buy))
            .build();
        assert_eq!(codec.decode_name(b"B").unwrap(), Some(Side::Buy));
        assert_eq!(codec.decode_name(b"S").unwrap(), None);

        let strict = EnumNameCodec::<Side>::builder().reject_unknown().build();
        assert_eq!(
            strict.decode_name(b"Hold").unwrap_err(),
            Error::UnknownEnumName {
                name: "Hold".to_string()
            }
        );
    }

    #[test]
    fn test_tables_are_shared() {
        let a = EnumNameCodec::<Side>::new();
        let b = EnumNameCodec::<Side>::builder().reject_unknown().build();
        assert!(Arc::ptr_eq(&a.table, &b.table));
    }

    #[test]
    fn test_empty_enum() {
        let codec = EnumNameCodec::<Empty>::new();
        assert_eq!(codec.enum_value_count(), 0);
        assert_eq!(codec.enum_name_max_length(), 0);
        assert_eq!(codec.decode_name(b"x").unwrap(), None);
    }

    #[test]
    fn test_encode() {
        let codec = EnumNameCodec::<Side>::new();
        let mut window = Window(Vec::new());
        assert_eq!(ValueEncoder::<Side>::encode(&codec, &Side::Buy, &mut window).unwrap(), 3);
        assert_eq!(window.0, b"Buy");
        assert_eq!(
            ValueEncoder::<Option<Side>>::encode(&codec, &None, &mut window).unwrap(),
            0
        );
        assert!(window.0.is_empty());
    }

    #[test]
    fn test_encode_any_rejects_wrong_type() {
        let codec = EnumNameCodec::<Side>::new();
        let mut window = Window(Vec::new());
        assert_eq!(codec.encode_any(&Side::Sell, &mut window).unwrap(), 4);
        assert_eq!(codec.encode_any(&Some(Side::Cross), &mut window).unwrap(), 5);
        assert!(matches!(
            codec.encode_any(&42u32, &mut window),
            Err(Error::EnumTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_round_trip_through_fixed_field() {
        let codec = EnumNameCodec::<Side>::new();
        let mut buf = [0xFFu8; 10];
        let mut encoder = FixedStringEncoder::attached(&SIDE, &mut buf, 0);
        assert_eq!(encoder.put_value(&Side::Sell, &codec).unwrap(), 4);
        drop(encoder);
        assert_eq!(&buf, b"Sell\0\0\0\0\0\0");

        let decoder = FixedStringDecoder::attached(&SIDE, &buf, 0);
        let mut codec = codec;
        assert_eq!(decoder.get_with(&mut codec).unwrap(), Some(Side::Sell));
    }
}
