//! Bounded interning cache keyed by raw field bytes.
//!
//! Keys are kept sorted under a [`BufferComparator`] so a lookup is one
//! binary search keyed by the caller's bytes. A miss decodes the
//! bytes once and stores an owned copy of the key next to the value.
//!
//! Once `max_capacity` entries exist the cache stops growing and a miss
//! overwrites the entry at the insertion point, clamped to the last
//! index. Overwriting there keeps the keys sorted.

use crate::value::{StringFactory, ValueDecoder};
use flysbe_core::buffer::ReadBuffer;
use flysbe_core::compare::BufferComparator;
use flysbe_core::{Charset, Error, Result};
use std::fmt;
use std::sync::Arc;

const DEFAULT_INITIAL_CAPACITY: usize = 16;

/// Interning cache from raw bytes to decoded values.
///
/// Not synchronized; give each pipeline its own instance.
pub struct ValueCache<T> {
    keys: Vec<Box<[u8]>>,
    values: Vec<T>,
    max_capacity: usize,
    comparator: BufferComparator,
    decoder: Box<dyn ValueDecoder<T> + Send>,
}

impl<T> ValueCache<T> {
    /// Starts a builder.
    #[must_use]
    pub fn builder() -> CacheBuilder<T> {
        CacheBuilder::new()
    }

    /// Returns the value for `length` bytes of `buffer` at `offset`,
    /// decoding and caching it on a miss.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] for an out-of-range window, or
    /// the decoder's error on a miss. A failed decode caches nothing.
    pub fn lookup(&mut self, buffer: &[u8], offset: usize, length: usize) -> Result<&T> {
        let key = buffer.try_get_bytes(offset, length)?;
        self.lookup_bytes(key)
    }

    /// Returns the value for `key`, decoding and caching it on a miss.
    ///
    /// # Errors
    /// Returns the decoder's error on a miss.
    pub fn lookup_bytes(&mut self, key: &[u8]) -> Result<&T> {
        match self
            .comparator
            .binary_search_by_key(&self.keys, key, |k| &k[..])
        {
            Ok(index) => Ok(&self.values[index]),
            Err(position) => self.insert(position, key),
        }
    }

    fn insert(&mut self, position: usize, key: &[u8]) -> Result<&T> {
        let value = self.decoder.decode(key)?;
        let owned: Box<[u8]> = key.into();
        if self.keys.len() < self.max_capacity {
            self.keys.insert(position, owned);
            self.values.insert(position, value);
            return Ok(&self.values[position]);
        }
        let index = position.min(self.keys.len() - 1);
        tracing::debug!(
            index,
            size = self.keys.len(),
            "interning cache full, overwriting entry"
        );
        self.keys[index] = owned;
        self.values[index] = value;
        Ok(&self.values[index])
    }

    /// Number of cached entries.
    #[must_use]
    pub fn size(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Maximum number of entries.
    #[must_use]
    pub const fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    /// Key ordering.
    #[must_use]
    pub const fn comparator(&self) -> BufferComparator {
        self.comparator
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.values.clear();
    }
}

impl<T: Clone> ValueDecoder<T> for ValueCache<T> {
    fn decode(&mut self, bytes: &[u8]) -> Result<T> {
        self.lookup_bytes(bytes).cloned()
    }

    fn trailing_zeros(&self) -> bool {
        self.decoder.trailing_zeros()
    }
}

impl<T> fmt::Debug for ValueCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueCache")
            .field("size", &self.keys.len())
            .field("max_capacity", &self.max_capacity)
            .field("comparator", &self.comparator)
            .finish()
    }
}

/// Builder for [`ValueCache`].
pub struct CacheBuilder<T> {
    initial_capacity: Option<usize>,
    max_capacity: usize,
    comparator: BufferComparator,
    decoder: Option<Box<dyn ValueDecoder<T> + Send>>,
}

impl<T> CacheBuilder<T> {
    /// Creates a builder with an unbounded maximum and the byte comparator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            initial_capacity: None,
            max_capacity: usize::MAX,
            comparator: BufferComparator::Byte,
            decoder: None,
        }
    }

    /// Entries to reserve up front.
    ///
    /// Defaults to 16, clamped to the maximum when only that is given.
    #[must_use]
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = Some(capacity);
        self
    }

    /// Upper bound on the number of entries.
    #[must_use]
    pub fn max_capacity(mut self, capacity: usize) -> Self {
        self.max_capacity = capacity;
        self
    }

    /// Key ordering.
    #[must_use]
    pub fn comparator(mut self, comparator: BufferComparator) -> Self {
        self.comparator = comparator;
        self
    }

    /// Decoder invoked once per miss.
    #[must_use]
    pub fn decoder<D>(mut self, decoder: D) -> Self
    where
        D: ValueDecoder<T> + Send + 'static,
    {
        self.decoder = Some(Box::new(decoder));
        self
    }

    /// Builds the cache.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] if no decoder was given, if the
    /// maximum is zero, or if it is below the initial capacity.
    pub fn build(self) -> Result<ValueCache<T>> {
        let initial_capacity = self
            .initial_capacity
            .unwrap_or_else(|| DEFAULT_INITIAL_CAPACITY.min(self.max_capacity));
        if self.max_capacity < 1 {
            return Err(Error::configuration(format!(
                "max capacity cannot be zero: {}",
                self.max_capacity
            )));
        }
        if self.max_capacity < initial_capacity {
            return Err(Error::configuration(format!(
                "max capacity cannot be less than initial capacity: max={}, initial={}",
                self.max_capacity, initial_capacity
            )));
        }
        let decoder = self
            .decoder
            .ok_or_else(|| Error::configuration("cache decoder is required"))?;
        Ok(ValueCache {
            keys: Vec::with_capacity(initial_capacity),
            values: Vec::with_capacity(initial_capacity),
            max_capacity: self.max_capacity,
            comparator: self.comparator,
            decoder,
        })
    }
}

impl<T> Default for CacheBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Interning cache of shared strings.
#[derive(Debug)]
pub struct StringCache {
    cache: ValueCache<Arc<str>>,
}

impl StringCache {
    /// Creates a cache decoding with `charset`.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] for invalid capacities.
    pub fn new(initial_capacity: usize, max_capacity: usize, charset: Charset) -> Result<Self> {
        Self::with_factory(initial_capacity, max_capacity, StringFactory::new(charset))
    }

    /// Creates an unbounded ASCII cache.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] for an invalid capacity.
    pub fn unbounded(initial_capacity: usize) -> Result<Self> {
        Self::new(initial_capacity, usize::MAX, Charset::Ascii)
    }

    /// Creates a cache decoding with `factory`.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] for invalid capacities.
    pub fn with_factory(
        initial_capacity: usize,
        max_capacity: usize,
        factory: StringFactory,
    ) -> Result<Self> {
        CacheBuilder::new()
            .initial_capacity(initial_capacity)
            .max_capacity(max_capacity)
            .decoder(factory)
            .build()
            .map(|cache| Self { cache })
    }

    /// Returns the interned string for `length` bytes at `offset`.
    ///
    /// # Errors
    /// Same as [`ValueCache::lookup`].
    pub fn lookup(&mut self, buffer: &[u8], offset: usize, length: usize) -> Result<Arc<str>> {
        self.cache.lookup(buffer, offset, length).cloned()
    }

    /// Number of cached strings.
    #[must_use]
    pub fn size(&self) -> usize {
        self.cache.size()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

impl ValueDecoder<Arc<str>> for StringCache {
    fn decode(&mut self, bytes: &[u8]) -> Result<Arc<str>> {
        self.cache.decode(bytes)
    }
}

impl ValueDecoder<String> for StringCache {
    fn decode(&mut self, bytes: &[u8]) -> Result<String> {
        self.cache.lookup_bytes(bytes).map(|s| s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::DecodeFn;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_cache(max: usize, calls: &Arc<AtomicUsize>) -> ValueCache<String> {
        let calls = Arc::clone(calls);
        ValueCache::builder()
            .initial_capacity(1)
            .max_capacity(max)
            .decoder(DecodeFn::new(move |b: &[u8]| -> Result<String> {
                calls.fetch_add(1, Ordering::Relaxed);
                Charset::Ascii.decode(b)
            }))
            .build()
            .unwrap()
    }

    #[test]
    fn test_hit_does_not_decode_again() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut cache = counting_cache(8, &calls);
        let buf = b"xxAUDUSDxxAUDUSD";

        assert_eq!(cache.lookup(buf, 2, 6).unwrap(), "AUDUSD");
        assert_eq!(cache.lookup(buf, 10, 6).unwrap(), "AUDUSD");
        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert_eq!(cache.size(), 1);
    }

    #[test]
    fn test_keys_stay_sorted() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut cache = counting_cache(8, &calls);
        for key in ["m", "c", "x", "a", "p"] {
            cache.lookup_bytes(key.as_bytes()).unwrap();
        }
        let keys: Vec<&[u8]> = cache.keys.iter().map(|k| &k[..]).collect();
        assert_eq!(keys, vec![&b"a"[..], &b"c"[..], &b"m"[..], &b"p"[..], &b"x"[..]]);
        assert_eq!(cache.values, vec!["a", "c", "m", "p", "x"]);
    }

    #[test]
    fn test_overwrite_when_full() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut cache = counting_cache(2, &calls);
        cache.lookup_bytes(b"b").unwrap();
        cache.lookup_bytes(b"d").unwrap();

        // insertion point 1, replaces "d"
        cache.lookup_bytes(b"c").unwrap();
        assert_eq!(cache.values, vec!["b", "c"]);

        // insertion point 2, clamped to the last entry
        cache.lookup_bytes(b"z").unwrap();
        assert_eq!(cache.values, vec!["b", "z"]);

        // insertion point 0
        cache.lookup_bytes(b"a").unwrap();
        assert_eq!(cache.values, vec!["a", "z"]);
        assert_eq!(cache.size(), 2);
    }

    #[test]
    fn test_clear() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut cache = counting_cache(4, &calls);
        cache.lookup_bytes(b"x").unwrap();
        cache.clear();
        assert!(cache.is_empty());
        cache.lookup_bytes(b"x").unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_configuration_errors() {
        let zero = ValueCache::<String>::builder()
            .initial_capacity(0)
            .max_capacity(0)
            .decoder(StringFactory::ASCII)
            .build();
        assert!(matches!(zero, Err(Error::Configuration { .. })));

        let below = ValueCache::<String>::builder()
            .initial_capacity(10)
            .max_capacity(5)
            .decoder(StringFactory::ASCII)
            .build();
        assert!(matches!(below, Err(Error::Configuration { .. })));

        let missing = ValueCache::<String>::builder().build();
        assert!(matches!(missing, Err(Error::Configuration { .. })));

        assert!(StringCache::new(4, 2, Charset::Ascii).is_err());
    }

    #[test]
    fn test_bounded_cache_with_only_max() {
        let mut cache = ValueCache::<String>::builder()
            .max_capacity(4)
            .decoder(StringFactory::ASCII)
            .build()
            .unwrap();
        assert_eq!(cache.max_capacity(), 4);
        for key in [&b"a"[..], b"b", b"c", b"d", b"e"] {
            cache.lookup_bytes(key).unwrap();
        }
        assert!(cache.size() <= 4);

        let explicit = ValueCache::<String>::builder()
            .initial_capacity(16)
            .max_capacity(4)
            .decoder(StringFactory::ASCII)
            .build();
        assert!(matches!(explicit, Err(Error::Configuration { .. })));
    }

    #[test]
    fn test_failed_decode_caches_nothing() {
        let mut cache = ValueCache::<String>::builder()
            .decoder(StringFactory::UTF8)
            .build()
            .unwrap();
        assert!(cache.lookup_bytes(&[0xFF]).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_lookup_out_of_range() {
        let mut cache = StringCache::unbounded(4).unwrap();
        assert!(matches!(
            cache.lookup(b"abc", 2, 5),
            Err(Error::BufferTooShort { .. })
        ));
    }

    #[test]
    fn test_string_cache_shares_instances() {
        let mut cache = StringCache::new(2, 4, Charset::Ascii).unwrap();
        let first = cache.lookup(b"EURUSD", 0, 6).unwrap();
        let second = cache.lookup(b"..EURUSD", 2, 6).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_ascii_comparator_folds_top_bit() {
        let mut cache = ValueCache::<String>::builder()
            .comparator(BufferComparator::Ascii)
            .decoder(StringFactory::LATIN1)
            .build()
            .unwrap();
        assert_eq!(cache.lookup_bytes(b"A").unwrap(), "A");
        assert_eq!(cache.lookup_bytes(&[b'A' | 0x80]).unwrap(), "A");
        assert_eq!(cache.size(), 1);
    }

    #[test]
    fn test_cache_as_value_decoder() {
        let mut cache = StringCache::unbounded(4).unwrap();
        let a: Arc<str> = ValueDecoder::decode(&mut cache, b"GBP").unwrap();
        let b: Arc<str> = ValueDecoder::decode(&mut cache, b"GBP").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        let owned: String = cache.decode(b"GBP").unwrap();
        assert_eq!(owned, "GBP");
        assert_eq!(cache.size(), 1);
    }

    proptest! {
        #[test]
        fn prop_size_bounded_and_sorted(
            max in 1usize..8,
            keys in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..4), 0..40),
        ) {
            let mut cache = ValueCache::<usize>::builder()
                .initial_capacity(1)
                .max_capacity(max)
                .decoder(DecodeFn::new(|b: &[u8]| -> Result<usize> { Ok(b.len()) }))
                .build()
                .unwrap();
            for key in &keys {
                let value = *cache.lookup_bytes(key).unwrap();
                prop_assert_eq!(value, key.len());
                prop_assert!(cache.size() <= max);
            }
            for pair in cache.keys.windows(2) {
                prop_assert!(BufferComparator::Byte.compare(&pair[0], &pair[1]).is_lt());
            }
        }
    }
}
