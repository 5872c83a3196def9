//! Total orderings over raw byte ranges.
//!
//! A [`BufferComparator`] is the sole ordering key for the interning cache
//! and for enum name tables. It never allocates and never decodes: ranges
//! are compared as raw bytes, 7-bit ASCII, or little-endian UTF-16 code
//! units. A shorter range that is a prefix of a longer one sorts first.

use std::cmp::Ordering;

const BYTE_MASK: u8 = 0xff;
const ASCII_MASK: u8 = 0x7f;

/// Comparator over two byte ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferComparator {
    /// Unsigned byte lexicographic order.
    #[default]
    Byte,
    /// Byte order with the top bit of every byte ignored.
    Ascii,
    /// Order of little-endian UTF-16 code units; an odd trailing byte is ignored.
    Char,
}

impl BufferComparator {
    /// Compares two ranges.
    #[inline]
    #[must_use]
    pub fn compare(self, a: &[u8], b: &[u8]) -> Ordering {
        match self {
            Self::Byte => compare_masked(a, b, BYTE_MASK),
            Self::Ascii => compare_masked(a, b, ASCII_MASK),
            Self::Char => compare_code_units(a, b),
        }
    }

    /// Returns true if both ranges compare equal.
    #[inline]
    #[must_use]
    pub fn equals(self, a: &[u8], b: &[u8]) -> bool {
        self.compare(a, b) == Ordering::Equal
    }

    /// Binary search of `key` in `sorted`, which must be ordered by `self`.
    ///
    /// Returns `Ok(index)` on a hit and `Err(insertion_index)` on a miss,
    /// like [`slice::binary_search`].
    pub fn binary_search_by_key<T, F>(self, sorted: &[T], key: &[u8], bytes_of: F) -> Result<usize, usize>
    where
        F: Fn(&T) -> &[u8],
    {
        sorted.binary_search_by(|entry| self.compare(bytes_of(entry), key))
    }
}

#[inline]
fn compare_masked(a: &[u8], b: &[u8], mask: u8) -> Ordering {
    let len = a.len().min(b.len());
    for i in 0..len {
        let byte1 = a[i] & mask;
        let byte2 = b[i] & mask;
        if byte1 != byte2 {
            return byte1.cmp(&byte2);
        }
    }
    a.len().cmp(&b.len())
}

#[inline]
fn compare_code_units(a: &[u8], b: &[u8]) -> Ordering {
    let len1 = a.len() & !1;
    let len2 = b.len() & !1;
    let len = len1.min(len2);
    let mut i = 0;
    while i < len {
        let char1 = u16::from_le_bytes([a[i], a[i + 1]]);
        let char2 = u16::from_le_bytes([b[i], b[i + 1]]);
        if char1 != char2 {
            return char1.cmp(&char2);
        }
        i += 2;
    }
    len1.cmp(&len2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn utf16(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(u16::to_le_bytes).collect()
    }

    #[test]
    fn test_byte_order_is_unsigned() {
        let cmp = BufferComparator::Byte;
        assert_eq!(cmp.compare(&[0x01], &[0xFF]), Ordering::Less);
        assert_eq!(cmp.compare(&[0x80], &[0x7F]), Ordering::Greater);
        assert_eq!(cmp.compare(b"abc", b"abc"), Ordering::Equal);
    }

    #[test]
    fn test_shorter_prefix_sorts_first() {
        for cmp in [BufferComparator::Byte, BufferComparator::Ascii] {
            assert_eq!(cmp.compare(b"AUD", b"AUDUSD"), Ordering::Less);
            assert_eq!(cmp.compare(b"AUDUSD", b"AUD"), Ordering::Greater);
            assert_eq!(cmp.compare(b"", b"A"), Ordering::Less);
        }
        let cmp = BufferComparator::Char;
        assert_eq!(cmp.compare(&utf16("AU"), &utf16("AUD")), Ordering::Less);
    }

    #[test]
    fn test_ascii_ignores_high_bit() {
        let cmp = BufferComparator::Ascii;
        assert_eq!(cmp.compare(&[b'A' | 0x80], b"A"), Ordering::Equal);
        assert_eq!(cmp.compare(&[0xFF], &[0x7F]), Ordering::Equal);
        assert_eq!(BufferComparator::Byte.compare(&[0xFF], &[0x7F]), Ordering::Greater);
    }

    #[test]
    fn test_char_compares_code_units() {
        let cmp = BufferComparator::Char;
        assert_eq!(cmp.compare(&utf16("abc"), &utf16("abd")), Ordering::Less);
        // 0x0100 > 0x00FF as a code unit even though its low byte is smaller
        assert_eq!(cmp.compare(&[0x00, 0x01], &[0xFF, 0x00]), Ordering::Greater);
    }

    #[test]
    fn test_char_truncates_odd_length() {
        let cmp = BufferComparator::Char;
        let mut odd = utf16("ab");
        odd.push(0x7F);
        assert_eq!(cmp.compare(&odd, &utf16("ab")), Ordering::Equal);
        assert!(cmp.equals(&[0x41], &[]));
    }

    #[test]
    fn test_binary_search_by_key() {
        let names: Vec<&[u8]> = vec![b"ASK", b"BID", b"TRADE"];
        let cmp = BufferComparator::Ascii;
        assert_eq!(cmp.binary_search_by_key(&names, b"BID", |n| *n), Ok(1));
        assert_eq!(cmp.binary_search_by_key(&names, b"B", |n| *n), Err(1));
        assert_eq!(cmp.binary_search_by_key(&names, b"ZZZ", |n| *n), Err(3));
    }

    fn comparators() -> impl Strategy<Value = BufferComparator> {
        prop_oneof![
            Just(BufferComparator::Byte),
            Just(BufferComparator::Ascii),
            Just(BufferComparator::Char),
        ]
    }

    proptest! {
        #[test]
        fn test_comparator_is_antisymmetric(
            cmp in comparators(),
            a in proptest::collection::vec(any::<u8>(), 0..12),
            b in proptest::collection::vec(any::<u8>(), 0..12),
        ) {
            prop_assert_eq!(cmp.compare(&a, &b), cmp.compare(&b, &a).reverse());
            prop_assert_eq!(cmp.compare(&a, &a), Ordering::Equal);
        }

        #[test]
        fn test_comparator_is_transitive(
            cmp in comparators(),
            a in proptest::collection::vec(any::<u8>(), 0..6),
            b in proptest::collection::vec(any::<u8>(), 0..6),
            c in proptest::collection::vec(any::<u8>(), 0..6),
        ) {
            let mut sorted = [a, b, c];
            sorted.sort_by(|x, y| cmp.compare(x, y));
            prop_assert_ne!(cmp.compare(&sorted[0], &sorted[1]), Ordering::Greater);
            prop_assert_ne!(cmp.compare(&sorted[1], &sorted[2]), Ordering::Greater);
            prop_assert_ne!(cmp.compare(&sorted[0], &sorted[2]), Ordering::Greater);
        }

        #[test]
        fn test_byte_comparator_matches_slice_order(
            a in proptest::collection::vec(any::<u8>(), 0..12),
            b in proptest::collection::vec(any::<u8>(), 0..12),
        ) {
            prop_assert_eq!(BufferComparator::Byte.compare(&a, &b), a.cmp(&b));
        }
    }
}
