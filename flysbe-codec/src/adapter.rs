//! Element readers and writers for the streaming copy paths.
//!
//! Any closure or function with the right shape is an adapter, so the
//! built-ins below are plain functions.

/// Pulls one byte out of a source at an index.
pub trait ByteReader<S: ?Sized> {
    /// Returns the byte at `index`.
    fn read(&self, src: &S, index: usize) -> u8;
}

impl<S: ?Sized, F> ByteReader<S> for F
where
    F: Fn(&S, usize) -> u8,
{
    #[inline]
    fn read(&self, src: &S, index: usize) -> u8 {
        self(src, index)
    }
}

/// Pulls one char out of a source at an index.
pub trait CharReader<S: ?Sized> {
    /// Returns the char at `index`.
    fn read(&self, src: &S, index: usize) -> char;
}

impl<S: ?Sized, F> CharReader<S> for F
where
    F: Fn(&S, usize) -> char,
{
    #[inline]
    fn read(&self, src: &S, index: usize) -> char {
        self(src, index)
    }
}

/// Pushes one byte into a destination.
///
/// `end` is one past the last index the current copy will write.
pub trait ByteWriter<D: ?Sized> {
    /// Stores `byte` at `index`.
    fn write(&self, dst: &mut D, index: usize, end: usize, byte: u8);
}

impl<D: ?Sized, F> ByteWriter<D> for F
where
    F: Fn(&mut D, usize, usize, u8),
{
    #[inline]
    fn write(&self, dst: &mut D, index: usize, end: usize, byte: u8) {
        self(dst, index, end, byte);
    }
}

/// Pushes one char into a destination.
pub trait CharWriter<D: ?Sized> {
    /// Stores `ch` at `index`.
    fn write(&self, dst: &mut D, index: usize, end: usize, ch: char);
}

impl<D: ?Sized, F> CharWriter<D> for F
where
    F: Fn(&mut D, usize, usize, char),
{
    #[inline]
    fn write(&self, dst: &mut D, index: usize, end: usize, ch: char) {
        self(dst, index, end, ch);
    }
}

/// Reads a byte from a slice. Panics if `index` is out of bounds.
#[inline]
pub fn byte_from_slice(src: &[u8], index: usize) -> u8 {
    src[index]
}

/// Reads a char from a char slice.
#[inline]
pub fn char_from_slice(src: &[char], index: usize) -> char {
    src[index]
}

/// Reads a byte from a slice as a Latin-1 char.
#[inline]
pub fn char_from_bytes(src: &[u8], index: usize) -> char {
    src[index] as char
}

/// Writes a byte into a slice. Panics if `index` is out of bounds.
#[inline]
pub fn byte_to_slice(dst: &mut [u8], index: usize, _end: usize, byte: u8) {
    dst[index] = byte;
}

/// Writes a byte into a vector, growing it to `end` first.
#[inline]
pub fn byte_to_vec(dst: &mut Vec<u8>, index: usize, end: usize, byte: u8) {
    if dst.len() < end {
        dst.resize(end, 0);
    }
    dst[index] = byte;
}

/// Writes a char into a char slice.
#[inline]
pub fn char_to_slice(dst: &mut [char], index: usize, _end: usize, ch: char) {
    dst[index] = ch;
}

/// Writes a char into a char vector, growing it to `end` first.
#[inline]
pub fn char_to_vec(dst: &mut Vec<char>, index: usize, end: usize, ch: char) {
    if dst.len() < end {
        dst.resize(end, '\0');
    }
    dst[index] = ch;
}

/// Appends a char to a string; the index is ignored.
#[inline]
pub fn char_to_string(dst: &mut String, _index: usize, _end: usize, ch: char) {
    dst.push(ch);
}
