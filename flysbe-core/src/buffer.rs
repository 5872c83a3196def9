//! Buffer traits for zero-copy field access.
//!
//! This module provides:
//! - [`ReadBuffer`] trait for read-only access to an externally owned region
//! - [`WriteBuffer`] trait for read-write access
//! - [`AlignedBuffer`] for cache-line aligned scratch regions
//!
//! Flyweights never own or resize the region they view. All offsets are
//! caller or protocol computed; the `check_*` helpers turn an out-of-range
//! access into [`Error::BufferTooShort`] before anything is read or written.

use crate::error::{Error, Result};
use bytes::{Bytes, BytesMut};

/// Read-only view over an externally owned byte region.
///
/// All multi-byte reads are little-endian.
pub trait ReadBuffer {
    /// Returns the buffer as a byte slice.
    fn as_slice(&self) -> &[u8];

    /// Returns the capacity of the region in bytes.
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Returns true if the region is empty.
    #[must_use]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Verifies that `len` bytes starting at `offset` lie inside the region.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if the range does not fit.
    #[inline]
    fn check_range(&self, offset: usize, len: usize) -> Result<()> {
        check_range(self.len(), offset, len)
    }

    /// Reads a u16 in little-endian at the given offset.
    ///
    /// This is also the read for one UTF-16 code unit.
    #[inline(always)]
    fn get_u16_le(&self, offset: usize) -> u16 {
        let bytes = &self.as_slice()[offset..offset + 2];
        u16::from_le_bytes([bytes[0], bytes[1]])
    }

    /// Reads a u32 in little-endian at the given offset.
    #[inline(always)]
    fn get_u32_le(&self, offset: usize) -> u32 {
        let bytes = &self.as_slice()[offset..offset + 4];
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Reads a u64 in little-endian at the given offset.
    #[inline(always)]
    fn get_u64_le(&self, offset: usize) -> u64 {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.as_slice()[offset..offset + 8]);
        u64::from_le_bytes(bytes)
    }

    /// Reads an i64 in little-endian at the given offset.
    #[inline(always)]
    fn get_i64_le(&self, offset: usize) -> i64 {
        self.get_u64_le(offset) as i64
    }

    /// Reads an f64 in little-endian at the given offset.
    #[inline(always)]
    fn get_f64_le(&self, offset: usize) -> f64 {
        f64::from_bits(self.get_u64_le(offset))
    }

    /// Returns a slice of bytes at the given offset and length.
    #[inline(always)]
    fn get_bytes(&self, offset: usize, len: usize) -> &[u8] {
        &self.as_slice()[offset..offset + len]
    }

    /// Bounds-checked variant of [`ReadBuffer::get_bytes`].
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if the range does not fit.
    #[inline]
    fn try_get_bytes(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.check_range(offset, len)?;
        Ok(self.get_bytes(offset, len))
    }
}

/// Read-write view over an externally owned byte region.
///
/// All multi-byte writes are little-endian.
pub trait WriteBuffer: ReadBuffer {
    /// Returns the buffer as a mutable byte slice.
    fn as_mut_slice(&mut self) -> &mut [u8];

    /// Writes a u16 in little-endian at the given offset.
    #[inline(always)]
    fn put_u16_le(&mut self, offset: usize, value: u16) {
        self.as_mut_slice()[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
    }

    /// Writes a u32 in little-endian at the given offset.
    #[inline(always)]
    fn put_u32_le(&mut self, offset: usize, value: u32) {
        self.as_mut_slice()[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    /// Writes a u64 in little-endian at the given offset.
    #[inline(always)]
    fn put_u64_le(&mut self, offset: usize, value: u64) {
        self.as_mut_slice()[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
    }

    /// Writes an i64 in little-endian at the given offset.
    #[inline(always)]
    fn put_i64_le(&mut self, offset: usize, value: i64) {
        self.put_u64_le(offset, value as u64);
    }

    /// Writes an f64 in little-endian at the given offset.
    #[inline(always)]
    fn put_f64_le(&mut self, offset: usize, value: f64) {
        self.put_u64_le(offset, value.to_bits());
    }
}

/// Checks that `offset..offset + len` fits in a region of `capacity` bytes.
///
/// # Errors
/// Returns [`Error::BufferTooShort`] if it does not.
#[inline]
pub fn check_range(capacity: usize, offset: usize, len: usize) -> Result<()> {
    match offset.checked_add(len) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(Error::BufferTooShort {
            required: offset.saturating_add(len),
            available: capacity,
        }),
    }
}

impl ReadBuffer for [u8] {
    #[inline(always)]
    fn as_slice(&self) -> &[u8] {
        self
    }
}

impl WriteBuffer for [u8] {
    #[inline(always)]
    fn as_mut_slice(&mut self) -> &mut [u8] {
        self
    }
}

impl ReadBuffer for Vec<u8> {
    #[inline(always)]
    fn as_slice(&self) -> &[u8] {
        self
    }
}

impl WriteBuffer for Vec<u8> {
    #[inline(always)]
    fn as_mut_slice(&mut self) -> &mut [u8] {
        self
    }
}

impl ReadBuffer for Bytes {
    #[inline(always)]
    fn as_slice(&self) -> &[u8] {
        self
    }
}

impl ReadBuffer for BytesMut {
    #[inline(always)]
    fn as_slice(&self) -> &[u8] {
        self
    }
}

impl WriteBuffer for BytesMut {
    #[inline(always)]
    fn as_mut_slice(&mut self) -> &mut [u8] {
        self
    }
}

/// Cache-line aligned scratch region.
///
/// # Type Parameters
/// * `N` - Buffer size in bytes
#[repr(C, align(64))]
#[derive(Clone)]
pub struct AlignedBuffer<const N: usize> {
    data: [u8; N],
}

impl<const N: usize> AlignedBuffer<N> {
    /// Creates a new zeroed aligned buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self { data: [0u8; N] }
    }

    /// Returns the capacity of the buffer in bytes.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for AlignedBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ReadBuffer for AlignedBuffer<N> {
    #[inline(always)]
    fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl<const N: usize> WriteBuffer for AlignedBuffer<N> {
    #[inline(always)]
    fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl<const N: usize> AsRef<[u8]> for AlignedBuffer<N> {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl<const N: usize> AsMut<[u8]> for AlignedBuffer<N> {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl<const N: usize> std::fmt::Debug for AlignedBuffer<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("capacity", &N)
            .finish()
    }
}
