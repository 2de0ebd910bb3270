//! Byte buffers with reader/writer cursors and probeable storage capabilities.
mod composite;
mod direct;
mod heap;
mod region;
mod slice;

pub use composite::CompositeBuf;
pub use direct::DirectBuf;
pub use heap::HeapBuf;
pub use region::{Region, RegionMut};
pub use slice::SliceBuf;

use crate::{Error, ErrorKind, Result};

/// Upper bound for the `max_capacity` of the provided buffers.
pub(crate) const MAX_CAPACITY: usize = isize::MAX as usize;

/// A growable byte buffer with separate reader and writer cursors.
///
/// Indices satisfy `reader_index <= writer_index <= capacity <= max_capacity`.
/// Bytes in `reader_index..writer_index` are readable, bytes in
/// `writer_index..capacity` are writable.
///
/// Besides the cursor API a buffer may expose one or both zero-copy paths into
/// its storage:
///
/// - [`segment`]: a contiguous slice covering indices `0..capacity`.
/// - [`address`]: a raw memory address covering indices `0..capacity`.
///
/// Both are probed on every use, since growing a buffer may move its storage.
///
/// [`segment`]: ByteBuf::segment
/// [`address`]: ByteBuf::address
pub trait ByteBuf {
    fn reader_index(&self) -> usize;

    fn writer_index(&self) -> usize;

    fn capacity(&self) -> usize;

    fn max_capacity(&self) -> usize;

    /// Moves the reader cursor. Fails if `index > writer_index`.
    fn set_reader_index(&mut self, index: usize) -> Result<()>;

    /// Moves the writer cursor. Fails unless `reader_index <= index <= capacity`.
    fn set_writer_index(&mut self, index: usize) -> Result<()>;

    /// Grows the buffer so that at least `additional` bytes are writable.
    fn ensure_writable(&mut self, additional: usize) -> Result<()>;

    /// Copies `dst.len()` bytes starting at `index` into `dst` without moving any cursor.
    fn get_bytes(&self, index: usize, dst: &mut [u8]) -> Result<()>;

    /// Copies `src` into the buffer starting at `index` without moving any cursor.
    fn set_bytes(&mut self, index: usize, src: &[u8]) -> Result<()>;

    /// Returns the contiguous storage, if the buffer has one.
    fn segment(&self) -> Option<Segment<'_>> {
        None
    }

    fn segment_mut(&mut self) -> Option<SegmentMut<'_>> {
        None
    }

    /// Returns the raw address of the storage, if the buffer has a stable one.
    fn address(&self) -> Option<Region<'_>> {
        None
    }

    fn address_mut(&mut self) -> Option<RegionMut<'_>> {
        None
    }

    fn has_segment(&self) -> bool {
        self.segment().is_some()
    }

    fn has_address(&self) -> bool {
        self.address().is_some()
    }

    fn readable_bytes(&self) -> usize {
        self.writer_index() - self.reader_index()
    }

    fn writable_bytes(&self) -> usize {
        self.capacity() - self.writer_index()
    }

    fn max_writable_bytes(&self) -> usize {
        self.max_capacity() - self.writer_index()
    }

    fn is_readable(&self) -> bool {
        self.readable_bytes() > 0
    }

    fn is_writable(&self) -> bool {
        self.writable_bytes() > 0
    }

    fn advance_reader(&mut self, len: usize) -> Result<()> {
        let index = checked_end(self.reader_index(), len)?;
        self.set_reader_index(index)
    }

    fn advance_writer(&mut self, len: usize) -> Result<()> {
        let index = checked_end(self.writer_index(), len)?;
        self.set_writer_index(index)
    }

    /// Appends `src`, growing the buffer if needed.
    fn write_bytes(&mut self, src: &[u8]) -> Result<()> {
        self.ensure_writable(src.len())?;
        self.set_bytes(self.writer_index(), src)?;
        self.advance_writer(src.len())
    }

    /// Fills `dst` from the readable bytes and consumes them.
    fn read_bytes(&mut self, dst: &mut [u8]) -> Result<()> {
        if dst.len() > self.readable_bytes() {
            return Err(out_of_bounds(self.reader_index(), dst.len(), self.writer_index()));
        }
        self.get_bytes(self.reader_index(), dst)?;
        self.advance_reader(dst.len())
    }

    /// Copies the readable bytes into a new `Vec` without consuming them.
    fn to_vec(&self) -> Vec<u8> {
        let mut vec = vec![0; self.readable_bytes()];
        // In range by construction.
        let _ = self.get_bytes(self.reader_index(), &mut vec);
        vec
    }

    /// Resets both cursors to zero.
    fn clear(&mut self) {
        let _ = self.set_reader_index(0);
        let _ = self.set_writer_index(0);
    }
}

/// A contiguous view of a buffer's storage.
///
/// Buffer index `i` lives at `array()[offset() + i]`.
#[derive(Debug, Copy, Clone)]
pub struct Segment<'a> {
    array: &'a [u8],
    offset: usize,
}

impl<'a> Segment<'a> {
    /// Panics if `offset > array.len()`.
    pub fn new(array: &'a [u8], offset: usize) -> Self {
        assert!(offset <= array.len());
        Self { array, offset }
    }

    pub fn array(&self) -> &'a [u8] {
        self.array
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.array.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The storage starting at buffer index 0.
    pub fn as_slice(&self) -> &'a [u8] {
        &self.array[self.offset..]
    }
}

/// A mutable contiguous view of a buffer's storage.
#[derive(Debug)]
pub struct SegmentMut<'a> {
    array: &'a mut [u8],
    offset: usize,
}

impl<'a> SegmentMut<'a> {
    /// Panics if `offset > array.len()`.
    pub fn new(array: &'a mut [u8], offset: usize) -> Self {
        assert!(offset <= array.len());
        Self { array, offset }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.array.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The storage starting at buffer index 0.
    pub fn into_slice(self) -> &'a mut [u8] {
        &mut self.array[self.offset..]
    }
}

/// Reader/writer cursor pair shared by the provided buffers.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Cursor {
    pub reader: usize,
    pub writer: usize,
}

impl Cursor {
    pub fn new(reader: usize, writer: usize) -> Self {
        debug_assert!(reader <= writer);
        Self { reader, writer }
    }

    pub fn set_reader(&mut self, index: usize) -> Result<()> {
        if index > self.writer {
            return Err(Error::new(
                ErrorKind::IndexOutOfBounds,
                format!("reader index {} exceeds writer index {}", index, self.writer),
            ));
        }
        self.reader = index;
        Ok(())
    }

    pub fn set_writer(&mut self, index: usize, capacity: usize) -> Result<()> {
        if index < self.reader || index > capacity {
            return Err(Error::new(
                ErrorKind::IndexOutOfBounds,
                format!(
                    "writer index {} outside {}..={}",
                    index, self.reader, capacity
                ),
            ));
        }
        self.writer = index;
        Ok(())
    }
}

/// Checks that `index..index + len` fits in `0..limit`.
pub(crate) fn check_range(index: usize, len: usize, limit: usize) -> Result<()> {
    match index.checked_add(len) {
        Some(end) if end <= limit => Ok(()),
        _ => Err(out_of_bounds(index, len, limit)),
    }
}

/// Capacity to grow to so that `required` bytes fit: doubling from 64 bytes,
/// clamped to `max_capacity`.
pub(crate) fn grown_capacity(current: usize, required: usize, max_capacity: usize) -> usize {
    let doubled = current.saturating_mul(2).max(64);
    doubled.max(required).min(max_capacity)
}

pub(crate) fn capacity_exceeded(writer: usize, additional: usize, max_capacity: usize) -> Error {
    Error::new(
        ErrorKind::CapacityExceeded,
        format!(
            "writer index {} + {} bytes exceeds max capacity {}",
            writer, additional, max_capacity
        ),
    )
}

fn checked_end(index: usize, len: usize) -> Result<usize> {
    index
        .checked_add(len)
        .ok_or_else(|| out_of_bounds(index, len, usize::MAX))
}

fn out_of_bounds(index: usize, len: usize, limit: usize) -> Error {
    Error::new(
        ErrorKind::IndexOutOfBounds,
        format!("range {}+{} exceeds {}", index, len, limit),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_bounds() {
        let mut cursor = Cursor::new(0, 0);
        assert_eq!(
            cursor.set_reader(1).unwrap_err().kind(),
            ErrorKind::IndexOutOfBounds
        );
        cursor.set_writer(8, 8).unwrap();
        cursor.set_reader(4).unwrap();
        assert!(cursor.set_writer(3, 8).is_err());
        assert!(cursor.set_writer(9, 8).is_err());
        assert_eq!(cursor, Cursor::new(4, 8));
    }

    #[test]
    fn growth_policy() {
        assert_eq!(grown_capacity(0, 1, MAX_CAPACITY), 64);
        assert_eq!(grown_capacity(64, 65, MAX_CAPACITY), 128);
        assert_eq!(grown_capacity(64, 1000, MAX_CAPACITY), 1000);
        assert_eq!(grown_capacity(64, 100, 100), 100);
    }

    #[test]
    fn range_check() {
        assert!(check_range(2, 2, 4).is_ok());
        assert!(check_range(3, 2, 4).is_err());
        assert!(check_range(usize::MAX, 2, usize::MAX).is_err());
    }
}
