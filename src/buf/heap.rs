use super::{
    capacity_exceeded, check_range, grown_capacity, ByteBuf, Cursor, Segment, SegmentMut,
    MAX_CAPACITY,
};
use crate::{Error, ErrorKind, Result};
use std::ops::Range;

/// A `Vec<u8>`-backed buffer.
///
/// Exposes its storage as a contiguous [`Segment`] but no raw address, since the
/// vector may relocate whenever it grows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapBuf {
    data: Vec<u8>,
    base: usize,
    cursor: Cursor,
    max_capacity: usize,
}

impl HeapBuf {
    /// Creates an empty buffer that can grow without limit.
    pub fn new() -> Self {
        Self::with_max_capacity(0, MAX_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_max_capacity(capacity, MAX_CAPACITY)
    }

    /// Creates an empty buffer which never grows past `max_capacity`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity > max_capacity`.
    pub fn with_max_capacity(capacity: usize, max_capacity: usize) -> Self {
        assert!(capacity <= max_capacity);
        Self {
            data: vec![0; capacity],
            base: 0,
            cursor: Cursor::default(),
            max_capacity,
        }
    }

    /// Wraps `data`; all of it is readable.
    pub fn wrap(data: Vec<u8>) -> Self {
        let len = data.len();
        Self {
            data,
            base: 0,
            cursor: Cursor::new(0, len),
            max_capacity: MAX_CAPACITY.max(len),
        }
    }

    /// Wraps the `range` of `data`; buffer index 0 maps to `data[range.start]`.
    ///
    /// Bytes after `range.end` are discarded.
    ///
    /// # Panics
    ///
    /// Panics if `range` is out of bounds.
    pub fn wrap_range(mut data: Vec<u8>, range: Range<usize>) -> Self {
        assert!(range.start <= range.end && range.end <= data.len());
        data.truncate(range.end);
        Self {
            data,
            base: range.start,
            cursor: Cursor::new(0, range.end - range.start),
            max_capacity: MAX_CAPACITY,
        }
    }

    /// The readable bytes.
    pub fn readable(&self) -> &[u8] {
        &self.data[self.base + self.cursor.reader..self.base + self.cursor.writer]
    }

    /// Consumes the buffer, returning the readable bytes.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.data.truncate(self.base + self.cursor.writer);
        self.data.drain(..self.base + self.cursor.reader);
        self.data
    }
}

impl Default for HeapBuf {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<u8>> for HeapBuf {
    fn from(v: Vec<u8>) -> Self {
        Self::wrap(v)
    }
}

impl From<&[u8]> for HeapBuf {
    fn from(v: &[u8]) -> Self {
        Self::wrap(v.to_vec())
    }
}

impl ByteBuf for HeapBuf {
    fn reader_index(&self) -> usize {
        self.cursor.reader
    }

    fn writer_index(&self) -> usize {
        self.cursor.writer
    }

    fn capacity(&self) -> usize {
        self.data.len() - self.base
    }

    fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    fn set_reader_index(&mut self, index: usize) -> Result<()> {
        self.cursor.set_reader(index)
    }

    fn set_writer_index(&mut self, index: usize) -> Result<()> {
        let capacity = self.capacity();
        self.cursor.set_writer(index, capacity)
    }

    fn ensure_writable(&mut self, additional: usize) -> Result<()> {
        if additional <= self.writable_bytes() {
            return Ok(());
        }
        if additional > self.max_writable_bytes() {
            return Err(capacity_exceeded(
                self.cursor.writer,
                additional,
                self.max_capacity,
            ));
        }
        let capacity = grown_capacity(
            self.capacity(),
            self.cursor.writer + additional,
            self.max_capacity,
        );
        let len = self.base + capacity;
        self.data
            .try_reserve_exact(len - self.data.len())
            .map_err(|err| Error::new(ErrorKind::ResourceExhausted, err.to_string()))?;
        self.data.resize(len, 0);
        Ok(())
    }

    fn get_bytes(&self, index: usize, dst: &mut [u8]) -> Result<()> {
        check_range(index, dst.len(), self.capacity())?;
        let start = self.base + index;
        dst.copy_from_slice(&self.data[start..start + dst.len()]);
        Ok(())
    }

    fn set_bytes(&mut self, index: usize, src: &[u8]) -> Result<()> {
        check_range(index, src.len(), self.capacity())?;
        let start = self.base + index;
        self.data[start..start + src.len()].copy_from_slice(src);
        Ok(())
    }

    fn segment(&self) -> Option<Segment<'_>> {
        Some(Segment::new(&self.data, self.base))
    }

    fn segment_mut(&mut self) -> Option<SegmentMut<'_>> {
        Some(SegmentMut::new(&mut self.data, self.base))
    }
}
