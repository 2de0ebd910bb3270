#![allow(unsafe_code)]

use super::{
    capacity_exceeded, check_range, grown_capacity, ByteBuf, Cursor, Region, RegionMut,
    MAX_CAPACITY,
};
use crate::{Error, ErrorKind, Result};
use std::{
    alloc::{self, Layout},
    fmt,
    ptr::{self, NonNull},
};

/// A buffer backed by a raw allocation outside of any Rust collection.
///
/// Exposes the address of its storage to foreign code, but no [`Segment`].
/// The address is stable until the buffer grows.
///
/// [`Segment`]: super::Segment
pub struct DirectBuf {
    ptr: NonNull<u8>,
    capacity: usize,
    cursor: Cursor,
    max_capacity: usize,
}

// The allocation is uniquely owned.
unsafe impl Send for DirectBuf {}
unsafe impl Sync for DirectBuf {}

impl DirectBuf {
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
    /// Panics if `capacity > max_capacity` or the allocation fails.
    pub fn with_max_capacity(capacity: usize, max_capacity: usize) -> Self {
        assert!(capacity <= max_capacity);
        let ptr = match allocate(capacity) {
            Ok(ptr) => ptr,
            Err(_) => alloc::handle_alloc_error(layout(capacity)),
        };
        Self {
            ptr,
            capacity,
            cursor: Cursor::default(),
            max_capacity,
        }
    }

    /// Creates a buffer holding a copy of `data`, all of it readable.
    pub fn from_slice(data: &[u8]) -> Self {
        let mut buf = Self::with_capacity(data.len());
        buf.as_mut_slice().copy_from_slice(data);
        buf.cursor = Cursor::new(0, data.len());
        buf
    }

    fn as_slice(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.capacity) }
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.capacity) }
    }

    fn grow(&mut self, capacity: usize) -> Result<()> {
        debug_assert!(capacity > self.capacity);
        if capacity > MAX_CAPACITY {
            return Err(exhausted(capacity));
        }
        let ptr = if self.capacity == 0 {
            allocate(capacity)?
        } else {
            let raw = unsafe { alloc::realloc(self.ptr.as_ptr(), layout(self.capacity), capacity) };
            let ptr = NonNull::new(raw).ok_or_else(|| exhausted(capacity))?;
            // Keep every byte below `capacity` initialized.
            unsafe {
                ptr::write_bytes(
                    ptr.as_ptr().add(self.capacity),
                    0,
                    capacity - self.capacity,
                )
            };
            ptr
        };
        self.ptr = ptr;
        self.capacity = capacity;
        Ok(())
    }
}

impl Default for DirectBuf {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DirectBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectBuf")
            .field("ptr", &self.ptr)
            .field("capacity", &self.capacity)
            .field("reader_index", &self.cursor.reader)
            .field("writer_index", &self.cursor.writer)
            .field("max_capacity", &self.max_capacity)
            .finish()
    }
}

impl Drop for DirectBuf {
    fn drop(&mut self) {
        if self.capacity > 0 {
            unsafe { alloc::dealloc(self.ptr.as_ptr(), layout(self.capacity)) };
        }
    }
}

impl ByteBuf for DirectBuf {
    fn reader_index(&self) -> usize {
        self.cursor.reader
    }

    fn writer_index(&self) -> usize {
        self.cursor.writer
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    fn set_reader_index(&mut self, index: usize) -> Result<()> {
        self.cursor.set_reader(index)
    }

    fn set_writer_index(&mut self, index: usize) -> Result<()> {
        self.cursor.set_writer(index, self.capacity)
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
        self.grow(grown_capacity(
            self.capacity,
            self.cursor.writer + additional,
            self.max_capacity,
        ))
    }

    fn get_bytes(&self, index: usize, dst: &mut [u8]) -> Result<()> {
        check_range(index, dst.len(), self.capacity)?;
        dst.copy_from_slice(&self.as_slice()[index..index + dst.len()]);
        Ok(())
    }

    fn set_bytes(&mut self, index: usize, src: &[u8]) -> Result<()> {
        check_range(index, src.len(), self.capacity)?;
        self.as_mut_slice()[index..index + src.len()].copy_from_slice(src);
        Ok(())
    }

    fn address(&self) -> Option<Region<'_>> {
        // Valid, initialized and unmoved while `self` is borrowed.
        Some(unsafe { Region::from_raw_parts(self.ptr, self.capacity) })
    }

    fn address_mut(&mut self) -> Option<RegionMut<'_>> {
        Some(unsafe { RegionMut::from_raw_parts(self.ptr, self.capacity) })
    }
}

fn layout(size: usize) -> Layout {
    Layout::array::<u8>(size).unwrap_or_else(|_| Layout::new::<u8>())
}

fn allocate(size: usize) -> Result<NonNull<u8>> {
    if size == 0 {
        return Ok(NonNull::dangling());
    }
    if size > MAX_CAPACITY {
        return Err(exhausted(size));
    }
    let raw = unsafe { alloc::alloc_zeroed(layout(size)) };
    NonNull::new(raw).ok_or_else(|| exhausted(size))
}

fn exhausted(size: usize) -> Error {
    Error::new(
        ErrorKind::ResourceExhausted,
        format!("failed to allocate {} bytes", size),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities() {
        let buf = DirectBuf::with_capacity(16);
        assert!(!buf.has_segment());
        assert!(buf.has_address());
        assert_eq!(buf.address().unwrap().len(), 16);
    }

    #[test]
    fn grows_and_keeps_contents() {
        let mut buf = DirectBuf::from_slice(b"Hello");
        buf.write_bytes(&[b'!'; 100]).unwrap();
        assert!(buf.capacity() >= 105);
        let vec = buf.to_vec();
        assert_eq!(&vec[..5], b"Hello");
        assert_eq!(vec.len(), 105);
    }

    #[test]
    fn empty_buffer_grows() {
        let mut buf = DirectBuf::new();
        assert_eq!(buf.capacity(), 0);
        buf.write_bytes(b"x").unwrap();
        assert_eq!(buf.to_vec(), b"x");
    }

    #[test]
    fn writes_through_address() {
        let mut buf = DirectBuf::with_capacity(4);
        let region = buf.address_mut().unwrap();
        region.into_slice().copy_from_slice(b"abcd");
        buf.advance_writer(4).unwrap();
        assert_eq!(buf.to_vec(), b"abcd");
    }

    #[test]
    fn bounded_growth() {
        let mut buf = DirectBuf::with_max_capacity(0, 15);
        assert_eq!(
            buf.ensure_writable(16).unwrap_err().kind(),
            ErrorKind::CapacityExceeded
        );
        buf.ensure_writable(15).unwrap();
        assert_eq!(buf.capacity(), 15);
    }
}
