#![allow(unsafe_code)]

use std::{marker::PhantomData, ops::Range, ptr::NonNull, slice};

/// A raw, read-only memory region borrowed for `'a`.
///
/// The address stays valid and unmoved for `'a`, and nothing writes to it
/// during that time. These are the only guarantees the native backend relies on
/// when handing the address across the FFI boundary.
#[derive(Debug, Copy, Clone)]
pub struct Region<'a> {
    ptr: NonNull<u8>,
    len: usize,
    _marker: PhantomData<&'a [u8]>,
}

impl<'a> Region<'a> {
    /// Creates a region from a raw address.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads of `len` bytes for the whole lifetime `'a`,
    /// the bytes must be initialized, and the memory must not be mutated or
    /// moved while the region is alive.
    pub unsafe fn from_raw_parts(ptr: NonNull<u8>, len: usize) -> Self {
        Self {
            ptr,
            len,
            _marker: PhantomData,
        }
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the sub-region `range`, or `None` if it is out of bounds.
    pub fn get(self, range: Range<usize>) -> Option<Region<'a>> {
        if range.start > range.end || range.end > self.len {
            return None;
        }
        // In bounds of the original region, so the same guarantees hold.
        let ptr = unsafe { NonNull::new_unchecked(self.ptr.as_ptr().add(range.start)) };
        Some(unsafe { Self::from_raw_parts(ptr, range.end - range.start) })
    }

    pub fn as_slice(&self) -> &'a [u8] {
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<'a> From<&'a [u8]> for Region<'a> {
    fn from(v: &'a [u8]) -> Self {
        let ptr = NonNull::new(v.as_ptr() as *mut u8).unwrap_or_else(NonNull::dangling);
        unsafe { Self::from_raw_parts(ptr, v.len()) }
    }
}

/// A raw, writable memory region exclusively borrowed for `'a`.
#[derive(Debug)]
pub struct RegionMut<'a> {
    ptr: NonNull<u8>,
    len: usize,
    _marker: PhantomData<&'a mut [u8]>,
}

impl<'a> RegionMut<'a> {
    /// Creates a writable region from a raw address.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads and writes of `len` initialized bytes for
    /// the whole lifetime `'a`, no other reference may access the memory during
    /// that time, and the memory must not move.
    pub unsafe fn from_raw_parts(ptr: NonNull<u8>, len: usize) -> Self {
        Self {
            ptr,
            len,
            _marker: PhantomData,
        }
    }

    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the sub-region `range`, or `None` if it is out of bounds.
    pub fn get(self, range: Range<usize>) -> Option<RegionMut<'a>> {
        if range.start > range.end || range.end > self.len {
            return None;
        }
        let ptr = unsafe { NonNull::new_unchecked(self.ptr.as_ptr().add(range.start)) };
        Some(unsafe { Self::from_raw_parts(ptr, range.end - range.start) })
    }

    pub fn into_slice(self) -> &'a mut [u8] {
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<'a> From<&'a mut [u8]> for RegionMut<'a> {
    fn from(v: &'a mut [u8]) -> Self {
        let ptr = NonNull::new(v.as_mut_ptr()).unwrap_or_else(NonNull::dangling);
        unsafe { Self::from_raw_parts(ptr, v.len()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_regions() {
        let data = [1u8, 2, 3, 4, 5];
        let region = Region::from(&data[..]);
        assert_eq!(region.get(1..4).unwrap().as_slice(), &[2, 3, 4]);
        assert_eq!(region.get(5..5).unwrap().len(), 0);
        assert!(region.get(2..6).is_none());
    }

    #[test]
    fn writable_sub_region() {
        let mut data = [0u8; 4];
        let region = RegionMut::from(&mut data[..]);
        region.get(2..4).unwrap().into_slice().copy_from_slice(&[7, 8]);
        assert_eq!(data, [0, 0, 7, 8]);
    }

    #[test]
    fn empty_slice_has_non_null_address() {
        let region = Region::from(&[0u8; 0][..]);
        assert!(region.is_empty());
        assert!(!region.as_ptr().is_null());
    }
}
