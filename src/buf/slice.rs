use super::{check_range, ByteBuf, Cursor, Region, Segment};
use crate::{Error, ErrorKind, Result};

/// A read-only buffer over a borrowed slice.
///
/// All of the slice is readable. A borrowed slice neither moves nor changes
/// for `'a`, so it exposes both a segment and an address.
#[derive(Debug, Copy, Clone)]
pub struct SliceBuf<'a> {
    data: &'a [u8],
    cursor: Cursor,
}

impl<'a> SliceBuf<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            cursor: Cursor::new(0, data.len()),
        }
    }

    /// The bytes not consumed yet.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.cursor.reader..]
    }
}

impl<'a> From<&'a [u8]> for SliceBuf<'a> {
    fn from(v: &'a [u8]) -> Self {
        Self::new(v)
    }
}

impl ByteBuf for SliceBuf<'_> {
    fn reader_index(&self) -> usize {
        self.cursor.reader
    }

    fn writer_index(&self) -> usize {
        self.cursor.writer
    }

    fn capacity(&self) -> usize {
        self.data.len()
    }

    fn max_capacity(&self) -> usize {
        self.data.len()
    }

    fn set_reader_index(&mut self, index: usize) -> Result<()> {
        self.cursor.set_reader(index)
    }

    fn set_writer_index(&mut self, index: usize) -> Result<()> {
        if index != self.cursor.writer {
            return Err(read_only());
        }
        Ok(())
    }

    fn ensure_writable(&mut self, additional: usize) -> Result<()> {
        if additional == 0 {
            Ok(())
        } else {
            Err(read_only())
        }
    }

    fn get_bytes(&self, index: usize, dst: &mut [u8]) -> Result<()> {
        check_range(index, dst.len(), self.data.len())?;
        dst.copy_from_slice(&self.data[index..index + dst.len()]);
        Ok(())
    }

    fn set_bytes(&mut self, _index: usize, _src: &[u8]) -> Result<()> {
        Err(read_only())
    }

    fn segment(&self) -> Option<Segment<'_>> {
        Some(Segment::new(self.data, 0))
    }

    fn address(&self) -> Option<Region<'_>> {
        Some(Region::from(self.data))
    }
}

fn read_only() -> Error {
    Error::new(ErrorKind::ReadOnly, "slice buffers cannot be written")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_and_rejects_writes() {
        let mut buf = SliceBuf::new(b"abcdef");
        assert!(buf.has_segment() && buf.has_address());
        let mut dst = [0; 2];
        buf.read_bytes(&mut dst).unwrap();
        assert_eq!(&dst, b"ab");
        assert_eq!(buf.remaining(), b"cdef");
        assert_eq!(buf.write_bytes(b"x").unwrap_err().kind(), ErrorKind::ReadOnly);
        assert_eq!(buf.max_writable_bytes(), 0);
    }
}
