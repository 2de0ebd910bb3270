use super::{capacity_exceeded, check_range, ByteBuf, Cursor, MAX_CAPACITY};
use crate::Result;
use bytes::BytesMut;

const DEFAULT_COMPONENT_SIZE: usize = 256;

/// A buffer made of fixed-size [`BytesMut`] components.
///
/// Its storage is neither contiguous nor addressable as a whole, so every
/// backend has to stage it through scratch regions.
#[derive(Debug, Clone)]
pub struct CompositeBuf {
    components: Vec<BytesMut>,
    component_size: usize,
    cursor: Cursor,
    max_capacity: usize,
}

impl CompositeBuf {
    /// Creates an empty buffer that can grow without limit.
    pub fn new() -> Self {
        Self::with_component_size(DEFAULT_COMPONENT_SIZE, MAX_CAPACITY)
    }

    /// Creates an empty buffer with the given component size and maximum capacity.
    ///
    /// # Panics
    ///
    /// Panics if `component_size` is zero.
    pub fn with_component_size(component_size: usize, max_capacity: usize) -> Self {
        assert!(component_size > 0);
        Self {
            components: Vec::new(),
            component_size,
            cursor: Cursor::default(),
            max_capacity,
        }
    }

    /// Creates a buffer holding a copy of `data`, all of it readable.
    pub fn from_slice(data: &[u8], component_size: usize) -> Self {
        let mut buf = Self::with_component_size(component_size, MAX_CAPACITY);
        // Unbounded, so this only fails on allocation failure, which aborts anyway.
        let _ = buf.write_bytes(data);
        buf
    }

    /// Number of components currently allocated.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Visits the components overlapping `index..index + len` as `(component,
    /// start, end, offset)`, where `offset` counts the bytes visited so far.
    fn for_each_span<F>(&self, index: usize, len: usize, mut f: F)
    where
        F: FnMut(usize, usize, usize, usize),
    {
        let mut done = 0;
        while done < len {
            let pos = index + done;
            let component = pos / self.component_size;
            let start = pos % self.component_size;
            let end = (start + len - done).min(self.component_size);
            f(component, start, end, done);
            done += end - start;
        }
    }
}

impl Default for CompositeBuf {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteBuf for CompositeBuf {
    fn reader_index(&self) -> usize {
        self.cursor.reader
    }

    fn writer_index(&self) -> usize {
        self.cursor.writer
    }

    fn capacity(&self) -> usize {
        (self.components.len() * self.component_size).min(self.max_capacity)
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
        while self.capacity() < self.cursor.writer + additional {
            let mut component = BytesMut::with_capacity(self.component_size);
            component.resize(self.component_size, 0);
            self.components.push(component);
        }
        Ok(())
    }

    fn get_bytes(&self, index: usize, dst: &mut [u8]) -> Result<()> {
        check_range(index, dst.len(), self.capacity())?;
        self.for_each_span(index, dst.len(), |component, start, end, offset| {
            dst[offset..offset + end - start]
                .copy_from_slice(&self.components[component][start..end]);
        });
        Ok(())
    }

    fn set_bytes(&mut self, index: usize, src: &[u8]) -> Result<()> {
        check_range(index, src.len(), self.capacity())?;
        let mut spans = Vec::new();
        self.for_each_span(index, src.len(), |component, start, end, offset| {
            spans.push((component, start, end, offset));
        });
        for (component, start, end, offset) in spans {
            self.components[component][start..end]
                .copy_from_slice(&src[offset..offset + end - start]);
        }
        Ok(())
    }
}
