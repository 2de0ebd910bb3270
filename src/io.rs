//! `std::io` adapters and one-shot helpers on top of [`Stream`].
use crate::{
    buf::{ByteBuf, HeapBuf, SliceBuf},
    BackendKind, Error, ErrorKind, Result, State, Status, Stream,
};
use std::{io, mem};

/// Output staged per call before it is written to the device.
const OUTPUT_SIZE: usize = 8 * 1024;

/// Compresses `src` into a complete zlib stream appended to `dst`.
///
/// Runs on [`BackendKind::best`]. Returns the number of bytes appended.
///
/// # Example
///
/// ```
/// use zcodec::io;
///
/// let mut packed = b"zlib:".to_vec();
/// io::compress_to_vec(b"Hello world!", &mut packed, zcodec::BEST_COMPRESSION)?;
/// assert!(packed.starts_with(b"zlib:"));
///
/// let mut unpacked = Vec::new();
/// io::decompress_to_vec(&packed[5..], &mut unpacked)?;
/// assert_eq!(unpacked, b"Hello world!");
/// # Ok::<(), zcodec::Error>(())
/// ```
pub fn compress_to_vec(src: &[u8], dst: &mut Vec<u8>, level: i32) -> Result<usize> {
    let stream = BackendKind::best().create_compressor(level)?;
    let len = append(dst, |output| {
        match stream.compress(&mut SliceBuf::new(src), output, true)? {
            Status::Finished => Ok(()),
            status => Err(Error::new(
                ErrorKind::BackendFailure,
                format!("compression stopped with {:?}", status),
            )),
        }
    })?;
    stream.close()?;
    Ok(len)
}

/// Decompresses one zlib stream from `src`, appending the result to `dst`.
///
/// Fails with [`ErrorKind::InvalidData`] if `src` ends before the stream does.
/// Bytes after the end of the stream are ignored.
pub fn decompress_to_vec(src: &[u8], dst: &mut Vec<u8>) -> Result<usize> {
    let stream = BackendKind::best().create_decompressor()?;
    let len = append(dst, |output| {
        match stream.decompress(&mut SliceBuf::new(src), output)? {
            Status::Finished => Ok(()),
            _ => Err(Error::new(ErrorKind::InvalidData, "truncated zlib stream")),
        }
    })?;
    stream.close()?;
    Ok(len)
}

/// Runs `f` on a buffer appending to `dst` and returns the number of bytes
/// appended. On error `dst` is left as it was.
fn append<F>(dst: &mut Vec<u8>, f: F) -> Result<usize>
where
    F: FnOnce(&mut HeapBuf) -> Result<()>,
{
    let orig_len = dst.len();
    let mut output = HeapBuf::wrap(mem::take(dst));
    let result = f(&mut output);
    *dst = output.into_vec();
    match result {
        Ok(()) => Ok(dst.len() - orig_len),
        Err(err) => {
            dst.truncate(orig_len);
            Err(err)
        }
    }
}

/// The [`Write`]-based streaming compressor.
///
/// The zlib stream is finished by [`finish`], or when the compressor is dropped.
///
/// # Example
///
/// ```
/// use std::io::prelude::*;
/// use zcodec::io::WriteCompressor;
///
/// let mut w = WriteCompressor::new(Vec::new(), zcodec::BEST_SPEED)?;
/// w.write_all(b"Hello ")?;
/// w.write_all(b"world!")?;
/// let packed = w.finish()?;
///
/// let mut unpacked = Vec::new();
/// zcodec::io::decompress_to_vec(&packed, &mut unpacked)?;
/// assert_eq!(unpacked, b"Hello world!");
/// # Ok::<(), std::io::Error>(())
/// ```
///
/// [`Write`]: std::io::Write
/// [`finish`]: WriteCompressor::finish
pub struct WriteCompressor<W: io::Write> {
    device: Option<W>,
    stream: Stream,
    output: HeapBuf,
}

impl<W: io::Write> WriteCompressor<W> {
    /// Creates a compressor on [`BackendKind::best`].
    pub fn new(writer: W, level: i32) -> Result<Self> {
        Self::with_backend(writer, BackendKind::best(), level)
    }

    pub fn with_backend(writer: W, kind: BackendKind, level: i32) -> Result<Self> {
        Ok(Self {
            device: Some(writer),
            stream: kind.create_compressor(level)?,
            output: HeapBuf::with_max_capacity(0, OUTPUT_SIZE),
        })
    }

    pub fn get_ref(&self) -> Option<&W> {
        self.device.as_ref()
    }

    /// Finishes the zlib stream and returns the writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.end()?;
        self.device
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "writer already taken"))
    }

    fn end(&mut self) -> io::Result<()> {
        if self.device.is_none() || self.stream.state() != State::Compressing {
            return Ok(());
        }
        loop {
            let status = self
                .stream
                .compress(&mut SliceBuf::new(&[]), &mut self.output, true)?;
            self.drain()?;
            match status {
                Status::Finished => break,
                Status::InsufficientOutput => {}
                Status::Ok => {
                    return Err(Error::new(
                        ErrorKind::BackendFailure,
                        "compressor did not finish the stream",
                    )
                    .into())
                }
            }
        }
        self.stream.close()?;
        if let Some(device) = &mut self.device {
            device.flush()?;
        }
        Ok(())
    }

    fn drain(&mut self) -> io::Result<()> {
        if let Some(device) = &mut self.device {
            device.write_all(self.output.readable())?;
        }
        self.output.clear();
        Ok(())
    }
}

impl<W: io::Write> io::Write for WriteCompressor<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut input = SliceBuf::new(buf);
        loop {
            let status = self.stream.compress_partial(&mut input, &mut self.output)?;
            self.drain()?;
            if status != Status::InsufficientOutput {
                break;
            }
        }
        Ok(buf.len())
    }

    /// Every `write` ends with a sync flush, so only the device needs flushing.
    fn flush(&mut self) -> io::Result<()> {
        match &mut self.device {
            Some(device) => device.flush(),
            None => Ok(()),
        }
    }
}

impl<W: io::Write> Drop for WriteCompressor<W> {
    fn drop(&mut self) {
        let _ = self.end();
    }
}

/// The [`Write`]-based streaming decompressor.
///
/// Once the end of the zlib stream is reached, further writes return `Ok(0)`.
///
/// # Example
///
/// ```
/// use std::io::prelude::*;
/// use zcodec::io::{compress_to_vec, WriteDecompressor};
///
/// let mut packed = Vec::new();
/// compress_to_vec(b"Hello world!", &mut packed, zcodec::DEFAULT_COMPRESSION)?;
///
/// let mut w = WriteDecompressor::new(Vec::new())?;
/// for chunk in packed.chunks(3) {
///     w.write_all(chunk)?;
/// }
/// assert!(w.is_finished());
/// assert_eq!(w.finish()?, b"Hello world!");
/// # Ok::<(), std::io::Error>(())
/// ```
///
/// [`Write`]: std::io::Write
pub struct WriteDecompressor<W: io::Write> {
    device: Option<W>,
    stream: Stream,
    output: HeapBuf,
}

impl<W: io::Write> WriteDecompressor<W> {
    pub fn new(writer: W) -> Result<Self> {
        Self::with_backend(writer, BackendKind::best())
    }

    pub fn with_backend(writer: W, kind: BackendKind) -> Result<Self> {
        Ok(Self {
            device: Some(writer),
            stream: kind.create_decompressor()?,
            output: HeapBuf::with_max_capacity(0, OUTPUT_SIZE),
        })
    }

    pub fn get_ref(&self) -> Option<&W> {
        self.device.as_ref()
    }

    /// Returns `true` once the end of the zlib stream has been written.
    pub fn is_finished(&self) -> bool {
        self.stream.state() == State::Finished
    }

    /// Returns the writer. Fails if the zlib stream is incomplete.
    pub fn finish(mut self) -> io::Result<W> {
        if !self.is_finished() {
            return Err(Error::new(ErrorKind::InvalidData, "truncated zlib stream").into());
        }
        self.stream.close()?;
        let mut device = self
            .device
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "writer already taken"))?;
        device.flush()?;
        Ok(device)
    }

    fn drain(&mut self) -> io::Result<()> {
        if let Some(device) = &mut self.device {
            device.write_all(self.output.readable())?;
        }
        self.output.clear();
        Ok(())
    }
}

impl<W: io::Write> io::Write for WriteDecompressor<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.is_finished() {
            return Ok(0);
        }
        let mut input = SliceBuf::new(buf);
        loop {
            let status = self.stream.decompress(&mut input, &mut self.output)?;
            self.drain()?;
            if status != Status::InsufficientOutput {
                break;
            }
        }
        Ok(input.reader_index())
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.device {
            Some(device) => device.flush(),
            None => Ok(()),
        }
    }
}

impl<W: io::Write> Drop for WriteDecompressor<W> {
    fn drop(&mut self) {
        if self.stream.state() != State::Closed {
            let _ = self.stream.close();
        }
    }
}
