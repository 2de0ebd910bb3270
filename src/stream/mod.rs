//! Compression and decompression sessions.
//!
//! # Example
//! ```
//! use zcodec::{BackendKind, CompositeBuf, DirectBuf, HeapBuf, Status, Stream};
//!
//! let comp = Stream::compressor(BackendKind::Software, 9)?;
//! let mut packed = CompositeBuf::new();
//!
//! // Input may arrive in pieces, from any kind of buffer.
//! comp.compress_partial(&mut HeapBuf::wrap(b"Hello ".to_vec()), &mut packed)?;
//! let status = comp.compress(&mut DirectBuf::from_slice(b"world!"), &mut packed, true)?;
//! assert_eq!(status, Status::Finished);
//!
//! let decomp = Stream::decompressor(BackendKind::Software)?;
//! let mut unpacked = HeapBuf::new();
//! decomp.decompress(&mut packed, &mut unpacked)?;
//! assert_eq!(unpacked.readable(), b"Hello world!");
//! # Ok::<(), zcodec::Error>(())
//! ```
mod engine;
mod scratch;

use crate::{
    backend::Codec,
    buf::ByteBuf,
    factory::{check_level, BackendKind},
    Error, ErrorKind, Result,
};
use engine::{Operation, Transfer};
use parking_lot::Mutex;
use std::fmt;

/// Whether a stream compresses or decompresses. Fixed at creation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    Compress,
    Decompress,
}

impl Role {
    fn initial_state(self) -> State {
        match self {
            Role::Compress => State::Compressing,
            Role::Decompress => State::Decompressing,
        }
    }
}

/// The lifecycle state of a [`Stream`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum State {
    Compressing,
    Decompressing,
    /// The backend signalled the end of the zlib stream.
    Finished,
    /// Backend resources are released. No operation succeeds anymore.
    Closed,
}

impl State {
    /// The usage message reported when an operation does not fit this state.
    pub fn message(self) -> &'static str {
        match self {
            State::Compressing => "stream is only for compressing",
            State::Decompressing => "stream is only for decompressing",
            State::Finished => "stream is finished",
            State::Closed => "stream is closed",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        <Self as fmt::Debug>::fmt(self, f)
    }
}

/// The outcome of a [`Stream::compress`] or [`Stream::decompress`] call.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Status {
    /// All readable input was consumed. The stream expects more.
    Ok,
    /// The output buffer is saturated. Call again with more room to collect the rest.
    InsufficientOutput,
    /// The zlib stream is complete.
    Finished,
}

/// The container format produced and accepted by a [`Stream`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Format {
    /// RFC 1950 zlib streams.
    Zlib,
}

struct Inner {
    state: State,
    /// `None` once closed.
    codec: Option<Codec>,
    /// The last call stopped on a saturated output.
    pending: bool,
    /// A call asked to finish. Every later call finishes too.
    finishing: bool,
    /// The backend saw a final chunk.
    committed: bool,
    /// The backend took all input of the final chunk; only flushing is left.
    sealed: bool,
}

impl Inner {
    /// Fails with the current state's usage message unless it is `state`.
    fn check(&self, state: State) -> Result<()> {
        if self.state == state {
            Ok(())
        } else {
            Err(Error::new(ErrorKind::InvalidState, self.state.message()))
        }
    }

    fn codec_mut(&mut self) -> Result<&mut Codec> {
        let state = self.state;
        self.codec
            .as_mut()
            .ok_or_else(|| Error::new(ErrorKind::InvalidState, state.message()))
    }

    fn settle(&mut self, done: Transfer) -> Status {
        self.pending = done.status == Status::InsufficientOutput;
        self.committed |= done.committed;
        self.sealed |= done.sealed;
        if done.status == Status::Finished {
            tracing::debug!(from = ?self.state, "stream finished");
            self.state = State::Finished;
            self.pending = false;
        }
        done.status
    }
}

/// A zlib compression or decompression session.
///
/// Every operation locks the stream for its whole duration, so a `Stream` can
/// be shared between threads.
pub struct Stream {
    role: Role,
    level: i32,
    kind: BackendKind,
    inner: Mutex<Inner>,
}

impl Stream {
    /// Creates a compressor on the `kind` backend.
    ///
    /// `level` is [`BEST_SPEED`]`..=`[`BEST_COMPRESSION`] or [`DEFAULT_COMPRESSION`].
    ///
    /// [`BEST_SPEED`]: crate::BEST_SPEED
    /// [`BEST_COMPRESSION`]: crate::BEST_COMPRESSION
    /// [`DEFAULT_COMPRESSION`]: crate::DEFAULT_COMPRESSION
    pub fn compressor(kind: BackendKind, level: i32) -> Result<Self> {
        check_level(level)?;
        Self::new(kind, Role::Compress, level)
    }

    pub fn decompressor(kind: BackendKind) -> Result<Self> {
        Self::new(kind, Role::Decompress, 0)
    }

    fn new(kind: BackendKind, role: Role, level: i32) -> Result<Self> {
        let codec = Codec::new(kind, role, level)?;
        tracing::debug!(?kind, ?role, level, "stream created");
        Ok(Self {
            role,
            level,
            kind,
            inner: Mutex::new(Inner {
                state: role.initial_state(),
                codec: Some(codec),
                pending: false,
                finishing: false,
                committed: false,
                sealed: false,
            }),
        })
    }

    /// Compresses the readable bytes of `input` into `output`.
    ///
    /// With `finish` set, the zlib stream is terminated once all of `input` is
    /// consumed. If this returns [`Status::InsufficientOutput`], call again with
    /// the input left over and more room in `output`. A finish request stays in
    /// effect until the stream is finished, whatever later calls pass as
    /// `finish`. Once the backend took all of the final input, passing more
    /// fails with [`ErrorKind::InvalidState`].
    pub fn compress(
        &self,
        input: &mut dyn ByteBuf,
        output: &mut dyn ByteBuf,
        finish: bool,
    ) -> Result<Status> {
        let mut inner = self.inner.lock();
        inner.check(State::Compressing)?;
        if inner.sealed && input.is_readable() {
            return Err(Error::new(
                ErrorKind::InvalidState,
                "stream is finishing and accepts no more input",
            ));
        }
        inner.finishing |= finish;
        let finish = inner.finishing;
        if !input.is_readable() && !finish && !inner.pending {
            return Ok(Status::Ok);
        }
        let committed = inner.committed;
        let done = engine::transfer(
            inner.codec_mut()?,
            Operation::Compress { finish, committed },
            input,
            output,
        )?;
        Ok(inner.settle(done))
    }

    /// Same as `compress(input, output, false)`.
    pub fn compress_partial(
        &self,
        input: &mut dyn ByteBuf,
        output: &mut dyn ByteBuf,
    ) -> Result<Status> {
        self.compress(input, output, false)
    }

    /// Decompresses the readable bytes of `input` into `output`.
    ///
    /// Bytes following the end of the zlib stream are left readable in `input`.
    pub fn decompress(&self, input: &mut dyn ByteBuf, output: &mut dyn ByteBuf) -> Result<Status> {
        let mut inner = self.inner.lock();
        inner.check(State::Decompressing)?;
        if !input.is_readable() && !inner.pending {
            return Ok(Status::Ok);
        }
        let done = engine::transfer(inner.codec_mut()?, Operation::Decompress, input, output)?;
        Ok(inner.settle(done))
    }

    /// Releases the backend. Fails if the stream is already closed.
    pub fn close(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.state == State::Closed {
            return Err(Error::new(ErrorKind::InvalidState, State::Closed.message()));
        }
        inner.codec = None;
        inner.state = State::Closed;
        tracing::debug!(role = ?self.role, kind = ?self.kind, "stream closed");
        Ok(())
    }

    /// The compression level. Fails for decompressors.
    pub fn level(&self) -> Result<i32> {
        let _inner = self.inner.lock();
        match self.role {
            Role::Compress => Ok(self.level),
            Role::Decompress => Err(Error::new(
                ErrorKind::InvalidState,
                "decompressors have no compression level",
            )),
        }
    }

    pub fn state(&self) -> State {
        self.inner.lock().state
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.kind
    }

    pub fn format(&self) -> Format {
        Format::Zlib
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("role", &self.role)
            .field("level", &self.level)
            .field("kind", &self.kind)
            .field("state", &self.state())
            .finish()
    }
}

impl Drop for Stream {
    fn drop(&mut self) {
        let inner = self.inner.get_mut();
        if inner.state != State::Closed {
            tracing::debug!(role = ?self.role, state = ?inner.state, "stream dropped without close");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CompositeBuf, HeapBuf};

    static_assertions::assert_impl_all!(Stream: Send, Sync);

    #[test]
    fn state_messages() {
        assert_eq!(State::Compressing.message(), "stream is only for compressing");
        assert_eq!(State::Decompressing.message(), "stream is only for decompressing");
        assert_eq!(State::Finished.message(), "stream is finished");
        assert_eq!(State::Closed.message(), "stream is closed");
    }

    #[test]
    fn wrong_role_touches_nothing() {
        let comp = Stream::compressor(BackendKind::Software, 6).unwrap();
        let mut input = HeapBuf::wrap(b"abc".to_vec());
        let mut output = HeapBuf::new();
        let err = comp.decompress(&mut input, &mut output).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(err.message(), "stream is only for compressing");
        assert_eq!(input.readable_bytes(), 3);
        assert_eq!(output.capacity(), 0);
        assert_eq!(comp.state(), State::Compressing);
    }

    #[test]
    fn empty_partial_input_is_a_no_op() {
        let comp = Stream::compressor(BackendKind::Software, 6).unwrap();
        let mut output = HeapBuf::new();
        let status = comp.compress_partial(&mut HeapBuf::new(), &mut output).unwrap();
        assert_eq!(status, Status::Ok);
        assert!(!output.is_readable());
    }

    #[test]
    fn sealed_stream_rejects_more_input() {
        let comp = Stream::compressor(BackendKind::Software, 6).unwrap();
        let data: Vec<u8> = (0..4096u32).map(|i| (i * 31 % 256) as u8).collect();
        let mut input = HeapBuf::wrap(data);
        let mut output = HeapBuf::with_max_capacity(0, 16);
        let status = comp.compress(&mut input, &mut output, true).unwrap();
        assert_eq!(status, Status::InsufficientOutput);
        assert!(!input.is_readable());
        assert!(comp.inner.lock().sealed);

        let err = comp
            .compress(&mut HeapBuf::wrap(vec![1]), &mut HeapBuf::new(), false)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);

        let mut rest = CompositeBuf::new();
        let status = comp.compress(&mut HeapBuf::new(), &mut rest, false).unwrap();
        assert_eq!(status, Status::Finished);
        assert_eq!(comp.state(), State::Finished);
    }

    #[test]
    fn finish_request_survives_staged_input() {
        let comp = Stream::compressor(BackendKind::Software, 6).unwrap();
        let data: Vec<u8> = (0..20_000u32).map(|i| (i % 199) as u8).collect();
        let mut input = CompositeBuf::from_slice(&data, 1000);
        let mut head = HeapBuf::with_max_capacity(0, 4);
        let status = comp.compress(&mut input, &mut head, true).unwrap();
        assert_eq!(status, Status::InsufficientOutput);
        assert!(input.is_readable());
        assert!(comp.inner.lock().finishing);

        let mut tail = HeapBuf::new();
        let status = comp.compress(&mut input, &mut tail, false).unwrap();
        assert_eq!(status, Status::Finished);

        let mut packed = head.into_vec();
        packed.extend(tail.into_vec());
        let mut unpacked = Vec::new();
        crate::io::decompress_to_vec(&packed, &mut unpacked).unwrap();
        assert_eq!(unpacked, data);
    }

    #[test]
    fn close_is_terminal() {
        let decomp = Stream::decompressor(BackendKind::Software).unwrap();
        assert_eq!(decomp.level().unwrap_err().kind(), ErrorKind::InvalidState);
        decomp.close().unwrap();
        assert_eq!(decomp.state(), State::Closed);
        assert_eq!(decomp.close().unwrap_err().kind(), ErrorKind::InvalidState);
        let err = decomp
            .decompress(&mut HeapBuf::wrap(vec![0x78]), &mut HeapBuf::new())
            .unwrap_err();
        assert_eq!(err.message(), "stream is closed");
    }
}
