use std::{borrow::Cow, convert, error, fmt, io, result};

/// A list specifying general categories of stream errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The stream's role or state does not permit the operation.
    InvalidState,
    /// The compression level is outside the accepted range.
    InvalidLevel,
    /// The compressed data is malformed.
    InvalidData,
    /// Memory for a backend context, side channel or scratch region could not be allocated.
    ResourceExhausted,
    /// A buffer would have to grow past its maximum capacity.
    CapacityExceeded,
    /// A cursor or index fell outside the buffer.
    IndexOutOfBounds,
    /// The buffer does not accept writes.
    ReadOnly,
    /// The requested backend is not compiled in or failed its runtime probe.
    BackendUnavailable,
    /// The backend made no progress although both input and output room were available.
    Stalled,
    /// The backend reported a failure that fits no other category.
    BackendFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> result::Result<(), fmt::Error> {
        <Self as fmt::Debug>::fmt(self, f)
    }
}

/// The error type for stream and buffer operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
}

impl Error {
    pub(crate) fn new<M>(kind: ErrorKind, message: M) -> Self
    where
        M: Into<Cow<'static, str>>,
    {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Returns the corresponding `ErrorKind` for this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the human readable detail attached to this error.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl convert::From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind, "")
    }
}

impl convert::From<Error> for io::Error {
    fn from(err: Error) -> Self {
        let kind = match err.kind {
            ErrorKind::InvalidData => io::ErrorKind::InvalidData,
            ErrorKind::InvalidLevel => io::ErrorKind::InvalidInput,
            ErrorKind::CapacityExceeded => io::ErrorKind::WriteZero,
            _ => io::ErrorKind::Other,
        };
        Self::new(kind, err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> result::Result<(), fmt::Error> {
        if self.message.is_empty() {
            <ErrorKind as fmt::Display>::fmt(&self.kind, f)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl error::Error for Error {}

/// A specialized [`Result`] type for stream and buffer operations.
///
/// [`Result`]: https://doc.rust-lang.org/std/result/enum.Result.html
pub type Result<T> = result::Result<T, Error>;
