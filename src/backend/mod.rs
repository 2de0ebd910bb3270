//! Backend primitives: one deflate/inflate step over a source and a destination region.
#[cfg(feature = "native")]
mod native;
mod software;

use crate::{
    buf::{ByteBuf, Region, RegionMut},
    factory::BackendKind,
    stream::Role,
    Error, ErrorKind, Result,
};

#[cfg(feature = "native")]
use native::NativeCodec;
use software::SoftwareCodec;

/// The buffer capability a backend consumes without copying.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Access {
    Segment,
    Address,
}

impl Access {
    pub fn is_direct(self, buf: &dyn ByteBuf) -> bool {
        match self {
            Access::Segment => buf.has_segment(),
            Access::Address => buf.has_address(),
        }
    }

    /// The readable bytes of `buf`, if it can be used in place.
    pub fn readable(self, buf: &dyn ByteBuf) -> Option<Region<'_>> {
        let range = buf.reader_index()..buf.writer_index();
        match self {
            Access::Segment => {
                let seg = buf.segment()?;
                seg.as_slice().get(range).map(Region::from)
            }
            Access::Address => buf.address()?.get(range),
        }
    }

    /// The writable bytes of `buf`, if it can be used in place.
    pub fn writable(self, buf: &mut dyn ByteBuf) -> Option<RegionMut<'_>> {
        let range = buf.writer_index()..buf.capacity();
        match self {
            Access::Segment => {
                let seg = buf.segment_mut()?;
                seg.into_slice().get_mut(range).map(RegionMut::from)
            }
            Access::Address => buf.address_mut()?.get(range),
        }
    }
}

/// What a single backend call did.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Step {
    pub consumed: usize,
    pub produced: usize,
    /// The end of the zlib stream was reached and all of it has been written out.
    pub finished: bool,
}

pub(crate) enum Codec {
    Software(SoftwareCodec),
    #[cfg(feature = "native")]
    Native(NativeCodec),
}

impl Codec {
    /// `level` is ignored for decompressors.
    pub fn new(kind: BackendKind, role: Role, level: i32) -> Result<Self> {
        match kind {
            BackendKind::Software => Ok(Codec::Software(match role {
                Role::Compress => SoftwareCodec::deflate(level),
                Role::Decompress => SoftwareCodec::inflate(),
            })),
            BackendKind::Native => {
                #[cfg(feature = "native")]
                {
                    if kind.is_available() {
                        return Ok(Codec::Native(match role {
                            Role::Compress => NativeCodec::deflate(level)?,
                            Role::Decompress => NativeCodec::inflate()?,
                        }));
                    }
                }
                Err(Error::new(
                    ErrorKind::BackendUnavailable,
                    "the native zlib backend is not available",
                ))
            }
        }
    }

    pub fn access(&self) -> Access {
        match self {
            Codec::Software(_) => Access::Segment,
            #[cfg(feature = "native")]
            Codec::Native(_) => Access::Address,
        }
    }

    /// Sync-flushes, or finishes the stream if `finish` is set.
    pub fn compress(&mut self, src: Region<'_>, dst: RegionMut<'_>, finish: bool) -> Result<Step> {
        match self {
            Codec::Software(codec) => codec.compress(src.as_slice(), dst.into_slice(), finish),
            #[cfg(feature = "native")]
            Codec::Native(codec) => codec.compress(src, dst, finish),
        }
    }

    pub fn decompress(&mut self, src: Region<'_>, dst: RegionMut<'_>) -> Result<Step> {
        match self {
            Codec::Software(codec) => codec.decompress(src.as_slice(), dst.into_slice()),
            #[cfg(feature = "native")]
            Codec::Native(codec) => codec.decompress(src, dst),
        }
    }
}

fn wrong_role(role: Role) -> Error {
    Error::new(
        ErrorKind::InvalidState,
        match role {
            Role::Compress => "backend is only for compressing",
            Role::Decompress => "backend is only for decompressing",
        },
    )
}
