//! Chunked zlib streams over arbitrary byte buffers.
//!
//! A [`Stream`] is a long-lived compression or decompression session. Each call
//! pushes whatever is readable in an input [`ByteBuf`] through the stream and
//! appends the result to an output [`ByteBuf`], growing it when allowed.
//!
//! Two backends produce interchangeable zlib data:
//!
//! - [`BackendKind::Software`]: flate2 on top of `miniz_oxide`, works on
//!   contiguous memory segments.
//! - [`BackendKind::Native`]: zlib reached through a small C shim, works on raw
//!   memory addresses. Requires the `native` feature.
//!
//! Buffers that expose neither a segment nor an address are staged through
//! bounded scratch regions, so callers never need to care which backend runs.
//!
//! # Example
//!
//! ```
//! use zcodec::{BackendKind, HeapBuf, Status};
//!
//! let kind = BackendKind::best();
//! let comp = kind.create_default_compressor()?;
//! let decomp = kind.create_decompressor()?;
//!
//! let mut src = HeapBuf::wrap(b"Hello world!".to_vec());
//! let mut packed = HeapBuf::new();
//! assert_eq!(comp.compress(&mut src, &mut packed, true)?, Status::Finished);
//!
//! let mut unpacked = HeapBuf::new();
//! assert_eq!(decomp.decompress(&mut packed, &mut unpacked)?, Status::Finished);
//! assert_eq!(unpacked.readable(), b"Hello world!");
//!
//! comp.close()?;
//! decomp.close()?;
//! # Ok::<(), zcodec::Error>(())
//! ```
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod backend;
mod buf;
mod common;
mod factory;
pub mod io;
mod stream;

pub use buf::{
    ByteBuf, CompositeBuf, DirectBuf, HeapBuf, Region, RegionMut, Segment, SegmentMut, SliceBuf,
};
pub use common::{native_available, native_version, Error, ErrorKind, Result, SCRATCH_SIZE};
pub use factory::{BackendKind, BEST_COMPRESSION, BEST_SPEED, DEFAULT_COMPRESSION};
pub use stream::{Format, Role, State, Status, Stream};
