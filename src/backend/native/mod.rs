#![allow(unsafe_code)]

mod binding;

use super::{wrong_role, Step};
use crate::{
    buf::{Region, RegionMut},
    stream::Role,
    Error, ErrorKind, Result,
};
use binding::ZStream;
use libc::c_int;
use std::{ffi::CStr, ptr, ptr::NonNull};

/// A zlib `z_stream` owned through the C shim.
///
/// Every call reports its progress through `channel`: `[consumed, produced]`.
pub(crate) struct NativeCodec {
    stream: NonNull<ZStream>,
    kind: c_int,
    channel: Box<[u32; 2]>,
}

// The z_stream is only reachable through `&mut self`.
unsafe impl Send for NativeCodec {}

impl NativeCodec {
    /// `level` must already be validated; `-1` is zlib's own default.
    pub fn deflate(level: i32) -> Result<Self> {
        Self::new(binding::ZSHIM_DEFLATE, level)
    }

    pub fn inflate() -> Result<Self> {
        Self::new(binding::ZSHIM_INFLATE, 0)
    }

    fn new(kind: c_int, level: i32) -> Result<Self> {
        let mut raw = ptr::null_mut();
        let code = unsafe { binding::zshim_create(kind, level as c_int, &mut raw) };
        let stream = match code {
            binding::Z_OK => NonNull::new(raw).ok_or_else(|| {
                Error::new(ErrorKind::BackendFailure, "zlib returned a null stream")
            })?,
            binding::Z_MEM_ERROR => {
                return Err(Error::new(
                    ErrorKind::ResourceExhausted,
                    "failed to allocate a zlib stream",
                ))
            }
            binding::Z_STREAM_ERROR => {
                return Err(Error::new(
                    ErrorKind::InvalidLevel,
                    format!("zlib rejected compression level {}", level),
                ))
            }
            binding::Z_VERSION_ERROR => {
                return Err(Error::new(
                    ErrorKind::BackendUnavailable,
                    "incompatible zlib version",
                ))
            }
            code => return Err(unexpected(code)),
        };
        Ok(Self {
            stream,
            kind,
            channel: Box::new([0; 2]),
        })
    }

    pub fn compress(&mut self, src: Region<'_>, mut dst: RegionMut<'_>, finish: bool) -> Result<Step> {
        if self.kind != binding::ZSHIM_DEFLATE {
            return Err(wrong_role(Role::Decompress));
        }
        let (src_len, dst_len) = (clamp(src.len()), clamp(dst.len()));
        let code = unsafe {
            binding::zshim_deflate(
                self.stream.as_ptr(),
                self.channel.as_mut_ptr(),
                src.as_ptr(),
                src_len,
                dst.as_mut_ptr(),
                dst_len,
                finish as c_int,
            )
        };
        self.step(code)
    }

    pub fn decompress(&mut self, src: Region<'_>, mut dst: RegionMut<'_>) -> Result<Step> {
        if self.kind != binding::ZSHIM_INFLATE {
            return Err(wrong_role(Role::Compress));
        }
        let (src_len, dst_len) = (clamp(src.len()), clamp(dst.len()));
        let code = unsafe {
            binding::zshim_inflate(
                self.stream.as_ptr(),
                self.channel.as_mut_ptr(),
                src.as_ptr(),
                src_len,
                dst.as_mut_ptr(),
                dst_len,
            )
        };
        self.step(code)
    }

    fn step(&self, code: c_int) -> Result<Step> {
        let [consumed, produced] = *self.channel;
        let finished = match code {
            binding::Z_OK | binding::Z_BUF_ERROR => false,
            binding::Z_STREAM_END => true,
            binding::Z_DATA_ERROR | binding::Z_NEED_DICT => {
                let message = self.message().unwrap_or("invalid zlib data");
                tracing::debug!(code, reason = message, "native inflate rejected its input");
                return Err(Error::new(ErrorKind::InvalidData, message.to_owned()));
            }
            binding::Z_MEM_ERROR => {
                return Err(Error::new(
                    ErrorKind::ResourceExhausted,
                    "zlib ran out of memory",
                ))
            }
            binding::Z_STREAM_ERROR => {
                return Err(Error::new(
                    ErrorKind::InvalidState,
                    "zlib stream state is inconsistent",
                ))
            }
            code => return Err(unexpected(code)),
        };
        Ok(Step {
            consumed: consumed as usize,
            produced: produced as usize,
            finished,
        })
    }

    fn message(&self) -> Option<&str> {
        let ptr = unsafe { binding::zshim_message(self.stream.as_ptr()) };
        if ptr.is_null() {
            return None;
        }
        // zlib only ever points `msg` at static strings.
        unsafe { CStr::from_ptr(ptr) }.to_str().ok()
    }
}

impl Drop for NativeCodec {
    fn drop(&mut self) {
        let code = unsafe { binding::zshim_free(self.kind, self.stream.as_ptr()) };
        // Z_DATA_ERROR here only means the stream was released mid-way.
        if code != binding::Z_OK {
            tracing::trace!(code, "zlib stream released before its end");
        }
    }
}

fn clamp(len: usize) -> u32 {
    len.min(u32::MAX as usize) as u32
}

fn unexpected(code: c_int) -> Error {
    Error::new(
        ErrorKind::BackendFailure,
        format!("unexpected zlib return code {}", code),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_round_trip() {
        let data = b"As soon as they had strength, they arose, joined hands again.";
        let mut comp = NativeCodec::deflate(9).unwrap();
        let mut packed = [0u8; 256];
        let step = comp
            .compress(Region::from(&data[..]), RegionMut::from(&mut packed[..]), true)
            .unwrap();
        assert_eq!(step.consumed, data.len());
        assert!(step.finished);

        let mut decomp = NativeCodec::inflate().unwrap();
        let mut unpacked = [0u8; 256];
        let out = decomp
            .decompress(
                Region::from(&packed[..step.produced]),
                RegionMut::from(&mut unpacked[..]),
            )
            .unwrap();
        assert!(out.finished);
        assert_eq!(&unpacked[..out.produced], &data[..]);
    }

    #[test]
    fn invalid_level() {
        let err = NativeCodec::deflate(42).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidLevel);
    }

    #[test]
    fn garbage_is_invalid_data() {
        let mut decomp = NativeCodec::inflate().unwrap();
        let mut out = [0u8; 64];
        let err = decomp
            .decompress(Region::from(&[0xffu8; 16][..]), RegionMut::from(&mut out[..]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        assert!(!err.message().is_empty());
    }

    #[test]
    fn no_output_space_is_zero_progress() {
        let mut comp = NativeCodec::deflate(6).unwrap();
        let step = comp
            .compress(Region::from(&b"abc"[..]), RegionMut::from(&mut [0u8; 0][..]), false)
            .unwrap();
        assert_eq!(step.produced, 0);
        assert!(!step.finished);
    }
}
