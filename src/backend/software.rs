use super::{wrong_role, Step};
use crate::{stream::Role, Error, ErrorKind, Result, DEFAULT_COMPRESSION};
use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};

/// Deflate/inflate state of the in-process backend.
pub(crate) enum SoftwareCodec {
    Deflate(Compress),
    Inflate(Decompress),
}

impl SoftwareCodec {
    /// `level` must already be validated.
    pub fn deflate(level: i32) -> Self {
        let level = if level == DEFAULT_COMPRESSION {
            Compression::default()
        } else {
            Compression::new(level as u32)
        };
        SoftwareCodec::Deflate(Compress::new(level, true))
    }

    pub fn inflate() -> Self {
        SoftwareCodec::Inflate(Decompress::new(true))
    }

    pub fn compress(&mut self, src: &[u8], dst: &mut [u8], finish: bool) -> Result<Step> {
        let ctx = match self {
            SoftwareCodec::Deflate(ctx) => ctx,
            SoftwareCodec::Inflate(_) => return Err(wrong_role(Role::Decompress)),
        };
        let flush = if finish {
            FlushCompress::Finish
        } else {
            FlushCompress::Sync
        };
        let (before_in, before_out) = (ctx.total_in(), ctx.total_out());
        let status = ctx.compress(src, dst, flush).map_err(|err| {
            Error::new(ErrorKind::BackendFailure, format!("deflate failed: {}", err))
        })?;
        Ok(step(
            ctx.total_in() - before_in,
            ctx.total_out() - before_out,
            status,
        ))
    }

    pub fn decompress(&mut self, src: &[u8], dst: &mut [u8]) -> Result<Step> {
        let ctx = match self {
            SoftwareCodec::Inflate(ctx) => ctx,
            SoftwareCodec::Deflate(_) => return Err(wrong_role(Role::Compress)),
        };
        let (before_in, before_out) = (ctx.total_in(), ctx.total_out());
        let status = ctx
            .decompress(src, dst, FlushDecompress::Sync)
            .map_err(|err| {
                tracing::debug!(%err, "software inflate rejected its input");
                Error::new(ErrorKind::InvalidData, err.to_string())
            })?;
        Ok(step(
            ctx.total_in() - before_in,
            ctx.total_out() - before_out,
            status,
        ))
    }
}

fn step(consumed: u64, produced: u64, status: Status) -> Step {
    // Both deltas are bounded by slice lengths.
    Step {
        consumed: consumed as usize,
        produced: produced as usize,
        finished: status == Status::StreamEnd,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_round_trip() {
        let data = b"Lorem ipsum dolor sit amet, lorem ipsum dolor sit amet.";
        let mut comp = SoftwareCodec::deflate(DEFAULT_COMPRESSION);
        let mut packed = [0u8; 256];
        let step = comp.compress(data, &mut packed, true).unwrap();
        assert_eq!(step.consumed, data.len());
        assert!(step.finished);

        let mut decomp = SoftwareCodec::inflate();
        let mut unpacked = [0u8; 256];
        let out = decomp
            .decompress(&packed[..step.produced], &mut unpacked)
            .unwrap();
        assert!(out.finished);
        assert_eq!(&unpacked[..out.produced], &data[..]);
    }

    #[test]
    fn sync_flush_does_not_finish() {
        let mut comp = SoftwareCodec::deflate(1);
        let mut packed = [0u8; 64];
        let step = comp.compress(b"abc", &mut packed, false).unwrap();
        assert_eq!(step.consumed, 3);
        assert!(step.produced > 0);
        assert!(!step.finished);
    }

    #[test]
    fn garbage_is_invalid_data() {
        let mut decomp = SoftwareCodec::inflate();
        let mut out = [0u8; 64];
        let err = decomp.decompress(&[0xff; 16], &mut out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn role_mismatch() {
        let mut decomp = SoftwareCodec::inflate();
        let err = decomp.compress(b"x", &mut [0; 16], false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }
}
