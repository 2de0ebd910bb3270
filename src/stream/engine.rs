//! Chunked transfer between two buffers through a backend primitive.
use super::{scratch::Scratch, Status};
use crate::{
    backend::{Codec, Step},
    buf::{ByteBuf, Region, RegionMut},
    Error, ErrorKind, Result, SCRATCH_SIZE,
};

const EMPTY: &[u8] = &[];

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Operation {
    /// `committed`: the backend already saw a final chunk, so every chunk
    /// from here on is final too.
    Compress { finish: bool, committed: bool },
    Decompress,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Transfer {
    pub status: Status,
    /// A chunk flagged final reached the backend.
    pub committed: bool,
    /// Committed, and the backend took all of the input.
    pub sealed: bool,
}

/// Pushes the readable bytes of `input` through `codec` into `output`.
///
/// Buffers the backend cannot address in place are staged through scratch
/// regions. Returns once the backend finished the stream, `output` is
/// saturated, or `input` is drained.
pub(crate) fn transfer(
    codec: &mut Codec,
    op: Operation,
    input: &mut dyn ByteBuf,
    output: &mut dyn ByteBuf,
) -> Result<Transfer> {
    let access = codec.access();
    let in_direct = access.is_direct(input);
    let out_direct = access.is_direct(output);
    let (finish, mut committed) = match op {
        Operation::Compress { finish, committed } => (finish, committed),
        Operation::Decompress => (false, false),
    };

    let mut in_scratch: Option<Scratch> = None;
    let mut out_scratch: Option<Scratch> = None;

    let mut finished = false;
    let mut needs_more_output;

    loop {
        let readable = input.readable_bytes();
        let chunk_len = if in_direct {
            readable
        } else {
            readable.min(SCRATCH_SIZE)
        };
        let last = finish && (committed || chunk_len == readable);

        if !in_direct && chunk_len > 0 {
            let scratch = acquire(&mut in_scratch)?;
            input.get_bytes(input.reader_index(), &mut scratch[..chunk_len])?;
        }

        let mut consumed = 0;
        let mut produced_total = 0;
        loop {
            let room = SCRATCH_SIZE.min(output.max_writable_bytes());
            output.ensure_writable(room)?;
            let writable = output.writable_bytes();
            let offered = if out_direct {
                writable
            } else {
                writable.min(SCRATCH_SIZE)
            };
            if offered == 0 {
                needs_more_output = true;
                break;
            }

            let src = if in_direct {
                access
                    .readable(input)
                    .and_then(|region| region.get(consumed..chunk_len))
                    .ok_or_else(capability_lost)?
            } else if chunk_len == 0 {
                Region::from(EMPTY)
            } else {
                let scratch = in_scratch.as_deref().ok_or_else(capability_lost)?;
                Region::from(&scratch[consumed..chunk_len])
            };

            committed |= last;
            let result = if out_direct {
                let dst = access
                    .writable(output)
                    .and_then(|region| region.get(0..offered))
                    .ok_or_else(capability_lost)?;
                run(codec, op, src, dst, last)
                    .and_then(|step| output.advance_writer(step.produced).map(|_| step))
            } else {
                let scratch = acquire(&mut out_scratch)?;
                run(codec, op, src, RegionMut::from(&mut scratch[..offered]), last)
                    .and_then(|step| output.write_bytes(&scratch[..step.produced]).map(|_| step))
            };
            let step = match result {
                Ok(step) => step,
                Err(err) => {
                    // Keep the input in step with the output of earlier passes.
                    input.advance_reader(consumed)?;
                    return Err(err);
                }
            };

            consumed += step.consumed;
            produced_total += step.produced;
            finished = step.finished;
            needs_more_output = step.produced == offered;

            let again = step.produced > 0
                && needs_more_output
                && output.max_writable_bytes() > 0
                && !finished;
            if !again {
                break;
            }
        }

        input.advance_reader(consumed)?;
        if finished || !input.is_readable() {
            break;
        }
        if consumed == 0 && produced_total == 0 {
            if needs_more_output || output.max_writable_bytes() == 0 {
                needs_more_output = true;
                break;
            }
            return Err(Error::new(
                ErrorKind::Stalled,
                format!(
                    "backend made no progress with {} bytes readable",
                    input.readable_bytes()
                ),
            ));
        }
    }

    let status = if finished {
        if input.is_readable() {
            tracing::debug!(
                trailing = input.readable_bytes(),
                "bytes after the end of the zlib stream left unread"
            );
        }
        Status::Finished
    } else if needs_more_output {
        Status::InsufficientOutput
    } else {
        Status::Ok
    };
    tracing::trace!(?op, in_direct, out_direct, ?status, "transfer done");
    Ok(Transfer {
        status,
        committed,
        sealed: committed && !input.is_readable(),
    })
}

fn run(
    codec: &mut Codec,
    op: Operation,
    src: Region<'_>,
    dst: RegionMut<'_>,
    last: bool,
) -> Result<Step> {
    match op {
        Operation::Compress { .. } => codec.compress(src, dst, last),
        Operation::Decompress => codec.decompress(src, dst),
    }
}

fn acquire(slot: &mut Option<Scratch>) -> Result<&mut Scratch> {
    if slot.is_none() {
        *slot = Some(Scratch::acquire()?);
    }
    slot.as_mut().ok_or_else(capability_lost)
}

/// A buffer stopped exposing the storage it was probed for.
fn capability_lost() -> Error {
    Error::new(
        ErrorKind::BackendFailure,
        "buffer storage changed during a transfer",
    )
}
