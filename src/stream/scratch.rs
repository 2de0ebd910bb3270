use crate::{Error, ErrorKind, Result, SCRATCH_SIZE};
use std::ops::{Deref, DerefMut};

/// A `SCRATCH_SIZE` staging region owned by the engine for one call.
///
/// Dropping the guard releases the region; with `use-tls` it goes back to a
/// small per-thread free list.
pub(crate) struct Scratch {
    data: Option<Box<[u8]>>,
}

impl Scratch {
    pub fn acquire() -> Result<Self> {
        #[cfg(feature = "use-tls")]
        {
            if let Some(data) = pool::take() {
                return Ok(Self { data: Some(data) });
            }
        }
        Ok(Self {
            data: Some(allocate()?),
        })
    }
}

impl Deref for Scratch {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.data.as_deref().unwrap_or(&[])
    }
}

impl DerefMut for Scratch {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.data.as_deref_mut().unwrap_or(&mut [])
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        #[cfg(feature = "use-tls")]
        {
            if let Some(data) = self.data.take() {
                pool::give(data);
            }
        }
    }
}

fn allocate() -> Result<Box<[u8]>> {
    let mut vec = Vec::new();
    vec.try_reserve_exact(SCRATCH_SIZE).map_err(|_| {
        Error::new(
            ErrorKind::ResourceExhausted,
            format!("failed to allocate {} bytes of scratch", SCRATCH_SIZE),
        )
    })?;
    vec.resize(SCRATCH_SIZE, 0);
    Ok(vec.into_boxed_slice())
}

#[cfg(feature = "use-tls")]
mod pool {
    use std::cell::RefCell;

    /// Two regions cover one call; the rest absorbs nested streams on the same thread.
    const POOL_LIMIT: usize = 4;

    thread_local!(static POOL: RefCell<Vec<Box<[u8]>>> = RefCell::new(Vec::new()));

    pub fn take() -> Option<Box<[u8]>> {
        POOL.try_with(|pool| pool.borrow_mut().pop())
            .ok()
            .flatten()
    }

    pub fn give(data: Box<[u8]>) {
        // Fails only during thread teardown; the region is then just freed.
        let _ = POOL.try_with(|pool| {
            let mut pool = pool.borrow_mut();
            if pool.len() < POOL_LIMIT {
                pool.push(data);
            }
        });
    }

    #[cfg(test)]
    pub fn len() -> usize {
        POOL.with(|pool| pool.borrow().len())
    }
}
