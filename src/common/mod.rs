mod api;
#[cfg(feature = "native")]
mod binding;
mod error;

pub use api::{native_available, native_version};
pub use error::{Error, ErrorKind, Result};

/// Size of each scratch region used to stage buffers a backend cannot address directly.
pub const SCRATCH_SIZE: usize = 4096;
