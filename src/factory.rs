use crate::{common::native_available, Error, ErrorKind, Result, Stream};

/// Fastest compression.
pub const BEST_SPEED: i32 = 1;

/// Smallest output.
pub const BEST_COMPRESSION: i32 = 9;

/// Leaves the level to the backend, which is zlib level 6 for both.
pub const DEFAULT_COMPRESSION: i32 = -1;

/// The backend a [`Stream`] runs on.
///
/// Both backends read and write the same zlib format, so data compressed by
/// one can be decompressed by the other.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// flate2 over `miniz_oxide`. Always available.
    Software,
    /// zlib through the C shim. Needs the `native` feature and a zlib 1.x library.
    Native,
}

impl BackendKind {
    /// Returns `Native` if it is available, else `Software`.
    pub fn best() -> Self {
        let kind = if native_available() {
            BackendKind::Native
        } else {
            BackendKind::Software
        };
        tracing::debug!(?kind, "backend selected");
        kind
    }

    pub fn is_available(self) -> bool {
        match self {
            BackendKind::Software => true,
            BackendKind::Native => native_available(),
        }
    }

    /// Creates a compressor. `level` is `1..=9` or [`DEFAULT_COMPRESSION`].
    pub fn create_compressor(self, level: i32) -> Result<Stream> {
        Stream::compressor(self, level)
    }

    pub fn create_default_compressor(self) -> Result<Stream> {
        Stream::compressor(self, DEFAULT_COMPRESSION)
    }

    pub fn create_decompressor(self) -> Result<Stream> {
        Stream::decompressor(self)
    }
}

pub(crate) fn check_level(level: i32) -> Result<()> {
    if level == DEFAULT_COMPRESSION || (BEST_SPEED..=BEST_COMPRESSION).contains(&level) {
        Ok(())
    } else {
        Err(Error::new(
            ErrorKind::InvalidLevel,
            format!(
                "level {} is outside {}..={} and not {}",
                level, BEST_SPEED, BEST_COMPRESSION, DEFAULT_COMPRESSION
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels() {
        for level in (BEST_SPEED..=BEST_COMPRESSION).chain(Some(DEFAULT_COMPRESSION)) {
            assert!(check_level(level).is_ok());
        }
        for level in &[0, 10, -2, i32::MIN, i32::MAX] {
            assert_eq!(
                check_level(*level).unwrap_err().kind(),
                ErrorKind::InvalidLevel
            );
        }
    }

    #[test]
    fn best_is_available() {
        assert!(BackendKind::best().is_available());
        assert!(BackendKind::Software.is_available());
    }

    #[cfg(not(feature = "native"))]
    #[test]
    fn native_unavailable() {
        let err = BackendKind::Native.create_decompressor().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BackendUnavailable);
    }
}
