//! Copying a single byte range between two files.
//!
//! Range copiers only use positioned reads and writes, so any number of them
//! can share the same pair of handles as long as their ranges are disjoint.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use thiserror::Error;

use super::plan::CopyRange;
use super::utils::{read_at, write_all_at};

/// Failure of one range copy.
#[derive(Error, Debug)]
#[error("range copy failed at offset {offset}: {source}")]
pub struct RangeError {
    /// File offset at which the read or write failed
    pub offset: u64,
    /// Underlying error
    pub source: io::Error,
}

/// Copies one [`CopyRange`] from a source handle to a destination handle.
///
/// Implementations must write byte `n` of the source to byte `n` of the
/// destination and touch nothing outside the range, so that several copiers
/// can run on the same file pair at once.
pub trait ChunkCopier: Sync {
    /// Copy `range` and return the number of bytes copied.
    ///
    /// Fewer bytes than `range.length` means the source ended early; that is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns the offset and cause of the first failed read or write. The
    /// copier does not retry.
    fn copy_range(&self, src: &File, dst: &File, range: CopyRange) -> Result<u64, RangeError>;
}

/// The standard [`ChunkCopier`]: a bounded buffer filled with positioned
/// reads and drained with positioned writes.
#[derive(Debug, Clone, Copy)]
pub struct PositionedCopier {
    buffer_size: usize,
}

impl PositionedCopier {
    /// Create a copier using a buffer of `buffer_size` bytes (at least 1).
    #[must_use]
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size: buffer_size.max(1),
        }
    }
}

impl Default for PositionedCopier {
    fn default() -> Self {
        Self::new(crate::options::DEFAULT_BUFFER_SIZE)
    }
}

impl ChunkCopier for PositionedCopier {
    fn copy_range(&self, src: &File, dst: &File, range: CopyRange) -> Result<u64, RangeError> {
        if range.length == 0 {
            return Ok(0);
        }

        let capacity = (range.length.min(self.buffer_size as u64)) as usize;
        let mut buffer = vec![0u8; capacity];
        let mut offset = range.offset;
        let mut remaining = range.length;

        while remaining > 0 {
            let want = remaining.min(capacity as u64) as usize;
            let read = read_at(src, &mut buffer[..want], offset)
                .map_err(|source| RangeError { offset, source })?;
            if read == 0 {
                // Source is shorter than planned
                break;
            }

            write_all_at(dst, &buffer[..read], offset)
                .map_err(|(offset, source)| RangeError { offset, source })?;

            offset += read as u64;
            remaining -= read as u64;
        }

        Ok(offset - range.offset)
    }
}

/// Copy `range` from the file at `src` into the file at `dst`.
///
/// Opens independent handles, so several calls may run concurrently against
/// the same pair of paths. The destination must already exist; it is not
/// created or truncated here.
///
/// # Errors
///
/// Returns a [`RangeError`] at `range.offset` if either file cannot be opened,
/// otherwise whatever the copy itself reports.
///
/// # Example
///
/// ```no_run
/// use cpm::{CopyRange, copy_range};
/// use std::path::Path;
///
/// let copied = copy_range(
///     Path::new("big.iso"),
///     Path::new("big-copy.iso"),
///     CopyRange { offset: 0, length: 1 << 20 },
///     64 * 1024,
/// )?;
/// # Ok::<(), cpm::RangeError>(())
/// ```
pub fn copy_range(
    src: &Path,
    dst: &Path,
    range: CopyRange,
    buffer_size: usize,
) -> Result<u64, RangeError> {
    let at_start = |source| RangeError {
        offset: range.offset,
        source,
    };
    let src_file = File::open(src).map_err(at_start)?;
    let dst_file = OpenOptions::new().write(true).open(dst).map_err(at_start)?;
    PositionedCopier::new(buffer_size).copy_range(&src_file, &dst_file, range)
}
