//! Utility functions for copy operations.
//!
//! Positioned IO wrappers shared by the range copiers, plus small
//! filesystem helpers used during classification and tree walks.

use std::fs::{self, File};
use std::io;
use std::path::Path;

// =============================================================================
// Positioned IO
// =============================================================================

/// Read into `buf` starting at `offset` without moving any shared cursor.
///
/// Retries on `Interrupted`. Returns 0 at end of file.
#[cfg(unix)]
pub(crate) fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::unix::fs::FileExt;
    loop {
        match file.read_at(buf, offset) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            result => return result,
        }
    }
}

/// Read into `buf` starting at `offset`.
///
/// `seek_read` moves the handle's cursor on Windows, which is harmless here
/// because every caller passes an explicit offset.
#[cfg(windows)]
pub(crate) fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::windows::fs::FileExt;
    loop {
        match file.seek_read(buf, offset) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            result => return result,
        }
    }
}

/// Write all of `buf` at `offset`.
///
/// On failure, returns the offset of the first byte that was not written
/// along with the error.
pub(crate) fn write_all_at(file: &File, buf: &[u8], offset: u64) -> Result<(), (u64, io::Error)> {
    let mut written = 0usize;
    while written < buf.len() {
        let at = offset + written as u64;
        match write_at(file, &buf[written..], at) {
            Ok(0) => {
                return Err((
                    at,
                    io::Error::new(io::ErrorKind::WriteZero, "failed to write copied bytes"),
                ));
            }
            Ok(n) => written += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err((at, e)),
        }
    }
    Ok(())
}

#[cfg(unix)]
fn write_at(file: &File, buf: &[u8], offset: u64) -> io::Result<usize> {
    use std::os::unix::fs::FileExt;
    file.write_at(buf, offset)
}

#[cfg(windows)]
fn write_at(file: &File, buf: &[u8], offset: u64) -> io::Result<usize> {
    use std::os::windows::fs::FileExt;
    file.seek_write(buf, offset)
}

// =============================================================================
// Filesystem helpers
// =============================================================================

/// Whether `a` and `b` refer to the same existing file or directory.
///
/// Returns false if either path cannot be inspected.
#[cfg(unix)]
pub(crate) fn is_same_entry(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(ma), Ok(mb)) => ma.dev() == mb.dev() && ma.ino() == mb.ino(),
        _ => false,
    }
}

/// Whether `a` and `b` refer to the same existing file or directory.
#[cfg(not(unix))]
pub(crate) fn is_same_entry(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(ca), Ok(cb)) => ca == cb,
        _ => false,
    }
}

/// Whether the directory at `path` has no entries.
pub(crate) fn dir_is_empty(path: &Path) -> io::Result<bool> {
    Ok(fs::read_dir(path)?.next().is_none())
}

// =============================================================================
// Tests
// =============================================================================
