//! Error types for cpm.
//!
//! This module provides the [`Error`] enum containing all possible errors
//! that can occur during copy operations, and the [`Result`] type alias.
//!
//! # Error Categories
//!
//! | Category | Errors | Fatal |
//! |----------|--------|-------|
//! | Source | [`Error::SourceNotFound`], [`Error::SourceUnreadable`], [`Error::SameFile`] | yes |
//! | Destination | [`Error::DestinationUnreadable`], [`Error::DestinationTypeMismatch`] | at the top level |
//! | Conflict | [`Error::ConflictPolicyRequired`], [`Error::RenameExhausted`] | at the top level |
//! | Per file | [`Error::RangeCopy`], [`Error::Open`], [`Error::TempFile`], [`Error::Persist`], [`Error::CreateDir`] | no |
//!
//! Fatal errors stop the engine before any byte is copied. Everything else is
//! recorded against the entry it happened on and the rest of the operation
//! continues.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for cpm operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Check if an IO error indicates "no space left on device".
///
/// | Platform | Error Detection |
/// |----------|-----------------|
/// | Unix | `ENOSPC` |
/// | Windows | `ERROR_DISK_FULL` (0x70) |
///
/// # Example
///
/// ```
/// use std::io;
/// use cpm::is_no_space_error;
///
/// let error = io::Error::new(io::ErrorKind::StorageFull, "disk full");
/// assert!(is_no_space_error(&error));
/// ```
pub fn is_no_space_error(error: &io::Error) -> bool {
    if error.kind() == io::ErrorKind::StorageFull {
        return true;
    }

    #[cfg(unix)]
    {
        if let Some(raw_error) = error.raw_os_error() {
            return raw_error == libc::ENOSPC;
        }
    }

    #[cfg(windows)]
    {
        if let Some(raw_error) = error.raw_os_error() {
            const ERROR_DISK_FULL: i32 = 112;
            return raw_error == ERROR_DISK_FULL;
        }
    }

    false
}

/// Errors that can occur during copy operations.
///
/// All errors include the path they happened on. Use
/// [`std::error::Error::source`] to reach the underlying IO error where one
/// exists.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// IO error without a more specific classification
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Source path does not exist
    #[error("Source path does not exist: {0}")]
    SourceNotFound(PathBuf),

    /// Source exists but its status could not be read
    #[error("Cannot read source {path}: {source}")]
    SourceUnreadable {
        /// Source path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Source and destination resolve to the same file or directory
    #[error("Source and destination are the same: {0}")]
    SameFile(PathBuf),

    /// Destination status query failed for a reason other than "not found"
    #[error("Cannot read destination {path}: {source}")]
    DestinationUnreadable {
        /// Destination path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Source and destination kinds are incompatible (file vs directory)
    #[error("{reason}: {path}")]
    DestinationTypeMismatch {
        /// Destination path
        path: PathBuf,
        /// Which way the mismatch goes
        reason: MismatchReason,
    },

    /// Destination exists and no conflict policy was supplied
    #[error("Destination already exists and no conflict policy was given: {0}")]
    ConflictPolicyRequired(PathBuf),

    /// No free name could be generated for a renamed entry
    #[error("Cannot find a free name for: {0}")]
    RenameExhausted(PathBuf),

    /// Reading or writing one byte range of a file failed
    #[error("Failed to copy {path} at offset {offset}: {source}")]
    RangeCopy {
        /// Source file path
        path: PathBuf,
        /// Offset at which the read or write failed
        offset: u64,
        /// Underlying error
        source: io::Error,
    },

    /// Failed to open a source file for reading
    #[error("Failed to open {path}: {source}")]
    Open {
        /// Path being opened
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Failed to create temporary file
    #[error("Failed to create temporary file in {path}: {source}")]
    TempFile {
        /// Directory where temp file creation was attempted
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Failed to publish the finished temporary file
    #[error("Failed to persist temporary file to {path}: {source}")]
    Persist {
        /// Target path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Failed to create a destination directory
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        /// Directory path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },
}

/// Direction of a [`Error::DestinationTypeMismatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchReason {
    /// Source is a directory, destination is an existing file
    DirectoryOntoFile,
    /// Source is a file, destination is an existing directory
    FileOntoDirectory,
}

impl fmt::Display for MismatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectoryOntoFile => f.write_str("Cannot copy directory to file path"),
            Self::FileOntoDirectory => write!(
                f,
                "Cannot copy file to directory (append '{}' to copy into it)",
                std::path::MAIN_SEPARATOR
            ),
        }
    }
}

/// Stable machine-readable error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// Invalid arguments or usage
    InvalidInput,
    /// Source path missing
    SourceNotFound,
    /// Source not readable, or same as destination
    SourceUnreadable,
    /// Destination status unreadable
    DestinationUnreadable,
    /// File/directory kind conflict
    DestinationTypeMismatch,
    /// Conflict needs a policy decision
    ConflictPolicyRequired,
    /// Rename could not find a free name
    RenameExhausted,
    /// A byte range failed to copy
    RangeCopy,
    /// Destination out of space
    NoSpace,
    /// Permission denied
    PermissionDenied,
    /// Other IO failure
    IoError,
    /// Unexpected internal failure
    Internal,
}

impl ErrorCode {
    /// Return the snake_case name of this code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::SourceNotFound => "source_not_found",
            Self::SourceUnreadable => "source_unreadable",
            Self::DestinationUnreadable => "destination_unreadable",
            Self::DestinationTypeMismatch => "destination_type_mismatch",
            Self::ConflictPolicyRequired => "conflict_policy_required",
            Self::RenameExhausted => "rename_exhausted",
            Self::RangeCopy => "range_copy",
            Self::NoSpace => "no_space",
            Self::PermissionDenied => "permission_denied",
            Self::IoError => "io_error",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn io_code(error: &io::Error) -> ErrorCode {
    if is_no_space_error(error) {
        ErrorCode::NoSpace
    } else if error.kind() == io::ErrorKind::PermissionDenied {
        ErrorCode::PermissionDenied
    } else {
        ErrorCode::IoError
    }
}

impl Error {
    /// Whether this error aborts the whole operation when raised for the
    /// top-level request.
    ///
    /// Per-file kinds ([`Error::RangeCopy`], [`Error::Open`], ...) are never
    /// fatal: they are recorded and the remaining files are still copied.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::SourceNotFound(_)
                | Self::SourceUnreadable { .. }
                | Self::SameFile(_)
                | Self::DestinationUnreadable { .. }
                | Self::DestinationTypeMismatch { .. }
                | Self::ConflictPolicyRequired(_)
        )
    }

    /// Offset of a failed range copy, if this is one.
    #[must_use]
    pub fn offset(&self) -> Option<u64> {
        match self {
            Self::RangeCopy { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    /// Map this error to its stable [`ErrorCode`].
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::SourceNotFound(_) => ErrorCode::SourceNotFound,
            Self::SourceUnreadable { .. } | Self::SameFile(_) => ErrorCode::SourceUnreadable,
            Self::DestinationUnreadable { .. } => ErrorCode::DestinationUnreadable,
            Self::DestinationTypeMismatch { .. } => ErrorCode::DestinationTypeMismatch,
            Self::ConflictPolicyRequired(_) => ErrorCode::ConflictPolicyRequired,
            Self::RenameExhausted(_) => ErrorCode::RenameExhausted,
            Self::RangeCopy { source, .. } => {
                if is_no_space_error(source) {
                    ErrorCode::NoSpace
                } else {
                    ErrorCode::RangeCopy
                }
            }
            Self::Io(source)
            | Self::Open { source, .. }
            | Self::TempFile { source, .. }
            | Self::Persist { source, .. }
            | Self::CreateDir { source, .. } => io_code(source),
        }
    }
}
