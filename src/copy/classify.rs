//! Path classification.
//!
//! Each path involved in a copy is inspected once with a single status query
//! and summarized as a [`PathStatus`]. The pair of source and destination
//! kinds then determines the [`CopyScenario`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Filesystem kind of a path at the moment it was inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// Regular file of the given size in bytes
    File {
        /// Size in bytes
        size: u64,
    },
    /// Directory
    Directory,
    /// Nothing exists at the path
    Missing,
}

/// An absolute path together with its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStatus {
    /// Absolute path that was inspected
    pub path: PathBuf,
    /// What was found there
    pub kind: PathKind,
}

impl PathStatus {
    /// Whether anything exists at the path
    #[must_use]
    pub fn exists(&self) -> bool {
        self.kind != PathKind::Missing
    }

    /// Whether the path is a directory
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == PathKind::Directory
    }

    /// Size of the file, or 0 for anything else
    #[must_use]
    pub fn size(&self) -> u64 {
        match self.kind {
            PathKind::File { size } => size,
            _ => 0,
        }
    }
}

/// Classify `path`.
///
/// Symlinks are followed. A path that does not exist is reported as
/// [`PathKind::Missing`], not as an error.
///
/// # Errors
///
/// Any other status failure (permission denied, IO error) is returned as is.
/// Sockets, FIFOs and device nodes are rejected with
/// [`io::ErrorKind::InvalidInput`] since they cannot be range-copied.
pub fn classify(path: &Path) -> io::Result<PathStatus> {
    let path = std::path::absolute(path)?;
    let kind = match fs::metadata(&path) {
        Ok(meta) if meta.is_dir() => PathKind::Directory,
        Ok(meta) if meta.is_file() => PathKind::File { size: meta.len() },
        Ok(_) => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file or directory",
            ));
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => PathKind::Missing,
        Err(e) => return Err(e),
    };
    Ok(PathStatus { path, kind })
}

/// The four ways a copy request can pair source and destination kinds.
///
/// A missing destination takes the source's kind: copying a file to a
/// missing path is [`CopyScenario::FileToFile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyScenario {
    /// File onto a file path
    FileToFile,
    /// File onto an existing directory
    FileToDirectory,
    /// Directory onto an existing file (never proceeds)
    DirectoryToFile,
    /// Directory onto a directory path
    DirectoryToDirectory,
}

impl CopyScenario {
    /// Derive the scenario from a source and destination kind.
    ///
    /// Returns `None` when the source is missing.
    #[must_use]
    pub fn from_kinds(source: PathKind, destination: PathKind) -> Option<Self> {
        match (source, destination) {
            (PathKind::Missing, _) => None,
            (PathKind::File { .. }, PathKind::Directory) => Some(Self::FileToDirectory),
            (PathKind::File { .. }, _) => Some(Self::FileToFile),
            (PathKind::Directory, PathKind::File { .. }) => Some(Self::DirectoryToFile),
            (PathKind::Directory, _) => Some(Self::DirectoryToDirectory),
        }
    }

    /// Whether the source is a directory.
    #[must_use]
    pub fn source_is_dir(self) -> bool {
        matches!(self, Self::DirectoryToFile | Self::DirectoryToDirectory)
    }

    /// Whether source and destination kinds disagree.
    #[must_use]
    pub fn is_mismatch(self) -> bool {
        matches!(self, Self::FileToDirectory | Self::DirectoryToFile)
    }
}
