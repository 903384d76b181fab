//! Path utilities for resolving what the user typed into the paths the
//! engine works with.
//!
//! A destination that ends with a path separator (`backup/`) names a
//! directory to copy *into*; anything else names the target itself. The
//! distinction is made once, here, on the raw argument, before
//! [`absolute`] normalizes the trailing separator away.

use crate::error::{Error, Result};
use std::io;
use std::path::{Path, PathBuf};

/// How a user-supplied destination should be interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationTarget {
    /// The path is the copy target itself.
    Literal(PathBuf),
    /// The path is a directory; the source's base name is appended to it.
    IntoDirectory(PathBuf),
}

impl DestinationTarget {
    /// Classify a raw destination argument by its trailing separator.
    ///
    /// ```
    /// use cpm::DestinationTarget;
    /// use std::path::{Path, PathBuf};
    ///
    /// assert_eq!(
    ///     DestinationTarget::parse(Path::new("backup/")),
    ///     DestinationTarget::IntoDirectory(PathBuf::from("backup/"))
    /// );
    /// assert_eq!(
    ///     DestinationTarget::parse(Path::new("backup")),
    ///     DestinationTarget::Literal(PathBuf::from("backup"))
    /// );
    /// ```
    #[must_use]
    pub fn parse(raw: &Path) -> Self {
        if ends_with_separator(raw) {
            Self::IntoDirectory(raw.to_path_buf())
        } else {
            Self::Literal(raw.to_path_buf())
        }
    }

    /// Produce the absolute destination path for copying `source`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceUnreadable`] if the target is a directory and
    /// `source` has no base name (e.g. `/`), or [`Error::Io`] if the current
    /// directory cannot be determined.
    pub fn resolve(&self, source: &Path) -> Result<PathBuf> {
        match self {
            Self::Literal(path) => absolute(path),
            Self::IntoDirectory(dir) => {
                let name = source.file_name().ok_or_else(|| Error::SourceUnreadable {
                    path: source.to_path_buf(),
                    source: io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "source has no file name to copy into a directory",
                    ),
                })?;
                absolute(&dir.join(name))
            }
        }
    }
}

/// Whether the raw path text ends with a platform separator.
#[must_use]
pub fn ends_with_separator(path: &Path) -> bool {
    path.as_os_str()
        .as_encoded_bytes()
        .last()
        .is_some_and(|&b| b.is_ascii() && std::path::is_separator(b as char))
}

/// Make `path` absolute without touching the filesystem.
///
/// Symlinks and `..` components are left as they are; the path does not need
/// to exist.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(std::path::absolute(path)?)
}
