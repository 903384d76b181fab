//! Copying one file through concurrent range copiers.
//!
//! The destination is opened once, as a temporary file next to the final
//! path, before any range copier starts. All copiers write into that one
//! handle at their own offsets. The temporary file is published under the
//! destination name only after every range has succeeded, so a failed copy
//! never leaves a partial file behind and an overwritten file stays intact
//! until its replacement is complete.

use rayon::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};

use super::chunk::ChunkCopier;
use super::conflict::WriteMode;
use super::plan::{CopyRange, plan};
use crate::error::{Error, Result};
use crate::options::CopyOptions;

/// One file to copy, split into ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyTask {
    /// Source file
    pub source: PathBuf,
    /// Final destination path
    pub destination: PathBuf,
    /// Whether the destination is created or replaced
    pub mode: WriteMode,
    /// Ranges in offset order, covering the whole source
    pub ranges: Vec<CopyRange>,
}

impl CopyTask {
    /// Create a task for a source of `size` bytes, planned by size tier.
    #[must_use]
    pub fn new(source: PathBuf, destination: PathBuf, mode: WriteMode, size: u64) -> Self {
        Self {
            source,
            destination,
            mode,
            ranges: plan(size).ranges,
        }
    }

    /// Planned size in bytes
    #[must_use]
    pub fn size(&self) -> u64 {
        self.ranges.last().map_or(0, CopyRange::end)
    }
}

/// Run every range of `task` and publish the result.
///
/// Ranges run on the current rayon pool. When one range fails the others are
/// still allowed to finish before the task reports the failure with the
/// lowest failing offset.
///
/// # Errors
///
/// - [`Error::Open`] if the source cannot be opened
/// - [`Error::TempFile`] if the destination cannot be created
/// - [`Error::RangeCopy`] if any range fails
/// - [`Error::Persist`] if the finished file cannot be moved into place
pub(crate) fn execute_task<C: ChunkCopier>(
    task: &CopyTask,
    copier: &C,
    options: &CopyOptions,
) -> Result<u64> {
    let src = File::open(&task.source).map_err(|source| Error::Open {
        path: task.source.clone(),
        source,
    })?;

    let parent = task.destination.parent().unwrap_or(Path::new("."));
    let temp = create_temp(parent)?;

    options.debug(&format!(
        "copying {} -> {} ({} bytes, {} workers)",
        task.source.display(),
        task.destination.display(),
        task.size(),
        task.ranges.len()
    ));

    let dst = temp.as_file();
    let outcomes: Vec<_> = task
        .ranges
        .par_iter()
        .map(|range| copier.copy_range(&src, dst, *range))
        .collect();

    let mut bytes = 0u64;
    for outcome in outcomes {
        match outcome {
            Ok(n) => bytes += n,
            Err(e) => {
                return Err(Error::RangeCopy {
                    path: task.source.clone(),
                    offset: e.offset,
                    source: e.source,
                });
            }
        }
    }

    if options.fsync {
        dst.sync_all()?;
    }

    let persisted = match task.mode {
        WriteMode::Replace => temp.persist(&task.destination),
        WriteMode::Create | WriteMode::Merge => temp.persist_noclobber(&task.destination),
    };
    persisted.map_err(|e| Error::Persist {
        path: task.destination.clone(),
        source: e.error,
    })?;

    Ok(bytes)
}

fn create_temp(dir: &Path) -> Result<tempfile::NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".cpm-");

    // Same mode a plain create would get, after umask
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }

    builder.tempfile_in(dir).map_err(|source| Error::TempFile {
        path: dir.to_path_buf(),
        source,
    })
}

// =============================================================================
// Tests
// =============================================================================
