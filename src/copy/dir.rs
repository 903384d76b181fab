//! Directory tree walk.
//!
//! Walks a source directory depth-first, resolving every entry against the
//! destination as it goes. The walk only reads: it produces the list of
//! directories to create and the file tasks to run, and records entries that
//! could not be resolved. Nothing is written until the walk is complete.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::classify::{PathKind, PathStatus, classify};
use super::conflict::{ConflictResolver, Resolution, WriteMode};
use super::engine::CopyFailure;
use super::file::CopyTask;
use crate::error::Error;
use crate::options::CopyOptions;

/// Everything a walk decided.
#[derive(Debug, Default)]
pub(crate) struct WalkPlan {
    /// Destination directories to create, parents before children
    pub dirs: Vec<PathBuf>,
    /// Files to copy
    pub tasks: Vec<CopyTask>,
    /// Entries skipped by the conflict policy
    pub skipped: u64,
    /// Entries that could not be resolved; their subtrees are left out
    pub failures: Vec<CopyFailure>,
}

/// Walk `src_dir`, mapping it onto `dst_dir`.
///
/// `dst_exists` says whether `dst_dir` is an existing directory being merged
/// into. When it is not, nothing below it can exist either and destination
/// lookups are skipped.
///
/// Entries are visited in name order so that generated names are the same
/// from one run to the next.
///
/// # Errors
///
/// Returns an error only if `src_dir` itself cannot be listed. Failures below
/// it are recorded in `plan.failures`.
pub(crate) fn walk_dir(
    src_dir: &Path,
    dst_dir: &Path,
    dst_exists: bool,
    resolver: &mut ConflictResolver,
    plan: &mut WalkPlan,
    options: &CopyOptions,
) -> io::Result<()> {
    let mut entries = fs::read_dir(src_dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(fs::DirEntry::file_name);

    for entry in entries {
        let src_path = entry.path();
        let requested = dst_dir.join(entry.file_name());

        let source_kind = match entry.file_type() {
            Ok(ft) if ft.is_dir() => PathKind::Directory,
            Ok(ft) if ft.is_file() => match entry.metadata() {
                Ok(meta) => PathKind::File { size: meta.len() },
                Err(source) => {
                    plan.failures.push(CopyFailure::new(
                        src_path.clone(),
                        Error::SourceUnreadable {
                            path: src_path,
                            source,
                        },
                    ));
                    continue;
                }
            },
            Ok(ft) if ft.is_symlink() => {
                options.warn(&format!("Skipping symlink: {}", src_path.display()));
                continue;
            }
            Ok(_) => {
                options.warn(&format!("Skipping special file: {}", src_path.display()));
                continue;
            }
            Err(source) => {
                plan.failures.push(CopyFailure::new(
                    src_path.clone(),
                    Error::SourceUnreadable {
                        path: src_path,
                        source,
                    },
                ));
                continue;
            }
        };

        let destination = if dst_exists {
            match classify(&requested) {
                Ok(status) => status,
                Err(source) => {
                    plan.failures.push(CopyFailure::new(
                        src_path,
                        Error::DestinationUnreadable {
                            path: requested,
                            source,
                        },
                    ));
                    continue;
                }
            }
        } else {
            PathStatus {
                path: requested,
                kind: PathKind::Missing,
            }
        };

        match resolver.resolve(source_kind, &destination) {
            Resolution::Skip => {
                options.debug(&format!(
                    "skipped {} ({} exists)",
                    src_path.display(),
                    destination.path.display()
                ));
                plan.skipped += 1;
            }
            Resolution::Fail(error) => {
                options.warn(&format!("Cannot copy {}: {}", src_path.display(), error));
                plan.failures.push(CopyFailure::new(src_path, error));
            }
            Resolution::Proceed { destination, mode } => match source_kind {
                PathKind::File { size } => {
                    plan.tasks
                        .push(CopyTask::new(src_path, destination, mode, size));
                }
                _ => {
                    if mode == WriteMode::Create {
                        plan.dirs.push(destination.clone());
                    }
                    let merge = mode == WriteMode::Merge;
                    if let Err(source) =
                        walk_dir(&src_path, &destination, merge, resolver, plan, options)
                    {
                        plan.failures.push(CopyFailure::new(
                            src_path.clone(),
                            Error::SourceUnreadable {
                                path: src_path,
                                source,
                            },
                        ));
                    }
                }
            },
        }
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
