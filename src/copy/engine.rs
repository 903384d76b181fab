//! Top-level copy driver.
//!
//! One invocation moves through four phases:
//!
//! 1. **Classifying**: inspect source and destination once.
//! 2. **Resolving**: resolve the top-level conflict; for directories, walk
//!    the tree and resolve every entry.
//! 3. **Planning**: split every file into ranges by size tier.
//! 4. **Copying**: run all ranges of all files on one bounded worker pool.
//!
//! and ends in one of three [`CopyState`]s. A failure in phases 1 or 2 at
//! the top level means nothing is copied ([`CopyState::Failed`]). Failures on
//! individual entries are collected and the rest of the operation goes on
//! ([`CopyState::PartiallyFailed`]), unless no entry succeeded at all.

use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::chunk::{ChunkCopier, PositionedCopier};
use super::classify::{CopyScenario, PathKind, PathStatus, classify};
use super::conflict::{ConflictResolver, Resolution, WriteMode};
use super::dir::{WalkPlan, walk_dir};
use super::file::{CopyTask, execute_task};
use super::utils::{dir_is_empty, is_same_entry};
use crate::error::{Error, Result};
use crate::options::CopyOptions;
use crate::utils::path::DestinationTarget;

/// Final state of a copy operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyState {
    /// Everything that was not skipped was copied
    Completed,
    /// Some entries failed, the rest were copied
    PartiallyFailed,
    /// The operation could not begin, or every entry in it failed
    Failed,
}

impl CopyState {
    /// Lowercase name of this state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::PartiallyFailed => "partially_failed",
            Self::Failed => "failed",
        }
    }
}

/// One entry that could not be copied.
#[derive(Debug)]
pub struct CopyFailure {
    /// Source path of the entry
    pub path: PathBuf,
    /// Why it failed
    pub error: Error,
}

impl CopyFailure {
    pub(crate) fn new(path: PathBuf, error: Error) -> Self {
        Self { path, error }
    }

    /// Offset of the failed range, for range copy failures
    #[must_use]
    pub fn offset(&self) -> Option<u64> {
        self.error.offset()
    }
}

/// Result of a copy operation.
///
/// # Example
///
/// ```no_run
/// use cpm::{CopyOptions, CopyState, copy};
/// use std::path::Path;
///
/// let result = copy(Path::new("data"), Path::new("backup/"), &CopyOptions::default());
/// if result.state != CopyState::Completed {
///     for failure in &result.failures {
///         eprintln!("{}: {}", failure.path.display(), failure.error);
///     }
/// }
/// ```
#[derive(Debug)]
pub struct CopyResult {
    /// Terminal state
    pub state: CopyState,
    /// Absolute source path
    pub source: PathBuf,
    /// Effective top-level destination, once known (after any rename)
    pub destination: Option<PathBuf>,
    /// Number of files copied
    pub files_copied: u64,
    /// Number of files skipped by the conflict policy
    pub files_skipped: u64,
    /// Number of directories created
    pub dirs_created: u64,
    /// Total bytes copied
    pub bytes_copied: u64,
    /// Every failure, in the order it was recorded
    pub failures: Vec<CopyFailure>,
    /// Wall time of the operation
    pub duration: Duration,
}

impl CopyResult {
    fn new(source: PathBuf) -> Self {
        Self {
            state: CopyState::Completed,
            source,
            destination: None,
            files_copied: 0,
            files_skipped: 0,
            dirs_created: 0,
            bytes_copied: 0,
            failures: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    fn failed(mut self, error: Error, start: Instant) -> Self {
        self.state = CopyState::Failed;
        let path = self.source.clone();
        self.failures.push(CopyFailure::new(path, error));
        self.duration = start.elapsed();
        self
    }

    /// Whether the operation completed without failures.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.state == CopyState::Completed
    }

    /// The first error of a [`CopyState::Failed`] operation.
    #[must_use]
    pub fn fatal_error(&self) -> Option<&Error> {
        match self.state {
            CopyState::Failed => self.failures.first().map(|f| &f.error),
            _ => None,
        }
    }
}

/// A classified copy request.
#[derive(Debug, Clone)]
pub struct Request {
    /// Source status
    pub source: PathStatus,
    /// Destination status, after trailing-separator normalization
    pub destination: PathStatus,
    /// How the two relate
    pub scenario: CopyScenario,
}

impl Request {
    /// Whether resolving this request needs a conflict policy: the
    /// destination file exists, or the destination directory is not empty.
    #[must_use]
    pub fn needs_policy(&self) -> bool {
        match (self.scenario, self.destination.kind) {
            (CopyScenario::FileToFile, PathKind::File { .. }) => true,
            (CopyScenario::DirectoryToDirectory, PathKind::Directory) => {
                !dir_is_empty(&self.destination.path).unwrap_or(false)
            }
            _ => false,
        }
    }
}

/// Classify a copy of `src` to `dst` without copying anything.
///
/// A `dst` ending in a path separator means "into this directory": the
/// source's base name is appended.
///
/// # Errors
///
/// - [`Error::SourceNotFound`] if `src` does not exist
/// - [`Error::SourceUnreadable`] if `src` cannot be inspected
/// - [`Error::DestinationUnreadable`] if `dst` cannot be inspected
/// - [`Error::SameFile`] if both resolve to the same file or directory
pub fn inspect(src: &Path, dst: &Path) -> Result<Request> {
    let source = classify(src).map_err(|source| Error::SourceUnreadable {
        path: src.to_path_buf(),
        source,
    })?;
    if !source.exists() {
        return Err(Error::SourceNotFound(source.path));
    }

    let dst_path = DestinationTarget::parse(dst).resolve(&source.path)?;
    let destination = classify(&dst_path).map_err(|source| Error::DestinationUnreadable {
        path: dst_path.clone(),
        source,
    })?;

    if destination.exists() && is_same_entry(&source.path, &destination.path) {
        return Err(Error::SameFile(destination.path));
    }

    let scenario = CopyScenario::from_kinds(source.kind, destination.kind)
        .ok_or_else(|| Error::SourceNotFound(source.path.clone()))?;

    Ok(Request {
        source,
        destination,
        scenario,
    })
}

/// Copy `src` to `dst` with the standard range copier.
///
/// See [`copy_with`].
#[must_use]
pub fn copy(src: &Path, dst: &Path, options: &CopyOptions) -> CopyResult {
    copy_with(src, dst, options, &PositionedCopier::new(options.buffer_size))
}

/// Copy `src` to `dst`, running every range through `copier`.
///
/// Never panics and never returns early with an error: the outcome, including
/// a fatal one, is reported in the returned [`CopyResult`].
pub fn copy_with<C: ChunkCopier>(
    src: &Path,
    dst: &Path,
    options: &CopyOptions,
    copier: &C,
) -> CopyResult {
    let start = Instant::now();

    options.debug(&format!("classifying {} -> {}", src.display(), dst.display()));
    let request = match inspect(src, dst) {
        Ok(request) => request,
        Err(error) => {
            let source = crate::utils::path::absolute(src).unwrap_or_else(|_| src.to_path_buf());
            return CopyResult::new(source).failed(error, start);
        }
    };
    let mut result = CopyResult::new(request.source.path.clone());

    options.debug(&format!("resolving {:?}", request.scenario));
    let mut resolver = ConflictResolver::new(options.on_conflict);
    let (destination, mode) = match resolver.resolve(request.source.kind, &request.destination) {
        Resolution::Proceed { destination, mode } => (destination, mode),
        Resolution::Skip => {
            options.debug(&format!(
                "skipped {} ({} exists)",
                request.source.path.display(),
                request.destination.path.display()
            ));
            result.files_skipped = 1;
            result.destination = Some(request.destination.path);
            result.duration = start.elapsed();
            return result;
        }
        Resolution::Fail(error) => return result.failed(error, start),
    };
    result.destination = Some(destination.clone());

    let top_level = (mode == WriteMode::Create).then(|| destination.clone());
    let mut plan = WalkPlan::default();
    match request.source.kind {
        PathKind::File { size } => {
            plan.tasks
                .push(CopyTask::new(request.source.path.clone(), destination, mode, size));
        }
        _ => {
            if mode == WriteMode::Create {
                plan.dirs.push(destination.clone());
            }
            let merge = mode == WriteMode::Merge;
            if let Err(source) = walk_dir(
                &request.source.path,
                &destination,
                merge,
                &mut resolver,
                &mut plan,
                options,
            ) {
                let error = Error::SourceUnreadable {
                    path: request.source.path.clone(),
                    source,
                };
                return result.failed(error, start);
            }
        }
    }

    options.debug(&format!(
        "planned {} files, {} directories",
        plan.tasks.len(),
        plan.dirs.len()
    ));

    result.files_skipped = plan.skipped;
    result.failures = plan.failures;

    // Directories are created in walk order, so parents come first
    let mut failed_dirs: Vec<PathBuf> = Vec::new();
    for dir in &plan.dirs {
        if failed_dirs.iter().any(|failed| dir.starts_with(failed)) {
            continue;
        }
        match fs::create_dir(dir) {
            Ok(()) => result.dirs_created += 1,
            Err(source) => {
                let error = Error::CreateDir {
                    path: dir.clone(),
                    source,
                };
                if top_level.as_ref() == Some(dir) {
                    return result.failed(error, start);
                }
                options.warn(&error.to_string());
                result.failures.push(CopyFailure::new(dir.clone(), error));
                failed_dirs.push(dir.clone());
            }
        }
    }
    let tasks: Vec<CopyTask> = plan
        .tasks
        .into_iter()
        .filter(|t| !failed_dirs.iter().any(|d| t.destination.starts_with(d)))
        .collect();

    options.debug(&format!(
        "copying {} files with up to {} workers",
        tasks.len(),
        options.max_workers
    ));
    let outcomes = run_on_pool(options, || {
        tasks
            .par_iter()
            .map(|task| (task, execute_task(task, copier, options)))
            .collect::<Vec<_>>()
    });

    for (task, outcome) in outcomes {
        match outcome {
            Ok(bytes) => {
                result.files_copied += 1;
                result.bytes_copied += bytes;
                options.debug(&format!(
                    "copied {} -> {} ({} bytes)",
                    task.source.display(),
                    task.destination.display(),
                    bytes
                ));
            }
            Err(error) => {
                options.warn(&format!("Failed to copy {}: {}", task.source.display(), error));
                result
                    .failures
                    .push(CopyFailure::new(task.source.clone(), error));
            }
        }
    }

    let anything_done =
        result.files_copied > 0 || result.dirs_created > 0 || result.files_skipped > 0;
    result.state = if result.failures.is_empty() {
        CopyState::Completed
    } else if anything_done {
        CopyState::PartiallyFailed
    } else {
        CopyState::Failed
    };
    result.duration = start.elapsed();
    result
}

/// Run `op` on a pool of `options.max_workers` threads.
///
/// Every range of every file is scheduled on this one pool, which is what
/// caps the number of concurrent copiers for the whole operation.
fn run_on_pool<R: Send>(options: &CopyOptions, op: impl FnOnce() -> R + Send) -> R {
    if options.max_workers == rayon::current_num_threads() {
        return op();
    }
    match rayon::ThreadPoolBuilder::new()
        .num_threads(options.max_workers)
        .build()
    {
        Ok(pool) => pool.install(op),
        Err(e) => {
            options.warn(&format!(
                "Failed to create thread pool ({e}), using global pool"
            ));
            op()
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
