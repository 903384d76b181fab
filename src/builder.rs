//! Builder API for copy operations.
//!
//! The builder wraps [`CopyOptions`] in a fluent interface. It is usually
//! more convenient than building the options by hand.
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```no_run
//! use cpm::CopyBuilder;
//!
//! // Conflicts are resolved by renaming
//! let result = CopyBuilder::new("src", "dst").run();
//! println!("Copied {} files", result.files_copied);
//! ```
//!
//! ## With Options
//!
//! ```no_run
//! use cpm::CopyBuilder;
//!
//! let result = CopyBuilder::new("disk.img", "/mnt/backup/")
//!     .overwrite()
//!     .max_workers(4)
//!     .no_fsync()
//!     .run();
//!
//! if !result.is_success() {
//!     for failure in &result.failures {
//!         eprintln!("{}: {}", failure.path.display(), failure.error);
//!     }
//! }
//! ```
//!
//! ## Deciding on a Policy Later
//!
//! ```no_run
//! use cpm::CopyBuilder;
//!
//! let builder = CopyBuilder::new("src", "dst").ask();
//! let request = builder.inspect()?;
//! let builder = if request.needs_policy() {
//!     builder.ignore()
//! } else {
//!     builder
//! };
//! let result = builder.run();
//! # Ok::<(), cpm::Error>(())
//! ```

use crate::copy::{ChunkCopier, CopyResult, Request, copy, copy_with, inspect};
use crate::error::Result;
use crate::options::{ConflictPolicy, CopyOptions};
use std::path::{Path, PathBuf};

/// A builder for configuring and running one copy operation.
///
/// # Example
///
/// ```no_run
/// use cpm::CopyBuilder;
///
/// let result = CopyBuilder::new("/data/project", "/backup/")
///     .ignore()
///     .max_workers(8)
///     .run();
/// assert!(result.is_success());
/// ```
#[derive(Debug, Clone)]
pub struct CopyBuilder {
    src: PathBuf,
    dst: PathBuf,
    options: CopyOptions,
}

impl CopyBuilder {
    /// Create a new `CopyBuilder` with the given source and destination paths.
    ///
    /// Uses default options (rename on conflict, 16 workers, fsync).
    ///
    /// A destination ending in a path separator means "into this directory".
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dst: Q) -> Self {
        Self {
            src: src.as_ref().to_path_buf(),
            dst: dst.as_ref().to_path_buf(),
            options: CopyOptions::default(),
        }
    }

    /// Copy conflicting files under a new `name-N.ext` name (default behavior).
    #[must_use]
    pub fn rename(mut self) -> Self {
        self.options = self.options.with_on_conflict(ConflictPolicy::Rename);
        self
    }

    /// Replace conflicting files.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cpm::CopyBuilder;
    ///
    /// let result = CopyBuilder::new("report.pdf", "archive/report.pdf")
    ///     .overwrite()
    ///     .run();
    /// ```
    #[must_use]
    pub fn overwrite(mut self) -> Self {
        self.options = self.options.with_on_conflict(ConflictPolicy::Overwrite);
        self
    }

    /// Leave conflicting files alone and skip them.
    #[must_use]
    pub fn ignore(mut self) -> Self {
        self.options = self.options.with_on_conflict(ConflictPolicy::Ignore);
        self
    }

    /// Set the policy from a value, for callers that parsed one.
    #[must_use]
    pub fn on_conflict(mut self, policy: ConflictPolicy) -> Self {
        self.options = self.options.with_on_conflict(policy);
        self
    }

    /// Clear the conflict policy.
    ///
    /// Any real conflict then fails the operation with
    /// [`Error::ConflictPolicyRequired`](crate::Error::ConflictPolicyRequired).
    /// Use [`inspect`](Self::inspect) first to find out whether a policy is
    /// needed and ask the user for one.
    #[must_use]
    pub fn ask(mut self) -> Self {
        self.options = self.options.without_conflict_policy();
        self
    }

    /// Set the maximum number of concurrent range copiers.
    ///
    /// Default is 16. The limit holds across all files of the operation.
    #[must_use]
    pub fn max_workers(mut self, workers: usize) -> Self {
        self.options = self.options.with_max_workers(workers);
        self
    }

    /// Set the per-copier buffer size in bytes.
    #[must_use]
    pub fn buffer_size(mut self, bytes: usize) -> Self {
        self.options = self.options.with_buffer_size(bytes);
        self
    }

    /// Disable fsync after writing files.
    ///
    /// This improves performance but reduces durability guarantees.
    /// Files may be lost if the system crashes before the OS flushes buffers.
    #[must_use]
    pub fn no_fsync(mut self) -> Self {
        self.options = self.options.without_fsync();
        self
    }

    /// Set a handler for warnings (skipped symlinks, failed entries).
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cpm::CopyBuilder;
    ///
    /// let result = CopyBuilder::new("src", "dst")
    ///     .on_warning(|msg| eprintln!("warning: {msg}"))
    ///     .run();
    /// ```
    #[must_use]
    pub fn on_warning(mut self, handler: fn(&str)) -> Self {
        self.options = self.options.with_warn_handler(handler);
        self
    }

    /// Set a handler for per-phase and per-file progress messages.
    #[must_use]
    pub fn verbose(mut self, handler: fn(&str)) -> Self {
        self.options = self.options.with_debug_handler(handler);
        self
    }

    /// Get the current options
    pub fn options(&self) -> &CopyOptions {
        &self.options
    }

    /// Classify the request without copying anything.
    ///
    /// # Errors
    ///
    /// Same as [`crate::inspect`].
    pub fn inspect(&self) -> Result<Request> {
        inspect(&self.src, &self.dst)
    }

    /// Run the copy.
    ///
    /// Failures are reported in the returned [`CopyResult`]; check
    /// [`CopyResult::state`] or [`CopyResult::is_success`].
    pub fn run(self) -> CopyResult {
        copy(&self.src, &self.dst, &self.options)
    }

    /// Run the copy with a custom [`ChunkCopier`].
    pub fn run_with<C: ChunkCopier>(self, copier: &C) -> CopyResult {
        copy_with(&self.src, &self.dst, &self.options, copier)
    }
}
