//! Configuration options for copy operations.
//!
//! This module provides [`CopyOptions`] for configuring copy behavior and
//! [`ConflictPolicy`] for handling destination conflicts.
//!
//! # Example
//!
//! ```
//! use cpm::{ConflictPolicy, CopyOptions};
//!
//! let options = CopyOptions::default()
//!     .with_max_workers(8)
//!     .with_on_conflict(ConflictPolicy::Overwrite)
//!     .with_buffer_size(256 * 1024);
//! ```

use std::str::FromStr;

/// What to do when a destination entry already exists.
///
/// One policy is chosen per operation and applied to every conflicting
/// entry, including entries nested inside a directory merge.
///
/// # Default
///
/// The default is [`ConflictPolicy::Rename`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ConflictPolicy {
    /// Write to a generated name that does not collide with anything at the
    /// destination (`report.txt` becomes `report-1.txt`).
    #[default]
    Rename,
    /// Replace the existing file's content with the source's.
    Overwrite,
    /// Leave the existing file untouched and skip the entry.
    Ignore,
}

impl ConflictPolicy {
    /// Lowercase name of this policy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rename => "rename",
            Self::Overwrite => "overwrite",
            Self::Ignore => "ignore",
        }
    }
}

impl FromStr for ConflictPolicy {
    type Err = String;

    /// Accepts full names and the single-letter answers `r`, `o`, `i`
    /// (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "r" | "rename" => Ok(Self::Rename),
            "o" | "overwrite" => Ok(Self::Overwrite),
            "i" | "ignore" => Ok(Self::Ignore),
            other => Err(format!("invalid conflict policy: {other}")),
        }
    }
}

/// Options for copy operations.
///
/// # Default Values
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `on_conflict` | `Some(Rename)` | Policy for existing destinations |
/// | `max_workers` | 16 | Cap on concurrently running range copies |
/// | `buffer_size` | 64 KiB | Per-worker read/write buffer |
/// | `fsync` | `true` | Sync each file before publishing it |
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CopyOptions {
    /// Policy applied to every conflict in the operation.
    ///
    /// `None` means no decision has been made yet: the first conflict that
    /// needs one fails with [`Error::ConflictPolicyRequired`](crate::Error::ConflictPolicyRequired).
    pub on_conflict: Option<ConflictPolicy>,

    /// Maximum number of range copies in flight across the whole operation
    ///
    /// This bounds the worker pool shared by every file, so a directory with
    /// many large files never runs more than this many copiers at once.
    pub max_workers: usize,

    /// Size of the buffer each range copier reads into
    pub buffer_size: usize,

    /// Whether to sync files to disk before publishing them (default: true)
    pub fsync: bool,

    /// Callback for warnings (optional)
    ///
    /// If not set and `tracing` feature is enabled, warnings are logged via tracing.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub warn_handler: Option<fn(&str)>,

    /// Callback for per-entry progress messages (optional)
    #[cfg_attr(feature = "serde", serde(skip))]
    pub debug_handler: Option<fn(&str)>,
}

/// Default worker cap.
pub const DEFAULT_MAX_WORKERS: usize = 16;

/// Default range copier buffer size.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            on_conflict: Some(ConflictPolicy::Rename),
            max_workers: DEFAULT_MAX_WORKERS,
            buffer_size: DEFAULT_BUFFER_SIZE,
            fsync: true,
            warn_handler: None,
            debug_handler: None,
        }
    }
}

impl CopyOptions {
    /// Set the conflict policy
    #[must_use]
    pub fn with_on_conflict(mut self, policy: ConflictPolicy) -> Self {
        self.on_conflict = Some(policy);
        self
    }

    /// Clear the conflict policy so conflicts surface as
    /// [`Error::ConflictPolicyRequired`](crate::Error::ConflictPolicyRequired)
    #[must_use]
    pub fn without_conflict_policy(mut self) -> Self {
        self.on_conflict = None;
        self
    }

    /// Set the global cap on concurrent range copies
    ///
    /// Value is clamped to at least 1.
    #[must_use]
    pub fn with_max_workers(mut self, n: usize) -> Self {
        self.max_workers = n.max(1);
        self
    }

    /// Set the range copier buffer size
    ///
    /// Value is clamped to at least 1 byte.
    #[must_use]
    pub fn with_buffer_size(mut self, bytes: usize) -> Self {
        self.buffer_size = bytes.max(1);
        self
    }

    /// Disable fsync for faster (but less durable) copies
    #[must_use]
    pub fn without_fsync(mut self) -> Self {
        self.fsync = false;
        self
    }

    /// Install a warning handler
    #[must_use]
    pub fn with_warn_handler(mut self, handler: fn(&str)) -> Self {
        self.warn_handler = Some(handler);
        self
    }

    /// Install a handler for per-entry progress messages
    #[must_use]
    pub fn with_debug_handler(mut self, handler: fn(&str)) -> Self {
        self.debug_handler = Some(handler);
        self
    }

    pub(crate) fn warn(&self, msg: &str) {
        if let Some(handler) = self.warn_handler {
            handler(msg);
        } else {
            #[cfg(feature = "tracing")]
            tracing::warn!("{}", msg);
        }
    }

    pub(crate) fn debug(&self, msg: &str) {
        if let Some(handler) = self.debug_handler {
            handler(msg);
        } else {
            #[cfg(feature = "tracing")]
            tracing::debug!("{}", msg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CopyOptions::default();
        assert_eq!(options.on_conflict, Some(ConflictPolicy::Rename));
        assert_eq!(options.max_workers, 16);
        assert_eq!(options.buffer_size, 64 * 1024);
        assert!(options.fsync);
    }

    #[test]
    fn test_clamping() {
        let options = CopyOptions::default()
            .with_max_workers(0)
            .with_buffer_size(0);
        assert_eq!(options.max_workers, 1);
        assert_eq!(options.buffer_size, 1);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("R".parse::<ConflictPolicy>(), Ok(ConflictPolicy::Rename));
        assert_eq!("o".parse::<ConflictPolicy>(), Ok(ConflictPolicy::Overwrite));
        assert_eq!(" Ignore\n".parse::<ConflictPolicy>(), Ok(ConflictPolicy::Ignore));
        assert!("x".parse::<ConflictPolicy>().is_err());
    }

    #[test]
    fn test_without_conflict_policy() {
        let options = CopyOptions::default().without_conflict_policy();
        assert_eq!(options.on_conflict, None);
    }
}
