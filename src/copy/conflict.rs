//! Conflict resolution.
//!
//! Decides, for one source entry and the current state of its destination,
//! whether the copy proceeds (and where), is skipped, or fails. The policy is
//! fixed for the lifetime of a [`ConflictResolver`], which lives for exactly
//! one copy operation.
//!
//! | Destination | Source | Outcome |
//! |-------------|--------|---------|
//! | missing | any | proceed to the requested path |
//! | file | file | policy: rename, overwrite or skip |
//! | directory | directory | merge; children are resolved one by one |
//! | directory | file | fail: type mismatch |
//! | file | directory | fail: type mismatch |

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use super::classify::{PathKind, PathStatus};
use super::utils::dir_is_empty;
use crate::error::{Error, MismatchReason};
use crate::options::ConflictPolicy;

/// How a proceeding entry is written to its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Nothing is there; create it
    Create,
    /// An existing file is replaced
    Replace,
    /// An existing directory is reused and its children resolved individually
    Merge,
}

/// Outcome of resolving one entry.
#[derive(Debug)]
pub enum Resolution {
    /// Copy to `destination`
    Proceed {
        /// Effective destination (differs from the requested one after a rename)
        destination: PathBuf,
        /// How to write it
        mode: WriteMode,
    },
    /// Leave the destination alone and do not copy
    Skip,
    /// The entry cannot be copied
    Fail(Error),
}

/// Applies one [`ConflictPolicy`] to every entry of a copy operation.
///
/// The resolver remembers every destination it has handed out, so a name
/// generated for one renamed entry is never handed out again in the same
/// operation even though nothing exists on disk yet.
#[derive(Debug)]
pub struct ConflictResolver {
    policy: Option<ConflictPolicy>,
    claimed: HashSet<PathBuf>,
}

impl ConflictResolver {
    /// Create a resolver. `None` makes every real conflict fail with
    /// [`Error::ConflictPolicyRequired`].
    #[must_use]
    pub fn new(policy: Option<ConflictPolicy>) -> Self {
        Self {
            policy,
            claimed: HashSet::new(),
        }
    }

    /// The policy this resolver applies
    #[must_use]
    pub fn policy(&self) -> Option<ConflictPolicy> {
        self.policy
    }

    /// Resolve copying an entry of kind `source` onto `destination`.
    pub fn resolve(&mut self, source: PathKind, destination: &PathStatus) -> Resolution {
        let path = &destination.path;
        match (source, destination.kind) {
            (PathKind::Missing, _) => Resolution::Fail(Error::SourceNotFound(path.clone())),

            (_, PathKind::Missing) if !self.claimed.contains(path) => {
                self.claimed.insert(path.clone());
                Resolution::Proceed {
                    destination: path.clone(),
                    mode: WriteMode::Create,
                }
            }

            // Taken by an earlier rename in this operation
            (_, PathKind::Missing) => self.rename(path),

            (PathKind::Directory, PathKind::Directory) => {
                // Reading errors count as "not empty" so the caller still has to decide
                let empty = dir_is_empty(path).unwrap_or(false);
                if !empty && self.policy.is_none() {
                    return Resolution::Fail(Error::ConflictPolicyRequired(path.clone()));
                }
                Resolution::Proceed {
                    destination: path.clone(),
                    mode: WriteMode::Merge,
                }
            }

            (PathKind::File { .. }, PathKind::Directory) => {
                Resolution::Fail(Error::DestinationTypeMismatch {
                    path: path.clone(),
                    reason: MismatchReason::FileOntoDirectory,
                })
            }

            (PathKind::Directory, PathKind::File { .. }) => {
                Resolution::Fail(Error::DestinationTypeMismatch {
                    path: path.clone(),
                    reason: MismatchReason::DirectoryOntoFile,
                })
            }

            (PathKind::File { .. }, PathKind::File { .. }) => match self.policy {
                None => Resolution::Fail(Error::ConflictPolicyRequired(path.clone())),
                Some(ConflictPolicy::Ignore) => Resolution::Skip,
                Some(ConflictPolicy::Overwrite) => Resolution::Proceed {
                    destination: path.clone(),
                    mode: WriteMode::Replace,
                },
                Some(ConflictPolicy::Rename) => self.rename(path),
            },
        }
    }

    fn rename(&mut self, path: &Path) -> Resolution {
        let claimed = &self.claimed;
        let free = next_free_name(path, |candidate| {
            claimed.contains(candidate) || fs::symlink_metadata(candidate).is_ok()
        });
        match free {
            Some(destination) => {
                self.claimed.insert(destination.clone());
                Resolution::Proceed {
                    destination,
                    mode: WriteMode::Create,
                }
            }
            None => Resolution::Fail(Error::RenameExhausted(path.to_path_buf())),
        }
    }
}

/// Find the first `stem-N.ext` sibling of `path` (N = 1, 2, ...) for which
/// `taken` returns false.
///
/// Dotfiles keep their whole name as the stem (`.env` becomes `.env-1`).
/// Returns `None` if `path` has no file name or the counter runs out.
pub fn next_free_name(path: &Path, taken: impl Fn(&Path) -> bool) -> Option<PathBuf> {
    let stem = path.file_stem()?;
    let extension = path.extension();
    let parent = path.parent().unwrap_or_else(|| Path::new(""));

    let mut n: u64 = 1;
    loop {
        let mut name = OsString::from(stem);
        name.push(format!("-{n}"));
        if let Some(ext) = extension {
            name.push(".");
            name.push(ext);
        }
        let candidate = parent.join(name);
        if !taken(&candidate) {
            return Some(candidate);
        }
        n = n.checked_add(1)?;
    }
}
