//! # cpm
//!
//! Copy files and directory trees with explicit conflict resolution and
//! concurrent ranged copies of large files.
//!
//! ## Core Features
//!
//! - **Explicit conflicts**: each operation runs under one policy: rename,
//!   overwrite or ignore
//! - **Ranged copies**: files over 20 MiB are split into 2, 4 or 8 byte ranges
//!   copied concurrently with positioned reads and writes
//! - **Bounded workers**: every range of every file runs on one pool capped at
//!   `max_workers`
//! - **No partial files**: files are written to a temp file and moved into
//!   place only when complete
//! - **Partial failure**: a failed file is reported and the rest of the tree is
//!   still copied
//!
//! ## Quick Start with Builder API
//!
//! ```no_run
//! use cpm::CopyBuilder;
//!
//! let result = CopyBuilder::new("src", "dst").run();
//! println!("Copied {} files ({} bytes)", result.files_copied, result.bytes_copied);
//! ```
//!
//! ## Function API
//!
//! ```no_run
//! use cpm::{ConflictPolicy, CopyOptions, CopyState, copy};
//! use std::path::Path;
//!
//! let options = CopyOptions::default()
//!     .with_on_conflict(ConflictPolicy::Ignore)
//!     .with_max_workers(8)
//!     .without_fsync();
//!
//! let result = copy(Path::new("photos"), Path::new("/mnt/backup/"), &options);
//! match result.state {
//!     CopyState::Completed => println!("done"),
//!     CopyState::PartiallyFailed => eprintln!("{} failures", result.failures.len()),
//!     CopyState::Failed => eprintln!("{:?}", result.fatal_error()),
//! }
//! ```
//!
//! ## Destination Rules
//!
//! | Source | Destination | Result |
//! |--------|-------------|--------|
//! | file | missing path | copied to that path |
//! | file | existing file | conflict policy applies |
//! | file | `dir/` (trailing separator) | copied into `dir` |
//! | file | `dir` (no separator) | error: type mismatch |
//! | directory | missing path | tree copied to that path |
//! | directory | existing directory | merged, children resolved one by one |
//! | directory | existing file | error: type mismatch |
//!
//! ## Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `tracing` | Structured logging with tracing crate |
//! | `serde` | Serialize/Deserialize for [`CopyOptions`] |
//! | `full` | Enable all optional features |

#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod copy;
mod error;
mod options;
mod utils;

pub use builder::CopyBuilder;
pub use copy::{
    ChunkCopier, ConflictResolver, CopyFailure, CopyRange, CopyResult, CopyScenario, CopyState,
    CopyTask, EIGHT_WORKER_THRESHOLD, FOUR_WORKER_THRESHOLD, PathKind, PathStatus,
    PositionedCopier, RangeError, RangePlan, Request, Resolution, TWO_WORKER_THRESHOLD, WriteMode,
    classify, copy, copy_range, copy_with, inspect, next_free_name, plan, plan_with_workers,
    worker_count,
};
pub use error::{Error, ErrorCode, MismatchReason, Result, is_no_space_error};
pub use options::{ConflictPolicy, CopyOptions, DEFAULT_BUFFER_SIZE, DEFAULT_MAX_WORKERS};
pub use utils::path::DestinationTarget;
