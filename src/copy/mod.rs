//! Core copy operations.
//!
//! [`classify`] and [`inspect`] look at the paths, [`ConflictResolver`]
//! decides where each entry goes, [`plan`] splits files into ranges and a
//! [`ChunkCopier`] copies them. [`copy`] drives all of it.

mod chunk;
mod classify;
mod conflict;
mod dir;
mod engine;
mod file;
mod plan;
mod utils;

// Re-export public API
pub use chunk::{ChunkCopier, PositionedCopier, RangeError, copy_range};
pub use classify::{CopyScenario, PathKind, PathStatus, classify};
pub use conflict::{ConflictResolver, Resolution, WriteMode, next_free_name};
pub use engine::{CopyFailure, CopyResult, CopyState, Request, copy, copy_with, inspect};
pub use file::CopyTask;
pub use plan::{
    CopyRange, EIGHT_WORKER_THRESHOLD, FOUR_WORKER_THRESHOLD, RangePlan, TWO_WORKER_THRESHOLD,
    plan, plan_with_workers, worker_count,
};
