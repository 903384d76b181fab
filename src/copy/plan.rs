//! Splitting a file into byte ranges for concurrent copying.
//!
//! The worker count grows with file size in power-of-two tiers:
//!
//! | Size | Workers |
//! |------|---------|
//! | > 100 MiB | 8 |
//! | > 50 MiB | 4 |
//! | > 20 MiB | 2 |
//! | otherwise | 1 |
//!
//! Boundaries are strict, so a file of exactly 20 MiB gets one worker.

const MIB: u64 = 1024 * 1024;

/// Size above which a file is copied by two workers.
pub const TWO_WORKER_THRESHOLD: u64 = 20 * MIB;
/// Size above which a file is copied by four workers.
pub const FOUR_WORKER_THRESHOLD: u64 = 50 * MIB;
/// Size above which a file is copied by eight workers.
pub const EIGHT_WORKER_THRESHOLD: u64 = 100 * MIB;

/// A half-open byte interval `[offset, offset + length)` of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyRange {
    /// First byte of the range
    pub offset: u64,
    /// Number of bytes in the range
    pub length: u64,
}

impl CopyRange {
    /// One past the last byte of the range
    #[must_use]
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }
}

/// The ranges one file is split into, in offset order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangePlan {
    /// Number of workers, equal to `ranges.len()`
    pub workers: usize,
    /// Contiguous, non-overlapping ranges covering the whole file
    pub ranges: Vec<CopyRange>,
}

/// Number of workers for a file of `size` bytes.
#[must_use]
pub fn worker_count(size: u64) -> usize {
    if size > EIGHT_WORKER_THRESHOLD {
        8
    } else if size > FOUR_WORKER_THRESHOLD {
        4
    } else if size > TWO_WORKER_THRESHOLD {
        2
    } else {
        1
    }
}

/// Plan ranges for a file of `size` bytes using the size tiers.
#[must_use]
pub fn plan(size: u64) -> RangePlan {
    plan_with_workers(size, worker_count(size))
}

/// Plan `workers` ranges for a file of `size` bytes.
///
/// Every range but the last is `ceil(size / workers)` long; the last one
/// takes whatever remains. An empty file always gets a single empty range.
/// Offsets never run past `size`, so when `workers` exceeds what the size
/// can fill the trailing ranges are empty rather than out of bounds.
#[must_use]
pub fn plan_with_workers(size: u64, workers: usize) -> RangePlan {
    if size == 0 {
        return RangePlan {
            workers: 1,
            ranges: vec![CopyRange {
                offset: 0,
                length: 0,
            }],
        };
    }

    let workers = workers.max(1);
    let chunk = size.div_ceil(workers as u64);
    let ranges = (0..workers as u64)
        .map(|i| {
            let offset = (i * chunk).min(size);
            let length = if i + 1 == workers as u64 {
                size - offset
            } else {
                chunk.min(size - offset)
            };
            CopyRange { offset, length }
        })
        .collect();

    RangePlan { workers, ranges }
}
