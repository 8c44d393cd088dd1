//! Version counters: the contention signal between producers and the reader.
//!
//! A ring owns `version_granularity` counters. Counter `i` guards every slot
//! whose index is congruent to `i` modulo the granularity. Producers raise a
//! counter before touching a slot and lower (or advance) it when done; the
//! reader re-checks the counter after copying a slot to find out whether a
//! producer could have been inside it.
//!
//! The two writer variants encode "a producer is inside" differently:
//!
//! | Variant | Claim            | Release          | Busy when     |
//! |---------|------------------|------------------|---------------|
//! | SPSC    | `+1` (odd)       | `+1` (even)      | value is odd  |
//! | MPSC    | `+1`             | `-1`             | value is != 0 |
//!
//! The SPSC counter only ever grows so claim and release are the same
//! instruction. The MPSC counter counts outstanding claims, because a
//! producer may hold a claim on a counter for a position it then loses to
//! another producer and must be able to hand it back.

use crossbeam_utils::CachePadded;
use std::sync::atomic::AtomicU64;

mod sealed {
    pub trait Sealed {}
}

/// Interpretation of a version counter value, fixed per writer variant.
pub trait Guard: sealed::Sealed + Send + Sync + 'static {
    /// True when a producer may be writing to a slot this counter guards.
    fn is_contended(value: u64) -> bool;
}

/// Single-producer encoding: odd while the writer is inside.
#[derive(Debug)]
pub enum Parity {}

/// Multi-producer encoding: the number of outstanding producer claims.
#[derive(Debug)]
pub enum Claim {}

impl sealed::Sealed for Parity {}
impl sealed::Sealed for Claim {}

impl Guard for Parity {
    #[inline(always)]
    fn is_contended(value: u64) -> bool {
        value & 1 == 1
    }
}

impl Guard for Claim {
    #[inline(always)]
    fn is_contended(value: u64) -> bool {
        value != 0
    }
}

/// The array of cache-line-isolated counters.
pub(crate) struct VersionCounters {
    counters: Box<[CachePadded<AtomicU64>]>,
}

impl VersionCounters {
    /// Creates `granularity` counters, all zero (idle).
    pub(crate) fn new(granularity: usize) -> Self {
        let counters = (0..granularity)
            .map(|_| CachePadded::new(AtomicU64::new(0)))
            .collect();
        Self { counters }
    }

    #[inline(always)]
    pub(crate) fn get(&self, idx: usize) -> &AtomicU64 {
        &self.counters[idx]
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.counters.len()
    }
}
