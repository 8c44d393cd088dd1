//! Wraparound-safe comparison of embedded sequence numbers.
//!
//! Every slot carries the sequence number of the record it holds, stamped by
//! the producer as `position + 1`. A stamp of 0 therefore means "never
//! written", and the record claimed at position `p` is the one whose stamp is
//! exactly `p + 1`.
//!
//! Positions and stamps are compared by subtracting them at fixed width and
//! inspecting the sign bit, so the comparison stays correct after `u64`
//! wraps around.

/// How a slot's stamp relates to the position a reader is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampState {
    /// The slot holds data at or before `position`: nothing new yet.
    Stale,
    /// The slot holds exactly the record claimed at `position`.
    Current,
    /// The slot was overwritten by a later lap before it was read.
    Lapped,
}

/// Returns true iff `stamp` is strictly ahead of `position`.
///
/// `position - stamp` underflows exactly when the stamp is newer, which sets
/// the sign bit of the result.
#[inline(always)]
pub fn is_newer(stamp: u64, position: u64) -> bool {
    (position.wrapping_sub(stamp) >> 63) == 1
}

/// Classifies `stamp` against the record a reader at `position` expects.
#[inline(always)]
pub fn classify(stamp: u64, position: u64) -> StampState {
    if !is_newer(stamp, position) {
        StampState::Stale
    } else if stamp == position.wrapping_add(1) {
        StampState::Current
    } else {
        StampState::Lapped
    }
}
