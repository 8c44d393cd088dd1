//! Memory layout of a ring: padded slots, padded version counters and the
//! producer position.
//!
//! # Memory Layout
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │  producer position (MPSC only, one cache line)                 │
//! ├────────────────────────────────────────────────────────────────┤
//! │  counter[0]  │  counter[1]  │ ... │  counter[granularity-1]    │
//! │  (one cache line each)                                         │
//! ├────────────────────────────────────────────────────────────────┤
//! │  Slot[0]: stamp + data, padded to a multiple of the line       │
//! ├────────────────────────────────────────────────────────────────┤
//! │                          ...                                   │
//! ├────────────────────────────────────────────────────────────────┤
//! │  Slot[capacity-1]                                              │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every shared atomic sits on its own line so producers claiming different
//! counters, and the reader polling a slot, never invalidate each other's
//! cache lines.

use crate::config::RingConfig;
use crate::error::RingConfigError;
use crate::slot::Slot;
use crossbeam_utils::CachePadded;
use std::mem::{align_of, size_of};
use std::sync::atomic::AtomicU64;

pub(crate) type PaddedSlot<T> = CachePadded<Slot<T>>;

/// Sizes of one slot holding a `T`, computed at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotLayout {
    /// `size_of::<T>()`.
    pub record_size: usize,
    /// Unpadded slot size (stamp + record, with the record's own padding).
    pub slot_size: usize,
    /// Alignment of a padded slot.
    pub align: usize,
    /// Distance between consecutive slots in the slot array.
    pub stride: usize,
}

/// Cache line size assumed for padding on this target.
#[inline]
pub fn cache_line() -> usize {
    align_of::<CachePadded<u8>>()
}

/// Rounds `n` up to a multiple of `align` (a power of two).
#[inline]
fn round_up(n: usize, align: usize) -> usize {
    (n + align - 1) & !(align - 1)
}

impl SlotLayout {
    pub fn of<T: Copy>() -> Self {
        let slot_size = size_of::<Slot<T>>();
        let align = cache_line().max(align_of::<Slot<T>>());
        Self {
            record_size: size_of::<T>(),
            slot_size,
            align,
            stride: round_up(slot_size, align),
        }
    }

    /// Checks the computed stride against the compiler's layout of a padded slot.
    pub fn matches<T: Copy>(&self) -> bool {
        self.stride == size_of::<PaddedSlot<T>>() && self.align == align_of::<PaddedSlot<T>>()
    }

    /// Total bytes owned by a ring with this slot layout.
    ///
    /// `slots + counters + producer position`, each line-padded.
    pub fn footprint(&self, cfg: &RingConfig) -> Result<usize, RingConfigError> {
        let too_large = RingConfigError::TooLarge {
            capacity: cfg.capacity,
            stride: self.stride,
        };
        let counter = size_of::<CachePadded<AtomicU64>>();
        let slots = cfg.capacity.checked_mul(self.stride).ok_or(too_large.clone())?;
        let total = cfg
            .version_granularity
            .checked_mul(counter)
            .and_then(|counters| counters.checked_add(slots))
            .and_then(|bytes| bytes.checked_add(counter))
            .ok_or(too_large.clone())?;
        if total > isize::MAX as usize {
            return Err(too_large);
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[repr(C)]
    #[derive(Clone, Copy)]
    struct Frame {
        samples: [f32; 48],
        channel: u16,
    }

    #[repr(C, align(256))]
    #[derive(Clone, Copy)]
    struct OverAligned {
        v: u64,
    }

    #[test]
    fn computed_stride_matches_compiler() {
        assert!(SlotLayout::of::<u8>().matches::<u8>());
        assert!(SlotLayout::of::<u64>().matches::<u64>());
        assert!(SlotLayout::of::<Frame>().matches::<Frame>());
        assert!(SlotLayout::of::<OverAligned>().matches::<OverAligned>());
        assert!(SlotLayout::of::<()>().matches::<()>());
    }

    #[test]
    fn small_records_take_one_line() {
        let layout = SlotLayout::of::<u64>();
        assert_eq!(layout.record_size, 8);
        assert_eq!(layout.slot_size, 16);
        assert_eq!(layout.stride, cache_line());
    }

    #[test]
    fn large_records_span_whole_lines() {
        let layout = SlotLayout::of::<Frame>();
        assert_eq!(layout.stride % cache_line(), 0);
        assert!(layout.stride >= layout.slot_size);
        assert!(layout.stride - layout.slot_size < cache_line());
    }

    #[test]
    fn over_aligned_records_keep_their_alignment() {
        let layout = SlotLayout::of::<OverAligned>();
        assert_eq!(layout.align, 256.max(cache_line()));
        assert_eq!(layout.stride % 256, 0);
    }

    #[test]
    fn footprint_counts_slots_counters_and_position() {
        let layout = SlotLayout::of::<u64>();
        let cfg = RingConfig::with_granularity(8, 2);
        let line = size_of::<CachePadded<AtomicU64>>();
        assert_eq!(layout.footprint(&cfg).unwrap(), 8 * layout.stride + 2 * line + line);
    }

    #[test]
    fn footprint_rejects_address_space_overflow() {
        let layout = SlotLayout::of::<[u8; 4096]>();
        let cfg = RingConfig::new(1 << 62);
        assert!(matches!(
            layout.footprint(&cfg),
            Err(RingConfigError::TooLarge { .. })
        ));
    }
}
