//! Shared state of a ring: the slot array and the version counters.
//!
//! `RingCore` is what producers and the consumer share through an `Arc`.
//! The producer position is deliberately *not* part of it: the SPSC writer
//! keeps a plain counter in its own handle, and MPSC writers share a
//! separate atomic.

use crate::Record;
use crate::config::{RingConfig, seq_to_index};
use crate::error::RingConfigError;
use crate::layout::{PaddedSlot, SlotLayout};
use crate::slot::Slot;
use crate::version::VersionCounters;
use crossbeam_utils::CachePadded;
use std::sync::atomic::AtomicU64;

pub(crate) struct RingCore<T> {
    config: RingConfig,
    layout: SlotLayout,
    counters: VersionCounters,
    slots: Box<[PaddedSlot<T>]>,
}

impl<T: Record> RingCore<T> {
    /// Allocates the slots and counters, all zeroed.
    pub(crate) fn try_new(config: RingConfig) -> Result<Self, RingConfigError> {
        let layout = SlotLayout::of::<T>();
        assert!(layout.matches::<T>(), "slot layout mismatch: {layout:?}");
        let footprint = layout.footprint(&config)?;

        let slots = (0..config.capacity)
            .map(|_| CachePadded::new(Slot::new()))
            .collect();
        let counters = VersionCounters::new(config.version_granularity);

        tracing::debug!(
            capacity = config.capacity,
            version_granularity = config.version_granularity,
            record_size = layout.record_size,
            stride = layout.stride,
            footprint,
            "ring allocated"
        );

        Ok(Self {
            config,
            layout,
            counters,
            slots,
        })
    }

    #[inline(always)]
    pub(crate) fn slot(&self, seq: u64) -> &Slot<T> {
        &self.slots[seq_to_index(seq, self.config.mask())]
    }

    #[inline(always)]
    pub(crate) fn counter_index(&self, seq: u64) -> usize {
        seq_to_index(seq, self.config.version_mask())
    }

    #[inline(always)]
    pub(crate) fn counter(&self, idx: usize) -> &AtomicU64 {
        self.counters.get(idx)
    }

    pub(crate) fn config(&self) -> &RingConfig {
        &self.config
    }

    pub(crate) fn layout(&self) -> &SlotLayout {
        &self.layout
    }
}

// SAFETY: records are only ever moved in and copied out by value, never
// shared by reference, and all cross-thread coordination goes through the
// atomics. `T: Send` is therefore enough for the core to be shared.
unsafe impl<T: Send> Send for RingCore<T> {}
unsafe impl<T: Send> Sync for RingCore<T> {}
