//! The single consumer, shared by both writer variants.
//!
//! The reader never blocks and never writes shared state. Each poll looks at
//! exactly one slot, the one for its current position, and either returns
//! the record claimed at that position, reports that nothing new is there
//! yet, or reports that the record was overwritten before it was read.
//!
//! # Protocol
//!
//! 1. Acquire-load the slot's stamp; if it is not ahead of the position,
//!    there is nothing new (`Empty`)
//! 2. If it is ahead by more than one record, the slot was lapped (`Overrun`)
//! 3. Copy the record into scratch space
//! 4. Acquire fence, then acquire-load the guarding version counter and
//!    reload the stamp
//! 5. If the counter says a producer is inside, or the stamp moved, the copy
//!    may be torn: discard it and retry from step 1
//! 6. Return the validated copy
//!
//! # Memory Ordering
//! Producers raise the counter and issue a release fence before touching the
//! slot. If the copy in step 3 saw any byte of a producer's write, the fence
//! in step 4 guarantees the counter load sees that producer's claim, or its
//! release. Seeing the release (acquire load) in turn makes the producer's
//! new stamp visible, so the stamp comparison catches a write that started
//! and finished entirely during the copy.

use crate::Record;
use crate::config::RingConfig;
use crate::layout::SlotLayout;
use crate::ring::RingCore;
use crate::sequence::{StampState, classify};
use crate::version::{Claim, Guard, Parity};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{Ordering, fence};

/// Result of one poll of the consumer's current slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome<T> {
    /// The record claimed at the polled position.
    Record(T),
    /// Nothing has been published at the polled position yet.
    Empty,
    /// The record at the polled position was overwritten before it was read.
    Overrun,
}

/// Consumer handle. `G` selects how version counters are interpreted and is
/// fixed by the writer variant that created the ring.
///
/// `Reader` is `Send` but not `Clone`: there is exactly one consumer.
pub struct Reader<T: Record, G: Guard> {
    core: Arc<RingCore<T>>,
    /// Sequence number of the next record to read.
    read_seq: u64,
    /// Records lost to producers lapping this reader.
    overruns: u64,
    _guard: PhantomData<G>,
}

/// Reader of a single-producer ring.
pub type SpscReader<T> = Reader<T, Parity>;

/// Reader of a multi-producer ring.
pub type MpscReader<T> = Reader<T, Claim>;

impl<T: Record, G: Guard> Reader<T, G> {
    pub(crate) fn new(core: Arc<RingCore<T>>) -> Self {
        Self {
            core,
            read_seq: 0,
            overruns: 0,
            _guard: PhantomData,
        }
    }

    /// Polls the slot for `position` without touching the reader's cursor.
    #[inline]
    pub fn poll_at(&self, position: u64) -> ReadOutcome<T> {
        let slot = self.core.slot(position);
        let counter = self.core.counter(self.core.counter_index(position));

        loop {
            let s1 = slot.stamp(Ordering::Acquire);
            match classify(s1, position) {
                StampState::Stale => return ReadOutcome::Empty,
                // stamps never move backwards, so a lapped slot stays lapped
                StampState::Lapped => return ReadOutcome::Overrun,
                StampState::Current => {}
            }

            // SAFETY: validated below before the copy is assumed initialized
            let scratch = unsafe { slot.load() };

            fence(Ordering::Acquire);
            let version = counter.load(Ordering::Acquire);
            let s2 = slot.stamp(Ordering::Relaxed);

            if G::is_contended(version) || s1 != s2 {
                std::hint::spin_loop();
                continue;
            }

            // SAFETY: the stamp was `position + 1` before and after the copy
            // and no producer was inside the slot, so the copy is exactly the
            // record that stamped it.
            return ReadOutcome::Record(unsafe { scratch.assume_init() });
        }
    }

    /// Polls the current position and advances past it on `Record` or
    /// `Overrun`. `Empty` leaves the reader unchanged.
    #[inline]
    pub fn poll(&mut self) -> ReadOutcome<T> {
        let outcome = self.poll_at(self.read_seq);
        match outcome {
            ReadOutcome::Record(_) => {
                self.read_seq = self.read_seq.wrapping_add(1);
            }
            ReadOutcome::Overrun => {
                tracing::trace!(position = self.read_seq, "record overwritten before read");
                self.read_seq = self.read_seq.wrapping_add(1);
                self.overruns += 1;
            }
            ReadOutcome::Empty => {}
        }
        outcome
    }

    /// Copies the next record into `out`.
    ///
    /// Returns `true` on success. On `false`, `out` is untouched: either
    /// nothing new was published, or the next record was overwritten (in
    /// which case the reader has moved past it, see [`Reader::overruns`]).
    #[inline]
    pub fn read(&mut self, out: &mut T) -> bool {
        match self.poll() {
            ReadOutcome::Record(record) => {
                *out = record;
                true
            }
            ReadOutcome::Empty | ReadOutcome::Overrun => false,
        }
    }

    /// Returns the next record, if one is available.
    ///
    /// # Returns
    /// - `Some(T)` if the record at the current position was read
    /// - `None` if nothing new is available, or the record was overwritten
    #[inline]
    pub fn try_read(&mut self) -> Option<T> {
        match self.poll() {
            ReadOutcome::Record(record) => Some(record),
            ReadOutcome::Empty | ReadOutcome::Overrun => None,
        }
    }

    /// Offset-returning read for callers that track the position themselves.
    ///
    /// Returns `position + 1` when the position was consumed (the record was
    /// copied into `out`, or it had been overwritten and `out` is untouched)
    /// and `position` when nothing new is there yet.
    #[inline]
    pub fn read_at(&self, position: u64, out: &mut T) -> u64 {
        match self.poll_at(position) {
            ReadOutcome::Record(record) => {
                *out = record;
                position.wrapping_add(1)
            }
            ReadOutcome::Overrun => position.wrapping_add(1),
            ReadOutcome::Empty => position,
        }
    }

    /// Sequence number of the next record this reader expects.
    pub fn position(&self) -> u64 {
        self.read_seq
    }

    /// Total records skipped because a producer overwrote them first.
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    pub fn config(&self) -> &RingConfig {
        self.core.config()
    }

    pub fn layout(&self) -> &SlotLayout {
        self.core.layout()
    }
}

impl<T: Record, G: Guard> fmt::Debug for Reader<T, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reader")
            .field("position", &self.read_seq)
            .field("overruns", &self.overruns)
            .field("config", self.core.config())
            .finish()
    }
}
