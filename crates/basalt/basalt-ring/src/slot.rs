//! A single ring slot: one record plus the sequence number it was written at.
//!
//! # Memory Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  stamp: AtomicU64  │  data: T                │
//! │  (8 bytes)         │  (size_of::<T>)         │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! The slot itself carries no synchronization beyond the stamp. Whether a
//! writer is currently inside the slot is tracked by the version counters;
//! the stamp only says *which* record the slot holds.

use crate::sequence::is_newer;
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::ptr;
use std::sync::atomic::{AtomicU64, Ordering};

#[repr(C)]
pub(crate) struct Slot<T> {
    /// Embedded sequence number: 0 = never written, otherwise `position + 1`.
    stamp: AtomicU64,
    /// The record. Uninitialized until the first write to this slot.
    data: UnsafeCell<MaybeUninit<T>>,
}

impl<T: Copy> Slot<T> {
    pub(crate) fn new() -> Self {
        Self {
            stamp: AtomicU64::new(0),
            data: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }

    #[inline(always)]
    pub(crate) fn stamp(&self, order: Ordering) -> u64 {
        self.stamp.load(order)
    }

    /// Publishes `seq` as the slot's sequence number.
    #[inline(always)]
    pub(crate) fn set_stamp(&self, seq: u64) {
        self.stamp.store(seq, Ordering::Release);
    }

    /// Raises the sequence number to `seq`, never lowering it.
    ///
    /// Used when several producers may land on the same slot; the stamp stays
    /// monotonic even if the later claim finishes first. "Newer" is the
    /// wraparound-safe comparison, so stamps keep advancing past `u64::MAX`.
    /// A zero stamp is always replaced: the slot has never been written.
    #[inline(always)]
    pub(crate) fn raise_stamp(&self, seq: u64) {
        let mut current = self.stamp.load(Ordering::Relaxed);
        while current == 0 || is_newer(seq, current) {
            match self.stamp.compare_exchange_weak(
                current,
                seq,
                Ordering::Release,
                Ordering::Relaxed,
            ) {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }

    /// Copies `record` into the slot.
    ///
    /// # Safety
    /// The caller must hold a claim on the version counter guarding this slot,
    /// and must have ordered that claim before this call with a release fence,
    /// so a reader that observes any of these bytes also observes the claim.
    #[inline(always)]
    pub(crate) unsafe fn store(&self, record: T) {
        // SAFETY: the pointer comes from our own UnsafeCell and is valid for
        // writes; concurrent readers detect the overlap through the counter.
        unsafe { ptr::write_volatile(self.data.get(), MaybeUninit::new(record)) };
    }

    /// Copies the slot contents into scratch space.
    ///
    /// The copy may be torn if a writer is active. It stays wrapped in
    /// `MaybeUninit` until the caller has validated it against the counter
    /// and the stamp, so an inconsistent bit pattern is never read as a `T`.
    ///
    /// # Safety
    /// Must be followed by the reader-side validation before `assume_init`.
    #[inline(always)]
    pub(crate) unsafe fn load(&self) -> MaybeUninit<T> {
        // SAFETY: valid, aligned pointer into our own cell; MaybeUninit<T>
        // accepts any byte content.
        unsafe { ptr::read_volatile(self.data.get()) }
    }
}
