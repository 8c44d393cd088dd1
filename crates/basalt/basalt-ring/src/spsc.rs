//! Single-producer ring: a wait-free writer and the shared reader.
//!
//! # Design
//! - **Writer**: owns the producer position as a plain `u64`; no other thread
//!   ever reads it. Each write is a fixed sequence of steps with no retries.
//! - **Reader**: see [`Reader`](crate::Reader). Version counters use the parity
//!   encoding: odd while the writer is inside a slot.
//!
//! # Overwrite hazard
//! The writer never checks how far ahead of the reader it is. If it laps the
//! reader, unread records are overwritten and the reader reports them as
//! overruns. Consumers are expected to poll faster than the writer wraps.

use crate::config::RingConfig;
use crate::error::RingConfigError;
use crate::reader::SpscReader;
use crate::ring::RingCore;
use crate::{Record, RingWriter};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{Ordering, fence};

/// Creates a single-producer ring and returns its two endpoints.
///
/// # Panics
/// Panics if the ring would not fit in the address space.
///
/// # Example
/// ```
/// use basalt_ring::{RingConfig, spsc};
///
/// let (mut writer, mut reader) = spsc::channel::<u64>(RingConfig::new(8));
/// writer.write(7);
/// assert_eq!(reader.try_read(), Some(7));
/// assert_eq!(reader.try_read(), None);
/// ```
pub fn channel<T: Record>(config: RingConfig) -> (SpscWriter<T>, SpscReader<T>) {
    match try_channel(config) {
        Ok(pair) => pair,
        Err(e) => panic!("{e}"),
    }
}

/// Fallible variant of [`channel`].
pub fn try_channel<T: Record>(
    config: RingConfig,
) -> Result<(SpscWriter<T>, SpscReader<T>), RingConfigError> {
    let core = Arc::new(RingCore::try_new(config)?);
    let writer = SpscWriter {
        core: Arc::clone(&core),
        write_seq: 0,
    };
    Ok((writer, SpscReader::new(core)))
}

/// The only producer of an SPSC ring.
///
/// `Send` but not `Clone`; `write` takes `&mut self`, so the single-producer
/// contract is enforced by ownership.
pub struct SpscWriter<T: Record> {
    core: Arc<RingCore<T>>,
    /// Sequence number the next write will claim.
    write_seq: u64,
}

impl<T: Record> SpscWriter<T> {
    /// Publishes one record. Never blocks, never fails.
    ///
    /// # Protocol Steps
    /// 1. Bump the guarding counter to odd (claim)
    /// 2. Release fence, so the claim is ordered before any byte of the copy
    /// 3. Copy the record into the slot
    /// 4. Stamp the slot with `position + 1`
    /// 5. Bump the counter back to even with Release ordering (publish)
    #[inline(always)]
    pub fn write(&mut self, record: T) {
        let seq = self.write_seq;
        let counter = self.core.counter(self.core.counter_index(seq));
        let slot = self.core.slot(seq);

        counter.fetch_add(1, Ordering::Acquire);
        fence(Ordering::Release);

        // SAFETY: the counter is odd from the reader's point of view until
        // the publish below, and we are the only producer.
        unsafe { slot.store(record) };
        slot.set_stamp(seq.wrapping_add(1));

        self.write_seq = seq.wrapping_add(1);
        counter.fetch_add(1, Ordering::Release);
    }

    /// Sequence number the next write will claim (= records written so far).
    pub fn position(&self) -> u64 {
        self.write_seq
    }

    pub fn config(&self) -> &RingConfig {
        self.core.config()
    }
}

impl<T: Record> RingWriter<T> for SpscWriter<T> {
    #[inline(always)]
    fn write(&mut self, record: T) {
        SpscWriter::write(self, record)
    }
}

impl<T: Record> fmt::Debug for SpscWriter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpscWriter")
            .field("position", &self.write_seq)
            .field("config", self.core.config())
            .finish()
    }
}
