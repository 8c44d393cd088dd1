//! Multi-producer ring: a lock-free writer and the shared reader.
//!
//! # Design
//! - **Writers**: any number of cloned handles share one cache-padded atomic
//!   producer position. A writer claims a position with a CAS loop, and
//!   claims the version counter for that position *before* the CAS, so by
//!   the time the position is visible as taken the counter already says a
//!   producer is inside.
//! - **Reader**: see [`Reader`](crate::Reader). Version counters count outstanding
//!   claims: non-zero means some producer may be inside.
//!
//! # Overwrite hazard
//! As with the SPSC ring, producers never check the reader's position.
//! Producers also never check each other: two producers whose positions are
//! a full lap apart map to the same slot and the same counter, so both can be
//! inside the slot at once and their copies can interleave. The counter stays
//! non-zero while either is inside, but once both are done the reader accepts
//! whatever bytes were left, which may be a mix of the two records. Loss-free
//! and tear-free delivery therefore requires that producers stay less than
//! one lap ahead of the reader, counting producers still inside a write.

use crate::config::RingConfig;
use crate::error::RingConfigError;
use crate::reader::MpscReader;
use crate::ring::RingCore;
use crate::{Record, RingWriter};
use crossbeam_utils::CachePadded;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering, fence};

/// Creates a multi-producer ring and returns its endpoints. Clone the writer
/// to add producers.
///
/// # Panics
/// Panics if the ring would not fit in the address space.
///
/// # Example
/// ```
/// use basalt_ring::{RingConfig, mpsc};
/// use std::thread;
///
/// let (writer, mut reader) = mpsc::channel::<u32>(RingConfig::new(16));
/// let handles: Vec<_> = (0..2)
///     .map(|id| {
///         let mut writer = writer.clone();
///         thread::spawn(move || writer.write(id))
///     })
///     .collect();
/// for h in handles {
///     h.join().unwrap();
/// }
///
/// let mut seen = vec![reader.try_read().unwrap(), reader.try_read().unwrap()];
/// seen.sort();
/// assert_eq!(seen, [0, 1]);
/// ```
pub fn channel<T: Record>(config: RingConfig) -> (MpscWriter<T>, MpscReader<T>) {
    match try_channel(config) {
        Ok(pair) => pair,
        Err(e) => panic!("{e}"),
    }
}

/// Fallible variant of [`channel`].
pub fn try_channel<T: Record>(
    config: RingConfig,
) -> Result<(MpscWriter<T>, MpscReader<T>), RingConfigError> {
    let core = Arc::new(RingCore::try_new(config)?);
    let writer = MpscWriter {
        core: Arc::clone(&core),
        write_seq: Arc::new(CachePadded::new(AtomicU64::new(0))),
    };
    Ok((writer, MpscReader::new(core)))
}

/// One producer handle of an MPSC ring. Cheap to clone; each thread should
/// own its clone.
pub struct MpscWriter<T: Record> {
    core: Arc<RingCore<T>>,
    /// Next sequence number to be claimed, shared by every clone.
    write_seq: Arc<CachePadded<AtomicU64>>,
}

impl<T: Record> MpscWriter<T> {
    /// Publishes one record. Never blocks, never fails; may retry while other
    /// producers win the race for the same position.
    ///
    /// # Protocol Steps
    /// 1. Load the producer position (Relaxed)
    /// 2. Work out which counter guards that position; if it differs from the
    ///    one already held, hand the old one back and claim the new one
    /// 3. CAS the position forward; on failure go back to 1, keeping the claim
    /// 4. Release fence, then copy and stamp the slot
    /// 5. Hand the counter back with Release ordering
    ///
    /// A claim carried across failed CAS attempts is never released twice:
    /// the counter is only decremented when switching away from it.
    #[inline]
    pub fn write(&mut self, record: T) {
        let core = &*self.core;
        let mut held: Option<usize> = None;

        let (seq, idx) = loop {
            let seq = self.write_seq.load(Ordering::Relaxed);
            let idx = core.counter_index(seq);

            match held {
                Some(prev) if prev == idx => {}
                Some(prev) => {
                    core.counter(prev).fetch_sub(1, Ordering::Relaxed);
                    core.counter(idx).fetch_add(1, Ordering::Acquire);
                }
                None => {
                    core.counter(idx).fetch_add(1, Ordering::Acquire);
                }
            }
            held = Some(idx);

            if self
                .write_seq
                .compare_exchange_weak(seq, seq.wrapping_add(1), Ordering::Release, Ordering::Relaxed)
                .is_ok()
            {
                break (seq, idx);
            }
        };

        // the claim on `idx` must be visible before any byte of the copy
        fence(Ordering::Release);

        let slot = core.slot(seq);
        // SAFETY: `seq` is ours alone and the counter guarding its slot is
        // held; the reader rejects the slot until we release it.
        unsafe { slot.store(record) };
        slot.raise_stamp(seq.wrapping_add(1));

        core.counter(idx).fetch_sub(1, Ordering::Release);
    }

    /// Number of positions claimed so far by all producers.
    pub fn claimed(&self) -> u64 {
        self.write_seq.load(Ordering::Relaxed)
    }

    pub fn config(&self) -> &RingConfig {
        self.core.config()
    }
}

impl<T: Record> Clone for MpscWriter<T> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            write_seq: Arc::clone(&self.write_seq),
        }
    }
}

impl<T: Record> RingWriter<T> for MpscWriter<T> {
    #[inline]
    fn write(&mut self, record: T) {
        MpscWriter::write(self, record)
    }
}

impl<T: Record> fmt::Debug for MpscWriter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MpscWriter")
            .field("claimed", &self.claimed())
            .field("config", self.core.config())
            .finish()
    }
}
