//! Fixed-capacity, lock-free ring buffers for publishing fixed-size records
//! from one or many producer threads to a single consumer thread.
//!
//! Two variants share one layout and one reader:
//! - [`spsc`]: one wait-free writer, owned by a single thread
//! - [`mpsc`]: any number of lock-free writers claiming slots with a CAS loop
//!
//! Producers never block and never check whether the consumer has caught up;
//! the consumer polls, and detects (rather than waits for) records that are
//! still being written or that were overwritten before it got to them.
//!
//! ```
//! use basalt_ring::{ReadOutcome, RingConfig, spsc};
//!
//! let (mut writer, mut reader) = spsc::channel::<u32>(RingConfig::new(4));
//! assert_eq!(reader.poll(), ReadOutcome::Empty);
//! writer.write(42);
//! assert_eq!(reader.poll(), ReadOutcome::Record(42));
//! ```

mod config;
mod error;
mod layout;
mod reader;
mod ring;
mod sequence;
mod slot;
mod version;

pub mod mpsc;
pub mod spsc;

pub use config::{RingConfig, seq_to_index};
pub use error::RingConfigError;
pub use layout::{SlotLayout, cache_line};
pub use mpsc::MpscWriter;
pub use reader::{MpscReader, ReadOutcome, Reader, SpscReader};
pub use sequence::{StampState, classify, is_newer};
pub use spsc::SpscWriter;
pub use version::{Claim, Guard, Parity};

/// Plain-data record that can travel through a ring.
///
/// Records are copied bitwise in and out of shared slots, so they must be
/// `Copy` (no owned resources, nothing to drop) and `Send`.
pub trait Record: Copy + Send + 'static {}

impl<T: Copy + Send + 'static> Record for T {}

/// The producer side shared by both ring variants, for pipelines that pick
/// the variant at construction time.
pub trait RingWriter<T: Record> {
    /// Publishes one record. Never blocks and never fails; unread records may
    /// be overwritten if the consumer falls a full lap behind.
    fn write(&mut self, record: T);
}
