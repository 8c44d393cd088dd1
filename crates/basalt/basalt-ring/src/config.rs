//! Ring configuration and index arithmetic utilities.
//!
//! This module provides the construction-time parameters shared by both
//! writer variants:
//! - Capacity and version granularity, validated once and fixed forever
//! - Efficient sequence-to-index mapping using bitmasks

use crate::error::RingConfigError;

/// Construction-time configuration of a ring.
///
/// Both `capacity` and `version_granularity` are powers of two, and the
/// granularity never exceeds the capacity, so every version counter guards
/// exactly `capacity / version_granularity` slots.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RingConfig {
    /// Number of slots in the ring. Must be a power of 2.
    pub capacity: usize,
    /// Number of distinct version counters. Must be a power of 2, `<= capacity`.
    pub version_granularity: usize,
}

impl RingConfig {
    /// Creates a configuration with one version counter per slot.
    ///
    /// # Panics
    /// Panics if `capacity` is not a power of 2.
    ///
    /// # Example
    /// ```
    /// use basalt_ring::RingConfig;
    /// let cfg = RingConfig::new(1024); // OK: 1024 = 2^10
    /// assert_eq!(cfg.version_granularity, 1024);
    /// // RingConfig::new(1000);        // Would panic: not a power of 2
    /// ```
    pub fn new(capacity: usize) -> Self {
        Self::with_granularity(capacity, capacity)
    }

    /// Creates a configuration with `version_granularity` shared counters.
    ///
    /// # Panics
    /// Panics if either argument is not a power of 2, or if the granularity
    /// exceeds the capacity.
    pub fn with_granularity(capacity: usize, version_granularity: usize) -> Self {
        match Self::try_new(capacity, version_granularity) {
            Ok(cfg) => cfg,
            Err(e) => panic!("{e}"),
        }
    }

    /// Fallible constructor, used when the values come from a config file.
    pub fn try_new(capacity: usize, version_granularity: usize) -> Result<Self, RingConfigError> {
        if !capacity.is_power_of_two() {
            return Err(RingConfigError::CapacityNotPowerOfTwo(capacity));
        }
        if !version_granularity.is_power_of_two() {
            return Err(RingConfigError::GranularityNotPowerOfTwo(version_granularity));
        }
        if version_granularity > capacity {
            return Err(RingConfigError::GranularityExceedsCapacity {
                granularity: version_granularity,
                capacity,
            });
        }
        Ok(Self {
            capacity,
            version_granularity,
        })
    }

    /// Returns the bitmask for slot index calculation.
    ///
    /// # Example
    /// ```
    /// use basalt_ring::RingConfig;
    /// let cfg = RingConfig::new(8);
    /// assert_eq!(cfg.mask(), 7);  // 0b111 in binary
    /// ```
    #[inline(always)]
    pub fn mask(&self) -> u64 {
        (self.capacity as u64) - 1
    }

    /// Returns the bitmask for version counter index calculation.
    #[inline(always)]
    pub fn version_mask(&self) -> u64 {
        (self.version_granularity as u64) - 1
    }

    /// Number of slots guarded by each version counter.
    #[inline]
    pub fn slots_per_version(&self) -> usize {
        self.capacity / self.version_granularity
    }
}

/// Converts a sequence number to an array index.
///
/// With `capacity = 8` (mask = 7 = `0b111`):
/// ```text
/// seq =  0 → 0 & 7 = 0
/// seq =  8 → 8 & 7 = 0  (wraps around)
/// seq = 15 → 15 & 7 = 7
/// ```
///
/// The same mapping is used for slots (`mask`) and for version counters
/// (`version_mask`). Counter `i` therefore guards every slot whose index is
/// congruent to `i` modulo the granularity.
#[inline(always)]
pub fn seq_to_index(seq: u64, mask: u64) -> usize {
    (seq & mask) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn granularity_defaults_to_capacity() {
        let cfg = RingConfig::new(64);
        assert_eq!(cfg.version_granularity, 64);
        assert_eq!(cfg.slots_per_version(), 1);
        assert_eq!(cfg.mask(), 63);
        assert_eq!(cfg.version_mask(), 63);
    }

    #[test]
    fn coarse_granularity_shares_counters() {
        let cfg = RingConfig::with_granularity(16, 4);
        assert_eq!(cfg.slots_per_version(), 4);
        // slots 1, 5, 9 and 13 share counter 1
        for seq in [1u64, 5, 9, 13, 17] {
            assert_eq!(seq_to_index(seq, cfg.version_mask()), 1);
        }
        assert_eq!(seq_to_index(13, cfg.mask()), 13);
        assert_eq!(seq_to_index(17, cfg.mask()), 1);
    }

    #[test]
    fn rejects_invalid_values() {
        assert_eq!(
            RingConfig::try_new(12, 4),
            Err(RingConfigError::CapacityNotPowerOfTwo(12))
        );
        assert_eq!(
            RingConfig::try_new(0, 0),
            Err(RingConfigError::CapacityNotPowerOfTwo(0))
        );
        assert_eq!(
            RingConfig::try_new(16, 3),
            Err(RingConfigError::GranularityNotPowerOfTwo(3))
        );
        assert_eq!(
            RingConfig::try_new(16, 32),
            Err(RingConfigError::GranularityExceedsCapacity {
                granularity: 32,
                capacity: 16
            })
        );
    }

    #[test]
    #[should_panic(expected = "power of two")]
    fn new_panics_on_bad_capacity() {
        let _ = RingConfig::new(1000);
    }

    #[test]
    fn single_slot_ring_is_valid() {
        let cfg = RingConfig::new(1);
        assert_eq!(cfg.mask(), 0);
        assert_eq!(seq_to_index(41, cfg.mask()), 0);
    }
}
