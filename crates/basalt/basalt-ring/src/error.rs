/// Rejected construction-time parameters.
///
/// Reads and writes never fail; this is only produced while building a ring.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RingConfigError {
    #[error("capacity {0} is not a power of two")]
    CapacityNotPowerOfTwo(usize),

    #[error("version granularity {0} is not a power of two")]
    GranularityNotPowerOfTwo(usize),

    #[error("version granularity {granularity} exceeds capacity {capacity}")]
    GranularityExceedsCapacity { granularity: usize, capacity: usize },

    #[error("{capacity} slots of {stride} bytes overflow the address space")]
    TooLarge { capacity: usize, stride: usize },
}
