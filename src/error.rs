//! The allocation failure type shared by every container.

/// A request for storage that could not be satisfied.
///
/// Every operation that returns this leaves its container either unmodified or,
/// where documented, in a smaller-but-valid state. Retrying is always safe.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AllocError {
    /// A size computation overflowed `usize` (or exceeded `isize::MAX` bytes).
    #[error("allocation size overflowed")]
    Overflow,
    /// The global allocator refused the request.
    #[error("allocator refused a request for {bytes} bytes")]
    Exhausted {
        /// Bytes requested, including the header.
        bytes: usize,
    },
    /// The container's policy caps single allocations below the request.
    #[error("allocation of {requested} bytes exceeds the limit of {limit} bytes")]
    LimitExceeded {
        /// Bytes requested, including the header.
        requested: usize,
        /// The configured ceiling.
        limit: usize,
    },
    /// A [`GrowthPolicy`](crate::GrowthPolicy) failed validation.
    #[error("invalid growth policy: {reason}")]
    InvalidPolicy {
        /// What was wrong with it.
        reason: &'static str,
    },
}

impl AllocError {
    /// True if the failure came from size arithmetic rather than the allocator.
    pub fn is_overflow(&self) -> bool {
        matches!(self, AllocError::Overflow)
    }
}
