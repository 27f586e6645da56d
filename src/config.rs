//! Growth and shrink parameters for extents.

use crate::arith;
use crate::AllocError;

/// A rational scaling `(n * numer + bias) / denom`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Ratio {
    pub numer: usize,
    pub denom: usize,
    /// Added before division; `denom - 1` rounds up.
    pub bias: usize,
}

impl Ratio {
    pub const fn new(numer: usize, denom: usize, bias: usize) -> Self {
        Self { numer, denom, bias }
    }
    /// Scales `n`, or returns `None` if the result does not fit in `usize`.
    #[inline(always)]
    pub fn apply(&self, n: usize) -> Option<usize> {
        arith::scale(n, self.numer, self.denom, self.bias)
    }
}

/// How an extent sizes its storage.
///
/// The growth ratio sets the preallocation target used by `ensure`, and the
/// shrink ratio the target used once removals leave the storage less than half
/// used. The defaults (8/5 and 6/5) keep alternating inserts and removals near
/// a boundary from reallocating each time.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GrowthPolicy {
    /// Preallocation target for a requested length.
    pub grow: Ratio,
    /// Target volume after removals drop utilization below one half.
    pub shrink: Ratio,
    /// Largest single allocation permitted, header included.
    ///
    /// Requests above it fail as though the allocator had refused them.
    pub byte_limit: Option<usize>,
}

impl GrowthPolicy {
    /// `(n * 8 + 3) / 5`.
    pub const DEFAULT_GROW: Ratio = Ratio::new(8, 5, 3);
    /// `(n * 6 + 4) / 5`.
    pub const DEFAULT_SHRINK: Ratio = Ratio::new(6, 5, 4);

    pub const fn new() -> Self {
        Self {
            grow: Self::DEFAULT_GROW,
            shrink: Self::DEFAULT_SHRINK,
            byte_limit: None,
        }
    }

    /// The same policy, refusing allocations larger than `bytes`.
    pub const fn with_byte_limit(mut self, bytes: usize) -> Self {
        self.byte_limit = Some(bytes);
        self
    }

    /// Checks that both ratios are well formed and that growth actually grows.
    pub fn validate(&self) -> Result<(), AllocError> {
        if self.grow.denom == 0 || self.shrink.denom == 0 {
            return Err(AllocError::InvalidPolicy { reason: "zero denominator" });
        }
        if self.grow.numer <= self.grow.denom {
            return Err(AllocError::InvalidPolicy { reason: "growth ratio must exceed one" });
        }
        if self.shrink.numer < self.shrink.denom {
            return Err(AllocError::InvalidPolicy { reason: "shrink target below length" });
        }
        Ok(())
    }

    /// Preallocation target for `length`, if it is strictly larger than `length`.
    #[inline]
    pub fn grow_target(&self, length: usize) -> Option<usize> {
        self.grow.apply(length).filter(|&volume| volume > length)
    }

    /// Target volume after shrinking to `length` elements.
    #[inline]
    pub fn shrink_target(&self, length: usize) -> Option<usize> {
        self.shrink.apply(length)
    }

    /// True once `length` elements use at most half of `volume`.
    #[inline(always)]
    pub fn should_shrink(&self, length: usize, volume: usize) -> bool {
        volume > 0 && length <= (volume - 1) / 2
    }

    /// Checks `bytes` against the ceiling.
    #[inline]
    pub(crate) fn admit(&self, bytes: usize) -> Result<(), AllocError> {
        match self.byte_limit {
            Some(limit) if bytes > limit => Err(AllocError::LimitExceeded { requested: bytes, limit }),
            _ => Ok(()),
        }
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self::new()
    }
}
