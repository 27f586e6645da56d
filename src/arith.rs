//! Overflow-checked size arithmetic.
//!
//! Every volume and byte computation in the crate goes through these helpers,
//! so that a request which would wrap is rejected before anything is allocated.

/// Bytes attributed to an extent's header: element size, volume, and length.
pub const HEADER_BYTES: usize = 3 * std::mem::size_of::<usize>();

/// `a + b`, or `None` if the sum is not representable.
#[inline(always)]
pub fn add(a: usize, b: usize) -> Option<usize> { a.checked_add(b) }

/// `a - b`, or `None` if the difference would be negative.
#[inline(always)]
pub fn sub(a: usize, b: usize) -> Option<usize> { a.checked_sub(b) }

/// `a * b`, or `None` if the product is not representable.
#[inline(always)]
pub fn mul(a: usize, b: usize) -> Option<usize> { a.checked_mul(b) }

/// Computes `(n * numer + bias) / denom` without forming `n * numer`.
///
/// The quotient and remainder of `n / denom` are scaled separately, so the only
/// way to fail is for the result itself (or the scaled remainder) to overflow.
/// Returns `None` in that case, and also for a zero `denom`.
#[inline]
pub fn scale(n: usize, numer: usize, denom: usize, bias: usize) -> Option<usize> {
    if denom == 0 { return None; }
    let whole = mul(n / denom, numer)?;
    let part = add(mul(n % denom, numer)?, bias)? / denom;
    add(whole, part)
}

/// Bytes required for `slots` elements of `element_size` bytes, plus the header.
///
/// Rust refuses allocations above `isize::MAX` bytes, so those are reported as
/// overflow as well.
#[inline]
pub fn allocation_bytes(slots: usize, element_size: usize) -> Option<usize> {
    let bytes = add(mul(slots, element_size)?, HEADER_BYTES)?;
    if bytes > isize::MAX as usize { None } else { Some(bytes) }
}
