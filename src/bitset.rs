//! A fixed-capacity bitset packed into 32-bit units.
//!
//! The volume (number of bits) is chosen at creation and never changes. Bits
//! past the volume in the last unit ("padding") have no meaning; operations that
//! look at whole units read them as whichever value cannot affect their result,
//! exactly as if [`Bitset::sanitize`] had been called first.

use std::fmt;

use crate::{arith, AllocError, HeapSize, Len};

/// The storage unit.
pub type Unit = u32;
/// Bits per storage unit.
pub const UNIT_BITS: usize = Unit::BITS as usize;

/// Number of units needed for `volume` bits.
#[inline(always)]
fn units_for(volume: usize) -> usize {
    volume / UNIT_BITS + (volume % UNIT_BITS > 0) as usize
}

/// A bitset of fixed volume.
#[derive(Clone)]
pub struct Bitset {
    volume: usize,
    units: Vec<Unit>,
}

impl Bitset {
    /// A bitset of `volume` bits, all reset.
    pub fn new(volume: usize) -> Result<Self, AllocError> {
        let length = units_for(volume);
        let bytes = arith::allocation_bytes(length, std::mem::size_of::<Unit>()).ok_or(AllocError::Overflow)?;
        let mut units = Vec::new();
        units.try_reserve_exact(length).map_err(|_| AllocError::Exhausted { bytes })?;
        units.resize(length, 0);
        Ok(Self { volume, units })
    }

    /// A bitset of `volume` bits, each set to `value`.
    pub fn with_value(volume: usize, value: bool) -> Result<Self, AllocError> {
        let mut bitset = Self::new(volume)?;
        if value { bitset.unzero(); }
        Ok(bitset)
    }

    /// Number of bits.
    #[inline(always)] pub fn volume(&self) -> usize { self.volume }
    /// Number of storage units.
    #[inline(always)] pub fn length(&self) -> usize { self.units.len() }
    /// The storage units; padding bits are unspecified.
    #[inline(always)] pub fn units(&self) -> &[Unit] { &self.units }

    #[inline(always)]
    fn locate(&self, i: usize) -> (usize, Unit) {
        assert!(i < self.volume, "bit index {} out of bounds for volume {}", i, self.volume);
        (i / UNIT_BITS, 1 << (i % UNIT_BITS))
    }

    #[inline]
    pub fn get(&self, i: usize) -> bool {
        let (unit, mask) = self.locate(i);
        self.units[unit] & mask != 0
    }
    #[inline(always)] pub fn test(&self, i: usize) -> bool { self.get(i) }
    #[inline]
    pub fn set(&mut self, i: usize) {
        let (unit, mask) = self.locate(i);
        self.units[unit] |= mask;
    }
    #[inline]
    pub fn reset(&mut self, i: usize) {
        let (unit, mask) = self.locate(i);
        self.units[unit] &= !mask;
    }
    #[inline]
    pub fn assign(&mut self, i: usize, value: bool) {
        if value { self.set(i) } else { self.reset(i) }
    }
    #[inline]
    pub fn toggle(&mut self, i: usize) {
        let (unit, mask) = self.locate(i);
        self.units[unit] ^= mask;
    }

    /// Resets every bit.
    pub fn zero(&mut self) { self.units.fill(0); }
    /// Sets every bit.
    pub fn unzero(&mut self) { self.units.fill(!0); }
    /// Toggles every bit.
    pub fn invert(&mut self) {
        for unit in self.units.iter_mut() {
            *unit = !*unit;
        }
    }
    #[inline(always)] pub fn not(&mut self) { self.invert() }

    /// Mask of the meaningful bits in the last unit, or `None` if it is full.
    #[inline(always)]
    fn tail_mask(&self) -> Option<Unit> {
        let offset = self.volume % UNIT_BITS;
        if offset == 0 { None } else { Some((1 << offset) - 1) }
    }

    /// Unit `i`, with its padding bits (if any) forced to `fill`.
    #[inline(always)]
    fn unit(&self, i: usize, fill: bool) -> Unit {
        let unit = self.units[i];
        match self.tail_mask() {
            Some(mask) if i + 1 == self.units.len() => {
                if fill { unit | !mask } else { unit & mask }
            }
            _ => unit,
        }
    }

    /// Forces the padding bits of the last unit to `fill`.
    pub fn sanitize(&mut self, fill: bool) {
        if let Some(last) = self.units.len().checked_sub(1) {
            self.units[last] = self.unit(last, fill);
        }
    }

    /// Combines the first `min(length)` units of `self` and `other` with `op`.
    ///
    /// Should `other` be no longer than `self`, its padding bits are read as `fill`
    /// so that they leave `self` unchanged.
    fn combine(&mut self, other: &Bitset, fill: bool, op: impl Fn(Unit, Unit) -> Unit) {
        let length = std::cmp::min(self.units.len(), other.units.len());
        let mask = other.units.len() <= self.units.len();
        for i in 0 .. length {
            let theirs = if mask { other.unit(i, fill) } else { other.units[i] };
            self.units[i] = op(self.units[i], theirs);
        }
    }

    /// `self &= other`, over the units the two have in common.
    pub fn and(&mut self, other: &Bitset) { self.combine(other, true, |a, b| a & b) }
    /// `self |= other`, over the units the two have in common.
    pub fn or(&mut self, other: &Bitset) { self.combine(other, false, |a, b| a | b) }
    /// `self ^= other`, over the units the two have in common.
    pub fn xor(&mut self, other: &Bitset) { self.combine(other, false, |a, b| a ^ b) }

    /// True if every bit is set.
    pub fn all(&self) -> bool {
        (0 .. self.units.len()).all(|i| self.unit(i, true) == !0)
    }
    /// True if some bit is set.
    pub fn any(&self) -> bool {
        (0 .. self.units.len()).any(|i| self.unit(i, false) != 0)
    }
    /// True if no bit is set.
    pub fn none(&self) -> bool { !self.any() }

    /// The number of set bits.
    pub fn popcnt(&self) -> usize {
        (0 .. self.units.len()).map(|i| self.unit(i, false).count_ones() as usize).sum()
    }

    /// The index of the first set bit at or after `i`.
    pub fn next(&self, i: usize) -> Option<usize> {
        if i >= self.volume { return None; }
        let mut index = i / UNIT_BITS;
        let offset = i % UNIT_BITS;
        let head = self.unit(index, false) >> offset;
        if head != 0 {
            return Some(i + head.trailing_zeros() as usize);
        }
        index += 1;
        while index < self.units.len() {
            let unit = self.unit(index, false);
            if unit != 0 {
                return Some(index * UNIT_BITS + unit.trailing_zeros() as usize);
            }
            index += 1;
        }
        None
    }

    /// Iterates over the indexes of set bits, in increasing order.
    pub fn ones(&self) -> Ones<'_> {
        Ones { bitset: self, index: 0 }
    }
}

/// An iterator over the set bits of a [`Bitset`].
pub struct Ones<'a> {
    bitset: &'a Bitset,
    index: usize,
}

impl Iterator for Ones<'_> {
    type Item = usize;
    fn next(&mut self) -> Option<usize> {
        let found = self.bitset.next(self.index)?;
        self.index = found + 1;
        Some(found)
    }
}

impl PartialEq for Bitset {
    /// Bitsets are equal if they have the same volume and bits; padding is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.volume == other.volume
            && (0 .. self.units.len()).all(|i| self.unit(i, false) == other.unit(i, false))
    }
}
impl Eq for Bitset { }

impl Len for Bitset {
    #[inline(always)] fn len(&self) -> usize { self.volume }
}
impl HeapSize for Bitset {
    fn heap_size(&self) -> (usize, usize) { self.units.heap_size() }
}

impl fmt::Debug for Bitset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bitset([")?;
        for i in 0 .. self.volume {
            write!(f, "{}", self.get(i) as u8)?;
        }
        write!(f, "])")
    }
}
