//! The growable storage engine underneath `Array` and `ByteString`.
//!
//! An `Extent<T>` tracks how many elements it can hold (its volume) separately
//! from how many it does hold (its length), and owns exactly one allocation of
//! `volume + reserved` slots. The reserved slots sit past the end of the volume
//! and are kept zeroed at `length`, which is how byte strings get their null
//! terminator without any help from the string type.
//!
//! Every operation that may reallocate takes `&mut self`, so no reference into
//! the old storage can outlive it. Operations that fail with an `AllocError`
//! leave the extent as it was, with two documented exceptions that only ever
//! leave it *larger* than ideal: the exact-length fallback in `ensure`, and the
//! opportunistic shrink in `excise`.

use std::fmt;
use std::mem::size_of;

use bytemuck::Pod;

use crate::{arith, AllocError, Clear, GrowthPolicy, HeapSize, Len};

/// A growable run of `T`, with explicit volume management.
pub struct Extent<T> {
    /// Always exactly `volume + reserved` initialized slots.
    slots: Vec<T>,
    volume: usize,
    length: usize,
    /// Slots past `volume`; `slots[length]` is zeroed whenever this is non-zero.
    reserved: usize,
    policy: GrowthPolicy,
    /// Successful allocations and reallocations over the extent's life.
    allocations: usize,
}

impl<T: Pod> Extent<T> {
    /// An empty extent with no volume.
    pub fn new() -> Self {
        Self::with_reserved(0, GrowthPolicy::default())
    }

    /// An empty extent with no volume, sized according to `policy`.
    ///
    /// Fails with `AllocError::InvalidPolicy` if `policy` does not validate.
    pub fn with_policy(policy: GrowthPolicy) -> Result<Self, AllocError> {
        policy.validate()?;
        Ok(Self::with_reserved(0, policy))
    }

    /// An extent holding `length` zeroed elements.
    ///
    /// Room for further growth is preallocated if possible; if that allocation
    /// fails the extent is created with a volume of exactly `length`.
    pub fn with_length(length: usize) -> Result<Self, AllocError> {
        Self::with_length_in(length, GrowthPolicy::default())
    }

    /// As `with_length`, sized according to `policy`.
    pub fn with_length_in(length: usize, policy: GrowthPolicy) -> Result<Self, AllocError> {
        let mut extent = Self::with_policy(policy)?;
        extent.grow_to(length)?;
        Ok(extent)
    }

    /// An empty extent that keeps `reserved` zeroed slots past its volume.
    ///
    /// The reserved slots are allocated up front, even for an empty extent,
    /// so that `slots[length]` always exists.
    pub(crate) fn with_reserved(reserved: usize, policy: GrowthPolicy) -> Self {
        Self {
            slots: vec![T::zeroed(); reserved],
            volume: 0,
            length: 0,
            reserved,
            policy,
            allocations: if reserved > 0 && size_of::<T>() > 0 { 1 } else { 0 },
        }
    }

    /// Sets the length to `length`, zero-filling any new elements.
    pub(crate) fn grow_to(&mut self, length: usize) -> Result<(), AllocError> {
        if length > self.length {
            self.inject_zeroed(self.length, length - self.length)
        } else {
            Ok(())
        }
    }

    /// A copy of `self`, with the same volume if possible.
    ///
    /// Should an allocation of the full volume fail, and the extent not be full,
    /// a copy with volume equal to the length is attempted instead.
    pub fn duplicate(&self) -> Result<Self, AllocError> {
        let (slots, volume) = match Self::allocate(self.volume, self.reserved, &self.policy) {
            Ok(slots) => (slots, self.volume),
            Err(error) if self.length < self.volume => {
                tracing::debug!(%error, volume = self.volume, length = self.length, "duplicate falling back to exact length");
                (Self::allocate(self.length, self.reserved, &self.policy)?, self.length)
            }
            Err(error) => return Err(error),
        };
        let allocations = if !slots.is_empty() && size_of::<T>() > 0 { 1 } else { 0 };
        let mut copy = Self {
            slots,
            volume,
            length: self.length,
            reserved: self.reserved,
            policy: self.policy,
            allocations,
        };
        copy.slots[.. self.length].copy_from_slice(self.as_slice());
        copy.terminate();
        Ok(copy)
    }

    /// Bytes per element.
    #[inline(always)] pub fn element_size(&self) -> usize { size_of::<T>() }
    /// Elements the extent can hold without reallocating.
    #[inline(always)] pub fn volume(&self) -> usize { self.volume }
    /// Elements the extent currently holds.
    #[inline(always)] pub fn length(&self) -> usize { self.length }
    /// The policy used to size the extent.
    #[inline(always)] pub fn policy(&self) -> &GrowthPolicy { &self.policy }
    /// Successful allocations and reallocations performed so far.
    #[inline(always)] pub fn allocations(&self) -> usize { self.allocations }

    #[inline(always)] pub fn as_slice(&self) -> &[T] { &self.slots[.. self.length] }
    #[inline(always)] pub fn as_mut_slice(&mut self) -> &mut [T] { &mut self.slots[.. self.length] }
    /// The elements followed by the reserved slots.
    #[inline(always)] pub(crate) fn as_slice_with_reserved(&self) -> &[T] { &self.slots[.. self.length + self.reserved] }

    /// Reallocates to hold exactly `volume` elements.
    ///
    /// On failure the extent is unmodified. On success, if `volume` is less than
    /// the length then the extent is truncated to `volume` elements.
    pub fn resize(&mut self, volume: usize) -> Result<(), AllocError> {
        let slots = arith::add(volume, self.reserved).ok_or(AllocError::Overflow)?;
        let bytes = arith::allocation_bytes(slots, size_of::<T>()).ok_or(AllocError::Overflow)?;
        self.policy.admit(bytes)?;

        let current = self.slots.len();
        if slots > current {
            self.slots
                .try_reserve_exact(slots - current)
                .map_err(|_| AllocError::Exhausted { bytes })?;
            self.slots.resize(slots, T::zeroed());
        }
        else if slots < current {
            self.slots.truncate(slots);
            self.slots.shrink_to(slots);
        }
        if slots != current && size_of::<T>() > 0 {
            self.allocations += 1;
        }

        tracing::trace!(element_size = size_of::<T>(), from = self.volume, to = volume, "resized extent");
        self.volume = volume;
        self.length = std::cmp::min(self.length, volume);
        self.terminate();
        Ok(())
    }

    /// Reallocates to a volume equal to the length, if possible.
    ///
    /// A failed reallocation leaves the extent as it was.
    pub fn shrink(&mut self) {
        if let Err(error) = self.resize(self.length) {
            tracing::debug!(%error, volume = self.volume, length = self.length, "shrink failed; keeping volume");
        }
    }

    /// Ensures that the volume is at least `length`.
    ///
    /// A volume of `policy.grow` applied to `length` is tried first, so that a
    /// run of appends reallocates only a logarithmic number of times. If that
    /// target overflows or cannot be allocated, exactly `length` is tried.
    /// On failure of both the extent is unmodified.
    ///
    /// Inserts that keep the length within `length` cannot fail afterwards,
    /// until something reduces the volume again (`resize`, `shrink`, `excise`).
    pub fn ensure(&mut self, length: usize) -> Result<(), AllocError> {
        if length <= self.volume {
            return Ok(());
        }
        if let Some(target) = self.policy.grow_target(length) {
            match self.resize(target) {
                Ok(()) => return Ok(()),
                Err(error) => {
                    tracing::debug!(%error, target, length, "preallocation failed; retrying at exact length");
                }
            }
        }
        self.resize(length)
    }

    /// Inserts `items` at index `at`, shifting later elements toward the tail.
    ///
    /// Fails, leaving the extent unmodified, if the new length overflows or the
    /// volume cannot be ensured.
    ///
    /// # Panics
    ///
    /// Panics if `at` exceeds the length.
    pub fn inject(&mut self, at: usize, items: &[T]) -> Result<(), AllocError> {
        self.open_gap(at, items.len())?;
        self.slots[at .. at + items.len()].copy_from_slice(items);
        Ok(())
    }

    /// Inserts `count` zeroed elements at index `at`.
    ///
    /// # Panics
    ///
    /// Panics if `at` exceeds the length.
    pub fn inject_zeroed(&mut self, at: usize, count: usize) -> Result<(), AllocError> {
        self.open_gap(at, count)?;
        self.slots[at .. at + count].fill(T::zeroed());
        Ok(())
    }

    /// Makes room for `count` elements at `at`; the gap holds stale elements.
    fn open_gap(&mut self, at: usize, count: usize) -> Result<(), AllocError> {
        assert!(at <= self.length, "insertion index {} out of bounds for length {}", at, self.length);
        let length = arith::add(self.length, count).ok_or(AllocError::Overflow)?;
        self.ensure(length)?;
        self.slots.copy_within(at .. self.length, at + count);
        self.length = length;
        self.terminate();
        Ok(())
    }

    /// Removes `count` elements starting at `at`, shifting later elements toward the head.
    ///
    /// Removal itself cannot fail. If it leaves the extent at most half used the
    /// volume is reduced to `policy.shrink` applied to the new length, provided that
    /// target still holds every remaining element; should that reallocation fail the
    /// extent keeps its larger volume.
    ///
    /// # Panics
    ///
    /// Panics if `at + count` exceeds the length.
    pub fn excise(&mut self, at: usize, count: usize) {
        let end = arith::add(at, count)
            .filter(|&end| end <= self.length)
            .unwrap_or_else(|| panic!("removal of {} elements at {} out of bounds for length {}", count, at, self.length));
        self.slots.copy_within(end .. self.length, at);
        self.length -= count;
        self.terminate();

        if self.policy.should_shrink(self.length, self.volume) {
            if let Some(target) = self.policy.shrink_target(self.length).filter(|&t| t >= self.length && t < self.volume) {
                if let Err(error) = self.resize(target) {
                    tracing::debug!(%error, target, volume = self.volume, "opportunistic shrink failed");
                }
            }
        }
    }

    /// Inserts `item` at index `at`.
    #[inline]
    pub fn insert(&mut self, at: usize, item: T) -> Result<(), AllocError> {
        self.inject(at, std::slice::from_ref(&item))
    }

    /// Inserts `item` after the last element.
    #[inline]
    pub fn append(&mut self, item: T) -> Result<(), AllocError> {
        self.inject(self.length, std::slice::from_ref(&item))
    }

    /// Inserts `items` after the last element.
    #[inline]
    pub fn extend(&mut self, items: &[T]) -> Result<(), AllocError> {
        self.inject(self.length, items)
    }

    /// Removes and returns the element at index `at`.
    ///
    /// # Panics
    ///
    /// Panics if `at` is out of bounds.
    pub fn remove(&mut self, at: usize) -> T {
        assert!(at < self.length, "removal index {} out of bounds for length {}", at, self.length);
        let item = self.slots[at];
        self.excise(at, 1);
        item
    }

    /// Removes elements from the tail until at most `length` remain.
    pub fn truncate(&mut self, length: usize) {
        if length < self.length {
            self.excise(length, self.length - length);
        }
    }

    /// Removes and returns the last element, if any.
    pub fn pull(&mut self) -> Option<T> {
        if self.length == 0 { None }
        else { Some(self.remove(self.length - 1)) }
    }

    /// Removes and returns the first element, if any.
    pub fn shift(&mut self) -> Option<T> {
        if self.length == 0 { None }
        else { Some(self.remove(0)) }
    }

    /// The last element, if any.
    #[inline]
    pub fn tail(&self) -> Option<&T> {
        self.as_slice().last()
    }

    /// Drops elements past `length` without touching the volume.
    pub(crate) fn rewind(&mut self, length: usize) {
        debug_assert!(length <= self.length);
        self.length = length;
        self.terminate();
    }

    /// Zeroes the first reserved slot after the elements.
    #[inline(always)]
    fn terminate(&mut self) {
        if self.reserved > 0 {
            self.slots[self.length] = T::zeroed();
        }
    }

    /// Fresh zeroed storage for `volume + reserved` slots.
    fn allocate(volume: usize, reserved: usize, policy: &GrowthPolicy) -> Result<Vec<T>, AllocError> {
        let slots = arith::add(volume, reserved).ok_or(AllocError::Overflow)?;
        let bytes = arith::allocation_bytes(slots, size_of::<T>()).ok_or(AllocError::Overflow)?;
        policy.admit(bytes)?;
        let mut storage = Vec::new();
        storage.try_reserve_exact(slots).map_err(|_| AllocError::Exhausted { bytes })?;
        storage.resize(slots, T::zeroed());
        Ok(storage)
    }
}

impl<T: Pod> Default for Extent<T> {
    fn default() -> Self { Self::new() }
}

impl<T> Len for Extent<T> {
    #[inline(always)] fn len(&self) -> usize { self.length }
}

impl<T: Pod> Clear for Extent<T> {
    #[inline(always)] fn clear(&mut self) { self.rewind(0) }
}

impl<T> HeapSize for Extent<T> {
    fn heap_size(&self) -> (usize, usize) {
        let (_, c) = self.slots.heap_size();
        (size_of::<T>() * self.length, c)
    }
}

impl<T: Pod + fmt::Debug> fmt::Debug for Extent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Extent(element_size = {}, utilization = {}/{}) ", size_of::<T>(), self.length, self.volume)?;
        f.debug_list().entries(self.as_slice()).finish()
    }
}
