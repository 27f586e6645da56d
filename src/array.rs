//! A typed dynamic array over an `Extent`.

use std::cmp::Ordering;
use std::fmt;
use std::mem::size_of;
use std::ops::{Deref, DerefMut};

use bytemuck::Pod;

use crate::{AllocError, Clear, Extent, GrowthPolicy, HeapSize, Len};

/// A stand-in for `Vec<T>` with fallible growth and explicit volume control.
///
/// The storage operations (`ensure`, `inject`, `excise`, `append`, ...) come from
/// the underlying [`Extent`], reachable through `Deref`. The methods here never
/// reallocate.
pub struct Array<T> {
    extent: Extent<T>,
}

impl<T: Pod> Array<T> {
    pub fn new() -> Self {
        Self { extent: Extent::new() }
    }
    pub fn with_policy(policy: GrowthPolicy) -> Result<Self, AllocError> {
        Ok(Self { extent: Extent::with_policy(policy)? })
    }
    /// An array of `length` zeroed elements; see [`Extent::with_length`].
    pub fn with_length(length: usize) -> Result<Self, AllocError> {
        Ok(Self { extent: Extent::with_length(length)? })
    }
    pub fn with_length_in(length: usize, policy: GrowthPolicy) -> Result<Self, AllocError> {
        Ok(Self { extent: Extent::with_length_in(length, policy)? })
    }
    /// An array holding a copy of `items`, with volume equal to its length.
    pub fn from_slice(items: &[T]) -> Result<Self, AllocError> {
        let mut array = Self::new();
        array.extent.resize(items.len())?;
        array.extent.extend(items)?;
        Ok(array)
    }
    /// A copy of `self`; see [`Extent::duplicate`].
    pub fn duplicate(&self) -> Result<Self, AllocError> {
        Ok(Self { extent: self.extent.duplicate()? })
    }
    /// Consumes the array, returning its extent.
    pub fn into_extent(self) -> Extent<T> {
        self.extent
    }

    /// A copy of the element at index `i`.
    #[inline(always)] pub fn get(&self, i: usize) -> T { self.as_slice()[i] }
    #[inline(always)] pub fn at(&self, i: usize) -> &T { &self.as_slice()[i] }
    #[inline(always)] pub fn at_mut(&mut self, i: usize) -> &mut T { &mut self.as_mut_slice()[i] }
    /// Overwrites the element at index `i`.
    #[inline(always)] pub fn set(&mut self, i: usize, item: T) { self.as_mut_slice()[i] = item; }

    /// The index of `item`, which must be a reference into this array.
    ///
    /// This compares addresses, not values; a reference to anything outside the
    /// array (or to a zero-sized element) yields `None`.
    pub fn index_of(&self, item: &T) -> Option<usize> {
        let size = size_of::<T>();
        if size == 0 { return None; }
        let base = self.as_slice().as_ptr() as usize;
        let addr = item as *const T as usize;
        let offset = addr.checked_sub(base)?;
        if offset < self.length() * size { Some(offset / size) } else { None }
    }

    #[inline] pub fn swap(&mut self, i: usize, j: usize) { self.as_mut_slice().swap(i, j) }

    /// Moves the element at `source` to `target`, shifting those in between by one.
    pub fn move_item(&mut self, target: usize, source: usize) {
        let slice = self.as_mut_slice();
        assert!(target < slice.len() && source < slice.len(), "move {} -> {} out of bounds for length {}", source, target, slice.len());
        match target.cmp(&source) {
            Ordering::Less => slice[target ..= source].rotate_right(1),
            Ordering::Greater => slice[source ..= target].rotate_left(1),
            Ordering::Equal => { }
        }
    }

    /// Bytewise equality of the elements; the volume is not compared.
    pub fn eq_bytes(&self, other: &Self) -> bool {
        if self.length() != other.length() { return false; }
        if size_of::<T>() == 0 { return true; }
        bytemuck::cast_slice::<T, u8>(self.as_slice()) == bytemuck::cast_slice::<T, u8>(other.as_slice())
    }
    /// Element-wise equality according to `eq`.
    pub fn eq_by(&self, other: &Self, mut eq: impl FnMut(&T, &T) -> bool) -> bool {
        self.length() == other.length()
            && self.as_slice().iter().zip(other.as_slice()).all(|(a, b)| eq(a, b))
    }
    pub fn ne_by(&self, other: &Self, eq: impl FnMut(&T, &T) -> bool) -> bool {
        !self.eq_by(other, eq)
    }

    /// Sorts in place according to `cmp`; not stable.
    pub fn sort_by(&mut self, cmp: impl FnMut(&T, &T) -> Ordering) {
        self.as_mut_slice().sort_unstable_by(cmp);
    }

    /// The index of the first element satisfying `pred`.
    pub fn find(&self, pred: impl FnMut(&T) -> bool) -> Option<usize> {
        self.find_next(0, pred)
    }
    /// The index of the first element at or after `i` satisfying `pred`.
    pub fn find_next(&self, i: usize, pred: impl FnMut(&T) -> bool) -> Option<usize> {
        let slice = self.as_slice();
        if i >= slice.len() { return None; }
        slice[i ..].iter().position(pred).map(|p| p + i)
    }
    /// The index of the last element before `i` satisfying `pred`.
    pub fn find_last(&self, i: usize, pred: impl FnMut(&T) -> bool) -> Option<usize> {
        let slice = self.as_slice();
        let i = std::cmp::min(i, slice.len());
        slice[.. i].iter().rposition(pred)
    }
    /// The first element satisfying `pred` after the previous hit `ante`, if any.
    ///
    /// Repeated calls, feeding back the result, visit every match in order.
    pub fn find_after(&self, ante: Option<usize>, pred: impl FnMut(&T) -> bool) -> Option<usize> {
        match ante {
            None => self.find_next(0, pred),
            Some(i) => self.find_next(i.checked_add(1)?, pred),
        }
    }

    /// Binary search for `probe` in an array sorted consistently with `cmp`.
    ///
    /// Returns the index of some matching element.
    pub fn search(&self, probe: &T, mut cmp: impl FnMut(&T, &T) -> Ordering) -> Option<usize> {
        self.as_slice().binary_search_by(|x| cmp(x, probe)).ok()
    }
}

impl<T> Deref for Array<T> {
    type Target = Extent<T>;
    #[inline(always)] fn deref(&self) -> &Extent<T> { &self.extent }
}
impl<T> DerefMut for Array<T> {
    #[inline(always)] fn deref_mut(&mut self) -> &mut Extent<T> { &mut self.extent }
}

impl<T: Pod> Default for Array<T> {
    fn default() -> Self { Self::new() }
}
impl<T: Pod> From<Extent<T>> for Array<T> {
    fn from(extent: Extent<T>) -> Self { Self { extent } }
}

impl<T: Pod> PartialEq for Array<T> {
    fn eq(&self, other: &Self) -> bool { self.eq_bytes(other) }
}
impl<T: Pod> Eq for Array<T> { }

impl<T> Len for Array<T> {
    #[inline(always)] fn len(&self) -> usize { self.extent.len() }
}
impl<T: Pod> Clear for Array<T> {
    #[inline(always)] fn clear(&mut self) { self.extent.clear() }
}
impl<T> HeapSize for Array<T> {
    fn heap_size(&self) -> (usize, usize) { self.extent.heap_size() }
}

impl<T: Pod + fmt::Debug> fmt::Debug for Array<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<'a, T: Pod> IntoIterator for &'a Array<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;
    #[inline(always)] fn into_iter(self) -> Self::IntoIter { self.as_slice().iter() }
}

#[cfg(test)]
mod test {
    use super::*;

    fn array(items: &[i32]) -> Array<i32> {
        Array::from_slice(items).unwrap()
    }

    #[test]
    fn get_and_set() {
        let mut a = array(&[1, 2, 3]);
        assert_eq!(a.get(1), 2);
        a.set(1, 20);
        *a.at_mut(2) += 10;
        assert_eq!(a.as_slice(), &[1, 20, 13]);
        assert_eq!(*a.at(0), 1);
        assert_eq!(a.volume(), 3);
    }

    #[test]
    #[should_panic]
    fn get_out_of_bounds() {
        let a = array(&[1, 2, 3]);
        let _ = a.get(3);
    }

    #[test]
    fn index_of_reference() {
        let a = array(&[5, 6, 7, 8]);
        assert_eq!(a.index_of(a.at(2)), Some(2));
        assert_eq!(a.index_of(&a.get(2)), None);
        let b = array(&[5]);
        assert_eq!(a.index_of(b.at(0)), None);
    }

    #[test]
    fn swap_and_move() {
        let mut a = array(&[0, 1, 2, 3, 4]);
        a.swap(0, 4);
        assert_eq!(a.as_slice(), &[4, 1, 2, 3, 0]);
        a.move_item(1, 3);
        assert_eq!(a.as_slice(), &[4, 3, 1, 2, 0]);
        a.move_item(4, 0);
        assert_eq!(a.as_slice(), &[3, 1, 2, 0, 4]);
        a.move_item(2, 2);
        assert_eq!(a.as_slice(), &[3, 1, 2, 0, 4]);
    }

    #[test]
    fn equality() {
        let a = array(&[1, 2, 3]);
        let mut b = Array::new();
        b.extend(&[1, 2, 3]).unwrap();
        assert!(a.volume() != b.volume());
        assert_eq!(a, b);
        b.set(2, -3);
        assert_ne!(a, b);
        assert!(a.eq_by(&b, |x, y| x.abs() == y.abs()));
        assert!(a.ne_by(&b, |x, y| x == y));
        assert!(!a.eq_by(&array(&[1, 2]), |_, _| true));
        assert_eq!(Array::<()>::with_length(3).unwrap(), Array::<()>::with_length(3).unwrap());
    }

    #[test]
    fn sort_and_search() {
        let mut a = array(&[9, 3, 7, 1, 5]);
        a.sort_by(|x, y| x.cmp(y));
        assert_eq!(a.as_slice(), &[1, 3, 5, 7, 9]);
        assert_eq!(a.search(&7, |x, y| x.cmp(y)), Some(3));
        assert_eq!(a.search(&4, |x, y| x.cmp(y)), None);
        a.sort_by(|x, y| y.cmp(x));
        assert_eq!(a.search(&3, |x, y| y.cmp(x)), Some(3));
    }

    #[test]
    fn find_family() {
        let a = array(&[1, 4, 2, 4, 3]);
        assert_eq!(a.find(|&x| x == 4), Some(1));
        assert_eq!(a.find_next(2, |&x| x == 4), Some(3));
        assert_eq!(a.find_next(4, |&x| x == 4), None);
        assert_eq!(a.find_next(10, |&x| x == 4), None);
        assert_eq!(a.find_last(5, |&x| x == 4), Some(3));
        assert_eq!(a.find_last(3, |&x| x == 4), Some(1));
        assert_eq!(a.find_last(1, |&x| x == 4), None);
        assert_eq!(a.find_last(100, |&x| x == 3), Some(4));
        assert_eq!(a.find(|&x| x == 8), None);

        let mut hits = Vec::new();
        let mut ante = None;
        while let Some(i) = a.find_after(ante, |&x| x % 2 == 0) {
            hits.push(i);
            ante = Some(i);
        }
        assert_eq!(hits, vec![1, 2, 3]);
    }

    #[test]
    fn storage_through_deref() {
        let mut a = Array::<u64>::new();
        for i in 0 .. 100 {
            a.append(i).unwrap();
        }
        a.excise(10, 80);
        assert_eq!(a.len(), 20);
        assert_eq!(a.get(10), 90);
        assert_eq!(a.pull(), Some(99));
        let copy = a.duplicate().unwrap();
        assert_eq!(copy, a);
        assert_eq!(format!("{:?}", array(&[1, 2])), "[1, 2]");
        assert_eq!((&copy).into_iter().count(), 19);
    }

    #[test]
    fn shrink_on_removal_keeps_contents() {
        let mut a = Array::<u32>::new();
        for i in 0 .. 1000 {
            a.append(i).unwrap();
        }
        let allocations = a.allocations();
        a.excise(0, 600);
        assert_eq!(a.allocations(), allocations + 1);
        assert!(a.volume() < 1000);
        for i in 0 .. 400 {
            assert_eq!(a.get(i), 600 + i as u32);
        }
    }
}
