//! Common traits that are re-used throughout the crate.

/// A type with a length.
pub trait Len {
    /// The number of contained elements.
    fn len(&self) -> usize;
    /// Whether this contains no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
impl<L: Len + ?Sized> Len for &L {
    #[inline(always)] fn len(&self) -> usize { L::len(*self) }
}
impl<L: Len + ?Sized> Len for &mut L {
    #[inline(always)] fn len(&self) -> usize { L::len(*self) }
}
impl<T> Len for Vec<T> {
    #[inline(always)] fn len(&self) -> usize { self.len() }
}
impl<T> Len for [T] {
    #[inline(always)] fn len(&self) -> usize { <[T]>::len(self) }
}

/// A type that can be emptied in place.
pub trait Clear {
    /// Clears `self`, without changing its capacity.
    fn clear(&mut self);
}
impl<T> Clear for Vec<T> {
    #[inline(always)] fn clear(&mut self) { self.clear() }
}

/// A type that can report the heap memory it uses.
pub trait HeapSize {
    /// Active (len) and allocated (cap) heap sizes in bytes.
    /// This should not include the size of `self` itself.
    fn heap_size(&self) -> (usize, usize) { (0, 0) }
}

// This implementation does not chase down the heap contributions of the owned items,
// which is fine for the `Pod` types stored throughout this crate.
impl<T> HeapSize for Vec<T> {
    fn heap_size(&self) -> (usize, usize) {
        let l = std::mem::size_of::<T>() * self.len();
        let c = std::mem::size_of::<T>() * self.capacity();
        (l, c)
    }
}
