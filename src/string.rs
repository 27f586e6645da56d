//! A growable byte string that is always null terminated.
//!
//! The terminator lives in a reserved slot of the underlying extent, past its
//! volume, so it is never counted in the length and never has to be reallocated
//! for separately. Every mutation, including those reached through `Deref`,
//! leaves `bytes[len] == 0`.

use std::cmp::Ordering;
use std::ffi::CStr;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Deref, DerefMut};

use crate::{AllocError, Clear, Extent, GrowthPolicy, HeapSize, Len};

/// A byte string with a guaranteed trailing `0`.
pub struct ByteString {
    extent: Extent<u8>,
}

impl ByteString {
    /// An empty string.
    pub fn new() -> Self {
        Self { extent: Extent::with_reserved(1, GrowthPolicy::default()) }
    }
    /// An empty string sized according to `policy`, which must validate.
    pub fn with_policy(policy: GrowthPolicy) -> Result<Self, AllocError> {
        policy.validate()?;
        Ok(Self { extent: Extent::with_reserved(1, policy) })
    }
    /// A string holding a copy of `bytes`, with volume equal to its length.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AllocError> {
        let mut string = Self::new();
        string.extent.resize(bytes.len())?;
        string.extent.extend(bytes)?;
        Ok(string)
    }
    /// A string of `length` zero bytes, with volume equal to its length.
    pub fn zeroed(length: usize) -> Result<Self, AllocError> {
        let mut string = Self::new();
        string.extent.resize(length)?;
        string.extent.grow_to(length)?;
        Ok(string)
    }
    /// A copy of `self`; see [`Extent::duplicate`].
    pub fn duplicate(&self) -> Result<Self, AllocError> {
        Ok(Self { extent: self.extent.duplicate()? })
    }

    #[inline(always)] pub fn as_bytes(&self) -> &[u8] { self.extent.as_slice() }
    /// The bytes followed by the terminator.
    #[inline(always)] pub fn as_bytes_with_nul(&self) -> &[u8] { self.extent.as_slice_with_reserved() }
    /// The string up to its first `0`, which is the terminator unless one was inserted.
    pub fn as_c_str(&self) -> &CStr {
        match CStr::from_bytes_until_nul(self.as_bytes_with_nul()) {
            Ok(c_str) => c_str,
            Err(_) => unreachable!("byte strings are always terminated"),
        }
    }
    pub fn to_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(self.as_bytes())
    }

    /// Appends the formatted `args`, growing exactly once if needed.
    ///
    /// The output is measured before anything is written, so on failure the
    /// string is unmodified.
    ///
    /// # Panics
    ///
    /// Panics if a formatting trait implementation returns an error, as
    /// `format!` does. Use `write!` through `fmt::Write` to receive it instead.
    pub fn catf(&mut self, args: fmt::Arguments<'_>) -> Result<(), AllocError> {
        match self.append_fmt(args) {
            Ok(()) => Ok(()),
            Err(Failure::Alloc(error)) => Err(error),
            Err(Failure::Format) => panic!("a formatting trait implementation returned an error"),
        }
    }

    /// Measures, ensures, then writes `args`; on failure the string is unmodified.
    fn append_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<(), Failure> {
        let mut counter = Counter { bytes: 0, overflowed: false };
        if fmt::write(&mut counter, args).is_err() {
            return Err(if counter.overflowed { Failure::Alloc(AllocError::Overflow) } else { Failure::Format });
        }
        let length = self.extent.length();
        let demand = crate::arith::add(length, counter.bytes).ok_or(AllocError::Overflow)?;
        self.extent.ensure(demand)?;

        let mut sink = Sink { extent: &mut self.extent, error: None };
        let result = fmt::write(&mut sink, args);
        let error = sink.error.take();
        if result.is_err() {
            self.extent.rewind(length);
            return Err(error.map_or(Failure::Format, Failure::Alloc));
        }
        Ok(())
    }

    /// The last byte, if any.
    #[inline]
    pub fn tail(&self) -> Option<u8> {
        self.extent.tail().copied()
    }

    /// The position of the first `byte` after the previous hit `ante`, if any.
    pub fn find_byte(&self, byte: u8, ante: Option<usize>) -> Option<usize> {
        let start = match ante {
            None => 0,
            Some(i) => i.checked_add(1)?,
        };
        let bytes = self.as_bytes();
        if start >= bytes.len() { return None; }
        bytes[start ..].iter().position(|&b| b == byte).map(|p| p + start)
    }
}

/// Why a formatted append did not happen.
enum Failure {
    Alloc(AllocError),
    /// A formatting trait implementation returned an error.
    Format,
}

impl From<AllocError> for Failure {
    fn from(error: AllocError) -> Self { Failure::Alloc(error) }
}

/// Counts formatted bytes without storing them.
struct Counter {
    bytes: usize,
    overflowed: bool,
}

impl fmt::Write for Counter {
    #[inline]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        match crate::arith::add(self.bytes, s.len()) {
            Some(bytes) => { self.bytes = bytes; Ok(()) }
            None => { self.overflowed = true; Err(fmt::Error) }
        }
    }
}

/// Appends formatted bytes to an extent, remembering why a write failed.
struct Sink<'a> {
    extent: &'a mut Extent<u8>,
    error: Option<AllocError>,
}

impl fmt::Write for Sink<'_> {
    #[inline]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.extent.extend(s.as_bytes()).map_err(|error| {
            self.error = Some(error);
            fmt::Error
        })
    }
}

impl fmt::Write for ByteString {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.extent.extend(s.as_bytes()).map_err(|_| fmt::Error)
    }
    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        self.append_fmt(args).map_err(|_| fmt::Error)
    }
}

impl Deref for ByteString {
    type Target = Extent<u8>;
    #[inline(always)] fn deref(&self) -> &Extent<u8> { &self.extent }
}
impl DerefMut for ByteString {
    #[inline(always)] fn deref_mut(&mut self) -> &mut Extent<u8> { &mut self.extent }
}

impl Default for ByteString {
    fn default() -> Self { Self::new() }
}

impl PartialEq for ByteString {
    fn eq(&self, other: &Self) -> bool { self.as_bytes() == other.as_bytes() }
}
impl Eq for ByteString { }
impl PartialEq<[u8]> for ByteString {
    fn eq(&self, other: &[u8]) -> bool { self.as_bytes() == other }
}
impl PartialEq<str> for ByteString {
    fn eq(&self, other: &str) -> bool { self.as_bytes() == other.as_bytes() }
}
impl PartialEq<&str> for ByteString {
    fn eq(&self, other: &&str) -> bool { self.as_bytes() == other.as_bytes() }
}
impl PartialOrd for ByteString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}
impl Ord for ByteString {
    fn cmp(&self, other: &Self) -> Ordering { self.as_bytes().cmp(other.as_bytes()) }
}
impl Hash for ByteString {
    fn hash<H: Hasher>(&self, state: &mut H) { self.as_bytes().hash(state) }
}

impl Len for ByteString {
    #[inline(always)] fn len(&self) -> usize { self.extent.len() }
}
impl Clear for ByteString {
    #[inline(always)] fn clear(&mut self) { self.extent.clear() }
}
impl HeapSize for ByteString {
    fn heap_size(&self) -> (usize, usize) { self.extent.heap_size() }
}

impl fmt::Debug for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.as_bytes().escape_ascii())
    }
}
impl fmt::Display for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&String::from_utf8_lossy(self.as_bytes()), f)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{arith, Ratio};

    fn terminated(string: &ByteString) {
        let bytes = string.as_bytes_with_nul();
        assert_eq!(bytes.len(), string.len() + 1);
        assert_eq!(bytes[string.len()], 0);
        assert!(string.length() <= string.volume());
    }

    #[test]
    fn create() {
        let empty = ByteString::new();
        assert_eq!(empty.as_bytes_with_nul(), b"\0");
        let hello = ByteString::from_bytes(b"hello").unwrap();
        assert_eq!(hello, "hello");
        assert_eq!(hello.volume(), 5);
        terminated(&hello);
        let zeros = ByteString::zeroed(3).unwrap();
        assert_eq!(zeros.as_bytes_with_nul(), b"\0\0\0\0");
        assert_eq!(zeros.volume(), 3);
    }

    #[test]
    fn every_mutation_terminates() {
        let mut s = ByteString::from_bytes(b"abc").unwrap();
        s.append(b'd').unwrap();
        terminated(&s);
        s.insert(0, b'_').unwrap();
        terminated(&s);
        s.inject(2, b"XYZ").unwrap();
        assert_eq!(s, "_aXYZbcd");
        terminated(&s);
        s.excise(2, 3);
        assert_eq!(s, "_abcd");
        terminated(&s);
        s.remove(0);
        terminated(&s);
        s.truncate(2);
        assert_eq!(s.as_bytes_with_nul(), b"ab\0");
        s.ensure(100).unwrap();
        terminated(&s);
        s.resize(1).unwrap();
        assert_eq!(s.as_bytes_with_nul(), b"a\0");
        s.shrink();
        terminated(&s);
        s.clear();
        assert_eq!(s.as_bytes_with_nul(), b"\0");
    }

    #[test]
    fn catf_grows_exactly_enough() {
        let mut s = ByteString::new();
        s.catf(format_args!("{}-{}", 12, "ab")).unwrap();
        assert_eq!(s, "12-ab");
        assert_eq!(s.volume(), (5 * 8 + 3) / 5);
        terminated(&s);
        let allocations = s.allocations();
        s.catf(format_args!("{}", 7)).unwrap();
        assert_eq!(s, "12-ab7");
        assert_eq!(s.allocations(), allocations);
        s.catf(format_args!("")).unwrap();
        assert_eq!(s, "12-ab7");
        terminated(&s);
    }

    #[test]
    fn catf_failure_leaves_string_unmodified() {
        let limit = arith::allocation_bytes(8 + 1, 1).unwrap();
        let mut s = ByteString::with_policy(GrowthPolicy::new().with_byte_limit(limit)).unwrap();
        s.catf(format_args!("{}", "abcdefgh")).unwrap();
        assert_eq!(s.volume(), 8);
        assert!(matches!(s.catf(format_args!("{}", 1)), Err(AllocError::LimitExceeded { .. })));
        assert_eq!(s, "abcdefgh");
        terminated(&s);
    }

    #[test]
    fn write_macro() {
        use std::fmt::Write;
        let mut s = ByteString::new();
        write!(s, "{:>4}|{:x}", 5, 255).unwrap();
        s.write_str("!").unwrap();
        assert_eq!(s, "   5|ff!");
        terminated(&s);
    }

    struct Refuses;
    impl fmt::Display for Refuses {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("partial")?;
            Err(fmt::Error)
        }
    }

    #[test]
    fn write_macro_reports_display_errors() {
        use std::fmt::Write;
        let mut s = ByteString::from_bytes(b"kept").unwrap();
        assert!(write!(s, "{}{}", 1, Refuses).is_err());
        assert_eq!(s, "kept");
        terminated(&s);
        let mut reference = String::from("kept");
        assert!(write!(reference, "{}", Refuses).is_err());
    }

    #[test]
    #[should_panic(expected = "formatting trait implementation returned an error")]
    fn catf_panics_on_display_errors() {
        let mut s = ByteString::new();
        let _ = s.catf(format_args!("{}", Refuses));
    }

    #[test]
    fn invalid_policy_is_rejected() {
        let mut policy = GrowthPolicy::default();
        policy.grow = Ratio::new(1, 1, 0);
        assert!(matches!(ByteString::with_policy(policy), Err(AllocError::InvalidPolicy { .. })));
    }

    #[test]
    fn views() {
        let s = ByteString::from_bytes("héllo".as_bytes()).unwrap();
        assert_eq!(s.to_str(), Ok("héllo"));
        assert_eq!(s.as_c_str().to_bytes(), "héllo".as_bytes());
        assert_eq!(s.to_string(), "héllo");
        assert_eq!(format!("{:?}", ByteString::from_bytes(b"a\"b\n").unwrap()), "\"a\\\"b\\n\"");

        let mut inner = ByteString::from_bytes(b"ab").unwrap();
        inner.insert(1, 0).unwrap();
        assert_eq!(inner.as_c_str().to_bytes(), b"a");
        assert_eq!(inner.len(), 3);
    }

    #[test]
    fn searching() {
        let s = ByteString::from_bytes(b"banana").unwrap();
        assert_eq!(s.tail(), Some(b'a'));
        assert_eq!(ByteString::new().tail(), None);
        let mut hits = Vec::new();
        let mut ante = None;
        while let Some(i) = s.find_byte(b'a', ante) {
            hits.push(i);
            ante = Some(i);
        }
        assert_eq!(hits, vec![1, 3, 5]);
        assert_eq!(s.find_byte(b'z', None), None);
    }

    #[test]
    fn ordering_and_hashing() {
        use std::collections::HashSet;
        let a = ByteString::from_bytes(b"abc").unwrap();
        let b = ByteString::from_bytes(b"abd").unwrap();
        let c = ByteString::from_bytes(b"ab").unwrap();
        assert!(a < b);
        assert!(c < a);
        assert!(b >= a);
        assert_eq!(a.cmp(&a.duplicate().unwrap()), Ordering::Equal);
        let set: HashSet<ByteString> = [a.duplicate().unwrap(), a, b].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn duplicate_keeps_terminator() {
        let mut s = ByteString::new();
        s.extend(b"hello world").unwrap();
        s.excise(5, 6);
        let copy = s.duplicate().unwrap();
        assert_eq!(copy, "hello");
        assert_eq!(copy.volume(), s.volume());
        terminated(&copy);
    }
}
