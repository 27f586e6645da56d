//! Growable and fixed-size containers over plain-old-data elements.
//!
//! The core is [`Extent`], a contiguous buffer that tracks an element length and a
//! slot volume separately, and that grows and shrinks by configurable ratios. Every
//! size computation is checked, and every allocation is fallible: operations that may
//! need memory return `Result<_, AllocError>` and leave the container unmodified on
//! failure.
//!
//! Two typed facades sit on top of it:
//!
//! * [`Array`], a dynamic array with element access, reordering, and search.
//! * [`ByteString`], a byte string that always carries a zero terminator past its end.
//!
//! Separately, [`Bitset`] is a fixed-volume bitset packed into 32-bit units.
//!
//! Resizing is reported through `tracing` events; a subscriber is not required.

pub mod arith;
pub mod common;
pub mod config;
pub mod error;
pub mod extent;
pub mod array;
pub mod string;
pub mod bitset;

pub use common::{Clear, HeapSize, Len};
pub use config::{GrowthPolicy, Ratio};
pub use error::AllocError;
pub use extent::Extent;
pub use array::Array;
pub use string::ByteString;
pub use bitset::Bitset;
