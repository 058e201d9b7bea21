//! Stable linear time sorting of integer and float keys.
//!
//! Two algorithms are provided, a counting sort for keys of at most 16 bits and an LSD radix sort
//! for keys of up to 128 bits. Both exist as single threaded sorts, re-exported at the crate root,
//! and as sorts split across a worker pool in [`parallel`]. Every sort is stable and the parallel
//! sorts produce the same output as the sequential ones.
//!
//! A sort is configured by a key function, which maps an element to a scalar key, and for the
//! radix sort additionally by a digit function, which cuts the lowest digit out of a projected
//! key. The digit width follows from the digit function's return type, and a width that does not
//! evenly divide the key width is rejected when the sort is compiled.

mod error;
mod key;
mod radix_traits;

pub mod parallel;
pub mod patterns;
pub mod sequential;

pub use error::SortError;
pub use key::{Ordered, RadixKey};
pub use radix_traits::{
    low_bits, low_byte, Bits, ConfigError, Digit, RadixTraits, MAX_DIGIT_WIDTH,
};
pub use sequential::{
    counting_sort, counting_sort_copy, counting_sort_move, radix_sort, radix_sort_by_key,
    radix_sort_with,
};
