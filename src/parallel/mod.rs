//! Sorts split across a pool of worker threads.
//!
//! Every entry point takes a [`Parallel`] policy, plans a [`Shape`] for the input and falls back
//! to the [`sequential`](crate::sequential) sorts when the input is too small for more than one
//! chunk. The output is the same as the sequential one for every thread count.

pub mod counting;
pub mod dispatch;
pub mod radix;
pub mod shape;

pub use counting::{counting_pass, counting_sort, counting_sort_copy, counting_sort_move};
pub use radix::{radix_sort, radix_sort_by_key, radix_sort_in, radix_sort_with};
pub use shape::{Parallel, Shape, DEFAULT_MIN_CHUNK_LEN};
