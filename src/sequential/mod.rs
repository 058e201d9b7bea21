//! Single threaded sorts.

pub mod counting;
pub mod radix;

pub use counting::{counting_sort, counting_sort_copy, counting_sort_move};
pub use radix::{radix_sort, radix_sort_by_key, radix_sort_with};
