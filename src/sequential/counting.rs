//! Stable counting sort.
//!
//! One pass counts how often every key value occurs, the counts are turned into an exclusive
//! prefix sum, and a second pass scatters the elements in input order to the offsets found that
//! way. Visiting the input in order while every cursor only moves forward is what keeps equal
//! keys in their original order.

use std::mem;

use crate::error::{check_capacity, SortError};
use crate::key::Ordered;
use crate::radix_traits::{Digit, TraitsOf};

/// Per bucket counters of one counting sort pass.
///
/// Holds `bucket_count + 1` counters. After [`Histogram::collect`] `offsets()[v]` is the number
/// of elements whose digit is below `v`, and the last counter is the total element count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Histogram {
    counters: Vec<usize>,
}

impl Histogram {
    pub fn new(bucket_count: usize) -> Self {
        Self {
            counters: vec![0; bucket_count + 1],
        }
    }

    pub fn bucket_count(&self) -> usize {
        self.counters.len() - 1
    }

    /// Counts the digits of `items`. Every digit lands one slot to the right, so that the
    /// inclusive [`Histogram::prefix_sum`] afterwards yields exclusive offsets.
    #[inline]
    pub fn count<T>(&mut self, items: &[T], digit: impl Fn(&T) -> usize) {
        for item in items {
            self.add(digit(item));
        }
    }

    #[inline(always)]
    pub fn add(&mut self, digit: usize) {
        self.counters[digit + 1] += 1;
    }

    #[inline]
    pub fn prefix_sum(&mut self) {
        let mut sum = 0;
        for counter in self.counters.iter_mut() {
            sum += *counter;
            *counter = sum;
        }
    }

    pub fn collect<T>(&mut self, items: &[T], digit: impl Fn(&T) -> usize) {
        self.count(items, digit);
        self.prefix_sum();
    }

    pub fn offsets(&self) -> &[usize] {
        &self.counters
    }

    pub fn total(&self) -> usize {
        self.counters[self.counters.len() - 1]
    }

    /// True if a single bucket holds all `len` elements, a scatter would not move anything.
    pub fn is_trivial(&self, len: usize) -> bool {
        self.counters.windows(2).any(|w| w[1] - w[0] == len)
    }

    /// The offsets as write cursors, consumed by a dispose.
    pub fn cursors_mut(&mut self) -> &mut [usize] {
        let bucket_count = self.bucket_count();
        &mut self.counters[..bucket_count]
    }
}

/// Moves every element of `src` to `dst[cursors[digit]]` in input order and advances the cursor.
/// The displaced elements of `dst` end up in `src`.
#[inline]
pub fn dispose_move<T>(
    src: &mut [T],
    dst: &mut [T],
    digit: impl Fn(&T) -> usize,
    cursors: &mut [usize],
) {
    for value in src.iter_mut() {
        let cursor = &mut cursors[digit(value)];
        mem::swap(value, &mut dst[*cursor]);
        *cursor += 1;
    }
}

/// Like [`dispose_move`], leaving `src` untouched.
#[inline]
pub fn dispose_copy<T: Clone>(
    src: &[T],
    dst: &mut [T],
    digit: impl Fn(&T) -> usize,
    cursors: &mut [usize],
) {
    for value in src {
        let cursor = &mut cursors[digit(value)];
        dst[*cursor].clone_from(value);
        *cursor += 1;
    }
}

/// Number of buckets for a counting sort keyed by `K`, the projected key is its own digit.
pub(crate) const fn bucket_count<K>() -> usize
where
    K: Ordered,
    K::Unsigned: Digit,
{
    TraitsOf::<K::Unsigned, K::Unsigned>::TRAITS.bucket_count
}

#[inline]
pub(crate) fn key_digit<T, K, M>(map: &M) -> impl Fn(&T) -> usize + '_
where
    K: Ordered,
    K::Unsigned: Digit,
    M: Fn(&T) -> K,
{
    move |value: &T| map(value).to_ordered().index()
}

/// `dst` must hold at least `src.len()` elements.
pub(crate) fn sort_move_into<T, K, M>(src: &mut [T], dst: &mut [T], map: &M)
where
    K: Ordered,
    K::Unsigned: Digit,
    M: Fn(&T) -> K,
{
    let digit = key_digit::<T, K, M>(map);
    let mut histogram = Histogram::new(bucket_count::<K>());
    histogram.collect(src, &digit);
    dispose_move(src, dst, &digit, histogram.cursors_mut());
}

/// `dst` must hold at least `src.len()` elements.
pub(crate) fn sort_copy_into<T, K, M>(src: &[T], dst: &mut [T], map: &M)
where
    T: Clone,
    K: Ordered,
    K::Unsigned: Digit,
    M: Fn(&T) -> K,
{
    let digit = key_digit::<T, K, M>(map);
    let mut histogram = Histogram::new(bucket_count::<K>());
    histogram.collect(src, &digit);
    dispose_copy(src, dst, &digit, histogram.cursors_mut());
}

/// Sorts `src` into `dst` by `map`, stable, in `O(n + 2^bits(K))`.
///
/// `map` has to produce a key of at most 16 bits (`u8`, `i8`, `u16`, `i16`, `bool`). Returns the
/// index one past the last written element of `dst`.
pub fn counting_sort_copy<T, K, M>(src: &[T], dst: &mut [T], map: M) -> Result<usize, SortError>
where
    T: Clone,
    K: Ordered,
    K::Unsigned: Digit,
    M: Fn(&T) -> K,
{
    check_capacity(src.len(), dst.len())?;

    sort_copy_into(src, dst, &map);

    Ok(src.len())
}

/// Sorts `src` into `dst` by `map`, stable, without cloning.
///
/// Elements are swapped into place, afterwards `src` holds what `dst` held before, in
/// unspecified order. Returns the index one past the last written element of `dst`.
pub fn counting_sort_move<T, K, M>(
    src: &mut [T],
    dst: &mut [T],
    map: M,
) -> Result<usize, SortError>
where
    K: Ordered,
    K::Unsigned: Digit,
    M: Fn(&T) -> K,
{
    check_capacity(src.len(), dst.len())?;

    sort_move_into(src, &mut dst[..src.len()], &map);

    Ok(src.len())
}

/// Sorts `v` by `map` in place, stable. Allocates a buffer of `v.len()` elements.
///
/// The sorted sequence is built in the buffer and `v` is only written once it is complete. If
/// `map` panics, `v` is left as it was.
pub fn counting_sort<T, K, M>(v: &mut [T], map: M)
where
    T: Clone,
    K: Ordered,
    K::Unsigned: Digit,
    M: Fn(&T) -> K,
{
    if v.len() < 2 {
        return;
    }

    let mut buffer = v.to_vec();
    sort_copy_into(v, &mut buffer, &map);
    v.swap_with_slice(&mut buffer);
}
