//! Stable LSD radix sort.
//!
//! One counting sort pass per digit, from the lowest digit to the highest. After the pass over
//! digit `i` the sequence is ordered by the low `i + 1` digits, and since every pass is stable
//! the next one refines that order without breaking it.
//!
//! The passes alternate between the input and a single auxiliary buffer. The histograms of all
//! digits are collected in one traversal of the input up front, a digit histogram does not depend
//! on the order of the elements.

use log::trace;

use crate::error::{check_capacity, SortError};
use crate::key::{Ordered, RadixKey};
use crate::radix_traits::{low_byte, nth_digit, Digit, RadixTraits, TraitsOf};
use crate::sequential::counting::{dispose_move, Histogram};

/// Which of the two buffers holds the data after the last finished pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Current {
    Original,
    Buffer,
}

impl Current {
    #[inline]
    pub(crate) fn flip(self) -> Self {
        match self {
            Current::Original => Current::Buffer,
            Current::Buffer => Current::Original,
        }
    }
}

/// Sorts `v` in place, stable. The identity Map and the [`low_byte`] Radix are used, see
/// [`radix_sort_by_key`].
pub fn radix_sort<T>(v: &mut [T])
where
    T: Ordered + Clone,
{
    radix_sort_by_key(v, |value: &T| *value);
}

/// Sorts `v` in place by the byte digits of the key `map` returns, stable.
///
/// The passes run on a copy of `v` with a second copy as auxiliary storage, so two buffers of
/// `v.len()` elements are allocated. `v` is only written once the copy is sorted, if `map` panics
/// it is left as it was. [`radix_sort_with`] sorts in place with a single caller buffer.
pub fn radix_sort_by_key<T, K, M>(v: &mut [T], map: M)
where
    T: Clone,
    K: Ordered,
    M: Fn(&T) -> K,
{
    if v.len() < 2 {
        return;
    }

    let mut work = v.to_vec();
    let mut buffer = v.to_vec();
    sort_with_buffer(&mut work, &mut buffer, &map, &low_byte::<K::Unsigned>);
    v.swap_with_slice(&mut work);
}

/// Sorts `v` in place, stable, using `buffer` as the auxiliary storage.
///
/// `map` extracts the key, `radix` extracts the lowest digit of a projected key. The digit width
/// is the width of the `radix` result type and has to evenly divide the key width, otherwise the
/// call does not compile. `buffer` needs at least `v.len()` elements, its contents are
/// overwritten with an unspecified permutation of its former and `v`'s elements.
pub fn radix_sort_with<T, K, D, M, R>(
    v: &mut [T],
    buffer: &mut [T],
    map: M,
    radix: R,
) -> Result<(), SortError>
where
    K: Ordered,
    D: Digit,
    M: Fn(&T) -> K,
    R: Fn(K::Unsigned) -> D,
{
    check_capacity(v.len(), buffer.len())?;

    let len = v.len();
    sort_with_buffer(v, &mut buffer[..len], &map, &radix);

    Ok(())
}

/// `buffer` must be exactly as long as `v`.
pub(crate) fn sort_with_buffer<T, K, D, M, R>(v: &mut [T], buffer: &mut [T], map: &M, radix: &R)
where
    K: Ordered,
    D: Digit,
    M: Fn(&T) -> K,
    R: Fn(K::Unsigned) -> D,
{
    debug_assert_eq!(v.len(), buffer.len());

    let len = v.len();
    if len < 2 {
        return;
    }

    let traits = TraitsOf::<K::Unsigned, D>::TRAITS;
    let mut histograms = collect_all_digits(v, &traits, map, radix);

    let mut current = Current::Original;
    for (digit_index, histogram) in (0u32..).zip(histograms.iter_mut()) {
        if histogram.is_trivial(len) {
            trace!("digit {digit_index} is equal for all {len} elements, skipping pass");
            continue;
        }

        trace!("digit {digit_index}, scatter into {current:?} storage", current = current.flip());
        let digit = |value: &T| nth_digit(&traits, digit_index, map, radix, value);
        match current {
            Current::Original => dispose_move(v, buffer, digit, histogram.cursors_mut()),
            Current::Buffer => dispose_move(buffer, v, digit, histogram.cursors_mut()),
        }

        current = current.flip();
    }

    if current == Current::Buffer {
        v.swap_with_slice(buffer);
    }
}

/// Histograms of every digit, turned into offsets, in a single traversal of `v`.
fn collect_all_digits<T, K, D, M, R>(
    v: &[T],
    traits: &RadixTraits,
    map: &M,
    radix: &R,
) -> Vec<Histogram>
where
    K: Ordered,
    D: Digit,
    M: Fn(&T) -> K,
    R: Fn(K::Unsigned) -> D,
{
    let mut histograms: Vec<Histogram> = (0..traits.digit_count)
        .map(|_| Histogram::new(traits.bucket_count))
        .collect();

    for value in v {
        let key = map(value).to_ordered();
        for (digit_index, histogram) in (0u32..).zip(histograms.iter_mut()) {
            histogram.add(radix(key.shr(traits.shift(digit_index))).index());
        }
    }

    for histogram in histograms.iter_mut() {
        histogram.prefix_sum();
    }

    histograms
}
