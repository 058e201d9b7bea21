//! LSD radix sort with every counting pass split across a worker pool.

use log::{debug, trace};
use rayon::ThreadPool;

use crate::error::{check_capacity, SortError};
use crate::key::Ordered;
use crate::parallel::counting::{count_chunks, scatter_move};
use crate::parallel::dispatch::{self, build_pool};
use crate::parallel::shape::{Parallel, Shape};
use crate::radix_traits::{low_byte, nth_digit, Digit, TraitsOf};
use crate::sequential;
use crate::sequential::radix::Current;

/// Sorts `v` on `pool` with the chunks of `shape`, using `buffer` as the auxiliary storage.
///
/// `shape` should be planned for `v.len()`; a shape with a single chunk, or none, sorts on the
/// calling thread. Whatever the number of digits, the result ends up in `v`.
pub fn radix_sort_in<T, K, D, M, R>(
    pool: &ThreadPool,
    shape: &Shape,
    v: &mut [T],
    buffer: &mut [T],
    map: &M,
    radix: &R,
) -> Result<(), SortError>
where
    T: Send + Sync,
    K: Ordered,
    D: Digit,
    M: Fn(&T) -> K + Sync,
    R: Fn(K::Unsigned) -> D + Sync,
{
    check_capacity(v.len(), buffer.len())?;

    let len = v.len();
    let buffer = &mut buffer[..len];
    if len < 2 {
        return Ok(());
    }

    let chunk_size = shape.chunk_size;
    if chunk_size == 0 || chunk_size >= len {
        sequential::radix::sort_with_buffer(v, buffer, map, radix);
        return Ok(());
    }

    let traits = TraitsOf::<K::Unsigned, D>::TRAITS;
    debug!(
        "radix sort of {len} elements, {} digits of {} bits, chunks of {chunk_size}",
        traits.digit_count, traits.digit_width
    );

    let mut current = Current::Original;
    for digit_index in 0..traits.digit_count {
        let digit = |value: &T| nth_digit(&traits, digit_index, map, radix, value);

        let (src, dst) = match current {
            Current::Original => (&mut *v, &mut *buffer),
            Current::Buffer => (&mut *buffer, &mut *v),
        };

        let mut table = count_chunks(pool, chunk_size, traits.bucket_count, src, &digit);
        if table.is_trivial(len) {
            trace!("digit {digit_index} is equal for all {len} elements, skipping pass");
            continue;
        }

        trace!("digit {digit_index}, {} chunks", table.chunk_count());
        table.cross_prefix_sum();
        scatter_move(pool, chunk_size, table, src, dst, &digit);
        current = current.flip();
    }

    if current == Current::Buffer {
        trace!("copying the result back from the buffer");
        dispatch::swap_chunks(pool, chunk_size, v, buffer);
    }

    Ok(())
}

/// Parallel version of [`sequential::radix_sort_with`].
///
/// Builds a pool of the planned number of threads for this call. Inputs too small for more than
/// one chunk are sorted on the calling thread.
pub fn radix_sort_with<T, K, D, M, R>(
    par: &Parallel,
    v: &mut [T],
    buffer: &mut [T],
    map: M,
    radix: R,
) -> Result<(), SortError>
where
    T: Send + Sync,
    K: Ordered,
    D: Digit,
    M: Fn(&T) -> K + Sync,
    R: Fn(K::Unsigned) -> D + Sync,
{
    check_capacity(v.len(), buffer.len())?;

    let shape = par.shape(v.len());
    if !shape.is_parallel() {
        debug!("radix sort of {} elements runs sequentially", v.len());
        return sequential::radix_sort_with(v, buffer, map, radix);
    }

    let pool = build_pool(shape.thread_count)?;
    radix_sort_in(&pool, &shape, v, buffer, &map, &radix)
}

/// Parallel version of [`sequential::radix_sort`].
pub fn radix_sort<T>(par: &Parallel, v: &mut [T]) -> Result<(), SortError>
where
    T: Ordered + Send + Sync,
{
    radix_sort_by_key(par, v, |value: &T| *value)
}

/// Parallel version of [`sequential::radix_sort_by_key`]. Fails only if the worker pool cannot be
/// built.
///
/// As in the sequential sort the passes run on a copy of `v`, which is only written once the copy
/// is sorted.
pub fn radix_sort_by_key<T, K, M>(par: &Parallel, v: &mut [T], map: M) -> Result<(), SortError>
where
    T: Clone + Send + Sync,
    K: Ordered,
    M: Fn(&T) -> K + Sync,
{
    let shape = par.shape(v.len());
    if !shape.is_parallel() {
        debug!("radix sort of {} elements runs sequentially", v.len());
        sequential::radix_sort_by_key(v, map);
        return Ok(());
    }

    let pool = build_pool(shape.thread_count)?;
    let mut work = v.to_vec();
    let mut buffer = v.to_vec();
    radix_sort_in(&pool, &shape, &mut work, &mut buffer, &map, &low_byte::<K::Unsigned>)?;
    dispatch::swap_chunks(&pool, shape.chunk_size, v, &mut work);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radix_traits::Bits;

    /// Splits inputs of any length.
    fn par(thread_count: usize) -> Parallel {
        Parallel::new(thread_count).with_min_chunk_len(1)
    }

    fn keyed(len: usize) -> Vec<(u32, usize)> {
        (0..len)
            .map(|i| ((i as u32).wrapping_mul(2_654_435_761) % 1000, i))
            .collect()
    }

    #[test]
    fn matches_sequential() {
        let src = keyed(1000);
        let mut expected = src.clone();
        sequential::radix_sort_by_key(&mut expected, |x| x.0);

        for thread_count in [2, 3, 8] {
            let mut v = src.clone();
            radix_sort_by_key(&par(thread_count), &mut v, |x| x.0).unwrap();
            assert_eq!(v, expected, "{thread_count} threads");
        }
    }

    #[test]
    fn caller_pool() {
        let pool = build_pool(2).unwrap();
        let mut v: Vec<i32> = vec![5, -1, i32::MIN, 0, i32::MAX, -1, 42, 7, 3];
        let mut buffer = vec![0; v.len()];

        for shape in [Shape::plan(9, 4), Shape::plan(9, 9), Shape::plan(9, 1)] {
            let mut w = v.clone();
            radix_sort_in(&pool, &shape, &mut w, &mut buffer, &|x: &i32| *x, &low_byte).unwrap();
            assert_eq!(w, [i32::MIN, -1, -1, 0, 3, 5, 7, 42, i32::MAX]);
        }

        v.clear();
        radix_sort_in(&pool, &Shape::plan(0, 4), &mut v, &mut buffer, &|x: &i32| *x, &low_byte)
            .unwrap();
        assert!(v.is_empty());
    }

    #[test]
    fn odd_digit_count() {
        // A single byte digit, the only pass leaves the data in the buffer.
        let src: Vec<u8> = (0..500u32).map(|i| (i.wrapping_mul(40_503) >> 3) as u8).collect();
        let mut expected = src.clone();
        expected.sort();

        let mut v = src;
        radix_sort(&par(4), &mut v).unwrap();
        assert_eq!(v, expected);

        // Eight one bit digits of which only the low three vary.
        let mut v: Vec<u8> = (0..64u16).map(|i| (i * 5 % 8) as u8).collect();
        let mut expected = v.clone();
        expected.sort();
        let mut buffer = vec![0; v.len()];
        radix_sort_with(&par(4), &mut v, &mut buffer, |x| *x, |k: u8| k & 1 == 1).unwrap();
        assert_eq!(v, expected);
    }

    #[test]
    fn wide_digits() {
        let src: Vec<u64> = (0..300u64)
            .map(|i| i.wrapping_mul(0x9e37_79b9_7f4a_7c15))
            .collect();
        let mut expected = src.clone();
        expected.sort();

        let mut v = src;
        let mut buffer = vec![0; v.len()];
        radix_sort_with(&par(3), &mut v, &mut buffer, |x| *x, |k: u64| k as u16).unwrap();
        assert_eq!(v, expected);

        let mut w: Vec<u32> = vec![3, 1, 2, 0, 3, 1];
        let mut buffer = vec![0; w.len()];
        radix_sort_with(&par(2), &mut w, &mut buffer, |x| *x, |k: u32| Bits::<16>::new(k)).unwrap();
        assert_eq!(w, [0, 1, 1, 2, 3, 3]);
    }

    #[test]
    fn by_key_map_panic_keeps_input() {
        let original = keyed(300);
        let mut v = original.clone();
        let calls = std::sync::atomic::AtomicUsize::new(0);

        // The first digit is counted with 300 calls, the panic hits its scatter.
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            radix_sort_by_key(&par(3), &mut v, |x| {
                if calls.fetch_add(1, std::sync::atomic::Ordering::Relaxed) == 450 {
                    panic!("key function failed");
                }
                x.0
            })
        }));

        assert!(result.is_err());
        assert_eq!(v, original);
    }

    #[test]
    fn buffer_too_small() {
        let mut v = [3u32, 2, 1];
        let mut buffer = [0u32; 2];

        assert!(matches!(
            radix_sort_with(&par(2), &mut v, &mut buffer, |x| *x, low_byte::<u32>),
            Err(SortError::BufferTooSmall {
                required: 3,
                actual: 2
            })
        ));
    }
}
