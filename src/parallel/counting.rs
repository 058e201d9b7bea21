//! Counting sort over chunks of the input.
//!
//! A pass runs in three phases. Every task counts the digits of its chunk into its own row of a
//! [`HistogramTable`]. A single thread then turns the table into offsets ordered by bucket first
//! and chunk second, so that the elements of bucket `b` from chunk `c` go right after those of
//! bucket `b` from the chunks before `c`. Those offsets cut the output into one region per chunk
//! and bucket, and every task scatters its chunk, in order, into its own regions.
//!
//! The result is the same as the one of the sequential pass. Within a bucket elements keep their
//! order, first across chunks through the offset order and then inside a chunk through the
//! scatter order.
//!
//! Besides the output buffer a pass allocates the table, `chunk_count * bucket_count` counters,
//! and then the regions carved from it, one slice handle of two words per chunk and bucket. The
//! table is dropped once the regions are carved. A region is its own write cursor, every scatter
//! shrinks it from the front, so the tasks allocate nothing.

use std::iter;
use std::mem;

use log::debug;
use rayon::ThreadPool;

use crate::error::{check_capacity, SortError};
use crate::key::Ordered;
use crate::parallel::dispatch::{self, build_pool};
use crate::parallel::shape::{Parallel, Shape};
use crate::radix_traits::Digit;
use crate::sequential;
use crate::sequential::counting::{bucket_count, key_digit};

/// Digit counts of every chunk, one row of `bucket_count` counters per chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistogramTable {
    bucket_count: usize,
    counters: Vec<usize>,
}

impl HistogramTable {
    pub fn new(chunk_count: usize, bucket_count: usize) -> Self {
        assert!(bucket_count > 0, "bucket count must be positive");

        Self {
            bucket_count,
            counters: vec![0; chunk_count * bucket_count],
        }
    }

    pub fn chunk_count(&self) -> usize {
        self.counters.len() / self.bucket_count
    }

    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [usize]> + '_ {
        self.counters.chunks_exact_mut(self.bucket_count)
    }

    /// Whether one bucket holds all `len` counted elements. Only meaningful before
    /// [`HistogramTable::cross_prefix_sum`].
    pub fn is_trivial(&self, len: usize) -> bool {
        (0..self.bucket_count).any(|bucket| {
            let total: usize = self
                .counters
                .iter()
                .skip(bucket)
                .step_by(self.bucket_count)
                .sum();
            total == len
        })
    }

    /// Turns the counts into exclusive offsets into the output, ordered by bucket, then chunk.
    pub fn cross_prefix_sum(&mut self) {
        let chunk_count = self.chunk_count();
        let mut sum = 0;

        for bucket in 0..self.bucket_count {
            for chunk in 0..chunk_count {
                let counter = &mut self.counters[chunk * self.bucket_count + bucket];
                let count = *counter;
                *counter = sum;
                sum += count;
            }
        }
    }

    #[inline]
    pub fn offset(&self, chunk: usize, bucket: usize) -> usize {
        self.counters[chunk * self.bucket_count + bucket]
    }

    /// All offsets in output order.
    fn offsets_in_order(&self) -> impl Iterator<Item = usize> + '_ {
        let chunk_count = self.chunk_count();
        (0..self.bucket_count)
            .flat_map(move |bucket| (0..chunk_count).map(move |chunk| self.offset(chunk, bucket)))
    }
}

/// Splits `dst` into the regions of a [`HistogramTable`] after
/// [`HistogramTable::cross_prefix_sum`]. Returns one vector per chunk, indexed by bucket.
///
/// `dst` must be exactly as long as the number of counted elements.
pub fn carve_regions<'d, T>(table: &HistogramTable, dst: &'d mut [T]) -> Vec<Vec<&'d mut [T]>> {
    let chunk_count = table.chunk_count();
    let mut regions: Vec<Vec<&'d mut [T]>> = (0..chunk_count)
        .map(|_| Vec::with_capacity(table.bucket_count()))
        .collect();

    let ends = table
        .offsets_in_order()
        .skip(1)
        .chain(iter::once(dst.len()));
    let owners = (0..table.bucket_count()).flat_map(|_| 0..chunk_count);

    let mut rest = dst;
    let mut start = 0;
    for (chunk, end) in owners.zip(ends) {
        let (region, tail) = mem::take(&mut rest).split_at_mut(end - start);
        regions[chunk].push(region);
        rest = tail;
        start = end;
    }

    debug_assert!(rest.is_empty());

    regions
}

/// Phase one, counts the digits of every chunk of `src`.
pub(crate) fn count_chunks<T, F>(
    pool: &ThreadPool,
    chunk_size: usize,
    bucket_count: usize,
    src: &[T],
    digit: &F,
) -> HistogramTable
where
    T: Sync,
    F: Fn(&T) -> usize + Sync,
{
    let mut table = HistogramTable::new(src.len().div_ceil(chunk_size), bucket_count);

    dispatch::run(pool, chunk_size, src, table.rows_mut(), |_, chunk, row| {
        for value in chunk {
            row[digit(value)] += 1;
        }
    });

    table
}

/// First slot of `region`, which afterwards starts one element later.
#[inline(always)]
fn next_slot<'d, T>(region: &mut &'d mut [T]) -> &'d mut T {
    let (slot, rest) = mem::take(region).split_at_mut(1);
    *region = rest;
    &mut slot[0]
}

/// Phase three, moves every element of `src` into its region of `dst`. The displaced elements of
/// `dst` end up in `src`.
pub(crate) fn scatter_move<T, F>(
    pool: &ThreadPool,
    chunk_size: usize,
    table: HistogramTable,
    src: &mut [T],
    dst: &mut [T],
    digit: &F,
) where
    T: Send,
    F: Fn(&T) -> usize + Sync,
{
    let regions = carve_regions(&table, dst);
    drop(table);

    dispatch::run_mut(pool, chunk_size, src, regions, |_, chunk, mut regions| {
        for value in chunk.iter_mut() {
            let bucket = digit(value);
            mem::swap(value, next_slot(&mut regions[bucket]));
        }
    });
}

/// Like [`scatter_move`], leaving `src` untouched.
pub(crate) fn scatter_copy<T, F>(
    pool: &ThreadPool,
    chunk_size: usize,
    table: HistogramTable,
    src: &[T],
    dst: &mut [T],
    digit: &F,
) where
    T: Clone + Send + Sync,
    F: Fn(&T) -> usize + Sync,
{
    let regions = carve_regions(&table, dst);
    drop(table);

    dispatch::run(pool, chunk_size, src, regions, |_, chunk, mut regions| {
        for value in chunk {
            next_slot(&mut regions[digit(value)]).clone_from(value);
        }
    });
}

/// One stable counting sort pass of `src` into `dst` with the chunks of `shape`. `dst` must be
/// exactly as long as `src`.
pub fn counting_pass<T, F>(
    pool: &ThreadPool,
    shape: &Shape,
    bucket_count: usize,
    src: &mut [T],
    dst: &mut [T],
    digit: F,
) where
    T: Send + Sync,
    F: Fn(&T) -> usize + Sync,
{
    assert_eq!(src.len(), dst.len());
    if src.is_empty() {
        return;
    }

    let mut table = count_chunks(pool, shape.chunk_size, bucket_count, src, &digit);
    table.cross_prefix_sum();
    scatter_move(pool, shape.chunk_size, table, src, dst, &digit);
}

/// Parallel version of [`sequential::counting_sort_copy`].
pub fn counting_sort_copy<T, K, M>(
    par: &Parallel,
    src: &[T],
    dst: &mut [T],
    map: M,
) -> Result<usize, SortError>
where
    T: Clone + Send + Sync,
    K: Ordered,
    K::Unsigned: Digit,
    M: Fn(&T) -> K + Sync,
{
    check_capacity(src.len(), dst.len())?;

    let shape = par.shape(src.len());
    if !shape.is_parallel() {
        debug!("counting sort of {} elements runs sequentially", src.len());
        return sequential::counting_sort_copy(src, dst, map);
    }

    let pool = build_pool(shape.thread_count)?;
    debug!("counting sort of {} elements with {shape:?}", src.len());

    let digit = key_digit::<T, K, M>(&map);
    let mut table = count_chunks(&pool, shape.chunk_size, bucket_count::<K>(), src, &digit);
    table.cross_prefix_sum();
    scatter_copy(&pool, shape.chunk_size, table, src, &mut dst[..src.len()], &digit);

    Ok(src.len())
}

/// Parallel version of [`sequential::counting_sort_move`].
pub fn counting_sort_move<T, K, M>(
    par: &Parallel,
    src: &mut [T],
    dst: &mut [T],
    map: M,
) -> Result<usize, SortError>
where
    T: Send + Sync,
    K: Ordered,
    K::Unsigned: Digit,
    M: Fn(&T) -> K + Sync,
{
    check_capacity(src.len(), dst.len())?;

    let len = src.len();
    let shape = par.shape(len);
    if !shape.is_parallel() {
        debug!("counting sort of {len} elements runs sequentially");
        return sequential::counting_sort_move(src, dst, map);
    }

    let pool = build_pool(shape.thread_count)?;
    debug!("counting sort of {len} elements with {shape:?}");

    let digit = key_digit::<T, K, M>(&map);
    counting_pass(&pool, &shape, bucket_count::<K>(), src, &mut dst[..len], digit);

    Ok(len)
}

/// Parallel version of [`sequential::counting_sort`]. Fails only if the worker pool cannot be
/// built.
///
/// Like the sequential sort, `v` is only written once the buffer holds the sorted sequence and is
/// left as it was if `map` panics.
pub fn counting_sort<T, K, M>(par: &Parallel, v: &mut [T], map: M) -> Result<(), SortError>
where
    T: Clone + Send + Sync,
    K: Ordered,
    K::Unsigned: Digit,
    M: Fn(&T) -> K + Sync,
{
    let shape = par.shape(v.len());
    if !shape.is_parallel() {
        sequential::counting_sort(v, map);
        return Ok(());
    }

    let pool = build_pool(shape.thread_count)?;
    debug!("counting sort of {} elements with {shape:?}", v.len());

    let mut buffer = v.to_vec();
    let digit = key_digit::<T, K, M>(&map);
    let mut table = count_chunks(&pool, shape.chunk_size, bucket_count::<K>(), v, &digit);
    table.cross_prefix_sum();
    scatter_copy(&pool, shape.chunk_size, table, v, &mut buffer, &digit);

    dispatch::swap_chunks(&pool, shape.chunk_size, v, &mut buffer);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Splits inputs of any length.
    fn par(thread_count: usize) -> Parallel {
        Parallel::new(thread_count).with_min_chunk_len(1)
    }

    fn table(rows: &[[usize; 3]]) -> HistogramTable {
        let mut table = HistogramTable::new(rows.len(), 3);
        for (row, counts) in table.rows_mut().zip(rows) {
            row.copy_from_slice(counts);
        }
        table
    }

    #[test]
    fn cross_prefix_sum() {
        let mut table = table(&[[2, 0, 1], [1, 3, 0]]);
        assert_eq!(table.chunk_count(), 2);
        assert!(!table.is_trivial(7));

        table.cross_prefix_sum();

        // Bucket 0: chunk 0 at 0, chunk 1 at 2. Bucket 1: 3, 3. Bucket 2: 6, 7.
        assert_eq!(table.offset(0, 0), 0);
        assert_eq!(table.offset(1, 0), 2);
        assert_eq!(table.offset(0, 1), 3);
        assert_eq!(table.offset(1, 1), 3);
        assert_eq!(table.offset(0, 2), 6);
        assert_eq!(table.offset(1, 2), 7);
    }

    #[test]
    fn trivial_table() {
        let table = table(&[[0, 2, 0], [0, 5, 0]]);
        assert!(table.is_trivial(7));
    }

    #[test]
    fn regions() {
        let mut table = table(&[[2, 0, 1], [1, 3, 0]]);
        table.cross_prefix_sum();

        let mut dst: Vec<u32> = (0..7).collect();
        let regions: Vec<Vec<Vec<u32>>> = carve_regions(&table, &mut dst)
            .into_iter()
            .map(|row| row.into_iter().map(|region| region.to_vec()).collect())
            .collect();

        assert_eq!(
            regions,
            [
                vec![vec![0, 1], vec![], vec![6]],
                vec![vec![2], vec![3, 4, 5], vec![]]
            ]
        );
    }

    #[test]
    fn pass_matches_sequential() {
        let pool = build_pool(3).unwrap();
        let src: Vec<(u8, usize)> = (0..100).map(|i| ((i * 7 % 5) as u8, i)).collect();

        let mut expected = src.clone();
        expected.sort_by_key(|x| x.0);

        for requested in [2, 3, 7, 100] {
            let shape = Shape::plan(src.len(), requested);
            let mut v = src.clone();
            let mut dst = vec![(0, 0); v.len()];
            counting_pass(&pool, &shape, 256, &mut v, &mut dst, |x| x.0 as usize);

            assert_eq!(dst, expected, "{shape:?}");
        }
    }

    #[test]
    fn sixteen_bit_buckets() {
        // 65536 regions per chunk, most of them empty.
        let pool = build_pool(4).unwrap();
        let src: Vec<(u16, usize)> = (0..2000)
            .map(|i| (((i as u32).wrapping_mul(2_654_435_761) >> 16) as u16 % 300 * 211, i))
            .collect();

        let mut expected = src.clone();
        expected.sort_by_key(|x| x.0);

        let shape = Shape::plan(src.len(), 4);
        let mut v = src.clone();
        let mut dst = vec![(0, 0); v.len()];
        counting_pass(&pool, &shape, 1 << 16, &mut v, &mut dst, |x| x.0 as usize);
        assert_eq!(dst, expected);

        let digit = |x: &(u16, usize)| x.0 as usize;
        let mut table = count_chunks(&pool, shape.chunk_size, 1 << 16, &src, &digit);
        table.cross_prefix_sum();
        let mut dst = vec![(0, 0); src.len()];
        scatter_copy(&pool, shape.chunk_size, table, &src, &mut dst, &digit);
        assert_eq!(dst, expected);
    }

    #[test]
    fn map_panic_keeps_input() {
        let par = par(4);
        let original: Vec<(i8, usize)> = (0..200).map(|i| ((i * 13 % 29) as i8 - 14, i)).collect();
        let mut v = original.clone();
        let calls = std::sync::atomic::AtomicUsize::new(0);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            counting_sort(&par, &mut v, |x| {
                // 200 calls count the chunks, the rest scatter them.
                if calls.fetch_add(1, std::sync::atomic::Ordering::Relaxed) == 300 {
                    panic!("key function failed");
                }
                x.0
            })
        }));

        assert!(result.is_err());
        assert_eq!(v, original);
    }

    #[test]
    fn copy_and_move() {
        let par = par(4);
        let src: Vec<i16> = vec![300, -2, 7, i16::MIN, 7, 0, i16::MAX, -300];

        let mut dst = vec![0; 10];
        assert_eq!(counting_sort_copy(&par, &src, &mut dst, |x| *x).unwrap(), 8);
        assert_eq!(&dst[..8], &[i16::MIN, -300, -2, 0, 7, 7, 300, i16::MAX]);
        assert_eq!(&dst[8..], &[0, 0]);

        let mut moved = src.clone();
        let mut dst = vec![0; 8];
        assert_eq!(counting_sort_move(&par, &mut moved, &mut dst, |x| *x).unwrap(), 8);
        assert_eq!(dst, [i16::MIN, -300, -2, 0, 7, 7, 300, i16::MAX]);

        let mut v = src;
        counting_sort(&par, &mut v, |x| *x).unwrap();
        assert_eq!(v, dst);
    }

    #[test]
    fn small_output() {
        let src = [1u8, 2, 3];
        let mut dst = [0u8; 2];

        assert!(matches!(
            counting_sort_copy(&par(2), &src, &mut dst, |x| *x),
            Err(SortError::BufferTooSmall {
                required: 3,
                actual: 2
            })
        ));
    }
}
