//! Seeded input generators for tests and benchmarks.
//!
//! All generators draw from a single process-wide seed, see [`random_init_seed`], so a failing
//! run can be repeated by printing that seed.

use std::sync::atomic::{AtomicBool, Ordering};

use once_cell::sync::OnceCell;
use rand::distributions::{Distribution, Standard, Uniform};
use rand::prelude::*;
use zipf::ZipfDistribution;

pub fn random(size: usize) -> Vec<i32> {
    //     .
    // : . : :
    // :.:::.::

    random_of(size)
}

/// Uniformly random values of any type `rand` can generate, full bit width.
pub fn random_of<T>(size: usize) -> Vec<T>
where
    Standard: Distribution<T>,
{
    let mut rng = new_seed();

    (0..size).map(|_| rng.gen::<T>()).collect()
}

pub fn random_uniform<R>(size: usize, range: R) -> Vec<i32>
where
    R: Into<Uniform<i32>>,
{
    // :.:.:.::
    let mut rng = new_seed();
    let dist: Uniform<i32> = range.into();

    (0..size).map(|_| dist.sample(&mut rng)).collect()
}

/// Only `distinct` different values, which makes most digit passes trivial or near trivial.
pub fn random_distinct(size: usize, distinct: u32) -> Vec<i32> {
    random_uniform(size, 0..(distinct.max(1) as i32))
}

pub fn random_zipf(size: usize, exponent: f64) -> Vec<i32> {
    // https://en.wikipedia.org/wiki/Zipf's_law
    if size == 0 {
        return Vec::new();
    }

    let mut rng = new_seed();
    match ZipfDistribution::new(size, exponent) {
        Ok(dist) => (0..size).map(|_| dist.sample(&mut rng) as i32).collect(),
        Err(()) => random(size),
    }
}

/// Random floats mixed with the values at the edges of the float order.
pub fn random_f64(size: usize) -> Vec<f64> {
    const SPECIAL: [f64; 8] = [
        f64::NEG_INFINITY,
        f64::MIN,
        -0.0,
        0.0,
        f64::MIN_POSITIVE,
        f64::EPSILON,
        f64::MAX,
        f64::INFINITY,
    ];

    let mut rng = new_seed();
    let special = Uniform::new(0, SPECIAL.len());
    let magnitude = Uniform::new(-1.0e6, 1.0e6);

    (0..size)
        .map(|_| {
            if rng.gen_ratio(1, 8) {
                SPECIAL[special.sample(&mut rng)]
            } else {
                magnitude.sample(&mut rng)
            }
        })
        .collect()
}

pub fn all_equal(size: usize) -> Vec<i32> {
    // ......
    // ::::::

    vec![66; size]
}

pub fn ascending(size: usize) -> Vec<i32> {
    //     .:
    //   .:::
    // .:::::

    (0..size as i32).collect()
}

pub fn descending(size: usize) -> Vec<i32> {
    // :.
    // :::.
    // :::::.

    (0..size as i32).rev().collect()
}

pub fn saw_mixed(size: usize, saw_count: usize) -> Vec<i32> {
    // :.  :.    .::.    .:
    // :::.:::..::::::..:::

    if size == 0 {
        return Vec::new();
    }

    let mut vals = random(size);
    let chunk_size = (size / saw_count.max(1)).max(1);
    let directions = random_uniform(size / chunk_size + 1, 0..=1);

    for (chunk, direction) in vals.chunks_mut(chunk_size).zip(directions) {
        if direction == 0 {
            chunk.sort_unstable();
        } else {
            chunk.sort_unstable_by_key(|&e| std::cmp::Reverse(e));
        }
    }

    vals
}

pub fn pipe_organ(size: usize) -> Vec<i32> {
    //   .:.
    // .:::::.

    let mut vals = random(size);
    let (first_half, second_half) = vals.split_at_mut(size / 2);
    first_half.sort_unstable();
    second_half.sort_unstable_by_key(|&e| std::cmp::Reverse(e));

    vals
}

/// Pairs every key with its position, the second field tells whether equal keys kept their order.
pub fn tagged<K>(keys: Vec<K>) -> Vec<(K, usize)> {
    keys.into_iter().zip(0..).collect()
}

static USE_FIXED_SEED: AtomicBool = AtomicBool::new(true);

pub fn disable_fixed_seed() {
    USE_FIXED_SEED.store(false, Ordering::Release);
}

/// The seed of this process, fixed on first use unless [`disable_fixed_seed`] was called.
pub fn random_init_seed() -> u64 {
    if USE_FIXED_SEED.load(Ordering::Acquire) {
        static SEED: OnceCell<u64> = OnceCell::new();
        *SEED.get_or_init(|| thread_rng().gen())
    } else {
        thread_rng().gen()
    }
}

fn new_seed() -> StdRng {
    StdRng::seed_from_u64(random_init_seed())
}
