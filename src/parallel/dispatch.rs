//! Runs one task per chunk of a slice on a worker pool.
//!
//! Each chunk is paired with an owned context, for example its row of a histogram table or its
//! set of output regions. Tasks never share mutable state, everything a task writes arrives
//! through its chunk or its context. [`run`] and [`run_mut`] return only after every task
//! finished, which makes each call a barrier between the phases of a sort.

use log::trace;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::SortError;

/// Builds a pool of `thread_count` workers.
pub(crate) fn build_pool(thread_count: usize) -> Result<ThreadPool, SortError> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .thread_name(|index| format!("lsd-sort-{index}"))
        .build()?;

    Ok(pool)
}

/// Calls `f(ordinal, chunk, context)` for every `chunk_size` chunk of `data` on `pool`, and returns
/// the number of chunks.
///
/// A panic in any task is resumed on the calling thread once all tasks are done.
pub fn run<T, C, F>(
    pool: &ThreadPool,
    chunk_size: usize,
    data: &[T],
    contexts: impl IntoIterator<Item = C>,
    f: F,
) -> usize
where
    T: Sync,
    C: Send,
    F: Fn(usize, &[T], C) + Sync,
{
    assert!(chunk_size > 0, "chunk size must be positive");

    let tasks = pair_with_contexts(data.chunks(chunk_size), contexts);
    spawn_all(pool, tasks, &f)
}

/// Same as [`run`], with mutable chunks.
pub fn run_mut<T, C, F>(
    pool: &ThreadPool,
    chunk_size: usize,
    data: &mut [T],
    contexts: impl IntoIterator<Item = C>,
    f: F,
) -> usize
where
    T: Send,
    C: Send,
    F: Fn(usize, &mut [T], C) + Sync,
{
    assert!(chunk_size > 0, "chunk size must be positive");

    let tasks = pair_with_contexts(data.chunks_mut(chunk_size), contexts);
    spawn_all(pool, tasks, &f)
}

/// Swaps the contents of `dst` and `src` in parallel, one task per `chunk_size` chunk. Both must
/// have the same length.
pub(crate) fn swap_chunks<T: Send>(
    pool: &ThreadPool,
    chunk_size: usize,
    dst: &mut [T],
    src: &mut [T],
) {
    assert_eq!(dst.len(), src.len());

    run_mut(pool, chunk_size, dst, src.chunks_mut(chunk_size.max(1)), |_, chunk, other| {
        chunk.swap_with_slice(other)
    });
}

fn pair_with_contexts<S, C>(
    chunks: impl Iterator<Item = S>,
    contexts: impl IntoIterator<Item = C>,
) -> Vec<(usize, S, C)> {
    let mut contexts = contexts.into_iter();

    chunks
        .enumerate()
        .map(|(ordinal, chunk)| match contexts.next() {
            Some(context) => (ordinal, chunk, context),
            None => panic!("no context left for chunk {ordinal}"),
        })
        .collect()
}

fn spawn_all<S, C, F>(pool: &ThreadPool, tasks: Vec<(usize, S, C)>, f: &F) -> usize
where
    S: Send,
    C: Send,
    F: Fn(usize, S, C) + Sync,
{
    let chunk_count = tasks.len();
    trace!("dispatching {chunk_count} tasks");

    pool.scope(|scope| {
        for (ordinal, chunk, context) in tasks {
            scope.spawn(move |_| f(ordinal, chunk, context));
        }
    });

    chunk_count
}
