use std::num::NonZeroUsize;
use std::thread;

/// Default for [`Parallel::min_chunk_len`]. Inputs shorter than twice this length are sorted on
/// the calling thread.
pub const DEFAULT_MIN_CHUNK_LEN: usize = 4096;

/// Execution policy of a parallel sort.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Parallel {
    /// Requested number of worker threads.
    pub thread_count: usize,
    /// No chunk is planned shorter than this, which lowers the thread count for small inputs.
    pub min_chunk_len: usize,
}

impl Parallel {
    /// `thread_count` workers with chunks of at least [`DEFAULT_MIN_CHUNK_LEN`] elements.
    pub fn new(thread_count: usize) -> Self {
        Self {
            thread_count,
            min_chunk_len: DEFAULT_MIN_CHUNK_LEN,
        }
    }

    /// One thread per available core, a single thread if that number is unknown.
    pub fn available() -> Self {
        let thread_count = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);

        Self::new(thread_count)
    }

    /// Lower bound of the chunk length, 0 is treated as 1.
    pub fn with_min_chunk_len(mut self, min_chunk_len: usize) -> Self {
        self.min_chunk_len = min_chunk_len;
        self
    }

    /// Shape of a sort over `range_size` elements under this policy.
    pub fn shape(&self, range_size: usize) -> Shape {
        let max_chunks = (range_size / self.min_chunk_len.max(1)).max(1);
        Shape::plan(range_size, self.thread_count.min(max_chunks))
    }
}

impl Default for Parallel {
    fn default() -> Self {
        Self::available()
    }
}

/// How a range is cut into chunks, one task per chunk.
///
/// Every chunk holds `chunk_size` elements except the last one, which holds the rest. There are
/// exactly `thread_count` chunks.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Shape {
    pub thread_count: usize,
    pub chunk_size: usize,
}

impl Shape {
    /// Cuts `range_size` elements into at most `requested_threads` chunks of equal size.
    ///
    /// Rounding the chunk size up can leave fewer chunks than requested, 9 elements on 4 threads
    /// become 3 chunks of 3. An empty range yields the empty shape, a request of 0 threads is
    /// treated as 1.
    pub fn plan(range_size: usize, requested_threads: usize) -> Self {
        if range_size == 0 {
            return Self {
                thread_count: 0,
                chunk_size: 0,
            };
        }

        let chunk_size = range_size.div_ceil(requested_threads.max(1));
        let thread_count = range_size.div_ceil(chunk_size);

        Self {
            thread_count,
            chunk_size,
        }
    }

    /// A single chunk is handled by the sequential sorts.
    #[inline]
    pub fn is_parallel(&self) -> bool {
        self.thread_count > 1
    }
}
