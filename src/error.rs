use thiserror::Error;

/// Errors returned by the fallible sort entry points.
#[derive(Debug, Error)]
pub enum SortError {
    /// The output or auxiliary buffer cannot hold the whole input.
    #[error("buffer holds {actual} elements but {required} are required")]
    BufferTooSmall { required: usize, actual: usize },
    /// The worker pool for a parallel sort could not be created.
    #[error("failed to build the worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Checks that `buffer_len` elements are enough to hold `required` elements.
#[inline]
pub(crate) fn check_capacity(required: usize, buffer_len: usize) -> Result<(), SortError> {
    if buffer_len < required {
        return Err(SortError::BufferTooSmall {
            required,
            actual: buffer_len,
        });
    }

    Ok(())
}
