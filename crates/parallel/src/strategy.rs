//! Parallel processing strategies

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use thiserror::Error;

/// Errors raised while setting up a batch
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Failed to build thread pool with {threads} thread(s): {reason}")]
    ThreadPool { threads: usize, reason: String },
}

/// Processing mode for batches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingMode {
    /// Single-threaded processing
    Sequential,
    /// Parallel processing using all available cores
    #[default]
    Parallel,
    /// Parallel with specified number of threads
    ParallelWith(usize),
}

impl ProcessingMode {
    /// Mode for an optional `--threads` value: `Some(1)` is sequential,
    /// `None` uses the global pool.
    pub fn from_threads(threads: Option<usize>) -> Self {
        match threads {
            None | Some(0) => ProcessingMode::Parallel,
            Some(1) => ProcessingMode::Sequential,
            Some(n) => ProcessingMode::ParallelWith(n),
        }
    }

    /// Number of workers a batch in this mode runs on
    pub fn worker_count(&self) -> usize {
        match self {
            ProcessingMode::Sequential => 1,
            ProcessingMode::Parallel => num_threads(),
            ProcessingMode::ParallelWith(threads) => {
                if cfg!(feature = "parallel") {
                    (*threads).max(1)
                } else {
                    1
                }
            }
        }
    }
}

/// Strategy for executing a batch of jobs
pub trait ParallelStrategy {
    /// Map a function over items and collect results in input order
    fn par_map<T, U, F>(&self, items: &[T], f: F) -> Result<Vec<U>, BatchError>
    where
        T: Sync,
        U: Send,
        F: Fn(&T) -> U + Sync + Send;
}

impl ParallelStrategy for ProcessingMode {
    #[cfg(feature = "parallel")]
    fn par_map<T, U, F>(&self, items: &[T], f: F) -> Result<Vec<U>, BatchError>
    where
        T: Sync,
        U: Send,
        F: Fn(&T) -> U + Sync + Send,
    {
        match self {
            ProcessingMode::Sequential => Ok(items.iter().map(f).collect()),
            ProcessingMode::Parallel => Ok(items.par_iter().map(f).collect()),
            ProcessingMode::ParallelWith(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(*threads)
                    .build()
                    .map_err(|e| BatchError::ThreadPool {
                        threads: *threads,
                        reason: e.to_string(),
                    })?;
                Ok(pool.install(|| items.par_iter().map(f).collect()))
            }
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn par_map<T, U, F>(&self, items: &[T], f: F) -> Result<Vec<U>, BatchError>
    where
        T: Sync,
        U: Send,
        F: Fn(&T) -> U + Sync + Send,
    {
        Ok(items.iter().map(f).collect())
    }
}

/// Get the number of threads a parallel batch will use
pub fn num_threads() -> usize {
    #[cfg(feature = "parallel")]
    {
        rayon::current_num_threads()
    }
    #[cfg(not(feature = "parallel"))]
    {
        1
    }
}
