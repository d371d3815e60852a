//! Fallible batches over independent items

use crate::strategy::{BatchError, ParallelStrategy, ProcessingMode};

/// Outcome of a batch, split by item.
///
/// Both lists keep input order and carry the index of the item they
/// belong to.
#[derive(Debug)]
pub struct BatchReport<R, E> {
    pub succeeded: Vec<(usize, R)>,
    pub failed: Vec<(usize, E)>,
}

impl<R, E> BatchReport<R, E> {
    /// Number of items processed
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Run a fallible job over every item and collect a [`BatchReport`].
///
/// A failing item never stops the batch.
pub fn run_batch<T, R, E, F>(
    items: &[T],
    mode: ProcessingMode,
    f: F,
) -> Result<BatchReport<R, E>, BatchError>
where
    T: Sync,
    R: Send,
    E: Send,
    F: Fn(&T) -> Result<R, E> + Sync + Send,
{
    let results = mode.par_map(items, f)?;

    let mut report = BatchReport {
        succeeded: Vec::new(),
        failed: Vec::new(),
    };
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(value) => report.succeeded.push((index, value)),
            Err(err) => report.failed.push((index, err)),
        }
    }

    Ok(report)
}
