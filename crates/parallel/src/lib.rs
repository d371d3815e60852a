//! # tilecat Parallel
//!
//! Batch execution for tile pipelines.
//!
//! Every tile is an independent job, so a batch is a plain map over the
//! job list. This crate provides:
//! - Sequential or Rayon-backed execution selected at run time
//! - Batch reports that keep per-item failures apart from successes
//!
//! Without the `parallel` feature every mode runs sequentially.

pub mod batch;
pub mod strategy;

pub use batch::{run_batch, BatchReport};
pub use strategy::{num_threads, BatchError, ParallelStrategy, ProcessingMode};
