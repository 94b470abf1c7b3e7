//! Parallel processing utilities

use crate::error::{FixImportsError, Result};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Progress update information for parallel operations
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub current: usize,
    pub total: usize,
    pub message: String,
}

impl ProgressUpdate {
    /// Create a new progress update
    pub fn new(current: usize, total: usize, message: impl Into<String>) -> Self {
        Self {
            current,
            total,
            message: message.into(),
        }
    }

    /// Calculate progress percentage
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.current as f64 / self.total as f64) * 100.0
        }
    }
}

/// Build a worker pool with a fixed number of threads
pub fn build_pool(threads: usize) -> Result<ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .thread_name(|i| format!("fix-imports-{}", i))
        .build()
        .map_err(|e| FixImportsError::ParallelExecution {
            message: format!("failed to build worker pool: {}", e),
        })
}

/// Execute a function in parallel on a collection of items with progress reporting
///
/// Results come back in input order. The callback is invoked once per
/// finished item, from whichever worker finished it.
pub fn parallel_process_with_progress<T, F, R, P>(items: Vec<T>, f: F, progress_callback: P) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Send + Sync,
    P: Fn(ProgressUpdate) + Send + Sync,
{
    let total = items.len();
    let counter = AtomicUsize::new(0);

    items
        .into_par_iter()
        .map(|item| {
            let result = f(item);
            let current = counter.fetch_add(1, Ordering::Relaxed) + 1;
            progress_callback(ProgressUpdate::new(
                current,
                total,
                format!("Processing item {}/{}", current, total),
            ));
            result
        })
        .collect()
}
