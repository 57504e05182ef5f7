//! Work distribution for the pair loop.
//!
//! The strict upper triangle of an n × n matrix is packed row after row into
//! one buffer. [`upper_triangle_segments`] splits that buffer into one mutable
//! segment per row, so every task owns its cells outright and the borrow
//! checker enforces that no two tasks write the same cell. The scheduler then
//! runs the tasks sequentially or on a rayon pool; the end of the parallel
//! iterator is the only join.

use gerber_core::error::Result;
use gerber_core::runtime::{ExecutionMode, RuntimeConfig};
use rayon::prelude::*;
use std::sync::Arc;

/// Cells `(row, row + 1 ..= n - 1)` of the packed upper triangle.
#[derive(Debug)]
pub struct RowSegment<'a> {
    /// Matrix row owning these cells.
    pub row: usize,
    /// `cells[k]` holds entry `(row, row + 1 + k)`.
    pub cells: &'a mut [f64],
}

impl RowSegment<'_> {
    /// Column of the k-th cell.
    pub fn column(&self, k: usize) -> usize {
        self.row + 1 + k
    }
}

/// Length of the packed strict upper triangle.
pub fn upper_triangle_len(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// Split a packed upper-triangle buffer into disjoint per-row segments.
///
/// `packed.len()` must equal [`upper_triangle_len`]`(n)`. Rows without cells
/// (the last row) are omitted.
pub fn upper_triangle_segments(n: usize, packed: &mut [f64]) -> Vec<RowSegment<'_>> {
    debug_assert_eq!(packed.len(), upper_triangle_len(n));

    let mut segments = Vec::with_capacity(n.saturating_sub(1));
    let mut rest = packed;
    for row in 0..n.saturating_sub(1) {
        let (cells, tail) = rest.split_at_mut(n - 1 - row);
        segments.push(RowSegment { row, cells });
        rest = tail;
    }
    segments
}

/// Runs independent tasks sequentially or across a rayon pool.
#[derive(Debug, Clone)]
pub struct ParallelScheduler {
    mode: ExecutionMode,
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl Default for ParallelScheduler {
    fn default() -> Self {
        Self::global()
    }
}

impl ParallelScheduler {
    /// Run every task on the calling thread.
    pub fn sequential() -> Self {
        Self {
            mode: ExecutionMode::Sequential,
            pool: None,
        }
    }

    /// Run on rayon's global pool.
    pub fn global() -> Self {
        Self {
            mode: ExecutionMode::Parallel,
            pool: None,
        }
    }

    /// Run on a dedicated pool.
    pub fn with_pool(pool: Arc<rayon::ThreadPool>) -> Self {
        Self {
            mode: ExecutionMode::Parallel,
            pool: Some(pool),
        }
    }

    /// Build from runtime configuration.
    ///
    /// A parallel configuration with `worker_threads = 0` uses the global pool;
    /// an explicit worker count gets a dedicated pool of that size.
    pub fn from_config(config: &RuntimeConfig) -> Result<Self> {
        config.validate()?;
        match (config.execution_mode, config.worker_threads) {
            (ExecutionMode::Sequential, _) => Ok(Self::sequential()),
            (ExecutionMode::Parallel, 0) => Ok(Self::global()),
            (ExecutionMode::Parallel, _) => Ok(Self::with_pool(Arc::new(config.build_pool()?))),
        }
    }

    /// Execution mode.
    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Number of workers tasks may run on.
    pub fn threads(&self) -> usize {
        match (self.mode, &self.pool) {
            (ExecutionMode::Sequential, _) => 1,
            (ExecutionMode::Parallel, Some(pool)) => pool.current_num_threads(),
            (ExecutionMode::Parallel, None) => rayon::current_num_threads(),
        }
    }

    /// Apply `f` to every task and return the results in task order.
    pub fn run<T, R, F>(&self, tasks: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync + Send,
    {
        match (self.mode, &self.pool) {
            (ExecutionMode::Sequential, _) => tasks.into_iter().map(f).collect(),
            (ExecutionMode::Parallel, Some(pool)) => {
                pool.install(|| tasks.into_par_iter().map(&f).collect())
            }
            (ExecutionMode::Parallel, None) => tasks.into_par_iter().map(f).collect(),
        }
    }
}
