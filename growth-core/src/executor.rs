//! Fork-join execution of per-worker jobs.
//!
//! An [`Executor`] runs one job per worker index `0..workers()`, blocks
//! until every job has finished, and hands the results back in worker
//! order. Jobs share read-only state and return their output by value,
//! so no two workers ever write the same memory.

use crate::error::Result;
use rayon::prelude::*;

pub trait Executor: Sync {
    /// Number of partitions a batch is split into.
    fn workers(&self) -> usize;

    /// Runs `job(w)` for every worker `w` and returns the results ordered
    /// by `w`. A panicking job propagates to the caller.
    fn scatter<R, F>(&self, job: F) -> Vec<R>
    where
        R: Send,
        F: Fn(usize) -> R + Sync + Send;
}

/// Fixed-size rayon pool.
pub struct RayonExecutor {
    pool: rayon::ThreadPool,
}

impl RayonExecutor {
    /// Builds a pool with `workers` threads; `0` picks rayon's default.
    pub fn new(workers: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("growth-worker-{i}"))
            .build()?;
        tracing::debug!(workers = pool.current_num_threads(), "started worker pool");
        Ok(Self { pool })
    }
}

impl Executor for RayonExecutor {
    fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    fn scatter<R, F>(&self, job: F) -> Vec<R>
    where
        R: Send,
        F: Fn(usize) -> R + Sync + Send,
    {
        let workers = self.workers();
        self.pool
            .install(|| (0..workers).into_par_iter().map(&job).collect())
    }
}

/// Runs every partition on the calling thread, in worker order.
#[derive(Clone, Copy, Debug)]
pub struct SequentialExecutor {
    workers: usize,
}

impl SequentialExecutor {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }
}

impl Default for SequentialExecutor {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Executor for SequentialExecutor {
    fn workers(&self) -> usize {
        self.workers
    }

    fn scatter<R, F>(&self, job: F) -> Vec<R>
    where
        R: Send,
        F: Fn(usize) -> R + Sync + Send,
    {
        (0..self.workers).map(job).collect()
    }
}
