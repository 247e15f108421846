//! Worker pools games and matches are submitted to.
//!
//! A contest uses two logically separate pools: one running games, one running the matches of
//! those games. Handles are cheap to clone and are passed explicitly to whoever submits work.

use std::fmt;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::trace;

use crate::error::Result;

/// Shared handle on a fixed-size thread pool.
#[derive(Clone)]
pub struct WorkerPool {
    name: Arc<str>,
    pool: Arc<rayon::ThreadPool>,
}

impl WorkerPool {
    /// Builds a pool of `threads` workers named `{name}-{index}`.
    ///
    /// # Errors
    /// [`Error::ThreadPool`](crate::error::Error::ThreadPool) if the threads cannot be created.
    pub fn new(name: &str, threads: usize) -> Result<Self> {
        let prefix = name.to_string();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(move |index| format!("{prefix}-{index}"))
            .build()?;
        trace!(name, threads, "worker pool created");
        Ok(Self {
            name: name.into(),
            pool: Arc::new(pool),
        })
    }

    /// Pool name, used as thread name prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of workers.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Runs `task` on every item, in parallel, and waits for all of them.
    ///
    /// Results come back in submission order, whatever the completion order. The first error
    /// wins: tasks not started yet are skipped and no partial result is returned.
    pub fn try_map<T, R, F>(&self, items: Vec<T>, task: F) -> Result<Vec<R>>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> Result<R> + Send + Sync,
    {
        self.pool
            .install(|| items.into_par_iter().map(task).collect())
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("name", &self.name)
            .field("threads", &self.threads())
            .finish()
    }
}
