use combu_core::errors::{CombuError, ErrorInfo};
use combu_core::Key;
use serde::{Deserialize, Serialize};

/// Options governing how a specification is dispatched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecOptions {
    /// Keys iterated first, outermost loop first. Remaining keys follow in
    /// declaration order.
    pub order: Vec<Key>,
    /// `1` runs sequentially, `n > 1` uses a pool of `n` workers and a
    /// negative count uses every available core. `0` is rejected.
    pub workers: i64,
    /// Report progress through the `log` facade.
    pub progress: bool,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            workers: 1,
            progress: false,
        }
    }
}

impl ExecOptions {
    /// Replaces the requested loop order.
    pub fn with_order<I, K>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        self.order = order.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the raw worker count.
    pub fn with_workers(mut self, workers: i64) -> Self {
        self.workers = workers;
        self
    }

    /// Enables or disables log-backed progress reporting.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Interprets the raw worker count.
    pub fn worker_count(&self) -> Result<WorkerCount, CombuError> {
        match self.workers {
            0 => Err(CombuError::Config(
                ErrorInfo::new("worker-count-zero", "worker count must not be zero")
                    .with_hint("use 1 for sequential execution or a negative count for all cores"),
            )),
            1 => Ok(WorkerCount::Sequential),
            n if n < 0 => Ok(WorkerCount::All),
            n => usize::try_from(n).map(WorkerCount::Fixed).map_err(|err| {
                CombuError::Config(
                    ErrorInfo::new("worker-count-range", err.to_string())
                        .with_context("workers", n.to_string()),
                )
            }),
        }
    }
}

/// Dispatch mode derived from [`ExecOptions::workers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerCount {
    /// Run in the calling thread, firing hooks.
    Sequential,
    /// Run on a pool with a fixed number of threads.
    Fixed(usize),
    /// Run on a pool sized to the available cores.
    All,
}

impl WorkerCount {
    /// Thread count handed to the pool builder; `None` lets the pool decide.
    pub fn threads(self) -> Option<usize> {
        match self {
            WorkerCount::Sequential => Some(1),
            WorkerCount::Fixed(threads) => Some(threads),
            WorkerCount::All => None,
        }
    }
}
