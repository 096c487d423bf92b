use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;

use combu_core::errors::{CombuError, ErrorInfo};
use combu_core::Record;
use log::debug;
use rayon::{ThreadPool, ThreadPoolBuilder};

fn worker_error(code: &str, message: impl Into<String>) -> CombuError {
    CombuError::Worker(ErrorInfo::new(code, message))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => payload
            .downcast_ref::<&str>()
            .map(|message| message.to_string())
            .unwrap_or_else(|| "worker panicked".to_string()),
    }
}

/// Worker pool running a target operation over submitted records.
///
/// Every record becomes one independent job. Results come back in completion
/// order, paired with the record that produced them.
pub struct ParallelExecutor<F> {
    target: Arc<F>,
    workers: Option<usize>,
}

impl<F> ParallelExecutor<F> {
    /// Creates an executor; `workers = None` sizes the pool to the available cores.
    pub fn new(target: F, workers: Option<usize>) -> Self {
        Self {
            target: Arc::new(target),
            workers,
        }
    }

    /// Submits every record to a fresh pool and returns the completion stream.
    ///
    /// A panic inside the target is caught and reported as a worker error for
    /// that job. Failed jobs are never retried.
    pub fn submit<R, I>(&self, records: I) -> Result<Drain<R>, CombuError>
    where
        F: Fn(&Record) -> Result<R, CombuError> + Send + Sync + 'static,
        R: Send + 'static,
        I: IntoIterator<Item = Record>,
    {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.workers.unwrap_or(0))
            .thread_name(|index| format!("combu-worker-{index}"))
            .build()
            .map_err(|err| worker_error("thread-pool", err.to_string()))?;
        let (sender, receiver) = mpsc::channel();
        let mut pending = 0usize;
        for record in records {
            let sender = sender.clone();
            let target = Arc::clone(&self.target);
            pool.spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| target(&record)))
                    .unwrap_or_else(|payload| {
                        Err(CombuError::Worker(
                            ErrorInfo::new("worker-panic", panic_message(payload))
                                .with_context("record", record.to_value().to_string()),
                        ))
                    });
                // The receiver is gone once the caller stops draining.
                let _ = sender.send((outcome, record));
            });
            pending += 1;
        }
        debug!(
            "submitted {pending} jobs to a pool of {} workers",
            pool.current_num_threads()
        );
        Ok(Drain {
            _pool: pool,
            receiver,
            pending,
            failed: false,
        })
    }
}

/// Completion-ordered results of submitted jobs.
///
/// The stream ends after the first failure; results of other jobs that were
/// already running are dropped.
pub struct Drain<R> {
    _pool: ThreadPool,
    receiver: Receiver<(Result<R, CombuError>, Record)>,
    pending: usize,
    failed: bool,
}

impl<R> Drain<R> {
    /// Number of jobs not yet drained.
    pub fn pending(&self) -> usize {
        self.pending
    }
}

impl<R> Iterator for Drain<R> {
    type Item = Result<(R, Record), CombuError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pending == 0 {
            return None;
        }
        let received = self.receiver.recv();
        self.pending -= 1;
        match received {
            Ok((Ok(result), record)) => Some(Ok((result, record))),
            Ok((Err(err), _)) => {
                self.failed = true;
                Some(Err(err))
            }
            Err(_) => {
                self.failed = true;
                Some(Err(worker_error(
                    "worker-disconnected",
                    "worker pool stopped before all jobs completed",
                )))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            (0, Some(self.pending))
        }
    }
}
