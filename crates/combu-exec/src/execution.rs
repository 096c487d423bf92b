use combu_core::{CombuError, ParamSpec, Record};
use combu_grid::{combinations, count, traverse, BoundaryDetector, Combination, HookTable, Traversal};
use log::{debug, warn};

use crate::options::{ExecOptions, WorkerCount};
use crate::parallel::ParallelExecutor;
use crate::progress::{LogProgress, Progress};

/// Lazy stream of `(result, record)` pairs produced by a dispatch.
pub type Outcomes<'a, R> = Box<dyn Iterator<Item = Result<(R, Record), CombuError>> + 'a>;

/// Sequential execution of a target over a traversal, firing hooks at loop
/// boundaries.
///
/// Before-hooks for a combination run just ahead of the target call. The
/// after-hooks of a combination run when the next item is requested, so a
/// caller that stops early never triggers them for the last item it saw.
/// The stream ends after the first error.
pub struct Execution<'a, 'h, F> {
    traversal: Traversal,
    detector: BoundaryDetector,
    hooks: Option<&'a mut HookTable<'h>>,
    target: F,
    pending: Option<Combination>,
    failed: bool,
}

impl<'a, 'h, F> Execution<'a, 'h, F> {
    /// Prepares an execution; nothing runs until the first item is requested.
    pub fn new(traversal: Traversal, target: F, hooks: Option<&'a mut HookTable<'h>>) -> Self {
        let detector = BoundaryDetector::new(traversal.axes());
        Self {
            traversal,
            detector,
            hooks,
            target,
            pending: None,
            failed: false,
        }
    }

    fn step<R>(&mut self) -> Result<Option<(R, Record)>, CombuError>
    where
        F: FnMut(&Record) -> Result<R, CombuError>,
    {
        if let Some(done) = self.pending.take() {
            if let Some(hooks) = self.hooks.as_deref_mut() {
                hooks.fire_after(&self.detector, &done.index, &done.record)?;
            }
            self.detector.advance(done.index.positions());
        }
        let Some(combination) = self.traversal.next() else {
            return Ok(None);
        };
        if let Some(hooks) = self.hooks.as_deref_mut() {
            hooks.fire_before(&self.detector, &combination.index, &combination.record)?;
        }
        let result = (self.target)(&combination.record)?;
        let record = combination.record.clone();
        self.pending = Some(combination);
        Ok(Some((result, record)))
    }
}

impl<F, R> Iterator for Execution<'_, '_, F>
where
    F: FnMut(&Record) -> Result<R, CombuError>,
{
    type Item = Result<(R, Record), CombuError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.step() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => None,
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

/// Runs `target` once per combination of `spec`.
///
/// With one worker the records are produced lazily in traversal order. With
/// more workers every record is submitted to a pool up front and results
/// arrive in completion order.
pub fn execute<'a, F, R>(
    target: F,
    spec: &ParamSpec,
    options: &ExecOptions,
) -> Result<Outcomes<'a, R>, CombuError>
where
    F: Fn(&Record) -> Result<R, CombuError> + Send + Sync + 'static,
    R: Send + 'static,
{
    dispatch(target, spec, options, None)
}

/// Like [`execute`], firing the hooks of `hooks` on the sequential path.
///
/// Hooks are ignored when the options request a worker pool.
pub fn execute_with_hooks<'a, 'h, F, R>(
    target: F,
    spec: &ParamSpec,
    options: &ExecOptions,
    hooks: &'a mut HookTable<'h>,
) -> Result<Outcomes<'a, R>, CombuError>
where
    F: Fn(&Record) -> Result<R, CombuError> + Send + Sync + 'static,
    R: Send + 'static,
{
    dispatch(target, spec, options, Some(hooks))
}

fn dispatch<'a, 'h, F, R>(
    target: F,
    spec: &ParamSpec,
    options: &ExecOptions,
    hooks: Option<&'a mut HookTable<'h>>,
) -> Result<Outcomes<'a, R>, CombuError>
where
    F: Fn(&Record) -> Result<R, CombuError> + Send + Sync + 'static,
    R: Send + 'static,
{
    let workers = options.worker_count()?;
    let total = if options.progress { Some(count(spec)?) } else { None };
    let outcomes: Outcomes<'a, R> = match workers {
        WorkerCount::Sequential => {
            debug!("dispatching sequentially");
            Box::new(Execution::new(combinations(spec, &options.order)?, target, hooks))
        }
        pooled => {
            if hooks.is_some_and(|hooks| !hooks.is_empty()) {
                warn!("hooks are not fired when dispatching to a worker pool");
            }
            debug!("dispatching to a worker pool ({pooled:?})");
            let records = traverse(spec, &options.order)?;
            Box::new(ParallelExecutor::new(target, pooled.threads()).submit(records)?)
        }
    };
    match total {
        Some(total) => Ok(Box::new(Progress::new(
            outcomes,
            total,
            LogProgress::new("combu"),
        ))),
        None => Ok(outcomes),
    }
}
