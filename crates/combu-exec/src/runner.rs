use combu_core::{CombuError, Key, ParamSpec, Record};
use combu_grid::{combinations, count, HookTable};
use log::debug;

use crate::execution::{Execution, Outcomes};
use crate::progress::{Progress, ProgressSink};

/// Reusable sequential runner: a target operation, a default loop order and
/// hooks attached to loop boundaries.
///
/// For an order `[a, b]` hooks fire as
///
/// ```text
/// before(a)
/// for a in A:
///     before(b)
///     before_each(a)
///     for b in B:
///         before_each(b)
///         target()
///         after_each(b)
///     after_each(a)
///     after(b)
/// after(a)
/// ```
///
/// Hooks receive the same record as the target.
pub struct Combu<'h, F> {
    target: F,
    order: Vec<Key>,
    hooks: HookTable<'h>,
    progress: Option<Box<dyn ProgressSink + 'h>>,
}

impl<'h, F> Combu<'h, F> {
    /// Creates a runner for `target` with no hooks and declaration order.
    pub fn new(target: F) -> Self {
        Self {
            target,
            order: Vec::new(),
            hooks: HookTable::new(),
            progress: None,
        }
    }

    /// Sets the default loop order used by [`Combu::execute`].
    pub fn with_order<I, K>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        self.order = order.into_iter().map(Into::into).collect();
        self
    }

    /// Reports progress of every execution to `sink`.
    pub fn with_progress<S: ProgressSink + 'h>(mut self, sink: S) -> Self {
        self.progress = Some(Box::new(sink));
        self
    }

    /// Registers a hook run when the loop of `key` starts.
    pub fn set_before<H>(&mut self, key: impl Into<Key>, hook: H) -> &mut Self
    where
        H: FnMut(&Record) -> Result<(), CombuError> + 'h,
    {
        self.hooks.set_before(key, hook);
        self
    }

    /// Registers a hook run when the loop of `key` ends.
    pub fn set_after<H>(&mut self, key: impl Into<Key>, hook: H) -> &mut Self
    where
        H: FnMut(&Record) -> Result<(), CombuError> + 'h,
    {
        self.hooks.set_after(key, hook);
        self
    }

    /// Registers a hook run whenever `key` moves to a new candidate.
    pub fn set_before_each<H>(&mut self, key: impl Into<Key>, hook: H) -> &mut Self
    where
        H: FnMut(&Record) -> Result<(), CombuError> + 'h,
    {
        self.hooks.set_before_each(key, hook);
        self
    }

    /// Registers a hook run when `key` is about to leave its current candidate.
    pub fn set_after_each<H>(&mut self, key: impl Into<Key>, hook: H) -> &mut Self
    where
        H: FnMut(&Record) -> Result<(), CombuError> + 'h,
    {
        self.hooks.set_after_each(key, hook);
        self
    }

    /// Registered hooks.
    pub fn hooks(&self) -> &HookTable<'h> {
        &self.hooks
    }

    /// Runs the target over `spec` in the runner's default order.
    pub fn execute<R>(&mut self, spec: &ParamSpec) -> Result<Outcomes<'_, R>, CombuError>
    where
        F: FnMut(&Record) -> Result<R, CombuError>,
    {
        let order = self.order.clone();
        self.execute_with_order(spec, &order)
    }

    /// Runs the target over `spec`, overriding the default order.
    pub fn execute_with_order<R>(
        &mut self,
        spec: &ParamSpec,
        order: &[Key],
    ) -> Result<Outcomes<'_, R>, CombuError>
    where
        F: FnMut(&Record) -> Result<R, CombuError>,
    {
        let traversal = combinations(spec, order)?;
        debug!("running {:?}", self.hooks);
        let execution = Execution::new(traversal, &mut self.target, Some(&mut self.hooks));
        let outcomes: Outcomes<'_, R> = match self.progress.as_deref_mut() {
            Some(sink) => Box::new(Progress::new(execution, count(spec)?, sink)),
            None => Box::new(execution),
        };
        Ok(outcomes)
    }
}
