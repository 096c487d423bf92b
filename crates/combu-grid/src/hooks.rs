use std::fmt;

use combu_core::{CombuError, Key, Record};
use indexmap::IndexMap;
use log::trace;
use serde::{Deserialize, Serialize};

use crate::standardize::Axis;
use crate::traverse::CombinationIndex;

/// Callback run at a loop boundary with the record of the current combination.
pub type Hook<'h> = Box<dyn FnMut(&Record) -> Result<(), CombuError> + 'h>;

/// Loop boundary a hook is attached to.
///
/// For an order `[a, b]` the hooks behave like
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
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookKind {
    /// Entering the loop of a key.
    Before,
    /// Entering a new candidate of a key.
    BeforeEach,
    /// Leaving a candidate of a key.
    AfterEach,
    /// Leaving the loop of a key.
    After,
}

/// Tracks the previous combination and decides which boundaries are crossed.
#[derive(Debug, Clone)]
pub struct BoundaryDetector {
    slots: IndexMap<Key, usize>,
    last: Vec<usize>,
    previous: Option<Vec<usize>>,
}

impl BoundaryDetector {
    pub fn new(axes: &[Axis]) -> Self {
        Self {
            slots: axes
                .iter()
                .enumerate()
                .map(|(slot, axis)| (axis.key().clone(), slot))
                .collect(),
            last: axes.iter().map(|axis| axis.len().saturating_sub(1)).collect(),
            previous: None,
        }
    }

    /// Returns true when a hook of `kind` on `key` must fire for `current`.
    ///
    /// Keys absent from the traversal never fire.
    pub fn fires(&self, kind: HookKind, key: &Key, current: &[usize]) -> bool {
        let Some(&slot) = self.slots.get(key) else {
            return false;
        };
        let previous = self.previous.as_ref().map(|positions| positions[slot]);
        match kind {
            HookKind::Before => current[slot] == 0 && previous != Some(0),
            HookKind::BeforeEach => previous != Some(current[slot]),
            HookKind::AfterEach => self.at_end(current, slot + 1),
            HookKind::After => self.at_end(current, slot),
        }
    }

    /// Records `current` as the previous combination.
    pub fn advance(&mut self, current: &[usize]) {
        self.previous = Some(current.to_vec());
    }

    fn at_end(&self, current: &[usize], from: usize) -> bool {
        current[from..]
            .iter()
            .zip(&self.last[from..])
            .all(|(position, last)| position == last)
    }
}

/// Hooks registered per key, one table per [`HookKind`].
///
/// Registration order matters: before-hooks fire in registration order and
/// after-hooks in reverse, so registering outer keys first nests them the way
/// the loops nest.
#[derive(Default)]
pub struct HookTable<'h> {
    before: IndexMap<Key, Hook<'h>>,
    before_each: IndexMap<Key, Hook<'h>>,
    after_each: IndexMap<Key, Hook<'h>>,
    after: IndexMap<Key, Hook<'h>>,
}

impl fmt::Debug for HookTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookTable")
            .field("before", &self.before.keys().collect::<Vec<_>>())
            .field("before_each", &self.before_each.keys().collect::<Vec<_>>())
            .field("after_each", &self.after_each.keys().collect::<Vec<_>>())
            .field("after", &self.after.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<'h> HookTable<'h> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `hook` for `key`, replacing a previous hook of the same kind.
    pub fn set<F>(&mut self, kind: HookKind, key: impl Into<Key>, hook: F)
    where
        F: FnMut(&Record) -> Result<(), CombuError> + 'h,
    {
        self.table_mut(kind).insert(key.into(), Box::new(hook));
    }

    pub fn set_before<F>(&mut self, key: impl Into<Key>, hook: F)
    where
        F: FnMut(&Record) -> Result<(), CombuError> + 'h,
    {
        self.set(HookKind::Before, key, hook);
    }

    pub fn set_after<F>(&mut self, key: impl Into<Key>, hook: F)
    where
        F: FnMut(&Record) -> Result<(), CombuError> + 'h,
    {
        self.set(HookKind::After, key, hook);
    }

    pub fn set_before_each<F>(&mut self, key: impl Into<Key>, hook: F)
    where
        F: FnMut(&Record) -> Result<(), CombuError> + 'h,
    {
        self.set(HookKind::BeforeEach, key, hook);
    }

    pub fn set_after_each<F>(&mut self, key: impl Into<Key>, hook: F)
    where
        F: FnMut(&Record) -> Result<(), CombuError> + 'h,
    {
        self.set(HookKind::AfterEach, key, hook);
    }

    /// Keys with a hook of `kind`, in registration order.
    pub fn keys(&self, kind: HookKind) -> impl Iterator<Item = &Key> + '_ {
        self.table(kind).keys()
    }

    pub fn is_empty(&self) -> bool {
        self.before.is_empty()
            && self.before_each.is_empty()
            && self.after_each.is_empty()
            && self.after.is_empty()
    }

    /// Runs the before and before-each hooks due for `index`.
    pub fn fire_before(
        &mut self,
        detector: &BoundaryDetector,
        index: &CombinationIndex,
        record: &Record,
    ) -> Result<(), CombuError> {
        let current = index.positions();
        for (key, hook) in self.before.iter_mut() {
            if detector.fires(HookKind::Before, key, current) {
                trace!("before hook for `{key}`");
                hook(record)?;
            }
        }
        for (key, hook) in self.before_each.iter_mut() {
            if detector.fires(HookKind::BeforeEach, key, current) {
                trace!("before_each hook for `{key}`");
                hook(record)?;
            }
        }
        Ok(())
    }

    /// Runs the after-each and after hooks due for `index`, innermost first.
    pub fn fire_after(
        &mut self,
        detector: &BoundaryDetector,
        index: &CombinationIndex,
        record: &Record,
    ) -> Result<(), CombuError> {
        let current = index.positions();
        for (key, hook) in self.after_each.iter_mut().rev() {
            if detector.fires(HookKind::AfterEach, key, current) {
                trace!("after_each hook for `{key}`");
                hook(record)?;
            }
        }
        for (key, hook) in self.after.iter_mut().rev() {
            if detector.fires(HookKind::After, key, current) {
                trace!("after hook for `{key}`");
                hook(record)?;
            }
        }
        Ok(())
    }

    fn table(&self, kind: HookKind) -> &IndexMap<Key, Hook<'h>> {
        match kind {
            HookKind::Before => &self.before,
            HookKind::BeforeEach => &self.before_each,
            HookKind::AfterEach => &self.after_each,
            HookKind::After => &self.after,
        }
    }

    fn table_mut(&mut self, kind: HookKind) -> &mut IndexMap<Key, Hook<'h>> {
        match kind {
            HookKind::Before => &mut self.before,
            HookKind::BeforeEach => &mut self.before_each,
            HookKind::AfterEach => &mut self.after_each,
            HookKind::After => &mut self.after,
        }
    }
}
