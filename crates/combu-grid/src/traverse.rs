use std::sync::Arc;

use combu_core::{Arg, CombuError, Key, ParamSpec, Record};
use log::debug;

use crate::standardize::{standardize, Axis, Fragment};

/// Position of the selected candidate for every key of one combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinationIndex {
    keys: Arc<[Key]>,
    positions: Vec<usize>,
}

impl CombinationIndex {
    /// Returns the selected candidate position for `key`.
    pub fn get(&self, key: &Key) -> Option<usize> {
        self.keys
            .iter()
            .position(|candidate| candidate == key)
            .map(|slot| self.positions[slot])
    }

    /// Keys in resolved traversal order.
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Positions aligned with [`CombinationIndex::keys`].
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, usize)> + '_ {
        self.keys.iter().zip(self.positions.iter().copied())
    }
}

/// One yielded combination: its index and the record built from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Combination {
    pub index: CombinationIndex,
    pub record: Record,
}

/// Nested-loop position generator; the last axis varies fastest.
#[derive(Debug, Clone)]
pub(crate) struct Odometer {
    lengths: Vec<usize>,
    next: Option<Vec<usize>>,
    remaining: Option<usize>,
}

impl Odometer {
    pub(crate) fn new(lengths: Vec<usize>) -> Self {
        let exhausted = lengths.is_empty() || lengths.contains(&0);
        let remaining = if exhausted {
            Some(0)
        } else {
            lengths
                .iter()
                .try_fold(1usize, |acc, len| acc.checked_mul(*len))
        };
        let next = (!exhausted).then(|| vec![0; lengths.len()]);
        Self {
            lengths,
            next,
            remaining,
        }
    }
}

impl Iterator for Odometer {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        let mut following = current.clone();
        for slot in (0..following.len()).rev() {
            following[slot] += 1;
            if following[slot] < self.lengths[slot] {
                self.next = Some(following);
                break;
            }
            following[slot] = 0;
        }
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= 1;
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining {
            Some(remaining) => (remaining, Some(remaining)),
            None => (usize::MAX, None),
        }
    }
}

/// Merges the selected fragment of every axis in axis order.
///
/// A name contributed by a later axis overwrites the value of an earlier one
/// and keeps the earlier position.
pub(crate) fn merge_fragments(axes: &[Axis], positions: &[usize]) -> Fragment {
    let mut merged = Fragment::new();
    for (axis, &position) in axes.iter().zip(positions) {
        for (name, arg) in &axis.fragments()[position] {
            merged.insert(name.clone(), arg.clone());
        }
    }
    merged
}

fn into_record(fragment: Fragment) -> Record {
    fragment
        .into_iter()
        .filter_map(|(name, arg)| match arg {
            Arg::Value(value) => Some((name, value)),
            Arg::Unset => None,
        })
        .collect()
}

/// Lazy Cartesian traversal over normalized axes.
///
/// Combinations come out in lexicographic order of their index under the
/// resolved key order. An empty specification, or any key without
/// candidates, yields nothing.
#[derive(Debug, Clone)]
pub struct Traversal {
    axes: Vec<Axis>,
    keys: Arc<[Key]>,
    odometer: Odometer,
}

impl Traversal {
    pub fn new(axes: Vec<Axis>) -> Self {
        let keys: Arc<[Key]> = axes.iter().map(|axis| axis.key().clone()).collect();
        let odometer = Odometer::new(axes.iter().map(Axis::len).collect());
        Self {
            axes,
            keys,
            odometer,
        }
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// Drops combination indices, yielding records only.
    pub fn records(self) -> Records {
        Records { inner: self }
    }
}

impl Iterator for Traversal {
    type Item = Combination;

    fn next(&mut self) -> Option<Self::Item> {
        let positions = self.odometer.next()?;
        let record = into_record(merge_fragments(&self.axes, &positions));
        Some(Combination {
            index: CombinationIndex {
                keys: Arc::clone(&self.keys),
                positions,
            },
            record,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.odometer.size_hint()
    }
}

/// Record-only view over a [`Traversal`].
#[derive(Debug, Clone)]
pub struct Records {
    inner: Traversal,
}

impl Iterator for Records {
    type Item = Record;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|combination| combination.record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Prepares a traversal yielding records together with their indices.
pub fn combinations(spec: &ParamSpec, order: &[Key]) -> Result<Traversal, CombuError> {
    let axes = standardize(spec, order)?;
    let traversal = Traversal::new(axes);
    debug!(
        "prepared traversal over {} keys, {:?} combinations",
        traversal.axes().len(),
        traversal.size_hint().1
    );
    Ok(traversal)
}

/// Prepares a lazy traversal yielding one [`Record`] per combination.
pub fn traverse(spec: &ParamSpec, order: &[Key]) -> Result<Records, CombuError> {
    combinations(spec, order).map(Traversal::records)
}
