//! Combination traversal for parameter specifications: key ordering,
//! normalization, counting, nested Cartesian iteration and loop-boundary
//! detection for hooks.

mod count;
mod hooks;
mod order;
mod shuffle;
mod standardize;
mod traverse;

pub use count::count;
pub use hooks::{BoundaryDetector, Hook, HookKind, HookTable};
pub use order::resolve_order;
pub use shuffle::{shuffle, shuffle_with, ShuffleSource};
pub use standardize::{standardize, Axis, Fragment};
pub use traverse::{combinations, traverse, Combination, CombinationIndex, Records, Traversal};
