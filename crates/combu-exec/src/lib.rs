#![deny(missing_docs)]
#![doc = "Dispatch of target operations over combu parameter grids: sequential execution with loop hooks, a rayon worker pool, progress reporting and declarative plans."]

/// Sequential execution and the dispatch entry points.
pub mod execution;
/// Dispatch options.
pub mod options;
/// Worker pool collaborator.
pub mod parallel;
/// Declarative plan loading.
pub mod plan;
/// Progress reporting collaborators.
pub mod progress;
/// Reusable runner with registered hooks.
pub mod runner;

pub use combu_grid::{count, shuffle, shuffle_with, traverse, HookKind, HookTable, ShuffleSource};
pub use execution::{execute, execute_with_hooks, Execution, Outcomes};
pub use options::{ExecOptions, WorkerCount};
pub use parallel::{Drain, ParallelExecutor};
pub use plan::{load_plan, save_plan, Plan};
pub use progress::{LogProgress, Progress, ProgressSink};
pub use runner::Combu;
