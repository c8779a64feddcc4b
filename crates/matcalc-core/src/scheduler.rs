//! Fork-join scheduler for independent work items.
//!
//! Used by the parallel Strassen variant to run the seven branch
//! computations and the four combination steps as barrier-delimited phases.

use rayon::prelude::*;

use crate::multiplier::MatError;

/// A fallible unit of work submitted to the scheduler.
pub type Task<'a> = Box<dyn FnOnce() -> Result<(), MatError> + Send + 'a>;

/// Executes batches of independent work items on the rayon pool.
///
/// `run` is a completion barrier: it returns only after every submitted
/// item has finished. Items must write to disjoint memory they alone own —
/// the barrier is the only synchronization the scheduler provides. Rayon's
/// work-stealing deques serve as the concurrent submission queue.
pub struct TaskScheduler;

impl TaskScheduler {
    /// Run all tasks to completion, yielding the first error if any.
    pub fn run(tasks: Vec<Task<'_>>) -> Result<(), MatError> {
        let results: Vec<Result<(), MatError>> =
            tasks.into_par_iter().map(|task| task()).collect();
        results
            .into_iter()
            .find(std::result::Result::is_err)
            .unwrap_or(Ok(()))
    }
}
