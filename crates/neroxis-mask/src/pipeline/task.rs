//! Task records and dependency planning.

use std::sync::{Arc, MutexGuard, OnceLock};

use super::{MaskId, Registry};
use crate::error::MaskError;
use crate::grid::Grid;
use crate::mask::Mask;

/// Index of a task in its pipeline's registry.
pub type TaskId = usize;

/// Executes one task and returns the output digest when hashing is enabled.
pub(crate) type Job = Box<dyn FnOnce() -> Result<Option<String>, MaskError> + Send>;

/// Runs after a task completes, before any dependent task is dispatched.
pub(crate) type Hook = Box<dyn FnOnce() + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TaskStatus {
    /// Waiting for dependencies, or for the pipeline to start.
    Waiting,
    /// Sent to the worker queue.
    Queued,
    Running,
    Done,
    Failed,
}

pub(crate) struct TaskRecord {
    pub(crate) output: MaskId,
    pub(crate) mask: String,
    pub(crate) label: &'static str,
    pub(crate) inputs: Vec<MaskId>,
    pub(crate) waiting_on: usize,
    pub(crate) dependents: Vec<TaskId>,
    pub(crate) job: Option<Job>,
    pub(crate) status: TaskStatus,
    pub(crate) on_complete: Vec<Hook>,
}

impl TaskRecord {
    pub(crate) fn is_pending(&self) -> bool {
        self.status != TaskStatus::Done
    }
}

/// Static description of a task being submitted.
#[derive(Debug, Clone)]
pub(crate) struct TaskSpec {
    pub(crate) label: &'static str,
    pub(crate) mask: String,
    pub(crate) parallel: bool,
}

/// A dependency's grid as seen by a task.
///
/// `Ready` snapshots were copied at enqueue time. `Deferred` snapshots are
/// filled when the dependency's pending task completes, which always happens
/// before the reading task runs.
pub(crate) enum Snapshot<G> {
    Ready(Arc<G>),
    Deferred {
        mask: String,
        cell: Arc<OnceLock<Arc<G>>>,
    },
}

impl<G> Snapshot<G> {
    pub(crate) fn get(&self) -> Result<&G, MaskError> {
        match self {
            Snapshot::Ready(grid) => Ok(grid),
            Snapshot::Deferred { mask, cell } => cell
                .get()
                .map(|grid| grid.as_ref())
                .ok_or_else(|| MaskError::MissingSnapshot(mask.clone())),
        }
    }
}

/// Collects the dependencies of a task while the registry is locked.
pub struct TaskPlan<'a> {
    pub(crate) registry: MutexGuard<'a, Registry>,
    pub(crate) output: MaskId,
    pub(crate) waits: Vec<TaskId>,
    pub(crate) inputs: Vec<MaskId>,
}

impl<'a> TaskPlan<'a> {
    pub(crate) fn new(registry: MutexGuard<'a, Registry>, output: MaskId) -> Self {
        Self {
            registry,
            output,
            waits: Vec::new(),
            inputs: Vec::new(),
        }
    }

    /// Declare `mask` as an input and capture its state as of this enqueue.
    pub(crate) fn read<D: Grid>(&mut self, mask: &Mask<D>) -> Snapshot<D> {
        let id = mask.id();
        if !self.inputs.contains(&id) {
            self.inputs.push(id);
        }

        match self.registry.pending_task(id) {
            Some(task) => {
                if !self.waits.contains(&task) {
                    self.waits.push(task);
                }
                let cell = Arc::new(OnceLock::new());
                let target = Arc::clone(&cell);
                let core = Arc::clone(mask.core());
                self.registry.tasks[task].on_complete.push(Box::new(move || {
                    let _ = target.set(Arc::new(core.snapshot()));
                }));
                Snapshot::Deferred {
                    mask: mask.name().to_string(),
                    cell,
                }
            }
            None => Snapshot::Ready(Arc::new(mask.core().snapshot())),
        }
    }
}
