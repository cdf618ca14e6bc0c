//! Deferred execution of mask operations.
//!
//! Every mutating mask call becomes a task in the pipeline's DAG. A task waits
//! for the previous task of its own mask and for the pending task of each mask
//! it reads; once those finish it is sent to the worker pool. Tasks of one mask
//! therefore run in enqueue order while independent masks run concurrently.
//!
//! ```
//! use neroxis_mask::{BooleanMask, Pipeline, PipelineConfig};
//!
//! let pipeline = Pipeline::new(PipelineConfig::default());
//! let land = BooleanMask::builder(&pipeline, "land").size(64).seed(7).build().unwrap();
//! land.randomize(0.5).unwrap().inflate(2.0).unwrap();
//!
//! pipeline.start().unwrap();
//! pipeline.await_masks(&[&land]).unwrap();
//! assert!(land.count().unwrap() > 0);
//! pipeline.stop();
//! ```

mod task;
mod worker;

use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Sender};
use serde::{Deserialize, Serialize};

use crate::error::{MaskError, PipelineError};

pub(crate) use task::{Job, Snapshot, TaskSpec};
pub use task::{TaskId, TaskPlan};
use task::{TaskRecord, TaskStatus};
use worker::{panic_message, spawn_workers, WorkerMessage};

/// Process-unique identity of a mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaskId(u64);

impl MaskId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        MaskId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Anything that names a mask registered with a pipeline.
pub trait MaskRef {
    fn mask_id(&self) -> MaskId;

    fn mask_name(&self) -> &str;
}

/// Current-state digest of a registered mask.
pub(crate) trait Fingerprint: Send + Sync {
    fn fingerprint(&self) -> String;
}

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Number of worker threads started by [`Pipeline::start`].
    pub workers: usize,
    /// Record a digest of the output after every executed task.
    pub hash_masks: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            hash_masks: true,
        }
    }
}

impl PipelineConfig {
    /// A single worker.
    pub fn sequential() -> Self {
        Self {
            workers: 1,
            ..Self::default()
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_hashing(mut self, hash_masks: bool) -> Self {
        self.hash_masks = hash_masks;
        self
    }
}

struct MaskEntry {
    id: MaskId,
    name: String,
    handle: Weak<dyn Fingerprint>,
    digests: Vec<String>,
}

/// Task graph and mask registrations of one run.
pub(crate) struct Registry {
    tasks: Vec<TaskRecord>,
    last_task: HashMap<MaskId, TaskId>,
    masks: Vec<MaskEntry>,
    started: bool,
    failure: Option<PipelineError>,
    sender: Option<Sender<WorkerMessage>>,
}

impl Registry {
    fn new() -> Self {
        Self {
            tasks: Vec::new(),
            last_task: HashMap::new(),
            masks: Vec::new(),
            started: false,
            failure: None,
            sender: None,
        }
    }

    /// Latest task of `mask` if it has not completed.
    pub(crate) fn pending_task(&self, mask: MaskId) -> Option<TaskId> {
        self.last_task
            .get(&mask)
            .copied()
            .filter(|&task| self.tasks[task].is_pending())
    }

    fn pending_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_pending()).count()
    }

    fn record_digest(&mut self, mask: MaskId, digest: String) {
        if let Some(entry) = self.masks.iter_mut().find(|e| e.id == mask) {
            entry.digests.push(digest);
        }
    }

    /// Send a ready task to the workers; without workers it stays waiting.
    fn dispatch(&mut self, task: TaskId) {
        let Some(sender) = &self.sender else {
            return;
        };
        if sender.send(WorkerMessage::Run(task)).is_ok() {
            self.tasks[task].status = TaskStatus::Queued;
            log::trace!(
                "Dispatched task {} '{}' on mask '{}'",
                task,
                self.tasks[task].label,
                self.tasks[task].mask
            );
        } else {
            log::warn!("Worker queue closed; task {} stays waiting", task);
        }
    }

    fn fail(&mut self, task: TaskId, error: PipelineError) {
        log::error!("{}", error);
        self.tasks[task].status = TaskStatus::Failed;
        self.tasks[task].on_complete.clear();
        if self.failure.is_none() {
            self.failure = Some(error);
        }
    }
}

pub(crate) struct Shared {
    config: PipelineConfig,
    registry: Mutex<Registry>,
    idle: Condvar,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl Shared {
    fn lock_registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Execute one dispatched task on the current worker thread.
    pub(crate) fn run_task(&self, task: TaskId) {
        let (job, output, label, mask) = {
            let mut registry = self.lock_registry();
            let record = &mut registry.tasks[task];
            record.status = TaskStatus::Running;
            (record.job.take(), record.output, record.label, record.mask.clone())
        };
        let Some(job) = job else {
            log::warn!("Task {} was dispatched without a job", task);
            return;
        };

        log::debug!("Running task {} '{}' on mask '{}'", task, label, mask);
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(job));

        let mut registry = self.lock_registry();
        match outcome {
            Ok(Ok(digest)) => {
                if let Some(digest) = digest {
                    log::trace!("Mask '{}' after '{}': {}", mask, label, digest);
                    registry.record_digest(output, digest);
                }
                let hooks = std::mem::take(&mut registry.tasks[task].on_complete);
                for hook in hooks {
                    hook();
                }
                registry.tasks[task].status = TaskStatus::Done;
                let dependents = std::mem::take(&mut registry.tasks[task].dependents);
                for dependent in dependents {
                    let record = &mut registry.tasks[dependent];
                    record.waiting_on = record.waiting_on.saturating_sub(1);
                    if record.waiting_on == 0 && record.status == TaskStatus::Waiting {
                        registry.dispatch(dependent);
                    }
                }
            }
            Ok(Err(error)) => registry.fail(
                task,
                PipelineError::TaskFailed {
                    task,
                    label,
                    mask,
                    message: error.to_string(),
                },
            ),
            Err(payload) => registry.fail(
                task,
                PipelineError::TaskPanicked {
                    task,
                    label,
                    mask,
                    message: panic_message(payload.as_ref()),
                },
            ),
        }
        drop(registry);
        self.idle.notify_all();
    }
}

/// Per-run task graph and worker pool.
///
/// Cloning yields another handle to the same pipeline.
#[derive(Clone)]
pub struct Pipeline {
    shared: Arc<Shared>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.shared.lock_registry();
        f.debug_struct("Pipeline")
            .field("config", &self.shared.config)
            .field("started", &registry.started)
            .field("tasks", &registry.tasks.len())
            .field("masks", &registry.masks.len())
            .finish()
    }
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                registry: Mutex::new(Registry::new()),
                idle: Condvar::new(),
                workers: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.shared.config
    }

    /// Whether both handles refer to the same pipeline.
    pub fn same_as(&self, other: &Pipeline) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    pub(crate) fn register(&self, id: MaskId, name: &str, handle: Weak<dyn Fingerprint>) {
        self.shared.lock_registry().masks.push(MaskEntry {
            id,
            name: name.to_string(),
            handle,
            digests: Vec::new(),
        });
    }

    /// Begin planning a task that writes `output`.
    pub(crate) fn plan(&self, output: MaskId) -> TaskPlan<'_> {
        TaskPlan::new(self.shared.lock_registry(), output)
    }

    /// Enqueue a planned task, or run it on the calling thread when nothing
    /// needs to wait.
    pub(crate) fn submit(&self, plan: TaskPlan<'_>, spec: TaskSpec, job: Job) -> Result<(), MaskError> {
        let TaskPlan {
            mut registry,
            output,
            mut waits,
            inputs,
        } = plan;

        let previous = registry.pending_task(output);
        let inline = waits.is_empty() && previous.is_none() && (!spec.parallel || registry.started);
        if inline {
            // Inline tasks are never recorded; a panic reports the id the task would have taken.
            let id = registry.tasks.len();
            drop(registry);
            log::trace!("Running '{}' on mask '{}' inline", spec.label, spec.mask);
            let digest = match std::panic::catch_unwind(std::panic::AssertUnwindSafe(job)) {
                Ok(outcome) => outcome?,
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    log::error!("Inline '{}' on mask '{}' panicked: {}", spec.label, spec.mask, message);
                    return Err(MaskError::Pipeline(PipelineError::TaskPanicked {
                        task: id,
                        label: spec.label,
                        mask: spec.mask,
                        message,
                    }));
                }
            };
            if let Some(digest) = digest {
                self.shared.lock_registry().record_digest(output, digest);
            }
            return Ok(());
        }

        if let Some(previous) = previous {
            if !waits.contains(&previous) {
                waits.push(previous);
            }
        }

        let id = registry.tasks.len();
        for &dependency in &waits {
            registry.tasks[dependency].dependents.push(id);
        }
        log::debug!(
            "Queued task {} '{}' on mask '{}' ({} inputs, {} waits)",
            id,
            spec.label,
            spec.mask,
            inputs.len(),
            waits.len()
        );
        registry.tasks.push(TaskRecord {
            output,
            mask: spec.mask,
            label: spec.label,
            inputs,
            waiting_on: waits.len(),
            dependents: Vec::new(),
            job: Some(job),
            status: TaskStatus::Waiting,
            on_complete: Vec::new(),
        });
        registry.last_task.insert(output, id);

        if waits.is_empty() {
            registry.dispatch(id);
        }
        Ok(())
    }

    /// Whether `mask` has queued work that has not completed.
    pub fn has_pending(&self, mask: MaskId) -> bool {
        self.shared.lock_registry().pending_task(mask).is_some()
    }

    /// Launch the worker pool and dispatch every ready task.
    pub fn start(&self) -> Result<(), PipelineError> {
        let mut registry = self.shared.lock_registry();
        if registry.started {
            return Err(PipelineError::AlreadyStarted);
        }

        let count = if self.shared.config.workers == 0 {
            log::warn!("Pipeline configured with 0 workers; using 1");
            1
        } else {
            self.shared.config.workers
        };

        let (sender, receiver) = unbounded();
        let handles = match spawn_workers(&self.shared, count, &receiver) {
            Ok(handles) => handles,
            Err(error) => {
                log::error!("{}", error);
                return Err(error);
            }
        };
        *self.shared.workers.lock().unwrap_or_else(PoisonError::into_inner) = handles;

        registry.started = true;
        registry.sender = Some(sender);
        let ready: Vec<TaskId> = registry
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.status == TaskStatus::Waiting && t.waiting_on == 0)
            .map(|(id, _)| id)
            .collect();
        log::info!(
            "Pipeline started with {} workers, {} tasks ready of {} pending",
            count,
            ready.len(),
            registry.pending_count()
        );
        for id in ready {
            registry.dispatch(id);
        }
        Ok(())
    }

    /// Stop the worker pool after queued tasks drain. Waiting tasks stay in the
    /// graph and resume on the next [`Pipeline::start`].
    pub fn stop(&self) {
        let sender = {
            let mut registry = self.shared.lock_registry();
            if !registry.started {
                return;
            }
            registry.started = false;
            registry.sender.take()
        };
        let handles = std::mem::take(
            &mut *self.shared.workers.lock().unwrap_or_else(PoisonError::into_inner),
        );
        if let Some(sender) = sender {
            for _ in &handles {
                let _ = sender.send(WorkerMessage::Shutdown);
            }
        }
        for handle in handles {
            if handle.join().is_err() {
                log::error!("Pipeline worker panicked outside a task");
            }
        }
        self.shared.idle.notify_all();
        log::info!("Pipeline stopped");
    }

    /// Stop and discard every task, registration and failure.
    pub fn reset(&self) {
        self.stop();
        let mut registry = self.shared.lock_registry();
        let discarded = registry.pending_count();
        *registry = Registry::new();
        log::info!("Pipeline reset ({} pending tasks discarded)", discarded);
    }

    pub fn is_started(&self) -> bool {
        self.shared.lock_registry().started
    }

    /// Number of tasks that have not completed.
    pub fn pending_tasks(&self) -> usize {
        self.shared.lock_registry().pending_count()
    }

    /// Block until none of `masks` has outstanding work.
    ///
    /// Returns the first task failure of the run, or [`PipelineError::NotStarted`]
    /// when work is outstanding but no workers are running.
    pub fn await_masks(&self, masks: &[&dyn MaskRef]) -> Result<(), PipelineError> {
        let ids: Vec<MaskId> = masks.iter().map(|m| m.mask_id()).collect();
        let mut registry = self.shared.lock_registry();
        loop {
            if let Some(failure) = &registry.failure {
                return Err(failure.clone());
            }
            if !ids.iter().any(|&id| registry.pending_task(id).is_some()) {
                return Ok(());
            }
            if !registry.started {
                return Err(PipelineError::NotStarted);
            }
            registry = self
                .shared
                .idle
                .wait(registry)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Block until every task of the run has completed.
    pub fn await_all(&self) -> Result<(), PipelineError> {
        let mut registry = self.shared.lock_registry();
        loop {
            if let Some(failure) = &registry.failure {
                return Err(failure.clone());
            }
            if registry.pending_count() == 0 {
                return Ok(());
            }
            if !registry.started {
                return Err(PipelineError::NotStarted);
            }
            registry = self
                .shared
                .idle
                .wait(registry)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Digest history per mask, in registration order.
    pub fn task_hashes(&self) -> Vec<(String, Vec<String>)> {
        self.shared
            .lock_registry()
            .masks
            .iter()
            .map(|entry| (entry.name.clone(), entry.digests.clone()))
            .collect()
    }

    /// Current digest of every live registered mask, in registration order.
    pub fn hash_log(&self) -> Result<Vec<(String, String)>, MaskError> {
        let handles: Vec<(String, Arc<dyn Fingerprint>)> = {
            let registry = self.shared.lock_registry();
            if let Some(entry) = registry
                .masks
                .iter()
                .find(|entry| registry.pending_task(entry.id).is_some())
            {
                return Err(MaskError::Pipelined {
                    mask: entry.name.clone(),
                    op: "hash_log",
                });
            }
            registry
                .masks
                .iter()
                .filter_map(|entry| entry.handle.upgrade().map(|h| (entry.name.clone(), h)))
                .collect()
        };
        Ok(handles
            .into_iter()
            .map(|(name, handle)| (name, handle.fingerprint()))
            .collect())
    }

    /// Write `<name> <digest>` lines for every live registered mask.
    pub fn write_hash_log(&self, path: &Path) -> Result<(), MaskError> {
        let entries = self.hash_log()?;
        let mut writer = std::io::BufWriter::new(std::fs::File::create(path)?);
        for (name, digest) in &entries {
            writeln!(writer, "{} {}", name, digest)?;
        }
        writer.flush()?;
        log::info!("Wrote {} mask hashes to {}", entries.len(), path.display());
        Ok(())
    }
}
