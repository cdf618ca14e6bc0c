//! Worker threads that drain the dispatch queue.

use std::any::Any;
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};

use crossbeam_channel::Receiver;

use super::task::TaskId;
use super::Shared;
use crate::error::PipelineError;

/// Messages sent to worker threads.
#[derive(Debug)]
pub(crate) enum WorkerMessage {
    /// Execute a task whose dependencies have completed.
    Run(TaskId),
    /// Exit the worker loop.
    Shutdown,
}

/// Spawn `count` workers reading from `receiver`.
pub(crate) fn spawn_workers(
    shared: &Arc<Shared>,
    count: usize,
    receiver: &Receiver<WorkerMessage>,
) -> Result<Vec<JoinHandle<()>>, PipelineError> {
    let mut handles = Vec::with_capacity(count);
    for index in 0..count {
        let weak = Arc::downgrade(shared);
        let receiver = receiver.clone();
        let handle = thread::Builder::new()
            .name(format!("neroxis-worker-{}", index))
            .spawn(move || worker_loop(weak, receiver))
            .map_err(|e| PipelineError::Spawn(e.to_string()))?;
        handles.push(handle);
    }
    Ok(handles)
}

/// Worker thread main loop.
///
/// Workers hold only a weak reference so that dropping the last pipeline handle
/// closes the channel and ends the loop.
fn worker_loop(shared: Weak<Shared>, receiver: Receiver<WorkerMessage>) {
    while let Ok(message) = receiver.recv() {
        match message {
            WorkerMessage::Run(task) => {
                let Some(shared) = shared.upgrade() else {
                    break;
                };
                shared.run_task(task);
            }
            WorkerMessage::Shutdown => break,
        }
    }
    log::trace!(
        "Worker {} exiting",
        thread::current().name().unwrap_or("unnamed")
    );
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
