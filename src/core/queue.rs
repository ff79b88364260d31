//! Shared task queue between callers and the inference worker.

use crate::core::task::Task;
use tokio::sync::mpsc;

/// Receiving half of the queue, held by the single inference worker.
pub type TaskReceiver = mpsc::UnboundedReceiver<Task>;

/// Multi-producer handle to the task queue.
///
/// `submit` never blocks: the queue is unbounded and the worker applies the
/// only backpressure in the system by draining it one task at a time. Tasks
/// are delivered FIFO and are neither lost nor duplicated.
#[derive(Clone)]
pub struct TaskQueue {
    tx: mpsc::UnboundedSender<Task>,
}

impl TaskQueue {
    pub fn new() -> (TaskQueue, TaskReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (TaskQueue { tx }, rx)
    }

    /// Enqueues a task. Fails only when the worker has shut down and dropped
    /// the receiving half.
    pub fn submit(&self, task: Task) -> Result<(), Task> {
        self.tx.send(task).map_err(|e| e.0)
    }
}
