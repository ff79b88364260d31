//! Task and result types shared by the queue, worker and broker.

use uuid::Uuid;

/// Identifier correlating a task with its result.
///
/// Every caller draws a fresh v4 UUID per task, so ids are unique across the
/// UI and API paths without a shared counter.
pub type TaskId = Uuid;

/// A unit of inference work. Consumed exactly once by the worker.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    pub image_path: String,
    pub prompt: String,
}

impl Task {
    pub fn new(image_path: impl Into<String>, prompt: impl Into<String>) -> Task {
        Task {
            id: Uuid::new_v4(),
            image_path: image_path.into(),
            prompt: prompt.into(),
        }
    }
}

/// The outcome of one task. An inference failure is carried as payload,
/// tagged with the originating task id.
#[derive(Debug, Clone)]
pub struct TaskResult {
    pub id: TaskId,
    pub outcome: Result<String, String>,
}
