//! Caller-side submit-and-await contract.
//!
//! Any caller (UI session, API handler) goes through the same two steps:
//! submit a validated task under a fresh id, then await that id's result with
//! a bounded timeout. Timeouts are caller-local; the abandoned task still
//! completes and its result is quietly discarded.

use crate::core::broker::ResultBroker;
use crate::core::queue::TaskQueue;
use crate::core::task::{Task, TaskId};
use log::debug;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SubmitError {
    #[error("prompt must not be empty")]
    MissingPrompt,
    #[error("image reference must not be empty")]
    MissingImage,
    #[error("task queue is closed")]
    QueueClosed,
}

#[derive(Debug, Error, PartialEq)]
pub enum AwaitError {
    #[error("timed out after {waited:?} waiting for inference result")]
    Timeout { waited: Duration },
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("result broker shut down")]
    BrokerGone,
}

#[derive(Clone)]
pub struct Dispatcher {
    queue: TaskQueue,
    broker: ResultBroker,
}

impl Dispatcher {
    pub fn new(queue: TaskQueue, broker: ResultBroker) -> Dispatcher {
        Dispatcher { queue, broker }
    }

    /// Validates and enqueues a task, returning the fresh id to await on.
    /// Malformed tasks are rejected here and never reach the worker.
    pub fn submit(&self, image_path: &str, prompt: &str) -> Result<TaskId, SubmitError> {
        if prompt.trim().is_empty() {
            return Err(SubmitError::MissingPrompt);
        }
        if image_path.trim().is_empty() {
            return Err(SubmitError::MissingImage);
        }

        let task = Task::new(image_path, prompt);
        let id = task.id;
        self.queue.submit(task).map_err(|_| SubmitError::QueueClosed)?;
        debug!("dispatch: submitted task {id}");
        Ok(id)
    }

    /// Registers for `id` and waits up to `timeout` for its result. The
    /// broker tolerates registration before or after the result arrives, so
    /// calling this any time after `submit` is fine. Each id may be awaited
    /// at most once.
    pub async fn await_result(&self, id: TaskId, timeout: Duration) -> Result<String, AwaitError> {
        let waiter = self.broker.register(id);
        match tokio::time::timeout(timeout, waiter.recv()).await {
            Err(_) => Err(AwaitError::Timeout { waited: timeout }),
            Ok(Err(_)) => Err(AwaitError::BrokerGone),
            Ok(Ok(result)) => result.outcome.map_err(AwaitError::Inference),
        }
    }

    /// Broker handle, for callers that want to register ahead of submission.
    pub fn broker(&self) -> &ResultBroker {
        &self.broker
    }
}
