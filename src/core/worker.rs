//! Inference worker loop.
//!
//! A single thread drains the task queue and runs the model. Every dequeued
//! task produces exactly one result: an inference failure becomes a failure
//! outcome, never a dead worker.

use crate::core::engine::InferenceEngine;
use crate::core::queue::TaskReceiver;
use crate::core::task::TaskResult;
use anyhow::Context;
use log::{debug, info};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use tokio::sync::mpsc;

const WARM_UP_PROMPT: &str = "Warmup run";

#[derive(Clone, Debug, PartialEq)]
pub enum WorkerState {
    Idle,
    Processing,
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerState::Idle => "idle",
            WorkerState::Processing => "processing",
        }
    }
}

/// Shared view of the worker's current state, for health probes.
#[derive(Clone)]
pub struct WorkerStateHandle(Arc<Mutex<WorkerState>>);

impl WorkerStateHandle {
    fn new() -> WorkerStateHandle {
        WorkerStateHandle(Arc::new(Mutex::new(WorkerState::Idle)))
    }

    pub fn get(&self) -> WorkerState {
        self.0.lock().unwrap().clone()
    }

    fn set(&self, state: WorkerState) {
        *self.0.lock().unwrap() = state;
    }
}

pub struct InferenceWorker<E: InferenceEngine> {
    engine: E,
    tasks: TaskReceiver,
    results: mpsc::UnboundedSender<TaskResult>,
    state: WorkerStateHandle,
}

impl<E: InferenceEngine + 'static> InferenceWorker<E> {
    pub fn new(
        engine: E,
        tasks: TaskReceiver,
        results: mpsc::UnboundedSender<TaskResult>,
    ) -> InferenceWorker<E> {
        InferenceWorker {
            engine,
            tasks,
            results,
            state: WorkerStateHandle::new(),
        }
    }

    pub fn state_handle(&self) -> WorkerStateHandle {
        self.state.clone()
    }

    /// Runs one inference against the demo image so lazy initialization (model
    /// load, device setup) happens before any real task and before the HTTP
    /// layer is ready. A warm-up failure means the backend cannot run at all
    /// and aborts startup.
    pub fn warm_up(&mut self, demo_image: &str) -> anyhow::Result<()> {
        info!("worker: running warm-up on {demo_image}");
        let text = self
            .engine
            .infer(demo_image, WARM_UP_PROMPT)
            .context("inference warm-up failed")?;
        info!("worker: warm-up complete: {text}");
        Ok(())
    }

    /// Spawns the worker loop on its own thread. The loop runs until the task
    /// queue is closed (every `TaskQueue` handle dropped) or the broker goes
    /// away.
    pub fn start(mut self) -> JoinHandle<()> {
        std::thread::spawn(move || {
            info!("worker: started, waiting for tasks");
            while let Some(task) = self.tasks.blocking_recv() {
                self.state.set(WorkerState::Processing);
                debug!("worker: processing task {}", task.id);

                let outcome = self
                    .engine
                    .infer(&task.image_path, &task.prompt)
                    .map_err(|e| e.to_string());

                let delivered = self.results.send(TaskResult {
                    id: task.id,
                    outcome,
                });
                self.state.set(WorkerState::Idle);
                if delivered.is_err() {
                    break;
                }
            }
            info!("worker: task queue closed, exiting");
        })
    }
}
