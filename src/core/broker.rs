//! Result broker.
//!
//! Decouples the producer of results (the inference worker) from the many
//! consumers awaiting one specific result each (UI sessions, API handlers).
//! Each task id gets a one-shot waiter. Results may arrive before or after a
//! consumer registers; either order delivers exactly once.

use crate::core::task::{TaskId, TaskResult};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

/// Single-use handle through which exactly one result is delivered.
pub struct Waiter {
    rx: oneshot::Receiver<TaskResult>,
}

impl Waiter {
    /// Resolves to the result for the registered id. Fails only if the broker
    /// shut down before a result arrived.
    pub async fn recv(self) -> Result<TaskResult, oneshot::error::RecvError> {
        self.rx.await
    }
}

struct BrokerState {
    // Invariant: an id is never in both maps at once.
    waiters: HashMap<TaskId, oneshot::Sender<TaskResult>>,
    pending: HashMap<TaskId, TaskResult>,
}

/// Routes results from the worker to the waiter registered for their id.
#[derive(Clone)]
pub struct ResultBroker {
    incoming: mpsc::UnboundedSender<TaskResult>,
    state: Arc<Mutex<BrokerState>>,
}

impl ResultBroker {
    /// Starts the delivery loop on its own thread. The loop ends when every
    /// handle to the inbound channel has been dropped.
    pub fn new() -> ResultBroker {
        let (incoming, mut rx) = mpsc::unbounded_channel::<TaskResult>();
        let state = Arc::new(Mutex::new(BrokerState {
            waiters: HashMap::new(),
            pending: HashMap::new(),
        }));

        std::thread::spawn({
            let state = state.clone();
            move || {
                while let Some(result) = rx.blocking_recv() {
                    deliver(&state, result);
                }
                debug!("result broker: inbound channel closed, delivery loop exiting");
            }
        });
        info!("result broker started");

        ResultBroker { incoming, state }
    }

    /// Registers interest in `id` and returns the waiter that will receive
    /// exactly one result for it. If the result already arrived, the waiter
    /// comes back pre-filled.
    ///
    /// Ids must be fresh; registering a second waiter for an id that is still
    /// live is a caller error.
    pub fn register(&self, id: TaskId) -> Waiter {
        let (tx, rx) = oneshot::channel();
        let mut state = self.state.lock().unwrap();
        if let Some(result) = state.pending.remove(&id) {
            // Receiver is in hand, send cannot fail.
            let _ = tx.send(result);
        } else {
            state.waiters.insert(id, tx);
        }
        Waiter { rx }
    }

    /// Producer handle for the worker to push results through.
    pub fn sender(&self) -> mpsc::UnboundedSender<TaskResult> {
        self.incoming.clone()
    }

    /// Whether an unclaimed result is stashed for `id`.
    pub fn has_pending(&self, id: TaskId) -> bool {
        self.state.lock().unwrap().pending.contains_key(&id)
    }

    /// Whether a registered waiter is still parked for `id`.
    pub fn has_waiter(&self, id: TaskId) -> bool {
        self.state.lock().unwrap().waiters.contains_key(&id)
    }
}

impl Default for ResultBroker {
    fn default() -> Self {
        Self::new()
    }
}

fn deliver(state: &Mutex<BrokerState>, result: TaskResult) {
    let mut state = state.lock().unwrap();
    match state.waiters.remove(&result.id) {
        Some(tx) => {
            // The caller may have timed out and dropped its waiter; the late
            // result is then simply discarded.
            if tx.send(result).is_err() {
                debug!("result broker: waiter abandoned, dropping late result");
            }
        }
        None => {
            // No one is waiting yet; stash it.
            if let Some(old) = state.pending.insert(result.id, result) {
                warn!(
                    "result broker: duplicate result for task {}, replacing the unclaimed one",
                    old.id
                );
            }
        }
    }
}
