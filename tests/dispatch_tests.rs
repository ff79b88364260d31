//! End-to-end tests for the queue -> worker -> broker -> caller path.

use std::time::Duration;
use tokio_vlm_api::core::broker::ResultBroker;
use tokio_vlm_api::core::dispatch::{AwaitError, Dispatcher};
use tokio_vlm_api::core::engine::InferenceEngine;
use tokio_vlm_api::core::queue::TaskQueue;
use tokio_vlm_api::core::task::Task;
use tokio_vlm_api::core::worker::InferenceWorker;
use uuid::Uuid;

/// Scripted backend: "boom" prompts fail with OOM, "slow" prompts stall,
/// everything else echoes a caption derived from the inputs.
struct ScriptedEngine;

impl InferenceEngine for ScriptedEngine {
    fn infer(&mut self, image_path: &str, prompt: &str) -> anyhow::Result<String> {
        if prompt.contains("boom") {
            anyhow::bail!("OOM");
        }
        if prompt.contains("slow") {
            std::thread::sleep(Duration::from_millis(200));
        }
        Ok(format!("a {}", image_path.trim_end_matches(".jpg")))
    }
}

/// Echoes the prompt back, for correlation checks.
struct EchoEngine;

impl InferenceEngine for EchoEngine {
    fn infer(&mut self, _image_path: &str, prompt: &str) -> anyhow::Result<String> {
        Ok(prompt.to_string())
    }
}

fn pipeline(engine: impl InferenceEngine + 'static) -> Dispatcher {
    let (queue, task_rx) = TaskQueue::new();
    let broker = ResultBroker::new();
    InferenceWorker::new(engine, task_rx, broker.sender()).start();
    Dispatcher::new(queue, broker)
}

#[tokio::test]
async fn test_submit_then_await_delivers_the_caption() {
    let dispatcher = pipeline(ScriptedEngine);

    let id = dispatcher.submit("cat.jpg", "describe").unwrap();
    let text = dispatcher
        .await_result(id, Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(text, "a cat");
}

#[tokio::test]
async fn test_registering_before_submission_also_works() {
    let (queue, task_rx) = TaskQueue::new();
    let broker = ResultBroker::new();
    InferenceWorker::new(ScriptedEngine, task_rx, broker.sender()).start();

    let task = Task::new("cat.jpg", "describe");
    let waiter = broker.register(task.id);
    queue.submit(task.clone()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), waiter.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.id, task.id);
    assert_eq!(result.outcome.unwrap(), "a cat");
}

#[tokio::test]
async fn test_inference_failure_reaches_its_caller_and_later_tasks_still_run() {
    let dispatcher = pipeline(ScriptedEngine);

    let failing = dispatcher.submit("big.jpg", "boom").unwrap();
    let err = dispatcher
        .await_result(failing, Duration::from_secs(5))
        .await
        .unwrap_err();
    assert_eq!(err, AwaitError::Inference("OOM".to_string()));

    let following = dispatcher.submit("dog.jpg", "describe").unwrap();
    let text = dispatcher
        .await_result(following, Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(text, "a dog");
}

#[tokio::test]
async fn test_awaiting_an_id_that_was_never_submitted_times_out_cleanly() {
    let dispatcher = pipeline(ScriptedEngine);

    let id = Uuid::new_v4();
    let err = dispatcher
        .await_result(id, Duration::from_millis(120))
        .await
        .unwrap_err();
    assert!(matches!(err, AwaitError::Timeout { .. }));
    assert!(!dispatcher.broker().has_pending(id));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_one_callers_timeout_does_not_affect_the_rest() {
    let dispatcher = pipeline(ScriptedEngine);

    let stalled = dispatcher.submit("huge.jpg", "slow").unwrap();
    let err = dispatcher
        .await_result(stalled, Duration::from_millis(20))
        .await
        .unwrap_err();
    assert!(matches!(err, AwaitError::Timeout { .. }));

    // The worker finishes the abandoned task and moves on.
    let next = dispatcher.submit("cat.jpg", "describe").unwrap();
    let text = dispatcher
        .await_result(next, Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(text, "a cat");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_each_get_their_own_result() {
    const CALLERS: usize = 8;
    const TASKS_PER_CALLER: usize = 25;

    let dispatcher = pipeline(EchoEngine);

    let mut handles = Vec::new();
    for caller in 0..CALLERS {
        let dispatcher = dispatcher.clone();
        handles.push(tokio::spawn(async move {
            for n in 0..TASKS_PER_CALLER {
                let prompt = format!("caller {caller} task {n}");
                let id = dispatcher.submit("img.png", &prompt).unwrap();
                // Half the callers pause before awaiting, so registration
                // races arrival in both directions.
                if n % 2 == 0 {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                }
                let text = dispatcher
                    .await_result(id, Duration::from_secs(10))
                    .await
                    .unwrap();
                assert_eq!(text, prompt);
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
}
