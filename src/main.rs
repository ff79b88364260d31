//! Image-to-text inference server

use tokio_vlm_api::api::{self, AppState};
use tokio_vlm_api::config::Config;
use tokio_vlm_api::core::broker::ResultBroker;
use tokio_vlm_api::core::dispatch::Dispatcher;
use tokio_vlm_api::core::engine::DemoEngine;
use tokio_vlm_api::core::queue::TaskQueue;
use tokio_vlm_api::core::worker::InferenceWorker;

use log::info;
use tokio::runtime::{Builder, Runtime};

fn main() -> anyhow::Result<()> {
    // initialize tracing
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    info!("model: {}", config.model_id);

    let runtime: Runtime = Builder::new_multi_thread().enable_all().build()?;

    // Shared task queue -> consumed by the inference worker
    let (queue, task_rx) = TaskQueue::new();

    // The broker sits between the worker and any consumers (UI/API)
    let broker = ResultBroker::new();

    let mut worker = InferenceWorker::new(DemoEngine::new(&config.model_id), task_rx, broker.sender());
    let worker_state = worker.state_handle();

    // The warm-up must succeed before the server is considered ready.
    worker.warm_up(&config.demo_image)?;
    worker.start();

    let state = AppState {
        dispatcher: Dispatcher::new(queue, broker),
        worker_state,
        demo_image: config.demo_image.clone(),
        result_timeout: config.result_timeout,
    };

    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
        info!("listening on {}", listener.local_addr()?);
        axum::serve(listener, api::app(state)).await?;
        Ok(())
    })
}
