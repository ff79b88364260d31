//! HTTP surface: task submission plus a health probe.

use crate::core::dispatch::Dispatcher;
use crate::core::worker::WorkerStateHandle;
use axum::Router;
use axum::extract::State;
use axum::routing::get;
use std::time::Duration;

pub mod convert;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub worker_state: WorkerStateHandle,
    pub demo_image: String,
    pub result_timeout: Duration,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/ptt", convert::router())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> String {
    format!("ok ({})", state.worker_state.get().as_str())
}
