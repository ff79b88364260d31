//! Image-to-text conversion endpoint

use crate::api::AppState;
use crate::api::convert::schemas::{ConvertFailure, ConvertRequest, ConvertResponse};
use crate::core::dispatch::{AwaitError, SubmitError};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};

pub fn router() -> Router<AppState> {
    Router::new().route("/convert", post(convert))
}

/// Runs the full submit-and-await contract for one request. A request with no
/// image falls back to the configured demo image.
async fn convert(State(state): State<AppState>, Json(request): Json<ConvertRequest>) -> Response {
    let prompt = request.prompt.unwrap_or_default();
    let image_path = request
        .image_path
        .unwrap_or_else(|| state.demo_image.clone());

    let id = match state.dispatcher.submit(&image_path, &prompt) {
        Ok(id) => id,
        Err(e @ (SubmitError::MissingPrompt | SubmitError::MissingImage)) => {
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
        Err(e @ SubmitError::QueueClosed) => {
            return (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response();
        }
    };

    match state
        .dispatcher
        .await_result(id, state.result_timeout)
        .await
    {
        Ok(result) => (StatusCode::OK, Json(ConvertResponse { id, result })).into_response(),
        Err(AwaitError::Inference(error)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ConvertFailure { id, error }),
        )
            .into_response(),
        Err(e @ AwaitError::Timeout { .. }) => {
            (StatusCode::GATEWAY_TIMEOUT, e.to_string()).into_response()
        }
        Err(e @ AwaitError::BrokerGone) => {
            (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response()
        }
    }
}

pub mod schemas {
    use crate::core::task::TaskId;
    use serde::{Deserialize, Serialize};

    #[derive(Deserialize, Debug)]
    pub struct ConvertRequest {
        pub prompt: Option<String>,
        pub image_path: Option<String>,
    }

    #[derive(Serialize, Debug)]
    pub struct ConvertResponse {
        pub id: TaskId,
        pub result: String,
    }

    #[derive(Serialize, Debug)]
    pub struct ConvertFailure {
        pub id: TaskId,
        pub error: String,
    }
}
