//! Liveness endpoint.

use axum::Json;

use crate::models::StatusResponse;

/// `GET /health`: answers as long as the process is serving requests.
pub async fn health_handler() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "Server is online.".to_string(),
    })
}
