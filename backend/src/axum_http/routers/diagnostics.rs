use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::post};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct SubmitDataRequest {
    name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitDataResponse {
    pub message: String,
}

pub fn routes() -> Router {
    Router::new().route("/submitdata", post(submit_data))
}

/// Echo endpoint kept for connectivity checks from the intake form.
pub async fn submit_data(Json(request): Json<SubmitDataRequest>) -> impl IntoResponse {
    info!(name = ?request.name, "diagnostics: submitdata received");

    (
        StatusCode::OK,
        Json(SubmitDataResponse {
            message: "Data received successfully".to_string(),
        }),
    )
}
