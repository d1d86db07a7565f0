use axum::{http::StatusCode, response::IntoResponse};

pub async fn root() -> impl IntoResponse {
    (StatusCode::OK, "Backend is running")
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "NOT_FOUND")
}
