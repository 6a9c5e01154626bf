use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

// GET /
pub async fn get_index() -> impl IntoResponse {
    Json(json!({ "message": "pricewatch API is running" }))
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "status": 404, "error": "Not found" })),
    )
}
