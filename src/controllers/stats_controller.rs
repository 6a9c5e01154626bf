use axum::{extract::State, Json};
use serde_json::json;

use crate::{error::ApiError, services::stats_service, AppState};

// GET /stats
pub async fn get_stats(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let stats = stats_service::list_stats(&state).await?;

    let items: Vec<serde_json::Value> = stats
        .iter()
        .map(|s| {
            json!({
                "userId": s.user_id,
                "email": s.email,
                "route": s.route,
                "count": s.count,
                "lastRequest": s.last_request,
            })
        })
        .collect();

    Ok(Json(serde_json::Value::Array(items)))
}
