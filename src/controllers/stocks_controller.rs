use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{error::ApiError, services::stocks_service, AppState};

#[derive(Deserialize)]
pub struct StockQuery {
    pub symbol: Option<String>,
}

// GET /stocks
pub async fn get_stocks(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let entries = stocks_service::list_overview(&state).await?;
    Ok(Json(serde_json::Value::Array(entries)))
}

// GET /stock?symbol=
pub async fn get_stock(
    State(state): State<AppState>,
    Query(query): Query<StockQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    // Presence and emptiness are both checked by the service.
    let symbol = query.symbol.as_deref().unwrap_or_default();

    let entry = stocks_service::quote_one(&state, symbol).await?;
    Ok(Json(entry))
}
