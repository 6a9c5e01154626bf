use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::ApiError,
    models::{Alert, CurrentUser},
    services::alerts_service::{self, NewAlert},
    AppState,
};

/// Raw creation payload. Fields are optional so that missing input is
/// answered with a 400 from validation, not a body-deserialization error.
#[derive(Deserialize)]
pub struct CreateAlertRequest {
    pub symbol: Option<String>,

    #[serde(rename = "alertName")]
    pub alert_name: Option<String>,

    #[serde(rename = "targetPrice")]
    pub target_price: Option<f64>,

    pub direction: Option<String>,
}

fn alert_json(a: &Alert) -> serde_json::Value {
    json!({
        "id": a.id.to_hex(),
        "symbol": a.symbol,
        "alertName": a.alert_name,
        "targetPrice": a.target_price,
        "direction": a.direction,
        "createdAt": a.created_at,
        "triggered": a.triggered,
        "triggeredAt": a.triggered_at,
    })
}

// POST /postalert
pub async fn post_create_alert(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateAlertRequest>,
) -> Result<Response, ApiError> {
    let new = NewAlert::validate(
        payload.symbol.as_deref(),
        payload.alert_name.as_deref(),
        payload.target_price,
        payload.direction.as_deref(),
    )?;

    let alert = alerts_service::create_alert(&state, &user.uid, new).await?;

    tracing::info!(
        symbol = %alert.symbol,
        user = %user.uid,
        "alert created"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Alert created",
            "id": alert.id.to_hex(),
        })),
    )
        .into_response())
}

// GET /alerts
pub async fn get_alerts(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let alerts = alerts_service::list_user_alerts(&state, &user.uid).await?;

    let items: Vec<serde_json::Value> = alerts.iter().map(alert_json).collect();
    Ok(Json(serde_json::Value::Array(items)))
}

// DELETE /alerts/:id
pub async fn delete_alert(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let oid = ObjectId::parse_str(&id)
        .map_err(|_| ApiError::validation("invalid alert id"))?;

    alerts_service::delete_alert(&state, &user.uid, oid).await?;

    Ok(Json(json!({ "message": "Alert deleted" })))
}
