use axum::{
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, models::CurrentUser, services::stats_service, AppState};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    // user id issued by the identity provider
    pub sub: String,
    // email claim, not all tokens carry one
    #[serde(default)]
    pub email: Option<String>,
    // expiry (unix timestamp seconds)
    pub exp: usize,
}

/// Pulls the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = raw.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

/// Flattens a request path into a valid document key: `/alerts/list`
/// becomes `_alerts_list`.
pub fn sanitize_route(path: &str) -> String {
    path.replace('/', "_")
}

fn is_public_path(path: &str) -> bool {
    path == "/"
}

/// Rejects requests without a valid bearer token, attaches the verified
/// identity to the request, and records the usage-stat side effect.
pub async fn require_user(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    if is_public_path(req.uri().path()) {
        return next.run(req).await;
    }

    let Some(token) = bearer_token(req.headers()) else {
        return ApiError::Unauthorized.into_response();
    };

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.settings.jwt_secret.as_bytes()),
        &validation,
    );

    let claims = match decoded {
        Ok(data) => data.claims,
        Err(e) => {
            tracing::warn!("token verification failed: {e}");
            return ApiError::Unauthorized.into_response();
        }
    };

    let user = CurrentUser {
        uid: claims.sub,
        email: claims.email,
    };

    // Best-effort usage tracking, detached from the request path: a stats
    // failure must never fail the request it rode in on.
    let route = sanitize_route(req.uri().path());
    tokio::spawn(stats_service::record_request(
        state.clone(),
        route,
        user.clone(),
    ));

    req.extensions_mut().insert(user);
    next.run(req).await
}
