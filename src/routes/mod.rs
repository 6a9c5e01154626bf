use axum::middleware::from_fn_with_state;
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::{controllers::home_controller, AppState};

pub mod alerts_routes;
pub mod home_routes;
pub mod stats_routes;
pub mod stocks_routes;

pub fn app(state: AppState) -> Router {
    let router = Router::<AppState>::new();

    let router = home_routes::add_routes(router);
    let router = stocks_routes::add_routes(router);
    let router = alerts_routes::add_routes(router, &state);
    let router = stats_routes::add_routes(router);

    // Layer order: CORS and the global limiter run before the auth gate;
    // the per-route alert limiter (see alerts_routes) runs after it.
    router
        .fallback(home_controller::not_found)
        .layer(from_fn_with_state(state.clone(), crate::auth::require_user))
        .layer(from_fn_with_state(state.clone(), crate::rate_limit::global))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
