use axum::middleware::from_fn_with_state;
use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::{controllers::alerts_controller, AppState};

pub fn add_routes(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router
        .route(
            "/postalert",
            post(alerts_controller::post_create_alert).route_layer(from_fn_with_state(
                state.clone(),
                crate::rate_limit::alert_create,
            )),
        )
        .route("/alerts", get(alerts_controller::get_alerts))
        .route("/alerts/:id", delete(alerts_controller::delete_alert))
}
