use axum::{routing::get, Router};

use crate::{controllers::stats_controller, AppState};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router.route("/stats", get(stats_controller::get_stats))
}
