mod status;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(status::get_status))
        .route("/status/{site_id}", get(status::get_site_status))
        .route("/monitor", get(status::get_monitor))
}
