//! Order API module
//!
//! Order creation goes through the intake pipeline; everything else is
//! read-only apart from status transitions.

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        // Static segment must be registered alongside /{id}
        .route("/analytics/daily", get(handler::daily_analytics))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/status", put(handler::update_status))
}
