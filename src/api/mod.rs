//! API routing
//!
//! One module per resource, each with a `router()` nesting its routes under
//! `/api/...` and a `handler` submodule.

pub mod categories;
pub mod extract;
pub mod health;
pub mod menu;
pub mod orders;

use std::time::Duration;

use axum::Router;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::state::AppState;

/// Upper bound on request handling; the store never long-polls, so anything
/// slower than this is stuck.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Assemble the full application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(categories::router())
        .merge(menu::router())
        .merge(orders::router())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
