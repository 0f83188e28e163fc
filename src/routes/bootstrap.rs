//! Schema reset route.

use crate::handlers::bootstrap::create_db;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn bootstrap_routes(state: AppState) -> Router {
    Router::new().route("/createdb", get(create_db)).with_state(state)
}
