//! Router assembly: health, bootstrap and entity routes, static assets as fallback.

mod bootstrap;
mod entity;
mod health;

pub use bootstrap::bootstrap_routes;
pub use entity::entity_routes;
pub use health::health_routes;

use crate::settings::Settings;
use crate::state::AppState;
use axum::Router;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, services::ServeDir, trace::TraceLayer};

/// Full application router.
pub fn app(state: AppState, settings: &Settings) -> Router {
    Router::new()
        .merge(health_routes(state.clone()))
        .merge(bootstrap_routes(state.clone()))
        .merge(entity_routes(state))
        .fallback_service(ServeDir::new(&settings.static_dir))
        .layer(RequestBodyLimitLayer::new(settings.body_limit_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
