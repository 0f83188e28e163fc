//! Development bootstrap: drop and recreate every model table.

use crate::migration::reset_schema;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode};

/// Always 200; failure is only visible in the server log.
pub async fn create_db(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match reset_schema(&state.pool, &state.config).await {
        Ok(()) => {
            tracing::info!("tables created");
            (StatusCode::OK, "tables created")
        }
        Err(e) => {
            tracing::error!(error = %e, "could not create tables");
            (StatusCode::OK, "could not create tables")
        }
    }
}
