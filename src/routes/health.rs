//! Service health and schema readiness.

use crate::sql::qualified_table;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use std::collections::BTreeSet;

/// Liveness with the build and the paths the model exposes. Never touches the database.
async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "entities": state.model.entities.len(),
    }))
}

/// 200 once every table behind an API path exists; 503 while the database is
/// unreachable or `/createdb` has not built the schema yet.
async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let tables: Vec<String> = state
        .model
        .entities
        .iter()
        .map(|e| qualified_table(&e.schema_name, &e.table_name))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let expected = tables.len() as i64;
    let present: Result<(i64,), _> = sqlx::query_as(
        "SELECT count(*) FROM unnest($1::text[]) AS t(name) WHERE to_regclass(t.name) IS NOT NULL",
    )
    .bind(&tables)
    .fetch_one(&state.pool)
    .await;
    match present {
        Ok((present,)) if present == expected => (
            StatusCode::OK,
            Json(json!({"status": "ok", "tables": {"expected": expected, "present": present}})),
        ),
        Ok((present,)) => {
            tracing::warn!(expected, present, "travel tables missing");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "schema_missing", "tables": {"expected": expected, "present": present}})),
            )
        }
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"status": "database_unavailable"})))
        }
    }
}

/// GET /health, GET /ready.
pub fn health_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .with_state(state)
}
