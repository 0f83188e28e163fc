//! Entity handlers: create, read by id, list all. The entity comes from the route's extension.

use crate::config::ResolvedEntity;
use crate::error::AppError;
use crate::extractors::EntityBody;
use crate::response::{created, ok_many, ok_one};
use crate::service::CrudService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension,
};
use serde_json::Value;
use std::sync::Arc;

pub async fn list(
    State(state): State<AppState>,
    Extension(entity): Extension<Arc<ResolvedEntity>>,
) -> Result<impl IntoResponse, AppError> {
    let rows = CrudService::list(&state.pool, &entity).await?;
    Ok(ok_many(rows))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(entity): Extension<Arc<ResolvedEntity>>,
    EntityBody(body): EntityBody,
) -> Result<impl IntoResponse, AppError> {
    let row = CrudService::create(&state.pool, &entity, &body).await?;
    let id = row.get(&entity.pk_column).cloned().unwrap_or(Value::Null);
    tracing::info!(table = %entity.table_name, id = %id, "created");
    Ok(created(row))
}

pub async fn read(
    State(state): State<AppState>,
    Extension(entity): Extension<Arc<ResolvedEntity>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let Some(id) = entity.parse_key(&id_str) else {
        tracing::debug!(table = %entity.table_name, id = %id_str, "id does not fit identity column");
        return Err(AppError::NotFound);
    };
    let row = CrudService::read(&state.pool, &entity, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ok_one(row))
}
