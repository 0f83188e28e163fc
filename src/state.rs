//! Shared application state for all routes. Built once in `main` and handed to the router.

use crate::config::{FullConfig, ResolvedModel};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub model: Arc<ResolvedModel>,
    /// Raw model, kept for schema reset DDL.
    pub config: Arc<FullConfig>,
}
