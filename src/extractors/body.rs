//! Entity body from a JSON object or a urlencoded form, keyed by column name.

use crate::case::object_keys_to_snake_case;
use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Request},
    http::header,
    Form, Json,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Snake_case field map for an insert. Form fields arrive as strings and are cast by the database.
#[derive(Clone, Debug)]
pub struct EntityBody(pub Map<String, Value>);

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with(FORM_CONTENT_TYPE))
        .unwrap_or(false)
}

#[async_trait]
impl<S> FromRequest<S> for EntityBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let map = if is_form(&req) {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| AppError::Storage(e.body_text()))?;
            fields
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect::<Map<String, Value>>()
        } else {
            let Json(value) = Json::<Value>::from_request(req, state)
                .await
                .map_err(|e| AppError::Storage(e.body_text()))?;
            match value {
                Value::Object(m) => m,
                _ => return Err(AppError::Storage("body must be a JSON object".into())),
            }
        };
        Ok(EntityBody(object_keys_to_snake_case(map)))
    }
}
