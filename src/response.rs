//! Response helpers: bare rows in camelCase.

use crate::case::value_keys_to_camel_case;
use axum::{http::StatusCode, Json};
use serde_json::Value;

pub fn created(row: Value) -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, Json(value_keys_to_camel_case(row)))
}

pub fn ok_one(row: Value) -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(value_keys_to_camel_case(row)))
}

pub fn ok_many(rows: Vec<Value>) -> (StatusCode, Json<Vec<Value>>) {
    (
        StatusCode::OK,
        Json(rows.into_iter().map(value_keys_to_camel_case).collect()),
    )
}
