//! Resolved entity model: config validated and flattened for runtime use.

use crate::config::Operation;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct ColumnInfo {
    pub name: String,
    /// Type used to cast bound parameters, e.g. `integer` for a `serial` column.
    pub cast_type: String,
    pub is_pk: bool,
    /// Filled by the database when omitted (identity and timestamps).
    pub has_default: bool,
}

#[derive(Clone, Debug)]
pub struct ResolvedEntity {
    pub schema_name: String,
    pub table_name: String,
    pub path_segment: String,
    pub pk_column: String,
    pub columns: Vec<ColumnInfo>,
    pub operations: Vec<Operation>,
}

impl ResolvedEntity {
    pub fn allows(&self, op: Operation) -> bool {
        self.operations.contains(&op)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Parse a path id into a value the primary key column can hold.
    /// `None` when it is not a number or does not fit the column's integer width.
    pub fn parse_key(&self, raw: &str) -> Option<Value> {
        let cast = self
            .column(&self.pk_column)
            .map(|c| c.cast_type.as_str())
            .unwrap_or("integer");
        match cast {
            "smallint" => raw.parse::<i16>().ok().map(Value::from),
            "bigint" => raw.parse::<i64>().ok().map(Value::from),
            "integer" => raw.parse::<i32>().ok().map(Value::from),
            _ => Some(Value::String(raw.to_string())),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ResolvedModel {
    pub entities: Vec<Arc<ResolvedEntity>>,
    pub entity_by_path: HashMap<String, Arc<ResolvedEntity>>,
}

impl ResolvedModel {
    pub fn entity_by_path(&self, path: &str) -> Option<&ResolvedEntity> {
        self.entity_by_path.get(path).map(|e| e.as_ref())
    }
}
