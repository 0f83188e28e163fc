//! Builds parameterized INSERT and SELECT statements from a resolved entity.

use crate::config::ResolvedEntity;
use serde_json::{Map, Value};

/// Quote identifier for PostgreSQL (safe: only from the model).
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
pub fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Push a value and return its `$n::type` placeholder.
    fn push_param(&mut self, v: Value, cast_type: &str) -> String {
        self.params.push(v);
        format!("${}::{}", self.params.len(), cast_type)
    }
}

fn select_column_list(entity: &ResolvedEntity) -> String {
    entity
        .columns
        .iter()
        .map(|c| quoted(&c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn entity_table(entity: &ResolvedEntity) -> String {
    qualified_table(&entity.schema_name, &entity.table_name)
}

/// SELECT by primary key. Caller binds the id as the sole param.
pub fn select_by_id(entity: &ResolvedEntity, id: Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let cast = entity
        .column(&entity.pk_column)
        .map(|c| c.cast_type.clone())
        .unwrap_or_else(|| "integer".into());
    let ph = q.push_param(id, &cast);
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {}",
        select_column_list(entity),
        entity_table(entity),
        quoted(&entity.pk_column),
        ph
    );
    q
}

/// SELECT every row, ordered by identity.
pub fn select_all(entity: &ResolvedEntity) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} ORDER BY {}",
        select_column_list(entity),
        entity_table(entity),
        quoted(&entity.pk_column)
    );
    q
}

/// INSERT: one placeholder per model column, values from body (snake_case keys).
/// Keys the model does not know are ignored. A generated identity is never taken from the body.
/// Any other column with a DB default is omitted when the body does not provide it; a missing
/// column without one is bound as NULL.
pub fn insert(entity: &ResolvedEntity, body: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in &entity.columns {
        if c.is_pk && c.has_default {
            continue;
        }
        let val = body.get(&c.name).cloned();
        if val.is_none() && c.has_default {
            continue;
        }
        placeholders.push(q.push_param(val.unwrap_or(Value::Null), &c.cast_type));
        cols.push(quoted(&c.name));
    }
    q.sql = if cols.is_empty() {
        format!(
            "INSERT INTO {} DEFAULT VALUES RETURNING {}",
            entity_table(entity),
            select_column_list(entity)
        )
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            entity_table(entity),
            cols.join(", "),
            placeholders.join(", "),
            select_column_list(entity)
        )
    };
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve, travel_model, ResolvedModel};
    use serde_json::json;

    fn model() -> ResolvedModel {
        resolve(&travel_model().unwrap()).unwrap()
    }

    fn body(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn insert_casts_placeholders_and_returns_all_columns() {
        let model = model();
        let hotels = model.entity_by_path("hotels").unwrap();
        let q = insert(hotels, &body(json!({"name": "Ritz", "stars": 5, "city_id": 1})));
        assert!(q.sql.starts_with("INSERT INTO \"public\".\"hotels\" (\"name\", \"address\", \"description\", \"stars\", \"city_id\")"));
        assert!(q.sql.contains("VALUES ($1::varchar(255), $2::varchar(255), $3::text, $4::integer, $5::integer)"));
        assert!(q.sql.ends_with(
            "RETURNING \"id\", \"name\", \"address\", \"description\", \"stars\", \"city_id\", \"created_at\", \"updated_at\""
        ));
        assert_eq!(q.params, vec![json!("Ritz"), Value::Null, Value::Null, json!(5), json!(1)]);
    }

    #[test]
    fn insert_ignores_unknown_keys_and_client_supplied_identity() {
        let model = model();
        let cities = model.entity_by_path("cities").unwrap();
        let q = insert(cities, &body(json!({"id": 7, "name": "Rome", "mayor": "x"})));
        assert!(q.sql.contains("(\"name\", \"country\") VALUES ($1::varchar(255), $2::varchar(255))"));
        assert_eq!(q.params, vec![json!("Rome"), Value::Null]);
    }

    #[test]
    fn explicit_timestamps_are_kept() {
        let model = model();
        let cities = model.entity_by_path("cities").unwrap();
        let q = insert(cities, &body(json!({"name": "Rome", "created_at": "2020-01-01T00:00:00Z"})));
        assert!(q.sql.contains("(\"name\", \"country\", \"created_at\")"));
        assert!(q.sql.contains("$3::timestamptz"));
    }

    #[test]
    fn select_all_orders_by_identity() {
        let model = model();
        let q = select_all(model.entity_by_path("payments").unwrap());
        assert!(q.sql.starts_with("SELECT \"id\", \"card_holder\""));
        assert!(q.sql.ends_with("FROM \"public\".\"payments\" ORDER BY \"id\""));
        assert!(q.params.is_empty());
    }

    #[test]
    fn select_by_id_binds_single_param() {
        let model = model();
        let q = select_by_id(model.entity_by_path("accounts").unwrap(), json!(42));
        assert!(q.sql.ends_with("WHERE \"id\" = $1::integer"));
        assert_eq!(q.params, vec![json!(42)]);
    }

    #[test]
    fn quoting_escapes_double_quotes() {
        assert_eq!(quoted("we\"ird"), "\"we\"\"ird\"");
    }
}
