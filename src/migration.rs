//! Apply the model to the database: DDL for schemas and tables, in relationship order.
//! Tables are created parents-first and dropped children-first along enforced relationships.

use crate::config::loader::TIMESTAMP_COLUMNS;
use crate::config::types::*;
use crate::config::{default_schema_id, validate, FullConfig};
use crate::error::{AppError, ConfigError};
use crate::sql::{qualified_table, quoted};
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};

/// Tables in creation order: a table referenced by an enforced relationship precedes the tables referencing it.
/// Ties keep declaration order.
pub fn table_order(config: &FullConfig) -> Result<Vec<&TableConfig>, ConfigError> {
    let mut deps: HashMap<&str, HashSet<&str>> = config
        .tables
        .iter()
        .map(|t| (t.id.as_str(), HashSet::new()))
        .collect();
    for rel in config.relationships.iter().filter(|r| r.enforced) {
        if rel.from_table_id != rel.to_table_id {
            if let Some(d) = deps.get_mut(rel.from_table_id.as_str()) {
                d.insert(rel.to_table_id.as_str());
            }
        }
    }

    let mut ordered: Vec<&TableConfig> = Vec::with_capacity(config.tables.len());
    let mut placed: HashSet<&str> = HashSet::new();
    while ordered.len() < config.tables.len() {
        let next = config.tables.iter().find(|t| {
            !placed.contains(t.id.as_str())
                && deps
                    .get(t.id.as_str())
                    .map(|d| d.iter().all(|dep| placed.contains(dep)))
                    .unwrap_or(true)
        });
        match next {
            Some(t) => {
                placed.insert(t.id.as_str());
                ordered.push(t);
            }
            None => {
                let stuck: Vec<&str> = config
                    .tables
                    .iter()
                    .map(|t| t.id.as_str())
                    .filter(|id| !placed.contains(id))
                    .collect();
                return Err(ConfigError::Validation(format!(
                    "enforced relationships form a cycle between tables: {}",
                    stuck.join(", ")
                )));
            }
        }
    }
    Ok(ordered)
}

fn schema_name_for<'a>(config: &'a FullConfig, table: &'a TableConfig) -> Result<&'a str, ConfigError> {
    let sid = match table.schema_id.as_deref() {
        Some(s) => s,
        None => default_schema_id(config)?,
    };
    config
        .schemas
        .iter()
        .find(|s| s.id == sid)
        .map(|s| s.name.as_str())
        .ok_or_else(|| ConfigError::MissingReference {
            kind: "schema",
            id: sid.to_string(),
        })
}

/// CREATE SCHEMA / CREATE TABLE IF NOT EXISTS statements for the whole model.
pub fn create_statements(config: &FullConfig) -> Result<Vec<String>, ConfigError> {
    validate(config)?;
    let tables_by_id: HashMap<_, _> = config.tables.iter().map(|t| (t.id.as_str(), t)).collect();
    let columns_by_id: HashMap<_, _> = config.columns.iter().map(|c| (c.id.as_str(), c)).collect();

    let mut out = Vec::new();
    for s in &config.schemas {
        out.push(format!("CREATE SCHEMA IF NOT EXISTS {}", quoted(&s.name)));
    }

    for t in table_order(config)? {
        let full_name = qualified_table(schema_name_for(config, t)?, &t.name);
        let cols: Vec<&ColumnConfig> = config.columns.iter().filter(|c| c.table_id == t.id).collect();

        let mut col_defs: Vec<String> = Vec::new();
        for c in &cols {
            let mut def = format!("{} {}", quoted(&c.name), c.type_.ddl());
            if !c.nullable {
                def.push_str(" NOT NULL");
            }
            col_defs.push(def);
        }
        let config_col_names: HashSet<&str> = cols.iter().map(|c| c.name.as_str()).collect();
        for name in TIMESTAMP_COLUMNS {
            if !config_col_names.contains(name) {
                col_defs.push(format!("{} TIMESTAMPTZ NOT NULL DEFAULT NOW()", quoted(name)));
            }
        }

        col_defs.push(format!("PRIMARY KEY ({})", quoted(&t.primary_key)));
        for u in &t.unique {
            let cols: Vec<String> = u.iter().map(|s| quoted(s)).collect();
            col_defs.push(format!("UNIQUE ({})", cols.join(", ")));
        }

        for rel in config
            .relationships
            .iter()
            .filter(|r| r.enforced && r.from_table_id == t.id)
        {
            let (Some(from_col), Some(to_col), Some(to_table)) = (
                columns_by_id.get(rel.from_column_id.as_str()),
                columns_by_id.get(rel.to_column_id.as_str()),
                tables_by_id.get(rel.to_table_id.as_str()),
            ) else {
                return Err(ConfigError::MissingReference {
                    kind: "relationship",
                    id: rel.id.clone(),
                });
            };
            let to_full = qualified_table(schema_name_for(config, to_table)?, &to_table.name);
            col_defs.push(format!(
                "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
                quoted(rel.name.as_deref().unwrap_or(&rel.id)),
                quoted(&from_col.name),
                to_full,
                quoted(&to_col.name)
            ));
        }

        out.push(format!(
            "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
            full_name,
            col_defs.join(",\n  ")
        ));
    }
    Ok(out)
}

/// DROP TABLE statements, children first.
pub fn drop_statements(config: &FullConfig) -> Result<Vec<String>, ConfigError> {
    let mut out = Vec::new();
    for t in table_order(config)?.into_iter().rev() {
        out.push(format!(
            "DROP TABLE IF EXISTS {} CASCADE",
            qualified_table(schema_name_for(config, t)?, &t.name)
        ));
    }
    Ok(out)
}

/// Create any missing schema objects. Existing tables are left untouched.
pub async fn apply_migrations(pool: &PgPool, config: &FullConfig) -> Result<(), AppError> {
    for sql in create_statements(config)? {
        tracing::debug!(sql = %sql, "migrate");
        sqlx::query(&sql).execute(pool).await?;
    }
    Ok(())
}

/// Drop and recreate every model table in one transaction. Destroys all rows.
pub async fn reset_schema(pool: &PgPool, config: &FullConfig) -> Result<(), AppError> {
    let statements: Vec<String> = drop_statements(config)?
        .into_iter()
        .chain(create_statements(config)?)
        .collect();
    let mut tx = pool.begin().await?;
    for sql in &statements {
        tracing::debug!(sql = %sql, "reset");
        sqlx::query(sql).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::travel_model;

    fn position(stmts: &[String], needle: &str) -> usize {
        stmts
            .iter()
            .position(|s| s.contains(needle))
            .unwrap_or_else(|| panic!("no statement containing {}", needle))
    }

    #[test]
    fn travel_tables_have_identity_timestamps_and_unique_username() {
        let stmts = create_statements(&travel_model().unwrap()).unwrap();
        assert_eq!(stmts.len(), 1 + 9);
        let accounts = &stmts[position(&stmts, "\"public\".\"accounts\"")];
        assert!(accounts.contains("\"id\" serial NOT NULL"));
        assert!(accounts.contains("\"username\" varchar(255) NOT NULL"));
        assert!(accounts.contains("UNIQUE (\"username\")"));
        assert!(accounts.contains("\"created_at\" TIMESTAMPTZ NOT NULL DEFAULT NOW()"));
        assert!(accounts.contains("PRIMARY KEY (\"id\")"));
    }

    #[test]
    fn unenforced_relationships_emit_no_foreign_keys() {
        let stmts = create_statements(&travel_model().unwrap()).unwrap();
        assert!(stmts.iter().all(|s| !s.contains("FOREIGN KEY")));
    }

    #[test]
    fn enforced_relationships_order_parents_first() {
        let mut config = travel_model().unwrap();
        for rel in &mut config.relationships {
            rel.enforced = true;
        }
        // Declare payments first so ordering has to move it.
        let payments = config.tables.iter().position(|t| t.id == "payments").unwrap();
        let t = config.tables.remove(payments);
        config.tables.insert(0, t);

        let stmts = create_statements(&config).unwrap();
        assert!(position(&stmts, "\"public\".\"cities\" (") < position(&stmts, "\"public\".\"hotels\" ("));
        assert!(position(&stmts, "\"public\".\"hotel_reservations\" (") < position(&stmts, "\"public\".\"payments\" ("));
        let payments_ddl = &stmts[position(&stmts, "\"public\".\"payments\" (")];
        assert!(payments_ddl.contains(
            "FOREIGN KEY (\"hotel_reservation_id\") REFERENCES \"public\".\"hotel_reservations\" (\"id\")"
        ));

        let drops = drop_statements(&config).unwrap();
        assert!(position(&drops, "\"payments\"") < position(&drops, "\"hotel_reservations\""));
        assert!(position(&drops, "\"hotels\"") < position(&drops, "\"cities\""));
    }

    #[test]
    fn cycle_in_enforced_relationships_is_rejected() {
        let mut config = travel_model().unwrap();
        for rel in &mut config.relationships {
            rel.enforced = true;
        }
        config.relationships.push(RelationshipConfig {
            id: "cities_loop".into(),
            from_table_id: "cities".into(),
            from_column_id: "cities.id".into(),
            to_table_id: "hotels".into(),
            to_column_id: "hotels.id".into(),
            name: None,
            enforced: true,
        });
        assert!(matches!(table_order(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn drop_statements_cover_every_table() {
        let config = travel_model().unwrap();
        let drops = drop_statements(&config).unwrap();
        assert_eq!(drops.len(), config.tables.len());
        assert!(drops.iter().all(|s| s.starts_with("DROP TABLE IF EXISTS") && s.ends_with("CASCADE")));
    }
}
