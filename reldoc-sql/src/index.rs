//! Index compilation: DDL statements for secondary index declarations.
//!
//! Creation of a declaration yields an ordered statement list: metadata
//! declarations first add their physical columns with ALTER TABLE, then
//! delegate to the wrapped declaration for the CREATE INDEX itself. Dropping
//! mirrors that: the index goes first, then any promoted columns the
//! declaration introduced.
//!
//! Field paths resolve exactly as in filter compilation, except that the
//! metadata-columns switch also turns on when the declaration being compiled
//! is itself the one introducing the columns.

use reldoc_core::{
    collection::CollectionDef,
    error::DocumentStoreResult,
    index::{IndexDef, IndexRef},
    order::Direction,
};

use crate::path;

/// Compiles an index declaration into its creation statements, in execution
/// order. `table` is the qualified physical table name.
pub fn create_statements(
    table: &str,
    def: &CollectionDef,
    index: &IndexDef,
) -> Vec<String> {
    let metadata_enabled = def.has_metadata_columns() || !index.metadata_columns().is_empty();
    let mut statements = Vec::new();
    push_create(table, metadata_enabled, index, &mut statements);
    statements
}

fn push_create(table: &str, metadata_enabled: bool, index: &IndexDef, out: &mut Vec<String>) {
    match index {
        IndexDef::Field { path, direction, unique, name } => {
            let key = key_part(path, *direction, metadata_enabled);
            out.push(create_index(table, *unique, name.as_deref(), &key));
        }
        IndexDef::Composite { fields, unique, name } => {
            let keys: Vec<String> = fields
                .iter()
                .map(|field| key_part(&field.path, field.direction, metadata_enabled))
                .collect();
            out.push(create_index(table, *unique, name.as_deref(), &keys.join(", ")));
        }
        IndexDef::Raw { create, .. } => out.push(create.clone()),
        IndexDef::Metadata { columns, index } => {
            for column in columns {
                out.push(format!(
                    "ALTER TABLE {table} ADD COLUMN {} {}",
                    column.name, column.sql_type
                ));
            }
            push_create(table, metadata_enabled, index, out);
        }
    }
}

fn key_part(field: &str, direction: Direction, metadata_enabled: bool) -> String {
    let accessor = path::resolve_with(field, metadata_enabled);
    match direction {
        Direction::Asc => format!("({accessor})"),
        Direction::Desc => format!("({accessor}) DESC"),
    }
}

fn create_index(table: &str, unique: bool, name: Option<&str>, keys: &str) -> String {
    let unique = if unique { "UNIQUE " } else { "" };
    match name {
        Some(name) => format!("CREATE {unique}INDEX {name} ON {table} ({keys})"),
        None => format!("CREATE {unique}INDEX ON {table} ({keys})"),
    }
}

/// Compiles an index reference into its drop statements, in execution order.
/// Dropping by full declaration also drops the metadata columns the
/// declaration introduced; dropping by name leaves columns in place.
///
/// # Errors
///
/// Returns a configuration error for a declaration without a name.
pub fn drop_statements(
    table: &str,
    schema: Option<&str>,
    index: &IndexRef,
) -> DocumentStoreResult<Vec<String>> {
    let name = index.resolve_name()?;
    let qualified = match schema {
        Some(schema) => format!("{schema}.{name}"),
        None => name.to_string(),
    };
    let mut statements = vec![format!("DROP INDEX {qualified}")];
    if let IndexRef::Def(def) = index {
        for column in def.metadata_columns() {
            statements.push(format!("ALTER TABLE {table} DROP COLUMN {}", column.name));
        }
    }
    Ok(statements)
}
